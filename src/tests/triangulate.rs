use crate::Triangulation;

use super::util::{geometry, polygon};

#[test]
fn unit_square_is_two_half_triangles() {
    let contours = polygon::square();
    let t = Triangulation::with_seed(&contours, 1).expect("Triangulation failed");
    let triangles = t.triangles();
    assert_eq!(triangles.len(), 2);
    let verts = geometry::flatten(&contours);
    for tri in triangles {
        let area = geometry::triangle_signed_area(&verts, tri);
        assert!((area - 0.5).abs() < 1e-12);
    }
    geometry::assert_valid_triangulation(&contours, triangles);
}

#[test]
fn simple_polygons_yield_n_minus_2_triangles() {
    for contours in polygon::all_simple() {
        let n = geometry::vertex_count(&contours);
        let t = Triangulation::with_seed(&contours, 2).expect("Triangulation failed");
        assert_eq!(t.triangles().len(), n - 2);
        geometry::assert_valid_triangulation(&contours, t.triangles());
    }
}

#[test]
fn hollow_square_yields_eight_triangles() {
    let contours = polygon::hollow_square();
    let t = Triangulation::with_seed(&contours, 3).expect("Triangulation failed");
    assert_eq!(t.triangles().len(), 8);
    geometry::assert_valid_triangulation(&contours, t.triangles());
    // annulus area: 4x4 outer minus 2x2 hole
    assert!((geometry::polygon_area(&contours) - 12.0).abs() < 1e-12);
}

#[test]
fn polygons_with_holes_cover_their_area() {
    for contours in polygon::all_hollow() {
        let t = Triangulation::with_seed(&contours, 4).expect("Triangulation failed");
        geometry::assert_valid_triangulation(&contours, t.triangles());
    }
}

#[test]
fn every_insertion_order_produces_a_valid_triangulation() {
    for seed in 0..32 {
        for contours in polygon::all_simple().into_iter().chain(polygon::all_hollow()) {
            let t = Triangulation::with_seed(&contours, seed).expect("Triangulation failed");
            geometry::assert_valid_triangulation(&contours, t.triangles());
        }
    }
}

#[test]
fn fixed_seed_is_reproducible() {
    let contours = polygon::comb();
    let first = Triangulation::with_seed(&contours, 99).expect("Triangulation failed");
    let second = Triangulation::with_seed(&contours, 99).expect("Triangulation failed");
    assert_eq!(first.triangles(), second.triangles());
}

#[test]
fn regular_polygons() {
    for n in 3..=64 {
        let contours = polygon::regular_polygon(n);
        let t = Triangulation::with_seed(&contours, n as u64).expect("Triangulation failed");
        assert_eq!(t.triangles().len(), n - 2);
        geometry::assert_valid_triangulation(&contours, t.triangles());
    }
}

#[test]
fn thread_rng_builds_are_valid_too() {
    let contours = polygon::star();
    for _ in 0..8 {
        let triangles = crate::triangulate(&contours).expect("Triangulation failed");
        geometry::assert_valid_triangulation(&contours, &triangles);
    }
}
