use rand::{rngs::StdRng, SeedableRng};

use crate::{
    monotone::MonotoneChains,
    point::{tolerance, Point},
    segment::SegmentStore,
    trapezoidation::TrapezoidationState,
};

use super::util::{geometry, polygon};

fn build_chains(
    contours: &polygon::Contours,
    seed: u64,
) -> (TrapezoidationState<f64>, Vec<Vec<usize>>) {
    let eps = tolerance::<f64>();
    let ss = SegmentStore::from_contours(contours, eps).expect("Invalid fixture");
    let mut rng = StdRng::seed_from_u64(seed);
    let state = TrapezoidationState::build(ss, eps, &mut rng).expect("Trapezoidation failed");
    let cycles = {
        let chains = MonotoneChains::build(&state, eps).expect("Extraction failed");
        let cycles = chains.cycles().expect("Tracing failed");
        cycles.iter().map(|c| chains.cycle_vertices(c)).collect()
    };
    (state, cycles)
}

/// Count the strict local extrema of a vertex cycle in the y-major order
fn extrema(verts: &[[f64; 2]], cycle: &[usize]) -> (usize, usize) {
    let eps = tolerance::<f64>();
    let pt = |i: usize| Point::new(verts[cycle[i]][0], verts[cycle[i]][1]);
    let len = cycle.len();
    let mut maxima = 0;
    let mut minima = 0;
    for i in 0..len {
        let prev = pt((i + len - 1) % len);
        let cur = pt(i);
        let next = pt((i + 1) % len);
        if cur.gt(&prev, eps) && cur.gt(&next, eps) {
            maxima += 1;
        }
        if cur.lt(&prev, eps) && cur.lt(&next, eps) {
            minima += 1;
        }
    }
    (maxima, minima)
}

#[test]
fn extracted_cycles_are_monotone() {
    for contours in polygon::all_simple().into_iter().chain(polygon::all_hollow()) {
        let verts = geometry::flatten(&contours);
        for seed in 0..8 {
            let (_state, cycles) = build_chains(&contours, seed);
            for cycle in &cycles {
                assert!(cycle.len() >= 3);
                let (maxima, minima) = extrema(&verts, cycle);
                assert_eq!(maxima, 1, "cycle {:?} has {} local maxima", cycle, maxima);
                assert_eq!(minima, 1, "cycle {:?} has {} local minima", cycle, minima);
            }
        }
    }
}

#[test]
fn cycles_account_for_every_triangle() {
    for contours in polygon::all_simple().into_iter().chain(polygon::all_hollow()) {
        let n = geometry::vertex_count(&contours);
        let h = geometry::hole_count(&contours);
        let (_state, cycles) = build_chains(&contours, 11);
        let triangle_total: usize = cycles.iter().map(|c| c.len() - 2).sum();
        assert_eq!(triangle_total, n + 2 * h - 2);
    }
}

#[test]
fn cycle_areas_sum_to_the_polygon_area() {
    for contours in polygon::all_simple().into_iter().chain(polygon::all_hollow()) {
        let verts = geometry::flatten(&contours);
        let (_state, cycles) = build_chains(&contours, 13);
        let mut total = 0.0;
        for cycle in &cycles {
            let pts: Vec<[f64; 2]> = cycle.iter().map(|&v| verts[v]).collect();
            let area = geometry::signed_area(&pts);
            assert!(area > 0.0, "cycle {:?} is not counter-clockwise", cycle);
            total += area;
        }
        let expected = geometry::polygon_area(&contours);
        assert!((total - expected).abs() <= 1e-9 * expected.max(1.0));
    }
}
