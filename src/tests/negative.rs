use crate::{Triangulation, TriangulationError};

#[test]
fn no_contours() {
    let contours: Vec<Vec<[f64; 2]>> = Vec::new();
    assert!(matches!(
        Triangulation::with_seed(&contours, 0),
        Err(TriangulationError::NotEnoughVertices { contour: 0, count: 0 })
    ));
}

#[test]
fn contour_with_two_vertices() {
    let contours = vec![vec![[0.0f64, 0.0], [1.0, 1.0]]];
    assert!(matches!(
        Triangulation::with_seed(&contours, 0),
        Err(TriangulationError::NotEnoughVertices { contour: 0, count: 2 })
    ));
}

#[test]
fn short_hole_is_rejected_too() {
    let contours = vec![
        vec![[0.0f64, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0]],
        vec![[1.0, 1.0], [2.0, 2.0]],
    ];
    assert!(matches!(
        Triangulation::with_seed(&contours, 0),
        Err(TriangulationError::NotEnoughVertices { contour: 1, count: 2 })
    ));
}

#[test]
fn repeated_consecutive_point() {
    let contours = vec![vec![[0.0f64, 0.0], [1.0, 0.0], [1.0, 0.0], [0.0, 1.0]]];
    assert!(matches!(
        Triangulation::with_seed(&contours, 0),
        Err(TriangulationError::RepeatedVertex { contour: 0, vertex: 1 })
    ));
}

#[test]
fn closing_point_must_not_repeat_the_first() {
    let contours = vec![vec![[0.0f64, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]];
    assert!(matches!(
        Triangulation::with_seed(&contours, 0),
        Err(TriangulationError::RepeatedVertex { contour: 0, vertex: 3 })
    ));
}

#[test]
fn clockwise_outer_contour() {
    let contours = vec![vec![[0.0f64, 0.0], [0.0, 1.0], [1.0, 1.0], [1.0, 0.0]]];
    assert!(matches!(
        Triangulation::with_seed(&contours, 0),
        Err(TriangulationError::InvalidWinding { contour: 0 })
    ));
}

#[test]
fn counter_clockwise_hole() {
    let contours = vec![
        vec![[0.0f64, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0]],
        vec![[1.0, 1.0], [3.0, 1.0], [3.0, 3.0], [1.0, 3.0]],
    ];
    assert!(matches!(
        Triangulation::with_seed(&contours, 0),
        Err(TriangulationError::InvalidWinding { contour: 1 })
    ));
}

#[test]
fn a_bare_triangle_still_works() {
    let contours = vec![vec![[0.0f64, 0.0], [2.0, 0.0], [1.0, 2.0]]];
    let t = Triangulation::with_seed(&contours, 0).expect("Triangulation failed");
    assert_eq!(t.triangles().len(), 1);
    assert_eq!(t.triangles()[0].len(), 3);
}

#[test]
fn errors_format_usefully() {
    let contours = vec![vec![[0.0f64, 0.0], [0.0, 1.0], [1.0, 1.0], [1.0, 0.0]]];
    let err = Triangulation::with_seed(&contours, 0).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("counter-clockwise"), "unexpected message: {}", msg);
}
