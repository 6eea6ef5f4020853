//! Triangulation of simple polygons (with holes) by Seidel's randomized
//! incremental trapezoidal decomposition.
//!
//! The pipeline builds a trapezoidal map of the polygon's edges together with
//! a point-location search DAG, extracts y-monotone sub-polygons from the
//! map, and triangulates each of those in linear time. Construction runs in
//! expected O(n log n); the retained structure answers point-in-polygon
//! queries in expected O(log n).
//!
//! Contours are lists of vertices: the outer contour first, wound
//! counter-clockwise, followed by any holes wound clockwise, with no repeated
//! points. Output triangles are CCW triples of 0-based indices into the
//! flattened vertex sequence.
//!
//! ```
//! let contours = vec![vec![[0.0f64, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]];
//! let triangles = seidel::triangulate(&contours)?;
//! assert_eq!(triangles.len(), 2);
//! # Ok::<(), seidel::TriangulationError>(())
//! ```
//!
//! Keep the built [Triangulation] around to run inclusion queries against
//! the same polygon:
//!
//! ```
//! use seidel::Triangulation;
//!
//! let contours = vec![vec![[0.0f64, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]];
//! let triangulation = Triangulation::with_seed(&contours, 7)?;
//! assert!(triangulation.contains(&[0.5, 0.5]));
//! assert!(!triangulation.contains(&[2.0, 2.0]));
//! # Ok::<(), seidel::TriangulationError>(())
//! ```

mod idx;
mod point;
mod vertex;
mod math;
mod segment;
mod querynode;
mod trapezoid;
mod trapezoidation;
mod monotone;
mod errors;

#[cfg(test)]
mod tests;

use rand::{rngs::StdRng, Rng, SeedableRng};

pub use errors::{InternalError, TriangulationError};
pub use vertex::Vertex;

pub use num_traits::real::Real;

use monotone::MonotoneChains;
use point::Point;
use segment::SegmentStore;
use trapezoidation::TrapezoidationState;

/// A triangulated polygon: the triangle list plus the retained trapezoidal
/// map and search structure, ready for point-location queries.
///
/// All storage is owned by this value and torn down together; nothing is
/// shared between triangulations.
pub struct Triangulation<C: Real = f64> {
    state: TrapezoidationState<C>,
    triangles: Vec<[usize; 3]>,
}

impl<C: Real> Triangulation<C> {
    /// Triangulate with a randomized insertion order drawn from
    /// [rand::thread_rng]. The order only affects performance, never the
    /// result's validity.
    pub fn new<V: Vertex<Coordinate = C>>(
        contours: &[Vec<V>],
    ) -> Result<Self, TriangulationError> {
        Self::with_rng(contours, &mut rand::thread_rng())
    }

    /// Triangulate reproducibly: the same seed over the same input yields
    /// the same triangle list.
    pub fn with_seed<V: Vertex<Coordinate = C>>(
        contours: &[Vec<V>],
        seed: u64,
    ) -> Result<Self, TriangulationError> {
        Self::with_rng(contours, &mut StdRng::seed_from_u64(seed))
    }

    /// Triangulate with a caller-supplied source of randomness.
    pub fn with_rng<V: Vertex<Coordinate = C>, R: Rng + ?Sized>(
        contours: &[Vec<V>],
        rng: &mut R,
    ) -> Result<Self, TriangulationError> {
        if contours.is_empty() {
            return Err(TriangulationError::NotEnoughVertices { contour: 0, count: 0 });
        }
        let eps = point::tolerance::<C>();
        let ss = SegmentStore::from_contours(contours, eps)?;
        let state = TrapezoidationState::build(ss, eps, rng)?;
        let triangles = MonotoneChains::build(&state, eps)?.triangulate()?;
        Ok(Self { state, triangles })
    }

    /// The triangles as CCW triples of 0-based indices into the flattened
    /// contour vertices. Always `n + 2h - 2` of them for `n` vertices and
    /// `h` holes.
    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }

    pub fn into_triangles(self) -> Vec<[usize; 3]> {
        self.triangles
    }

    /// Is the point strictly inside the polygon? Points exactly on the
    /// boundary are classified deterministically but to an unspecified side.
    pub fn contains<V: Vertex<Coordinate = C>>(&self, point: &V) -> bool {
        self.state.is_inside(&Point::new(point.x(), point.y()))
    }

    /// Render the point-location DAG for inspection.
    #[cfg(feature = "debugging")]
    pub fn query_structure(&self) -> String {
        self.state.query_structure_tree().to_string()
    }
}

impl<C: Real> std::fmt::Debug for Triangulation<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Triangulation")
            .field("triangles", &self.triangles.len())
            .finish()
    }
}

/// One-shot triangulation; see [Triangulation::new].
pub fn triangulate<C: Real, V: Vertex<Coordinate = C>>(
    contours: &[Vec<V>],
) -> Result<Vec<[usize; 3]>, TriangulationError> {
    Triangulation::new(contours).map(Triangulation::into_triangles)
}
