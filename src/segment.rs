use num_traits::{real::Real, Zero};

use crate::{
    Vertex,
    errors::TriangulationError,
    idx::{Idx, IdxDisplay, SliceExt, SliceIndexIter},
    point::Point,
    querynode::QueryNode,
};

/// One polygon edge, normalized so that `v_min` precedes `v_max` in the
/// y-major point order. `upward` remembers whether the contour direction runs
/// `v_min -> v_max`; the inside test and the contour vertex ids both depend
/// on it.
///
/// Vertex `i` of the flattened input is the contour origin of segment `i`,
/// so segment indices double as vertex ids throughout the crate.
#[derive(Debug, Clone)]
pub(crate) struct Segment<C: Real> {
    v_min: Point<C>,
    v_max: Point<C>,
    upward: bool,
    prev: Idx<Segment<C>>,
    next: Idx<Segment<C>>,
    is_inserted: bool,
    root_min: Option<Idx<QueryNode<C>>>,
    root_max: Option<Idx<QueryNode<C>>>,
}

impl<C: Real> IdxDisplay for Segment<C> {
    fn fmt(f: &mut std::fmt::Formatter<'_>, idx: usize) -> std::fmt::Result {
        write!(f, "s{}", idx)
    }
}

impl<C: Real> Segment<C> {
    pub fn v_min(&self) -> &Point<C> { &self.v_min }
    pub fn v_max(&self) -> &Point<C> { &self.v_max }

    pub fn upward(&self) -> bool { self.upward }

    pub fn prev(&self) -> Idx<Segment<C>> { self.prev }
    pub fn next(&self) -> Idx<Segment<C>> { self.next }

    pub fn is_inserted(&self) -> bool { self.is_inserted }
    pub fn set_inserted(&mut self) { self.is_inserted = true; }

    pub fn root_min(&self) -> Option<Idx<QueryNode<C>>> { self.root_min }
    pub fn root_max(&self) -> Option<Idx<QueryNode<C>>> { self.root_max }
    pub fn set_root_min(&mut self, qi: Idx<QueryNode<C>>) { self.root_min = Some(qi); }
    pub fn set_root_max(&mut self, qi: Idx<QueryNode<C>>) { self.root_max = Some(qi); }

    /// The contour origin of this segment, i.e. the coordinates of the vertex
    /// sharing its index
    pub fn origin(&self) -> &Point<C> {
        if self.upward { &self.v_min } else { &self.v_max }
    }

    /// Is `v` strictly left of the directed line `v_min -> v_max`?
    ///
    /// Points level with an endpoint are classified by x against that
    /// endpoint (upper endpoint checked first), which keeps queries for
    /// shared vertices consistent no matter which adjacent segment asks.
    pub fn is_left_of(&self, v: &Point<C>, eps: C) -> bool {
        if (v.y - self.v_max.y).abs() <= eps {
            v.x < self.v_max.x
        } else if (v.y - self.v_min.y).abs() <= eps {
            v.x < self.v_min.x
        } else {
            self.v_min.cross(&self.v_max, v) > C::zero()
        }
    }

    /// Does `v` coincide with one of the endpoints?
    pub fn has_endpoint(&self, v: &Point<C>, eps: C) -> bool {
        v.approx_eq(&self.v_min, eps) || v.approx_eq(&self.v_max, eps)
    }
}

/// The normalized polygon-edge representation with contour adjacency,
/// fixed for the duration of one build.
pub(crate) struct SegmentStore<C: Real> {
    segments: Vec<Segment<C>>,
}

impl<C: Real> SegmentStore<C> {
    /// Build the cyclic segment lists from raw contours, rejecting degenerate
    /// input before any construction starts: short contours, zero-length
    /// edges, and winding violations (outer CCW, holes CW, by signed area).
    pub fn from_contours<V: Vertex<Coordinate = C>>(
        contours: &[Vec<V>],
        eps: C,
    ) -> Result<Self, TriangulationError> {
        let total: usize = contours.iter().map(Vec::len).sum();
        let mut segments = Vec::with_capacity(total);

        let mut first = 0;
        for (ci, contour) in contours.iter().enumerate() {
            let count = contour.len();
            if count < 3 {
                return Err(TriangulationError::NotEnoughVertices { contour: ci, count });
            }

            let mut doubled_area = C::zero();
            for (vi, v) in contour.iter().enumerate() {
                let origin = Point::new(v.x(), v.y());
                let far_v = &contour[(vi + 1) % count];
                let far = Point::new(far_v.x(), far_v.y());

                if origin.approx_eq(&far, eps) {
                    return Err(TriangulationError::RepeatedVertex { contour: ci, vertex: vi });
                }
                doubled_area = doubled_area + origin.x * far.y - far.x * origin.y;

                let upward = far.gt(&origin, eps);
                let (v_max, v_min) = if upward { (far, origin) } else { (origin, far) };
                let i = first + vi;
                segments.push(Segment {
                    v_min,
                    v_max,
                    upward,
                    prev: Idx::new(if vi == 0 { first + count - 1 } else { i - 1 }),
                    next: Idx::new(if vi == count - 1 { first } else { i + 1 }),
                    is_inserted: false,
                    root_min: None,
                    root_max: None,
                });
            }

            let outer = ci == 0;
            if (outer && doubled_area <= C::zero()) || (!outer && doubled_area >= C::zero()) {
                return Err(TriangulationError::InvalidWinding { contour: ci });
            }

            first += count;
        }

        Ok(Self { segments })
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn iter_index(&self) -> SliceIndexIter<Segment<C>> {
        self.segments.iter_index()
    }

    /// Vertex id of a segment's lower endpoint
    pub fn vert_min(&self, si: Idx<Segment<C>>) -> Idx<Segment<C>> {
        let s = &self[si];
        if s.upward { si } else { s.next }
    }

    /// Vertex id of a segment's upper endpoint
    pub fn vert_max(&self, si: Idx<Segment<C>>) -> Idx<Segment<C>> {
        let s = &self[si];
        if s.upward { s.next } else { si }
    }

    /// The segment sharing `si`'s upper endpoint (its contour neighbor there)
    pub fn neighbor_at_max(&self, si: Idx<Segment<C>>) -> Idx<Segment<C>> {
        let s = &self[si];
        if s.upward { s.next } else { s.prev }
    }

    /// The segment sharing `si`'s lower endpoint
    pub fn neighbor_at_min(&self, si: Idx<Segment<C>>) -> Idx<Segment<C>> {
        let s = &self[si];
        if s.upward { s.prev } else { s.next }
    }
}

impl<C: Real> std::ops::Index<Idx<Segment<C>>> for SegmentStore<C> {
    type Output = Segment<C>;

    fn index(&self, si: Idx<Segment<C>>) -> &Self::Output {
        &self.segments[si]
    }
}

impl<C: Real> std::ops::IndexMut<Idx<Segment<C>>> for SegmentStore<C> {
    fn index_mut(&mut self, si: Idx<Segment<C>>) -> &mut Self::Output {
        &mut self.segments[si]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::tolerance;

    fn square() -> Vec<Vec<[f64; 2]>> {
        vec![vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]]
    }

    #[test]
    fn contour_links_are_cyclic() {
        let ss = SegmentStore::from_contours(&square(), tolerance()).unwrap();
        assert_eq!(ss.len(), 4);
        let mut si = Idx::new(0);
        for _ in 0..4 {
            si = ss[si].next();
        }
        assert_eq!(si, Idx::new(0));
        let s0 = &ss[Idx::new(0)];
        assert_eq!(ss[s0.next()].prev(), Idx::new(0));
    }

    #[test]
    fn normalization_and_direction() {
        let ss = SegmentStore::from_contours(&square(), tolerance()).unwrap();
        // bottom edge (0,0)->(1,0): ascending in the y-major order
        let s0 = &ss[Idx::new(0)];
        assert!(s0.upward());
        assert_eq!(s0.v_min(), &Point::new(0.0, 0.0));
        assert_eq!(s0.v_max(), &Point::new(1.0, 0.0));
        // top edge (1,1)->(0,1): descending
        let s2 = &ss[Idx::new(2)];
        assert!(!s2.upward());
        assert_eq!(s2.origin(), &Point::new(1.0, 1.0));
    }

    #[test]
    fn vertex_ids_recover_contour_endpoints() {
        let ss = SegmentStore::from_contours(&square(), tolerance()).unwrap();
        // segment 3 runs (0,1)->(0,0): its upper endpoint is vertex 3 itself
        let s3 = Idx::new(3);
        assert_eq!(ss.vert_max(s3), s3);
        assert_eq!(ss.vert_min(s3), Idx::new(0));
        // segment 1 runs (1,0)->(1,1): upper endpoint is vertex 2
        let s1 = Idx::new(1);
        assert_eq!(ss.vert_max(s1), Idx::new(2));
        assert_eq!(ss.vert_min(s1), s1);
    }

    #[test]
    fn rejects_short_contour() {
        let contours = vec![vec![[0.0f64, 0.0], [1.0, 0.0]]];
        assert!(matches!(
            SegmentStore::from_contours(&contours, tolerance()),
            Err(TriangulationError::NotEnoughVertices { contour: 0, count: 2 })
        ));
    }

    #[test]
    fn rejects_repeated_point() {
        let contours = vec![vec![[0.0f64, 0.0], [1.0, 0.0], [1.0, 0.0], [0.0, 1.0]]];
        assert!(matches!(
            SegmentStore::from_contours(&contours, tolerance()),
            Err(TriangulationError::RepeatedVertex { contour: 0, vertex: 1 })
        ));
    }

    #[test]
    fn rejects_clockwise_outer() {
        let contours = vec![vec![[0.0f64, 0.0], [0.0, 1.0], [1.0, 1.0], [1.0, 0.0]]];
        assert!(matches!(
            SegmentStore::from_contours(&contours, tolerance()),
            Err(TriangulationError::InvalidWinding { contour: 0 })
        ));
    }

    #[test]
    fn rejects_counter_clockwise_hole() {
        let contours = vec![
            vec![[0.0f64, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0]],
            vec![[1.0, 1.0], [3.0, 1.0], [3.0, 3.0], [1.0, 3.0]],
        ];
        assert!(matches!(
            SegmentStore::from_contours(&contours, tolerance()),
            Err(TriangulationError::InvalidWinding { contour: 1 })
        ));
    }
}
