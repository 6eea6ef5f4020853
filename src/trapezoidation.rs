use num_traits::real::Real;
use rand::{seq::SliceRandom, Rng};

use crate::{
    errors::TriangulationError,
    idx::{Idx, SliceExt, VecExt},
    math,
    point::Point,
    querynode::QueryNode,
    segment::{Segment, SegmentStore},
    trapezoid::{Side, Trapezoid, TrapezoidState},
};

/// The build context of one triangulation: the segment store plus the
/// trapezoid and query-node arenas, owned exclusively for the duration of the
/// call and retained afterwards for point-location queries.
///
/// Arenas are pre-sized to the classical linear bounds (4 trapezoids and 8
/// query nodes per segment, plus the seed structure) and never reallocate;
/// exceeding a bound surfaces as [TriangulationError::CapacityExceeded]
/// instead of silently growing past what randomized insertion should need.
pub(crate) struct TrapezoidationState<C: Real> {
    pub ss: SegmentStore<C>,
    pub trs: Vec<Trapezoid<C>>,
    pub qs: Vec<QueryNode<C>>,
    root: Idx<QueryNode<C>>,
    eps: C,
}

impl<C: Real> TrapezoidationState<C> {
    /// Construct the full trapezoidal map, inserting segments in a random
    /// order drawn from `rng`. Insertion proceeds in log* batches; between
    /// batches every uninserted segment's endpoint roots are refreshed so the
    /// next locate starts deep in the structure instead of at the root.
    pub fn build<R: Rng + ?Sized>(
        ss: SegmentStore<C>,
        eps: C,
        rng: &mut R,
    ) -> Result<Self, TriangulationError> {
        let n = ss.len();
        let mut order: Vec<Idx<Segment<C>>> = ss.iter_index().collect();
        order.shuffle(rng);

        let mut state = Self {
            ss,
            trs: Vec::with_capacity(4 * n + 4),
            qs: Vec::with_capacity(8 * n + 4),
            root: Idx::new(0),
            eps,
        };

        let mut pending = order.into_iter();
        let first = pending
            .next()
            .ok_or_else(|| TriangulationError::internal("No segments to insert"))?;
        state.root = state.init_query_structure(first)?;

        let mut inserted = 1;
        for h in 1..=math::log_star(n) {
            let target = math::batch_end(n, h);
            while inserted < target {
                match pending.next() {
                    Some(si) => {
                        state.add_segment(si)?;
                        inserted += 1;
                    }
                    None => break,
                }
            }
            state.refresh_roots();
        }
        for si in pending {
            state.add_segment(si)?;
        }

        Ok(state)
    }

    fn new_trapezoid(&mut self, t: Trapezoid<C>) -> Result<Idx<Trapezoid<C>>, TriangulationError> {
        if self.trs.len() == self.trs.capacity() {
            return Err(TriangulationError::CapacityExceeded {
                store: "trapezoid",
                capacity: self.trs.capacity(),
            });
        }
        Ok(self.trs.push_get_index(t))
    }

    fn new_node(&mut self, q: QueryNode<C>) -> Result<Idx<QueryNode<C>>, TriangulationError> {
        if self.qs.len() == self.qs.capacity() {
            return Err(TriangulationError::CapacityExceeded {
                store: "query node",
                capacity: self.qs.capacity(),
            });
        }
        Ok(self.qs.push_get_index(q))
    }

    /// Seed the structure from the first segment: a y-node for each endpoint,
    /// an x-node for the segment, four sinks, four trapezoids.
    fn init_query_structure(
        &mut self,
        si: Idx<Segment<C>>,
    ) -> Result<Idx<QueryNode<C>>, TriangulationError> {
        debug_assert!(self.qs.is_empty() && self.trs.is_empty());
        let v_max = *self.ss[si].v_max();
        let v_min = *self.ss[si].v_min();

        let i_root = Idx::new(0);
        let i_top = Idx::new(1);
        let i_min = Idx::new(2);
        let i_bottom = Idx::new(3);
        let i_seg = Idx::new(4);
        let i_left = Idx::new(5);
        let i_right = Idx::new(6);
        let t_left = Idx::new(0);
        let t_right = Idx::new(1);
        let t_bottom = Idx::new(2);
        let t_top = Idx::new(3);

        self.new_node(QueryNode::YNode { yval: v_max, above: i_top, below: i_min })?;
        self.new_node(QueryNode::Sink { ti: t_top, parent: i_root })?;
        self.new_node(QueryNode::YNode { yval: v_min, above: i_seg, below: i_bottom })?;
        self.new_node(QueryNode::Sink { ti: t_bottom, parent: i_min })?;
        self.new_node(QueryNode::XNode { si, left: i_left, right: i_right })?;
        self.new_node(QueryNode::Sink { ti: t_left, parent: i_seg })?;
        self.new_node(QueryNode::Sink { ti: t_right, parent: i_seg })?;

        let mut left = Trapezoid::all(i_left);
        left.hi = Some(v_max);
        left.lo = Some(v_min);
        left.rseg = Some(si);
        left.u0 = Some(t_top);
        left.d0 = Some(t_bottom);
        self.new_trapezoid(left)?;

        let mut right = Trapezoid::all(i_right);
        right.hi = Some(v_max);
        right.lo = Some(v_min);
        right.lseg = Some(si);
        right.u0 = Some(t_top);
        right.d0 = Some(t_bottom);
        self.new_trapezoid(right)?;

        let mut bottom = Trapezoid::all(i_bottom);
        bottom.hi = Some(v_min);
        bottom.u0 = Some(t_left);
        bottom.u1 = Some(t_right);
        self.new_trapezoid(bottom)?;

        let mut top = Trapezoid::all(i_top);
        top.lo = Some(v_max);
        top.d0 = Some(t_left);
        top.d1 = Some(t_right);
        self.new_trapezoid(top)?;

        self.ss[si].set_inserted();
        Ok(i_root)
    }

    /// Descend the DAG to the trapezoid containing `v`. `vo` supplies the
    /// tie-break context when `v` coincides with a structure vertex: it is the
    /// other endpoint of the segment being located, or `v` itself for plain
    /// inclusion queries (which then consistently fall below/right).
    pub fn locate(
        &self,
        v: &Point<C>,
        vo: &Point<C>,
        qi_root: Idx<QueryNode<C>>,
    ) -> Idx<Trapezoid<C>> {
        let eps = self.eps;
        let mut qi = qi_root;
        loop {
            match &self.qs[qi] {
                QueryNode::Sink { ti, .. } => return *ti,
                QueryNode::YNode { yval, above, below } => {
                    qi = if v.gt(yval, eps) {
                        *above
                    } else if v.approx_eq(yval, eps) {
                        // v is already a vertex of the structure; classify by
                        // where the rest of its segment lies
                        if vo.gt(yval, eps) { *above } else { *below }
                    } else {
                        *below
                    };
                }
                QueryNode::XNode { si, left, right } => {
                    let s = &self.ss[*si];
                    let use_left = if s.has_endpoint(v, eps) {
                        if (v.y - vo.y).abs() <= eps {
                            // the segment being located is horizontal
                            vo.x < v.x
                        } else {
                            s.is_left_of(vo, eps)
                        }
                    } else {
                        s.is_left_of(v, eps)
                    };
                    qi = if use_left { *left } else { *right };
                }
            }
        }
    }

    /// Re-seed every uninserted segment's locate roots from the current
    /// structure. Called between insertion batches.
    fn refresh_roots(&mut self) {
        for si in self.ss.iter_index().collect::<Vec<_>>() {
            if self.ss[si].is_inserted() {
                continue;
            }
            let v_min = *self.ss[si].v_min();
            let v_max = *self.ss[si].v_max();

            let start = self.ss[si].root_min().unwrap_or(self.root);
            let ti = self.locate(&v_min, &v_max, start);
            let sink_min = self.trs[ti].sink;

            let start = self.ss[si].root_max().unwrap_or(self.root);
            let ti = self.locate(&v_max, &v_min, start);
            let sink_max = self.trs[ti].sink;

            let s = &mut self.ss[si];
            s.set_root_min(sink_min);
            s.set_root_max(sink_max);
        }
    }

    /// Split trapezoid `tu` horizontally at vertex `p`. The arena slot keeps
    /// the piece above the split; the returned new trapezoid is the piece
    /// below. The slot's sink is rewritten in place into a y-node over two
    /// fresh sinks, so every DAG path into the old region now passes the new
    /// decision.
    fn split_at_vertex(
        &mut self,
        tu: Idx<Trapezoid<C>>,
        p: Point<C>,
    ) -> Result<Idx<Trapezoid<C>>, TriangulationError> {
        let mut low = self.trs[tu].clone();
        low.hi = Some(p);
        low.u0 = Some(tu);
        low.u1 = None;
        let tl = self.new_trapezoid(low)?;

        let up = &mut self.trs[tu];
        up.lo = Some(p);
        up.d0 = Some(tl);
        up.d1 = None;

        if let Some(d0) = self.trs[tl].d0 {
            self.trs[d0].replace_upper(tu, tl);
        }
        if let Some(d1) = self.trs[tl].d1 {
            self.trs[d1].replace_upper(tu, tl);
        }

        let sk = self.trs[tu].sink;
        let i_up = self.new_node(QueryNode::Sink { ti: tu, parent: sk })?;
        let i_low = self.new_node(QueryNode::Sink { ti: tl, parent: sk })?;
        self.qs[sk] = QueryNode::YNode { yval: p, above: i_up, below: i_low };
        self.trs[tu].sink = i_up;
        self.trs[tl].sink = i_low;

        Ok(tl)
    }

    /// Insert one segment into an already-consistent map, producing a new
    /// consistent map. Locates (or creates) the endpoint levels, threads the
    /// segment downwards splitting every trapezoid it crosses, then merges
    /// compatible pieces along both flanks.
    pub fn add_segment(&mut self, si: Idx<Segment<C>>) -> Result<(), TriangulationError> {
        let eps = self.eps;
        let s_min = *self.ss[si].v_min();
        let s_max = *self.ss[si].v_max();

        // An endpoint is already present exactly when the contour neighbor
        // sharing it has been inserted
        let max_present = self.ss[self.ss.neighbor_at_max(si)].is_inserted();
        let min_present = self.ss[self.ss.neighbor_at_min(si)].is_inserted();

        let tfirst = {
            let start = self.ss[si].root_max().unwrap_or(self.root);
            let tu = self.locate(&s_max, &s_min, start);
            if max_present {
                tu
            } else {
                self.split_at_vertex(tu, s_max)?
            }
        };

        let tlast = {
            let start = self.ss[si].root_min().unwrap_or(self.root);
            let tl = self.locate(&s_min, &s_max, start);
            if min_present {
                tl
            } else {
                // the slot keeps the piece above v_min, which is exactly the
                // trapezoid the segment ends in
                self.split_at_vertex(tl, s_min)?;
                tl
            }
        };

        let tlast_lo = self.trs[tlast]
            .lo
            .ok_or_else(|| TriangulationError::internal("Lower endpoint level missing"))?;

        let mut tfirst_r = None;
        let mut tlast_r = None;

        // Thread from the top: split every trapezoid whose span still reaches
        // the lower endpoint. The left piece keeps its slot, the right piece
        // is new, and the old sink becomes an x-node over both.
        let mut cursor = Some(tfirst);
        while let Some(t) = cursor {
            let lo = match self.trs[t].lo {
                Some(lo) if lo.ge(&s_min, eps) => lo,
                _ => break,
            };

            let copy = self.trs[t].clone();
            let tn = self.new_trapezoid(copy)?;
            let sk = self.trs[t].sink;
            let i_left = self.new_node(QueryNode::Sink { ti: t, parent: sk })?;
            let i_right = self.new_node(QueryNode::Sink { ti: tn, parent: sk })?;
            self.qs[sk] = QueryNode::XNode { si, left: i_left, right: i_right };
            self.trs[t].sink = i_left;
            self.trs[tn].sink = i_right;

            if t == tfirst {
                tfirst_r = Some(tn);
            }
            if lo.approx_eq(&tlast_lo, eps) {
                tlast_r = Some(tn);
            }

            self.thread_uppers(si, t, tn, &s_min)?;
            cursor = self.thread_lowers(si, t, tn, &s_max, &s_min, &tlast_lo, min_present)?;

            self.trs[t].rseg = Some(si);
            self.trs[tn].lseg = Some(si);
        }

        let tfirst_r = tfirst_r
            .ok_or_else(|| TriangulationError::internal("Segment crossed no trapezoid"))?;
        if tlast_r.is_none() {
            return Err(TriangulationError::internal(
                "Segment never reached its lower endpoint",
            ));
        }

        self.merge_side(si, tfirst, &tlast_lo, Side::Left)?;
        self.merge_side(si, tfirst_r, &tlast_lo, Side::Right)?;

        self.ss[si].set_inserted();

        #[cfg(debug_assertions)]
        self.check_consistency();

        Ok(())
    }

    /// Distribute the freshly split trapezoid's old upper neighbors over the
    /// left piece `t` and right piece `tn`.
    fn thread_uppers(
        &mut self,
        si: Idx<Segment<C>>,
        t: Idx<Trapezoid<C>>,
        tn: Idx<Trapezoid<C>>,
        s_min: &Point<C>,
    ) -> Result<(), TriangulationError> {
        let eps = self.eps;
        match (self.trs[t].u0, self.trs[t].u1) {
            (Some(u0), Some(u1)) => {
                // the chain continues from the trapezoid split just above
                if let Some(extra) = self.trs[t].usave {
                    // a third neighbor was parked here by the previous step
                    if self.trs[t].uside == Side::Left {
                        self.trs[tn].u0 = Some(u1);
                        self.trs[tn].u1 = Some(extra);
                        self.trs[t].u1 = None;
                        self.trs[u0].d0 = Some(t);
                        self.trs[u1].d0 = Some(tn);
                        self.trs[extra].d0 = Some(tn);
                    } else {
                        self.trs[tn].u0 = Some(u1);
                        self.trs[tn].u1 = None;
                        self.trs[t].u0 = Some(extra);
                        self.trs[t].u1 = Some(u0);
                        self.trs[extra].d0 = Some(t);
                        self.trs[u0].d0 = Some(t);
                        self.trs[u1].d0 = Some(tn);
                    }
                    self.trs[t].usave = None;
                    self.trs[tn].usave = None;
                } else {
                    self.trs[tn].u0 = Some(u1);
                    self.trs[tn].u1 = None;
                    self.trs[t].u1 = None;
                    self.trs[u1].d0 = Some(tn);
                }
            }
            (Some(u0), None) => {
                if let (Some(td0), Some(_td1)) = (self.trs[u0].d0, self.trs[u0].d1) {
                    // upward cusp: an inserted segment already hangs down
                    // from the shared upper endpoint
                    let descends_right = match self.trs[td0].rseg {
                        Some(old) => !self.ss[old].is_left_of(s_min, eps),
                        None => false,
                    };
                    if descends_right {
                        // new segment is right of the old one: the strip
                        // between them is pinched shut at the top
                        self.trs[t].u0 = None;
                        self.trs[t].u1 = None;
                        self.trs[tn].u1 = None;
                        self.trs[u0].d1 = Some(tn);
                    } else {
                        self.trs[tn].u0 = None;
                        self.trs[tn].u1 = None;
                        self.trs[t].u1 = None;
                        self.trs[u0].d0 = Some(t);
                    }
                } else {
                    // endpoint split fresh above: both pieces hang from it
                    self.trs[u0].d0 = Some(t);
                    self.trs[u0].d1 = Some(tn);
                }
            }
            _ => {
                return Err(TriangulationError::internal(
                    "Threaded trapezoid has no upper neighbor",
                ))
            }
        }
        Ok(())
    }

    /// Wire the split pieces to the trapezoids below and decide where the
    /// segment continues. Returns the next trapezoid to split, or `None` once
    /// the lower endpoint is reached.
    #[allow(clippy::too_many_arguments)]
    fn thread_lowers(
        &mut self,
        si: Idx<Segment<C>>,
        t: Idx<Trapezoid<C>>,
        tn: Idx<Trapezoid<C>>,
        s_max: &Point<C>,
        s_min: &Point<C>,
        tlast_lo: &Point<C>,
        min_present: bool,
    ) -> Result<Option<Idx<Trapezoid<C>>>, TriangulationError> {
        let eps = self.eps;
        let lo = self.trs[t]
            .lo
            .ok_or_else(|| TriangulationError::internal("Threaded trapezoid has no lower level"))?;
        let at_bottom = min_present && lo.approx_eq(tlast_lo, eps);

        let next = match (self.trs[t].d0, self.trs[t].d1) {
            (None, None) => {
                return Err(TriangulationError::internal(
                    "Threaded trapezoid has no lower neighbor",
                ))
            }
            (Some(d), None) | (None, Some(d)) => {
                if at_bottom {
                    // the segment and the already-inserted contour neighbor
                    // sharing its lower endpoint meet there; the strip
                    // between them is pinched shut at the bottom
                    let adj = self.ss.neighbor_at_min(si);
                    if self.ss[adj].is_left_of(s_max, eps) {
                        self.trs[d].u0 = Some(t);
                        self.trs[tn].d0 = None;
                        self.trs[tn].d1 = None;
                    } else {
                        self.trs[d].u1 = Some(tn);
                        self.trs[t].d0 = None;
                        self.trs[t].d1 = None;
                    }
                    None
                } else {
                    if let (Some(a), Some(_b)) = (self.trs[d].u0, self.trs[d].u1) {
                        // d is about to see three upper neighbors; park the
                        // one the segment does not pass through until d
                        // itself is split
                        if a == t {
                            self.trs[d].usave = self.trs[d].u1;
                            self.trs[d].uside = Side::Left;
                        } else {
                            self.trs[d].usave = self.trs[d].u0;
                            self.trs[d].uside = Side::Right;
                        }
                    }
                    self.trs[d].u0 = Some(t);
                    self.trs[d].u1 = Some(tn);
                    Some(d)
                }
            }
            (Some(d0), Some(d1)) => {
                // two trapezoids below; find which one the segment enters
                let into_d0 = if (lo.y - s_max.y).abs() <= eps {
                    // no usable slope at this level; compare x directly
                    lo.x > s_max.x
                } else {
                    let yt = (lo.y - s_max.y) / (s_min.y - s_max.y);
                    let cx = s_max.x + yt * (s_min.x - s_max.x);
                    Point::new(cx, lo.y).lt(&lo, eps)
                };

                if at_bottom {
                    // the segment ends exactly at the vertex dividing d0/d1
                    self.trs[d0].u0 = Some(t);
                    self.trs[d0].u1 = None;
                    self.trs[d1].u0 = Some(tn);
                    self.trs[d1].u1 = None;
                    self.trs[t].d1 = None;
                    self.trs[tn].d0 = Some(d1);
                    self.trs[tn].d1 = None;
                    None
                } else if into_d0 {
                    self.trs[d0].u0 = Some(t);
                    self.trs[d0].u1 = Some(tn);
                    self.trs[d1].u0 = Some(tn);
                    self.trs[d1].u1 = None;
                    // t keeps only d0; tn sits over d0's right part (fixed up
                    // when d0 splits) and all of d1
                    self.trs[t].d1 = None;
                    Some(d0)
                } else {
                    self.trs[d0].u0 = Some(t);
                    self.trs[d0].u1 = None;
                    self.trs[d1].u0 = Some(t);
                    self.trs[d1].u1 = Some(tn);
                    // t keeps d0 and d1's left part; tn sits over d1's right
                    // part only (fixed up when d1 splits)
                    self.trs[tn].d0 = Some(d1);
                    self.trs[tn].d1 = None;
                    Some(d1)
                }
            }
        };
        Ok(next)
    }

    /// Fuse vertically adjacent pieces on one flank of the fresh segment
    /// whenever they share both bounding segments. The absorbed piece's sink
    /// has its one incoming DAG edge redirected onto the survivor's sink
    /// (nodes become shared) and the trapezoid is tombstoned.
    fn merge_side(
        &mut self,
        si: Idx<Segment<C>>,
        tfirst: Idx<Trapezoid<C>>,
        tlast_lo: &Point<C>,
        side: Side,
    ) -> Result<(), TriangulationError> {
        let eps = self.eps;
        let mut t = tfirst;
        loop {
            match self.trs[t].lo {
                Some(lo) if lo.ge(tlast_lo, eps) => {}
                _ => break,
            }

            let is_piece = |this: &Self, cand: Idx<Trapezoid<C>>| -> bool {
                match side {
                    Side::Left => this.trs[cand].rseg == Some(si),
                    Side::Right => this.trs[cand].lseg == Some(si),
                }
            };
            let tnext = match (self.trs[t].d0, self.trs[t].d1) {
                (Some(d0), _) if is_piece(self, d0) => d0,
                (_, Some(d1)) if is_piece(self, d1) => d1,
                _ => break,
            };

            if self.trs[t].lseg == self.trs[tnext].lseg
                && self.trs[t].rseg == self.trs[tnext].rseg
            {
                let dead_sink = self.trs[tnext].sink;
                let parent = match self.qs[dead_sink] {
                    QueryNode::Sink { parent, .. } => parent,
                    _ => {
                        return Err(TriangulationError::internal(
                            "Merged trapezoid's sink is not a sink",
                        ))
                    }
                };
                let live_sink = self.trs[t].sink;
                match &mut self.qs[parent] {
                    QueryNode::XNode { left, right, .. } => {
                        if *left == dead_sink {
                            *left = live_sink;
                        } else {
                            *right = live_sink;
                        }
                    }
                    QueryNode::YNode { above, below, .. } => {
                        if *above == dead_sink {
                            *above = live_sink;
                        } else {
                            *below = live_sink;
                        }
                    }
                    QueryNode::Sink { .. } => {
                        return Err(TriangulationError::internal(
                            "Sink node recorded as a parent",
                        ))
                    }
                }

                let nd0 = self.trs[tnext].d0;
                let nd1 = self.trs[tnext].d1;
                self.trs[t].d0 = nd0;
                self.trs[t].d1 = nd1;
                if let Some(nd0) = nd0 {
                    self.trs[nd0].replace_upper(tnext, t);
                }
                if let Some(nd1) = nd1 {
                    self.trs[nd1].replace_upper(tnext, t);
                }
                self.trs[t].lo = self.trs[tnext].lo;
                self.trs[tnext].state = TrapezoidState::Invalid;
                // keep t: it may absorb further pieces below
            } else {
                t = tnext;
            }
        }
        Ok(())
    }

    /// Is this trapezoid part of the polygon's interior? Only meaningful on
    /// the completed map. The right bound of an interior trapezoid runs
    /// upward in contour direction (interior lies left of every directed
    /// edge: CCW outer, CW holes).
    pub fn interior(&self, ti: Idx<Trapezoid<C>>) -> bool {
        let t = &self.trs[ti];
        t.is_valid()
            && t.lseg.is_some()
            && match t.rseg {
                Some(rseg) => self.ss[rseg].upward(),
                None => false,
            }
    }

    /// Inclusion query against the completed structure. Boundary points are
    /// classified deterministically but to an unspecified side.
    pub fn is_inside(&self, p: &Point<C>) -> bool {
        let ti = self.locate(p, p, self.root);
        self.interior(ti)
    }

    #[cfg(feature = "debugging")]
    pub fn query_structure_tree(&self) -> text_trees::TreeNode<String> {
        self.qs[self.root].as_text_tree(self.root, &self.qs)
    }

    #[cfg(debug_assertions)]
    fn check_consistency(&self) {
        for ti in self.trs.iter_index() {
            let t = &self.trs[ti];
            if !t.is_valid() {
                continue;
            }
            assert!(t.usave.is_none(), "{}: usave survived an insertion", ti);
            for d in [t.d0, t.d1].iter().flatten() {
                let d = *d;
                assert!(
                    self.trs[d].u0 == Some(ti) || self.trs[d].u1 == Some(ti),
                    "{}: lower neighbor {} does not point back",
                    ti,
                    d
                );
            }
            for u in [t.u0, t.u1].iter().flatten() {
                let u = *u;
                assert!(
                    self.trs[u].d0 == Some(ti) || self.trs[u].d1 == Some(ti),
                    "{}: upper neighbor {} does not point back",
                    ti,
                    u
                );
            }
            match &self.qs[t.sink] {
                QueryNode::Sink { ti: sink_ti, .. } => {
                    assert!(*sink_ti == ti, "{}: sink points at {}", ti, sink_ti)
                }
                _ => panic!("{}: sink reference is not a sink node", ti),
            }
        }
    }
}
