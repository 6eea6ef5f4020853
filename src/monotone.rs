use num_traits::{real::Real, One, Zero};
use smallvec::{smallvec, SmallVec};
use zot::Zot;

use crate::{
    errors::TriangulationError,
    idx::{Idx, IdxDisplay, SliceExt, VecExt},
    point::Point,
    segment::Segment,
    trapezoid::Trapezoid,
    trapezoidation::TrapezoidationState,
};

/// Vertex ids are segment ids: vertex `i` of the flattened input is the
/// contour origin of segment `i`.
type VertId<C> = Idx<Segment<C>>;

/// One link of a chain cycle. The cycles start out as the input contours and
/// are progressively split by diagonals; each traced cycle of the final
/// structure is one unimonotone polygon.
struct ChainLink<C: Real> {
    vi: VertId<C>,
    prev: Idx<ChainLink<C>>,
    next: Idx<ChainLink<C>>,
}

impl<C: Real> IdxDisplay for ChainLink<C> {
    fn fmt(f: &mut std::fmt::Formatter<'_>, idx: usize) -> std::fmt::Result {
        write!(f, "c{}", idx)
    }
}

/// A vertex's stake in one of the cycles passing through it. Every diagonal
/// endpoint adds another copy; `next_vi` caches where that copy's outgoing
/// chain edge leads, which is what the wedge search compares against.
struct VertexSlot<C: Real> {
    link: Idx<ChainLink<C>>,
    next_vi: VertId<C>,
}

/// Decreasing function of the counter-clockwise angle from `base -> along`
/// to `base -> toward`: cosine while the sine is positive, reflected below.
/// Maximizing it over a vertex's outgoing chain edges finds the wedge a
/// diagonal falls into.
fn pseudo_angle<C: Real>(base: &Point<C>, along: &Point<C>, toward: &Point<C>) -> C {
    let ax = along.x - base.x;
    let ay = along.y - base.y;
    let tx = toward.x - base.x;
    let ty = toward.y - base.y;
    let cos = (ax * tx + ay * ty) / (ax * ax + ay * ay).sqrt() / (tx * tx + ty * ty).sqrt();
    let two = C::one() + C::one();
    if ax * ty - ay * tx >= C::zero() {
        cos
    } else {
        -cos - two
    }
}

pub(crate) struct MonotoneChains<'a, C: Real> {
    state: &'a TrapezoidationState<C>,
    eps: C,
    links: Vec<ChainLink<C>>,
    slots: Vec<SmallVec<[VertexSlot<C>; 4]>>,
}

impl<'a, C: Real> MonotoneChains<'a, C> {
    /// Initialize one cycle per contour and splice in every diagonal the
    /// completed trapezoidal map calls for.
    pub fn build(state: &'a TrapezoidationState<C>, eps: C) -> Result<Self, TriangulationError> {
        let n = state.ss.len();
        let mut links = Vec::with_capacity(4 * n);
        let mut slots = Vec::with_capacity(n);
        for si in state.ss.iter_index() {
            let s = &state.ss[si];
            links.push(ChainLink {
                vi: si,
                prev: Idx::new(s.prev().usize()),
                next: Idx::new(s.next().usize()),
            });
            slots.push(smallvec![VertexSlot { link: Idx::new(si.usize()), next_vi: s.next() }]);
        }

        let mut chains = Self { state, eps, links, slots };

        for ti in state.trs.iter_index() {
            if !state.interior(ti) {
                continue;
            }
            let top = chains.top_witness(ti)?;
            let bottom = chains.bottom_witness(ti)?;
            let t = &state.trs[ti];
            let joined = |seg: Option<Idx<Segment<C>>>| match seg {
                Some(seg) => state.ss.vert_max(seg) == top && state.ss.vert_min(seg) == bottom,
                None => false,
            };
            if joined(t.lseg) || joined(t.rseg) {
                // the two witnesses are already adjacent along this side
                continue;
            }
            chains.insert_diagonal(top, bottom);
        }

        Ok(chains)
    }

    /// The vertex lying on a trapezoid's top edge, read off the neighbor
    /// structure: a cusp shares the side segments' upper endpoint, a pair of
    /// upper neighbors is divided by a segment ending on the edge, and a
    /// single upper neighbor means one side segment terminates here.
    fn top_witness(&self, ti: Idx<Trapezoid<C>>) -> Result<VertId<C>, TriangulationError> {
        let state = self.state;
        let t = &state.trs[ti];
        let (lseg, rseg) = match (t.lseg, t.rseg) {
            (Some(l), Some(r)) => (l, r),
            _ => return Err(TriangulationError::internal("Interior trapezoid missing a side")),
        };
        match t.uppers() {
            Zot::Zero => Ok(state.ss.vert_max(rseg)),
            Zot::Two(_, right) => {
                let divider = state.trs[right].lseg.ok_or_else(|| {
                    TriangulationError::internal("Upper neighbors lack a divider")
                })?;
                Ok(state.ss.vert_min(divider))
            }
            Zot::One(tu) => {
                let up = &state.trs[tu];
                if up.lseg == t.lseg && up.rseg != t.rseg {
                    Ok(state.ss.vert_max(rseg))
                } else if up.rseg == t.rseg && up.lseg != t.lseg {
                    Ok(state.ss.vert_max(lseg))
                } else {
                    Err(TriangulationError::internal(
                        "Cannot identify the vertex on a trapezoid's top edge",
                    ))
                }
            }
        }
    }

    /// Mirror of [Self::top_witness] for the bottom edge.
    fn bottom_witness(&self, ti: Idx<Trapezoid<C>>) -> Result<VertId<C>, TriangulationError> {
        let state = self.state;
        let t = &state.trs[ti];
        let (lseg, rseg) = match (t.lseg, t.rseg) {
            (Some(l), Some(r)) => (l, r),
            _ => return Err(TriangulationError::internal("Interior trapezoid missing a side")),
        };
        match t.lowers() {
            Zot::Zero => Ok(state.ss.vert_min(rseg)),
            Zot::Two(_, right) => {
                let divider = state.trs[right].lseg.ok_or_else(|| {
                    TriangulationError::internal("Lower neighbors lack a divider")
                })?;
                Ok(state.ss.vert_max(divider))
            }
            Zot::One(td) => {
                let down = &state.trs[td];
                if down.lseg == t.lseg && down.rseg != t.rseg {
                    Ok(state.ss.vert_min(rseg))
                } else if down.rseg == t.rseg && down.lseg != t.lseg {
                    Ok(state.ss.vert_min(lseg))
                } else {
                    Err(TriangulationError::internal(
                        "Cannot identify the vertex on a trapezoid's bottom edge",
                    ))
                }
            }
        }
    }

    /// Among the chain copies of `from`, the one whose outgoing edge opens
    /// the wedge containing the direction towards `toward`.
    fn wedge_slot(&self, from: VertId<C>, toward: VertId<C>) -> usize {
        let base = self.state.ss[from].origin();
        let target = *self.state.ss[toward].origin();
        let mut best: Option<(C, usize)> = None;
        for (k, slot) in self.slots[from.usize()].iter().enumerate() {
            let along = self.state.ss[slot.next_vi].origin();
            let angle = pseudo_angle(base, along, &target);
            if best.map_or(true, |(b, _)| angle > b) {
                best = Some((angle, k));
            }
        }
        best.map_or(0, |(_, k)| k)
    }

    /// Splice a diagonal between two vertices, splitting the cycle it lies
    /// in. Creates one fresh link per endpoint; the four re-linked pointers
    /// leave one cycle through `v0 -> v1` and one through `v1 -> v0`.
    fn insert_diagonal(&mut self, v0: VertId<C>, v1: VertId<C>) {
        let ip = self.wedge_slot(v0, v1);
        let iq = self.wedge_slot(v1, v0);
        let p = self.slots[v0.usize()][ip].link;
        let q = self.slots[v1.usize()][iq].link;

        let p_next = self.links[p].next;
        let q_prev = self.links[q].prev;

        // i's prev is patched once j exists
        let i = self.links.push_get_index(ChainLink { vi: v0, prev: p, next: p_next });
        let j = self.links.push_get_index(ChainLink { vi: v1, prev: q_prev, next: i });
        self.links[i].prev = j;
        self.links[p_next].prev = i;
        self.links[q_prev].next = j;
        self.links[p].next = q;
        self.links[q].prev = p;

        let i_next_vi = self.links[self.links[i].next].vi;
        self.slots[v0.usize()][ip].next_vi = v1;
        self.slots[v0.usize()].push(VertexSlot { link: i, next_vi: i_next_vi });
        self.slots[v1.usize()].push(VertexSlot { link: j, next_vi: v0 });
    }

    /// Trace every cycle once. Each cycle record carries the link positions
    /// of its topmost and bottommost vertices.
    pub fn cycles(&self) -> Result<Vec<Cycle<C>>, TriangulationError> {
        let eps = self.eps;
        let mut visited = vec![false; self.links.len()];
        let mut cycles = Vec::new();
        for start in self.links.iter_index() {
            if visited[start.usize()] {
                continue;
            }
            let mut pos = start;
            let mut len = 0;
            let mut posmax = start;
            let mut posmin = start;
            let mut max_pt = *self.state.ss[self.links[start].vi].origin();
            let mut min_pt = max_pt;
            loop {
                if len > self.links.len() {
                    return Err(TriangulationError::internal("Chain cycle does not close"));
                }
                visited[pos.usize()] = true;
                let pt = *self.state.ss[self.links[pos].vi].origin();
                if pt.gt(&max_pt, eps) {
                    max_pt = pt;
                    posmax = pos;
                }
                if pt.lt(&min_pt, eps) {
                    min_pt = pt;
                    posmin = pos;
                }
                len += 1;
                pos = self.links[pos].next;
                if pos == start {
                    break;
                }
            }
            if len < 3 {
                return Err(TriangulationError::internal("Degenerate chain cycle"));
            }
            cycles.push(Cycle { start, posmax, posmin, len });
        }
        Ok(cycles)
    }

    /// The vertex ids of one cycle in boundary order, starting anywhere.
    pub fn cycle_vertices(&self, cycle: &Cycle<C>) -> Vec<usize> {
        let mut out = Vec::with_capacity(cycle.len);
        let mut pos = cycle.start;
        for _ in 0..cycle.len {
            out.push(self.links[pos].vi.usize());
            pos = self.links[pos].next;
        }
        out
    }

    /// Triangulate every traced cycle with the linear-time reflex-chain
    /// sweep. Cycles are CCW and unimonotone: one side of the topmost vertex
    /// is a single edge, the other carries the remaining vertices.
    pub fn triangulate(&self) -> Result<Vec<[usize; 3]>, TriangulationError> {
        let mut triangles = Vec::with_capacity(self.links.len());
        for cycle in self.cycles()? {
            if cycle.len == 3 {
                let a = cycle.start;
                let b = self.links[a].next;
                let c = self.links[b].next;
                triangles.push([
                    self.links[a].vi.usize(),
                    self.links[b].vi.usize(),
                    self.links[c].vi.usize(),
                ]);
            } else {
                self.sweep_cycle(&cycle, &mut triangles)?;
            }
        }
        Ok(triangles)
    }

    /// Corner-cutting sweep over one unimonotone cycle: walk the long chain
    /// keeping a stack of not-yet-resolved vertices, emitting a triangle for
    /// every convex corner.
    fn sweep_cycle(
        &self,
        cycle: &Cycle<C>,
        triangles: &mut Vec<[usize; 3]>,
    ) -> Result<(), TriangulationError> {
        let links = &self.links;
        let origin = |pos: Idx<ChainLink<C>>| *self.state.ss[links[pos].vi].origin();

        // Which side of the topmost vertex is the single edge? Walking `next`
        // from the top descends one side; if that first step already reaches
        // the bottom, the walk continues up the other chain.
        let mut rc: SmallVec<[Idx<ChainLink<C>>; 16]> = smallvec![];
        let first_down = links[cycle.posmax].next;
        let (mut vpos, endv) = if first_down == cycle.posmin {
            let second = links[first_down].next;
            rc.push(first_down);
            rc.push(second);
            (links[second].next, links[cycle.posmax].vi)
        } else {
            rc.push(cycle.posmax);
            rc.push(first_down);
            (links[first_down].next, links[links[cycle.posmax].prev].vi)
        };

        let mut v = links[vpos].vi;
        let mut steps = 0;
        while v != endv || rc.len() > 2 {
            steps += 1;
            if steps > 4 * cycle.len {
                return Err(TriangulationError::internal(
                    "Non-monotone cycle reached the triangulator",
                ));
            }
            if rc.len() > 1 {
                let a = rc[rc.len() - 2];
                let b = rc[rc.len() - 1];
                let vp = origin(vpos);
                if vp.cross(&origin(a), &origin(b)) > C::zero() {
                    // convex corner: cut it off
                    triangles.push([links[a].vi.usize(), links[b].vi.usize(), v.usize()]);
                    rc.pop();
                } else {
                    rc.push(vpos);
                    vpos = links[vpos].next;
                    v = links[vpos].vi;
                }
            } else {
                rc.push(vpos);
                vpos = links[vpos].next;
                v = links[vpos].vi;
            }
        }

        let a = rc[rc.len() - 2];
        let b = rc[rc.len() - 1];
        triangles.push([links[a].vi.usize(), links[b].vi.usize(), v.usize()]);
        Ok(())
    }
}

pub(crate) struct Cycle<C: Real> {
    start: Idx<ChainLink<C>>,
    posmax: Idx<ChainLink<C>>,
    posmin: Idx<ChainLink<C>>,
    pub len: usize,
}
