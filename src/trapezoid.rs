use std::fmt;

use num_traits::real::Real;
use zot::Zot;

use crate::{idx::{Idx, IdxDisplay}, point::Point, querynode::QueryNode, segment::Segment};

/// Whether a trapezoid is still part of the decomposition.
///
/// Merged-away trapezoids are tombstoned rather than freed: in-flight
/// references created earlier in the same insertion may still read them, and
/// stale query-structure paths may still pass through their old sinks. A
/// tombstone keeps its fields intact; it is reclaimed only when the whole
/// build is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TrapezoidState {
    Valid,
    Invalid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    Left,
    Right,
}

/// A maximal region bounded by at most one segment on each side and by the
/// horizontal levels of at most one vertex above (`hi`) and below (`lo`);
/// `None` extents are unbounded. Up to two neighbors above and below, since
/// a vertex on the boundary level can split the adjacency in two.
///
/// `usave`/`uside` are scratch used only while threading a segment through:
/// a trapezoid briefly sees three upper neighbors when the segment's upper
/// endpoint sits strictly inside its top edge, and the third is parked here
/// until the trapezoid itself is split.
#[derive(Debug, Clone)]
pub(crate) struct Trapezoid<C: Real> {
    pub lseg: Option<Idx<Segment<C>>>,
    pub rseg: Option<Idx<Segment<C>>>,
    pub hi: Option<Point<C>>,
    pub lo: Option<Point<C>>,
    pub u0: Option<Idx<Trapezoid<C>>>,
    pub u1: Option<Idx<Trapezoid<C>>>,
    pub d0: Option<Idx<Trapezoid<C>>>,
    pub d1: Option<Idx<Trapezoid<C>>>,
    pub sink: Idx<QueryNode<C>>,
    pub usave: Option<Idx<Trapezoid<C>>>,
    pub uside: Side,
    pub state: TrapezoidState,
}

impl<C: Real> IdxDisplay for Trapezoid<C> {
    fn fmt(f: &mut fmt::Formatter<'_>, idx: usize) -> fmt::Result {
        write!(f, "t{}", idx)
    }
}

impl<C: Real> Trapezoid<C> {
    /// The unbounded plane, before any segment exists
    pub fn all(sink: Idx<QueryNode<C>>) -> Self {
        Self {
            lseg: None,
            rseg: None,
            hi: None,
            lo: None,
            u0: None,
            u1: None,
            d0: None,
            d1: None,
            sink,
            usave: None,
            uside: Side::Left,
            state: TrapezoidState::Valid,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.state == TrapezoidState::Valid
    }

    pub fn uppers(&self) -> Zot<Idx<Trapezoid<C>>> {
        Zot::from_options(self.u0, self.u1)
    }

    pub fn lowers(&self) -> Zot<Idx<Trapezoid<C>>> {
        Zot::from_options(self.d0, self.d1)
    }

    /// Repoint whichever upper-neighbor slot referenced `old`
    pub fn replace_upper(&mut self, old: Idx<Trapezoid<C>>, new: Idx<Trapezoid<C>>) {
        if self.u0 == Some(old) {
            self.u0 = Some(new);
        } else if self.u1 == Some(old) {
            self.u1 = Some(new);
        }
    }
}

impl<C: Real> fmt::Display for Trapezoid<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.hi {
            Some(hi) => writeln!(f, "-{}-", hi)?,
            None => writeln!(f, "-open-")?,
        }
        if let Some(lseg) = self.lseg {
            write!(f, "[{}]", lseg)?;
        }
        write!(f, "{}", self.sink)?;
        if let Some(rseg) = self.rseg {
            write!(f, "[{}]", rseg)?;
        }
        writeln!(f)?;
        match &self.lo {
            Some(lo) => write!(f, "-{}-", lo),
            None => write!(f, "-open-"),
        }
    }
}
