use core::fmt;

use num_traits::real::Real;

use crate::{idx::{Idx, IdxDisplay}, point::Point, segment::Segment, trapezoid::Trapezoid};

/// One node of the point-location search structure.
///
/// The structure starts as a tree but becomes a DAG as soon as trapezoids
/// merge: the absorbed trapezoid's sink has its incoming edge redirected onto
/// the survivor's sink, which from then on has several parents. Interior
/// nodes never need their parent, so only sinks record one; a sink is only
/// ever redirected while it still has the single parent it was created
/// under.
#[derive(Debug, Clone)]
pub(crate) enum QueryNode<C: Real> {
    /// Decides above/below against a vertex
    YNode {
        yval: Point<C>,
        above: Idx<QueryNode<C>>,
        below: Idx<QueryNode<C>>,
    },
    /// Decides left/right against a segment
    XNode {
        si: Idx<Segment<C>>,
        left: Idx<QueryNode<C>>,
        right: Idx<QueryNode<C>>,
    },
    /// Leaf: one live trapezoid
    Sink {
        ti: Idx<Trapezoid<C>>,
        parent: Idx<QueryNode<C>>,
    },
}

impl<C: Real> IdxDisplay for QueryNode<C> {
    fn fmt(f: &mut fmt::Formatter<'_>, idx: usize) -> fmt::Result {
        write!(f, "q{}", idx)
    }
}

impl<C: Real> fmt::Display for QueryNode<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::YNode { yval, .. } => write!(f, "Y({})", yval),
            Self::XNode { si, .. } => write!(f, "X({})", si),
            Self::Sink { ti, .. } => write!(f, "S({})", ti),
        }
    }
}

#[cfg(feature = "debugging")]
impl<C: Real> QueryNode<C> {
    pub fn as_text_tree(&self, qi: Idx<Self>, qs: &[Self]) -> text_trees::TreeNode<String> {
        let label = format!("[{}] {}", qi, self);
        match self {
            QueryNode::YNode { above, below, .. } => text_trees::TreeNode::with_child_nodes(
                label,
                vec![
                    qs[*below].as_text_tree(*below, qs),
                    qs[*above].as_text_tree(*above, qs),
                ]
                .into_iter(),
            ),
            QueryNode::XNode { left, right, .. } => text_trees::TreeNode::with_child_nodes(
                label,
                vec![
                    qs[*left].as_text_tree(*left, qs),
                    qs[*right].as_text_tree(*right, qs),
                ]
                .into_iter(),
            ),
            QueryNode::Sink { .. } => label.into(),
        }
    }
}
