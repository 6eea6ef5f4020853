use std::{error, fmt};

use backtrace::Backtrace;

/// Describes an error which occurred while building a [Triangulation](crate::Triangulation)
#[derive(Debug)]
#[non_exhaustive]
pub enum TriangulationError {
    /// A contour was encountered with fewer than 3 vertices
    NotEnoughVertices {
        /// Position of the offending contour in the input
        contour: usize,
        /// Number of vertices it actually contains
        count: usize,
    },
    /// Two consecutive contour points coincide (within tolerance), which would
    /// produce a zero-length edge
    RepeatedVertex {
        /// Position of the offending contour in the input
        contour: usize,
        /// Position of the repeated vertex within that contour
        vertex: usize,
    },
    /// A contour does not respect the winding contract: the outer contour must
    /// be counter-clockwise and every hole clockwise
    InvalidWinding {
        /// Position of the offending contour in the input
        contour: usize,
    },
    /// One of the pre-sized build arenas overflowed its capacity bound.
    ///
    /// The arenas are sized for the linear growth that randomized insertion
    /// delivers in expectation; a pathological insertion order can exceed it,
    /// in which case the build fails rather than degrading silently.
    CapacityExceeded {
        /// Which arena overflowed
        store: &'static str,
        /// The capacity it was sized to
        capacity: usize,
    },
    /// A precondition was violated in the provided contours, or a
    /// trapezoidation bug was encountered.
    InternalError(InternalError),
}

impl error::Error for TriangulationError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::InternalError(error) => Some(error),
            _ => None,
        }
    }
}

impl fmt::Display for TriangulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotEnoughVertices { contour, count } => {
                write!(f, "Contour {} only contains {} vertices", contour, count)
            }
            Self::RepeatedVertex { contour, vertex } => {
                write!(f, "Contour {} repeats the point at vertex {}", contour, vertex)
            }
            Self::InvalidWinding { contour } => {
                if *contour == 0 {
                    write!(f, "Outer contour must be wound counter-clockwise")
                } else {
                    write!(f, "Hole contour {} must be wound clockwise", contour)
                }
            }
            Self::CapacityExceeded { store, capacity } => {
                write!(f, "The {} arena exceeded its capacity of {}", store, capacity)
            }
            Self::InternalError(error) => fmt::Display::fmt(error, f),
        }
    }
}

impl From<InternalError> for TriangulationError {
    fn from(e: InternalError) -> Self {
        Self::InternalError(e)
    }
}

#[derive(Debug)]
pub struct InternalError {
    pub msg: String,
    pub backtrace: Backtrace,
}

impl InternalError {
    #[cold]
    #[inline(always)]
    pub(crate) fn new(msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            backtrace: Backtrace::new_unresolved(),
        }
    }
}

impl fmt::Display for InternalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{:?}", self.msg, self.backtrace)
    }
}

impl error::Error for InternalError { }

impl TriangulationError {
    #[cold]
    #[inline(always)]
    pub(crate) fn internal(msg: impl Into<String>) -> Self {
        TriangulationError::InternalError(InternalError::new(msg))
    }
}
