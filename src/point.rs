use core::fmt;

use num_traits::{real::Real, NumCast};

/// The comparison fuzz used for every coordinate comparison, in f64 terms.
/// Cast into the coordinate type once per build; see [tolerance].
const TOLERANCE: f64 = 1.0e-7;

pub(crate) fn tolerance<C: Real>() -> C {
    <C as NumCast>::from(TOLERANCE).unwrap_or_else(C::epsilon)
}

/// A concrete 2-d point in the coordinate type of the build.
///
/// The ordering used everywhere in the crate is y-major lexicographic:
/// a point is "above" another if its y is greater, with x breaking exact
/// ties. This is what gives horizontal edges and equal-y vertices a
/// consistent, unambiguous level in the trapezoidal decomposition.
#[derive(Clone, Copy, PartialEq)]
pub(crate) struct Point<C: Real> {
    pub x: C,
    pub y: C,
}

impl<C: Real> Point<C> {
    pub fn new(x: C, y: C) -> Self {
        Self { x, y }
    }

    /// `self` strictly above `other` in the y-major order, fuzzed by `eps`
    pub fn gt(&self, other: &Self, eps: C) -> bool {
        if self.y > other.y + eps {
            true
        } else if self.y < other.y - eps {
            false
        } else {
            self.x > other.x
        }
    }

    /// `self` at or above `other` in the y-major order
    pub fn ge(&self, other: &Self, eps: C) -> bool {
        if self.y > other.y + eps {
            true
        } else if self.y < other.y - eps {
            false
        } else {
            self.x >= other.x
        }
    }

    /// `self` strictly below `other` in the y-major order
    pub fn lt(&self, other: &Self, eps: C) -> bool {
        if self.y < other.y - eps {
            true
        } else if self.y > other.y + eps {
            false
        } else {
            self.x < other.x
        }
    }

    /// Both coordinates within `eps` of each other
    pub fn approx_eq(&self, other: &Self, eps: C) -> bool {
        (self.y - other.y).abs() <= eps && (self.x - other.x).abs() <= eps
    }

    /// z of (v1 - self) x (v2 - self); positive when the turn
    /// self -> v1 -> v2 is counter-clockwise
    pub fn cross(&self, v1: &Self, v2: &Self) -> C {
        (v1.x - self.x) * (v2.y - self.y) - (v1.y - self.y) * (v2.x - self.x)
    }
}

impl<C: Real> fmt::Debug for Point<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tuple = f.debug_tuple("Point");
        if let Some(x) = self.x.to_f64() {
            tuple.field(&x);
        }
        if let Some(y) = self.y.to_f64() {
            tuple.field(&y);
        }
        tuple.finish()
    }
}

impl<C: Real> fmt::Display for Point<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let (Some(x), Some(y)) = (self.x.to_f64(), self.y.to_f64()) {
            write!(f, "({}, {})", x, y)
        } else {
            write!(f, "Point<{}>", std::any::type_name::<C>())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn y_major_order() {
        let eps = tolerance::<f64>();
        let low = Point::new(5.0, 0.0);
        let high = Point::new(-5.0, 1.0);
        assert!(high.gt(&low, eps));
        assert!(low.lt(&high, eps));
        assert!(!low.gt(&high, eps));
    }

    #[test]
    fn x_breaks_exact_y_ties() {
        let eps = tolerance::<f64>();
        let left = Point::new(0.0, 1.0);
        let right = Point::new(1.0, 1.0);
        assert!(right.gt(&left, eps));
        assert!(right.ge(&left, eps));
        assert!(left.lt(&right, eps));
        assert!(!left.gt(&right, eps));
    }

    #[test]
    fn fuzz_absorbs_tiny_y_differences() {
        let eps = tolerance::<f64>();
        let a = Point::new(1.0, 1.0);
        let b = Point::new(0.0, 1.0 + eps / 2.0);
        // y difference is below tolerance, so x decides
        assert!(a.gt(&b, eps));
    }

    #[test]
    fn cross_sign() {
        let o = Point::new(0.0, 0.0);
        let a = Point::new(1.0, 0.0);
        let b = Point::new(0.0, 1.0);
        assert!(o.cross(&a, &b) > 0.0);
        assert!(o.cross(&b, &a) < 0.0);
    }
}
