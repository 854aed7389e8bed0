//! Plan-view geometry for generated roads.
//!
//! A road's reference line is a sequence of [`Geometry`] elements (lines,
//! arcs and spirals), each starting at a [`Pose`]. The [`PlanView`]
//! collects them and supports cutting, reversing and placing a reference
//! line in another coordinate frame. [`connect`] builds the geometry of
//! junction connecting roads.

pub mod geometry;
pub mod planview;
pub mod connect;

pub use geometry::*;
pub use planview::*;
pub use connect::*;

use std::f64::consts::PI;

/// Normalize an angle into the interval (-pi, pi].
pub fn fix_angle(a :f64) -> f64 {
    let mut a = a % (2.0 * PI);
    if a > PI { a -= 2.0 * PI; }
    if a <= -PI { a += 2.0 * PI; }
    a
}

pub const EPS :f64 = 1e-9;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fix_angle_range() {
        assert!((fix_angle(3.0 * PI) - PI).abs() < 1e-12);
        assert!((fix_angle(-PI) - PI).abs() < 1e-12);
        assert!((fix_angle(2.0 * PI + 0.5) - 0.5).abs() < 1e-12);
        assert!((fix_angle(-0.5) + 0.5).abs() < 1e-12);
    }
}
