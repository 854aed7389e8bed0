use nalgebra_glm as glm;
use log::*;
use crate::geometry::*;
use crate::planview::*;
use crate::{fix_angle, EPS};

#[derive(Debug, Clone, PartialEq)]
pub enum GeomErr {
    /// The heading rays of the two poses do not meet in front of both.
    NoIntersection(Pose, Pose),
    /// Start and end pose coincide.
    Degenerate(Pose),
}

impl std::fmt::Display for GeomErr {
    fn fmt(&self, f :&mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            GeomErr::NoIntersection(a, b) =>
                write!(f, "cannot connect ({:.2},{:.2}) to ({:.2},{:.2}): heading rays do not meet",
                       a.x, a.y, b.x, b.y),
            GeomErr::Degenerate(a) =>
                write!(f, "cannot connect ({:.2},{:.2}) to itself", a.x, a.y),
        }
    }
}

impl std::error::Error for GeomErr {}

fn cross(a :&glm::DVec2, b :&glm::DVec2) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Reference line leading from pose `a` to pose `b`.
///
/// Collinear poses are joined by a line, parallel but shifted poses by two
/// opposite arcs, all others by line, arc, line where the arc is tangent to
/// both heading rays. Arcs tighter than `min_radius` are logged.
pub fn connect(a :Pose, b :Pose, min_radius :f64) -> Result<PlanView, GeomErr> {
    let d = b.pt() - a.pt();
    let dist = glm::length(&d);
    if dist < EPS { return Err(GeomErr::Degenerate(a)); }

    let (ua, ub) = (a.dir(), b.dir());
    let dphi = fix_angle(b.hdg - a.hdg);
    let mut pv = PlanView::new();

    if dphi.abs() < 1e-6 {
        let along = glm::dot(&d, &ua);
        let lateral = cross(&ua, &d);
        if along <= EPS { return Err(GeomErr::NoIntersection(a, b)); }
        if lateral.abs() < 1e-6 {
            pv.push(a, dist, Curve::Line);
        } else {
            // s-curve: two arcs of equal radius turning by +theta and -theta
            let theta = 2.0 * (lateral / along).atan();
            let r = along / (2.0 * theta.abs().sin());
            check_radius(r, min_radius);
            let c = theta.signum() / r;
            pv.push(a, r * theta.abs(), Curve::Arc { curvature: c });
            pv.push(a, r * theta.abs(), Curve::Arc { curvature: -c });
        }
        return Ok(pv);
    }

    let denom = cross(&ua, &ub);
    if denom.abs() < EPS { return Err(GeomErr::NoIntersection(a, b)); }
    let t = cross(&d, &ub) / denom;
    let s = cross(&d, &ua) / -denom;
    if t < -1e-6 || s < -1e-6 { return Err(GeomErr::NoIntersection(a, b)); }

    let tangent = t.min(s).max(0.0);
    let r = tangent / (0.5 * dphi.abs()).tan();
    if r < EPS { return Err(GeomErr::NoIntersection(a, b)); }
    check_radius(r, min_radius);

    if t - tangent > 1e-6 { pv.push(a, t - tangent, Curve::Line); }
    pv.push(a, r * dphi.abs(), Curve::Arc { curvature: dphi.signum() / r });
    if s - tangent > 1e-6 { pv.push(a, s - tangent, Curve::Line); }
    Ok(pv)
}

fn check_radius(r :f64, min_radius :f64) {
    if r < min_radius {
        warn!("Radius {:.2} is too small in arc generation (minimum {:.2}).", r, min_radius);
    }
}
