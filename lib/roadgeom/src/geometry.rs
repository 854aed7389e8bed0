use serde::{Serialize, Deserialize};
use nalgebra_glm as glm;
use crate::fix_angle;

#[derive(Serialize, Deserialize)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub x :f64,
    pub y :f64,
    pub hdg :f64,
}

impl Pose {
    pub fn new(x :f64, y :f64, hdg :f64) -> Pose {
        Pose { x, y, hdg }
    }

    pub fn origin() -> Pose {
        Pose::new(0.0, 0.0, 0.0)
    }

    pub fn pt(&self) -> glm::DVec2 {
        glm::vec2(self.x, self.y)
    }

    pub fn dir(&self) -> glm::DVec2 {
        glm::vec2(self.hdg.cos(), self.hdg.sin())
    }

    /// Same position, heading turned around.
    pub fn flipped(&self) -> Pose {
        Pose::new(self.x, self.y, fix_angle(self.hdg + std::f64::consts::PI))
    }

    /// Rotate about the origin by `dphi`, then translate.
    pub fn transformed(&self, dphi :f64, dx :f64, dy :f64) -> Pose {
        let p = glm::rotate_vec2(&self.pt(), dphi);
        Pose::new(p.x + dx, p.y + dy, fix_angle(self.hdg + dphi))
    }

    pub fn distance(&self, other :&Pose) -> f64 {
        glm::distance(&self.pt(), &other.pt())
    }
}

#[derive(Serialize, Deserialize)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Curve {
    Line,
    Arc { curvature :f64 },
    Spiral { curv_start :f64, curv_end :f64 },
}

#[derive(Serialize, Deserialize)]
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    pub s :f64,
    pub x :f64,
    pub y :f64,
    pub hdg :f64,
    pub length :f64,
    pub curve :Curve,
}

// simpson steps per meter of spiral, always rounded up to an even count
const SPIRAL_STEPS_PER_M :f64 = 2.0;
const SPIRAL_MIN_STEPS :usize = 16;

impl Geometry {
    pub fn new(s :f64, start :Pose, length :f64, curve :Curve) -> Geometry {
        Geometry { s, x: start.x, y: start.y, hdg: start.hdg, length, curve }
    }

    pub fn start_pose(&self) -> Pose {
        Pose::new(self.x, self.y, self.hdg)
    }

    pub fn end_pose(&self) -> Pose {
        self.pose_at(self.length)
    }

    /// Curvature at distance `ds` from the element start.
    pub fn curvature_at(&self, ds :f64) -> f64 {
        match self.curve {
            Curve::Line => 0.0,
            Curve::Arc { curvature } => curvature,
            Curve::Spiral { curv_start, curv_end } => {
                if self.length <= 0.0 { return curv_start; }
                curv_start + (curv_end - curv_start) * ds / self.length
            },
        }
    }

    pub fn pose_at(&self, ds :f64) -> Pose {
        let hdg = self.hdg;
        match self.curve {
            Curve::Line => Pose::new(self.x + ds * hdg.cos(), self.y + ds * hdg.sin(), hdg),
            Curve::Arc { curvature: c } => {
                if c.abs() < 1e-12 {
                    return Pose::new(self.x + ds * hdg.cos(), self.y + ds * hdg.sin(), hdg);
                }
                let hdg1 = hdg + c * ds;
                Pose::new(self.x + (hdg1.sin() - hdg.sin()) / c,
                          self.y - (hdg1.cos() - hdg.cos()) / c,
                          fix_angle(hdg1))
            },
            Curve::Spiral { curv_start, .. } => {
                let dk = if self.length > 0.0 {
                    (self.curvature_at(self.length) - curv_start) / self.length
                } else { 0.0 };
                let theta = |u :f64| hdg + curv_start * u + 0.5 * dk * u * u;

                let mut n = ((ds.abs() * SPIRAL_STEPS_PER_M).ceil() as usize).max(SPIRAL_MIN_STEPS);
                if n % 2 == 1 { n += 1; }
                let h = ds / n as f64;
                let (mut sx, mut sy) = (0.0, 0.0);
                for i in 0..=n {
                    let w = if i == 0 || i == n { 1.0 } else if i % 2 == 1 { 4.0 } else { 2.0 };
                    let t = theta(i as f64 * h);
                    sx += w * t.cos();
                    sy += w * t.sin();
                }
                Pose::new(self.x + sx * h / 3.0, self.y + sy * h / 3.0, fix_angle(theta(ds)))
            },
        }
    }

    /// The part of this element covering `[0, len]`.
    pub fn truncate(&self, len :f64) -> Geometry {
        let len = len.max(0.0).min(self.length);
        let curve = match self.curve {
            Curve::Spiral { curv_start, .. } =>
                Curve::Spiral { curv_start, curv_end: self.curvature_at(len) },
            c => c,
        };
        Geometry { length: len, curve, ..self.clone() }
    }

    /// The part of this element covering `[ds, length]`.
    pub fn split(&self, ds :f64) -> Geometry {
        let ds = ds.max(0.0).min(self.length);
        let curve = match self.curve {
            Curve::Spiral { curv_end, .. } =>
                Curve::Spiral { curv_start: self.curvature_at(ds), curv_end },
            c => c,
        };
        Geometry::new(self.s + ds, self.pose_at(ds), self.length - ds, curve)
    }

    /// The same element travelled from its end back to its start.
    pub fn reversed(&self) -> Geometry {
        let curve = match self.curve {
            Curve::Line => Curve::Line,
            Curve::Arc { curvature } => Curve::Arc { curvature: -curvature },
            Curve::Spiral { curv_start, curv_end } =>
                Curve::Spiral { curv_start: -curv_end, curv_end: -curv_start },
        };
        Geometry::new(self.s, self.end_pose().flipped(), self.length, curve)
    }

    pub fn transform(&mut self, dphi :f64, dx :f64, dy :f64) {
        let p = self.start_pose().transformed(dphi, dx, dy);
        self.x = p.x;
        self.y = p.y;
        self.hdg = p.hdg;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn close(a :Pose, b :Pose, tol :f64) -> bool {
        (a.x - b.x).abs() < tol && (a.y - b.y).abs() < tol && fix_angle(a.hdg - b.hdg).abs() < tol
    }

    #[test]
    fn quarter_circle() {
        let g = Geometry::new(0.0, Pose::origin(), 0.5 * PI * 10.0, Curve::Arc { curvature: 0.1 });
        assert!(close(g.end_pose(), Pose::new(10.0, 10.0, 0.5 * PI), 1e-9));
    }

    #[test]
    fn spiral_with_constant_curvature_matches_arc() {
        let arc = Geometry::new(0.0, Pose::new(3.0, -2.0, 0.3), 40.0, Curve::Arc { curvature: -0.02 });
        let spiral = Geometry { curve: Curve::Spiral { curv_start: -0.02, curv_end: -0.02 }, ..arc.clone() };
        assert!(close(arc.end_pose(), spiral.end_pose(), 1e-6));
    }

    #[test]
    fn spiral_heading() {
        let g = Geometry::new(0.0, Pose::origin(), 30.0, Curve::Spiral { curv_start: 0.0, curv_end: 0.02 });
        // heading grows with the integral of the curvature
        assert!((g.end_pose().hdg - 0.5 * 0.02 * 30.0).abs() < 1e-12);
        assert!(g.end_pose().y > 0.0);
    }

    #[test]
    fn reversed_spiral_returns_to_start() {
        let g = Geometry::new(0.0, Pose::new(1.0, 2.0, 0.2), 25.0, Curve::Spiral { curv_start: 0.01, curv_end: 0.04 });
        let r = g.reversed();
        assert!(close(r.end_pose(), g.start_pose().flipped(), 1e-6));
    }

    #[test]
    fn split_and_truncate_meet() {
        let g = Geometry::new(0.0, Pose::origin(), 50.0, Curve::Spiral { curv_start: 0.0, curv_end: 0.03 });
        let head = g.truncate(20.0);
        let tail = g.split(20.0);
        assert!(close(head.end_pose(), tail.start_pose(), 1e-6));
        assert!(close(tail.end_pose(), g.end_pose(), 1e-6));
        assert!((tail.s - 20.0).abs() < 1e-12);
    }
}
