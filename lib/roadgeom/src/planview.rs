use serde::{Serialize, Deserialize};
use crate::geometry::*;
use crate::EPS;

/// Reference line of a road as consecutive geometry elements.
#[derive(Serialize, Deserialize)]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlanView {
    pub geometries :Vec<Geometry>,
}

impl PlanView {
    pub fn new() -> PlanView {
        PlanView { geometries: Vec::new() }
    }

    pub fn length(&self) -> f64 {
        self.geometries.iter().map(|g| g.length).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.geometries.is_empty()
    }

    pub fn start_pose(&self) -> Option<Pose> {
        self.geometries.first().map(|g| g.start_pose())
    }

    pub fn end_pose(&self) -> Option<Pose> {
        self.geometries.last().map(|g| g.end_pose())
    }

    /// Append an element continuing from the current end (or from `origin`
    /// if the plan view is empty).
    pub fn push(&mut self, origin :Pose, length :f64, curve :Curve) {
        let start = self.end_pose().unwrap_or(origin);
        let s = self.length();
        self.geometries.push(Geometry::new(s, start, length, curve));
    }

    /// Pose on the reference line at `s` (clamped to the line).
    pub fn pose_at(&self, s :f64) -> Option<Pose> {
        let last = self.geometries.last()?;
        for g in &self.geometries {
            if s <= g.s + g.length {
                return Some(g.pose_at((s - g.s).max(0.0)));
            }
        }
        Some(last.end_pose())
    }

    /// The reference line between `from` and `to`, s values starting at zero.
    /// With `from > to` the part is travelled backwards.
    pub fn cut(&self, from :f64, to :f64) -> PlanView {
        if from > to {
            let mut geometries = self.cut(to, from).geometries.into_iter()
                .rev().map(|g| g.reversed()).collect::<Vec<_>>();
            restart_s(&mut geometries);
            return PlanView { geometries };
        }

        let mut geometries = Vec::new();
        for g in &self.geometries {
            let (g0, g1) = (g.s, g.s + g.length);
            if g1 <= from + EPS || g0 >= to - EPS { continue; }
            let mut piece = g.clone();
            if from > g0 { piece = piece.split(from - g0); }
            if to < g1 { piece = piece.truncate(to - piece.s); }
            if piece.length > EPS { geometries.push(piece); }
        }
        restart_s(&mut geometries);
        PlanView { geometries }
    }

    /// Rotate the whole line about the origin by `dphi`, then translate it.
    pub fn transform(&mut self, dphi :f64, dx :f64, dy :f64) {
        for g in self.geometries.iter_mut() {
            g.transform(dphi, dx, dy);
        }
    }

    /// Move the line rigidly so that the pose at `s` becomes `target`.
    pub fn place(&mut self, s :f64, target :Pose) {
        if let Some(p) = self.pose_at(s) {
            let dphi = target.hdg - p.hdg;
            let rotated = p.transformed(dphi, 0.0, 0.0);
            self.transform(dphi, target.x - rotated.x, target.y - rotated.y);
        }
    }

    /// Largest gap between consecutive elements, in meters.
    pub fn max_gap(&self) -> f64 {
        self.geometries.windows(2)
            .map(|w| w[0].end_pose().distance(&w[1].start_pose()))
            .fold(0.0, f64::max)
    }
}

pub fn restart_s(geometries :&mut [Geometry]) {
    let mut s = 0.0;
    for g in geometries.iter_mut() {
        g.s = s;
        s += g.length;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fix_angle;

    fn line_arc_line() -> PlanView {
        let mut pv = PlanView::new();
        pv.push(Pose::origin(), 10.0, Curve::Line);
        pv.push(Pose::origin(), 20.0, Curve::Arc { curvature: 0.05 });
        pv.push(Pose::origin(), 15.0, Curve::Line);
        pv
    }

    #[test]
    fn cut_inside() {
        let pv = line_arc_line();
        let part = pv.cut(5.0, 35.0);
        assert!((part.length() - 30.0).abs() < 1e-9);
        assert_eq!(part.geometries.len(), 3);
        let a = part.end_pose().unwrap();
        let b = pv.pose_at(35.0).unwrap();
        assert!(a.distance(&b) < 1e-9);
        assert!(part.max_gap() < 1e-9);
    }

    #[test]
    fn cut_backwards() {
        let pv = line_arc_line();
        let back = pv.cut(25.0, 0.0);
        assert!((back.length() - 25.0).abs() < 1e-9);
        let start = back.start_pose().unwrap();
        let expected = pv.pose_at(25.0).unwrap().flipped();
        assert!(start.distance(&expected) < 1e-9);
        assert!(fix_angle(start.hdg - expected.hdg).abs() < 1e-9);
        assert!(back.end_pose().unwrap().distance(&Pose::origin()) < 1e-9);
        assert!(back.max_gap() < 1e-9);
    }

    #[test]
    fn place_moves_pose() {
        let mut pv = line_arc_line();
        let target = Pose::new(100.0, -40.0, 1.0);
        pv.place(20.0, target);
        let p = pv.pose_at(20.0).unwrap();
        assert!(p.distance(&target) < 1e-9);
        assert!(fix_angle(p.hdg - target.hdg).abs() < 1e-9);
    }
}
