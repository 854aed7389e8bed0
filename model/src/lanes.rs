use serde::{Serialize, Deserialize};
use crate::Id;

/// Cubic polynomial `a + b*ds + c*ds^2 + d*ds^3` starting at `s`.
#[derive(Serialize, Deserialize)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Poly3 {
    pub s :f64,
    pub a :f64,
    pub b :f64,
    pub c :f64,
    pub d :f64,
}

impl Poly3 {
    pub fn constant(a :f64) -> Poly3 {
        Poly3 { a, ..Default::default() }
    }

    /// Smooth transition from `from` to `to` over `length` with zero slope at both ends.
    pub fn transition(from :f64, to :f64, length :f64) -> Poly3 {
        if length <= 0.0 { return Poly3::constant(from); }
        let dw = to - from;
        Poly3 {
            s: 0.0,
            a: from,
            b: 0.0,
            c: 3.0 * dw / length.powi(2),
            d: -2.0 * dw / length.powi(3),
        }
    }

    pub fn eval(&self, ds :f64) -> f64 {
        self.a + self.b * ds + self.c * ds * ds + self.d * ds * ds * ds
    }
}

#[derive(Serialize, Deserialize)]
#[derive(Debug, Clone, PartialEq)]
pub struct RoadMark {
    pub s :f64,
    pub kind :String,
    pub weight :String,
    pub color :String,
    pub width :f64,
}

impl RoadMark {
    pub fn new(kind :&str) -> RoadMark {
        RoadMark {
            s: 0.0,
            kind: kind.to_string(),
            weight: "standard".to_string(),
            color: "white".to_string(),
            width: if kind == "none" { 0.0 } else { 0.15 },
        }
    }
}

#[derive(Serialize, Deserialize)]
#[derive(Debug, Clone, PartialEq)]
pub struct Lane {
    pub id :Id,
    pub kind :String,
    pub width :Poly3,
    pub road_mark :RoadMark,
}

impl Lane {
    pub fn center(mark :&str) -> Lane {
        Lane { id: 0, kind: "none".to_string(), width: Poly3::default(), road_mark: RoadMark::new(mark) }
    }
}

#[derive(Serialize, Deserialize)]
#[derive(Debug, Clone, PartialEq)]
pub struct LaneSection {
    pub s :f64,
    pub lanes :Vec<Lane>,
}

impl LaneSection {
    pub fn new(s :f64) -> LaneSection {
        LaneSection { s, lanes: Vec::new() }
    }

    pub fn lane(&self, id :Id) -> Option<&Lane> {
        self.lanes.iter().find(|l| l.id == id)
    }

    pub fn max_lane_id(&self) -> Id {
        self.lanes.iter().map(|l| l.id).max().unwrap_or(0)
    }

    pub fn min_lane_id(&self) -> Id {
        self.lanes.iter().map(|l| l.id).min().unwrap_or(0)
    }

    pub fn width(&self, id :Id, ds :f64) -> f64 {
        self.lane(id).map(|l| l.width.eval(ds)).unwrap_or(0.0)
    }

    /// Lateral distance from the reference line to the inner border of lane `id`.
    pub fn t_offset(&self, id :Id, ds :f64) -> f64 {
        let dir = id.signum();
        let mut t = 0.0;
        let mut i = dir;
        while i != id && i != 0 {
            t += self.width(i, ds);
            i += dir;
        }
        t
    }

    /// Lanes sorted the way they are written: left lanes outermost first,
    /// then center, then right lanes from the center outwards.
    pub fn sorted_lanes(&self) -> Vec<&Lane> {
        let mut left :Vec<&Lane> = self.lanes.iter().filter(|l| l.id > 0).collect();
        left.sort_by_key(|l| -l.id);
        let mut right :Vec<&Lane> = self.lanes.iter().filter(|l| l.id < 0).collect();
        right.sort_by_key(|l| -l.id);
        left.into_iter()
            .chain(self.lanes.iter().filter(|l| l.id == 0))
            .chain(right.into_iter())
            .collect()
    }
}
