use roadgeom::{PlanView, Pose, Curve, fix_angle};
use roadgen_model::*;
use roadxml::{RoadDef, Primitive, LaneDef};
use crate::config::Config;

/// Reference line of an input road, starting at the origin heading east.
pub fn reference_line(def :&RoadDef) -> PlanView {
    let mut pv = PlanView::new();
    for p in &def.reference_line {
        match *p {
            Primitive::Line { length } => pv.push(Pose::origin(), length, Curve::Line),
            Primitive::Arc { length, curvature } =>
                pv.push(Pose::origin(), length, Curve::Arc { curvature }),
            Primitive::Spiral { length, curv_start, curv_end } =>
                pv.push(Pose::origin(), length, Curve::Spiral { curv_start, curv_end }),
        }
    }
    pv
}

fn default_lanes() -> Vec<LaneDef> {
    vec![
        LaneDef { id: 1, kind: "driving".to_string(), width: None, road_mark: None },
        LaneDef { id: -1, kind: "driving".to_string(), width: None, road_mark: None },
    ]
}

/// Lane section of an input road. Roads without lanes get one driving
/// lane per direction.
pub fn lane_section(def :&RoadDef, config :&Config) -> LaneSection {
    let defs = if def.lanes.is_empty() { default_lanes() } else { def.lanes.clone() };
    let max_id = defs.iter().map(|l| l.id).max().unwrap_or(0);
    let min_id = defs.iter().map(|l| l.id).min().unwrap_or(0);

    let mut section = LaneSection::new(0.0);
    for l in defs.iter().filter(|l| l.id != 0) {
        let outermost = l.id == max_id || l.id == min_id;
        let mark = match &l.road_mark {
            Some(rm) => RoadMark {
                s: 0.0,
                kind: rm.kind.clone(),
                weight: rm.weight.clone(),
                color: rm.color.clone(),
                width: rm.width,
            },
            None => RoadMark::new(if outermost { "solid" } else { "broken" }),
        };
        section.lanes.push(Lane {
            id: l.id,
            kind: l.kind.clone(),
            width: Poly3::constant(l.width.unwrap_or(config.default_lane_width)),
            road_mark: mark,
        });
    }

    let center = match defs.iter().find(|l| l.id == 0).and_then(|l| l.road_mark.as_ref()) {
        Some(rm) => RoadMark::new(&rm.kind),
        None => RoadMark::new(if max_id > 0 && min_id < 0 { "solid" } else { "none" }),
    };
    section.lanes.push(Lane { id: 0, kind: "none".to_string(), width: Poly3::default(), road_mark: center });
    section
}

/// A complete standalone road segment.
pub fn generate_road(def :&RoadDef, config :&Config, network :&mut RoadNetwork) -> Road {
    let pv = reference_line(def);
    let length = pv.length();
    cut_road(def, &pv, 0.0, length, def.id, def.id, config, network)
}

/// Road covering the input road between `from` and `to` on the given
/// reference line. With `from > to` the piece runs against the input road:
/// lane sides, lateral positions and orientations are mirrored.
pub fn cut_road(def :&RoadDef,
                line :&PlanView,
                from :f64,
                to :f64,
                id :Id,
                segment :Id,
                config :&Config,
                network :&mut RoadNetwork) -> Road {
    let reversed = from > to;
    let (lo, hi) = if reversed { (to, from) } else { (from, to) };
    let map_s = |s :f64| if reversed { from - s } else { s - from };

    let mut road = Road::new(id, segment);
    road.input_id = def.id;
    road.classification = def.classification.clone();
    road.plan_view = line.cut(from, to);

    let mut section = lane_section(def, config);
    if reversed {
        for l in section.lanes.iter_mut() { l.id = -l.id; }
    }
    road.lane_sections.push(section);

    for o in &def.objects {
        let mut obj = Object {
            id: o.id,
            kind: o.kind.clone(),
            s: o.s,
            t: o.t,
            z: o.z,
            hdg: o.hdg,
            orientation: o.orientation.clone(),
            length: o.length,
            width: o.width,
            height: o.height,
            repeat: None,
        };
        match o.repeat {
            Some(rep) => {
                let (a, b) = (o.s.max(lo), (o.s + rep.length).min(hi));
                if b <= a { continue; }
                obj.s = if reversed { map_s(b) } else { map_s(a) };
                obj.repeat = Some(Repeat { length: b - a, distance: rep.distance });
            },
            None => {
                if o.s < lo || o.s > hi { continue; }
                obj.s = map_s(o.s);
            },
        }
        if reversed {
            obj.t = -obj.t;
            obj.hdg = fix_angle(obj.hdg + std::f64::consts::PI);
            obj.orientation = flip_orientation(&obj.orientation);
        }
        road.objects.push(obj);
    }

    for s in &def.signals {
        if s.s < lo || s.s > hi { continue; }
        road.signals.push(Signal {
            id: s.id,
            kind: s.kind.clone(),
            s: map_s(s.s),
            t: if reversed { -s.t } else { s.t },
            z: s.z,
            orientation: if reversed { flip_orientation(&s.orientation) } else { s.orientation.clone() },
            dynamic: s.dynamic,
            value: s.value,
            width: s.width,
            height: s.height,
        });
        if let Some(c) = s.controller {
            network.add_controlled_signal(c, s.id);
        }
    }

    road
}

fn flip_orientation(o :&str) -> String {
    match o {
        "+" => "-".to_string(),
        "-" => "+".to_string(),
        x => x.to_string(),
    }
}
