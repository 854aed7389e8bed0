//! Structural checks on the finished network before it is written.

use std::collections::HashSet;
use std::fmt;
use roadgen_model::*;

/// Contact points further apart than this are reported.
pub const TOLERANCE :f64 = 1e-3;

#[derive(Debug, Clone, PartialEq)]
pub enum Issue {
    DuplicateRoad(Id),
    DuplicateJunction(Id),
    EmptyRoad(Id),
    Discontinuity { road :Id, gap :f64 },
    DanglingLink { road :Id, target :Id },
    Disconnected { road :Id, target :Id, gap :f64 },
    NoCenterLane(Id),
    LaneGap { road :Id, lane :Id },
    MissingConnectingRoad { junction :Id, road :Id },
}

impl fmt::Display for Issue {
    fn fmt(&self, f :&mut fmt::Formatter) -> fmt::Result {
        match self {
            Issue::DuplicateRoad(id) => write!(f, "road id {} is used more than once", id),
            Issue::DuplicateJunction(id) => write!(f, "junction id {} is used more than once", id),
            Issue::EmptyRoad(id) => write!(f, "road {} has no geometry", id),
            Issue::Discontinuity { road, gap } => write!(f, "road {} has a gap of {:.4} m in its plan view", road, gap),
            Issue::DanglingLink { road, target } => write!(f, "road {} links to unknown element {}", road, target),
            Issue::Disconnected { road, target, gap } =>
                write!(f, "road {} and linked road {} are {:.4} m apart", road, target, gap),
            Issue::NoCenterLane(id) => write!(f, "road {} has a lane section without center lane", id),
            Issue::LaneGap { road, lane } => write!(f, "road {} is missing lane {}", road, lane),
            Issue::MissingConnectingRoad { junction, road } =>
                write!(f, "junction {} refers to unknown road {}", junction, road),
        }
    }
}

fn contact_pose(road :&Road, contact :ContactPoint) -> Option<roadgeom::Pose> {
    match contact {
        ContactPoint::Start => road.plan_view.start_pose(),
        ContactPoint::End => road.plan_view.end_pose(),
    }
}

fn check_link(network :&RoadNetwork, road :&Road, own :ContactPoint, link :&Link, issues :&mut Vec<Issue>) {
    match link.element {
        ElementType::Junction => {
            if network.junction(link.id).is_none() {
                issues.push(Issue::DanglingLink { road: road.id, target: link.id });
            }
        },
        ElementType::Road => {
            let target = match network.road(link.id) {
                Some(t) => t,
                None => return issues.push(Issue::DanglingLink { road: road.id, target: link.id }),
            };
            let other = link.contact.unwrap_or(ContactPoint::Start);
            if let (Some(a), Some(b)) = (contact_pose(road, own), contact_pose(target, other)) {
                let gap = a.distance(&b);
                if gap > TOLERANCE {
                    issues.push(Issue::Disconnected { road: road.id, target: link.id, gap });
                }
            }
        },
    }
}

pub fn validate(network :&RoadNetwork) -> Vec<Issue> {
    let mut issues = Vec::new();

    let mut seen = HashSet::new();
    for r in &network.roads {
        if !seen.insert(r.id) {
            issues.push(Issue::DuplicateRoad(r.id));
        }
    }
    let mut seen = HashSet::new();
    for j in &network.junctions {
        if !seen.insert(j.id) {
            issues.push(Issue::DuplicateJunction(j.id));
        }
    }

    for r in &network.roads {
        if r.plan_view.is_empty() {
            issues.push(Issue::EmptyRoad(r.id));
            continue;
        }
        let gap = r.plan_view.max_gap();
        if gap > TOLERANCE {
            issues.push(Issue::Discontinuity { road: r.id, gap });
        }
        for ls in &r.lane_sections {
            if ls.lane(0).is_none() {
                issues.push(Issue::NoCenterLane(r.id));
                continue;
            }
            for id in (ls.min_lane_id()..=ls.max_lane_id()).filter(|id| ls.lane(*id).is_none()) {
                issues.push(Issue::LaneGap { road: r.id, lane: id });
            }
        }
        if let Some(l) = &r.predecessor {
            check_link(network, r, ContactPoint::Start, l, &mut issues);
        }
        if let Some(l) = &r.successor {
            check_link(network, r, ContactPoint::End, l, &mut issues);
        }
    }

    for j in &network.junctions {
        for c in &j.connections {
            for id in &[c.incoming, c.connecting] {
                if network.road(*id).is_none() {
                    issues.push(Issue::MissingConnectingRoad { junction: j.id, road: *id });
                }
            }
        }
    }
    issues
}
