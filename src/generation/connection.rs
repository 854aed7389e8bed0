use std::f64::consts::PI;
use log::*;
use roadgeom::{connect, fix_angle};
use roadgen_model::*;
use crate::config::Config;
use crate::error::GenError;
use crate::generation::junction::Arm;

/// One lane-to-lane connection through a junction. `from_lane` is an
/// incoming (positive) lane of `from_road`, `to_lane` an outgoing
/// (negative) lane of `to_road`; both roads are junction arms.
#[derive(Debug, Clone, PartialEq)]
pub struct LaneLink {
    pub from_road :Id,
    pub to_road :Id,
    pub from_lane :Id,
    pub to_lane :Id,
    pub left :String,
    pub right :String,
}

fn driving_lanes(section :&LaneSection, incoming :bool) -> Vec<Id> {
    let mut ids :Vec<Id> = section.lanes.iter()
        .filter(|l| l.kind == "driving" && if incoming { l.id > 0 } else { l.id < 0 })
        .map(|l| l.id)
        .collect();
    ids.sort_by_key(|id| id.abs());
    ids
}

/// Lane links for a fully connected junction: straight ahead every lane
/// continues, left turns use the innermost lanes, right turns the
/// outermost ones. U-turns are not generated.
pub fn all_lane_links(junction :Id, arms :&[Arm], network :&RoadNetwork) -> Vec<LaneLink> {
    let mut links = Vec::new();
    for from in arms {
        for to in arms {
            if from.road == to.road { continue; }
            let (r1, r2) = match (network.road(from.road), network.road(to.road)) {
                (Some(a), Some(b)) => (a, b),
                _ => continue,
            };
            let (p1, p2) = match (r1.plan_view.start_pose(), r2.plan_view.start_pose()) {
                (Some(a), Some(b)) => (a, b),
                _ => continue,
            };
            let (incoming, outgoing) = match (r1.first_section(), r2.first_section()) {
                (Some(a), Some(b)) => (driving_lanes(a, true), driving_lanes(b, false)),
                _ => continue,
            };
            if incoming.is_empty() || outgoing.is_empty() { continue; }

            let turn = fix_angle(p2.hdg - (p1.hdg + PI));
            let pairs :Vec<(Id, Id)> = if turn.abs() < PI / 6.0 {
                incoming.iter().zip(outgoing.iter()).map(|(a, b)| (*a, *b)).collect()
            } else if turn.abs() > 5.0 * PI / 6.0 {
                debug!("Junction {}: skipping {} -> {}, turn of {:.2} rad", junction, from.road, to.road, turn);
                Vec::new()
            } else if turn > 0.0 {
                vec![(incoming[0], outgoing[0])]
            } else {
                vec![(incoming[incoming.len() - 1], outgoing[outgoing.len() - 1])]
            };

            for (from_lane, to_lane) in pairs {
                links.push(LaneLink {
                    from_road: from.road,
                    to_road: to.road,
                    from_lane,
                    to_lane,
                    left: "none".to_string(),
                    right: "none".to_string(),
                });
            }
        }
    }
    links
}

fn section_with_lane<'a>(junction :Id, road :&'a Road, lane :Id) -> Result<&'a LaneSection, GenError> {
    road.first_section()
        .filter(|ls| ls.lane(lane).is_some())
        .ok_or(GenError::LaneNotFound { junction, road: road.id, lane })
}

/// Build the connecting road for one lane link. The reference line joins
/// the two arm reference lines; a helper lane of type `none` covers the
/// lateral offset of the connected lanes when they are not adjacent to
/// the reference line. Returns the road and the id of the connected lane.
pub fn connect_lanes(junction :Id,
                     id :Id,
                     link :&LaneLink,
                     network :&RoadNetwork,
                     config :&Config) -> Result<(Road, Id), GenError> {
    if link.from_lane == 0 || link.to_lane == 0 {
        return Err(GenError::LaneZero { junction });
    }
    if link.from_lane < 0 || link.to_lane > 0 {
        return Err(GenError::LaneDirection { junction, from: link.from_lane, to: link.to_lane });
    }

    let from = network.road(link.from_road)
        .ok_or(GenError::ArmNotFound { junction, road: link.from_road })?;
    let to = network.road(link.to_road)
        .ok_or(GenError::ArmNotFound { junction, road: link.to_road })?;
    let ls1 = section_with_lane(junction, from, link.from_lane)?;
    let ls2 = section_with_lane(junction, to, link.to_lane)?;

    let (t1, w1) = (ls1.t_offset(link.from_lane, 0.0), ls1.width(link.from_lane, 0.0));
    let (t2, w2) = (ls2.t_offset(link.to_lane, 0.0), ls2.width(link.to_lane, 0.0));
    let kind = ls1.lane(link.from_lane).map(|l| l.kind.clone()).unwrap_or_else(|| "driving".to_string());

    let (start, end) = match (from.plan_view.start_pose(), to.plan_view.start_pose()) {
        (Some(a), Some(b)) => (a.flipped(), b),
        _ => return Err(GenError::ArmNotFound { junction, road: link.from_road }),
    };
    let plan_view = connect(start, end, config.min_arc_radius)
        .map_err(|source| GenError::Geometry { junction, source })?;
    let length = plan_view.length();

    let mut road = Road::new(id, junction);
    road.junction = junction;
    road.plan_view = plan_view;
    road.predecessor = Some(Link::road(link.from_road, ContactPoint::Start));
    road.successor = Some(Link::road(link.to_road, ContactPoint::Start));

    let helper = t1.abs() > 1e-9 || t2.abs() > 1e-9;
    let mut section = LaneSection::new(0.0);
    section.lanes.push(Lane::center(if helper { "none" } else { link.left.as_str() }));
    if helper {
        section.lanes.push(Lane {
            id: -1,
            kind: "none".to_string(),
            width: Poly3::transition(t1, t2, length),
            road_mark: RoadMark::new(&link.left),
        });
    }
    let lane_id = if helper { -2 } else { -1 };
    section.lanes.push(Lane {
        id: lane_id,
        kind,
        width: Poly3::transition(w1, w2, length),
        road_mark: RoadMark::new(&link.right),
    });
    road.lane_sections.push(section);

    debug!("Connecting road {}: {}:{} -> {}:{} ({:.1} m)",
           id, link.from_road, link.from_lane, link.to_road, link.to_lane, length);
    Ok((road, lane_id))
}
