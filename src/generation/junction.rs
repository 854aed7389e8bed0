use std::convert::TryFrom;
use log::*;
use roadgeom::{PlanView, Pose};
use roadgen_model::*;
use roadxml::{JunctionDef, RoadDef, ConnectionMode};
use crate::config::Config;
use crate::error::GenError;
use crate::generation::road::{reference_line, cut_road};
use crate::generation::connection::{connect_lanes, all_lane_links, LaneLink};

/// A road leaving the junction. Its reference line starts at the coupler
/// area border and points away from the intersection point.
#[derive(Debug)]
pub struct Arm {
    pub road :Id,
    pub input :Id,
    pub input_pos :ContactPoint,
}

/// Junction arm road ids are `100 * junction + k`, k counting from 1 in
/// this order: main road (towards its start if it passes, then towards its
/// end), then every additional road the same way.
pub fn arm_id(junction :Id, k :usize) -> Result<Id, GenError> {
    let k = Id::try_from(k).ok();
    junction.checked_mul(100).zip(k)
        .and_then(|(base, k)| base.checked_add(k))
        .ok_or(GenError::IdOverflow { junction })
}

fn new_road_id(junction :Id, k :usize, network :&RoadNetwork) -> Result<Id, GenError> {
    let id = arm_id(junction, k)?;
    if network.road(id).is_some() {
        return Err(GenError::RoadIdTaken { junction, road: id });
    }
    Ok(id)
}

pub fn generate_junction(def :&JunctionDef, config :&Config, network :&mut RoadNetwork) -> Result<(), GenError> {
    info!("Generating junction {} ({:?})", def.id, def.kind);
    let find = |id :Id| def.roads.iter().find(|r| r.id == id)
        .ok_or(GenError::JunctionRoads { junction: def.id, road: id });

    let ip = &def.intersection;
    let expected = def.kind.num_additional();
    if ip.ad_roads.len() < expected {
        return Err(GenError::MissingAdRoads { junction: def.id, expected, found: ip.ad_roads.len() });
    }
    if ip.ad_roads.len() > expected {
        warn!("Junction {}: ignoring {} surplus adRoad entries", def.id, ip.ad_roads.len() - expected);
    }

    // main road in its own frame defines the intersection point
    let main = find(ip.ref_road)?;
    let main_line = reference_line(main);
    let ip_pose = main_line.pose_at(ip.s).unwrap_or(Pose::origin());
    debug!("Intersection point {:?}", ip_pose);

    let mut placed :Vec<(&RoadDef, PlanView, f64, bool)> = vec![(main, main_line, ip.s, def.kind.main_passes())];
    for ad in ip.ad_roads.iter().take(expected) {
        let ad_def = find(ad.ref_road)?;
        let mut line = reference_line(ad_def);
        line.place(ad.s, Pose::new(ip_pose.x, ip_pose.y, ip_pose.hdg + ad.angle));
        placed.push((ad_def, line, ad.s, def.kind.additional_passes()));
    }

    let mut arms = Vec::new();
    for (road_def, line, s_ip, passes) in &placed {
        let offset = def.coupler.offset_for(road_def.id, config.default_coupler_offset);
        let length = line.length();
        let mut pieces = Vec::new();
        if *passes {
            pieces.push((s_ip - offset, 0.0, ContactPoint::Start));
        }
        pieces.push((s_ip + offset, length, ContactPoint::End));

        for (from, to, input_pos) in pieces {
            if from < 0.0 || from > length || (from - to).abs() < 1e-6 {
                return Err(GenError::ArmTooShort { junction: def.id, road: road_def.id });
            }
            let id = new_road_id(def.id, arms.len() + 1, network)?;
            let mut road = cut_road(road_def, line, from, to, id, def.id, config, network);
            road.input_pos = Some(input_pos);
            road.predecessor = Some(Link::junction(def.id));
            debug!("Arm {} from input road {} ({})", id, road_def.id, input_pos.as_str());
            network.roads.push(road);
            arms.push(Arm { road: id, input: road_def.id, input_pos });
        }
    }

    let links = match &def.coupler.connection {
        ConnectionMode::All => all_lane_links(def.id, &arms, network),
        ConnectionMode::Single(road_links) => {
            let mut links = Vec::new();
            for rl in road_links {
                for a in &[rl.from_road, rl.to_road] {
                    if !arms.iter().any(|arm| arm.road == *a) {
                        return Err(GenError::ArmNotFound { junction: def.id, road: *a });
                    }
                }
                for ll in &rl.lane_links {
                    links.push(LaneLink {
                        from_road: rl.from_road,
                        to_road: rl.to_road,
                        from_lane: ll.from,
                        to_lane: ll.to,
                        left: ll.left.clone().unwrap_or_else(|| "none".to_string()),
                        right: ll.right.clone().unwrap_or_else(|| "none".to_string()),
                    });
                }
            }
            links
        },
    };

    let mut junction = Junction { id: def.id, connections: Vec::new() };
    let mut next = arms.len() + 1;
    for link in &links {
        let id = new_road_id(def.id, next, network)?;
        next += 1;
        let (road, lane) = connect_lanes(def.id, id, link, network, config)?;
        network.roads.push(road);
        junction.connections.push(Connection {
            id: junction.connections.len() as Id + 1,
            incoming: link.from_road,
            connecting: id,
            contact: ContactPoint::Start,
            lane_links: vec![(link.from_lane, lane)],
        });
    }
    if arms.len() != def.kind.num_arms() {
        warn!("Junction {}: built {} arms, type {:?} has {}", def.id, arms.len(), def.kind, def.kind.num_arms());
    }
    info!("Junction {}: {} arms, {} connecting roads", def.id, arms.len(), junction.connections.len());
    network.junctions.push(junction);
    Ok(())
}
