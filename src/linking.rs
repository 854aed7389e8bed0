//! Placing the independently generated segments in one frame.
//!
//! The reference segment is moved by the global offset of the `<links>`
//! element. All other segments are reached through segment links and moved
//! rigidly so that the two linked contact points meet head to head.

use std::collections::{HashSet, VecDeque};
use std::f64::consts::PI;
use log::*;
use roadgeom::{fix_angle, Pose};
use roadgen_model::*;
use roadxml::{ContactPos, Links, SegmentLink};
use crate::error::LinkError;

fn contact(pos :ContactPos) -> ContactPoint {
    match pos {
        ContactPos::Start => ContactPoint::Start,
        ContactPos::End => ContactPoint::End,
    }
}

/// Generated road and contact point for one side of a segment link. Inside
/// junction segments the position selects which arm of the input road is
/// meant, and the contact is always the arm's outer end.
fn find_road(network :&RoadNetwork, segment :Id, road :Id, pos :ContactPos) -> Result<(Id, ContactPoint), LinkError> {
    let not_found = LinkError::RoadNotFound { segment, road, pos: pos.as_str() };
    if network.is_junction_segment(segment) {
        network.roads.iter()
            .find(|r| r.segment == segment && r.junction == NO_JUNCTION
                  && r.input_id == road && r.input_pos == Some(contact(pos)))
            .map(|r| (r.id, ContactPoint::End))
            .ok_or(not_found)
    } else {
        network.roads.iter()
            .find(|r| r.segment == segment && r.input_id == road)
            .map(|r| (r.id, contact(pos)))
            .ok_or(not_found)
    }
}

fn outward(network :&RoadNetwork, road :Id, contact :ContactPoint) -> Pose {
    network.road(road).and_then(|r| r.outward_pose(contact)).unwrap_or(Pose::origin())
}

fn transform_segment(network :&mut RoadNetwork, segment :Id, dphi :f64, dx :f64, dy :f64) {
    for r in network.segment_roads_mut(segment) {
        r.plan_view.transform(dphi, dx, dy);
    }
}

/// Move segment `moving` so that its end of the link meets the already
/// placed end, and record the link on both roads.
fn attach(network :&mut RoadNetwork, fixed :(Id, ContactPoint), moving :(Id, ContactPoint), moving_segment :Id) {
    let pa = outward(network, fixed.0, fixed.1);
    let pb = outward(network, moving.0, moving.1);
    let dphi = fix_angle(pa.hdg - pb.hdg + PI);
    let q = pb.transformed(dphi, 0.0, 0.0);
    transform_segment(network, moving_segment, dphi, pa.x - q.x, pa.y - q.y);
    debug!("Segment {} moved by ({:.2}, {:.2}), rotated {:.3} rad", moving_segment, pa.x - q.x, pa.y - q.y, dphi);
}

fn set_links(network :&mut RoadNetwork, a :(Id, ContactPoint), b :(Id, ContactPoint)) {
    if let Some(r) = network.road_mut(a.0) {
        r.set_link(a.1, Link::road(b.0, b.1));
    }
    if let Some(r) = network.road_mut(b.0) {
        r.set_link(b.1, Link::road(a.0, a.1));
    }
}

pub fn link_segments(links :Option<&Links>, network :&mut RoadNetwork) -> Result<(), LinkError> {
    let links = match links {
        Some(l) => l,
        None => {
            warn!("No links specified, segments are left in their local frames");
            return Ok(());
        }
    };

    info!("Linking segments relative to segment {}", links.ref_id);
    transform_segment(network, links.ref_id, links.hdg_offset, links.x_offset, links.y_offset);

    let mut placed = HashSet::new();
    let mut queue = VecDeque::new();
    placed.insert(links.ref_id);
    queue.push_back(links.ref_id);

    while let Some(current) = queue.pop_front() {
        for link in links.segment_links.iter() {
            let (other, forward) = if link.from_segment == current {
                (link.to_segment, true)
            } else if link.to_segment == current {
                (link.from_segment, false)
            } else {
                continue;
            };
            if placed.contains(&other) {
                continue;
            }
            link_pair(network, link, forward)?;
            placed.insert(other);
            queue.push_back(other);
        }
    }

    // links between segments that were placed through other paths
    for link in links.segment_links.iter() {
        let from = find_road(network, link.from_segment, link.from_road, link.from_pos)?;
        let to = find_road(network, link.to_segment, link.to_road, link.to_pos)?;
        let gap = outward(network, from.0, from.1).distance(&outward(network, to.0, to.1));
        if gap > 1e-3 {
            warn!("Segments {} and {} are {:.3} m apart at their link", link.from_segment, link.to_segment, gap);
        }
        set_links(network, from, to);
    }

    let mut segments :Vec<Id> = network.roads.iter().map(|r| r.segment).collect();
    segments.sort();
    segments.dedup();
    for s in segments.into_iter().filter(|s| !placed.contains(s)) {
        warn!("Segment {} is not reachable from reference segment {}", s, links.ref_id);
    }
    Ok(())
}

fn link_pair(network :&mut RoadNetwork, link :&SegmentLink, forward :bool) -> Result<(), LinkError> {
    let from = find_road(network, link.from_segment, link.from_road, link.from_pos)?;
    let to = find_road(network, link.to_segment, link.to_road, link.to_pos)?;
    if forward {
        attach(network, from, to, link.to_segment);
    } else {
        attach(network, to, from, link.from_segment);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use roadgeom::Curve;

    fn road(id :Id, length :f64, curve :Curve) -> Road {
        let mut r = Road::new(id, id);
        r.plan_view.push(Pose::origin(), length, curve);
        r
    }

    fn seg_link(from :Id, from_pos :ContactPos, to :Id, to_pos :ContactPos) -> SegmentLink {
        SegmentLink { from_segment: from, from_road: from, from_pos, to_segment: to, to_road: to, to_pos }
    }

    fn links(ref_id :Id, segment_links :Vec<SegmentLink>) -> Links {
        Links { ref_id, hdg_offset: 0.0, x_offset: 0.0, y_offset: 0.0, segment_links }
    }

    #[test]
    fn chain_of_roads() {
        let mut net = RoadNetwork::new("t");
        net.roads.push(road(1, 50.0, Curve::Arc { curvature: 0.01 }));
        net.roads.push(road(2, 30.0, Curve::Line));
        net.roads.push(road(3, 20.0, Curve::Line));
        let l = links(1, vec![
            seg_link(1, ContactPos::End, 2, ContactPos::Start),
            // given backwards: 3 is attached to 2 through the reversed link
            seg_link(3, ContactPos::End, 2, ContactPos::End),
        ]);
        link_segments(Some(&l), &mut net).unwrap();

        let e1 = net.road(1).unwrap().plan_view.end_pose().unwrap();
        let s2 = net.road(2).unwrap().plan_view.start_pose().unwrap();
        assert!(e1.distance(&s2) < 1e-6);
        assert!(fix_angle(e1.hdg - s2.hdg).abs() < 1e-9);

        let e2 = net.road(2).unwrap().plan_view.end_pose().unwrap();
        let e3 = net.road(3).unwrap().plan_view.end_pose().unwrap();
        assert!(e2.distance(&e3) < 1e-6);
        assert!((fix_angle(e2.hdg - e3.hdg).abs() - PI).abs() < 1e-9);

        assert_eq!(net.road(1).unwrap().successor, Some(Link::road(2, ContactPoint::Start)));
        assert_eq!(net.road(2).unwrap().predecessor, Some(Link::road(1, ContactPoint::End)));
        assert_eq!(net.road(2).unwrap().successor, Some(Link::road(3, ContactPoint::End)));
        assert_eq!(net.road(3).unwrap().successor, Some(Link::road(2, ContactPoint::End)));
    }

    #[test]
    fn reference_offset() {
        let mut net = RoadNetwork::new("t");
        net.roads.push(road(1, 10.0, Curve::Line));
        let mut l = links(1, Vec::new());
        l.hdg_offset = PI / 2.0;
        l.x_offset = 5.0;
        link_segments(Some(&l), &mut net).unwrap();
        let e = net.road(1).unwrap().plan_view.end_pose().unwrap();
        assert!((e.x - 5.0).abs() < 1e-9 && (e.y - 10.0).abs() < 1e-9);
    }

    #[test]
    fn missing_road_and_no_links() {
        let mut net = RoadNetwork::new("t");
        net.roads.push(road(1, 10.0, Curve::Line));
        assert!(link_segments(None, &mut net).is_ok());

        let l = links(1, vec![seg_link(1, ContactPos::End, 4, ContactPos::Start)]);
        assert_eq!(link_segments(Some(&l), &mut net),
                   Err(LinkError::RoadNotFound { segment: 4, road: 4, pos: "start" }));
    }
}
