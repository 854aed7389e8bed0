//! Building the road network from the input segments.
//!
//! Every segment is generated in its own local frame: standalone roads start
//! at the origin, junctions have their main road start at the origin. The
//! segments are moved into place afterwards by [`crate::linking`].

pub mod road;
pub mod junction;
pub mod connection;

use log::*;
use roadgen_model::RoadNetwork;
use roadxml::{RoadNetworkInput, Segment};
use crate::config::Config;
use crate::error::GenError;

pub fn build_segments(input :&RoadNetworkInput, name :&str, config :&Config) -> Result<RoadNetwork, GenError> {
    let mut network = RoadNetwork::new(name);
    for segment in &input.segments {
        match segment {
            Segment::Road(def) => {
                debug!("Generating road {}", def.id);
                let road = road::generate_road(def, config, &mut network);
                network.roads.push(road);
            },
            Segment::Junction(def) => junction::generate_junction(def, config, &mut network)?,
        }
    }
    info!("Built {} segments: {} roads, {} junctions",
          input.segments.len(), network.roads.len(), network.junctions.len());
    Ok(network)
}

#[cfg(test)]
mod tests {
    use super::*;
    use roadgen_model::*;
    use roadxml::parse_road_network;
    use std::f64::consts::PI;

    fn build(doc :&str) -> Result<RoadNetwork, GenError> {
        let input = parse_road_network(doc).expect("test input must parse");
        build_segments(&input, "test", &Config::default())
    }

    const CROSSING :&str = r#"<roadNetwork><segments>
        <junction id="1" type="2M">
          <intersectionPoint refRoad="1" s="100">
            <adRoad refRoad="2" s="50" angle="1.5707963267948966"/>
          </intersectionPoint>
          <coupler><couplerArea sOffset="20"/><connection type="all"/></coupler>
          <road id="1"><referenceLine><line length="200"/></referenceLine></road>
          <road id="2"><referenceLine><line length="100"/></referenceLine></road>
        </junction>
      </segments></roadNetwork>"#;

    #[test]
    fn four_arm_crossing() {
        let net = build(CROSSING).unwrap();
        let arms :Vec<&Road> = net.roads.iter().filter(|r| r.junction == NO_JUNCTION).collect();
        assert_eq!(arms.len(), 4);
        assert_eq!(arms.iter().map(|r| r.id).collect::<Vec<_>>(), vec![101, 102, 103, 104]);

        // main road towards its start: begins 20 m before the intersection point, heading back
        let a1 = net.road(101).unwrap();
        let p = a1.plan_view.start_pose().unwrap();
        assert!((p.x - 80.0).abs() < 1e-9 && p.y.abs() < 1e-9);
        assert!((p.hdg.abs() - PI).abs() < 1e-9);
        assert_eq!(a1.input_pos, Some(ContactPoint::Start));
        assert_eq!(a1.predecessor, Some(Link::junction(1)));

        // additional road crosses at its s = 50, perpendicular
        let a4 = net.road(104).unwrap();
        let p = a4.plan_view.start_pose().unwrap();
        assert!((p.x - 100.0).abs() < 1e-9 && (p.y - 20.0).abs() < 1e-9);
        assert!((a4.length() - 30.0).abs() < 1e-9);
        assert_eq!(a4.input_id, 2);

        // one lane per direction: 4 straight + 4 left + 4 right
        let junction = net.junction(1).unwrap();
        assert_eq!(junction.connections.len(), 12);
        for c in &junction.connections {
            let road = net.road(c.connecting).unwrap();
            assert_eq!(road.junction, 1);
            assert_eq!(c.lane_links, vec![(1, -1)]);
            let end = net.road(road.successor.unwrap().id).unwrap().plan_view.start_pose().unwrap();
            assert!(road.plan_view.end_pose().unwrap().distance(&end) < 1e-6);
        }
    }

    #[test]
    fn t_junction_with_single_connections() {
        let doc = r#"<roadNetwork><segments>
            <junction id="3" type="MA">
              <intersectionPoint refRoad="1" s="50">
                <adRoad refRoad="2" s="0" angle="-1.5707963267948966"/>
              </intersectionPoint>
              <coupler>
                <couplerArea sOffset="10"/>
                <connection type="single">
                  <roadLink fromId="301" toId="303">
                    <laneLink fromId="1" toId="-2" right="solid"/>
                  </roadLink>
                </connection>
              </coupler>
              <road id="1"><referenceLine><line length="100"/></referenceLine></road>
              <road id="2">
                <referenceLine><line length="50"/></referenceLine>
                <lanes>
                  <lane id="1" width="3"/>
                  <lane id="-1" width="3"/>
                  <lane id="-2" width="3.5"/>
                </lanes>
              </road>
            </junction>
          </segments></roadNetwork>"#;
        let net = build(doc).unwrap();
        assert_eq!(net.roads.len(), 4);
        let con = net.road(304).unwrap();
        let ls = con.first_section().unwrap();
        // lane -2 of the outgoing arm is 3 m off the reference line
        let helper = ls.lane(-1).unwrap();
        assert_eq!(helper.kind, "none");
        assert!(helper.width.eval(0.0).abs() < 1e-9);
        assert!((helper.width.eval(con.length()) - 3.0).abs() < 1e-9);
        let lane = ls.lane(-2).unwrap();
        assert!((lane.width.eval(0.0) - 3.5).abs() < 1e-9);
        assert!((lane.width.eval(con.length()) - 3.5).abs() < 1e-9);
        assert_eq!(lane.road_mark.kind, "solid");
        assert_eq!(net.junction(3).unwrap().connections[0].lane_links, vec![(1, -2)]);
    }

    #[test]
    fn junction_errors() {
        let missing_road = CROSSING.replace(r#"refRoad="2""#, r#"refRoad="9""#);
        assert_eq!(build(&missing_road).unwrap_err(), GenError::JunctionRoads { junction: 1, road: 9 });

        let too_short = CROSSING.replace(r#"sOffset="20""#, r#"sOffset="60""#);
        assert_eq!(build(&too_short).unwrap_err(), GenError::ArmTooShort { junction: 1, road: 2 });

        let no_ad = CROSSING.replace("type=\"2M\"", "type=\"M2A\"");
        assert!(matches!(build(&no_ad), Err(GenError::MissingAdRoads { expected: 2, found: 1, .. })));

        let lane_zero = r#"<roadNetwork><segments>
            <junction id="1" type="MA">
              <intersectionPoint refRoad="1" s="50"><adRoad refRoad="2" s="0" angle="1.5"/></intersectionPoint>
              <coupler><connection type="single">
                <roadLink fromId="101" toId="103"><laneLink fromId="0" toId="-1"/></roadLink>
              </connection></coupler>
              <road id="1"><referenceLine><line length="100"/></referenceLine></road>
              <road id="2"><referenceLine><line length="100"/></referenceLine></road>
            </junction>
          </segments></roadNetwork>"#;
        assert_eq!(build(lane_zero).unwrap_err(), GenError::LaneZero { junction: 1 });
    }

    fn single(road_links :&str) -> String {
        format!(r#"<roadNetwork><segments>
            <junction id="1" type="MA">
              <intersectionPoint refRoad="1" s="50"><adRoad refRoad="2" s="0" angle="1.5"/></intersectionPoint>
              <coupler><connection type="single">{}</connection></coupler>
              <road id="1"><referenceLine><line length="100"/></referenceLine></road>
              <road id="2"><referenceLine><line length="100"/></referenceLine></road>
            </junction>
          </segments></roadNetwork>"#, road_links)
    }

    #[test]
    fn single_connection_errors() {
        let unknown_arm = single(r#"<roadLink fromId="101" toId="109"><laneLink fromId="1" toId="-1"/></roadLink>"#);
        assert_eq!(build(&unknown_arm).unwrap_err(), GenError::ArmNotFound { junction: 1, road: 109 });

        let missing_lane = single(r#"<roadLink fromId="101" toId="103"><laneLink fromId="1" toId="-3"/></roadLink>"#);
        assert_eq!(build(&missing_lane).unwrap_err(), GenError::LaneNotFound { junction: 1, road: 103, lane: -3 });

        let wrong_way = single(r#"<roadLink fromId="101" toId="103"><laneLink fromId="-1" toId="-1"/></roadLink>"#);
        assert_eq!(build(&wrong_way).unwrap_err(), GenError::LaneDirection { junction: 1, from: -1, to: -1 });

        // back into the same arm: start and end of the connecting road coincide
        let u_turn = single(r#"<roadLink fromId="101" toId="101"><laneLink fromId="1" toId="-1"/></roadLink>"#);
        assert!(matches!(build(&u_turn), Err(GenError::Geometry { junction: 1, .. })));

        let ok = single(r#"<roadLink fromId="101" toId="103"><laneLink fromId="1" toId="-1"/></roadLink>"#);
        assert_eq!(build(&ok).unwrap().junction(1).unwrap().connections.len(), 1);
    }

    #[test]
    fn junction_road_ids() {
        let large = CROSSING.replace(r#"junction id="1""#, r#"junction id="30000000""#);
        assert_eq!(build(&large).unwrap_err(), GenError::IdOverflow { junction: 30000000 });

        let largest = CROSSING.replace(r#"junction id="1""#, r#"junction id="21474836""#);
        assert!(build(&largest).is_ok());

        let taken = CROSSING.replace("<segments>",
            r#"<segments><road id="101"><referenceLine><line length="10"/></referenceLine></road>"#);
        assert_eq!(build(&taken).unwrap_err(), GenError::RoadIdTaken { junction: 1, road: 101 });
    }
}
