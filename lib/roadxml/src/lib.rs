pub mod model;
pub mod xml;

pub use model::*;
pub use xml::{parse_road_network, DocErr};

#[cfg(test)]
mod tests {
    use crate::model::*;
    use crate::xml::*;

    const NETWORK :&str = r#"<?xml version="1.0"?>
<roadNetwork>
  <segments>
    <road id="1" classification="main">
      <referenceLine>
        <line length="100"/>
        <arc length="40" R="-50"/>
        <spiral length="30" Rs="0" curvEnd="0.01"/>
      </referenceLine>
      <lanes>
        <lane id="1" width="3.25"><roadMark type="broken"/></lane>
        <lane id="-1" type="sidewalk"/>
      </lanes>
      <objects>
        <object id="3" type="streetLamp" s="10" t="5" repeat="true" repeatLength="60" distance="20"/>
        <signal id="5" type="stop" s="95" t="-4" dynamic="no" controller="1"/>
      </objects>
    </road>
    <junction id="2" type="M2A">
      <intersectionPoint refRoad="21" s="50">
        <adRoad refRoad="22" s="0" angle="1.5708"/>
        <adRoad refRoad="23" s="0" angle="-1.5708"/>
      </intersectionPoint>
      <coupler>
        <couplerArea sOffset="20"><road id="22" sOffset="15"/></couplerArea>
        <connection type="single">
          <roadLink fromId="21" toId="22">
            <laneLink fromId="1" toId="-1" left="solid"/>
          </roadLink>
        </connection>
      </coupler>
      <road id="21"><referenceLine><line length="100"/></referenceLine></road>
      <road id="22"><referenceLine><line length="60"/></referenceLine></road>
      <road id="23"><referenceLine><line length="60"/></referenceLine></road>
    </junction>
  </segments>
  <links refId="1" xOffset="10">
    <segmentLink fromSegment="1" fromRoad="1" fromPos="end" toSegment="2" toRoad="21" toPos="start"/>
  </links>
</roadNetwork>"#;

    #[test]
    fn parse_full_network() {
        let net = parse_road_network(NETWORK).expect("parse failed");
        assert_eq!(net.segments.len(), 2);

        let road = match &net.segments[0] { Segment::Road(r) => r, _ => panic!("expected road") };
        assert_eq!(road.id, 1);
        assert_eq!(road.reference_line[1], Primitive::Arc { length: 40.0, curvature: -0.02 });
        assert_eq!(road.reference_line[2], Primitive::Spiral { length: 30.0, curv_start: 0.0, curv_end: 0.01 });
        assert!((road.length() - 170.0).abs() < 1e-12);
        assert_eq!(road.lanes[0].width, Some(3.25));
        assert_eq!(road.lanes[0].road_mark.as_ref().unwrap().kind, "broken");
        assert_eq!(road.lanes[1].kind, "sidewalk");
        assert_eq!(road.objects[0].repeat, Some(RepeatDef { length: 60.0, distance: 20.0 }));
        assert_eq!(road.signals[0].controller, Some(1));
        assert!(!road.signals[0].dynamic);

        let junc = match &net.segments[1] { Segment::Junction(j) => j, _ => panic!("expected junction") };
        assert_eq!(junc.kind, JunctionType::MainTwoAccess);
        assert_eq!(junc.intersection.ad_roads.len(), 2);
        assert_eq!(junc.coupler.offset_for(22, 99.0), 15.0);
        assert_eq!(junc.coupler.offset_for(23, 99.0), 20.0);
        match &junc.coupler.connection {
            ConnectionMode::Single(links) => {
                assert_eq!(links[0].lane_links[0].left.as_deref(), Some("solid"));
                assert_eq!(links[0].lane_links[0].right, None);
            },
            _ => panic!("expected single connections"),
        }

        let links = net.links.unwrap();
        assert_eq!(links.ref_id, 1);
        assert_eq!(links.x_offset, 10.0);
        assert_eq!(links.segment_links[0].to_pos, ContactPos::Start);
    }

    #[test]
    fn missing_links_is_fine() {
        let doc = r#"<roadNetwork><segments>
            <road id="1"><referenceLine><line length="10"/></referenceLine></road>
        </segments></roadNetwork>"#;
        let net = parse_road_network(doc).unwrap();
        assert!(net.links.is_none());
    }

    #[test]
    fn errors() {
        let no_refline = r#"<roadNetwork><segments><road id="1"/></segments></roadNetwork>"#;
        assert!(matches!(parse_road_network(no_refline), Err(DocErr::ElementMissing("referenceLine", _))));

        let bad_number = r#"<roadNetwork><segments>
            <road id="1"><referenceLine><line length="ten"/></referenceLine></road>
        </segments></roadNetwork>"#;
        assert!(matches!(parse_road_network(bad_number), Err(DocErr::NumberError("length", _))));
        for value in &["NaN", "inf", "-inf"] {
            let doc = bad_number.replace("ten", value);
            assert!(matches!(parse_road_network(&doc), Err(DocErr::NumberError("length", _))), "{}", value);
        }
        let bad_angle = NETWORK.replace(r#"angle="-1.5708""#, r#"angle="NaN""#);
        assert!(matches!(parse_road_network(&bad_angle), Err(DocErr::NumberError("angle", _))));

        let bad_type = r#"<roadNetwork><segments>
            <junction id="1" type="5X"/>
        </segments></roadNetwork>"#;
        assert!(matches!(parse_road_network(bad_type), Err(DocErr::EnumErr(_, _))));

        let bad_pos = r#"<roadNetwork><segments/>
            <links refId="1"><segmentLink fromSegment="1" fromRoad="1" fromPos="middle"
                toSegment="2" toRoad="2" toPos="end"/></links>
        </roadNetwork>"#;
        assert!(matches!(parse_road_network(bad_pos), Err(DocErr::EnumErr("start, end", _))));

        assert!(matches!(parse_road_network("<roadNetwork>"), Err(DocErr::Xml(_))));
    }
}
