//! OpenDRIVE 1.5 writer.

use std::io::Cursor;
use std::path::Path;
use log::*;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use roadgeom::{Curve, Geometry};
use roadgen_model::*;
use crate::config::Config;

type Attrs<'a> = &'a [(&'a str, String)];

struct OdrWriter {
    w :Writer<Cursor<Vec<u8>>>,
}

impl OdrWriter {
    fn new() -> OdrWriter {
        OdrWriter { w: Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2) }
    }

    fn elem(name :&str, attrs :Attrs) -> BytesStart<'static> {
        let mut e = BytesStart::new(name.to_string());
        for (k, v) in attrs {
            e.push_attribute((*k, v.as_str()));
        }
        e
    }

    fn start(&mut self, name :&str, attrs :Attrs) -> quick_xml::Result<()> {
        self.w.write_event(Event::Start(Self::elem(name, attrs)))
    }

    fn empty(&mut self, name :&str, attrs :Attrs) -> quick_xml::Result<()> {
        self.w.write_event(Event::Empty(Self::elem(name, attrs)))
    }

    fn end(&mut self, name :&str) -> quick_xml::Result<()> {
        self.w.write_event(Event::End(BytesEnd::new(name)))
    }

    fn finish(self) -> quick_xml::Result<String> {
        let bytes = self.w.into_inner().into_inner();
        String::from_utf8(bytes).map_err(|e| quick_xml::Error::NonDecodable(Some(e.utf8_error())))
    }
}

fn num(x :f64) -> String {
    if x.abs() < 1e-12 { "0".to_string() } else { format!("{}", x) }
}

/// Bounding box of all geometry start and end points: north, south, east, west.
fn bounds(network :&RoadNetwork) -> (f64, f64, f64, f64) {
    let mut b = (f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY);
    for g in network.roads.iter().flat_map(|r| r.plan_view.geometries.iter()) {
        for p in &[g.start_pose(), g.end_pose()] {
            b = (b.0.max(p.y), b.1.min(p.y), b.2.max(p.x), b.3.min(p.x));
        }
    }
    if b.0 < b.1 { (0.0, 0.0, 0.0, 0.0) } else { b }
}

fn write_link(w :&mut OdrWriter, tag :&str, link :&Link) -> quick_xml::Result<()> {
    let mut attrs = vec![
        ("elementType", link.element.as_str().to_string()),
        ("elementId", link.id.to_string()),
    ];
    if let Some(c) = link.contact {
        attrs.push(("contactPoint", c.as_str().to_string()));
    }
    w.empty(tag, &attrs)
}

fn write_geometry(w :&mut OdrWriter, g :&Geometry) -> quick_xml::Result<()> {
    w.start("geometry", &[
        ("s", num(g.s)),
        ("x", num(g.x)),
        ("y", num(g.y)),
        ("hdg", num(g.hdg)),
        ("length", num(g.length)),
    ])?;
    match g.curve {
        Curve::Line => w.empty("line", &[])?,
        Curve::Arc { curvature } => w.empty("arc", &[("curvature", num(curvature))])?,
        Curve::Spiral { curv_start, curv_end } =>
            w.empty("spiral", &[("curvStart", num(curv_start)), ("curvEnd", num(curv_end))])?,
    }
    w.end("geometry")
}

fn write_lane(w :&mut OdrWriter, lane :&Lane) -> quick_xml::Result<()> {
    w.start("lane", &[
        ("id", lane.id.to_string()),
        ("type", lane.kind.clone()),
        ("level", "false".to_string()),
    ])?;
    if lane.id != 0 {
        let p = &lane.width;
        w.empty("width", &[
            ("sOffset", num(p.s)),
            ("a", num(p.a)),
            ("b", num(p.b)),
            ("c", num(p.c)),
            ("d", num(p.d)),
        ])?;
    }
    let m = &lane.road_mark;
    w.empty("roadMark", &[
        ("sOffset", num(m.s)),
        ("type", m.kind.clone()),
        ("weight", m.weight.clone()),
        ("color", m.color.clone()),
        ("width", num(m.width)),
    ])?;
    w.end("lane")
}

fn write_lane_section(w :&mut OdrWriter, ls :&LaneSection) -> quick_xml::Result<()> {
    w.start("laneSection", &[("s", num(ls.s))])?;
    let lanes = ls.sorted_lanes();
    for (tag, side) in &[("left", 1), ("center", 0), ("right", -1)] {
        let group :Vec<&&Lane> = lanes.iter().filter(|l| l.id.signum() == *side).collect();
        if group.is_empty() { continue; }
        w.start(tag, &[])?;
        for l in group {
            write_lane(w, l)?;
        }
        w.end(tag)?;
    }
    w.end("laneSection")
}

fn write_objects(w :&mut OdrWriter, objects :&[Object]) -> quick_xml::Result<()> {
    w.start("objects", &[])?;
    for o in objects {
        w.start("object", &[
            ("type", o.kind.clone()),
            ("name", o.kind.clone()),
            ("id", o.id.to_string()),
            ("s", num(o.s)),
            ("t", num(o.t)),
            ("zOffset", num(o.z)),
            ("hdg", num(o.hdg)),
            ("orientation", o.orientation.clone()),
            ("length", num(o.length)),
            ("width", num(o.width)),
            ("height", num(o.height)),
            ("roll", "0".to_string()),
            ("pitch", "0".to_string()),
        ])?;
        if let Some(rep) = o.repeat {
            w.empty("repeat", &[
                ("s", num(o.s)),
                ("length", num(rep.length)),
                ("distance", num(rep.distance)),
                ("tStart", num(o.t)),
                ("tEnd", num(o.t)),
                ("widthStart", num(o.width)),
                ("widthEnd", num(o.width)),
                ("heightStart", num(o.height)),
                ("heightEnd", num(o.height)),
                ("zOffsetStart", num(o.z)),
                ("zOffsetEnd", num(o.z)),
            ])?;
        }
        w.end("object")?;
    }
    w.end("objects")
}

fn write_signals(w :&mut OdrWriter, signals :&[Signal]) -> quick_xml::Result<()> {
    w.start("signals", &[])?;
    for s in signals {
        w.empty("signal", &[
            ("s", num(s.s)),
            ("t", num(s.t)),
            ("id", s.id.to_string()),
            ("name", s.kind.clone()),
            ("dynamic", if s.dynamic { "yes" } else { "no" }.to_string()),
            ("orientation", s.orientation.clone()),
            ("zOffset", num(s.z)),
            ("country", "OpenDRIVE".to_string()),
            ("type", s.kind.clone()),
            ("subtype", "-1".to_string()),
            ("value", num(s.value)),
            ("height", num(s.height)),
            ("width", num(s.width)),
        ])?;
    }
    w.end("signals")
}

fn write_road(w :&mut OdrWriter, r :&Road) -> quick_xml::Result<()> {
    w.start("road", &[
        ("name", format!("Road {}", r.id)),
        ("length", num(r.length())),
        ("id", r.id.to_string()),
        ("junction", r.junction.to_string()),
    ])?;

    if r.predecessor.is_some() || r.successor.is_some() {
        w.start("link", &[])?;
        if let Some(l) = &r.predecessor { write_link(w, "predecessor", l)?; }
        if let Some(l) = &r.successor { write_link(w, "successor", l)?; }
        w.end("link")?;
    } else {
        w.empty("link", &[])?;
    }

    let kind = r.classification.clone().unwrap_or_else(|| "town".to_string());
    w.empty("type", &[("s", "0".to_string()), ("type", kind)])?;

    w.start("planView", &[])?;
    for g in &r.plan_view.geometries {
        write_geometry(w, g)?;
    }
    w.end("planView")?;

    w.start("lanes", &[])?;
    for ls in &r.lane_sections {
        write_lane_section(w, ls)?;
    }
    w.end("lanes")?;

    write_objects(w, &r.objects)?;
    write_signals(w, &r.signals)?;
    w.end("road")
}

fn write_junction(w :&mut OdrWriter, j :&Junction) -> quick_xml::Result<()> {
    w.start("junction", &[("name", format!("Junction {}", j.id)), ("id", j.id.to_string())])?;
    for c in &j.connections {
        w.start("connection", &[
            ("id", c.id.to_string()),
            ("incomingRoad", c.incoming.to_string()),
            ("connectingRoad", c.connecting.to_string()),
            ("contactPoint", c.contact.as_str().to_string()),
        ])?;
        for (from, to) in &c.lane_links {
            w.empty("laneLink", &[("from", from.to_string()), ("to", to.to_string())])?;
        }
        w.end("connection")?;
    }
    w.end("junction")
}

fn write_controller(w :&mut OdrWriter, c :&Controller) -> quick_xml::Result<()> {
    w.start("controller", &[("id", c.id.to_string()), ("name", format!("Controller {}", c.id))])?;
    for s in &c.signals {
        w.empty("control", &[("signalId", s.to_string()), ("type", "0".to_string())])?;
    }
    w.end("controller")
}

pub fn write_opendrive(network :&RoadNetwork, config :&Config) -> quick_xml::Result<String> {
    let mut w = OdrWriter::new();
    w.w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("no"))))?;
    w.start("OpenDRIVE", &[
        ("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance".to_string()),
        ("xsi:noNamespaceSchemaLocation", config.schema_location.clone()),
    ])?;

    let (north, south, east, west) = bounds(network);
    w.empty("header", &[
        ("revMajor", config.rev_major.to_string()),
        ("revMinor", config.rev_minor.to_string()),
        ("name", network.name.clone()),
        ("version", "1.00".to_string()),
        ("date", chrono::Local::now().format("%Y-%m-%dT%H:%M:%S").to_string()),
        ("north", num(north)),
        ("south", num(south)),
        ("east", num(east)),
        ("west", num(west)),
    ])?;

    for r in &network.roads {
        write_road(&mut w, r)?;
    }
    for j in &network.junctions {
        write_junction(&mut w, j)?;
    }
    for c in &network.controllers {
        write_controller(&mut w, c)?;
    }
    w.end("OpenDRIVE")?;
    w.finish()
}

/// Write the network to `path`.
pub fn save(network :&RoadNetwork, config :&Config, path :&Path) -> crate::error::Result<()> {
    let text = write_opendrive(network, config)?;
    std::fs::write(path, text)?;
    info!("Wrote {} roads and {} junctions to {}", network.roads.len(), network.junctions.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use roadgeom::Pose;

    fn network() -> RoadNetwork {
        let mut net = RoadNetwork::new("unit");
        let mut r = Road::new(5, 5);
        r.plan_view.push(Pose::origin(), 10.0, Curve::Line);
        r.plan_view.push(Pose::origin(), 5.0, Curve::Arc { curvature: 0.1 });
        let mut ls = LaneSection::new(0.0);
        ls.lanes.push(Lane::center("solid"));
        ls.lanes.push(Lane { id: -1, kind: "driving".into(), width: Poly3::constant(3.5), road_mark: RoadMark::new("solid") });
        r.lane_sections.push(ls);
        r.successor = Some(Link::junction(2));
        r.signals.push(Signal {
            id: 3, kind: "1000001".into(), s: 2.0, t: -4.0, z: 0.0, orientation: "+".into(),
            dynamic: true, value: -1.0, width: 0.4, height: 2.0,
        });
        net.roads.push(r);
        net.junctions.push(Junction { id: 2, connections: vec![
            Connection { id: 1, incoming: 5, connecting: 6, contact: ContactPoint::Start, lane_links: vec![(1, -1)] },
        ]});
        net.controllers.push(Controller { id: 1, signals: vec![3] });
        net
    }

    #[test]
    fn document_structure() {
        let text = write_opendrive(&network(), &Config::default()).unwrap();
        let doc = roxmltree::Document::parse(&text).unwrap();
        let root = doc.root_element();
        assert!(root.has_tag_name("OpenDRIVE"));

        let header = root.children().find(|c| c.has_tag_name("header")).unwrap();
        assert_eq!(header.attribute("revMinor"), Some("5"));
        assert_eq!(header.attribute("name"), Some("unit"));

        let road = root.children().find(|c| c.has_tag_name("road")).unwrap();
        assert_eq!(road.attribute("id"), Some("5"));
        assert_eq!(road.attribute("length"), Some("15"));
        assert_eq!(road.attribute("junction"), Some("-1"));
        let succ = road.descendants().find(|c| c.has_tag_name("successor")).unwrap();
        assert_eq!(succ.attribute("elementType"), Some("junction"));
        assert_eq!(succ.attribute("contactPoint"), None);
        assert!(road.descendants().all(|c| !c.has_tag_name("predecessor")));

        let geoms :Vec<_> = road.descendants().filter(|c| c.has_tag_name("geometry")).collect();
        assert_eq!(geoms.len(), 2);
        assert_eq!(geoms[1].attribute("s"), Some("10"));
        assert!(geoms[1].children().any(|c| c.has_tag_name("arc")));

        let section = road.descendants().find(|c| c.has_tag_name("laneSection")).unwrap();
        let sides :Vec<&str> = section.children().filter(|c| c.is_element()).map(|c| c.tag_name().name()).collect();
        assert_eq!(sides, vec!["center", "right"]);
        let center = section.descendants().find(|c| c.has_tag_name("center")).unwrap();
        assert!(center.descendants().all(|c| !c.has_tag_name("width")));

        let junction = root.children().find(|c| c.has_tag_name("junction")).unwrap();
        let ll = junction.descendants().find(|c| c.has_tag_name("laneLink")).unwrap();
        assert_eq!((ll.attribute("from"), ll.attribute("to")), (Some("1"), Some("-1")));

        let control = root.descendants().find(|c| c.has_tag_name("control")).unwrap();
        assert_eq!(control.attribute("signalId"), Some("3"));
    }

    #[test]
    fn header_bounds() {
        let (n, s, e, w) = bounds(&network());
        assert!(e > 14.0 && w == 0.0);
        assert!(n > 1.0 && s == 0.0);
        assert_eq!(bounds(&RoadNetwork::new("empty")), (0.0, 0.0, 0.0, 0.0));
    }
}
