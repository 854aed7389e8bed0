use crate::model::*;
use roxmltree as xml;
use log::*;

pub type ByteOffset = usize;

#[derive(Debug, Clone, PartialEq)]
pub enum DocErr {
    Xml(String),
    ElementMissing(&'static str, ByteOffset),
    AttributeMissing(&'static str, ByteOffset),
    UnexpectedElement(String, ByteOffset),
    NumberError(&'static str, ByteOffset),
    BoolError(&'static str, ByteOffset),
    EnumErr(&'static str, ByteOffset),
}

impl std::fmt::Display for DocErr {
    fn fmt(&self, f :&mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            DocErr::Xml(e) => write!(f, "malformed xml: {}", e),
            DocErr::ElementMissing(e, p) => write!(f, "element '{}' missing (byte {})", e, p),
            DocErr::AttributeMissing(a, p) => write!(f, "attribute '{}' missing (byte {})", a, p),
            DocErr::UnexpectedElement(e, p) => write!(f, "unexpected element {} (byte {})", e, p),
            DocErr::NumberError(a, p) => write!(f, "attribute '{}' is not a number (byte {})", a, p),
            DocErr::BoolError(a, p) => write!(f, "attribute '{}' is not a boolean (byte {})", a, p),
            DocErr::EnumErr(choices, p) => write!(f, "expected one of {} (byte {})", choices, p),
        }
    }
}

impl std::error::Error for DocErr {}

pub fn parse_road_network(data :&str) -> Result<RoadNetworkInput, DocErr> {
    let doc = xml::Document::parse(data).map_err(|e| DocErr::Xml(e.to_string()))?;
    let root = doc.root_element();
    if !root.has_tag_name("roadNetwork") {
        return Err(DocErr::UnexpectedElement(root.tag_name().name().to_string(), root.range().start));
    }

    let segments_node = child(&root, "segments")?;
    let mut segments = Vec::new();
    for seg in segments_node.children().filter(|c| c.is_element()) {
        match seg.tag_name().name() {
            "road" => segments.push(Segment::Road(parse_road(&seg)?)),
            "junction" => segments.push(Segment::Junction(parse_junction(&seg)?)),
            other => return Err(DocErr::UnexpectedElement(other.to_string(), seg.range().start)),
        }
    }
    debug!("Parsed {} segments", segments.len());

    let links = match root.children().find(|c| c.has_tag_name("links")) {
        Some(l) => Some(parse_links(&l)?),
        None => None,
    };

    Ok(RoadNetworkInput { segments, links })
}

fn child<'a, 'i>(node :&xml::Node<'a, 'i>, name :&'static str) -> Result<xml::Node<'a, 'i>, DocErr> {
    node.children().find(|c| c.has_tag_name(name))
        .ok_or(DocErr::ElementMissing(name, node.range().start))
}

fn req_str(node :&xml::Node, name :&'static str) -> Result<String, DocErr> {
    node.attribute(name).map(|x| x.to_string())
        .ok_or(DocErr::AttributeMissing(name, node.range().start))
}

fn opt_str(node :&xml::Node, name :&'static str) -> Option<String> {
    node.attribute(name).map(|x| x.to_string())
}

fn opt_f64(node :&xml::Node, name :&'static str) -> Result<Option<f64>, DocErr> {
    match node.attribute(name) {
        Some(x) => x.trim().parse::<f64>().ok()
            .filter(|v| v.is_finite())
            .map(Some)
            .ok_or(DocErr::NumberError(name, node.range().start)),
        None => Ok(None),
    }
}

fn req_f64(node :&xml::Node, name :&'static str) -> Result<f64, DocErr> {
    opt_f64(node, name)?.ok_or(DocErr::AttributeMissing(name, node.range().start))
}

fn opt_id(node :&xml::Node, name :&'static str) -> Result<Option<Id>, DocErr> {
    match node.attribute(name) {
        Some(x) => Ok(Some(x.trim().parse::<Id>().map_err(|_e| DocErr::NumberError(name, node.range().start))?)),
        None => Ok(None),
    }
}

fn req_id(node :&xml::Node, name :&'static str) -> Result<Id, DocErr> {
    opt_id(node, name)?.ok_or(DocErr::AttributeMissing(name, node.range().start))
}

fn opt_bool(node :&xml::Node, name :&'static str) -> Result<Option<bool>, DocErr> {
    match node.attribute(name) {
        Some("true") | Some("yes") | Some("1") => Ok(Some(true)),
        Some("false") | Some("no") | Some("0") => Ok(Some(false)),
        Some(_) => Err(DocErr::BoolError(name, node.range().start)),
        None => Ok(None),
    }
}

pub fn parse_road(road :&xml::Node) -> Result<RoadDef, DocErr> {
    let id = req_id(road, "id")?;
    let refline = child(road, "referenceLine")?;
    let mut reference_line = Vec::new();
    for p in refline.children().filter(|c| c.is_element()) {
        reference_line.push(parse_primitive(&p)?);
    }
    if reference_line.is_empty() {
        return Err(DocErr::ElementMissing("line or arc or spiral", refline.range().start));
    }

    let mut lanes = Vec::new();
    if let Some(ls) = road.children().find(|c| c.has_tag_name("lanes")) {
        for l in ls.children().filter(|c| c.is_element()) {
            if !l.has_tag_name("lane") {
                return Err(DocErr::UnexpectedElement(l.tag_name().name().to_string(), l.range().start));
            }
            lanes.push(parse_lane(&l)?);
        }
    }

    let mut objects = Vec::new();
    let mut signals = Vec::new();
    if let Some(os) = road.children().find(|c| c.has_tag_name("objects")) {
        for o in os.children().filter(|c| c.is_element()) {
            match o.tag_name().name() {
                "object" => objects.push(parse_object(&o)?),
                "signal" => signals.push(parse_signal(&o)?),
                other => return Err(DocErr::UnexpectedElement(other.to_string(), o.range().start)),
            }
        }
    }

    Ok(RoadDef {
        id,
        classification: opt_str(road, "classification"),
        reference_line,
        lanes,
        objects,
        signals,
    })
}

fn curvature_from(node :&xml::Node, radius :&'static str, curvature :&'static str) -> Result<f64, DocErr> {
    if let Some(c) = opt_f64(node, curvature)? { return Ok(c); }
    match opt_f64(node, radius)? {
        Some(r) if r == 0.0 => Ok(0.0),
        Some(r) => Ok(1.0 / r),
        None => Err(DocErr::AttributeMissing(radius, node.range().start)),
    }
}

fn parse_primitive(p :&xml::Node) -> Result<Primitive, DocErr> {
    let length = req_f64(p, "length")?;
    if length <= 0.0 {
        return Err(DocErr::NumberError("length", p.range().start));
    }
    match p.tag_name().name() {
        "line" => Ok(Primitive::Line { length }),
        "arc" => Ok(Primitive::Arc { length, curvature: curvature_from(p, "R", "curvature")? }),
        "spiral" => Ok(Primitive::Spiral {
            length,
            curv_start: curvature_from(p, "Rs", "curvStart")?,
            curv_end: curvature_from(p, "Re", "curvEnd")?,
        }),
        other => Err(DocErr::UnexpectedElement(other.to_string(), p.range().start)),
    }
}

fn parse_lane(l :&xml::Node) -> Result<LaneDef, DocErr> {
    let road_mark = match l.children().find(|c| c.has_tag_name("roadMark")) {
        Some(rm) => Some(RoadMarkDef {
            kind: opt_str(&rm, "type").unwrap_or_else(|| "solid".to_string()),
            color: opt_str(&rm, "color").unwrap_or_else(|| "white".to_string()),
            weight: opt_str(&rm, "weight").unwrap_or_else(|| "standard".to_string()),
            width: opt_f64(&rm, "width")?.unwrap_or(0.15),
        }),
        None => None,
    };
    Ok(LaneDef {
        id: req_id(l, "id")?,
        kind: opt_str(l, "type").unwrap_or_else(|| "driving".to_string()),
        width: opt_f64(l, "width")?,
        road_mark,
    })
}

fn parse_object(o :&xml::Node) -> Result<ObjectDef, DocErr> {
    let repeat = if opt_bool(o, "repeat")?.unwrap_or(false) {
        Some(RepeatDef {
            length: req_f64(o, "repeatLength")?,
            distance: req_f64(o, "distance")?,
        })
    } else { None };

    Ok(ObjectDef {
        id: req_id(o, "id")?,
        kind: req_str(o, "type")?,
        s: req_f64(o, "s")?,
        t: opt_f64(o, "t")?.unwrap_or(0.0),
        z: opt_f64(o, "zOffset")?.unwrap_or(0.0),
        hdg: opt_f64(o, "hdg")?.unwrap_or(0.0),
        orientation: opt_str(o, "orientation").unwrap_or_else(|| "none".to_string()),
        length: opt_f64(o, "length")?.unwrap_or(0.0),
        width: opt_f64(o, "width")?.unwrap_or(0.0),
        height: opt_f64(o, "height")?.unwrap_or(0.0),
        repeat,
    })
}

fn parse_signal(s :&xml::Node) -> Result<SignalDef, DocErr> {
    Ok(SignalDef {
        id: req_id(s, "id")?,
        kind: req_str(s, "type")?,
        s: req_f64(s, "s")?,
        t: opt_f64(s, "t")?.unwrap_or(0.0),
        z: opt_f64(s, "zOffset")?.unwrap_or(0.0),
        orientation: opt_str(s, "orientation").unwrap_or_else(|| "+".to_string()),
        dynamic: opt_bool(s, "dynamic")?.unwrap_or(false),
        value: opt_f64(s, "value")?.unwrap_or(-1.0),
        width: opt_f64(s, "width")?.unwrap_or(0.4),
        height: opt_f64(s, "height")?.unwrap_or(2.0),
        controller: opt_id(s, "controller")?,
    })
}

fn parse_junction(j :&xml::Node) -> Result<JunctionDef, DocErr> {
    let kind_str = req_str(j, "type")?;
    let kind = JunctionType::from_str(&kind_str)
        .ok_or(DocErr::EnumErr("2M, M2A, 4A, MA, 3A", j.range().start))?;

    let ip = child(j, "intersectionPoint")?;
    let mut ad_roads = Vec::new();
    for ad in ip.children().filter(|c| c.has_tag_name("adRoad")) {
        ad_roads.push(AdRoad {
            ref_road: req_id(&ad, "refRoad")?,
            s: req_f64(&ad, "s")?,
            angle: req_f64(&ad, "angle")?,
        });
    }
    let intersection = IntersectionPoint {
        ref_road: req_id(&ip, "refRoad")?,
        s: req_f64(&ip, "s")?,
        ad_roads,
    };

    let mut roads = Vec::new();
    for r in j.children().filter(|c| c.has_tag_name("road")) {
        roads.push(parse_road(&r)?);
    }

    Ok(JunctionDef {
        id: req_id(j, "id")?,
        kind,
        intersection,
        coupler: parse_coupler(j)?,
        roads,
    })
}

fn parse_coupler(j :&xml::Node) -> Result<Coupler, DocErr> {
    let coupler = match j.children().find(|c| c.has_tag_name("coupler")) {
        Some(c) => c,
        None => return Ok(Coupler { s_offset: None, road_offsets: Vec::new(), connection: ConnectionMode::All }),
    };

    let mut s_offset = None;
    let mut road_offsets = Vec::new();
    if let Some(area) = coupler.children().find(|c| c.has_tag_name("couplerArea")) {
        s_offset = opt_f64(&area, "sOffset")?;
        for r in area.children().filter(|c| c.has_tag_name("road")) {
            road_offsets.push((req_id(&r, "id")?, req_f64(&r, "sOffset")?));
        }
    }

    let connection = match coupler.children().find(|c| c.has_tag_name("connection")) {
        None => ConnectionMode::All,
        Some(con) => match con.attribute("type").unwrap_or("all") {
            "all" => ConnectionMode::All,
            "single" => {
                let mut road_links = Vec::new();
                for rl in con.children().filter(|c| c.has_tag_name("roadLink")) {
                    let mut lane_links = Vec::new();
                    for ll in rl.children().filter(|c| c.has_tag_name("laneLink")) {
                        lane_links.push(LaneLinkDef {
                            from: req_id(&ll, "fromId")?,
                            to: req_id(&ll, "toId")?,
                            left: opt_str(&ll, "left"),
                            right: opt_str(&ll, "right"),
                        });
                    }
                    road_links.push(RoadLinkDef {
                        from_road: req_id(&rl, "fromId")?,
                        to_road: req_id(&rl, "toId")?,
                        lane_links,
                    });
                }
                ConnectionMode::Single(road_links)
            },
            _ => return Err(DocErr::EnumErr("all, single", con.range().start)),
        },
    };

    Ok(Coupler { s_offset, road_offsets, connection })
}

fn parse_pos(node :&xml::Node, name :&'static str) -> Result<ContactPos, DocErr> {
    match req_str(node, name)?.as_str() {
        "start" => Ok(ContactPos::Start),
        "end" => Ok(ContactPos::End),
        _ => Err(DocErr::EnumErr("start, end", node.range().start)),
    }
}

fn parse_links(links :&xml::Node) -> Result<Links, DocErr> {
    let mut segment_links = Vec::new();
    for l in links.children().filter(|c| c.is_element()) {
        if !l.has_tag_name("segmentLink") {
            return Err(DocErr::UnexpectedElement(l.tag_name().name().to_string(), l.range().start));
        }
        segment_links.push(SegmentLink {
            from_segment: req_id(&l, "fromSegment")?,
            from_road: req_id(&l, "fromRoad")?,
            from_pos: parse_pos(&l, "fromPos")?,
            to_segment: req_id(&l, "toSegment")?,
            to_road: req_id(&l, "toRoad")?,
            to_pos: parse_pos(&l, "toPos")?,
        });
    }

    Ok(Links {
        ref_id: req_id(links, "refId")?,
        hdg_offset: opt_f64(links, "hdgOffset")?.unwrap_or(0.0),
        x_offset: opt_f64(links, "xOffset")?.unwrap_or(0.0),
        y_offset: opt_f64(links, "yOffset")?.unwrap_or(0.0),
        segment_links,
    })
}
