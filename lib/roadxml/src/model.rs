//
// Logical road network input model
//

pub type Id = i32;

#[derive(Debug, Clone)]
pub struct RoadNetworkInput {
    pub segments :Vec<Segment>,
    pub links :Option<Links>,
}

#[derive(Debug, Clone)]
pub enum Segment {
    Road(RoadDef),
    Junction(JunctionDef),
}

impl Segment {
    pub fn id(&self) -> Id {
        match self {
            Segment::Road(r) => r.id,
            Segment::Junction(j) => j.id,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RoadDef {
    pub id :Id,
    pub classification :Option<String>,
    pub reference_line :Vec<Primitive>,
    pub lanes :Vec<LaneDef>,
    pub objects :Vec<ObjectDef>,
    pub signals :Vec<SignalDef>,
}

impl RoadDef {
    pub fn length(&self) -> f64 {
        self.reference_line.iter().map(|p| p.length()).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive {
    Line { length :f64 },
    Arc { length :f64, curvature :f64 },
    Spiral { length :f64, curv_start :f64, curv_end :f64 },
}

impl Primitive {
    pub fn length(&self) -> f64 {
        match self {
            Primitive::Line { length } |
            Primitive::Arc { length, .. } |
            Primitive::Spiral { length, .. } => *length,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LaneDef {
    pub id :Id,
    pub kind :String,
    pub width :Option<f64>,
    pub road_mark :Option<RoadMarkDef>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoadMarkDef {
    pub kind :String,
    pub color :String,
    pub weight :String,
    pub width :f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectDef {
    pub id :Id,
    pub kind :String,
    pub s :f64,
    pub t :f64,
    pub z :f64,
    pub hdg :f64,
    pub orientation :String,
    pub length :f64,
    pub width :f64,
    pub height :f64,
    pub repeat :Option<RepeatDef>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RepeatDef {
    pub length :f64,
    pub distance :f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignalDef {
    pub id :Id,
    pub kind :String,
    pub s :f64,
    pub t :f64,
    pub z :f64,
    pub orientation :String,
    pub dynamic :bool,
    pub value :f64,
    pub width :f64,
    pub height :f64,
    pub controller :Option<Id>,
}

#[derive(Debug, Clone)]
pub struct JunctionDef {
    pub id :Id,
    pub kind :JunctionType,
    pub intersection :IntersectionPoint,
    pub coupler :Coupler,
    pub roads :Vec<RoadDef>,
}

/// Junction layouts. `M` roads pass through the intersection point, `A`
/// roads start at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JunctionType {
    TwoMain,
    MainTwoAccess,
    FourAccess,
    MainAccess,
    ThreeAccess,
}

impl JunctionType {
    pub fn from_str(x :&str) -> Option<JunctionType> {
        match x {
            "2M" => Some(JunctionType::TwoMain),
            "M2A" => Some(JunctionType::MainTwoAccess),
            "4A" => Some(JunctionType::FourAccess),
            "MA" => Some(JunctionType::MainAccess),
            "3A" => Some(JunctionType::ThreeAccess),
            _ => None,
        }
    }

    pub fn num_arms(&self) -> usize {
        match self {
            JunctionType::TwoMain | JunctionType::MainTwoAccess | JunctionType::FourAccess => 4,
            JunctionType::MainAccess | JunctionType::ThreeAccess => 3,
        }
    }

    /// Number of `adRoad` entries the intersection point needs.
    pub fn num_additional(&self) -> usize {
        match self {
            JunctionType::TwoMain | JunctionType::MainAccess => 1,
            JunctionType::MainTwoAccess | JunctionType::ThreeAccess => 2,
            JunctionType::FourAccess => 3,
        }
    }

    pub fn main_passes(&self) -> bool {
        !matches!(self, JunctionType::FourAccess | JunctionType::ThreeAccess)
    }

    pub fn additional_passes(&self) -> bool {
        matches!(self, JunctionType::TwoMain)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionPoint {
    pub ref_road :Id,
    pub s :f64,
    pub ad_roads :Vec<AdRoad>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdRoad {
    pub ref_road :Id,
    pub s :f64,
    pub angle :f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Coupler {
    pub s_offset :Option<f64>,
    pub road_offsets :Vec<(Id, f64)>,
    pub connection :ConnectionMode,
}

impl Coupler {
    pub fn offset_for(&self, road :Id, default :f64) -> f64 {
        self.road_offsets.iter().find(|(id, _)| *id == road).map(|(_, o)| *o)
            .or(self.s_offset)
            .unwrap_or(default)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionMode {
    All,
    Single(Vec<RoadLinkDef>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoadLinkDef {
    pub from_road :Id,
    pub to_road :Id,
    pub lane_links :Vec<LaneLinkDef>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LaneLinkDef {
    pub from :Id,
    pub to :Id,
    pub left :Option<String>,
    pub right :Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Links {
    pub ref_id :Id,
    pub hdg_offset :f64,
    pub x_offset :f64,
    pub y_offset :f64,
    pub segment_links :Vec<SegmentLink>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SegmentLink {
    pub from_segment :Id,
    pub from_road :Id,
    pub from_pos :ContactPos,
    pub to_segment :Id,
    pub to_road :Id,
    pub to_pos :ContactPos,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactPos { Start, End }

impl ContactPos {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactPos::Start => "start",
            ContactPos::End => "end",
        }
    }
}
