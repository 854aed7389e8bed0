use serde::{Serialize, Deserialize};
use roadgeom::{PlanView, Pose};
use crate::*;

#[derive(Serialize, Deserialize)]
#[derive(Debug, Clone, Default)]
pub struct RoadNetwork {
    pub name :String,
    pub roads :Vec<Road>,
    pub junctions :Vec<Junction>,
    pub controllers :Vec<Controller>,
}

#[derive(Serialize, Deserialize)]
#[derive(Debug, Clone)]
pub struct Road {
    pub id :Id,
    /// Input segment this road was generated from.
    pub segment :Id,
    /// Input road id, and which end of the input road this piece contains.
    pub input_id :Id,
    pub input_pos :Option<ContactPoint>,
    pub junction :Id,
    pub classification :Option<String>,
    pub predecessor :Option<Link>,
    pub successor :Option<Link>,
    pub plan_view :PlanView,
    pub lane_sections :Vec<LaneSection>,
    pub objects :Vec<Object>,
    pub signals :Vec<Signal>,
}

impl Road {
    pub fn new(id :Id, segment :Id) -> Road {
        Road {
            id,
            segment,
            input_id: id,
            input_pos: None,
            junction: NO_JUNCTION,
            classification: None,
            predecessor: None,
            successor: None,
            plan_view: PlanView::new(),
            lane_sections: Vec::new(),
            objects: Vec::new(),
            signals: Vec::new(),
        }
    }

    pub fn length(&self) -> f64 {
        self.plan_view.length()
    }

    /// Pose at a contact point, heading pointing out of the road.
    pub fn outward_pose(&self, contact :ContactPoint) -> Option<Pose> {
        match contact {
            ContactPoint::Start => self.plan_view.start_pose().map(|p| p.flipped()),
            ContactPoint::End => self.plan_view.end_pose(),
        }
    }

    pub fn set_link(&mut self, contact :ContactPoint, link :Link) {
        match contact {
            ContactPoint::Start => self.predecessor = Some(link),
            ContactPoint::End => self.successor = Some(link),
        }
    }

    /// Lane section valid at the road start.
    pub fn first_section(&self) -> Option<&LaneSection> {
        self.lane_sections.first()
    }
}

#[derive(Serialize, Deserialize)]
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
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
    pub repeat :Option<Repeat>,
}

#[derive(Serialize, Deserialize)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Repeat {
    pub length :f64,
    pub distance :f64,
}

#[derive(Serialize, Deserialize)]
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
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
}

#[derive(Serialize, Deserialize)]
#[derive(Debug, Clone, PartialEq)]
pub struct Junction {
    pub id :Id,
    pub connections :Vec<Connection>,
}

#[derive(Serialize, Deserialize)]
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    pub id :Id,
    pub incoming :Id,
    pub connecting :Id,
    pub contact :ContactPoint,
    pub lane_links :Vec<(Id, Id)>,
}

#[derive(Serialize, Deserialize)]
#[derive(Debug, Clone, PartialEq)]
pub struct Controller {
    pub id :Id,
    pub signals :Vec<Id>,
}

impl RoadNetwork {
    pub fn new(name :&str) -> RoadNetwork {
        RoadNetwork { name: name.to_string(), ..Default::default() }
    }

    pub fn road(&self, id :Id) -> Option<&Road> {
        self.roads.iter().find(|r| r.id == id)
    }

    pub fn road_mut(&mut self, id :Id) -> Option<&mut Road> {
        self.roads.iter_mut().find(|r| r.id == id)
    }

    pub fn junction(&self, id :Id) -> Option<&Junction> {
        self.junctions.iter().find(|j| j.id == id)
    }

    pub fn is_junction_segment(&self, segment :Id) -> bool {
        self.junctions.iter().any(|j| j.id == segment)
    }

    pub fn segment_roads_mut<'a>(&'a mut self, segment :Id) -> impl Iterator<Item = &'a mut Road> + 'a {
        self.roads.iter_mut().filter(move |r| r.segment == segment)
    }

    /// Attach a signal to a controller, creating the controller if needed.
    pub fn add_controlled_signal(&mut self, controller :Id, signal :Id) {
        match self.controllers.iter_mut().find(|c| c.id == controller) {
            Some(c) => c.signals.push(signal),
            None => self.controllers.push(Controller { id: controller, signals: vec![signal] }),
        }
    }
}
