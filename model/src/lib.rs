/// Road network model for roadgen.
/// Contains:
///
///  * roads (reference line, lane sections, objects, signals, links),
///  * junctions (connections between incoming and connecting roads),
///  * controllers (groups of dynamic signals).
///
/// The structure follows OpenDRIVE 1.5 closely so the writer is a
/// direct traversal.

use serde::{Serialize, Deserialize};

pub mod network;
pub mod lanes;

pub use network::*;
pub use lanes::*;

pub type Id = i32;

/// Marker for "not part of a junction".
pub const NO_JUNCTION :Id = -1;

#[derive(Serialize, Deserialize)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactPoint { Start, End }

impl ContactPoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactPoint::Start => "start",
            ContactPoint::End => "end",
        }
    }
}

#[derive(Serialize, Deserialize)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType { Road, Junction }

impl ElementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementType::Road => "road",
            ElementType::Junction => "junction",
        }
    }
}

#[derive(Serialize, Deserialize)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
    pub element :ElementType,
    pub id :Id,
    /// Only meaningful for road elements.
    pub contact :Option<ContactPoint>,
}

impl Link {
    pub fn road(id :Id, contact :ContactPoint) -> Link {
        Link { element: ElementType::Road, id, contact: Some(contact) }
    }

    pub fn junction(id :Id) -> Link {
        Link { element: ElementType::Junction, id, contact: None }
    }
}
