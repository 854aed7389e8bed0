use thiserror::Error;
use roadgen_model::Id;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("input file: {0}")]
    Input(#[from] roadxml::DocErr),

    #[error("building segments: {0}")]
    Generation(#[from] GenError),

    #[error("linking segments: {0}")]
    Link(#[from] LinkError),

    #[error("writing OpenDRIVE: {0}")]
    Export(#[from] quick_xml::Error),

    #[error("output validation found {0} issue(s)")]
    Validation(usize),

    #[error("config: {0}")]
    Config(String),
}

#[derive(Debug, Error, PartialEq)]
pub enum GenError {
    #[error("junction {junction}: road {road} is not defined")]
    JunctionRoads { junction :Id, road :Id },

    #[error("junction {junction}: type needs {expected} additional roads, found {found}")]
    MissingAdRoads { junction :Id, expected :usize, found :usize },

    #[error("junction {junction}: road {road} is too short for the coupler area")]
    ArmTooShort { junction :Id, road :Id },

    #[error("junction {junction}: cannot connect lane id 0")]
    LaneZero { junction :Id },

    #[error("junction {junction}: lane {from} -> {to} must lead from an incoming (positive) to an outgoing (negative) lane")]
    LaneDirection { junction :Id, from :Id, to :Id },

    #[error("junction {junction}: road {road} has no lane {lane}")]
    LaneNotFound { junction :Id, road :Id, lane :Id },

    #[error("junction {junction}: id too large to number its roads")]
    IdOverflow { junction :Id },

    #[error("junction {junction}: generated road id {road} is already in use")]
    RoadIdTaken { junction :Id, road :Id },

    #[error("junction {junction}: no arm with id {road}")]
    ArmNotFound { junction :Id, road :Id },

    #[error("junction {junction}: {source}")]
    Geometry { junction :Id, source :roadgeom::GeomErr },
}

#[derive(Debug, Error, PartialEq)]
pub enum LinkError {
    #[error("segment {segment} has no road {road} at {pos}")]
    RoadNotFound { segment :Id, road :Id, pos :&'static str },
}
