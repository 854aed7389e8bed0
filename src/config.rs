use std::path::Path;
use log::*;
use serde::{Serialize, Deserialize};

/// Generator settings not part of the input document.
#[derive(Serialize, Deserialize)]
#[derive(Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Width of lanes that do not specify one.
    pub default_lane_width :f64,
    /// Distance from the intersection point to the junction arms, unless
    /// the coupler says otherwise.
    pub default_coupler_offset :f64,
    /// Arcs tighter than this are reported.
    pub min_arc_radius :f64,
    /// Written to `xsi:noNamespaceSchemaLocation`.
    pub schema_location :String,
    pub rev_major :u32,
    pub rev_minor :u32,
    /// Treat validation issues as errors.
    pub strict :bool,
    /// Suppress the banner.
    pub silent :bool,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            default_lane_width: 3.5,
            default_coupler_offset: 20.0,
            min_arc_radius: 10.0,
            schema_location: "../xml/output.xsd".to_string(),
            rev_major: 1,
            rev_minor: 5,
            strict: false,
            silent: false,
        }
    }
}

impl Config {
    /// User config stored under the package name, defaults if unreadable.
    pub fn load() -> Self {
        confy::load(env!("CARGO_PKG_NAME")).
            unwrap_or_else(|e| {
                error!("Could not load config file: {}", e);
                Default::default()
            })
    }

    pub fn save(&self) {
        if let Err(e) = confy::store(env!("CARGO_PKG_NAME"), self.clone()) {
            error!("Could not save config file: {}", e);
        }
    }

    /// Read settings from a ron file; missing fields keep their defaults.
    pub fn from_file(path :&Path) -> Result<Self, String> {
        let s = std::fs::read_to_string(path)
            .map_err(|e| format!("{}: {}", path.display(), e))?;
        Config::from_ron(&s)
    }

    pub fn from_ron(s :&str) -> Result<Self, String> {
        ron::de::from_str(s).map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_ron_keeps_defaults() {
        let c = Config::from_ron("(default_lane_width: 3.0, strict: true)").unwrap();
        assert_eq!(c.default_lane_width, 3.0);
        assert!(c.strict);
        assert_eq!(c.default_coupler_offset, 20.0);
        assert_eq!(c.rev_minor, 5);
    }

    #[test]
    fn bad_ron() {
        assert!(Config::from_ron("(default_lane_width: \"wide\")").is_err());
    }
}
