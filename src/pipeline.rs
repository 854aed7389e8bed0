use std::path::{Path, PathBuf};
use log::*;
use roadgen_model::RoadNetwork;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::{generation, linking, opendrive, validate};

const LOGO :&str = r"
                     _
  _ __ ___   __ _  __| | __ _  ___ _ __
 | '__/ _ \ / _` |/ _` |/ _` |/ _ \ '_ \
 | | | (_) | (_| | (_| | (_| |  __/ | | |
 |_|  \___/ \__,_|\__,_|\__, |\___|_| |_|
                        |___/
";

#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Output file; defaults to the input with the extension `.xodr`.
    pub output :Option<PathBuf>,
    pub config :Config,
    /// Also write the generated network as ron next to the output.
    pub dump :bool,
}

/// Parse, build, link and validate a network from input document text.
pub fn generate(text :&str, name :&str, config :&Config) -> Result<RoadNetwork> {
    let input = roadxml::parse_road_network(text)?;
    debug!("Input has {} segments", input.segments.len());
    let mut network = generation::build_segments(&input, name, config)?;
    linking::link_segments(input.links.as_ref(), &mut network)?;

    let issues = validate::validate(&network);
    for issue in &issues {
        warn!("{}", issue);
    }
    if config.strict && !issues.is_empty() {
        return Err(Error::Validation(issues.len()));
    }
    Ok(network)
}

pub fn output_path(input :&Path, opts :&Options) -> PathBuf {
    opts.output.clone().unwrap_or_else(|| input.with_extension("xodr"))
}

/// Run the whole generator on one input file and return the path of the
/// written OpenDRIVE file.
pub fn execute_pipeline(input :&Path, opts :&Options) -> Result<PathBuf> {
    if !opts.config.silent {
        println!("{}", LOGO);
        println!("Input file: {}", input.display());
    }
    info!("Loading {}", input.display());
    let text = std::fs::read_to_string(input)?;
    let name = input.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    let network = generate(&text, &name, &opts.config)?;

    let out = output_path(input, opts);
    if opts.dump {
        let dump = out.with_extension("ron");
        let text = ron::ser::to_string_pretty(&network, ron::ser::PrettyConfig::default())
            .map_err(|e| Error::Config(e.to_string()))?;
        std::fs::write(&dump, text)?;
        info!("Dumped network to {}", dump.display());
    }
    opendrive::save(&network, &opts.config, &out)?;
    if !opts.config.silent {
        println!("Output file: {}", out.display());
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC :&str = r#"<roadNetwork>
      <segments>
        <road id="1"><referenceLine><line length="50"/></referenceLine></road>
        <junction id="2" type="MA">
          <intersectionPoint refRoad="1" s="50"><adRoad refRoad="2" s="0" angle="1.5707963267948966"/></intersectionPoint>
          <coupler><couplerArea sOffset="15"/><connection type="all"/></coupler>
          <road id="1"><referenceLine><line length="100"/></referenceLine></road>
          <road id="2"><referenceLine><arc length="40" R="80"/></referenceLine></road>
        </junction>
      </segments>
      <links refId="2">
        <segmentLink fromSegment="2" fromRoad="1" fromPos="end" toSegment="1" toRoad="1" toPos="start"/>
      </links>
    </roadNetwork>"#;

    #[test]
    fn road_attached_to_junction() {
        let net = generate(DOC, "doc", &Config::default()).unwrap();
        assert!(validate::validate(&net).is_empty());
        let road = net.road(1).unwrap();
        assert_eq!(road.predecessor.map(|l| l.id), Some(202));
        let start = road.plan_view.start_pose().unwrap();
        assert!((start.x - 100.0).abs() < 1e-6 && start.y.abs() < 1e-6);
    }

    #[test]
    fn unlinked_and_unknown_roads() {
        let doc = DOC.replace(r#"<segmentLink fromSegment="2" fromRoad="1" fromPos="end" toSegment="1" toRoad="1" toPos="start"/>"#, "");
        let mut config = Config::default();
        config.strict = true;
        // the standalone road stays at the origin, still a valid network
        assert!(generate(&doc, "doc", &config).is_ok());

        let bad = DOC.replace(r#"toRoad="1""#, r#"toRoad="3""#);
        assert!(matches!(generate(&bad, "doc", &config), Err(Error::Link(_))));
    }

    #[test]
    fn strict_mode_fails_on_issues() {
        // two straight roads linked into a loop cannot close it
        let doc = r#"<roadNetwork>
          <segments>
            <road id="1"><referenceLine><line length="10"/></referenceLine></road>
            <road id="2"><referenceLine><line length="10"/></referenceLine></road>
          </segments>
          <links refId="1">
            <segmentLink fromSegment="1" fromRoad="1" fromPos="end" toSegment="2" toRoad="2" toPos="start"/>
            <segmentLink fromSegment="2" fromRoad="2" fromPos="end" toSegment="1" toRoad="1" toPos="start"/>
          </links>
        </roadNetwork>"#;
        let mut config = Config::default();
        let net = generate(doc, "loop", &config).unwrap();
        assert_eq!(validate::validate(&net).len(), 2);

        config.strict = true;
        assert!(matches!(generate(doc, "loop", &config), Err(Error::Validation(2))));
    }

    #[test]
    fn writes_output_next_to_input() {
        let dir = std::env::temp_dir().join(format!("roadgen-pipeline-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let input = dir.join("net.xml");
        std::fs::write(&input, DOC).unwrap();

        let mut opts = Options::default();
        opts.config.silent = true;
        opts.dump = true;
        let out = execute_pipeline(&input, &opts).unwrap();
        assert_eq!(out, dir.join("net.xodr"));
        let text = std::fs::read_to_string(&out).unwrap();
        assert!(text.contains("<OpenDRIVE"));
        assert!(dir.join("net.ron").exists());
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
