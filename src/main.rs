use std::path::PathBuf;
use clap::Parser;
use log::*;
use roadgen::config::Config;
use roadgen::pipeline::{execute_pipeline, Options};

/// Generate an OpenDRIVE road network from a road network description.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Input road network description (xml)
    input :PathBuf,

    /// Output file, defaults to the input file with extension .xodr
    #[arg(short, long)]
    output :Option<PathBuf>,

    /// Suppress banner and progress output
    #[arg(short, long)]
    silent :bool,

    /// Settings file (ron) instead of the user config
    #[arg(long)]
    config :Option<PathBuf>,

    /// Also write the generated network as ron
    #[arg(long)]
    dump :bool,

    /// Store the effective settings as user config
    #[arg(long)]
    save_config :bool,
}

fn main() {
    env_logger::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();
    info!("Starting {} v{}.", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    let mut config = match &args.config {
        Some(path) => match Config::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                error!("Could not read settings: {}", e);
                std::process::exit(1);
            }
        },
        None => Config::load(),
    };
    config.silent |= args.silent;
    if args.save_config {
        config.save();
    }

    let opts = Options { output: args.output, config, dump: args.dump };
    match execute_pipeline(&args.input, &opts) {
        Ok(out) => debug!("Finished, wrote {}", out.display()),
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}
