use std::path::{Path, PathBuf};
use std::sync::mpsc;
use clap::Parser;
use log::*;
use roadgen::config::Config;
use roadgen::pipeline::{execute_pipeline, Options};
use roadvariation::{parse_template, vary};

/// Write variants of a road network template, optionally generating
/// OpenDRIVE output for each of them.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Template file: input document with a <vars> block
    template :PathBuf,

    /// Number of variants
    #[arg(short, default_value_t = 10)]
    n :usize,

    /// Output directory, defaults to the template's directory
    #[arg(short, long)]
    output :Option<PathBuf>,

    /// Random seed, drawn at random if not given
    #[arg(long)]
    seed :Option<u64>,

    /// Run the road network generator on every variant
    #[arg(short, long)]
    generate :bool,

    /// Worker threads for --generate
    #[arg(short, long, default_value_t = 4)]
    jobs :usize,
}

fn write_variants(args :&Args) -> Result<Vec<PathBuf>, String> {
    let text = std::fs::read_to_string(&args.template)
        .map_err(|e| format!("{}: {}", args.template.display(), e))?;
    let template = parse_template(&text).map_err(|e| e.to_string())?;

    let seed = args.seed.unwrap_or_else(rand::random);
    info!("Drawing {} variants with seed {}", args.n, seed);
    let docs = vary(&template, args.n, seed).map_err(|e| e.to_string())?;

    let dir = match &args.output {
        Some(d) => d.clone(),
        None => args.template.parent().map(Path::to_path_buf).unwrap_or_default(),
    };
    std::fs::create_dir_all(&dir).map_err(|e| format!("{}: {}", dir.display(), e))?;
    let stem = args.template.file_stem().map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "variant".to_string());

    let mut paths = Vec::new();
    for (i, doc) in docs.iter().enumerate() {
        let path = dir.join(format!("{}_{}.xml", stem, i));
        std::fs::write(&path, doc).map_err(|e| format!("{}: {}", path.display(), e))?;
        debug!("Wrote {}", path.display());
        paths.push(path);
    }
    Ok(paths)
}

/// Generate all variants on a worker pool; returns the number of failures.
fn generate_all(paths :Vec<PathBuf>, jobs :usize, mut config :Config) -> usize {
    config.silent = true;
    let opts = Options { config, ..Default::default() };

    let pool = threadpool::ThreadPool::new(jobs.max(1));
    let (tx, rx) = mpsc::channel();
    let n = paths.len();
    for path in paths {
        let tx = tx.clone();
        let opts = opts.clone();
        pool.execute(move || {
            let result = execute_pipeline(&path, &opts);
            let _ = tx.send((path, result));
        });
    }

    drop(tx);

    let mut failed = 0;
    let mut received = 0;
    for (path, result) in rx.iter() {
        received += 1;
        match result {
            Ok(out) => info!("{} -> {}", path.display(), out.display()),
            Err(e) => {
                error!("{}: {}", path.display(), e);
                failed += 1;
            }
        }
    }
    if received < n {
        error!("{} variant(s) aborted without a result", n - received);
    }
    failed + (n - received)
}

fn main() {
    env_logger::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let paths = match write_variants(&args) {
        Ok(p) => p,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };
    println!("Wrote {} variants of {}", paths.len(), args.template.display());

    if args.generate {
        let n = paths.len();
        let failed = generate_all(paths, args.jobs, Config::load());
        println!("Generated {} of {} road networks", n - failed, n);
        if failed > 0 {
            std::process::exit(1);
        }
    }
}
