use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;
use strip_reader::config::EdgeStrategy;
use strip_reader::detector::edges::detect_edges;
use strip_reader::tools::{expand_inputs, load_image, paint_edges, save_image};
use strip_reader::{Color, PipelineConfig, StripAnalyzer, StripError};

#[derive(Parser)]
#[command(name = "striptool", version, about = "Test-strip photograph tools")]
struct Cli {
    /// JSON pipeline configuration; STRIP_* variables override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum Strategy {
    Sobel,
    Adaptive,
}

#[derive(Subcommand)]
enum Command {
    /// Run the whole pipeline and print one JSON reading per image
    Analyze {
        /// Image files or directories
        #[arg(required = true)]
        images: Vec<PathBuf>,
        /// Also write each normalized strip as PNG into this directory
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Run only the quality gate
    Validate {
        #[arg(required = true)]
        images: Vec<PathBuf>,
    },
    /// Write the edge map painted over the image
    Edges {
        #[arg(long)]
        image: PathBuf,
        #[arg(long)]
        output: PathBuf,
        #[arg(long, value_enum)]
        strategy: Option<Strategy>,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match PipelineConfig::from_json_file(path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("Failed to read config {}: {}", path.display(), err);
                return ExitCode::FAILURE;
            }
        },
        None => PipelineConfig::default(),
    }
    .with_env_overrides();

    let ok = match cli.command {
        Command::Analyze { images, out_dir } => analyze_cmd(config, &images, out_dir.as_deref()),
        Command::Validate { images } => validate_cmd(config, &images),
        Command::Edges {
            image,
            output,
            strategy,
        } => edges_cmd(config, &image, &output, strategy),
    };
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn failure(path: &Path, err: &StripError) -> serde_json::Value {
    json!({
        "image": path.display().to_string(),
        "error": err.to_string(),
        "hint": err.retake_hint(),
    })
}

fn analyze_cmd(config: PipelineConfig, inputs: &[PathBuf], out_dir: Option<&Path>) -> bool {
    let analyzer = StripAnalyzer::with_config(config);
    let mut all_ok = true;

    for path in expand_inputs(inputs) {
        let start = Instant::now();
        let result = load_image(&path).and_then(|image| {
            let strip = analyzer.normalize(&image)?;
            if let Some(dir) = out_dir {
                let name = path.file_stem().unwrap_or_default().to_string_lossy();
                save_image(&strip.image, dir.join(format!("{}_normalized.png", name)))?;
            }
            let pads = analyzer.read_pads(&strip.image, &strip.white_balance)?;
            Ok((strip, pads))
        });

        let line = match result {
            Ok((strip, pads)) => {
                let pads: Vec<_> = pads
                    .iter()
                    .map(|pad| {
                        json!({
                            "field": pad.field_type(),
                            "color": pad.average_color(),
                            "samples": pad.len(),
                        })
                    })
                    .collect();
                json!({
                    "image": path.display().to_string(),
                    "quality": strip.quality,
                    "white_balance": strip.white_balance.reference(),
                    "angle": strip.alignment.angle,
                    "size": [strip.image.width(), strip.image.height()],
                    "pads": pads,
                    "elapsed_ms": start.elapsed().as_millis() as u64,
                })
            }
            Err(err) => {
                all_ok = false;
                failure(&path, &err)
            }
        };
        println!("{}", line);
    }
    all_ok
}

fn validate_cmd(config: PipelineConfig, inputs: &[PathBuf]) -> bool {
    let analyzer = StripAnalyzer::with_config(config);
    let mut all_ok = true;

    for path in expand_inputs(inputs) {
        let line = match load_image(&path).and_then(|image| analyzer.validate(&image)) {
            Ok(report) => json!({ "image": path.display().to_string(), "quality": report }),
            Err(err) => {
                all_ok = false;
                failure(&path, &err)
            }
        };
        println!("{}", line);
    }
    all_ok
}

fn edges_cmd(
    mut config: PipelineConfig,
    image_path: &Path,
    output: &Path,
    strategy: Option<Strategy>,
) -> bool {
    if let Some(strategy) = strategy {
        config.edges.strategy = match strategy {
            Strategy::Sobel => EdgeStrategy::Sobel,
            Strategy::Adaptive => EdgeStrategy::AdaptiveThreshold,
        };
    }

    let image = match load_image(image_path) {
        Ok(image) => image,
        Err(err) => {
            eprintln!("Failed to load image {}: {}", image_path.display(), err);
            return false;
        }
    };

    let start = Instant::now();
    let edges = detect_edges(&image, &config.edges);
    println!(
        "Image: {} ({}x{}), {} edge pixels in {:.2?}",
        image_path.display(),
        image.width(),
        image.height(),
        edges.len(),
        start.elapsed()
    );

    let painted = paint_edges(&image, &edges, Color::new(255, 0, 255));
    match save_image(&painted, output) {
        Ok(()) => true,
        Err(err) => {
            eprintln!("Failed to write {}: {}", output.display(), err);
            false
        }
    }
}
