use clap::Parser;
use markscan::io::{save_png, DEFAULT_SCAN_FILE_NAME};
use markscan::{
    CornerLabel, DirSource, LocateConfig, MatchResult, OrderingPolicy, Point2, RectifyConfig,
    Scan, ScanConfig, ScanError, Scanner, SearchRegion, StillFrame, TemplateStore,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "Markscan CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for each pipeline stage.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum SearchRegionConfig {
    Full,
    Quadrant,
}

impl From<SearchRegionConfig> for SearchRegion {
    fn from(value: SearchRegionConfig) -> Self {
        match value {
            SearchRegionConfig::Full => SearchRegion::Full,
            SearchRegionConfig::Quadrant => SearchRegion::Quadrant,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum OrderingConfig {
    Warn,
    Reject,
}

impl From<OrderingConfig> for OrderingPolicy {
    fn from(value: OrderingConfig) -> Self {
        match value {
            OrderingConfig::Warn => OrderingPolicy::Warn,
            OrderingConfig::Reject => OrderingPolicy::Reject,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct LocateConfigJson {
    threshold: f32,
    min_var_i: f32,
    region: SearchRegionConfig,
    ordering: OrderingConfig,
    parallel: bool,
}

impl Default for LocateConfigJson {
    fn default() -> Self {
        let cfg = LocateConfig::default();
        Self {
            threshold: cfg.threshold,
            min_var_i: cfg.min_var_i,
            region: SearchRegionConfig::Full,
            ordering: OrderingConfig::Warn,
            parallel: cfg.parallel,
        }
    }
}

impl From<LocateConfigJson> for LocateConfig {
    fn from(value: LocateConfigJson) -> Self {
        Self {
            threshold: value.threshold,
            min_var_i: value.min_var_i,
            region: value.region.into(),
            ordering: value.ordering.into(),
            parallel: value.parallel,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RectifyConfigJson {
    width: usize,
    height: usize,
    fill: [u8; 4],
    parallel: bool,
}

impl Default for RectifyConfigJson {
    fn default() -> Self {
        let cfg = RectifyConfig::default();
        Self {
            width: cfg.width,
            height: cfg.height,
            fill: cfg.fill,
            parallel: cfg.parallel,
        }
    }
}

impl From<RectifyConfigJson> for RectifyConfig {
    fn from(value: RectifyConfigJson) -> Self {
        Self {
            width: value.width,
            height: value.height,
            fill: value.fill,
            parallel: value.parallel,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Config {
    frame_path: String,
    template_dir: String,
    template_ext: String,
    output_path: String,
    report_path: Option<String>,
    locate: LocateConfigJson,
    rectify: RectifyConfigJson,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            frame_path: String::new(),
            template_dir: "assets".to_string(),
            template_ext: "png".to_string(),
            output_path: DEFAULT_SCAN_FILE_NAME.to_string(),
            report_path: None,
            locate: LocateConfigJson::default(),
            rectify: RectifyConfigJson::default(),
        }
    }
}

#[derive(Debug, Serialize)]
struct CornerRecord {
    corner: &'static str,
    score: f32,
    x: usize,
    y: usize,
    center_x: f64,
    center_y: f64,
}

impl CornerRecord {
    fn new(m: &MatchResult, center: Point2) -> Self {
        Self {
            corner: m.label.short_name(),
            score: m.score,
            x: m.x,
            y: m.y,
            center_x: center.x,
            center_y: center.y,
        }
    }
}

#[derive(Debug, Serialize)]
struct Report {
    corners: Vec<CornerRecord>,
    ordering_ok: bool,
    width: usize,
    height: usize,
    output_path: String,
}

impl Report {
    fn new(scan: &Scan, output_path: String) -> Self {
        let corners = CornerLabel::ALL
            .into_iter()
            .map(|label| CornerRecord::new(scan.detection.match_for(label), scan.corners()[label]))
            .collect();
        Self {
            corners,
            ordering_ok: scan.detection.ordering_ok,
            width: scan.image.width(),
            height: scan.image.height(),
            output_path,
        }
    }
}

fn staged(err: ScanError) -> String {
    err.user_message()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("markscan=info".parse()?))
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.frame_path.is_empty() || config.template_dir.is_empty() {
        return Err("frame_path and template_dir must be set in the config".into());
    }
    if config.output_path.is_empty() {
        return Err("output_path must not be empty".into());
    }

    let source = DirSource::new(&config.template_dir).with_extension(&config.template_ext);
    let store = TemplateStore::from_source(&source).map_err(staged)?;
    tracing::info!(dir = %config.template_dir, "templates loaded");

    let scanner = Scanner::new(
        &store,
        ScanConfig {
            locate: config.locate.into(),
            rectify: config.rectify.into(),
        },
    )
    .map_err(staged)?;
    let mut camera = StillFrame::open(&config.frame_path).map_err(staged)?;
    let scan = scanner.capture(&mut camera).map_err(staged)?;
    if !scan.detection.ordering_ok {
        tracing::warn!("corner layout looks unusual; check the scan");
    }

    save_png(scan.image.view(), &config.output_path).map_err(staged)?;

    let report = Report::new(&scan, config.output_path);
    let json = serde_json::to_string_pretty(&report)?;
    match config.report_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
