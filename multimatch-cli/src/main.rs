use clap::Parser;
use multimatch::image::io::{load_gray_image, load_rgb_image, save_image};
use multimatch::render::{draw_detections, legend_entries, rgb_canvas, Rgb, SET3_PALETTE};
use multimatch::{
    find_matches, match_templates, upscale_detections, DefaultKernel, MatchConfig, ObjectCount,
    OwnedImage, ScaledDetection, SearchRegion, Template,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

const OVERLAY_THICKNESS: usize = 2;

#[derive(Parser, Debug)]
#[command(author, version, about = "MultiMatch CLI (JSON config driven)")]
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
    /// Enable tracing output for performance profiling.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Deserialize)]
struct TemplateJson {
    path: String,
    #[serde(default)]
    label: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchRegionJson {
    x: usize,
    y: usize,
    width: usize,
    height: usize,
}

impl From<SearchRegionJson> for SearchRegion {
    fn from(value: SearchRegionJson) -> Self {
        SearchRegion::new(value.x, value.y, value.width, value.height)
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Config {
    image_path: String,
    templates: Vec<TemplateJson>,
    score_threshold: f32,
    max_overlap: f32,
    object_count: Option<usize>,
    search_region: Option<SearchRegionJson>,
    parallel: bool,
    color: bool,
    raw: bool,
    downscale_ratio: Option<f32>,
    output_path: Option<String>,
    overlay_path: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        let cfg = MatchConfig::default();
        Self {
            image_path: String::new(),
            templates: Vec::new(),
            score_threshold: cfg.score_threshold,
            max_overlap: cfg.max_overlap,
            object_count: None,
            search_region: None,
            parallel: cfg.parallel,
            color: false,
            raw: false,
            downscale_ratio: None,
            output_path: None,
            overlay_path: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct DetectionRecord {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    score: f32,
    template_index: usize,
    label: String,
}

impl From<ScaledDetection> for DetectionRecord {
    fn from(value: ScaledDetection) -> Self {
        Self {
            x: value.x,
            y: value.y,
            width: value.width,
            height: value.height,
            score: value.score,
            template_index: value.template_index,
            label: value.label,
        }
    }
}

#[derive(Debug, Serialize)]
struct LegendRecord {
    label: String,
    color: Rgb,
}

#[derive(Debug, Serialize)]
struct Output {
    count: usize,
    detections: Vec<DetectionRecord>,
    legend: Vec<LegendRecord>,
}

fn load(path: &str, color: bool) -> Result<OwnedImage, Box<dyn std::error::Error>> {
    let img = if color {
        load_rgb_image(path)?
    } else {
        load_gray_image(path)?
    };
    Ok(img)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive("multimatch=info".parse()?),
            )
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
    if config.image_path.is_empty() {
        return Err("image_path must be set in the config".into());
    }

    let object_count = match config.object_count {
        Some(count) => ObjectCount::finite(count)?,
        None => ObjectCount::Unbounded,
    };
    let match_cfg = MatchConfig {
        score_threshold: config.score_threshold,
        max_overlap: config.max_overlap,
        object_count,
        search_region: config.search_region.map(SearchRegion::from),
        parallel: config.parallel,
    };

    let image = load(&config.image_path, config.color)?;
    let mut templates = Vec::with_capacity(config.templates.len());
    for entry in &config.templates {
        let img = load(&entry.path, config.color)?;
        templates.push(Template::from(img));
    }
    let labels: Option<Vec<&str>> = if config.templates.iter().any(|t| t.label.is_some()) {
        Some(
            config
                .templates
                .iter()
                .map(|t| t.label.as_deref().unwrap_or(""))
                .collect(),
        )
    } else {
        None
    };

    let kernel = DefaultKernel::default();
    let detections = if config.raw {
        find_matches(image.view(), &templates, labels.as_deref(), &kernel, &match_cfg)?
    } else {
        match_templates(image.view(), &templates, labels.as_deref(), &kernel, &match_cfg)?
    };
    tracing::info!(count = detections.len(), raw = config.raw, "matching done");

    if let Some(path) = &config.overlay_path {
        let mut canvas = rgb_canvas(image.view())?;
        draw_detections(&mut canvas, &detections, &SET3_PALETTE, OVERLAY_THICKNESS)?;
        save_image(&canvas, path)?;
    }

    let legend = legend_entries(&detections, &SET3_PALETTE)
        .into_iter()
        .map(|(label, color)| LegendRecord { label, color })
        .collect();
    let scaled = upscale_detections(&detections, config.downscale_ratio.unwrap_or(1.0))?;
    let output = Output {
        count: scaled.len(),
        detections: scaled.into_iter().map(DetectionRecord::from).collect(),
        legend,
    };
    let json = serde_json::to_string_pretty(&output)?;

    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
