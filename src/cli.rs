use crate::config::{Config, Strategy, WindowRule, load_config};
use crate::layout::{Budget, FloorRequest, generate_with_progress};
use crate::layout_dump::write_layout_dump;
use crate::model::{Envelope, Footprint, RoomTemplate, Wall};
use crate::render::{render_svg, write_output_svg};
use crate::texture::{ImageFormat, Texture};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "fplan", version, about = "Floor layout generator: rooms, corridors and core in a rectangular envelope")]
pub struct Args {
    /// Total floor width (m)
    #[arg(short = 'W', long = "width", default_value_t = 30.0)]
    pub width: f32,

    /// Total floor depth (m)
    #[arg(short = 'H', long = "height", default_value_t = 20.0)]
    pub height: f32,

    /// Room frontage along the door wall (m)
    #[arg(long = "room-width", default_value_t = 3.5)]
    pub room_width: f32,

    /// Room depth from door to window (m)
    #[arg(long = "room-depth", default_value_t = 5.0)]
    pub room_depth: f32,

    /// Corridor width (m)
    #[arg(long = "corridor", default_value_t = 2.0)]
    pub corridor: f32,

    /// Placement strategy (overrides the config file)
    #[arg(short = 's', long = "strategy", value_enum)]
    pub strategy: Option<StrategyArg>,

    /// Side of the template image that shows the door
    #[arg(long = "door-wall", default_value = "bottom", value_parser = parse_wall)]
    pub door_wall: Wall,

    /// Side of the template image that shows the window
    #[arg(long = "window-wall", default_value = "top", value_parser = parse_wall)]
    pub window_wall: Wall,

    /// Window constraint (overrides the config file)
    #[arg(long = "window-rule", value_enum)]
    pub window_rule: Option<WindowRuleArg>,

    /// Room template image (png, jpg, gif, webp)
    #[arg(short = 't', long = "texture")]
    pub texture: Option<PathBuf>,

    /// Maximum placement attempts
    #[arg(long = "max-steps")]
    pub max_steps: Option<usize>,

    /// Maximum rooms to place
    #[arg(long = "max-rooms")]
    pub max_rooms: Option<usize>,

    /// Stop placing after this many milliseconds and keep what was placed
    #[arg(long = "timeout-ms")]
    pub timeout_ms: Option<u64>,

    /// Output file (svg/png/json). Defaults to stdout for SVG and JSON if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON/JSON5 file
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Pixels per meter (overrides the config file)
    #[arg(long = "scale")]
    pub scale: Option<f32>,

    /// Log progress and placement summaries to stderr
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
    Json,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum StrategyArg {
    Row,
    Frontier,
}

impl From<StrategyArg> for Strategy {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::Row => Strategy::RowAndCorridor,
            StrategyArg::Frontier => Strategy::FrontierGrowth,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum WindowRuleArg {
    BackClearance,
    Exterior,
}

impl From<WindowRuleArg> for WindowRule {
    fn from(value: WindowRuleArg) -> Self {
        match value {
            WindowRuleArg::BackClearance => WindowRule::BackClearance,
            WindowRuleArg::Exterior => WindowRule::Exterior,
        }
    }
}

fn parse_wall(value: &str) -> Result<Wall, String> {
    value.parse()
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut config = load_config(args.config.as_deref())?;
    apply_overrides(&mut config, &args);

    let request = build_request(&args);
    let texture = args.texture.as_deref().map(load_texture).transpose()?;

    let mut last_logged = 0.0f32;
    let layout = generate_with_progress(&request, &config.layout, &mut |fraction: f32| {
        if fraction - last_logged >= 0.1 || fraction >= 1.0 {
            last_logged = fraction;
            debug!(percent = (fraction * 100.0).round() as u32, "generating");
        }
    })?;

    match args.output_format {
        OutputFormat::Svg => {
            let svg = render_svg(&layout, &config.theme, &config.render, texture.as_ref());
            write_output_svg(&svg, args.output.as_deref())?;
        }
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            let svg = render_svg(&layout, &config.theme, &config.render, texture.as_ref());
            write_png(&svg, &output, &config)?;
        }
        OutputFormat::Json => match args.output.as_deref() {
            Some(path) => write_layout_dump(path, &layout)?,
            None => println!("{}", crate::layout_dump::layout_to_json(&layout)?),
        },
    }

    Ok(())
}

#[cfg(feature = "png")]
fn write_png(svg: &str, output: &Path, config: &Config) -> Result<()> {
    crate::render::write_output_png(svg, output, &config.theme)
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _output: &Path, _config: &Config) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "floorplan_rs=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn apply_overrides(config: &mut Config, args: &Args) {
    if let Some(strategy) = args.strategy {
        config.layout.strategy = strategy.into();
    }
    if let Some(rule) = args.window_rule {
        config.layout.window_rule = rule.into();
    }
    if let Some(scale) = args.scale {
        config.render.scale = scale;
    }
}

fn build_request(args: &Args) -> FloorRequest {
    let deadline = args
        .timeout_ms
        .map(|ms| Instant::now() + Duration::from_millis(ms));
    FloorRequest::new(
        Envelope::new(args.width, args.height),
        Footprint::new(args.room_width, args.room_depth),
        args.corridor,
    )
    .with_template(RoomTemplate {
        door_wall: args.door_wall,
        window_wall: args.window_wall,
    })
    .with_budget(Budget {
        max_steps: args.max_steps,
        max_rooms: args.max_rooms,
        deadline,
    })
}

fn load_texture(path: &Path) -> Result<Texture> {
    let format = path
        .extension()
        .and_then(|e| e.to_str())
        .and_then(ImageFormat::from_extension)
        .ok_or_else(|| anyhow::anyhow!("unsupported texture format: {}", path.display()))?;
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read texture {}", path.display()))?;
    Ok(Texture::from_bytes(&bytes, format))
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!(
        "Output path required for {} output",
        ext
    ))
}
