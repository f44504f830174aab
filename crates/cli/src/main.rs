use std::path::PathBuf;
use std::process;

use clap::Parser;

use timelapse_core::pipeline::create_timelapse_use_case::TimelapseParams;
use timelapse_core::pipeline::timelapse_runner;
use timelapse_core::shared::constants::{DEFAULT_DECAY, DEFAULT_STRIDE};
use timelapse_core::shared::frame_sequence::FrameFormat;

/// Condense a video into a timelapse with motion-trail blending.
#[derive(Parser)]
#[command(name = "timelapse")]
struct Cli {
    /// Input video file.
    input: PathBuf,

    /// Keep one frame out of every N source frames.
    #[arg(long, default_value_t = DEFAULT_STRIDE)]
    stride: usize,

    /// Weight of the newest frame in the blend (0.0 exclusive to 1.0; 1.0 = no trails).
    #[arg(long, default_value_t = DEFAULT_DECAY)]
    decay: f32,

    /// Directory for the numbered frame images and timelapse.mp4.
    #[arg(long, default_value = "output")]
    output_dir: PathBuf,

    /// Frame image format: png or jpg.
    #[arg(long, default_value = "png")]
    frame_format: String,

    /// H.264 CRF quality (0=lossless, 51=worst).
    #[arg(long)]
    quality: Option<u32>,

    /// Print run metadata as JSON instead of text.
    #[arg(long)]
    json: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let frame_format: FrameFormat = cli.frame_format.parse()?;
    std::fs::create_dir_all(&cli.output_dir).map_err(|e| {
        format!(
            "Cannot create output directory {}: {e}",
            cli.output_dir.display()
        )
    })?;

    let mut params = TimelapseParams::new(&cli.input, cli.stride, cli.decay, &cli.output_dir)
        .with_frame_format(frame_format);
    if let Some(crf) = cli.quality {
        params = params.with_quality(crf);
    }

    let (message, metadata) = timelapse_runner::run(&params)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&metadata)?);
    } else {
        println!("{message}");
        println!("{metadata}");
    }
    log::info!("Frames written to {}", cli.output_dir.display());
    Ok(())
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.input.exists() {
        return Err(format!("Input file not found: {}", cli.input.display()).into());
    }
    if cli.stride == 0 {
        return Err("Stride must be at least 1".into());
    }
    if !(cli.decay > 0.0 && cli.decay <= 1.0) {
        return Err(format!(
            "Decay must be greater than 0.0 and at most 1.0, got {}",
            cli.decay
        )
        .into());
    }
    if let Some(q) = cli.quality {
        if q > 51 {
            return Err(format!("Quality must be between 0 and 51, got {q}").into());
        }
    }
    if cli.frame_format.parse::<FrameFormat>().is_err() {
        return Err(format!(
            "Frame format must be 'png' or 'jpg', got '{}'",
            cli.frame_format
        )
        .into());
    }
    Ok(())
}
