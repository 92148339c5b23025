use clap::{Parser, Subcommand};
use marker_relay::decoder::{BarcodeDecoder, QrDecoder};
use marker_relay::detector::{self, GradientLocalizer, Strategy};
use marker_relay::device::{
    Display, ImageSequence, LogTransport, NullDisplay, PngDirDisplay, SerialTransport, Transport,
};
use marker_relay::overlay::{draw_polyline, fill_circle};
use marker_relay::protocol::{Command as Cmd, FrameFormat, Payload, TextRule, encode};
use marker_relay::tools::{
    grayscale_stats, load_frame, mask_stats, save_frame, save_gray, save_mask,
};
use marker_relay::{Color, Config, Pipeline, QrSearch};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

type CmdResult = Result<(), Box<dyn Error>>;

#[derive(Parser)]
#[command(name = "markertool", version, about = "Marker localization and serial relay tools")]
struct Cli {
    /// JSON config file; built-in defaults when absent
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one localizer on a single image
    Locate {
        #[arg(long)]
        image: PathBuf,
        #[arg(long, default_value_t = Strategy::Gradient)]
        strategy: Strategy,
        /// Write the annotated frame here
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Dump every gradient-pipeline stage of an image as PNGs
    Stages {
        #[arg(long)]
        image: PathBuf,
        #[arg(long)]
        out: PathBuf,
    },
    /// Print the serial frame for a payload
    Encode {
        #[arg(long)]
        payload: String,
        /// Command byte (decimal or 0x-prefixed hex)
        #[arg(long, default_value = "0x00", value_parser = parse_u8)]
        cmd: u8,
        /// Zero-terminated legacy layout
        #[arg(long)]
        legacy: bool,
        /// Send the payload's UTF-8 bytes without number parsing
        #[arg(long, conflicts_with = "int")]
        bytes: bool,
        /// Parse the payload as an unsigned integer and send its magnitude bytes
        #[arg(long)]
        int: bool,
    },
    /// Drive the full loop over recorded frames
    Run {
        #[arg(long)]
        frames: PathBuf,
        /// Serial device, overrides the config
        #[arg(long, conflicts_with = "dry_run")]
        device: Option<PathBuf>,
        /// Log packets instead of writing them
        #[arg(long)]
        dry_run: bool,
        /// Write annotated frames to this directory
        #[arg(long)]
        out: Option<PathBuf>,
        /// Loop over the frames until interrupted
        #[arg(long)]
        repeat: bool,
        /// Search QR codes inside the rectangle only
        #[arg(long)]
        qr_roi: bool,
    },
    /// Print the effective configuration as JSON
    Config,
}

fn parse_u8(s: &str) -> Result<u8, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse::<u8>(),
    };
    parsed.map_err(|e| format!("invalid command byte '{s}': {e}"))
}

/// Decimal or 0x-prefixed hex
fn parse_u128(s: &str) -> Result<u128, String> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u128::from_str_radix(hex, 16),
        None => s.parse::<u128>(),
    };
    parsed.map_err(|e| format!("invalid integer payload '{s}': {e}"))
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let result = load_config(cli.config.as_deref()).and_then(|config| match cli.command {
        Command::Locate {
            image,
            strategy,
            out,
        } => locate_cmd(&config, &image, strategy, out.as_deref()),
        Command::Stages { image, out } => stages_cmd(&config, &image, &out),
        Command::Encode {
            payload,
            cmd,
            legacy,
            bytes,
            int,
        } => encode_cmd(&payload, cmd, legacy, bytes, int),
        Command::Run {
            frames,
            device,
            dry_run,
            out,
            repeat,
            qr_roi,
        } => run_cmd(config, &frames, device, dry_run, out, repeat, qr_roi),
        Command::Config => {
            println!("{}", config.to_json()?);
            Ok(())
        }
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<Config, Box<dyn Error>> {
    match path {
        Some(path) => Ok(Config::load_json(path)?),
        None => Ok(Config::default()),
    }
}

fn locate_cmd(config: &Config, image: &Path, strategy: Strategy, out: Option<&Path>) -> CmdResult {
    let mut frame = load_frame(image)?;
    if let Some(lens) = &config.lens {
        frame = lens.apply(&frame);
    }
    println!(
        "Image: {} ({}x{})",
        image.display(),
        frame.width(),
        frame.height()
    );

    let start = Instant::now();
    let region = detector::locate(strategy, &frame, &config.gradient, &config.rectangle);
    let elapsed = start.elapsed();

    match &region {
        Some(r) => {
            println!("Strategy {strategy}: region found in {:.1} ms", elapsed.as_secs_f64() * 1e3);
            let corners: Vec<String> = r.corners.iter().map(|c| format!("({}, {})", c.x, c.y)).collect();
            println!("  corners: {}", corners.join(" "));
            println!(
                "  axis_rect: x={} y={} w={} h={}",
                r.axis_rect.x, r.axis_rect.y, r.axis_rect.width, r.axis_rect.height
            );
            println!("  area={:.1} perimeter={:.1}", r.area, r.perimeter);
        }
        None => println!("Strategy {strategy}: no marker found"),
    }

    if let Some(out) = out {
        if let Some(r) = &region {
            draw_polyline(&mut frame, &r.corners, true, Color::GREEN, 2);
            if strategy == Strategy::Rectangle {
                for c in &r.corners {
                    fill_circle(&mut frame, *c, 5, Color::RED);
                }
            }
        }
        save_frame(&frame, out)?;
        println!("Annotated frame written to {}", out.display());
    }
    Ok(())
}

fn stages_cmd(config: &Config, image: &Path, out: &Path) -> CmdResult {
    let frame = load_frame(image)?;
    std::fs::create_dir_all(out)?;
    let localizer = GradientLocalizer::new(config.gradient.clone());
    let stages = localizer.stages(&frame);
    let (w, h) = (stages.width, stages.height);

    for (name, buf) in [
        ("1_gray", &stages.gray),
        ("2_gradient", &stages.gradient),
        ("3_blurred", &stages.blurred),
    ] {
        let s = grayscale_stats(buf);
        println!("{name}: min={} max={} avg={}", s.min, s.max, s.avg);
        save_gray(buf, w, h, out.join(format!("{name}.png")))?;
    }
    println!("otsu threshold: {}", stages.threshold);
    for (name, mask) in [("4_binary", &stages.binary), ("5_cleaned", &stages.cleaned)] {
        let s = mask_stats(mask);
        println!(
            "{name}: foreground={} of {} ({:.2}%)",
            s.foreground,
            s.total,
            s.ratio * 100.0
        );
        save_mask(mask, out.join(format!("{name}.png")))?;
    }
    println!("Stages written to {}", out.display());
    Ok(())
}

fn encode_cmd(text: &str, cmd: u8, legacy: bool, raw: bool, int: bool) -> CmdResult {
    let format = if legacy {
        FrameFormat::Legacy
    } else {
        FrameFormat::Current
    };
    let payload = if int {
        let value = parse_u128(text)?;
        println!("rule: integer {value}");
        Payload::Integer(value)
    } else if raw {
        println!("rule: raw bytes");
        Payload::Bytes(text.as_bytes().to_vec())
    } else {
        let rule = TextRule::ORDER
            .into_iter()
            .find(|r| r.apply(text).is_some())
            .unwrap_or(TextRule::Utf8);
        println!("rule: {rule}");
        Payload::Text(text.to_string())
    };
    let packet = encode(payload, Cmd(cmd), format);
    println!("{packet}");
    Ok(())
}

fn run_cmd(
    mut config: Config,
    frames: &Path,
    device: Option<PathBuf>,
    dry_run: bool,
    out: Option<PathBuf>,
    repeat: bool,
    qr_roi: bool,
) -> CmdResult {
    if let Some(device) = device {
        config.serial.device = device;
    }
    if qr_roi {
        config.qr_search = QrSearch::Roi;
    }

    let source = ImageSequence::from_dir(frames)?.with_repeat(repeat);
    println!("Frames: {} from {}", source.len(), frames.display());

    let transport: Box<dyn Transport> = if dry_run {
        Box::new(LogTransport::default())
    } else {
        println!(
            "Serial: {} @ {} baud ({:?} frames)",
            config.serial.device.display(),
            config.serial.baud_rate,
            config.serial.frame_format
        );
        Box::new(SerialTransport::open(&config.serial.device)?)
    };
    let display: Box<dyn Display> = match out {
        Some(dir) => Box::new(PngDirDisplay::new(dir)?),
        None => Box::new(NullDisplay::default()),
    };

    let stop = Arc::new(AtomicBool::new(false));
    let flag = stop.clone();
    ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))?;

    let mut pipeline = Pipeline::new(config, Box::new(source), transport)
        .with_barcode_decoder(Box::new(BarcodeDecoder::new()))
        .with_qr_decoder(Box::new(QrDecoder::new()))
        .with_display(display);
    let stats = pipeline.run(&stop)?;

    println!("Frames processed: {}", stats.frames);
    println!("Frames skipped: {}", stats.skipped);
    println!("Symbols decoded: {}", stats.symbols);
    println!("Packets sent: {}", stats.packets_sent);
    println!("Transport failures: {}", stats.transport_failures);
    println!(
        "Elapsed: {:.2}s ({:.1} fps)",
        stats.elapsed.as_secs_f64(),
        stats.fps()
    );
    Ok(())
}
