//! leap_trails — interactive entry point.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use leap_trails::app::{run, AppConfig};
use trail_physics::TrailConfig;

#[derive(Parser, Debug)]
#[command(name = "leap_trails", version, about = "Elastic ribbons chasing tracked fingertips")]
struct Cli {
    /// Trail configuration file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Skip the setup prompts and use defaults
    #[arg(long)]
    quick: bool,

    /// Seed for the per-chain spring parameters and colours
    #[arg(long)]
    seed: Option<u64>,

    /// Start with the trails paused
    #[arg(long)]
    paused: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║          Leap Trails — fingertip spring-chain ribbons         ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    #[cfg(feature = "leap")]
    println!("  Mode: LeapMotion hardware");
    #[cfg(not(feature = "leap"))]
    println!("  Mode: Simulated hands  (use --features leap for hardware)");
    println!("  Keys: Space pause · L/R hide hand · Q quit");
    println!();

    if let Err(e) = configure(&cli).and_then(|cfg| {
        println!();
        println!("  Opening visualizer window…");
        println!();
        run(cfg)
    }) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn configure(cli: &Cli) -> anyhow::Result<AppConfig> {
    let mut cfg = AppConfig { start_paused: cli.paused, ..AppConfig::default() };

    if let Some(path) = &cli.config {
        cfg.trails = TrailConfig::from_json_file(path)?;
    } else if cli.quick {
        println!("  Quick-start: {} trails per fingertip, {} particles\n",
                 cfg.trails.group_size, cfg.trails.length);
    } else {
        cfg.trails = configure_interactively(cfg.trails);
    }

    if cli.seed.is_some() {
        cfg.trails.seed = cli.seed;
    }
    cfg.trails.validate()?;
    Ok(cfg)
}

fn configure_interactively(defaults: TrailConfig) -> TrailConfig {
    let group_size: usize = read_line(&format!(
        "  Trails per fingertip (default {}): ", defaults.group_size))
        .trim().parse().unwrap_or(defaults.group_size).clamp(1, 16);

    let length: usize = read_line(&format!(
        "  Particles per trail (default {}): ", defaults.length))
        .trim().parse().unwrap_or(defaults.length).clamp(2, 500);

    let width: f32 = loop {
        let w = read_line(&format!("  Ribbon width (default {}): ", defaults.width))
            .trim().parse().unwrap_or(defaults.width);
        if w.is_finite() && w > 0.0 { break w; }
        println!("    ⚠  width must be positive.");
    };

    TrailConfig { group_size, length, width, ..defaults }
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    io::stdout().flush().ok();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf
}
