//! trail_sim — headless runner.
//!
//! Drives a trail set along a scripted anchor path for a number of frames,
//! reports how far the chains lag, and optionally dumps the final ribbon
//! buffers as JSON.

use std::f32::consts::TAU;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use glam::Vec3;
use log::{debug, info};

use trail_physics::{RibbonSnapshot, TrailConfig, TrailSet};

#[derive(Parser, Debug)]
#[command(name = "trail_sim", version, about = "Run trail physics without a window")]
struct Cli {
    /// JSON trail config; defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Frames to simulate
    #[arg(short, long, default_value_t = 600)]
    frames: usize,

    /// Number of anchors (one trail group each)
    #[arg(short, long, default_value_t = 1)]
    groups: usize,

    /// Override the config's parameter seed
    #[arg(long)]
    seed: Option<u64>,

    /// Anchor motion
    #[arg(long, value_enum, default_value_t = PathKind::Orbit)]
    path: PathKind,

    /// Pause stepping for this frame range, e.g. `100..160`
    #[arg(long, value_parser = parse_range)]
    pause: Option<(usize, usize)>,

    /// Write the final ribbons as JSON to this file
    #[arg(long)]
    dump: Option<PathBuf>,

    /// More log output (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Errors only
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum PathKind {
    /// Circle around the origin, each group phase-shifted
    Orbit,
    /// Anchor fixed at (1, 0, 0)
    Hold,
    /// Anchor jumps between two points every 120 frames
    Jump,
}

fn parse_range(s: &str) -> Result<(usize, usize), String> {
    let (a, b) = s.split_once("..").ok_or_else(|| format!("expected A..B, got {s:?}"))?;
    let a: usize = a.trim().parse().map_err(|e| format!("{e}"))?;
    let b: usize = b.trim().parse().map_err(|e| format!("{e}"))?;
    if b < a {
        return Err(format!("range end {b} is before start {a}"));
    }
    Ok((a, b))
}

/// Anchor position and normal for `group` at `frame`.
fn anchor_at(kind: PathKind, frame: usize, group: usize, groups: usize) -> (Vec3, Vec3) {
    match kind {
        PathKind::Orbit => {
            let phase = group as f32 / groups.max(1) as f32 * TAU;
            let t = frame as f32 / 120.0 * TAU + phase;
            let pos = Vec3::new(t.cos(), t.sin(), 0.25 * (2.0 * t).sin());
            let tangent = Vec3::new(-t.sin(), t.cos(), 0.5 * (2.0 * t).cos());
            (pos, tangent.cross(Vec3::Z).normalize_or_zero())
        }
        PathKind::Hold => (Vec3::X, Vec3::Y),
        PathKind::Jump => {
            let side = if (frame / 120) % 2 == 0 { 1.0 } else { -1.0 };
            (Vec3::X * side, Vec3::Y)
        }
    }
}

/// Largest distance from any particle to its chain's head.
fn max_spread(set: &TrailSet) -> f32 {
    set.trails()
        .iter()
        .filter_map(|t| {
            let head = t.chain().positions().next()?;
            t.chain().positions().map(|p| p.distance(head)).reduce(f32::max)
        })
        .fold(0.0, f32::max)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (_, 0)    => "warn",
        (_, 1)    => "info",
        (_, 2)    => "debug",
        _         => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let mut cfg = match &cli.config {
        Some(path) => TrailConfig::from_json_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => TrailConfig::default(),
    };
    if cli.seed.is_some() {
        cfg.seed = cli.seed;
    }

    let (mut set, groups) = cfg.build(cli.groups)?;
    info!(
        "simulating {} trails ({} groups × {}) for {} frames, path {:?}",
        set.len(), groups.len(), cfg.group_size, cli.frames, cli.path
    );

    let mut uploads = 0usize;
    for frame in 0..cli.frames {
        let paused = cli.pause.is_some_and(|(a, b)| (a..b).contains(&frame));
        set.set_paused(paused);

        for (g, id) in groups.iter().enumerate() {
            let (anchor, normal) = anchor_at(cli.path, frame, g, groups.len());
            set.update_group(*id, anchor, normal)?;
        }

        if set.advance() {
            set.for_each_dirty(|_, _| uploads += 1);
        }

        if frame % 60 == 0 {
            debug!("frame {frame:>5}: spread {:.4}", max_spread(&set));
        }
    }

    println!();
    println!("  trails        : {}", set.len());
    println!("  frames        : {}", cli.frames);
    println!("  uploads       : {}", uploads);
    println!("  max spread    : {:.6}", max_spread(&set));
    println!();

    if let Some(path) = &cli.dump {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        let ribbons: Vec<RibbonSnapshot<'_>> =
            set.trails().iter().map(|t| t.ribbon().snapshot()).collect();
        serde_json::to_writer_pretty(BufWriter::new(file), &ribbons)
            .with_context(|| format!("writing {}", path.display()))?;
        info!("dumped {} ribbons to {}", ribbons.len(), path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_range_accepts_pairs() {
        assert_eq!(parse_range("10..20"), Ok((10, 20)));
        assert!(parse_range("20..10").is_err());
        assert!(parse_range("oops").is_err());
    }

    #[test]
    fn orbit_normals_are_unit() {
        for f in 0..240 {
            let (_, n) = anchor_at(PathKind::Orbit, f, 0, 1);
            assert!((n.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn jump_alternates_sides() {
        assert_eq!(anchor_at(PathKind::Jump, 0, 0, 1).0, Vec3::X);
        assert_eq!(anchor_at(PathKind::Jump, 130, 0, 1).0, -Vec3::X);
    }

    #[test]
    fn cli_parses() {
        let cli = Cli::try_parse_from(["trail_sim", "-f", "10", "--path", "hold", "--pause", "2..4"]).unwrap();
        assert_eq!(cli.frames, 10);
        assert_eq!(cli.path, PathKind::Hold);
        assert_eq!(cli.pause, Some((2, 4)));
    }
}
