//! Top-level application state machine.
//!
//! `AppState` owns the `TrailSet`, the `FingerRig` that maps fingertips onto
//! trail groups, and one palette colour per trail.  It processes
//! `AnchorEvent`s and hands rebuilt ribbons to the visualizer each frame.

use std::sync::mpsc::{self, TryRecvError};

use anyhow::Context;
use log::{debug, info};
use trail_physics::{TrailConfig, TrailSet};

use crate::anchor::{AnchorEvent, SimInput, TrackedPoint, spawn_anchor_source};
#[cfg(not(feature = "leap"))]
use crate::anchor::SimAnchorSource;
use crate::palette::assign_colors;
use crate::rig::{FingerRig, TRACKED_POINTS};
use crate::visualizer::{Controls, Visualizer};

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// Configuration for the full application.
#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    /// Chain length, ribbon width and trails per fingertip.
    pub trails:       TrailConfig,
    /// Start with the trails frozen.
    pub start_paused: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            trails:       TrailConfig { group_size: 3, ..TrailConfig::default() },
            start_paused: false,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState {
    set:    TrailSet,
    rig:    FingerRig,
    colors: Vec<u32>,

    // ── last frame ────────────────────────────────────────────────────────
    tips:   Vec<TrackedPoint>,
    frames: u64,

    pub status: String,
}

impl AppState {
    pub fn new(cfg: &AppConfig) -> anyhow::Result<Self> {
        let (mut set, rig) = FingerRig::build(&cfg.trails)
            .context("building fingertip trails")?;
        set.set_paused(cfg.start_paused);
        let colors = assign_colors(set.len(), &mut cfg.trails.rng());
        debug!("{} trails across {} fingertips", set.len(), TRACKED_POINTS);

        let status = format!(
            "{} trails  length {}  width {:.3}",
            set.len(), cfg.trails.length, cfg.trails.width,
        );
        Ok(AppState { set, rig, colors, tips: Vec::new(), frames: 0, status })
    }

    // ── process one AnchorEvent ──────────────────────────────────────────

    pub fn handle_event(&mut self, event: AnchorEvent) -> anyhow::Result<()> {
        match event {
            AnchorEvent::Frame(points) => {
                self.rig.apply(&mut self.set, &points)?;
                self.tips = points;
            }
            AnchorEvent::TogglePause => {
                self.set.toggle_pause();
            }
            AnchorEvent::Quit => { /* handled in run loop */ }
        }
        Ok(())
    }

    /// Act on this frame's window keys.  Returns false on quit.
    pub fn apply_controls(&mut self, controls: Controls) -> anyhow::Result<bool> {
        if controls.quit {
            return Ok(false);
        }
        if controls.toggle_pause {
            self.handle_event(AnchorEvent::TogglePause)?;
        }
        Ok(true)
    }

    // ── Per-frame tick ────────────────────────────────────────────────────

    /// Step and rebuild every trail unless paused.
    pub fn tick(&mut self) {
        if self.set.advance() {
            self.frames += 1;
        }
    }

    // ── Accessors for the render loop ─────────────────────────────────────

    pub fn set(&self)          -> &TrailSet          { &self.set }
    pub fn set_mut(&mut self)  -> &mut TrailSet      { &mut self.set }
    pub fn colors(&self)       -> &[u32]             { &self.colors }
    pub fn tips(&self)         -> &[TrackedPoint]    { &self.tips }
    pub fn frames(&self)       -> u64                { self.frames }
    pub fn is_paused(&self)    -> bool               { self.set.is_paused() }
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the full application.
///
/// Creates the visualizer, the anchor source (simulated hands by default,
/// hardware with `--features leap`), and drives the event/render loop at
/// ~60 fps.
pub fn run(cfg: AppConfig) -> anyhow::Result<()> {
    // ── Window key channel ────────────────────────────────────────────────
    let (sim_tx, sim_rx) = mpsc::channel::<SimInput>();

    #[cfg(feature = "leap")]
    let anchor_rx = {
        drop(sim_rx);
        spawn_anchor_source(crate::anchor::LeapAnchorSource)
    };
    #[cfg(not(feature = "leap"))]
    let anchor_rx = spawn_anchor_source(SimAnchorSource::new(sim_rx));

    // ── Visualizer (owns the window and the key sender) ──────────────────
    let mut vis = Visualizer::new(sim_tx)?;

    let mut app = AppState::new(&cfg)?;
    info!("{}", app.status);

    // ── Main loop ─────────────────────────────────────────────────────────
    while vis.is_open() {
        // 1. Window keys
        if !app.apply_controls(vis.poll_input())? { break; }

        // 2. Drain anchor events
        loop {
            match anchor_rx.try_recv() {
                Ok(AnchorEvent::Quit)           => return finish(&app),
                Ok(evt)                         => app.handle_event(evt)?,
                Err(TryRecvError::Empty)        => break,
                Err(TryRecvError::Disconnected) => return finish(&app),
            }
        }

        // 3. Physics
        app.tick();

        // 4. Upload rebuilt ribbons, then render
        app.set_mut().for_each_dirty(|id, ribbon| vis.upload(id, ribbon));
        vis.render(app.colors(), app.tips(), &app.status, app.is_paused())?;
    }

    finish(&app)
}

fn finish(app: &AppState) -> anyhow::Result<()> {
    info!("stepped {} frames", app.frames());
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
