//! Software-rendered visualizer using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                                                              │
//! │        ribbons (perspective, depth-tested, flat shaded)      │
//! │        ◆ fingertip markers                                   │
//! │                                                              │
//! │  status bar                                     [PAUSED]     │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Ribbon geometry is copied in through [`Visualizer::upload`] only when a
//! trail was rebuilt, so a paused scene redraws from the cached meshes.

use std::sync::mpsc::Sender;

use minifb::{Key, KeyRepeat, Window, WindowOptions};
use trail_physics::{RibbonBuilder, RibbonVertex, TrailId};

use crate::anchor::{SimInput, SimKey, TrackedPoint};
use crate::canvas::{draw_ribbon, project, Camera, Canvas};

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const WIN_W:       usize = 960;
pub const WIN_H:       usize = 640;
const STATUS_H:        usize = 14;
const STATUS_Y:        usize = WIN_H - STATUS_H;
pub const BG_COLOR:    u32   = 0xFF101018;
const TEXT_BG:         u32   = 0xFF0F3460;
const TEXT_COLOR:      u32   = 0xFFE0E0E0;
const PAUSE_COLOR:     u32   = 0xFFFFD700;
const TIP_COLOR:       u32   = 0xFFFFFFFF;

// ════════════════════════════════════════════════════════════════════════════
// Mesh cache
// ════════════════════════════════════════════════════════════════════════════

/// Last uploaded geometry of one trail.
#[derive(Clone, Debug, Default)]
pub struct RibbonMesh {
    pub vertices: Vec<RibbonVertex>,
    pub indices:  Vec<u32>,
}

impl RibbonMesh {
    /// Replace the cached buffers with the ribbon's current ones.  The index
    /// list only changes with the column count, so it is copied only then.
    pub fn upload(&mut self, ribbon: &RibbonBuilder) {
        self.vertices.clear();
        self.vertices.extend_from_slice(ribbon.vertices());
        if self.indices.len() != ribbon.indices().len() {
            self.indices = ribbon.indices().to_vec();
        }
    }
}

/// Mesh slot for `id`, growing the cache as new trails appear.
pub fn mesh_slot(meshes: &mut Vec<RibbonMesh>, id: TrailId) -> &mut RibbonMesh {
    let i = id.index();
    if meshes.len() <= i {
        meshes.resize_with(i + 1, RibbonMesh::default);
    }
    &mut meshes[i]
}

/// Draw every cached mesh plus fingertip markers into `canvas`.
pub fn draw_scene(
    canvas: &mut Canvas,
    camera: &Camera,
    meshes: &[RibbonMesh],
    colors: &[u32],
    tips:   &[TrackedPoint],
) {
    let vp = camera.view_proj(canvas.width as f32 / canvas.height as f32);
    for (i, mesh) in meshes.iter().enumerate() {
        let color = colors.get(i).copied().unwrap_or(TEXT_COLOR);
        draw_ribbon(canvas, &vp, &mesh.vertices, &mesh.indices, color, BG_COLOR);
    }
    for tip in tips {
        if let Some(s) = project(&vp, tip.position, canvas.width, canvas.height) {
            canvas.draw_diamond(s.x as isize, s.y as isize, 3, TIP_COLOR);
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Keys
// ════════════════════════════════════════════════════════════════════════════

/// Keys pressed this frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Controls {
    pub quit:         bool,
    pub toggle_pause: bool,
    pub toggle_left:  bool,
    pub toggle_right: bool,
}

impl Controls {
    /// The presses the simulated hands care about.
    pub fn sim_keys(&self) -> impl Iterator<Item = SimKey> {
        [
            (self.toggle_left,  SimKey::ToggleLeft),
            (self.toggle_right, SimKey::ToggleRight),
            (self.quit,         SimKey::Quit),
        ]
        .into_iter()
        .filter_map(|(on, key)| on.then_some(key))
    }
}

/// Map one-shot key presses to [`Controls`].
pub fn read_controls(pressed: impl Fn(Key) -> bool) -> Controls {
    Controls {
        quit:         pressed(Key::Q) || pressed(Key::Escape),
        toggle_pause: pressed(Key::Space),
        toggle_left:  pressed(Key::L),
        toggle_right: pressed(Key::R),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window: Window,
    canvas: Canvas,
    camera: Camera,
    meshes: Vec<RibbonMesh>,
    sim_tx: Sender<SimInput>,
}

impl Visualizer {
    pub fn new(sim_tx: Sender<SimInput>) -> anyhow::Result<Self> {
        let mut window = Window::new(
            "Leap Trails",
            WIN_W, WIN_H,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        )?;

        window.set_target_fps(60);

        Ok(Visualizer {
            window,
            canvas: Canvas::new(WIN_W, WIN_H),
            camera: Camera::default(),
            meshes: Vec::new(),
            sim_tx,
        })
    }

    /// Returns false when the window should close.
    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Copy a freshly rebuilt ribbon into the mesh cache.
    pub fn upload(&mut self, id: TrailId, ribbon: &RibbonBuilder) {
        mesh_slot(&mut self.meshes, id).upload(ribbon);
    }

    /// Poll the keyboard.  Hand toggles and quit go to the simulated hands;
    /// the returned [`Controls`] are for the app loop.
    pub fn poll_input(&mut self) -> Controls {
        if !self.window.is_open() {
            return Controls { quit: true, ..Controls::default() };
        }

        let controls = read_controls(|k| self.window.is_key_pressed(k, KeyRepeat::No));

        // The receiver is gone when hardware drives the anchors.
        for key in controls.sim_keys() {
            let _ = self.sim_tx.send(SimInput::KeyDown(key));
        }
        controls
    }

    /// Render one frame.
    pub fn render(
        &mut self,
        colors: &[u32],
        tips:   &[TrackedPoint],
        status: &str,
        paused: bool,
    ) -> anyhow::Result<()> {
        self.canvas.clear(BG_COLOR);
        draw_scene(&mut self.canvas, &self.camera, &self.meshes, colors, tips);

        // ── Status bar ────────────────────────────────────────────────────
        self.canvas.fill_rect(0, STATUS_Y, WIN_W, STATUS_H, TEXT_BG);
        self.canvas.draw_label(status, 6, STATUS_Y + 4, TEXT_COLOR);
        if paused {
            self.canvas.draw_label("PAUSED", WIN_W - 40, STATUS_Y + 4, PAUSE_COLOR);
        }

        self.window.update_with_buffer(&self.canvas.color, WIN_W, WIN_H)?;
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::{sim_hand_pose, Hand};
    use glam::Vec3;
    use trail_physics::{ChainParams, TrailSet};

    fn swinging_set() -> TrailSet {
        let mut set = TrailSet::new();
        let id = set.add_trail(trail_physics::ParticleChain::new(8, 0.2, ChainParams::midpoint()));
        for i in 0..30 {
            let x = if i % 10 < 5 { -0.4 } else { 0.4 };
            set.update_trail(id, Vec3::new(x, 0.0, 0.0), Vec3::Y).unwrap();
            set.advance();
        }
        set
    }

    #[test]
    fn dirty_ribbons_fill_the_cache() {
        let mut set = swinging_set();
        let mut meshes = Vec::new();
        set.for_each_dirty(|id, r| mesh_slot(&mut meshes, id).upload(r));
        assert_eq!(meshes.len(), 1);
        assert_eq!(meshes[0].vertices.len(), 16);
        assert_eq!(meshes[0].indices.len(), 7 * 6);
    }

    #[test]
    fn paused_scene_keeps_cached_mesh() {
        let mut set = swinging_set();
        let mut meshes = Vec::new();
        set.for_each_dirty(|id, r| mesh_slot(&mut meshes, id).upload(r));
        let before = meshes[0].vertices.clone();

        set.set_paused(true);
        assert!(!set.advance());
        let mut uploads = 0;
        set.for_each_dirty(|_, _| uploads += 1);
        assert_eq!(uploads, 0);
        assert_eq!(meshes[0].vertices, before);
    }

    #[test]
    fn scene_draws_ribbons_and_tips() {
        let mut set = swinging_set();
        let mut meshes = Vec::new();
        set.for_each_dirty(|id, r| mesh_slot(&mut meshes, id).upload(r));

        let mut canvas = Canvas::new(160, 120);
        canvas.clear(BG_COLOR);
        let tips = sim_hand_pose(Hand::Left, 0.0);
        draw_scene(&mut canvas, &Camera::default(), &meshes, &[0xFFCA0045], &tips);
        assert!(canvas.color.iter().any(|&p| p != BG_COLOR && p != TIP_COLOR));
    }

    #[test]
    fn space_maps_to_pause_not_to_the_hands() {
        let c = read_controls(|k| k == Key::Space);
        assert_eq!(c, Controls { toggle_pause: true, ..Controls::default() });
        assert_eq!(c.sim_keys().count(), 0);
    }

    #[test]
    fn hand_and_quit_keys_reach_the_hands() {
        let c = read_controls(|k| matches!(k, Key::L | Key::Escape));
        assert!(c.quit && c.toggle_left && !c.toggle_right);
        assert_eq!(c.sim_keys().collect::<Vec<_>>(), vec![SimKey::ToggleLeft, SimKey::Quit]);
    }

    #[test]
    fn mesh_slot_grows_sparse() {
        let mut meshes = Vec::new();
        let mut set = TrailSet::new();
        for _ in 0..4 {
            set.add_trail(trail_physics::ParticleChain::new(3, 0.1, ChainParams::midpoint()));
        }
        let last = set.iter().last().map(|(id, _)| id).unwrap();
        mesh_slot(&mut meshes, last);
        assert_eq!(meshes.len(), 4);
    }
}
