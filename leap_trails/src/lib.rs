//! # leap_trails
//!
//! Elastic ribbons that chase tracked fingertips.  Every fingertip of both
//! hands drags a small group of spring chains from [`trail_physics`]; each
//! chain's ribbon is drawn in its own palette colour.
//!
//! ## Pipeline
//!
//! | Stage | Module | What happens |
//! |---|---|---|
//! | Tracking | [`anchor`] | Fingertip position + direction per frame, hardware or simulated |
//! | Mapping | [`rig`] | (hand, finger) → trail group; group heads are pinned |
//! | Physics | `trail_physics` | `TrailSet::advance` steps and rebuilds unless paused |
//! | Upload | [`visualizer`] | Rebuilt ribbons copied into the mesh cache |
//! | Drawing | [`canvas`] | Perspective projection, depth-tested triangle fill |
//!
//! ## Feature flags
//!
//! * (default) — **Simulation mode**: two animated hands sweep the scene.
//! * `leap` — **Hardware mode**: polls a real LeapMotion controller via LeapC.
//! * `parallel` — steps and rebuilds trails on the rayon pool.
//!
//! ### Keyboard shortcuts
//!
//! | Key | Action |
//! |---|---|
//! | `Space` | Pause / resume the trails |
//! | `L` | Hide / show the simulated left hand |
//! | `R` | Hide / show the simulated right hand |
//! | `Q` / `Escape` | Quit |

pub mod anchor;
pub mod rig;
pub mod palette;
pub mod canvas;
pub mod visualizer;
pub mod app;
