//! # trail_physics
//!
//! Elastic trails that follow tracked points in 3D.  Each trail is a chain of
//! spring-coupled particles whose head is pinned to an anchor every frame; the
//! rest of the chain relaxes toward it, lagging further and more loosely down
//! the chain.  Each chain is turned into a flat two-row ribbon strip ready to
//! upload to a renderer.
//!
//! ## Pieces
//!
//! | Type | Role |
//! |---|---|
//! | [`ParticleChain`] | head-pinned damped-spring chain |
//! | [`RibbonBuilder`] | `2 × N` ribbon vertices, indices, normals |
//! | [`TrailSet`] | all trails, groups sharing anchors, pause flag |
//! | [`TrailConfig`] | length / width / group size, from JSON or defaults |
//! | [`ChainParams`] | per-chain spring, damping, friction, tension |
//!
//! ## Quick start
//!
//! ```rust
//! use glam::Vec3;
//! use trail_physics::TrailConfig;
//!
//! let cfg = TrailConfig { length: 20, group_size: 3, seed: Some(1), ..Default::default() };
//! let (mut set, groups) = cfg.build(1).unwrap();
//!
//! for frame in 0..120 {
//!     let t = frame as f32 / 60.0;
//!     let anchor = Vec3::new(t.cos(), t.sin(), 0.0);
//!     set.update_group(groups[0], anchor, Vec3::Z).unwrap();
//!     set.advance();
//!     set.for_each_dirty(|_id, ribbon| {
//!         let _bytes = ribbon.vertex_bytes(); // upload here
//!     });
//! }
//! ```
//!
//! ## Feature flags
//!
//! * `parallel` — step and rebuild chains on the rayon thread pool.  Chains
//!   are independent, so results match the sequential default.

pub mod error;
pub mod params;
pub mod particle;
pub mod chain;
pub mod ribbon;
pub mod trail_set;
pub mod config;

pub use chain::{ParticleChain, DEFAULT_RIBBON_WIDTH};
pub use config::TrailConfig;
pub use error::{Result, TrailError};
pub use params::ChainParams;
pub use particle::Particle;
pub use ribbon::{RibbonBuilder, RibbonSnapshot, RibbonVertex, DEFAULT_INSET};
pub use trail_set::{GroupId, Trail, TrailGroup, TrailId, TrailSet};
