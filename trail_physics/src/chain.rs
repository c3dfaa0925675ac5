//! ParticleChain — a fixed-length run of spring-coupled particles whose head
//! is pinned to an external anchor.
//!
//! Per frame the caller pins the head with [`ParticleChain::update`], then
//! calls [`ParticleChain::step`] once.  Each free particle chases its
//! predecessor's *already-updated* state from the same tick, and the spring
//! coefficient shrinks by `tension` at every link, so the tail lags further
//! and more loosely than the head.
//!
//! ```text
//!  anchor ──▶ [0] ──k── [1] ──k·t── [2] ──k·t²── [3] …
//!            pinned     free        free         free
//! ```

use glam::Vec3;
use log::{debug, warn};
use rand::Rng;

use crate::params::ChainParams;
use crate::particle::Particle;

// ════════════════════════════════════════════════════════════════════════════
// ParticleChain
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct ParticleChain {
    length:       usize,
    ribbon_width: f32,
    params:       ChainParams,
    /// Empty until the first `update()`; then exactly `length` entries.
    particles:    Vec<Particle>,
}

/// Ribbon width used when a chain is given a negative or non-finite one.
pub const DEFAULT_RIBBON_WIDTH: f32 = 0.1;

impl ParticleChain {
    /// A chain of `length` particles (at least one) with explicit parameters.
    ///
    /// Out-of-range parameters are clamped into their ranges and a negative
    /// or non-finite width falls back to [`DEFAULT_RIBBON_WIDTH`], so nothing
    /// passed here can make the geometry non-finite.
    pub fn new(length: usize, ribbon_width: f32, params: ChainParams) -> Self {
        let clamped = params.clamped();
        if clamped != params {
            warn!("chain params {params:?} out of range, clamped to {clamped:?}");
        }
        let ribbon_width = if ribbon_width.is_finite() && ribbon_width >= 0.0 {
            ribbon_width
        } else {
            warn!("ribbon width {ribbon_width} rejected, using {DEFAULT_RIBBON_WIDTH}");
            DEFAULT_RIBBON_WIDTH
        };
        ParticleChain {
            length: length.max(1),
            ribbon_width,
            params: clamped,
            particles: Vec::new(),
        }
    }

    /// A chain whose parameters are drawn from `rng`.
    pub fn random<R: Rng + ?Sized>(length: usize, ribbon_width: f32, rng: &mut R) -> Self {
        Self::new(length, ribbon_width, ChainParams::sample(rng))
    }

    // ── anchor ────────────────────────────────────────────────────────────

    /// Pin the head particle to `anchor` / `normal`.
    ///
    /// The first call allocates every particle at the anchor, at rest, so the
    /// trail grows out of the anchor instead of snapping in from the origin.
    /// Later calls only move the head.  Non-finite input is dropped and the
    /// head keeps its previous state.
    pub fn update(&mut self, anchor: Vec3, normal: Vec3) {
        if !anchor.is_finite() || !normal.is_finite() {
            warn!("dropping non-finite anchor {anchor} / {normal}");
            return;
        }
        if self.particles.is_empty() {
            self.particles = vec![Particle::at_rest(anchor, normal); self.length];
            debug!("chain initialised: {} particles at {anchor}", self.length);
        }
        let head = &mut self.particles[0];
        head.position = anchor;
        head.normal   = normal;
    }

    // ── physics ───────────────────────────────────────────────────────────

    /// Advance the free particles by one tick.  No-op before the first
    /// `update()`.
    pub fn step(&mut self) {
        let ChainParams { damping, friction, .. } = self.params;
        for j in 1..self.particles.len() {
            let prev = self.particles[j - 1];
            let k = link_spring(&self.params, j);
            self.particles[j].follow(&prev, k, damping, friction);
        }
    }

    /// Spring coefficient applied to particle `index`; `None` for the pinned
    /// head and for indices past the end.
    pub fn effective_spring(&self, index: usize) -> Option<f32> {
        if index == 0 || index >= self.length {
            return None;
        }
        Some(link_spring(&self.params, index))
    }

    // ── accessors ─────────────────────────────────────────────────────────

    pub fn len(&self)          -> usize        { self.length }
    pub fn ribbon_width(&self) -> f32          { self.ribbon_width }
    pub fn params(&self)       -> &ChainParams { &self.params }
    pub fn particles(&self)    -> &[Particle]  { &self.particles }

    /// False until the first `update()`.
    pub fn is_initialized(&self) -> bool { !self.particles.is_empty() }

    /// Current particle positions, head first.  Empty before initialisation.
    pub fn positions(&self) -> impl ExactSizeIterator<Item = Vec3> + '_ {
        self.particles.iter().map(|p| p.position)
    }

    /// Current (unnormalised) particle normals, head first.
    pub fn normals(&self) -> impl ExactSizeIterator<Item = Vec3> + '_ {
        self.particles.iter().map(|p| p.normal)
    }

    /// Distance between the head and the next particle; zero for chains
    /// that are uninitialised or a single particle long.
    pub fn head_gap(&self) -> f32 {
        match self.particles.as_slice() {
            [a, b, ..] => a.position.distance(b.position),
            _          => 0.0,
        }
    }
}

/// `spring · tension^(index-1)` for a free particle.
fn link_spring(params: &ChainParams, index: usize) -> f32 {
    params.spring * params.tension.powi(index as i32 - 1)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
