//! Ribbon geometry derived from a particle chain.
//!
//! A chain of `N` particles becomes a `2 × N` grid of vertices: row 0 sits
//! just off the centreline (`inset`), row 1 a full ribbon width further out
//! along the same renormalised normal.
//!
//! ```text
//!   row 0:  0 ──── 1 ──── 2 ──── … ── N-1
//!           │ ╲    │ ╲    │
//!   row 1:  N ──── N+1 ── N+2 ── … ── 2N-1
//! ```
//!
//! The index buffer (two triangles per column pair) depends only on `N`, so
//! it is built once and reused.  Vertex normals are recomputed from the faces
//! on every rebuild.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use serde::Serialize;

use crate::chain::ParticleChain;

/// Offset of the first ribbon row from the particle centreline.
pub const DEFAULT_INSET: f32 = 0.005;

// ════════════════════════════════════════════════════════════════════════════
// RibbonVertex — upload layout
// ════════════════════════════════════════════════════════════════════════════

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, Serialize)]
pub struct RibbonVertex {
    pub position: [f32; 3],
    pub normal:   [f32; 3],
}

impl RibbonVertex {
    pub fn position(&self) -> Vec3 { Vec3::from_array(self.position) }
    pub fn normal(&self)   -> Vec3 { Vec3::from_array(self.normal) }
}

/// Borrowed view of one ribbon's buffers, for dumping.
#[derive(Debug, Serialize)]
pub struct RibbonSnapshot<'a> {
    pub vertices:   &'a [RibbonVertex],
    pub indices:    &'a [u32],
    pub centerline: &'a [[f32; 3]],
}

// ════════════════════════════════════════════════════════════════════════════
// RibbonBuilder
// ════════════════════════════════════════════════════════════════════════════

/// Owns one trail's vertex, index and centreline buffers.
#[derive(Clone, Debug)]
pub struct RibbonBuilder {
    inset:      f32,
    vertices:   Vec<RibbonVertex>,
    indices:    Vec<u32>,
    centerline: Vec<[f32; 3]>,
    /// Face-normal accumulator, reused between rebuilds.
    normal_acc: Vec<Vec3>,
    dirty:      bool,
}

impl RibbonBuilder {
    pub fn new(inset: f32) -> Self {
        RibbonBuilder {
            inset,
            vertices:   Vec::new(),
            indices:    Vec::new(),
            centerline: Vec::new(),
            normal_acc: Vec::new(),
            dirty:      false,
        }
    }

    pub fn inset(&self) -> f32 { self.inset }

    /// Recompute vertices, normals and the centreline from `chain`.
    ///
    /// An uninitialised chain leaves every buffer empty and the dirty flag
    /// untouched.
    pub fn rebuild(&mut self, chain: &ParticleChain) -> &[RibbonVertex] {
        let n = chain.particles().len();
        if n == 0 {
            self.vertices.clear();
            self.centerline.clear();
            return &self.vertices;
        }

        if self.indices.len() != strip_index_count(n) {
            self.indices = strip_indices(n);
        }

        let near = self.inset;
        let far  = self.inset + chain.ribbon_width();

        self.vertices.resize(2 * n, RibbonVertex::zeroed());
        self.centerline.clear();
        for (j, p) in chain.particles().iter().enumerate() {
            let dir = p.normal.normalize_or_zero();
            self.vertices[j].position     = (p.position - dir * near).to_array();
            self.vertices[j + n].position = (p.position - dir * far).to_array();
            self.centerline.push(p.position.to_array());
        }

        self.recompute_normals();
        self.dirty = true;
        &self.vertices
    }

    /// Area-weighted vertex normals from the triangle faces.
    fn recompute_normals(&mut self) {
        self.normal_acc.clear();
        self.normal_acc.resize(self.vertices.len(), Vec3::ZERO);

        for tri in self.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let pa = self.vertices[a].position();
            let pb = self.vertices[b].position();
            let pc = self.vertices[c].position();
            let face = (pb - pa).cross(pc - pa);
            self.normal_acc[a] += face;
            self.normal_acc[b] += face;
            self.normal_acc[c] += face;
        }

        for (v, acc) in self.vertices.iter_mut().zip(&self.normal_acc) {
            v.normal = acc.normalize_or_zero().to_array();
        }
    }

    // ── buffers ───────────────────────────────────────────────────────────

    pub fn vertices(&self)   -> &[RibbonVertex] { &self.vertices }
    pub fn indices(&self)    -> &[u32]          { &self.indices }
    pub fn centerline(&self) -> &[[f32; 3]]     { &self.centerline }

    /// Vertex buffer as raw bytes for upload.
    pub fn vertex_bytes(&self) -> &[u8] { bytemuck::cast_slice(&self.vertices) }

    /// Index buffer as raw bytes for upload.
    pub fn index_bytes(&self) -> &[u8] { bytemuck::cast_slice(&self.indices) }

    pub fn snapshot(&self) -> RibbonSnapshot<'_> {
        RibbonSnapshot {
            vertices:   &self.vertices,
            indices:    &self.indices,
            centerline: &self.centerline,
        }
    }

    // ── upload bookkeeping ────────────────────────────────────────────────

    /// True when buffers changed since the last [`mark_uploaded`](Self::mark_uploaded).
    pub fn is_dirty(&self) -> bool { self.dirty }

    pub fn mark_uploaded(&mut self) { self.dirty = false; }
}

impl Default for RibbonBuilder {
    fn default() -> Self { RibbonBuilder::new(DEFAULT_INSET) }
}

// ════════════════════════════════════════════════════════════════════════════
// Grid-strip triangulation
// ════════════════════════════════════════════════════════════════════════════

fn strip_index_count(columns: usize) -> usize {
    columns.saturating_sub(1) * 6
}

/// Two triangles per column pair over a two-row grid of `columns` vertices
/// per row.
pub fn strip_indices(columns: usize) -> Vec<u32> {
    let n = columns as u32;
    let mut out = Vec::with_capacity(strip_index_count(columns));
    for j in 0..n.saturating_sub(1) {
        let a = j;
        let b = j + n;
        let c = j + 1 + n;
        let d = j + 1;
        out.extend_from_slice(&[a, b, d, b, c, d]);
    }
    out
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
