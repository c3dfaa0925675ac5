//! Software framebuffer: perspective projection, depth-tested triangle fill,
//! and a tiny bitmap font for status text.
//!
//! Kept separate from the window so drawing can be tested headless.

use glam::{Mat4, Vec3};
use trail_physics::RibbonVertex;

use crate::palette::{blend, shade};

// ════════════════════════════════════════════════════════════════════════════
// Camera
// ════════════════════════════════════════════════════════════════════════════

/// Perspective camera looking at `target` from `eye`, +Y up.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pub eye:    Vec3,
    pub target: Vec3,
    /// Vertical field of view, radians.
    pub fov_y:  f32,
    pub near:   f32,
    pub far:    f32,
}

impl Default for Camera {
    fn default() -> Self {
        Camera {
            eye:    Vec3::new(0.0, 0.0, 2.0),
            target: Vec3::ZERO,
            fov_y:  60f32.to_radians(),
            near:   0.1,
            far:    100.0,
        }
    }
}

impl Camera {
    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, aspect, self.near, self.far)
            * Mat4::look_at_rh(self.eye, self.target, Vec3::Y)
    }
}

/// World point → `(pixel x, pixel y, depth 0..1)`; `None` when behind the
/// camera or outside the depth range.
pub fn project(view_proj: &Mat4, p: Vec3, width: usize, height: usize) -> Option<Vec3> {
    let clip = *view_proj * p.extend(1.0);
    if clip.w <= 1e-6 {
        return None;
    }
    let ndc = clip.truncate() / clip.w;
    if !(0.0..=1.0).contains(&ndc.z) {
        return None;
    }
    Some(Vec3::new(
        (ndc.x * 0.5 + 0.5) * width as f32,
        (0.5 - ndc.y * 0.5) * height as f32,
        ndc.z,
    ))
}

// ════════════════════════════════════════════════════════════════════════════
// Canvas
// ════════════════════════════════════════════════════════════════════════════

pub struct Canvas {
    pub width:  usize,
    pub height: usize,
    pub color:  Vec<u32>,
    depth:      Vec<f32>,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Canvas {
            width,
            height,
            color: vec![0xFF000000; width * height],
            depth: vec![f32::INFINITY; width * height],
        }
    }

    pub fn clear(&mut self, bg: u32) {
        self.color.fill(bg);
        self.depth.fill(f32::INFINITY);
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        (x < self.width && y < self.height).then(|| self.color[y * self.width + x])
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        if x < self.width && y < self.height {
            self.color[y * self.width + x] = color;
        }
    }

    pub fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y + h).min(self.height) {
            for col in x..(x + w).min(self.width) {
                self.color[row * self.width + col] = color;
            }
        }
    }

    pub fn draw_diamond(&mut self, cx: isize, cy: isize, r: isize, color: u32) {
        for dy in -r..=r {
            let span = r - dy.abs();
            for dx in -span..=span {
                let (x, y) = (cx + dx, cy + dy);
                if x >= 0 && y >= 0 {
                    self.set_pixel(x as usize, y as usize, color);
                }
            }
        }
    }

    /// Depth-tested fill of a screen-space triangle, either winding.
    /// Vertices are `(x, y, depth)`.
    pub fn fill_triangle(&mut self, a: Vec3, b: Vec3, c: Vec3, color: u32) {
        let area = edge(a, b, c);
        if area.abs() < 1e-6 || !area.is_finite() {
            return;
        }

        let min_x = a.x.min(b.x).min(c.x).floor().max(0.0) as usize;
        let min_y = a.y.min(b.y).min(c.y).floor().max(0.0) as usize;
        let max_x = a.x.max(b.x).max(c.x).ceil().min(self.width as f32 - 1.0);
        let max_y = a.y.max(b.y).max(c.y).ceil().min(self.height as f32 - 1.0);
        if max_x < 0.0 || max_y < 0.0 {
            return;
        }

        for y in min_y..=max_y as usize {
            for x in min_x..=max_x as usize {
                let p = Vec3::new(x as f32 + 0.5, y as f32 + 0.5, 0.0);
                let w0 = edge(b, c, p) / area;
                let w1 = edge(c, a, p) / area;
                let w2 = edge(a, b, p) / area;
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }
                let z = w0 * a.z + w1 * b.z + w2 * c.z;
                let i = y * self.width + x;
                if z < self.depth[i] {
                    self.depth[i] = z;
                    self.color[i] = color;
                }
            }
        }
    }

    /// Status text in the 3×5 font, clipped at the right edge.
    pub fn draw_label(&mut self, text: &str, x: usize, y: usize, color: u32) {
        for (i, ch) in text.chars().enumerate() {
            let cx = x + i * 4;
            if cx + 3 > self.width { break; }
            let bits = glyph(ch);
            for bit in 0..15 {
                if bits & (1 << (14 - bit)) != 0 {
                    self.set_pixel(cx + bit % 3, y + bit / 3, color);
                }
            }
        }
    }
}

/// Twice the signed area of `(a, b, p)` in screen space.
fn edge(a: Vec3, b: Vec3, p: Vec3) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

// ════════════════════════════════════════════════════════════════════════════
// Ribbon drawing
// ════════════════════════════════════════════════════════════════════════════

/// Light direction for ribbon shading (towards the light).
const LIGHT_DIR: Vec3 = Vec3::new(0.0, 0.894_427, 0.447_214);
const AMBIENT:   f32  = 0.35;

/// Draw one ribbon mesh, flat-shaded per triangle and faded toward `bg`
/// with depth.  Ribbons are double-sided.
pub fn draw_ribbon(
    canvas:    &mut Canvas,
    view_proj: &Mat4,
    vertices:  &[RibbonVertex],
    indices:   &[u32],
    color:     u32,
    bg:        u32,
) {
    let (w, h) = (canvas.width, canvas.height);
    for tri in indices.chunks_exact(3) {
        let Some(v) = tri
            .iter()
            .map(|&i| vertices.get(i as usize))
            .collect::<Option<Vec<_>>>()
        else {
            continue;
        };
        let screen: Option<Vec<Vec3>> =
            v.iter().map(|vx| project(view_proj, vx.position(), w, h)).collect();
        let Some(s) = screen else { continue };

        let normal = (v[0].normal() + v[1].normal() + v[2].normal()).normalize_or_zero();
        let light  = AMBIENT + (1.0 - AMBIENT) * normal.dot(LIGHT_DIR).abs();
        let depth  = (s[0].z + s[1].z + s[2].z) / 3.0;
        let fog    = ((depth - 0.9) * 8.0).clamp(0.0, 0.8);
        canvas.fill_triangle(s[0], s[1], s[2], blend(shade(color, light), bg, fog));
    }
}

// ────────────────────────────────────────────────────────────────────────────
// 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

const GLYPH_CHARS: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ/-.,:=+*";

/// Five 3-bit rows per glyph, top row in bits 14..12.
const GLYPH_BITS: [u16; 44] = [
    0x7B6F, 0x2C97, 0x73E7, 0x73CF, 0x5BC9, 0x79CF, 0x79EF, 0x7249, 0x7BEF, 0x7BCF,
    0x7BED, 0x6BAE, 0x7927, 0x6B6E, 0x79E7, 0x79E4, 0x796F, 0x5BED, 0x7497, 0x126F,
    0x5BAD, 0x4927, 0x5F6D, 0x7B6D, 0x7B6F, 0x7BE4, 0x7B79, 0x6BAD, 0x79CF, 0x7492,
    0x5B6F, 0x5B52, 0x5B7D, 0x5AAD, 0x5BD2, 0x72A7,
    0x12A4, 0x01C0, 0x0002, 0x0014, 0x0410, 0x0E38, 0x05D0, 0x0AA8,
];

fn glyph(c: char) -> u16 {
    if c == ' ' {
        return 0;
    }
    let c = c.to_ascii_uppercase();
    GLYPH_CHARS
        .chars()
        .position(|g| g == c)
        .map_or(0x0080, |i| GLYPH_BITS[i])
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use trail_physics::{ChainParams, ParticleChain, RibbonBuilder};

    const BG: u32 = 0xFF101018;

    #[test]
    fn origin_projects_to_centre() {
        let vp = Camera::default().view_proj(1.0);
        let p = project(&vp, Vec3::ZERO, 200, 100).unwrap();
        assert!((p.x - 100.0).abs() < 1e-3);
        assert!((p.y - 50.0).abs() < 1e-3);
        assert!(p.z > 0.0 && p.z < 1.0);
    }

    #[test]
    fn points_behind_camera_are_culled() {
        let vp = Camera::default().view_proj(1.0);
        assert!(project(&vp, Vec3::new(0.0, 0.0, 5.0), 100, 100).is_none());
    }

    #[test]
    fn up_is_up_on_screen() {
        let vp = Camera::default().view_proj(1.0);
        let hi = project(&vp, Vec3::Y * 0.5, 100, 100).unwrap();
        let lo = project(&vp, -Vec3::Y * 0.5, 100, 100).unwrap();
        assert!(hi.y < lo.y);
    }

    #[test]
    fn triangle_fill_either_winding() {
        let mut c = Canvas::new(20, 20);
        c.clear(BG);
        let (a, b, d) = (Vec3::new(2.0, 2.0, 0.5), Vec3::new(18.0, 2.0, 0.5), Vec3::new(2.0, 18.0, 0.5));
        c.fill_triangle(a, b, d, 0xFFFF0000);
        assert_eq!(c.pixel(4, 4), Some(0xFFFF0000));
        c.clear(BG);
        c.fill_triangle(a, d, b, 0xFF00FF00);
        assert_eq!(c.pixel(4, 4), Some(0xFF00FF00));
        assert_eq!(c.pixel(17, 17), Some(BG));
    }

    #[test]
    fn nearer_triangle_wins() {
        let mut c = Canvas::new(10, 10);
        c.clear(BG);
        let tri = |z: f32| (Vec3::new(0.0, 0.0, z), Vec3::new(10.0, 0.0, z), Vec3::new(0.0, 10.0, z));
        let (a, b, d) = tri(0.3);
        c.fill_triangle(a, b, d, 0xFF0000FF);
        let (a, b, d) = tri(0.6);
        c.fill_triangle(a, b, d, 0xFFFFFFFF);
        assert_eq!(c.pixel(2, 2), Some(0xFF0000FF));
    }

    #[test]
    fn ribbon_draws_pixels() {
        let mut chain = ParticleChain::new(10, 0.3, ChainParams::midpoint());
        chain.update(Vec3::new(-0.5, 0.0, 0.0), Vec3::Y);
        for _ in 0..20 {
            chain.update(Vec3::new(0.5, 0.0, 0.0), Vec3::Y);
            chain.step();
        }
        chain.update(Vec3::new(-0.5, 0.0, 0.0), Vec3::Y);
        chain.step();
        let mut r = RibbonBuilder::default();
        r.rebuild(&chain);

        let mut canvas = Canvas::new(120, 120);
        canvas.clear(BG);
        let vp = Camera::default().view_proj(1.0);
        draw_ribbon(&mut canvas, &vp, r.vertices(), r.indices(), 0xFFCA0045, BG);
        assert!(canvas.color.iter().any(|&p| p != BG));
    }

    #[test]
    fn glyph_rows_decode() {
        assert_eq!(glyph('1'), 0b010_110_010_010_111);
        assert_eq!(glyph('t'), glyph('T'));
        assert_eq!(glyph(' '), 0);
        assert_eq!(glyph('~'), 0b000_000_010_000_000);
    }

    #[test]
    fn label_sets_pixels() {
        let mut c = Canvas::new(40, 10);
        c.clear(BG);
        c.draw_label("PAUSED", 1, 1, 0xFFFFFFFF);
        assert!(c.color.iter().any(|&p| p == 0xFFFFFFFF));
    }
}
