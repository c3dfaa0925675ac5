//! Trail colours and shading, as packed ARGB (`0xAARRGGBB`).

use rand::seq::SliceRandom;
use rand::Rng;

/// The seven ribbon colours; each trail gets one at random.
pub const PALETTE: [u32; 7] = [
    0xFFCA0045,
    0xFF052269,
    0xFFFFC068,
    0xFF114643,
    0xFF9BC2B5,
    0xFFCE8D3D,
    0xFFBD3E30,
];

/// One random palette colour per trail.
pub fn assign_colors<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<u32> {
    (0..count)
        .map(|_| *PALETTE.choose(rng).unwrap_or(&PALETTE[0]))
        .collect()
}

/// Scale a colour's RGB by `intensity` (clamped to 0.0–1.0); alpha stays opaque.
pub fn shade(color: u32, intensity: f32) -> u32 {
    let k = intensity.clamp(0.0, 1.0);
    let scale = |c: u32| ((c & 0xFF) as f32 * k) as u32;
    0xFF000000
        | (scale(color >> 16) << 16)
        | (scale(color >> 8) << 8)
        | scale(color)
}

/// Mix two colours channel by channel; `t` = 0.0 gives `a`, 1.0 gives `b`.
pub fn blend(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let mix = |shift: u32| {
        let (ca, cb) = ((a >> shift) & 0xFF, (b >> shift) & 0xFF);
        ((ca as f32 + (cb as f32 - ca as f32) * t) as u32) << shift
    };
    0xFF000000 | mix(16) | mix(8) | mix(0)
}
