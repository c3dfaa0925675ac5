//! Property-based tests for chain physics and ribbon geometry.
//!
//! - Convergence onto a fixed anchor for any parameters in range
//! - No NaN/Inf in ribbon vertices, whatever the normals
//! - Ribbon rows at `inset` and `inset + width` along the normal

use glam::Vec3;
use proptest::prelude::*;
use trail_physics::params::{DAMPING_RANGE, FRICTION_RANGE, SPRING_RANGE, TENSION_RANGE};
use trail_physics::{ChainParams, ParticleChain, RibbonBuilder};

const SETTLE_FRAMES: usize = 600;
const EPSILON: f32 = 1e-3;

fn params() -> impl Strategy<Value = ChainParams> {
    (SPRING_RANGE, DAMPING_RANGE, FRICTION_RANGE, TENSION_RANGE)
        .prop_map(|(s, d, f, t)| ChainParams::new(s, d, f, t))
}

fn point(limit: f32) -> impl Strategy<Value = Vec3> {
    (-limit..limit, -limit..limit, -limit..limit).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

/// Normals including exact zero and very short/long vectors.
fn any_normal() -> impl Strategy<Value = Vec3> {
    prop_oneof![
        Just(Vec3::ZERO),
        point(1.0),
        point(1e-20),
        point(1e6),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn chain_converges_to_fixed_anchor(
        p in params(),
        length in 2usize..40,
        path in prop::collection::vec(point(5.0), 1..30),
        anchor in point(5.0),
    ) {
        let mut chain = ParticleChain::new(length, 0.1, p);
        // Scramble the body with an arbitrary anchor path first.
        for a in &path {
            chain.update(*a, Vec3::Y);
            chain.step();
        }
        for _ in 0..SETTLE_FRAMES {
            chain.update(anchor, Vec3::Y);
            chain.step();
        }
        for particle in chain.particles() {
            prop_assert!(particle.position.distance(anchor) < EPSILON);
            prop_assert!(particle.velocity.length() < EPSILON);
        }
    }

    #[test]
    fn ribbon_vertices_always_finite(
        p in params(),
        normals in prop::collection::vec(any_normal(), 1..60),
        anchors in prop::collection::vec(point(10.0), 1..60),
    ) {
        let mut chain = ParticleChain::new(16, 0.1, p);
        let mut ribbon = RibbonBuilder::default();
        for (a, n) in anchors.iter().zip(normals.iter().cycle()) {
            chain.update(*a, *n);
            chain.step();
            for v in ribbon.rebuild(&chain) {
                prop_assert!(v.position().is_finite());
                prop_assert!(v.normal().is_finite());
            }
        }
    }

    #[test]
    fn ribbon_rows_sit_at_inset_and_inset_plus_width(
        p in params(),
        width in 0.01f32..1.0,
        inset in 0.0f32..0.1,
        anchors in prop::collection::vec(point(2.0), 1..20),
        normal in point(1.0).prop_filter("non-degenerate", |n| n.length() > 1e-3),
    ) {
        let mut chain = ParticleChain::new(8, width, p);
        let mut ribbon = RibbonBuilder::new(inset);
        for a in &anchors {
            chain.update(*a, normal);
            chain.step();
        }
        ribbon.rebuild(&chain);
        let n = chain.len();
        for (j, particle) in chain.particles().iter().enumerate() {
            let axis = particle.normal.normalize_or_zero();
            let near = ribbon.vertices()[j].position() - particle.position;
            let far  = ribbon.vertices()[j + n].position() - particle.position;
            prop_assert!((near + axis * inset).length() < 1e-4);
            prop_assert!((far + axis * (inset + width)).length() < 1e-4);
        }
    }
}
