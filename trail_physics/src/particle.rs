//! One point mass in a trail chain.

use glam::Vec3;

/// A single particle: where it is, how fast it moves, which way the ribbon
/// faces at this point.
///
/// `normal` drifts off unit length while it is filtered toward the
/// predecessor's normal; geometry code renormalizes it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    pub normal:   Vec3,
}

impl Particle {
    /// A particle at rest at `position`.
    pub fn at_rest(position: Vec3, normal: Vec3) -> Self {
        Particle { position, velocity: Vec3::ZERO, normal }
    }

    /// Damped-spring pull toward `prev`, using the predecessor's state from
    /// the current tick.
    pub fn follow(&mut self, prev: &Particle, spring: f32, damping: f32, friction: f32) {
        self.normal    = self.normal.lerp(prev.normal, damping);
        self.velocity += (prev.position - self.position) * spring;
        self.velocity += prev.velocity * damping;
        self.velocity *= friction;
        self.position += self.velocity;
    }
}
