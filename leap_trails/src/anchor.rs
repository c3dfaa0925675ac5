//! Anchor sources — fingertip positions from LeapMotion hardware or from a
//! simulated pair of hands.
//!
//! The public interface is [`AnchorEvent`] delivered over a `mpsc` channel.
//! Consumers don't need to know whether points came from real hardware or the
//! simulator.

use std::f32::consts::{FRAC_PI_2, TAU};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use glam::{Quat, Vec3};

// ════════════════════════════════════════════════════════════════════════════
// Hands and fingers
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Hand { Left, Right }

impl Hand {
    pub const ALL: [Hand; 2] = [Hand::Left, Hand::Right];

    pub fn index(self) -> usize {
        match self { Hand::Left => 0, Hand::Right => 1 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Finger { Thumb, Index, Middle, Ring, Pinky }

impl Finger {
    pub const ALL: [Finger; 5] =
        [Finger::Thumb, Finger::Index, Finger::Middle, Finger::Ring, Finger::Pinky];

    pub fn index(self) -> usize {
        match self {
            Finger::Thumb  => 0,
            Finger::Index  => 1,
            Finger::Middle => 2,
            Finger::Ring   => 3,
            Finger::Pinky  => 4,
        }
    }
}

/// Direction a fingertip points, from the joint behind it to the tip.
/// Zero when the two joints coincide.
pub fn fingertip_direction(tip: Vec3, prev_joint: Vec3) -> Vec3 {
    (tip - prev_joint).normalize_or_zero()
}

// ════════════════════════════════════════════════════════════════════════════
// AnchorEvent
// ════════════════════════════════════════════════════════════════════════════

/// One tracked fingertip in scene coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackedPoint {
    pub hand:      Hand,
    pub finger:    Finger,
    pub position:  Vec3,
    /// Fingertip direction; becomes the trail's anchor normal.
    pub direction: Vec3,
}

#[derive(Clone, Debug, PartialEq)]
pub enum AnchorEvent {
    /// Every fingertip seen this frame.  May be empty (no hands in view).
    Frame(Vec<TrackedPoint>),
    /// Freeze / unfreeze the trail bodies.
    TogglePause,
    /// Quit the application.
    Quit,
}

// ════════════════════════════════════════════════════════════════════════════
// AnchorSource trait — unified interface for hw and sim
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver [`AnchorEvent`]s over a channel.
pub trait AnchorSource: Send + 'static {
    fn run(self: Box<Self>, tx: Sender<AnchorEvent>);
}

/// Spawn an anchor source on its own thread and return the receiving end.
pub fn spawn_anchor_source<A: AnchorSource>(source: A) -> Receiver<AnchorEvent> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || Box::new(source).run(tx));
    rx
}

// ════════════════════════════════════════════════════════════════════════════
// LeapAnchorSource — real hardware (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// Anchor source backed by a real LeapMotion controller.
///
/// Requires the `leap` feature flag and the LeapC shared library installed.
/// Leap coordinates are millimetres above the device; they are recentred
/// around [`LEAP_ORIGIN_MM`] and scaled by [`LEAP_SCALE`] into scene units.
#[cfg(feature = "leap")]
pub struct LeapAnchorSource;

#[cfg(feature = "leap")]
pub const LEAP_ORIGIN_MM: Vec3 = Vec3::new(0.0, 200.0, 0.0);
#[cfg(feature = "leap")]
pub const LEAP_SCALE: f32 = 0.005;

#[cfg(feature = "leap")]
impl AnchorSource for LeapAnchorSource {
    fn run(self: Box<Self>, tx: Sender<AnchorEvent>) {
        use leaprs::{Connection, ConnectionConfig, Event, HandType};

        let to_scene = |x: f32, y: f32, z: f32| (Vec3::new(x, y, z) - LEAP_ORIGIN_MM) * LEAP_SCALE;

        let mut connection = match Connection::create(ConnectionConfig::default()) {
            Ok(c)  => c,
            Err(e) => {
                log::error!("failed to create LeapC connection: {e:?}");
                let _ = tx.send(AnchorEvent::Quit);
                return;
            }
        };
        if let Err(e) = connection.open() {
            log::error!("failed to open LeapMotion device: {e:?}");
            let _ = tx.send(AnchorEvent::Quit);
            return;
        }

        loop {
            let msg = match connection.poll(100) {
                Ok(m)  => m,
                Err(_) => continue,
            };

            if let Event::Tracking(frame) = msg.event() {
                let mut points = Vec::with_capacity(10);
                for h in frame.hands() {
                    let hand = match h.hand_type() {
                        HandType::Left => Hand::Left,
                        _              => Hand::Right,
                    };
                    for (digit, finger) in h.digits().zip(Finger::ALL) {
                        let next = digit.distal().next_joint();
                        let prev = digit.distal().prev_joint();
                        let tip  = to_scene(next.x, next.y, next.z);
                        let prev = to_scene(prev.x, prev.y, prev.z);
                        points.push(TrackedPoint {
                            hand,
                            finger,
                            position:  tip,
                            direction: fingertip_direction(tip, prev),
                        });
                    }
                }
                if tx.send(AnchorEvent::Frame(points)).is_err() { return; }
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SimAnchorSource — animated hands (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Raw input event from the simulation window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimInput {
    KeyDown(SimKey),
}

/// Window keys the simulated hands react to (mapped from minifb Key).
///
/// Pause is not among them: Space is handled by the app loop so it works
/// with any anchor source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimKey {
    /// `L`: hide / show the left hand.
    ToggleLeft,
    /// `R`: hide / show the right hand.
    ToggleRight,
    /// `Q` or `Escape`.
    Quit,
}

/// Anchor source that animates two hands sweeping through the scene.
///
/// Window keys arrive as [`SimInput`]; L and R hide a hand so the
/// "no anchor this frame" path can be exercised without hardware.
pub struct SimAnchorSource {
    pub rx:       Receiver<SimInput>,
    pub interval: Duration,
}

impl SimAnchorSource {
    pub fn new(rx: Receiver<SimInput>) -> Self {
        SimAnchorSource { rx, interval: Duration::from_millis(16) }
    }
}

impl AnchorSource for SimAnchorSource {
    fn run(self: Box<Self>, tx: Sender<AnchorEvent>) {
        let start = Instant::now();
        let mut visible = [true, true];

        loop {
            // ── window keys ───────────────────────────────────────────────
            loop {
                match self.rx.try_recv() {
                    Ok(SimInput::KeyDown(SimKey::ToggleLeft))  => visible[0] = !visible[0],
                    Ok(SimInput::KeyDown(SimKey::ToggleRight)) => visible[1] = !visible[1],
                    Ok(SimInput::KeyDown(SimKey::Quit)) => {
                        let _ = tx.send(AnchorEvent::Quit);
                        return;
                    }
                    Err(TryRecvError::Empty)        => break,
                    Err(TryRecvError::Disconnected) => return,
                }
            }

            // ── fingertips ────────────────────────────────────────────────
            let t = start.elapsed().as_secs_f32();
            let points: Vec<TrackedPoint> = Hand::ALL
                .into_iter()
                .filter(|h| visible[h.index()])
                .flat_map(|h| sim_hand_pose(h, t))
                .collect();
            if tx.send(AnchorEvent::Frame(points)).is_err() { return; }

            thread::sleep(self.interval);
        }
    }
}

/// Fingertips of a simulated hand at time `t` (seconds).
///
/// The palm drifts on a Lissajous path on its own side of the scene while the
/// five fingers fan out around it and curl slowly, so each fingertip carves a
/// distinct loop.
pub fn sim_hand_pose(hand: Hand, t: f32) -> Vec<TrackedPoint> {
    let side = match hand { Hand::Left => -1.0, Hand::Right => 1.0 };
    let phase = hand.index() as f32 * 1.3;

    let palm = Vec3::new(
        side * 0.45 + 0.25 * (0.7 * t + phase).sin(),
        0.30 * (1.1 * t + phase).sin(),
        0.20 * (0.5 * t + phase).cos(),
    );
    let spin = Quat::from_rotation_z(0.6 * (0.4 * t + phase).sin())
        * Quat::from_rotation_y(side * 0.5 * (0.3 * t).cos());

    Finger::ALL
        .into_iter()
        .map(|finger| {
            let i = finger.index() as f32;
            // Thumb splays sideways, the other four fan upward.
            let angle = side * (FRAC_PI_2 - 0.9 + i * 0.35);
            let curl  = 0.5 + 0.5 * (1.7 * t + i * TAU / 5.0).sin();
            let reach = 0.12 + 0.06 * curl;
            let dir   = spin * Vec3::new(angle.cos() * -side, angle.sin().abs(), 0.15 * curl);
            let tip   = palm + dir.normalize_or_zero() * reach;
            let prev  = palm + dir.normalize_or_zero() * (reach - 0.03);
            TrackedPoint {
                hand,
                finger,
                position:  tip,
                direction: fingertip_direction(tip, prev),
            }
        })
        .collect()
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingertip_direction_is_unit_or_zero() {
        let d = fingertip_direction(Vec3::new(0.0, 2.0, 0.0), Vec3::ZERO);
        assert_eq!(d, Vec3::Y);
        assert_eq!(fingertip_direction(Vec3::ONE, Vec3::ONE), Vec3::ZERO);
    }

    #[test]
    fn sim_hand_has_five_distinct_tips() {
        let pts = sim_hand_pose(Hand::Left, 1.25);
        assert_eq!(pts.len(), 5);
        for (i, p) in pts.iter().enumerate() {
            assert_eq!(p.hand, Hand::Left);
            assert_eq!(p.finger.index(), i);
            assert!((p.direction.length() - 1.0).abs() < 1e-4);
            for q in &pts[i + 1..] {
                assert!(p.position.distance(q.position) > 1e-3);
            }
        }
    }

    #[test]
    fn sim_hands_stay_on_their_side() {
        for k in 0..200 {
            let t = k as f32 * 0.05;
            let l = sim_hand_pose(Hand::Left, t);
            let r = sim_hand_pose(Hand::Right, t);
            let lx = l.iter().map(|p| p.position.x).sum::<f32>() / 5.0;
            let rx = r.iter().map(|p| p.position.x).sum::<f32>() / 5.0;
            assert!(lx < rx);
        }
    }

    #[test]
    fn sim_source_emits_frames_and_forwards_keys() {
        let (sim_tx, sim_rx) = mpsc::channel();
        let rx = spawn_anchor_source(SimAnchorSource::new(sim_rx));

        match rx.recv().unwrap() {
            AnchorEvent::Frame(points) => assert_eq!(points.len(), 10),
            other => panic!("expected a frame, got {other:?}"),
        }

        sim_tx.send(SimInput::KeyDown(SimKey::ToggleRight)).unwrap();
        sim_tx.send(SimInput::KeyDown(SimKey::Quit)).unwrap();
        let rest: Vec<AnchorEvent> = rx.iter().collect();
        assert_eq!(rest.last(), Some(&AnchorEvent::Quit));
    }

    #[test]
    fn hidden_hand_drops_its_points() {
        let (sim_tx, sim_rx) = mpsc::channel();
        sim_tx.send(SimInput::KeyDown(SimKey::ToggleLeft)).unwrap();
        let rx = spawn_anchor_source(SimAnchorSource::new(sim_rx));
        match rx.recv().unwrap() {
            AnchorEvent::Frame(points) => {
                assert_eq!(points.len(), 5);
                assert!(points.iter().all(|p| p.hand == Hand::Right));
            }
            other => panic!("expected a frame, got {other:?}"),
        }
        drop(sim_tx);
    }
}
