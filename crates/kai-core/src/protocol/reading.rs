//! Capability readings and the nine fragment decoders.
//!
//! Each decoder takes one fragment object from an `incomingData` envelope's
//! `data` array and produces a typed [`Reading`], or `KaiError::Malformed`
//! on missing/mistyped fields. Decoders are independent: one bad fragment
//! never affects its siblings.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{KaiError, Result};

/// The nine capability kinds a Kai can be subscribed to report.
///
/// Discriminant order is stable; [`capability`](super::capability) derives
/// bitmask positions from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadingKind {
    Gesture,
    LinearFlick,
    FingerShortcut,
    FingerPosition,
    Pyr,
    Quaternion,
    Accelerometer,
    Gyroscope,
    Magnetometer,
}

impl ReadingKind {
    /// All kinds, in wire/bitmask order.
    pub const ALL: [ReadingKind; 9] = [
        ReadingKind::Gesture,
        ReadingKind::LinearFlick,
        ReadingKind::FingerShortcut,
        ReadingKind::FingerPosition,
        ReadingKind::Pyr,
        ReadingKind::Quaternion,
        ReadingKind::Accelerometer,
        ReadingKind::Gyroscope,
        ReadingKind::Magnetometer,
    ];

    /// Fragment `type` tag. The same string names the capability field in
    /// `setCapabilities`.
    pub fn wire_tag(self) -> &'static str {
        match self {
            ReadingKind::Gesture => "gestureData",
            ReadingKind::LinearFlick => "linearFlickData",
            ReadingKind::FingerShortcut => "fingerShortcutData",
            ReadingKind::FingerPosition => "fingerPositionalData",
            ReadingKind::Pyr => "pYRData",
            ReadingKind::Quaternion => "quaternionData",
            ReadingKind::Accelerometer => "accelerometerData",
            ReadingKind::Gyroscope => "gyroscopeData",
            ReadingKind::Magnetometer => "magnetometerData",
        }
    }

    pub fn from_wire_tag(tag: &str) -> Option<ReadingKind> {
        ReadingKind::ALL.into_iter().find(|k| k.wire_tag() == tag)
    }
}

/// The fixed gesture vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gesture {
    SwipeUp,
    SwipeDown,
    SwipeLeft,
    SwipeRight,
    SideSwipeUp,
    SideSwipeDown,
    SideSwipeLeft,
    SideSwipeRight,
    Pinch2Begin,
    Pinch2End,
    GrabBegin,
    GrabEnd,
    Pinch3Begin,
    Pinch3End,
    DialBegin,
    DialEnd,
}

impl Gesture {
    pub const ALL: [Gesture; 16] = [
        Gesture::SwipeUp,
        Gesture::SwipeDown,
        Gesture::SwipeLeft,
        Gesture::SwipeRight,
        Gesture::SideSwipeUp,
        Gesture::SideSwipeDown,
        Gesture::SideSwipeLeft,
        Gesture::SideSwipeRight,
        Gesture::Pinch2Begin,
        Gesture::Pinch2End,
        Gesture::GrabBegin,
        Gesture::GrabEnd,
        Gesture::Pinch3Begin,
        Gesture::Pinch3End,
        Gesture::DialBegin,
        Gesture::DialEnd,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Gesture::SwipeUp => "SwipeUp",
            Gesture::SwipeDown => "SwipeDown",
            Gesture::SwipeLeft => "SwipeLeft",
            Gesture::SwipeRight => "SwipeRight",
            Gesture::SideSwipeUp => "SideSwipeUp",
            Gesture::SideSwipeDown => "SideSwipeDown",
            Gesture::SideSwipeLeft => "SideSwipeLeft",
            Gesture::SideSwipeRight => "SideSwipeRight",
            Gesture::Pinch2Begin => "Pinch2Begin",
            Gesture::Pinch2End => "Pinch2End",
            Gesture::GrabBegin => "GrabBegin",
            Gesture::GrabEnd => "GrabEnd",
            Gesture::Pinch3Begin => "Pinch3Begin",
            Gesture::Pinch3End => "Pinch3End",
            Gesture::DialBegin => "DialBegin",
            Gesture::DialEnd => "DialEnd",
        }
    }

    /// Case-insensitive exact match against the vocabulary.
    pub fn parse(s: &str) -> Option<Gesture> {
        Gesture::ALL
            .into_iter()
            .find(|g| g.name().eq_ignore_ascii_case(s))
    }
}

/// Which hand a Kai is worn on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hand {
    Left,
    Right,
}

impl Hand {
    /// Case-insensitive parse. Callers fall back to `Left` on unrecognized
    /// strings, matching the service's historical behaviour.
    pub fn parse(s: &str) -> Option<Hand> {
        if s.eq_ignore_ascii_case("left") {
            Some(Hand::Left)
        } else if s.eq_ignore_ascii_case("right") {
            Some(Hand::Right)
        } else {
            None
        }
    }
}

/// 3-axis sensor sample.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Orientation quaternion.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Quaternion {
    pub w: f32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// A gesture event: either a vocabulary match or the raw unrecognized
/// string. Unknown gestures are a first-class outcome, not an error; newer
/// firmware ships gestures older SDKs have no name for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GestureReading {
    Known(Gesture),
    Unknown(String),
}

/// One decoded capability reading. Immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub enum Reading {
    Gesture(GestureReading),
    LinearFlick(String),
    FingerShortcut([bool; 4]),
    FingerPosition([i32; 4]),
    Pyr { pitch: f32, yaw: f32, roll: f32 },
    Quaternion(Quaternion),
    Accelerometer(Vector3),
    Gyroscope(Vector3),
    Magnetometer(Vector3),
}

impl Reading {
    pub fn kind(&self) -> ReadingKind {
        match self {
            Reading::Gesture(_) => ReadingKind::Gesture,
            Reading::LinearFlick(_) => ReadingKind::LinearFlick,
            Reading::FingerShortcut(_) => ReadingKind::FingerShortcut,
            Reading::FingerPosition(_) => ReadingKind::FingerPosition,
            Reading::Pyr { .. } => ReadingKind::Pyr,
            Reading::Quaternion(_) => ReadingKind::Quaternion,
            Reading::Accelerometer(_) => ReadingKind::Accelerometer,
            Reading::Gyroscope(_) => ReadingKind::Gyroscope,
            Reading::Magnetometer(_) => ReadingKind::Magnetometer,
        }
    }
}

fn malformed(fragment: &Value, err: impl std::fmt::Display) -> KaiError {
    tracing::warn!(%fragment, %err, "malformed fragment");
    KaiError::Malformed(format!("{err} in fragment {fragment}"))
}

fn from_fragment<'de, T: Deserialize<'de>>(fragment: &'de Value) -> Result<T> {
    T::deserialize(fragment).map_err(|e| malformed(fragment, e))
}

/// Decode one fragment already classified as `kind`.
pub fn decode_fragment(kind: ReadingKind, fragment: &Value) -> Result<Reading> {
    match kind {
        ReadingKind::Gesture => decode_gesture(fragment),
        ReadingKind::LinearFlick => decode_linear_flick(fragment),
        ReadingKind::FingerShortcut => decode_finger_shortcut(fragment),
        ReadingKind::FingerPosition => decode_finger_position(fragment),
        ReadingKind::Pyr => decode_pyr(fragment),
        ReadingKind::Quaternion => decode_quaternion(fragment),
        ReadingKind::Accelerometer => decode_accelerometer(fragment),
        ReadingKind::Gyroscope => decode_gyroscope(fragment),
        ReadingKind::Magnetometer => decode_magnetometer(fragment),
    }
}

#[derive(Deserialize)]
struct GestureWire {
    gesture: String,
}

pub fn decode_gesture(fragment: &Value) -> Result<Reading> {
    let wire: GestureWire = from_fragment(fragment)?;
    let reading = match Gesture::parse(&wire.gesture) {
        Some(g) => GestureReading::Known(g),
        None => GestureReading::Unknown(wire.gesture),
    };
    Ok(Reading::Gesture(reading))
}

#[derive(Deserialize)]
struct LinearFlickWire {
    flick: String,
}

pub fn decode_linear_flick(fragment: &Value) -> Result<Reading> {
    let wire: LinearFlickWire = from_fragment(fragment)?;
    Ok(Reading::LinearFlick(wire.flick))
}

#[derive(Deserialize)]
struct FingerShortcutWire {
    fingers: Vec<bool>,
}

/// Fewer than 4 entries leaves the trailing slots at `false`. This is a
/// deliberate tolerance policy for older firmware, not silent data loss.
pub fn decode_finger_shortcut(fragment: &Value) -> Result<Reading> {
    let wire: FingerShortcutWire = from_fragment(fragment)?;
    if wire.fingers.len() > 4 {
        return Err(malformed(fragment, "more than 4 finger entries"));
    }
    let mut fingers = [false; 4];
    for (slot, v) in fingers.iter_mut().zip(wire.fingers) {
        *slot = v;
    }
    Ok(Reading::FingerShortcut(fingers))
}

#[derive(Deserialize)]
struct FingerPositionWire {
    fingers: Vec<i32>,
}

/// Same trailing-slot policy as [`decode_finger_shortcut`], defaulting to 0.
pub fn decode_finger_position(fragment: &Value) -> Result<Reading> {
    let wire: FingerPositionWire = from_fragment(fragment)?;
    if wire.fingers.len() > 4 {
        return Err(malformed(fragment, "more than 4 finger entries"));
    }
    let mut fingers = [0i32; 4];
    for (slot, v) in fingers.iter_mut().zip(wire.fingers) {
        *slot = v;
    }
    Ok(Reading::FingerPosition(fingers))
}

#[derive(Deserialize)]
struct PyrWire {
    pitch: f32,
    yaw: f32,
    roll: f32,
}

pub fn decode_pyr(fragment: &Value) -> Result<Reading> {
    let wire: PyrWire = from_fragment(fragment)?;
    Ok(Reading::Pyr {
        pitch: wire.pitch,
        yaw: wire.yaw,
        roll: wire.roll,
    })
}

#[derive(Deserialize)]
struct QuaternionWire {
    quaternion: Quaternion,
}

pub fn decode_quaternion(fragment: &Value) -> Result<Reading> {
    let wire: QuaternionWire = from_fragment(fragment)?;
    Ok(Reading::Quaternion(wire.quaternion))
}

#[derive(Deserialize)]
struct AccelerometerWire {
    accelerometer: Vector3,
}

pub fn decode_accelerometer(fragment: &Value) -> Result<Reading> {
    let wire: AccelerometerWire = from_fragment(fragment)?;
    Ok(Reading::Accelerometer(wire.accelerometer))
}

#[derive(Deserialize)]
struct GyroscopeWire {
    gyroscope: Vector3,
}

pub fn decode_gyroscope(fragment: &Value) -> Result<Reading> {
    let wire: GyroscopeWire = from_fragment(fragment)?;
    Ok(Reading::Gyroscope(wire.gyroscope))
}

#[derive(Deserialize)]
struct MagnetometerWire {
    magnetometer: Vector3,
}

pub fn decode_magnetometer(fragment: &Value) -> Result<Reading> {
    let wire: MagnetometerWire = from_fragment(fragment)?;
    Ok(Reading::Magnetometer(wire.magnetometer))
}
