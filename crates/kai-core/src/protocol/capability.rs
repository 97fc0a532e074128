//! Capability bitmask and the `setCapabilities` message.
//!
//! Client-side only: the service does not echo a confirmed set back, so no
//! negotiated state is tracked here.

use std::ops::{BitOr, BitOrAssign};

use serde_json::{Map, Value};

use crate::error::{KaiError, Result};
use crate::protocol::reading::ReadingKind;

/// Bitmask of the nine capability kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities(u16);

impl Capabilities {
    pub const NONE: Capabilities = Capabilities(0);

    pub const GESTURE: Capabilities = Capabilities::of(ReadingKind::Gesture);
    pub const LINEAR_FLICK: Capabilities = Capabilities::of(ReadingKind::LinearFlick);
    pub const FINGER_SHORTCUT: Capabilities = Capabilities::of(ReadingKind::FingerShortcut);
    pub const FINGER_POSITION: Capabilities = Capabilities::of(ReadingKind::FingerPosition);
    pub const PYR: Capabilities = Capabilities::of(ReadingKind::Pyr);
    pub const QUATERNION: Capabilities = Capabilities::of(ReadingKind::Quaternion);
    pub const ACCELEROMETER: Capabilities = Capabilities::of(ReadingKind::Accelerometer);
    pub const GYROSCOPE: Capabilities = Capabilities::of(ReadingKind::Gyroscope);
    pub const MAGNETOMETER: Capabilities = Capabilities::of(ReadingKind::Magnetometer);

    /// The single-bit mask for one kind.
    pub const fn of(kind: ReadingKind) -> Capabilities {
        Capabilities(1u16 << kind as u16)
    }

    pub fn contains(self, other: Capabilities) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Capabilities) {
        self.0 |= other.0;
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Enabled kinds in wire order.
    pub fn kinds(self) -> impl Iterator<Item = ReadingKind> {
        ReadingKind::ALL
            .into_iter()
            .filter(move |k| self.contains(Capabilities::of(*k)))
    }

    /// Build the `setCapabilities` message. Enabled kinds appear as
    /// `"<tag>":true`; disabled kinds are omitted entirely, never `false`.
    pub fn to_message(self) -> String {
        let mut msg = Map::new();
        msg.insert("type".into(), Value::from("setCapabilities"));
        for kind in self.kinds() {
            msg.insert(kind.wire_tag().into(), Value::from(true));
        }
        Value::Object(msg).to_string()
    }

    /// Recover the enabled set from a `setCapabilities` object.
    pub fn from_message(value: &Value) -> Result<Capabilities> {
        let obj = value
            .as_object()
            .ok_or_else(|| KaiError::Malformed(value.to_string()))?;
        if obj.get("type").and_then(Value::as_str) != Some("setCapabilities") {
            return Err(KaiError::Malformed(value.to_string()));
        }
        let mut caps = Capabilities::NONE;
        for kind in ReadingKind::ALL {
            if obj.get(kind.wire_tag()).and_then(Value::as_bool) == Some(true) {
                caps.insert(Capabilities::of(kind));
            }
        }
        Ok(caps)
    }
}

impl BitOr for Capabilities {
    type Output = Capabilities;

    fn bitor(self, rhs: Capabilities) -> Capabilities {
        Capabilities(self.0 | rhs.0)
    }
}

impl BitOrAssign for Capabilities {
    fn bitor_assign(&mut self, rhs: Capabilities) {
        self.0 |= rhs.0;
    }
}

impl From<ReadingKind> for Capabilities {
    fn from(kind: ReadingKind) -> Capabilities {
        Capabilities::of(kind)
    }
}
