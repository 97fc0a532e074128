//! Device registry: the id -> handle table and the three default aliases.
//!
//! The table is a fixed arena of 8 slots indexed by kai id 0-7, replaced
//! wholesale on every `connectedKais` envelope. Alias bindings update only
//! when an entry claims them and are never cleared implicitly, so a rebuild
//! that names no default leaves the previous binding in place.

use std::sync::RwLock;

use kai_core::protocol::envelope::KaiEntry;
use kai_core::protocol::reading::Hand;

/// Slot count of the connected-device table.
pub const MAX_KAIS: usize = 8;

/// One connected device as the registry knows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceHandle {
    pub kai_id: u8,
    pub hand: Hand,
}

#[derive(Default)]
struct Table {
    slots: [Option<DeviceHandle>; MAX_KAIS],
    default: Option<DeviceHandle>,
    default_left: Option<DeviceHandle>,
    default_right: Option<DeviceHandle>,
}

/// Single-writer (dispatch path) / multi-reader table.
#[derive(Default)]
pub struct DeviceRegistry {
    table: RwLock<Table>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the slot table from the newest `connectedKais` list.
    ///
    /// Ids outside 0-7 are ignored with a warning rather than growing the
    /// table. A `defaultLeftKai` claim binds hand Left and `defaultRightKai`
    /// binds Right regardless of the entry's own hand; a `defaultKai` claim
    /// keeps it. The hand forcing looks odd next to the entry's own `hand`
    /// field but is long-standing service behaviour modules rely on; do not
    /// change it to read the entry's hand without the protocol owner's
    /// sign-off.
    pub fn replace_all(&self, entries: &[KaiEntry]) {
        let mut slots: [Option<DeviceHandle>; MAX_KAIS] = [None; MAX_KAIS];
        let mut default = None;
        let mut default_left = None;
        let mut default_right = None;

        for entry in entries {
            if !(0..MAX_KAIS as i64).contains(&entry.kai_id) {
                tracing::warn!(kai_id = entry.kai_id, "ignoring out-of-range kai id");
                continue;
            }
            let kai_id = entry.kai_id as u8;
            let hand = Hand::parse(&entry.hand).unwrap_or(Hand::Left);
            let handle = DeviceHandle { kai_id, hand };

            if entry.default_kai {
                default = Some(handle);
            }
            if entry.default_left_kai {
                default_left = Some(DeviceHandle {
                    kai_id,
                    hand: Hand::Left,
                });
            }
            if entry.default_right_kai {
                default_right = Some(DeviceHandle {
                    kai_id,
                    hand: Hand::Right,
                });
            }

            slots[kai_id as usize] = Some(handle);
        }

        let mut table = self.table.write().unwrap_or_else(|e| e.into_inner());
        table.slots = slots;
        // Unclaimed aliases keep their previous binding.
        if default.is_some() {
            table.default = default;
        }
        if default_left.is_some() {
            table.default_left = default_left;
        }
        if default_right.is_some() {
            table.default_right = default_right;
        }
    }

    /// Out-of-range or unpopulated ids are absent, never an error.
    pub fn lookup(&self, kai_id: i64) -> Option<DeviceHandle> {
        if !(0..MAX_KAIS as i64).contains(&kai_id) {
            return None;
        }
        self.read().slots[kai_id as usize]
    }

    pub fn default_kai(&self) -> Option<DeviceHandle> {
        self.read().default
    }

    pub fn default_left_kai(&self) -> Option<DeviceHandle> {
        self.read().default_left
    }

    pub fn default_right_kai(&self) -> Option<DeviceHandle> {
        self.read().default_right
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Table> {
        self.table.read().unwrap_or_else(|e| e.into_inner())
    }
}
