//! One-shot alert flags
//!
//! Sampling tasks raise flags on the shared [`AlertBoard`]; the dispatcher
//! takes them off again when the matching message has been sent. Raising and
//! taking run inside a critical section, so a flag raised once is handed out
//! exactly once, even when two tasks dispatch back to back.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

/// Notable events that produce a single serial notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlertKind {
    /// A vehicle is inside the caution band
    Caution,
    /// A vehicle is inside the danger band
    Danger,
    /// The helmet accelerometer saw a fall
    Fall,
}

impl AlertKind {
    /// Dispatch order when several flags are pending
    pub const ORDER: [AlertKind; 3] = [AlertKind::Caution, AlertKind::Danger, AlertKind::Fall];

    /// Fixed serial message for the alert
    pub const fn message(self) -> &'static str {
        match self {
            AlertKind::Caution => "Precaución, vehículo cerca.",
            AlertKind::Danger => "Peligro, vehículo cerca.",
            AlertKind::Fall => "Caída detectada.",
        }
    }

    const fn bit(self) -> u8 {
        match self {
            AlertKind::Caution => 0b001,
            AlertKind::Danger => 0b010,
            AlertKind::Fall => 0b100,
        }
    }
}

/// Set of alert flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlertFlags(u8);

impl AlertFlags {
    pub const NONE: Self = Self(0);

    pub const fn only(kind: AlertKind) -> Self {
        Self(kind.bit())
    }

    pub const fn contains(self, kind: AlertKind) -> bool {
        self.0 & kind.bit() != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn insert(&mut self, kind: AlertKind) {
        self.0 |= kind.bit();
    }

    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Flags in dispatch order
    pub fn iter(self) -> impl Iterator<Item = AlertKind> {
        AlertKind::ORDER.into_iter().filter(move |kind| self.contains(*kind))
    }
}

impl FromIterator<AlertKind> for AlertFlags {
    fn from_iter<I: IntoIterator<Item = AlertKind>>(iter: I) -> Self {
        let mut flags = AlertFlags::NONE;
        for kind in iter {
            flags.insert(kind);
        }
        flags
    }
}

/// Process-wide alert flags, shared by all sampling tasks
pub struct AlertBoard {
    flags: Mutex<CriticalSectionRawMutex, Cell<AlertFlags>>,
}

impl AlertBoard {
    pub const fn new() -> Self {
        Self {
            flags: Mutex::new(Cell::new(AlertFlags::NONE)),
        }
    }

    /// Sets every flag in `flags`; flags already set stay set
    pub fn raise(&self, flags: AlertFlags) {
        if flags.is_empty() {
            return;
        }
        self.flags.lock(|cell| cell.set(cell.get().union(flags)));
    }

    /// Clears a single flag and reports whether it was set
    pub fn take(&self, kind: AlertKind) -> bool {
        self.flags.lock(|cell| {
            let current = cell.get();
            if current.contains(kind) {
                cell.set(AlertFlags(current.0 & !kind.bit()));
                true
            } else {
                false
            }
        })
    }

    /// Current flags, without consuming them
    pub fn pending(&self) -> AlertFlags {
        self.flags.lock(Cell::get)
    }
}

impl Default for AlertBoard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_consumes_once() {
        let board = AlertBoard::new();
        board.raise(AlertFlags::only(AlertKind::Danger));
        assert!(board.take(AlertKind::Danger));
        assert!(!board.take(AlertKind::Danger));
        assert!(board.pending().is_empty());
    }

    #[test]
    fn raising_twice_is_still_one_flag() {
        let board = AlertBoard::new();
        board.raise(AlertFlags::only(AlertKind::Fall));
        board.raise(AlertFlags::only(AlertKind::Fall));
        assert!(board.take(AlertKind::Fall));
        assert!(!board.take(AlertKind::Fall));
    }

    #[test]
    fn take_leaves_other_flags_alone() {
        let board = AlertBoard::new();
        board.raise([AlertKind::Caution, AlertKind::Fall].into_iter().collect());
        assert!(board.take(AlertKind::Caution));
        assert_eq!(board.pending(), AlertFlags::only(AlertKind::Fall));
    }

    #[test]
    fn iteration_follows_dispatch_order() {
        let flags: AlertFlags = [AlertKind::Fall, AlertKind::Caution, AlertKind::Danger]
            .into_iter()
            .collect();
        let mut order = flags.iter();
        assert_eq!(order.next(), Some(AlertKind::Caution));
        assert_eq!(order.next(), Some(AlertKind::Danger));
        assert_eq!(order.next(), Some(AlertKind::Fall));
        assert_eq!(order.next(), None);
        assert_eq!(flags.len(), 3);
    }
}
