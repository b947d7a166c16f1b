use std::sync::atomic::{AtomicU64, Ordering};

use crate::domain::station::station::SlotKind;

/// A flag flip observed on one of the station's places.
///
/// The new value travels with the event because the sink runs while the slot
/// is still locked and cannot query the station for that slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotTransition {
    Empty { occupied: bool },
    Full { occupied: bool },
}

impl SlotTransition {
    pub fn slot(&self) -> SlotKind {
        match self {
            SlotTransition::Empty { .. } => SlotKind::Empty,
            SlotTransition::Full { .. } => SlotKind::Full,
        }
    }

    pub fn occupied(&self) -> bool {
        match *self {
            SlotTransition::Empty { occupied } | SlotTransition::Full { occupied } => occupied,
        }
    }
}

/// Observer the station reports every real transition to.
///
/// Calls are synchronous, on the thread that caused the transition, with the
/// slot guard held. Implementations must be quick and must not re-enter the
/// station for the notified slot.
pub trait NotificationSink: std::fmt::Debug + Send + Sync {
    fn on_transition(&self, transition: SlotTransition);
}

/// Emits one trace line per transition.
#[derive(Debug, Default)]
pub struct TraceSink;

impl NotificationSink for TraceSink {
    fn on_transition(&self, transition: SlotTransition) {
        match transition {
            SlotTransition::Empty { occupied: true } => tracing::debug!("[Station] Empty place occupied"),
            SlotTransition::Empty { occupied: false } => tracing::debug!("[Station] Empty place vacated"),
            SlotTransition::Full { occupied: true } => tracing::debug!("[Station] Full place occupied"),
            SlotTransition::Full { occupied: false } => tracing::debug!("[Station] Full place vacated"),
        }
    }
}

/// Counts transitions per slot and direction.
#[derive(Debug, Default)]
pub struct TransitionCounter {
    empty_occupied: AtomicU64,
    empty_vacated: AtomicU64,
    full_occupied: AtomicU64,
    full_vacated: AtomicU64,
}

impl TransitionCounter {
    pub fn empty_occupied(&self) -> u64 {
        self.empty_occupied.load(Ordering::SeqCst)
    }

    pub fn empty_vacated(&self) -> u64 {
        self.empty_vacated.load(Ordering::SeqCst)
    }

    pub fn full_occupied(&self) -> u64 {
        self.full_occupied.load(Ordering::SeqCst)
    }

    pub fn full_vacated(&self) -> u64 {
        self.full_vacated.load(Ordering::SeqCst)
    }

    pub fn total(&self) -> u64 {
        self.empty_occupied() + self.empty_vacated() + self.full_occupied() + self.full_vacated()
    }
}

impl NotificationSink for TransitionCounter {
    fn on_transition(&self, transition: SlotTransition) {
        let counter = match transition {
            SlotTransition::Empty { occupied: true } => &self.empty_occupied,
            SlotTransition::Empty { occupied: false } => &self.empty_vacated,
            SlotTransition::Full { occupied: true } => &self.full_occupied,
            SlotTransition::Full { occupied: false } => &self.full_vacated,
        };
        counter.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_accessors() {
        let t = SlotTransition::Full { occupied: true };
        assert_eq!(t.slot(), SlotKind::Full);
        assert!(t.occupied());

        let t = SlotTransition::Empty { occupied: false };
        assert_eq!(t.slot(), SlotKind::Empty);
        assert!(!t.occupied());
    }

    #[test]
    fn test_counter_tracks_each_direction() {
        let counter = TransitionCounter::default();
        counter.on_transition(SlotTransition::Empty { occupied: true });
        counter.on_transition(SlotTransition::Empty { occupied: false });
        counter.on_transition(SlotTransition::Full { occupied: true });

        assert_eq!(counter.empty_occupied(), 1);
        assert_eq!(counter.empty_vacated(), 1);
        assert_eq!(counter.full_occupied(), 1);
        assert_eq!(counter.full_vacated(), 0);
        assert_eq!(counter.total(), 3);
    }
}
