use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::{Duration, Instant};

use crate::domain::station::notification::{NotificationSink, SlotTransition};

/// Names one of the two single-capacity places of the station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotKind {
    /// Empty containers delivered by the replenish agent, waiting to be filled.
    Empty,
    /// Filled containers placed by a worker, waiting to be picked up.
    Full,
}

impl SlotKind {
    /// The occupancy value blocked workers wait for on this slot.
    pub fn awaited(self) -> bool {
        match self {
            SlotKind::Empty => true,
            SlotKind::Full => false,
        }
    }

    fn transition(self, occupied: bool) -> SlotTransition {
        match self {
            SlotKind::Empty => SlotTransition::Empty { occupied },
            SlotKind::Full => SlotTransition::Full { occupied },
        }
    }
}

/// One occupancy flag together with its own guard and wake-up condition.
#[derive(Debug)]
struct Slot {
    kind: SlotKind,
    occupied: Mutex<bool>,
    changed: Condvar,
}

impl Slot {
    fn new(kind: SlotKind) -> Self {
        Self { kind, occupied: Mutex::new(false), changed: Condvar::new() }
    }

    // A panicking sink must not wedge the line, the flag itself is always valid.
    fn lock(&self) -> MutexGuard<'_, bool> {
        self.occupied.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// The shared handoff station.
///
/// The station is the only owner of both occupancy flags. Every read-modify-write
/// of a flag happens under that slot's mutex, and the two slots never share a
/// lock, so traffic on the empty place never serializes against the full place.
///
/// A flag change is observable only when the value actually flips. In that case the
/// attached [`NotificationSink`] is called on the transitioning thread while the
/// slot guard is still held, and one waiter is woken if the new value is the one
/// workers wait for. A sink must therefore never call back into the station for
/// the slot it is being notified about.
#[derive(Debug)]
pub struct Station {
    empty: Slot,
    full: Slot,
    sink: RwLock<Option<Arc<dyn NotificationSink>>>,
}

impl Default for Station {
    fn default() -> Self {
        Self::new()
    }
}

impl Station {
    /// Creates a station with both places vacant and no sink attached.
    pub fn new() -> Self {
        Self { empty: Slot::new(SlotKind::Empty), full: Slot::new(SlotKind::Full), sink: RwLock::new(None) }
    }

    /// Registers `sink` as the single observer, replacing any previous one.
    pub fn attach_sink(&self, sink: Arc<dyn NotificationSink>) {
        *self.sink.write().unwrap_or_else(PoisonError::into_inner) = Some(sink);
    }

    pub fn detach_sink(&self) -> Option<Arc<dyn NotificationSink>> {
        self.sink.write().unwrap_or_else(PoisonError::into_inner).take()
    }

    pub fn is_empty_occupied(&self) -> bool {
        *self.empty.lock()
    }

    pub fn is_full_occupied(&self) -> bool {
        *self.full.lock()
    }

    /// Occupies the empty place if it is vacant. Returns `false` without any
    /// side effect when it is already occupied.
    pub fn try_occupy_empty(&self) -> bool {
        let mut occupied = self.empty.lock();
        self.set(&self.empty, &mut occupied, true)
    }

    /// Vacates the empty place. Returns whether the flag actually flipped.
    pub fn vacate_empty(&self) -> bool {
        let mut occupied = self.empty.lock();
        self.set(&self.empty, &mut occupied, false)
    }

    /// Occupies the full place if it is vacant.
    pub fn try_occupy_full(&self) -> bool {
        let mut occupied = self.full.lock();
        self.set(&self.full, &mut occupied, true)
    }

    /// Vacates the full place. Returns whether the flag actually flipped.
    pub fn vacate_full(&self) -> bool {
        let mut occupied = self.full.lock();
        self.set(&self.full, &mut occupied, false)
    }

    /// Blocks until the empty place is occupied.
    ///
    /// The returned claim keeps the slot locked, so the caller's follow-up
    /// [`SlotClaim::vacate`] happens atomically with the check. Of several
    /// waiters, exactly one gets to consume each delivery.
    pub fn wait_until_empty_occupied(&self) -> SlotClaim<'_> {
        self.wait_for(&self.empty)
    }

    /// Blocks until the full place is vacant. See [`Station::wait_until_empty_occupied`].
    pub fn wait_until_full_vacant(&self) -> SlotClaim<'_> {
        self.wait_for(&self.full)
    }

    /// Bounded form of [`Station::wait_until_empty_occupied`]. Returns `None` on timeout.
    pub fn wait_until_empty_occupied_timeout(&self, timeout: Duration) -> Option<SlotClaim<'_>> {
        self.wait_for_timeout(&self.empty, timeout)
    }

    /// Bounded form of [`Station::wait_until_full_vacant`]. Returns `None` on timeout.
    pub fn wait_until_full_vacant_timeout(&self, timeout: Duration) -> Option<SlotClaim<'_>> {
        self.wait_for_timeout(&self.full, timeout)
    }

    fn wait_for<'a>(&'a self, slot: &'a Slot) -> SlotClaim<'a> {
        let awaited = slot.kind.awaited();
        let mut guard = slot.lock();

        // Re-check after every wake-up: spurious wake-ups happen and another
        // waiter may have consumed the transition first.
        while *guard != awaited {
            guard = slot.changed.wait(guard).unwrap_or_else(PoisonError::into_inner);
        }

        SlotClaim { station: self, slot, guard }
    }

    fn wait_for_timeout<'a>(&'a self, slot: &'a Slot, timeout: Duration) -> Option<SlotClaim<'a>> {
        let awaited = slot.kind.awaited();
        let deadline = Instant::now() + timeout;
        let mut guard = slot.lock();

        while *guard != awaited {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return None;
            }
            let (next, _) = slot.changed.wait_timeout(guard, remaining).unwrap_or_else(PoisonError::into_inner);
            guard = next;
        }

        Some(SlotClaim { station: self, slot, guard })
    }

    /// Writes `value` into a locked slot. Must be called with the slot's own guard.
    fn set(&self, slot: &Slot, occupied: &mut MutexGuard<'_, bool>, value: bool) -> bool {
        if **occupied == value {
            return false;
        }
        **occupied = value;

        if let Some(sink) = self.sink.read().unwrap_or_else(PoisonError::into_inner).as_ref() {
            sink.on_transition(slot.kind.transition(value));
        }

        // Only the awaited value can release a waiter.
        if value == slot.kind.awaited() {
            slot.changed.notify_one();
        }

        true
    }
}

/// Exclusive hold on a slot that was observed in its awaited state.
///
/// Dropping the claim without transitioning releases the slot unchanged and
/// passes the wake-up on to the next waiter.
#[derive(Debug)]
pub struct SlotClaim<'a> {
    station: &'a Station,
    slot: &'a Slot,
    guard: MutexGuard<'a, bool>,
}

impl SlotClaim<'_> {
    pub fn kind(&self) -> SlotKind {
        self.slot.kind
    }

    pub fn is_occupied(&self) -> bool {
        *self.guard
    }

    /// Sets the slot vacant under the claimed guard. Returns whether it flipped.
    pub fn vacate(mut self) -> bool {
        self.station.set(self.slot, &mut self.guard, false)
    }

    /// Sets the slot occupied under the claimed guard. Returns whether it flipped.
    pub fn occupy(mut self) -> bool {
        self.station.set(self.slot, &mut self.guard, true)
    }
}

impl Drop for SlotClaim<'_> {
    fn drop(&mut self) {
        if *self.guard == self.slot.kind.awaited() {
            self.slot.changed.notify_one();
        }
    }
}
