use std::fmt;
use std::sync::Arc;
use std::thread;

use crate::domain::line_config::FillDuration;
use crate::domain::station::station::{SlotKind, Station};
use crate::domain::utils::id::WorkerId;
use crate::domain::utils::statistics::{self, LineStatistics};
use crate::error::{Error, Result};

/// Position of a worker inside its fill cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    WaitingForEmpty,
    Filling,
    WaitingForFullSlot,
    CycleDone,
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            WorkerState::WaitingForEmpty => "is waiting for empty bottles",
            WorkerState::Filling => "is filling bottles",
            WorkerState::WaitingForFullSlot => "is waiting for the full place",
            WorkerState::CycleDone => "has placed full bottles",
        };
        f.write_str(text)
    }
}

/// A filling machine. Takes one delivery of empty bottles at a time, fills
/// them and hands them to the full place.
#[derive(Debug)]
pub struct Worker {
    id: WorkerId,
    station: Arc<Station>,
    statistics: Arc<LineStatistics>,
    fill_duration: FillDuration,
    state: WorkerState,
}

impl Worker {
    pub fn new(index: usize, station: Arc<Station>, statistics: Arc<LineStatistics>, fill_duration: FillDuration) -> Self {
        Self {
            id: WorkerId::from_index(index),
            station,
            statistics,
            fill_duration,
            state: WorkerState::CycleDone,
        }
    }

    pub fn id(&self) -> &WorkerId {
        &self.id
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    fn enter(&mut self, state: WorkerState) {
        self.state = state;
        tracing::info!("[{}] {}", self.id, state);
    }

    /// Runs one full cycle: take a delivery, fill, place the result.
    ///
    /// Blocks while the empty place is vacant or the full place is occupied.
    pub fn run_cycle(&mut self) -> Result<()> {
        self.enter(WorkerState::WaitingForEmpty);
        {
            let claim = self.station.wait_until_empty_occupied();
            if !claim.vacate() {
                return Err(self.violation(SlotKind::Empty, true));
            }
        }
        self.statistics.record_cycle_started();
        statistics::record(&self.id.id, "TookEmpty", Some("Empty"));

        self.enter(WorkerState::Filling);
        let duration = self.fill_duration.sample();
        thread::sleep(duration);
        tracing::debug!("[{}] Filled bottles in {:?}", self.id, duration);

        self.enter(WorkerState::WaitingForFullSlot);
        {
            let claim = self.station.wait_until_full_vacant();
            if !claim.occupy() {
                return Err(self.violation(SlotKind::Full, false));
            }
        }
        self.statistics.record_cycle_completed();
        statistics::record(&self.id.id, "PlacedFull", Some("Full"));

        self.enter(WorkerState::CycleDone);
        Ok(())
    }

    /// Cycles forever. Only returns on a protocol violation, which ends the worker.
    pub fn run(mut self) -> Error {
        loop {
            if let Err(e) = self.run_cycle() {
                tracing::error!("[{}] Stopping after protocol violation: {}", self.id, e);
                return e;
            }
        }
    }

    fn violation(&self, slot: SlotKind, expected: bool) -> Error {
        Error::ProtocolViolation { slot, expected }
    }
}
