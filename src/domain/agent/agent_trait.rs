use std::thread;
use std::time::Duration;

use crate::domain::utils::id::AgentId;

/// External periodic actor driving one direction of one slot.
pub trait Agent: Send + Sync {
    fn id(&self) -> &AgentId;

    fn interval(&self) -> Duration;

    /// Performs a single attempt. Returns whether the slot changed.
    fn tick(&self) -> bool;

    /// Ticks forever, one tick per interval.
    ///
    /// The pause comes before every attempt, successful or not, so an agent
    /// whose slot is already in the target state never spins.
    fn run(&self) -> ! {
        tracing::info!("[{}] Started with interval {:?}", self.id(), self.interval());
        loop {
            thread::sleep(self.interval());
            self.tick();
        }
    }
}
