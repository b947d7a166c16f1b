use std::sync::Arc;
use std::time::Duration;

use crate::domain::agent::agent_trait::Agent;
use crate::domain::station::station::Station;
use crate::domain::utils::id::AgentId;
use crate::domain::utils::statistics::{self, LineStatistics};

/// Picks up filled containers from the station.
#[derive(Debug)]
pub struct DrainAgent {
    id: AgentId,
    station: Arc<Station>,
    statistics: Arc<LineStatistics>,
    interval: Duration,
}

impl DrainAgent {
    pub fn new(station: Arc<Station>, statistics: Arc<LineStatistics>, interval: Duration) -> Self {
        Self { id: AgentId::new("Consumer"), station, statistics, interval }
    }
}

impl Agent for DrainAgent {
    fn id(&self) -> &AgentId {
        &self.id
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    fn tick(&self) -> bool {
        if !self.station.vacate_full() {
            return false;
        }

        self.statistics.record_pickup();
        statistics::record(&self.id.id, "PickedUp", Some("Full"));
        tracing::info!("[{}] Full bottles removed", self.id);
        true
    }
}
