use std::sync::Arc;
use std::time::Duration;

use crate::domain::agent::agent_trait::Agent;
use crate::domain::station::station::Station;
use crate::domain::utils::id::AgentId;
use crate::domain::utils::statistics::{self, LineStatistics};

/// Delivers empty containers to the station whenever the empty place is free.
#[derive(Debug)]
pub struct ReplenishAgent {
    id: AgentId,
    station: Arc<Station>,
    statistics: Arc<LineStatistics>,
    interval: Duration,
}

impl ReplenishAgent {
    pub fn new(station: Arc<Station>, statistics: Arc<LineStatistics>, interval: Duration) -> Self {
        Self { id: AgentId::new("Producer"), station, statistics, interval }
    }
}

impl Agent for ReplenishAgent {
    fn id(&self) -> &AgentId {
        &self.id
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    fn tick(&self) -> bool {
        if !self.station.try_occupy_empty() {
            tracing::trace!("[{}] Empty place still occupied, skipping delivery", self.id);
            return false;
        }

        self.statistics.record_delivery();
        statistics::record(&self.id.id, "Delivered", Some("Empty"));
        tracing::info!("[{}] Empty bottles delivered", self.id);
        true
    }
}
