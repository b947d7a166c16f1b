use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::domain::agent::agent_trait::Agent;
use crate::domain::agent::drain_agent::DrainAgent;
use crate::domain::agent::replenish_agent::ReplenishAgent;
use crate::domain::line_config::LineConfig;
use crate::domain::station::notification::{NotificationSink, TraceSink};
use crate::domain::station::station::Station;
use crate::domain::utils::statistics::{LineStatistics, StatisticsSnapshot};
use crate::domain::worker::worker::Worker;
use crate::error::{Error, Result};

/// Summary returned once a bounded run ends.
#[derive(Debug, Clone, Serialize)]
pub struct LineReport {
    pub elapsed_ms: u128,
    pub workers: usize,
    pub statistics: StatisticsSnapshot,
}

/// Wires a station, both agents and the configured number of workers, each
/// on its own thread.
///
/// Threads are detached once started. They run until the process exits.
#[derive(Debug)]
pub struct LineSimulator {
    config: LineConfig,
    station: Arc<Station>,
    statistics: Arc<LineStatistics>,
    started_at: Option<Instant>,
}

impl LineSimulator {
    pub fn new(config: LineConfig) -> Self {
        Self::with_sink(config, Arc::new(TraceSink))
    }

    pub fn with_sink(config: LineConfig, sink: Arc<dyn NotificationSink>) -> Self {
        let station = Arc::new(Station::new());
        station.attach_sink(sink);

        Self { config, station, statistics: Arc::new(LineStatistics::default()), started_at: None }
    }

    pub fn station(&self) -> &Arc<Station> {
        &self.station
    }

    pub fn statistics(&self) -> StatisticsSnapshot {
        self.statistics.snapshot()
    }

    /// Spawns the agents and workers. Calling it again is a no-op.
    pub fn start(&mut self) -> Result<()> {
        if self.started_at.is_some() {
            return Ok(());
        }

        let replenish = ReplenishAgent::new(self.station.clone(), self.statistics.clone(), self.config.replenish_interval);
        spawn("replenish-agent", move || replenish.run())?;

        let drain = DrainAgent::new(self.station.clone(), self.statistics.clone(), self.config.drain_interval);
        spawn("drain-agent", move || drain.run())?;

        for index in 0..self.config.worker_count {
            let worker = Worker::new(index, self.station.clone(), self.statistics.clone(), self.config.fill_duration);
            spawn(&format!("worker-{}", index), move || {
                worker.run();
            })?;
        }

        log::info!("Bottling line started with {} workers.", self.config.worker_count);
        self.started_at = Some(Instant::now());
        Ok(())
    }

    /// Starts the line if needed, then blocks for the configured run duration.
    /// Without a run duration this never returns.
    pub fn run(&mut self) -> Result<LineReport> {
        self.start()?;

        let Some(run_duration) = self.config.run_duration else {
            loop {
                thread::park();
            }
        };

        self.run_for(run_duration)
    }

    /// Blocks until `duration` has passed since the line was started.
    pub fn run_for(&mut self, duration: Duration) -> Result<LineReport> {
        self.start()?;
        let started_at = self.started_at.unwrap_or_else(Instant::now);

        loop {
            let elapsed = started_at.elapsed();
            if elapsed >= duration {
                break;
            }
            thread::sleep(duration - elapsed);
        }

        let report = LineReport {
            elapsed_ms: started_at.elapsed().as_millis(),
            workers: self.config.worker_count,
            statistics: self.statistics.snapshot(),
        };

        log::info!(
            "*** Simulation ended after {} ms: {} deliveries, {} cycles completed, {} pickups.",
            report.elapsed_ms,
            report.statistics.deliveries,
            report.statistics.cycles_completed,
            report.statistics.pickups
        );

        Ok(report)
    }
}

fn spawn<F>(name: &str, f: F) -> Result<()>
where
    F: FnOnce() + Send + 'static,
{
    thread::Builder::new().name(name.to_string()).spawn(f).map_err(|e| {
        log::error!("Failed to spawn '{}': {}", name, e);
        Error::ThreadSpawn(name.to_string())
    })?;
    Ok(())
}
