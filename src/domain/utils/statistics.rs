use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{OnceLock, mpsc};
use std::thread;
use std::time::{SystemTime, UNIX_EPOCH};

/// Running totals of the line, shared by the agents and all workers.
#[derive(Debug, Default)]
pub struct LineStatistics {
    deliveries: AtomicU64,
    pickups: AtomicU64,
    cycles_started: AtomicU64,
    cycles_completed: AtomicU64,
}

/// Point-in-time copy of [`LineStatistics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StatisticsSnapshot {
    pub deliveries: u64,
    pub pickups: u64,
    pub cycles_started: u64,
    pub cycles_completed: u64,
}

impl LineStatistics {
    pub fn record_delivery(&self) {
        self.deliveries.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_pickup(&self) {
        self.pickups.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_cycle_started(&self) {
        self.cycles_started.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_cycle_completed(&self) {
        self.cycles_completed.fetch_add(1, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> StatisticsSnapshot {
        StatisticsSnapshot {
            deliveries: self.deliveries.load(Ordering::SeqCst),
            pickups: self.pickups.load(Ordering::SeqCst),
            cycles_started: self.cycles_started.load(Ordering::SeqCst),
            cycles_completed: self.cycles_completed.load(Ordering::SeqCst),
        }
    }
}

/// Columns of the statistics file, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StatParameter {
    /// Time in milliseconds since the collector was started.
    Time,

    /// Name of the worker or agent that caused the event.
    Component,

    /// What happened, e.g. "Delivered" or "CycleCompleted".
    Event,

    /// Slot involved in the event, if any.
    Slot,
}

impl StatParameter {
    pub const ALL: [StatParameter; 4] = [StatParameter::Time, StatParameter::Component, StatParameter::Event, StatParameter::Slot];

    pub fn header(self) -> &'static str {
        match self {
            StatParameter::Time => "Time",
            StatParameter::Component => "Component",
            StatParameter::Event => "Event",
            StatParameter::Slot => "Slot",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum StatValue {
    Integer(i64),
    Text(String),
}

impl From<i64> for StatValue {
    fn from(v: i64) -> Self {
        StatValue::Integer(v)
    }
}

impl From<String> for StatValue {
    fn from(v: String) -> Self {
        StatValue::Text(v)
    }
}

impl From<&str> for StatValue {
    fn from(v: &str) -> Self {
        StatValue::Text(v.to_string())
    }
}

#[derive(Debug, Clone, Default)]
pub struct StatisticEvent {
    data: HashMap<StatParameter, StatValue>,
}

impl StatisticEvent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set<V: Into<StatValue>>(&mut self, param: StatParameter, value: V) -> &mut Self {
        self.data.insert(param, value.into());
        self
    }

    pub fn get(&self, param: StatParameter) -> Option<&StatValue> {
        self.data.get(&param)
    }

    /// Row in [`StatParameter::ALL`] order, "NA" for unset columns.
    fn to_row(&self) -> Vec<String> {
        StatParameter::ALL
            .iter()
            .map(|param| match self.data.get(param) {
                Some(StatValue::Integer(i)) => i.to_string(),
                Some(StatValue::Text(t)) => t.clone(),
                None => "NA".to_string(),
            })
            .collect()
    }
}

/// Messages sent from the line threads to the writer thread.
enum StatsMessage {
    Log(StatisticEvent),
    Flush,
}

/// Handle that forwards events to a background CSV writer.
pub struct StatsCollector {
    sender: mpsc::Sender<StatsMessage>,
    start_time_ms: i64,
}

impl StatsCollector {
    /// Spawns the writer thread. `None` writes to stdout.
    pub fn init(filename: Option<String>) -> io::Result<Self> {
        let writer: Box<dyn Write + Send> = match filename {
            Some(f) => Box::new(File::create(f)?),
            None => Box::new(io::stdout()),
        };

        let (tx, rx) = mpsc::channel();
        thread::Builder::new().name("statistics".to_string()).spawn(move || Self::worker_loop(rx, writer))?;

        Ok(StatsCollector { sender: tx, start_time_ms: now_ms() })
    }

    fn worker_loop(rx: mpsc::Receiver<StatsMessage>, writer: Box<dyn Write + Send>) {
        let mut csv_wtr = csv::WriterBuilder::new().delimiter(b';').from_writer(writer);

        let headers: Vec<&str> = StatParameter::ALL.iter().map(|p| p.header()).collect();
        if let Err(e) = csv_wtr.write_record(&headers) {
            log::error!("Stats Error: Failed to write headers: {}", e);
        }

        for msg in rx {
            match msg {
                StatsMessage::Log(event) => {
                    if let Err(e) = csv_wtr.write_record(event.to_row()) {
                        log::error!("Stats Error: Failed to write record: {}", e);
                    }
                }
                StatsMessage::Flush => {
                    let _ = csv_wtr.flush();
                }
            }
        }

        let _ = csv_wtr.flush();
    }

    /// Non-blocking, stamps the event with the relative time if unset.
    pub fn add_event(&self, mut event: StatisticEvent) {
        if event.get(StatParameter::Time).is_none() {
            event.set(StatParameter::Time, now_ms() - self.start_time_ms);
        }

        // A dead writer thread must not take the line down with it.
        let _ = self.sender.send(StatsMessage::Log(event));
    }

    pub fn flush(&self) {
        let _ = self.sender.send(StatsMessage::Flush);
    }
}

fn now_ms() -> i64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as i64).unwrap_or(0)
}

static GLOBAL_STATS: OnceLock<StatsCollector> = OnceLock::new();

/// Initialize the global statistics collector. Later calls are ignored.
pub fn init_global(filename: Option<String>) -> io::Result<()> {
    let collector = StatsCollector::init(filename)?;
    let _ = GLOBAL_STATS.set(collector);
    Ok(())
}

/// Logs an event to the global collector, if one was initialized.
pub fn add_global_event(event: StatisticEvent) {
    if let Some(collector) = GLOBAL_STATS.get() {
        collector.add_event(event);
    }
}

pub fn flush_global() {
    if let Some(collector) = GLOBAL_STATS.get() {
        collector.flush();
    }
}

/// Shorthand for the common component/event/slot record.
pub fn record(component: &str, event: &str, slot: Option<&str>) {
    if GLOBAL_STATS.get().is_none() {
        return;
    }

    let mut stat = StatisticEvent::new();
    stat.set(StatParameter::Component, component).set(StatParameter::Event, event);
    if let Some(slot) = slot {
        stat.set(StatParameter::Slot, slot);
    }
    add_global_event(stat);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_reflects_counters() {
        let stats = LineStatistics::default();
        stats.record_delivery();
        stats.record_delivery();
        stats.record_cycle_started();
        stats.record_pickup();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.deliveries, 2);
        assert_eq!(snapshot.cycles_started, 1);
        assert_eq!(snapshot.cycles_completed, 0);
        assert_eq!(snapshot.pickups, 1);
    }

    #[test]
    fn test_event_row_in_column_order() {
        let mut event = StatisticEvent::new();
        event.set(StatParameter::Event, "Delivered").set(StatParameter::Time, 12i64).set(StatParameter::Component, "Replenish");

        assert_eq!(event.to_row(), vec!["12", "Replenish", "Delivered", "NA"]);
    }

    #[test]
    fn test_collector_writes_csv_file() {
        let path = std::env::temp_dir().join(format!("bottling_line_stats_{}.csv", std::process::id()));
        let collector = StatsCollector::init(Some(path.to_string_lossy().into_owned())).unwrap();

        let mut event = StatisticEvent::new();
        event.set(StatParameter::Component, "Machine 0").set(StatParameter::Event, "CycleCompleted");
        collector.add_event(event);
        drop(collector);

        // The writer thread exits once the channel closes.
        let mut content = String::new();
        for _ in 0..50 {
            content = std::fs::read_to_string(&path).unwrap_or_default();
            if content.contains("CycleCompleted") {
                break;
            }
            thread::sleep(std::time::Duration::from_millis(20));
        }
        let _ = std::fs::remove_file(&path);

        assert!(content.starts_with("Time;Component;Event;Slot"));
        assert!(content.contains(";Machine 0;CycleCompleted;NA"));
    }
}
