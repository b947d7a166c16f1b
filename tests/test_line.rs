use std::sync::Arc;
use std::thread;
use std::time::Duration;

use bottling_line::domain::line_config::{FillDuration, LineConfig};
use bottling_line::domain::simulator::simulator::LineSimulator;
use bottling_line::domain::station::notification::TransitionCounter;
use bottling_line::domain::station::station::Station;
use bottling_line::domain::utils::statistics::LineStatistics;
use bottling_line::domain::worker::worker::{Worker, WorkerState};
use bottling_line::error::Error;
use bottling_line::load_line_config;

fn fast_config(workers: usize, fill_ms: u64) -> LineConfig {
    LineConfig {
        worker_count: workers,
        replenish_interval: Duration::from_millis(10),
        drain_interval: Duration::from_millis(10),
        fill_duration: FillDuration::fixed(Duration::from_millis(fill_ms)),
        run_duration: Some(Duration::from_millis(600)),
        statistics_file: None,
    }
}

#[test]
fn test_line_keeps_producing_without_deadlock() {
    let counter = Arc::new(TransitionCounter::default());
    let mut simulator = LineSimulator::with_sink(fast_config(3, 5), counter.clone());

    let report = simulator.run().unwrap();
    let stats = report.statistics;

    assert_eq!(report.workers, 3);
    assert!(stats.cycles_completed >= 10, "only {} cycles completed", stats.cycles_completed);

    // Every started cycle came from exactly one delivery, and every pickup
    // removed a placed result. Counters are read while the line keeps running,
    // so allow for the transitions in flight.
    assert!(stats.deliveries.abs_diff(stats.cycles_started) <= 2);
    assert!(stats.cycles_started.abs_diff(stats.cycles_completed) <= 4);
    assert!(stats.cycles_completed.abs_diff(stats.pickups) <= 2);

    assert!(counter.empty_occupied() >= stats.deliveries);
}

#[test]
fn test_throughput_bounded_by_drain_rate() {
    let mut config = fast_config(4, 0);
    config.drain_interval = Duration::from_millis(100);
    let mut simulator = LineSimulator::new(config);

    let report = simulator.run_for(Duration::from_millis(550)).unwrap();

    // At most one pickup per drain tick, plus the result waiting on the full
    // place and the fills blocked behind it.
    assert!(report.statistics.pickups <= 5);
    assert!(report.statistics.cycles_completed <= report.statistics.pickups + 2);
}

#[test]
fn test_worker_waits_for_full_place() {
    let station = Arc::new(Station::new());
    station.try_occupy_full();
    station.try_occupy_empty();

    let stats = Arc::new(LineStatistics::default());
    let mut worker = Worker::new(7, station.clone(), stats.clone(), FillDuration::fixed(Duration::ZERO));
    let handle = thread::spawn(move || {
        worker.run_cycle().unwrap();
        worker.state()
    });

    thread::sleep(Duration::from_millis(100));
    assert!(!station.is_empty_occupied());
    assert_eq!(stats.snapshot().cycles_started, 1);
    assert_eq!(stats.snapshot().cycles_completed, 0);

    assert!(station.vacate_full());
    assert_eq!(handle.join().unwrap(), WorkerState::CycleDone);
    assert!(station.is_full_occupied());
    assert_eq!(stats.snapshot().cycles_completed, 1);
}

#[test]
fn test_load_line_config_from_file() {
    let path = std::env::temp_dir().join(format!("bottling_line_config_{}.json", std::process::id()));
    std::fs::write(&path, r#"{ "workerCount": 2, "drainIntervalMs": 250, "fillDurationMinMs": 10, "fillDurationMaxMs": 10 }"#).unwrap();

    let config = load_line_config(&path.to_string_lossy()).unwrap();
    let _ = std::fs::remove_file(&path);

    assert_eq!(config.worker_count, 2);
    assert_eq!(config.drain_interval, Duration::from_millis(250));
    assert_eq!(config.replenish_interval, Duration::from_secs(2));
    assert_eq!(config.fill_duration, FillDuration::fixed(Duration::from_millis(10)));
    assert_eq!(config.run_duration, None);
}

#[test]
fn test_load_line_config_rejects_invalid_values() {
    let path = std::env::temp_dir().join(format!("bottling_line_invalid_{}.json", std::process::id()));
    std::fs::write(&path, r#"{ "workerCount": 0 }"#).unwrap();

    let result = load_line_config(&path.to_string_lossy());
    let _ = std::fs::remove_file(&path);

    assert!(matches!(result, Err(Error::InvalidConfig(_))));
}
