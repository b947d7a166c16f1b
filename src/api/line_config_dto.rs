use serde::Deserialize;

/// Raw line configuration as found in the JSON file. Every field is optional
/// and falls back to the timings of the reference bottling line.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LineConfigDto {
    pub worker_count: usize,
    pub replenish_interval_ms: u64,
    pub drain_interval_ms: u64,
    pub fill_duration_min_ms: u64,
    pub fill_duration_max_ms: u64,
    pub run_duration_s: Option<u64>,
    pub statistics_file: Option<String>,
}

impl Default for LineConfigDto {
    fn default() -> Self {
        Self {
            worker_count: 3,
            replenish_interval_ms: 2000,
            drain_interval_ms: 5000,
            fill_duration_min_ms: 2000,
            fill_duration_max_ms: 6000,
            run_duration_s: None,
            statistics_file: None,
        }
    }
}
