use std::time::Duration;

use rand::Rng;

use crate::api::line_config_dto::LineConfigDto;
use crate::error::{Error, Result};

/// Inclusive range a single fill cycle takes. A fresh duration is drawn for
/// every cycle; `min == max` gives a fixed fill time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillDuration {
    min: Duration,
    max: Duration,
}

impl FillDuration {
    pub fn new(min: Duration, max: Duration) -> Result<Self> {
        if min > max {
            return Err(Error::InvalidConfig(format!("fill duration min ({:?}) exceeds max ({:?})", min, max)));
        }
        Ok(Self { min, max })
    }

    pub fn fixed(duration: Duration) -> Self {
        Self { min: duration, max: duration }
    }

    pub fn min(&self) -> Duration {
        self.min
    }

    pub fn max(&self) -> Duration {
        self.max
    }

    pub fn sample(&self) -> Duration {
        if self.min == self.max {
            return self.min;
        }
        rand::rng().random_range(self.min..=self.max)
    }
}

/// Validated configuration of a bottling line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineConfig {
    pub worker_count: usize,
    pub replenish_interval: Duration,
    pub drain_interval: Duration,
    pub fill_duration: FillDuration,
    /// `None` runs the line until the process is terminated.
    pub run_duration: Option<Duration>,
    pub statistics_file: Option<String>,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            worker_count: 3,
            replenish_interval: Duration::from_secs(2),
            drain_interval: Duration::from_secs(5),
            fill_duration: FillDuration { min: Duration::from_secs(2), max: Duration::from_secs(6) },
            run_duration: None,
            statistics_file: None,
        }
    }
}

impl TryFrom<LineConfigDto> for LineConfig {
    type Error = Error;

    fn try_from(dto: LineConfigDto) -> Result<Self> {
        if dto.worker_count == 0 {
            return Err(Error::InvalidConfig("worker count must be at least 1".to_string()));
        }
        if dto.replenish_interval_ms == 0 {
            return Err(Error::InvalidConfig("replenish interval must be positive".to_string()));
        }
        if dto.drain_interval_ms == 0 {
            return Err(Error::InvalidConfig("drain interval must be positive".to_string()));
        }

        let fill_duration = FillDuration::new(
            Duration::from_millis(dto.fill_duration_min_ms),
            Duration::from_millis(dto.fill_duration_max_ms),
        )?;

        Ok(Self {
            worker_count: dto.worker_count,
            replenish_interval: Duration::from_millis(dto.replenish_interval_ms),
            drain_interval: Duration::from_millis(dto.drain_interval_ms),
            fill_duration,
            run_duration: dto.run_duration_s.map(Duration::from_secs),
            statistics_file: dto.statistics_file,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_dto_matches_default_config() {
        let config = LineConfig::try_from(LineConfigDto::default()).unwrap();
        assert_eq!(config, LineConfig::default());
    }

    #[test]
    fn test_rejects_zero_workers() {
        let dto = LineConfigDto { worker_count: 0, ..Default::default() };
        assert!(matches!(LineConfig::try_from(dto), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_zero_intervals() {
        let dto = LineConfigDto { replenish_interval_ms: 0, ..Default::default() };
        assert!(matches!(LineConfig::try_from(dto), Err(Error::InvalidConfig(_))));

        let dto = LineConfigDto { drain_interval_ms: 0, ..Default::default() };
        assert!(matches!(LineConfig::try_from(dto), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_inverted_fill_range() {
        let dto = LineConfigDto { fill_duration_min_ms: 500, fill_duration_max_ms: 100, ..Default::default() };
        assert!(matches!(LineConfig::try_from(dto), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_fill_sample_stays_in_range() {
        let fill = FillDuration::new(Duration::from_millis(10), Duration::from_millis(20)).unwrap();
        for _ in 0..100 {
            let d = fill.sample();
            assert!(d >= fill.min() && d <= fill.max());
        }
        assert_eq!(FillDuration::fixed(Duration::from_millis(7)).sample(), Duration::from_millis(7));
    }
}
