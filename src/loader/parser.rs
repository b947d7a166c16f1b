use serde::de::DeserializeOwned;
use std::fs;

use crate::error::Result;

/// Parses a JSON file into a given type `T`.
///
/// This function reads a file from `file_path`, attempts to parse it
/// as JSON, and returns an instance of `T`.
///
/// Errors are automatically converted into `crate::error::Error` variants:
/// - `Error::IoError` if the file cannot be read.
/// - `Error::DeserializationError` if the JSON is malformed.
pub fn parse_json_file<T: DeserializeOwned>(file_path: &str) -> Result<T> {
    let data = fs::read_to_string(file_path)?;
    parse_json_str(&data)
}

pub fn parse_json_str<T: DeserializeOwned>(data: &str) -> Result<T> {
    Ok(serde_json::from_str(data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::line_config_dto::LineConfigDto;
    use crate::error::Error;

    #[test]
    fn test_partial_config_uses_defaults() {
        let dto: LineConfigDto = parse_json_str(r#"{ "workerCount": 5, "runDurationS": 10 }"#).unwrap();

        assert_eq!(dto.worker_count, 5);
        assert_eq!(dto.run_duration_s, Some(10));
        assert_eq!(dto.replenish_interval_ms, 2000);
        assert_eq!(dto.drain_interval_ms, 5000);
        assert_eq!(dto.statistics_file, None);
    }

    #[test]
    fn test_malformed_json_is_deserialization_error() {
        let result: Result<LineConfigDto> = parse_json_str("{ workerCount: }");
        assert!(matches!(result, Err(Error::DeserializationError(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result: Result<LineConfigDto> = parse_json_file("/nonexistent/bottling_line/config.json");
        assert!(matches!(result, Err(Error::IoError(_))));
    }
}
