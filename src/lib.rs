use crate::api::line_config_dto::LineConfigDto;
use crate::domain::line_config::LineConfig;
use crate::error::Result;
use crate::loader::parser::parse_json_file;

pub mod api;
pub mod domain;
pub mod error;
pub mod loader;
pub mod logger;

/// Reads and validates a line configuration file.
pub fn load_line_config(file_path: &str) -> Result<LineConfig> {
    let dto: LineConfigDto = parse_json_file(file_path)?;
    log::info!("Line configuration '{}' parsed successfully.", file_path);

    LineConfig::try_from(dto)
}
