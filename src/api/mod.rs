pub mod line_config_dto;
