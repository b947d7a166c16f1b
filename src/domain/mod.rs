pub mod agent;
pub mod line_config;
pub mod simulator;
pub mod station;
pub mod utils;
pub mod worker;
