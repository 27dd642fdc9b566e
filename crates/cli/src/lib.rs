// tabrecon CLI library: driver config, pair runner, exit codes, logging setup

pub mod config;
pub mod exit_codes;
pub mod logging;
pub mod runner;
