pub mod commands;
pub mod config;
pub mod logging;
pub mod process_command;
pub mod store;
