pub mod archive;
pub mod classify;
pub mod cli;
pub mod config;
pub mod core;
pub mod engine;
pub mod exit;
pub mod extract;
pub mod report;
pub mod scan;
pub mod tui;
pub mod ui;
