//! Plugwatch Agent Library
//!
//! Core modules for the plugwatch power monitoring agent.

pub mod app;
pub mod config;
pub mod errors;
pub mod logs;
pub mod monitor;
pub mod server;
pub mod storage;
pub mod tuya;
pub mod utils;
pub mod workers;
