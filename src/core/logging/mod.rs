// Core logging module - the append-only activity log.

pub mod log_models;
pub mod log_service;

pub use log_models::*;
pub use log_service::*;
