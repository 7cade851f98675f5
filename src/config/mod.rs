//! Configuration module for gstbill
//!
//! This module provides configuration management including:
//! - Data directory resolution
//! - User settings persistence

pub mod paths;
pub mod settings;

pub use paths::GstBillPaths;
pub use settings::Settings;
