//! Logging utilities.
//!
//! The engine reports through the `log` facade only, under the
//! [`ENGINE_TARGET`] prefix. This module provides the one-shot
//! `env_logger` setup used by binaries and tests.

mod init;

pub use init::{ENGINE_TARGET, LoggingConfig, init_logging};
