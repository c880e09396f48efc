//! Logging utilities.
//!
//! The engine only speaks the `log` facade: lag resets are `warn`, fps clamp
//! notices `info`, lifecycle transitions `debug`, dropped frames `trace`.
//! `init_logging` installs an `env_logger` backend for binaries that want one.

mod init;

pub use init::{init_logging, LoggingConfig};
