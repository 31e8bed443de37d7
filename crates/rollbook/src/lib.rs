//! `rollbook` - A console student record keeper
//!
//! This library provides the record store, the service layer that turns
//! store results into display-ready replies, and the command-line surface
//! (one-shot subcommands and an interactive menu) built on top of them.
//! Records live in memory and are saved as a single snapshot file after
//! every change.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod service;
pub mod storage;
pub mod student;

pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use service::{NewStudent, RecordService, Reply, Request, Status};
pub use storage::{LoadOutcome, RecordStore, StoreOptions, StoreStats};
pub use student::{Student, StudentFields, StudentPatch};
