//! Task Harvester library surface.
//!
//! Automates daily task completion against the platform REST API for a set of
//! wallet-identified accounts: signed-message login, task enumeration,
//! sequential completion, and a point-total report, repeated on a fixed
//! schedule by the binary in `src/main.rs`.

pub mod account;
pub mod auth;
pub mod cycle;
pub mod error;
pub mod http;
pub mod session;
pub mod tasks;
pub mod utils;
