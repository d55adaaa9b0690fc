//! Host shell for the ringview engine.
//!
//! Everything here serves the terminal client: file-based configuration,
//! logging setup, and small path helpers. The engine itself lives in
//! `ringview-core`; the HTTP client in `ringview-rpc`.

pub mod config;
pub mod error;
pub mod logging;
pub mod util;
