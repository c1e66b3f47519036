//! Conversion server module
//!
//! HTTP surface around the transformation engine: upload intake, progress
//! polling, download and the retention sweep.
//! Run with `factura-bridge-server`.

pub mod cleanup;
pub mod handlers;
pub mod progress;
pub mod server;

pub use progress::{ProgressEntry, ProgressStatus, ProgressStore};
pub use server::{build_router, run_api_server, ApiConfig, AppState};
