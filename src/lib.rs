//! Factura Bridge - booking spreadsheet to invoice import converter
//!
//! Reads a spreadsheet in the booking layout and produces one in the fixed
//! invoice import layout: renamed columns, constants, a computed base amount
//! and live formula cells for tax, totals and pass-through amounts.
//!
//! # Example
//!
//! ```no_run
//! use factura_bridge::serie::Serie;
//! use factura_bridge::transform::transform_file;
//! use std::path::Path;
//!
//! let mut report = |done: usize, total: usize| println!("{}/{}", done, total);
//! transform_file(
//!     Path::new("ventas.xlsx"),
//!     Path::new("facturas.xlsx"),
//!     Some(&mut report),
//!     Serie::default(),
//! )?;
//! # Ok::<(), factura_bridge::error::BridgeError>(())
//! ```

pub mod api;
pub mod cell;
pub mod cli;
pub mod columns;
pub mod error;
pub mod excel;
pub mod mapper;
pub mod serie;
pub mod transform;
pub mod types;

// Re-export commonly used types
pub use error::{BridgeError, BridgeResult};
pub use serie::Serie;
pub use transform::{transform, transform_file, transform_table};
pub use types::{CellValue, InputCell, InputRow, InputTable, OutputCell, OutputTable};
