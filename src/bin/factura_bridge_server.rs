//! Factura Bridge server binary
//!
//! HTTP front end for spreadsheet conversion: upload, progress, download.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use factura_bridge::api::{run_api_server, ApiConfig};

#[derive(Parser, Debug)]
#[command(name = "factura-bridge-server")]
#[command(version)]
#[command(about = "Factura Bridge server - upload spreadsheets, poll progress, download conversions")]
#[command(long_about = r#"
Factura Bridge server

Endpoints:
  - POST /api/transform             - Upload a spreadsheet and convert it
                                      (multipart: excelFile, sessionId, serie)
  - GET  /api/progress/:session_id  - Poll conversion progress
  - GET  /api/download/:filename    - Download a converted file

Additional endpoints:
  - GET  /health                    - Health check
  - GET  /version                   - Server version info
  - GET  /                          - Endpoint listing

Uploaded and converted files older than --max-age-secs are deleted by a
background sweep every --sweep-interval-secs.

Example usage:
  factura-bridge-server                           # Start on localhost:3000
  factura-bridge-server --host 0.0.0.0 --port 8080

  curl -F excelFile=@ventas.xlsx -F sessionId=abc -F serie=4 \
    http://localhost:3000/api/transform
"#)]
struct Args {
    /// Host address to bind to (use 0.0.0.0 for all interfaces)
    #[arg(short = 'H', long, default_value = "127.0.0.1", env = "BRIDGE_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "3000", env = "BRIDGE_PORT")]
    port: u16,

    /// Directory for uploaded spreadsheets
    #[arg(long, default_value = "uploads", env = "BRIDGE_UPLOAD_DIR")]
    upload_dir: PathBuf,

    /// Directory for converted spreadsheets
    #[arg(long, default_value = "outputs", env = "BRIDGE_OUTPUT_DIR")]
    output_dir: PathBuf,

    /// Age after which files and progress entries are swept
    #[arg(long, default_value = "3600", env = "BRIDGE_MAX_AGE_SECS")]
    max_age_secs: u64,

    /// Seconds between retention sweeps
    #[arg(long, default_value = "3600", env = "BRIDGE_SWEEP_INTERVAL_SECS")]
    sweep_interval_secs: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = ApiConfig {
        host: args.host,
        port: args.port,
        upload_dir: args.upload_dir,
        output_dir: args.output_dir,
        max_age: Duration::from_secs(args.max_age_secs),
        sweep_interval: Duration::from_secs(args.sweep_interval_secs.max(1)),
    };

    run_api_server(config).await
}
