use clap::{Parser, Subcommand};
use factura_bridge::cli;
use factura_bridge::error::BridgeResult;
use factura_bridge::serie::Serie;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "factura-bridge")]
#[command(about = "Convert booking spreadsheets into the invoice import layout")]
#[command(long_about = "Factura Bridge - booking sheet to invoice import converter

Reads the first worksheet of an Excel file (row 1 is a header), maps every
data row to the fixed invoice layout, and writes a new .xlsx whose tax and
total columns are live formulas.

COMMANDS:
  convert   - Convert a spreadsheet
  headers   - List the output columns and their letters

SERIES:
  4 = Cielo, 5 = Nova, 6 = Grenn (default). Other codes behave like 6.

EXAMPLES:
  factura-bridge convert ventas.xlsx facturas.xlsx
  factura-bridge convert ventas.xlsx facturas.xlsx --serie 4 --verbose
  factura-bridge headers")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a spreadsheet into the invoice import layout
    Convert {
        /// Input spreadsheet (.xlsx, .xls, .ods)
        input: PathBuf,

        /// Output Excel file path (.xlsx)
        output: PathBuf,

        /// Serie code for the whole run (4, 5 or 6)
        #[arg(short, long, default_value = "6")]
        serie: Serie,

        /// Show row progress
        #[arg(short, long)]
        verbose: bool,
    },

    /// List output columns with their sheet letters
    Headers,
}

fn main() -> BridgeResult<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            input,
            output,
            serie,
            verbose,
        } => cli::convert(input, output, serie, verbose),

        Commands::Headers => cli::headers(),
    }
}
