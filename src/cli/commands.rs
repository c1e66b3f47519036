use crate::columns::{column_index_to_letter, HEADERS};
use crate::error::BridgeResult;
use crate::serie::Serie;
use crate::transform::transform_file;
use colored::Colorize;
use std::path::PathBuf;

/// Rows between verbose progress lines
const PROGRESS_STEP: usize = 100;

/// Whether a progress tick should be printed
fn should_report(done: usize, total: usize) -> bool {
    done == total || done % PROGRESS_STEP == 0
}

/// Execute the convert command
pub fn convert(input: PathBuf, output: PathBuf, serie: Serie, verbose: bool) -> BridgeResult<()> {
    println!("{}", "📄 Factura Bridge - Converting spreadsheet".bold().green());
    println!("   Input:  {}", input.display());
    println!("   Output: {}", output.display());
    println!(
        "   Serie:  {} ({})\n",
        serie.to_string().bright_yellow().bold(),
        serie.promotion_name()
    );

    let mut rows = 0;
    let mut report = |done: usize, total: usize| {
        rows = total;
        if verbose && should_report(done, total) {
            println!("   {} {}/{} rows", "⏳".cyan(), done, total);
        }
    };

    transform_file(&input, &output, Some(&mut report), serie)?;

    println!("{}", "✅ Conversion Complete!".bold().green());
    println!("   Rows converted: {}", rows);
    println!("   Excel file: {}\n", output.display());

    Ok(())
}

/// Execute the headers command
pub fn headers() -> BridgeResult<()> {
    println!("{}", "📋 Output layout".bold().green());
    for (idx, name) in HEADERS.iter().enumerate() {
        println!(
            "   {:>3}  {:<3}  {}",
            idx + 1,
            column_index_to_letter(idx).cyan(),
            name
        );
    }
    println!("\n   {} columns", HEADERS.len());
    Ok(())
}
