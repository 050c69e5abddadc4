use anyhow::{anyhow, Context, Result};
use frontdesk_core::Worksheet;

use crate::config::Config;
use crate::logging;

/// Without a worksheet name, lists every worksheet with its appointment
/// count. With one, renders that worksheet as an aligned table.
pub fn run(config: &Config, worksheet: Option<String>) -> Result<()> {
    let store = config.store()?;
    let book = store
        .snapshot()
        .with_context(|| format!("failed to read ledger {}", config.ledger_path))?;
    match worksheet {
        Some(name) => {
            let sheet = book
                .sheets
                .get(&name)
                .ok_or_else(|| anyhow!("no worksheet named {name} in {}", config.ledger_path))?;
            print_table(sheet);
        }
        None => {
            if book.sheets.is_empty() {
                logging::info("ledger holds no worksheets yet");
                return Ok(());
            }
            for (name, sheet) in &book.sheets {
                let count = sheet
                    .data_rows()
                    .iter()
                    .filter(|row| !Worksheet::is_blank_row(row))
                    .count();
                println!("{name}: {count} appointment(s)");
            }
        }
    }
    Ok(())
}

fn print_table(sheet: &Worksheet) {
    for line in table_lines(sheet) {
        println!("{line}");
    }
}

/// Column widths count characters, not bytes, so accented names keep the
/// table aligned.
fn table_lines(sheet: &Worksheet) -> Vec<String> {
    let columns = sheet.rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut widths = vec![0usize; columns];
    for row in &sheet.rows {
        for (position, cell) in row.iter().enumerate() {
            widths[position] = widths[position].max(cell.chars().count());
        }
    }
    sheet
        .rows
        .iter()
        .map(|row| {
            let mut line = String::new();
            for (position, width) in widths.iter().copied().enumerate() {
                let cell = row.get(position).map(String::as_str).unwrap_or("");
                line.push_str(&format!("{cell:<width$}"));
                line.push_str("  ");
            }
            line.trim_end().to_string()
        })
        .collect()
}
