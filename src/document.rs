//! CSV rendering of expense tables sent to chat users

use crate::state_machine::ExpenseTable;

pub const HEADERS: [&str; 5] = ["id", "title", "date", "amount_local", "amount_foreign"];

/// Render the table as CSV, header first and the optional total row last
pub fn render_csv(table: &ExpenseTable) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(HEADERS)?;
    for row in &table.rows {
        writer.serialize(row)?;
    }
    if table.with_total {
        let total = format!("{:.2}", table.total_local());
        writer.write_record(["", "Total", "", total.as_str(), ""])?;
    }

    writer.flush()?;
    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}
