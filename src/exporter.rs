//! Spreadsheet export of extracted menu records
//!
//! Pure transform from an ordered record sequence to XLSX bytes. Content is
//! not validated here: an empty input produces a valid header-only workbook,
//! and the "no data" policy is decided by the request handler.

use crate::{MenuRecord, ScrapeError};
use rust_xlsxwriter::{Format, Workbook};

const SHEET_NAME: &str = "Menu";

/// Serializes records into an in-memory XLSX workbook.
///
/// Column order is the declaration order of [`MenuRecord`]'s fields
/// (`Category, Item, Description, Price, Comment`), one row per record,
/// with a bold header row. Record order is preserved.
pub fn export_xlsx(records: &[MenuRecord]) -> Result<Vec<u8>, ScrapeError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet().set_name(SHEET_NAME)?;

    let header_format = Format::new().set_bold();
    for (col, header) in MenuRecord::COLUMNS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *header, &header_format)?;
    }

    for (row, record) in records.iter().enumerate() {
        let row = row as u32 + 1;
        worksheet.write_string(row, 0, &record.category)?;
        worksheet.write_string(row, 1, &record.item)?;
        worksheet.write_string(row, 2, &record.description)?;
        worksheet.write_string(row, 3, &record.price)?;
        worksheet.write_string(row, 4, &record.comment)?;
    }

    Ok(workbook.save_to_buffer()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{Reader, Xlsx};
    use std::io::Cursor;

    fn read_rows(bytes: Vec<u8>) -> Vec<Vec<String>> {
        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes)).unwrap();
        let range = workbook.worksheet_range(SHEET_NAME).unwrap();
        range
            .rows()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect()
    }

    fn sample_record(item: &str) -> MenuRecord {
        MenuRecord {
            category: "Drinks".to_string(),
            item: item.to_string(),
            description: "Hot espresso drink".to_string(),
            price: "$4.00".to_string(),
            comment: String::new(),
        }
    }

    #[test]
    fn header_row_matches_column_order() {
        let rows = read_rows(export_xlsx(&[]).unwrap());
        assert_eq!(
            rows[0],
            vec!["Category", "Item", "Description", "Price", "Comment"]
        );
    }

    #[test]
    fn empty_input_yields_header_only_workbook() {
        let rows = read_rows(export_xlsx(&[]).unwrap());
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn row_count_matches_record_count_and_order() {
        let records = vec![
            sample_record("Latte"),
            sample_record("Mocha"),
            sample_record("Espresso"),
        ];
        let rows = read_rows(export_xlsx(&records).unwrap());

        assert_eq!(rows.len(), 4);
        assert_eq!(rows[1][1], "Latte");
        assert_eq!(rows[2][1], "Mocha");
        assert_eq!(rows[3][1], "Espresso");
    }

    #[test]
    fn price_display_text_survives_export() {
        let mut record = sample_record("Wings");
        record.price = "$8.50 - $14.00".to_string();
        let rows = read_rows(export_xlsx(&[record]).unwrap());

        assert_eq!(rows[1][3], "$8.50 - $14.00");
    }
}
