//! Decoding of stock count files into tabular form
//!
//! CSV files go through the `csv` crate, spreadsheets through `calamine`
//! (first worksheet only). Both produce a `RawTable` that the shared
//! normalizer turns into typed records.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use rust_decimal::Decimal;
use shared::{normalize, Cell, InventoryDataset, LoadError, LoadResult, RawTable};

/// Supported source formats, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Workbook,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(SourceFormat::Csv),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Some(SourceFormat::Workbook),
            _ => None,
        }
    }
}

/// Read and normalize a stock count file.
///
/// The file is read exactly once; the result is safe to reuse for any number
/// of filter recomputes.
pub fn load_source(path: &Path) -> LoadResult<InventoryDataset> {
    let table = decode_file(path)?;
    let dataset = normalize(&table)?;

    tracing::info!(
        path = %path.display(),
        records = dataset.len(),
        diff_stock_supplied = dataset.diff_stock_supplied,
        has_cost_price = dataset.has_cost_price,
        "Loaded inventory source"
    );

    Ok(dataset)
}

/// Decode a file into headers and rows without interpreting them
pub fn decode_file(path: &Path) -> LoadResult<RawTable> {
    let source = path.display().to_string();

    match SourceFormat::from_path(path) {
        Some(SourceFormat::Csv) => {
            let file = File::open(path).map_err(|e| LoadError::source_read(&source, e))?;
            decode_csv(file, &source)
        }
        Some(SourceFormat::Workbook) => decode_workbook(path),
        None => Err(LoadError::source_read(
            source,
            "unsupported file type (expected .csv, .xlsx, .xlsm, .xlsb, .xls or .ods)",
        )),
    }
}

/// Decode CSV data. The first record is the header row.
pub fn decode_csv<R: Read>(reader: R, source: &str) -> LoadResult<RawTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()
        .map_err(|e| LoadError::source_read(source, e))?
        .iter()
        .map(str::to_string)
        .collect();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(LoadError::source_read(source, "no header row"));
    }

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| LoadError::source_read(source, e))?;
        rows.push(record.iter().map(Cell::from).collect());
    }

    tracing::debug!(source, rows = rows.len(), "Decoded CSV source");
    Ok(RawTable::new(headers, rows))
}

/// Decode the first worksheet of a spreadsheet
pub fn decode_workbook(path: &Path) -> LoadResult<RawTable> {
    let source = path.display().to_string();

    let mut workbook =
        open_workbook_auto(path).map_err(|e| LoadError::source_read(&source, e))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| LoadError::source_read(&source, "workbook has no worksheets"))?
        .map_err(|e| LoadError::source_read(&source, e))?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .ok_or_else(|| LoadError::source_read(&source, "worksheet is empty"))?
        .iter()
        .map(header_from_data)
        .collect();

    let rows: Vec<Vec<Cell>> = rows
        .map(|row| row.iter().map(cell_from_data).collect())
        .collect();

    tracing::debug!(source = %source, rows = rows.len(), "Decoded workbook source");
    Ok(RawTable::new(headers, rows))
}

fn header_from_data(data: &Data) -> String {
    match data {
        Data::String(s) => s.clone(),
        other => cell_from_data(other).to_text(),
    }
}

/// Convert a spreadsheet cell. Numbers stay numeric; everything else is
/// carried as text and interpreted by the normalizer.
pub fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Int(v) => Cell::Number(Decimal::from(*v)),
        Data::Float(v) => Decimal::try_from(*v)
            .map(Cell::Number)
            .unwrap_or_else(|_| Cell::Text(v.to_string())),
        Data::String(s) => Cell::from(s.as_str()),
        Data::Bool(v) => Cell::Text(v.to_string()),
        Data::DateTime(v) => Cell::Text(v.as_f64().to_string()),
        Data::DateTimeIso(v) | Data::DurationIso(v) => Cell::Text(v.clone()),
        Data::Error(e) => Cell::Text(format!("{:?}", e)),
        Data::Empty => Cell::Empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    const SAMPLE: &str = concat!(
        " Category ,Item Name,Item No,Barcode,Book Stock,Phys Stock,Cost Price\n",
        "A,Bolt,1,111,100,90,2\n",
        "A,Nut,2,222,50,55,1.5\n",
        "B,Screw,3,333,10,10,4\n",
    );

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            SourceFormat::from_path(&PathBuf::from("stock.CSV")),
            Some(SourceFormat::Csv)
        );
        assert_eq!(
            SourceFormat::from_path(&PathBuf::from("data/stock_data.xlsx")),
            Some(SourceFormat::Workbook)
        );
        assert_eq!(SourceFormat::from_path(&PathBuf::from("stock.txt")), None);
        assert_eq!(SourceFormat::from_path(&PathBuf::from("stock")), None);
    }

    #[test]
    fn test_decode_csv_keeps_raw_headers() {
        let table = decode_csv(SAMPLE.as_bytes(), "sample.csv").unwrap();
        assert_eq!(table.headers[0], " Category ");
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[1][6], Cell::text("1.5"));
    }

    #[test]
    fn test_decode_csv_then_normalize() {
        let table = decode_csv(SAMPLE.as_bytes(), "sample.csv").unwrap();
        let dataset = normalize(&table).unwrap();
        assert!(dataset.has_cost_price);
        assert_eq!(dataset.records[0].diff_value, Some(dec("-20")));
        assert_eq!(dataset.records[1].diff_value, Some(dec("7.5")));
    }

    #[test]
    fn test_decode_csv_ragged_rows() {
        let data = "Category,Item Name,Item No,Barcode,Book Stock,Phys Stock\nA,Bolt,1,111,5\n";
        let table = decode_csv(data.as_bytes(), "ragged.csv").unwrap();
        assert_eq!(table.rows[0].len(), 5);
    }

    #[test]
    fn test_decode_csv_empty_input() {
        let err = decode_csv("".as_bytes(), "empty.csv").unwrap_err();
        assert!(matches!(err, LoadError::SourceRead { .. }));
    }

    #[test]
    fn test_decode_csv_invalid_utf8() {
        let data: &[u8] = b"Category,Item Name\n\xff\xfe,Bolt\n";
        let err = decode_csv(data, "bad.csv").unwrap_err();
        assert!(matches!(err, LoadError::SourceRead { .. }));
    }

    #[test]
    fn test_load_source_from_file() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let dataset = load_source(file.path()).unwrap();
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.records[2].category, "B");
    }

    #[test]
    fn test_missing_file_is_source_read_error() {
        let err = load_source(Path::new("/nonexistent/stock_data.csv")).unwrap_err();
        assert!(matches!(err, LoadError::SourceRead { .. }));
    }

    #[test]
    fn test_unsupported_extension_is_source_read_error() {
        let err = load_source(Path::new("stock_data.json")).unwrap_err();
        assert!(matches!(err, LoadError::SourceRead { .. }));
    }

    #[test]
    fn test_corrupt_workbook_is_source_read_error() {
        let mut file = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
        file.write_all(b"this is not a zip archive").unwrap();

        let err = load_source(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::SourceRead { .. }));
    }

    #[test]
    fn test_missing_columns_from_csv() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(b"Category,Item Name,Book Stock\nA,Bolt,1\n").unwrap();

        match load_source(file.path()) {
            Err(LoadError::MissingColumns { columns }) => {
                assert_eq!(columns, vec!["Item No", "Barcode", "Phys Stock"]);
            }
            other => panic!("expected missing columns, got {:?}", other),
        }
    }

    #[test]
    fn test_cell_from_data() {
        assert_eq!(cell_from_data(&Data::Int(7)), Cell::Number(dec("7")));
        assert_eq!(cell_from_data(&Data::Float(2.5)), Cell::Number(dec("2.5")));
        assert_eq!(cell_from_data(&Data::Empty), Cell::Empty);
        assert_eq!(
            cell_from_data(&Data::String("Bolt".to_string())),
            Cell::text("Bolt")
        );
        assert!(matches!(cell_from_data(&Data::Float(f64::NAN)), Cell::Text(_)));
    }

    #[test]
    fn test_integral_float_barcode_renders_without_fraction() {
        let cell = cell_from_data(&Data::Float(5012345678900.0));
        assert_eq!(cell.to_text(), "5012345678900");
    }
}
