//! In-memory sheets of cells, loaded from spreadsheet files, uploaded bytes or CSV.
//!
//! Everything downstream reads through [`Workbook`], so availability and case
//! parsing do not care whether the data came from `.xlsx`, `.ods` or `.csv`.

use std::fmt;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

use calamine::Reader;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to open workbook {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("failed to read workbook: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("sheet not found: {0}")]
    MissingSheet(String),

    #[error("workbook has no sheets")]
    NoSheets,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Trimmed textual form. Integral numbers print without a fraction.
    pub fn text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.trim().to_string(),
            Cell::Number(n) => format!("{n}"),
            Cell::Bool(b) => format!("{b}"),
        }
    }

    /// Finite numeric value; `NaN` and infinities read as no value.
    pub fn number(&self) -> Option<f64> {
        let value = match self {
            Cell::Number(n) => Some(*n),
            Cell::Text(s) => s.trim().replace(',', ".").parse().ok(),
            Cell::Bool(b) => Some(f64::from(u8::from(*b))),
            Cell::Empty => None,
        };
        value.filter(|n: &f64| n.is_finite())
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

impl From<&calamine::Data> for Cell {
    fn from(d: &calamine::Data) -> Self {
        match d {
            calamine::Data::Empty => Cell::Empty,
            calamine::Data::String(s) => Cell::Text(s.clone()),
            calamine::Data::Float(f) => Cell::Number(*f),
            calamine::Data::Int(i) => Cell::Number(*i as f64),
            calamine::Data::Bool(b) => Cell::Bool(*b),
            calamine::Data::DateTimeIso(s) | calamine::Data::DurationIso(s) => Cell::Text(s.clone()),
            other => Cell::Text(other.to_string()),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        if s.trim().is_empty() {
            Cell::Empty
        } else {
            Cell::Text(s.to_string())
        }
    }
}

static EMPTY: Cell = Cell::Empty;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    /// Builds a sheet from string rows; blank strings become [`Cell::Empty`].
    pub fn from_strings<S: AsRef<str>>(name: impl Into<String>, rows: &[Vec<S>]) -> Self {
        let rows = rows
            .iter()
            .map(|row| row.iter().map(|value| Cell::from(value.as_ref())).collect())
            .collect();
        Self::new(name, rows)
    }

    /// The cell at `(row, column)`, or an empty cell outside the used range.
    pub fn cell(&self, row: usize, column: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .unwrap_or(&EMPTY)
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new(sheets: Vec<Sheet>) -> Self {
        Self { sheets }
    }

    /// Opens `.xlsx/.xlsm/.xls/.ods` with calamine, or `.csv` as a single sheet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, IngestError> {
        let path = path.as_ref();
        if is_csv_name(&path.to_string_lossy()) {
            let raw = std::fs::read(path).map_err(|source| IngestError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            let name = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| "Sheet1".to_string());
            return Self::from_csv_reader(name, raw.as_slice());
        }
        let mut wb = calamine::open_workbook_auto(path).map_err(|source| IngestError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        read_all(&mut wb)
    }

    /// Parses spreadsheet bytes, e.g. an uploaded file. The format is sniffed by calamine.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, IngestError> {
        let mut wb = calamine::open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
        read_all(&mut wb)
    }

    /// Like [`Workbook::from_bytes`], but routes `*.csv` file names to the CSV reader.
    pub fn from_upload(file_name: Option<&str>, bytes: &[u8]) -> Result<Self, IngestError> {
        match file_name {
            Some(name) if is_csv_name(name) => Self::from_csv_reader(name.to_string(), bytes),
            _ => Self::from_bytes(bytes),
        }
    }

    /// Reads CSV into a single sheet. `;` is used when the first line contains one, `,` otherwise.
    pub fn from_csv_reader<R: Read>(name: impl Into<String>, mut reader: R) -> Result<Self, IngestError> {
        let mut raw = String::new();
        reader.read_to_string(&mut raw).map_err(csv::Error::from)?;
        let raw = raw.trim_start_matches('\u{feff}');
        let first_line = raw.lines().next().unwrap_or_default();
        let delimiter = if first_line.contains(';') { b';' } else { b',' };

        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(raw.as_bytes());
        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            rows.push(record.iter().map(Cell::from).collect());
        }
        Ok(Self::new(vec![Sheet::new(name, rows)]))
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|sheet| sheet.name.as_str()).collect()
    }

    pub fn sheet(&self, name: &str) -> Result<&Sheet, IngestError> {
        self.sheets
            .iter()
            .find(|sheet| sheet.name == name)
            .ok_or_else(|| IngestError::MissingSheet(name.to_string()))
    }

    pub fn first(&self) -> Result<&Sheet, IngestError> {
        self.sheets.first().ok_or(IngestError::NoSheets)
    }
}

fn read_all<RS>(wb: &mut calamine::Sheets<RS>) -> Result<Workbook, IngestError>
where
    RS: std::io::Read + std::io::Seek,
{
    let names = wb.sheet_names();
    if names.is_empty() {
        return Err(IngestError::NoSheets);
    }
    let mut sheets = Vec::with_capacity(names.len());
    for name in names {
        let range = wb.worksheet_range(&name)?;
        // Rows are addressed from A1 regardless of where the used range starts.
        let (row_offset, col_offset) = range
            .start()
            .map(|(r, c)| (r as usize, c as usize))
            .unwrap_or((0, 0));
        let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); row_offset];
        for row in range.rows() {
            let mut cells = vec![Cell::Empty; col_offset];
            cells.extend(row.iter().map(Cell::from));
            rows.push(cells);
        }
        tracing::debug!(sheet = %name, rows = rows.len(), "sheet loaded");
        sheets.push(Sheet::new(name, rows));
    }
    Ok(Workbook::new(sheets))
}

fn is_csv_name(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".csv")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn semicolon_csv_with_bom_is_sniffed() {
        let raw = "\u{feff}id;name;tutor\n1;Alpha;a@x(A)\n2;Beta;\n";
        let wb = Workbook::from_csv_reader("cases", raw.as_bytes()).expect("csv parses");
        let sheet = wb.first().expect("one sheet");
        assert_eq!(sheet.height(), 3);
        assert_eq!(sheet.cell(0, 0).text(), "id");
        assert_eq!(sheet.cell(1, 2).text(), "a@x(A)");
        assert!(sheet.cell(2, 2).is_empty());
        assert!(sheet.cell(40, 40).is_empty());
    }

    #[test]
    fn comma_csv_and_numbers() {
        let wb = Workbook::from_csv_reader("s", "a,b\n 3 ,0.5\n".as_bytes()).expect("csv parses");
        let sheet = wb.sheet("s").expect("named sheet");
        assert_eq!(sheet.cell(1, 0).number(), Some(3.0));
        assert_eq!(sheet.cell(1, 1).number(), Some(0.5));
        assert!(matches!(wb.sheet("nope"), Err(IngestError::MissingSheet(_))));
    }

    #[test]
    fn integral_numbers_print_without_fraction() {
        assert_eq!(Cell::Number(1042.0).text(), "1042");
        assert_eq!(Cell::Number(2.5).text(), "2.5");
    }

    #[test]
    fn non_finite_text_is_not_a_number() {
        for raw in ["NaN", "inf", "-infinity"] {
            assert_eq!(Cell::from(raw).number(), None, "{raw}");
        }
        assert_eq!(Cell::Number(f64::NAN).number(), None);
        assert_eq!(Cell::from("0,5").number(), Some(0.5));
    }

    #[test]
    fn garbage_bytes_are_rejected() {
        assert!(Workbook::from_bytes(b"definitely not a spreadsheet").is_err());
    }
}
