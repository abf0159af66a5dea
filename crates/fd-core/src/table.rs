//! Column-oriented table with CSV I/O.
//!
//! A [`Frame`] is an ordered set of named, equal-length columns. Each column
//! is either numeric or categorical, and any cell may be missing.
//!
//! CSV type inference: a column is numeric when every non-missing cell
//! parses as `f64`; otherwise it is categorical. The tokens in
//! [`MISSING_TOKENS`] (and blank cells) are read as missing.

use fd_common::{Error, Result};
use std::io::{Read, Write};
use std::path::Path;

/// Cell values read as missing.
pub const MISSING_TOKENS: &[&str] = &["", "NA", "NaN", "nan", "null", "None"];

fn is_missing_token(cell: &str) -> bool {
    MISSING_TOKENS.contains(&cell)
}

/// A single column of a [`Frame`].
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Numeric(Vec<Option<f64>>),
    Categorical(Vec<Option<String>>),
}

impl Column {
    /// Numeric column with no missing values.
    pub fn from_f64(values: impl IntoIterator<Item = f64>) -> Self {
        Column::Numeric(values.into_iter().map(Some).collect())
    }

    /// Categorical column with no missing values.
    pub fn from_strs<S: AsRef<str>>(values: impl IntoIterator<Item = S>) -> Self {
        Column::Categorical(
            values
                .into_iter()
                .map(|s| Some(s.as_ref().to_string()))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(v) => v.len(),
            Column::Categorical(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Column::Numeric(_))
    }

    /// Number of missing cells.
    pub fn missing_count(&self) -> usize {
        match self {
            Column::Numeric(v) => v.iter().filter(|c| c.is_none()).count(),
            Column::Categorical(v) => v.iter().filter(|c| c.is_none()).count(),
        }
    }

    /// Cells at `indices`, in that order.
    pub fn take(&self, indices: &[usize]) -> Column {
        match self {
            Column::Numeric(v) => Column::Numeric(indices.iter().map(|&i| v[i]).collect()),
            Column::Categorical(v) => {
                Column::Categorical(indices.iter().map(|&i| v[i].clone()).collect())
            }
        }
    }

    /// Text form of a cell as written to CSV; missing cells are empty.
    pub fn cell_text(&self, row: usize) -> String {
        match self {
            Column::Numeric(v) => v[row].map(|x| x.to_string()).unwrap_or_default(),
            Column::Categorical(v) => v[row].clone().unwrap_or_default(),
        }
    }
}

/// An ordered set of named, equal-length columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    names: Vec<String>,
    columns: Vec<Column>,
    n_rows: usize,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`Frame::set_column`].
    pub fn with_column(mut self, name: impl Into<String>, column: Column) -> Result<Self> {
        self.set_column(name, column)?;
        Ok(self)
    }

    /// Insert a column, or replace an existing column of the same name in
    /// place. The first column fixes the row count.
    pub fn set_column(&mut self, name: impl Into<String>, column: Column) -> Result<()> {
        let name = name.into();
        if !self.columns.is_empty() && column.len() != self.n_rows {
            return Err(Error::invalid(format!(
                "column {} has {} rows but the frame has {}",
                name,
                column.len(),
                self.n_rows
            )));
        }
        match self.position(&name) {
            Some(idx) => self.columns[idx] = column,
            None => {
                if self.columns.is_empty() {
                    self.n_rows = column.len();
                }
                self.names.push(name);
                self.columns.push(column);
            }
        }
        Ok(())
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.position(name).map(|idx| &self.columns[idx])
    }

    /// Columns in order, paired with their names.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.names.iter().map(String::as_str).zip(self.columns.iter())
    }

    /// Names of the numeric columns, in order.
    pub fn numeric_column_names(&self) -> Vec<String> {
        self.iter()
            .filter(|(_, c)| c.is_numeric())
            .map(|(n, _)| n.to_string())
            .collect()
    }

    /// Names of the categorical columns, in order.
    pub fn categorical_column_names(&self) -> Vec<String> {
        self.iter()
            .filter(|(_, c)| !c.is_numeric())
            .map(|(n, _)| n.to_string())
            .collect()
    }

    /// Cells of a numeric column.
    pub fn numeric(&self, name: &str) -> Result<&[Option<f64>]> {
        match self.column(name) {
            Some(Column::Numeric(v)) => Ok(v),
            Some(Column::Categorical(_)) => Err(Error::NonNumericColumn {
                name: name.to_string(),
            }),
            None => Err(Error::UnknownColumn {
                name: name.to_string(),
            }),
        }
    }

    /// Non-missing values of a numeric column.
    pub fn numeric_values(&self, name: &str) -> Result<Vec<f64>> {
        Ok(self.numeric(name)?.iter().flatten().copied().collect())
    }

    /// Values of a numeric column that must have no missing cells.
    pub fn dense_numeric(&self, name: &str) -> Result<Vec<f64>> {
        let cells = self.numeric(name)?;
        cells
            .iter()
            .enumerate()
            .map(|(i, c)| {
                c.ok_or_else(|| Error::invalid(format!("column {} is missing a value at row {}", name, i)))
            })
            .collect()
    }

    /// A new frame holding the rows at `indices`, in that order.
    pub fn take_rows(&self, indices: &[usize]) -> Result<Frame> {
        if let Some(&bad) = indices.iter().find(|&&i| i >= self.n_rows) {
            return Err(Error::invalid(format!(
                "row index {} out of range for a frame with {} rows",
                bad, self.n_rows
            )));
        }
        Ok(Frame {
            names: self.names.clone(),
            columns: self.columns.iter().map(|c| c.take(indices)).collect(),
            n_rows: indices.len(),
        })
    }

    /// Parse CSV with a header row.
    pub fn from_reader<R: Read>(reader: R) -> Result<Frame> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
        for (i, name) in headers.iter().enumerate() {
            if headers[..i].contains(name) {
                return Err(Error::invalid(format!("duplicate column name {:?} in CSV header", name)));
            }
        }

        let mut raw: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
        for record in rdr.records() {
            let record = record?;
            for (col, cell) in raw.iter_mut().zip(record.iter()) {
                col.push(cell.to_string());
            }
        }

        let mut frame = Frame::new();
        for (name, cells) in headers.into_iter().zip(raw) {
            frame.set_column(name, infer_column(cells))?;
        }
        Ok(frame)
    }

    /// Read a CSV file.
    pub fn read_csv(path: &Path) -> Result<Frame> {
        let file = std::fs::File::open(path)?;
        Frame::from_reader(std::io::BufReader::new(file))
    }

    /// Write CSV with a header row. Missing cells are written empty.
    pub fn to_writer<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(&self.names)?;
        for row in 0..self.n_rows {
            wtr.write_record(self.columns.iter().map(|c| c.cell_text(row)))?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Write a CSV file.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)?;
        self.to_writer(std::io::BufWriter::new(file))
    }
}

fn infer_column(cells: Vec<String>) -> Column {
    let parsed: Option<Vec<Option<f64>>> = cells
        .iter()
        .map(|cell| {
            if is_missing_token(cell) {
                Some(None)
            } else {
                cell.parse::<f64>().ok().map(Some)
            }
        })
        .collect();

    match parsed {
        Some(values) => Column::Numeric(values),
        None => Column::Categorical(
            cells
                .into_iter()
                .map(|cell| if is_missing_token(&cell) { None } else { Some(cell) })
                .collect(),
        ),
    }
}
