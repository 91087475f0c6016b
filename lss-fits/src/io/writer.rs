use crate::column::ColumnData;
use crate::errors::{FitsError, Result};
use crate::header::{Header, Keyword};
use byteorder::{BigEndian, WriteBytesExt};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

const FITS_BLOCK_SIZE: usize = 2880;

/// One column to be written into a binary table.
///
/// Values are written as stored. `TNULL`/`TSCAL`/`TZERO` are emitted as
/// header keywords and applied by readers, not by the writer.
#[derive(Debug, Clone, PartialEq)]
pub struct TableColumn {
    pub name: String,
    pub data: ColumnData,
    pub unit: Option<String>,
    pub null_value: Option<i64>,
    pub scale: Option<f64>,
    pub zero_offset: Option<f64>,
}

impl TableColumn {
    pub fn new<S: Into<String>>(name: S, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
            unit: None,
            null_value: None,
            scale: None,
            zero_offset: None,
        }
    }

    pub fn float<S: Into<String>>(name: S, values: Vec<f64>) -> Self {
        Self::new(name, ColumnData::Float(values))
    }

    pub fn int<S: Into<String>>(name: S, values: Vec<i64>) -> Self {
        Self::new(name, ColumnData::Int(values))
    }

    pub fn text<S: Into<String>>(name: S, values: Vec<String>) -> Self {
        Self::new(name, ColumnData::Text(values))
    }

    pub fn with_unit<S: Into<String>>(mut self, unit: S) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn with_null_value(mut self, null_value: i64) -> Self {
        self.null_value = Some(null_value);
        self
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = Some(scale);
        self
    }

    pub fn with_zero_offset(mut self, zero: f64) -> Self {
        self.zero_offset = Some(zero);
        self
    }

    /// `TFORM` code and bytes per row.
    fn layout(&self) -> (String, usize) {
        match &self.data {
            ColumnData::Bool(_) => ("1L".to_string(), 1),
            ColumnData::Int(_) => ("1K".to_string(), 8),
            ColumnData::Float(_) => ("1D".to_string(), 8),
            ColumnData::Bytes(v) => {
                let width = v.iter().map(Vec::len).max().unwrap_or(0).max(1);
                (format!("{}A", width), width)
            }
            ColumnData::Text(v) => {
                let width = v.iter().map(String::len).max().unwrap_or(0).max(1);
                (format!("{}A", width), width)
            }
            ColumnData::IntArray { width, .. } => (format!("{}K", width), 8 * width),
            ColumnData::FloatArray { width, .. } => (format!("{}D", width), 8 * width),
        }
    }
}

pub struct FitsWriter<W: Write> {
    writer: W,
}

impl FitsWriter<BufWriter<File>> {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> FitsWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Writes a data-less primary HDU, as required before any extension.
    pub fn write_empty_primary(&mut self) -> Result<()> {
        let mut header = Header::new();
        header.add_keyword(Keyword::logical("SIMPLE", true));
        header.add_keyword(Keyword::integer("BITPIX", 8));
        header.add_keyword(Keyword::integer("NAXIS", 0));
        header.add_keyword(Keyword::logical("EXTEND", true));
        self.writer.write_all(&header.to_bytes())?;
        Ok(())
    }

    pub fn write_binary_table(&mut self, columns: &[TableColumn]) -> Result<()> {
        let n_rows = columns.first().map_or(0, |c| c.data.len());
        if let Some(bad) = columns.iter().find(|c| c.data.len() != n_rows) {
            return Err(FitsError::InvalidFormat(format!(
                "Column '{}' has {} rows, expected {}",
                bad.name,
                bad.data.len(),
                n_rows
            )));
        }

        let layouts: Vec<(String, usize)> = columns.iter().map(TableColumn::layout).collect();
        let row_size: usize = layouts.iter().map(|(_, width)| width).sum();

        let header = build_table_header(columns, &layouts, row_size, n_rows);
        self.writer.write_all(&header.to_bytes())?;

        let mut data = Vec::with_capacity(row_size * n_rows);
        for row in 0..n_rows {
            for (column, (_, width)) in columns.iter().zip(&layouts) {
                encode_cell(&mut data, &column.data, row, *width)?;
            }
        }
        let padded = data.len().div_ceil(FITS_BLOCK_SIZE) * FITS_BLOCK_SIZE;
        data.resize(padded, 0);
        self.writer.write_all(&data)?;

        debug!(
            "wrote binary table with {} columns and {} rows",
            columns.len(),
            n_rows
        );
        Ok(())
    }

    pub fn finish(mut self) -> Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

/// Writes `columns` as a single-extension FITS file at `path`.
pub fn write_binary_table<P: AsRef<Path>>(path: P, columns: &[TableColumn]) -> Result<()> {
    let mut writer = FitsWriter::create(path)?;
    writer.write_empty_primary()?;
    writer.write_binary_table(columns)?;
    writer.finish()?;
    Ok(())
}

fn build_table_header(
    columns: &[TableColumn],
    layouts: &[(String, usize)],
    row_size: usize,
    n_rows: usize,
) -> Header {
    let mut header = Header::new();
    header.add_keyword(Keyword::string("XTENSION", "BINTABLE"));
    header.add_keyword(Keyword::integer("BITPIX", 8));
    header.add_keyword(Keyword::integer("NAXIS", 2));
    header.add_keyword(Keyword::integer("NAXIS1", row_size as i64));
    header.add_keyword(Keyword::integer("NAXIS2", n_rows as i64));
    header.add_keyword(Keyword::integer("PCOUNT", 0));
    header.add_keyword(Keyword::integer("GCOUNT", 1));
    header.add_keyword(Keyword::integer("TFIELDS", columns.len() as i64));

    for (i, (column, (tform, _))) in columns.iter().zip(layouts).enumerate() {
        let n = i + 1;
        header.add_keyword(Keyword::string(format!("TTYPE{}", n), column.name.as_str()));
        header.add_keyword(Keyword::string(format!("TFORM{}", n), tform.as_str()));
        if let Some(unit) = &column.unit {
            header.add_keyword(Keyword::string(format!("TUNIT{}", n), unit.as_str()));
        }
        if let Some(null) = column.null_value {
            header.add_keyword(Keyword::integer(format!("TNULL{}", n), null));
        }
        if let Some(scale) = column.scale {
            header.add_keyword(Keyword::real(format!("TSCAL{}", n), scale));
        }
        if let Some(zero) = column.zero_offset {
            header.add_keyword(Keyword::real(format!("TZERO{}", n), zero));
        }
    }
    header
}

fn encode_cell(out: &mut Vec<u8>, data: &ColumnData, row: usize, width: usize) -> Result<()> {
    match data {
        ColumnData::Bool(v) => out.push(if v[row] { b'T' } else { b'F' }),
        ColumnData::Int(v) => out.write_i64::<BigEndian>(v[row])?,
        ColumnData::Float(v) => out.write_f64::<BigEndian>(v[row])?,
        ColumnData::Bytes(v) => push_padded(out, &v[row], width),
        ColumnData::Text(v) => push_padded(out, v[row].as_bytes(), width),
        ColumnData::IntArray { width: n, values } => {
            for &value in &values[row * n..(row + 1) * n] {
                out.write_i64::<BigEndian>(value)?;
            }
        }
        ColumnData::FloatArray { width: n, values } => {
            for &value in &values[row * n..(row + 1) * n] {
                out.write_f64::<BigEndian>(value)?;
            }
        }
    }
    Ok(())
}

fn push_padded(out: &mut Vec<u8>, bytes: &[u8], width: usize) {
    out.extend_from_slice(bytes);
    out.extend(std::iter::repeat_n(b' ', width - bytes.len()));
}
