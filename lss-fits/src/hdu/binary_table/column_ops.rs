use super::{BinaryTableHdu, TForm};
use crate::column::ColumnData;
use crate::errors::{FitsError, Result};
use crate::hdu::ColumnInfo;
use byteorder::{BigEndian, ByteOrder};
use std::io::{Read, Seek, SeekFrom};

/// Byte layout of one column inside a row.
#[derive(Debug, Clone)]
struct ColumnLayout {
    info: ColumnInfo,
    tform: TForm,
    offset: usize,
}

impl BinaryTableHdu {
    /// Byte offset of every column within a row, in column order.
    fn column_layouts(&self) -> Result<Vec<ColumnLayout>> {
        let mut offset = 0;
        let mut layouts = Vec::new();
        for info in self.all_column_info()? {
            let tform = TForm::parse(&info.format)?;
            let width = tform.byte_width();
            layouts.push(ColumnLayout {
                info,
                tform,
                offset,
            });
            offset += width;
        }

        let row_size = self.row_size()?;
        if offset > row_size {
            return Err(FitsError::InvalidFormat(format!(
                "Columns need {} bytes per row but NAXIS1 is {}",
                offset, row_size
            )));
        }
        Ok(layouts)
    }

    /// Reads the requested columns (0-based) for the first `row_limit` rows,
    /// or all rows when `row_limit` is `None`.
    ///
    /// The row block is read once and every column decoded from it.
    pub fn read_columns<R: Read + Seek>(
        &self,
        reader: &mut R,
        columns: &[usize],
        row_limit: Option<usize>,
    ) -> Result<Vec<ColumnData>> {
        let layouts = self.column_layouts()?;
        let selected = columns
            .iter()
            .map(|&c| {
                layouts.get(c).ok_or_else(|| {
                    FitsError::InvalidFormat(format!(
                        "Column index {} out of range (0..{})",
                        c,
                        layouts.len()
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let n_rows = row_limit
            .map_or(self.number_of_rows(), |limit| limit.min(self.number_of_rows()));
        let row_size = self.row_size()?;

        let mut rows = vec![0u8; n_rows * row_size];
        if !rows.is_empty() {
            reader.seek(SeekFrom::Start(self.info().data_start))?;
            reader.read_exact(&mut rows)?;
        }

        selected
            .into_iter()
            .map(|layout| decode_column(layout, &rows, row_size, n_rows))
            .collect()
    }

    pub fn read_column<R: Read + Seek>(
        &self,
        reader: &mut R,
        column: usize,
        row_limit: Option<usize>,
    ) -> Result<ColumnData> {
        let mut data = self.read_columns(reader, &[column], row_limit)?;
        data.pop()
            .ok_or_else(|| FitsError::InvalidFormat("No column decoded".to_string()))
    }
}

fn unsupported(layout: &ColumnLayout) -> FitsError {
    FitsError::UnsupportedColumn {
        column: layout.info.display_name(),
        format: layout.info.format.clone(),
    }
}

fn decode_column(
    layout: &ColumnLayout,
    rows: &[u8],
    row_size: usize,
    n_rows: usize,
) -> Result<ColumnData> {
    let repeat = layout.tform.repeat;
    if repeat == 0 {
        return Err(unsupported(layout));
    }

    let cells = (0..n_rows).map(|row| {
        let start = row * row_size + layout.offset;
        &rows[start..start + layout.tform.byte_width()]
    });

    match layout.tform.code {
        'A' => Ok(ColumnData::Bytes(
            cells
                .map(|cell| {
                    let end = cell.iter().rposition(|&b| b != 0).map_or(0, |p| p + 1);
                    cell[..end].to_vec()
                })
                .collect(),
        )),
        'L' => {
            let values: Vec<bool> = cells.flat_map(|cell| cell.iter().map(|&b| b == b'T')).collect();
            if repeat == 1 {
                Ok(ColumnData::Bool(values))
            } else {
                Ok(ColumnData::IntArray {
                    width: repeat,
                    values: values.into_iter().map(i64::from).collect(),
                })
            }
        }
        'B' | 'I' | 'J' | 'K' => {
            let size = layout.tform.element_size();
            let raw: Vec<i64> = cells
                .flat_map(|cell| cell.chunks_exact(size).map(|chunk| read_int(layout.tform.code, chunk)))
                .collect();
            Ok(integer_column(&layout.info, repeat, raw))
        }
        'E' | 'D' => {
            let size = layout.tform.element_size();
            let scaled = layout.info.needs_scaling();
            let scale = layout.info.scale.unwrap_or(1.0);
            let zero = layout.info.zero_offset.unwrap_or(0.0);
            let values: Vec<f64> = cells
                .flat_map(|cell| {
                    cell.chunks_exact(size).map(|chunk| {
                        let raw = if size == 4 {
                            BigEndian::read_f32(chunk) as f64
                        } else {
                            BigEndian::read_f64(chunk)
                        };
                        if scaled {
                            zero + scale * raw
                        } else {
                            raw
                        }
                    })
                })
                .collect();
            Ok(float_column(repeat, values))
        }
        _ => Err(unsupported(layout)),
    }
}

fn read_int(code: char, chunk: &[u8]) -> i64 {
    match code {
        'B' => chunk[0] as i64,
        'I' => BigEndian::read_i16(chunk) as i64,
        'J' => BigEndian::read_i32(chunk) as i64,
        _ => BigEndian::read_i64(chunk),
    }
}

/// Applies `TNULL`, `TSCAL` and `TZERO` to raw integers.
///
/// Columns with a null marker or a non-integral scaling become floats with
/// NaN at null entries. A pure integer offset (the unsigned-integer
/// convention) keeps the column integral.
fn integer_column(info: &ColumnInfo, repeat: usize, raw: Vec<i64>) -> ColumnData {
    let scale = info.scale.unwrap_or(1.0);
    let zero = info.zero_offset.unwrap_or(0.0);
    let integral = scale == 1.0 && zero.fract() == 0.0;

    if info.null_value.is_none() && integral {
        let offset = zero as i64;
        let values = raw.into_iter().map(|v| v.wrapping_add(offset)).collect();
        return if repeat == 1 {
            ColumnData::Int(values)
        } else {
            ColumnData::IntArray {
                width: repeat,
                values,
            }
        };
    }

    let values = raw
        .into_iter()
        .map(|v| match info.null_value {
            Some(null) if v == null => f64::NAN,
            _ => zero + scale * v as f64,
        })
        .collect();
    float_column(repeat, values)
}

fn float_column(repeat: usize, values: Vec<f64>) -> ColumnData {
    if repeat == 1 {
        ColumnData::Float(values)
    } else {
        ColumnData::FloatArray {
            width: repeat,
            values,
        }
    }
}
