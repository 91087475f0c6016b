//! Decoded column storage shared by the reader, the writer and catalog tables.

/// Values of one table column, in row order.
///
/// Scalar columns hold one value per row. `IntArray`/`FloatArray` hold
/// `width` values per row, flattened row-major.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Bool(Vec<bool>),
    Int(Vec<i64>),
    Float(Vec<f64>),
    /// Raw character data as stored in the file (trailing NULs removed).
    Bytes(Vec<Vec<u8>>),
    Text(Vec<String>),
    IntArray { width: usize, values: Vec<i64> },
    FloatArray { width: usize, values: Vec<f64> },
}

impl ColumnData {
    /// Number of rows.
    pub fn len(&self) -> usize {
        match self {
            Self::Bool(v) => v.len(),
            Self::Int(v) => v.len(),
            Self::Float(v) => v.len(),
            Self::Bytes(v) => v.len(),
            Self::Text(v) => v.len(),
            Self::IntArray { width, values } => rows_of(values.len(), *width),
            Self::FloatArray { width, values } => rows_of(values.len(), *width),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_multidimensional(&self) -> bool {
        matches!(self, Self::IntArray { .. } | Self::FloatArray { .. })
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Bytes(_) => "bytes",
            Self::Text(_) => "text",
            Self::IntArray { .. } => "int array",
            Self::FloatArray { .. } => "float array",
        }
    }

    /// Numeric view of a scalar column; `None` for text and array columns.
    pub fn to_f64(&self) -> Option<Vec<f64>> {
        match self {
            Self::Float(v) => Some(v.clone()),
            Self::Int(v) => Some(v.iter().map(|&x| x as f64).collect()),
            Self::Bool(v) => Some(v.iter().map(|&b| if b { 1.0 } else { 0.0 }).collect()),
            _ => None,
        }
    }

    /// The first `n` rows (all rows if `n` exceeds the length).
    pub fn head(&self, n: usize) -> Self {
        let n = n.min(self.len());
        match self {
            Self::Bool(v) => Self::Bool(v[..n].to_vec()),
            Self::Int(v) => Self::Int(v[..n].to_vec()),
            Self::Float(v) => Self::Float(v[..n].to_vec()),
            Self::Bytes(v) => Self::Bytes(v[..n].to_vec()),
            Self::Text(v) => Self::Text(v[..n].to_vec()),
            Self::IntArray { width, values } => Self::IntArray {
                width: *width,
                values: values[..n * width].to_vec(),
            },
            Self::FloatArray { width, values } => Self::FloatArray {
                width: *width,
                values: values[..n * width].to_vec(),
            },
        }
    }

    /// Rows whose entry in `keep` is true. `keep` must cover every row.
    pub fn filter(&self, keep: &[bool]) -> Self {
        match self {
            Self::Bool(v) => Self::Bool(select(v, keep)),
            Self::Int(v) => Self::Int(select(v, keep)),
            Self::Float(v) => Self::Float(select(v, keep)),
            Self::Bytes(v) => Self::Bytes(select(v, keep)),
            Self::Text(v) => Self::Text(select(v, keep)),
            Self::IntArray { width, values } => Self::IntArray {
                width: *width,
                values: select_chunks(values, *width, keep),
            },
            Self::FloatArray { width, values } => Self::FloatArray {
                width: *width,
                values: select_chunks(values, *width, keep),
            },
        }
    }
}

fn rows_of(n_values: usize, width: usize) -> usize {
    if width == 0 {
        0
    } else {
        n_values / width
    }
}

fn select<T: Clone>(values: &[T], keep: &[bool]) -> Vec<T> {
    values
        .iter()
        .zip(keep)
        .filter(|(_, &k)| k)
        .map(|(v, _)| v.clone())
        .collect()
}

fn select_chunks<T: Clone>(values: &[T], width: usize, keep: &[bool]) -> Vec<T> {
    if width == 0 {
        return Vec::new();
    }
    values
        .chunks_exact(width)
        .zip(keep)
        .filter(|(_, &k)| k)
        .flat_map(|(row, _)| row.iter().cloned())
        .collect()
}
