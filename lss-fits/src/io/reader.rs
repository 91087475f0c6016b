use crate::errors::{FitsError, Result};
use crate::hdu::{BinaryTableHdu, Hdu};
use crate::header::{Header, HeaderParser, CARD_SIZE};
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

pub const FITS_BLOCK_SIZE: usize = 2880;

const MAX_HEADER_BLOCKS: usize = 1000;

fn validate_fits_block_alignment(size: u64, context: &str) -> Result<()> {
    if !size.is_multiple_of(FITS_BLOCK_SIZE as u64) {
        return Err(FitsError::InvalidFormat(format!(
            "FITS {context} not aligned to {FITS_BLOCK_SIZE}-byte blocks: {size}"
        )));
    }
    Ok(())
}

/// Location of one HDU inside the file.
#[derive(Debug, Clone, PartialEq)]
pub struct HduInfo {
    pub index: usize,
    pub header_start: u64,
    pub header_size: usize,
    pub data_start: u64,
    pub data_size: usize,
}

/// A FITS file with its HDU layout scanned up front.
///
/// Opening walks every header once to record offsets; data are read on
/// demand through [`FitsFile::reader`].
#[derive(Debug)]
pub struct FitsFile<R> {
    reader: R,
    hdus: Vec<HduInfo>,
}

impl FitsFile<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::new(BufReader::new(file))
    }
}

impl<R: Read + Seek> FitsFile<R> {
    pub fn new(reader: R) -> Result<Self> {
        let mut fits = FitsFile {
            reader,
            hdus: Vec::new(),
        };
        fits.scan_hdus()?;
        Ok(fits)
    }

    pub fn num_hdus(&self) -> usize {
        self.hdus.len()
    }

    pub fn hdu_info(&self, index: usize) -> Option<&HduInfo> {
        self.hdus.get(index)
    }

    pub fn reader(&mut self) -> &mut R {
        &mut self.reader
    }

    pub fn read_header(&mut self, index: usize) -> Result<Header> {
        let info = self
            .hdus
            .get(index)
            .ok_or_else(|| FitsError::HduNotFound(format!("index {index}")))?
            .clone();

        self.reader.seek(SeekFrom::Start(info.header_start))?;
        let mut header_data = vec![0u8; info.header_size];
        self.reader.read_exact(&mut header_data)?;
        HeaderParser::parse_header(&header_data)
    }

    pub fn read_hdu(&mut self, index: usize) -> Result<Hdu> {
        let header = self.read_header(index)?;
        let info = self.hdus[index].clone();

        if index == 0 {
            if !header.is_primary() {
                return Err(FitsError::InvalidFormat(
                    "First HDU must be a primary HDU".to_string(),
                ));
            }
            return Ok(Hdu::Primary { header, info });
        }

        if !header.is_extension() {
            return Err(FitsError::InvalidFormat(
                "Non-primary HDUs must be extensions".to_string(),
            ));
        }
        Ok(Hdu::from_extension(header, info))
    }

    /// First `BINTABLE` extension in the file.
    pub fn first_binary_table(&mut self) -> Result<BinaryTableHdu> {
        for index in 1..self.hdus.len() {
            if let Hdu::BinaryTable(table) = self.read_hdu(index)? {
                return Ok(table);
            }
        }
        Err(FitsError::HduNotFound("no BINTABLE extension".to_string()))
    }

    fn scan_hdus(&mut self) -> Result<()> {
        let file_len = self.reader.seek(SeekFrom::End(0))?;
        let mut position = 0u64;
        let mut hdu_index = 0;

        while position < file_len {
            let hdu_info = match self.scan_single_hdu(position, hdu_index) {
                Ok(info) => info,
                Err(e) if self.hdus.is_empty() => return Err(e),
                // Trailing bytes after the last complete HDU are ignored.
                Err(_) => break,
            };

            position = align_to_block(hdu_info.data_start + hdu_info.data_size as u64);
            self.hdus.push(hdu_info);
            hdu_index += 1;
        }

        if self.hdus.is_empty() {
            return Err(FitsError::InvalidFormat("Empty FITS file".to_string()));
        }
        Ok(())
    }

    fn scan_single_hdu(&mut self, position: u64, hdu_index: usize) -> Result<HduInfo> {
        let header_size = self.determine_header_size(position)?;
        validate_fits_block_alignment(header_size as u64, "header")?;

        self.reader.seek(SeekFrom::Start(position))?;
        let mut header_data = vec![0u8; header_size];
        self.reader.read_exact(&mut header_data)?;
        let header = HeaderParser::parse_header(&header_data)?;

        if hdu_index == 0 && !header.is_primary() {
            return Err(FitsError::InvalidFormat(
                "File does not start with SIMPLE = T".to_string(),
            ));
        }

        let data_start = position + header_size as u64;
        let data_size = calculate_data_size(&header)?;

        Ok(HduInfo {
            index: hdu_index,
            header_start: position,
            header_size,
            data_start,
            data_size,
        })
    }

    fn determine_header_size(&mut self, start_position: u64) -> Result<usize> {
        self.reader.seek(SeekFrom::Start(start_position))?;

        let mut block_buffer = vec![0u8; FITS_BLOCK_SIZE];
        let mut blocks_read = 0;

        loop {
            if blocks_read >= MAX_HEADER_BLOCKS {
                return Err(FitsError::InvalidFormat(format!(
                    "Header exceeds maximum size of {} blocks ({} bytes)",
                    MAX_HEADER_BLOCKS,
                    MAX_HEADER_BLOCKS * FITS_BLOCK_SIZE
                )));
            }

            self.reader.read_exact(&mut block_buffer).map_err(|e| {
                FitsError::InvalidFormat(format!(
                    "Unexpected end of file while scanning header at block {}: {}",
                    blocks_read, e
                ))
            })?;
            blocks_read += 1;

            for chunk in block_buffer.chunks_exact(CARD_SIZE) {
                if &chunk[0..8] == b"END     " {
                    return Ok(blocks_read * FITS_BLOCK_SIZE);
                }
            }
        }
    }
}

/// Data size in bytes, padded to whole blocks:
/// `|BITPIX|/8 · GCOUNT · (PCOUNT + NAXIS1 · … · NAXISn)`.
fn calculate_data_size(header: &Header) -> Result<usize> {
    let naxis = header.get_integer("NAXIS").unwrap_or(0);
    if naxis <= 0 {
        return Ok(0);
    }

    let bitpix = header.required_integer("BITPIX")?;
    let bytes_per_value = match bitpix {
        8 | 16 | 32 | 64 | -32 | -64 => bitpix.unsigned_abs() as usize / 8,
        other => {
            return Err(FitsError::InvalidKeywordValue {
                keyword: "BITPIX".to_string(),
                value: other.to_string(),
            })
        }
    };

    let mut total = 1usize;
    for i in 1..=naxis {
        let axis_size = header.required_integer(&format!("NAXIS{}", i))?;
        let axis_size = usize::try_from(axis_size).map_err(|_| FitsError::InvalidKeywordValue {
            keyword: format!("NAXIS{}", i),
            value: axis_size.to_string(),
        })?;
        total = total
            .checked_mul(axis_size)
            .ok_or_else(|| FitsError::InvalidFormat("Data dimensions too large".to_string()))?;
    }

    let pcount = header.get_integer("PCOUNT").unwrap_or(0).max(0) as usize;
    let gcount = header.get_integer("GCOUNT").unwrap_or(1).max(1) as usize;

    let data_size = bytes_per_value * gcount * (pcount + total);
    Ok(align_to_block(data_size as u64) as usize)
}

fn align_to_block(size: u64) -> u64 {
    size.div_ceil(FITS_BLOCK_SIZE as u64) * FITS_BLOCK_SIZE as u64
}
