pub mod reader;
pub mod writer;

pub use reader::{FitsFile, HduInfo, FITS_BLOCK_SIZE};
pub use writer::{write_binary_table, FitsWriter, TableColumn};
