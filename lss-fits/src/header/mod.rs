pub mod keywords;
pub mod parser;

pub use keywords::{Keyword, KeywordValue};
pub use parser::{Header, HeaderCard, HeaderParser, CARD_SIZE, HEADER_BLOCK_SIZE};
