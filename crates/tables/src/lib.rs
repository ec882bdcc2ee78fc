//! CSV endpoints of the harvester: the symbol list in, the four tables out.

pub mod reader;
pub mod writer;

pub use reader::read_symbols;
pub use writer::{
    write_tables, ANCESTORS_FILE, CHARACTERISTICS_FILE, NATIVE_STATUS_FILE, PLANTS_FILE,
};
