//! The supported font formats

pub mod cff;
pub mod pcf;
pub mod postscript;
