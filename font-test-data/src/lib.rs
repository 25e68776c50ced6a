//! Test data shared between the legacy-fonts crate, its benchmarks and fuzzers.
//!
//! Fixtures are generated by small builders rather than checked in as
//! binaries, so each one documents the structures it exercises.

pub mod bytes;
pub mod cff;
pub mod pcf;
