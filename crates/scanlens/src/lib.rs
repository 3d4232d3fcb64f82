//! Scanlens: review diagnostic-scan reports from the command line.
//!
//! The heavy lifting lives in `scanlens_report` (decoding) and
//! `scanlens_filter` (the filter query language); this crate wires them to
//! a clap CLI and a table renderer.

pub mod cli;
