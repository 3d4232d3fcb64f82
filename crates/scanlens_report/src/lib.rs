//! Scan-report data model and decoding.
//!
//! A scan report is the JSON artifact produced by one diagnostic-scan run:
//! a set of test cases, each holding the request/response records observed
//! during enumeration, the decoded packet descriptions those records point
//! into, and a state graph describing the protocol states the scanner
//! walked through.
//!
//! Everything in here is decoded once and immutable afterwards; the filter
//! engine and the presentation layer only ever read these snapshots.

pub mod decode;
pub mod error;
pub mod types;

pub use decode::{decode_scan_report, decode_scan_report_value, readable_state_name};
pub use error::{ReportError, Result};
pub use types::{
    CompletedState, FieldValue, PacketDescription, PacketField, ResultRecord, ScalarValue,
    ScanReport, StateGraph, StateNode, StateStatistics, TestCase,
};
