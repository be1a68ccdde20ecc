//! Integration tests for the cgats crates.
//!
//! End-to-end checks across parsing, editing, querying and writing,
//! including file round trips on realistic chart, measurement and
//! calibration payloads (see [`fixtures`]).

pub mod fixtures;
