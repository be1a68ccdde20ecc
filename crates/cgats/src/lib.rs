//! # cgats
//!
//! Reading, editing, querying and writing CGATS data files, the tabular
//! text format measurement and calibration tools exchange test charts,
//! measurement results and calibration curves in.
//!
//! A file holds one or more documents (`CTI1`, `CTI3`, `CAL`, ...). Each
//! document carries header keys, optional `BEGIN_<name>` sections and a
//! `DATA_FORMAT` / `DATA` table whose rows are keyed by column name.
//!
//! # Model
//!
//! - [`Cgats`] - arena owning every node of one input, plus the modified
//!   flag and file provenance
//! - [`NodeId`] / [`NodeRef`] - node handle and borrowed read view
//! - [`NodeKind`] - `ROOT`, document, `SECTION`, `DATA_FORMAT`, `DATA`,
//!   `SAMPLE`, `KEYWORDS`
//! - [`Value`] - integer, float or string scalar, typed once on ingestion
//!
//! # Usage
//!
//! ```rust
//! use cgats::{Cgats, Value};
//!
//! let mut cgats = Cgats::parse("CTI1\n\
//!     BEGIN_DATA_FORMAT\nSAMPLE_ID RGB_R RGB_G RGB_B\nEND_DATA_FORMAT\n\
//!     NUMBER_OF_SETS 1\n\
//!     BEGIN_DATA\n1 100.0 0.0 0.0\nEND_DATA\n").unwrap();
//!
//! let doc = cgats.documents()[0];
//! let data = cgats.child(doc, "DATA").unwrap();
//! cgats.append(data, [Value::Int(2), Value::Float(0.0), Value::Float(100.0), Value::Float(0.0)]).unwrap();
//! assert_eq!(cgats.number_of_sets(doc), 2);
//! assert!(cgats.modified());
//!
//! let text = cgats.to_string();
//! assert!(text.contains("NUMBER_OF_SETS 2"));
//! ```
//!
//! # Dependencies
//!
//! - [`regex`] - numeral and header-line patterns
//! - [`thiserror`] - Error handling
//! - [`tracing`] - Diagnostics for lenient parsing
//! - [`serde`] - Serialization of scalars and handles
//!
//! # Used By
//!
//! - `cgats-cli` - the `cgats` command-line tool

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod document;
mod edit;
mod error;
mod node;
mod parse;
mod query;
mod value;
mod write;
pub mod format;

pub use document::{Cgats, NodeRef, NUMBER_OF_FIELDS, NUMBER_OF_SETS};
pub use edit::{Data, Shift};
pub use error::{CgatsError, CgatsResult};
pub use format::{format_float, format_scalar, rcut, round_half_away, rpad};
pub use node::{Entry, NodeId, NodeKind};
pub use parse::Source;
pub use query::Predicate;
pub use value::{Key, Value, decimals, is_numeral};
