//! Fmt command: parse and re-serialize.

use crate::FmtArgs;
use anyhow::Result;
use tracing::{info, trace};

pub fn run(args: FmtArgs) -> Result<()> {
    trace!(input = %args.input.display(), "fmt::run");
    let mut cgats = super::load(&args.input)?;
    info!(documents = cgats.documents().len(), "Formatting");
    super::save(&mut cgats, args.output.as_deref())
}
