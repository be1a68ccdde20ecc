//! Keyword command: declare (and optionally set) or remove a header keyword.

use crate::KeywordArgs;
use anyhow::{Context, Result};
use cgats::{Cgats, NodeId, Value};
use tracing::{info, trace};

fn apply(cgats: &mut Cgats, doc: NodeId, args: &KeywordArgs) -> Result<()> {
    if args.remove {
        cgats
            .remove_keyword(doc, &args.name, true)
            .with_context(|| format!("Failed to remove keyword {}", args.name))
    } else {
        let value = args.value.as_deref().map(Value::coerce);
        cgats
            .add_keyword(doc, &args.name, value)
            .with_context(|| format!("Failed to add keyword {}", args.name))
    }
}

pub fn run(args: KeywordArgs) -> Result<()> {
    trace!(input = %args.input.display(), name = %args.name, remove = args.remove, "keyword::run");
    let mut cgats = super::load(&args.input)?;
    let doc = super::document(&cgats, args.document)?;
    apply(&mut cgats, doc, &args)?;
    info!(modified = cgats.modified(), "Keyword updated");
    super::save(&mut cgats, args.output.as_deref())
}
