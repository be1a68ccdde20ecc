//! Remove-row command.

use crate::RemoveRowArgs;
use anyhow::{Context, Result, bail};
use cgats::{Cgats, NodeId};
use tracing::{info, trace};

fn remove_row(cgats: &mut Cgats, doc: NodeId, row: usize) -> Result<()> {
    let data = cgats.child(doc, "DATA").context("Document has no DATA block")?;
    let rows = cgats.len(data);
    if row >= rows {
        bail!("Row {} out of range ({} rows)", row, rows);
    }
    cgats.remove(data, row)?;
    Ok(())
}

pub fn run(args: RemoveRowArgs) -> Result<()> {
    trace!(input = %args.input.display(), row = args.row, "remove_row::run");
    let mut cgats = super::load(&args.input)?;
    let doc = super::document(&cgats, args.document)?;
    remove_row(&mut cgats, doc, args.row)?;
    info!(sets = cgats.number_of_sets(doc), "Row removed");
    super::save(&mut cgats, args.output.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgats::Value;

    #[test]
    fn removes_and_reindexes() {
        let mut cgats = Cgats::parse(
            "CTI1\nBEGIN_DATA_FORMAT\nSAMPLE_ID RGB_R\nEND_DATA_FORMAT\n\
             BEGIN_DATA\n1 10\n2 20\n3 30\nEND_DATA\n",
        )
        .unwrap();
        let doc = cgats.documents()[0];
        remove_row(&mut cgats, doc, 0).unwrap();
        assert_eq!(cgats.number_of_sets(doc), 2);
        let data = cgats.child(doc, "DATA").unwrap();
        let first = cgats.child(data, 0usize).unwrap();
        assert_eq!(cgats.value(first, "RGB_R"), Some(Value::Float(20.0)));
        assert!(remove_row(&mut cgats, doc, 2).is_err());
    }

    #[test]
    fn missing_data_block() {
        let mut cgats = Cgats::from_lines(["CAL"]).unwrap();
        let doc = cgats.documents()[0];
        assert!(remove_row(&mut cgats, doc, 0).is_err());
    }
}
