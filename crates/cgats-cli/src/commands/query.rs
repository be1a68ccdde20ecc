//! Query command: search a file by KEY / KEY=VALUE terms.

use crate::QueryArgs;
use anyhow::Result;
use cgats::{Cgats, Entry, NodeId, Predicate};
use serde_json::json;
use tracing::{debug, trace};

fn predicate(terms: &[String]) -> Predicate {
    terms.iter().fold(Predicate::default(), |predicate, term| {
        let (key, value) = super::parse_term(term);
        predicate.and(key, value)
    })
}

/// JSON view of a node: type tag, key and its scalar slots.
fn node_json(cgats: &Cgats, id: NodeId) -> serde_json::Value {
    let Some(node) = cgats.node(id) else {
        return serde_json::Value::Null;
    };
    let mut values = serde_json::Map::new();
    for key in node.keys() {
        if let Some(Entry::Value(value)) = node.get(key.clone()) {
            values.insert(key.to_string(), json!(value));
        }
    }
    json!({
        "type": node.type_tag(),
        "key": node.key(),
        "values": values,
    })
}

fn entry_json(cgats: &Cgats, entry: &Entry) -> serde_json::Value {
    match entry {
        Entry::Value(value) => json!(value),
        Entry::Node(id) => node_json(cgats, *id),
    }
}

fn entry_text(cgats: &Cgats, entry: &Entry) -> String {
    match entry {
        Entry::Value(value) => value.to_string(),
        Entry::Node(id) => cgats.to_cgats_string(*id),
    }
}

pub fn run(args: QueryArgs) -> Result<()> {
    trace!(input = %args.input.display(), terms = ?args.terms, "query::run");
    let cgats = super::load(&args.input)?;
    let predicate = predicate(&args.terms);

    let entries: Vec<Entry> = match (args.values, args.first) {
        (true, true) => cgats.queryv1(Cgats::ROOT, predicate).into_iter().collect(),
        (true, false) => cgats.queryv(Cgats::ROOT, predicate),
        (false, true) => cgats.queryi1(Cgats::ROOT, predicate).map(Entry::Node).into_iter().collect(),
        (false, false) => cgats.queryi(Cgats::ROOT, predicate).into_iter().map(Entry::Node).collect(),
    };
    debug!(matches = entries.len(), "query complete");

    if args.json {
        let items: Vec<serde_json::Value> = entries.iter().map(|e| entry_json(&cgats, e)).collect();
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else {
        for entry in &entries {
            println!("{}", entry_text(&cgats, entry));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgats::Value;

    const CHART: &str = "CTI1\nBEGIN_DATA_FORMAT\nSAMPLE_ID RGB_R RGB_G\nEND_DATA_FORMAT\n\
                         BEGIN_DATA\n1 100 0\n2 0 100\nEND_DATA\n";

    #[test]
    fn terms_combine() {
        let cgats = Cgats::parse(CHART).unwrap();
        let p = predicate(&["RGB_R=0".to_string(), "RGB_G".to_string()]);
        let row = cgats.queryi1(Cgats::ROOT, p).unwrap();
        assert_eq!(cgats.value(row, "SAMPLE_ID"), Some(Value::Int(2)));
    }

    #[test]
    fn rows_as_json() {
        let cgats = Cgats::parse(CHART).unwrap();
        let row = cgats.queryi1(Cgats::ROOT, predicate(&["RGB_R=100".to_string()])).unwrap();
        let json = node_json(&cgats, row);
        assert_eq!(json["type"], "SAMPLE");
        assert_eq!(json["key"], 0);
        assert_eq!(json["values"]["RGB_R"], 100.0);
        assert_eq!(entry_text(&cgats, &Entry::Node(row)), "1 100 0");
    }
}
