//! On-disk list database load/save (§6.3).
//!
//! The distilled spec leaves the wire format of a `ListDb` unspecified.
//! This implementation resolves that: one list per line, each line a JSON
//! array of `[id, freq]` pairs (e.g. `[[1,1],[4,1],[9,2]]`); an empty line
//! is a legal empty list. `dim` is inferred on load as one more than the
//! largest id seen across the whole file.

use anyhow::{Context, Result};
use imh_core::{Item, List, ListDb};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

pub fn load_listdb<P: AsRef<Path>>(path: P) -> Result<ListDb> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("opening list database {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut lists = Vec::new();
    let mut max_id: i64 = -1;

    for (lineno, line) in reader.lines().enumerate() {
        let line =
            line.with_context(|| format!("reading {} line {}", path.display(), lineno + 1))?;
        let line = line.trim();
        if line.is_empty() {
            lists.push(List::new());
            continue;
        }

        let pairs: Vec<(u32, u32)> = serde_json::from_str(line)
            .with_context(|| format!("parsing {} line {}", path.display(), lineno + 1))?;
        let mut list = List::with_capacity(pairs.len());
        for (id, freq) in pairs {
            max_id = max_id.max(id as i64);
            list.push(Item { id, freq });
        }
        lists.push(list);
    }

    let dim = (max_id + 1).max(0) as u32;
    Ok(ListDb::from_lists(lists, dim))
}

pub fn save_listdb<P: AsRef<Path>>(path: P, db: &ListDb) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    for list in db.iter() {
        let pairs: Vec<(u32, u32)> = list.items.iter().map(|it| (it.id, it.freq)).collect();
        let line = serde_json::to_string(&pairs)
            .with_context(|| format!("serializing a list for {}", path.display()))?;
        writeln!(writer, "{line}")?;
    }
    writer.flush()?;
    Ok(())
}
