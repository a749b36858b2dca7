// Persistence of named allow-lists, so a hand-picked set of students can
// be reused across sessions.

use log::debug;
use snafu::prelude::*;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::soc::*;

type SelectionMap = BTreeMap<String, Vec<String>>;

fn read_selection_map(path: &str) -> SocResult<SelectionMap> {
    if !Path::new(path).exists() {
        return Ok(SelectionMap::new());
    }
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu {})?;
    serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})
}

/// Loads the named allow-list from a selections file.
pub fn load_selection(path: &str, name: &str) -> SocResult<Vec<String>> {
    let map = read_selection_map(path)?;
    debug!("load_selection: {:?} holds {} selections", path, map.len());
    map.get(name)
        .cloned()
        .context(MissingSelectionSnafu { name, path })
}

/// Stores the identities under the given name, merging with whatever the
/// file already holds. The list is sorted and deduplicated, so the
/// round-trip does not depend on the original selection order.
pub fn save_selection(path: &str, name: &str, identities: &[String]) -> SocResult<()> {
    let mut map = read_selection_map(path)?;
    let mut ids: Vec<String> = identities.to_vec();
    ids.sort();
    ids.dedup();
    map.insert(name.to_string(), ids);
    let pretty = serde_json::to_string_pretty(&map).context(ParsingJsonSnafu {})?;
    fs::write(path, pretty).context(OpeningJsonSnafu {})?;
    Ok(())
}
