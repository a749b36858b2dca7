// Reader for directories of per-respondent JSON survey documents.

use log::{debug, info, warn};
use serde::Deserialize;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use snafu::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

use crate::soc::{io_common::simplify_file_name, *};

#[derive(Debug, Clone, Deserialize)]
struct SurveyDoc {
    // The aliases keep archives from the original Spanish-language
    // collection tool loadable without conversion.
    #[serde(alias = "Nombre")]
    name: Option<String>,
    #[serde(default, alias = "Seleccion_Jerarquica")]
    ranking: JSMap<String, JSValue>,
}

/// Reads every `*.json` document of the folder. A corrupt or nameless
/// document is reported and skipped; a missing folder is reported once
/// and yields no records. Neither aborts the batch.
pub fn read_survey_dir(path: &str, group: &str) -> SocResult<Vec<ParsedSurvey>> {
    let dir = Path::new(path);
    if !dir.is_dir() {
        warn!("read_survey_dir: survey folder does not exist: {:?}", path);
        return Ok(Vec::new());
    }

    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .context(OpeningJsonSnafu {})?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().map(|ext| ext == "json").unwrap_or(false))
        .collect();
    files.sort();

    let mut res: Vec<ParsedSurvey> = Vec::new();
    let mut skipped: usize = 0;
    for file in files.iter() {
        let id = simplify_file_name(file.display().to_string().as_str());
        match read_survey_file(file, group) {
            Ok(Some(mut ps)) => {
                ps.id = Some(id);
                res.push(ps);
            }
            Ok(None) => {
                warn!("read_survey_dir: {:?}: no respondent name, skipping", id);
                skipped += 1;
            }
            Err(e) => {
                warn!("read_survey_dir: error in {:?}: {}", id, e);
                skipped += 1;
            }
        }
    }
    info!(
        "read_survey_dir: {:?}: {} records read, {} skipped",
        path,
        res.len(),
        skipped
    );
    Ok(res)
}

fn read_survey_file(file: &Path, group: &str) -> SocResult<Option<ParsedSurvey>> {
    let contents = fs::read_to_string(file).context(OpeningJsonSnafu {})?;
    let doc: SurveyDoc = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    debug!("read_survey_file: {:?}: {:?}", file, doc);

    let name = match doc.name {
        Some(n) if !n.trim().is_empty() => n,
        _ => return Ok(None),
    };
    let rankings: Vec<(String, String)> = doc
        .ranking
        .iter()
        .map(|(target, value)| (target.clone(), rank_to_string(value)))
        .collect();
    Ok(Some(ParsedSurvey {
        id: None,
        name,
        group: group.to_string(),
        rankings,
    }))
}

// Rank values arrive as numbers or strings depending on the exporter.
// Anything else is kept verbatim and later coerced to the sentinel rank.
fn rank_to_string(value: &JSValue) -> String {
    match value {
        JSValue::Number(n) => n.to_string(),
        JSValue::String(s) => s.clone(),
        other => format!("{}", other),
    }
}
