use log::{info, warn};

use snafu::{prelude::*, Snafu};
use sociometry::*;

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::soc::config_reader::*;

pub mod config_reader;
mod io_common;
mod io_json;
mod io_xlsx;
pub mod selections;

#[derive(Debug, Snafu)]
pub enum SocError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("Workbook has no readable worksheet"))]
    EmptyExcel {},
    #[snafu(display("Wrong cell type in row {lineno}: {content}"))]
    ExcelWrongCellType { lineno: u64, content: String },
    #[snafu(display("Error reading file"))]
    OpeningJson { source: std::io::Error },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error parsing JSON number"))]
    ParsingJsonNumber {},
    #[snafu(display("No survey source was provided (use --config or --input)"))]
    MissingSource {},
    #[snafu(display("Survey provider {provider} is not supported"))]
    UnknownProvider { provider: String },
    #[snafu(display("No selection named {name} in {path}"))]
    MissingSelection { name: String, path: String },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type SocResult<T> = Result<T, SocError>;

/// One survey response, as produced by the readers.
/// This is before name normalization and rank coercion.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ParsedSurvey {
    pub id: Option<String>,
    pub name: String,
    pub group: String,
    pub rankings: Vec<(String, String)>,
}

/// Turns parsed rows into loadable records, dropping the ones without a
/// usable respondent name. A dropped row never aborts the batch.
fn validate_surveys(parsed: &[ParsedSurvey]) -> Vec<SurveyRecord> {
    let mut res: Vec<SurveyRecord> = Vec::new();
    for ps in parsed.iter() {
        if ps.name.trim().is_empty() {
            warn!(
                "validate_surveys: skipping record {:?}: no respondent name",
                ps.id
            );
            continue;
        }
        res.push(SurveyRecord {
            name: ps.name.clone(),
            group: ps.group.clone(),
            rankings: ps.rankings.clone(),
        });
    }
    res
}

fn read_survey_source(root: &Path, source: &SurveySource) -> SocResult<Vec<ParsedSurvey>> {
    let path = root.join(&source.path);
    let p = path.display().to_string();
    info!("Attempting to read survey source {:?}", p);
    match source.provider.as_deref().unwrap_or("json") {
        "json" => io_json::read_survey_dir(&p, &source.group),
        "xlsx" => io_xlsx::read_xlsx_surveys(&p, source),
        x => UnknownProviderSnafu { provider: x }.fail(),
    }
}

fn load_config(args: &Args) -> SocResult<(AppConfig, PathBuf)> {
    if let Some(config_path) = &args.config {
        let config = read_config(config_path)?;
        info!("config: {:?}", config);
        if config.survey_sources.is_empty() {
            whatever!("no survey sources listed in {}", config_path);
        }
        let root = Path::new(config_path)
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));
        Ok((config, root))
    } else if let Some(input) = &args.input {
        // Config-less quick path: a single source described on the command line.
        let source = SurveySource {
            provider: args.input_type.clone(),
            path: input.clone(),
            group: args.group.clone().unwrap_or_else(|| "Group 1".to_string()),
            excel_worksheet_name: None,
            name_column_index: None,
            first_choice_column_index: None,
        };
        let config = AppConfig {
            output_settings: None,
            survey_sources: vec![source],
            view: None,
        };
        Ok((config, PathBuf::from(".")))
    } else {
        MissingSourceSnafu {}.fail()
    }
}

struct ResolvedView {
    title: String,
    active_groups: Option<Vec<String>>,
    params: ViewParams,
}

fn resolve_view(args: &Args, config: &AppConfig, store: &PreferenceStore) -> SocResult<ResolvedView> {
    let view = config.view.clone().unwrap_or_default();

    let max_rank = args.max_rank.or(view.max_rank).unwrap_or(DEFAULT_MAX_RANK);
    let include_non_respondents =
        args.include_non_respondents || view.include_non_respondents.unwrap_or(false);
    let groups: Option<Vec<String>> = args.groups.clone().or_else(|| view.groups.clone());
    let students: Option<Vec<String>> = args.students.clone().or_else(|| view.students.clone());

    let allow_list: HashSet<String> = if let Some(name) = &args.selection {
        let file = match &args.selection_file {
            Some(f) => f,
            None => whatever!("--selection requires --selection-file"),
        };
        selections::load_selection(file, name)?
            .iter()
            .map(|s| normalize_name(s))
            .collect()
    } else if let Some(students) = students {
        students.iter().map(|s| normalize_name(s)).collect()
    } else {
        // Default view: every respondent of the active cohorts.
        store
            .respondents()
            .filter(|r| match &groups {
                Some(gs) => gs.iter().any(|g| *g == r.group),
                None => true,
            })
            .map(|r| r.identity.clone())
            .collect()
    };

    let title = config
        .output_settings
        .as_ref()
        .map(|o| o.title.clone())
        .unwrap_or_else(|| "Sociogram".to_string());

    let target_policy = if include_non_respondents {
        TargetPolicy::IncludeNonRespondents
    } else {
        TargetPolicy::AllowListOnly
    };

    Ok(ResolvedView {
        title,
        active_groups: groups,
        params: ViewParams {
            allow_list,
            max_rank,
            target_policy,
        },
    })
}

// Visual attribute scheme of the renderer: a base and a "popular" color
// per cohort, a neutral fallback for non-respondent nodes.
const GROUP_COLORS: [&str; 3] = ["#FFFF00", "#90EE90", "#ADD8E6"];
const POPULAR_COLORS: [&str; 3] = ["#FFD700", "#32CD32", "#1E90FF"];
const FALLBACK_COLOR: &str = "#eeeeee";

fn node_color(group_idx: Option<usize>, tier: PopularityTier) -> &'static str {
    match (group_idx, tier) {
        (Some(i), PopularityTier::Standard) => GROUP_COLORS[i % GROUP_COLORS.len()],
        (Some(i), _) => POPULAR_COLORS[i % POPULAR_COLORS.len()],
        (None, _) => FALLBACK_COLOR,
    }
}

fn edge_color(edge: &EdgeInfo) -> &'static str {
    if edge.mutual {
        "red"
    } else if edge.rank == 1 {
        // First choices stand out even when not reciprocated.
        "#666666"
    } else {
        "#cccccc"
    }
}

fn sociogram_to_json(graph: &Sociogram) -> JSValue {
    // Palette indices follow the sorted distinct cohort labels of the view.
    let mut group_labels: Vec<String> = graph
        .nodes
        .iter()
        .filter_map(|n| n.group.clone())
        .collect();
    group_labels.sort();
    group_labels.dedup();

    let mut nodes: Vec<JSValue> = Vec::new();
    for n in graph.nodes.iter() {
        let tier = popularity_tier(n.in_degree);
        let group_idx = n
            .group
            .as_ref()
            .and_then(|g| group_labels.iter().position(|x| x == g));
        let size = 15 + 4 * n.in_degree;
        let star = tier == PopularityTier::Star;
        nodes.push(json!({
            "id": n.identity,
            "group": n.group,
            "respondent": n.respondent,
            "inDegree": n.in_degree,
            "size": size,
            "color": node_color(group_idx, tier),
            "star": star,
        }));
    }

    let mut edges: Vec<JSValue> = Vec::new();
    for e in graph.edges.iter() {
        let width = if e.mutual { 3 } else { 1 };
        let dashes = !e.mutual;
        edges.push(json!({
            "source": e.source,
            "target": e.target,
            "rank": e.rank,
            "mutual": e.mutual,
            "color": edge_color(e),
            "width": width,
            "dashes": dashes,
        }));
    }

    json!({
        "nodes": nodes,
        "edges": edges,
        "mutualPairs": graph.mutual_pairs,
    })
}

fn policy_label(policy: TargetPolicy) -> &'static str {
    match policy {
        TargetPolicy::AllowListOnly => "allowListOnly",
        TargetPolicy::IncludeNonRespondents => "includeNonRespondents",
    }
}

fn build_summary_js(view: &ResolvedView, graph: &Sociogram) -> JSValue {
    json!({
        "config": {
            "title": view.title,
            "maxRank": view.params.max_rank,
            "policy": policy_label(view.params.target_policy),
            "groups": view.active_groups,
        },
        "graph": sociogram_to_json(graph),
        "metrics": {
            "students": graph.nodes.len(),
            "connections": graph.edges.len(),
            "mutualPairs": graph.mutual_pair_count(),
        },
    })
}

pub fn run_view(args: &Args) -> SocResult<()> {
    let (config, root) = load_config(args)?;

    let mut parsed: Vec<ParsedSurvey> = Vec::new();
    for source in config.survey_sources.iter() {
        // A broken source contributes nothing; the others still load.
        match read_survey_source(&root, source) {
            Ok(mut rows) => parsed.append(&mut rows),
            Err(e) => warn!("Skipping unavailable source {:?}: {}", source.path, e),
        }
    }

    let records = validate_surveys(&parsed);
    let store = assemble_store(&records);
    if store.is_empty() {
        warn!("run_view: no respondents were loaded");
    }

    let view = resolve_view(args, &config, &store)?;

    if let Some(name) = &args.save_selection {
        let file = match &args.selection_file {
            Some(f) => f,
            None => whatever!("--save-selection requires --selection-file"),
        };
        let identities: Vec<String> = view.params.allow_list.iter().cloned().collect();
        selections::save_selection(file, name, &identities)?;
        info!("run_view: saved selection {:?} to {:?}", name, file);
    }

    let graph = build_sociogram(&store, &view.params);
    if graph.is_empty() {
        info!("run_view: nothing to display for the current filters");
    }

    let summary = build_summary_js(&view, &graph);
    let pretty = serde_json::to_string_pretty(&summary).context(ParsingJsonSnafu {})?;

    let out_target = args
        .out
        .clone()
        .or_else(|| {
            config
                .output_settings
                .as_ref()
                .and_then(|o| o.output_path.clone())
        })
        .unwrap_or_else(|| "stdout".to_string());
    if out_target == "stdout" {
        println!("{}", pretty);
    } else {
        fs::write(&out_target, &pretty).context(OpeningJsonSnafu {})?;
        info!("run_view: summary written to {:?}", out_target);
    }

    // The reference summary, if provided for comparison.
    if let Some(reference_path) = &args.reference {
        let reference = read_summary(reference_path)?;
        let pretty_ref = serde_json::to_string_pretty(&reference).context(ParsingJsonSnafu {})?;
        if pretty_ref != pretty {
            warn!("Found differences with the reference summary");
            print_diff(pretty_ref.as_str(), pretty.as_str(), "\n");
            whatever!("Difference detected between the generated summary and the reference");
        }
    }

    Ok(())
}
