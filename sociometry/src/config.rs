// ********* Input data structures ***********

use std::collections::HashMap;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::Display;

/// Identity key assigned to names that are empty once cleaned.
pub const UNKNOWN_IDENTITY: &str = "UNKNOWN";

/// Rank substituted for preference values that cannot be parsed as
/// integers. It sorts after every realistic threshold, so a malformed
/// rank is kept in the dataset but filtered out of any strict view.
pub const RANK_SENTINEL: u32 = 99;

/// Default upper bound of the rank slider exposed by user interfaces.
pub const DEFAULT_MAX_RANK: u32 = 10;

/// In-degree from which a node counts as notably popular.
pub const POPULAR_MIN_IN_DEGREE: u32 = 3;

/// In-degree from which a node receives the star marker.
pub const STAR_MIN_IN_DEGREE: u32 = 5;

/// One survey response as handed over by a loader.
///
/// Names and preference targets are still raw free-text at this point;
/// ranks are raw strings because form exporters disagree on whether a
/// rank is a number or a numeric string. Normalization and coercion
/// happen when the record is inserted into a [`PreferenceStore`].
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SurveyRecord {
    pub name: String,
    pub group: String,
    pub rankings: Vec<(String, String)>,
}

/// A student who submitted a survey, keyed by normalized identity.
///
/// Immutable after construction. Re-loading a survey for the same
/// identity replaces the whole record.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Respondent {
    pub identity: String,
    pub group: String,
    /// Normalized target identity to rank (1 = most preferred).
    pub preferences: HashMap<String, u32>,
}

/// The authoritative in-memory dataset: identity key to respondent.
///
/// Built once during the batch load phase and read-only afterwards.
/// Nothing else holds student data independently.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct PreferenceStore {
    respondents: HashMap<String, Respondent>,
}

impl PreferenceStore {
    pub fn new() -> PreferenceStore {
        PreferenceStore {
            respondents: HashMap::new(),
        }
    }

    /// Normalizes and inserts one record. Later inserts overwrite earlier
    /// ones with the same identity key.
    pub fn insert_record(&mut self, record: &SurveyRecord) {
        let identity = crate::normalize_name(&record.name);
        let mut preferences: HashMap<String, u32> = HashMap::new();
        for (target, raw_rank) in record.rankings.iter() {
            // TODO: keep the strongest rank when two raw targets collapse
            // to the same identity instead of the last one seen.
            preferences.insert(crate::normalize_name(target), parse_rank(raw_rank));
        }
        self.respondents.insert(
            identity.clone(),
            Respondent {
                identity,
                group: record.group.clone(),
                preferences,
            },
        );
    }

    pub fn get(&self, identity: &str) -> Option<&Respondent> {
        self.respondents.get(identity)
    }

    pub fn respondents(&self) -> impl Iterator<Item = &Respondent> {
        self.respondents.values()
    }

    /// All identity keys, in sorted order.
    pub fn identities(&self) -> Vec<String> {
        let mut res: Vec<String> = self.respondents.keys().cloned().collect();
        res.sort();
        res
    }

    pub fn len(&self) -> usize {
        self.respondents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.respondents.is_empty()
    }
}

fn parse_rank(raw: &str) -> u32 {
    raw.trim().parse::<u32>().unwrap_or(RANK_SENTINEL)
}

/// Whether an edge may point at a target that is not allow-listed.
///
/// Both policies have been observed in the field; they are never mixed
/// within one build and callers must pick one explicitly.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum TargetPolicy {
    /// Drop the edge unless the target is in the allow-list. The check is
    /// on allow-list membership, not on respondent status: an allow-listed
    /// target without a survey still receives the edge.
    AllowListOnly,
    /// Always draw the edge, creating a node for the target if needed.
    IncludeNonRespondents,
}

impl Default for TargetPolicy {
    fn default() -> TargetPolicy {
        TargetPolicy::AllowListOnly
    }
}

/// The parameters of one view request.
#[derive(Debug, Clone)]
pub struct ViewParams {
    /// Identity keys the user chose to display.
    pub allow_list: HashSet<String>,
    /// Highest rank kept in the view. Out-of-range values are accepted:
    /// zero filters every edge out, large values include everything.
    pub max_rank: u32,
    pub target_policy: TargetPolicy,
}

impl ViewParams {
    pub fn new(allow_list: HashSet<String>, max_rank: u32) -> ViewParams {
        ViewParams {
            allow_list,
            max_rank,
            target_policy: TargetPolicy::default(),
        }
    }
}

// ******** Output data structures *********

/// A node of the built graph, annotated for display.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct NodeInfo {
    pub identity: String,
    /// Cohort label, absent for non-respondent nodes.
    pub group: Option<String>,
    /// False when the node only exists as someone's preference target.
    pub respondent: bool,
    /// In-degree within the current filtered view.
    pub in_degree: u32,
}

/// A directed edge of the built graph.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct EdgeInfo {
    pub source: String,
    pub target: String,
    pub rank: u32,
    /// True when the reverse edge survived the same threshold.
    pub mutual: bool,
}

/// The graph built for one view request.
///
/// Nodes, edges and mutual pairs are sorted, so two builds from the same
/// inputs compare equal. An empty sociogram is the regular "nothing to
/// display" state, not an error.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Sociogram {
    pub nodes: Vec<NodeInfo>,
    pub edges: Vec<EdgeInfo>,
    /// Each mutual pair exactly once, in canonical (sorted) order.
    pub mutual_pairs: Vec<(String, String)>,
}

impl Sociogram {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, identity: &str) -> Option<&NodeInfo> {
        self.nodes.iter().find(|n| n.identity == identity)
    }

    pub fn has_edge(&self, source: &str, target: &str) -> bool {
        self.edges
            .iter()
            .any(|e| e.source == source && e.target == target)
    }

    /// Count of edges terminating at the identity, recomputed from the
    /// current edge set on every call.
    pub fn in_degree(&self, identity: &str) -> u32 {
        self.edges.iter().filter(|e| e.target == identity).count() as u32
    }

    pub fn mutual_pair_count(&self) -> usize {
        self.mutual_pairs.len()
    }
}

/// Display classification of a node by its in-degree.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum PopularityTier {
    Standard,
    Popular,
    Star,
}

pub fn popularity_tier(in_degree: u32) -> PopularityTier {
    if in_degree >= STAR_MIN_IN_DEGREE {
        PopularityTier::Star
    } else if in_degree >= POPULAR_MIN_IN_DEGREE {
        PopularityTier::Popular
    } else {
        PopularityTier::Standard
    }
}

/// Errors surfaced by the record-building API.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum SociometryErrors {
    MissingRespondentName,
}

impl Error for SociometryErrors {}

impl Display for SociometryErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SociometryErrors::MissingRespondentName => {
                write!(f, "survey record has no respondent name")
            }
        }
    }
}
