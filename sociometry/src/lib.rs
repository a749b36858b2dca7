mod config;
pub mod builder;
pub mod manual;
pub mod quick_start;

use log::{debug, info};

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

pub use crate::config::*;

// **** Private structures ****

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
struct StudentId(u32);

// Interns identity keys for the duration of one build. Ids are assigned
// in first-seen order, which the builder keeps deterministic by visiting
// the allow-list sorted.
#[derive(Default)]
struct NameTable {
    ids: HashMap<String, StudentId>,
    names: Vec<String>,
}

impl NameTable {
    fn intern(&mut self, name: &str) -> StudentId {
        if let Some(&id) = self.ids.get(name) {
            return id;
        }
        let id = StudentId(self.names.len() as u32);
        self.names.push(name.to_string());
        self.ids.insert(name.to_string(), id);
        id
    }

    fn name(&self, id: StudentId) -> &str {
        &self.names[id.0 as usize]
    }
}

/// Canonicalizes a raw student name into its identity key.
///
/// Parenthesized annotations are removed, whitespace runs collapse to a
/// single space and the result is upper-cased, so `"Juan Pérez (repite)"`
/// and `"juan   pérez"` map to the same key. Total and idempotent: any
/// input that is empty once cleaned maps to [`UNKNOWN_IDENTITY`].
pub fn normalize_name(raw: &str) -> String {
    let stripped = strip_parenthesized(raw);
    let cleaned = stripped.split_whitespace().collect::<Vec<&str>>().join(" ");
    if cleaned.is_empty() {
        return UNKNOWN_IDENTITY.to_string();
    }
    cleaned.to_uppercase()
}

// Non-greedy removal: each '(' up to the next ')'. An unpaired '(' stays.
fn strip_parenthesized(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(open) = rest.find('(') {
        match rest[open..].find(')') {
            Some(close) => {
                out.push_str(&rest[..open]);
                rest = &rest[open + close + 1..];
            }
            None => break,
        }
    }
    out.push_str(rest);
    out
}

/// Aggregates loaded survey records into the authoritative dataset.
///
/// Records are inserted in order; a later record overwrites an earlier
/// one with the same identity key, so merging several cohorts is just a
/// matter of concatenating their record lists.
pub fn assemble_store(records: &[SurveyRecord]) -> PreferenceStore {
    let mut store = PreferenceStore::new();
    for record in records.iter() {
        store.insert_record(record);
    }
    info!(
        "assemble_store: {} respondents from {} records",
        store.len(),
        records.len()
    );
    store
}

/// Builds the filtered preference graph for one view request.
///
/// Arguments:
/// * `store` the loaded survey dataset
/// * `params` the allow-list, rank threshold and target policy of the view
///
/// Reciprocity is evaluated strictly within the filtered view: an edge is
/// mutual only when its reverse also survived the current threshold, so a
/// threshold change can toggle mutuality and nothing is cached across
/// calls. The build is total; an empty store or allow-list yields an
/// empty graph.
pub fn build_sociogram(store: &PreferenceStore, params: &ViewParams) -> Sociogram {
    info!(
        "build_sociogram: {} respondents, allow-list of {}, max_rank {}, policy {:?}",
        store.len(),
        params.allow_list.len(),
        params.max_rank,
        params.target_policy
    );

    let mut names = NameTable::default();

    // One node per allow-listed identity, visited in sorted order.
    let mut allowed: Vec<String> = params.allow_list.iter().cloned().collect();
    allowed.sort();
    let mut node_ids: BTreeSet<StudentId> = BTreeSet::new();
    for name in allowed.iter() {
        node_ids.insert(names.intern(name));
    }
    let allowed_ids: HashSet<StudentId> = node_ids.iter().cloned().collect();

    // Edge pass.
    let mut edges: BTreeMap<(StudentId, StudentId), u32> = BTreeMap::new();
    for name in allowed.iter() {
        let respondent = match store.get(name) {
            Some(r) => r,
            // Allow-listed but never surveyed: keeps its node, no edges.
            None => continue,
        };
        let source = names.intern(name);
        for (target, &rank) in respondent.preferences.iter() {
            if rank > params.max_rank {
                continue;
            }
            let target_id = names.intern(target);
            if target_id == source {
                // Self-references are dropped.
                continue;
            }
            match params.target_policy {
                TargetPolicy::AllowListOnly if !allowed_ids.contains(&target_id) => continue,
                TargetPolicy::AllowListOnly => {}
                TargetPolicy::IncludeNonRespondents => {
                    node_ids.insert(target_id);
                }
            }
            edges.insert((source, target_id), rank);
        }
    }

    // Mutual pass. Membership of the reverse edge in the same filtered
    // edge set is the whole definition; each unordered pair is recorded
    // once under its canonical ordering.
    let mut mutual_ids: BTreeSet<(StudentId, StudentId)> = BTreeSet::new();
    for &(a, b) in edges.keys() {
        if edges.contains_key(&(b, a)) {
            mutual_ids.insert(if a < b { (a, b) } else { (b, a) });
        }
    }

    // In-degrees within the filtered view only.
    let mut in_degrees: HashMap<StudentId, u32> = HashMap::new();
    for &(_, b) in edges.keys() {
        *in_degrees.entry(b).or_insert(0) += 1;
    }

    let mut nodes: Vec<NodeInfo> = node_ids
        .iter()
        .map(|&id| {
            let name = names.name(id);
            let respondent = store.get(name);
            NodeInfo {
                identity: name.to_string(),
                group: respondent.map(|r| r.group.clone()),
                respondent: respondent.is_some(),
                in_degree: in_degrees.get(&id).cloned().unwrap_or(0),
            }
        })
        .collect();
    nodes.sort_by(|a, b| a.identity.cmp(&b.identity));

    let mut out_edges: Vec<EdgeInfo> = edges
        .iter()
        .map(|(&(a, b), &rank)| EdgeInfo {
            source: names.name(a).to_string(),
            target: names.name(b).to_string(),
            rank,
            mutual: edges.contains_key(&(b, a)),
        })
        .collect();
    out_edges.sort_by(|x, y| {
        (x.source.as_str(), x.target.as_str()).cmp(&(y.source.as_str(), y.target.as_str()))
    });

    let mut mutual_pairs: Vec<(String, String)> = mutual_ids
        .iter()
        .map(|&(a, b)| {
            let na = names.name(a).to_string();
            let nb = names.name(b).to_string();
            if na <= nb {
                (na, nb)
            } else {
                (nb, na)
            }
        })
        .collect();
    mutual_pairs.sort();

    debug!(
        "build_sociogram: {} nodes, {} edges, {} mutual pairs",
        nodes.len(),
        out_edges.len(),
        mutual_pairs.len()
    );

    Sociogram {
        nodes,
        edges: out_edges,
        mutual_pairs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, group: &str, prefs: &[(&str, &str)]) -> SurveyRecord {
        SurveyRecord {
            name: name.to_string(),
            group: group.to_string(),
            rankings: prefs
                .iter()
                .map(|(t, r)| (t.to_string(), r.to_string()))
                .collect(),
        }
    }

    fn params(allowed: &[&str], max_rank: u32) -> ViewParams {
        ViewParams::new(allowed.iter().map(|s| s.to_string()).collect(), max_rank)
    }

    fn ana_bea_store() -> PreferenceStore {
        assemble_store(&[
            record("Ana", "C1", &[("Bea", "1")]),
            record("Bea", "C1", &[("Ana", "1")]),
        ])
    }

    #[test]
    fn normalize_is_idempotent() {
        let samples = [
            "",
            "   ",
            "Juan Pérez (repite)",
            "juan   pérez",
            "(absent)",
            "a(b)c(d",
            "ANA",
            "Ana María (nueva) López",
        ];
        for raw in samples.iter() {
            let once = normalize_name(raw);
            assert_eq!(normalize_name(&once), once, "input {:?}", raw);
        }
    }

    #[test]
    fn normalize_merges_case_space_and_annotations() {
        assert_eq!(normalize_name("Juan Pérez (repite)"), "JUAN PÉREZ");
        assert_eq!(normalize_name("juan   pérez"), "JUAN PÉREZ");
        assert_eq!(normalize_name(" ana "), "ANA");
    }

    #[test]
    fn normalize_empty_inputs_map_to_unknown() {
        assert_eq!(normalize_name(""), UNKNOWN_IDENTITY);
        assert_eq!(normalize_name("   "), UNKNOWN_IDENTITY);
        assert_eq!(normalize_name("(solo anotación)"), UNKNOWN_IDENTITY);
    }

    #[test]
    fn normalize_keeps_unpaired_parenthesis() {
        // Parity with non-greedy regex stripping.
        assert_eq!(normalize_name("a(b)c(d"), "AC(D");
        assert_eq!(normalize_name("a(b(c)d)"), "AD)");
    }

    #[test]
    fn malformed_rank_is_coerced_to_sentinel() {
        let store = assemble_store(&[record("Ana", "C1", &[("Bea", "primera")])]);
        let prefs = &store.get("ANA").unwrap().preferences;
        assert_eq!(prefs.get("BEA"), Some(&RANK_SENTINEL));

        // The sentinel keeps the edge out of any strict view but a very
        // permissive threshold still shows it.
        let g = build_sociogram(&store, &params(&["ANA", "BEA"], DEFAULT_MAX_RANK));
        assert!(g.edges.is_empty());
        let g = build_sociogram(&store, &params(&["ANA", "BEA"], RANK_SENTINEL));
        assert!(g.has_edge("ANA", "BEA"));
    }

    #[test]
    fn reload_overwrites_previous_record() {
        let store = assemble_store(&[
            record("Ana", "C1", &[("Bea", "1"), ("Carla", "2")]),
            record("ana  (repite)", "C2", &[("Dora", "1")]),
        ]);
        assert_eq!(store.len(), 1);
        let r = store.get("ANA").unwrap();
        assert_eq!(r.group, "C2");
        assert_eq!(r.preferences.len(), 1);
        assert_eq!(r.preferences.get("DORA"), Some(&1));
    }

    #[test]
    fn mutual_pair_detected_once() {
        // Scenario A.
        let g = build_sociogram(&ana_bea_store(), &params(&["ANA", "BEA"], 10));
        assert_eq!(g.nodes.len(), 2);
        assert_eq!(g.edges.len(), 2);
        assert_eq!(g.mutual_pair_count(), 1);
        assert_eq!(
            g.mutual_pairs,
            vec![("ANA".to_string(), "BEA".to_string())]
        );
        assert_eq!(g.in_degree("ANA"), 1);
        assert_eq!(g.in_degree("BEA"), 1);
    }

    #[test]
    fn zero_threshold_keeps_nodes_drops_edges() {
        // Scenario B.
        let g = build_sociogram(&ana_bea_store(), &params(&["ANA", "BEA"], 0));
        assert_eq!(g.nodes.len(), 2);
        assert!(g.edges.is_empty());
        assert_eq!(g.mutual_pair_count(), 0);
    }

    #[test]
    fn allow_listed_target_without_survey_gets_edge_and_node() {
        // Scenario C: the strict policy checks allow-list membership, not
        // respondent status.
        let store = assemble_store(&[record("Ana", "C1", &[("Carla", "2")])]);
        let g = build_sociogram(&store, &params(&["ANA", "CARLA"], 10));
        assert_eq!(g.nodes.len(), 2);
        let carla = g.node("CARLA").unwrap();
        assert!(!carla.respondent);
        assert_eq!(carla.group, None);
        assert_eq!(g.edges.len(), 1);
        assert!(g.has_edge("ANA", "CARLA"));
        assert!(!g.edges[0].mutual);
        assert_eq!(g.mutual_pair_count(), 0);
    }

    #[test]
    fn strict_policy_drops_targets_outside_allow_list() {
        let store = assemble_store(&[
            record("Ana", "C1", &[("Bea", "1"), ("Carla", "2")]),
            record("Bea", "C1", &[("Ana", "1")]),
            record("Carla", "C1", &[("Ana", "1")]),
        ]);
        let g = build_sociogram(&store, &params(&["ANA", "BEA"], 10));
        assert_eq!(g.nodes.len(), 2);
        assert!(!g.has_edge("ANA", "CARLA"));
        // Carla's own vote for Ana is invisible too: she is filtered out.
        assert_eq!(g.in_degree("ANA"), 1);
    }

    #[test]
    fn loose_policy_adds_non_respondent_targets() {
        let store = assemble_store(&[record("Ana", "C1", &[("Bea", "1"), ("Noa", "2")])]);
        let mut p = params(&["ANA", "BEA"], 10);
        p.target_policy = TargetPolicy::IncludeNonRespondents;
        let g = build_sociogram(&store, &p);
        assert_eq!(g.nodes.len(), 3);
        let noa = g.node("NOA").unwrap();
        assert!(!noa.respondent);
        assert!(g.has_edge("ANA", "NOA"));
        // A one-directional edge to a non-respondent is never mutual.
        assert!(g.edges.iter().all(|e| e.target != "NOA" || !e.mutual));
    }

    #[test]
    fn build_is_deterministic() {
        let store = assemble_store(&[
            record("Ana", "C1", &[("Bea", "1"), ("Carla", "2"), ("Dora", "3")]),
            record("Bea", "C1", &[("Ana", "2"), ("Dora", "1")]),
            record("Carla", "C2", &[("Ana", "1")]),
            record("Dora", "C2", &[("Bea", "1"), ("Ana", "4")]),
        ]);
        let p = params(&["ANA", "BEA", "CARLA", "DORA"], 4);
        let first = build_sociogram(&store, &p);
        let second = build_sociogram(&store, &p);
        assert_eq!(first, second);
    }

    #[test]
    fn mutuality_is_symmetric_and_recorded_once() {
        let store = assemble_store(&[
            record("Ana", "C1", &[("Bea", "1"), ("Carla", "2")]),
            record("Bea", "C1", &[("Ana", "2")]),
            record("Carla", "C1", &[("Ana", "1"), ("Bea", "2")]),
        ]);
        let g = build_sociogram(&store, &params(&["ANA", "BEA", "CARLA"], 10));
        for e in g.edges.iter() {
            if e.mutual {
                let reverse = g
                    .edges
                    .iter()
                    .find(|r| r.source == e.target && r.target == e.source)
                    .expect("reverse edge must exist for a mutual edge");
                assert!(reverse.mutual);
                let key = if e.source <= e.target {
                    (e.source.clone(), e.target.clone())
                } else {
                    (e.target.clone(), e.source.clone())
                };
                assert_eq!(
                    g.mutual_pairs.iter().filter(|p| **p == key).count(),
                    1,
                    "pair {:?} recorded exactly once",
                    key
                );
            }
        }
        assert_eq!(g.mutual_pair_count(), 2);
    }

    #[test]
    fn edge_set_only_shrinks_as_threshold_decreases() {
        let store = assemble_store(&[
            record("Ana", "C1", &[("Bea", "1"), ("Carla", "3")]),
            record("Bea", "C1", &[("Ana", "2"), ("Carla", "1")]),
            record("Carla", "C1", &[("Ana", "3"), ("Bea", "2")]),
        ]);
        let all = ["ANA", "BEA", "CARLA"];
        for k in 1..=4u32 {
            let wide = build_sociogram(&store, &params(&all, k));
            let narrow = build_sociogram(&store, &params(&all, k - 1));
            for e in narrow.edges.iter() {
                assert!(
                    wide.has_edge(&e.source, &e.target),
                    "edge {:?} present at {} but not at {}",
                    e,
                    k - 1,
                    k
                );
            }
            // Pairs mutual in the narrow view stay mutual in the wide one.
            for pair in narrow.mutual_pairs.iter() {
                assert!(wide.mutual_pairs.contains(pair));
            }
        }
    }

    #[test]
    fn threshold_toggles_mutuality() {
        let store = assemble_store(&[
            record("Ana", "C1", &[("Bea", "1")]),
            record("Bea", "C1", &[("Ana", "3")]),
        ]);
        let g3 = build_sociogram(&store, &params(&["ANA", "BEA"], 3));
        assert_eq!(g3.mutual_pair_count(), 1);
        assert!(g3.edges.iter().all(|e| e.mutual));

        let g2 = build_sociogram(&store, &params(&["ANA", "BEA"], 2));
        assert_eq!(g2.mutual_pair_count(), 0);
        assert_eq!(g2.edges.len(), 1);
        assert!(!g2.edges[0].mutual);
    }

    #[test]
    fn in_degree_annotation_matches_recount() {
        let store = assemble_store(&[
            record("Ana", "C1", &[("Bea", "1"), ("Carla", "2")]),
            record("Bea", "C1", &[("Carla", "1")]),
            record("Carla", "C1", &[("Bea", "1")]),
        ]);
        let g = build_sociogram(&store, &params(&["ANA", "BEA", "CARLA"], 10));
        for n in g.nodes.iter() {
            assert_eq!(n.in_degree, g.in_degree(&n.identity));
        }
        assert_eq!(g.in_degree("CARLA"), 2);
        assert_eq!(g.in_degree("ANA"), 0);
    }

    #[test]
    fn empty_inputs_yield_empty_graph() {
        let empty = PreferenceStore::new();
        let g = build_sociogram(&empty, &params(&[], 10));
        assert!(g.is_empty());
        assert!(g.edges.is_empty());
        assert_eq!(g.mutual_pair_count(), 0);

        // An empty allow-list over a loaded store is just as valid.
        let g = build_sociogram(&ana_bea_store(), &params(&[], 10));
        assert!(g.is_empty());
    }

    #[test]
    fn self_references_are_dropped() {
        let store = assemble_store(&[record("Ana", "C1", &[("Ana", "1"), ("Bea", "2")])]);
        let g = build_sociogram(&store, &params(&["ANA", "BEA"], 10));
        assert!(!g.has_edge("ANA", "ANA"));
        assert_eq!(g.edges.len(), 1);
        assert_eq!(g.mutual_pair_count(), 0);
    }

    #[test]
    fn popularity_tiers_follow_fixed_thresholds() {
        assert_eq!(popularity_tier(0), PopularityTier::Standard);
        assert_eq!(popularity_tier(2), PopularityTier::Standard);
        assert_eq!(popularity_tier(3), PopularityTier::Popular);
        assert_eq!(popularity_tier(4), PopularityTier::Popular);
        assert_eq!(popularity_tier(5), PopularityTier::Star);
        assert_eq!(popularity_tier(12), PopularityTier::Star);
    }
}
