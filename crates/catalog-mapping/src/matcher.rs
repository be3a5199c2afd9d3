//! One-to-one field matching between two flattened catalogs
//!
//! Strategies run in order until either side is exhausted:
//!
//! 1. exact canonical path, confidence 1.0
//! 2. normalized leaf name, confidence 0.8
//! 3. an optional [`SemanticRanker`], consulted in fixed-size batches
//! 4. a final normalized-name pass over whatever is left
//!
//! Fields are tracked by their index in the input slices, so a target is
//! never claimed twice and a source never appears in two matches.

use crate::strategy::{RankedCandidate, SemanticRanker};
use catalog_model::{Field, canonical_path, normalize_name};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use tracing::{debug, info, trace, warn};

/// Matcher tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// Source fields sent to the ranker per call
    pub batch_size: usize,
    /// Ranked candidates below this confidence are ignored
    pub min_semantic_confidence: f64,
    pub exact_confidence: f64,
    pub name_confidence: f64,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            batch_size: 20,
            min_semantic_confidence: 0.7,
            exact_confidence: 1.0,
            name_confidence: 0.8,
        }
    }
}

/// Strategy that produced a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchStrategy {
    ExactPath,
    NormalizedName,
    Semantic,
}

impl MatchStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStrategy::ExactPath => "exact-path",
            MatchStrategy::NormalizedName => "normalized-name",
            MatchStrategy::Semantic => "semantic",
        }
    }
}

impl fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A source field paired with a target field
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMatch<'a> {
    pub source_index: usize,
    pub target_index: usize,
    pub source: &'a Field,
    pub target: &'a Field,
    pub confidence: f64,
    pub strategy: MatchStrategy,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub justification: String,
}

/// Counts of a match run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSummary {
    pub matched: usize,
    pub source_only: usize,
    pub target_only: usize,
}

/// Outcome of matching two field lists
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchReport<'a> {
    /// Matches ordered by source position
    pub matches: Vec<FieldMatch<'a>>,
    /// Unmatched source fields in source order
    pub source_only: Vec<&'a Field>,
    /// Unmatched target fields in target order
    pub target_only: Vec<&'a Field>,
    /// Whether a ranker was consulted
    pub semantic_used: bool,
    /// Ranker calls that failed and fell back to path and name matching
    pub semantic_failures: usize,
}

impl<'a> MatchReport<'a> {
    pub fn summary(&self) -> MatchSummary {
        MatchSummary {
            matched: self.matches.len(),
            source_only: self.source_only.len(),
            target_only: self.target_only.len(),
        }
    }

    /// Match claimed by the source field at `index`
    pub fn match_for_source(&self, index: usize) -> Option<&FieldMatch<'a>> {
        self.matches.iter().find(|m| m.source_index == index)
    }

    pub fn count_by_strategy(&self, strategy: MatchStrategy) -> usize {
        self.matches.iter().filter(|m| m.strategy == strategy).count()
    }
}

/// Pairs source fields with target fields
pub struct FieldMatcher<'r> {
    config: MatcherConfig,
    ranker: Option<&'r dyn SemanticRanker>,
}

impl<'r> FieldMatcher<'r> {
    pub fn new() -> Self {
        Self {
            config: MatcherConfig::default(),
            ranker: None,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: MatcherConfig) -> Self {
        self.config = config;
        self
    }

    /// Enable the semantic strategy
    #[must_use]
    pub fn with_ranker(mut self, ranker: &'r dyn SemanticRanker) -> Self {
        self.ranker = Some(ranker);
        self
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Match `sources` against `targets`
    pub fn match_fields<'a>(&self, sources: &'a [Field], targets: &'a [Field]) -> MatchReport<'a> {
        let mut state = MatchState::new(sources, targets);
        let all: Vec<usize> = (0..sources.len()).collect();

        self.exact_pass(&mut state, &all);
        self.name_pass(&mut state, &all);

        let mut semantic_failures = 0;
        if let Some(ranker) = self.ranker {
            semantic_failures = self.semantic_pass(&mut state, ranker);
        }

        self.name_pass(&mut state, &all);

        let report = state.into_report(self.ranker.is_some(), semantic_failures);
        info!(
            matched = report.matches.len(),
            source_only = report.source_only.len(),
            target_only = report.target_only.len(),
            semantic = report.semantic_used,
            "Field matching complete"
        );
        report
    }

    fn exact_pass(&self, state: &mut MatchState<'_>, pending: &[usize]) {
        let mut found = 0;
        for &source in pending {
            if state.exhausted() {
                break;
            }
            if state.source_matched(source) {
                continue;
            }
            let key = state.sources[source].canonical_path();
            let target = state.by_path.get(&key).and_then(|candidates| {
                candidates
                    .iter()
                    .copied()
                    .find(|t| !state.claimed.contains(t))
            });
            if let Some(target) = target {
                state.claim(
                    source,
                    target,
                    self.config.exact_confidence,
                    MatchStrategy::ExactPath,
                    String::new(),
                );
                found += 1;
            }
        }
        debug!(found, "Exact path pass");
    }

    fn name_pass(&self, state: &mut MatchState<'_>, pending: &[usize]) {
        let mut found = 0;
        for &source in pending {
            if state.exhausted() {
                break;
            }
            if state.source_matched(source) {
                continue;
            }
            let key = normalize_name(&state.sources[source].name);
            let target = state.by_name.get(&key).and_then(|candidates| {
                candidates
                    .iter()
                    .copied()
                    .find(|t| !state.claimed.contains(t))
            });
            if let Some(target) = target {
                state.claim(
                    source,
                    target,
                    self.config.name_confidence,
                    MatchStrategy::NormalizedName,
                    String::new(),
                );
                found += 1;
            }
        }
        debug!(found, "Normalized name pass");
    }

    /// Consult the ranker batch by batch; returns the number of failed calls
    fn semantic_pass(&self, state: &mut MatchState<'_>, ranker: &dyn SemanticRanker) -> usize {
        let pending: Vec<usize> = (0..state.sources.len())
            .filter(|&i| !state.source_matched(i))
            .collect();
        let targets: Vec<&Field> = state.targets.iter().collect();
        let mut failures = 0;

        for batch in pending.chunks(self.config.batch_size.max(1)) {
            if state.exhausted() {
                break;
            }
            let fields: Vec<&Field> = batch.iter().map(|&i| &state.sources[i]).collect();

            match ranker.rank(&fields, &targets) {
                Ok(candidates) => {
                    debug!(
                        batch = batch.len(),
                        candidates = candidates.len(),
                        "Semantic candidates received"
                    );
                    self.apply_candidates(state, batch, candidates);
                }
                Err(err) => {
                    warn!(
                        error = %err,
                        batch = batch.len(),
                        "Semantic ranking failed, falling back to path and name matching"
                    );
                    failures += 1;
                    self.exact_pass(state, batch);
                    self.name_pass(state, batch);
                }
            }
        }

        failures
    }

    fn apply_candidates(
        &self,
        state: &mut MatchState<'_>,
        batch: &[usize],
        candidates: Vec<RankedCandidate>,
    ) {
        for candidate in candidates {
            if candidate.confidence.is_nan()
                || candidate.confidence < self.config.min_semantic_confidence
            {
                trace!(
                    source = %candidate.source_path,
                    confidence = candidate.confidence,
                    "Discarding low-confidence candidate"
                );
                continue;
            }

            let source = find_by_path(
                state.sources,
                batch.iter().copied().filter(|&i| !state.source_matched(i)),
                &candidate.source_path,
            );
            let target = find_by_path(
                state.targets,
                (0..state.targets.len()).filter(|i| !state.claimed.contains(i)),
                &candidate.target_path,
            );

            match (source, target) {
                (Some(source), Some(target)) => {
                    state.claim(
                        source,
                        target,
                        candidate.confidence.min(1.0),
                        MatchStrategy::Semantic,
                        candidate.justification,
                    );
                }
                _ => trace!(
                    source_path = %candidate.source_path,
                    target_path = %candidate.target_path,
                    "Candidate does not resolve to unclaimed fields"
                ),
            }
        }
    }
}

impl Default for FieldMatcher<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// Match with the default configuration and no ranker
pub fn match_fields<'a>(sources: &'a [Field], targets: &'a [Field]) -> MatchReport<'a> {
    FieldMatcher::new().match_fields(sources, targets)
}

/// First available field whose canonical path equals `path`, else whose name equals it
fn find_by_path(
    fields: &[Field],
    mut available: impl Iterator<Item = usize> + Clone,
    path: &str,
) -> Option<usize> {
    let wanted = canonical_path(path);
    if let Some(index) = available
        .clone()
        .find(|&i| fields[i].canonical_path() == wanted)
    {
        return Some(index);
    }
    let name = path.trim();
    available.find(|&i| fields[i].name == name)
}

struct MatchState<'a> {
    sources: &'a [Field],
    targets: &'a [Field],
    by_path: HashMap<String, Vec<usize>>,
    by_name: HashMap<String, Vec<usize>>,
    matches: BTreeMap<usize, FieldMatch<'a>>,
    claimed: HashSet<usize>,
}

impl<'a> MatchState<'a> {
    fn new(sources: &'a [Field], targets: &'a [Field]) -> Self {
        let mut by_path: HashMap<String, Vec<usize>> = HashMap::new();
        let mut by_name: HashMap<String, Vec<usize>> = HashMap::new();
        for (index, target) in targets.iter().enumerate() {
            by_path.entry(target.canonical_path()).or_default().push(index);
            by_name.entry(normalize_name(&target.name)).or_default().push(index);
        }

        Self {
            sources,
            targets,
            by_path,
            by_name,
            matches: BTreeMap::new(),
            claimed: HashSet::new(),
        }
    }

    fn source_matched(&self, source: usize) -> bool {
        self.matches.contains_key(&source)
    }

    fn exhausted(&self) -> bool {
        self.matches.len() == self.sources.len() || self.claimed.len() == self.targets.len()
    }

    fn claim(
        &mut self,
        source: usize,
        target: usize,
        confidence: f64,
        strategy: MatchStrategy,
        justification: String,
    ) -> bool {
        if self.source_matched(source) || self.claimed.contains(&target) {
            return false;
        }
        let (sources, targets) = (self.sources, self.targets);
        self.claimed.insert(target);
        self.matches.insert(
            source,
            FieldMatch {
                source_index: source,
                target_index: target,
                source: &sources[source],
                target: &targets[target],
                confidence,
                strategy,
                justification,
            },
        );
        true
    }

    fn into_report(self, semantic_used: bool, semantic_failures: usize) -> MatchReport<'a> {
        let (sources, targets) = (self.sources, self.targets);
        let source_only = sources
            .iter()
            .enumerate()
            .filter(|(i, _)| !self.matches.contains_key(i))
            .map(|(_, field)| field)
            .collect();
        let target_only = targets
            .iter()
            .enumerate()
            .filter(|(i, _)| !self.claimed.contains(i))
            .map(|(_, field)| field)
            .collect();

        MatchReport {
            matches: self.matches.into_values().collect(),
            source_only,
            target_only,
            semantic_used,
            semantic_failures,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::RankError;
    use catalog_model::Cardinality;
    use std::cell::RefCell;

    fn field(path: &str) -> Field {
        let name = path.rsplit(&['/', '.'][..]).next().unwrap_or(path);
        Field::new(name, path, "string", Cardinality::required())
    }

    fn fields(paths: &[&str]) -> Vec<Field> {
        paths.iter().map(|p| field(p)).collect()
    }

    /// Ranker returning canned candidates and recording batch sizes
    struct ScriptedRanker {
        candidates: Vec<RankedCandidate>,
        fail: bool,
        calls: RefCell<Vec<usize>>,
    }

    impl ScriptedRanker {
        fn new(candidates: Vec<RankedCandidate>) -> Self {
            Self {
                candidates,
                fail: false,
                calls: RefCell::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::new(Vec::new())
            }
        }
    }

    impl SemanticRanker for ScriptedRanker {
        fn rank(
            &self,
            sources: &[&Field],
            _targets: &[&Field],
        ) -> std::result::Result<Vec<RankedCandidate>, RankError> {
            self.calls.borrow_mut().push(sources.len());
            if self.fail {
                return Err(RankError("service unavailable".to_string()));
            }
            Ok(self.candidates.clone())
        }
    }

    fn assert_one_to_one(report: &MatchReport<'_>) {
        let sources: HashSet<usize> = report.matches.iter().map(|m| m.source_index).collect();
        let targets: HashSet<usize> = report.matches.iter().map(|m| m.target_index).collect();
        assert_eq!(sources.len(), report.matches.len());
        assert_eq!(targets.len(), report.matches.len());
    }

    #[test]
    fn test_exact_path_across_separators() {
        let sources = fields(&["GrpHdr/MsgId", "GrpHdr/CreDtTm"]);
        let targets = fields(&["GrpHdr.CreDtTm", "GrpHdr.MsgId"]);

        let report = match_fields(&sources, &targets);
        assert_eq!(report.summary(), MatchSummary { matched: 2, source_only: 0, target_only: 0 });
        for m in &report.matches {
            assert_eq!(m.strategy, MatchStrategy::ExactPath);
            assert_eq!(m.confidence, 1.0);
        }
        assert_eq!(report.match_for_source(0).unwrap().target_index, 1);
    }

    #[test]
    fn test_normalized_name_match() {
        let sources = fields(&["GrpHdr/NbOfTxs"]);
        let targets = fields(&["Header.nb_of_txs"]);

        let report = match_fields(&sources, &targets);
        assert_eq!(report.matches.len(), 1);
        assert_eq!(report.matches[0].strategy, MatchStrategy::NormalizedName);
        assert_eq!(report.matches[0].confidence, 0.8);
    }

    #[test]
    fn test_target_never_claimed_twice() {
        let sources = fields(&["Dbtr/Nm", "Cdtr/Nm", "InitgPty/Nm"]);
        let targets = fields(&["Party.Nm"]);

        let report = match_fields(&sources, &targets);
        assert_eq!(report.summary(), MatchSummary { matched: 1, source_only: 2, target_only: 0 });
        assert_one_to_one(&report);
    }

    #[test]
    fn test_exact_path_wins_over_earlier_name_match() {
        let sources = fields(&["Other/Nm", "Pty/Nm"]);
        let targets = fields(&["Pty.Nm"]);

        let report = match_fields(&sources, &targets);
        let matched = &report.matches[0];
        assert_eq!(matched.source_index, 1);
        assert_eq!(matched.strategy, MatchStrategy::ExactPath);
    }

    #[test]
    fn test_repeated_paths_pair_in_order() {
        let sources = fields(&["Tx/Amt", "Tx/Amt"]);
        let targets = fields(&["Tx.Amt", "Tx.Amt"]);

        let report = match_fields(&sources, &targets);
        assert_eq!(report.matches.len(), 2);
        assert_eq!(report.matches[0].target_index, 0);
        assert_eq!(report.matches[1].target_index, 1);
    }

    #[test]
    fn test_semantic_candidates_filtered_and_deconflicted() {
        let sources = fields(&["GrpHdr/MsgId", "GrpHdr/CreDtTm", "PmtInf/ReqdExctnDt"]);
        let targets = fields(&["header.message_identification", "header.created_at", "payment.execution_date"]);
        let ranker = ScriptedRanker::new(vec![
            RankedCandidate::new("GrpHdr/MsgId", "header.message_identification", 0.95),
            // Target already taken by the first candidate
            RankedCandidate::new("GrpHdr/CreDtTm", "header.message_identification", 0.9),
            // Below the acceptance threshold
            RankedCandidate::new("PmtInf/ReqdExctnDt", "payment.execution_date", 0.5),
            RankedCandidate::new("GrpHdr/CreDtTm", "header.created_at", 1.4)
                .with_justification("creation timestamp"),
            RankedCandidate::new("Nowhere/Id", "header.created_at", 0.99),
        ]);

        let report = FieldMatcher::new().with_ranker(&ranker).match_fields(&sources, &targets);

        assert_eq!(report.summary(), MatchSummary { matched: 2, source_only: 1, target_only: 1 });
        assert_one_to_one(&report);
        assert_eq!(report.count_by_strategy(MatchStrategy::Semantic), 2);

        let created = report.match_for_source(1).unwrap();
        assert_eq!(created.target_index, 1);
        assert_eq!(created.confidence, 1.0);
        assert_eq!(created.justification, "creation timestamp");
        assert_eq!(report.source_only[0].path, "PmtInf/ReqdExctnDt");
    }

    #[test]
    fn test_semantic_only_sees_unmatched_sources_in_batches() {
        let sources = fields(&["A/Id", "B/x1", "B/x2", "B/x3", "B/x4", "B/x5"]);
        let targets = fields(&["A.Id", "Z.y"]);
        let ranker = ScriptedRanker::new(Vec::new());
        let config = MatcherConfig {
            batch_size: 2,
            ..Default::default()
        };

        let report = FieldMatcher::new()
            .with_config(config)
            .with_ranker(&ranker)
            .match_fields(&sources, &targets);

        assert_eq!(*ranker.calls.borrow(), vec![2, 2, 1]);
        assert!(report.semantic_used);
        assert_eq!(report.matches.len(), 1);
    }

    #[test]
    fn test_ranker_failure_falls_back() {
        let sources = fields(&["GrpHdr/MsgId", "GrpHdr/Extra"]);
        let targets = fields(&["GrpHdr.MsgId", "Other.Thing"]);
        let ranker = ScriptedRanker::failing();

        let report = FieldMatcher::new().with_ranker(&ranker).match_fields(&sources, &targets);

        assert_eq!(report.semantic_failures, 1);
        assert_eq!(report.summary(), MatchSummary { matched: 1, source_only: 1, target_only: 1 });
        assert_eq!(report.matches[0].strategy, MatchStrategy::ExactPath);
    }

    #[test]
    fn test_ranker_skipped_when_targets_exhausted() {
        let sources = fields(&["A/Id", "B/Other"]);
        let targets = fields(&["A.Id"]);
        let ranker = ScriptedRanker::new(Vec::new());

        FieldMatcher::new().with_ranker(&ranker).match_fields(&sources, &targets);
        assert!(ranker.calls.borrow().is_empty());
    }

    #[test]
    fn test_empty_inputs() {
        let sources = fields(&["A/Id"]);
        let report = match_fields(&sources, &[]);
        assert_eq!(report.summary(), MatchSummary { matched: 0, source_only: 1, target_only: 0 });

        let report = match_fields(&[], &sources);
        assert_eq!(report.summary(), MatchSummary { matched: 0, source_only: 0, target_only: 1 });
    }

    #[test]
    fn test_candidate_resolves_by_name() {
        let sources = fields(&["GrpHdr/MsgId"]);
        let targets = fields(&["hdr.identifier"]);
        let ranker = ScriptedRanker::new(vec![RankedCandidate::new("MsgId", "identifier", 0.8)]);

        let report = FieldMatcher::new().with_ranker(&ranker).match_fields(&sources, &targets);
        assert_eq!(report.count_by_strategy(MatchStrategy::Semantic), 1);
    }
}
