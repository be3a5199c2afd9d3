//! Pluggable semantic ranking used by the field matcher

use catalog_model::Field;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One proposed pairing returned by a ranker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCandidate {
    #[serde(alias = "xsd_path", alias = "sourcePath")]
    pub source_path: String,
    #[serde(alias = "avro_path", alias = "targetPath")]
    pub target_path: String,
    pub confidence: f64,
    #[serde(default, alias = "reasoning")]
    pub justification: String,
}

impl RankedCandidate {
    pub fn new(source_path: impl Into<String>, target_path: impl Into<String>, confidence: f64) -> Self {
        Self {
            source_path: source_path.into(),
            target_path: target_path.into(),
            confidence,
            justification: String::new(),
        }
    }

    #[must_use]
    pub fn with_justification(mut self, justification: impl Into<String>) -> Self {
        self.justification = justification.into();
        self
    }
}

/// Failure of a ranking call; the matcher recovers from it locally
#[derive(Error, Debug, Clone, PartialEq)]
#[error("semantic ranking failed: {0}")]
pub struct RankError(pub String);

/// External matching strategy.
///
/// Receives a batch of still-unmatched source fields and the full target
/// field list, and proposes candidates by path. The matcher filters,
/// resolves and de-conflicts whatever comes back.
pub trait SemanticRanker {
    fn rank(
        &self,
        sources: &[&Field],
        targets: &[&Field],
    ) -> std::result::Result<Vec<RankedCandidate>, RankError>;
}

impl<R: SemanticRanker + ?Sized> SemanticRanker for &R {
    fn rank(
        &self,
        sources: &[&Field],
        targets: &[&Field],
    ) -> std::result::Result<Vec<RankedCandidate>, RankError> {
        (**self).rank(sources, targets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_accepts_legacy_keys() {
        let candidate: RankedCandidate = serde_json::from_str(
            r#"{"xsd_path":"GrpHdr/MsgId","avro_path":"GrpHdr.MsgId","confidence":0.95,"reasoning":"same id"}"#,
        )
        .unwrap();
        assert_eq!(candidate.source_path, "GrpHdr/MsgId");
        assert_eq!(candidate.target_path, "GrpHdr.MsgId");
        assert_eq!(candidate.justification, "same id");
    }

    #[test]
    fn test_candidate_justification_optional() {
        let candidate: RankedCandidate = serde_json::from_str(
            r#"{"source_path":"A","target_path":"B","confidence":0.7}"#,
        )
        .unwrap();
        assert_eq!(candidate, RankedCandidate::new("A", "B", 0.7));
    }
}
