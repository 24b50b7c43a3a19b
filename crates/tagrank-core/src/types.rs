//! Core types for the affinity engine
//!
//! Defines the identifiers and payloads exchanged with the request layer:
//! - User, poll, and answer identifiers
//! - Poll detail as returned by the poll directory
//! - Recommendation payload

use serde::{Deserialize, Serialize};
use tagrank_vector::TagId;

/// Unique user (account) identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl From<u64> for UserId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique poll identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PollId(pub u64);

impl From<u64> for PollId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl std::fmt::Display for PollId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique answer (poll option) identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerId(pub u64);

impl From<u64> for AnswerId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl std::fmt::Display for AnswerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Current popularity of one tag attached to a poll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagPopularity {
    /// Tag
    pub tag: TagId,
    /// Number of polls created with this tag
    pub popularity: u64,
}

impl TagPopularity {
    /// Create new popularity entry
    #[inline]
    #[must_use]
    pub fn new(tag: TagId, popularity: u64) -> Self {
        Self { tag, popularity }
    }
}

/// Full poll detail, as produced by the poll directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollDetail {
    /// Poll id
    pub id: PollId,
    /// Title
    pub title: String,
    /// Description
    pub description: String,
    /// Poll type label (single choice, multiple choice, ...)
    #[serde(rename = "type")]
    pub kind: String,
    /// Author account
    pub author_id: UserId,
    /// Selectable answers
    pub answer_ids: Vec<AnswerId>,
    /// Attached tags
    pub tag_ids: Vec<TagId>,
}

/// Recommended poll together with the answers the user already selected
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendedPoll {
    /// Poll detail
    #[serde(flatten)]
    pub poll: PollDetail,
    /// Answers already selected by the requesting user
    pub answered: Vec<AnswerId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recommended_poll_flattens_detail() {
        let payload = RecommendedPoll {
            poll: PollDetail {
                id: PollId(4),
                title: "Tabs or spaces?".to_string(),
                description: String::new(),
                kind: "single".to_string(),
                author_id: UserId(2),
                answer_ids: vec![AnswerId(10), AnswerId(11)],
                tag_ids: vec![TagId(1)],
            },
            answered: vec![],
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["id"], 4);
        assert_eq!(json["type"], "single");
        assert_eq!(json["authorId"], 2);
        assert_eq!(json["answerIds"], serde_json::json!([10, 11]));
        assert_eq!(json["answered"], serde_json::json!([]));
    }
}
