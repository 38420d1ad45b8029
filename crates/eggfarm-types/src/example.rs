use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fingerprint::{content_hash, example_id};
use crate::skill::Skill;

/// One labeled input/output pair inside an egg.
///
/// Examples are never modified once created, so the fields are only
/// reachable through accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingExample {
    id: String,
    timestamp: DateTime<Utc>,
    input: String,
    output: String,
    quality_score: f64,
    skill_tags: Vec<String>,
    user_feedback: Option<String>,
    token_count: usize,
}

impl TrainingExample {
    /// Create an example stamped with `timestamp`.
    ///
    /// Duplicate skill tags are dropped, keeping the first occurrence.
    pub fn new(
        input: impl Into<String>,
        output: impl Into<String>,
        skill_tags: &[String],
        quality_score: f64,
        user_feedback: Option<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let input = input.into();
        let output = output.into();

        let mut tags: Vec<String> = Vec::with_capacity(skill_tags.len());
        for tag in skill_tags {
            if !tags.contains(tag) {
                tags.push(tag.clone());
            }
        }

        Self {
            id: example_id(&input, &output, &timestamp.to_rfc3339()),
            token_count: input.split_whitespace().count() + output.split_whitespace().count(),
            timestamp,
            input,
            output,
            quality_score,
            skill_tags: tags,
            user_feedback,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn quality_score(&self) -> f64 {
        self.quality_score
    }

    pub fn skill_tags(&self) -> &[String] {
        &self.skill_tags
    }

    pub fn user_feedback(&self) -> Option<&str> {
        self.user_feedback.as_deref()
    }

    pub fn token_count(&self) -> usize {
        self.token_count
    }

    /// Tags that name registry skills
    pub fn known_skills(&self) -> impl Iterator<Item = Skill> + '_ {
        self.skill_tags.iter().filter_map(|tag| Skill::from_tag(tag))
    }

    /// Hash of the example's text, used to spot repeated content
    pub fn content_hash(&self) -> String {
        content_hash(&self.input, &self.output)
    }
}
