//! Skill keyword registry
//!
//! Each registry skill owns a keyword list. Detection is a substring match on
//! lower-cased text: coarse and biased toward recall. A false positive only
//! adds one more quality-gated example to an egg.

use std::collections::{BTreeMap, HashMap};

use eggfarm_types::Skill;
use thiserror::Error;
use tracing::debug;

/// Default keyword table
const DEFAULT_PATTERNS: [(Skill, &[&str]); 7] = [
    (
        Skill::AcademicWriting,
        &[
            "academic",
            "formal",
            "professional",
            "research",
            "methodology",
            "implementation",
            "results",
            "analysis",
            "conclusion",
            "bibliography",
        ],
    ),
    (
        Skill::IeeeFormatting,
        &[
            "ieee",
            "citation",
            "reference",
            "table",
            "figure",
            "equation",
            "bibliography",
            "standard",
            "format",
        ],
    ),
    (
        Skill::AntiAiPatterns,
        &[
            "authentic",
            "human",
            "natural",
            "conversational",
            "personal",
            "experience",
            "actually",
            "really",
            "honestly",
        ],
    ),
    (
        Skill::ContentTransformation,
        &[
            "bullet",
            "list",
            "transform",
            "structure",
            "organize",
            "prose",
            "narrative",
            "flow",
            "coherent",
        ],
    ),
    (
        Skill::VoiceMimicry,
        &[
            "voice",
            "style",
            "tone",
            "personality",
            "characteristic",
            "manner",
            "approach",
            "perspective",
        ],
    ),
    (
        Skill::TechnicalDocumentation,
        &[
            "technical",
            "documentation",
            "specification",
            "api",
            "code",
            "implementation",
            "system",
            "architecture",
            "design",
        ],
    ),
    (
        Skill::ResearchSynthesis,
        &[
            "synthesis",
            "analysis",
            "comparison",
            "evaluation",
            "review",
            "literature",
            "sources",
            "materials",
            "findings",
        ],
    ),
];

/// A keyword table that cannot be used for detection
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkillTableError {
    /// Override names a skill outside the registry
    #[error("unknown skill '{0}' in keyword table")]
    UnknownSkill(String),

    /// Skill has no keywords, so it could never be detected
    #[error("skill '{0}' has no keywords")]
    EmptyPatterns(Skill),

    /// Keyword is empty after trimming, so it would match everything
    #[error("skill '{0}' has a blank keyword")]
    BlankPattern(Skill),
}

/// Keyword tables for every registry skill
#[derive(Debug, Clone)]
pub struct SkillRegistry {
    patterns: BTreeMap<Skill, Vec<String>>,
}

impl SkillRegistry {
    /// Registry with the built-in keyword table
    #[must_use]
    pub fn new() -> Self {
        let patterns = DEFAULT_PATTERNS
            .iter()
            .map(|(skill, words)| (*skill, words.iter().map(|w| (*w).to_string()).collect()))
            .collect();
        Self { patterns }
    }

    /// Built-in table with some skills' keyword lists replaced.
    ///
    /// Keys are skill identifiers such as `voice_mimicry`. Every resulting
    /// list must be non-empty and free of blank keywords.
    pub fn with_overrides(
        overrides: &HashMap<String, Vec<String>>,
    ) -> Result<Self, SkillTableError> {
        let mut registry = Self::new();

        for (name, words) in overrides {
            let skill = Skill::from_tag(name)
                .ok_or_else(|| SkillTableError::UnknownSkill(name.clone()))?;
            let words = words.iter().map(|w| w.trim().to_lowercase()).collect();
            debug!(skill = %skill, "Overriding skill keywords");
            registry.patterns.insert(skill, words);
        }

        registry.validate()?;
        Ok(registry)
    }

    fn validate(&self) -> Result<(), SkillTableError> {
        for (skill, words) in &self.patterns {
            if words.is_empty() {
                return Err(SkillTableError::EmptyPatterns(*skill));
            }
            if words.iter().any(String::is_empty) {
                return Err(SkillTableError::BlankPattern(*skill));
            }
        }
        Ok(())
    }

    /// Keywords for one skill
    #[must_use]
    pub fn patterns(&self, skill: Skill) -> &[String] {
        self.patterns.get(&skill).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Matches a skill needs: a fifth of its keywords, rounded up, at least one
    #[must_use]
    pub fn required_matches(&self, skill: Skill) -> usize {
        self.patterns(skill).len().div_ceil(5).max(1)
    }

    /// Skills whose keywords appear often enough in `text`, in registry order
    #[must_use]
    pub fn detect(&self, text: &str) -> Vec<Skill> {
        let text = text.to_lowercase();

        self.patterns
            .iter()
            .filter(|(skill, words)| {
                let matches = words.iter().filter(|w| text.contains(w.as_str())).count();
                matches >= self.required_matches(**skill)
            })
            .map(|(skill, _)| *skill)
            .collect()
    }
}

impl Default for SkillRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_covers_registry() {
        let registry = SkillRegistry::new();
        for skill in Skill::ALL {
            assert!(!registry.patterns(skill).is_empty());
        }
        assert!(registry.validate().is_ok());
    }

    #[test]
    fn test_required_matches() {
        let registry = SkillRegistry::new();
        assert_eq!(registry.required_matches(Skill::AcademicWriting), 2);
        assert_eq!(registry.required_matches(Skill::VoiceMimicry), 2);
        assert_eq!(registry.required_matches(Skill::IeeeFormatting), 2);
    }

    #[test]
    fn test_detect_is_case_insensitive() {
        let registry = SkillRegistry::new();
        let detected = registry.detect("See TABLE 2 and the IEEE citation style");
        assert!(detected.contains(&Skill::IeeeFormatting));
    }

    #[test]
    fn test_single_keyword_is_not_enough() {
        let registry = SkillRegistry::new();
        assert_eq!(registry.detect("an academic remark"), Vec::<Skill>::new());
    }

    #[test]
    fn test_detect_multiple_skills() {
        let registry = SkillRegistry::new();
        let detected = registry.detect(
            "A formal methodology section, then a literature review and comparison of sources",
        );
        assert_eq!(
            detected,
            vec![Skill::AcademicWriting, Skill::ResearchSynthesis]
        );
    }

    #[test]
    fn test_overrides_replace_keywords() {
        let mut overrides = HashMap::new();
        overrides.insert("voice_mimicry".to_string(), vec!["Snark".to_string()]);

        let registry = SkillRegistry::with_overrides(&overrides).unwrap();
        assert_eq!(registry.patterns(Skill::VoiceMimicry), ["snark"]);
        assert_eq!(registry.detect("pure snark"), vec![Skill::VoiceMimicry]);
    }

    #[test]
    fn test_overrides_are_validated() {
        let mut overrides = HashMap::new();
        overrides.insert("poetry".to_string(), vec!["rhyme".to_string()]);
        assert_eq!(
            SkillRegistry::with_overrides(&overrides).unwrap_err(),
            SkillTableError::UnknownSkill("poetry".to_string())
        );

        let mut overrides = HashMap::new();
        overrides.insert("voice_mimicry".to_string(), Vec::new());
        assert_eq!(
            SkillRegistry::with_overrides(&overrides).unwrap_err(),
            SkillTableError::EmptyPatterns(Skill::VoiceMimicry)
        );

        let mut overrides = HashMap::new();
        overrides.insert("voice_mimicry".to_string(), vec!["  ".to_string()]);
        assert_eq!(
            SkillRegistry::with_overrides(&overrides).unwrap_err(),
            SkillTableError::BlankPattern(Skill::VoiceMimicry)
        );
    }
}
