use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A skill an egg can specialize in.
///
/// The registry is closed: every egg tracks all of these, whether or not
/// it ever receives an example for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Skill {
    AcademicWriting,
    IeeeFormatting,
    AntiAiPatterns,
    ContentTransformation,
    VoiceMimicry,
    TechnicalDocumentation,
    ResearchSynthesis,
}

/// Returned when a string names no registry skill
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown skill '{0}'")]
pub struct UnknownSkill(pub String);

impl Skill {
    /// Every registry skill, in registry order
    pub const ALL: [Skill; 7] = [
        Skill::AcademicWriting,
        Skill::IeeeFormatting,
        Skill::AntiAiPatterns,
        Skill::ContentTransformation,
        Skill::VoiceMimicry,
        Skill::TechnicalDocumentation,
        Skill::ResearchSynthesis,
    ];

    /// Number of registry skills
    pub const COUNT: usize = Self::ALL.len();

    /// Identifier used in egg files and skill tags
    pub fn as_str(&self) -> &'static str {
        match self {
            Skill::AcademicWriting => "academic_writing",
            Skill::IeeeFormatting => "ieee_formatting",
            Skill::AntiAiPatterns => "anti_ai_patterns",
            Skill::ContentTransformation => "content_transformation",
            Skill::VoiceMimicry => "voice_mimicry",
            Skill::TechnicalDocumentation => "technical_documentation",
            Skill::ResearchSynthesis => "research_synthesis",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Skill::AcademicWriting => "Academic Writing",
            Skill::IeeeFormatting => "IEEE Formatting",
            Skill::AntiAiPatterns => "Anti-AI Patterns",
            Skill::ContentTransformation => "Content Transformation",
            Skill::VoiceMimicry => "Voice Mimicry",
            Skill::TechnicalDocumentation => "Technical Documentation",
            Skill::ResearchSynthesis => "Research Synthesis",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Skill::AcademicWriting => "Formal, professional documentation",
            Skill::IeeeFormatting => "Academic citations and standards",
            Skill::AntiAiPatterns => "Human-like authenticity",
            Skill::ContentTransformation => "Structured to prose",
            Skill::VoiceMimicry => "Personal writing style",
            Skill::TechnicalDocumentation => "Clear technical writing",
            Skill::ResearchSynthesis => "Multi-source analysis",
        }
    }

    /// Parse a free-form tag, returning `None` for anything outside the registry
    pub fn from_tag(tag: &str) -> Option<Self> {
        tag.parse().ok()
    }
}

impl fmt::Display for Skill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Skill {
    type Err = UnknownSkill;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Skill::ALL
            .iter()
            .copied()
            .find(|skill| skill.as_str() == s.trim())
            .ok_or_else(|| UnknownSkill(s.to_string()))
    }
}
