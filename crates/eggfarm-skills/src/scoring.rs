//! Heuristic quality scoring
//!
//! Scores start at 7.0 and earn bonuses for length, sentence shape, academic
//! register and the command context. Automatic scores never exceed 9.5 so a
//! 10.0 always means a human rated the example.

const BASE_SCORE: f64 = 7.0;
const MAX_AUTOMATIC_SCORE: f64 = 9.5;

const LONG_OUTPUT_WORDS: usize = 100;
const LONG_OUTPUT_BONUS: f64 = 0.5;
const MEDIUM_OUTPUT_WORDS: usize = 50;
const MEDIUM_OUTPUT_BONUS: f64 = 0.3;

const SENTENCE_SHAPE_BONUS: f64 = 0.3;
const MIN_SENTENCE_PIECES: usize = 4;
const SENTENCE_WORDS_RANGE: std::ops::RangeInclusive<f64> = 10.0..=25.0;

const ACADEMIC_INDICATORS: [&str; 7] = [
    "implementation",
    "analysis",
    "methodology",
    "results",
    "evaluation",
    "comprehensive",
    "systematic",
];
const ACADEMIC_INDICATOR_BONUS: f64 = 0.2;
const MAX_ACADEMIC_BONUS: f64 = 1.0;

/// First matching context label wins
const CONTEXT_BONUSES: [(&str, f64); 3] = [("academic", 0.5), ("sensei", 0.4), ("research", 0.3)];

fn length_bonus(output: &str) -> f64 {
    let words = output.split_whitespace().count();
    if words > LONG_OUTPUT_WORDS {
        LONG_OUTPUT_BONUS
    } else if words > MEDIUM_OUTPUT_WORDS {
        MEDIUM_OUTPUT_BONUS
    } else {
        0.0
    }
}

/// Rewards outputs whose `.`-separated pieces average 10 to 25 words
fn sentence_bonus(output: &str) -> f64 {
    let pieces: Vec<&str> = output.split('.').collect();
    if pieces.len() < MIN_SENTENCE_PIECES {
        return 0.0;
    }

    let words: usize = pieces.iter().map(|p| p.split_whitespace().count()).sum();
    let average = words as f64 / pieces.len() as f64;
    if SENTENCE_WORDS_RANGE.contains(&average) {
        SENTENCE_SHAPE_BONUS
    } else {
        0.0
    }
}

fn academic_bonus(output: &str) -> f64 {
    let output = output.to_lowercase();
    let found = ACADEMIC_INDICATORS
        .iter()
        .filter(|indicator| output.contains(*indicator))
        .count();
    (found as f64 * ACADEMIC_INDICATOR_BONUS).min(MAX_ACADEMIC_BONUS)
}

fn context_bonus(context: &str) -> f64 {
    let context = context.to_lowercase();
    CONTEXT_BONUSES
        .iter()
        .find(|(label, _)| context.contains(label))
        .map_or(0.0, |(_, bonus)| *bonus)
}

/// Score generated content in `[0, 9.5]`.
///
/// Only the output and the context label contribute; the input is accepted
/// so callers can pass the full interaction.
#[must_use]
pub fn calculate_quality_score(_input: &str, output: &str, context: &str) -> f64 {
    let score = BASE_SCORE
        + length_bonus(output)
        + sentence_bonus(output)
        + academic_bonus(output)
        + context_bonus(context);
    score.min(MAX_AUTOMATIC_SCORE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(count: usize) -> String {
        vec!["word"; count].join(" ")
    }

    #[test]
    fn test_plain_short_output_scores_base() {
        assert_eq!(calculate_quality_score("q", "short answer", "blog"), 7.0);
    }

    #[test]
    fn test_length_bonus_tiers() {
        assert_eq!(length_bonus(&words(50)), 0.0);
        assert_eq!(length_bonus(&words(51)), 0.3);
        assert_eq!(length_bonus(&words(101)), 0.5);
    }

    #[test]
    fn test_sentence_bonus() {
        let sentence = format!("{}.", words(12));
        let output = sentence.repeat(4);
        // four sentences plus an empty trailing piece: 48 words over 5 pieces
        assert_eq!(sentence_bonus(&output), 0.0);

        let output = format!("{}.", words(15)).repeat(4);
        assert_eq!(sentence_bonus(&output), 0.3);

        assert_eq!(sentence_bonus("one. two. three"), 0.0);
    }

    #[test]
    fn test_academic_bonus_is_capped() {
        assert!((academic_bonus("the analysis and results") - 0.4).abs() < 1e-9);
        let all = ACADEMIC_INDICATORS.join(" ");
        assert_eq!(academic_bonus(&all), 1.0);
    }

    #[test]
    fn test_first_context_match_wins() {
        assert_eq!(context_bonus("academic research"), 0.5);
        assert_eq!(context_bonus("Sensei session"), 0.4);
        assert_eq!(context_bonus("research notes"), 0.3);
        assert_eq!(context_bonus("devlog"), 0.0);
    }

    #[test]
    fn test_all_bonuses_stay_under_cap() {
        let sentence = format!("{} {}. ", ACADEMIC_INDICATORS.join(" "), words(8));
        let output = sentence.repeat(8);
        let score = calculate_quality_score("q", &output, "academic");
        assert!((score - 9.3).abs() < 1e-9, "score was {score}");
        assert!(score <= MAX_AUTOMATIC_SCORE);
    }

    #[test]
    fn test_academic_output_scores_high() {
        let output = format!(
            "The implementation follows a systematic methodology. {} The analysis of results is comprehensive.",
            words(110)
        );
        let score = calculate_quality_score("summarize", &output, "devlog");
        assert!(score >= 8.0, "score was {score}");
    }

    #[test]
    fn test_is_deterministic() {
        let a = calculate_quality_score("in", "The analysis shows results.", "research");
        let b = calculate_quality_score("in", "The analysis shows results.", "research");
        assert_eq!(a, b);
    }
}
