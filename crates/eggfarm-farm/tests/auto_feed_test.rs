#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Auto-feeder gate and protection tests

use chrono::{DateTime, Duration, TimeZone, Utc};
use eggfarm_farm::{
    AutoFeeder, CheckStatus, EggTemplate, Farm, FeederConfig, Gate, ProtectionState,
};
use eggfarm_egg::{Egg, HealthStatus, NewExample};
use eggfarm_persistence::{FarmStore, FEEDER_STATE_FILE};
use eggfarm_types::Skill;
use pretty_assertions::assert_eq;
use std::path::Path;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 4, 10, 0, 0).unwrap()
}

/// 120-word output naming every academic indicator
fn academic_output() -> String {
    let filler: Vec<String> = (0..110).map(|n| format!("detail{n}")).collect();
    format!(
        "The implementation follows a systematic methodology and the analysis of results \
         includes a comprehensive evaluation {}",
        filler.join(" ")
    )
}

/// Short content with mostly unique words so freshness never triggers
fn varied_output(n: u32, indicators: &str) -> String {
    let unique: Vec<String> = (0..20).map(|k| format!("w{n}x{k}")).collect();
    format!("{indicators} {}", unique.join(" "))
}

fn academic_feeder(dir: &Path, config: FeederConfig) -> AutoFeeder {
    let mut farm = Farm::open(dir).unwrap();
    if farm.egg("academic-writer").is_none() {
        farm.spawn_from_template(None, EggTemplate::Academic).unwrap();
    }
    AutoFeeder::new(farm, config).unwrap()
}

fn unlimited() -> FeederConfig {
    FeederConfig {
        max_feeds_per_hour: 0,
        ..FeederConfig::default()
    }
}

#[test]
fn test_academic_content_feeds_academic_egg() {
    let dir = tempfile::tempdir().unwrap();
    let mut feeder = academic_feeder(dir.path(), FeederConfig::default());

    let result = feeder.auto_feed_at("Summarize the paper", &academic_output(), "", None, now());

    assert_eq!(result.rejection, None);
    assert!(result.quality_score.unwrap() >= 8.0);
    assert!(result.detected_skills.contains(&Skill::AcademicWriting));
    assert_eq!(result.total_fed(), 1);
    assert_eq!(result.fed_eggs[0].name, "academic-writer");
    assert_eq!(result.protection.overall, CheckStatus::Pass);

    let egg = feeder.farm().egg("academic-writer").unwrap();
    assert_eq!(
        egg.specialization(Skill::AcademicWriting)
            .unwrap()
            .examples_collected(),
        1
    );
}

#[test]
fn test_resending_same_content_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut feeder = academic_feeder(dir.path(), FeederConfig::default());
    let output = academic_output();

    let first = feeder.auto_feed_at("Summarize the paper", &output, "", None, now());
    assert_eq!(first.total_fed(), 1);

    let second = feeder.auto_feed_at(
        "Summarize the paper",
        &output,
        "",
        None,
        now() + Duration::minutes(1),
    );
    let rejection = second.rejection.unwrap();
    assert_eq!(rejection.gate, Gate::Freshness);
    assert_eq!(rejection.reason, "Content too similar (100.0%)");
    assert_eq!(second.protection.freshness, CheckStatus::Blocked);
    assert_eq!(second.protection.overall, CheckStatus::Blocked);
    assert!(second.fed_eggs.is_empty());
    assert_eq!(second.quality_score, None);

    let egg = feeder.farm().egg("academic-writer").unwrap();
    assert_eq!(egg.total_examples(), 1);
}

#[test]
fn test_declining_quality_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut feeder = academic_feeder(dir.path(), unlimited());

    // 7.0 base plus 0.2 for each of the five indicators
    let strong = "implementation analysis methodology results evaluation";
    for n in 0..10 {
        let result = feeder.auto_feed_at("ask", &varied_output(n, strong), "", None, now());
        assert_eq!(result.quality_score, Some(8.0));
        assert_eq!(result.rejection, None);
    }

    // one indicator: 7.2
    let weak = "research analysis";
    for n in 10..14 {
        let result = feeder.auto_feed_at("ask", &varied_output(n, weak), "", None, now());
        assert_eq!(result.rejection, None, "feed {n} was rejected");
    }

    let result = feeder.auto_feed_at("ask", &varied_output(14, weak), "", None, now());
    let rejection = result.rejection.unwrap();
    assert_eq!(rejection.gate, Gate::QualityTrend);
    assert_eq!(rejection.reason, "Quality dropped 0.80 points");
    assert_eq!(result.protection.quality_trend, CheckStatus::Blocked);

    let egg = feeder.farm().egg("academic-writer").unwrap();
    assert_eq!(egg.total_examples(), 14);
    assert_eq!(feeder.protection_state().quality_history.len(), 15);
}

#[test]
fn test_rate_limit_slides_over_the_hour() {
    let dir = tempfile::tempdir().unwrap();
    let config = FeederConfig {
        max_feeds_per_hour: 2,
        ..FeederConfig::default()
    };
    let mut feeder = academic_feeder(dir.path(), config);
    let strong = "implementation analysis methodology results evaluation";

    for n in 0..2 {
        let result = feeder.auto_feed_at("ask", &varied_output(n, strong), "", None, now());
        assert_eq!(result.total_fed(), 1);
        assert_eq!(result.protection.rate_limit, CheckStatus::Pass);
    }

    let blocked = feeder.auto_feed_at("ask", &varied_output(2, strong), "", None, now());
    let rejection = blocked.rejection.unwrap();
    assert_eq!(rejection.gate, Gate::RateLimit);
    assert_eq!(rejection.reason, "Rate limit reached (2 feeds in the last hour)");

    let later = now() + Duration::minutes(61);
    let result = feeder.auto_feed_at("ask", &varied_output(2, strong), "", None, later);
    assert_eq!(result.rejection, None);
    assert_eq!(feeder.protection_status_at(later).feeds_last_hour, 1);
}

#[test]
fn test_disabled_feeder_feeds_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let config = FeederConfig {
        enabled: false,
        ..FeederConfig::default()
    };
    let mut feeder = academic_feeder(dir.path(), config);

    let result = feeder.auto_feed_at("Summarize", &academic_output(), "", None, now());
    assert!(!result.enabled);
    assert_eq!(result.rejection.unwrap().gate, Gate::Disabled);
    assert!(!feeder.should_feed_egg("academic-writer", &[Skill::AcademicWriting]));

    feeder.enable();
    let result = feeder.auto_feed_at("Summarize", &academic_output(), "", None, now());
    assert!(result.enabled);
    assert_eq!(result.total_fed(), 1);
}

#[test]
fn test_content_without_skills_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut feeder = academic_feeder(dir.path(), FeederConfig::default());

    let result = feeder.auto_feed_at("hello", "hi there friend", "", None, now());
    let rejection = result.rejection.unwrap();
    assert_eq!(rejection.gate, Gate::Skills);
    assert_eq!(rejection.reason, "No relevant skills detected");
    assert_eq!(result.quality_score, None);
    assert!(feeder.protection_state().quality_history.is_empty());
}

#[test]
fn test_quality_threshold_gate() {
    let dir = tempfile::tempdir().unwrap();
    let mut feeder = academic_feeder(dir.path(), FeederConfig::default());
    feeder.set_quality_threshold(9.9);
    assert_eq!(feeder.quality_threshold(), 9.9);

    let result = feeder.auto_feed_at("ask", &varied_output(0, "research analysis"), "", None, now());
    let rejection = result.rejection.unwrap();
    assert_eq!(rejection.gate, Gate::QualityThreshold);
    assert_eq!(rejection.reason, "Quality too low: 7.2");
    assert!(result.fed_eggs.is_empty());
    assert!(feeder.protection_state().recent_content.is_empty());

    feeder.set_quality_threshold(42.0);
    assert_eq!(feeder.quality_threshold(), 10.0);
    feeder.set_quality_threshold(-1.0);
    assert_eq!(feeder.quality_threshold(), 0.0);
}

#[test]
fn test_only_compatible_eggs_are_fed() {
    let dir = tempfile::tempdir().unwrap();
    let mut farm = Farm::open(dir.path()).unwrap();
    farm.spawn_from_template(None, EggTemplate::Academic).unwrap();
    farm.spawn_from_template(None, EggTemplate::Voice).unwrap();
    let mut feeder = AutoFeeder::new(farm, FeederConfig::default()).unwrap();

    let result = feeder.auto_feed_at("Summarize", &academic_output(), "", Some("good"), now());
    let fed: Vec<&str> = result.fed_eggs.iter().map(|egg| egg.name.as_str()).collect();
    assert_eq!(fed, vec!["academic-writer"]);

    let example = &feeder.farm().egg("academic-writer").unwrap().training_examples()[0];
    assert_eq!(example.user_feedback(), Some("good"));
    assert_eq!(feeder.farm().egg("voice-mimic").unwrap().total_examples(), 0);
    assert!(!feeder.should_feed_egg("missing", &[Skill::AcademicWriting]));
}

#[test]
fn test_hatched_egg_is_not_fed() {
    let dir = tempfile::tempdir().unwrap();
    let mut retired = Egg::created_at("retired", EggTemplate::Academic.focus_areas(), "academic", now());
    for n in 0..2000 {
        retired.feed_at(
            NewExample::new(format!("question {n}"), format!("answer {n}"), 8.0)
                .with_skill_tags(["academic_writing", "ieee_formatting", "research_synthesis"]),
            now(),
        );
    }
    FarmStore::open(dir.path()).unwrap().save_egg(&retired).unwrap();

    let mut farm = Farm::open(dir.path()).unwrap();
    farm.hatch_egg_at("retired", now()).unwrap();
    farm.spawn_from_template(None, EggTemplate::Academic).unwrap();
    let mut feeder = AutoFeeder::new(farm, FeederConfig::default()).unwrap();
    assert!(!feeder.should_feed_egg("retired", &[Skill::AcademicWriting]));

    let result = feeder.auto_feed_at("Summarize", &academic_output(), "", None, now());
    let fed: Vec<&str> = result.fed_eggs.iter().map(|egg| egg.name.as_str()).collect();
    assert_eq!(fed, vec!["academic-writer"]);
    assert_eq!(feeder.farm().egg("retired").unwrap().total_examples(), 2000);
}

#[test]
fn test_unhealthy_egg_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let mut farm = Farm::open(dir.path()).unwrap();
    farm.spawn_egg("stale", vec![Skill::AcademicWriting], "academic").unwrap();
    // repeated content, one skill and one dominant input word
    for _ in 0..5 {
        farm.feed_egg(
            "stale",
            NewExample::new("same prompt", "same answer", 8.0).with_skill_tags(["academic_writing"]),
        )
        .unwrap();
    }
    farm.spawn_from_template(None, EggTemplate::Academic).unwrap();
    assert_eq!(
        farm.check_egg_health("stale").unwrap().status,
        HealthStatus::Unhealthy
    );

    let mut feeder = AutoFeeder::new(farm, FeederConfig::default()).unwrap();
    assert!(!feeder.should_feed_egg("stale", &[Skill::AcademicWriting]));
    assert!(feeder.should_feed_egg("academic-writer", &[Skill::AcademicWriting]));

    let result = feeder.auto_feed_at("Summarize", &academic_output(), "", None, now());
    let fed: Vec<&str> = result.fed_eggs.iter().map(|egg| egg.name.as_str()).collect();
    assert_eq!(fed, vec!["academic-writer"]);
    assert_eq!(feeder.farm().egg("stale").unwrap().total_examples(), 5);
}

#[test]
fn test_protection_state_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let output = academic_output();

    let mut feeder = academic_feeder(dir.path(), FeederConfig::default());
    assert_eq!(feeder.auto_feed_at("Summarize", &output, "", None, now()).total_fed(), 1);
    drop(feeder);
    assert!(dir.path().join(FEEDER_STATE_FILE).is_file());

    let mut restarted = academic_feeder(dir.path(), FeederConfig::default());
    assert_eq!(restarted.protection_state().recent_content.len(), 1);
    let result = restarted.auto_feed_at("Summarize", &output, "", None, now());
    assert_eq!(result.rejection.unwrap().gate, Gate::Freshness);

    let config = FeederConfig {
        persist_state: false,
        ..FeederConfig::default()
    };
    let mut forgetful = academic_feeder(dir.path(), config);
    assert_eq!(forgetful.protection_state(), &ProtectionState::default());
    assert_eq!(forgetful.auto_feed_at("Summarize", &output, "", None, now()).total_fed(), 1);
}

#[test]
fn test_identical_state_gives_identical_results() {
    let first_dir = tempfile::tempdir().unwrap();
    let second_dir = tempfile::tempdir().unwrap();
    let mut first = academic_feeder(first_dir.path(), unlimited());
    let mut second = academic_feeder(second_dir.path(), unlimited());

    let strong = "implementation analysis methodology results evaluation";
    for n in 0..5 {
        let output = varied_output(n, strong);
        let a = first.auto_feed_at("ask", &output, "academic", None, now());
        let b = second.auto_feed_at("ask", &output, "academic", None, now());
        assert_eq!(a, b);
    }
    assert_eq!(first.protection_state(), second.protection_state());
}

#[test]
fn test_protection_status() {
    let dir = tempfile::tempdir().unwrap();
    let mut feeder = academic_feeder(dir.path(), FeederConfig::default());
    feeder.auto_feed_at("Summarize", &academic_output(), "", None, now());

    let status = feeder.protection_status_at(now());
    assert!(status.enabled);
    assert_eq!(status.quality_threshold, 6.0);
    assert_eq!(status.content_cache_size, 1);
    assert_eq!(status.quality_samples, 1);
    assert_eq!(status.feeds_last_hour, 1);
    assert_eq!(status.max_feeds_per_hour, 10);
    assert_eq!(
        status.active_protections,
        vec!["content_deduplication", "quality_trend_monitoring", "rate_limiting"]
    );

    feeder.disable();
    assert!(!feeder.protection_status_at(now()).enabled);
}

#[test]
fn test_invalid_config_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let farm = Farm::open(dir.path()).unwrap();
    let config = FeederConfig {
        quality_threshold: 12.0,
        ..FeederConfig::default()
    };
    assert!(AutoFeeder::new(farm, config).is_err());

    let farm = Farm::open(dir.path()).unwrap();
    let mut config = FeederConfig::default();
    config
        .skill_patterns
        .insert("astrology".to_string(), vec!["stars".to_string()]);
    assert!(AutoFeeder::new(farm, config).is_err());
}
