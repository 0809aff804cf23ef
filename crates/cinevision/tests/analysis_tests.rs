//! Analyses over a full screenplay, end to end through the service.

mod common;

use common::{TestHarness, HEIST, KITCHEN};

use cinevision::analysis::{analyze_budget, analyze_camera, analyze_roles, Importance};
use cinevision::screenplay::{parse, TimeOfDay};
use cinevision::{AnalysisError, AnalysisKind};

#[test]
fn test_heist_scenes() {
    let parsed = parse(HEIST);
    let scenes: Vec<(&str, bool, TimeOfDay)> = parsed
        .scenes
        .iter()
        .map(|s| (s.location.as_str(), s.interior, s.time_of_day))
        .collect();

    assert_eq!(
        scenes,
        vec![
            ("BANK VAULT", true, TimeOfDay::Night),
            ("ROOFTOP", false, TimeOfDay::Night),
            ("HARBOR", false, TimeOfDay::Day),
        ]
    );
    assert_eq!(parsed.scenes[0].characters, vec!["RITA", "VIC"]);
    assert_eq!(parsed.scenes[0].action.last().unwrap(), "Too late.");
}

#[test]
fn test_heist_roles() {
    let report = analyze_roles(&parse(HEIST));

    let names: Vec<(&str, usize)> = report
        .characters
        .iter()
        .map(|c| (c.name.as_str(), c.line_count))
        .collect();
    assert_eq!(names, vec![("RITA", 2), ("VIC", 1)]);

    let vic = &report.characters[1];
    // The (V.O.) cue is followed by a parenthetical, so only the later cue counts.
    assert_eq!(vic.dialogue_lines, vec!["We did it.".to_string()]);
    assert_eq!(vic.first_appearance_line_index, 7);
    assert_eq!(report.minor_count, 2);
    assert!(report.characters.iter().all(|c| c.importance == Importance::Minor));
}

#[test]
fn test_heist_budget() {
    let budget = analyze_budget(HEIST);

    assert_eq!(budget.locations, vec!["BANK VAULT", "ROOFTOP", "HARBOR"]);
    assert_eq!(budget.props, vec!["table", "laptop", "car"]);
    assert_eq!(
        budget.special_effects,
        vec!["fight", "rain", "lightning", "explosion"]
    );
    assert_eq!(budget.low(), 3 * 5_000 + 3 * 1_000 + 4 * 10_000);
    assert_eq!(budget.high(), 2 * budget.low());
}

#[test]
fn test_heist_camera_plan() {
    let plan = analyze_camera(&parse(HEIST));

    assert_eq!(
        plan.scenes[0].lighting,
        vec![
            "Artificial light",
            "Practical lights",
            "lit by a single flashlight"
        ]
    );
    assert_eq!(plan.scenes[1].shots, vec!["aerial"]);
    assert_eq!(plan.scenes[2].shots, vec!["wide shot"]);
    assert_eq!(
        plan.camera_shots,
        vec!["lit by a single flashlight", "v.o.", "whispering", "aerial", "wide shot"]
    );

    let categories: Vec<&str> = plan
        .recommendations
        .iter()
        .map(|r| r.category.as_str())
        .collect();
    assert_eq!(categories, vec!["High speed", "Aerial", "Wide lenses"]);
}

#[tokio::test]
async fn test_heist_suggestions_through_service() {
    let harness = TestHarness::new();
    let value = harness
        .service
        .analyze(AnalysisKind::Suggestions, HEIST)
        .await
        .unwrap();

    assert_eq!(value["scheduling"]["estimatedDays"], 1);
    assert_eq!(
        value["scheduling"]["timeOfDayGroupings"][0]["sceneNumbers"],
        serde_json::json!([1, 2])
    );

    let crew: Vec<&str> = value["specialCrew"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["role"].as_str().unwrap())
        .collect();
    assert_eq!(crew, vec!["Stunt Coordinator", "Special Effects Supervisor"]);

    let challenges: Vec<&str> = value["productionChallenges"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["kind"].as_str().unwrap())
        .collect();
    assert_eq!(challenges, vec!["Crowd Management", "Weather Dependency"]);

    let safety = value["safetyConsiderations"].as_array().unwrap();
    assert_eq!(safety.len(), 4);
    assert_eq!(safety[3]["kind"], "Night Shooting");
}

/// One row per analysis kind: the field every payload must carry.
const KIND_CASES: &[(AnalysisKind, &str)] = &[
    (AnalysisKind::Characters, "totalCharacters"),
    (AnalysisKind::Budget, "estimatedBudget"),
    (AnalysisKind::Camera, "cameraShots"),
    (AnalysisKind::Suggestions, "optimizationSuggestions"),
];

#[tokio::test]
async fn test_every_kind_builtin() {
    let harness = TestHarness::new();
    for (kind, field) in KIND_CASES {
        let value = harness.service.analyze(*kind, KITCHEN).await.unwrap();
        assert!(value.get(*field).is_some(), "{} payload lacks {}", kind, field);
    }
    // Built-in analyzers never touch scratch space.
    assert_eq!(harness.scratch_entries(), 0);
}

#[tokio::test]
async fn test_empty_script_rejected_for_every_kind() {
    let harness = TestHarness::new();
    for (kind, _) in KIND_CASES {
        let err = harness.service.analyze(*kind, "   \n").await.unwrap_err();
        assert!(matches!(err, AnalysisError::EmptyScript));
        assert!(err.is_validation());
    }
    assert!(matches!(
        harness.service.upload(""),
        Err(AnalysisError::EmptyScript)
    ));
    assert!(matches!(
        harness.service.start_storyboard(""),
        Err(AnalysisError::EmptyScript)
    ));
    assert!(harness.service.registry().is_empty());
}

#[test]
fn test_upload_report() {
    let harness = TestHarness::new();
    let report = harness.service.upload(KITCHEN).unwrap();

    assert_eq!(report.roles.characters[0].name, "JOHN");
    assert_eq!(report.roles.characters[0].line_count, 1);
    assert_eq!(report.budget.props, vec!["knife"]);
    assert_eq!(report.camera.scenes[0].location, "KITCHEN");
    assert_eq!(report.camera.scenes[0].time_of_day, TimeOfDay::Day);
}

#[test]
fn test_reparse_is_identical() {
    assert_eq!(parse(HEIST), parse(HEIST));
    assert_eq!(analyze_roles(&parse(HEIST)), analyze_roles(&parse(HEIST)));
}
