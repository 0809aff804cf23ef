//! Character role breakdown.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::screenplay::ParsedScript;

/// Billing tier derived from how many dialogue lines a character has.
///
/// Variants are declared lowest first so `Ord` follows importance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Importance {
    Minor,
    Supporting,
    Major,
}

impl Importance {
    pub fn from_line_count(line_count: usize) -> Self {
        if line_count > 20 {
            Importance::Major
        } else if line_count > 5 {
            Importance::Supporting
        } else {
            Importance::Minor
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterProfile {
    pub name: String,
    pub dialogue_lines: Vec<String>,
    pub line_count: usize,
    pub first_appearance_line_index: usize,
    pub importance: Importance,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleReport {
    /// Sorted by line count, descending; ties keep first-appearance order.
    pub characters: Vec<CharacterProfile>,
    pub total_characters: usize,
    pub major_count: usize,
    pub supporting_count: usize,
    pub minor_count: usize,
}

pub fn analyze_roles(parsed: &ParsedScript) -> RoleReport {
    let mut characters: Vec<CharacterProfile> = Vec::new();
    let mut by_name: HashMap<&str, usize> = HashMap::new();

    for cue in &parsed.character_cues {
        let slot = *by_name.entry(cue.name.as_str()).or_insert_with(|| {
            characters.push(CharacterProfile {
                name: cue.name.clone(),
                dialogue_lines: vec![],
                line_count: 0,
                first_appearance_line_index: cue.line_index,
                importance: Importance::Minor,
            });
            characters.len() - 1
        });

        if let Some(dialogue) = &cue.dialogue {
            let profile = &mut characters[slot];
            profile.dialogue_lines.push(dialogue.text.clone());
            profile.line_count += 1;
        }
    }

    for profile in &mut characters {
        profile.importance = Importance::from_line_count(profile.line_count);
    }

    // Stable sort: equal counts stay in first-appearance order.
    characters.sort_by(|a, b| b.line_count.cmp(&a.line_count));

    let count = |tier: Importance| characters.iter().filter(|c| c.importance == tier).count();
    let major_count = count(Importance::Major);
    let supporting_count = count(Importance::Supporting);
    let minor_count = count(Importance::Minor);

    RoleReport {
        total_characters: characters.len(),
        characters,
        major_count,
        supporting_count,
        minor_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screenplay::parse;

    fn script_with_lines(name: &str, count: usize) -> String {
        let mut text = String::new();
        for i in 0..count {
            text.push_str(&format!("{}\nLine number {}.\n\n", name, i));
        }
        text
    }

    #[test]
    fn test_importance_thresholds() {
        assert_eq!(Importance::from_line_count(0), Importance::Minor);
        assert_eq!(Importance::from_line_count(5), Importance::Minor);
        assert_eq!(Importance::from_line_count(6), Importance::Supporting);
        assert_eq!(Importance::from_line_count(20), Importance::Supporting);
        assert_eq!(Importance::from_line_count(21), Importance::Major);
    }

    #[test]
    fn test_importance_is_monotonic() {
        for a in 0..40 {
            for b in 0..a {
                assert!(Importance::from_line_count(a) >= Importance::from_line_count(b));
            }
        }
    }

    #[test]
    fn test_kitchen_scenario() {
        let report = analyze_roles(&parse("INT. KITCHEN - DAY\nJOHN\nWhere is the knife?\n"));
        assert_eq!(report.total_characters, 1);
        let john = &report.characters[0];
        assert_eq!(john.name, "JOHN");
        assert_eq!(john.line_count, 1);
        assert_eq!(john.dialogue_lines, vec!["Where is the knife?".to_string()]);
        assert_eq!(john.first_appearance_line_index, 1);
        assert_eq!(john.importance, Importance::Minor);
    }

    #[test]
    fn test_every_well_formed_cue_is_attributed() {
        let text = "ANNA\nOne.\nBEN\nTwo.\nANNA (V.O.)\nThree.\nCARL\nFour.\nBEN\nFive.";
        let report = analyze_roles(&parse(text));
        let total: usize = report.characters.iter().map(|c| c.line_count).sum();
        assert_eq!(total, 5);
        assert_eq!(report.total_characters, 3);
    }

    #[test]
    fn test_sorted_by_line_count_with_stable_ties() {
        let mut text = String::from("ZED\nHi.\nAMY\nHello.\n");
        text.push_str(&script_with_lines("BOB", 3));
        let report = analyze_roles(&parse(&text));
        let names: Vec<&str> = report.characters.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["BOB", "ZED", "AMY"]);
    }

    #[test]
    fn test_cue_without_dialogue_still_counts_character() {
        let report = analyze_roles(&parse("GHOST\n\nSilence."));
        assert_eq!(report.total_characters, 1);
        assert_eq!(report.characters[0].line_count, 0);
        assert!(report.characters[0].dialogue_lines.is_empty());
    }

    #[test]
    fn test_tier_counts() {
        let mut text = script_with_lines("HERO", 21);
        text.push_str(&script_with_lines("SIDEKICK", 6));
        text.push_str(&script_with_lines("EXTRA", 1));
        let report = analyze_roles(&parse(&text));

        assert_eq!(report.major_count, 1);
        assert_eq!(report.supporting_count, 1);
        assert_eq!(report.minor_count, 1);
        assert_eq!(report.characters[0].importance, Importance::Major);
    }

    #[test]
    fn test_json_shape() {
        let report = analyze_roles(&parse("JOHN\nHi."));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["totalCharacters"], 1);
        assert_eq!(json["characters"][0]["lineCount"], 1);
        assert_eq!(json["characters"][0]["importance"], "Minor");
    }
}
