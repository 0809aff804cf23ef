//! Keyword-driven budget estimate.
//!
//! Re-scans the raw text rather than the parsed scenes, so headings that the
//! parser attributes as dialogue still count as locations.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::LazyLock;

use crate::screenplay::classify::match_scene_heading;

static RE_PROPS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(gun|car|phone|book|table|chair|computer|laptop|sword|knife|desk|bed)\b")
        .unwrap()
});
static RE_EFFECTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(explosion|fire|rain|storm|lightning|earthquake|crash|fight|battle)\b")
        .unwrap()
});

pub const LOCATION_COST: u64 = 5_000;
pub const PROP_COST: u64 = 1_000;
pub const EFFECT_COST: u64 = 10_000;
/// Fixed policy multiplier between the low and high estimates.
pub const HIGH_MULTIPLIER: u64 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetRange {
    pub low: u64,
    pub high: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetEstimate {
    pub locations: Vec<String>,
    pub props: Vec<String>,
    pub special_effects: Vec<String>,
    pub estimated_budget: BudgetRange,
}

impl BudgetEstimate {
    pub fn low(&self) -> u64 {
        self.estimated_budget.low
    }

    pub fn high(&self) -> u64 {
        self.estimated_budget.high
    }
}

pub fn analyze_budget(script_text: &str) -> BudgetEstimate {
    let mut locations = CaselessSet::default();
    let mut props = CaselessSet::default();
    let mut effects = CaselessSet::default();

    for line in script_text.split('\n') {
        let line = line.trim();

        if let Some(heading) = match_scene_heading(line) {
            locations.insert(&heading.location);
        }
        for found in RE_PROPS.find_iter(line) {
            props.insert(&found.as_str().to_lowercase());
        }
        for found in RE_EFFECTS.find_iter(line) {
            effects.insert(&found.as_str().to_lowercase());
        }
    }

    let low = locations.len() as u64 * LOCATION_COST
        + props.len() as u64 * PROP_COST
        + effects.len() as u64 * EFFECT_COST;

    BudgetEstimate {
        locations: locations.into_values(),
        props: props.into_values(),
        special_effects: effects.into_values(),
        estimated_budget: BudgetRange {
            low,
            high: low * HIGH_MULTIPLIER,
        },
    }
}

/// Insertion-ordered set comparing entries case-insensitively; keeps the
/// first spelling seen.
#[derive(Default)]
struct CaselessSet {
    seen: HashSet<String>,
    values: Vec<String>,
}

impl CaselessSet {
    fn insert(&mut self, value: &str) {
        if self.seen.insert(value.to_lowercase()) {
            self.values.push(value.to_string());
        }
    }

    fn len(&self) -> usize {
        self.values.len()
    }

    fn into_values(self) -> Vec<String> {
        self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kitchen_scenario() {
        let budget = analyze_budget("INT. KITCHEN - DAY\nJOHN\nWhere is the knife?\n");
        assert_eq!(budget.locations, vec!["KITCHEN".to_string()]);
        assert_eq!(budget.props, vec!["knife".to_string()]);
        assert!(budget.special_effects.is_empty());
        assert_eq!(budget.low(), 5_000 + 1_000);
        assert_eq!(budget.high(), 12_000);
    }

    #[test]
    fn test_empty_script_costs_nothing() {
        let budget = analyze_budget("Nothing of note happens here.");
        assert_eq!(budget.low(), 0);
        assert_eq!(budget.high(), 0);
    }

    #[test]
    fn test_high_is_always_double_low() {
        let scripts = [
            "",
            "EXT. FIELD - DAY\nA storm. Lightning. A crash.",
            "INT. ARMORY - NIGHT\nGuns, a sword and a KNIFE on the table.",
        ];
        for script in scripts {
            let budget = analyze_budget(script);
            assert_eq!(budget.high(), 2 * budget.low());
        }
    }

    #[test]
    fn test_matches_are_case_insensitive_and_deduplicated() {
        let budget = analyze_budget(
            "INT. Kitchen - DAY\nA KNIFE. Another knife.\nINT. KITCHEN - NIGHT\nFire! FIRE!",
        );
        assert_eq!(budget.locations, vec!["Kitchen".to_string()]);
        assert_eq!(budget.props, vec!["knife".to_string()]);
        assert_eq!(budget.special_effects, vec!["fire".to_string()]);
        assert_eq!(budget.low(), 5_000 + 1_000 + 10_000);
    }

    #[test]
    fn test_non_ascii_locations_deduplicated() {
        let budget = analyze_budget("INT. CAFÉ - DAY\nINT. café - NIGHT\nEXT. Straße - DAY");
        assert_eq!(budget.locations, vec!["CAFÉ".to_string(), "Straße".to_string()]);
        assert_eq!(budget.low(), 2 * 5_000);
    }

    #[test]
    fn test_word_boundaries() {
        // "cards", "bedroom" and "firework" must not match "car", "bed", "fire".
        let budget = analyze_budget("He deals cards in the bedroom near a firework.");
        assert!(budget.props.is_empty());
        assert!(budget.special_effects.is_empty());
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(analyze_budget("A battle.")).unwrap();
        assert_eq!(json["specialEffects"][0], "battle");
        assert_eq!(json["estimatedBudget"]["low"], 10_000);
        assert_eq!(json["estimatedBudget"]["high"], 20_000);
    }
}
