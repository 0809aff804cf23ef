//! Production planning suggestions: scheduling groups, crew, safety and
//! logistics notes triggered by keywords in the script.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::screenplay::{ParsedScript, TimeOfDay};

/// Average number of scenes shot per day.
const SCENES_PER_DAY: usize = 5;

struct KeywordRule {
    pattern: Regex,
    label: &'static str,
    detail: &'static str,
}

impl KeywordRule {
    fn new(pattern: &str, label: &'static str, detail: &'static str) -> Self {
        Self {
            pattern: Regex::new(&format!(r"(?i)\b(?:{})", pattern)).unwrap(),
            label,
            detail,
        }
    }
}

static CREW_RULES: LazyLock<Vec<KeywordRule>> = LazyLock::new(|| {
    vec![
        KeywordRule::new(
            "fight|explosion|chase|stunt|fall",
            "Stunt Coordinator",
            "Action sequences detected",
        ),
        KeywordRule::new(
            r"effect|cgi\b|vfx\b|explosion|fire\b|rain\b",
            "Special Effects Supervisor",
            "Special effects required",
        ),
        KeywordRule::new(
            r"century|period\b|historical|era\b|ancient|medieval",
            "Historical Consultant",
            "Period-specific content detected",
        ),
    ]
});

static SAFETY_RULES: LazyLock<Vec<KeywordRule>> = LazyLock::new(|| {
    vec![
        KeywordRule::new("fight|combat", "Safety Personnel", "Combat safety coordinator required"),
        KeywordRule::new(
            r"fire\b|explosion",
            "Safety Personnel",
            "Fire safety officer and permits required",
        ),
        KeywordRule::new(
            "water|underwater|swimming",
            "Safety Personnel",
            "Water safety team required",
        ),
        KeywordRule::new(
            "height|roof|cliff",
            "Safety Personnel",
            "Height safety equipment and coordinator required",
        ),
        KeywordRule::new(
            r"vehicle|car chase",
            "Safety Personnel",
            "Vehicle safety coordinator required",
        ),
    ]
});

static CHALLENGE_RULES: LazyLock<Vec<KeywordRule>> = LazyLock::new(|| {
    vec![
        KeywordRule::new(
            "crowd|extras|background",
            "Crowd Management",
            "Scenes requiring large number of extras",
        ),
        KeywordRule::new(
            "rain|snow|storm|sunny|weather",
            "Weather Dependency",
            "Scenes requiring specific weather conditions",
        ),
        KeywordRule::new(
            "restaurant|hospital|school|public",
            "Location Permissions",
            "Scenes in complex or public locations",
        ),
    ]
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneGrouping {
    pub key: String,
    /// 1-based scene numbers.
    pub scene_numbers: Vec<usize>,
    pub suggestion: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scheduling {
    pub estimated_days: usize,
    pub location_groupings: Vec<SceneGrouping>,
    pub time_of_day_groupings: Vec<SceneGrouping>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewNeed {
    pub role: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Consideration {
    pub kind: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Logistics {
    pub location_considerations: Vec<Consideration>,
    pub equipment: Vec<Consideration>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Optimization {
    pub category: String,
    pub suggestion: String,
    pub benefit: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionSuggestions {
    pub scheduling: Scheduling,
    pub special_crew: Vec<CrewNeed>,
    pub logistics: Logistics,
    pub safety_considerations: Vec<Consideration>,
    pub production_challenges: Vec<Consideration>,
    pub optimization_suggestions: Vec<Optimization>,
}

pub fn analyze_suggestions(parsed: &ParsedScript, script_text: &str) -> ProductionSuggestions {
    let scheduling = schedule(parsed);

    let special_crew: Vec<CrewNeed> = CREW_RULES
        .iter()
        .filter(|rule| rule.pattern.is_match(script_text))
        .map(|rule| CrewNeed {
            role: rule.label.to_string(),
            reason: rule.detail.to_string(),
        })
        .collect();

    let mut safety_considerations = matching(&SAFETY_RULES, script_text, Some("High"));
    if parsed
        .scenes
        .iter()
        .any(|s| s.time_of_day == TimeOfDay::Night)
    {
        safety_considerations.push(Consideration {
            kind: "Night Shooting".to_string(),
            description: "Additional lighting and safety personnel for night shoots".to_string(),
            priority: Some("Medium".to_string()),
        });
    }

    let production_challenges = matching(&CHALLENGE_RULES, script_text, None);
    let logistics = logistics(parsed, &scheduling);
    let optimization_suggestions = optimizations(&scheduling, &special_crew);

    ProductionSuggestions {
        scheduling,
        special_crew,
        logistics,
        safety_considerations,
        production_challenges,
        optimization_suggestions,
    }
}

fn schedule(parsed: &ParsedScript) -> Scheduling {
    let mut by_location: Vec<(String, Vec<usize>)> = Vec::new();
    let mut by_time: Vec<(TimeOfDay, Vec<usize>)> = Vec::new();

    for (i, scene) in parsed.scenes.iter().enumerate() {
        let number = i + 1;
        match by_location.iter_mut().find(|(loc, _)| *loc == scene.location) {
            Some((_, numbers)) => numbers.push(number),
            None => by_location.push((scene.location.clone(), vec![number])),
        }
        match by_time.iter_mut().find(|(time, _)| *time == scene.time_of_day) {
            Some((_, numbers)) => numbers.push(number),
            None => by_time.push((scene.time_of_day, vec![number])),
        }
    }

    let location_groupings = by_location
        .into_iter()
        .map(|(location, scene_numbers)| SceneGrouping {
            suggestion: format!(
                "Shoot scenes {} together at {}",
                join_numbers(&scene_numbers),
                location
            ),
            key: location,
            scene_numbers,
        })
        .collect();

    let time_of_day_groupings = by_time
        .into_iter()
        .map(|(time, scene_numbers)| SceneGrouping {
            suggestion: format!(
                "Group scenes {} for {} shoots",
                join_numbers(&scene_numbers),
                time
            ),
            key: time.as_str().to_string(),
            scene_numbers,
        })
        .collect();

    Scheduling {
        estimated_days: estimated_days(parsed.scenes.len()),
        location_groupings,
        time_of_day_groupings,
    }
}

/// `max(round(scenes / 5), 1)`; scene counts never land on a .5 tie.
pub fn estimated_days(scene_count: usize) -> usize {
    ((scene_count + SCENES_PER_DAY / 2) / SCENES_PER_DAY).max(1)
}

fn logistics(parsed: &ParsedScript, scheduling: &Scheduling) -> Logistics {
    let mut location_considerations: Vec<Consideration> = Vec::new();
    for scene in parsed.scenes.iter().filter(|s| !s.interior) {
        if location_considerations
            .iter()
            .any(|c| c.kind == scene.location)
        {
            continue;
        }
        location_considerations.push(Consideration {
            kind: scene.location.clone(),
            description: "Weather contingency plan needed for exterior location".to_string(),
            priority: None,
        });
    }

    let mut equipment = Vec::new();
    if scheduling.location_groupings.len() > 1 {
        equipment.push(Consideration {
            kind: "Transportation".to_string(),
            description: "Equipment trucks needed for multiple locations; schedule to minimize company moves"
                .to_string(),
            priority: None,
        });
    }

    Logistics {
        location_considerations,
        equipment,
    }
}

fn optimizations(scheduling: &Scheduling, special_crew: &[CrewNeed]) -> Vec<Optimization> {
    let mut suggestions = Vec::new();

    if !scheduling.location_groupings.is_empty() {
        suggestions.push(Optimization {
            category: "Scheduling".to_string(),
            suggestion: "Group scenes by location to minimize company moves".to_string(),
            benefit: "Reduces production time and transportation costs".to_string(),
        });
    }

    let magic_hour = scheduling
        .time_of_day_groupings
        .iter()
        .any(|g| g.key == TimeOfDay::Morning.as_str() || g.key == TimeOfDay::Evening.as_str());
    if magic_hour {
        suggestions.push(Optimization {
            category: "Timing".to_string(),
            suggestion: "Schedule magic hour scenes on separate days".to_string(),
            benefit: "Maximizes limited natural light windows".to_string(),
        });
    }

    if !special_crew.is_empty() {
        suggestions.push(Optimization {
            category: "Crew Planning".to_string(),
            suggestion: "Schedule scenes requiring special crew members together".to_string(),
            benefit: "Minimizes specialty crew hiring days".to_string(),
        });
    }

    suggestions
}

fn matching(rules: &[KeywordRule], text: &str, priority: Option<&str>) -> Vec<Consideration> {
    rules
        .iter()
        .filter(|rule| rule.pattern.is_match(text))
        .map(|rule| Consideration {
            kind: rule.label.to_string(),
            description: rule.detail.to_string(),
            priority: priority.map(|p| p.to_string()),
        })
        .collect()
}

fn join_numbers(numbers: &[usize]) -> String {
    numbers
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
