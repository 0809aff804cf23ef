//! Camera and lighting plan aggregated from parsed scenes.

use serde::{Deserialize, Serialize};

use crate::screenplay::{ParsedScript, Scene, TimeOfDay};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenePlan {
    pub location: String,
    pub interior: bool,
    pub time_of_day: TimeOfDay,
    pub shots: Vec<String>,
    pub lighting: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub category: String,
    pub suggestion: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraPlan {
    pub scenes: Vec<ScenePlan>,
    /// Every shot string seen, first-seen order.
    pub camera_shots: Vec<String>,
    /// Every lighting setup used, first-seen order.
    pub lighting: Vec<String>,
    pub recommendations: Vec<Recommendation>,
}

/// Equipment hints keyed on words in a scene's action lines.
const EQUIPMENT_HINTS: &[(&str, &[&str], &str)] = &[
    (
        "Lenses",
        &["close up", "closeup", "close-up"],
        "50mm or 85mm prime lens for close-up shots",
    ),
    (
        "Wide lenses",
        &["wide", "establishing", "landscape"],
        "16-35mm lens for wide shots",
    ),
    (
        "Movement",
        &["follows", "tracking", "moving", "walks", "runs"],
        "Dolly and Steadicam for tracking shots",
    ),
    (
        "Aerial",
        &["aerial", "overhead", "bird's eye"],
        "Drone or crane for aerial and overhead shots",
    ),
    (
        "High speed",
        &["fight", "chase", "explosion"],
        "High-speed camera capable of 120fps or higher for action",
    ),
];

pub fn analyze_camera(parsed: &ParsedScript) -> CameraPlan {
    let mut camera_shots: Vec<String> = Vec::new();
    let mut lighting: Vec<String> = Vec::new();
    let mut recommendations: Vec<Recommendation> = Vec::new();

    let scenes = parsed
        .scenes
        .iter()
        .map(|scene| {
            for shot in &scene.shot_directions {
                push_unique(&mut camera_shots, shot);
            }
            for setup in &scene.lighting_setups {
                push_unique(&mut lighting, setup);
            }
            for recommendation in scene_recommendations(scene) {
                if !recommendations
                    .iter()
                    .any(|r| r.category == recommendation.category)
                {
                    recommendations.push(recommendation);
                }
            }

            ScenePlan {
                location: scene.location.clone(),
                interior: scene.interior,
                time_of_day: scene.time_of_day,
                shots: scene.shot_directions.clone(),
                lighting: scene.lighting_setups.clone(),
            }
        })
        .collect();

    CameraPlan {
        scenes,
        camera_shots,
        lighting,
        recommendations,
    }
}

fn scene_recommendations(scene: &Scene) -> Vec<Recommendation> {
    let mut text = scene.action.join(" ").to_lowercase();
    for shot in &scene.shot_directions {
        text.push(' ');
        text.push_str(shot);
    }

    EQUIPMENT_HINTS
        .iter()
        .filter(|(_, keywords, _)| keywords.iter().any(|k| text.contains(k)))
        .map(|(category, _, suggestion)| Recommendation {
            category: category.to_string(),
            suggestion: suggestion.to_string(),
        })
        .collect()
}

fn push_unique(values: &mut Vec<String>, value: &str) {
    if !values.iter().any(|v| v == value) {
        values.push(value.to_string());
    }
}
