//! In-process storyboard breakdown, used when no external storyboard worker
//! is configured.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, info_span, Instrument};

use super::{AnalyzerWorker, EventSink, ProgressEvent, WorkerInput, WorkerOutcome};
use crate::error::WorkerError;
use crate::screenplay::{parse, ParsedScript, Scene, TimeOfDay};

pub const STORYBOARD_FILE_NAME: &str = "storyboard.json";

const MOOD_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "tense",
        &["nervous", "worried", "scared", "fear", "tension", "anxiety"],
    ),
    (
        "happy",
        &["laugh", "smile", "joy", "happy", "excited", "cheerful"],
    ),
    ("sad", &["cry", "tears", "sorrow", "sad", "depressed", "gloomy"]),
    (
        "angry",
        &["shout", "angry", "fury", "rage", "mad", "furious"],
    ),
    (
        "romantic",
        &["love", "kiss", "embrace", "romantic", "tender", "intimate"],
    ),
];

pub const NEUTRAL_MOOD: &str = "neutral";

/// One storyboard frame per scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryboardPanel {
    pub id: String,
    pub scene_number: usize,
    pub heading: String,
    pub location: String,
    pub time_of_day: TimeOfDay,
    pub interior: bool,
    pub mood: String,
    pub shots: Vec<String>,
    pub lighting: Vec<String>,
    pub characters: Vec<String>,
    pub description: String,
}

impl StoryboardPanel {
    pub fn from_scene(number: usize, scene: &Scene, parsed: &ParsedScript) -> Self {
        let dialogue = scene_dialogue(scene, parsed);
        let description = if scene.action.is_empty() {
            scene.heading()
        } else {
            scene.action.join(" ")
        };

        Self {
            id: format!("scene_{}", number),
            scene_number: number,
            heading: scene.heading(),
            location: scene.location.clone(),
            time_of_day: scene.time_of_day,
            interior: scene.interior,
            mood: detect_mood(&format!("{} {}", scene.action.join(" "), dialogue)).to_string(),
            shots: scene.shot_directions.clone(),
            lighting: scene.lighting_setups.clone(),
            characters: scene.characters.clone(),
            description,
        }
    }
}

/// Dialogue attributed to cues between this scene's heading and the next.
fn scene_dialogue(scene: &Scene, parsed: &ParsedScript) -> String {
    let end = parsed
        .scenes
        .iter()
        .map(|s| s.heading_line_index)
        .find(|&index| index > scene.heading_line_index)
        .unwrap_or(usize::MAX);

    parsed
        .character_cues
        .iter()
        .filter(|cue| cue.line_index > scene.heading_line_index && cue.line_index < end)
        .filter_map(|cue| cue.dialogue.as_ref().map(|d| d.text.as_str()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Highest keyword score wins; ties go to the earlier mood.
pub fn detect_mood(text: &str) -> &'static str {
    let text = text.to_lowercase();
    let mut best = (NEUTRAL_MOOD, 0);

    for (mood, keywords) in MOOD_KEYWORDS {
        let score = keywords.iter().filter(|k| text.contains(*k)).count();
        if score > best.1 {
            best = (*mood, score);
        }
    }

    best.0
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinStoryboardWorker;

#[async_trait]
impl AnalyzerWorker for BuiltinStoryboardWorker {
    async fn run(
        &self,
        input: &WorkerInput,
        events: EventSink,
    ) -> Result<WorkerOutcome, WorkerError> {
        let span = info_span!("storyboard", script = %input.script_path.display());

        async move {
            let text = tokio::fs::read_to_string(&input.script_path).await?;
            let parsed = parse(&text);
            let total = parsed.scenes.len();

            let mut panels: Vec<StoryboardPanel> = Vec::with_capacity(total);
            for (i, scene) in parsed.scenes.iter().enumerate() {
                let number = i + 1;
                panels.push(StoryboardPanel::from_scene(number, scene, &parsed));

                events.send(
                    ProgressEvent::processing(format!("Processing scene {}/{}", number, total))
                        .with("progress", json!(number as f64 / total as f64 * 100.0))
                        .with("scenes", json!(panels)),
                );
            }

            if let Some(output_dir) = &input.output_dir {
                let document = json!({ "scenes": panels, "totalScenes": total });
                let bytes = serde_json::to_vec_pretty(&document)
                    .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
                tokio::fs::write(output_dir.join(STORYBOARD_FILE_NAME), bytes).await?;
            }

            info!(scenes = total, "Storyboard generated");
            events.send(
                ProgressEvent::completed("Storyboard generation complete")
                    .with("scenes", json!(panels)),
            );

            Ok::<_, WorkerError>(WorkerOutcome::success())
        }
        .instrument(span)
        .await
    }
}
