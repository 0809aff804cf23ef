//! Structured screenplay model produced by the parser.

use serde::{Deserialize, Serialize};

/// One line of the input, split on line breaks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptLine {
    pub index: usize,
    pub raw_text: String,
    pub trimmed_text: String,
}

impl ScriptLine {
    pub fn new(index: usize, raw_text: &str) -> Self {
        Self {
            index,
            raw_text: raw_text.to_string(),
            trimmed_text: raw_text.trim().to_string(),
        }
    }
}

/// Time of day announced by a scene heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Day,
    Night,
    Morning,
    Evening,
    Continuous,
    Unknown,
}

impl TimeOfDay {
    /// Parses the time token of a scene heading, case-insensitively.
    pub fn from_token(token: Option<&str>) -> Self {
        match token.map(|t| t.to_ascii_lowercase()).as_deref() {
            Some("day") => TimeOfDay::Day,
            Some("night") => TimeOfDay::Night,
            Some("morning") => TimeOfDay::Morning,
            Some("evening") => TimeOfDay::Evening,
            Some("continuous") => TimeOfDay::Continuous,
            _ => TimeOfDay::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeOfDay::Day => "day",
            TimeOfDay::Night => "night",
            TimeOfDay::Morning => "morning",
            TimeOfDay::Evening => "evening",
            TimeOfDay::Continuous => "continuous",
            TimeOfDay::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const NATURAL_LIGHT: &str = "Natural light";
pub const ARTIFICIAL_LIGHT: &str = "Artificial light";
pub const PRACTICAL_LIGHTS: &str = "Practical lights";

/// A parsed scene heading, before it becomes a [`Scene`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneHeading {
    pub interior: bool,
    pub location: String,
    pub time_of_day: TimeOfDay,
}

/// A scene, opened by a heading and closed by the next heading or end of input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub location: String,
    pub interior: bool,
    pub time_of_day: TimeOfDay,
    pub heading_line_index: usize,
    /// Lower-cased parenthetical directions, in order of appearance.
    pub shot_directions: Vec<String>,
    /// Unique lighting setups: the defaults first, then authored ones.
    pub lighting_setups: Vec<String>,
    /// Unique character names cued inside this scene.
    pub characters: Vec<String>,
    /// Prose lines not attributed as dialogue.
    pub action: Vec<String>,
}

impl Scene {
    /// Opens a scene and derives its default lighting.
    pub fn open(heading: SceneHeading, heading_line_index: usize) -> Self {
        let mut scene = Self {
            location: heading.location,
            interior: heading.interior,
            time_of_day: heading.time_of_day,
            heading_line_index,
            shot_directions: vec![],
            lighting_setups: vec![],
            characters: vec![],
            action: vec![],
        };

        match scene.time_of_day {
            TimeOfDay::Day => scene.add_lighting(NATURAL_LIGHT),
            TimeOfDay::Night => {
                scene.add_lighting(ARTIFICIAL_LIGHT);
                if scene.interior {
                    scene.add_lighting(PRACTICAL_LIGHTS);
                }
            }
            _ => {}
        }

        scene
    }

    pub fn add_lighting(&mut self, setup: &str) {
        if !self.lighting_setups.iter().any(|s| s == setup) {
            self.lighting_setups.push(setup.to_string());
        }
    }

    pub fn add_character(&mut self, name: &str) {
        if !self.characters.iter().any(|c| c == name) {
            self.characters.push(name.to_string());
        }
    }

    /// Heading text rebuilt from the parsed parts.
    pub fn heading(&self) -> String {
        let prefix = if self.interior { "INT." } else { "EXT." };
        match self.time_of_day {
            TimeOfDay::Unknown => format!("{} {}", prefix, self.location),
            time => format!(
                "{} {} - {}",
                prefix,
                self.location,
                time.as_str().to_ascii_uppercase()
            ),
        }
    }
}

/// A line attributed as dialogue to the preceding cue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogueLine {
    pub line_index: usize,
    pub text: String,
}

/// An upper-case line naming a speaker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterCue {
    pub line_index: usize,
    /// Normalized name: text before any parenthetical, trimmed.
    pub name: String,
    pub dialogue: Option<DialogueLine>,
}

/// Output of a single parser pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedScript {
    pub lines: Vec<ScriptLine>,
    pub scenes: Vec<Scene>,
    pub character_cues: Vec<CharacterCue>,
    /// De-duplicated shot directions across all scenes, first-seen order.
    pub shot_catalogue: Vec<String>,
}
