//! Pattern layer deciding what each screenplay line is.
//!
//! Everything downstream of the parser sees only [`LineKind`], so the regular
//! expressions here can be replaced by a grammar without touching analyzers.

use regex::Regex;
use std::sync::LazyLock;

use super::model::{SceneHeading, TimeOfDay};

static RE_SCENE_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(INT\.|EXT\.)\s+(.+?)\s*[-—]?\s*(DAY|NIGHT|MORNING|EVENING|CONTINUOUS)?$")
        .unwrap()
});
static RE_CHARACTER_CUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][A-Z\s]+(?:\(.*\))?$").unwrap());
static RE_PARENTHETICAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\(.*\)$").unwrap());
static RE_SHOT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\((.*?)\)").unwrap());
static RE_LIGHTING_TERM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(lights?|lighting|lit|lamps?|candles?|candlelight|neon|shadows?|silhouetted?|spotlight|moonlight|sunlight|flashlight|backlit)\b",
    )
    .unwrap()
});

/// Classification of a single trimmed line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    Blank,
    SceneHeading(SceneHeading),
    CharacterCue { name: String },
    /// Entire line wrapped in parentheses; never dialogue.
    Parenthetical,
    /// Action or dialogue, decided by context.
    Prose,
}

impl LineKind {
    pub fn is_cue(&self) -> bool {
        matches!(self, LineKind::CharacterCue { .. })
    }
}

/// Seam between the parser and whatever recognizes screenplay elements.
pub trait LineClassifier: Send + Sync {
    /// Classifies one line; callers pass trimmed text.
    fn classify(&self, line: &str) -> LineKind;

    /// Content of the first parenthetical on the line, lower-cased and trimmed.
    fn shot_direction(&self, line: &str) -> Option<String>;

    /// Whether a shot direction also describes lighting.
    fn is_lighting_direction(&self, direction: &str) -> bool;
}

/// Regex heuristics for loosely formatted screenplay text.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicClassifier;

impl LineClassifier for HeuristicClassifier {
    fn classify(&self, line: &str) -> LineKind {
        if line.is_empty() {
            return LineKind::Blank;
        }

        if let Some(heading) = match_scene_heading(line) {
            return LineKind::SceneHeading(heading);
        }

        if RE_PARENTHETICAL.is_match(line) {
            return LineKind::Parenthetical;
        }

        if RE_CHARACTER_CUE.is_match(line) {
            return LineKind::CharacterCue {
                name: cue_name(line),
            };
        }

        LineKind::Prose
    }

    fn shot_direction(&self, line: &str) -> Option<String> {
        let captures = RE_SHOT.captures(line)?;
        let shot = captures.get(1)?.as_str().trim().to_lowercase();
        if shot.is_empty() {
            None
        } else {
            Some(shot)
        }
    }

    fn is_lighting_direction(&self, direction: &str) -> bool {
        RE_LIGHTING_TERM.is_match(direction)
    }
}

/// Classifies a line with the default heuristics.
pub fn classify_line(line: &str) -> LineKind {
    HeuristicClassifier.classify(line.trim())
}

/// Matches `INT.`/`EXT.` headings and splits out location and time of day.
pub fn match_scene_heading(line: &str) -> Option<SceneHeading> {
    let captures = RE_SCENE_HEADING.captures(line)?;
    let prefix = captures.get(1)?.as_str();
    let location = captures.get(2)?.as_str().trim().to_string();

    Some(SceneHeading {
        interior: prefix.eq_ignore_ascii_case("INT."),
        location,
        time_of_day: TimeOfDay::from_token(captures.get(3).map(|m| m.as_str())),
    })
}

fn cue_name(line: &str) -> String {
    line.split('(').next().unwrap_or(line).trim().to_string()
}
