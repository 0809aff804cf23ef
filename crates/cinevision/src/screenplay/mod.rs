//! Heuristic screenplay parsing.
//!
//! Raw script text is split into lines, each line is classified by
//! [`LineClassifier`], and a single forward pass builds scenes and
//! character cues from the classifications.

pub mod classify;
pub mod model;
pub mod parser;

pub use classify::{classify_line, HeuristicClassifier, LineClassifier, LineKind};
pub use model::{
    CharacterCue, DialogueLine, ParsedScript, Scene, SceneHeading, ScriptLine, TimeOfDay,
};
pub use parser::{parse, ScreenplayParser};
