use tracing::debug;

use super::classify::{HeuristicClassifier, LineClassifier, LineKind};
use super::model::{CharacterCue, DialogueLine, ParsedScript, Scene, ScriptLine};

/// Single forward pass over screenplay lines.
///
/// Looks ahead exactly one line to attribute dialogue to a character cue and
/// never revisits earlier lines.
pub struct ScreenplayParser<C: LineClassifier = HeuristicClassifier> {
    classifier: C,
}

impl ScreenplayParser<HeuristicClassifier> {
    pub fn new() -> Self {
        Self::with_classifier(HeuristicClassifier)
    }
}

impl Default for ScreenplayParser<HeuristicClassifier> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: LineClassifier> ScreenplayParser<C> {
    pub fn with_classifier(classifier: C) -> Self {
        Self { classifier }
    }

    pub fn parse(&self, text: &str) -> ParsedScript {
        let lines: Vec<ScriptLine> = text
            .split('\n')
            .enumerate()
            .map(|(index, raw)| ScriptLine::new(index, raw))
            .collect();
        let kinds: Vec<LineKind> = lines
            .iter()
            .map(|line| self.classifier.classify(&line.trimmed_text))
            .collect();

        let mut scenes = Vec::new();
        let mut character_cues = Vec::new();
        let mut shot_catalogue: Vec<String> = Vec::new();
        let mut current: Option<Scene> = None;
        // Line already consumed as dialogue by the cue right above it.
        let mut attributed: Option<usize> = None;

        for (line, kind) in lines.iter().zip(&kinds) {
            match kind {
                LineKind::SceneHeading(heading) => {
                    if let Some(scene) = current.take() {
                        scenes.push(scene);
                    }
                    current = Some(Scene::open(heading.clone(), line.index));
                }
                LineKind::CharacterCue { name } => {
                    let dialogue = self.dialogue_after(line.index, &lines, &kinds);
                    if dialogue.is_some() {
                        attributed = Some(line.index + 1);
                    }
                    if let Some(scene) = current.as_mut() {
                        scene.add_character(name);
                    }
                    character_cues.push(CharacterCue {
                        line_index: line.index,
                        name: name.clone(),
                        dialogue,
                    });
                }
                LineKind::Prose => {
                    if attributed != Some(line.index) {
                        if let Some(scene) = current.as_mut() {
                            scene.action.push(line.trimmed_text.clone());
                        }
                    }
                }
                LineKind::Blank | LineKind::Parenthetical => {}
            }

            // Parentheticals outside any scene are dropped.
            if let Some(scene) = current.as_mut() {
                if let Some(shot) = self.classifier.shot_direction(&line.trimmed_text) {
                    if self.classifier.is_lighting_direction(&shot) {
                        scene.add_lighting(&shot);
                    }
                    if !shot_catalogue.contains(&shot) {
                        shot_catalogue.push(shot.clone());
                    }
                    scene.shot_directions.push(shot);
                }
            }
        }

        if let Some(scene) = current.take() {
            scenes.push(scene);
        }

        debug!(
            lines = lines.len(),
            scenes = scenes.len(),
            cues = character_cues.len(),
            "Parsed screenplay"
        );

        ParsedScript {
            lines,
            scenes,
            character_cues,
            shot_catalogue,
        }
    }

    /// The next line is dialogue only if it is non-empty and neither a cue
    /// nor a parenthetical-only line. One line per cue; blocks are not merged.
    fn dialogue_after(
        &self,
        index: usize,
        lines: &[ScriptLine],
        kinds: &[LineKind],
    ) -> Option<DialogueLine> {
        let next = index + 1;
        match kinds.get(next)? {
            LineKind::Blank | LineKind::Parenthetical | LineKind::CharacterCue { .. } => None,
            _ => Some(DialogueLine {
                line_index: next,
                text: lines[next].trimmed_text.clone(),
            }),
        }
    }
}

/// Parses with the default heuristics.
pub fn parse(text: &str) -> ParsedScript {
    ScreenplayParser::new().parse(text)
}
