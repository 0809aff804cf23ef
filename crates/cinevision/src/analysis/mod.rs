//! Read-only analyses over a screenplay.

pub mod budget;
pub mod camera;
pub mod roles;
pub mod suggestions;

use serde::{Deserialize, Serialize};

pub use budget::{analyze_budget, BudgetEstimate, BudgetRange};
pub use camera::{analyze_camera, CameraPlan, Recommendation, ScenePlan};
pub use roles::{analyze_roles, CharacterProfile, Importance, RoleReport};
pub use suggestions::{analyze_suggestions, ProductionSuggestions};

use crate::screenplay::parse;
use crate::worker::WorkerKind;

/// The synchronous analyses exposed under `/analyze/{kind}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisKind {
    Characters,
    Budget,
    Camera,
    Suggestions,
}

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 4] = [
        AnalysisKind::Characters,
        AnalysisKind::Budget,
        AnalysisKind::Camera,
        AnalysisKind::Suggestions,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisKind::Characters => "characters",
            AnalysisKind::Budget => "budget",
            AnalysisKind::Camera => "camera",
            AnalysisKind::Suggestions => "suggestions",
        }
    }

    /// Case-sensitive match on the route segment.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }

    pub fn worker_kind(&self) -> WorkerKind {
        match self {
            AnalysisKind::Characters => WorkerKind::Characters,
            AnalysisKind::Budget => WorkerKind::Budget,
            AnalysisKind::Camera => WorkerKind::Camera,
            AnalysisKind::Suggestions => WorkerKind::Suggestions,
        }
    }

    /// Runs the built-in analyzer for this kind.
    pub fn run_builtin(&self, script_text: &str) -> serde_json::Result<serde_json::Value> {
        match self {
            AnalysisKind::Characters => serde_json::to_value(analyze_roles(&parse(script_text))),
            AnalysisKind::Budget => serde_json::to_value(analyze_budget(script_text)),
            AnalysisKind::Camera => serde_json::to_value(analyze_camera(&parse(script_text))),
            AnalysisKind::Suggestions => {
                serde_json::to_value(analyze_suggestions(&parse(script_text), script_text))
            }
        }
    }
}

impl std::fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything `/upload` returns, computed from a single parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptReport {
    pub roles: RoleReport,
    pub budget: BudgetEstimate,
    pub camera: CameraPlan,
}

impl ScriptReport {
    pub fn build(script_text: &str) -> Self {
        let parsed = parse(script_text);
        Self {
            roles: analyze_roles(&parsed),
            budget: analyze_budget(script_text),
            camera: analyze_camera(&parsed),
        }
    }
}
