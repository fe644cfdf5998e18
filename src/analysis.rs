use serde::Serialize;

use crate::channel::ChannelRegistry;
use crate::error::AnalysisError;
use crate::sample::Sample;

/// Language the analysis text should come back in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum AnalysisLocale {
    English,
    Chinese,
}

impl AnalysisLocale {
    pub fn tag(self) -> &'static str {
        match self {
            AnalysisLocale::English => "en",
            AnalysisLocale::Chinese => "zh",
        }
    }
}

/// Payload for the opaque analysis service: the full sample sequence with
/// channel keys replaced by their display names, a free-text user note, and
/// the locale. Text in, text or failure out; no further contract.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisRequest {
    pub columns: Vec<String>,
    pub samples: Vec<Sample>,
    pub note: String,
    pub locale: AnalysisLocale,
}

impl AnalysisRequest {
    pub fn new(
        samples: Vec<Sample>,
        registry: &ChannelRegistry,
        note: impl Into<String>,
        locale: AnalysisLocale,
    ) -> Self {
        Self {
            columns: registry.display_names().iter().map(|s| (*s).to_owned()).collect(),
            samples,
            note: note.into(),
            locale,
        }
    }

    /// Wire form handed to service implementations.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "locale": self.locale.tag(),
            "note": self.note,
            "columns": self.columns,
            "samples": self.samples,
        })
    }
}

/// External analysis backend. Implementations typically wrap a network call;
/// the core only needs the text-in/text-out shape.
pub trait AnalysisService {
    fn analyze(&self, request: &AnalysisRequest) -> Result<String, AnalysisError>;
}

/// Outcome slot kept on the session. `Failed` is distinct from
/// `NotRequested` so consumers can tell "the service said no" from "nobody
/// asked yet"; `clear` resets to `NotRequested`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AnalysisState {
    #[default]
    NotRequested,
    Ready(String),
    Failed(String),
}
