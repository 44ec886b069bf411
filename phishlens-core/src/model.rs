use phishlens_client::Verdict;
use serde::{Deserialize, Serialize};

/// One submission to the classifier. Built per user action, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub url: String,
}

impl AnalysisRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// The verdict currently on display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub is_malicious: bool,
    /// Probability that the URL is phishing, nominally within `[0, 1]`.
    pub confidence: f64,
    pub explanation: Vec<String>,
}

impl From<Verdict> for AnalysisResult {
    fn from(verdict: Verdict) -> Self {
        Self {
            is_malicious: verdict.is_malicious,
            confidence: verdict.confidence,
            explanation: verdict.explanation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UiPhase {
    #[default]
    Idle,
    Loading,
    ResultShown,
}

impl UiPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            UiPhase::Idle => "idle",
            UiPhase::Loading => "loading",
            UiPhase::ResultShown => "result",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerKind {
    Analyze,
    Reanalyze,
    Clear,
    Retrain,
}

impl TriggerKind {
    pub fn idle_label(&self) -> &'static str {
        match self {
            TriggerKind::Analyze => "Analyze URL",
            TriggerKind::Reanalyze => "Re-analyze",
            TriggerKind::Clear => "Clear",
            TriggerKind::Retrain => "Retrain Model",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A blocking message the user has to acknowledge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}
