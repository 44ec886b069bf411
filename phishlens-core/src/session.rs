use crate::modal::ModalManager;
use crate::model::{AnalysisResult, Notice, TriggerKind, UiPhase};
use crate::report::ReportContext;
use crate::visual::{MarkerAnimation, RiskView};
use std::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq)]
struct BusyState {
    owner: u64,
    original_label: String,
}

/// A button: its label, whether it accepts activation, and which request
/// (if any) currently holds it in its working state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trigger {
    label: String,
    enabled: bool,
    busy: Option<BusyState>,
}

impl Trigger {
    fn new(kind: TriggerKind) -> Self {
        Self {
            label: kind.idle_label().to_string(),
            enabled: true,
            busy: None,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_some()
    }

    pub(crate) fn mark_busy(&mut self, owner: u64, working_label: &str) {
        let original_label = std::mem::replace(&mut self.label, working_label.to_string());
        self.busy = Some(BusyState {
            owner,
            original_label,
        });
        self.enabled = false;
    }

    /// Puts the label and enabled state back, but only for the request
    /// that made the trigger busy.
    pub(crate) fn restore(&mut self, owner: u64) {
        if self.busy.as_ref().is_some_and(|busy| busy.owner == owner) {
            self.force_restore();
        }
    }

    pub(crate) fn force_restore(&mut self) {
        if let Some(busy) = self.busy.take() {
            self.label = busy.original_label;
        }
        self.enabled = true;
    }
}

/// The whole interactive state of one client session.
///
/// Every controller takes the session by `&mut`; nothing else holds UI
/// state.
#[derive(Debug, Clone)]
pub struct Session {
    /// Contents of the URL input field.
    pub input: String,
    pub modals: ModalManager,
    pub(crate) phase: UiPhase,
    pub(crate) loading_from: UiPhase,
    pub(crate) current_url: String,
    pub(crate) result: Option<AnalysisResult>,
    pub(crate) risk_view: Option<RiskView>,
    pub(crate) marker: MarkerAnimation,
    pub(crate) result_visible: bool,
    pub(crate) scroll_pending: bool,
    pub(crate) analyze: Trigger,
    pub(crate) reanalyze: Trigger,
    pub(crate) clear: Trigger,
    pub(crate) retrain: Trigger,
    pub(crate) notice: Option<Notice>,
    pub(crate) sequence: u64,
    pub(crate) in_flight: Option<u64>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            input: String::new(),
            modals: ModalManager::new(),
            phase: UiPhase::Idle,
            loading_from: UiPhase::Idle,
            current_url: String::new(),
            result: None,
            risk_view: None,
            marker: MarkerAnimation::new(),
            result_visible: false,
            scroll_pending: false,
            analyze: Trigger::new(TriggerKind::Analyze),
            reanalyze: Trigger::new(TriggerKind::Reanalyze),
            clear: Trigger::new(TriggerKind::Clear),
            retrain: Trigger::new(TriggerKind::Retrain),
            notice: None,
            sequence: 0,
            in_flight: None,
        }
    }

    pub fn phase(&self) -> UiPhase {
        self.phase
    }

    /// The most recently submitted URL. Survives `clear`.
    pub fn current_url(&self) -> &str {
        &self.current_url
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    pub fn risk_view(&self) -> Option<&RiskView> {
        self.risk_view.as_ref()
    }

    pub fn marker(&self) -> &MarkerAnimation {
        &self.marker
    }

    pub fn marker_position(&self, now: Instant) -> f64 {
        self.marker.position_at(now)
    }

    pub fn is_result_visible(&self) -> bool {
        self.result_visible
    }

    pub fn is_loading(&self) -> bool {
        self.phase == UiPhase::Loading
    }

    /// Whether clear + re-analyze are showing instead of analyze. While a
    /// request is loading the group that started it stays on screen.
    pub fn shows_followup_controls(&self) -> bool {
        match self.phase {
            UiPhase::Idle => false,
            UiPhase::ResultShown => true,
            UiPhase::Loading => self.loading_from == UiPhase::ResultShown,
        }
    }

    pub fn is_visible(&self, kind: TriggerKind) -> bool {
        match kind {
            TriggerKind::Analyze => !self.shows_followup_controls(),
            TriggerKind::Reanalyze | TriggerKind::Clear => self.shows_followup_controls(),
            TriggerKind::Retrain => true,
        }
    }

    /// The submit control currently on screen.
    pub fn active_submit_trigger(&self) -> TriggerKind {
        if self.shows_followup_controls() {
            TriggerKind::Reanalyze
        } else {
            TriggerKind::Analyze
        }
    }

    pub fn trigger(&self, kind: TriggerKind) -> &Trigger {
        match kind {
            TriggerKind::Analyze => &self.analyze,
            TriggerKind::Reanalyze => &self.reanalyze,
            TriggerKind::Clear => &self.clear,
            TriggerKind::Retrain => &self.retrain,
        }
    }

    pub(crate) fn trigger_mut(&mut self, kind: TriggerKind) -> &mut Trigger {
        match kind {
            TriggerKind::Analyze => &mut self.analyze,
            TriggerKind::Reanalyze => &mut self.reanalyze,
            TriggerKind::Clear => &mut self.clear,
            TriggerKind::Retrain => &mut self.retrain,
        }
    }

    pub(crate) fn next_sequence(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn set_notice(&mut self, notice: Notice) {
        self.notice = Some(notice);
    }

    /// Dismisses the current notice and returns it.
    pub fn acknowledge_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    /// Returns `true` once after a new result was shown, so the front end
    /// can bring the result region into view.
    pub fn take_scroll_request(&mut self) -> bool {
        std::mem::take(&mut self.scroll_pending)
    }

    /// Inputs for a report on the current result, if one is shown.
    pub fn report_context(&self) -> Option<ReportContext> {
        let result = self.result.as_ref()?;
        let view = self.risk_view.as_ref()?;
        Some(ReportContext {
            url: self.current_url.clone(),
            status_label: view.status_label.to_string(),
            confidence_text: view.confidence_text.clone(),
            reasons: result.explanation.clone(),
        })
    }
}
