// Analyze / re-analyze / clear transitions over a Session

use crate::model::{AnalysisRequest, AnalysisResult, Notice, TriggerKind, UiPhase};
use crate::session::Session;
use crate::visual::RiskView;
use phishlens_client::{Classifier, ClientError, PredictResponse};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const ANALYZING_LABEL: &str = "Analyzing... ⏳";
pub const ANALYSIS_FAILED: &str = "An error occurred while analyzing the URL.";

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitError {
    #[error("{0:?} is already working on a request")]
    Busy(TriggerKind),

    #[error("{0:?} is disabled")]
    Disabled(TriggerKind),
}

/// Ties a response back to the submission that issued it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisTicket {
    pub sequence: u64,
    pub trigger: TriggerKind,
    pub resume_phase: UiPhase,
    pub request: AnalysisRequest,
}

#[derive(Debug)]
pub enum AnalysisOutcome {
    Verdict(AnalysisResult),
    /// The server reported a validation error.
    Rejected(String),
    /// Nothing interpretable came back.
    Failed(ClientError),
}

impl From<Result<PredictResponse, ClientError>> for AnalysisOutcome {
    fn from(response: Result<PredictResponse, ClientError>) -> Self {
        match response {
            Ok(PredictResponse::Verdict(verdict)) => AnalysisOutcome::Verdict(verdict.into()),
            Ok(PredictResponse::Rejected(message)) => AnalysisOutcome::Rejected(message),
            Err(e) => AnalysisOutcome::Failed(e),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finished {
    Shown,
    Rejected,
    Failed,
    /// A newer submission or a clear superseded this request.
    Stale,
}

/// Starts an analysis of `url` from whichever submit control is showing.
pub fn begin(session: &mut Session, url: &str) -> Result<AnalysisTicket, SubmitError> {
    let kind = session.active_submit_trigger();
    let trigger = session.trigger(kind);
    if trigger.is_busy() {
        return Err(SubmitError::Busy(kind));
    }
    if !trigger.is_enabled() {
        return Err(SubmitError::Disabled(kind));
    }

    let sequence = session.next_sequence();
    let resume_phase = session.phase;

    session.current_url = url.to_string();
    session.trigger_mut(kind).mark_busy(sequence, ANALYZING_LABEL);
    session.loading_from = resume_phase;
    session.phase = UiPhase::Loading;
    session.in_flight = Some(sequence);

    debug!("Analysis #{} of {} started from {:?}", sequence, url, kind);

    Ok(AnalysisTicket {
        sequence,
        trigger: kind,
        resume_phase,
        request: AnalysisRequest::new(url),
    })
}

/// Applies the response for `ticket`. The ticket's trigger is restored
/// whatever the outcome.
pub fn finish(
    session: &mut Session,
    ticket: &AnalysisTicket,
    outcome: AnalysisOutcome,
    now: Instant,
) -> Finished {
    session.trigger_mut(ticket.trigger).restore(ticket.sequence);

    if session.in_flight != Some(ticket.sequence) {
        debug!("Dropping superseded response for analysis #{}", ticket.sequence);
        return Finished::Stale;
    }
    session.in_flight = None;

    match outcome {
        AnalysisOutcome::Rejected(message) => {
            info!("Server rejected {}: {}", ticket.request.url, message);
            session.phase = ticket.resume_phase;
            session.set_notice(Notice::error(message));
            Finished::Rejected
        }
        AnalysisOutcome::Failed(e) => {
            warn!("Analysis of {} failed: {}", ticket.request.url, e);
            session.phase = ticket.resume_phase;
            session.set_notice(Notice::error(ANALYSIS_FAILED));
            Finished::Failed
        }
        AnalysisOutcome::Verdict(result) => {
            let view = RiskView::from_result(&result);
            info!(
                "{} -> {} ({})",
                ticket.request.url, view.status_label, view.confidence_text
            );

            session.marker.restart(view.marker_percent, now);
            session.risk_view = Some(view);
            session.result = Some(result);
            session.phase = UiPhase::ResultShown;
            session.result_visible = true;
            session.scroll_pending = true;
            Finished::Shown
        }
    }
}

/// Submits `url` and waits for the classifier. Result and visuals are
/// only touched once the response has been parsed.
pub async fn analyze<C: Classifier>(
    session: &mut Session,
    classifier: &C,
    url: &str,
) -> Result<Finished, SubmitError> {
    let ticket = begin(session, url)?;
    let outcome = AnalysisOutcome::from(classifier.predict(&ticket.request.url).await);
    Ok(finish(session, &ticket, outcome, Instant::now()))
}

/// Back to the initial screen. Does not contact the server; a request
/// still in flight is left to complete and its response is dropped.
pub fn clear(session: &mut Session) {
    if let Some(sequence) = session.in_flight.take() {
        debug!("Clear superseded analysis #{}", sequence);
    }
    session.phase = UiPhase::Idle;
    session.loading_from = UiPhase::Idle;
    session.result = None;
    session.risk_view = None;
    session.result_visible = false;
    session.scroll_pending = false;
    session.input.clear();
    session.analyze.force_restore();
    session.reanalyze.force_restore();
}

#[cfg(test)]
mod tests {
    use super::*;
    use phishlens_client::Verdict;

    fn verdict(confidence: f64) -> AnalysisOutcome {
        AnalysisOutcome::Verdict(AnalysisResult {
            is_malicious: confidence > 0.5,
            confidence,
            explanation: vec!["reason".to_string()],
        })
    }

    #[test]
    fn test_begin_marks_trigger_busy() {
        let mut session = Session::new();
        let ticket = begin(&mut session, "http://example.com").unwrap();

        assert_eq!(ticket.trigger, TriggerKind::Analyze);
        assert_eq!(session.phase(), UiPhase::Loading);
        assert_eq!(session.current_url(), "http://example.com");
        let trigger = session.trigger(TriggerKind::Analyze);
        assert_eq!(trigger.label(), ANALYZING_LABEL);
        assert!(!trigger.is_enabled());
        // The initial group stays on screen while loading
        assert!(session.is_visible(TriggerKind::Analyze));
        assert!(!session.is_visible(TriggerKind::Reanalyze));
        // Nothing is shown before the response arrives
        assert!(session.result().is_none());
        assert!(session.risk_view().is_none());
        assert_eq!(session.marker().target(), None);
        assert!(!session.is_result_visible());
    }

    #[test]
    fn test_begin_rejects_reentry() {
        let mut session = Session::new();
        begin(&mut session, "http://a.example").unwrap();
        assert_eq!(
            begin(&mut session, "http://b.example"),
            Err(SubmitError::Busy(TriggerKind::Analyze))
        );
        assert_eq!(session.current_url(), "http://a.example");
    }

    #[test]
    fn test_verdict_swaps_controls() {
        let mut session = Session::new();
        let ticket = begin(&mut session, "http://example.com").unwrap();
        let finished = finish(&mut session, &ticket, verdict(0.9), Instant::now());

        assert_eq!(finished, Finished::Shown);
        assert_eq!(session.phase(), UiPhase::ResultShown);
        assert!(!session.is_visible(TriggerKind::Analyze));
        assert!(session.is_visible(TriggerKind::Clear));
        assert!(session.is_visible(TriggerKind::Reanalyze));
        assert!(session.is_result_visible());
        assert!(session.take_scroll_request());
        assert_eq!(session.trigger(TriggerKind::Analyze).label(), "Analyze URL");
        assert!(session.trigger(TriggerKind::Analyze).is_enabled());
    }

    #[test]
    fn test_reanalyze_uses_followup_trigger() {
        let mut session = Session::new();
        let first = begin(&mut session, "http://example.com").unwrap();
        finish(&mut session, &first, verdict(0.2), Instant::now());

        let second = begin(&mut session, "http://example.org").unwrap();
        assert_eq!(second.trigger, TriggerKind::Reanalyze);
        assert_eq!(second.resume_phase, UiPhase::ResultShown);
        assert!(session.is_visible(TriggerKind::Reanalyze));
        assert!(!session.is_visible(TriggerKind::Analyze));

        finish(
            &mut session,
            &second,
            AnalysisOutcome::Rejected("URL is unreachable or invalid.".to_string()),
            Instant::now(),
        );
        // Prior result stays, phase reverts to showing it
        assert_eq!(session.phase(), UiPhase::ResultShown);
        assert_eq!(session.result().unwrap().confidence, 0.2);
        assert_eq!(session.trigger(TriggerKind::Reanalyze).label(), "Re-analyze");
    }

    #[test]
    fn test_failure_sets_generic_notice() {
        let mut session = Session::new();
        let ticket = begin(&mut session, "http://example.com").unwrap();
        let outcome = AnalysisOutcome::Failed(ClientError::Decode("bad body".to_string()));
        assert_eq!(finish(&mut session, &ticket, outcome, Instant::now()), Finished::Failed);

        assert_eq!(session.phase(), UiPhase::Idle);
        assert!(session.result().is_none());
        assert_eq!(session.notice().unwrap().text, ANALYSIS_FAILED);
        assert!(session.trigger(TriggerKind::Analyze).is_enabled());
    }

    #[test]
    fn test_clear_during_loading_drops_late_response() {
        let mut session = Session::new();
        session.input = "http://example.com".to_string();
        let ticket = begin(&mut session, "http://example.com").unwrap();

        clear(&mut session);
        assert_eq!(session.phase(), UiPhase::Idle);
        assert!(session.input.is_empty());
        assert!(session.trigger(TriggerKind::Analyze).is_enabled());
        assert_eq!(session.current_url(), "http://example.com");

        let finished = finish(&mut session, &ticket, verdict(0.7), Instant::now());
        assert_eq!(finished, Finished::Stale);
        assert!(session.result().is_none());
        assert_eq!(session.phase(), UiPhase::Idle);
    }

    #[test]
    fn test_stale_response_does_not_release_newer_request() {
        let mut session = Session::new();
        let old = begin(&mut session, "http://old.example").unwrap();
        clear(&mut session);
        let new = begin(&mut session, "http://new.example").unwrap();

        assert_eq!(finish(&mut session, &old, verdict(0.1), Instant::now()), Finished::Stale);
        assert!(session.trigger(TriggerKind::Analyze).is_busy());

        assert_eq!(finish(&mut session, &new, verdict(0.1), Instant::now()), Finished::Shown);
        assert!(!session.trigger(TriggerKind::Analyze).is_busy());
    }

    #[test]
    fn test_outcome_from_response() {
        let ok: Result<PredictResponse, ClientError> = Ok(PredictResponse::Verdict(Verdict {
            is_malicious: true,
            confidence: 0.8,
            explanation: vec![],
        }));
        assert!(matches!(AnalysisOutcome::from(ok), AnalysisOutcome::Verdict(_)));

        let rejected: Result<PredictResponse, ClientError> =
            Ok(PredictResponse::Rejected("No URL provided".to_string()));
        assert!(matches!(
            AnalysisOutcome::from(rejected),
            AnalysisOutcome::Rejected(m) if m == "No URL provided"
        ));
    }
}
