// Confirm -> request -> report flow for server-side retraining

use crate::analysis::SubmitError;
use crate::modal::ConfirmAction;
use crate::model::TriggerKind;
use crate::session::Session;
use phishlens_client::{Classifier, ClientError, RetrainResponse};
use tracing::{info, warn};

pub const RETRAIN_WARNING: &str =
    "Are you sure you want to retrain the AI model? This process may take a few seconds.";
pub const TRAINING_LABEL: &str = "Training... ⏳";
pub const RETRAIN_FAILED: &str = "Error: Failed to retrain model.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrainTicket {
    pub sequence: u64,
}

/// How a retrain request ended. The info dialog shows the same text, but
/// callers branch on this rather than on the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Retrained {
    /// The server's message.
    Completed(String),
    Failed,
}

/// Asks the user to confirm. Nothing is sent until the confirmation
/// resolves to [`ConfirmAction::Retrain`].
pub fn request(session: &mut Session) {
    session.modals.open_confirm(RETRAIN_WARNING, ConfirmAction::Retrain);
}

pub fn begin(session: &mut Session) -> Result<RetrainTicket, SubmitError> {
    let trigger = session.trigger(TriggerKind::Retrain);
    if trigger.is_busy() {
        return Err(SubmitError::Busy(TriggerKind::Retrain));
    }
    if !trigger.is_enabled() {
        return Err(SubmitError::Disabled(TriggerKind::Retrain));
    }

    let sequence = session.next_sequence();
    session
        .trigger_mut(TriggerKind::Retrain)
        .mark_busy(sequence, TRAINING_LABEL);
    Ok(RetrainTicket { sequence })
}

/// Shows the server message (or a generic failure) in the info dialog and
/// restores the retrain trigger.
pub fn finish(
    session: &mut Session,
    ticket: RetrainTicket,
    response: Result<RetrainResponse, ClientError>,
) -> Retrained {
    let retrained = match response {
        Ok(response) => {
            info!("Retrain finished: {}", response.message);
            session.modals.open_info(&response.message);
            Retrained::Completed(response.message)
        }
        Err(e) => {
            warn!("Retrain failed: {}", e);
            session.modals.open_info(RETRAIN_FAILED);
            Retrained::Failed
        }
    };

    session
        .trigger_mut(TriggerKind::Retrain)
        .restore(ticket.sequence);
    retrained
}

pub async fn retrain<C: Classifier>(
    session: &mut Session,
    classifier: &C,
) -> Result<Retrained, SubmitError> {
    let ticket = begin(session)?;
    let response = classifier.retrain().await;
    Ok(finish(session, ticket, response))
}

/// Confirm-button handler: runs the pending action if there is one.
/// Returns `None` when nothing was pending.
pub async fn confirm_and_run<C: Classifier>(
    session: &mut Session,
    classifier: &C,
) -> Result<Option<Retrained>, SubmitError> {
    match session.modals.confirm() {
        Some(ConfirmAction::Retrain) => Ok(Some(retrain(session, classifier).await?)),
        None => Ok(None),
    }
}
