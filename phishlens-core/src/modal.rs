//! Share / info / confirm dialogs.
//!
//! Each kind is its own open/closed flag; opening or closing one never
//! touches another. The confirm dialog carries its pending action as a
//! [`ConfirmAction`] value instead of a stored callback, and resolving it
//! hands the action back to the caller exactly once.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModalKind {
    Share,
    Info,
    Confirm,
}

/// Work deferred until the user confirms it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    Retrain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfirmationState {
    #[default]
    Idle,
    Requested(ConfirmAction),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Confirmed(ConfirmAction),
    Cancelled,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct ModalSlot {
    open: bool,
    message: String,
}

#[derive(Debug, Clone, Default)]
pub struct ModalManager {
    share: ModalSlot,
    info: ModalSlot,
    confirm: ModalSlot,
    pending: ConfirmationState,
}

impl ModalManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, kind: ModalKind) -> &ModalSlot {
        match kind {
            ModalKind::Share => &self.share,
            ModalKind::Info => &self.info,
            ModalKind::Confirm => &self.confirm,
        }
    }

    fn slot_mut(&mut self, kind: ModalKind) -> &mut ModalSlot {
        match kind {
            ModalKind::Share => &mut self.share,
            ModalKind::Info => &mut self.info,
            ModalKind::Confirm => &mut self.confirm,
        }
    }

    /// Opens `kind`. Info and confirm dialogs take `message` as their
    /// content; the share dialog has none and ignores it.
    pub fn open(&mut self, kind: ModalKind, message: Option<&str>) {
        let slot = self.slot_mut(kind);
        slot.open = true;
        if kind != ModalKind::Share
            && let Some(message) = message
        {
            slot.message = message.to_string();
        }
    }

    pub fn open_info(&mut self, message: &str) {
        self.open(ModalKind::Info, Some(message));
    }

    /// Opens the confirm dialog and replaces any pending action.
    pub fn open_confirm(&mut self, message: &str, action: ConfirmAction) {
        self.open(ModalKind::Confirm, Some(message));
        self.pending = ConfirmationState::Requested(action);
    }

    /// Closes `kind`. Closing the confirm dialog, whether by its cancel
    /// control or a click outside it, drops the pending action unfired.
    pub fn close(&mut self, kind: ModalKind) -> Option<Resolution> {
        self.slot_mut(kind).open = false;
        if kind == ModalKind::Confirm {
            return match std::mem::take(&mut self.pending) {
                ConfirmationState::Requested(_) => Some(Resolution::Cancelled),
                ConfirmationState::Idle => None,
            };
        }
        None
    }

    /// Confirm-button activation: yields the pending action once, then
    /// closes the dialog with the slot cleared.
    pub fn confirm(&mut self) -> Option<ConfirmAction> {
        let action = match std::mem::take(&mut self.pending) {
            ConfirmationState::Requested(action) => Some(action),
            ConfirmationState::Idle => None,
        };
        self.confirm.open = false;
        action
    }

    pub fn is_open(&self, kind: ModalKind) -> bool {
        self.slot(kind).open
    }

    pub fn message(&self, kind: ModalKind) -> &str {
        &self.slot(kind).message
    }

    pub fn pending(&self) -> ConfirmationState {
        self.pending
    }

    /// The dialog that receives input when several are open.
    pub fn topmost(&self) -> Option<ModalKind> {
        [ModalKind::Confirm, ModalKind::Info, ModalKind::Share]
            .into_iter()
            .find(|kind| self.is_open(*kind))
    }
}
