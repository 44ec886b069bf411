use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use phishlens_client::{Classifier, ClientError, RetrainResponse};
use phishlens_core::analysis::{self, AnalysisOutcome, AnalysisTicket};
use phishlens_core::clipboard::ClipboardChain;
use phishlens_core::modal::{ConfirmAction, ModalKind, Resolution};
use phishlens_core::model::TriggerKind;
use phishlens_core::report::ReportExporter;
use phishlens_core::retrain::{self, RetrainTicket};
use phishlens_core::Session;
use ratatui::layout::{Position, Rect};
use std::path::PathBuf;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::debug;

use crate::widgets;

/// Completed requests, sent back from the spawned tasks to the UI loop
#[derive(Debug)]
pub enum AppMessage {
    AnalysisFinished {
        ticket: AnalysisTicket,
        outcome: AnalysisOutcome,
    },
    RetrainFinished {
        ticket: RetrainTicket,
        response: Result<RetrainResponse, ClientError>,
    },
}

pub struct App<C> {
    pub(crate) session: Session,
    classifier: C,
    exporter: ReportExporter,
    report_path: PathBuf,
    pub(crate) cursor_position: usize,
    pub(crate) result_scroll: u16,
    pub(crate) should_quit: bool,
    tx: mpsc::UnboundedSender<AppMessage>,
    rx: mpsc::UnboundedReceiver<AppMessage>,
}

impl<C> App<C>
where
    C: Classifier + Clone + Send + Sync + 'static,
{
    pub fn new(classifier: C, clipboard: ClipboardChain, report_path: PathBuf) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            session: Session::new(),
            classifier,
            exporter: ReportExporter::new(clipboard),
            report_path,
            cursor_position: 0,
            result_scroll: 0,
            should_quit: false,
            tx,
            rx,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn report_path(&self) -> &PathBuf {
        &self.report_path
    }

    /// Applies every finished request without blocking.
    pub fn process_messages(&mut self) {
        while let Ok(msg) = self.rx.try_recv() {
            self.apply(msg);
        }
    }

    /// Waits for the next finished request and applies it.
    pub async fn next_message(&mut self) -> bool {
        match self.rx.recv().await {
            Some(msg) => {
                self.apply(msg);
                true
            }
            None => false,
        }
    }

    fn apply(&mut self, msg: AppMessage) {
        match msg {
            AppMessage::AnalysisFinished { ticket, outcome } => {
                analysis::finish(&mut self.session, &ticket, outcome, Instant::now());
                if self.session.take_scroll_request() {
                    self.result_scroll = 0;
                }
            }
            AppMessage::RetrainFinished { ticket, response } => {
                retrain::finish(&mut self.session, ticket, response);
            }
        }
    }

    fn submit(&mut self) {
        let url = self.session.input.clone();
        let ticket = match analysis::begin(&mut self.session, &url) {
            Ok(ticket) => ticket,
            Err(e) => {
                debug!("Submit ignored: {}", e);
                return;
            }
        };

        let classifier = self.classifier.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = AnalysisOutcome::from(classifier.predict(&ticket.request.url).await);
            let _ = tx.send(AppMessage::AnalysisFinished { ticket, outcome });
        });
    }

    fn start_retrain(&mut self) {
        let ticket = match retrain::begin(&mut self.session) {
            Ok(ticket) => ticket,
            Err(e) => {
                debug!("Retrain ignored: {}", e);
                return;
            }
        };

        let classifier = self.classifier.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let response = classifier.retrain().await;
            let _ = tx.send(AppMessage::RetrainFinished { ticket, response });
        });
    }

    fn clear(&mut self) {
        if self.session.is_visible(TriggerKind::Clear) {
            analysis::clear(&mut self.session);
            self.cursor_position = 0;
            self.result_scroll = 0;
        }
    }

    fn open_share(&mut self) {
        if self.session.is_result_visible() {
            self.session.modals.open(ModalKind::Share, None);
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        // A pending notice blocks everything else until dismissed
        if self.session.notice().is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                self.session.acknowledge_notice();
            }
            return;
        }

        match self.session.modals.topmost() {
            Some(ModalKind::Confirm) => self.handle_confirm_key(key),
            Some(ModalKind::Info) => {
                if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                    self.session.modals.close(ModalKind::Info);
                }
            }
            Some(ModalKind::Share) => self.handle_share_key(key),
            None => self.handle_main_key(key),
        }
    }

    /// Mouse press at (`column`, `row`) on a screen of `area`. A press
    /// outside the topmost dialog closes it, which for the confirm dialog
    /// drops the pending action unfired.
    pub fn handle_click(&mut self, column: u16, row: u16, area: Rect) {
        if self.session.notice().is_some() {
            return;
        }
        let Some(kind) = self.session.modals.topmost() else {
            return;
        };

        let dialog = widgets::modal_area(self, kind, area);
        if dialog.contains(Position::new(column, row)) {
            return;
        }
        if let Some(Resolution::Cancelled) = self.session.modals.close(kind) {
            debug!("Confirmation dismissed by outside click");
        }
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                if let Some(ConfirmAction::Retrain) = self.session.modals.confirm() {
                    self.start_retrain();
                }
            }
            KeyCode::Char('n') | KeyCode::Esc => {
                self.session.modals.close(ModalKind::Confirm);
            }
            _ => {}
        }
    }

    fn handle_share_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('c') => {
                self.exporter.copy_to_clipboard(&mut self.session);
            }
            KeyCode::Char('p') => {
                self.exporter
                    .export_document(&mut self.session, &self.report_path, Local::now());
            }
            KeyCode::Esc => {
                self.session.modals.close(ModalKind::Share);
            }
            _ => {}
        }
    }

    fn handle_main_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') | KeyCode::Char('q') => self.should_quit = true,
                KeyCode::Char('l') => self.clear(),
                KeyCode::Char('r') => {
                    if self.session.is_visible(TriggerKind::Reanalyze) {
                        self.submit();
                    }
                }
                KeyCode::Char('s') => self.open_share(),
                KeyCode::Char('t') => retrain::request(&mut self.session),
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Char(c) => {
                let at = self.byte_index();
                self.session.input.insert(at, c);
                self.cursor_position += 1;
            }
            KeyCode::Backspace => {
                if self.cursor_position > 0 {
                    self.cursor_position -= 1;
                    let at = self.byte_index();
                    self.session.input.remove(at);
                }
            }
            KeyCode::Delete => {
                if self.cursor_position < self.input_len() {
                    let at = self.byte_index();
                    self.session.input.remove(at);
                }
            }
            KeyCode::Enter => self.submit(),
            KeyCode::Left => {
                self.cursor_position = self.cursor_position.saturating_sub(1);
            }
            KeyCode::Right => {
                if self.cursor_position < self.input_len() {
                    self.cursor_position += 1;
                }
            }
            KeyCode::Home => self.cursor_position = 0,
            KeyCode::End => self.cursor_position = self.input_len(),
            KeyCode::PageUp => {
                self.result_scroll = self.result_scroll.saturating_sub(5);
            }
            KeyCode::PageDown => {
                self.result_scroll = self.result_scroll.saturating_add(5);
            }
            KeyCode::Esc => self.should_quit = true,
            _ => {}
        }
    }

    fn input_len(&self) -> usize {
        self.session.input.chars().count()
    }

    // Cursor is counted in chars, String edits need a byte offset
    fn byte_index(&self) -> usize {
        self.session
            .input
            .char_indices()
            .nth(self.cursor_position)
            .map(|(i, _)| i)
            .unwrap_or(self.session.input.len())
    }
}
