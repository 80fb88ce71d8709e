//! Event loop that owns a [`ProductSession`].
//!
//! UI events arrive on an mpsc channel; page fetches run on their own tasks
//! and report back on a second channel, so input stays responsive while a
//! request is in flight. After every event the loop publishes a fresh
//! [`SessionSnapshot`] on a watch channel.
//!
//! A search change while a fetch is in flight cannot start a new fetch. The
//! in-flight response comes back stale and the loop then reloads page 1 for
//! the active term.

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use forca_catalog::{BeginFetchError, CommitOutcome, FetchError, FetchIntent, FetchTicket, FetchedPage};
use forca_core::ProductCode;
use thiserror::Error;

use crate::payment::{PaymentCondition, PaymentMethod};
use crate::session::{ProductSession, SessionSnapshot};

const COMMAND_BUFFER: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// Load page 1.
    Start,
    /// A keystroke in the search box (debounced).
    SearchInput(String),
    /// Search now, skipping the debounce.
    FlushSearch,
    LoadMore,
    SetQuantity { code: ProductCode, quantity: i64 },
    SetQuantityInput { code: ProductCode, input: String },
    ToggleIncluded(ProductCode),
    RemoveFromQuote(ProductCode),
    ClearQuote,
    SetPaymentMethod(Option<PaymentMethod>),
    SetPaymentCondition(Option<PaymentCondition>),
    Shutdown,
}

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("session worker has stopped")]
    Stopped,
    #[error("session worker failed: {0}")]
    Join(String),
}

type Completion = (FetchTicket, Result<FetchedPage, FetchError>);

pub struct SessionHandle {
    commands: mpsc::Sender<SessionCommand>,
    snapshots: watch::Receiver<SessionSnapshot>,
    join: JoinHandle<ProductSession>,
}

impl SessionHandle {
    pub async fn send(&self, command: SessionCommand) -> Result<(), WorkerError> {
        self.commands.send(command).await.map_err(|_| WorkerError::Stopped)
    }

    /// Latest published state.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    /// Stop the loop and hand back the session.
    pub async fn shutdown(self) -> Result<ProductSession, WorkerError> {
        // Already stopped is fine; the join below reports the outcome.
        let _ = self.commands.send(SessionCommand::Shutdown).await;
        self.join.await.map_err(|e| WorkerError::Join(e.to_string()))
    }
}

pub struct SessionWorker {
    session: ProductSession,
    commands: mpsc::Receiver<SessionCommand>,
    snapshots: watch::Sender<SessionSnapshot>,
    completions: mpsc::Sender<Completion>,
}

impl SessionWorker {
    /// Spawn the loop on the current runtime.
    pub fn spawn(session: ProductSession) -> SessionHandle {
        let (commands_tx, commands_rx) = mpsc::channel(COMMAND_BUFFER);
        let (snapshots_tx, snapshots_rx) = watch::channel(session.snapshot());
        let (completions_tx, completions_rx) = mpsc::channel(4);

        let worker = SessionWorker {
            session,
            commands: commands_rx,
            snapshots: snapshots_tx,
            completions: completions_tx,
        };
        let join = tokio::spawn(worker.run(completions_rx));

        SessionHandle {
            commands: commands_tx,
            snapshots: snapshots_rx,
            join,
        }
    }

    async fn run(mut self, mut completions: mpsc::Receiver<Completion>) -> ProductSession {
        tracing::info!(session = %self.session.id(), "session worker started");

        loop {
            let deadline = self.session.search_deadline();
            let wake_at = deadline.map(Instant::from_std).unwrap_or_else(Instant::now);

            tokio::select! {
                command = self.commands.recv() => {
                    match command {
                        None | Some(SessionCommand::Shutdown) => break,
                        Some(command) => self.handle(command),
                    }
                }
                Some((ticket, result)) = completions.recv() => {
                    self.complete(ticket, result);
                }
                _ = tokio::time::sleep_until(wake_at), if deadline.is_some() => {
                    if self.session.apply_due_search(Instant::now().into_std()) {
                        self.dispatch(FetchIntent::Reload);
                    }
                }
            }

            self.snapshots.send_replace(self.session.snapshot());
        }

        tracing::info!(session = %self.session.id(), "session worker stopped");
        self.session
    }

    fn handle(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::Start => self.dispatch(FetchIntent::Reload),
            SessionCommand::SearchInput(term) => {
                self.session.search_input(term, Instant::now().into_std());
            }
            SessionCommand::FlushSearch => {
                if self.session.apply_pending_search() {
                    self.dispatch(FetchIntent::Reload);
                }
            }
            SessionCommand::LoadMore => {
                let intent = self.session.load_more_intent();
                self.dispatch(intent);
            }
            SessionCommand::SetQuantity { code, quantity } => {
                self.session.set_quantity(&code, quantity);
            }
            SessionCommand::SetQuantityInput { code, input } => {
                self.session.set_quantity_input(&code, &input);
            }
            SessionCommand::ToggleIncluded(code) => {
                self.session.toggle_included(&code);
            }
            SessionCommand::RemoveFromQuote(code) => {
                self.session.remove_from_quote(&code);
            }
            SessionCommand::ClearQuote => self.session.clear_quote(),
            SessionCommand::SetPaymentMethod(method) => self.session.set_payment_method(method),
            SessionCommand::SetPaymentCondition(condition) => self.session.set_payment_condition(condition),
            SessionCommand::Shutdown => {}
        }
    }

    fn dispatch(&mut self, intent: FetchIntent) {
        let (ticket, request) = match self.session.begin(intent) {
            Ok(started) => started,
            Err(BeginFetchError::ConcurrencyViolation { in_flight_page }) => {
                tracing::debug!(in_flight_page, ?intent, "fetch already in flight; trigger ignored");
                return;
            }
            Err(e) => {
                tracing::debug!(error = %e, ?intent, "fetch not started");
                return;
            }
        };

        let fetcher = self.session.fetcher();
        let completions = self.completions.clone();
        tokio::spawn(async move {
            let result = fetcher.fetch_page(&request).await;
            // The receiver only goes away when the worker stops.
            let _ = completions.send((ticket, result)).await;
        });
    }

    fn complete(&mut self, ticket: FetchTicket, result: Result<FetchedPage, FetchError>) {
        let outcome = self.session.commit(&ticket, result);
        if outcome == CommitOutcome::Stale && self.session.store().needs_reload() {
            self.dispatch(FetchIntent::Reload);
        }
    }
}
