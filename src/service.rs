use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::Result;
use crate::gateway::ModelGateway;
use crate::session::{SessionEffect, SessionEvent, SessionState, reduce};

/// Result of a `submit` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Blank prompt, or another turn was already in flight
    Ignored,
    /// A user message and exactly one model message were appended
    Completed,
}

/// Drives the session reducer and the model gateway for one operator session.
///
/// The state lock is released while the gateway call is pending, so other
/// tasks can read snapshots, and a second `submit` sees the busy flag and is
/// turned away instead of queueing.
pub struct OperatorService {
    state: Mutex<SessionState>,
    gateway: Arc<dyn ModelGateway>,
}

impl OperatorService {
    pub fn new(gateway: Arc<dyn ModelGateway>, state: SessionState) -> Self {
        Self {
            state: Mutex::new(state),
            gateway,
        }
    }

    pub async fn submit(&self, text: &str) -> TurnOutcome {
        let effects = {
            let mut state = self.state.lock().await;
            match reduce(
                &mut state,
                SessionEvent::Submit {
                    text: text.to_string(),
                },
            ) {
                Ok(effects) => effects,
                Err(e) => {
                    tracing::error!("Submit rejected: {}", e);
                    return TurnOutcome::Ignored;
                }
            }
        };

        let Some(request) = effects.into_iter().find_map(|effect| match effect {
            SessionEffect::CallGateway(request) => Some(request),
            SessionEffect::Render => None,
        }) else {
            return TurnOutcome::Ignored;
        };

        let event = match self
            .gateway
            .send_turn(&request.message, &request.history)
            .await
        {
            Ok(raw) => SessionEvent::TurnResolved { raw },
            Err(e) => SessionEvent::TurnRejected {
                reason: e.to_string(),
            },
        };

        let mut state = self.state.lock().await;
        if let Err(e) = reduce(&mut state, event) {
            tracing::error!("Failed to apply turn result: {}", e);
        }
        TurnOutcome::Completed
    }

    /// Apply a non-turn event such as a field edit
    pub async fn dispatch(&self, event: SessionEvent) -> Result<()> {
        let mut state = self.state.lock().await;
        reduce(&mut state, event).map(|_| ())
    }

    /// Immutable copy of the current state for rendering
    pub async fn snapshot(&self) -> SessionState {
        self.state.lock().await.clone()
    }

    pub async fn is_busy(&self) -> bool {
        self.state.lock().await.busy
    }
}
