//! Chat session state and the reducer that advances it one event at a time.

use chrono::Utc;

use crate::config::SessionDefaults;
use crate::error::Result;
use crate::interpreter::interpret;
use crate::models::{
    ChatMessage, HistoryTurn, MachineConstants, ProductionTelemetry, Role, ScenarioPoint,
    UnitCosts, WinningScenario,
};
use crate::prompt::{PromptContext, compose};
use crate::validation::{coerce_field, is_submittable};

pub const WELCOME_MESSAGE: &str = "**VARAKA-NEXUS DİJİTAL OPERATÖR SİSTEMİ**

Sistem hazır. Gerçekçi simülasyon için:
1.  **Veri Yapılandırma** ile Makine DNA'sını ve Geçmiş Verileri yükleyin.
2.  Anlık **Kirlilik/Atık Oranını** girin.";

pub const APOLOGY_MESSAGE: &str = "⚠️ **Sistem Hatası:** Simülasyon motoruna erişilemedi.";

pub const HISTORICAL_DATA_MESSAGE: &str = "✅ **FINE-TUNING BAŞARILI:** 6 aylık üretim veri seti işlendi. AI artık Varaka'nın üretim alışkanlıklarını ve atık kağıt tepkilerini biliyor.";

/// Messages containing this marker never go back to the model as context
pub const PARSE_FAILURE_MARKER: &str = "JSON Parsing Error";

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Submit { text: String },
    TurnResolved { raw: String },
    TurnRejected { reason: String },
    EditTelemetry { field: String, value: String },
    EditCosts { field: String, value: String },
    EditMachine { field: String, value: String },
    HistoricalDataLoaded,
}

/// Work for the driver after an event has been applied
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEffect {
    CallGateway(TurnRequest),
    /// The transcript changed; redraw and scroll to the newest message
    Render,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TurnRequest {
    /// Fully composed message body
    pub message: String,
    pub history: Vec<HistoryTurn>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub telemetry: ProductionTelemetry,
    pub costs: UnitCosts,
    pub machine: MachineConstants,
    pub has_historical_data: bool,
    pub messages: Vec<ChatMessage>,
    pub chart_data: Vec<ScenarioPoint>,
    pub winning_scenario: Option<WinningScenario>,
    pub busy: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(SessionDefaults::default())
    }
}

impl SessionState {
    pub fn new(defaults: SessionDefaults) -> Self {
        Self {
            telemetry: defaults.telemetry,
            costs: defaults.costs,
            machine: defaults.machine,
            has_historical_data: false,
            messages: vec![ChatMessage {
                id: "welcome".to_string(),
                role: Role::Model,
                content: WELCOME_MESSAGE.to_string(),
                timestamp: Utc::now(),
            }],
            chart_data: Vec::new(),
            winning_scenario: None,
            busy: false,
        }
    }

    pub fn last_message(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// The chart sits under the newest model reply once a real exchange has happened
    pub fn chart_visible(&self) -> bool {
        self.messages.len() > 2 && self.last_message().is_some_and(|m| m.role == Role::Model)
    }

    /// Transcript as model context, minus messages flagged as parse failures
    pub fn history(&self) -> Vec<HistoryTurn> {
        self.messages
            .iter()
            .filter(|m| !m.content.contains(PARSE_FAILURE_MARKER))
            .map(|m| HistoryTurn {
                role: m.role,
                text: m.content.clone(),
            })
            .collect()
    }

    fn prompt_context(&self) -> PromptContext<'_> {
        PromptContext {
            telemetry: &self.telemetry,
            costs: &self.costs,
            machine: &self.machine,
            has_historical_data: self.has_historical_data,
        }
    }
}

/// Apply one event. Field edits report validation failures; every other event
/// is infallible.
pub fn reduce(state: &mut SessionState, event: SessionEvent) -> Result<Vec<SessionEffect>> {
    match event {
        SessionEvent::Submit { text } => Ok(submit(state, text)),
        SessionEvent::TurnResolved { raw } => Ok(resolve(state, &raw)),
        SessionEvent::TurnRejected { reason } => Ok(reject(state, &reason)),
        SessionEvent::EditTelemetry { field, value } => {
            if state.busy {
                tracing::debug!(%field, "Telemetry edit ignored while a turn is in flight");
                return Ok(Vec::new());
            }
            state.telemetry = coerce_field(&state.telemetry, &field, &value)?;
            Ok(Vec::new())
        }
        SessionEvent::EditCosts { field, value } => {
            state.costs = coerce_field(&state.costs, &field, &value)?;
            Ok(Vec::new())
        }
        SessionEvent::EditMachine { field, value } => {
            state.machine = coerce_field(&state.machine, &field, &value)?;
            Ok(Vec::new())
        }
        SessionEvent::HistoricalDataLoaded => {
            state.has_historical_data = true;
            state.messages.push(ChatMessage::model(HISTORICAL_DATA_MESSAGE));
            Ok(vec![SessionEffect::Render])
        }
    }
}

fn submit(state: &mut SessionState, text: String) -> Vec<SessionEffect> {
    if !is_submittable(&text) || state.busy {
        return Vec::new();
    }

    // Context is the transcript as it stood before this prompt
    let history = state.history();
    let message = compose(&text, &state.prompt_context());

    state.messages.push(ChatMessage::user(text));
    state.busy = true;
    tracing::info!(history = history.len(), "Turn started");

    vec![
        SessionEffect::Render,
        SessionEffect::CallGateway(TurnRequest { message, history }),
    ]
}

fn resolve(state: &mut SessionState, raw: &str) -> Vec<SessionEffect> {
    if !state.busy {
        tracing::warn!("Reply received with no turn in flight; dropping it");
        return Vec::new();
    }

    let interpretation = interpret(raw);
    if let Some(simulation) = interpretation.simulation {
        state.chart_data = simulation.chart_data;
        state.winning_scenario = simulation.winning_scenario;
    }
    state.messages.push(ChatMessage::model(interpretation.content));
    state.busy = false;
    tracing::info!(chart_points = state.chart_data.len(), "Turn finished");

    vec![SessionEffect::Render]
}

fn reject(state: &mut SessionState, reason: &str) -> Vec<SessionEffect> {
    if !state.busy {
        tracing::warn!("Failure reported with no turn in flight; dropping it");
        return Vec::new();
    }

    tracing::error!("Chat Error: {}", reason);
    state.messages.push(ChatMessage::model(APOLOGY_MESSAGE));
    state.busy = false;

    vec![SessionEffect::Render]
}
