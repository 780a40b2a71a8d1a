//! Best-effort recovery of the structured simulation reply from free model text.

use crate::models::AiSimulationResponse;

/// Outcome of looking for a JSON object in a model reply
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    Parsed(AiSimulationResponse),
    NotFound,
    Invalid(String),
}

/// What the session shows for one reply
#[derive(Debug, Clone, PartialEq)]
pub struct Interpretation {
    pub content: String,
    pub simulation: Option<AiSimulationResponse>,
}

/// Span from the first `{` to the last `}`, inclusive.
///
/// Greedy on purpose: prose that quotes an example object before the real one
/// yields a span covering both, which then fails to parse.
pub fn brace_span(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&raw[start..=end])
}

pub fn extract(raw: &str) -> Extraction {
    let Some(candidate) = brace_span(raw) else {
        return Extraction::NotFound;
    };
    match serde_json::from_str::<AiSimulationResponse>(candidate) {
        Ok(parsed) => Extraction::Parsed(parsed),
        Err(e) => Extraction::Invalid(e.to_string()),
    }
}

/// Map a raw reply to the message body, keeping the raw text whenever parsing fails
pub fn interpret(raw: &str) -> Interpretation {
    match extract(raw) {
        Extraction::Parsed(simulation) => Interpretation {
            content: simulation.markdown_report.clone(),
            simulation: Some(simulation),
        },
        Extraction::NotFound => {
            tracing::warn!("JSON parsing failed: JSON structure not found in response");
            Interpretation {
                content: raw.to_string(),
                simulation: None,
            }
        }
        Extraction::Invalid(reason) => {
            tracing::warn!("JSON parsing failed: {}", reason);
            Interpretation {
                content: raw.to_string(),
                simulation: None,
            }
        }
    }
}
