use async_trait::async_trait;
use std::sync::Arc;

use crate::config::GeminiConfig;
use crate::error::{OperatorError, Result};
use crate::models::{Content, GenerateContentRequest, GenerationConfig, HistoryTurn};
use crate::prompt::SYSTEM_INSTRUCTION;
use crate::transport::Transport;

/// Boundary to the remote language model: one chat turn in, raw reply text out.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModelGateway: Send + Sync {
    async fn send_turn(&self, message: &str, history: &[HistoryTurn]) -> Result<String>;
}

pub struct GeminiGateway {
    tx: Arc<dyn Transport>,
    model: String,
    temperature: f32,
    system_instruction: String,
}

impl GeminiGateway {
    pub fn new(tx: Arc<dyn Transport>, model: String, temperature: f32) -> Self {
        Self {
            tx,
            model,
            temperature,
            system_instruction: SYSTEM_INSTRUCTION.to_string(),
        }
    }

    pub fn from_config(tx: Arc<dyn Transport>, cfg: &GeminiConfig) -> Self {
        let mut gateway = Self::new(tx, cfg.model.clone(), cfg.temperature);
        if let Some(instruction) = &cfg.system_instruction {
            gateway.system_instruction = instruction.clone();
        }
        gateway
    }

    fn build_request(&self, message: &str, history: &[HistoryTurn]) -> GenerateContentRequest {
        let mut contents: Vec<Content> = history
            .iter()
            .map(|turn| Content::text(Some(turn.role.as_str()), turn.text.clone()))
            .collect();
        contents.push(Content::text(Some("user"), message));

        GenerateContentRequest {
            system_instruction: Content::text(None, self.system_instruction.clone()),
            contents,
            generation_config: GenerationConfig {
                temperature: self.temperature,
            },
        }
    }
}

#[async_trait]
impl ModelGateway for GeminiGateway {
    async fn send_turn(&self, message: &str, history: &[HistoryTurn]) -> Result<String> {
        tracing::info!(
            model = %self.model,
            history = history.len(),
            "Sending chat turn to model"
        );

        let request = self.build_request(message, history);
        let response = self.tx.generate(&self.model, &request).await.map_err(|e| {
            tracing::error!("Gemini API Error: {}", e);
            e
        })?;

        response.text().ok_or_else(|| {
            OperatorError::Gateway("Gemini API returned no text candidates".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Candidate, GenerateContentResponse, Part, Role};
    use std::sync::Mutex;

    // Mock Transport for testing
    struct MockTransport {
        responses: Mutex<Vec<Result<GenerateContentResponse>>>,
        requests: Mutex<Vec<(String, GenerateContentRequest)>>,
    }

    impl MockTransport {
        fn new(responses: Vec<Result<GenerateContentResponse>>) -> Self {
            MockTransport {
                responses: Mutex::new(responses),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn generate(
            &self,
            model: &str,
            req: &GenerateContentRequest,
        ) -> Result<GenerateContentResponse> {
            self.requests
                .lock()
                .expect("Mock transport mutex should not be poisoned")
                .push((model.to_string(), req.clone()));
            self.responses
                .lock()
                .expect("Mock transport mutex should not be poisoned")
                .pop()
                .unwrap_or_else(|| Err(OperatorError::Internal("No more mock responses".into())))
        }
    }

    fn text_response(text: &str) -> GenerateContentResponse {
        GenerateContentResponse {
            candidates: vec![Candidate {
                content: Some(Content {
                    role: Some("model".to_string()),
                    parts: vec![Part {
                        text: text.to_string(),
                    }],
                }),
            }],
        }
    }

    #[tokio::test]
    async fn test_send_turn_returns_candidate_text() {
        let transport = Arc::new(MockTransport::new(vec![Ok(text_response("{\"a\":1}"))]));
        let gateway = GeminiGateway::new(transport.clone(), "test-model".to_string(), 0.2);

        let reply = gateway.send_turn("hello", &[]).await.unwrap();
        assert_eq!(reply, "{\"a\":1}");

        let requests = transport.requests.lock().unwrap();
        assert_eq!(requests[0].0, "test-model");
        assert_eq!(requests[0].1.system_instruction.parts[0].text, SYSTEM_INSTRUCTION);
    }

    #[tokio::test]
    async fn test_history_precedes_new_message() {
        let transport = Arc::new(MockTransport::new(vec![Ok(text_response("ok"))]));
        let gateway = GeminiGateway::new(transport.clone(), "test-model".to_string(), 0.2);
        let history = vec![
            HistoryTurn {
                role: Role::Model,
                text: "welcome".to_string(),
            },
            HistoryTurn {
                role: Role::User,
                text: "earlier".to_string(),
            },
        ];

        gateway.send_turn("now", &history).await.unwrap();

        let requests = transport.requests.lock().unwrap();
        let contents = &requests[0].1.contents;
        let roles: Vec<_> = contents.iter().map(|c| c.role.as_deref().unwrap()).collect();
        assert_eq!(roles, ["model", "user", "user"]);
        assert_eq!(contents[2].parts[0].text, "now");
    }

    #[tokio::test]
    async fn test_empty_candidates_is_an_error() {
        let transport = Arc::new(MockTransport::new(vec![Ok(GenerateContentResponse::default())]));
        let gateway = GeminiGateway::new(transport, "test-model".to_string(), 0.2);

        let err = gateway.send_turn("hello", &[]).await.unwrap_err();
        assert!(matches!(err, OperatorError::Gateway(_)));
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let transport = Arc::new(MockTransport::new(vec![Err(OperatorError::Gateway(
            "503".to_string(),
        ))]));
        let gateway = GeminiGateway::new(transport, "test-model".to_string(), 0.2);

        assert!(gateway.send_turn("hello", &[]).await.is_err());
    }

    #[tokio::test]
    async fn test_config_overrides_system_instruction() {
        let transport = Arc::new(MockTransport::new(vec![Ok(text_response("ok"))]));
        let cfg = GeminiConfig {
            api_key: "key".to_string(),
            model: "m".to_string(),
            temperature: 0.5,
            base_url: "http://localhost".to_string(),
            system_instruction: Some("custom".to_string()),
        };
        let gateway = GeminiGateway::from_config(transport.clone(), &cfg);
        gateway.send_turn("x", &[]).await.unwrap();

        let requests = transport.requests.lock().unwrap();
        assert_eq!(requests[0].1.system_instruction.parts[0].text, "custom");
        assert_eq!(requests[0].1.generation_config.temperature, 0.5);
    }
}
