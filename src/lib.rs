pub mod commands;
pub mod config;
pub mod error;
pub mod gateway;
pub mod interpreter;
pub mod models;
pub mod prompt;
pub mod render;
pub mod service;
pub mod session;
pub mod transport;
pub mod validation;

use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::gateway::{GeminiGateway, ModelGateway};
use crate::service::OperatorService;
use crate::session::SessionState;
use crate::transport::{GeminiTransport, Transport};

/// Wire the Gemini transport, gateway and a fresh session from configuration.
/// Fails when no API key is configured.
pub fn build_service(cfg: &Config) -> Result<OperatorService> {
    let api_key = cfg.require_api_key()?.to_string();
    let transport = Arc::new(GeminiTransport::with_base_url(
        api_key,
        cfg.gemini.base_url.clone(),
    )?);

    let gateway = GeminiGateway::from_config(transport as Arc<dyn Transport>, &cfg.gemini);

    Ok(OperatorService::new(
        Arc::new(gateway) as Arc<dyn ModelGateway>,
        SessionState::new(cfg.session.clone()),
    ))
}
