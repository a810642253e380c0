//! Seams for third-party services
//!
//! The core never talks to the network itself. A knowledge engine (question
//! answering) and a video source (watch-later and liked lists) are supplied
//! by the caller through these traits.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::CoreResult;
use crate::importers::YoutubeVideo;

/// One titled section of a knowledge-service answer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pod {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Answer from a knowledge service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceReply {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub pods: Vec<Pod>,
}

impl ServiceReply {
    /// Successful plain-text reply
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            success: true,
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Unsuccessful reply carrying a message for the user
    pub fn fallback(message: impl Into<String>) -> Self {
        Self {
            success: false,
            text: Some(message.into()),
            ..Self::default()
        }
    }
}

/// Answers free-form study questions
#[async_trait]
pub trait KnowledgeService: Send + Sync {
    async fn ask(&self, question: &str) -> CoreResult<ServiceReply>;
}

/// Supplies the user's saved videos
#[async_trait]
pub trait VideoSource: Send + Sync {
    async fn fetch_videos(&self) -> CoreResult<Vec<YoutubeVideo>>;
}

/// Ask `service`, turning any failure into a fallback reply
pub async fn ask_or_fallback(service: &dyn KnowledgeService, question: &str) -> ServiceReply {
    if question.trim().is_empty() {
        return ServiceReply::fallback("Ask a question to get an answer.");
    }

    match service.ask(question).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!("Knowledge service failed: {}", e);
            ServiceReply::fallback(format!(
                "Couldn't reach the knowledge service ({}). Try again later.",
                e
            ))
        }
    }
}
