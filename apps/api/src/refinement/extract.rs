//! Entity extraction — pulls structured fields out of a raw job description.
//!
//! This stage is total: every failure mode (gateway error, unparseable
//! completion) comes back in-band as `ExtractedEntities::Error`, never as a
//! `Result::Err`. The presentation layer renders whatever it gets.

use serde::Serialize;
use serde_json::Value;
use tracing::{error, warn};

use crate::llm_client::ModelGateway;
use crate::refinement::prompts::EXTRACT_PROMPT_TEMPLATE;

/// Outcome of the extraction stage.
///
/// The model's output is decoded as plain JSON with no schema enforcement —
/// whatever shape it produced is what downstream stages see. Failures are a
/// distinct variant rather than a magic `"error"` key, so a legitimately
/// extracted field named "error" cannot collide with the failure path. The
/// untagged serialization still renders the failure variant as
/// `{"error": "<message>"}` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExtractedEntities {
    Entities(Value),
    Error { error: String },
}

impl ExtractedEntities {
    /// Failure form for a completion that did not parse as JSON.
    pub fn invalid_json() -> Self {
        Self::Error {
            error: "Response is not valid JSON".to_string(),
        }
    }

    /// Failure form for everything else (gateway errors included).
    pub fn unexpected() -> Self {
        Self::Error {
            error: "An unexpected error occurred".to_string(),
        }
    }
}

/// Extracts entities from `job_desc` via one gateway call.
///
/// The completion is trimmed, stripped of markdown code fences, and decoded
/// as JSON. Parse failures and gateway failures are logged and returned
/// in-band; this function never fails outward.
pub async fn extract_entities(job_desc: &str, llm: &dyn ModelGateway) -> ExtractedEntities {
    let prompt = EXTRACT_PROMPT_TEMPLATE.replace("{job_desc}", job_desc);

    let completion = match llm.invoke(&prompt).await {
        Ok(text) => text,
        Err(e) => {
            error!("Entity extraction call failed: {e}");
            return ExtractedEntities::unexpected();
        }
    };

    let cleaned = strip_json_fences(&completion);

    match serde_json::from_str::<Value>(cleaned) {
        Ok(decoded) => ExtractedEntities::Entities(decoded),
        Err(e) => {
            warn!("Extraction completion is not valid JSON: {e}");
            ExtractedEntities::invalid_json()
        }
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
/// Tolerates a missing closing fence — the opening marker alone is removed.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
