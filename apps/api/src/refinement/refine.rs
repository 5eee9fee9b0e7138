//! Final synthesis — produces the enhanced job description.

use tracing::{error, warn};

use crate::llm_client::ModelGateway;
use crate::refinement::extract::ExtractedEntities;
use crate::refinement::prompts::REFINE_PROMPT_TEMPLATE;

const REFINE_FALLBACK: &str = "An error occurred while refining the job description.";

/// Synthesizes a refined job description from the original text, the
/// extracted entities, and the collected answers (in question order).
///
/// Returns the trimmed completion, or the fallback text when the gateway
/// fails or the model returns nothing usable. Never fails outward.
pub async fn generate_refined_description(
    job_desc: &str,
    entities: &ExtractedEntities,
    answers: &[String],
    llm: &dyn ModelGateway,
) -> String {
    let entities_json = match serde_json::to_string_pretty(entities) {
        Ok(json) => json,
        Err(e) => {
            error!("Failed to serialize entities for refine prompt: {e}");
            return REFINE_FALLBACK.to_string();
        }
    };
    let answers_json = match serde_json::to_string_pretty(answers) {
        Ok(json) => json,
        Err(e) => {
            error!("Failed to serialize answers for refine prompt: {e}");
            return REFINE_FALLBACK.to_string();
        }
    };

    let prompt = REFINE_PROMPT_TEMPLATE
        .replace("{job_desc}", job_desc)
        .replace("{entities}", &entities_json)
        .replace("{answers}", &answers_json);

    let completion = match llm.invoke(&prompt).await {
        Ok(text) => text,
        Err(e) => {
            error!("Refinement call failed: {e}");
            return REFINE_FALLBACK.to_string();
        }
    };

    let refined = completion.trim();
    if refined.is_empty() {
        warn!("Refinement completion was empty");
        return REFINE_FALLBACK.to_string();
    }

    refined.to_string()
}
