//! Clarifying-question generation — asks the model what the extraction missed.
//!
//! Total like the other stages: every failure collapses to a single-element
//! fallback list, so callers can always render "the questions".

use tracing::{error, warn};

use crate::llm_client::ModelGateway;
use crate::refinement::extract::ExtractedEntities;
use crate::refinement::prompts::QUESTION_PROMPT_TEMPLATE;

const QUESTIONS_FALLBACK: &str = "An error occurred while generating questions.";

/// Generates clarifying questions for the given extraction outcome.
///
/// The outcome is embedded in the prompt as pretty-printed JSON. The error
/// form is forwarded as-is: the model sees `{"error": ...}` and asks about a
/// job description it knows nothing concrete about, which is still a usable
/// interview. The completion is split on newlines; each non-blank line is one
/// question, kept verbatim (numbering prefixes included). The returned list
/// is never empty.
pub async fn generate_questions(
    entities: &ExtractedEntities,
    llm: &dyn ModelGateway,
) -> Vec<String> {
    let serialized = match serde_json::to_string_pretty(entities) {
        Ok(json) => json,
        Err(e) => {
            error!("Failed to serialize entities for question prompt: {e}");
            return vec![QUESTIONS_FALLBACK.to_string()];
        }
    };

    let prompt = QUESTION_PROMPT_TEMPLATE.replace("{entities}", &serialized);

    let completion = match llm.invoke(&prompt).await {
        Ok(text) => text,
        Err(e) => {
            error!("Question generation call failed: {e}");
            return vec![QUESTIONS_FALLBACK.to_string()];
        }
    };

    let questions: Vec<String> = completion
        .trim()
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect();

    if questions.is_empty() {
        warn!("Question completion contained no usable lines");
        return vec![QUESTIONS_FALLBACK.to_string()];
    }

    questions
}
