// All LLM prompt constants for the refinement workflow.
// The wording and field ordering are a compatibility surface with the model
// service — change them deliberately, not in passing.

/// Entity extraction prompt template. Replace `{job_desc}` before sending.
pub const EXTRACT_PROMPT_TEMPLATE: &str = r#"You are an experienced recruiter. Please extract the following information from the job description and return it as a JSON object:
1. Job Title
2. Responsibilities
3. Required Skills
4. Qualifications
5. Experience Required
6. Company Information
7. Location

Job Description:
{job_desc}"#;

/// Question generation prompt template. Replace `{entities}` with the
/// pretty-printed JSON of the extraction outcome before sending.
pub const QUESTION_PROMPT_TEMPLATE: &str = r#"Based on the following extracted job description entities, generate questions to fill in any gaps or missing information:

Entities:
{entities}

Please generate questions in a numbered list format."#;

/// Refinement prompt template.
/// Replace: `{job_desc}`, `{entities}`, `{answers}` (the latter two as
/// pretty-printed JSON) before sending.
pub const REFINE_PROMPT_TEMPLATE: &str = r#"You are an experienced recruiter. Based on the original job description, extracted entities, and additional information provided by the user, generate an enhanced job description.

Original Job Description:
{job_desc}

Extracted Entities:
{entities}

Additional Information:
{answers}

Please provide an ideal job description for the recruiter."#;
