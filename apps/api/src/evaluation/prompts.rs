// LLM prompt templates for resume evaluation.
// Reuses the JSON-only fragment from llm_client::prompts.

/// Evaluation prompt. Replace: {json_only}, {role}, {resume_text}
pub const EVALUATION_PROMPT_TEMPLATE: &str = r#"You are an experienced technical recruiter reviewing resumes the way an Applicant Tracking System and a hiring manager would.

Evaluate the resume below for the following target role or job description:
{role}

Return a JSON object with this EXACT schema (no extra fields):
{
  "strengths": ["..."],
  "weaknesses": ["..."],
  "missing_skills": ["..."],
  "suggestions": ["..."]
}

HARD RULES:
1. Every list MUST contain at least 2 entries
2. Every entry is a single specific sentence or skill name grounded in the resume text
3. "missing_skills" lists skills the role expects that the resume does not show
4. "suggestions" are concrete, actionable edits to the resume

{json_only}

RESUME:
{resume_text}"#;

/// Corrective retry prompt. Replace: {original_prompt}, {previous_output}, {violation}, {json_only}
pub const CORRECTION_PROMPT_TEMPLATE: &str = r#"{original_prompt}

YOUR PREVIOUS RESPONSE WAS REJECTED:
{previous_output}

Reason: {violation}

Fix the response. Return the corrected JSON object only, following the schema and hard rules above.
{json_only}"#;
