//! Contract-Validating Generator: qualitative analysis from the LLM with a
//! strict output contract.
//!
//! Two-attempt state machine:
//! `Initial -> validate -> [ok: done | violation: Correction -> validate -> [ok: done | violation: fallback]]`.
//! A transport failure (HTTP error, API error, timeout, empty content) goes
//! straight to the fallback: there is no invalid output to correct.
//!
//! Never fails: callers always get a well-formed `QualitativeResult`.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::evaluation::contract::{parse_qualitative, ContractViolation};
use crate::evaluation::fallback::FallbackGenerator;
use crate::evaluation::models::QualitativeResult;
use crate::evaluation::prompts::{CORRECTION_PROMPT_TEMPLATE, EVALUATION_PROMPT_TEMPLATE};
use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;
use crate::llm_client::{LlmError, TextGenerator};

/// Initial attempt plus one corrective retry.
pub const MAX_ATTEMPTS: u32 = 2;

/// Invalid output echoed back in the correction prompt is cut to this many characters.
const MAX_ECHOED_OUTPUT_CHARS: usize = 4_000;

/// Which path produced a qualitative result. Only logged; the result shape is identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationSource {
    Model,
    ModelAfterCorrection,
    Fallback,
}

impl GenerationSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationSource::Model => "model",
            GenerationSource::ModelAfterCorrection => "model_after_correction",
            GenerationSource::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Generated {
    pub result: QualitativeResult,
    pub source: GenerationSource,
}

/// Outcome of one failed attempt.
#[derive(Debug)]
enum AttemptError {
    Transport(LlmError),
    Contract {
        raw: String,
        violation: ContractViolation,
    },
}

/// What the next attempt sends.
enum Attempt {
    Initial,
    Correction {
        previous_output: String,
        violation: ContractViolation,
    },
}

pub struct ContractValidatingGenerator {
    llm: Arc<dyn TextGenerator>,
    fallback: FallbackGenerator,
    timeout: Duration,
    max_resume_chars: usize,
}

impl ContractValidatingGenerator {
    pub fn new(
        llm: Arc<dyn TextGenerator>,
        fallback: FallbackGenerator,
        timeout: Duration,
        max_resume_chars: usize,
    ) -> Self {
        Self {
            llm,
            fallback,
            timeout,
            max_resume_chars,
        }
    }

    pub async fn generate(&self, text: &str, role: &str) -> Generated {
        let prompt = build_evaluation_prompt(text, role, self.max_resume_chars);
        let mut attempt = Attempt::Initial;

        for attempt_no in 1..=MAX_ATTEMPTS {
            let request = match &attempt {
                Attempt::Initial => prompt.clone(),
                Attempt::Correction {
                    previous_output,
                    violation,
                } => build_correction_prompt(&prompt, previous_output, violation),
            };

            match self.attempt(&request).await {
                Ok(result) => {
                    let source = if attempt_no == 1 {
                        GenerationSource::Model
                    } else {
                        GenerationSource::ModelAfterCorrection
                    };
                    info!(
                        "Qualitative analysis accepted from {} on attempt {}/{}",
                        self.llm.model(),
                        attempt_no,
                        MAX_ATTEMPTS
                    );
                    return Generated { result, source };
                }
                Err(AttemptError::Contract { raw, violation }) => {
                    warn!(
                        "Attempt {}/{}: response violated output contract: {}",
                        attempt_no, MAX_ATTEMPTS, violation
                    );
                    attempt = Attempt::Correction {
                        previous_output: raw,
                        violation,
                    };
                }
                Err(AttemptError::Transport(e)) => {
                    warn!(
                        "Attempt {}/{}: generation transport failure: {}",
                        attempt_no, MAX_ATTEMPTS, e
                    );
                    break;
                }
            }
        }

        warn!("Using fallback qualitative analysis for role '{}'", role.trim());
        Generated {
            result: self.fallback.fallback(role),
            source: GenerationSource::Fallback,
        }
    }

    async fn attempt(&self, prompt: &str) -> Result<QualitativeResult, AttemptError> {
        let raw = tokio::time::timeout(self.timeout, self.llm.generate(prompt))
            .await
            .map_err(|_| AttemptError::Transport(LlmError::Timeout(self.timeout)))?
            .map_err(AttemptError::Transport)?;

        parse_qualitative(&raw).map_err(|violation| AttemptError::Contract { raw, violation })
    }
}

fn build_evaluation_prompt(text: &str, role: &str, max_resume_chars: usize) -> String {
    render_template(
        EVALUATION_PROMPT_TEMPLATE,
        &[
            ("json_only", JSON_ONLY_INSTRUCTION),
            ("role", role.trim()),
            ("resume_text", truncate_chars(text, max_resume_chars)),
        ],
    )
}

fn build_correction_prompt(
    original_prompt: &str,
    previous_output: &str,
    violation: &ContractViolation,
) -> String {
    let violation = violation.to_string();
    render_template(
        CORRECTION_PROMPT_TEMPLATE,
        &[
            ("json_only", JSON_ONLY_INSTRUCTION),
            ("violation", violation.as_str()),
            (
                "previous_output",
                truncate_chars(previous_output, MAX_ECHOED_OUTPUT_CHARS),
            ),
            ("original_prompt", original_prompt),
        ],
    )
}

/// Single-pass `{name}` substitution. Substituted values are never rescanned,
/// so placeholders inside a role, resume or model output stay literal.
/// Braces that do not name a known placeholder are copied through.
fn render_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after_brace = &rest[start + 1..];
        let hit = values.iter().find_map(|(name, value)| {
            let after = after_brace.strip_prefix(name)?.strip_prefix('}')?;
            Some((*value, after))
        });
        match hit {
            Some((value, after)) => {
                out.push_str(value);
                rest = after;
            }
            None => {
                out.push('{');
                rest = after_brace;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Cuts `text` to at most `max` characters on a char boundary.
fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((i, _)) => &text[..i],
        None => text,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::evaluation::contract::tests::valid_json;
    use crate::evaluation::taxonomy::SkillsTaxonomy;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned responses in order and records every prompt it receives.
    pub(crate) struct ScriptedGenerator {
        responses: Mutex<VecDeque<Result<String, LlmError>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        pub(crate) fn new(responses: Vec<Result<String, LlmError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(LlmError::EmptyContent))
        }

        fn model(&self) -> &str {
            "scripted"
        }
    }

    struct HangingGenerator;

    #[async_trait]
    impl TextGenerator for HangingGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(valid_json())
        }

        fn model(&self) -> &str {
            "hanging"
        }
    }

    fn generator_with(llm: Arc<dyn TextGenerator>) -> ContractValidatingGenerator {
        ContractValidatingGenerator::new(
            llm,
            FallbackGenerator::new(Arc::new(SkillsTaxonomy::default())),
            Duration::from_secs(30),
            12_000,
        )
    }

    fn expected_fallback(role: &str) -> QualitativeResult {
        FallbackGenerator::new(Arc::new(SkillsTaxonomy::default())).fallback(role)
    }

    #[tokio::test]
    async fn test_valid_first_response_is_used_verbatim() {
        let llm = Arc::new(ScriptedGenerator::new(vec![Ok(valid_json())]));
        let generated = generator_with(llm.clone())
            .generate("python, git, sql", "Software Engineer")
            .await;

        assert_eq!(generated.source, GenerationSource::Model);
        assert_eq!(generated.result, parse_qualitative(&valid_json()).unwrap());
        assert_eq!(llm.prompts().len(), 1);
    }

    #[tokio::test]
    async fn test_non_json_then_valid_uses_corrected_content() {
        let llm = Arc::new(ScriptedGenerator::new(vec![
            Ok("Sorry, here are my thoughts in prose.".to_string()),
            Ok(valid_json()),
        ]));
        let generated = generator_with(llm.clone())
            .generate("python, git, sql", "Software Engineer")
            .await;

        assert_eq!(generated.source, GenerationSource::ModelAfterCorrection);
        assert_eq!(generated.result, parse_qualitative(&valid_json()).unwrap());

        let prompts = llm.prompts();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[1].starts_with(&prompts[0]));
        assert!(prompts[1].contains("Sorry, here are my thoughts in prose."));
        assert!(prompts[1].contains(&ContractViolation::NotJson.to_string()));
    }

    #[tokio::test]
    async fn test_two_violations_fall_back() {
        let shallow = r#"{"strengths": ["one"], "weaknesses": [], "missing_skills": [], "suggestions": []}"#;
        let llm = Arc::new(ScriptedGenerator::new(vec![
            Ok(shallow.to_string()),
            Ok("still not json".to_string()),
        ]));
        let generated = generator_with(llm.clone())
            .generate("python", "Software Engineer")
            .await;

        assert_eq!(generated.source, GenerationSource::Fallback);
        assert_eq!(generated.result, expected_fallback("Software Engineer"));
        assert_eq!(llm.prompts().len(), MAX_ATTEMPTS as usize);
    }

    #[tokio::test]
    async fn test_transport_error_falls_back_without_retry() {
        let llm = Arc::new(ScriptedGenerator::new(vec![
            Err(LlmError::Api {
                status: 503,
                message: "overloaded".to_string(),
            }),
            Ok(valid_json()),
        ]));
        let generated = generator_with(llm.clone())
            .generate("python", "Data Scientist")
            .await;

        assert_eq!(generated.source, GenerationSource::Fallback);
        assert_eq!(generated.result, expected_fallback("Data Scientist"));
        assert_eq!(llm.prompts().len(), 1);
    }

    #[tokio::test]
    async fn test_transport_error_on_retry_falls_back() {
        let llm = Arc::new(ScriptedGenerator::new(vec![
            Ok("nope".to_string()),
            Err(LlmError::EmptyContent),
        ]));
        let generated = generator_with(llm.clone()).generate("python", "Astronaut").await;

        assert_eq!(generated.source, GenerationSource::Fallback);
        assert!(generated.result.missing_skills.is_empty());
        assert_eq!(llm.prompts().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_falls_back() {
        let generated = generator_with(Arc::new(HangingGenerator))
            .generate("python", "Software Engineer")
            .await;

        assert_eq!(generated.source, GenerationSource::Fallback);
        assert_eq!(generated.result, expected_fallback("Software Engineer"));
    }

    #[test]
    fn test_prompt_contains_role_resume_and_json_rule() {
        let prompt = build_evaluation_prompt("Rust and Go developer", " Backend Developer ", 100);
        assert!(prompt.contains("Backend Developer\n"));
        assert!(prompt.contains("Rust and Go developer"));
        assert!(prompt.contains(JSON_ONLY_INSTRUCTION));
        assert!(!prompt.contains("{resume_text}"));
    }

    #[test]
    fn test_prompt_truncates_long_resume() {
        let resume = "é".repeat(50);
        let prompt = build_evaluation_prompt(&resume, "Software Engineer", 10);
        assert!(prompt.contains(&"é".repeat(10)));
        assert!(!prompt.contains(&"é".repeat(11)));
    }

    #[test]
    fn test_placeholder_in_role_is_not_expanded() {
        let prompt = build_evaluation_prompt("UNIQUE-RESUME-BODY", "{resume_text} Engineer", 100);
        assert_eq!(prompt.matches("UNIQUE-RESUME-BODY").count(), 1);
        assert!(prompt.contains("{resume_text} Engineer"));
    }

    #[test]
    fn test_placeholder_in_rejected_output_is_not_expanded() {
        let original = build_evaluation_prompt("python", "Software Engineer", 100);
        let prompt = build_correction_prompt(
            &original,
            "see {original_prompt} and {json_only}",
            &ContractViolation::NotJson,
        );
        assert_eq!(prompt.matches(original.as_str()).count(), 1);
        assert!(prompt.contains("see {original_prompt} and {json_only}"));
    }

    #[test]
    fn test_schema_braces_survive_rendering() {
        let prompt = build_evaluation_prompt("python", "Software Engineer", 100);
        assert!(prompt.contains("\"strengths\": [\"...\"]"));
        assert!(prompt.contains("{\n  \"strengths\""));
    }

    #[test]
    fn test_correction_prompt_caps_echoed_output() {
        let original = build_evaluation_prompt("python", "Software Engineer", 100);
        let rejected = "x".repeat(MAX_ECHOED_OUTPUT_CHARS + 500);
        let prompt = build_correction_prompt(&original, &rejected, &ContractViolation::NotJson);

        assert!(prompt.contains(&"x".repeat(MAX_ECHOED_OUTPUT_CHARS)));
        assert!(!prompt.contains(&"x".repeat(MAX_ECHOED_OUTPUT_CHARS + 1)));
    }

    #[test]
    fn test_truncate_chars_short_text_untouched() {
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abcdef", 3), "abc");
    }

    #[test]
    fn test_generation_source_labels() {
        assert_eq!(GenerationSource::Model.as_str(), "model");
        assert_eq!(GenerationSource::Fallback.as_str(), "fallback");
    }
}
