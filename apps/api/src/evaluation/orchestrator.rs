//! Evaluation Orchestrator: the single public entry point of the pipeline.
//!
//! Flow: validate request → extract text → deterministic score →
//!       qualitative analysis (LLM with contract loop, or fallback) → merge.
//!
//! Only input validation and extraction failures reach the caller. Generation
//! problems are absorbed by `ContractValidatingGenerator`.

use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::evaluation::generator::ContractValidatingGenerator;
use crate::evaluation::models::{EvaluationRequest, EvaluationResult};
use crate::evaluation::scorer::DeterministicScorer;
use crate::extraction::{is_pdf, DocumentInput, ExtractionError, TextExtractor};

#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("Target role or job description must not be empty")]
    EmptyRole,

    #[error("Uploaded document is empty")]
    EmptyDocument,

    #[error("Only PDF documents are supported")]
    UnsupportedDocument,

    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}

pub struct Evaluator {
    extractor: TextExtractor,
    scorer: DeterministicScorer,
    generator: ContractValidatingGenerator,
}

impl Evaluator {
    pub fn new(
        extractor: TextExtractor,
        scorer: DeterministicScorer,
        generator: ContractValidatingGenerator,
    ) -> Self {
        Self {
            extractor,
            scorer,
            generator,
        }
    }

    pub async fn evaluate(
        &self,
        request: EvaluationRequest,
    ) -> Result<EvaluationResult, EvaluationError> {
        validate_request(&request)?;

        let request_id = Uuid::new_v4();
        let role = request.role.trim();
        info!("Evaluation {request_id}: role '{role}'");

        if !self.scorer.knows_role(role) {
            warn!("Evaluation {request_id}: unknown role '{role}', scoring against an empty skill list");
        }

        // Step 1: Extract text
        let text = self.extractor.extract(request.document).await.map_err(|e| {
            warn!("Evaluation {request_id}: extraction failed: {e}");
            e
        })?;

        // Step 2: Deterministic score
        let score = self.scorer.score(&text, role);

        // Step 3: Qualitative analysis
        let generated = self.generator.generate(&text, role).await;

        info!(
            "Evaluation {}: score {}/100, qualitative source {}",
            request_id,
            score,
            generated.source.as_str()
        );

        // Step 4: Merge
        Ok(EvaluationResult::merge(score, generated.result))
    }
}

/// Rejects malformed input before any extraction or generation work.
fn validate_request(request: &EvaluationRequest) -> Result<(), EvaluationError> {
    if request.role.trim().is_empty() {
        return Err(EvaluationError::EmptyRole);
    }
    if request.document.is_empty() {
        return Err(EvaluationError::EmptyDocument);
    }
    if let DocumentInput::Pdf(bytes) = &request.document {
        if !is_pdf(bytes) {
            return Err(EvaluationError::UnsupportedDocument);
        }
    }
    Ok(())
}
