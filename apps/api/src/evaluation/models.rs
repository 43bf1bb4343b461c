use serde::{Deserialize, Serialize};

use crate::extraction::DocumentInput;

/// One evaluation request. The role may be a role name or a free-form job description.
#[derive(Debug, Clone)]
pub struct EvaluationRequest {
    pub document: DocumentInput,
    pub role: String,
}

/// The qualitative half of an evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualitativeResult {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub missing_skills: Vec<String>,
    pub suggestions: Vec<String>,
}

/// The sole artifact returned to callers. `missing_skills` is always present, possibly empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Deterministic keyword score, 5 to 95.
    pub score: u32,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub missing_skills: Vec<String>,
    pub suggestions: Vec<String>,
}

impl EvaluationResult {
    pub fn merge(score: u32, qualitative: QualitativeResult) -> Self {
        Self {
            score,
            strengths: qualitative.strengths,
            weaknesses: qualitative.weaknesses,
            missing_skills: qualitative.missing_skills,
            suggestions: qualitative.suggestions,
        }
    }
}
