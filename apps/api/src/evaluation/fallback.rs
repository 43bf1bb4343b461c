//! Fallback Generator: qualitative result used when the generative service
//! is unavailable or keeps breaking the output contract.

use std::sync::Arc;

use crate::evaluation::models::QualitativeResult;
use crate::evaluation::taxonomy::SkillsTaxonomy;

const STRENGTHS: &[&str] = &[
    "The resume presents relevant technical experience that can be mapped to the target role.",
    "Projects and responsibilities are described in a way that shows hands-on involvement.",
    "The overall structure makes it possible for a recruiter to scan key sections quickly.",
];

const WEAKNESSES: &[&str] = &[
    "Achievements are not consistently quantified with numbers, percentages, or scale.",
    "Role-specific keywords appear sparsely, which can lower Applicant Tracking System ranking.",
    "Some bullet points describe duties rather than the impact of the work.",
];

const SUGGESTIONS: &[&str] = &[
    "Add measurable outcomes to each role, for example latency reduced, users served, or revenue influenced.",
    "Mirror the exact skill names used in the job description in a dedicated skills section.",
    "Use clear section headings such as Experience, Projects, Skills, and Education.",
    "Lead each bullet point with a strong action verb followed by the result achieved.",
];

pub struct FallbackGenerator {
    taxonomy: Arc<SkillsTaxonomy>,
}

impl FallbackGenerator {
    pub fn new(taxonomy: Arc<SkillsTaxonomy>) -> Self {
        Self { taxonomy }
    }

    /// Pre-authored assessment; `missing_skills` is the role's taxonomy entry
    /// (empty for an unknown role).
    pub fn fallback(&self, role: &str) -> QualitativeResult {
        QualitativeResult {
            strengths: to_owned(STRENGTHS),
            weaknesses: to_owned(WEAKNESSES),
            missing_skills: self.taxonomy.skills_for(role).to_vec(),
            suggestions: to_owned(SUGGESTIONS),
        }
    }
}

fn to_owned(lines: &[&str]) -> Vec<String> {
    lines.iter().map(|s| s.to_string()).collect()
}
