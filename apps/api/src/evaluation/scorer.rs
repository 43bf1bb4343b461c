//! Deterministic Scorer: reproducible compatibility percentage from the skills taxonomy.
//!
//! Pure keyword containment, no LLM call: the score is independent of the
//! generative path and identical for identical inputs.

use std::sync::Arc;

use crate::evaluation::taxonomy::SkillsTaxonomy;

pub const SCORE_FLOOR: u32 = 5;
pub const SCORE_CEILING: u32 = 95;

/// Keyword coverage of one resume against one role.
#[derive(Debug, Clone, PartialEq)]
pub struct SkillCoverage {
    pub matched: Vec<String>,
    pub missing: Vec<String>,
}

impl SkillCoverage {
    pub fn total(&self) -> usize {
        self.matched.len() + self.missing.len()
    }
}

pub struct DeterministicScorer {
    taxonomy: Arc<SkillsTaxonomy>,
}

impl DeterministicScorer {
    pub fn new(taxonomy: Arc<SkillsTaxonomy>) -> Self {
        Self { taxonomy }
    }

    pub fn knows_role(&self, role: &str) -> bool {
        self.taxonomy.contains_role(role)
    }

    /// Score in `[SCORE_FLOOR, SCORE_CEILING]`.
    ///
    /// `round(matched / total * 100)`, then clamped. An unknown role has no
    /// skills and lands on the floor.
    pub fn score(&self, text: &str, role: &str) -> u32 {
        score_coverage(&self.coverage(text, role))
    }

    /// Splits the role's skills into those found in the text and those absent.
    /// A skill matches when its keyword is a substring of the lowercased text.
    pub fn coverage(&self, text: &str, role: &str) -> SkillCoverage {
        let text_lower = text.to_lowercase();
        let (matched, missing): (Vec<String>, Vec<String>) = self
            .taxonomy
            .skills_for(role)
            .iter()
            .cloned()
            .partition(|skill| text_lower.contains(skill.as_str()));
        SkillCoverage { matched, missing }
    }
}

fn score_coverage(coverage: &SkillCoverage) -> u32 {
    let total = coverage.total();
    let raw = if total == 0 {
        0
    } else {
        ((coverage.matched.len() as f64 / total as f64) * 100.0).round() as u32
    };
    raw.clamp(SCORE_FLOOR, SCORE_CEILING)
}
