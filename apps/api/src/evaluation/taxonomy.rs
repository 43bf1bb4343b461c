//! Skills taxonomy: the fixed per-role list of expected skill keywords.
//!
//! Built once at startup and shared read-only (`Arc<SkillsTaxonomy>`) by the
//! scorer and the fallback generator.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};

const DEFAULT_ROLES: &[(&str, &[&str])] = &[
    (
        "Software Engineer",
        &[
            "python",
            "java",
            "c++",
            "git",
            "sql",
            "data structures",
            "algorithms",
            "system design",
            "docker",
            "rest api",
        ],
    ),
    (
        "Data Scientist",
        &[
            "python",
            "sql",
            "statistics",
            "machine learning",
            "pandas",
            "numpy",
            "scikit-learn",
            "data visualization",
            "deep learning",
            "a/b testing",
        ],
    ),
    (
        "Frontend Developer",
        &[
            "html",
            "css",
            "javascript",
            "typescript",
            "react",
            "responsive design",
            "accessibility",
            "git",
            "testing",
            "webpack",
        ],
    ),
    (
        "Backend Developer",
        &[
            "sql",
            "rest api",
            "microservices",
            "docker",
            "kubernetes",
            "caching",
            "message queues",
            "git",
            "linux",
            "authentication",
        ],
    ),
    (
        "DevOps Engineer",
        &[
            "linux",
            "docker",
            "kubernetes",
            "terraform",
            "ci/cd",
            "aws",
            "monitoring",
            "bash",
            "ansible",
            "networking",
        ],
    ),
];

/// Mapping from role name to its ordered, lowercase skill keywords.
#[derive(Debug, Clone, PartialEq)]
pub struct SkillsTaxonomy {
    /// Keyed by the lowercased, trimmed role name.
    roles: BTreeMap<String, Vec<String>>,
}

impl Default for SkillsTaxonomy {
    fn default() -> Self {
        Self::from_entries(
            DEFAULT_ROLES
                .iter()
                .map(|(role, skills)| (role.to_string(), skills.iter().map(|s| s.to_string()).collect())),
        )
    }
}

impl SkillsTaxonomy {
    /// Builds a taxonomy, lowercasing keywords and dropping duplicates while keeping order.
    pub fn from_entries(entries: impl IntoIterator<Item = (String, Vec<String>)>) -> Self {
        let roles = entries
            .into_iter()
            .map(|(role, skills)| {
                let mut seen = HashSet::new();
                let skills = skills
                    .into_iter()
                    .map(|s| s.trim().to_lowercase())
                    .filter(|s| !s.is_empty() && seen.insert(s.clone()))
                    .collect();
                (role_key(&role), skills)
            })
            .collect();
        Self { roles }
    }

    /// Loads a `{ "Role": ["keyword", ...] }` JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read skills taxonomy at {}", path.display()))?;
        Self::from_json_str(&raw)
            .with_context(|| format!("Invalid skills taxonomy in {}", path.display()))
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let parsed: BTreeMap<String, Vec<String>> = serde_json::from_str(raw)?;
        Ok(Self::from_entries(parsed))
    }

    /// Skills for a role, or an empty slice if the role is unknown.
    pub fn skills_for(&self, role: &str) -> &[String] {
        self.roles
            .get(&role_key(role))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn contains_role(&self, role: &str) -> bool {
        self.roles.contains_key(&role_key(role))
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }
}

fn role_key(role: &str) -> String {
    role.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_software_engineer_has_ten_skills() {
        let taxonomy = SkillsTaxonomy::default();
        assert_eq!(taxonomy.skills_for("Software Engineer").len(), 10);
    }

    #[test]
    fn test_lookup_ignores_case_and_whitespace() {
        let taxonomy = SkillsTaxonomy::default();
        assert_eq!(
            taxonomy.skills_for("  software engineer "),
            taxonomy.skills_for("Software Engineer")
        );
        assert!(taxonomy.contains_role("DATA SCIENTIST"));
    }

    #[test]
    fn test_unknown_role_is_empty() {
        let taxonomy = SkillsTaxonomy::default();
        assert!(taxonomy.skills_for("Astronaut").is_empty());
        assert!(!taxonomy.contains_role("Astronaut"));
    }

    #[test]
    fn test_from_entries_normalizes_and_dedups() {
        let taxonomy = SkillsTaxonomy::from_entries(vec![(
            "Rustacean".to_string(),
            vec![
                "Rust".to_string(),
                "tokio".to_string(),
                " rust ".to_string(),
                "".to_string(),
                "Serde".to_string(),
            ],
        )]);
        assert_eq!(taxonomy.skills_for("rustacean"), ["rust", "tokio", "serde"]);
    }

    #[test]
    fn test_from_json_str() {
        let taxonomy =
            SkillsTaxonomy::from_json_str(r#"{"QA Engineer": ["Selenium", "Test Plans"]}"#).unwrap();
        assert_eq!(taxonomy.len(), 1);
        assert_eq!(taxonomy.skills_for("qa engineer"), ["selenium", "test plans"]);
    }

    #[test]
    fn test_from_json_str_rejects_wrong_shape() {
        assert!(SkillsTaxonomy::from_json_str(r#"{"QA Engineer": "selenium"}"#).is_err());
    }

    #[test]
    fn test_default_keywords_are_lowercase() {
        let taxonomy = SkillsTaxonomy::default();
        for skills in taxonomy.roles.values() {
            for skill in skills {
                assert_eq!(skill, &skill.to_lowercase());
            }
        }
    }
}
