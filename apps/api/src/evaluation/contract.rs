//! Output contract for the qualitative analysis.
//!
//! Model output is untrusted text. It is parsed leniently (whole text, then
//! fence-stripped text, then the first balanced `{...}` object that parses)
//! and then validated strictly: every field present, a list, with at least
//! `MIN_ENTRIES` non-blank strings.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::evaluation::models::QualitativeResult;
use crate::llm_client::strip_json_fences;

pub const MIN_ENTRIES: usize = 2;

pub const REQUIRED_FIELDS: [&str; 4] = ["strengths", "weaknesses", "missing_skills", "suggestions"];

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ContractViolation {
    #[error("response contains no parsable JSON object")]
    NotJson,

    #[error("response JSON is not an object")]
    NotAnObject,

    #[error("field '{0}' is missing")]
    MissingField(&'static str),

    #[error("field '{0}' is not a list")]
    NotAList(&'static str),

    #[error("field '{field}' has {found} entries, at least {required} required")]
    TooFewEntries {
        field: &'static str,
        found: usize,
        required: usize,
    },

    #[error("field '{field}' entry {index} is not a non-empty string")]
    InvalidEntry { field: &'static str, index: usize },
}

/// Parses and validates raw model output in one step.
pub fn parse_qualitative(raw: &str) -> Result<QualitativeResult, ContractViolation> {
    let value = parse_lenient(raw).ok_or(ContractViolation::NotJson)?;
    validate(&value)
}

/// Best-effort JSON recovery from model output.
pub fn parse_lenient(raw: &str) -> Option<Value> {
    let text = raw.trim();
    if let Ok(value) = serde_json::from_str(text) {
        return Some(value);
    }
    if let Ok(value) = serde_json::from_str(strip_json_fences(text)) {
        return Some(value);
    }
    first_json_object(text)
}

/// Finds the first brace-balanced substring that parses as a JSON object.
fn first_json_object(text: &str) -> Option<Value> {
    text.char_indices()
        .filter(|&(_, c)| c == '{')
        .find_map(|(start, _)| {
            let end = balanced_end(&text[start..])?;
            match serde_json::from_str::<Value>(&text[start..start + end]) {
                Ok(value) if value.is_object() => Some(value),
                _ => None,
            }
        })
}

/// Byte length of the balanced `{...}` at the start of `text`, honouring
/// braces inside string literals.
fn balanced_end(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}

pub fn validate(value: &Value) -> Result<QualitativeResult, ContractViolation> {
    let object = value.as_object().ok_or(ContractViolation::NotAnObject)?;
    let [strengths, weaknesses, missing_skills, suggestions] =
        REQUIRED_FIELDS.map(|field| string_list(object, field));

    Ok(QualitativeResult {
        strengths: strengths?,
        weaknesses: weaknesses?,
        missing_skills: missing_skills?,
        suggestions: suggestions?,
    })
}

fn string_list(
    object: &Map<String, Value>,
    field: &'static str,
) -> Result<Vec<String>, ContractViolation> {
    let items = object
        .get(field)
        .ok_or(ContractViolation::MissingField(field))?
        .as_array()
        .ok_or(ContractViolation::NotAList(field))?;

    if items.len() < MIN_ENTRIES {
        return Err(ContractViolation::TooFewEntries {
            field,
            found: items.len(),
            required: MIN_ENTRIES,
        });
    }

    items
        .iter()
        .enumerate()
        .map(|(index, item)| match item.as_str() {
            Some(s) if !s.trim().is_empty() => Ok(s.to_string()),
            _ => Err(ContractViolation::InvalidEntry { field, index }),
        })
        .collect()
}
