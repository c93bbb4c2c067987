//! Extraction and validation of generated recommendations
//!
//! Generated text is unreliable: it may be wrapped in code fences, carry
//! commentary around the JSON, miss fields, or echo the prompt's own
//! example values. The parser turns it into a [`Recommendation`] or a typed
//! [`ParseFailure`], never a partially valid value.

use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::catalog::Subject;
use crate::model::{Nutrition, Recommendation};

/// Why generated text could not be turned into a recommendation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseFailure {
    #[error("No JSON object found in response")]
    NoJsonFound,
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),
    #[error("Incomplete recommendation: {0}")]
    IncompleteShape(String),
    #[error("Placeholder content in {0}")]
    Placeholder(String),
    #[error("Response uses the source label '{0}'")]
    SourceLabelEcho(String),
}

/// Parser for generated recommendation text
#[derive(Debug, Clone)]
pub struct ResponseParser {
    fence_pattern: Regex,
    recipe_placeholder: Regex,
    benefit_placeholder: Regex,
    calorie_placeholder: Regex,
}

impl Default for ResponseParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseParser {
    pub fn new() -> Self {
        Self {
            fence_pattern: Regex::new(r"(?i)```[a-z]*").expect("Valid regex"),
            recipe_placeholder: Regex::new(r"(?i)(nama\s+resep|resep\s+\d|recipe\s+name|recipe\s+\d)")
                .expect("Valid regex"),
            benefit_placeholder: Regex::new(r"(?i)(manfaat\s+\d|benefit\s+\d)").expect("Valid regex"),
            calorie_placeholder: Regex::new(r"(?i)x{2,}").expect("Valid regex"),
        }
    }

    /// Parse raw generated text for a subject
    pub fn parse(&self, raw: &str, subject: &Subject) -> Result<Recommendation, ParseFailure> {
        let cleaned = self.fence_pattern.replace_all(raw, "");
        let span = find_json_object(&cleaned).ok_or(ParseFailure::NoJsonFound)?;

        let value: Value =
            serde_json::from_str(span).map_err(|e| ParseFailure::InvalidJson(e.to_string()))?;
        let object = value
            .as_object()
            .ok_or_else(|| ParseFailure::InvalidJson("top-level value is not an object".into()))?;

        let recipes = required(object, "recipes")?;
        let nutrition = required(object, "nutrition")?;
        let storage_tips = required(object, "storageTips")?;

        let recipes = string_list(recipes)
            .filter(|list| !list.is_empty())
            .ok_or_else(|| ParseFailure::IncompleteShape("recipes is empty".into()))?;
        let nutrition = parse_nutrition(nutrition)?;
        let storage_tips = coerce_text(storage_tips)
            .filter(|text| !text.is_empty())
            .ok_or_else(|| ParseFailure::IncompleteShape("storageTips is empty".into()))?;

        self.reject_placeholders(&recipes, &nutrition)?;
        reject_source_label(&recipes, subject)?;

        Ok(Recommendation {
            recipes,
            nutrition,
            storage_tips,
        })
    }

    fn reject_placeholders(
        &self,
        recipes: &[String],
        nutrition: &Nutrition,
    ) -> Result<(), ParseFailure> {
        if recipes.iter().any(|r| self.recipe_placeholder.is_match(r)) {
            return Err(ParseFailure::Placeholder("recipes".into()));
        }

        if let Nutrition::Detailed {
            calories, benefits, ..
        } = nutrition
        {
            if calories
                .as_deref()
                .is_some_and(|c| self.calorie_placeholder.is_match(c))
            {
                return Err(ParseFailure::Placeholder("nutrition.calories".into()));
            }
            if benefits
                .iter()
                .flatten()
                .any(|b| self.benefit_placeholder.is_match(b))
            {
                return Err(ParseFailure::Placeholder("nutrition.benefits".into()));
            }
        }

        Ok(())
    }
}

fn required<'a>(object: &'a Map<String, Value>, field: &str) -> Result<&'a Value, ParseFailure> {
    match object.get(field) {
        Some(Value::Null) | None => Err(ParseFailure::IncompleteShape(format!(
            "missing field '{}'",
            field
        ))),
        Some(value) => Ok(value),
    }
}

fn reject_source_label(recipes: &[String], subject: &Subject) -> Result<(), ParseFailure> {
    if !subject.forbids_source_label() {
        return Ok(());
    }

    let label = subject.label_as_text().to_lowercase();
    if recipes.iter().any(|r| r.to_lowercase().contains(&label)) {
        return Err(ParseFailure::SourceLabelEcho(subject.label.clone()));
    }

    Ok(())
}

fn parse_nutrition(value: &Value) -> Result<Nutrition, ParseFailure> {
    let object = value
        .as_object()
        .ok_or_else(|| ParseFailure::IncompleteShape("nutrition is not an object".into()))?;

    let calories = object.get("calories").and_then(coerce_text);
    let vitamins = object.get("vitamins").and_then(string_list);
    let benefits = object.get("benefits").and_then(string_list);

    if calories.is_some() || vitamins.is_some() || benefits.is_some() {
        return Ok(Nutrition::Detailed {
            calories,
            vitamins,
            benefits,
        });
    }

    match object.get("info").and_then(coerce_text) {
        Some(info) if !info.is_empty() => Ok(Nutrition::Summary { info }),
        _ => Err(ParseFailure::IncompleteShape(
            "nutrition has no recognised fields".into(),
        )),
    }
}

/// Normalize a string or list of scalars into a list of non-empty strings
fn string_list(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            Some(if s.is_empty() {
                vec![]
            } else {
                vec![s.to_string()]
            })
        }
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(coerce_text)
                .filter(|s| !s.is_empty())
                .collect(),
        ),
        _ => None,
    }
}

/// Coerce a scalar (or list of scalars) into trimmed text
fn coerce_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(coerce_text).collect();
            Some(parts.join(" ").trim().to_string())
        }
        Value::Null | Value::Object(_) => None,
    }
}

/// Locate the first balanced `{...}` span, ignoring braces inside strings
fn find_json_object(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let mut start = 0;

    while let Some(offset) = text[start..].find('{') {
        let open = start + offset;
        let mut depth = 0usize;
        let mut in_string = false;
        let mut escaped = false;

        for (i, &b) in bytes.iter().enumerate().skip(open) {
            if in_string {
                match b {
                    _ if escaped => escaped = false,
                    b'\\' => escaped = true,
                    b'"' => in_string = false,
                    _ => {}
                }
                continue;
            }

            match b {
                b'"' => in_string = true,
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(&text[open..=i]);
                    }
                }
                _ => {}
            }
        }

        start = open + 1;
    }

    None
}
