//! Template interpolation for source URLs
//!
//! Handles `{{ variable }}` interpolation in page URL templates.
//! Supports nested access like `{{ target.year }}` and `{{ vars.base }}`.

use crate::error::{Error, Result};
use crate::types::Target;
use regex::Regex;
use serde_json::{json, Value};
use std::sync::LazyLock;

/// Regex for matching template variables: {{ variable.path }}
static TEMPLATE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([a-zA-Z_][a-zA-Z0-9_]*(?:\.[a-zA-Z_][a-zA-Z0-9_]*)*)\s*\}\}").unwrap()
});

/// Context for template interpolation
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    /// Target values (jurisdiction, slug, year, entity, encoded entity)
    pub target: Value,
    /// Current page index
    pub page: Value,
    /// Additional context variables
    pub vars: Value,
}

impl TemplateContext {
    /// Create a new empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Create context for one page of a target
    pub fn for_page(target: &Target, page: u32) -> Self {
        Self {
            target: json!({
                "jurisdiction": target.jurisdiction,
                "jurisdiction_slug": target.jurisdiction_slug(),
                "year": target.year,
                "entity": target.entity,
                "entity_encoded": target.entity_encoded(),
            }),
            page: json!(page),
            vars: Value::Null,
        }
    }

    /// Set additional variables
    #[must_use]
    pub fn with_vars(mut self, vars: Value) -> Self {
        self.vars = vars;
        self
    }

    /// Get a value by path (e.g., "target.year")
    pub fn get(&self, path: &str) -> Option<&Value> {
        let parts: Vec<&str> = path.split('.').collect();

        let root = match parts[0] {
            "target" => &self.target,
            "page" => &self.page,
            "vars" => &self.vars,
            // Bare names fall back to vars
            _ => return get_nested_value(&self.vars, &parts),
        };

        let value = if parts.len() == 1 {
            Some(root)
        } else {
            get_nested_value(root, &parts[1..])
        };
        value.filter(|v| !v.is_null())
    }
}

/// Get a nested value from a JSON value by path
fn get_nested_value<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut current = value;
    for part in path {
        match current {
            Value::Object(map) => {
                current = map.get(*part)?;
            }
            _ => return None,
        }
    }
    Some(current)
}

/// Render a template string with the given context
pub fn render(template: &str, ctx: &TemplateContext) -> Result<String> {
    let mut undefined = Vec::new();

    let result = TEMPLATE_REGEX.replace_all(template, |caps: &regex::Captures<'_>| {
        let var_path = &caps[1];
        match ctx.get(var_path) {
            Some(value) => value_to_string(value),
            None => {
                undefined.push(var_path.to_string());
                caps[0].to_string()
            }
        }
    });

    if undefined.is_empty() {
        Ok(result.into_owned())
    } else {
        Err(Error::undefined_var(undefined.join(", ")))
    }
}

/// Extract all variable names from a template
pub fn extract_variables(template: &str) -> Vec<String> {
    TEMPLATE_REGEX
        .captures_iter(template)
        .map(|cap| cap[1].to_string())
        .collect()
}

/// Check that a template only references variables a page context can supply
pub fn validate_template(template: &str) -> Result<()> {
    let sample = TemplateContext::for_page(&Target::new("Sample", 2000, "Sample"), 1);
    let unknown: Vec<String> = extract_variables(template)
        .into_iter()
        .filter(|var| !var.starts_with("vars.") && sample.get(var).is_none())
        .collect();

    if unknown.is_empty() {
        Ok(())
    } else {
        Err(Error::template(format!(
            "unknown template variables: {}",
            unknown.join(", ")
        )))
    }
}

/// Convert a JSON value to a string for template substitution
fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
