//! Step validation.
//!
//! Pure checks of raw form values against a step schema. No IO, no session
//! state: the same inputs always produce the same verdict, which is what
//! makes the persist-only-if-valid rule enforceable upstream.

use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use regex::Regex;

use crate::error::FieldErrors;
use crate::schema::{FieldKind, StepSchema};
use crate::store::StepPayload;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// Validate one step's raw form values against its schema.
///
/// Values are trimmed before any check. Returns the normalized payload, or
/// one message per offending field. Fields the schema does not declare are
/// dropped; optional fields left empty are omitted from the payload.
pub fn validate_step(
    schema: &StepSchema,
    raw: &HashMap<String, String>,
) -> Result<StepPayload, FieldErrors> {
    let mut fields = BTreeMap::new();
    let mut errors = FieldErrors::new();

    for rule in &schema.fields {
        let value = raw.get(&rule.name).map(|v| v.trim()).unwrap_or("");

        if value.is_empty() {
            if rule.required {
                errors.insert(rule.name.clone(), format!("{} is required", rule.name));
            }
            continue;
        }

        if let Some(min) = rule.min_length {
            if value.chars().count() < min {
                errors.insert(
                    rule.name.clone(),
                    format!("{} must be at least {} characters", rule.name, min),
                );
                continue;
            }
        }

        match &rule.kind {
            FieldKind::Text => {}
            FieldKind::Email => {
                if !EMAIL_RE.is_match(value) {
                    errors.insert(
                        rule.name.clone(),
                        format!("{} must be a valid email address", rule.name),
                    );
                    continue;
                }
            }
            FieldKind::OneOf { allowed } => {
                if !allowed.contains(value) {
                    errors.insert(
                        rule.name.clone(),
                        format!("{} is not an accepted value", rule.name),
                    );
                    continue;
                }
            }
        }

        fields.insert(rule.name.clone(), value.to_string());
    }

    if errors.is_empty() {
        Ok(StepPayload::from_fields(fields))
    } else {
        Err(errors)
    }
}
