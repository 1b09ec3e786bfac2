//! Flow and step schemas, the static shape of each signup wizard.
//!
//! A [`FlowSchema`] is an ordered list of [`StepSchema`]s whose field names
//! are disjoint across steps, so the final merge can never silently drop a
//! value. Both invariants are checked once, when the flow is built.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::error::SchemaError;

/// Signup roles recognized by the platform API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Patient,
    Doctor,
    Admin,
}

impl Role {
    /// Path segment used by `POST <base>/signup/{role}`.
    pub fn as_path_segment(&self) -> &'static str {
        match self {
            Self::Patient => "patient",
            Self::Doctor => "doctor",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_path_segment())
    }
}

/// What kind of value a field accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Free text.
    Text,
    /// Must match a standard email shape.
    Email,
    /// Must be one of the allowed values, verbatim.
    OneOf { allowed: BTreeSet<String> },
}

/// Declared constraints for a single form field.
#[derive(Debug, Clone, Serialize)]
pub struct FieldRule {
    /// Field name as it appears in form values, storage, and the final body.
    pub name: String,
    /// Required fields reject empty or missing input.
    pub required: bool,
    /// Value constraint beyond presence.
    pub kind: FieldKind,
    /// Minimum length in characters, applied after trimming.
    pub min_length: Option<usize>,
}

impl FieldRule {
    /// Required free-text field.
    pub fn text(name: &str) -> Self {
        Self {
            name: name.to_string(),
            required: true,
            kind: FieldKind::Text,
            min_length: None,
        }
    }

    /// Required email field.
    pub fn email(name: &str) -> Self {
        Self {
            name: name.to_string(),
            required: true,
            kind: FieldKind::Email,
            min_length: None,
        }
    }

    /// Required field restricted to `allowed` values.
    pub fn one_of(name: &str, allowed: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            required: true,
            kind: FieldKind::OneOf {
                allowed: allowed.iter().map(|s| s.to_string()).collect(),
            },
            min_length: None,
        }
    }

    /// Set a minimum length, counted in characters.
    pub fn with_min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    /// Mark the field optional. Empty input is then omitted, not rejected.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }
}

/// Schema for one wizard step.
#[derive(Debug, Clone, Serialize)]
pub struct StepSchema {
    /// Step name, unique within its flow (e.g. `"profile"`).
    pub name: String,
    /// Field rules, in display order.
    pub fields: Vec<FieldRule>,
}

impl StepSchema {
    pub fn new(name: &str, fields: Vec<FieldRule>) -> Self {
        Self {
            name: name.to_string(),
            fields,
        }
    }

    /// Look up a field rule by name.
    pub fn field(&self, name: &str) -> Option<&FieldRule> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// A complete multi-step signup flow.
///
/// Fields are private so every value in circulation went through the
/// invariant checks in [`FlowSchema::new`].
#[derive(Debug, Clone, Serialize)]
pub struct FlowSchema {
    /// Flow identifier, also the storage-key prefix (e.g. `"doctorSignup"`).
    name: String,
    /// Role the final submission is posted under.
    role: Role,
    /// Steps in wizard order. Never empty.
    steps: Vec<StepSchema>,
}

impl FlowSchema {
    /// Build a flow, verifying that it has at least one step, step names are
    /// unique, and field names are disjoint across steps.
    pub fn new(name: &str, role: Role, steps: Vec<StepSchema>) -> Result<Self, SchemaError> {
        if steps.is_empty() {
            return Err(SchemaError::EmptyFlow {
                flow: name.to_string(),
            });
        }

        let mut seen_steps = BTreeSet::new();
        let mut seen_fields = BTreeSet::new();
        for step in &steps {
            if !seen_steps.insert(step.name.clone()) {
                return Err(SchemaError::DuplicateStep {
                    flow: name.to_string(),
                    step: step.name.clone(),
                });
            }
            for field in &step.fields {
                if !seen_fields.insert(field.name.clone()) {
                    return Err(SchemaError::DuplicateField {
                        flow: name.to_string(),
                        field: field.name.clone(),
                    });
                }
            }
        }

        Ok(Self {
            name: name.to_string(),
            role,
            steps,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Steps in wizard order.
    pub fn steps(&self) -> &[StepSchema] {
        &self.steps
    }

    /// Number of steps in the flow.
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Schema of the step at `index` (0-based).
    pub fn step(&self, index: usize) -> Option<&StepSchema> {
        self.steps.get(index)
    }

    /// Index of the step named `name`.
    pub fn step_index(&self, name: &str) -> Option<usize> {
        self.steps.iter().position(|s| s.name == name)
    }

    /// The final step and everything before it.
    pub fn split_final(&self) -> (&StepSchema, &[StepSchema]) {
        let (last, rest) = self
            .steps
            .split_last()
            .expect("flows always have at least one step");
        (last, rest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_step_flow() -> Result<FlowSchema, SchemaError> {
        FlowSchema::new(
            "testSignup",
            Role::Patient,
            vec![
                StepSchema::new("profile", vec![FieldRule::text("fullName")]),
                StepSchema::new("contact", vec![FieldRule::email("email")]),
            ],
        )
    }

    // ── Construction invariants ──

    #[test]
    fn valid_flow_is_accepted() {
        let flow = two_step_flow().unwrap();
        assert_eq!(flow.name(), "testSignup");
        assert_eq!(flow.step_count(), 2);
        assert_eq!(flow.role(), Role::Patient);
    }

    #[test]
    fn empty_flow_is_rejected() {
        let err = FlowSchema::new("empty", Role::Patient, vec![]).unwrap_err();
        assert!(matches!(err, SchemaError::EmptyFlow { .. }));
    }

    #[test]
    fn duplicate_step_name_is_rejected() {
        let err = FlowSchema::new(
            "dupStep",
            Role::Doctor,
            vec![
                StepSchema::new("profile", vec![FieldRule::text("a")]),
                StepSchema::new("profile", vec![FieldRule::text("b")]),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateStep { step, .. } if step == "profile"));
    }

    #[test]
    fn field_shared_across_steps_is_rejected() {
        let err = FlowSchema::new(
            "dupField",
            Role::Doctor,
            vec![
                StepSchema::new("profile", vec![FieldRule::text("email")]),
                StepSchema::new("contact", vec![FieldRule::email("email")]),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateField { field, .. } if field == "email"));
    }

    #[test]
    fn field_repeated_within_one_step_is_rejected() {
        let err = FlowSchema::new(
            "dupInStep",
            Role::Doctor,
            vec![StepSchema::new(
                "profile",
                vec![FieldRule::text("name"), FieldRule::text("name")],
            )],
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateField { field, .. } if field == "name"));
    }

    // ── Lookup helpers ──

    #[test]
    fn step_lookup_by_index_and_name() {
        let flow = two_step_flow().unwrap();
        assert_eq!(flow.step(0).unwrap().name, "profile");
        assert_eq!(flow.step(1).unwrap().name, "contact");
        assert!(flow.step(2).is_none());
        assert_eq!(flow.step_index("contact"), Some(1));
        assert_eq!(flow.step_index("nope"), None);
    }

    #[test]
    fn split_final_separates_last_step() {
        let flow = two_step_flow().unwrap();
        let (last, rest) = flow.split_final();
        assert_eq!(last.name, "contact");
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].name, "profile");
    }

    #[test]
    fn single_step_flow_has_no_prior_steps() {
        let flow = FlowSchema::new(
            "oneStep",
            Role::Admin,
            vec![StepSchema::new("all", vec![FieldRule::text("name")])],
        )
        .unwrap();
        let (last, rest) = flow.split_final();
        assert_eq!(last.name, "all");
        assert!(rest.is_empty());
    }

    // ── Field rule builders ──

    #[test]
    fn builders_set_expected_constraints() {
        let rule = FieldRule::text("fullName").with_min_length(2);
        assert!(rule.required);
        assert_eq!(rule.min_length, Some(2));

        let rule = FieldRule::text("address").optional();
        assert!(!rule.required);

        let rule = FieldRule::one_of("district", &["Colombo", "Kandy"]);
        match rule.kind {
            FieldKind::OneOf { allowed } => {
                assert!(allowed.contains("Colombo"));
                assert_eq!(allowed.len(), 2);
            }
            _ => panic!("expected OneOf"),
        }
    }

    #[test]
    fn role_path_segments_are_lowercase() {
        assert_eq!(Role::Patient.as_path_segment(), "patient");
        assert_eq!(Role::Doctor.as_path_segment(), "doctor");
        assert_eq!(Role::Admin.as_path_segment(), "admin");
        assert_eq!(Role::Doctor.to_string(), "doctor");
    }
}
