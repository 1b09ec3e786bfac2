//! `StepStore` trait and the payload type it persists.
//!
//! A store is scoped to one signup session. Implementations only move bytes:
//! validation happens before `save` is ever called, and a missing key on
//! `get` is a normal answer, not an error.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Validated field→value mapping for one completed step.
///
/// Payloads are only produced by the validator, so holding one is proof the
/// step passed its schema. A revisited step overwrites the whole payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepPayload {
    fields: BTreeMap<String, String>,
}

impl StepPayload {
    pub(crate) fn from_fields(fields: BTreeMap<String, String>) -> Self {
        Self { fields }
    }

    /// Value of `field`, if the step captured it.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// All captured fields, in stable (sorted) order.
    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Storage key for step `index` (0-based) of `flow`.
///
/// Keys follow the `<flow>Step<N>` convention with 1-based N, e.g.
/// `doctorSignupStep1`.
pub fn storage_key(flow: &str, index: usize) -> String {
    format!("{}Step{}", flow, index + 1)
}

/// Backend-agnostic session store for step payloads.
#[async_trait]
pub trait StepStore: Send + Sync {
    /// Persist a payload under `key`, overwriting any existing payload.
    async fn save(&self, key: &str, payload: &StepPayload) -> Result<(), StoreError>;

    /// Fetch the payload stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<StepPayload>, StoreError>;

    /// Every stored payload, keyed by storage key.
    async fn get_all(&self) -> Result<BTreeMap<String, StepPayload>, StoreError>;

    /// Remove every stored payload.
    async fn clear(&self) -> Result<(), StoreError>;
}
