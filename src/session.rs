//! Signup session, the per-attempt context object.
//!
//! One `SignupSession` is created when the user enters a flow and torn down
//! on successful submission or explicit abandonment. It owns the flow
//! schema, a handle to the step store, and the single-submission gate, so
//! none of those travel through globals.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, MutexGuard};
use tracing::info;
use uuid::Uuid;

use crate::error::{FlowError, SubmitError};
use crate::guard::{self, GuardDecision};
use crate::schema::FlowSchema;
use crate::store::{StepPayload, StepStore, storage_key};
use crate::validator::validate_step;

/// A single signup attempt: one flow, one store, one submission.
pub struct SignupSession {
    id: Uuid,
    flow: FlowSchema,
    store: Arc<dyn StepStore>,
    started_at: DateTime<Utc>,
    submit_gate: Mutex<()>,
}

impl SignupSession {
    /// Begin a signup attempt for `flow`, persisting steps into `store`.
    pub fn begin(flow: FlowSchema, store: Arc<dyn StepStore>) -> Self {
        let id = Uuid::new_v4();
        info!(session = %id, flow = flow.name(), steps = flow.step_count(), "Signup flow started");
        Self {
            id,
            flow,
            store,
            started_at: Utc::now(),
            submit_gate: Mutex::new(()),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn flow(&self) -> &FlowSchema {
        &self.flow
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub(crate) fn store(&self) -> &Arc<dyn StepStore> {
        &self.store
    }

    /// Storage key for the step at `index`.
    pub fn key_for(&self, index: usize) -> String {
        storage_key(self.flow.name(), index)
    }

    /// Decide whether the step at `index` may be entered right now.
    pub async fn enter_step(&self, index: usize) -> Result<GuardDecision, FlowError> {
        if self.flow.step(index).is_none() {
            return Err(FlowError::UnknownStep {
                flow: self.flow.name().to_string(),
                index,
            });
        }
        if index == 0 {
            return Ok(GuardDecision::Proceed);
        }

        let predecessor = &self.flow.steps()[index - 1];
        let stored = self.store.get(&self.key_for(index - 1)).await?.is_some();
        Ok(guard::decide(index, Some(&predecessor.name), stored))
    }

    /// Validate and persist the step at `index`.
    ///
    /// Persisting is gated the same way entry is: a step is stored only once
    /// its direct predecessor is, so the store never holds a gap.
    pub async fn complete_step(
        &self,
        index: usize,
        raw: &HashMap<String, String>,
    ) -> Result<StepPayload, FlowError> {
        let Some(step) = self.flow.step(index) else {
            return Err(FlowError::UnknownStep {
                flow: self.flow.name().to_string(),
                index,
            });
        };

        if let GuardDecision::Redirect { to_step, .. } = self.enter_step(index).await? {
            return Err(FlowError::OutOfOrder {
                step: step.name.clone(),
                missing: to_step,
            });
        }

        let payload = validate_step(step, raw).map_err(|errors| FlowError::Validation {
            step: step.name.clone(),
            errors,
        })?;

        self.store.save(&self.key_for(index), &payload).await?;
        info!(
            session = %self.id,
            flow = self.flow.name(),
            step = %step.name,
            fields = payload.len(),
            "Step completed"
        );
        Ok(payload)
    }

    /// Payload stored for the step at `index`, if any.
    pub async fn stored_step(&self, index: usize) -> Result<Option<StepPayload>, FlowError> {
        Ok(self.store.get(&self.key_for(index)).await?)
    }

    /// Abandon the attempt, clearing all persisted partial state.
    pub async fn abandon(self) -> Result<(), FlowError> {
        self.store.clear().await?;
        info!(session = %self.id, flow = self.flow.name(), "Signup flow abandoned");
        Ok(())
    }

    /// Acquire the submission gate. Fails immediately if another submission
    /// for this session is still in flight.
    pub(crate) fn try_begin_submission(&self) -> Result<MutexGuard<'_, ()>, SubmitError> {
        self.submit_gate.try_lock().map_err(|_| SubmitError::InFlight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flows;
    use crate::store::MemoryStore;

    fn raw(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn doctor_profile() -> HashMap<String, String> {
        raw(&[
            ("fullName", "Dr. A"),
            ("nameWithInitials", "Dr. A."),
            ("slmcRegistrationNumber", "123"),
            ("specialization", "Cardiology"),
        ])
    }

    fn doctor_session() -> SignupSession {
        SignupSession::begin(flows::doctor_signup(), Arc::new(MemoryStore::new()))
    }

    // ── Entry decisions ──

    #[tokio::test]
    async fn first_step_is_enterable_from_a_fresh_session() {
        let session = doctor_session();
        assert!(session.enter_step(0).await.unwrap().is_proceed());
        assert!(session.started_at() <= Utc::now());
    }

    #[tokio::test]
    async fn second_step_redirects_until_first_is_stored() {
        let session = doctor_session();

        let decision = session.enter_step(1).await.unwrap();
        assert_eq!(
            decision,
            GuardDecision::Redirect {
                to_index: 0,
                to_step: "profile".to_string(),
            }
        );

        session.complete_step(0, &doctor_profile()).await.unwrap();
        assert!(session.enter_step(1).await.unwrap().is_proceed());
    }

    #[tokio::test]
    async fn entering_a_step_past_the_flow_is_an_error() {
        let session = doctor_session();
        let err = session.enter_step(9).await.unwrap_err();
        assert!(matches!(err, FlowError::UnknownStep { index: 9, .. }));
    }

    // ── Completing steps ──

    #[tokio::test]
    async fn completed_step_is_stored_under_its_flow_key() {
        let session = doctor_session();
        session.complete_step(0, &doctor_profile()).await.unwrap();

        let stored = session.stored_step(0).await.unwrap().unwrap();
        assert_eq!(stored.get("fullName"), Some("Dr. A"));
        assert_eq!(session.key_for(0), "doctorSignupStep1");
    }

    #[tokio::test]
    async fn invalid_step_is_not_stored() {
        let session = doctor_session();
        let err = session
            .complete_step(0, &raw(&[("fullName", "Dr. A")]))
            .await
            .unwrap_err();

        match err {
            FlowError::Validation { step, errors } => {
                assert_eq!(step, "profile");
                assert!(errors.contains_key("nameWithInitials"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(session.stored_step(0).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn completing_a_step_out_of_order_is_rejected() {
        let session = doctor_session();
        let err = session
            .complete_step(
                1,
                &raw(&[
                    ("mobileNumber", "+94771234567"),
                    ("email", "a@x.com"),
                    ("district", "Colombo"),
                ]),
            )
            .await
            .unwrap_err();

        match err {
            FlowError::OutOfOrder { step, missing } => {
                assert_eq!(step, "contact");
                assert_eq!(missing, "profile");
            }
            other => panic!("expected out-of-order error, got {other:?}"),
        }
        assert!(session.stored_step(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn revisiting_a_step_overwrites_its_payload() {
        let session = doctor_session();
        session.complete_step(0, &doctor_profile()).await.unwrap();

        let mut second = doctor_profile();
        second.insert("fullName".to_string(), "Dr. B".to_string());
        session.complete_step(0, &second).await.unwrap();

        let stored = session.stored_step(0).await.unwrap().unwrap();
        assert_eq!(stored.get("fullName"), Some("Dr. B"));
    }

    // ── Teardown ──

    #[tokio::test]
    async fn abandon_clears_partial_state() {
        let store = Arc::new(MemoryStore::new());
        let session = SignupSession::begin(flows::doctor_signup(), store.clone());
        session.complete_step(0, &doctor_profile()).await.unwrap();

        session.abandon().await.unwrap();
        assert!(store.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn submission_gate_rejects_a_second_holder() {
        let session = doctor_session();
        let _held = session.try_begin_submission().unwrap();

        assert!(matches!(
            session.try_begin_submission(),
            Err(SubmitError::InFlight)
        ));
    }

    #[tokio::test]
    async fn submission_gate_reopens_once_released() {
        let session = doctor_session();
        drop(session.try_begin_submission().unwrap());
        assert!(session.try_begin_submission().is_ok());
    }
}
