//! Submission assembler.
//!
//! Merges every stored step payload with the final step's fields and
//! performs the signup POST exactly once. The order of operations matters:
//! nothing goes on the wire until the final step validates and every prior
//! step is confirmed present, and the store is only cleared after the API
//! says yes.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};

use crate::api::{SignupReceipt, SubmitTransport};
use crate::error::SubmitError;
use crate::session::SignupSession;
use crate::validator::validate_step;

/// Assembles the final request body and submits it.
pub struct Assembler {
    transport: Arc<dyn SubmitTransport>,
}

impl Assembler {
    pub fn new(transport: Arc<dyn SubmitTransport>) -> Self {
        Self { transport }
    }

    /// Submit the session's flow.
    ///
    /// The final step's fields arrive raw because that step is never
    /// persisted: it is validated here, merged with the stored payloads of
    /// every prior step, and posted in one request. On success the step
    /// store is cleared; on any failure it is left untouched so the user
    /// can retry without re-entering steps.
    pub async fn submit(
        &self,
        session: &SignupSession,
        raw_final: &HashMap<String, String>,
    ) -> Result<SignupReceipt, SubmitError> {
        // Held for the whole attempt, including the network await. A second
        // submit on this session fails fast instead of double-posting.
        let _in_flight = session.try_begin_submission()?;

        let flow = session.flow();
        let (final_step, prior_steps) = flow.split_final();

        let final_payload = validate_step(final_step, raw_final).map_err(|errors| {
            SubmitError::Validation {
                step: final_step.name.clone(),
                errors,
            }
        })?;

        // Fail closed before any network traffic if a prior step is missing.
        let mut merged = serde_json::Map::new();
        for (index, step) in prior_steps.iter().enumerate() {
            let key = session.key_for(index);
            let Some(payload) = session.store().get(&key).await? else {
                warn!(
                    session = %session.id(),
                    flow = flow.name(),
                    step = %step.name,
                    "Refusing to submit an incomplete flow"
                );
                return Err(SubmitError::Incomplete {
                    missing: step.name.clone(),
                });
            };
            for (field, value) in payload.fields() {
                merged.insert(field.clone(), serde_json::Value::String(value.clone()));
            }
        }
        for (field, value) in final_payload.fields() {
            merged.insert(field.clone(), serde_json::Value::String(value.clone()));
        }

        let body = serde_json::Value::Object(merged);
        let receipt = self.transport.submit(flow.role(), &body).await?;

        // Success: the attempt is over, so stored steps are stale now.
        // A failed cleanup is not worth failing the signup over.
        if let Err(e) = session.store().clear().await {
            warn!(session = %session.id(), error = %e, "Failed to clear step store after submission");
        }

        info!(
            session = %session.id(),
            flow = flow.name(),
            role = %flow.role(),
            id = receipt.id.as_deref().unwrap_or("-"),
            "Signup submitted"
        );
        Ok(receipt)
    }
}
