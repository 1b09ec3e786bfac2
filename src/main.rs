use std::collections::HashMap;
use std::io::{BufRead, Write};
use std::sync::Arc;

use enroll_core::api::HttpTransport;
use enroll_core::assembler::Assembler;
use enroll_core::config::ClientConfig;
use enroll_core::error::{FieldErrors, FlowError, SubmitError};
use enroll_core::flows;
use enroll_core::guard::GuardDecision;
use enroll_core::schema::{FieldKind, StepSchema};
use enroll_core::session::SignupSession;
use enroll_core::store::{FileStore, MemoryStore, StepStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = ClientConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        eprintln!("  export ENROLL_API_BASE=http://localhost:5000/api");
        std::process::exit(1);
    });

    let flow_name = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "patientSignup".to_string());
    let flow = flows::by_name(&flow_name).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        eprintln!("  known flows: doctorSignup, patientSignup");
        std::process::exit(1);
    });

    eprintln!("🏥 Enroll v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   API: {}", config.api_base);
    eprintln!("   Flow: {} ({} steps)", flow.name(), flow.step_count());

    // ── Step store ───────────────────────────────────────────────────────
    let store: Arc<dyn StepStore> = match &config.state_dir {
        Some(dir) => {
            let path = dir.join(format!("{}.json", flow_name));
            eprintln!("   State: {}", path.display());
            Arc::new(FileStore::new(path))
        }
        None => Arc::new(MemoryStore::new()),
    };
    eprintln!();

    let session = SignupSession::begin(flow, store);
    let steps = session.flow().steps();
    let step_count = steps.len();

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    // ── Prior steps: validate and persist one at a time ─────────────────
    for (index, step) in steps[..step_count - 1].iter().enumerate() {
        if let GuardDecision::Redirect { to_step, .. } = session.enter_step(index).await? {
            eprintln!("Error: step {} is missing, restart the flow", to_step);
            std::process::exit(1);
        }

        eprintln!("── Step {}/{}: {} ──", index + 1, step_count, step.name);
        loop {
            let raw = prompt_step(step, &mut lines)?;
            match session.complete_step(index, &raw).await {
                Ok(_) => break,
                Err(FlowError::Validation { errors, .. }) => print_field_errors(&errors),
                Err(e) => return Err(e.into()),
            }
        }
        eprintln!();
    }

    // ── Final step: validate inline, then submit the assembled body ─────
    let transport = Arc::new(HttpTransport::new(&config)?);
    let assembler = Assembler::new(transport);
    let final_step = &steps[step_count - 1];

    loop {
        eprintln!(
            "── Step {}/{}: {} ──",
            step_count, step_count, final_step.name
        );
        let raw = prompt_step(final_step, &mut lines)?;

        match assembler.submit(&session, &raw).await {
            Ok(receipt) => {
                eprintln!(
                    "\n✅ Signup complete (id: {})",
                    receipt.id.as_deref().unwrap_or("none")
                );
                break;
            }
            Err(SubmitError::Validation { errors, .. }) => print_field_errors(&errors),
            Err(e) => {
                eprintln!("\nError: {}", e);
                if config.state_dir.is_some() {
                    eprintln!("  Completed steps are kept; run again to retry.");
                }
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

/// Prompt for each field of `step` on stdin, returning the raw values.
fn prompt_step(
    step: &StepSchema,
    lines: &mut std::io::Lines<std::io::StdinLock<'static>>,
) -> Result<HashMap<String, String>, std::io::Error> {
    let mut raw = HashMap::new();
    for rule in &step.fields {
        let hint = match &rule.kind {
            FieldKind::OneOf { allowed } => format!(
                " ({})",
                allowed
                    .iter()
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join("/")
            ),
            _ if !rule.required => " (optional)".to_string(),
            _ => String::new(),
        };
        eprint!("   {}{}: ", rule.name, hint);
        std::io::stderr().flush()?;
        let value = lines.next().transpose()?.unwrap_or_default();
        raw.insert(rule.name.clone(), value);
    }
    Ok(raw)
}

fn print_field_errors(errors: &FieldErrors) {
    for message in errors.values() {
        eprintln!("   ✗ {}", message);
    }
    eprintln!("   Please re-enter the step.\n");
}
