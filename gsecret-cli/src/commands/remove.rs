//! Remove secret command.

use std::io::Write as _;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use gsecret_core::secret::{CancellationToken, CountdownState, DeleteCountdown, RemoveOutcome};

use crate::cli::OutputFormat;
use crate::commands::list::print_listing;
use crate::error::{CliError, exit_codes};
use crate::util::{
    Context, build_engine, create_config_manager, create_runtime, load_project, print_banner,
    prompt_line,
};

/// Remove secret command handler
pub fn cmd_remove(
    ctx: &Context<'_>,
    token: Option<&str>,
    countdown: Option<u64>,
) -> Result<(), CliError> {
    let manager = create_config_manager(ctx.config_path)?;
    let (settings, project_id) = load_project(&manager)?;
    print_banner(ctx, &project_id);

    let token = match token {
        Some(token) => token.trim().to_string(),
        None => prompt_line("Secret to remove: ")?.trim().to_string(),
    };
    if token.is_empty() {
        return Err(CliError::InvalidInput("secret name must not be empty".into()));
    }

    let engine = build_engine(ctx, &manager, &settings, &project_id)?;
    let id = engine.resolve(&token);
    let seconds = countdown.unwrap_or(settings.delete.countdown_secs);

    ctx.info(format!(
        "The secret '{id}' will be deleted in {seconds} seconds. Press Ctrl+C to cancel."
    ));

    let quiet = ctx.quiet;
    let runtime = create_runtime()?;
    let outcome = runtime.block_on(async {
        let cancel = CancellationToken::new();
        let committed = Arc::new(AtomicBool::new(false));
        let handler = spawn_interrupt_handler(cancel.clone(), Arc::clone(&committed));

        let mut countdown = DeleteCountdown::new(seconds);
        let result = engine
            .remove(&id, &mut countdown, &cancel, |state| {
                match state {
                    CountdownState::Confirming { remaining } if !quiet => {
                        print!("\rTime remaining: {remaining} seconds ");
                        let _ = std::io::stdout().flush();
                    }
                    CountdownState::Proceeding => committed.store(true, Ordering::SeqCst),
                    _ => {}
                }
                if state.is_terminal() && !quiet {
                    if seconds > 0 {
                        println!();
                    }
                    if state == CountdownState::Proceeding {
                        println!("Deleting '{id}'...");
                    }
                }
            })
            .await;

        handler.abort();
        result
    })?;

    match outcome {
        RemoveOutcome::Aborted { id } => Err(CliError::Aborted(format!(
            "Deletion of '{id}' cancelled"
        ))),
        RemoveOutcome::Deleted {
            id,
            remote_deleted,
            listing,
        } => {
            if remote_deleted {
                ctx.info(format!("Deleted '{id}'"));
            } else {
                ctx.info(format!(
                    "Remote store unavailable; '{id}' removed from the local list"
                ));
            }
            print_listing(ctx, &listing, OutputFormat::Table)
        }
    }
}

/// Ctrl+C cancels the countdown; once the delete is committed it interrupts
/// the process instead of being swallowed while the remote call runs.
fn spawn_interrupt_handler(
    cancel: CancellationToken,
    committed: Arc<AtomicBool>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if committed.load(Ordering::SeqCst) {
                eprintln!("\nInterrupted; the delete may already have been applied remotely");
                std::process::exit(exit_codes::INTERRUPTED);
            }
            cancel.cancel();
        }
    })
}
