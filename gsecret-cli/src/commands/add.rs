//! Add secret command.

use crate::cli::OutputFormat;
use crate::commands::list::print_listing;
use crate::error::CliError;
use crate::util::{
    Context, build_engine, create_config_manager, create_runtime, load_project, print_banner,
    prompt_line, read_secret, secrets_match,
};

/// Add secret command handler
pub fn cmd_add(ctx: &Context<'_>, id: Option<&str>, protect: bool) -> Result<(), CliError> {
    let manager = create_config_manager(ctx.config_path)?;
    let (settings, project_id) = load_project(&manager)?;
    print_banner(ctx, &project_id);

    let id = match id {
        Some(id) => id.trim().to_string(),
        None => prompt_line("Secret name: ")?.trim().to_string(),
    };
    if id.is_empty() {
        return Err(CliError::InvalidInput("secret name must not be empty".into()));
    }

    let value = read_secret("Secret value: ")?;

    let password = if protect {
        let first = read_secret("A password to encrypt: ")?;
        let second = read_secret("Confirm the password: ")?;
        if !secrets_match(&first, &second) {
            return Err(CliError::Aborted(
                "The two passwords are not the same".into(),
            ));
        }
        Some(first)
    } else {
        None
    };

    let engine = build_engine(ctx, &manager, &settings, &project_id)?;
    let outcome = create_runtime()?.block_on(engine.add(&id, &value, password.as_ref()))?;

    match &outcome.remote_version {
        Some(version) => ctx.info(format!("Added '{}' ({version})", outcome.id)),
        None => ctx.info(format!(
            "Remote store unavailable; '{}' saved locally",
            outcome.id
        )),
    }
    if outcome.protected {
        ctx.info("The value is encrypted; its password is cached in the local keyring");
    }

    print_listing(ctx, &outcome.listing, OutputFormat::Table)
}
