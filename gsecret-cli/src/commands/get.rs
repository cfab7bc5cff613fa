//! Get secret command.

use gsecret_core::secret::{Decryption, DecryptionPrompt, NoPrompt};
use secrecy::ExposeSecret;

use crate::error::CliError;
use crate::format::format_secret_value;
use crate::util::{
    Context, TerminalPrompt, build_engine, create_config_manager, create_runtime, load_project,
    print_banner,
};

/// Get secret command handler
pub fn cmd_get(ctx: &Context<'_>, token: &str, raw: bool, no_prompt: bool) -> Result<(), CliError> {
    let manager = create_config_manager(ctx.config_path)?;
    let (settings, project_id) = load_project(&manager)?;
    if !raw {
        print_banner(ctx, &project_id);
    }

    let engine = build_engine(ctx, &manager, &settings, &project_id)?;
    let prompt: &dyn DecryptionPrompt = if no_prompt || !TerminalPrompt::is_available() {
        &NoPrompt
    } else {
        &TerminalPrompt
    };

    let Some(secret) = create_runtime()?.block_on(engine.get(token, prompt)) else {
        if !ctx.quiet {
            eprintln!("No secret found for '{token}'");
        }
        return Ok(());
    };

    if let Decryption::Failed(e) = &secret.decryption {
        eprintln!("Warning: could not decrypt '{}': {e}; showing the stored value", secret.id);
    }

    let value = secret.value.expose_secret();
    if raw {
        println!("{value}");
    } else {
        ctx.info(format!(
            "Secret '{}' ({}) from {}",
            secret.id, secret.version, secret.source
        ));
        println!("{}", format_secret_value(value));
    }
    Ok(())
}
