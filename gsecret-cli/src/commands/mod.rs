//! Command handler modules for the CLI.

mod add;
mod completions;
mod get;
mod list;
mod project;
mod remove;

use crate::cli::Commands;
use crate::error::CliError;
use crate::util::Context;

/// Dispatch a CLI command to the appropriate handler.
pub fn dispatch(ctx: &Context<'_>, command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Setid { project_id } => project::cmd_setid(ctx, project_id.as_deref()),
        Commands::Getid => project::cmd_getid(ctx),
        Commands::List { format } => list::cmd_list(ctx, format),
        Commands::Add { id, protect } => add::cmd_add(ctx, id.as_deref(), protect),
        Commands::Get {
            secret,
            raw,
            no_prompt,
        } => get::cmd_get(ctx, &secret, raw, no_prompt),
        Commands::Remove { id, countdown } => remove::cmd_remove(ctx, id.as_deref(), countdown),
        Commands::Completions { shell } => completions::cmd_completions(shell),
    }
}
