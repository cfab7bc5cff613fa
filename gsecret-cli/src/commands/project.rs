//! Project id commands.

use crate::error::CliError;
use crate::util::{Context, create_config_manager, load_project, prompt_line};

/// Persist the project id, prompting when it was not given
pub fn cmd_setid(ctx: &Context<'_>, project_id: Option<&str>) -> Result<(), CliError> {
    let project_id = match project_id {
        Some(id) => id.to_string(),
        None => prompt_line("Project id: ")?,
    };
    if project_id.trim().is_empty() {
        return Err(CliError::InvalidInput("project id must not be empty".into()));
    }

    let manager = create_config_manager(ctx.config_path)?;
    let settings = manager.set_project_id(&project_id)?;
    ctx.info(format!(
        "Project id set to: {}",
        settings.project_id().unwrap_or_default()
    ));
    Ok(())
}

/// Print the configured project id
pub fn cmd_getid(ctx: &Context<'_>) -> Result<(), CliError> {
    let manager = create_config_manager(ctx.config_path)?;
    let (_, project_id) = load_project(&manager)?;
    println!("{project_id}");
    Ok(())
}
