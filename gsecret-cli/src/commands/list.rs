//! List secrets command.

use gsecret_core::secret::Listing;

use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::format::{format_listing_json, format_listing_table, listing_heading};
use crate::util::{
    Context, build_engine, create_config_manager, create_runtime, load_project, print_banner,
};

/// List secrets command handler
pub fn cmd_list(ctx: &Context<'_>, format: OutputFormat) -> Result<(), CliError> {
    let manager = create_config_manager(ctx.config_path)?;
    let (settings, project_id) = load_project(&manager)?;
    if matches!(format, OutputFormat::Table) {
        print_banner(ctx, &project_id);
    }

    let engine = build_engine(ctx, &manager, &settings, &project_id)?;
    let listing = create_runtime()?.block_on(engine.list())?;

    print_listing(ctx, &listing, format)
}

/// Print a listing in the requested format
pub fn print_listing(
    ctx: &Context<'_>,
    listing: &Listing,
    format: OutputFormat,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Table => {
            ctx.info(listing_heading(listing));
            println!("{}", format_listing_table(listing));
        }
        OutputFormat::Json => println!("{}", format_listing_json(listing)?),
    }
    Ok(())
}
