//! Output formatting for listings and resolved secrets.

use std::fmt::Write as _;

use gsecret_core::models::split_credential_pair;
use gsecret_core::secret::{Listing, ListingSource};
use serde_json::json;

use crate::error::CliError;

/// Heading printed above a listing
#[must_use]
pub fn listing_heading(listing: &Listing) -> &'static str {
    match listing.source {
        ListingSource::Remote => "ONLINE LIST",
        ListingSource::LocalCache { .. } => "Online is not available, here is the local list",
    }
}

/// Format a listing as a table with the alias index in the first column
#[must_use]
pub fn format_listing_table(listing: &Listing) -> String {
    if listing.ids.is_empty() {
        return "No secrets found.".to_string();
    }

    let index_width = (listing.ids.len() - 1).to_string().len().max(5);
    let mut output = String::new();

    let _ = writeln!(output, "{:<index_width$}  ID", "INDEX");
    let _ = writeln!(output, "{:-<index_width$}  {:-<2}", "", "");
    for (index, id) in listing.ids.iter().enumerate() {
        let _ = writeln!(output, "{index:<index_width$}  {id}");
    }

    output.trim_end().to_string()
}

/// Format a listing as JSON
///
/// # Errors
/// Returns an error if serialization fails.
pub fn format_listing_json(listing: &Listing) -> Result<String, CliError> {
    let (source, reason) = match &listing.source {
        ListingSource::Remote => ("remote", None),
        ListingSource::LocalCache { reason } => ("local", Some(reason.as_str())),
    };
    let secrets: Vec<_> = listing
        .ids
        .iter()
        .enumerate()
        .map(|(index, id)| json!({ "index": index, "id": id }))
        .collect();

    let mut document = json!({ "source": source, "secrets": secrets });
    if let Some(reason) = reason {
        document["reason"] = json!(reason);
    }

    serde_json::to_string_pretty(&document)
        .map_err(|e| CliError::Secret(format!("Failed to serialize listing: {e}")))
}

/// Format a resolved value as `ID:` / `PASSWORD:` lines
///
/// Values without a `:` are shown whole.
#[must_use]
pub fn format_secret_value(value: &str) -> String {
    match split_credential_pair(value) {
        Some((user, password)) => format!("ID: {user}\nPASSWORD: {password}"),
        None => format!("VALUE: {value}"),
    }
}
