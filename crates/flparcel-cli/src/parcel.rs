//! Parcel lookup command handlers.
//!
//! Called from `main` once config is loaded and the [`ParcelLookup`] is built.

use std::path::Path;

use anyhow::Context;
use flparcel_adapter::{
    CountyRegistry, CountyStatus, ErrorClass, LookupError, LookupRequest, ParcelLookup,
};

use crate::report::{render, OutputFormat};

/// Look up one parcel and print it.
///
/// # Errors
///
/// Returns the lookup failure so the process exits non-zero.
pub(crate) async fn run_lookup(
    lookup: &ParcelLookup,
    county: &str,
    parcel_id: &str,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match lookup.lookup(county, parcel_id).await {
        Ok(record) => {
            println!("{}", render(&record, format)?);
            Ok(())
        }
        Err(e) => {
            log_failure(&e);
            Err(anyhow::Error::new(e))
        }
    }
}

/// Look up every `county,parcel_id` line of `path` and print each result.
///
/// Individual failures are printed and counted, not propagated.
///
/// # Errors
///
/// Returns an error if the file cannot be read or has a malformed line.
pub(crate) async fn run_batch(
    lookup: &ParcelLookup,
    path: &Path,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read batch file {}", path.display()))?;
    let requests = parse_batch(&content)?;

    if requests.is_empty() {
        println!("no parcels in {}", path.display());
        return Ok(());
    }

    let results = lookup.lookup_many(&requests).await;

    let mut ok_count = 0usize;
    let mut failed_count = 0usize;
    for (request, result) in requests.iter().zip(results) {
        match result {
            Ok(record) => {
                ok_count += 1;
                println!("{}", render(&record, format)?);
            }
            Err(e) => {
                failed_count += 1;
                log_failure(&e);
                eprintln!("{} {}: {e}", request.county, request.parcel_id);
            }
        }
    }

    println!("batch complete: {ok_count} found, {failed_count} failed");
    Ok(())
}

/// Parses batch file content: one `county,parcel_id` per line, with blank
/// lines and `#` comments skipped.
///
/// # Errors
///
/// Returns an error naming the first line without both fields.
pub(crate) fn parse_batch(content: &str) -> anyhow::Result<Vec<LookupRequest>> {
    let mut requests = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (county, parcel_id) = line
            .split_once(',')
            .map(|(c, p)| (c.trim(), p.trim()))
            .filter(|(c, p)| !c.is_empty() && !p.is_empty())
            .ok_or_else(|| {
                anyhow::anyhow!("line {}: expected 'county,parcel_id', got '{line}'", idx + 1)
            })?;
        requests.push(LookupRequest::new(county, parcel_id));
    }
    Ok(requests)
}

/// Print the county registry: status, identifier format, and endpoint.
pub(crate) fn run_counties(registry: &CountyRegistry) {
    println!("{:<14}{:<13}{:<40}ENDPOINT", "COUNTY", "STATUS", "ID FORMAT");
    for profile in registry.profiles() {
        let status = match profile.status {
            CountyStatus::Active => "active",
            CountyStatus::Unsupported { .. } => "unsupported",
        };
        let endpoint = profile
            .endpoint
            .as_ref()
            .map_or_else(|| "n/a".to_string(), |e| e.layer_url());
        println!(
            "{:<14}{:<13}{:<40}{}",
            profile.key.name(),
            status,
            profile.id_pattern.hint,
            endpoint
        );
        if let CountyStatus::Unsupported { reason } = profile.status {
            println!("{:<14}{reason}", "");
        }
    }
}

fn log_failure(err: &LookupError) {
    match err.class() {
        ErrorClass::BusinessOutcome | ErrorClass::UserInput => {
            tracing::info!(county = %err.county(), error = %err, "lookup returned no record");
        }
        ErrorClass::Upstream => {
            tracing::warn!(county = %err.county(), error = %err, "county service failed");
        }
        ErrorClass::SchemaDrift => {
            tracing::error!(
                county = %err.county(),
                error = %err,
                "county data could not be mapped"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_batch_skips_comments_and_blanks() {
        let content =
            "# county,parcel\n\nManatee,1234567890\n  Pinellas , 03-32-16-11737-001-0010  \n";
        let requests = parse_batch(content).unwrap();
        assert_eq!(
            requests,
            vec![
                LookupRequest::new("Manatee", "1234567890"),
                LookupRequest::new("Pinellas", "03-32-16-11737-001-0010"),
            ]
        );
    }

    #[test]
    fn parse_batch_rejects_line_without_comma() {
        let err = parse_batch("Manatee,1234567890\nHillsborough\n").unwrap_err();
        assert!(err.to_string().contains("line 2"), "{err}");
    }

    #[test]
    fn parse_batch_rejects_empty_parcel_id() {
        assert!(parse_batch("Manatee,\n").is_err());
    }
}
