#![deny(missing_docs)]

//! # Routes Commands
//!
//! Inspection of the assembled endpoints: listing and path matching.

use std::path::{Path, PathBuf};

use apidoc_core::oas::EndpointRecord;
use apidoc_core::{find_endpoint, ApiManifest, AppError, AppResult, HttpMethod};

/// Arguments for the routes listing.
#[derive(clap::Args, Debug, Clone)]
pub struct RoutesArgs {
    /// Path to the manifest.
    #[clap(short, long)]
    pub input: PathBuf,
}

/// Arguments for path matching.
#[derive(clap::Args, Debug, Clone)]
pub struct MatchArgs {
    /// Path to the manifest.
    #[clap(short, long)]
    pub input: PathBuf,

    /// HTTP method, case-insensitive.
    #[clap(short, long, default_value = "GET", value_parser = parse_method)]
    pub method: HttpMethod,

    /// Concrete request path, e.g. `/users/42`.
    #[clap(short, long)]
    pub path: String,
}

fn parse_method(s: &str) -> Result<HttpMethod, String> {
    HttpMethod::parse(s).ok_or_else(|| format!("unknown HTTP method: {s}"))
}

fn load_records(input: &Path) -> AppResult<Vec<EndpointRecord>> {
    let manifest = ApiManifest::from_file(input)?;
    let (records, _) = manifest.records(&manifest.base_config())?;
    Ok(records)
}

/// One line per record: methods, mask, pattern and operation id.
///
/// Alias clones carry their primary's operation id (the document suffixes
/// it), so they are labelled with the mask they copy. Hidden records are
/// labelled too.
pub fn format_record(record: &EndpointRecord) -> String {
    let methods: Vec<&str> = record.methods.iter().map(|m| m.as_str()).collect();
    let mut line = format!(
        "{:<12} {:<32} {:<40} {}",
        methods.join("|"),
        record.mask,
        record.pattern.as_str(),
        record.operation_id
    );
    if let Some(primary) = &record.alias_of {
        line.push_str(&format!(" [alias of {primary}]"));
    }
    if record.hidden {
        line.push_str(" [hidden]");
    }
    line
}

/// Prints every assembled endpoint.
pub fn list(args: &RoutesArgs) -> AppResult<()> {
    let records = load_records(&args.input)?;
    for record in &records {
        println!("{}", format_record(record));
    }
    tracing::info!(count = records.len(), "Listed endpoints");
    Ok(())
}

/// Finds the endpoint for a method and path and prints it with its captures.
pub fn resolve(args: &MatchArgs) -> AppResult<()> {
    let records = load_records(&args.input)?;
    let (record, captures) = find_endpoint(&records, args.method, &args.path).ok_or_else(|| {
        AppError::General(format!(
            "No endpoint matches {} {}",
            args.method, args.path
        ))
    })?;

    println!("{} -> {}", record.mask, record.handler);
    for (name, value) in &captures {
        println!("  {name} = {value}");
    }
    Ok(())
}
