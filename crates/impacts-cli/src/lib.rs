//! Shared pieces of the `impacts` command-line client.

use std::io::Read;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use impacts_core::models::{CreateOrganizationRequest, CreatedOrganization};
use impacts_ingest::{accept_upload, ImportSession, IngestError, PersistenceGateway, UploadLimits};
use serde::Serialize;

/// Initialize tracing for the CLI. Logs go to stderr so stdout stays JSON.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();
}

/// Split a `--set field=value` argument. The value may itself contain `=`.
pub fn parse_assignment(arg: &str) -> Result<(String, String), String> {
    let (field, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected field=value, got '{arg}'"))?;
    let field = field.trim();
    if field.is_empty() {
        return Err(format!("missing field name in '{arg}'"));
    }
    Ok((field.to_string(), value.to_string()))
}

/// Read a `.json`/`.txt` file under the same limits the server applies to uploads.
/// `-` reads stdin, which has no name to check but is still capped.
pub fn read_source(path: &Path) -> Result<String> {
    let limits = UploadLimits::default();
    if path == Path::new("-") {
        return read_limited(std::io::stdin().lock(), None, &limits);
    }
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    let name = path.file_name().and_then(|n| n.to_str());
    read_limited(file, name, &limits)
}

/// Read at most one byte past the cap, then hand the bytes to [`accept_upload`].
pub fn read_limited(reader: impl Read, name: Option<&str>, limits: &UploadLimits) -> Result<String> {
    let cap = u64::try_from(limits.max_size_bytes)
        .unwrap_or(u64::MAX)
        .saturating_add(1);
    let mut bytes = Vec::new();
    reader
        .take(cap)
        .read_to_end(&mut bytes)
        .context("Failed to read input")?;
    Ok(accept_upload(name, &bytes, limits)?)
}

/// What `import` produced: the reviewed candidate and, once approved, its id.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOutcome {
    pub candidate: CreateOrganizationRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<CreatedOrganization>,
}

/// Drive one record through parse, preview, optional edits and optional approval.
///
/// Without `approve` the session is discarded after the preview, so nothing
/// reaches `gateway`.
pub async fn run_import(
    raw: &str,
    edits: &[(String, String)],
    approve: bool,
    current_year: i32,
    gateway: &dyn PersistenceGateway,
) -> Result<ImportOutcome> {
    let mut session = ImportSession::new(current_year);
    session.parse(raw)?;
    session.preview()?;

    if !edits.is_empty() {
        let form = session.edit()?;
        for (field, value) in edits {
            form.set_field(field, value).map_err(|e| anyhow!(e))?;
        }
        if let Err(e) = session.save() {
            return Err(describe(e));
        }
    }

    let candidate = session
        .candidate()
        .cloned()
        .ok_or_else(|| anyhow!("Nothing to import"))?;

    if !approve {
        session.discard()?;
        return Ok(ImportOutcome {
            candidate,
            created: None,
        });
    }

    let created = match session.approve(gateway).await {
        Ok(created) => created.clone(),
        Err(e) => return Err(describe(e)),
    };
    Ok(ImportOutcome {
        candidate,
        created: Some(created),
    })
}

fn describe(error: IngestError) -> anyhow::Error {
    match error {
        IngestError::Validation(_) => {
            let fields = error.invalid_fields().join(", ");
            anyhow!("{} (fields: {})", error, fields)
        }
        IngestError::Gateway(e) => anyhow!(e.client_message()),
        other => other.into(),
    }
}
