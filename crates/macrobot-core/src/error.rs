use thiserror::Error;

/// Failures surfaced by macro lookups. All three kinds propagate to the
/// presentation layer untouched; none is retried automatically.
#[derive(Debug, Error)]
pub enum MacroError {
    #[error("community has no macro channel")]
    NoMacroChannel,
    #[error("no macro named `{name}`")]
    MacroNotFound { name: String },
    #[error("message store fetch failed: {0}")]
    UpstreamFetch(#[source] anyhow::Error),
}
