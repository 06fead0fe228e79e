use thiserror::Error;

/// Failure talking to the SARH webservice. Any of these aborts the affected
/// query; whether the run continues depends on the synthetic-fallback flag.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),
    #[error("payload could not be decoded: {0}")]
    Payload(String),
}

/// Errors that end a pipeline run. Per-entry validation problems and
/// per-unit delivery failures are not here on purpose, they are counted in
/// the run summary and logged as warnings.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("competência inválida: '{0}' (esperado YYYY-MM)")]
    InvalidPeriod(String),
    #[error("consulta ao SARH falhou: {0}")]
    Gateway(#[from] GatewayError),
    #[error("falha de armazenamento: {0}")]
    Store(#[from] sqlx::Error),
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid mailbox address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("failed to build message: {0}")]
    Build(#[from] lettre::error::Error),
    #[error("failed to render template: {0}")]
    Render(#[from] handlebars::RenderError),
    #[error("smtp transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}
