use thiserror::Error;

pub type Result<T> = std::result::Result<T, HarvestError>;

#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("network error: {0}")]
    Net(#[from] NetError),
    #[error("auth error: {0}")]
    Auth(#[from] AuthError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

#[derive(Debug, Error)]
pub enum NetError {
    #[error("unsupported HTTP method `{0}`")]
    UnsupportedMethod(String),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("signer rejected private key: {0}")]
    Signer(String),
    #[error("CSRF endpoint returned no set-cookie header")]
    MissingCsrfCookie,
    #[error("no XSRF-TOKEN assignment in session cookie")]
    MissingXsrfToken,
    #[error("login rejected: {0}")]
    LoginRejected(String),
    #[error("malformed auth response: {0}")]
    MalformedResponse(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required configuration: {0}")]
    MissingConfig(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("secret source unusable: {0}")]
    SecretSource(String),
}
