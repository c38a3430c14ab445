use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Boxed error detail carried inside [`Error`].
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    Fetch,
    Format,
    Convert,
    Delivery,
    Persistence,
    Config,
    Service,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Fetch => write!(f, "fetch"),
            ErrorKind::Format => write!(f, "format"),
            ErrorKind::Convert => write!(f, "convert"),
            ErrorKind::Delivery => write!(f, "delivery"),
            ErrorKind::Persistence => write!(f, "persistence"),
            ErrorKind::Config => write!(f, "config"),
            ErrorKind::Service => write!(f, "service"),
        }
    }
}

pub struct ErrorInner {
    pub kind: ErrorKind,
    pub source: Option<BoxError>,
}

pub struct Error {
    pub inner: Box<ErrorInner>,
}

impl Error {
    pub fn new<E>(kind: ErrorKind, source: Option<E>) -> Error
    where
        E: Into<BoxError>,
    {
        Error {
            inner: Box::new(ErrorInner {
                kind,
                source: source.map(Into::into),
            }),
        }
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.inner.kind
    }

    pub fn is_fetch(&self) -> bool {
        matches!(self.inner.kind, ErrorKind::Fetch)
    }

    pub fn is_format(&self) -> bool {
        matches!(self.inner.kind, ErrorKind::Format)
    }

    pub fn is_convert(&self) -> bool {
        matches!(self.inner.kind, ErrorKind::Convert)
    }

    pub fn is_delivery(&self) -> bool {
        matches!(self.inner.kind, ErrorKind::Delivery)
    }

    pub fn is_persistence(&self) -> bool {
        matches!(self.inner.kind, ErrorKind::Persistence)
    }

    pub fn is_config(&self) -> bool {
        matches!(self.inner.kind, ErrorKind::Config)
    }

    pub fn is_timeout(&self) -> bool {
        if let Some(source) = &self.inner.source {
            source.to_string().to_lowercase().contains("timeout")
        } else {
            false
        }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut f = f.debug_struct("feedwatch::Error");
        f.field("kind", &self.inner.kind);
        if let Some(ref source) = self.inner.source {
            f.field("source", source);
        }
        f.finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error", self.inner.kind)?;

        if let Some(ref source) = self.inner.source {
            write!(f, ": {source}")?;
        }

        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner
            .source
            .as_ref()
            .map(|e| &**e as &(dyn StdError + 'static))
    }
}

impl From<FetchError> for Error {
    fn from(err: FetchError) -> Self {
        Error::new(ErrorKind::Fetch, Some(err))
    }
}

impl From<FormatError> for Error {
    fn from(err: FormatError) -> Self {
        Error::new(ErrorKind::Format, Some(err))
    }
}

impl From<ConvertError> for Error {
    fn from(err: ConvertError) -> Self {
        Error::new(ErrorKind::Convert, Some(err))
    }
}

impl From<DeliveryError> for Error {
    fn from(err: DeliveryError) -> Self {
        Error::new(ErrorKind::Delivery, Some(err))
    }
}

impl From<PersistenceError> for Error {
    fn from(err: PersistenceError) -> Self {
        Error::new(ErrorKind::Persistence, Some(err))
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::new(ErrorKind::Config, Some(err))
    }
}

/// Errors raised while pulling raw content from a source.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("source unavailable: status {0}")]
    Unavailable(u16),
    #[error("network error: {0}")]
    Network(#[source] BoxError),
    #[error("decode error: {0}")]
    Decode(#[source] BoxError),
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
}

/// Errors raised by the converter registry.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("unknown format: {0}")]
    UnknownFormat(String),
}

/// Errors raised by converters. Callers of the pipeline never see these;
/// they degrade to the empty/pass-through policies.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("malformed content: {0}")]
    Malformed(#[source] BoxError),
}

/// Errors raised while delivering a broadcast to one subscriber.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("endpoint rejected delivery: status {0}")]
    Rejected(u16),
    #[error("endpoint unreachable: {0}")]
    Unreachable(#[source] BoxError),
}

/// Errors raised by the durable subscriber store. Load problems are not
/// here on purpose: an absent or corrupt file degrades to the empty set.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("save failed: {0}")]
    SaveFailed(#[source] BoxError),
    #[error("serde failed: {0}")]
    SerdeFailed(#[source] BoxError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read failed: {0}")]
    ReadFailed(#[source] BoxError),
    #[error("parse failed: {0}")]
    ParseFailed(#[source] BoxError),
    #[error("invalid value: {0}")]
    InvalidValue(String),
}

impl Error {
    pub fn unknown_format(token: impl Into<String>) -> Self {
        Error::from(FormatError::UnknownFormat(token.into()))
    }

    pub fn source_unavailable(status: u16) -> Self {
        Error::from(FetchError::Unavailable(status))
    }

    pub fn save_failed<E: Into<BoxError>>(source: E) -> Self {
        Error::from(PersistenceError::SaveFailed(source.into()))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::new(ErrorKind::Service, Some(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::from(PersistenceError::SerdeFailed(err.into()))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::from(FetchError::Network(err.into()))
    }
}

impl From<base64::DecodeError> for Error {
    fn from(err: base64::DecodeError) -> Self {
        Error::from(FetchError::Decode(err.into()))
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::from(ConfigError::ParseFailed(err.into()))
    }
}
