use reqwest;
use serde::{Deserialize, Serialize};
use serde_json;
use std::{error::Error, fmt};

#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq)]
pub enum Status {
    #[default]
    Ok,

    Internal(String),
    InvalidArgument(String),
    NotFound(String),

    /// Required store configuration is absent from the environment.
    MissingConfig(String),

    /// An input document could not be parsed into game records.
    Parse(String),
}

impl Status {
    pub fn new(msg: &str, err: impl Error) -> Self {
        Status::Internal(format!("{msg}: '{err}'"))
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Status::Internal(msg.into())
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Status::InvalidArgument(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Status::NotFound(msg.into())
    }

    pub fn missing_config(msg: impl Into<String>) -> Self {
        Status::MissingConfig(msg.into())
    }

    pub fn parse(file: &str, err: impl Error) -> Self {
        Status::Parse(format!("{file}: '{err}'"))
    }
}

impl From<std::io::Error> for Status {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::not_found(err.to_string()),
            _ => Self::new("IO error", err),
        }
    }
}

impl From<serde_json::Error> for Status {
    fn from(err: serde_json::Error) -> Self {
        Self::new("serde error", err)
    }
}

impl From<reqwest::Error> for Status {
    fn from(err: reqwest::Error) -> Self {
        Self::new("reqwest error", err)
    }
}

impl Error for Status {}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Ok => write!(f, "Ok"),
            Status::Internal(msg) => write!(f, "Internal error: {msg}"),
            Status::InvalidArgument(msg) => write!(f, "Invalid argument error: {msg}"),
            Status::NotFound(msg) => write!(f, "Not found error: {msg}"),
            Status::MissingConfig(msg) => write!(f, "Missing configuration: {msg}"),
            Status::Parse(msg) => write!(f, "Parse error: {msg}"),
        }
    }
}
