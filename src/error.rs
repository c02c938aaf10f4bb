//! Error types shared by the attendance core and its data-store gateway.

use thiserror::Error;

/// A failure reported by the data store behind an [`AttendanceGateway`].
///
/// [`AttendanceGateway`]: crate::gateway::AttendanceGateway
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("could not connect to {url}: {source}")]
    Connection {
        url: String,
        #[source]
        source: diesel::ConnectionError,
    },

    #[error("query failed: {0}")]
    Query(#[from] diesel::result::Error),

    #[error("schema setup failed: {0}")]
    Migration(String),

    #[error("the data store rejected the operation: {0}")]
    Rejected(String),
}

/// Every way an attendance operation can fail.
///
/// The first three variants are validation failures and are always reported before the gateway is
/// contacted.
#[derive(Debug, Error)]
pub enum AttendanceError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid status '{0}', expected one of present, absent, late")]
    InvalidStatus(String),

    #[error("invalid date '{0}', expected a calendar date in YYYY-MM-DD form")]
    InvalidDate(String),

    #[error("{actor} is not allowed to {action}")]
    Unauthorized { actor: String, action: String },

    #[error("{0} not found")]
    NotFound(String),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl AttendanceError {
    pub(crate) fn unauthorized(actor: &str, action: impl Into<String>) -> Self {
        AttendanceError::Unauthorized {
            actor: actor.to_string(),
            action: action.into(),
        }
    }
}

pub type Result<T, E = AttendanceError> = std::result::Result<T, E>;
