use thiserror::Error;

/// Failures at the HTTP boundary.
///
/// The server reports human-readable failures in a `{"detail": string}`
/// body; when present it is carried in the variant and preferred by
/// [`TransportError::message`].
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("network failure: {0}")]
    NetworkFailure(String),

    #[error("request rejected ({code}): {detail:?}")]
    ClientStatus { code: u16, detail: Option<String> },

    #[error("server error ({code}): {detail:?}")]
    ServerStatus { code: u16, detail: Option<String> },

    #[error("could not decode response: {0}")]
    DecodeFailure(String),
}

impl TransportError {
    /// Human-readable message: the server-supplied `detail` when present,
    /// otherwise a generic fallback.
    pub fn message(&self) -> String {
        match self {
            Self::ClientStatus { detail: Some(d), .. } | Self::ServerStatus { detail: Some(d), .. } => {
                d.clone()
            }
            Self::ClientStatus { code, .. } | Self::ServerStatus { code, .. } => {
                format!("request failed with status {code}")
            }
            Self::NetworkFailure(_) => "network request failed".to_string(),
            Self::DecodeFailure(_) => "could not decode server response".to_string(),
        }
    }

    /// HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ClientStatus { code, .. } | Self::ServerStatus { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Whether this error is the server saying the resource does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ClientStatus { code: 404, .. })
    }
}

/// Local input validation failures, checked before any network round trip.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("pipeline name must not be empty")]
    EmptyName,
}

/// Rejections by the workflow state machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("a submission is already in progress")]
    AlreadyInProgress,
}

/// Failures of a single scan submission.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("upload failed: {0}")]
    Upload(#[from] TransportError),

    #[error("could not decode recognition result: {0}")]
    Decode(String),

    #[error(transparent)]
    Rejected(#[from] WorkflowError),
}

impl ScanError {
    /// Human-readable message for the failure notice.
    pub fn message(&self) -> String {
        match self {
            Self::Upload(e) => e.message(),
            Self::Decode(_) => "could not decode recognition result".to_string(),
            Self::Rejected(e) => e.to_string(),
        }
    }
}
