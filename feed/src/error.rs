use thiserror::Error;

pub type Result<T, E = FeedError> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedError {
    /// Network or transport failure: offline, DNS, timeout.
    #[error("request failed: {0}")]
    FetchFailed(String),

    /// The server answered with a non-2xx status.
    #[error("request rejected with status {status}{}", detail(.message))]
    RequestRejected {
        status: u16,
        message: Option<String>,
    },

    #[error("unexpected response body: {0}")]
    Decode(String),

    #[error("invalid page window skip={skip} limit={limit}")]
    InvalidRange { skip: u64, limit: u64 },

    #[error("{0}")]
    Invalid(String),

    #[error("configuration error: {0}")]
    Config(String),
}

fn detail(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(": {m}"))
        .unwrap_or_default()
}

/// How important the failing call was to the view that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Criticality {
    /// The page load the view depends on.
    Primary,
    /// An in-place action: react, gift, report, delete.
    Secondary,
}

/// What the caller should do about a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recovery {
    Login { redirect: String },
    NotFound,
    Failure,
    /// Dismissible notice; the control goes back to its pre-action state.
    Inline(String),
}

impl FeedError {
    pub fn status(&self) -> Option<u16> {
        match self {
            FeedError::RequestRejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }

    pub fn recovery(&self, criticality: Criticality, return_path: &str) -> Recovery {
        match (self.status(), criticality) {
            (Some(401 | 403), _) => Recovery::Login {
                redirect: login_redirect(return_path),
            },
            (Some(404), Criticality::Primary) => Recovery::NotFound,
            (_, Criticality::Primary) => Recovery::Failure,
            (_, Criticality::Secondary) => Recovery::Inline(self.notice()),
        }
    }

    /// Short text for an inline notice.
    pub fn notice(&self) -> String {
        match self {
            FeedError::RequestRejected {
                message: Some(message),
                ..
            } if !message.is_empty() => message.clone(),
            FeedError::RequestRejected { status: 404, .. } => "It no longer exists.".to_string(),
            FeedError::RequestRejected { status, .. } if *status >= 500 => {
                "Something went wrong on our side, please try again.".to_string()
            }
            FeedError::FetchFailed(_) => "Network error, please try again.".to_string(),
            other => other.to_string(),
        }
    }
}

/// Login entry point carrying the page to come back to.
pub fn login_redirect(return_path: &str) -> String {
    format!("/login?redirect={}", urlencoding::encode(return_path))
}
