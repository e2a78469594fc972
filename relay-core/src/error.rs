use crate::model::FailureKind;

/// Geolocation failures. Codes mirror the browser geolocation API.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location unavailable: {0}")]
    Unavailable(String),
    #[error("Location request timed out after {0} ms")]
    Timeout(u64),
}

impl LocationError {
    pub fn code(&self) -> u8 {
        match self {
            LocationError::PermissionDenied => 1,
            LocationError::Unavailable(_) => 2,
            LocationError::Timeout(_) => 3,
        }
    }
}

/// Weather provider failures.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Request to {provider} failed: {source}")]
    Network {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{provider} request failed with status {status}: {body}")]
    Status {
        provider: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("Failed to parse {provider} response: {message}")]
    Parse {
        provider: &'static str,
        message: String,
    },
}

impl FetchError {
    /// The request URL carries the API key, so it is dropped from the error.
    pub(crate) fn network(provider: &'static str, source: reqwest::Error) -> Self {
        FetchError::Network { provider, source: source.without_url() }
    }

    pub(crate) fn parse(provider: &'static str, message: impl Into<String>) -> Self {
        FetchError::Parse { provider, message: message.into() }
    }
}

/// Anything that prevents a reading from reaching the watch.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error(transparent)]
    Location(#[from] LocationError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl RelayError {
    pub fn kind(&self) -> FailureKind {
        match self {
            RelayError::Location(_) => FailureKind::Location,
            RelayError::Fetch(_) => FailureKind::Fetch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_error_codes() {
        assert_eq!(LocationError::PermissionDenied.code(), 1);
        assert_eq!(LocationError::Unavailable("no fix".into()).code(), 2);
        assert_eq!(LocationError::Timeout(15_000).code(), 3);
        assert_eq!(
            LocationError::Timeout(15_000).to_string(),
            "Location request timed out after 15000 ms"
        );
    }
}
