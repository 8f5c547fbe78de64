use std::time::Duration;

/// Timing limits applied to a single election attempt.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct ElectionLimits {
    /// Deadline the transport enforces on every vote request.
    pub vote_request_timeout: Duration,
}

impl Default for ElectionLimits {
    fn default() -> Self {
        ElectionLimits {
            vote_request_timeout: Duration::from_millis(1000),
        }
    }
}
