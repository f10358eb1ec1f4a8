use crate::irail::IrailError;

/// A refresh cycle failed.
///
/// Carries a human-readable message only; the underlying error is logged
/// where it happens and never handed to subscribers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct UpdateFailed {
    message: String,
}

impl UpdateFailed {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// An upstream call raised.
    pub fn communication(err: IrailError) -> Self {
        Self::new(format!("Error communicating with iRail API: {err}"))
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn communication_message_includes_cause() {
        let err = UpdateFailed::communication(IrailError::RateLimited);
        assert_eq!(
            err.to_string(),
            "Error communicating with iRail API: rate limited by iRail API"
        );
    }
}
