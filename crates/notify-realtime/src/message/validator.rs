//! Inbound frame validation.

use notify_core::error::AppError;

/// Reject empty or oversized frames before parsing.
pub fn validate_inbound(raw: &str, max_bytes: usize) -> Result<(), AppError> {
    if raw.len() > max_bytes {
        return Err(AppError::validation(format!(
            "Message exceeds maximum size of {max_bytes} bytes"
        )));
    }

    if raw.trim().is_empty() {
        return Err(AppError::validation("Empty message"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_and_oversized() {
        assert!(validate_inbound("   ", 10).is_err());
        assert!(validate_inbound("0123456789a", 10).is_err());
        assert!(validate_inbound("{}", 10).is_ok());
    }
}
