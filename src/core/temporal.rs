use std::time::{SystemTime, UNIX_EPOCH};

use super::error::ParseError;

/// Seconds since the unix epoch.
pub fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

/// Check a validity window against `now`. Both bounds are inclusive, and expiry is checked first.
pub fn check_validity(
    issued_at: Option<i64>,
    expire_at: Option<i64>,
    now: i64,
) -> Result<(), ParseError> {
    if let Some(expected) = expire_at.filter(|exp| *exp < now) {
        return Err(ParseError::AfterExpiry {
            expected,
            current: now,
        });
    }
    if let Some(expected) = issued_at.filter(|iat| now < *iat) {
        return Err(ParseError::BeforeIssuance {
            expected,
            current: now,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_after_expiry() {
        assert!(matches!(
            check_validity(None, Some(999), 1000),
            Err(ParseError::AfterExpiry {
                expected: 999,
                current: 1000
            })
        ));
    }

    #[test]
    fn rejects_before_issuance() {
        assert!(matches!(
            check_validity(Some(1001), None, 1000),
            Err(ParseError::BeforeIssuance {
                expected: 1001,
                current: 1000
            })
        ));
    }

    #[test]
    fn bounds_are_inclusive() {
        check_validity(Some(1000), Some(1000), 1000).unwrap();
        check_validity(None, None, 1000).unwrap();
    }

    #[test]
    fn expiry_wins_over_issuance() {
        assert!(matches!(
            check_validity(Some(2000), Some(500), 1000),
            Err(ParseError::AfterExpiry { .. })
        ));
    }
}
