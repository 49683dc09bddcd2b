use super::ApiError;

/// Parses a song id path segment; anything but a positive integer is a 400.
pub fn validate_song_id(raw: &str) -> Result<i32, ApiError> {
    match raw.trim().parse::<i32>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ApiError::validation(format!(
            "Invalid song ID: {}. ID must be a positive integer",
            raw
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_song_id() {
        assert_eq!(validate_song_id("1").unwrap(), 1);
        assert_eq!(validate_song_id("12345").unwrap(), 12345);
        assert!(validate_song_id("0").is_err());
        assert!(validate_song_id("-1").is_err());
        assert!(validate_song_id("abc").is_err());
        assert!(validate_song_id("507f1f77bcf86cd799439011").is_err());
        assert!(validate_song_id("99999999999").is_err());
    }
}
