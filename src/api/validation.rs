use super::ApiError;

pub fn validate_id(id: i32) -> Result<i32, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid ID: {}. ID must be a positive integer",
            id
        )));
    }
    Ok(id)
}

pub fn validate_limit(limit: u64) -> Result<u64, ApiError> {
    const MAX_LIMIT: u64 = 500;
    const MIN_LIMIT: u64 = 1;

    if !(MIN_LIMIT..=MAX_LIMIT).contains(&limit) {
        return Err(ApiError::validation(format!(
            "Invalid limit: {}. Limit must be between {} and {}",
            limit, MIN_LIMIT, MAX_LIMIT
        )));
    }
    Ok(limit)
}

pub fn validate_district(district: &str) -> Result<&str, ApiError> {
    let trimmed = district.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("District cannot be empty"));
    }

    if trimmed.len() > 64 {
        return Err(ApiError::validation("District must be 64 characters or less"));
    }

    Ok(trimmed)
}

pub fn validate_coordinate(latitude: f64, longitude: f64) -> Result<(), ApiError> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(ApiError::validation(format!(
            "Latitude {} is out of range",
            latitude
        )));
    }

    if !(-180.0..=180.0).contains(&longitude) {
        return Err(ApiError::validation(format!(
            "Longitude {} is out of range",
            longitude
        )));
    }

    Ok(())
}

pub fn validate_kcal_factor(factor: Option<f64>) -> Result<(), ApiError> {
    if let Some(value) = factor
        && (value < 0.0 || !value.is_finite())
    {
        return Err(ApiError::validation(
            "Kcal factor must be a non-negative number",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_id() {
        assert!(validate_id(1).is_ok());
        assert!(validate_id(12345).is_ok());
        assert!(validate_id(0).is_err());
        assert!(validate_id(-1).is_err());
    }

    #[test]
    fn test_validate_limit() {
        assert!(validate_limit(1).is_ok());
        assert!(validate_limit(500).is_ok());
        assert!(validate_limit(0).is_err());
        assert!(validate_limit(501).is_err());
    }

    #[test]
    fn test_validate_district() {
        assert!(validate_district("Innlandet").is_ok());
        assert!(validate_district("  Troms  ").is_ok());
        assert!(validate_district("").is_err());
        assert!(validate_district(&"x".repeat(65)).is_err());
    }

    #[test]
    fn test_validate_coordinate() {
        assert!(validate_coordinate(59.91, 10.75).is_ok());
        assert!(validate_coordinate(91.0, 0.0).is_err());
        assert!(validate_coordinate(0.0, 181.0).is_err());
    }

    #[test]
    fn test_validate_kcal_factor() {
        assert!(validate_kcal_factor(None).is_ok());
        assert!(validate_kcal_factor(Some(350.0)).is_ok());
        assert!(validate_kcal_factor(Some(-1.0)).is_err());
        assert!(validate_kcal_factor(Some(f64::NAN)).is_err());
    }
}
