// agrisense/core/soil/src/error.rs

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SoilError {
    #[error("latitude {0} is outside [-90, 90]")]
    InvalidLatitude(f64),

    #[error("longitude {0} is outside [-180, 180]")]
    InvalidLongitude(f64),
}

/// Reject coordinates that cannot exist
pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), SoilError> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(SoilError::InvalidLatitude(latitude));
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(SoilError::InvalidLongitude(longitude));
    }
    Ok(())
}
