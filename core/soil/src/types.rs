// agrisense/core/soil/src/types.rs

use serde::{Deserialize, Serialize};

/// Topsoil properties. Texture fractions in percent, pH in pH units.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SoilProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clay: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sand: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub silt: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phh2o: Option<f64>,
}

impl SoilProperties {
    pub fn is_empty(&self) -> bool {
        self.clay.is_none() && self.sand.is_none() && self.silt.is_none() && self.phh2o.is_none()
    }

    /// Set a property by its SoilGrids layer name. Unknown names are ignored.
    pub fn set(&mut self, name: &str, value: f64) {
        match name {
            "clay" => self.clay = Some(value),
            "sand" => self.sand = Some(value),
            "silt" => self.silt = Some(value),
            "phh2o" => self.phh2o = Some(value),
            _ => {}
        }
    }

    /// Fill in every property present in `other`
    pub fn merge(&mut self, other: &SoilProperties) {
        self.clay = other.clay.or(self.clay);
        self.sand = other.sand.or(self.sand);
        self.silt = other.silt.or(self.silt);
        self.phh2o = other.phh2o.or(self.phh2o);
    }

    /// Rescale clay, sand and silt so they sum to 100
    pub fn normalize_texture(&mut self) {
        if let (Some(clay), Some(sand), Some(silt)) = (self.clay, self.sand, self.silt) {
            let total = clay + sand + silt;
            if total > 0.0 {
                self.clay = Some(clay * 100.0 / total);
                self.sand = Some(sand * 100.0 / total);
                self.silt = Some(silt * 100.0 / total);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportLocation {
    pub latitude: f64,
    pub longitude: f64,
    /// RFC 3339 time the report was computed
    pub timestamp: String,
}

/// Soil estimate for a point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoilReport {
    pub location: ReportLocation,
    pub soil_properties: SoilProperties,
    pub soil_type: String,
    pub confidence: f64,
    pub sources: Vec<String>,
    pub success: bool,
}

impl SoilReport {
    /// The report returned when nothing could be determined
    pub fn fallback(latitude: f64, longitude: f64) -> Self {
        Self {
            location: ReportLocation {
                latitude,
                longitude,
                timestamp: chrono::Utc::now().to_rfc3339(),
            },
            soil_properties: SoilProperties::default(),
            soil_type: "Loamy".to_string(),
            confidence: 0.25,
            sources: Vec::new(),
            success: false,
        }
    }

    pub(crate) fn add_source(&mut self, source: &str) {
        if !self.sources.iter().any(|s| s == source) {
            self.sources.push(source.to_string());
        }
    }
}

/// Reverse-geocoded place description
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationInfo {
    pub city: String,
    pub locality: String,
    pub region: String,
    pub country: String,
    pub formatted_address: Vec<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_texture() {
        let mut props = SoilProperties {
            clay: Some(20.0),
            sand: Some(20.0),
            silt: Some(10.0),
            phh2o: Some(7.0),
        };
        props.normalize_texture();
        assert_eq!(props.clay, Some(40.0));
        assert_eq!(props.sand, Some(40.0));
        assert_eq!(props.silt, Some(20.0));
        assert_eq!(props.phh2o, Some(7.0));
    }

    #[test]
    fn test_normalize_needs_all_three() {
        let mut props = SoilProperties {
            clay: Some(20.0),
            ..Default::default()
        };
        props.normalize_texture();
        assert_eq!(props.clay, Some(20.0));
    }

    #[test]
    fn test_empty_properties_serialize_to_empty_object() {
        let json = serde_json::to_string(&SoilProperties::default()).unwrap();
        assert_eq!(json, "{}");
    }
}
