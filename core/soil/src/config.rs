// agrisense/core/soil/src/config.rs

use serde::{Deserialize, Serialize};

/// Upstream endpoints for soil lookups
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoilConfig {
    /// SoilGrids v2 point query endpoint
    #[serde(default = "default_soilgrids_url")]
    pub soilgrids_url: String,

    /// Timeout for the batch SoilGrids request, in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Timeout for each per-property fallback request, in seconds
    #[serde(default = "default_property_timeout")]
    pub property_timeout_secs: u64,

    /// Salinity point service, with `{lat}` and `{lon}` placeholders
    #[serde(default)]
    pub gsas_point_url: Option<String>,

    /// Bhuvan WMS endpoint used for GetFeatureInfo
    #[serde(default = "default_bhuvan_url")]
    pub bhuvan_wms_url: String,

    /// Bhuvan soil layer; Bhuvan is skipped when unset
    #[serde(default)]
    pub bhuvan_layer: Option<String>,

    #[serde(default = "default_reverse_geocode_url")]
    pub reverse_geocode_url: String,

    /// Maximum number of cached soil reports
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

fn default_soilgrids_url() -> String {
    "https://rest.isric.org/soilgrids/v2.0/properties/query".to_string()
}

fn default_timeout() -> u64 {
    15
}

fn default_property_timeout() -> u64 {
    5
}

fn default_bhuvan_url() -> String {
    "https://bhuvan-vec1.nrsc.gov.in/bhuvan/wms".to_string()
}

fn default_reverse_geocode_url() -> String {
    "https://api.bigdatacloud.net/data/reverse-geocode-client".to_string()
}

fn default_cache_capacity() -> usize {
    10_000
}

impl Default for SoilConfig {
    fn default() -> Self {
        Self {
            soilgrids_url: default_soilgrids_url(),
            timeout_secs: default_timeout(),
            property_timeout_secs: default_property_timeout(),
            gsas_point_url: None,
            bhuvan_wms_url: default_bhuvan_url(),
            bhuvan_layer: None,
            reverse_geocode_url: default_reverse_geocode_url(),
            cache_capacity: default_cache_capacity(),
        }
    }
}

impl SoilConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.timeout_secs == 0 || self.property_timeout_secs == 0 {
            return Err("soil lookup timeouts must be non-zero".to_string());
        }
        if self.soilgrids_url.is_empty() {
            return Err("soilgrids_url must not be empty".to_string());
        }
        Ok(())
    }
}
