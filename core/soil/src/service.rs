// agrisense/core/soil/src/service.rs

use crate::classify::{self, ALKALINE_PH};
use crate::config::SoilConfig;
use crate::error::{validate_coordinates, SoilError};
use crate::metrics;
use crate::types::{LocationInfo, SoilProperties, SoilReport};
use async_trait::async_trait;
use dashmap::DashMap;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

/// SoilGrids layers requested for every point
const PROPERTIES: [&str; 4] = ["clay", "sand", "silt", "phh2o"];

/// Timeout for the salinity, Bhuvan and geocoding services
const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

/// Bhuvan feature attributes that may carry the soil label
const BHUVAN_LABEL_KEYS: [&str; 5] = ["SOILTYPE", "soil_type", "SOIL", "class", "TYPE"];

/// Soil and place lookups by coordinate
#[async_trait]
pub trait SoilLookup: Send + Sync {
    async fn soil_report(&self, latitude: f64, longitude: f64) -> Result<SoilReport, SoilError>;

    async fn location_info(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<LocationInfo, SoilError>;
}

#[derive(Debug, Deserialize)]
struct SoilGridsResponse {
    properties: SoilGridsLayers,
}

#[derive(Debug, Deserialize)]
struct SoilGridsLayers {
    #[serde(default)]
    layers: Vec<SoilGridsLayer>,
}

#[derive(Debug, Deserialize)]
struct SoilGridsLayer {
    name: String,
    #[serde(default)]
    unit_measure: Option<UnitMeasure>,
    #[serde(default)]
    depths: Vec<SoilGridsDepth>,
}

#[derive(Debug, Deserialize)]
struct UnitMeasure {
    d_factor: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct SoilGridsDepth {
    values: SoilGridsValues,
}

#[derive(Debug, Deserialize)]
struct SoilGridsValues {
    mean: Option<f64>,
}

impl SoilGridsResponse {
    /// Surface values converted from mapped units (value / d_factor)
    fn into_properties(self) -> SoilProperties {
        let mut props = SoilProperties::default();
        for layer in self.properties.layers {
            let Some(mean) = layer.depths.first().and_then(|d| d.values.mean) else {
                continue;
            };
            let d_factor = layer
                .unit_measure
                .and_then(|u| u.d_factor)
                .filter(|d| *d > 0.0)
                .unwrap_or(10.0);
            props.set(&layer.name, mean / d_factor);
        }
        props
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReverseGeocodeResponse {
    #[serde(default)]
    city: String,
    #[serde(default)]
    locality: String,
    #[serde(default)]
    principal_subdivision: String,
    #[serde(default)]
    country_name: String,
    #[serde(default)]
    locality_info: Option<LocalityInfo>,
}

#[derive(Debug, Deserialize)]
struct LocalityInfo {
    #[serde(default)]
    informative: Vec<Value>,
}

/// First recognised soil category among the features of a GetFeatureInfo response
fn category_from_features(data: &Value) -> Option<&'static str> {
    let features = data.get("features")?.as_array()?;
    for feature in features {
        let Some(props) = feature.get("properties") else {
            continue;
        };
        for key in BHUVAN_LABEL_KEYS {
            let label = match props.get(key) {
                None | Some(Value::Null) => continue,
                Some(Value::String(s)) if s.is_empty() => continue,
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
            };
            if let Some(category) = classify::bhuvan_category(&label) {
                return Some(category);
            }
        }
    }
    None
}

/// Soil lookups backed by SoilGrids, with optional salinity and Bhuvan sources
pub struct SoilDataService {
    config: SoilConfig,
    client: reqwest::Client,
    /// SoilGrids-backed reports keyed by coordinates rounded to 5 decimals
    cache: DashMap<String, SoilReport>,
}

impl SoilDataService {
    pub fn new(config: SoilConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
            cache: DashMap::new(),
        }
    }

    pub fn cached_reports(&self) -> usize {
        self.cache.len()
    }

    /// Soil estimate for a point. Upstream failures degrade, they never error.
    pub async fn get_soil_data_by_location(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<SoilReport, SoilError> {
        validate_coordinates(latitude, longitude)?;

        let key = format!("{:.5},{:.5}", latitude, longitude);
        if let Some(cached) = self.cache.get(&key) {
            info!("Returning cached soil data for {}", key);
            return Ok(cached.clone());
        }

        let report = self.build_report(latitude, longitude).await;
        metrics::soil_lookup(report.sources.last().map(String::as_str).unwrap_or("none"));
        debug!(
            soil_type = %report.soil_type,
            confidence = report.confidence,
            sources = ?report.sources,
            "Soil report computed for {}",
            key
        );

        if report.sources.iter().any(|s| s == "Mock") {
            debug!("Not caching regional defaults for {}", key);
        } else if self.cache.len() >= self.config.cache_capacity {
            debug!("Soil cache full ({} entries), not caching {}", self.cache.len(), key);
        } else {
            self.cache.insert(key, report.clone());
        }
        Ok(report)
    }

    async fn build_report(&self, latitude: f64, longitude: f64) -> SoilReport {
        let mut report = SoilReport::fallback(latitude, longitude);

        let props = match self.fetch_soilgrids(latitude, longitude).await {
            Some(props) => {
                report.add_source("SoilGrids");
                props
            }
            None => {
                report.add_source("Mock");
                classify::mock_properties(latitude, longitude)
            }
        };
        report.soil_properties.merge(&props);

        if let Some((label, confidence, source)) =
            self.salinity(latitude, longitude, &props).await
        {
            report.soil_type = label.to_string();
            report.confidence = confidence;
            report.add_source(source);
            report.success = true;
            return report;
        }

        if classify::in_india(latitude, longitude) {
            if let Some(category) = self.bhuvan_category(latitude, longitude).await {
                report.soil_type = category.to_string();
                report.confidence = 0.85;
                report.add_source("Bhuvan");
                report.success = true;
                return report;
            }
        }

        let (family, confidence) = classify::texture_family(Some(&props));
        report.soil_type = family.to_string();
        report.confidence = confidence;
        report.success = !props.is_empty();
        report
    }

    fn soilgrids_query(
        &self,
        latitude: f64,
        longitude: f64,
        properties: &[&str],
    ) -> Vec<(&'static str, String)> {
        let mut query = vec![("lon", longitude.to_string()), ("lat", latitude.to_string())];
        query.extend(properties.iter().map(|p| ("property", p.to_string())));
        query.push(("depth", "0-5cm".to_string()));
        query.push(("value", "mean".to_string()));
        query
    }

    async fn fetch_soilgrids(&self, latitude: f64, longitude: f64) -> Option<SoilProperties> {
        let response = match self
            .client
            .get(&self.config.soilgrids_url)
            .query(&self.soilgrids_query(latitude, longitude, &PROPERTIES))
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("SoilGrids request failed: {}", e);
                return None;
            }
        };

        if !response.status().is_success() {
            warn!(
                "Batch SoilGrids request failed with {}, trying individual properties",
                response.status()
            );
            return self.fetch_soilgrids_individually(latitude, longitude).await;
        }

        let mut props = match response.json::<SoilGridsResponse>().await {
            Ok(body) => body.into_properties(),
            Err(e) => {
                warn!("SoilGrids returned an unreadable body: {}", e);
                return None;
            }
        };
        props.normalize_texture();
        (!props.is_empty()).then_some(props)
    }

    async fn fetch_soilgrids_individually(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Option<SoilProperties> {
        let mut props = SoilProperties::default();

        for property in PROPERTIES {
            let result = self
                .client
                .get(&self.config.soilgrids_url)
                .query(&self.soilgrids_query(latitude, longitude, &[property]))
                .timeout(Duration::from_secs(self.config.property_timeout_secs))
                .send()
                .await
                .and_then(|r| r.error_for_status());

            let body = match result {
                Ok(response) => response.json::<SoilGridsResponse>().await,
                Err(e) => {
                    debug!("SoilGrids {} request failed: {}", property, e);
                    continue;
                }
            };
            match body {
                Ok(body) => props.merge(&body.into_properties()),
                Err(e) => debug!("SoilGrids {} body unreadable: {}", property, e),
            }
        }

        props.normalize_texture();
        (!props.is_empty()).then_some(props)
    }

    async fn salinity(
        &self,
        latitude: f64,
        longitude: f64,
        props: &SoilProperties,
    ) -> Option<(&'static str, f64, &'static str)> {
        if let Some(template) = &self.config.gsas_point_url {
            let url = template
                .replace("{lat}", &latitude.to_string())
                .replace("{lon}", &longitude.to_string());
            match self.fetch_gsas_class(&url).await {
                Ok(Some(label)) => return Some((label, 0.9, "GSAS")),
                Ok(None) => {}
                Err(e) => warn!("GSAS lookup failed: {}", e),
            }
        }

        match props.phh2o {
            Some(ph) if ph >= ALKALINE_PH => Some(("Alkaline", 0.65, "Heuristic(pH)")),
            _ => None,
        }
    }

    async fn fetch_gsas_class(&self, url: &str) -> Result<Option<&'static str>, reqwest::Error> {
        let body: Value = self
            .client
            .get(url)
            .timeout(UPSTREAM_TIMEOUT)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let class = match body.get("class") {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        };
        Ok(classify::salinity_class(&class))
    }

    async fn bhuvan_category(&self, latitude: f64, longitude: f64) -> Option<&'static str> {
        let layer = self.config.bhuvan_layer.as_deref()?;
        if self.config.bhuvan_wms_url.is_empty() {
            return None;
        }

        match self.fetch_bhuvan(layer, latitude, longitude).await {
            Ok(category) => category,
            Err(e) => {
                warn!("Bhuvan GetFeatureInfo failed: {}", e);
                None
            }
        }
    }

    async fn fetch_bhuvan(
        &self,
        layer: &str,
        latitude: f64,
        longitude: f64,
    ) -> Result<Option<&'static str>, reqwest::Error> {
        let delta = 0.0005;
        let bbox = format!(
            "{},{},{},{}",
            longitude - delta,
            latitude - delta,
            longitude + delta,
            latitude + delta
        );
        let params = [
            ("SERVICE", "WMS"),
            ("VERSION", "1.3.0"),
            ("REQUEST", "GetFeatureInfo"),
            ("LAYERS", layer),
            ("QUERY_LAYERS", layer),
            ("CRS", "EPSG:4326"),
            ("INFO_FORMAT", "application/json"),
            ("I", "1"),
            ("J", "1"),
            ("WIDTH", "3"),
            ("HEIGHT", "3"),
            ("BBOX", bbox.as_str()),
        ];

        let data: Value = self
            .client
            .get(&self.config.bhuvan_wms_url)
            .query(&params)
            .timeout(UPSTREAM_TIMEOUT)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(category_from_features(&data))
    }

    /// Reverse geocode a point. Upstream failures yield empty fields.
    pub async fn get_location_info(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<LocationInfo, SoilError> {
        validate_coordinates(latitude, longitude)?;

        match self.fetch_location(latitude, longitude).await {
            Ok(info) => Ok(info),
            Err(e) => {
                warn!("reverse-geocode failed for {},{}: {}", latitude, longitude, e);
                Ok(LocationInfo::default())
            }
        }
    }

    async fn fetch_location(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<LocationInfo, reqwest::Error> {
        let body: ReverseGeocodeResponse = self
            .client
            .get(&self.config.reverse_geocode_url)
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("localityLanguage", "en".to_string()),
            ])
            .timeout(UPSTREAM_TIMEOUT)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(LocationInfo {
            city: body.city,
            locality: body.locality,
            region: body.principal_subdivision,
            country: body.country_name,
            formatted_address: body.locality_info.map(|l| l.informative).unwrap_or_default(),
        })
    }
}

#[async_trait]
impl SoilLookup for SoilDataService {
    async fn soil_report(&self, latitude: f64, longitude: f64) -> Result<SoilReport, SoilError> {
        self.get_soil_data_by_location(latitude, longitude).await
    }

    async fn location_info(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<LocationInfo, SoilError> {
        self.get_location_info(latitude, longitude).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_soilgrids_units_converted() {
        let body: SoilGridsResponse = serde_json::from_value(json!({
            "type": "Feature",
            "properties": {
                "layers": [
                    {"name": "clay", "unit_measure": {"d_factor": 10},
                     "depths": [{"label": "0-5cm", "values": {"mean": 312}}]},
                    {"name": "phh2o", "unit_measure": {"d_factor": 10},
                     "depths": [{"label": "0-5cm", "values": {"mean": 72}}]},
                    {"name": "silt", "depths": [{"label": "0-5cm", "values": {"mean": null}}]},
                    {"name": "cec", "depths": [{"label": "0-5cm", "values": {"mean": 150}}]}
                ]
            }
        }))
        .unwrap();

        let props = body.into_properties();
        assert_eq!(props.clay, Some(31.2));
        assert_eq!(props.phh2o, Some(7.2));
        assert_eq!(props.silt, None);
        assert_eq!(props.sand, None);
    }

    #[test]
    fn test_category_from_features_scans_keys() {
        let data = json!({
            "features": [
                {"properties": {"SOILTYPE": "", "class": "alluvial"}},
                {"properties": {"TYPE": "Deep black soils"}}
            ]
        });
        assert_eq!(category_from_features(&data), Some("Black"));
        assert_eq!(category_from_features(&json!({"features": []})), None);
        assert_eq!(category_from_features(&json!({})), None);
    }
}
