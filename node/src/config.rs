// agrisense/node/src/config.rs

use agrisense_models::RegistryConfig;
use agrisense_soil::SoilConfig;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Node configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Model artifact locations
    #[serde(default)]
    pub models: ModelsConfig,

    /// Soil and geocoding upstreams
    #[serde(default)]
    pub soil: SoilConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,

    /// Permissive CORS for browser frontends
    #[serde(default = "default_cors")]
    pub cors: bool,
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8000))
}

fn default_cors() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            cors: default_cors(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelsConfig {
    #[serde(default = "default_classifier_path")]
    pub classifier_path: PathBuf,

    #[serde(default = "default_fertilizer_path")]
    pub fertilizer_path: PathBuf,

    /// Training dataset shipped alongside the artifacts. Only its presence is checked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_path: Option<PathBuf>,
}

fn default_classifier_path() -> PathBuf {
    RegistryConfig::default().classifier_path
}

fn default_fertilizer_path() -> PathBuf {
    RegistryConfig::default().fertilizer_path
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            classifier_path: default_classifier_path(),
            fertilizer_path: default_fertilizer_path(),
            dataset_path: None,
        }
    }
}

impl ModelsConfig {
    pub fn registry_config(&self) -> RegistryConfig {
        RegistryConfig {
            classifier_path: self.classifier_path.clone(),
            fertilizer_path: self.fertilizer_path.clone(),
        }
    }
}

impl NodeConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.models.classifier_path.as_os_str().is_empty() {
            return Err("models.classifier_path must not be empty".to_string());
        }
        if self.models.fertilizer_path.as_os_str().is_empty() {
            return Err("models.fertilizer_path must not be empty".to_string());
        }
        self.soil.validate()
    }

    /// Apply the `PORT` override used by container platforms
    pub fn apply_port(&mut self, port: Option<&str>) -> Result<(), String> {
        if let Some(port) = port {
            let port: u16 = port
                .trim()
                .parse()
                .map_err(|_| format!("PORT must be a port number, got '{}'", port))?;
            self.server.listen_addr.set_port(port);
        }
        Ok(())
    }

    /// Load from file
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: NodeConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save to file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config: NodeConfig = toml::from_str("").unwrap();
        assert_eq!(config, NodeConfig::default());
        assert_eq!(config.server.listen_addr.port(), 8000);
        assert!(config.server.cors);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_sections() {
        let config: NodeConfig = toml::from_str(
            r#"
            [server]
            listen_addr = "127.0.0.1:9000"

            [models]
            classifier_path = "/srv/models/crop.json"

            [soil]
            timeout_secs = 3
            bhuvan_layer = "nbss_soil:india_soil_type"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.listen_addr.to_string(), "127.0.0.1:9000");
        assert!(config.server.cors);
        assert_eq!(config.models.classifier_path, PathBuf::from("/srv/models/crop.json"));
        assert_eq!(config.models.fertilizer_path, default_fertilizer_path());
        assert_eq!(config.soil.timeout_secs, 3);
        assert_eq!(config.soil.property_timeout_secs, 5);
        assert_eq!(config.soil.bhuvan_layer.as_deref(), Some("nbss_soil:india_soil_type"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = NodeConfig::default();
        config.models.fertilizer_path = PathBuf::new();
        assert!(config.validate().unwrap_err().contains("fertilizer_path"));

        let mut config = NodeConfig::default();
        config.soil.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_port_override() {
        let mut config = NodeConfig::default();
        config.apply_port(Some("9100")).unwrap();
        assert_eq!(config.server.listen_addr.port(), 9100);
        assert_eq!(config.server.listen_addr.ip().to_string(), "0.0.0.0");

        config.apply_port(None).unwrap();
        assert_eq!(config.server.listen_addr.port(), 9100);

        assert!(config.apply_port(Some("eighty")).is_err());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conf").join("agrisense.toml");

        let mut config = NodeConfig::default();
        config.models.dataset_path = Some(PathBuf::from("artifacts/crop_recommendation.csv"));
        config.soil.gsas_point_url =
            Some("http://gsas.local/point?lat={lat}&lon={lon}".to_string());
        config.save(&path).unwrap();

        let reloaded = NodeConfig::from_file(&path).unwrap();
        assert_eq!(reloaded, config);
    }
}
