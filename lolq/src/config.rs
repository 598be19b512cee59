use gateway::config::Config as GatewayConfig;
use serde::Deserialize;
use std::fs::File;
use std::path::Path;

#[derive(Deserialize)]
pub struct MetricsConfig {
    pub statsd_host: String,
    pub statsd_port: u16,
}

#[derive(Deserialize)]
pub struct CommonConfig {
    pub metrics: Option<MetricsConfig>,
}

#[derive(Deserialize)]
pub struct Config {
    #[serde(flatten)]
    pub common: CommonConfig,
    pub gateway: GatewayConfig,
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let config: Config = serde_yaml::from_reader(file)?;
        config.gateway.validate()?;

        Ok(config)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("could not load config from file: {0}")]
    LoadError(#[from] std::io::Error),
    #[error("could not parse config: {0}")]
    ParseError(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(#[from] gateway::config::ValidationError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_tmp_file(s: &str) -> tempfile::NamedTempFile {
        let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
        write!(tmp, "{}", s).expect("write yaml");

        tmp
    }

    #[test]
    fn gateway_config_with_metrics() {
        let yaml = r#"
            metrics:
                statsd_host: 127.0.0.1
                statsd_port: 8125
            gateway:
                listener:
                    host: 0.0.0.0
                    port: 8300
                upstream:
                    api_key: RGAPI-test
                database:
                    url: postgres://lolq@localhost/lolq
                redis:
                    url: redis://localhost:6379
                champion_data:
                    dir: /var/lib/lolq/championdata
            "#;
        let tmp = write_tmp_file(yaml);
        let config = Config::from_file(tmp.path()).expect("load config");
        let metrics = config.common.metrics.expect("metrics config");
        assert_eq!(metrics.statsd_host, "127.0.0.1");
        assert_eq!(metrics.statsd_port, 8125);
        assert_eq!(config.gateway.listener.port, 8300);
    }

    #[test]
    fn metrics_section_is_optional() {
        let yaml = r#"
            gateway:
                upstream:
                    api_key: RGAPI-test
                database:
                    url: postgres://lolq@localhost/lolq
                redis:
                    url: redis://localhost:6379
                champion_data:
                    dir: /var/lib/lolq/championdata
            "#;
        let tmp = write_tmp_file(yaml);
        let config = Config::from_file(tmp.path()).expect("load config");
        assert!(config.common.metrics.is_none());
    }

    #[test]
    fn invalid_gateway_config_is_rejected() {
        let yaml = r#"
            gateway:
                upstream:
                    api_key: ""
                database:
                    url: postgres://lolq@localhost/lolq
                redis:
                    url: redis://localhost:6379
                champion_data:
                    dir: /var/lib/lolq/championdata
            "#;
        let tmp = write_tmp_file(yaml);
        assert!(matches!(
            Config::from_file(tmp.path()),
            Err(ConfigError::Invalid(_))
        ));
    }
}
