//! INI file configuration adapter.

use crate::domain::error::AdvisorError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, AdvisorError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config
            .load(path)
            .map_err(|reason| AdvisorError::ConfigParse {
                file: path.display().to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, AdvisorError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| AdvisorError::ConfigParse {
                file: "<string>".to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.trim().to_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.config
            .get(section, key)
            .as_deref()
            .and_then(Self::parse_bool)
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"
[portfolio]
annualization_factor = 12
benchmark = SPY
policy = heuristic

[universe]
moderate = VTI, VEA, VWO, BND, VNQ

[profile.alice]
age = 45
risk_tolerance = moderate
capital = 250000.50
esg_preference = yes
"#;

    #[test]
    fn from_string_reads_sections() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(
            adapter.get_string("portfolio", "benchmark"),
            Some("SPY".to_string())
        );
        assert_eq!(
            adapter.get_string("profile.alice", "risk_tolerance"),
            Some("moderate".to_string())
        );
    }

    #[test]
    fn get_string_missing() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(adapter.get_string("portfolio", "missing"), None);
        assert_eq!(adapter.get_string("profile.bob", "age"), None);
    }

    #[test]
    fn numbers_come_back_verbatim() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(adapter.get_string("profile.alice", "age").as_deref(), Some("45"));
        assert_eq!(
            adapter.get_string("profile.alice", "capital").as_deref(),
            Some("250000.50")
        );
        assert_eq!(
            adapter.get_string("portfolio", "annualization_factor").as_deref(),
            Some("12")
        );
    }

    #[test]
    fn get_bool_variants() {
        let adapter = FileConfigAdapter::from_string(
            "[flags]\na = true\nb = Yes\nc = 0\nd = maybe\n",
        )
        .unwrap();
        assert!(adapter.get_bool("flags", "a", false));
        assert!(adapter.get_bool("flags", "b", false));
        assert!(!adapter.get_bool("flags", "c", true));
        assert!(adapter.get_bool("flags", "d", true));
        assert!(!adapter.get_bool("flags", "missing", false));
    }

    #[test]
    fn get_list_splits_commas() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(
            adapter.get_list("universe", "moderate").unwrap(),
            vec!["VTI", "VEA", "VWO", "BND", "VNQ"]
        );
        assert_eq!(adapter.get_list("universe", "aggressive"), None);
    }

    #[test]
    fn from_file_reads_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "[data]\nprice_dir = /tmp/prices\n").unwrap();
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("data", "price_dir"),
            Some("/tmp/prices".to_string())
        );
    }

    #[test]
    fn from_file_missing_is_config_parse_error() {
        let err = FileConfigAdapter::from_file("/nonexistent/advisor.ini").err().unwrap();
        assert!(matches!(err, AdvisorError::ConfigParse { ref file, .. } if file == "/nonexistent/advisor.ini"));
    }
}
