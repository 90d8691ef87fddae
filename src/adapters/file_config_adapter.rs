//! INI file configuration adapter.

use crate::domain::error::QuantsignalError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, QuantsignalError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config
            .load(path)
            .map_err(|reason| QuantsignalError::ConfigParse {
                file: path.display().to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, QuantsignalError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| QuantsignalError::ConfigParse {
                file: "<inline>".into(),
                reason,
            })?;
        Ok(Self { config })
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.trim().to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key).filter(|v| !v.trim().is_empty())
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.config
            .getint(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.config
            .getfloat(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.config
            .get(section, key)
            .as_ref()
            .and_then(|v| Self::parse_bool(v))
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"
[data]
source = yahoo
period = 1y
interval = 1d
symbols = BTC-USD, NVDA ,, ^GSPC

[indicators]
rsi_period = 14
bb_stddev_mult = 2.5

[strategy]
name = Confirmation
rule = confirmation
initial_capital = 25000.0

[telegram]
token = 123:abc
chat_id = -100
enabled = yes
"#;

    #[test]
    fn from_string_parses_sections() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(adapter.get_string("data", "source"), Some("yahoo".to_string()));
        assert_eq!(adapter.get_string("strategy", "name"), Some("Confirmation".to_string()));
        assert_eq!(adapter.get_string("telegram", "token"), Some("123:abc".to_string()));
    }

    #[test]
    fn get_string_missing_or_blank_is_none() {
        let adapter = FileConfigAdapter::from_string("[telegram]\ntoken =\n").unwrap();
        assert_eq!(adapter.get_string("telegram", "token"), None);
        assert_eq!(adapter.get_string("telegram", "chat_id"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
    }

    #[test]
    fn get_int_value_and_defaults() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(adapter.get_int("indicators", "rsi_period", 0), 14);
        assert_eq!(adapter.get_int("indicators", "sma_fast", 20), 20);
        assert_eq!(adapter.get_int("data", "source", 7), 7);
    }

    #[test]
    fn get_double_value_and_defaults() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(adapter.get_double("strategy", "initial_capital", 0.0), 25000.0);
        assert_eq!(adapter.get_double("indicators", "bb_stddev_mult", 2.0), 2.5);
        assert_eq!(adapter.get_double("strategy", "missing", 99.9), 99.9);
        assert_eq!(adapter.get_double("strategy", "name", 99.9), 99.9);
    }

    #[test]
    fn get_bool_values() {
        let adapter =
            FileConfigAdapter::from_string("[telegram]\na = true\nb = on\nc = 0\nd = maybe\n").unwrap();
        assert!(adapter.get_bool("telegram", "a", false));
        assert!(adapter.get_bool("telegram", "b", false));
        assert!(!adapter.get_bool("telegram", "c", true));
        assert!(adapter.get_bool("telegram", "d", true));
        assert!(!adapter.get_bool("telegram", "missing", false));
    }

    #[test]
    fn get_list_splits_and_trims() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(adapter.get_list("data", "symbols"), vec!["BTC-USD", "NVDA", "^GSPC"]);
        assert!(adapter.get_list("data", "missing").is_empty());
    }

    #[test]
    fn from_file_reads_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "[data]\ndata_dir = /srv/prices\n").unwrap();
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(adapter.get_string("data", "data_dir"), Some("/srv/prices".to_string()));
    }

    #[test]
    fn from_file_missing_is_config_parse_error() {
        let result = FileConfigAdapter::from_file("/nonexistent/path/config.ini");
        assert!(matches!(result, Err(QuantsignalError::ConfigParse { .. })));
    }
}
