/***************************************/
/*        3rd party libraries          */
/***************************************/
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/***************************************/
/*               Errors                */
/***************************************/
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse configuration file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {detail}")]
    Invalid { detail: String },
}

/***************************************/
/*       Public data structures        */
/***************************************/
#[derive(Deserialize, Debug, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub elevator: ElevatorConfig,
    #[serde(default)]
    pub arrivals: ArrivalConfig,
}

/// Building, car and dispatch timing. All times are in milliseconds.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ElevatorConfig {
    pub n_floors: u32,
    pub capacity: usize,
    pub start_floor: u32,
    pub floor_travel_time: u64,
    pub dwell_time: u64,
    pub idle_poll_interval: u64,
    pub walk_time: u64,
}

impl Default for ElevatorConfig {
    fn default() -> ElevatorConfig {
        ElevatorConfig {
            n_floors: 7,
            capacity: 4,
            start_floor: 1,
            floor_travel_time: 1000,
            dwell_time: 800,
            idle_poll_interval: 1000,
            walk_time: 0,
        }
    }
}

impl ElevatorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n_floors < 2 {
            return Err(ConfigError::Invalid {
                detail: format!("n_floors must be at least 2, got {}", self.n_floors),
            });
        }
        if self.capacity == 0 {
            return Err(ConfigError::Invalid {
                detail: "capacity must be at least 1".to_string(),
            });
        }
        if self.start_floor < 1 || self.start_floor > self.n_floors {
            return Err(ConfigError::Invalid {
                detail: format!(
                    "start_floor {} is outside 1..={}",
                    self.start_floor, self.n_floors
                ),
            });
        }
        Ok(())
    }

    pub fn floor_travel_time(&self) -> Duration {
        Duration::from_millis(self.floor_travel_time)
    }

    pub fn dwell_time(&self) -> Duration {
        Duration::from_millis(self.dwell_time)
    }

    pub fn idle_poll_interval(&self) -> Duration {
        Duration::from_millis(self.idle_poll_interval)
    }

    pub fn walk_time(&self) -> Duration {
        Duration::from_millis(self.walk_time)
    }
}

/// Arrival generator settings. Arrivals on a floor whose queue already
/// holds `max_queue_len` people are deferred to the next interval.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ArrivalConfig {
    pub min_interval: u64,
    pub max_interval: u64,
    pub max_queue_len: usize,
    pub seed: Option<u64>,
}

impl Default for ArrivalConfig {
    fn default() -> ArrivalConfig {
        ArrivalConfig {
            min_interval: 4000,
            max_interval: 10000,
            max_queue_len: 10,
            seed: None,
        }
    }
}

impl ArrivalConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_interval > self.max_interval {
            return Err(ConfigError::Invalid {
                detail: format!(
                    "min_interval ({}) is larger than max_interval ({})",
                    self.min_interval, self.max_interval
                ),
            });
        }
        if self.max_interval == 0 {
            return Err(ConfigError::Invalid {
                detail: "max_interval must be at least 1 ms".to_string(),
            });
        }
        Ok(())
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.elevator.validate()?;
        self.arrivals.validate()
    }
}

/***************************************/
/*             Public API              */
/***************************************/
pub fn parse_config(config_str: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(config_str)?;
    config.validate()?;
    Ok(config)
}

pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let config_str = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&config_str)
}

/***************************************/
/*             Unit tests              */
/***************************************/
#[cfg(test)]
mod config_tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        // Arrange
        let input = r#"
            [elevator]
            n_floors = 5
            capacity = 2
            start_floor = 3
            floor_travel_time = 10
            dwell_time = 5
            idle_poll_interval = 20
            walk_time = 1

            [arrivals]
            min_interval = 100
            max_interval = 200
            max_queue_len = 3
            seed = 7
        "#;

        // Act
        let config = parse_config(input).unwrap();

        // Assert
        assert_eq!(config.elevator.n_floors, 5);
        assert_eq!(config.elevator.capacity, 2);
        assert_eq!(config.elevator.start_floor, 3);
        assert_eq!(config.elevator.dwell_time(), Duration::from_millis(5));
        assert_eq!(config.arrivals.max_queue_len, 3);
        assert_eq!(config.arrivals.seed, Some(7));
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = parse_config("").unwrap();

        assert_eq!(config.elevator.n_floors, 7);
        assert_eq!(config.elevator.capacity, 4);
        assert_eq!(config.elevator.floor_travel_time, 1000);
        assert_eq!(config.arrivals.min_interval, 4000);
        assert_eq!(config.arrivals.max_interval, 10000);
    }

    #[test]
    fn test_rejects_invalid_values() {
        let single_floor = "[elevator]\nn_floors = 1\n";
        let no_capacity = "[elevator]\ncapacity = 0\n";
        let bad_start = "[elevator]\nn_floors = 3\nstart_floor = 4\n";
        let bad_interval = "[arrivals]\nmin_interval = 10\nmax_interval = 5\n";
        let zero_interval = "[arrivals]\nmin_interval = 0\nmax_interval = 0\n";

        for input in [single_floor, no_capacity, bad_start, bad_interval, zero_interval] {
            match parse_config(input) {
                Err(ConfigError::Invalid { .. }) => {}
                other => panic!("expected invalid config for {:?}, got {:?}", input, other),
            }
        }
    }

    #[test]
    fn test_parse_error_is_reported() {
        assert!(matches!(
            parse_config("[elevator]\nn_floors = \"many\"\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = load_config(Path::new("does/not/exist.toml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
