use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use clap::{clap_app, ArgMatches};

use crate::error::{PublishError, PublishResult};
use crate::message::DEFAULT_CLIENT_NAME;
use crate::ramp::{interval_from_secs, RampConfig};
use crate::transport::{SocketOptions, DEFAULT_ENDPOINT};

/// Command line of the `ramp-publisher` binary.
pub fn app<'a, 'b>() -> clap::App<'a, 'b> {
    clap_app!(ramp_publisher =>
        (version: env!("CARGO_PKG_VERSION"))
        (about: "Push a thrust ramp to a ZMQ input socket, then reset thrust to zero")
        (@setting AllowNegativeNumbers)
        (@arg ENDPOINT: "endpoint of the receiving PULL socket [default: tcp://127.0.0.1:1212]")
        (@arg CONFIG: -c --config +takes_value "TOML configuration file")
        (@arg NAME: -n --name +takes_value "client_name sent with every message")
        (@arg START: --start +takes_value "first thrust value [default: 0]")
        (@arg STOP: --stop +takes_value "last thrust value [default: 30]")
        (@arg STEP: --step +takes_value "thrust increment [default: 2]")
        (@arg INTERVAL: -i --interval +takes_value "seconds between messages [default: 1]")
        (@arg UNLOCK: --unlock "send a zero-thrust unlock message before the ramp")
        (@arg LINGER: --linger +takes_value "milliseconds to flush queued messages on close [default: 1000]")
        (@arg SNDHWM: --sndhwm +takes_value "send high-water mark")
        (@arg LEVEL: -l --level +takes_value "log level [default: info]")
    )
}

#[derive(Debug, PartialEq, serde::Deserialize, Clone)]
#[serde(default)]
pub struct SocketConfig {
    /// close linger in milliseconds
    pub linger_ms: u64,
    pub sndhwm: Option<i32>,
}

impl Default for SocketConfig {
    fn default() -> Self {
        Self {
            linger_ms: 1000,
            sndhwm: None,
        }
    }
}

#[derive(Debug, PartialEq, serde::Deserialize, Clone)]
#[serde(default)]
pub struct RampSection {
    pub start: f64,
    pub stop: f64,
    pub step: f64,
    /// seconds between two messages
    pub interval: f64,
    pub unlock: bool,
}

impl Default for RampSection {
    fn default() -> Self {
        Self {
            start: 0.0,
            stop: 30.0,
            step: 2.0,
            interval: 1.0,
            unlock: false,
        }
    }
}

/// publisher application config
#[derive(Debug, PartialEq, serde::Deserialize, Clone)]
#[serde(default)]
pub struct ApplicationConfig {
    /// receiver endpoint "tcp://127.0.0.1:1212"
    pub endpoint: String,
    pub client_name: String,
    /// default log filter when RUST_LOG is unset
    pub log_level: String,
    pub socket: SocketConfig,
    pub ramp: RampSection,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            client_name: DEFAULT_CLIENT_NAME.to_string(),
            log_level: "info".to_string(),
            socket: SocketConfig::default(),
            ramp: RampSection::default(),
        }
    }
}

impl ApplicationConfig {
    pub fn from_toml(toml_data: &str) -> PublishResult<Self> {
        Ok(toml::from_str(toml_data)?)
    }

    pub fn read_file(path: impl AsRef<Path>) -> PublishResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Loads the `--config` file if given, then applies command line overrides.
    pub fn new(matches: &ArgMatches) -> PublishResult<Self> {
        let mut config = match matches.value_of("CONFIG") {
            Some(path) => Self::read_file(path)?,
            None => Self::default(),
        };

        if let Some(endpoint) = matches.value_of("ENDPOINT") {
            config.endpoint = endpoint.to_string();
        }
        if let Some(name) = matches.value_of("NAME") {
            config.client_name = name.to_string();
        }
        if let Some(level) = matches.value_of("LEVEL") {
            config.log_level = level.to_string();
        }
        if let Some(start) = parse_arg(matches, "START")? {
            config.ramp.start = start;
        }
        if let Some(stop) = parse_arg(matches, "STOP")? {
            config.ramp.stop = stop;
        }
        if let Some(step) = parse_arg(matches, "STEP")? {
            config.ramp.step = step;
        }
        if let Some(interval) = parse_arg(matches, "INTERVAL")? {
            config.ramp.interval = interval;
        }
        if matches.is_present("UNLOCK") {
            config.ramp.unlock = true;
        }
        if let Some(linger_ms) = parse_arg(matches, "LINGER")? {
            config.socket.linger_ms = linger_ms;
        }
        if let Some(sndhwm) = parse_arg(matches, "SNDHWM")? {
            config.socket.sndhwm = Some(sndhwm);
        }

        Ok(config)
    }

    pub fn ramp_config(&self) -> PublishResult<RampConfig> {
        let ramp = RampConfig {
            start: self.ramp.start,
            stop: self.ramp.stop,
            step: self.ramp.step,
            interval: interval_from_secs(self.ramp.interval)?,
            unlock: self.ramp.unlock,
        };
        ramp.validate()?;
        Ok(ramp)
    }

    pub fn socket_options(&self) -> SocketOptions {
        SocketOptions {
            linger: Duration::from_millis(self.socket.linger_ms),
            sndhwm: self.socket.sndhwm,
        }
    }
}

fn parse_arg<T: FromStr>(matches: &ArgMatches, name: &str) -> PublishResult<Option<T>> {
    match matches.value_of(name) {
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| PublishError::Config(format!("{} has an invalid value: {}", name, value))),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn parse_args(args: &[&str]) -> ArgMatches<'static> {
        let mut argv = vec!["ramp-publisher"];
        argv.extend_from_slice(args);
        app().get_matches_from_safe(argv).unwrap()
    }

    #[test]
    fn test_defaults_without_arguments() {
        let config = ApplicationConfig::new(&parse_args(&[])).unwrap();
        assert_eq!(config, ApplicationConfig::default());
        assert_eq!(config.endpoint, "tcp://127.0.0.1:1212");
        assert_eq!(config.ramp_config().unwrap(), RampConfig::default());
        assert_eq!(config.socket_options(), SocketOptions::default());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ApplicationConfig::from_toml(
            r#"
            client_name = "bench rig"

            [ramp]
            stop = 45.0
            step = 0.5
            "#,
        )
        .unwrap();

        assert_eq!(config.client_name, "bench rig");
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.ramp.start, 0.0);
        assert_eq!(config.ramp.stop, 45.0);
        assert_eq!(config.ramp.step, 0.5);
        assert_eq!(config.ramp.interval, 1.0);
        assert_eq!(config.socket.linger_ms, 1000);
    }

    #[test]
    fn test_command_line_overrides_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "endpoint = \"tcp://10.0.0.2:1212\"\nlog_level = \"warn\"\n\n[ramp]\nstart = 10.0\ninterval = 0.5\n\n[socket]\nsndhwm = 50"
        )
        .unwrap();
        let path = file.path().to_str().unwrap();

        let config = ApplicationConfig::new(&parse_args(&[
            "-c", path, "--start", "-4", "--step", "4", "--unlock", "--linger", "0",
        ]))
        .unwrap();

        assert_eq!(config.endpoint, "tcp://10.0.0.2:1212");
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.ramp.start, -4.0);
        assert_eq!(config.ramp.step, 4.0);
        assert!(config.ramp.unlock);

        let ramp = config.ramp_config().unwrap();
        assert_eq!(ramp.interval, Duration::from_millis(500));

        let options = config.socket_options();
        assert_eq!(options.linger, Duration::ZERO);
        assert_eq!(options.sndhwm, Some(50));
    }

    #[test]
    fn test_positional_endpoint() {
        let config =
            ApplicationConfig::new(&parse_args(&["ipc:///tmp/ramp.ipc", "--name", "x"])).unwrap();
        assert_eq!(config.endpoint, "ipc:///tmp/ramp.ipc");
        assert_eq!(config.client_name, "x");
    }

    #[test]
    fn test_unparseable_number_names_the_argument() {
        let err = ApplicationConfig::new(&parse_args(&["--stop", "thirty"])).unwrap_err();
        assert!(matches!(err, PublishError::Config(_)));
        assert!(err.to_string().contains("STOP"));
    }

    #[test]
    fn test_invalid_ramp_values_are_rejected() {
        let config = ApplicationConfig::new(&parse_args(&["--interval", "-1"])).unwrap();
        assert!(matches!(
            config.ramp_config(),
            Err(PublishError::InvalidRamp(_))
        ));

        let config = ApplicationConfig::new(&parse_args(&["--step", "0"])).unwrap();
        assert!(config.ramp_config().is_err());
    }

    #[test]
    fn test_malformed_file() {
        let err = ApplicationConfig::from_toml("[ramp]\nstart = \"zero\"").unwrap_err();
        assert!(matches!(err, PublishError::ConfigFile(_)));

        let err = ApplicationConfig::read_file("/nonexistent/ramp.toml").unwrap_err();
        assert!(matches!(err, PublishError::Io(_)));
    }
}
