//! Logging System
//!
//! Structured logging on `tracing`. Level, format, and destination come from
//! [`LoggingConfig`], each overridable through `BMS_LOG*` environment variables.

use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

const ENV_FILTER: &str = "BMS_LOG";
const ENV_FORMAT: &str = "BMS_LOG_FORMAT";
const ENV_OUTPUT: &str = "BMS_LOG_OUTPUT";
const ENV_FILE: &str = "BMS_LOG_FILE";
const ENV_MODULES: &str = "BMS_LOG_MODULES";

/// Resolve the log file path with precedence: CLI, `BMS_LOG_FILE`, config file, default.
pub fn resolve_log_file_path(
    cli_file: Option<PathBuf>,
    config_file: Option<PathBuf>,
) -> Result<PathBuf, ApiError> {
    if let Some(p) = cli_file.filter(|p| !p.as_os_str().is_empty()) {
        return Ok(p);
    }
    if let Ok(env_path) = std::env::var(ENV_FILE) {
        if !env_path.is_empty() {
            return Ok(PathBuf::from(env_path));
        }
    }
    if let Some(p) = config_file.filter(|p| !p.as_os_str().is_empty()) {
        return Ok(p);
    }
    default_log_file_path()
}

fn default_log_file_path() -> Result<PathBuf, ApiError> {
    let project_dirs = directories::ProjectDirs::from("", "", "bms").ok_or_else(|| {
        ApiError::ConfigError("Could not determine platform directories for log file".to_string())
    })?;
    let dir = project_dirs
        .state_dir()
        .unwrap_or_else(|| project_dirs.data_local_dir())
        .to_path_buf();
    Ok(dir.join("bms.log"))
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// trace, debug, info, warn, error, off
    #[serde(default = "default_log_level")]
    pub level: String,

    /// json or text
    #[serde(default = "default_format")]
    pub format: String,

    /// stdout, stderr, file, file+stderr, both
    #[serde(default = "default_output")]
    pub output: String,

    /// Log file path when output includes file; None means the platform state directory
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Colored text output on terminals
    #[serde(default = "default_true")]
    pub color: bool,

    /// Per-module levels, e.g. `bms::tree = "debug"`
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_format() -> String {
    "text".to_string()
}

fn default_output() -> String {
    "stderr".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            level: default_log_level(),
            format: default_format(),
            output: default_output(),
            file: None,
            color: default_true(),
            modules: HashMap::new(),
        }
    }
}

/// Install the global subscriber.
///
/// Priority order (highest to lowest): environment variables, configuration, defaults.
pub fn init_logging(config: Option<&LoggingConfig>) -> Result<(), ApiError> {
    if config.map(|c| !c.enabled).unwrap_or(false) {
        return Registry::default()
            .with(EnvFilter::new("off"))
            .try_init()
            .map_err(|e| ApiError::ConfigError(format!("Failed to install subscriber: {}", e)));
    }

    let filter = build_env_filter(config)?;
    let format = determine_format(config)?;
    let output = determine_output(config)?;
    let ansi = config.map(|c| c.color).unwrap_or(true) && !output.file;
    let writer = build_writer(&output, config.and_then(|c| c.file.clone()))?;

    let registry = Registry::default().with(filter);
    let installed = if format == LogFormat::Json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_writer(writer),
            )
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(ansi)
                    .with_writer(writer),
            )
            .try_init()
    };
    installed.map_err(|e| ApiError::ConfigError(format!("Failed to install subscriber: {}", e)))
}

fn build_writer(
    output: &OutputDestinations,
    config_file: Option<PathBuf>,
) -> Result<BoxMakeWriter, ApiError> {
    let open_file = || -> Result<Mutex<std::fs::File>, ApiError> {
        let log_file = resolve_log_file_path(None, config_file.clone())?;
        if let Some(parent) = log_file.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ApiError::ConfigError(format!("Failed to create log directory: {}", e))
            })?;
        }
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .map(Mutex::new)
            .map_err(|e| {
                ApiError::ConfigError(format!("Failed to open log file {:?}: {}", log_file, e))
            })
    };

    let writer = match (output.stdout, output.stderr, output.file) {
        (_, true, true) => BoxMakeWriter::new(open_file()?.and(std::io::stderr)),
        (_, false, true) => BoxMakeWriter::new(open_file()?),
        (true, true, false) => BoxMakeWriter::new(std::io::stdout.and(std::io::stderr)),
        (false, true, false) => BoxMakeWriter::new(std::io::stderr),
        _ => BoxMakeWriter::new(std::io::stdout),
    };
    Ok(writer)
}

/// Build the filter from `BMS_LOG`, or from config plus `BMS_LOG_MODULES`.
fn build_env_filter(config: Option<&LoggingConfig>) -> Result<EnvFilter, ApiError> {
    if let Ok(filter) = EnvFilter::try_from_env(ENV_FILTER) {
        return Ok(filter);
    }

    let level = config.map(|c| c.level.as_str()).unwrap_or("warn");
    if level == "off" {
        return Ok(EnvFilter::new("off"));
    }
    let mut filter = EnvFilter::new(level);

    let mut directives: Vec<String> = config
        .map(|c| {
            c.modules
                .iter()
                .map(|(module, level)| format!("{}={}", module, level))
                .collect()
        })
        .unwrap_or_default();
    if let Ok(modules) = std::env::var(ENV_MODULES) {
        directives.extend(parse_module_directives(&modules));
    }
    for directive in directives {
        filter = filter.add_directive(directive.parse().map_err(|e| {
            ApiError::ConfigError(format!("Invalid log directive {:?}: {}", directive, e))
        })?);
    }
    Ok(filter)
}

/// `a=debug, b=trace` into directives; malformed pairs are ignored.
fn parse_module_directives(spec: &str) -> Vec<String> {
    spec.split(',')
        .filter_map(|pair| {
            let (module, level) = pair.split_once('=')?;
            let (module, level) = (module.trim(), level.trim());
            (!module.is_empty() && !level.is_empty()).then(|| format!("{}={}", module, level))
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormat {
    Json,
    Text,
}

fn parse_format(format: &str) -> Result<LogFormat, ApiError> {
    match format {
        "json" => Ok(LogFormat::Json),
        "text" => Ok(LogFormat::Text),
        other => Err(ApiError::ConfigError(format!(
            "Invalid log format: {} (must be 'json' or 'text')",
            other
        ))),
    }
}

fn determine_format(config: Option<&LoggingConfig>) -> Result<LogFormat, ApiError> {
    if let Ok(format) = std::env::var(ENV_FORMAT) {
        if let Ok(parsed) = parse_format(&format) {
            return Ok(parsed);
        }
    }
    parse_format(config.map(|c| c.format.as_str()).unwrap_or("text"))
}

/// Output destinations
#[derive(Debug, PartialEq, Eq)]
struct OutputDestinations {
    stdout: bool,
    stderr: bool,
    file: bool,
}

fn determine_output(config: Option<&LoggingConfig>) -> Result<OutputDestinations, ApiError> {
    if let Ok(output) = std::env::var(ENV_OUTPUT) {
        return parse_output_destinations(&output);
    }
    parse_output_destinations(config.map(|c| c.output.as_str()).unwrap_or("stderr"))
}

fn parse_output_destinations(output: &str) -> Result<OutputDestinations, ApiError> {
    let (stdout, stderr, file) = match output {
        "stdout" => (true, false, false),
        "stderr" => (false, true, false),
        "file" => (false, false, true),
        "file+stderr" => (false, true, true),
        "both" => (true, true, false),
        _ => {
            return Err(ApiError::ConfigError(format!(
                "Invalid log output: {} (must be 'stdout', 'stderr', 'file', 'file+stderr', or 'both')",
                output
            )))
        }
    };
    Ok(OutputDestinations {
        stdout,
        stderr,
        file,
    })
}
