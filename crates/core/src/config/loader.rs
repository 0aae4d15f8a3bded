use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::net::IpAddr;
use std::path::Path;

use super::{types::Config, ConfigError};

/// Environment variable naming an optional TOML config file.
pub const CONFIG_PATH_VAR: &str = "IMAGE_PIPE_CONFIG";

/// Legacy `host:port` (or `:port`) listen address override.
const LISTEN_ADDR_VAR: &str = "IMAGE_PIPE_HTTP_ADDR";

/// Conventional AWS variables, mapped into the `[storage]` section.
const AWS_VARS: &[&str] = &[
    "AWS_ACCESS_KEY_ID",
    "AWS_SECRET_ACCESS_KEY",
    "AWS_REGION",
    "AWS_ENDPOINT_URL",
];

/// Load configuration from an optional file with environment variable overrides.
///
/// Precedence (lowest first): built-in defaults, the TOML file, `IMAGE_PIPE_*`
/// variables (`__` separates nested keys), the `AWS_*` credential variables and
/// finally `IMAGE_PIPE_HTTP_ADDR`.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut figment = Figment::new();

    if let Some(path) = path {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
        figment = figment.merge(Toml::file(path));
    }

    let mut config: Config = figment
        .merge(
            Env::prefixed("IMAGE_PIPE_")
                .ignore(&["CONFIG", "HTTP_ADDR"])
                .split("__"),
        )
        .merge(
            Env::raw()
                .only(AWS_VARS)
                .map(|key| {
                    key.as_str()
                        .to_ascii_lowercase()
                        .replacen("aws_", "storage.", 1)
                        .into()
                }),
        )
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    if let Ok(addr) = std::env::var(LISTEN_ADDR_VAR) {
        if !addr.trim().is_empty() {
            let (host, port) = parse_listen_addr(&addr, config.server.host)?;
            config.server.host = host;
            config.server.port = port;
        }
    }

    Ok(config)
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Parse a listen address of the form `host:port` or `:port`.
///
/// A missing host keeps `default_host`.
pub fn parse_listen_addr(addr: &str, default_host: IpAddr) -> Result<(IpAddr, u16), ConfigError> {
    let invalid = || ConfigError::ParseError(format!("invalid listen address: {:?}", addr));

    let (host, port) = addr.trim().rsplit_once(':').ok_or_else(invalid)?;
    let port: u16 = port.parse().map_err(|_| invalid())?;
    let host = host.trim_start_matches('[').trim_end_matches(']');
    let host = if host.is_empty() {
        default_host
    } else {
        host.parse().map_err(|_| invalid())?
    };

    Ok((host, port))
}
