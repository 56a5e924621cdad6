// Application configuration, loaded from environment variables and CLI flags.

use std::path::PathBuf;

use crate::server::ServerConfig;

/// Port used when neither `--port` nor `PORT` is given.
pub const DEFAULT_PORT: u16 = 5000;

/// Where the front-end build drops its compiled bundle.
pub const DEFAULT_STATIC_DIR: &str = "dist/public";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Directory containing the pre-built front-end.
    /// Probed once at startup; when missing the server runs API-only.
    pub static_dir: PathBuf,
    /// Origin the status client talks to. No default.
    pub api_url: Option<String>,
}

impl Config {
    /// Load configuration from environment variables and CLI arguments.
    ///
    /// Environment variables:
    /// - `PORT` - HTTP server port (default: 5000)
    /// - `STATIC_DIR` - Path to the front-end build (default: `dist/public`)
    /// - `FANTASYRA_API_URL` - Base URL the status client queries
    ///
    /// CLI flags (take precedence over the environment):
    /// - `--port <PORT>`
    /// - `--static-dir <PATH>`
    /// - `--api-url <URL>`
    pub fn load() -> Self {
        let args: Vec<String> = std::env::args().collect();
        Self::from_sources(&args, |key| std::env::var(key).ok())
    }

    /// Resolve the configuration from an argument list and an environment lookup.
    pub fn from_sources<F>(args: &[String], env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        // Port: CLI flag --port takes precedence, then env var, then default
        let port = Self::parse_cli_value(args, "--port")
            .and_then(|v| v.parse().ok())
            .or_else(|| env("PORT").and_then(|v| v.parse().ok()))
            .unwrap_or(DEFAULT_PORT);

        let static_dir = Self::parse_cli_value(args, "--static-dir")
            .or_else(|| env("STATIC_DIR"))
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR));

        let api_url = Self::parse_cli_value(args, "--api-url")
            .or_else(|| env("FANTASYRA_API_URL"))
            .filter(|v| !v.trim().is_empty());

        Config {
            port,
            static_dir,
            api_url,
        }
    }

    /// The subset of the configuration the content server needs.
    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            port: self.port,
            static_dir: self.static_dir.clone(),
        }
    }

    /// Parse a CLI flag value like `--port 8080`.
    fn parse_cli_value(args: &[String], flag: &str) -> Option<String> {
        args.windows(2).find_map(|pair| {
            if pair[0] == flag {
                Some(pair[1].clone())
            } else {
                None
            }
        })
    }
}
