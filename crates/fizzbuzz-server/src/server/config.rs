use anyhow::{Context, bail};
use clap::Parser;
use std::net::SocketAddr;

/// Runtime configuration for the `fizzbuzz-server` binary.
///
/// All values are parsed from CLI arguments or environment variables (a `.env`
/// file is loaded first), with defaults suitable for local development.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "fizzbuzz-server",
    version,
    about = "An HTTP service for labeled fizzbuzz sequences and request statistics"
)]
pub struct CliArgs {
    /// Address to listen on.
    ///
    /// Environment variable: `SERVER_ADDR`
    #[arg(long, env = "SERVER_ADDR", default_value_t = String::from("0.0.0.0:8080"))]
    pub server_addr: String,

    /// Largest `limit` a client may request.
    ///
    /// Every element of the response is allocated up front, so this bounds the
    /// memory a single request can take.
    ///
    /// Environment variable: `MAX_LIMIT`
    #[arg(long, env = "MAX_LIMIT", default_value_t = 10_000)]
    pub max_limit: u64,

    /// Label used when a request omits `str1` or sends it empty.
    ///
    /// Environment variable: `DEFAULT_STR1`
    #[arg(long, env = "DEFAULT_STR1", default_value_t = String::from("fizz"))]
    pub default_str1: String,

    /// Label used when a request omits `str2` or sends it empty.
    ///
    /// Environment variable: `DEFAULT_STR2`
    #[arg(long, env = "DEFAULT_STR2", default_value_t = String::from("buzz"))]
    pub default_str2: String,

    /// Emit logs as JSON lines instead of the human-readable format.
    ///
    /// Environment variable: `LOG_JSON`
    #[arg(long, env = "LOG_JSON", default_value_t = false)]
    pub log_json: bool,

    /// Service name reported to OpenTelemetry backends.
    ///
    /// Environment variable: `OTEL_SERVICE_NAME`
    #[arg(long, env = "OTEL_SERVICE_NAME", default_value_t = String::from("fizzbuzz-server"))]
    pub service_name: String,

    /// Collector endpoint used by the `otlp` exporter.
    ///
    /// Environment variable: `OTEL_EXPORTER_OTLP_ENDPOINT`
    #[arg(long, env = "OTEL_EXPORTER_OTLP_ENDPOINT", default_value_t = String::from("http://localhost:4317"))]
    pub otlp_endpoint: String,
}

/// Validated configuration derived from [`CliArgs`].
///
/// See the matching [`CliArgs`] fields for the meaning of each setting.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Parsed listen address.
    pub server_addr: SocketAddr,
    /// Largest accepted `limit`; always greater than zero.
    pub max_limit: u64,
    /// Non-empty fallback for `str1`.
    pub default_str1: String,
    /// Non-empty fallback for `str2`.
    pub default_str2: String,
    pub log_json: bool,
    pub service_name: String,
    pub otlp_endpoint: String,
}

impl TryFrom<CliArgs> for ServerConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.max_limit == 0 {
            bail!("MAX_LIMIT must be greater than 0");
        }

        if args.default_str1.is_empty() || args.default_str2.is_empty() {
            bail!("DEFAULT_STR1 and DEFAULT_STR2 must not be empty");
        }

        let server_addr = args
            .server_addr
            .parse()
            .with_context(|| format!("invalid SERVER_ADDR `{}`", args.server_addr))?;

        Ok(Self {
            server_addr,
            max_limit: args.max_limit,
            default_str1: args.default_str1,
            default_str2: args.default_str2,
            log_json: args.log_json,
            service_name: args.service_name,
            otlp_endpoint: args.otlp_endpoint,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> anyhow::Result<ServerConfig> {
        let args = CliArgs::try_parse_from(
            std::iter::once("fizzbuzz-server").chain(args.iter().copied()),
        )?;
        ServerConfig::try_from(args)
    }

    #[test]
    fn explicit_flags_are_applied() {
        let config = parse(&[
            "--server-addr",
            "127.0.0.1:9000",
            "--max-limit",
            "50",
            "--default-str1",
            "foo",
            "--default-str2",
            "bar",
        ])
        .unwrap();
        assert_eq!(config.server_addr.port(), 9000);
        assert_eq!(config.max_limit, 50);
        assert_eq!(config.default_str1, "foo");
        assert_eq!(config.default_str2, "bar");
    }

    #[test]
    fn zero_max_limit_is_rejected() {
        assert!(parse(&["--max-limit", "0"]).is_err());
    }

    #[test]
    fn empty_default_label_is_rejected() {
        assert!(parse(&["--default-str1", ""]).is_err());
    }

    #[test]
    fn invalid_address_is_rejected() {
        let err = parse(&["--server-addr", "not-an-address"]).unwrap_err();
        assert!(err.to_string().contains("SERVER_ADDR"));
    }
}
