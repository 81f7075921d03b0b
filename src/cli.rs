//! CLI argument definitions using clap derive macros.

use clap::Parser;

use portal_alerts_core::AlertsQuery;
use portal_alerts_core::config::ConfigLayer;

/// Fetch supervision alerts from an SSO-protected monitoring portal.
///
/// Logs in through the portal's single-sign-on challenge when needed and
/// prints the alerts-by-equipments payload as JSON on stdout.
#[derive(Parser, Debug)]
#[command(name = "portal-alerts")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Equipment group to query
    #[arg(short, long)]
    pub group: Option<String>,

    /// Free-text equipment search
    #[arg(short, long)]
    pub search: Option<String>,

    /// Page size
    #[arg(short, long)]
    pub count: Option<u32>,

    /// Page offset
    #[arg(short, long)]
    pub offset: Option<u32>,

    /// Login username (overrides PORTAL_ALERTS_USERNAME and the config file)
    #[arg(short, long)]
    pub username: Option<String>,

    /// Login password (prefer PORTAL_ALERTS_PASSWORD to keep it out of shell history)
    #[arg(long)]
    pub password: Option<String>,

    /// Supervision service origin
    #[arg(long)]
    pub base_url: Option<String>,

    /// Connect timeout in seconds (1-3600)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub connect_timeout: Option<u64>,

    /// Whole-request timeout in seconds (1-3600)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub read_timeout: Option<u64>,

    /// Maximum redirect hops per request (1-50)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=50))]
    pub max_redirects: Option<u8>,

    /// Print one equipment name per line instead of JSON
    #[arg(long)]
    pub names: bool,
}

impl Args {
    /// Alert query built from the filter flags.
    pub fn query(&self) -> AlertsQuery {
        AlertsQuery {
            group: self.group.clone(),
            search: self.search.clone(),
            count: self.count,
            offset: self.offset,
        }
    }

    /// Settings layer built from the connection flags.
    pub fn config_layer(&self) -> ConfigLayer {
        ConfigLayer {
            username: self.username.clone(),
            password: self.password.clone(),
            base_url: self.base_url.clone(),
            connect_timeout_secs: self.connect_timeout,
            read_timeout_secs: self.read_timeout,
            max_redirects: self.max_redirects.map(usize::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_args_parses_successfully() {
        let args = Args::try_parse_from(["portal-alerts"]).unwrap();
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
        assert!(!args.names);
        assert_eq!(args.query(), AlertsQuery::default());
        assert_eq!(args.config_layer(), ConfigLayer::default());
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let args = Args::try_parse_from(["portal-alerts", "-vv"]).unwrap();
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_cli_query_flags() {
        let args = Args::try_parse_from([
            "portal-alerts",
            "-g",
            "PPD1R420",
            "--search",
            "3dgeoscisurveycstt210913",
            "-c",
            "100",
            "--offset",
            "0",
        ])
        .unwrap();

        let query = args.query();
        assert_eq!(query.group.as_deref(), Some("PPD1R420"));
        assert_eq!(query.search.as_deref(), Some("3dgeoscisurveycstt210913"));
        assert_eq!(query.count, Some(100));
        assert_eq!(query.offset, Some(0));
    }

    #[test]
    fn test_cli_connection_flags_map_to_config_layer() {
        let args = Args::try_parse_from([
            "portal-alerts",
            "-u",
            "hq9",
            "--base-url",
            "http://127.0.0.1:8081",
            "--max-redirects",
            "5",
            "--read-timeout",
            "90",
        ])
        .unwrap();

        let layer = args.config_layer();
        assert_eq!(layer.username.as_deref(), Some("hq9"));
        assert_eq!(layer.base_url.as_deref(), Some("http://127.0.0.1:8081"));
        assert_eq!(layer.max_redirects, Some(5));
        assert_eq!(layer.read_timeout_secs, Some(90));
        assert_eq!(layer.password, None);
    }

    #[test]
    fn test_cli_max_redirects_zero_rejected() {
        let result = Args::try_parse_from(["portal-alerts", "--max-redirects", "0"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_help_flag_shows_usage() {
        let result = Args::try_parse_from(["portal-alerts", "--help"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_cli_invalid_flag_returns_error() {
        let result = Args::try_parse_from(["portal-alerts", "--invalid-flag"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }
}
