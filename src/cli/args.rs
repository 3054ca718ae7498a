//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Offline cache proxy for the commute tracker
///
/// Drives the proxy's lifecycle (install, activate), answers requests the
/// way the app's offline worker would, and inspects the cache buckets.
#[derive(Parser, Debug)]
#[command(name = "commute-cache")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "COMMUTE_CACHE_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch the manifest into a fresh bucket
    Install,

    /// Delete old buckets and take control of pages
    Activate,

    /// Answer one request through the proxy
    Fetch(FetchArgs),

    /// Deliver a raw control message (JSON)
    Message(MessageArgs),

    /// Delete every bucket
    ClearCache(ClearCacheArgs),

    /// Simulate a push with an optional text payload
    Push(PushArgs),

    /// Simulate a click on a notification
    Click(ClickArgs),

    /// Simulate a background sync
    Sync(SyncArgs),

    /// List buckets and their entry counts
    Buckets(BucketsArgs),

    /// Show worker state and cache summary
    Status,

    /// Show or edit configuration
    Config(ConfigArgs),
}

/// Arguments for the fetch command
#[derive(Parser, Debug)]
pub struct FetchArgs {
    /// URL, absolute or relative to the origin
    pub url: String,

    /// HTTP method
    #[arg(short = 'X', long, default_value = "GET")]
    pub method: String,

    /// Treat as a full-page navigation
    #[arg(short, long)]
    pub navigate: bool,

    /// Print the response body
    #[arg(long)]
    pub show_body: bool,
}

/// Arguments for the message command
#[derive(Parser, Debug)]
pub struct MessageArgs {
    /// Message payload, e.g. '{"type":"SKIP_WAITING"}'
    pub json: String,
}

/// Arguments for the clear-cache command
#[derive(Parser, Debug)]
pub struct ClearCacheArgs {
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the push command
#[derive(Parser, Debug)]
pub struct PushArgs {
    /// Push payload text (default body when omitted)
    pub payload: Option<String>,
}

/// Arguments for the click command
#[derive(Parser, Debug)]
pub struct ClickArgs {
    /// Notification tag (default: the configured tag)
    pub tag: Option<String>,
}

/// Arguments for the sync command
#[derive(Parser, Debug)]
pub struct SyncArgs {
    /// Sync tag
    pub tag: String,
}

/// Arguments for the buckets command
#[derive(Parser, Debug)]
pub struct BucketsArgs {
    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., proxy.version_tag)
        key: String,
        /// Value to set
        value: String,
    },
}

/// Output format for listings
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_fetch() {
        let cli = Cli::parse_from([
            "commute-cache",
            "fetch",
            "/api/records",
            "-X",
            "post",
            "--show-body",
        ]);
        match cli.command {
            Commands::Fetch(args) => {
                assert_eq!(args.url, "/api/records");
                assert_eq!(args.method, "post");
                assert!(args.show_body);
                assert!(!args.navigate);
            }
            _ => panic!("expected Fetch command"),
        }
    }

    #[test]
    fn cli_parses_push_without_payload() {
        let cli = Cli::parse_from(["commute-cache", "push"]);
        match cli.command {
            Commands::Push(args) => assert!(args.payload.is_none()),
            _ => panic!("expected Push command"),
        }
    }

    #[test]
    fn cli_parses_clear_cache_yes() {
        let cli = Cli::parse_from(["commute-cache", "clear-cache", "--yes"]);
        match cli.command {
            Commands::ClearCache(args) => assert!(args.yes),
            _ => panic!("expected ClearCache command"),
        }
    }

    #[test]
    fn cli_parses_buckets_format() {
        let cli = Cli::parse_from(["commute-cache", "buckets", "--format", "json"]);
        match cli.command {
            Commands::Buckets(args) => assert!(matches!(args.format, OutputFormat::Json)),
            _ => panic!("expected Buckets command"),
        }
    }

    #[test]
    fn cli_parses_global_flags() {
        let cli = Cli::parse_from(["commute-cache", "-vv", "status", "--config", "/tmp/c.toml"]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.toml")));
        assert!(matches!(cli.command, Commands::Status));
    }

    #[test]
    fn cli_parses_config_set() {
        let cli = Cli::parse_from(["commute-cache", "config", "set", "proxy.version_tag", "v2"]);
        match cli.command {
            Commands::Config(args) => match args.action {
                Some(ConfigAction::Set { key, value }) => {
                    assert_eq!(key, "proxy.version_tag");
                    assert_eq!(value, "v2");
                }
                _ => panic!("expected Set action"),
            },
            _ => panic!("expected Config command"),
        }
    }
}
