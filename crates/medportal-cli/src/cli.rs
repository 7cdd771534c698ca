use clap::{Parser, Subcommand, ValueEnum};
use medportal_auth::Role;

#[derive(Parser)]
#[command(name = "medportal")]
#[command(about = "MedPortal CLI — inspect route access, permissions and cache settings")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (defaults to ./medportal.toml when present)
    #[arg(short, long, global = true, env = "MEDPORTAL_CONFIG")]
    pub config: Option<String>,

    /// Log level (overrides config; RUST_LOG takes precedence)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormat>,
}

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Evaluate the route gate for a path and session
    Access(AccessArgs),
    /// Inspect the role permission table
    Permissions(PermissionsArgs),
    /// Cache keys and TTLs
    Cache(CacheArgs),
    /// Show the effective configuration
    Config(ConfigArgs),
}

pub fn parse_role(s: &str) -> Result<Role, String> {
    s.parse::<Role>().map_err(|e| e.to_string())
}

#[derive(clap::Args)]
pub struct AccessArgs {
    /// Requested path (e.g. /admin/staff)
    #[arg(long)]
    pub path: String,
    /// Role allowed on the route (repeatable; none means nobody)
    #[arg(long = "allow", value_parser = parse_role)]
    pub allow: Vec<Role>,
    /// Role of the signed-in user (omit for an anonymous session)
    #[arg(long, value_parser = parse_role)]
    pub role: Option<Role>,
    /// Treat the session as still resolving
    #[arg(long)]
    pub loading: bool,
    /// User id reported in the session
    #[arg(long, default_value = "cli-user")]
    pub user_id: String,
    /// User email reported in the session
    #[arg(long, default_value = "cli@medportal.local")]
    pub email: String,
}

#[derive(clap::Args)]
pub struct PermissionsArgs {
    #[command(subcommand)]
    pub command: PermissionsCommands,
}

#[derive(Subcommand)]
pub enum PermissionsCommands {
    /// List permission tokens per role
    List {
        /// Only show this role
        #[arg(long, value_parser = parse_role)]
        role: Option<Role>,
    },
    /// Check whether a role holds permission tokens
    Check(CheckArgs),
}

#[derive(clap::Args)]
pub struct CheckArgs {
    /// Role name (unknown roles hold nothing)
    pub role: String,
    /// Permission tokens
    #[arg(required = true)]
    pub tokens: Vec<String>,
    /// Require all tokens instead of any
    #[arg(long)]
    pub all: bool,
}

#[derive(clap::Args)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: CacheCommands,
}

#[derive(Subcommand)]
pub enum CacheCommands {
    /// Print the cache key for an endpoint and parameters
    Key {
        /// Endpoint path (e.g. /appointments)
        endpoint: String,
        /// Query parameters as a JSON object
        #[arg(long)]
        params: Option<String>,
    },
    /// Print the per-resource TTL table
    Ttls,
}

#[derive(clap::Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the merged configuration
    Show,
}
