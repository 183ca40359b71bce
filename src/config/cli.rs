use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "tax-filer")]
#[command(about = "Get AI tax considerations from the Tax Filer API")]
pub struct CliConfig {
    #[arg(long, global = true, env = "TAX_FILER_API_BASE_URL", help = "API base URL")]
    pub base_url: Option<String>,

    #[arg(long, global = true, help = "Request timeout in seconds")]
    pub timeout_seconds: Option<u64>,

    #[arg(long, global = true, help = "Directory holding the token cache and preferences")]
    pub state_dir: Option<String>,

    #[arg(long, global = true, help = "TOML profile to load before applying flags")]
    pub config: Option<PathBuf>,

    #[arg(long, short, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Submit tax figures and print the advice report
    Advise(AdviseArgs),
    /// List supported countries
    Countries,
    /// Show API instance information
    Info,
    /// Check that the API is reachable
    Health,
    /// Show or renew the cached session token
    Token {
        #[arg(long, help = "Discard the cached token and request a new one")]
        refresh: bool,
    },
}

#[derive(Debug, Clone, Args)]
pub struct AdviseArgs {
    #[arg(long, default_value = "", allow_negative_numbers = true, help = "Annual income")]
    pub income: String,

    #[arg(long, default_value = "", allow_negative_numbers = true, help = "Total business/work expenses")]
    pub expenses: String,

    #[arg(long, default_value = "", allow_negative_numbers = true, help = "Other deductions claimed")]
    pub deductions: String,

    #[arg(long, help = "Country code; defaults to the last one used")]
    pub country: Option<String>,

    #[arg(long, help = "Also write the report to this file")]
    pub report_out: Option<PathBuf>,
}
