use std::path::PathBuf;

use clap::ArgAction;
use clap::Parser;
use clap::Subcommand;

#[derive(Parser, Debug)]
#[command(
    name = "odoonav",
    version,
    about = "Resolve free-text navigation requests into Odoo deep links",
    after_help = r#"Examples:
  odoonav resolve go to sales
  odoonav --fixture demo_metadata.json resolve open invoicing page
  odoonav --oracle groq --db prod --user alice repl
  odoonav history --limit 5
"#
)]
pub struct Args {
    #[command(flatten)]
    pub global: GlobalArgs,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// TOML configuration file (default: <config dir>/odoonav/config.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    #[arg(long, global = true)]
    pub host: Option<String>,
    #[arg(long, global = true)]
    pub port: Option<u16>,
    #[arg(long, global = true)]
    pub db: Option<String>,
    #[arg(long, global = true)]
    pub user: Option<String>,
    /// Odoo password; falls back to ODOO_PASSWORD, then a hidden prompt.
    #[arg(long, global = true)]
    pub password: Option<String>,
    /// http or https.
    #[arg(long, global = true)]
    pub scheme: Option<String>,
    /// Serve metadata from a JSON snapshot instead of a live server.
    #[arg(long, global = true)]
    pub fixture: Option<PathBuf>,
    /// Text-understanding oracle: none|groq|openai|ollama.
    #[arg(long, global = true)]
    pub oracle: Option<String>,
    #[arg(long, global = true)]
    pub model: Option<String>,
    /// Base URL of an OpenAI-compatible endpoint.
    #[arg(long, global = true)]
    pub endpoint: Option<String>,
    /// Oracle API key; falls back to the variable named by oracle.api_key_env.
    #[arg(long, global = true)]
    pub api_key: Option<String>,
    #[arg(long, global = true)]
    pub journal: Option<PathBuf>,
    #[arg(long, global = true)]
    pub no_journal: bool,
    /// Raise log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Resolve one request and print the response.
    Resolve {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Read requests from stdin until quit.
    Repl,
    /// Show recent journal entries.
    History {
        #[arg(long, default_value_t = 20)]
        limit: usize,
        /// Print raw journal records as JSON lines.
        #[arg(long)]
        json: bool,
    },
    /// List the known entities and their record kinds.
    Vocabulary,
}
