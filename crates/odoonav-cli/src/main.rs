mod cli;
mod settings;

use std::io;
use std::io::BufRead;
use std::io::Write;
use std::time::Duration;

use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing::warn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use odoonav_core::config::Config;
use odoonav_core::config::NavigatorSettings;
use odoonav_core::journal::JournalRecord;
use odoonav_core::journal::ResolutionJournal;
use odoonav_core::navigator::Navigator;
use odoonav_core::store::RecordStore;
use odoonav_core::vocabulary::EntityMapper;
use odoonav_exec::build_oracle;
use odoonav_exec::FixtureStore;
use odoonav_exec::XmlRpcStore;

use crate::cli::Args;
use crate::cli::Command;
use crate::cli::GlobalArgs;

fn main() {
    let _ = dotenvy::dotenv();
    let args = Args::parse();
    init_tracing(args.global.verbose);

    if let Err(err) = run(args) {
        eprintln!("❌ {err:#}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let default_directive = match verbose {
        0 => "odoonav=info",
        1 => "odoonav=debug",
        _ => "odoonav=trace",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_directive.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn run(args: Args) -> Result<()> {
    let Args { global, command } = args;
    match command {
        Command::Vocabulary => {
            print_vocabulary();
            Ok(())
        }
        Command::History { limit, json } => print_history(&configured(&global)?, limit, json),
        Command::Resolve { text } => {
            let navigator = build_navigator(&configured(&global)?, &global)?;
            println!("{}", navigator.resolve(&text.join(" ")));
            Ok(())
        }
        Command::Repl => {
            let navigator = build_navigator(&configured(&global)?, &global)?;
            repl(&navigator)
        }
    }
}

fn configured(global: &GlobalArgs) -> Result<Config> {
    let mut config = settings::load_config(global.config.as_deref())?;
    settings::apply_overrides(&mut config, global)?;
    Ok(config)
}

fn build_navigator(config: &Config, global: &GlobalArgs) -> Result<Navigator<Box<dyn RecordStore>>> {
    let (store, base_url, company_id) = match &global.fixture {
        Some(path) => {
            let fixture = FixtureStore::load(path)?;
            let base_url = fixture
                .base_url()
                .map(str::to_string)
                .unwrap_or_else(|| config.server.base_url());
            let company_id = fixture.company_id();
            info!(path = %path.display(), "serving metadata from fixture");
            let store: Box<dyn RecordStore> = Box::new(fixture);
            (store, base_url, company_id)
        }
        None => {
            let base_url = config.server.base_url();
            let password = settings::password(global.password.as_deref(), &config.server.user)?;
            let remote = XmlRpcStore::connect(
                &base_url,
                &config.server.db,
                &config.server.user,
                &password,
                Duration::from_secs(config.server.timeout_secs),
            )
            .with_context(|| format!("failed to connect to {base_url}"))?;
            let company_id = remote.current_company_id(config.navigation.default_company_id);
            let store: Box<dyn RecordStore> = Box::new(remote);
            (store, base_url, company_id)
        }
    };

    let navigator_settings = NavigatorSettings::from_config(config, &base_url, company_id)?;
    let mut navigator = Navigator::new(store, navigator_settings);

    let api_key = settings::api_key(global.api_key.as_deref(), config);
    if let Some(oracle) = build_oracle(&config.oracle, api_key)? {
        info!(oracle = oracle.name(), model = %config.oracle.model, "oracle enabled");
        navigator = navigator.with_oracle(oracle);
    }

    if let Some(path) = settings::journal_path(config) {
        match ResolutionJournal::open(&path) {
            Ok(journal) => navigator = navigator.with_journal(journal),
            Err(err) => warn!(path = %path.display(), error = %err, "journal disabled"),
        }
    }

    Ok(navigator)
}

fn repl<S: RecordStore>(navigator: &Navigator<S>) -> Result<()> {
    println!("✅ odoonav ready ({})", navigator.settings().base_url);
    println!("Type 'help' for examples, 'quit' or 'exit' to leave.");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut line = String::new();
    loop {
        print!("\n🔍 ");
        stdout.flush()?;
        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        match input.to_lowercase().as_str() {
            "" => continue,
            "quit" | "exit" | "q" => break,
            "help" => print_repl_help(),
            _ => println!("{}", navigator.resolve(input)),
        }
    }
    println!("👋 Goodbye!");
    Ok(())
}

fn print_repl_help() {
    println!("Describe the Odoo page you want, for example:");
    for example in [
        "go to sales",
        "open invoicing",
        "take me to customers",
        "show dashboards",
        "navigate to products",
    ] {
        println!("  {example}");
    }
    let keys: Vec<&str> = EntityMapper::known_keys().collect();
    println!("\nKnown entities: {}", keys.join(", "));
}

fn print_vocabulary() {
    for entry in EntityMapper::navigation_entries() {
        let record_kind = EntityMapper::map_to_record_kind(entry.key).unwrap_or("-");
        println!(
            "{:<16} {:<32} {}",
            entry.key,
            record_kind,
            entry.targets.join(" | ")
        );
    }
    for entry in EntityMapper::record_kind_entries() {
        if EntityMapper::map_to_targets(entry.key).is_empty() {
            println!("{:<16} {:<32} -", entry.key, entry.record_kind);
        }
    }
}

fn print_history(config: &Config, limit: usize, json: bool) -> Result<()> {
    let Some(path) = settings::journal_path(config) else {
        println!("journal is disabled");
        return Ok(());
    };
    if !path.is_file() {
        println!("no journal at {}", path.display());
        return Ok(());
    }
    let journal = ResolutionJournal::open(&path)?;
    for record in journal.tail(limit)? {
        if json {
            println!("{}", serde_json::to_string(&record)?);
        } else {
            println!("{}", history_line(&record));
        }
    }
    Ok(())
}

fn history_line(record: &JournalRecord) -> String {
    let entry = &record.entry;
    let outcome = entry
        .url
        .as_deref()
        .or(entry.error.as_deref())
        .unwrap_or("(no link)");
    format!(
        "#{:<5} {:<20} {:<10} {:<18} {:?} -> {}",
        record.seq,
        entry.status.label(),
        entry.intent_kind.map_or("-", |kind| kind.label()),
        entry.tier.as_deref().unwrap_or("-"),
        entry.input,
        outcome
    )
}
