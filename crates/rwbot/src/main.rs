use std::env;
use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Parser;
use rwbot_core::actions::{action_names, create_action};
use rwbot_core::client::MediaWikiClient;
use rwbot_core::config::{BotOverrides, load_file_config, resolve_config, resolve_credentials};
use rwbot_core::review::{ReviewOptions, run_action};

mod prompt;

#[derive(Debug, Parser)]
#[command(
    name = "rwbot",
    version,
    about = "Interactive bot that proposes and commits RopeWiki page edits"
)]
struct Cli {
    #[arg(long, help = "Action for bot to take (env: RWBOT_ACTION)")]
    action: Option<String>,
    #[arg(long, help = "Wiki site to act upon, e.g. ropewiki.com (env: RWBOT_SITE)")]
    site: Option<String>,
    #[arg(long, help = "Scheme used to reach the site: http|https (env: RWBOT_SCHEME)")]
    scheme: Option<String>,
    #[arg(
        long,
        help = "Username of bot account through which changes will be applied (env: RWBOT_USERNAME)"
    )]
    username: Option<String>,
    #[arg(long, help = "Password of bot account (env: RWBOT_PASSWORD)")]
    password: Option<String>,
    #[arg(long, value_name = "PATH", help = "Path to rwbot.toml")]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let overrides = BotOverrides {
        site: cli.site.clone(),
        scheme: cli.scheme.clone(),
        username: cli.username.clone(),
        password: cli.password.clone(),
    };
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from("rwbot.toml"));
    let file = load_file_config(&config_path)?;
    let config = resolve_config(&overrides, &file)?;

    let action_name = match cli.action.or_else(|| env::var("RWBOT_ACTION").ok()) {
        Some(name) => name,
        None => bail!(
            "Missing action argument or RWBOT_ACTION environment variable (known actions: {})",
            action_names().join(", ")
        ),
    };
    let action = match create_action(&action_name) {
        Some(action) => action,
        None => bail!(
            "No action named {action_name} is registered (known actions: {})",
            action_names().join(", ")
        ),
    };

    let mut client = MediaWikiClient::new(&config)?;
    let mut prompt = prompt::TerminalPrompt;

    // Credentials are only resolved (and login attempted) once the action
    // proposes at least one change.
    let report = run_action(
        action.as_ref(),
        &mut client,
        &mut prompt,
        &ReviewOptions {
            min_manual_changes: config.min_manual_changes,
        },
        || resolve_credentials(&overrides),
    )?;

    println!(
        "Committed {} change{} successfully.",
        report.committed,
        if report.committed == 1 { "" } else { "s" }
    );
    Ok(())
}
