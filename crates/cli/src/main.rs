use anyhow::Context;
use clap::{Parser, Subcommand};

use lib::session::{HistoryEntry, Message, Sender, SessionManager};

#[derive(Parser)]
#[command(name = "nexachat")]
#[command(about = "NexaChat CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Create the configuration directory and default files (config, state directory).
    Init {
        /// Config file path (default: NEXACHAT_CONFIG_PATH or ~/.nexachat/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,
    },

    /// Run the gateway (HTTP relay to the provider). Requires a provider API key.
    Gateway {
        /// Config file path (default: NEXACHAT_CONFIG_PATH or ~/.nexachat/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// HTTP port (default from config or 5000)
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Chat through the gateway (interactive). /new, /clear, /clear-history,
    /// /history, /open N, /dark, /light, /exit.
    Chat {
        /// Config file path (default: NEXACHAT_CONFIG_PATH or ~/.nexachat/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,
    },

    /// List models available to the configured provider key.
    Models {
        /// Config file path (default: NEXACHAT_CONFIG_PATH or ~/.nexachat/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("nexachat {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Init { config }) => {
            if let Err(e) = run_init(config) {
                log::error!("init failed: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Gateway { config, port }) => {
            if let Err(e) = run_gateway(config, port).await {
                log::error!("gateway failed: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Chat { config }) => {
            if let Err(e) = run_chat(config).await {
                log::error!("chat failed: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Models { config }) => {
            if let Err(e) = run_models(config).await {
                log::error!("models failed: {}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("Run with --help for usage");
        }
    }
}

fn run_init(config_path: Option<std::path::PathBuf>) -> anyhow::Result<()> {
    let path = config_path.unwrap_or_else(lib::config::default_config_path);
    let (config, path) = lib::config::load_config(Some(path))?;
    let dir = lib::init::init_config_dir(&path, &config)?;
    println!("initialized configuration at {}", dir.display());
    Ok(())
}

async fn run_gateway(
    config_path: Option<std::path::PathBuf>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    let (mut config, _path) = lib::config::load_config(config_path)?;
    if let Some(p) = port {
        config.gateway.port = p;
    }
    log::info!(
        "starting gateway on {}:{}",
        config.gateway.bind,
        config.gateway.port
    );
    lib::gateway::run_gateway(config).await
}

async fn run_models(config_path: Option<std::path::PathBuf>) -> anyhow::Result<()> {
    let (config, _) = lib::config::load_config(config_path)?;
    let api_key = lib::config::resolve_api_key(&config)
        .context("no provider API key configured (set GEMINI_API_KEY or provider.apiKey)")?;
    let client = lib::llm::GeminiClient::new(api_key, config.provider.base_url.clone());
    for model in client.list_models().await? {
        match model.display_name {
            Some(display) => println!("{}  ({})", model.name, display),
            None => println!("{}", model.name),
        }
    }
    Ok(())
}

async fn run_chat(config_path: Option<std::path::PathBuf>) -> anyhow::Result<()> {
    use std::io::{self, Write};

    let (config, _) = lib::config::load_config(config_path)?;
    let store = lib::store::StateStore::new(lib::config::resolve_state_dir(&config));
    let relay = lib::gateway::GatewayClient::for_config(&config);
    let mut session =
        SessionManager::initialize(store, lib::config::resolve_reply_delay(&config)).await;

    for msg in session.thread() {
        print_message(msg);
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;
        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("/exit") || input.eq_ignore_ascii_case("/quit") {
            break;
        }
        if input.eq_ignore_ascii_case("/new") {
            session.new_chat().await;
            for msg in session.thread() {
                print_message(msg);
            }
            continue;
        }
        if input.eq_ignore_ascii_case("/clear") {
            session.clear_thread().await;
            continue;
        }
        if input.eq_ignore_ascii_case("/clear-history") {
            session.clear_history().await;
            continue;
        }
        if input.eq_ignore_ascii_case("/history") {
            print_history(session.history());
            continue;
        }
        if input.eq_ignore_ascii_case("/dark") {
            session.set_theme(true).await;
            continue;
        }
        if input.eq_ignore_ascii_case("/light") {
            session.set_theme(false).await;
            continue;
        }
        if let Some(rest) = input.strip_prefix("/open ") {
            // /history numbers entries newest-first; /open takes the same index.
            let entry: Option<HistoryEntry> = rest
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|n| session.history().iter().rev().nth(n).cloned());
            match entry {
                Some(entry) => {
                    session.reopen(&entry).await;
                    for msg in session.thread() {
                        print_message(msg);
                    }
                }
                None => eprintln!("no history entry {}", rest.trim()),
            }
            continue;
        }

        session.send(&relay, input).await;
        if let Some(msg) = session.thread().last() {
            print_message(msg);
        }
    }

    Ok(())
}

fn print_message(msg: &Message) {
    let marker = match msg.sender {
        Sender::User => ">",
        Sender::Bot => "<",
    };
    println!("{} {}  [{}]", marker, msg.text, msg.time);
}

fn print_history(history: &[HistoryEntry]) {
    if history.is_empty() {
        println!("no history yet");
        return;
    }
    for (i, entry) in history.iter().rev().enumerate() {
        println!(
            "{}: {} / {}  [{}]",
            i,
            truncate(&entry.user, 30),
            truncate(&entry.bot, 30),
            entry.time
        );
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let head: String = s.chars().take(max).collect();
        format!("{}...", head)
    } else {
        s.to_string()
    }
}
