use clap::{CommandFactory, Parser, Subcommand};
use worklog_core::{Config, SessionMode};

mod commands;

#[derive(Parser)]
#[command(name = "worklog", version, about = "Worklog CLI")]
struct Cli {
    /// Timer mode for this invocation (defaults to `timer.mode` from config)
    #[arg(long, global = true)]
    mode: Option<SessionMode>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Timer control
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Learning sessions
    Learn {
        #[command(subcommand)]
        action: commands::learn::LearnAction,
    },
    /// Step editing
    Step {
        #[command(subcommand)]
        action: commands::step::StepAction,
    },
    /// Recent days, newest first
    History {
        /// Number of days to include (defaults to `history.days`)
        #[arg(long)]
        days: Option<u32>,
        /// Include the full session lists
        #[arg(long)]
        sessions: bool,
    },
    /// Session statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Print a shell completion script
    Completions {
        shell: clap_complete::Shell,
    },
}

fn init_logging(config: &Config) {
    let env = env_logger::Env::default().default_filter_or(config.logging.level.as_str());
    env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .init();
}

fn main() {
    let cli = Cli::parse();
    let config = Config::load_or_default();
    init_logging(&config);

    let mode = cli.mode.unwrap_or(config.timer.mode);
    let result = match cli.command {
        Commands::Timer { action } => commands::timer::run(action, mode),
        Commands::Learn { action } => commands::learn::run(action),
        Commands::Step { action } => commands::step::run(action, mode),
        Commands::History { days, sessions } => {
            commands::history::run(days.unwrap_or(config.history.days), sessions)
        }
        Commands::Stats { action } => commands::stats::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "worklog", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
