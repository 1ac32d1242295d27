use clap::{Parser, Subcommand};

mod commands;
mod session;
mod util;

#[derive(Parser)]
#[command(name = "focuseye", version, about = "FocusEye CLI: judge snapshots, speak feedback, run monitoring sessions")]
struct Cli {
    /// API base URL
    #[arg(long, env = "FOCUSEYE_API_URL", default_value = "http://localhost:5001")]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check API health and show the public configuration
    Health,
    /// List available scenes
    Scenes,
    /// Judge a single snapshot
    Analyze(commands::analyze::AnalyzeArgs),
    /// Synthesize a feedback message to an MP3 file
    Tts(commands::tts::TtsArgs),
    /// Run a monitoring session, keeping focus counters between checks
    Monitor(commands::monitor::MonitorArgs),
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    let api_url = cli.api_url.trim_end_matches('/');

    let code = match cli.command {
        Commands::Health => commands::health::run(api_url).await,
        Commands::Scenes => commands::scenes::run(api_url).await,
        Commands::Analyze(args) => commands::analyze::run(api_url, args).await,
        Commands::Tts(args) => commands::tts::run(api_url, args).await,
        Commands::Monitor(args) => commands::monitor::run(api_url, args).await,
    };

    std::process::exit(code);
}
