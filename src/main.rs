use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use viva_gateway::Config;
use viva_gateway::api::{ApiServer, ApiState};
use viva_gateway::voice::Synthesizer;

/// Viva - voice-driven mock interview gateway
#[derive(Parser)]
#[command(name = "viva", version, about)]
struct Cli {
    /// Port to listen on
    #[arg(short, long, env = "VIVA_PORT")]
    port: Option<u16>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run one phrase through the synthesis pipeline and write an MP3
    Speak {
        /// Text to speak
        #[arg(default_value = "Hello! This is a test of the interview voice pipeline.")]
        text: String,

        /// Output file
        #[arg(short, long, default_value = "speak.mp3")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,viva_gateway=info",
        1 => "info,viva_gateway=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load();
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    // Handle subcommands
    if let Some(cmd) = cli.command {
        return match cmd {
            Command::Speak { text, output } => speak(&config, &text, &output).await,
        };
    }

    tracing::info!(
        port = config.server.port,
        stt_model = %config.stt.model,
        llm_model = %config.llm.model,
        spool_dir = %config.server.spool_dir.display(),
        "starting viva gateway"
    );

    let port = config.server.port;
    let state = ApiState::from_config(config)?;

    ApiServer::new(Arc::new(state), port).run().await?;

    Ok(())
}

/// Synthesize one phrase and write the MP3 to disk
async fn speak(config: &Config, text: &str, output: &Path) -> anyhow::Result<()> {
    for bin in [&config.synth.piper_bin, &config.synth.ffmpeg_bin] {
        if let Err(e) = which::which(bin) {
            anyhow::bail!("{bin} not found on PATH: {e}");
        }
    }

    println!("Synthesizing: \"{text}\"\n");

    let synthesizer = Synthesizer::from_config(&config.synth);
    let mp3 = synthesizer.synthesize(text).await?;

    if mp3.len() > 3 {
        println!(
            "First 4 bytes: {:02x} {:02x} {:02x} {:02x}",
            mp3[0], mp3[1], mp3[2], mp3[3]
        );
    }

    std::fs::write(output, &mp3)?;
    println!("Wrote {} bytes to {}", mp3.len(), output.display());

    Ok(())
}
