use std::path::PathBuf;
use std::process::ExitCode;

use base64::Engine;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sofia_gateway::api::ApiServerBuilder;
use sofia_gateway::api::chat::ChatResponse;
use sofia_gateway::speech::{self, SharedSpeech};
use sofia_gateway::{Config, Error, IntentMatcher, RoutingProfile};

/// Sofia - keyword-routed chat widget backend
#[derive(Parser)]
#[command(name = "sofia", version, about)]
struct Cli {
    /// Routing profile: embedded id (e.g. "academia") or path to a profile file
    #[arg(short, long, env = "SOFIA_PROFILE")]
    profile: Option<String>,

    /// Port to listen on
    #[arg(long, env = "SOFIA_PORT")]
    port: Option<u16>,

    /// Directory holding the widget page (index.html)
    #[arg(long, env = "SOFIA_STATIC_DIR")]
    static_dir: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the matcher on one message and print the reply
    Ask {
        /// Message as the widget would send it
        message: String,
    },
    /// Synthesize text with the configured provider
    Speak {
        /// Text to speak
        #[arg(default_value = "Hola, soy Sofia. ¿En qué puedo ayudarte hoy?")]
        text: String,
        /// Where to write the audio
        #[arg(short, long, default_value = "sofia.mp3")]
        out: PathBuf,
    },
    /// List embedded routing profiles
    Profiles,
    /// Validate a routing profile file
    CheckProfile {
        /// Path to the profile TOML
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,sofia_gateway=info",
        1 => "info,sofia_gateway=debug",
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
    let mut config = Config::load()?;
    if let Some(profile) = cli.profile {
        config.profile = profile;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if cli.static_dir.is_some() {
        config.server.static_dir = cli.static_dir;
    }

    // Handle subcommands
    if let Some(cmd) = cli.command {
        return match cmd {
            Command::Ask { message } => ask(&config, &message),
            Command::Speak { text, out } => speak(&config, &text, &out).await,
            Command::Profiles => list_profiles(),
            Command::CheckProfile { path } => check_profile(&path),
        };
    }

    tracing::info!(
        profile = %config.profile,
        port = config.server.port,
        tts_provider = ?config.tts.provider,
        "starting sofia gateway"
    );
    tracing::debug!(?config, "loaded configuration");

    let profile = RoutingProfile::resolve(&config.profile)?;
    let matcher = IntentMatcher::new(profile);
    let speech = optional_speech(&config)?;

    ApiServerBuilder::new(
        matcher,
        config.server.port,
        speech::provider_name(config.tts.provider),
    )
    .speech(speech)
    .static_dir(config.server.static_dir)
    .rate_limit(config.server.rate_limit_per_minute)
    .build()
    .run()
    .await?;

    Ok(())
}

/// Build the speech provider, running without one if credentials are absent
fn optional_speech(config: &Config) -> anyhow::Result<Option<SharedSpeech>> {
    match speech::build_provider(&config.tts) {
        Ok(provider) => Ok(Some(provider)),
        Err(Error::ProviderUnconfigured(provider)) => {
            tracing::warn!(provider, "speech disabled - credentials not configured");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Print the reply for one message
fn ask(config: &Config, message: &str) -> anyhow::Result<()> {
    let matcher = IntentMatcher::new(RoutingProfile::resolve(&config.profile)?);
    let reply = matcher.respond(message)?;

    println!("selection: {:?}", reply.selection);
    println!("{}", serde_json::to_string_pretty(&ChatResponse::from(reply))?);
    Ok(())
}

/// Synthesize text and write the audio file
async fn speak(config: &Config, text: &str, out: &std::path::Path) -> anyhow::Result<()> {
    println!("Synthesizing with {}...", speech::provider_name(config.tts.provider));

    let provider = speech::build_provider(&config.tts)?;
    let payload = provider.synthesize(text).await?;
    let audio = base64::engine::general_purpose::STANDARD.decode(&payload.audio_content)?;

    std::fs::write(out, &audio)?;
    println!("Wrote {} bytes to {}", audio.len(), out.display());
    Ok(())
}

/// List embedded routing profiles
fn list_profiles() -> anyhow::Result<()> {
    for (id, _) in RoutingProfile::embedded_profiles() {
        let profile = RoutingProfile::embedded(id)?;
        println!(
            "{id:<12} {} ({} routes, {} fallbacks, {} directives)",
            profile.display_name(),
            profile.routes.len(),
            profile.fallback.replies().len(),
            profile.directives.len()
        );
    }
    Ok(())
}

/// Validate a routing profile file
fn check_profile(path: &std::path::Path) -> anyhow::Result<()> {
    let profile = RoutingProfile::load(path)?;
    println!(
        "{}: ok ({} routes, {} fallbacks)",
        profile.id,
        profile.routes.len(),
        profile.fallback.replies().len()
    );
    for (position, route) in profile.routes.routes().iter().enumerate() {
        println!("  {:>2}. {:<16} {}", position + 1, route.id(), route.group.triggers.join(", "));
    }
    Ok(())
}
