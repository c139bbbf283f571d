//! CLI binary for nova.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use nova::calendar::GoogleCalendar;
use nova::listen::GREETING;
use nova::llm::{LanguageModel, OpenAiClient};
use nova::platform::{create_process_control, keyboard};
use nova::stt::SpeechInput;
use nova::tts::CommandRenderer;
use nova::{
    ActionDispatcher, ActionHandlers, Collaborators, CommandInterpreter, ContextStore,
    HandlerSettings, ListenLoop, LoopExit, NovaConfig, ProgramRegistry, SpeechOutputChannel,
    UserId,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Nova: voice-driven command assistant.
#[derive(Parser)]
#[command(name = "nova", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Option<Command>,
}

/// Available commands.
#[derive(Subcommand)]
enum Command {
    /// Listen for voice commands until told to stop.
    Run,

    /// List the voices the speech renderer offers.
    Voices,

    /// Manage the program name to executable mapping.
    Programs {
        #[command(subcommand)]
        action: ProgramsAction,
    },

    /// Manage custom command phrases.
    Commands {
        #[command(subcommand)]
        action: CommandsAction,
    },

    /// Print the configuration file path in use.
    ConfigPath,
}

#[derive(Subcommand)]
enum ProgramsAction {
    /// Show every registered program.
    List,
    /// Register or replace a program.
    Set { name: String, executable: String },
    /// Remove a program.
    Remove { name: String },
}

#[derive(Subcommand)]
enum CommandsAction {
    /// Show every custom command.
    List,
    /// Register or replace a custom command.
    Set { command: String, action: String },
    /// Remove a custom command.
    Remove { command: String },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(NovaConfig::default_config_path);

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => run(&config_path),
        Command::Voices => list_voices(&config_path),
        Command::Programs { action } => manage_programs(&config_path, action),
        Command::Commands { action } => manage_commands(&config_path, action),
        Command::ConfigPath => {
            println!("{}", config_path.display());
            Ok(())
        }
    }
}

fn run(config_path: &Path) -> anyhow::Result<()> {
    let config = NovaConfig::load_or_default(config_path)?;
    let _log_guard = nova::logging::init(&config.logging)?;
    info!("loaded configuration from {}", config_path.display());

    // Speech capture runs on blocking threads that cannot be interrupted,
    // so the runtime is shut down without waiting for them.
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(run_assistant(config));
    runtime.shutdown_background();
    result
}

async fn run_assistant(config: NovaConfig) -> anyhow::Result<()> {
    println!("Nova v{}", env!("CARGO_PKG_VERSION"));

    let renderer = Arc::new(CommandRenderer::from_config(&config)?);
    info!("speech renderer: {}", renderer.program());
    let (speech, worker) = SpeechOutputChannel::spawn(renderer, config.speech.queue_capacity);

    let input: Arc<dyn SpeechInput> = Arc::from(nova::stt::from_config(&config)?);
    if config.resolved_api_key().is_none() {
        warn!("no API key configured; set openai_api_key or OPENAI_API_KEY");
    }
    let llm: Arc<dyn LanguageModel> = Arc::new(OpenAiClient::from_config(&config)?);
    let calendar = Arc::new(GoogleCalendar::from_config(&config.reminder)?);

    let processes = create_process_control();
    info!("process control: {}", processes.name());
    let keyboard = keyboard::detect_keyboard();
    match &keyboard {
        Some(kb) => info!("keystroke backend: {}", kb.name()),
        None => warn!("{}", keyboard::install_instructions()),
    }

    let context = Arc::new(ContextStore::new());
    let deps = Collaborators {
        speech: speech.clone(),
        input: Arc::clone(&input),
        llm: Arc::clone(&llm),
        calendar,
        processes,
        keyboard,
        context: Arc::clone(&context),
    };
    let handlers = Arc::new(ActionHandlers::new(
        deps,
        ProgramRegistry::new(config.program_mapping.clone()),
        HandlerSettings::from_config(&config),
    ));
    let listen_loop = ListenLoop::new(
        UserId::default(),
        input,
        CommandInterpreter::new(llm, context),
        ActionDispatcher::new(handlers),
        speech.clone(),
    );

    speech.speak(GREETING);

    // Handle Ctrl+C
    let cancel = CancellationToken::new();
    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("received Ctrl+C, shutting down...");
            cancel_clone.cancel();
        }
    });

    println!("\nListening. Say \"stop listening\" or press Ctrl+C to quit.\n");
    let exit = tokio::spawn(async move { listen_loop.run(cancel).await }).await?;

    if exit == LoopExit::Cancelled {
        info!("Nova program terminated by user.");
        println!("Nova program terminated by user.");
    }
    speech.shutdown().await?;
    worker.join().await;
    Ok(())
}

fn list_voices(config_path: &Path) -> anyhow::Result<()> {
    init_stderr_logging();
    let config = NovaConfig::load_or_default(config_path)?;
    let renderer = CommandRenderer::from_config(&config)?;
    let voices = renderer.list_voices()?;

    println!("Voices available from {}:", renderer.program());
    for voice in &voices {
        println!("  {voice}");
    }
    if !config.voice_id.is_empty() {
        println!("\nConfigured voice: {}", config.voice_id);
    }
    Ok(())
}

fn manage_programs(config_path: &Path, action: ProgramsAction) -> anyhow::Result<()> {
    init_stderr_logging();
    let mut config = NovaConfig::load_or_default(config_path)?;
    match action {
        ProgramsAction::List => {
            let registry = ProgramRegistry::new(config.program_mapping);
            if registry.is_empty() {
                println!("No programs registered.");
            }
            for (name, executable) in registry.iter() {
                println!("{name} = {executable}");
            }
            return Ok(());
        }
        ProgramsAction::Set { name, executable } => {
            config.set_program(&name, &executable);
            println!("{name} = {executable}");
        }
        ProgramsAction::Remove { name } => match config.remove_program(&name) {
            Some(executable) => println!("Removed {name} ({executable})"),
            None => anyhow::bail!("program '{name}' is not registered"),
        },
    }
    config.save_to_file(config_path)?;
    info!("saved {}", config_path.display());
    Ok(())
}

fn manage_commands(config_path: &Path, action: CommandsAction) -> anyhow::Result<()> {
    init_stderr_logging();
    let mut config = NovaConfig::load_or_default(config_path)?;
    match action {
        CommandsAction::List => {
            if config.custom_commands.is_empty() {
                println!("No custom commands registered.");
            }
            for (command, action) in &config.custom_commands {
                println!("{command} => {action}");
            }
            return Ok(());
        }
        CommandsAction::Set { command, action } => {
            config.set_custom_command(&command, &action);
            println!("{command} => {action}");
        }
        CommandsAction::Remove { command } => match config.remove_custom_command(&command) {
            Some(action) => println!("Removed {command} ({action})"),
            None => anyhow::bail!("custom command '{command}' is not registered"),
        },
    }
    config.save_to_file(config_path)?;
    info!("saved {}", config_path.display());
    Ok(())
}

fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("nova=warn")),
        )
        .init();
}
