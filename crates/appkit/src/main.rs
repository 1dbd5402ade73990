mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use appkit_core::config::HostConfig;
use appkit_core::event::{EventResult, sync_event_handler};
use appkit_core::kernel::Host;
use appkit_core::kernel::error::Result;
use appkit_core::managers::{NotificationManager, ProviderManager, ScriptManager};
use clap::{Parser, Subcommand, ValueEnum};
use files_app::events::{LEGACY_LOAD_ADDITIONAL_SCRIPTS, LoadAdditionalScriptsEvent, LoadSidebar};
use files_app::{APP_ID, FilesApp};
use log::info;

/// Appkit: two-phase app bootstrap demo host
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Print "pong" and exit
    #[arg(long)]
    ping: bool,

    /// Host configuration file (json, toml or yaml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the service identifiers registered by the files app
    Services,
    /// Print the merged capability document
    Capabilities,
    /// Register and boot all apps, then report what they registered
    Boot,
    /// Boot, then publish an event
    Publish {
        #[arg(value_enum)]
        event: PublishEvent,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum PublishEvent {
    /// The files sidebar is rendered
    LoadSidebar,
    /// The file list page loads
    LoadScripts,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    if args.ping {
        println!("pong");
        return ExitCode::SUCCESS;
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: CliArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => HostConfig::load(path)?,
        None => HostConfig::default(),
    };
    logging::init(&config.log_level)?;

    let mut host = Host::new(config)?;
    host.install(Box::new(FilesApp::new()))?;

    match args.command {
        Some(Commands::Services) => {
            host.register_apps()?;
            let container = host.app_container(APP_ID)?;
            for id in container.registry().ids()? {
                println!("{}", id);
            }
        }
        Some(Commands::Capabilities) => {
            host.register_apps()?;
            let container = host.app_container(APP_ID)?;
            let document = host.capabilities(&container)?;
            let text = serde_json::to_string_pretty(&document).map_err(|e| e.to_string())?;
            println!("{}", text);
        }
        Some(Commands::Boot) => {
            host.start().await?;
            report(&host)?;
        }
        Some(Commands::Publish { event }) => {
            host.start().await?;
            publish(&host, event).await?;
        }
        None => {
            println!("Initializing application...");
            host.start().await?;
            for app_id in host.app_ids() {
                println!("{}: {}", app_id, host.phase(app_id)?);
            }
            println!("Shutting down application...");
        }
    }
    Ok(())
}

fn report(host: &Host) -> Result<()> {
    let server = host.server_container();
    for app_id in host.app_ids() {
        println!("App '{}': {}", app_id, host.phase(app_id)?);
    }
    println!("Resource providers:");
    for provider in server.get::<dyn ProviderManager>()?.registered_providers() {
        println!("  - {}", provider);
    }
    println!("Notifiers:");
    for notifier in server.get::<dyn NotificationManager>()?.registered_notifiers() {
        println!("  - {}", notifier);
    }
    Ok(())
}

async fn publish(host: &Host, event: PublishEvent) -> Result<()> {
    let dispatcher = host.dispatcher();
    dispatcher
        .subscribe_named(
            LEGACY_LOAD_ADDITIONAL_SCRIPTS,
            sync_event_handler(|event| {
                println!("Received legacy event '{}'", event.name());
                EventResult::Continue
            }),
        )
        .await;

    let result = match event {
        PublishEvent::LoadSidebar => host.publish(&LoadSidebar).await?,
        PublishEvent::LoadScripts => host.publish(&LoadAdditionalScriptsEvent).await?,
    };
    info!("Published {:?}: {:?}", event, result);

    println!("Queued scripts:");
    for script in host.server_container().get::<dyn ScriptManager>()?.scripts() {
        println!("  - {}", script);
    }
    Ok(())
}
