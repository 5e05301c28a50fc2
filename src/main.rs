mod catalog;
mod device;
mod executor;
mod mcp;
mod midi;
mod preset;
mod suggest;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

use catalog::DeviceCatalog;
use executor::MidiExecutor;
use mcp::PedalwireMcp;
use preset::ComposerRegistry;

/// Pedalwire - MIDI control for effect processors over MCP
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory of device documents (*.json) loaded over the built-in catalog
    #[arg(long)]
    devices_dir: Option<PathBuf>,

    /// Name (or substring) of the MIDI output port to open
    #[arg(long)]
    midi_port: Option<String>,

    /// Print the tool catalog as JSON and exit
    #[arg(long)]
    list_tools: bool,
}

fn main() -> Result<()> {
    // stdout carries the protocol, so logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    // Handle --list-tools
    if args.list_tools {
        println!("{}", serde_json::to_string_pretty(&mcp::list_tools())?);
        return Ok(());
    }

    let mut catalog = DeviceCatalog::new();
    if let Some(dir) = &args.devices_dir {
        catalog.attach_dir(dir)?;
    }

    let executor = match &args.midi_port {
        Some(port) => match MidiExecutor::connect(port) {
            Ok(executor) => executor,
            Err(e) => {
                warn!("{:#}; continuing without MIDI output", e);
                MidiExecutor::headless()
            }
        },
        None => MidiExecutor::headless(),
    };

    info!(
        "pedalwire ready: {} devices, output {}",
        catalog.len(),
        executor.port_name().unwrap_or("none (headless)")
    );

    let mut server = PedalwireMcp::new(catalog, ComposerRegistry::factory(), executor);
    mcp::serve(&mut server)?;
    Ok(())
}
