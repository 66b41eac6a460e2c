//! Crabe Skipper CLI
//!
//! Wires the desktop collaborators to the skipper core: resolves the screen
//! resolution, starts the overlay, the action loop and the hotkey listener,
//! and runs the control state machine on the main thread.

use std::error::Error;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::Parser;
use crossbeam_channel::{bounded, unbounded, RecvTimeoutError};

use crabe_skipper::config::setup::{environment_resolution, parse_resolution_pair};
use crabe_skipper::config::{ResolutionSources, ScreenSetup, Settings, SETTINGS_FILE};
use crabe_skipper::control::hotkey::spawn_listener;
use crabe_skipper::control::{Controller, HotkeyAction, Keymap, SkipperContext};
use crabe_skipper::desktop::{
    detect_primary_resolution, DesktopPointer, DesktopWindows, ScreenCapturer,
};
use crabe_skipper::overlay::ConsoleOverlay;
use crabe_skipper::skipper::{ActionLoop, LoopConfig};
use crabe_skipper::stealth::{Humanizer, StealthConfig};
use crabe_skipper::ScreenGeometry;

/// Control poll granularity; also bounds how long an exit takes to notice
const CONTROL_POLL: Duration = Duration::from_millis(500);

#[derive(Parser, Debug)]
#[command(name = "crabe", version, about = "Automatically skips Genshin Impact dialogue")]
struct Cli {
    /// Settings file
    #[arg(long, default_value = SETTINGS_FILE)]
    config: PathBuf,

    /// Screen width in pixels
    #[arg(long, requires = "height")]
    width: Option<u32>,

    /// Screen height in pixels
    #[arg(long, requires = "width")]
    height: Option<u32>,

    /// Title of the game window
    #[arg(long)]
    target: Option<String>,

    /// Never move the cursor between clicks
    #[arg(long)]
    no_jitter: bool,

    /// Detect and confirm the resolution again
    #[arg(long)]
    reconfigure: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    if let Err(e) = run(cli) {
        log::error!("An error occurred: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    println!("Welcome to Crabe Dialogue Skipper");
    println!();

    let mut settings = Settings::load(&cli.config)?;
    if let Some(target) = cli.target {
        settings.target_window = target;
    }
    if cli.no_jitter {
        settings.stealth = StealthConfig::disabled();
    }
    settings.validate()?;

    let width = cli.width.map(|w| w.to_string());
    let height = cli.height.map(|h| h.to_string());
    let sources = ResolutionSources {
        command_line: parse_resolution_pair(width.as_deref(), height.as_deref())?,
        environment: environment_resolution()?,
        reconfigure: cli.reconfigure,
    };
    let stdin = io::stdin();
    let mut setup = ScreenSetup::new(stdin.lock(), io::stdout());
    let (resolution, origin) =
        setup.resolve(&mut settings, sources, detect_primary_resolution)?;
    drop(setup);
    if origin.should_persist() {
        settings.save(&cli.config)?;
    }

    let keymap = Keymap::from_bindings(&settings.hotkeys)?;
    let geometry = ScreenGeometry::new(resolution);
    log::debug!("Probe geometry: {:?}", geometry);

    let (overlay, overlay_thread) =
        ConsoleOverlay::spawn(settings.hotkeys.clone(), &settings.timings)?;
    let context = SkipperContext::new(Arc::new(overlay.clone()));

    let interrupt_context = context.clone();
    ctrlc::set_handler(move || {
        log::info!("Interrupted");
        interrupt_context.request_exit();
    })?;

    // action loop
    let (done_tx, done_rx) = bounded::<()>(1);
    let loop_context = context.clone();
    let loop_config = LoopConfig {
        geometry,
        target_window: settings.target_window.clone(),
        timings: settings.timings.clone(),
    };
    let stealth = settings.stealth.clone();
    let loop_thread = thread::Builder::new()
        .name("action-loop".into())
        .spawn(move || {
            let result = DesktopPointer::new().map(|pointer| {
                let mut action_loop = ActionLoop::new(
                    loop_context.clone(),
                    loop_config,
                    ScreenCapturer::new(),
                    pointer,
                    DesktopWindows::new(),
                    Humanizer::new(stealth),
                );
                action_loop.run();
            });
            if let Err(e) = &result {
                log::error!("Action loop could not start: {}", e);
                loop_context.request_exit();
            }
            let _ = done_tx.send(());
            result
        })?;

    // hotkeys
    let (hotkey_tx, hotkey_rx) = unbounded();
    let _listener = spawn_listener(keymap, hotkey_tx)?;

    let bindings = &settings.hotkeys;
    println!("-------------");
    println!("{} to start", bindings.start);
    println!("{} to pause", bindings.pause);
    println!("{} to quit", bindings.exit);
    println!("{} for help", bindings.help);
    println!("-------------");

    let mut controller = Controller::new(
        context.clone(),
        DesktopWindows::new(),
        settings.target_window.clone(),
    );
    while !context.state.is_exiting() {
        match hotkey_rx.recv_timeout(CONTROL_POLL) {
            Ok(action) => {
                controller.handle(action);
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                log::error!("Hotkey listener stopped, closing the program");
                controller.handle(HotkeyAction::Exit);
            }
        }
    }
    drop(hotkey_rx);

    let timeout = Duration::from_millis(settings.timings.shutdown_timeout_ms);
    let outcome = match done_rx.recv_timeout(timeout) {
        Ok(()) => loop_thread.join().unwrap_or(Ok(())),
        Err(_) => {
            log::warn!("Action loop did not stop within {:?}", timeout);
            Ok(())
        }
    };

    overlay.shutdown();
    let _ = overlay_thread.join();
    outcome.map_err(Into::into)
}
