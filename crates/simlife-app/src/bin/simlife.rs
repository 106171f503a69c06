use std::io::{self, BufRead};
use std::path::Path;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use simlife_app::{tiles, world, App, MapboxStatic};
use simlife_common::config::SETTINGS_FILE;
use simlife_common::helpers::env_bool;
use simlife_common::Settings;
use simlife_core::FlowEvent;
use simlife_vr::{HeadlessRuntime, SimulatedRuntime, VrRuntime};

const FRAME: Duration = Duration::from_millis(16);

#[derive(Debug, Clone, Copy)]
enum Command {
    Start,
    Pause,
    Resume,
    Quit,
}

fn parse_command(line: &str) -> Option<Command> {
    match line.trim().to_ascii_lowercase().as_str() {
        "start" => Some(Command::Start),
        "pause" => Some(Command::Pause),
        "resume" => Some(Command::Resume),
        "quit" | "exit" => Some(Command::Quit),
        "" => None,
        other => {
            eprintln!("unknown command `{other}` (start | pause | resume | quit)");
            None
        }
    }
}

fn main() -> anyhow::Result<()> {
    simlife_common::init_tracing();

    let settings = Settings::load_or_create(Path::new(SETTINGS_FILE))?;

    // No real headset stack is wired in yet; SIMLIFE_SIM_VR drives the
    // whole VR path with synthesized poses.
    let runtime: Box<dyn VrRuntime> = if env_bool("SIMLIFE_SIM_VR", false) {
        Box::new(SimulatedRuntime::new(settings.user_height_m))
    } else {
        Box::new(HeadlessRuntime)
    };

    let mut app = App::new(settings, runtime);

    let world_root = app.rig().world;
    match world::load_world(app.scene_mut(), world_root, Path::new(world::WORLD_FILE)) {
        Ok(_) => {}
        Err(err) => warn!(%err, "world file unusable, starting with an empty world"),
    }

    let (command_tx, command_rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if let Some(command) = parse_command(&line) {
                        if command_tx.send(command).is_err() {
                            break;
                        }
                    }
                }
                Err(err) => {
                    eprintln!("stdin read error: {err}");
                    break;
                }
            }
        }
    });

    info!("simlife starting");
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(app, command_rx))
}

async fn run(mut app: App, mut commands: mpsc::UnboundedReceiver<Command>) -> anyhow::Result<()> {
    // Kick off the map tile fetch before the simulation starts; the
    // result is folded into the scene whenever it lands.
    let provider = MapboxStatic::new(
        app.settings().mapbox_token.clone(),
        app.settings().mapbox_style.clone(),
    );
    let (lat, lon, zoom) = (
        app.settings().start_lat,
        app.settings().start_lon,
        app.settings().zoom,
    );
    let mut tile_rx = if provider.has_token() {
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let _ = tx.send(provider.fetch(lat, lon, zoom).await);
        });
        Some(rx)
    } else {
        info!("no map token provided, skipping map tile");
        None
    };

    let mut interval = tokio::time::interval(FRAME);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;

        let tile_done = if let Some(rx) = tile_rx.as_mut() {
            match rx.try_recv() {
                Ok(result) => {
                    let world_root = app.rig().world;
                    tiles::attach_map_tile(app.scene_mut(), world_root, result);
                    true
                }
                Err(oneshot::error::TryRecvError::Empty) => false,
                Err(oneshot::error::TryRecvError::Closed) => true,
            }
        } else {
            false
        };
        if tile_done {
            tile_rx = None;
        }

        while let Ok(command) = commands.try_recv() {
            match command {
                Command::Start => app.submit(FlowEvent::StartSelected),
                Command::Pause => app.submit(FlowEvent::MenuToggled),
                Command::Resume => app.submit(FlowEvent::ResumeSelected),
                Command::Quit => app.submit(FlowEvent::QuitRequested),
            }
        }

        app.tick(FRAME);

        if app.exit_requested() {
            break;
        }
    }

    info!("simlife exiting");
    Ok(())
}
