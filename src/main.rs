use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Arg, Command};
use directories::ProjectDirs;
use log::LevelFilter;
use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode, WriteLogger};
use tokio::net::TcpListener;

use blackanchor::config::GameConfig;
use blackanchor::data::{Catalog, CatalogLoader, JsonDirectoryCatalogLoader};
use blackanchor::game::{ControlMessage, GameWorld};
use blackanchor::WorldContext;

/// Platform-appropriate catalog directory used when `--catalog` points at nothing on disk
/// (mirrors the teacher's `LOCAL_STORAGE_DIR`, which anchors its own data directories off
/// `ProjectDirs::from("", "", "rose-offline")`).
fn platform_catalog_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "blackanchor").map(|dirs| dirs.data_local_dir().join("catalog"))
}

fn init_logging(log_path: &str) -> anyhow::Result<()> {
    CombinedLogger::init(vec![
        TermLogger::new(
            LevelFilter::Info,
            Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ),
        WriteLogger::new(LevelFilter::Debug, Config::default(), File::create(log_path)?),
    ])?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = Command::new("blackanchor-server")
        .about("Combat and world-simulation core for a tick-driven text world")
        .arg(
            Arg::new("catalog")
                .long("catalog")
                .takes_value(true)
                .default_value("catalog")
                .help("directory of catalog JSON files (rooms/npcs/items/shops/...)"),
        )
        .arg(
            Arg::new("bind")
                .long("bind")
                .takes_value(true)
                .default_value("127.0.0.1:6900")
                .help("address the session acceptor listens on"),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .takes_value(true)
                .default_value("server.log"),
        )
        .arg(
            Arg::new("tick-rate")
                .long("tick-rate")
                .takes_value(true)
                .default_value("10")
                .help("combat ticker pulses per second (§5: must be >= 10 Hz)"),
        )
        .get_matches();

    init_logging(matches.value_of("log-file").unwrap())?;

    let mut catalog_dir = PathBuf::from(matches.value_of("catalog").unwrap());
    if !catalog_dir.is_dir() {
        if let Some(platform_dir) = platform_catalog_dir().filter(|dir| dir.is_dir()) {
            log::info!("{catalog_dir:?} not found; falling back to {platform_dir:?}");
            catalog_dir = platform_dir;
        }
    }
    let catalog: Catalog = match JsonDirectoryCatalogLoader::new(&catalog_dir).load() {
        Ok(catalog) => catalog,
        Err(err) => {
            log::warn!("failed to load catalog from {catalog_dir:?} ({err:#}); starting with an empty catalog");
            Catalog::default()
        }
    };
    log::info!(
        "loaded catalog: {} rooms, {} npcs, {} items",
        catalog.rooms.len(),
        catalog.npcs.len(),
        catalog.items.len()
    );

    let config = GameConfig::from_env();
    let ctx = Arc::new(WorldContext::new(catalog, config));

    let tick_rate: u64 = matches
        .value_of("tick-rate")
        .and_then(|v| v.parse().ok())
        .unwrap_or(10)
        .max(10);

    let (control_tx, control_rx) = crossbeam_channel::unbounded::<ControlMessage>();

    let game_ctx = ctx.clone();
    std::thread::spawn(move || {
        GameWorld::new(tick_rate, control_rx).run(game_ctx);
    });

    // The transport/auth/session-admission framing this accepts on is out of scope (§1): a
    // real session handler would clone `control_tx` per connection and send `RoomTouched`/
    // `AttackCommand` into it on `move`/`attack`. This acceptor only proves the bind/accept
    // loop runs; `control_tx` is kept alive so the game thread's channel isn't immediately
    // orphaned.
    let _control_tx = control_tx;
    let bind_addr = matches.value_of("bind").unwrap();
    let listener = TcpListener::bind(bind_addr).await?;
    log::info!("listening on {bind_addr} (session protocol out of scope for this core)");

    loop {
        let (socket, peer_addr) = listener.accept().await?;
        log::debug!("accepted connection from {peer_addr}, closing (no protocol wired up)");
        drop(socket);
    }
}
