use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use log::LevelFilter;

use crate::models::Coordinates;

mod advisor;
mod api;
mod app;
mod location;
mod models;
mod price;
mod storage;
mod store;
mod ui;

/// Terminal fuel price advisor: alcohol or gasoline?
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Opt {
    /// Logging level
    #[clap(long, default_value = "error")]
    level: LevelFilter,

    /// Log file path (for debugging)
    #[clap(long, default_value = ".tfuel.log")]
    log_file: String,

    /// SQLite database path [default: <data dir>/tfuel/tfuel.db]
    #[clap(long)]
    db_path: Option<String>,

    /// Reverse geocoding service address
    #[clap(long, default_value = "https://nominatim.openstreetmap.org")]
    geocoder_url: String,

    /// Current position as LAT,LON, enables Ctrl-l on the location field
    #[clap(long, allow_hyphen_values = true)]
    position: Option<Coordinates>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let opt = Opt::parse();

    let log_file = fs::File::create(&opt.log_file).context("can't open log file")?;

    simplelog::WriteLogger::init(opt.level, simplelog::Config::default(), log_file)
        .context("init logger")?;

    let db_path = match opt.db_path {
        Some(path) => path,
        None => default_db_path()?,
    };

    log::info!("using database {}", db_path);

    let storage = storage::Sqlite::new(&db_path).await?;
    let geocoder = api::Nominatim::new(&opt.geocoder_url)?;
    let locator = location::Locator::new(
        Arc::new(location::FixedPosition::new(opt.position)),
        Arc::new(geocoder),
    );

    let mut app = app::App::new(storage, locator);
    app.load().await;

    ui::Ui::new(app).start().await
}

fn default_db_path() -> anyhow::Result<String> {
    let Some(data_dir) = dirs::data_dir() else {
        return Ok("tfuel.db".to_string());
    };

    let dir: PathBuf = data_dir.join("tfuel");
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;

    Ok(dir.join("tfuel.db").to_string_lossy().into_owned())
}
