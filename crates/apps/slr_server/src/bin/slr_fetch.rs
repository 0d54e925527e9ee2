use std::path::{Path, PathBuf};
use std::time::Duration;

use catalog::{rank, DatasetDescriptor};
use clap::{Parser, Subcommand};
use formats::{florida_overlay_from_str, FeatureCollection};
use layers::{InMemoryMap, LayerId};
use runtime::{Session, SessionConfig, SessionEvent};
use serde_json::json;
use slr_server::overlay::{fetch_overlay_text, http_client};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Offline tools for the LiDAR / sea-level-rise map")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch the sea-level-rise GeoJSON, keep Florida features, write the result
    Overlay {
        /// GeoJSON endpoint
        #[arg(long, env = "SLR_OVERLAY_URL")]
        url: String,

        /// Output file
        #[arg(long, default_value = "data/slr_florida.geojson")]
        out: PathBuf,

        /// Request timeout in seconds
        #[arg(long, default_value_t = 60)]
        timeout_secs: u64,
    },

    /// Filter a local GeoJSON file down to Florida features
    FilterFile {
        /// Input GeoJSON FeatureCollection
        #[arg(long)]
        input: PathBuf,

        /// Output file; defaults to stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Print dataset descriptors from a JSON array file, best first
    Rank {
        /// JSON file holding an array of dataset descriptors
        #[arg(long)]
        input: PathBuf,
    },

    /// Replay a search/load/style sequence and print the resulting layer styles
    Session {
        /// JSON file holding an array of dataset descriptors
        #[arg(long)]
        input: PathBuf,

        /// Comma-separated point layer ids the loaded dataset renders as
        #[arg(long, default_value = "lidar-points")]
        layers: String,

        /// Color scheme: elevation, intensity, classification or rgb
        #[arg(long, default_value = "elevation")]
        scheme: String,

        /// Sea-level threshold in meters
        #[arg(long, default_value_t = 1.5)]
        sea_level: f64,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match Args::parse().command {
        Command::Overlay {
            url,
            out,
            timeout_secs,
        } => fetch_overlay(&url, &out, timeout_secs).await?,
        Command::FilterFile { input, out } => filter_file(&input, out.as_deref()).await?,
        Command::Rank { input } => print_ranked(&input).await?,
        Command::Session {
            input,
            layers,
            scheme,
            sea_level,
        } => replay_session(&input, &layers, scheme, sea_level).await?,
    }

    Ok(())
}

async fn fetch_overlay(
    url: &str,
    out: &Path,
    timeout_secs: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = http_client(Duration::from_secs(timeout_secs))?;
    info!("fetching {url}");
    let payload = fetch_overlay_text(&client, url).await?;
    let overlay = florida_overlay_from_str(&payload);
    write_collection(&overlay, Some(out)).await
}

async fn filter_file(input: &Path, out: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let payload = tokio::fs::read_to_string(input).await?;
    // Unlike the server, a broken local file is a hard error.
    let all = FeatureCollection::from_geojson_str(&payload)?;
    let overlay = formats::florida_only(all);
    write_collection(&overlay, out).await
}

async fn write_collection(
    overlay: &FeatureCollection,
    out: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let text = overlay.to_geojson_string()?;
    match out {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(path, text).await?;
            info!(features = overlay.len(), "wrote {}", path.display());
        }
        None => println!("{text}"),
    }
    Ok(())
}

async fn read_descriptors(
    input: &Path,
) -> Result<Vec<DatasetDescriptor>, Box<dyn std::error::Error>> {
    let raw = tokio::fs::read_to_string(input).await?;
    Ok(serde_json::from_str(&raw)?)
}

async fn print_ranked(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let descriptors = read_descriptors(input).await?;
    for (i, d) in rank(&descriptors).into_iter().enumerate() {
        let quality = d.quality_level.as_deref().unwrap_or("-");
        println!(
            "{}\t{}\t{}\t{}",
            i + 1,
            quality,
            d.published_at().0,
            serde_json::to_string(&d.extra)?
        );
    }
    Ok(())
}

async fn replay_session(
    input: &Path,
    layers: &str,
    scheme: String,
    sea_level: f64,
) -> Result<(), Box<dyn std::error::Error>> {
    let descriptors = read_descriptors(input).await?;
    let layer_ids: Vec<LayerId> = layers
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(LayerId::from)
        .collect();

    let mut map = InMemoryMap::with_layers(layer_ids.iter().cloned());
    let mut session = Session::new(SessionConfig::default());
    let mut loaded: Option<DatasetDescriptor> = None;
    let mut loader = |d: &DatasetDescriptor| loaded = Some(d.clone());

    let events = [
        SessionEvent::SearchCompleted(descriptors),
        SessionEvent::LoadCompleted(layer_ids),
        SessionEvent::ColorSchemeSelected(scheme),
        SessionEvent::SeaLevelChanged(sea_level),
    ];
    for event in events {
        session.handle(event, &mut map, &mut loader);
    }

    let layer_styles: serde_json::Map<String, serde_json::Value> = map
        .layers()
        .map(|(id, state)| Ok((id.to_string(), serde_json::to_value(state)?)))
        .collect::<Result<_, serde_json::Error>>()?;
    let report = json!({
        "loaded": loaded,
        "style": session.state().style,
        "layers": layer_styles,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
