use clap::Parser;
use flux_config::ConfigLoader;
use flux_ingest::Importer;
use flux_timeseries::SqlStore;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about = "Import device telemetry JSON files into the point store", long_about = None)]
struct Args {
    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Data directory containing gateways/ and sensors/
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Store database URL
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = ConfigLoader::new(&args.config).load()?;
    if let Some(data_dir) = args.data_dir {
        config.import.data_dir = data_dir;
    }
    if let Some(url) = args.database_url {
        config.store.url = url;
    }
    config.validate()?;

    // 初始化日志
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let store = SqlStore::connect(&config.store.url).await?;
    store.ensure_schema().await?;

    let importer = Importer::new(Arc::new(store), &config.import.data_dir)
        .with_batch_size(config.store.batch_size);

    let summary = match importer.run().await {
        Ok(summary) => summary,
        Err(e) => {
            tracing::error!(error = %e, "Import failed");
            return Err(e.into());
        }
    };

    for report in &summary.files {
        let name = report
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        println!("{}/{:<20} -> {} points written", report.category.folder(), name, report.points);
    }
    for folder in &summary.missing_folders {
        println!("Folder not found: {}", folder.display());
    }

    println!("{}", "=".repeat(50));
    println!("Import complete!");
    println!("Files processed: {}", summary.total_files());
    println!("Total points:    {}", summary.total_points);
    println!("{}", "=".repeat(50));

    Ok(())
}
