//! Service entry point: wire configuration, storage, mail, and the intake
//! pipeline, then run the scheduling loop until Ctrl-C.

use anyhow::Result;
use specmon_core::Folder;
use tracing::info;

use specmon_service::config::Settings;
use specmon_service::dirsetup;
use specmon_service::mailer::Mailer;
use specmon_service::pdf::PdfTextSource;
use specmon_service::pipeline::IntakePipeline;
use specmon_service::store::SpecStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("specmon_service=info".parse()?)
                .add_directive("specmon_core=info".parse()?),
        )
        .init();

    let settings = Settings::from_env()?;
    info!("starting spec monitoring service");

    dirsetup::ensure_directories_exist(&[
        settings.ongoing_dir.as_path(),
        settings.approved_dir.as_path(),
        settings.approved_csv_dir.as_path(),
    ])?;

    let store = SpecStore::connect(&settings.database_url).await?;
    let mailer = Mailer::new(&settings.email)?;
    let mut pipeline = IntakePipeline::new(&settings, store, PdfTextSource, mailer).await?;

    for folder in Folder::ALL {
        let records = pipeline.store().list_records(folder).await?;
        info!(%folder, count = records.len(), "records already on file");
    }

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown requested");
            let _ = shutdown_tx.send(true);
        }
    });

    pipeline.run(settings.poll_interval, shutdown_rx).await;
    info!("shut down cleanly");
    Ok(())
}
