use anyhow::Result;
use local_rag::cli::{self, INGEST_USAGE};
use local_rag::{build_rag_service, load_config, CollectionMode, RagService};

#[tokio::main]
async fn main() -> Result<()> {
    cli::init_logging();

    let args = cli::parse_ingest_args(std::env::args().skip(1))?;
    if args.help {
        println!("{}", INGEST_USAGE);
        return Ok(());
    }

    let config = load_config()?;
    log::debug!("Configuration loaded: {:?}", config);

    let mode = if args.reset {
        CollectionMode::Reset
    } else {
        CollectionMode::Keep
    };
    let service = build_rag_service(&config, mode).await?;

    let report = service.ingest(&config.ingest.input_path).await?;
    log::info!(
        "Ingested {} document(s) as {} chunks; collection '{}' now holds {} records.",
        report.documents,
        report.chunks,
        config.vector_store.collection_name,
        report.stored_records
    );
    Ok(())
}
