use anyhow::Result;
use local_rag::cli::{self, ASK_USAGE};
use local_rag::{build_rag_service, load_config, CollectionMode, RagService};

#[tokio::main]
async fn main() -> Result<()> {
    cli::init_logging();

    let args = cli::parse_ask_args(std::env::args().skip(1))?;
    if args.help {
        println!("{}", ASK_USAGE);
        return Ok(());
    }

    let config = load_config()?;
    log::debug!("Configuration loaded: {:?}", config);

    let question = args.question_or(&config.ask.default_question);
    log::info!("Question: {}", question);

    let service = build_rag_service(&config, CollectionMode::Keep).await?;
    let answer = service.ask(question).await?;

    println!("{}", answer.answer);
    if args.show_sources {
        println!("\n--- Sources ---\n{}", cli::format_sources(&answer.context));
    }
    Ok(())
}
