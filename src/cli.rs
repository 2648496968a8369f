//! Argument handling and output shared by the `ingest` and `ask` binaries.

use anyhow::{bail, Result};

use crate::domain::document::SearchResult;

pub const INGEST_USAGE: &str = "Usage: ingest [--reset]

Splits the configured input file into chunks, embeds them and stores them in the vector database.

Options:
  --reset    drop and recreate the collection before ingesting
  -h, --help print this help";

pub const ASK_USAGE: &str = "Usage: ask [--show-sources] [question...]

Answers a question using the chunks stored by `ingest`. Without a question the configured default is asked.

Options:
  --show-sources  also print the retrieved chunks
  -h, --help      print this help";

/// Logs go to stderr so that stdout only carries program output.
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct IngestArgs {
    pub reset: bool,
    pub help: bool,
}

pub fn parse_ingest_args<I>(args: I) -> Result<IngestArgs>
where
    I: IntoIterator<Item = String>,
{
    let mut parsed = IngestArgs::default();
    for arg in args {
        match arg.as_str() {
            "--reset" => parsed.reset = true,
            "-h" | "--help" => parsed.help = true,
            other => bail!("unexpected argument '{}'\n\n{}", other, INGEST_USAGE),
        }
    }
    Ok(parsed)
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct AskArgs {
    pub show_sources: bool,
    pub help: bool,
    /// Free-text words joined with single spaces, `None` when no words were given.
    pub question: Option<String>,
}

impl AskArgs {
    /// The question to ask, falling back to `default` when none (or only whitespace) was given.
    pub fn question_or<'a>(&'a self, default: &'a str) -> &'a str {
        match self.question.as_deref().map(str::trim) {
            Some(q) if !q.is_empty() => q,
            _ => default,
        }
    }
}

pub fn parse_ask_args<I>(args: I) -> Result<AskArgs>
where
    I: IntoIterator<Item = String>,
{
    let mut parsed = AskArgs::default();
    let mut words: Vec<String> = Vec::new();
    let mut options_done = false;

    for arg in args {
        if !options_done {
            match arg.as_str() {
                "--show-sources" => {
                    parsed.show_sources = true;
                    continue;
                }
                "-h" | "--help" => {
                    parsed.help = true;
                    continue;
                }
                "--" => {
                    options_done = true;
                    continue;
                }
                other if other.starts_with("--") => {
                    bail!("unexpected option '{}'\n\n{}", other, ASK_USAGE)
                }
                _ => {}
            }
        }
        words.push(arg);
    }

    if !words.is_empty() {
        parsed.question = Some(words.join(" "));
    }
    Ok(parsed)
}

/// Renders retrieved chunks for `ask --show-sources`.
pub fn format_sources(results: &[SearchResult]) -> String {
    if results.is_empty() {
        return "No sources retrieved.".to_string();
    }
    results
        .iter()
        .enumerate()
        .map(|(i, r)| {
            format!(
                "[{}] {} #{} (score {:.3})\n{}",
                i + 1,
                r.source,
                r.chunk_index,
                r.score,
                r.content_chunk.trim()
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
