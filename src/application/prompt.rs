use crate::domain::document::SearchResult;

/// Stuff-documents prompt: every retrieved chunk is pasted into a single prompt.
pub const RAG_PROMPT_TEMPLATE: &str = "Use the following pieces of context to answer the question at the end. \
If you don't know the answer, just say that you don't know, don't try to make up an answer.

{context}

Question: {question}
Helpful Answer:";

/// Joins retrieved chunks with blank lines, best match first.
pub fn format_context(results: &[SearchResult]) -> String {
    results
        .iter()
        .map(|r| r.content_chunk.trim())
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn build_prompt(question: &str, results: &[SearchResult]) -> String {
    RAG_PROMPT_TEMPLATE
        .replace("{context}", &format_context(results))
        .replace("{question}", question.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(text: &str) -> SearchResult {
        SearchResult {
            source: "data/document.txt".to_string(),
            chunk_index: 0,
            content_chunk: text.to_string(),
            score: 0.9,
        }
    }

    #[test]
    fn test_build_prompt_includes_context_and_question() {
        let prompt = build_prompt(
            " Who is the captain? ",
            &[result("Ahab is the captain.\n"), result("The ship is the Pequod.")],
        );
        assert!(prompt.starts_with("Use the following pieces of context"));
        assert!(prompt.contains("Ahab is the captain.\n\nThe ship is the Pequod."));
        assert!(prompt.ends_with("Question: Who is the captain?\nHelpful Answer:"));
    }

    #[test]
    fn test_build_prompt_with_no_context() {
        let prompt = build_prompt("Anything?", &[]);
        assert!(!prompt.contains("{context}"));
        assert!(prompt.contains("Question: Anything?"));
    }
}
