//! Prompt templates for extraction and grounded answer generation

use crate::types::{Metadata, SearchResult};

/// Fields the extraction model is allowed to emit
const EXTRACTION_FIELDS: &[&str] = &[
    "name",
    "full_name",
    "aliases",
    "location",
    "email",
    "role",
    "profession",
    "skills",
    "technologies",
    "organizations",
    "websites",
    "social_profiles",
    "topics",
    "specializations",
    "achievements",
    "projects",
    "summary",
];

/// System instruction for structured metadata extraction
pub fn extraction_system_prompt() -> String {
    format!(
        "You extract structured metadata from documents. Return a JSON object \
         using only these fields: {}. Include a field ONLY when the document \
         contains explicit textual support for it. Use strings, arrays of \
         strings, or nested objects as appropriate. If nothing can be \
         extracted, return an empty JSON object {{}}. Do not invent or infer \
         information.",
        EXTRACTION_FIELDS.join(", ")
    )
}

/// System instruction for grounded answer generation
pub fn grounding_system_prompt() -> String {
    "You answer questions using ONLY the supplied context sections. \
     Cite the sections you rely on as [Source N]. If the context does not \
     fully answer the question, say so explicitly rather than guessing. \
     Structure complex answers with lists."
        .to_string()
}

/// Metadata fields surfaced in the context block alongside each chunk
const CONTEXT_METADATA_FIELDS: &[&str] = &["name", "location", "role", "skills"];

/// Build the labeled context block from retrieved results, in ranked order
pub fn build_context_block(results: &[SearchResult]) -> String {
    let mut block = String::new();

    for (i, result) in results.iter().enumerate() {
        let filename = result
            .metadata
            .get("source_filename")
            .and_then(|v| v.as_text())
            .unwrap_or("unknown");

        block.push_str(&format!(
            "[Source {}: {} ({:.1}%)]\n{}\n",
            i + 1,
            filename,
            result.similarity * 100.0,
            result.content
        ));

        let details = metadata_lines(&result.metadata);
        if !details.is_empty() {
            block.push_str(&details);
        }

        block.push('\n');
    }

    block
}

/// Selected metadata rendered as "key: value" lines
fn metadata_lines(metadata: &Metadata) -> String {
    let mut lines = String::new();

    for field in CONTEXT_METADATA_FIELDS {
        if let Some(value) = metadata.get(field) {
            let rendered = match value {
                crate::types::MetadataValue::Text(s) => s.clone(),
                crate::types::MetadataValue::List(items) => items.join(", "),
                crate::types::MetadataValue::Integer(n) => n.to_string(),
                crate::types::MetadataValue::Map(_) => continue,
            };
            lines.push_str(&format!("{}: {}\n", field, rendered));
        }
    }

    if let (Some(number), Some(total)) = (
        metadata.get("chunk_number").and_then(|v| v.as_integer()),
        metadata.get("total_chunks").and_then(|v| v.as_integer()),
    ) {
        lines.push_str(&format!("chunk: {}/{}\n", number, total));
    }

    lines
}

/// Build the user message: context block followed by the question
pub fn build_user_prompt(context_block: &str, question: &str) -> String {
    format!(
        "CONTEXT:\n{}\nQUESTION: {}\n\nAnswer using only the context above.",
        context_block, question
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(filename: &str, similarity: f32) -> SearchResult {
        let mut metadata = Metadata::single("source_filename", filename);
        metadata.insert("name", "Ada Lovelace");
        metadata.insert("chunk_number", 1i64);
        metadata.insert("total_chunks", 2i64);
        SearchResult {
            id: "1".to_string(),
            content: "chunk content".to_string(),
            metadata,
            similarity,
        }
    }

    #[test]
    fn context_block_labels_sources_in_rank_order() {
        let results = vec![result("a.txt", 0.923), result("b.txt", 0.541)];
        let block = build_context_block(&results);

        assert!(block.contains("[Source 1: a.txt (92.3%)]"));
        assert!(block.contains("[Source 2: b.txt (54.1%)]"));
        assert!(block.contains("chunk content"));
        assert!(block.contains("name: Ada Lovelace"));
        assert!(block.contains("chunk: 1/2"));
        assert!(block.find("Source 1").unwrap() < block.find("Source 2").unwrap());
    }

    #[test]
    fn extraction_prompt_names_every_recognized_field() {
        let prompt = extraction_system_prompt();
        for field in EXTRACTION_FIELDS {
            assert!(prompt.contains(field), "missing field {}", field);
        }
        assert!(prompt.contains("empty JSON object"));
    }
}
