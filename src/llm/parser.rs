//! Response parsing for LLM outputs.
//!
//! The generation prompt asks for SQL only, but models wrap answers in
//! markdown fences or add commentary anyway. This module recovers the SQL
//! text from whatever came back.

/// Extracts the SQL statement from an LLM response.
///
/// Preference order: a ```sql fenced block, then a bare ``` fenced block,
/// then the whole trimmed response (the prompt demands SQL-only output, so
/// unfenced text is taken as the statement itself).
pub fn extract_sql(response: &str) -> String {
    if let Some(sql) = fenced_block(response, "sql") {
        return sql;
    }
    if let Some(sql) = fenced_block(response, "") {
        return sql;
    }
    response.trim().to_string()
}

/// Returns the content of the first fenced code block with the given
/// language tag. An empty `lang` matches only blocks with no tag.
fn fenced_block(text: &str, lang: &str) -> Option<String> {
    let fence = format!("```{lang}");
    let mut search_from = 0;

    while let Some(offset) = text[search_from..].find(&fence) {
        let start = search_from + offset;
        let after_fence = start + fence.len();

        let newline = text[after_fence..].find('\n')?;
        let tag = &text[after_fence..after_fence + newline];

        // A bare ``` followed by a language tag belongs to some other
        // block; keep scanning.
        if lang.is_empty() && !tag.trim().is_empty() {
            search_from = after_fence + newline;
            continue;
        }

        let content_start = after_fence + newline + 1;
        let end = text[content_start..].find("```")?;
        return Some(text[content_start..content_start + end].trim().to_string());
    }

    None
}
