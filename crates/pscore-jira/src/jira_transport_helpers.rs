use reqwest::header::{HeaderMap, AUTHORIZATION, PROXY_AUTHORIZATION};

pub const REDACTED_HEADER_VALUE: &str = "<redacted>";

pub fn truncate_for_error(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut truncated = text.chars().take(max_chars).collect::<String>();
    truncated.push_str("...");
    truncated
}

/// Renders headers as `name: value` pairs with credentials redacted.
pub fn render_headers_redacted(headers: &HeaderMap) -> String {
    headers
        .iter()
        .map(|(name, value)| {
            let rendered = if *name == AUTHORIZATION || *name == PROXY_AUTHORIZATION {
                REDACTED_HEADER_VALUE
            } else {
                value.to_str().unwrap_or("<binary>")
            };
            format!("{}: {}", name.as_str(), rendered)
        })
        .collect::<Vec<_>>()
        .join(", ")
}
