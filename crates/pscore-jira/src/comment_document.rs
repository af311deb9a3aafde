//! Atlassian Document Format rendering for score comments.

use serde_json::{json, Value};

pub const ASSIGNEE_PLACEHOLDER: &str = "[assignee]";

/// Builds an ADF document for `text`, turning each `[assignee]` placeholder into a
/// mention of `assignee_account_id`. Without an account id the placeholder is
/// stripped instead.
pub fn render_comment_document(text: &str, assignee_account_id: Option<&str>) -> Value {
    let account_id = assignee_account_id
        .map(str::trim)
        .filter(|account_id| !account_id.is_empty());
    let mut content = Vec::new();
    match account_id {
        Some(account_id) => {
            for (index, segment) in text.split(ASSIGNEE_PLACEHOLDER).enumerate() {
                if index > 0 {
                    content.push(json!({
                        "type": "mention",
                        "attrs": { "id": account_id }
                    }));
                }
                push_text_nodes(&mut content, segment);
            }
        }
        None => push_text_nodes(&mut content, &strip_assignee_placeholder(text)),
    }
    json!({
        "type": "doc",
        "version": 1,
        "content": [{
            "type": "paragraph",
            "content": content
        }]
    })
}

pub fn strip_assignee_placeholder(text: &str) -> String {
    text.replace(ASSIGNEE_PLACEHOLDER, "")
        .trim_start()
        .to_string()
}

/// Plain-text form of a comment for logs: the display name replaces the placeholder.
pub fn substitute_assignee_placeholder(text: &str, display_name: Option<&str>) -> String {
    match display_name
        .map(str::trim)
        .filter(|display_name| !display_name.is_empty())
    {
        Some(display_name) => text.replace(ASSIGNEE_PLACEHOLDER, display_name),
        None => strip_assignee_placeholder(text),
    }
}

fn push_text_nodes(content: &mut Vec<Value>, segment: &str) {
    for (index, line) in segment.split('\n').enumerate() {
        if index > 0 {
            content.push(json!({ "type": "hardBreak" }));
        }
        if !line.is_empty() {
            content.push(json!({ "type": "text", "text": line }));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        render_comment_document, strip_assignee_placeholder, substitute_assignee_placeholder,
    };
    use serde_json::json;

    #[test]
    fn unit_render_comment_document_emits_mention_for_placeholder() {
        let document = render_comment_document(
            "[assignee] updated priority from 2 to 3",
            Some("5b10ac8d82e05b22cc7d4ef5"),
        );
        assert_eq!(
            document,
            json!({
                "type": "doc",
                "version": 1,
                "content": [{
                    "type": "paragraph",
                    "content": [
                        {"type": "mention", "attrs": {"id": "5b10ac8d82e05b22cc7d4ef5"}},
                        {"type": "text", "text": " updated priority from 2 to 3"}
                    ]
                }]
            })
        );
    }

    #[test]
    fn functional_render_comment_document_strips_placeholder_without_account() {
        let document = render_comment_document("[assignee] updated priority from null to 5", None);
        assert_eq!(
            document["content"][0]["content"],
            json!([{"type": "text", "text": "updated priority from null to 5"}])
        );

        let blank = render_comment_document("[assignee] updated", Some("   "));
        assert_eq!(
            blank["content"][0]["content"],
            json!([{"type": "text", "text": "updated"}])
        );
    }

    #[test]
    fn functional_render_comment_document_converts_newlines_to_hard_breaks() {
        let document = render_comment_document("line one\nline two", None);
        assert_eq!(
            document["content"][0]["content"],
            json!([
                {"type": "text", "text": "line one"},
                {"type": "hardBreak"},
                {"type": "text", "text": "line two"}
            ])
        );
    }

    #[test]
    fn regression_render_comment_document_handles_repeated_placeholders() {
        let document = render_comment_document("[assignee] please check, [assignee]", Some("abc"));
        let content = document["content"][0]["content"]
            .as_array()
            .expect("paragraph content");
        assert_eq!(content.len(), 3);
        assert_eq!(content[0]["type"], "mention");
        assert_eq!(content[1]["text"], " please check, ");
        assert_eq!(content[2]["type"], "mention");
    }

    #[test]
    fn unit_substitute_assignee_placeholder_uses_display_name_or_strips() {
        assert_eq!(
            substitute_assignee_placeholder("[assignee] updated", Some("Ada Lovelace")),
            "Ada Lovelace updated"
        );
        assert_eq!(substitute_assignee_placeholder("[assignee] updated", None), "updated");
        assert_eq!(strip_assignee_placeholder("  [assignee]  done"), "done");
    }
}
