#![no_main]

use libfuzzer_sys::fuzz_target;
use pscore_jira::{render_comment_document, strip_assignee_placeholder, ASSIGNEE_PLACEHOLDER};

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);

    let stripped = render_comment_document(&text, None);
    assert_eq!(stripped["type"], "doc");
    let content = stripped["content"][0]["content"]
        .as_array()
        .cloned()
        .unwrap_or_default();
    assert!(content.iter().all(|node| node["type"] != "mention"));
    assert!(content
        .iter()
        .filter_map(|node| node["text"].as_str())
        .all(|run| !run.is_empty()));
    let plain = strip_assignee_placeholder(&text);
    assert_eq!(plain.trim_start(), plain);

    let mentioned = render_comment_document(&text, Some("acct-fuzz"));
    let mentions = mentioned["content"][0]["content"]
        .as_array()
        .map(|nodes| nodes.iter().filter(|node| node["type"] == "mention").count())
        .unwrap_or_default();
    assert_eq!(mentions, text.matches(ASSIGNEE_PLACEHOLDER).count());
});
