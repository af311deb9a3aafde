#![no_main]

use libfuzzer_sys::fuzz_target;
use pscore_fields::{format_number, get_assignee, get_number, get_string, is_match, FieldSet};

fuzz_target!(|data: &[u8]| {
    let raw = String::from_utf8_lossy(data);
    let Ok(value) = serde_json::from_str::<serde_json::Value>(&raw) else {
        return;
    };
    let Some(fields) = FieldSet::from_json(value) else {
        return;
    };

    for field_id in fields.field_ids() {
        if let Some(number) = get_number(&fields, field_id) {
            assert!(number.is_finite());
            assert_ne!(format_number(Some(number)), "null");
        }
        let text = get_string(&fields, field_id);
        let non_blank = text.as_deref().is_some_and(|text| !text.trim().is_empty());
        assert_eq!(is_match(text.as_deref(), text.as_deref()), non_blank);
    }
    assert_eq!(get_number(&fields, ""), None);
    assert_eq!(get_string(&fields, ""), None);
    let _ = get_assignee(&fields);
});
