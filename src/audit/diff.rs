//! Field-level change summaries for audit entries

use serde_json::Value;

/// Bookkeeping fields that change on every update
const IGNORED_FIELDS: &[&str] = &["updated_at"];

/// Describe which top-level fields differ between two snapshots
///
/// Returns `None` when nothing of interest changed.
pub fn summarize_changes(before: &Value, after: &Value) -> Option<String> {
    let (Value::Object(before), Value::Object(after)) = (before, after) else {
        return (before != after).then(|| format!("{} -> {}", render(before), render(after)));
    };

    let mut changes = Vec::new();
    for (key, old) in before {
        if IGNORED_FIELDS.contains(&key.as_str()) {
            continue;
        }
        match after.get(key) {
            Some(new) if new != old => {
                changes.push(format!("{}: {} -> {}", key, render(old), render(new)))
            }
            Some(_) => {}
            None => changes.push(format!("{}: {} -> (none)", key, render(old))),
        }
    }
    for (key, new) in after {
        if !before.contains_key(key) && !IGNORED_FIELDS.contains(&key.as_str()) {
            changes.push(format!("{}: (none) -> {}", key, render(new)));
        }
    }

    (!changes.is_empty()).then(|| changes.join(", "))
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) if s.chars().count() > 40 => {
            let head: String = s.chars().take(37).collect();
            format!("\"{}...\"", head)
        }
        Value::Array(items) => format!("[{} items]", items.len()),
        Value::Object(fields) => format!("{{{} fields}}", fields.len()),
        other => other.to_string(),
    }
}
