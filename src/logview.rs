//! HTML rendering of the intake history for `GET /logs`.

use std::fmt::Write;
use std::sync::Arc;

use crate::platform::EventRecord;

/// Message text longer than this many characters is cut in the summary line.
pub const SUMMARY_TEXT_LIMIT: usize = 140;

const REFRESH_SECS: u32 = 10;

const STYLE: &str = r#"
    body { font-family: ui-sans-serif, system-ui, -apple-system, Segoe UI, Roboto, Arial; background:#0b0c10; color:#e8edf2; margin:0; }
    .wrap { max-width: 980px; margin: 24px auto; padding: 0 16px; }
    h1 { margin: 0 0 8px; }
    .meta { color:#9aa5b1; margin-bottom: 18px; }
    details { background:#11141a; border:1px solid #232730; border-radius:12px; padding:12px 14px; margin:10px 0; }
    summary { cursor:pointer; outline:none; }
    pre { overflow:auto; background:#0e1116; padding:12px; border-radius:10px; }
    .topbar a { color:#22c55e; text-decoration:none; }
    .topbar { display:flex; gap:12px; align-items:center; margin-bottom:10px; }
    .pill { background:#14321f; border:1px solid #1f6138; color:#bfe8c9; padding:4px 8px; border-radius:999px; font-size:12px; }
"#;

/// Escape text for use in HTML element content and attribute values.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Cut `text` to `limit` characters, appending `…` when anything was dropped.
pub fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((byte_idx, _)) => format!("{}…", &text[..byte_idx]),
        None => text.to_string(),
    }
}

/// One-line summary shown in the collapsed entry (unescaped).
pub fn summary_line(position: usize, record: &EventRecord) -> String {
    let chat = record
        .chat_id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "-".to_string());
    let user = record.sender_display().unwrap_or_else(|| "-".to_string());
    let text = match record.text.as_deref() {
        Some(t) if !t.is_empty() => truncate(t, SUMMARY_TEXT_LIMIT),
        _ => "(no text)".to_string(),
    };
    format!(
        "[{:03}] {} | chat={} | user={} | {}",
        position,
        record.timestamp_iso(),
        chat,
        user,
        text
    )
}

fn pretty_payload(record: &EventRecord) -> String {
    serde_json::to_string_pretty(&*record.raw_payload).unwrap_or_else(|_| "{}".to_string())
}

/// Render the full page. `records` must already be newest first.
pub fn render_page(records: &[Arc<EventRecord>]) -> String {
    let mut rows = String::new();
    for (i, record) in records.iter().enumerate() {
        let _ = write!(
            rows,
            r#"
      <details>
        <summary>{}</summary>
        <pre>{}</pre>
      </details>"#,
            escape_html(&summary_line(i + 1, record)),
            escape_html(&pretty_payload(record)),
        );
    }
    if rows.is_empty() {
        rows.push_str(r#"<div class="meta">No messages yet…</div>"#);
    }

    let count = records.len();
    format!(
        r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Telegram logs</title>
  <meta http-equiv="refresh" content="{REFRESH_SECS}">
  <style>{STYLE}  </style>
</head>
<body>
  <div class="wrap">
    <div class="topbar">
      <h1>Telegram logs</h1>
      <span class="pill">last {count} messages</span>
      <a class="pill" href="/telegram">/telegram</a>
      <a class="pill" href="/">/</a>
    </div>
    <div class="meta">Refreshes every {REFRESH_SECS}s. Click an entry to see the full JSON.</div>
    {rows}
  </div>
</body>
</html>
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::telegram::extract_event;
    use serde_json::{json, Value};

    fn record(value: Value) -> Arc<EventRecord> {
        Arc::new(extract_event(value.as_object().cloned().unwrap()))
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<script>alert("x") & 'y'</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;) &amp; &#x27;y&#x27;&lt;/script&gt;"
        );
    }

    #[test]
    fn test_truncate_short_text_unchanged() {
        assert_eq!(truncate("oi", 140), "oi");
        let exact = "a".repeat(140);
        assert_eq!(truncate(&exact, 140), exact);
    }

    #[test]
    fn test_truncate_long_text_gets_ellipsis() {
        let long = "b".repeat(141);
        let cut = truncate(&long, 140);
        assert_eq!(cut.chars().count(), 141);
        assert!(cut.ends_with("b…"));
    }

    #[test]
    fn test_truncate_counts_characters_not_bytes() {
        let long = "ã".repeat(200);
        let cut = truncate(&long, 140);
        assert_eq!(cut, format!("{}…", "ã".repeat(140)));
    }

    #[test]
    fn test_summary_line_full() {
        let r = record(json!({
            "message": {"chat": {"id": 42}, "from": {"id": 7, "first_name": "Ana"}, "text": "oi"}
        }));
        let line = summary_line(1, &r);
        assert!(line.starts_with("[001] "));
        assert!(line.ends_with(" | chat=42 | user=Ana | oi"));
        assert!(line.contains(&r.timestamp_iso()));
    }

    #[test]
    fn test_summary_line_empty_record() {
        let r = record(json!({}));
        assert!(summary_line(12, &r).ends_with(" | chat=- | user=- | (no text)"));
        assert!(summary_line(12, &r).starts_with("[012] "));
    }

    #[test]
    fn test_render_empty_page() {
        let page = render_page(&[]);
        assert!(page.starts_with("<!doctype html>"));
        assert!(page.contains("No messages yet…"));
        assert!(page.contains("last 0 messages"));
        assert!(page.contains(r#"<meta http-equiv="refresh" content="10">"#));
        assert!(!page.contains("<details>"));
    }

    #[test]
    fn test_render_escapes_user_text() {
        let r = record(json!({
            "message": {"from": {"first_name": "<b>Eve</b>"}, "text": "1 < 2 && 3 > 2"}
        }));
        let page = render_page(&[r]);
        assert!(page.contains("user=&lt;b&gt;Eve&lt;/b&gt;"));
        assert!(page.contains("1 &lt; 2 &amp;&amp; 3 &gt; 2"));
        assert!(!page.contains("<b>Eve</b>"));
        assert!(!page.contains("1 < 2"));
    }

    #[test]
    fn test_render_long_text_truncated_in_summary_but_full_in_payload() {
        let long = format!("{}END", "x".repeat(200));
        let r = record(json!({"message": {"text": long}}));
        let page = render_page(&[r]);

        let summary_start = page.find("<summary>").unwrap();
        let summary_end = page.find("</summary>").unwrap();
        let summary = &page[summary_start..summary_end];
        assert!(summary.contains(&format!("{}…", "x".repeat(140))));
        assert!(!summary.contains("END"));

        assert!(page.contains(&format!("&quot;text&quot;: &quot;{}END&quot;", "x".repeat(200))));
    }

    #[test]
    fn test_render_numbers_entries_in_given_order() {
        let newest = record(json!({"message": {"text": "second"}}));
        let oldest = record(json!({"message": {"text": "first"}}));
        let page = render_page(&[newest, oldest]);

        let second = page.find("[001]").unwrap();
        let first = page.find("[002]").unwrap();
        assert!(second < first);
        assert!(page[second..first].contains("second"));
        assert!(page.contains("last 2 messages"));
    }

    #[test]
    fn test_render_keeps_non_ascii_in_payload() {
        let r = record(json!({"message": {"text": "olá 👋"}}));
        let page = render_page(&[r]);
        assert!(page.contains("&quot;text&quot;: &quot;olá 👋&quot;"));
    }
}
