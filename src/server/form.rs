//! HTML for the browser form.

use std::fmt::Write as _;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::language::{LanguageModelKey, LanguageRegistry};

/// Outcome shown under the form after a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success { sampling_rate: u32 },
    Error(String),
}

pub fn render_page(
    registry: &LanguageRegistry,
    selected: &LanguageModelKey,
    text: &str,
    notice: Option<&Notice>,
) -> String {
    let mut options = String::new();
    for (key, _) in registry.iter() {
        let _ = write!(
            options,
            r#"<option value="{value}"{sel}>{label}</option>"#,
            value = escape_html(key.as_str()),
            sel = if key == selected { " selected" } else { "" },
            label = escape_html(&title_case(key.as_str())),
        );
    }

    let notice_html = match notice {
        None => String::new(),
        Some(Notice::Success { sampling_rate }) => {
            // Query string defeats browser caching of the overwritten file.
            let nonce = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or_default();
            format!(
                r#"<div class="notice success">Speech generated successfully ({sampling_rate} Hz).</div>
<audio controls autoplay src="/audio?v={nonce}"></audio>"#
            )
        }
        Some(Notice::Error(message)) => format!(
            r#"<div class="notice error">Error: {}</div>"#,
            escape_html(message)
        ),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Text to Speech</title>
</head>
<body>
<h1>Text to Speech</h1>
<form method="post" action="/" onsubmit="document.getElementById('progress').hidden = false">
<label>Language <select name="language">{options}</select></label>
<label>Text <textarea name="text" rows="8" cols="60">{text}</textarea></label>
<button type="submit">Convert to Speech</button>
</form>
<p id="progress" hidden>Generating speech&hellip;</p>
{notice_html}
</body>
</html>
"#,
        text = escape_html(text),
    )
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
