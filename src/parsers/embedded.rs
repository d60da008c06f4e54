use std::sync::LazyLock;

use regex::Regex;

static NEXT_DATA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<script[^>]*\bid\s*=\s*["']__NEXT_DATA__["'][^>]*>(?P<body>.*?)</script>"#)
        .expect("next data pattern")
});

static JSON_SCRIPT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<script[^>]*\btype\s*=\s*["']application/(?:ld\+)?json["'][^>]*>(?P<body>.*?)</script>"#)
        .expect("json script pattern")
});

/// Cheap sniff: anything whose first non-blank character opens a tag.
pub fn looks_like_html(text: &str) -> bool {
    text.trim_start().starts_with('<')
}

/// Pulls the JSON payload a booking page ships inside a `<script>` tag.
///
/// `__NEXT_DATA__` wins over generic `application/json` blocks.
pub fn extract_payload(html: &str) -> Option<&str> {
    for re in [&*NEXT_DATA, &*JSON_SCRIPT] {
        for caps in re.captures_iter(html) {
            if let Some(body) = caps.name("body") {
                let body = body.as_str().trim();
                if !body.is_empty() {
                    return Some(body);
                }
            }
        }
    }

    None
}
