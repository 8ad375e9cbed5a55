// src/utils/html.rs

/// Clean HTML content using the ammonia library.
///
/// Used on generated question text before it reaches any client: safe inline tags
/// survive, `<script>`/`<iframe>` and event-handler attributes are stripped.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}
