//! Pages returned to the OAuth popup window

use axum::http::{header, HeaderValue};
use axum::response::{Html, IntoResponse, Response};
use serde::Serialize;
use socialhub_core::models::SocialPlatform;

/// The popup only needs its own inline script.
const POPUP_CSP: &str = "default-src 'none'; script-src 'unsafe-inline'; frame-ancestors 'none'";

pub const CLOSE_ONLY_HTML: &str = "<html><body><script>window.close()</script></body></html>";

#[derive(Debug, Serialize)]
struct PopupMessage<'a> {
    #[serde(rename = "type")]
    kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

/// Outcome the opener window is told about
#[derive(Debug, Clone, PartialEq)]
pub enum PopupOutcome {
    /// Provider reported an error (user cancelled); just close
    Close,
    Success(SocialPlatform),
    Failure(SocialPlatform, String),
}

impl PopupOutcome {
    pub fn render(&self) -> String {
        let (platform, error) = match self {
            PopupOutcome::Close => return CLOSE_ONLY_HTML.to_string(),
            PopupOutcome::Success(platform) => (platform, None),
            PopupOutcome::Failure(platform, message) => (platform, Some(message.as_str())),
        };

        let message = PopupMessage {
            kind: format!(
                "{}_{}",
                platform.message_prefix(),
                if error.is_some() { "ERROR" } else { "SUCCESS" }
            ),
            error,
        };
        let json = serde_json::to_string(&message)
            .unwrap_or_else(|_| r#"{"type":"UNKNOWN_ERROR"}"#.to_string());

        format!(
            "<html><body><script>window.opener?.postMessage({}, \"*\"); window.close();</script></body></html>",
            escape_for_script(&json)
        )
    }
}

/// JSON is valid JS, but `</script>` or `<!--` inside a string would still
/// end the element. Escape `<`, `>` and `&` as unicode escapes.
fn escape_for_script(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    for ch in json.chars() {
        match ch {
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            '&' => out.push_str("\\u0026"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c => out.push(c),
        }
    }
    out
}

impl IntoResponse for PopupOutcome {
    fn into_response(self) -> Response {
        let mut response = Html(self.render()).into_response();
        response
            .headers_mut()
            .insert(header::CONTENT_SECURITY_POLICY, HeaderValue::from_static(POPUP_CSP));
        response
            .headers_mut()
            .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
        response
    }
}
