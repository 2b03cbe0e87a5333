//! Portal response classification.
//!
//! Portals answer the login POST with a small XML-ish document. We pull a
//! human-readable message out of it and bucket that message with keyword
//! heuristics. This is not a protocol-aware parser; misclassification is a
//! known limitation.

use std::sync::LazyLock;

use regex::Regex;

use crate::database::models::MESSAGE_MAX_LEN;

/// Fallback message when the response body is empty.
pub const NO_RESPONSE_MESSAGE: &str = "No response body received";

static MESSAGE_CDATA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<message>\s*<!\[CDATA\[(.*?)\]\]>\s*</message>").expect("static pattern")
});
static MESSAGE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<message>(.*?)</message>").expect("static pattern"));
static MSG_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<msg>(.*?)</msg>").expect("static pattern"));

const SUCCESS_KEYWORDS: &[&str] = &["success", "logged in", "authenticated", "welcome"];
const ALREADY_KEYWORDS: &[&str] = &["already", "exist", "active"];

/// Categorized result of a login attempt. [`classify`] produces the first
/// three; the orchestrator supplies the transport-level outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    AlreadyConnected,
    LoginFailed,
    NetworkError,
    Timeout,
}

/// Extract the meaningful message from a portal response body.
///
/// Tries, in order: a `<message>` tag wrapping CDATA, a plain `<message>`
/// tag, then a `<msg>` tag. Falls back to the whitespace-collapsed body
/// truncated to 300 characters, or a fixed sentinel when nothing remains.
pub fn extract_message(body: &str) -> String {
    for pattern in [&*MESSAGE_CDATA, &*MESSAGE_TAG, &*MSG_TAG] {
        if let Some(captures) = pattern.captures(body) {
            return captures[1].trim().to_string();
        }
    }

    let collapsed = body.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return NO_RESPONSE_MESSAGE.to_string();
    }
    collapsed.chars().take(MESSAGE_MAX_LEN).collect()
}

/// Bucket an extracted message by keyword membership.
///
/// Success keywords win over "already" keywords; anything unmatched is a
/// failed login.
pub fn classify(message: &str) -> Outcome {
    let lowered = message.to_lowercase();

    if SUCCESS_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
        Outcome::Success
    } else if ALREADY_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
        Outcome::AlreadyConnected
    } else {
        Outcome::LoginFailed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_cdata_message() {
        let body = "<message><![CDATA[Login OK]]></message>";
        assert_eq!(extract_message(body), "Login OK");
    }

    #[test]
    fn extracts_plain_message_tag() {
        assert_eq!(
            extract_message("<response><message>You are signed in</message></response>"),
            "You are signed in"
        );
    }

    #[test]
    fn extracts_msg_tag_case_insensitively() {
        assert_eq!(extract_message("<MSG>Session expired</MSG>"), "Session expired");
    }

    #[test]
    fn cdata_wins_over_plain_tag() {
        let body = "<msg>other</msg><message><![CDATA[priority]]></message>";
        assert_eq!(extract_message(body), "priority");
    }

    #[test]
    fn tolerates_newlines_inside_the_tag() {
        let body = "<message><![CDATA[\n  Login\nsuccessful\n]]></message>";
        assert_eq!(extract_message(body), "Login\nsuccessful");
    }

    #[test]
    fn fallback_collapses_whitespace_and_truncates() {
        let body = format!("   plain\n\n  text   {}", "y".repeat(400));
        let message = extract_message(&body);
        assert!(message.starts_with("plain text y"));
        assert_eq!(message.chars().count(), MESSAGE_MAX_LEN);
    }

    #[test]
    fn empty_body_yields_sentinel() {
        assert_eq!(extract_message(""), NO_RESPONSE_MESSAGE);
        assert_eq!(extract_message("  \n\t "), NO_RESPONSE_MESSAGE);
    }

    #[test]
    fn classify_success_keywords() {
        assert_eq!(classify("Authentication successful"), Outcome::Success);
        assert_eq!(classify("You are now logged in"), Outcome::Success);
        assert_eq!(classify("WELCOME to the network"), Outcome::Success);
    }

    #[test]
    fn classify_already_connected_keywords() {
        assert_eq!(
            classify("You are already logged in"),
            Outcome::AlreadyConnected
        );
        assert_eq!(classify("Session exists"), Outcome::AlreadyConnected);
        assert_eq!(classify("An active session was found"), Outcome::AlreadyConnected);
    }

    #[test]
    fn classify_defaults_to_failed() {
        assert_eq!(classify("Invalid credentials"), Outcome::LoginFailed);
        assert_eq!(classify(""), Outcome::LoginFailed);
    }

    #[test]
    fn success_keywords_win_over_already_keywords() {
        // "already" appears, but so does "success"; the success bucket is
        // checked first.
        assert_eq!(classify("already a success"), Outcome::Success);
    }
}
