//! Secure TODO Vault - Error Message Sanitization
//!
//! Strips file paths, stack frames, line:column references and module paths
//! from platform error text before it is logged or shown.

use std::sync::LazyLock;

use regex::Regex;

const FALLBACK_MESSAGE: &str = "An unexpected error occurred";

static FILE_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)/[\w\-./]+\.(rs|ts|js|tsx|jsx|kt|java|swift)").expect("valid regex")
});
static CALL_FRAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)at\s+[\w.<>]+\s+\([^)]+\)").expect("valid regex"));
static FRAME_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^\s*at\s+.*").expect("valid regex"));
static LINE_COLUMN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":\d+:\d+").expect("valid regex"));
static NODE_MODULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)node_modules/\S+").expect("valid regex"));
static RUST_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w+(?:::\w+)+").expect("valid regex"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Remove internal details from an error message
pub fn sanitize_error_message(message: &str) -> String {
    let sanitized = FILE_PATH.replace_all(message, "[file]");
    let sanitized = CALL_FRAME.replace_all(&sanitized, "");
    let sanitized = FRAME_LINE.replace_all(&sanitized, "");
    let sanitized = LINE_COLUMN.replace_all(&sanitized, "");
    let sanitized = NODE_MODULE.replace_all(&sanitized, "[module]");
    let sanitized = RUST_PATH.replace_all(&sanitized, "[module]");
    let sanitized = WHITESPACE.replace_all(&sanitized, " ");
    let sanitized = sanitized.trim();

    if sanitized.is_empty() {
        FALLBACK_MESSAGE.to_string()
    } else {
        sanitized.to_string()
    }
}
