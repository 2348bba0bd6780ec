//! Input validation functions
//!
//! Field-level rules live on the request types via the `validator` crate;
//! the rules here need more than a length or format check.

/// Shortest accepted password, in bytes
pub const MIN_PASSWORD_BYTES: usize = 1;

/// bcrypt only reads the first 72 bytes of its input
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Longest accepted handle, in characters
pub const MAX_HANDLE_CHARS: usize = 32;

/// Validate password length
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.len() < MIN_PASSWORD_BYTES {
        return Err("Password cannot be empty".to_string());
    }
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(format!(
            "Password must be at most {} bytes",
            MAX_PASSWORD_BYTES
        ));
    }
    Ok(())
}

/// Validate a user handle
///
/// Handles appear in URLs, so they are restricted to ASCII letters, digits,
/// `_`, `-` and `.`.
pub fn validate_handle(handle: &str) -> Result<(), String> {
    if handle.is_empty() {
        return Err("Handle cannot be empty".to_string());
    }
    if handle.chars().count() > MAX_HANDLE_CHARS {
        return Err(format!(
            "Handle must be at most {} characters",
            MAX_HANDLE_CHARS
        ));
    }
    if !handle
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
    {
        return Err("Handle may only contain letters, digits, '_', '-' and '.'".to_string());
    }
    Ok(())
}

/// Trim tag names and drop empties and duplicates, keeping first-seen order
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}
