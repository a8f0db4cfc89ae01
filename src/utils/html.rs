// src/utils/html.rs

use ammonia::Builder;

use crate::error::AppError;

/// Strips all HTML from user content except line breaks.
///
/// Text content of removed tags is kept (escaped), so `<b>hi</b>` becomes
/// `hi`. Used on post titles, post bodies and comment bodies before they are
/// stored.
pub fn sanitize(input: &str) -> String {
    Builder::empty().add_tags(["br"]).clean(input).to_string()
}

/// Sanitizes `input` and rejects it if nothing but whitespace survives.
pub fn sanitize_required(input: &str, field: &str) -> Result<String, AppError> {
    let clean = sanitize(input);
    if clean.trim().is_empty() {
        return Err(AppError::invalid(format!("{field} must not be empty")));
    }
    Ok(clean)
}
