//! Locating JSON inside free-form LLM replies
//!
//! Models sometimes wrap JSON in prose or code fences. These helpers cut the
//! outermost object/array out of the text before parsing.

use crate::{Error, Result};

/// Text from the first `{` to the last `}` inclusive
pub fn extract_json_object(text: &str) -> Result<&str> {
    match (text.find('{'), text.rfind('}')) {
        (Some(first), Some(last)) if first < last => Ok(&text[first..=last]),
        _ => Err(Error::Internal("No JSON found in response".to_string())),
    }
}

/// Text from the first `[` to the last `]` inclusive
pub fn extract_json_array(text: &str) -> Option<&str> {
    match (text.find('['), text.rfind(']')) {
        (Some(first), Some(last)) if first < last => Some(&text[first..=last]),
        _ => None,
    }
}
