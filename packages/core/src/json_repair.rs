//! JSON repair for model output
//!
//! Generative models wrap JSON in prose, `<think>` blocks or code fences, and
//! long answers get cut off mid-array. `parse_json_array` strips the wrapper,
//! parses strictly, and on failure makes one bounded repair: cut after the
//! last complete top-level element and close the array.

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepairError {
    #[error("empty response")]
    Empty,
    #[error("response contains no JSON array")]
    NoArray,
    #[error("unrepairable JSON: {0}")]
    Unrepairable(String),
    #[error("element {index} has the wrong shape: {message}")]
    Shape { index: usize, message: String },
}

/// How the array was recovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    Strict,
    Repaired,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedArray {
    pub items: Vec<Value>,
    pub mode: ParseMode,
}

/// Removes `<think>...</think>` blocks; an unclosed block is left alone.
pub fn strip_think_tags(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("<think>") {
        match result[start..].find("</think>") {
            Some(rel_end) => {
                let close_end = start + rel_end + "</think>".len();
                result.replace_range(start..close_end, "");
            }
            None => break,
        }
    }
    result
}

/// Unwraps a code fence that opens the response. Fences further in are left
/// alone, since backticks inside JSON strings are ordinary text.
pub fn extract_fenced(s: &str) -> &str {
    let trimmed = s.trim();
    let Some(after_open) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Info string (`json`, `JSON`, ...) may be followed by a newline or by
    // the body itself.
    let info_len = after_open
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(after_open.len());
    let body = after_open[info_len..].trim_start_matches([' ', '\t', '\r']);
    let body = body.strip_prefix('\n').unwrap_or(body);
    match find_closing_fence(body) {
        Some(close) => body[..close].trim(),
        None => body.trim(),
    }
}

/// A line that is only a fence closes the block; otherwise the last fence in
/// the body does.
fn find_closing_fence(body: &str) -> Option<usize> {
    let mut offset = 0;
    for line in body.split_inclusive('\n') {
        if line.trim() == "```" {
            return Some(offset);
        }
        offset += line.len();
    }
    body.rfind("```")
}

pub fn parse_json_array(raw: &str) -> Result<ParsedArray, RepairError> {
    let cleaned = strip_think_tags(raw);
    let unfenced = extract_fenced(&cleaned);
    if unfenced.is_empty() {
        return Err(RepairError::Empty);
    }
    let start = unfenced.find('[').ok_or(RepairError::NoArray)?;
    let body = &unfenced[start..];

    let strict_err = match parse_first_array(body) {
        Ok(items) => return Ok(ParsedArray { items, mode: ParseMode::Strict }),
        Err(e) => e,
    };

    let end = last_complete_element_end(body).ok_or_else(|| RepairError::Unrepairable(strict_err.clone()))?;
    let mut repaired = body[..end].trim_end().trim_end_matches(',').to_string();
    repaired.push(']');

    parse_first_array(&repaired)
        .map(|items| ParsedArray { items, mode: ParseMode::Repaired })
        .map_err(|_| RepairError::Unrepairable(strict_err))
}

/// Parses the array and deserializes every element; any bad element fails
/// the whole batch.
pub fn parse_array_as<T: DeserializeOwned>(raw: &str) -> Result<(Vec<T>, ParseMode), RepairError> {
    let parsed = parse_json_array(raw)?;
    let items = parsed
        .items
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            serde_json::from_value(value).map_err(|e| RepairError::Shape { index, message: e.to_string() })
        })
        .collect::<Result<Vec<T>, _>>()?;
    Ok((items, parsed.mode))
}

// Trailing prose after the closing bracket is ignored.
fn parse_first_array(body: &str) -> Result<Vec<Value>, String> {
    let mut stream = serde_json::Deserializer::from_str(body).into_iter::<Value>();
    match stream.next() {
        Some(Ok(Value::Array(items))) => Ok(items),
        Some(Ok(_)) => Err("top-level value is not an array".to_string()),
        Some(Err(e)) => Err(e.to_string()),
        None => Err("no value".to_string()),
    }
}

/// Byte offset just past the last top-level element that is known complete,
/// or `None` when the array is closed (not a truncation) or has no complete
/// element.
fn last_complete_element_end(body: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    let mut last_end = None;

    for (i, ch) in body.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
                if depth == 1 {
                    last_end = Some(i + 1);
                }
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '[' | '{' => depth += 1,
            ']' | '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return None;
                }
                if depth == 1 {
                    last_end = Some(i + 1);
                }
            }
            ',' if depth == 1 => last_end = Some(i),
            _ => {}
        }
    }
    last_end
}
