use serde::de::DeserializeOwned;

/// Returns the first balanced top-level JSON object embedded in `raw`.
///
/// Models tend to wrap their answer in prose or code fences; braces inside
/// string literals (including escaped quotes) do not count towards nesting.
pub fn first_json_object(raw: &str) -> Result<&str, String> {
    let text = raw.trim().trim_start_matches('\u{feff}');
    if text.is_empty() {
        return Err("response text is empty".to_string());
    }
    let open = text
        .find('{')
        .ok_or_else(|| "no json object start ('{') in response".to_string())?;

    let mut in_string = false;
    let mut escaping = false;
    let mut depth = 0usize;

    for (offset, ch) in text[open..].char_indices() {
        if in_string {
            if escaping {
                escaping = false;
            } else if ch == '\\' {
                escaping = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    let end = open + offset + ch.len_utf8();
                    return Ok(text[open..end].trim());
                }
            }
            _ => {}
        }
    }

    Err("no complete json object in response".to_string())
}

pub fn parse_payload<T: DeserializeOwned>(raw: &str) -> Result<T, String> {
    let object = first_json_object(raw)?;
    serde_json::from_str(object).map_err(|err| format!("unexpected payload shape: {}", err))
}
