use std::collections::HashMap;

/// Parse a raw query string (`search=react&category=Backend`) into key/value pairs.
///
/// Values are URL decoded, `+` counts as a space. Repeated keys keep the last value.
pub fn parse_query_params(query: &str) -> HashMap<String, String> {
    let query = query.trim_start_matches('?');
    let mut params = HashMap::new();

    for param in query.split('&').filter(|p| !p.is_empty()) {
        let (key, raw_value) = match param.find('=') {
            Some(eq_idx) => (&param[..eq_idx], &param[eq_idx + 1..]),
            None => (param, ""),
        };
        params.insert(decode(key), decode(raw_value));
    }

    params
}

fn decode(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|c| c.into_owned())
        .unwrap_or(spaced)
}

/// Non-blank, trimmed string parameter.
pub fn get_string(params: &HashMap<String, String>, key: &str) -> Option<String> {
    params
        .get(key)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// 1-based page number; unparsable values fall back to the first page.
pub fn get_page(params: &HashMap<String, String>, key: &str) -> Option<usize> {
    params
        .get(key)
        .map(|s| s.trim().parse::<usize>().unwrap_or(1).max(1))
}
