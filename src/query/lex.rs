/// Parse a `0x`-prefixed address token. Parsing stops at the first non-hex character, so
/// `0x4011a0.` and `0x401136,` both yield an address.
pub fn parse_hex_address(token: &str) -> Option<u64> {
    let t = token.trim_start();
    let rest = t.strip_prefix("0x").or_else(|| t.strip_prefix("0X"))?;
    let end = rest
        .find(|c: char| !c.is_ascii_hexdigit())
        .unwrap_or(rest.len());
    if end == 0 {
        return None;
    }
    u64::from_str_radix(&rest[..end], 16).ok()
}

/// Address of the first `0x` token in `text`. The `0x` must start a token, so the `0x1`
/// inside an identifier such as `a0x1` is skipped.
pub fn find_hex_address(text: &str) -> Option<u64> {
    text.match_indices("0x").find_map(|(idx, _)| {
        let at_boundary = text[..idx]
            .chars()
            .next_back()
            .map_or(true, |c| !(c.is_alphanumeric() || c == '_'));
        if at_boundary {
            parse_hex_address(&text[idx..])
        } else {
            None
        }
    })
}

/// Address of the hex token that directly follows `marker`, if both are present.
pub fn hex_after(text: &str, marker: &str) -> Option<u64> {
    let idx = text.find(marker)?;
    let (token, _) = next_token(&text[idx + marker.len()..])?;
    parse_hex_address(token)
}

/// Split the first whitespace-delimited token off `s`: `(token, rest)`.
pub fn next_token(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    if s.is_empty() {
        return None;
    }
    let end = s.find(char::is_whitespace).unwrap_or(s.len());
    Some((&s[..end], &s[end..]))
}

/// Leading run of `s` up to (not including) the first char in `delims`.
pub fn take_until<'a>(s: &'a str, delims: &[char]) -> &'a str {
    match s.find(|c: char| delims.contains(&c)) {
        Some(i) => &s[..i],
        None => s,
    }
}

/// Parse a leading (optionally signed) decimal integer, skipping leading whitespace.
pub fn parse_leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let sign_len = usize::from(s.starts_with('-') || s.starts_with('+'));
    let digits = s[sign_len..]
        .bytes()
        .take_while(|b| b.is_ascii_digit())
        .count();
    if digits == 0 {
        return None;
    }
    s[..sign_len + digits].parse::<i64>().ok()
}

/// Unsigned line number at the start of `s` (leading whitespace skipped, digits only).
pub fn parse_line_number(s: &str) -> Option<u32> {
    let s = s.trim_start();
    let digits = s.bytes().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    s[..digits].parse::<u32>().ok()
}

/// Drop a leading line number and the whitespace around it: `"42\tint x;"` -> `"int x;"`.
pub fn strip_line_number(s: &str) -> &str {
    s.trim_start()
        .trim_start_matches(|c: char| c.is_ascii_digit())
        .trim_start_matches(&[' ', '\t'][..])
}

/// Split a `"13:\tint g;"` listing prefix into its line number and the remainder.
pub fn split_line_prefix(s: &str) -> (Option<u32>, &str) {
    let trimmed = s.trim_start();
    if let Some((num, rest)) = trimmed.split_once(':') {
        if !num.is_empty() && num.bytes().all(|b| b.is_ascii_digit()) {
            return (num.parse::<u32>().ok(), rest.trim_start());
        }
    }
    (None, trimmed)
}
