//! Composite instance keys
//!
//! `<tag>:<part>:<part>...` where each part is a key property's indexable
//! form in declared order. `%` and `:` inside parts are percent-escaped so a
//! key always splits back into the parts it was built from.

pub const KEY_SEPARATOR: char = ':';

pub fn escape(part: &str) -> String {
    let mut out = String::with_capacity(part.len());
    for c in part.chars() {
        match c {
            '%' => out.push_str("%25"),
            ':' => out.push_str("%3A"),
            c => out.push(c),
        }
    }
    out
}

/// Reverses `escape`. Returns `None` on an unknown escape sequence.
pub fn unescape(part: &str) -> Option<String> {
    let mut out = String::with_capacity(part.len());
    let mut rest = part;
    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let seq = rest.get(pos..pos + 3)?;
        match seq {
            "%25" => out.push('%'),
            "%3A" => out.push(':'),
            _ => return None,
        }
        rest = &rest[pos + 3..];
    }
    out.push_str(rest);
    Some(out)
}

pub fn derive_key<S: AsRef<str>>(tag: &str, parts: &[S]) -> String {
    let mut key = escape(tag);
    for part in parts {
        key.push(KEY_SEPARATOR);
        key.push_str(&escape(part.as_ref()));
    }
    key
}

/// Splits a key into its type tag and unescaped parts.
pub fn parse_key(key: &str) -> Option<(String, Vec<String>)> {
    let mut segments = key.split(KEY_SEPARATOR);
    let tag = unescape(segments.next()?)?;
    if tag.is_empty() {
        return None;
    }
    let parts = segments.map(unescape).collect::<Option<Vec<_>>>()?;
    Some((tag, parts))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_parts_in_order() {
        assert_eq!(
            derive_key("sampleBook", &["Meu Nome", "Maria"]),
            "sampleBook:Meu Nome:Maria"
        );
    }

    #[test]
    fn test_separator_in_part_is_escaped() {
        let key = derive_key("note", &["a:b", "100%"]);
        assert_eq!(key, "note:a%3Ab:100%25");

        let (tag, parts) = parse_key(&key).unwrap();
        assert_eq!(tag, "note");
        assert_eq!(parts, vec!["a:b".to_string(), "100%".to_string()]);
    }

    #[test]
    fn test_malformed_keys() {
        assert!(parse_key("").is_none());
        assert!(parse_key("tag:bad%2").is_none());
        assert!(parse_key("tag:%41").is_none());
    }
}
