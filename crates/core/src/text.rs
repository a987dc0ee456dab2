//! Display-text and phone-number normalization.
//!
//! Customer-supplied strings reach the console HTML-escaped, padded and with
//! stray line breaks. Everything placed into an invoice or an outbound message
//! goes through [`normalize_text`] first.

use serde_json::Value;

/// Upper bound on decode passes for text that was escaped more than once.
const MAX_DECODE_PASSES: usize = 4;

/// Longest entity body we look for between `&` and `;`.
const MAX_ENTITY_LEN: usize = 10;

/// Country code prefixed to bare ten-digit (Indian) mobile numbers.
const DEFAULT_COUNTRY_CODE: &str = "91";

/// Decode HTML entities, collapse whitespace runs to a single space and trim.
///
/// Text that was escaped several times (`&amp;amp;`) is decoded until no
/// known escape remains.
#[must_use]
pub fn normalize_text(input: &str) -> String {
    let mut decoded = decode_entities(input);
    for _ in 1..MAX_DECODE_PASSES {
        let next = decode_entities(&decoded);
        if next == decoded {
            break;
        }
        decoded = next;
    }
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// [`normalize_text`] for optional input; `None` becomes an empty string.
#[must_use]
pub fn normalize_opt(input: Option<&str>) -> String {
    input.map(normalize_text).unwrap_or_default()
}

/// [`normalize_text`] for loosely typed JSON values.
///
/// `null` becomes empty, numbers and booleans are rendered as written, arrays
/// are joined with `", "` and objects are rendered as compact JSON.
#[must_use]
pub fn normalize_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => normalize_text(s),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => items
            .iter()
            .map(normalize_value)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => normalize_text(&value.to_string()),
    }
}

/// Canonicalize a free-form phone number into a dialable digit string.
///
/// Keeps digits only (a leading `+` is dropped); a bare ten-digit number gets
/// the `91` country code. This is a heuristic, not validation: malformed
/// numbers are passed through.
#[must_use]
pub fn normalize_phone(input: &str) -> String {
    let digits: String = input.trim().chars().filter(char::is_ascii_digit).collect();
    if digits.len() == 10 {
        format!("{DEFAULT_COUNTRY_CODE}{digits}")
    } else {
        digits
    }
}

/// Single decoding pass over `input`.
fn decode_entities(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(amp) = rest.find('&') {
        let (before, from_amp) = rest.split_at(amp);
        out.push_str(before);

        let decoded = from_amp
            .get(1..)
            .and_then(|tail| {
                let semi = tail.find(';')?;
                (semi > 0 && semi <= MAX_ENTITY_LEN).then_some(semi)
            })
            .and_then(|semi| {
                let body = from_amp.get(1..=semi)?;
                decode_entity(body).map(|c| (c, semi + 2))
            });

        match decoded {
            Some((c, consumed)) => {
                out.push(c);
                rest = from_amp.get(consumed..).unwrap_or_default();
            }
            None => {
                out.push('&');
                rest = from_amp.get(1..).unwrap_or_default();
            }
        }
    }
    out.push_str(rest);
    out
}

/// Resolve the body of an entity (between `&` and `;`).
fn decode_entity(body: &str) -> Option<char> {
    if let Some(numeric) = body.strip_prefix('#') {
        let code = match numeric.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => numeric.parse::<u32>().ok()?,
        };
        return char::from_u32(code);
    }

    let c = match body {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "copy" => '©',
        "reg" => '®',
        "trade" => '™',
        "hellip" => '…',
        "mdash" => '—',
        "ndash" => '–',
        "lsquo" => '‘',
        "rsquo" => '’',
        "ldquo" => '“',
        "rdquo" => '”',
        "bull" => '•',
        "middot" => '·',
        "deg" => '°',
        "times" => '×',
        "divide" => '÷',
        "laquo" => '«',
        "raquo" => '»',
        "cent" => '¢',
        "pound" => '£',
        "euro" => '€',
        "yen" => '¥',
        _ => return None,
    };
    Some(c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decodes_named_entities() {
        assert_eq!(
            normalize_text("Tom &amp; Jerry &lt;3 &quot;mugs&quot;"),
            "Tom & Jerry <3 \"mugs\""
        );
    }

    #[test]
    fn test_decodes_numeric_entities() {
        assert_eq!(normalize_text("it&#39;s &#x20B9;99"), "it's ₹99");
    }

    #[test]
    fn test_collapses_whitespace_and_trims() {
        assert_eq!(
            normalize_text("  Flat 4B,\n\n  MG   Road\t&nbsp; "),
            "Flat 4B, MG Road"
        );
    }

    #[test]
    fn test_double_escaped_text_is_fully_decoded() {
        let out = normalize_text("Rock &amp;amp; Roll &amp;lt;tee&amp;gt;");
        assert_eq!(out, "Rock & Roll <tee>");
    }

    #[test]
    fn test_output_has_no_entities_or_whitespace_runs() {
        let inputs = [
            "a&nbsp;&nbsp;b",
            "&amp;&amp;   &gt;",
            "\t x &#160; y \r\n",
            "&quot;  quoted &apos;",
        ];
        for input in inputs {
            let out = normalize_text(input);
            assert!(!out.contains("&amp;") && !out.contains("&nbsp;") && !out.contains("&#"));
            assert!(!out.contains("  "), "whitespace run in {out:?}");
            assert_eq!(out, out.trim());
        }
    }

    #[test]
    fn test_unknown_or_broken_entities_are_kept() {
        assert_eq!(normalize_text("AT&T &bogus; & co"), "AT&T &bogus; & co");
        assert_eq!(normalize_text("trailing &"), "trailing &");
        assert_eq!(normalize_text("&#xZZ;"), "&#xZZ;");
    }

    #[test]
    fn test_normalize_value_coerces_non_strings() {
        assert_eq!(normalize_value(&json!(null)), "");
        assert_eq!(normalize_value(&json!(42)), "42");
        assert_eq!(normalize_value(&json!(true)), "true");
        assert_eq!(normalize_value(&json!(" Red&nbsp;")), "Red");
        assert_eq!(normalize_value(&json!(["a", "", "b"])), "a, b");
    }

    #[test]
    fn test_normalize_opt() {
        assert_eq!(normalize_opt(None), "");
        assert_eq!(normalize_opt(Some(" x ")), "x");
    }

    #[test]
    fn test_phone_ten_digits_gets_country_code() {
        assert_eq!(normalize_phone("98765 43210"), "919876543210");
        assert_eq!(normalize_phone("(987) 654-3210"), "919876543210");
    }

    #[test]
    fn test_phone_with_plus_is_stripped_not_prefixed() {
        assert_eq!(normalize_phone("+91 98765 43210"), "919876543210");
        assert_eq!(normalize_phone("+447911123456"), "447911123456");
    }

    #[test]
    fn test_phone_empty_and_malformed() {
        assert_eq!(normalize_phone(""), "");
        assert_eq!(normalize_phone("   "), "");
        assert_eq!(normalize_phone("12-34"), "1234");
    }
}
