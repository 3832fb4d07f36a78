//! Canonical JSON: the single serialization-for-hashing implementation.
//!
//! **Exactly one place** produces canonical JSON in nftlint. The metadata
//! digest and the on-disk lint input both route through this module, so a
//! descriptor hashed by one producer and re-serialized by another still
//! verifies.
//!
//! # Canonicalization rules
//!
//! 1. Object keys are sorted by UTF-16 code units (the order a JavaScript
//!    producer's `sort()` yields; identical to byte order inside the BMP).
//! 2. Arrays keep their order.
//! 3. Strings are escaped like `JSON.stringify`: short escapes for `"`, `\`,
//!    `\b`, `\f`, `\n`, `\r`, `\t`; `\u00xx` for other C0 controls; all other
//!    characters pass through as UTF-8.
//! 4. Integers up to 2^53 in magnitude are written exactly. Every other
//!    finite number is written as its `f64` would be by ECMAScript
//!    `Number#toString`. Non-finite numbers are rejected.
//! 5. `null`, `true`, `false` are written literally.
//!
//! Two layouts share these rules: compact (no whitespace, used for hashing)
//! and pretty (two-space indent, `": "` separator, used for output). In the
//! pretty layout an empty container still breaks its closing bracket onto
//! its own line (`{\n}`), as `json-stable-stringify` does.

use std::io::Write;

/// Indent unit for [`canonical_json_pretty`].
const PRETTY_INDENT: &[u8] = b"  ";

/// Largest magnitude (2^53) below which every integer is exact in an `f64`.
const MAX_EXACT_INTEGER: u64 = 1 << 53;

/// Error type for canonical JSON serialization.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CanonError {
    /// A JSON number was NaN or infinite.
    #[error("non-finite number in canonical JSON: {raw}")]
    NonFiniteNumber { raw: String },
}

/// Produce compact canonical JSON bytes from a `serde_json::Value`.
///
/// This is the form the metadata digest is computed over.
///
/// # Errors
///
/// Returns [`CanonError::NonFiniteNumber`] if any number is NaN or infinite.
pub fn canonical_json_bytes(value: &serde_json::Value) -> Result<Vec<u8>, CanonError> {
    let mut buf = Vec::new();
    write_value(&mut buf, value, None)?;
    Ok(buf)
}

/// Produce the indented canonical form (same key order as the compact form).
///
/// # Errors
///
/// Returns [`CanonError::NonFiniteNumber`] if any number is NaN or infinite.
pub fn canonical_json_pretty(value: &serde_json::Value) -> Result<String, CanonError> {
    let mut buf = Vec::new();
    write_value(&mut buf, value, Some(0))?;
    // Every byte written is either ASCII punctuation or copied from a `str`.
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// `depth` is `None` for compact output, `Some(level)` for pretty output.
fn write_value(
    buf: &mut Vec<u8>,
    value: &serde_json::Value,
    depth: Option<usize>,
) -> Result<(), CanonError> {
    match value {
        serde_json::Value::Null => buf.extend_from_slice(b"null"),
        serde_json::Value::Bool(true) => buf.extend_from_slice(b"true"),
        serde_json::Value::Bool(false) => buf.extend_from_slice(b"false"),
        serde_json::Value::Number(n) => write_number(buf, n)?,
        serde_json::Value::String(s) => write_string(buf, s),
        serde_json::Value::Array(arr) => {
            buf.push(b'[');
            for (i, item) in arr.iter().enumerate() {
                if i > 0 {
                    buf.push(b',');
                }
                write_newline(buf, depth.map(|d| d + 1));
                write_value(buf, item, depth.map(|d| d + 1))?;
            }
            write_newline(buf, depth);
            buf.push(b']');
        }
        serde_json::Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort_by(|a, b| a.encode_utf16().cmp(b.encode_utf16()));

            buf.push(b'{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    buf.push(b',');
                }
                write_newline(buf, depth.map(|d| d + 1));
                write_string(buf, key);
                buf.push(b':');
                if depth.is_some() {
                    buf.push(b' ');
                }
                write_value(buf, &map[*key], depth.map(|d| d + 1))?;
            }
            write_newline(buf, depth);
            buf.push(b'}');
        }
    }
    Ok(())
}

fn write_newline(buf: &mut Vec<u8>, depth: Option<usize>) {
    if let Some(level) = depth {
        buf.push(b'\n');
        for _ in 0..level {
            buf.extend_from_slice(PRETTY_INDENT);
        }
    }
}

fn write_number(buf: &mut Vec<u8>, n: &serde_json::Number) -> Result<(), CanonError> {
    // Integers a producer holds exactly as an f64 print as-is; larger ones
    // print as the nearest f64 would.
    if let Some(i) = n.as_i64().filter(|i| i.unsigned_abs() <= MAX_EXACT_INTEGER) {
        let _ = write!(buf, "{i}");
        return Ok(());
    }
    match n.as_f64() {
        Some(f) if f.is_finite() => {
            buf.extend_from_slice(ecmascript_number(f).as_bytes());
            Ok(())
        }
        _ => Err(CanonError::NonFiniteNumber { raw: n.to_string() }),
    }
}

/// Format a finite `f64` the way ECMAScript `Number#toString` does.
///
/// Rust's `{:e}` already yields the shortest round-trip digit string; this
/// only re-lays those digits out per ECMA-262 §6.1.6.1.20.
fn ecmascript_number(f: f64) -> String {
    if f == 0.0 {
        // Covers -0 as well.
        return "0".to_string();
    }
    let sci = format!("{:e}", f.abs());
    let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    let exponent: i64 = exponent.parse().unwrap_or(0);

    let k = i64::try_from(digits.len()).unwrap_or(i64::MAX);
    let n = exponent + 1;

    let mut out = String::new();
    if f < 0.0 {
        out.push('-');
    }
    if k <= n && n <= 21 {
        out.push_str(&digits);
        out.extend(std::iter::repeat('0').take(usize::try_from(n - k).unwrap_or(0)));
    } else if 0 < n && n <= 21 {
        let split = usize::try_from(n).unwrap_or(0);
        out.push_str(&digits[..split]);
        out.push('.');
        out.push_str(&digits[split..]);
    } else if -6 < n && n <= 0 {
        out.push_str("0.");
        out.extend(std::iter::repeat('0').take(usize::try_from(-n).unwrap_or(0)));
        out.push_str(&digits);
    } else {
        let e = n - 1;
        out.push_str(&digits[..1]);
        if k > 1 {
            out.push('.');
            out.push_str(&digits[1..]);
        }
        out.push('e');
        out.push(if e >= 0 { '+' } else { '-' });
        out.push_str(&e.abs().to_string());
    }
    out
}

fn write_string(buf: &mut Vec<u8>, s: &str) {
    buf.push(b'"');
    for ch in s.chars() {
        match ch {
            '"' => buf.extend_from_slice(b"\\\""),
            '\\' => buf.extend_from_slice(b"\\\\"),
            '\u{0008}' => buf.extend_from_slice(b"\\b"),
            '\u{000c}' => buf.extend_from_slice(b"\\f"),
            '\n' => buf.extend_from_slice(b"\\n"),
            '\r' => buf.extend_from_slice(b"\\r"),
            '\t' => buf.extend_from_slice(b"\\t"),
            // Control characters U+0000..U+001F (except those handled above).
            c if c < '\u{0020}' => {
                let _ = write!(buf, "\\u{:04x}", c as u32);
            }
            c => {
                let mut utf8_buf = [0u8; 4];
                let encoded = c.encode_utf8(&mut utf8_buf);
                buf.extend_from_slice(encoded.as_bytes());
            }
        }
    }
    buf.push(b'"');
}
