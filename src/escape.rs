//! C-style escaping for query-mode ("line") output (SPEC_FULL.md §4.9).
//!
//! The original renders these lines through `vis(3)`, a BSD-only facility
//! with no portable Rust equivalent; this reimplements the subset of escapes
//! that matters for a readable `key=value` line: control characters the
//! original also treats specially, plus the backslash and quote that would
//! otherwise make the escaping ambiguous to reverse by eye. This is
//! output-only — nothing here feeds back into the tree; [`semantic`] only
//! recovers the human-readable form of an already-parsed name/value for this
//! one rendering path.

/// Strips a single matching pair of surrounding quotes (if present) and
/// resolves `\`-escapes, recovering the semantic name/value a node's stored
/// bytes represent. The stored bytes keep quotes and backslashes verbatim so
/// the file writer can round-trip them; query-line output (SPEC_FULL.md §6.3,
/// §8 scenario 6) renders the semantic form instead — `a = "hello world"`
/// queries back as `a=hello world`, not `a="hello world"`.
fn semantic(bytes: &[u8]) -> Vec<u8> {
    let inner = match (bytes.first(), bytes.last()) {
        (Some(b'"'), Some(b'"')) | (Some(b'\''), Some(b'\'')) if bytes.len() >= 2 => {
            &bytes[1..bytes.len() - 1]
        }
        _ => bytes,
    };
    let mut out = Vec::with_capacity(inner.len());
    let mut i = 0;
    while i < inner.len() {
        if inner[i] == b'\\' && i + 1 < inner.len() {
            out.push(inner[i + 1]);
            i += 2;
        } else {
            out.push(inner[i]);
            i += 1;
        }
    }
    out
}

fn push_escaped(out: &mut Vec<u8>, byte: u8) {
    match byte {
        b'\n' => out.extend_from_slice(b"\\n"),
        b'\\' => out.extend_from_slice(b"\\\\"),
        b'"' => out.extend_from_slice(b"\\\""),
        0x20..=0x7e => out.push(byte),
        _ => out.extend_from_slice(format!("\\x{byte:02x}").as_bytes()),
    }
}

/// Recovers the semantic value (quotes stripped, escapes resolved) and
/// escapes it for `key=value` rendering.
pub fn escape_value(bytes: &[u8]) -> Vec<u8> {
    let value = semantic(bytes);
    let mut out = Vec::with_capacity(value.len());
    for &b in &value {
        push_escaped(&mut out, b);
    }
    out
}

/// Recovers the semantic form of one path segment and escapes it, additionally
/// escaping a literal `.` so it can't be mistaken for the path separator when
/// the rendered line is read back by eye.
pub fn escape_name_segment(bytes: &[u8]) -> Vec<u8> {
    let name = semantic(bytes);
    let mut out = Vec::with_capacity(name.len());
    for &b in &name {
        if b == b'.' {
            out.extend_from_slice(b"\\.");
        } else {
            push_escaped(&mut out, b);
        }
    }
    out
}
