//! Byte-level HTML scanning helpers shared by the syntax tree builder and
//! the reflow engine.
//!
//! Everything here works on `&[u8]` and only ever splits at ASCII bytes, so
//! slicing the matching `&str` at the returned indices is always valid UTF-8.

use memchr::memmem;

/* =============================== Core sets =============================== */

pub(crate) fn is_void(name: &[u8]) -> bool {
    matches_ignore_ascii_case(
        name,
        &[
            b"area", b"base", b"br", b"col", b"embed", b"hr", b"img", b"input", b"link", b"meta",
            b"param", b"source", b"track", b"wbr",
        ],
    )
}

/* ============================ Utility predicates ========================= */

#[inline]
pub(crate) fn is_name_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b':' || b == b'.'
}

#[inline]
pub(crate) fn is_ws(b: u8) -> bool {
    b == b' ' || b == b'\t' || b == b'\n' || b == b'\r' || b == 0x0c
}

pub(crate) fn matches_ignore_ascii_case(name: &[u8], set: &[&[u8]]) -> bool {
    set.iter().any(|&s| name.eq_ignore_ascii_case(s))
}

/// Does `s[i]` open a markup construct (start tag, end tag, comment,
/// doctype, processing instruction)? A lone `<` is plain text.
pub(crate) fn starts_markup(s: &[u8], i: usize) -> bool {
    if s.get(i) != Some(&b'<') {
        return false;
    }
    match s.get(i + 1) {
        Some(b) if b.is_ascii_alphabetic() => true,
        Some(b'!') | Some(b'?') => true,
        Some(b'/') => s.get(i + 2).is_some_and(|b| b.is_ascii_alphabetic()),
        _ => false,
    }
}

/* =============================== Tag parsing ============================= */

#[derive(Clone, Copy, Debug)]
pub(crate) struct TagInfo<'a> {
    pub name: &'a [u8],
    pub is_end: bool,
    pub self_closing: bool,
}

/// Find the '>' for a tag starting at `i` (s[i] == '<'), being quote-aware.
pub(crate) fn find_tag_end(s: &[u8], mut i: usize) -> Option<usize> {
    let n = s.len();
    i += 1;
    let mut quote: u8 = 0;
    while i < n {
        let b = s[i];
        if quote != 0 {
            if b == quote {
                quote = 0;
            }
        } else if b == b'"' || b == b'\'' {
            quote = b;
        } else if b == b'>' {
            return Some(i);
        }
        i += 1;
    }
    None
}

/// Extract tag name, end/self-closing flags from raw `<...>` bytes.
pub(crate) fn parse_tag_info(tag: &[u8]) -> TagInfo<'_> {
    let n = tag.len();
    let mut i = 1;

    let mut is_end = false;
    if i < n && tag[i] == b'/' {
        is_end = true;
        i += 1;
    }
    while i < n && is_ws(tag[i]) {
        i += 1;
    }
    let start = i;
    while i < n && is_name_char(tag[i]) {
        i += 1;
    }
    let name = &tag[start..i];

    // self-closing? check before '>'
    let mut j = n.saturating_sub(1);
    while j > 0 && is_ws(tag[j - 1]) {
        j -= 1;
    }
    let self_closing = j >= 2 && tag[j - 1] == b'/';

    TagInfo {
        name,
        is_end,
        self_closing,
    }
}

/* ============================== Comments ================================ */

/// Index just past the `-->` that terminates a comment opened at `i`
/// (`s[i..]` starts with `<!--`), or `None` when it runs to EOF.
pub(crate) fn comment_end(s: &[u8], i: usize) -> Option<usize> {
    let body = i + 4;
    if body > s.len() {
        return None;
    }
    memmem::find(&s[body..], b"-->").map(|p| body + p + 3)
}

/// Position of the first case-insensitive `</name` at or after `from`.
pub(crate) fn find_close_tag(s: &[u8], from: usize, name: &[u8]) -> Option<usize> {
    let mut k = from;
    while let Some(p) = memmem::find(&s[k..], b"</") {
        let at = k + p;
        let name_start = at + 2;
        let name_end = name_start + name.len();
        if name_end <= s.len()
            && s[name_start..name_end].eq_ignore_ascii_case(name)
            && s.get(name_end).map_or(true, |&b| !is_name_char(b))
        {
            return Some(at);
        }
        k = at + 2;
    }
    None
}
