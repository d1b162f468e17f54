//! Placeholders that shield text from the reflow passes.
//!
//! Ignored elements are cut out whole and replaced by `{token}blk{n}!`.
//! Characters inside quoted attribute values that the whitespace and tag
//! passes would touch are spelled as `{token}lt!`, `gt!`, `ws!`, `tb!`,
//! `nl!` and `cr!`.

use log::trace;
use regex::Regex;

use crate::scan::{comment_end, find_tag_end, starts_markup};

/// Blocks cut out of a document, in placeholder order.
#[derive(Debug, Default)]
pub(crate) struct IgnoredBlocks {
    blocks: Vec<String>,
}

impl IgnoredBlocks {
    pub(crate) fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Replace every `<tag ...>...</tag>` of the given tags with a
    /// placeholder.
    pub(crate) fn extract(html: &str, tags: &[String], token: &str) -> (String, Self) {
        let mut extracted = Self::default();
        let mut current = html.to_string();
        for tag in tags {
            let tag = regex::escape(tag);
            let pattern = format!(r"(?is)<{tag}(?:\s[^>]*)?>.*?</{tag}\s*>");
            let Ok(re) = Regex::new(&pattern) else {
                continue;
            };
            let replaced = re.replace_all(&current, |caps: &regex::Captures<'_>| {
                let n = extracted.blocks.len();
                extracted.blocks.push(caps[0].to_string());
                format!("{token}blk{n}!")
            });
            current = replaced.into_owned();
        }
        trace!("extracted {} ignored block(s)", extracted.blocks.len());
        (current, extracted)
    }

    /// Put the blocks back, verbatim.
    pub(crate) fn reinsert(&self, html: &str, token: &str) -> String {
        let mut out = html.to_string();
        // Highest index first so `blk1!` never eats the prefix of `blk10!`.
        for (n, block) in self.blocks.iter().enumerate().rev() {
            out = out.replace(&format!("{token}blk{n}!"), block);
        }
        out
    }
}

const PROTECTED: [(char, &str); 6] = [
    ('<', "lt!"),
    ('>', "gt!"),
    (' ', "ws!"),
    ('\t', "tb!"),
    ('\n', "nl!"),
    ('\r', "cr!"),
];

/// Trim every quoted attribute value and spell out its structural
/// characters. Comments and text are copied unchanged.
pub(crate) fn protect_attributes(html: &str, token: &str) -> String {
    let s = html.as_bytes();
    let n = s.len();
    let mut out = String::with_capacity(html.len() + html.len() / 8);
    let mut last = 0usize;
    let mut i = 0usize;

    while i < n {
        let Some(p) = memchr::memchr(b'<', &s[i..]) else {
            break;
        };
        let lt = i + p;
        if s[lt..].starts_with(b"<!--") {
            i = comment_end(s, lt).unwrap_or(n);
            continue;
        }
        if !starts_markup(s, lt) || s[lt + 1] == b'!' || s[lt + 1] == b'?' {
            i = lt + 1;
            continue;
        }
        let Some(gt) = find_tag_end(s, lt) else {
            break;
        };
        out.push_str(&html[last..lt]);
        protect_tag(&html[lt..=gt], token, &mut out);
        last = gt + 1;
        i = gt + 1;
    }
    out.push_str(&html[last..]);
    out
}

fn protect_tag(tag: &str, token: &str, out: &mut String) {
    let mut rest = tag;
    while let Some(q) = rest.find(['"', '\'']) {
        let quote = &rest[q..q + 1];
        out.push_str(&rest[..=q]);
        let after = &rest[q + 1..];
        let Some(close) = after.find(quote) else {
            out.push_str(after);
            return;
        };
        for c in after[..close].trim().chars() {
            match PROTECTED.iter().find(|(p, _)| *p == c) {
                Some((_, name)) => {
                    out.push_str(token);
                    out.push_str(name);
                }
                None => out.push(c),
            }
        }
        out.push_str(quote);
        rest = &after[close + 1..];
    }
    out.push_str(rest);
}

/// Undo [`protect_attributes`]. Trimmed whitespace stays trimmed.
pub(crate) fn unprotect_attributes(html: &str, token: &str) -> String {
    if !html.contains(token) {
        return html.to_string();
    }
    let mut out = html.to_string();
    for (c, name) in PROTECTED {
        out = out.replace(&format!("{token}{name}"), c.encode_utf8(&mut [0; 4]));
    }
    out
}
