//! Tokenizer and line layout.

use std::sync::LazyLock;

use memchr::memchr;
use regex::Regex;

use super::Reflow;
use crate::scan::{
    comment_end, find_close_tag, find_tag_end, is_name_char, is_void, is_ws, parse_tag_info,
    starts_markup,
};

static EMPTY_BODY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<([A-Za-z][A-Za-z0-9:._-]*)([^>]*[^/>])?>\s+</")
        .expect("EMPTY_BODY: hardcoded regex is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    /// Open tag, close tag, comment, doctype.
    Tag,
    Text,
    /// A whole element kept on one line (textarea).
    Inline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Token<'a> {
    pub kind: TokenKind,
    pub value: &'a str,
}

impl Token<'_> {
    fn is_closing(&self) -> bool {
        self.kind == TokenKind::Tag && self.value.starts_with("</")
    }

    /// Tokens after which depth does not grow.
    fn is_leaf(&self) -> bool {
        match self.kind {
            TokenKind::Text | TokenKind::Inline => true,
            TokenKind::Tag => {
                self.value.starts_with("</")
                    || self.value.starts_with("<!")
                    || self.value.starts_with("<?")
                    || self.value.ends_with("/>")
            }
        }
    }
}

/* =============================== Tokenizer =============================== */

/// Split minified markup into tags and text. Whitespace-only text is dropped.
pub(crate) fn tokenize(html: &str) -> Vec<Token<'_>> {
    let s = html.as_bytes();
    let n = s.len();
    let mut tokens = Vec::new();
    let mut i = 0usize;

    while i < n {
        if !starts_markup(s, i) {
            let mut j = i + 1;
            loop {
                match memchr(b'<', &s[j..]) {
                    Some(p) if starts_markup(s, j + p) => {
                        j += p;
                        break;
                    }
                    Some(p) => j += p + 1,
                    None => {
                        j = n;
                        break;
                    }
                }
            }
            let value = &html[i..j];
            if !value.trim().is_empty() {
                tokens.push(Token {
                    kind: TokenKind::Text,
                    value,
                });
            }
            i = j;
            continue;
        }

        let end = if s[i..].starts_with(b"<!--") {
            comment_end(s, i).unwrap_or(n)
        } else {
            match find_tag_end(s, i) {
                Some(gt) => gt + 1,
                None => {
                    tokens.push(Token {
                        kind: TokenKind::Text,
                        value: &html[i..],
                    });
                    break;
                }
            }
        };
        let tag = &html[i..end];
        let info = parse_tag_info(tag.as_bytes());

        if !info.is_end && !info.self_closing && !tag.starts_with("<!") {
            let name = info.name.to_ascii_lowercase();
            if name == b"textarea" {
                if let Some(close) = find_close_tag(s, end, b"textarea") {
                    let close_end = find_tag_end(s, close).map_or(n, |gt| gt + 1);
                    tokens.push(Token {
                        kind: TokenKind::Inline,
                        value: &html[i..close_end],
                    });
                    i = close_end;
                    continue;
                }
            } else if name == b"script" || name == b"style" {
                tokens.push(Token {
                    kind: TokenKind::Tag,
                    value: tag,
                });
                let body_end = find_close_tag(s, end, &name).unwrap_or(n);
                let body = &html[end..body_end];
                if !body.trim().is_empty() {
                    tokens.push(Token {
                        kind: TokenKind::Text,
                        value: body,
                    });
                }
                i = body_end;
                continue;
            }
        }

        tokens.push(Token {
            kind: TokenKind::Tag,
            value: tag,
        });
        i = end;
    }
    tokens
}

/* ================================ Layout ================================= */

fn starts_with_orphan_punctuation(value: &str) -> bool {
    matches!(value.as_bytes().first(), Some(b'!' | b',' | b';' | b'.'))
}

impl Reflow<'_> {
    /// Lay the tokens out one per line, indented by nesting depth.
    pub(crate) fn layout(&self, tokens: &[Token<'_>]) -> Vec<String> {
        let mut lines: Vec<String> = Vec::with_capacity(tokens.len());
        let mut depth = 0usize;

        for (index, token) in tokens.iter().enumerate() {
            let prev = index.checked_sub(1).map(|p| &tokens[p]);

            depth += 1;
            let mut sub = 0usize;
            if index == 0 {
                sub += 1;
            }
            if token.is_closing() {
                sub += 1;
            }
            if prev.is_some_and(Token::is_leaf) {
                sub += 1;
            }
            depth = depth.saturating_sub(sub);

            let mut value = token.value;
            if token.kind == TokenKind::Text && starts_with_orphan_punctuation(value) {
                if let Some(last) = lines.last_mut() {
                    last.push_str(&value[..1]);
                    value = value[1..].trim();
                    if value.is_empty() {
                        continue;
                    }
                }
            }

            let padding = self.step.repeat(depth);
            let content_wrap = self.config.content_wrap();
            let tag_wrap = self.config.tag_wrap();

            let line = if token.kind == TokenKind::Text
                && content_wrap > 0
                && value.chars().count() >= content_wrap
            {
                word_wrap(value, content_wrap, &padding)
            } else if token.kind == TokenKind::Tag
                && tag_wrap > 0
                && value.chars().count() > tag_wrap
            {
                self.wrap_tag(value, &padding)
                    .unwrap_or_else(|| format!("{padding}{value}"))
            } else {
                format!("{padding}{value}")
            };
            lines.push(line);
        }
        lines
    }

    /// One attribute per line, one level deeper than the tag. `None` when
    /// `tag` is not an open tag or has no attributes.
    fn wrap_tag(&self, tag: &str, padding: &str) -> Option<String> {
        let s = tag.as_bytes();
        if s.len() < 3 || !s[1].is_ascii_alphabetic() {
            return None;
        }
        let mut k = 1;
        while k < s.len() && is_name_char(s[k]) {
            k += 1;
        }
        let name = &tag[1..k];

        let close = if tag.ends_with("/>") { "/>" } else { ">" };
        let inner = &tag[k..tag.len() - close.len()];
        let attributes = split_attributes(inner);
        if attributes.is_empty() {
            return None;
        }

        let inner_padding = format!("{padding}{}", self.step);
        let mut out = format!("{padding}<{name}\n");
        for attr in attributes {
            out.push_str(&inner_padding);
            out.push_str(attr);
            out.push('\n');
        }
        out.push_str(padding);
        if self.config.strict() && is_void(name.as_bytes()) {
            out.push(' ');
        }
        out.push_str(close);
        Some(out)
    }

    /// Join empty element bodies and apply the strict slash removal.
    pub(crate) fn cleanup(&self, html: &str) -> String {
        let html = EMPTY_BODY.replace_all(html, "<$1$2></");
        if self.config.strict() {
            html.replace(" />", ">").replace("/>", ">")
        } else {
            html.into_owned()
        }
    }
}

/// Split attribute text at whitespace outside quotes.
fn split_attributes(inner: &str) -> Vec<&str> {
    let s = inner.as_bytes();
    let mut attrs = Vec::new();
    let mut quote = 0u8;
    let mut start: Option<usize> = None;
    for (i, &b) in s.iter().enumerate() {
        if quote != 0 {
            if b == quote {
                quote = 0;
            }
            continue;
        }
        if is_ws(b) {
            if let Some(st) = start.take() {
                attrs.push(&inner[st..i]);
            }
            continue;
        }
        if b == b'"' || b == b'\'' {
            quote = b;
        }
        start.get_or_insert(i);
    }
    if let Some(st) = start {
        attrs.push(&inner[st..]);
    }
    attrs
}

/// Greedy word wrap at `width` chars; every line starts with `indent`.
/// Words longer than the width get a line of their own.
pub(crate) fn word_wrap(text: &str, width: usize, indent: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let len = word.chars().count();
        if len >= width {
            if !current.is_empty() {
                lines.push(format!("{indent}{current}"));
                current.clear();
                current_len = 0;
            }
            lines.push(format!("{indent}{word}"));
            continue;
        }
        let candidate = if current.is_empty() {
            len
        } else {
            current_len + 1 + len
        };
        if candidate <= width {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
            current_len = candidate;
        } else {
            lines.push(format!("{indent}{current}"));
            current.clear();
            current.push_str(word);
            current_len = len;
        }
    }
    if !current.is_empty() {
        lines.push(format!("{indent}{current}"));
    }
    lines.join("\n")
}
