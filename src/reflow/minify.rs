//! Whole-string passes: HTML detection, void-element normalisation,
//! textarea entities, trimming and minification.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::scan::is_void;

static START_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<[A-Za-z][A-Za-z0-9]*(?:\s[^\n>]*)?/?>")
        .expect("START_TAG: hardcoded regex is valid")
});

// Namespaced (`svg:rect`) and custom (`my-el`) names; the close tag is
// checked separately.
static NAMED_ELEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<((?:[A-Za-z][A-Za-z0-9._]*:)?[A-Za-z][A-Za-z0-9._-]*)(?:\s[^>]*)?>")
        .expect("NAMED_ELEMENT: hardcoded regex is valid")
});

static NAMED_CLOSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"</((?:[A-Za-z][A-Za-z0-9._]*:)?[A-Za-z][A-Za-z0-9._-]*)>")
        .expect("NAMED_CLOSE: hardcoded regex is valid")
});

static COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("COMMENT: hardcoded regex is valid"));

static ANY_OPEN_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<([A-Za-z][A-Za-z0-9:-]*)([^>]*)>").expect("ANY_OPEN_TAG: hardcoded regex is valid")
});

static TEXTAREA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)(<textarea(?:\s[^>]*)?>)(.*?)(</textarea\s*>)")
        .expect("TEXTAREA: hardcoded regex is valid")
});

static CONTROL_WS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\n\r\t]").expect("CONTROL_WS: hardcoded regex is valid"));

static BETWEEN_TAGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r">\s+<").expect("BETWEEN_TAGS: hardcoded regex is valid"));

static SPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" {2,}").expect("SPACE_RUN: hardcoded regex is valid"));

static SPACED_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<\s*/").expect("SPACED_CLOSE: hardcoded regex is valid"));

static DQ_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([A-Za-z0-9_:-]+)="\s*([^"]*?)\s*""#).expect("DQ_VALUE: hardcoded regex is valid")
});

static SQ_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Za-z0-9_:-]+)='\s*([^']*?)\s*'").expect("SQ_VALUE: hardcoded regex is valid")
});

/// Does `content` contain at least one HTML or custom element?
pub fn is_html(content: &str) -> bool {
    if START_TAG.is_match(content) {
        return true;
    }
    // Start of the last close tag for each name.
    let mut last_close: HashMap<&str, usize> = HashMap::new();
    for caps in NAMED_CLOSE.captures_iter(content) {
        if let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) {
            last_close.insert(name.as_str(), whole.start());
        }
    }
    if last_close.is_empty() {
        return false;
    }
    NAMED_ELEMENT.captures_iter(content).any(|caps| {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            return false;
        };
        last_close
            .get(name.as_str())
            .is_some_and(|&close| close >= whole.end())
    })
}

/// Void elements become `<x />`; other `<x/>` become `<x></x>`.
///
/// ```
/// assert_eq!(codepro::reflow::closify("<p>a<br>b<i/></p>"), "<p>a<br />b<i></i></p>");
/// ```
pub fn closify(html: &str) -> String {
    ANY_OPEN_TAG
        .replace_all(html, |caps: &Captures<'_>| {
            let name = &caps[1];
            let attrs = caps[2].trim_end();
            let (attrs, slashed) = match attrs.strip_suffix('/') {
                Some(a) => (a.trim_end(), true),
                None => (attrs, false),
            };
            if is_void(name.as_bytes()) {
                format!("<{name}{attrs} />")
            } else if slashed {
                format!("<{name}{attrs}></{name}>")
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

/// Spell textarea content with entities so no later pass can change it.
pub fn entify(html: &str) -> String {
    TEXTAREA
        .replace_all(html, |caps: &Captures<'_>| {
            let mut out = String::with_capacity(caps[0].len() + 16);
            out.push_str(&caps[1]);
            for c in caps[2].chars() {
                match c {
                    '<' => out.push_str("&lt;"),
                    '>' => out.push_str("&gt;"),
                    '"' => out.push_str("&quot;"),
                    '\'' => out.push_str("&apos;"),
                    '\n' => out.push_str("&#10;"),
                    '\r' => out.push_str("&#13;"),
                    c if c.is_whitespace() => out.push_str("&nbsp;"),
                    c => out.push(c),
                }
            }
            out.push_str(&caps[3]);
            out
        })
        .into_owned()
}

/// Remove every comment.
pub(crate) fn strip_comments(html: &str) -> String {
    COMMENT.replace_all(html, "").into_owned()
}

/// Strip whitespace just inside the given elements.
pub(crate) fn trimify(html: &str, tags: &[String]) -> String {
    let mut out = Cow::Borrowed(html);
    for tag in tags {
        let tag = regex::escape(tag);
        let leading = Regex::new(&format!(r"(?i)(<{tag}(?:\s[^>]*)?>)\s+"));
        let trailing = Regex::new(&format!(r"(?i)\s+(</{tag}>)"));
        if let (Ok(leading), Ok(trailing)) = (leading, trailing) {
            let once = leading.replace_all(&out, "$1").into_owned();
            out = Cow::Owned(trailing.replace_all(&once, "$1").into_owned());
        }
    }
    out.into_owned()
}

/// Single-line form, without the HTML check.
pub(crate) fn minify_markup(html: &str) -> String {
    let html = entify(html);
    let html = CONTROL_WS.replace_all(&html, " ");
    let html = BETWEEN_TAGS.replace_all(&html, "><");
    let html = SPACE_RUN.replace_all(&html, " ");
    let html = html.replace(" >", ">").replace(" <", "<").replace("> ", ">");
    let html = SPACED_CLOSE.replace_all(&html, "</");
    let html = html.replace(" = ", "=");
    let html = DQ_VALUE.replace_all(&html, r#"${1}="${2}""#);
    let html = SQ_VALUE.replace_all(&html, "${1}='${2}'");
    html.trim().to_string()
}
