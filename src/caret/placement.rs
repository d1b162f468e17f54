//! Safe marker offsets.
//!
//! The climb starts at the innermost node ending at or containing the
//! cursor and stops at the first boundary a marker can sit on: the cursor
//! itself inside text, before an opening or closing tag, after a tag, or
//! before an element. Afterwards any enclosing element whose content is not
//! normal markup (`script`, `svg`, `title`, void elements, ...) pulls the
//! offset out in front of itself.

use log::{debug, trace};
use thiserror::Error;

use crate::offset::floor_char_boundary;
use crate::syntax::{NodeKind, Side, SyntaxNode, SyntaxTree};

/// Elements a marker must never be placed inside.
pub const DISALLOWED_TAGS: &[&str] = &[
    "script", "style", "textarea", "title", "noscript", "option", "optgroup", "select", "svg",
    "math", "object", "iframe", "head", "meta", "link", "base", "source", "track", "param", "img",
    "input", "br", "hr", "col", "embed", "area", "wbr",
];

/// The climb reached the document root without finding a boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no safe marker position")]
pub struct PlacementNotFound;

/// Outcome of looking at one node on the way up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Place(usize),
    Climb,
}

fn is_disallowed_tag(name: &str) -> bool {
    DISALLOWED_TAGS.iter().any(|t| t.eq_ignore_ascii_case(name))
}

fn next_element_or_climb(node: SyntaxNode<'_>) -> Step {
    match node.next_sibling() {
        Some(next) if next.kind() == NodeKind::Element => Step::Place(next.from()),
        _ => Step::Climb,
    }
}

fn classify(node: SyntaxNode<'_>, first: bool, cursor: usize) -> Step {
    match node.kind() {
        NodeKind::Text if first => Step::Place(cursor),
        NodeKind::Text => Step::Place(node.from()),
        NodeKind::EndTag | NodeKind::SelfClosingTag => Step::Place(node.to()),
        NodeKind::StartTag | NodeKind::StartCloseTag | NodeKind::Comment => {
            Step::Place(node.from())
        }
        NodeKind::Element => Step::Place(node.from()),
        NodeKind::Document if first => Step::Place(cursor),
        // Inside a tag, an attribute or raw text: never a boundary itself.
        NodeKind::TagName
        | NodeKind::Attribute
        | NodeKind::AttributeName
        | NodeKind::Is
        | NodeKind::AttributeValue
        | NodeKind::UnquotedAttributeValue
        | NodeKind::ScriptText
        | NodeKind::StyleText
        | NodeKind::TextareaText
        | NodeKind::MismatchedCloseTag => next_element_or_climb(node),
        NodeKind::Document
        | NodeKind::OpenTag
        | NodeKind::CloseTag
        | NodeKind::SelfClosingEndTag
        | NodeKind::DoctypeDecl
        | NodeKind::ProcessingInst => next_element_or_climb(node),
    }
}

/// Outermost enclosing element (the node itself included) that is in
/// [`DISALLOWED_TAGS`].
fn outermost_disallowed<'t>(node: SyntaxNode<'t>, text: &str) -> Option<SyntaxNode<'t>> {
    node.ancestors()
        .filter(|n| n.kind() == NodeKind::Element)
        .filter(|n| n.tag_name(text).is_some_and(is_disallowed_tag))
        .last()
}

/// Byte offset where a marker can go without splitting markup.
pub fn safe_insertion_offset(
    tree: &SyntaxTree,
    text: &str,
    cursor: usize,
) -> Result<usize, PlacementNotFound> {
    let cursor = floor_char_boundary(text, cursor);
    let start = tree.resolve(cursor, Side::Before);
    trace!("cursor {cursor} resolves to {start:?}");

    let mut node = start;
    let mut first = true;
    let candidate = loop {
        match classify(node, first, cursor) {
            Step::Place(offset) => break offset,
            Step::Climb => {
                trace!("climbing out of {}", node.kind());
                node = node.parent().ok_or(PlacementNotFound)?;
                first = false;
            }
        }
    };

    match outermost_disallowed(start, text) {
        Some(container) => {
            debug!(
                "marker moved out of <{}> to {}",
                container.tag_name(text).unwrap_or_default(),
                container.from()
            );
            Ok(container.from())
        }
        None => Ok(candidate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(text: &str, cursor: usize) -> Result<usize, PlacementNotFound> {
        let tree = SyntaxTree::parse(text);
        safe_insertion_offset(&tree, text, cursor)
    }

    #[test]
    fn text_positions() {
        let s = "<div>Hello world</div>";
        assert_eq!(place(s, 0), Ok(0));
        assert_eq!(place(s, 8), Ok(8));
        assert_eq!(place(s, 16), Ok(16));
        assert_eq!(place(s, 17), Ok(16));
        assert_eq!(place(s, s.len()), Ok(s.len()));
    }

    #[test]
    fn tag_name_hoists_to_element_start() {
        let s = "<div><he></he></div>";
        assert_eq!(place(s, 6), Ok(5));
        assert_eq!(place(s, 7), Ok(5));
        assert_eq!(place(s, 8), Ok(5));
        // right after `<he>`
        assert_eq!(place(s, 9), Ok(9));
    }

    #[test]
    fn attribute_hoists_before_element() {
        let s = r#"<p>x</p><a href="one two">t</a>"#;
        for cursor in 10..26 {
            assert_eq!(place(s, cursor), Ok(8), "cursor {cursor}");
        }
    }

    #[test]
    fn next_sibling_element_wins() {
        let s = "<p>a</p><!x><i>b</i>";
        // inside the doctype-like declaration
        assert_eq!(place(s, 10), Ok(12));
    }

    #[test]
    fn stray_close_tag_moves_to_the_next_element() {
        let s = "<p>x</p></i><b>y</b>";
        // on the `i` of a close tag with no open element
        assert_eq!(place(s, 10), Ok(8));
        assert_eq!(place(s, 11), Ok(12));
    }

    #[test]
    fn disallowed_container_promotes() {
        let s = "<style>.x{color:red}</style>\n<p>first <b>bold</b></p>";
        for cursor in 8..20 {
            assert_eq!(place(s, cursor), Ok(0));
        }
        let s = "<p><svg><g><text>t</text></g></svg></p>";
        assert_eq!(place(s, 18), Ok(3));
    }

    #[test]
    fn after_void_element_moves_in_front_of_it() {
        let s = "a<br>b";
        assert_eq!(place(s, 5), Ok(1));
        assert_eq!(place(s, 6), Ok(6));
    }

    #[test]
    fn gives_up_at_the_root() {
        // inside a top-level declaration with nothing after it
        let s = "<!doctype html>";
        assert_eq!(place(s, 5), Err(PlacementNotFound));
    }

    #[test]
    fn deterministic() {
        let s = "<ul><li>a<li>b</ul><script>x</script>";
        for cursor in 0..=s.len() {
            assert_eq!(place(s, cursor), place(s, cursor));
        }
    }
}
