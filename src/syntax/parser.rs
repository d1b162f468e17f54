//! Single-pass tree builder.
//!
//! - Start tags open an `Element`; void names and `/>` produce a
//!   `SelfClosingTag` element with no content.
//! - `script`, `style` and `textarea` bodies are one raw text node each.
//! - An end tag closes the nearest open element of the same name, closing
//!   everything opened after it. With no such element it becomes a
//!   `MismatchedCloseTag`.
//! - Some start tags close the open element on the top of the stack
//!   (`li` after `li`, block starts after `p`, ...).
//! - Elements closed implicitly end where their last child ends.

use log::trace;
use memchr::memchr;

use super::{NodeData, NodeKind, SyntaxTree};
use crate::scan::{
    comment_end, find_close_tag, is_name_char, is_void, is_ws, matches_ignore_ascii_case,
    starts_markup,
};

pub(super) fn parse(text: &str) -> SyntaxTree {
    let mut parser = Parser {
        src: text.as_bytes(),
        nodes: Vec::new(),
        open: Vec::new(),
    };
    parser.run();
    SyntaxTree {
        nodes: parser.nodes,
        len: text.len(),
    }
}

/* ============================ Close-on-open sets ========================= */

fn closes_p(name: &[u8]) -> bool {
    matches_ignore_ascii_case(
        name,
        &[
            b"address", b"article", b"aside", b"blockquote", b"details", b"dialog", b"dir",
            b"div", b"dl", b"fieldset", b"figcaption", b"figure", b"footer", b"form", b"h1",
            b"h2", b"h3", b"h4", b"h5", b"h6", b"header", b"hgroup", b"hr", b"main", b"menu",
            b"nav", b"ol", b"p", b"pre", b"section", b"table", b"ul",
        ],
    )
}

/// Does opening `name` implicitly close an open `top` element?
fn closes_on_open(name: &[u8], top: &[u8]) -> bool {
    let any = |set: &[&[u8]]| matches_ignore_ascii_case(top, set);
    match name {
        b"li" => any(&[b"li"]),
        b"dt" | b"dd" => any(&[b"dt", b"dd"]),
        b"rt" | b"rp" => any(&[b"rt", b"rp"]),
        b"option" => any(&[b"option"]),
        b"optgroup" => any(&[b"option", b"optgroup"]),
        b"tr" => any(&[b"tr", b"td", b"th"]),
        b"td" | b"th" => any(&[b"td", b"th"]),
        b"thead" | b"tbody" | b"tfoot" => any(&[b"thead", b"tbody", b"tfoot"]),
        _ => closes_p(name) && any(&[b"p"]),
    }
}

fn raw_text_kind(name: &[u8]) -> Option<NodeKind> {
    match name {
        b"script" => Some(NodeKind::ScriptText),
        b"style" => Some(NodeKind::StyleText),
        b"textarea" => Some(NodeKind::TextareaText),
        _ => None,
    }
}

/* ================================ Parser ================================= */

struct OpenElement {
    id: usize,
    /// Lowercased tag name.
    name: Vec<u8>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum TagEnd {
    /// `>`
    Gt,
    /// `/>`
    SlashGt,
    /// Ran into EOF or the next `<` before the tag closed.
    Unterminated,
}

struct Parser<'s> {
    src: &'s [u8],
    nodes: Vec<NodeData>,
    open: Vec<OpenElement>,
}

impl Parser<'_> {
    fn run(&mut self) {
        let n = self.src.len();
        self.node(NodeKind::Document, 0, None);

        let mut i = 0usize;
        while i < n {
            i = if !starts_markup(self.src, i) {
                self.text(i)
            } else {
                match self.src[i + 1] {
                    b'!' if self.src[i..].starts_with(b"<!--") => self.comment(i),
                    b'!' => self.declaration(i, NodeKind::DoctypeDecl),
                    b'?' => self.declaration(i, NodeKind::ProcessingInst),
                    b'/' => self.close_tag(i),
                    _ => self.start_tag(i),
                }
            };
        }

        while !self.open.is_empty() {
            self.close_implicit();
        }
        self.nodes[0].to = n;
    }

    /* ------------------------------ builder ------------------------------ */

    fn current(&self) -> usize {
        self.open.last().map_or(0, |o| o.id)
    }

    fn node(&mut self, kind: NodeKind, from: usize, parent: Option<usize>) -> usize {
        let id = self.nodes.len();
        let index = match parent {
            Some(p) => {
                let siblings = &mut self.nodes[p].children;
                siblings.push(id);
                siblings.len() - 1
            }
            None => 0,
        };
        self.nodes.push(NodeData {
            kind,
            from,
            to: from,
            parent,
            children: Vec::new(),
            index,
        });
        id
    }

    fn leaf(&mut self, kind: NodeKind, from: usize, to: usize, parent: usize) -> usize {
        let id = self.node(kind, from, Some(parent));
        self.nodes[id].to = to;
        id
    }

    fn close_implicit(&mut self) {
        if let Some(el) = self.open.pop() {
            let node = &self.nodes[el.id];
            let end = node.children.last().map_or(node.to, |&c| self.nodes[c].to);
            trace!("implicitly closing <{}>", String::from_utf8_lossy(&el.name));
            self.nodes[el.id].to = end;
        }
    }

    /* ------------------------------ content ------------------------------ */

    fn text(&mut self, i: usize) -> usize {
        let n = self.src.len();
        let mut j = i + 1;
        let end = loop {
            if j >= n {
                break n;
            }
            match memchr(b'<', &self.src[j..]) {
                Some(p) if starts_markup(self.src, j + p) => break j + p,
                Some(p) => j += p + 1,
                None => break n,
            }
        };
        let parent = self.current();
        self.leaf(NodeKind::Text, i, end, parent);
        end
    }

    fn comment(&mut self, i: usize) -> usize {
        let end = comment_end(self.src, i).unwrap_or(self.src.len());
        let parent = self.current();
        self.leaf(NodeKind::Comment, i, end, parent);
        end
    }

    fn declaration(&mut self, i: usize, kind: NodeKind) -> usize {
        let end = memchr(b'>', &self.src[i..]).map_or(self.src.len(), |p| i + p + 1);
        let parent = self.current();
        self.leaf(kind, i, end, parent);
        end
    }

    fn name_end(&self, start: usize) -> usize {
        let mut k = start;
        while k < self.src.len() && is_name_char(self.src[k]) {
            k += 1;
        }
        k
    }

    fn skip_ws(&self, mut k: usize) -> usize {
        while k < self.src.len() && is_ws(self.src[k]) {
            k += 1;
        }
        k
    }

    fn start_tag(&mut self, i: usize) -> usize {
        let name_start = i + 1;
        let name_end = self.name_end(name_start);
        let name = self.src[name_start..name_end].to_ascii_lowercase();

        while self
            .open
            .last()
            .is_some_and(|top| closes_on_open(&name, &top.name))
        {
            self.close_implicit();
        }

        let parent = self.current();
        let element = self.node(NodeKind::Element, i, Some(parent));
        let tag = self.node(NodeKind::OpenTag, i, Some(element));
        self.leaf(NodeKind::StartTag, i, i + 1, tag);
        self.leaf(NodeKind::TagName, name_start, name_end, tag);
        let (tag_end, how) = self.attributes(name_end, tag);
        self.nodes[tag].to = tag_end;
        self.nodes[element].to = tag_end;

        if how == TagEnd::SlashGt || is_void(&name) {
            self.nodes[tag].kind = NodeKind::SelfClosingTag;
            return tag_end;
        }

        let raw = raw_text_kind(&name).filter(|_| how == TagEnd::Gt);
        self.open.push(OpenElement { id: element, name });

        let Some(kind) = raw else {
            return tag_end;
        };
        let name = &self.open[self.open.len() - 1].name;
        let body_end = find_close_tag(self.src, tag_end, name).unwrap_or(self.src.len());
        if body_end > tag_end {
            self.leaf(kind, tag_end, body_end, element);
        }
        body_end
    }

    /// Attributes up to and including the tag terminator.
    /// Returns the end of the tag and how it ended.
    fn attributes(&mut self, from: usize, tag: usize) -> (usize, TagEnd) {
        let src = self.src;
        let n = src.len();
        let mut k = from;
        let mut end = from;
        loop {
            k = self.skip_ws(k);
            if k >= n {
                return (end, TagEnd::Unterminated);
            }
            match src[k] {
                b'>' => {
                    self.leaf(NodeKind::EndTag, k, k + 1, tag);
                    return (k + 1, TagEnd::Gt);
                }
                b'/' if src.get(k + 1) == Some(&b'>') => {
                    self.leaf(NodeKind::SelfClosingEndTag, k, k + 2, tag);
                    return (k + 2, TagEnd::SlashGt);
                }
                b'/' => {
                    k += 1;
                    continue;
                }
                b'<' => return (end, TagEnd::Unterminated),
                _ => {}
            }

            let attr = self.node(NodeKind::Attribute, k, Some(tag));
            let name_start = k;
            k += 1;
            while k < n && !is_ws(src[k]) && !matches!(src[k], b'=' | b'>' | b'<') {
                if src[k] == b'/' && src.get(k + 1) == Some(&b'>') {
                    break;
                }
                k += 1;
            }
            self.leaf(NodeKind::AttributeName, name_start, k, attr);
            end = k;

            let eq = self.skip_ws(k);
            if eq < n && src[eq] == b'=' {
                self.leaf(NodeKind::Is, eq, eq + 1, attr);
                end = eq + 1;
                k = eq + 1;
                let v = self.skip_ws(k);
                if v < n && (src[v] == b'"' || src[v] == b'\'') {
                    let close = memchr(src[v], &src[v + 1..]).map_or(n, |p| v + 1 + p + 1);
                    self.leaf(NodeKind::AttributeValue, v, close, attr);
                    end = close;
                    k = close;
                } else if v < n && src[v] != b'>' && src[v] != b'<' {
                    let mut w = v;
                    while w < n && !is_ws(src[w]) && src[w] != b'>' {
                        w += 1;
                    }
                    self.leaf(NodeKind::UnquotedAttributeValue, v, w, attr);
                    end = w;
                    k = w;
                }
            }
            self.nodes[attr].to = end;
        }
    }

    fn close_tag(&mut self, i: usize) -> usize {
        let name_start = i + 2;
        let name_end = self.name_end(name_start);
        let name = self.src[name_start..name_end].to_ascii_lowercase();

        let matching = self.open.iter().rposition(|o| o.name == name);
        let (kind, parent) = match matching {
            Some(depth) => {
                while self.open.len() > depth + 1 {
                    self.close_implicit();
                }
                (NodeKind::CloseTag, self.open[depth].id)
            }
            None => {
                trace!("mismatched close tag </{}>", String::from_utf8_lossy(&name));
                (NodeKind::MismatchedCloseTag, self.current())
            }
        };

        let tag = self.node(kind, i, Some(parent));
        self.leaf(NodeKind::StartCloseTag, i, name_start, tag);
        self.leaf(NodeKind::TagName, name_start, name_end, tag);

        // End tags carry no attributes; anything before '>' is skipped.
        let rest = &self.src[name_end..];
        let end = match (memchr(b'>', rest), memchr(b'<', rest)) {
            (Some(gt), lt) if lt.map_or(true, |lt| gt < lt) => {
                let gt = name_end + gt;
                self.leaf(NodeKind::EndTag, gt, gt + 1, tag);
                gt + 1
            }
            _ => name_end,
        };
        self.nodes[tag].to = end;

        if matching.is_some() {
            if let Some(el) = self.open.pop() {
                self.nodes[el.id].to = end;
            }
        }
        end
    }
}

#[cfg(test)]
mod tests {
    use crate::syntax::{NodeKind, SyntaxNode, SyntaxTree};

    fn shape(node: SyntaxNode<'_>, src: &str, out: &mut String) {
        match node.kind() {
            NodeKind::Element => {
                out.push_str(node.tag_name(src).unwrap_or("?"));
                out.push('(');
                for child in node.children() {
                    shape(child, src, out);
                }
                out.push(')');
            }
            NodeKind::Text => out.push_str("T"),
            NodeKind::OpenTag | NodeKind::CloseTag | NodeKind::SelfClosingTag => {}
            other => out.push_str(other.name()),
        }
    }

    fn outline(src: &str) -> String {
        let tree = SyntaxTree::parse(src);
        let mut out = String::new();
        for child in tree.root().children() {
            shape(child, src, &mut out);
        }
        out
    }

    #[test]
    fn open_tag_parts() {
        let src = r#"<a href="x" hidden data-n=1>t</a>"#;
        let tree = SyntaxTree::parse(src);
        let open = tree.root().first_child().unwrap().first_child().unwrap();
        let parts: Vec<_> = open.children().map(|c| (c.kind(), c.text(src))).collect();
        assert_eq!(
            parts,
            vec![
                (NodeKind::StartTag, "<"),
                (NodeKind::TagName, "a"),
                (NodeKind::Attribute, r#"href="x""#),
                (NodeKind::Attribute, "hidden"),
                (NodeKind::Attribute, "data-n=1"),
                (NodeKind::EndTag, ">"),
            ]
        );
        let href = open.children().nth(2).unwrap();
        let kinds: Vec<_> = href.children().map(|c| c.kind()).collect();
        assert_eq!(
            kinds,
            vec![NodeKind::AttributeName, NodeKind::Is, NodeKind::AttributeValue]
        );
    }

    #[test]
    fn void_and_self_closing_elements_have_no_content() {
        assert_eq!(outline("<p>a<br>b<x/></p>"), "p(Tbr()Tx())");
        let tree = SyntaxTree::parse("<br>");
        let tag = tree.root().first_child().unwrap().first_child().unwrap();
        assert_eq!(tag.kind(), NodeKind::SelfClosingTag);
    }

    #[test]
    fn raw_text_bodies_are_single_nodes() {
        let src = "<script>if (a<b) x();</script><p>t</p>";
        let tree = SyntaxTree::parse(src);
        let script = tree.root().first_child().unwrap();
        let body = script.children().nth(1).unwrap();
        assert_eq!(body.kind(), NodeKind::ScriptText);
        assert_eq!(body.text(src), "if (a<b) x();");
        assert_eq!(script.to(), 30);
        assert_eq!(outline(src), "script(ScriptText)p(T)");
    }

    #[test]
    fn implicit_closing() {
        assert_eq!(outline("<ul><li>a<li>b</ul>"), "ul(li(T)li(T))");
        assert_eq!(outline("<p>a<div>b</div>"), "p(T)div(T)");
        assert_eq!(outline("<div><span>a</div>x"), "div(span(T))T");
    }

    #[test]
    fn implicitly_closed_element_ends_at_last_child() {
        let src = "<div><span>ab</div>";
        let tree = SyntaxTree::parse(src);
        let div = tree.root().first_child().unwrap();
        let span = div.children().nth(1).unwrap();
        assert_eq!((span.from(), span.to()), (5, 13));
        assert_eq!(div.to(), src.len());
    }

    #[test]
    fn mismatched_close_tag() {
        assert_eq!(outline("<p>a</b></p>"), "p(TMismatchedCloseTag)");
    }

    #[test]
    fn comments_doctype_and_lone_brackets() {
        assert_eq!(
            outline("<!DOCTYPE html><!-- a > b --><p>1 < 2</p>"),
            "DoctypeDeclCommentp(T)"
        );
    }

    #[test]
    fn unterminated_constructs_do_not_panic() {
        for src in ["<", "<a", "<a href=\"x", "</", "</a", "<!--", "<p><script>x", "<a b=>"] {
            let tree = SyntaxTree::parse(src);
            assert_eq!(tree.root().to(), src.len());
            for pos in 0..=src.len() {
                tree.resolve(pos, crate::syntax::Side::Before);
            }
        }
    }
}
