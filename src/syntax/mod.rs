//! HTML syntax tree.
//!
//! A read-only, Lezer-HTML shaped tree over a source string. Nodes live in an
//! arena owned by [`SyntaxTree`]; [`SyntaxNode`] is a small `Copy` handle, and
//! every navigation method returns a new handle instead of moving a cursor.

mod parser;

use std::fmt;
use std::fmt::Write as _;

/// Node kinds, named after the Lezer HTML grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Document,
    Element,
    OpenTag,
    CloseTag,
    SelfClosingTag,
    MismatchedCloseTag,
    /// `<`
    StartTag,
    /// `</`
    StartCloseTag,
    /// `>`
    EndTag,
    /// `/>`
    SelfClosingEndTag,
    TagName,
    Attribute,
    AttributeName,
    /// `=` between an attribute name and its value.
    Is,
    /// Quoted value, quotes included.
    AttributeValue,
    UnquotedAttributeValue,
    Text,
    Comment,
    DoctypeDecl,
    ProcessingInst,
    ScriptText,
    StyleText,
    TextareaText,
}

impl NodeKind {
    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Document => "Document",
            NodeKind::Element => "Element",
            NodeKind::OpenTag => "OpenTag",
            NodeKind::CloseTag => "CloseTag",
            NodeKind::SelfClosingTag => "SelfClosingTag",
            NodeKind::MismatchedCloseTag => "MismatchedCloseTag",
            NodeKind::StartTag => "StartTag",
            NodeKind::StartCloseTag => "StartCloseTag",
            NodeKind::EndTag => "EndTag",
            NodeKind::SelfClosingEndTag => "SelfClosingEndTag",
            NodeKind::TagName => "TagName",
            NodeKind::Attribute => "Attribute",
            NodeKind::AttributeName => "AttributeName",
            NodeKind::Is => "Is",
            NodeKind::AttributeValue => "AttributeValue",
            NodeKind::UnquotedAttributeValue => "UnquotedAttributeValue",
            NodeKind::Text => "Text",
            NodeKind::Comment => "Comment",
            NodeKind::DoctypeDecl => "DoctypeDecl",
            NodeKind::ProcessingInst => "ProcessingInst",
            NodeKind::ScriptText => "ScriptText",
            NodeKind::StyleText => "StyleText",
            NodeKind::TextareaText => "TextareaText",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which nodes [`SyntaxTree::resolve`] may enter at a boundary position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Enter nodes that end at the position (the content just before it).
    Before,
    /// Only enter nodes that strictly contain the position.
    Around,
    /// Enter nodes that start at the position.
    After,
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    from: usize,
    to: usize,
    parent: Option<usize>,
    children: Vec<usize>,
    /// Position within the parent's `children`.
    index: usize,
}

/// A parsed HTML document.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    nodes: Vec<NodeData>,
    len: usize,
}

impl SyntaxTree {
    /// Parse `text`. Never fails: malformed markup yields a best-effort tree.
    pub fn parse(text: &str) -> Self {
        parser::parse(text)
    }

    /// Length in bytes of the source this tree was parsed from.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn root(&self) -> SyntaxNode<'_> {
        SyntaxNode { tree: self, id: 0 }
    }

    /// Innermost node covering `pos`; the root when no child qualifies.
    pub fn resolve(&self, pos: usize, side: Side) -> SyntaxNode<'_> {
        let mut node = self.root();
        'descend: loop {
            for child in node.children() {
                let enters = match side {
                    Side::Before => child.from() < pos && child.to() >= pos,
                    Side::Around => child.from() < pos && child.to() > pos,
                    Side::After => child.from() <= pos && child.to() > pos,
                };
                if enters {
                    node = child;
                    continue 'descend;
                }
                if child.from() > pos {
                    break;
                }
            }
            return node;
        }
    }

    /// Render the whole tree, one node per line, indented by depth.
    pub fn dump(&self, text: &str) -> String {
        let mut out = String::new();
        let mut stack = vec![(self.root(), 0usize)];
        while let Some((node, depth)) = stack.pop() {
            let _ = writeln!(
                out,
                "{}{} [{}, {}]: \"{}\"",
                "  ".repeat(depth),
                node.kind(),
                node.from(),
                node.to(),
                escape_newlines(node.text(text)),
            );
            stack.extend(node.children().rev().map(|c| (c, depth + 1)));
        }
        out
    }

    /// Render the path from the node at `pos` up to the root, listing the
    /// siblings at every level and pointing at the one on the path.
    pub fn dump_path_to_root(&self, text: &str, pos: usize) -> String {
        let mut out = String::new();
        for (level, node) in self.resolve(pos, Side::Before).ancestors().enumerate() {
            let indent = "  ".repeat(level);
            let Some(parent) = node.parent() else {
                let _ = writeln!(out, "{indent}-> {} [{}, {}]", node.kind(), node.from(), node.to());
                break;
            };
            for sibling in parent.children() {
                let pointer = if sibling == node { "-> " } else { "   " };
                let _ = writeln!(
                    out,
                    "{indent}{pointer}{} [{}, {}]: \"{}\"",
                    sibling.kind(),
                    sibling.from(),
                    sibling.to(),
                    escape_newlines(sibling.text(text)),
                );
            }
        }
        out
    }
}

fn escape_newlines(s: &str) -> String {
    s.replace('\n', "\\n")
}

/// A handle to one node of a [`SyntaxTree`].
#[derive(Clone, Copy)]
pub struct SyntaxNode<'t> {
    tree: &'t SyntaxTree,
    id: usize,
}

impl PartialEq for SyntaxNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for SyntaxNode<'_> {}

impl fmt::Debug for SyntaxNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}..{}]", self.kind(), self.from(), self.to())
    }
}

impl<'t> SyntaxNode<'t> {
    fn data(&self) -> &'t NodeData {
        &self.tree.nodes[self.id]
    }

    fn at(&self, id: usize) -> SyntaxNode<'t> {
        SyntaxNode { tree: self.tree, id }
    }

    pub fn kind(&self) -> NodeKind {
        self.data().kind
    }

    pub fn from(&self) -> usize {
        self.data().from
    }

    pub fn to(&self) -> usize {
        self.data().to
    }

    pub fn parent(&self) -> Option<SyntaxNode<'t>> {
        self.data().parent.map(|id| self.at(id))
    }

    pub fn first_child(&self) -> Option<SyntaxNode<'t>> {
        self.data().children.first().map(|&id| self.at(id))
    }

    pub fn last_child(&self) -> Option<SyntaxNode<'t>> {
        self.data().children.last().map(|&id| self.at(id))
    }

    pub fn next_sibling(&self) -> Option<SyntaxNode<'t>> {
        let parent = self.parent()?;
        let index = self.data().index + 1;
        parent.data().children.get(index).map(|&id| self.at(id))
    }

    pub fn prev_sibling(&self) -> Option<SyntaxNode<'t>> {
        let parent = self.parent()?;
        let index = self.data().index.checked_sub(1)?;
        parent.data().children.get(index).map(|&id| self.at(id))
    }

    pub fn children(&self) -> impl DoubleEndedIterator<Item = SyntaxNode<'t>> + 't {
        let tree = self.tree;
        self.data()
            .children
            .iter()
            .map(move |&id| SyntaxNode { tree, id })
    }

    /// This node followed by each of its ancestors up to the root.
    pub fn ancestors(&self) -> impl Iterator<Item = SyntaxNode<'t>> + 't {
        std::iter::successors(Some(*self), |node| node.parent())
    }

    /// The source text covered by this node.
    pub fn text<'a>(&self, src: &'a str) -> &'a str {
        src.get(self.from()..self.to()).unwrap_or("")
    }

    /// Tag name of an element: the text of its first `TagName` descendant.
    pub fn tag_name<'a>(&self, src: &'a str) -> Option<&'a str> {
        let mut stack = vec![*self];
        while let Some(node) = stack.pop() {
            if node.kind() == NodeKind::TagName {
                return Some(node.text(src));
            }
            stack.extend(node.children().rev());
        }
        None
    }
}
