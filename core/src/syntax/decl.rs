//! # Declarations
//!
//! Typed views over the tree-sitter nodes the tag writer cares about: struct
//! type declarations, their field declarations and field tag literals.

use std::ops::Range;
use tree_sitter::Node;

/// A named struct type: `type User struct { ... }` (or an alias `type User = struct { ... }`).
#[derive(Debug, Clone, Copy)]
pub struct RecordDecl<'t> {
    node: Node<'t>,
    name: &'t str,
    field_list: Node<'t>,
    source: &'t str,
}

impl<'t> RecordDecl<'t> {
    /// Views `node` as a struct declaration, if it is one.
    pub fn from_node(node: Node<'t>, source: &'t str) -> Option<Self> {
        if !matches!(node.kind(), "type_spec" | "type_alias") {
            return None;
        }
        let ty = node.child_by_field_name("type")?;
        if ty.kind() != "struct_type" {
            return None;
        }
        let name = node.child_by_field_name("name")?;

        let mut cursor = ty.walk();
        let field_list = ty
            .children(&mut cursor)
            .find(|c| c.kind() == "field_declaration_list")?;

        Some(Self {
            node,
            name: &source[name.byte_range()],
            field_list,
            source,
        })
    }

    /// The declared type name.
    pub fn name(&self) -> &'t str {
        self.name
    }

    /// The underlying syntax node.
    pub fn node(&self) -> Node<'t> {
        self.node
    }

    /// Direct field declarations, in source order.
    ///
    /// Fields of anonymous structs nested in a field type are not included.
    pub fn fields(&self) -> Vec<FieldDecl<'t>> {
        let mut cursor = self.field_list.walk();
        let fields = self
            .field_list
            .named_children(&mut cursor)
            .filter_map(|n| FieldDecl::from_node(n, self.source))
            .collect();
        fields
    }
}

/// One field declaration, possibly binding several names (`A, B string`).
#[derive(Debug, Clone)]
pub struct FieldDecl<'t> {
    names: Vec<&'t str>,
    type_end: usize,
    tag: Option<TagLiteral<'t>>,
}

impl<'t> FieldDecl<'t> {
    /// Views `node` as a field declaration, if it is one.
    pub fn from_node(node: Node<'t>, source: &'t str) -> Option<Self> {
        if node.kind() != "field_declaration" {
            return None;
        }
        let ty = node.child_by_field_name("type")?;

        let mut cursor = node.walk();
        let names = node
            .children_by_field_name("name", &mut cursor)
            .map(|n| &source[n.byte_range()])
            .collect();

        let tag = node
            .child_by_field_name("tag")
            .and_then(|t| TagLiteral::from_node(t, source));

        Some(Self {
            names,
            type_end: ty.end_byte(),
            tag,
        })
    }

    /// Names bound by the declaration. Empty for embedded fields.
    pub fn names(&self) -> &[&'t str] {
        &self.names
    }

    /// The existing tag literal, if any.
    pub fn tag(&self) -> Option<&TagLiteral<'t>> {
        self.tag.as_ref()
    }

    /// Byte offset right after the field type, where a new tag goes.
    pub fn tag_insertion_point(&self) -> usize {
        self.type_end
    }
}

/// How a tag literal is quoted in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagQuoting {
    /// Backquoted: `` `json:"name"` ``.
    Raw,
    /// Double-quoted with escapes: `"json:\"name\""`.
    Interpreted,
}

impl TagQuoting {
    fn delimiter(self) -> char {
        match self {
            TagQuoting::Raw => '`',
            TagQuoting::Interpreted => '"',
        }
    }

    /// Wraps literal content in this quoting's delimiters.
    pub fn wrap(self, content: &str) -> String {
        let d = self.delimiter();
        format!("{d}{content}{d}")
    }
}

/// A field tag as written in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagLiteral<'t> {
    range: Range<usize>,
    text: &'t str,
    quoting: TagQuoting,
}

impl<'t> TagLiteral<'t> {
    fn from_node(node: Node<'t>, source: &'t str) -> Option<Self> {
        let quoting = match node.kind() {
            "raw_string_literal" => TagQuoting::Raw,
            "interpreted_string_literal" => TagQuoting::Interpreted,
            _ => return None,
        };
        let range = node.byte_range();
        let text = &source[range.clone()];
        (text.len() >= 2).then_some(Self {
            range,
            text,
            quoting,
        })
    }

    /// Byte range of the whole literal, delimiters included.
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// The literal exactly as written.
    pub fn text(&self) -> &'t str {
        self.text
    }

    /// The literal without its delimiters (escapes left as written).
    pub fn content(&self) -> &'t str {
        &self.text[1..self.text.len() - 1]
    }

    /// Raw or interpreted quoting.
    pub fn quoting(&self) -> TagQuoting {
        self.quoting
    }
}
