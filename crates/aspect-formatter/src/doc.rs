//! The document algebra.
//!
//! Builders turn syntax nodes into a tree of these layout primitives; the
//! printer then decides, group by group, whether the flat rendering fits the
//! print width. The algebra is the usual Wadler-style set plus `Fill` (pack
//! as many items per line as fit, deciding per separator instead of per
//! group), `LineSuffix` (defer text to the end of the current line, used for
//! trailing comments), and `BreakParent` (force every enclosing group to
//! break).

#[derive(Clone, Debug, PartialEq)]
pub enum Doc {
    Text(String),
    Concat(Vec<Doc>),
    /// Space when flat, newline when broken.
    Line,
    /// Nothing when flat, newline when broken.
    SoftLine,
    /// Always a newline; forces enclosing groups to break.
    HardLine,
    Indent(Box<Doc>),
    Group(Box<Doc>),
    /// Alternating content and separator elements, starting and ending with
    /// content. Each separator breaks independently.
    Fill(Vec<Doc>),
    /// Held back until the next newline (or end of output).
    LineSuffix(Box<Doc>),
    BreakParent,
}

impl Doc {
    pub fn nil() -> Doc {
        Doc::Concat(Vec::new())
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Doc::Concat(list) if list.is_empty())
            || matches!(self, Doc::Text(text) if text.is_empty())
    }
}

pub fn text(text: impl Into<String>) -> Doc {
    Doc::Text(text.into())
}

pub fn concat(docs: Vec<Doc>) -> Doc {
    Doc::Concat(docs)
}

pub fn group(doc: Doc) -> Doc {
    Doc::Group(Box::new(doc))
}

pub fn indent(doc: Doc) -> Doc {
    Doc::Indent(Box::new(doc))
}

pub fn line_suffix(doc: Doc) -> Doc {
    Doc::LineSuffix(Box::new(doc))
}

/// Interleave a separator between docs.
pub fn join(separator: Doc, docs: Vec<Doc>) -> Doc {
    let mut out = Vec::with_capacity(docs.len() * 2);
    for doc in docs {
        if !out.is_empty() {
            out.push(separator.clone());
        }
        out.push(doc);
    }
    Doc::Concat(out)
}

/// Whether the doc contains a hard line or break-parent anywhere reachable
/// by the printer's measuring pass. Line-suffix content does not count: it
/// never participates in layout.
pub fn contains_forced_break(doc: &Doc) -> bool {
    match doc {
        Doc::HardLine | Doc::BreakParent => true,
        Doc::Text(_) | Doc::Line | Doc::SoftLine | Doc::LineSuffix(_) => false,
        Doc::Concat(list) | Doc::Fill(list) => list.iter().any(contains_forced_break),
        Doc::Indent(inner) | Doc::Group(inner) => contains_forced_break(inner),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_interleaves() {
        let doc = join(text(", "), vec![text("a"), text("b"), text("c")]);
        assert_eq!(
            doc,
            concat(vec![text("a"), text(", "), text("b"), text(", "), text("c")])
        );
    }

    #[test]
    fn forced_breaks_are_found_through_groups_but_not_suffixes() {
        assert!(contains_forced_break(&group(concat(vec![
            text("a"),
            Doc::HardLine
        ]))));
        assert!(contains_forced_break(&indent(Doc::BreakParent)));
        assert!(!contains_forced_break(&line_suffix(Doc::HardLine)));
        assert!(!contains_forced_break(&concat(vec![text("a"), Doc::Line])));
    }
}
