//! Comment preservation.
//!
//! Comments are not part of the syntax tree. The scanner extracts them into a
//! side table owned by one compile unit, and nodes reference them by id in
//! their leading/trailing lists. Structural rewrites therefore cannot
//! duplicate or drop a comment: the table is the single source of truth, and
//! the formatter walks it when splicing comments back into the output.

use crate::span::Span;
use serde::{Deserialize, Serialize};

/// Stable handle into a [`CommentsConsumer`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentKind {
    /// `// ...` to end of line.
    Line,
    /// `/* ... */`, possibly spanning lines.
    Block,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub kind: CommentKind,
    /// Comment text without the `//` / `/* */` delimiters.
    pub text: String,
    pub span: Span,
    /// Whether a newline followed the comment in the source.
    pub has_trailing_newline: bool,
}

impl Comment {
    pub fn is_block(&self) -> bool {
        self.kind == CommentKind::Block
    }
}

/// Owner of all comments for one compile unit.
///
/// Built once by the parser; mutated only by the visitor engine when a pass
/// injects or deletes a comment. Removal tombstones the slot so ids held by
/// nodes stay stable.
#[derive(Clone, Debug, Default)]
pub struct CommentsConsumer {
    slots: Vec<Option<Comment>>,
}

impl CommentsConsumer {
    pub fn new() -> CommentsConsumer {
        CommentsConsumer::default()
    }

    /// Insert a comment, assigning it the next id.
    pub fn add(&mut self, kind: CommentKind, text: impl Into<String>, span: Span) -> CommentId {
        self.add_with_newline(kind, text, span, false)
    }

    pub fn add_with_newline(
        &mut self,
        kind: CommentKind,
        text: impl Into<String>,
        span: Span,
        has_trailing_newline: bool,
    ) -> CommentId {
        let id = CommentId(self.slots.len() as u32);
        self.slots.push(Some(Comment {
            id,
            kind,
            text: text.into(),
            span,
            has_trailing_newline,
        }));
        id
    }

    pub fn get(&self, id: CommentId) -> Option<&Comment> {
        self.slots.get(id.0 as usize).and_then(|s| s.as_ref())
    }

    /// Replace a comment's text in place, keeping its id and anchor.
    pub fn update(&mut self, id: CommentId, text: impl Into<String>) -> bool {
        match self.slots.get_mut(id.0 as usize) {
            Some(Some(comment)) => {
                comment.text = text.into();
                true
            }
            _ => false,
        }
    }

    /// Delete a comment. Its id becomes a dangling reference that `get`
    /// answers with `None`, which the formatter treats as "skip".
    pub fn remove(&mut self, id: CommentId) -> Option<Comment> {
        self.slots.get_mut(id.0 as usize).and_then(|s| s.take())
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Comment> {
        self.slots.iter().filter_map(|s| s.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_survive_removal() {
        let mut table = CommentsConsumer::new();
        let a = table.add(CommentKind::Line, " first", Span::new(0, 8));
        let b = table.add(CommentKind::Block, " second ", Span::new(9, 21));
        assert_eq!(table.len(), 2);

        table.remove(a);
        assert!(table.get(a).is_none());
        // b keeps its id and content after a is tombstoned
        assert_eq!(table.get(b).unwrap().text, " second ");
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn update_rewrites_text_in_place() {
        let mut table = CommentsConsumer::new();
        let id = table.add(CommentKind::Line, " todo", Span::new(0, 7));
        assert!(table.update(id, " done"));
        assert_eq!(table.get(id).unwrap().text, " done");
        assert!(!table.update(CommentId(99), "nope"));
    }
}
