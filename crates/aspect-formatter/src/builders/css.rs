//! Builders for stylesheet nodes.
//!
//! Selectors, at-rule preludes, and declaration values are stored as raw
//! text, so the CSS output is about structure: one selector per line when
//! the list breaks, declarations indented one level, nested at-rule bodies
//! indented recursively.

use aspect_parser::NodeIndex;

use super::DocBuilder;
use crate::doc::{Doc, concat, indent, join, text};

impl DocBuilder<'_> {
    pub(crate) fn css_stylesheet(&self, items: &[NodeIndex]) -> Doc {
        join(Doc::HardLine, items.iter().map(|i| self.node(*i)).collect())
    }

    pub(crate) fn css_rule(&self, selectors: &[NodeIndex], declarations: &[NodeIndex]) -> Doc {
        let selectors = join(
            text(", "),
            selectors.iter().map(|s| self.node(*s)).collect(),
        );
        concat(vec![
            selectors,
            text(" "),
            self.css_block(declarations),
        ])
    }

    pub(crate) fn css_at_rule(
        &self,
        name: &str,
        prelude: &str,
        body: &[NodeIndex],
        has_block: bool,
    ) -> Doc {
        let mut parts = vec![text(format!("@{name}"))];
        if !prelude.is_empty() {
            parts.push(text(format!(" {prelude}")));
        }
        if has_block {
            parts.push(text(" "));
            parts.push(self.css_block(body));
        } else {
            parts.push(text(";"));
        }
        concat(parts)
    }

    fn css_block(&self, items: &[NodeIndex]) -> Doc {
        if items.is_empty() {
            return text("{}");
        }
        concat(vec![
            text("{"),
            indent(concat(vec![
                Doc::HardLine,
                join(Doc::HardLine, items.iter().map(|i| self.node(*i)).collect()),
            ])),
            Doc::HardLine,
            text("}"),
        ])
    }

    pub(crate) fn css_declaration(&self, property: &str, value: &str, important: bool) -> Doc {
        let bang = if important { " !important" } else { "" };
        text(format!("{property}: {value}{bang};"))
    }
}
