//! Builders for JSX elements, fragments, and attributes.

use aspect_parser::NodeIndex;

use super::DocBuilder;
use crate::doc::{Doc, concat, group, indent, join, text};

impl DocBuilder<'_> {
    pub(crate) fn jsx_element(
        &self,
        name: NodeIndex,
        attributes: &[NodeIndex],
        children: &[NodeIndex],
        self_closing: bool,
    ) -> Doc {
        let mut open = vec![text("<"), self.node(name)];
        if !attributes.is_empty() {
            open.push(indent(concat(vec![
                Doc::Line,
                join(Doc::Line, attributes.iter().map(|a| self.node(*a)).collect()),
            ])));
        }
        if self_closing {
            open.push(if attributes.is_empty() {
                text(" />")
            } else {
                concat(vec![Doc::Line, text("/>")])
            });
            return group(concat(open));
        }
        open.push(if attributes.is_empty() {
            text(">")
        } else {
            concat(vec![Doc::SoftLine, text(">")])
        });

        let children_doc = self.jsx_children(children);
        concat(vec![
            group(concat(open)),
            children_doc,
            text("</"),
            self.node(name),
            text(">"),
        ])
    }

    pub(crate) fn jsx_fragment(&self, children: &[NodeIndex]) -> Doc {
        concat(vec![text("<>"), self.jsx_children(children), text("</>")])
    }

    fn jsx_children(&self, children: &[NodeIndex]) -> Doc {
        let rendered: Vec<Doc> = children
            .iter()
            .filter_map(|child| {
                let doc = self.node(*child);
                if doc.is_nil() { None } else { Some(doc) }
            })
            .collect();
        if rendered.is_empty() {
            return Doc::nil();
        }
        concat(vec![
            indent(concat(vec![
                Doc::HardLine,
                join(Doc::HardLine, rendered),
            ])),
            Doc::HardLine,
        ])
    }

    pub(crate) fn jsx_attribute(&self, name: NodeIndex, value: NodeIndex) -> Doc {
        if value.is_none() {
            return self.node(name);
        }
        concat(vec![self.node(name), text("="), self.node(value)])
    }

    pub(crate) fn jsx_spread_attribute(&self, argument: NodeIndex) -> Doc {
        concat(vec![text("{..."), self.expression(argument, 0), text("}")])
    }

    pub(crate) fn jsx_expression(&self, expression: NodeIndex) -> Doc {
        if expression.is_none() {
            // `{}` children carry only comments; nothing to print.
            return Doc::nil();
        }
        concat(vec![text("{"), self.expression(expression, 0), text("}")])
    }

    /// Raw text runs collapse to single spaces between words; whitespace-only
    /// runs disappear (the hard lines between children stand in for them).
    pub(crate) fn jsx_text(&self, value: &str) -> Doc {
        let collapsed: Vec<&str> = value.split_whitespace().collect();
        if collapsed.is_empty() {
            return Doc::nil();
        }
        text(collapsed.join(" "))
    }
}
