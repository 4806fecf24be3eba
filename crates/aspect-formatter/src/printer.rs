//! Width-constrained layout.
//!
//! A stack machine over `(indent, mode, doc)` frames. Groups measure their
//! flat rendering against the remaining width and commit to one mode; fill
//! sequences decide per separator; line suffixes are buffered and flushed at
//! the next newline. The output is deterministic and ends with exactly one
//! trailing newline.

use serde::{Deserialize, Serialize};

use crate::doc::{Doc, contains_forced_break};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndentStyle {
    Tab,
    Space,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FormatOptions {
    pub print_width: usize,
    pub indent_style: IndentStyle,
    pub indent_width: usize,
    /// Indentation levels applied to every line, for embedding formatted
    /// fragments into surrounding text.
    pub root_indent: usize,
}

impl Default for FormatOptions {
    fn default() -> FormatOptions {
        FormatOptions {
            print_width: 80,
            indent_style: IndentStyle::Space,
            indent_width: 2,
            root_indent: 0,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum PrintMode {
    Flat,
    Break,
}

/// Render a document to text.
pub fn print(doc: &Doc, options: &FormatOptions) -> String {
    Printer::new(options).render(doc)
}

struct Printer<'a> {
    options: &'a FormatOptions,
    out: String,
    column: usize,
    line_suffixes: Vec<String>,
}

enum Frame<'a> {
    Doc(&'a Doc, usize, PrintMode),
    /// One separator of a fill, with the content that follows it.
    FillSeparator {
        separator: &'a Doc,
        content: &'a Doc,
        indent: usize,
    },
}

impl<'a> Printer<'a> {
    fn new(options: &'a FormatOptions) -> Printer<'a> {
        Printer {
            options,
            out: String::new(),
            column: 0,
            line_suffixes: Vec::new(),
        }
    }

    fn render(mut self, doc: &'a Doc) -> String {
        let root_indent = self.options.root_indent * self.options.indent_width;
        if root_indent > 0 {
            self.push_indent(root_indent);
            self.column = root_indent;
        }

        let mut stack = vec![Frame::Doc(doc, root_indent, PrintMode::Break)];
        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Doc(doc, indent, mode) => self.step(doc, indent, mode, &mut stack),
                Frame::FillSeparator {
                    separator,
                    content,
                    indent,
                } => {
                    // The pair breaks only if separator-plus-content does
                    // not fit flat on the current line.
                    let remaining = self.options.print_width.saturating_sub(self.column);
                    let pair_fits = !contains_forced_break(content)
                        && fits(separator, remaining)
                            .and_then(|rest| fits(content, rest))
                            .is_some();
                    let mode = if pair_fits {
                        PrintMode::Flat
                    } else {
                        PrintMode::Break
                    };
                    stack.push(Frame::Doc(content, indent, mode));
                    stack.push(Frame::Doc(separator, indent, mode));
                }
            }
        }

        self.flush_line_suffixes();
        while self.out.ends_with(char::is_whitespace) {
            self.out.pop();
        }
        self.out.push('\n');
        self.out
    }

    fn step(&mut self, doc: &'a Doc, indent: usize, mode: PrintMode, stack: &mut Vec<Frame<'a>>) {
        match doc {
            Doc::Text(text) => {
                self.out.push_str(text);
                self.column += text.chars().count();
            }
            Doc::Concat(list) => {
                for child in list.iter().rev() {
                    stack.push(Frame::Doc(child, indent, mode));
                }
            }
            Doc::Line => match mode {
                PrintMode::Flat => {
                    self.out.push(' ');
                    self.column += 1;
                }
                PrintMode::Break => self.newline(indent),
            },
            Doc::SoftLine => {
                if mode == PrintMode::Break {
                    self.newline(indent);
                }
            }
            Doc::HardLine => self.newline(indent),
            Doc::Indent(inner) => {
                stack.push(Frame::Doc(inner, indent + self.options.indent_width, mode));
            }
            Doc::Group(inner) => {
                let remaining = self.options.print_width.saturating_sub(self.column);
                let flat = !contains_forced_break(inner) && fits(inner, remaining).is_some();
                let mode = if flat {
                    PrintMode::Flat
                } else {
                    PrintMode::Break
                };
                stack.push(Frame::Doc(inner, indent, mode));
            }
            Doc::Fill(items) => {
                let mut iter = items.iter();
                let Some(first) = iter.next() else {
                    return;
                };
                let mut frames = Vec::new();
                loop {
                    let Some(separator) = iter.next() else {
                        break;
                    };
                    let Some(content) = iter.next() else {
                        // Dangling separator prints in the surrounding mode.
                        frames.push(Frame::Doc(separator, indent, mode));
                        break;
                    };
                    frames.push(Frame::FillSeparator {
                        separator,
                        content,
                        indent,
                    });
                }
                for frame in frames.into_iter().rev() {
                    stack.push(frame);
                }
                let remaining = self.options.print_width.saturating_sub(self.column);
                let first_mode = if !contains_forced_break(first) && fits(first, remaining).is_some()
                {
                    PrintMode::Flat
                } else {
                    PrintMode::Break
                };
                stack.push(Frame::Doc(first, indent, first_mode));
            }
            Doc::LineSuffix(inner) => {
                self.line_suffixes.push(render_flat(inner));
            }
            Doc::BreakParent => {}
        }
    }

    fn newline(&mut self, indent: usize) {
        self.flush_line_suffixes();
        while self.out.ends_with(' ') || self.out.ends_with('\t') {
            self.out.pop();
        }
        self.out.push('\n');
        self.push_indent(indent);
        self.column = indent;
    }

    fn flush_line_suffixes(&mut self) {
        for suffix in std::mem::take(&mut self.line_suffixes) {
            self.out.push_str(&suffix);
            self.column += suffix.chars().count();
        }
    }

    fn push_indent(&mut self, indent: usize) {
        if indent == 0 {
            return;
        }
        match self.options.indent_style {
            IndentStyle::Space => {
                for _ in 0..indent {
                    self.out.push(' ');
                }
            }
            IndentStyle::Tab => {
                let width = self.options.indent_width.max(1);
                for _ in 0..indent / width {
                    self.out.push('\t');
                }
                for _ in 0..indent % width {
                    self.out.push(' ');
                }
            }
        }
    }
}

/// Measure a doc's flat rendering. Answers the remaining width if it fits,
/// `None` if it overflows or contains a forced break. Line-suffix content is
/// excluded: it does not occupy layout width.
fn fits(doc: &Doc, mut remaining: usize) -> Option<usize> {
    let mut stack = vec![doc];
    while let Some(doc) = stack.pop() {
        match doc {
            Doc::Text(text) => {
                let len = text.chars().count();
                if len > remaining {
                    return None;
                }
                remaining -= len;
            }
            Doc::Line => {
                if remaining == 0 {
                    return None;
                }
                remaining -= 1;
            }
            Doc::SoftLine => {}
            Doc::HardLine | Doc::BreakParent => return None,
            Doc::Concat(list) | Doc::Fill(list) => {
                for child in list.iter().rev() {
                    stack.push(child);
                }
            }
            Doc::Indent(inner) | Doc::Group(inner) => stack.push(inner),
            Doc::LineSuffix(_) => {}
        }
    }
    Some(remaining)
}

/// Render ignoring width, flattening every line to a space. Used for
/// line-suffix content, which is always single-line.
fn render_flat(doc: &Doc) -> String {
    let mut out = String::new();
    let mut stack = vec![doc];
    while let Some(doc) = stack.pop() {
        match doc {
            Doc::Text(text) => out.push_str(text),
            Doc::Line | Doc::SoftLine | Doc::HardLine => out.push(' '),
            Doc::Concat(list) | Doc::Fill(list) => {
                for child in list.iter().rev() {
                    stack.push(child);
                }
            }
            Doc::Indent(inner) | Doc::Group(inner) | Doc::LineSuffix(inner) => stack.push(inner),
            Doc::BreakParent => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc::{concat, group, indent, join, line_suffix, text};

    fn narrow(width: usize) -> FormatOptions {
        FormatOptions {
            print_width: width,
            ..FormatOptions::default()
        }
    }

    #[test]
    fn fitting_group_stays_flat() {
        let doc = group(concat(vec![
            text("["),
            indent(concat(vec![Doc::SoftLine, join(
                concat(vec![text(","), Doc::Line]),
                vec![text("1"), text("2"), text("3")],
            )])),
            Doc::SoftLine,
            text("]"),
        ]));
        assert_eq!(print(&doc, &narrow(80)), "[1, 2, 3]\n");
    }

    #[test]
    fn overflowing_group_breaks_with_indent() {
        let doc = group(concat(vec![
            text("["),
            indent(concat(vec![Doc::SoftLine, join(
                concat(vec![text(","), Doc::Line]),
                vec![text("first"), text("second")],
            )])),
            Doc::SoftLine,
            text("]"),
        ]));
        assert_eq!(print(&doc, &narrow(10)), "[\n  first,\n  second\n]\n");
    }

    #[test]
    fn hard_line_forces_the_enclosing_group() {
        let doc = group(concat(vec![text("a"), Doc::Line, Doc::HardLine, text("b")]));
        // The Line breaks too, because the group is in break mode.
        assert_eq!(print(&doc, &narrow(80)), "a\n\nb\n");
    }

    #[test]
    fn break_parent_forces_without_printing() {
        let doc = group(concat(vec![
            text("a"),
            Doc::Line,
            text("b"),
            Doc::BreakParent,
        ]));
        assert_eq!(print(&doc, &narrow(80)), "a\nb\n");
    }

    #[test]
    fn fill_packs_per_line() {
        let items = vec![
            text("aa"),
            concat(vec![text(","), Doc::Line]),
            text("bb"),
            concat(vec![text(","), Doc::Line]),
            text("cc"),
            concat(vec![text(","), Doc::Line]),
            text("dd"),
        ];
        assert_eq!(print(&Doc::Fill(items), &narrow(9)), "aa, bb,\ncc, dd\n");
    }

    #[test]
    fn line_suffix_flushes_before_the_newline() {
        let doc = concat(vec![
            text("code;"),
            line_suffix(text(" // note")),
            Doc::HardLine,
            text("more;"),
        ]);
        assert_eq!(print(&doc, &narrow(80)), "code; // note\nmore;\n");
    }

    #[test]
    fn line_suffix_flushes_at_end_of_output() {
        let doc = concat(vec![text("code;"), line_suffix(text(" // tail"))]);
        assert_eq!(print(&doc, &narrow(80)), "code; // tail\n");
    }

    #[test]
    fn tabs_render_whole_levels() {
        let options = FormatOptions {
            indent_style: IndentStyle::Tab,
            ..narrow(10)
        };
        let doc = group(concat(vec![
            text("{"),
            indent(concat(vec![Doc::HardLine, text("body;")])),
            Doc::HardLine,
            text("}"),
        ]));
        assert_eq!(print(&doc, &options), "{\n\tbody;\n}\n");
    }

    #[test]
    fn root_indent_prefixes_every_line() {
        let options = FormatOptions {
            root_indent: 2,
            ..narrow(80)
        };
        let doc = concat(vec![text("a;"), Doc::HardLine, text("b;")]);
        assert_eq!(print(&doc, &options), "    a;\n    b;\n");
    }

    #[test]
    fn trailing_whitespace_is_trimmed() {
        let doc = concat(vec![text("a;"), Doc::HardLine]);
        assert_eq!(print(&doc, &narrow(80)), "a;\n");
    }
}
