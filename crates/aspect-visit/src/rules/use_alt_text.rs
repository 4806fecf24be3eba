//! `useAltText`: `<img>` elements need an `alt` attribute for assistive
//! technology. A spread attribute may carry one, so spreads silence the
//! rule.

use aspect_parser::{NodeData, NodeIndex};

use crate::context::CompilerContext;
use crate::visitor::{VisitSignal, Visitor};

const RULE: &str = "a11y/useAltText";

pub struct UseAltText;

impl Visitor for UseAltText {
    fn name(&self) -> &'static str {
        RULE
    }

    fn enter(&mut self, node: NodeIndex, ctx: &mut CompilerContext) -> VisitSignal {
        let Some(NodeData::JsxElement {
            name, attributes, ..
        }) = ctx.arena.get(node).map(|n| &n.data)
        else {
            return VisitSignal::Retain;
        };
        let is_img = matches!(
            ctx.arena.get(*name).map(|n| &n.data),
            Some(NodeData::JsxName { name }) if name == "img"
        );
        if !is_img {
            return VisitSignal::Retain;
        }

        let mut has_alt = false;
        let mut has_spread = false;
        for attribute in attributes {
            match ctx.arena.get(*attribute).map(|n| &n.data) {
                Some(NodeData::JsxAttribute { name, .. }) => {
                    if matches!(
                        ctx.arena.get(*name).map(|n| &n.data),
                        Some(NodeData::JsxName { name }) if name == "alt"
                    ) {
                        has_alt = true;
                    }
                }
                Some(NodeData::JsxSpreadAttribute { .. }) => has_spread = true,
                _ => {}
            }
        }

        if !has_alt && !has_spread {
            ctx.report_node(RULE, node, "provide an `alt` attribute for the image");
        }
        VisitSignal::Retain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visitor::run_visitors;
    use aspect_parser::{Parse, ParseOptions, parse};

    fn run(source: &str) -> Parse {
        let mut parsed = parse(source, "test.jsx", ParseOptions::jsx());
        run_visitors(&mut parsed, &mut [Box::new(UseAltText)]);
        parsed
    }

    #[test]
    fn missing_alt_is_reported() {
        let parsed = run("<img src={url} />;");
        assert_eq!(parsed.diagnostics.len(), 1);
        assert_eq!(parsed.diagnostics[0].category, "lint/a11y/useAltText");
    }

    #[test]
    fn present_alt_passes() {
        for source in ["<img src={url} alt=\"a cat\" />;", "<img alt={text} />;"] {
            let parsed = run(source);
            assert!(parsed.diagnostics.is_empty(), "{source}");
        }
    }

    #[test]
    fn spread_attributes_give_the_benefit_of_the_doubt() {
        let parsed = run("<img {...props} />;");
        assert!(parsed.diagnostics.is_empty());
    }

    #[test]
    fn other_elements_are_ignored() {
        let parsed = run("<div src={url} />;");
        assert!(parsed.diagnostics.is_empty());
    }

    #[test]
    fn nested_images_are_found() {
        let parsed = run("<div><p><img /></p></div>;");
        assert_eq!(parsed.diagnostics.len(), 1);
    }

    #[test]
    fn suppression_comment_silences_the_finding() {
        let parsed = run("// aspect-ignore lint/a11y/useAltText\nlet x = <img />;");
        assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
    }
}
