//! Built-in lint rules.
//!
//! Each rule is a [`Visitor`](crate::Visitor); fixable rules rewrite the
//! tree and tag their finding so callers can tell a pure diagnostic from an
//! applied fix. Findings use the category `lint/<ruleName>` and respect
//! `aspect-ignore` suppressions.

pub mod no_duplicate_case;
pub mod no_undeclared_variables;
pub mod use_alt_text;
pub mod use_exponentiation_operator;
pub mod use_optional_chain;

pub use no_duplicate_case::NoDuplicateCase;
pub use no_undeclared_variables::NoUndeclaredVariables;
pub use use_alt_text::UseAltText;
pub use use_exponentiation_operator::UseExponentiationOperator;
pub use use_optional_chain::UseOptionalChain;

use crate::visitor::Visitor;

/// Every built-in rule, in a stable order.
pub fn default_rules() -> Vec<Box<dyn Visitor>> {
    vec![
        Box::new(NoUndeclaredVariables),
        Box::new(NoDuplicateCase),
        Box::new(UseAltText),
        Box::new(UseOptionalChain),
        Box::new(UseExponentiationOperator),
    ]
}
