//! Operator precedence and associativity.
//!
//! One table serves both sides of the pipeline: the parser's
//! precedence-climbing loop and the formatter's decision of which
//! parentheses a programmatically built tree needs to keep its meaning.

use aspect_scanner::SyntaxKind;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Assoc {
    Left,
    Right,
}

/// Precedence levels for non-binary expression shapes, used by the
/// formatter when comparing a child against its parent context.
pub const PRECEDENCE_SEQUENCE: u8 = 1;
pub const PRECEDENCE_ASSIGNMENT: u8 = 2;
pub const PRECEDENCE_CONDITIONAL: u8 = 3;
pub const PRECEDENCE_UNARY: u8 = 16;
pub const PRECEDENCE_POSTFIX: u8 = 17;
pub const PRECEDENCE_MEMBER: u8 = 18;

/// Binding power of a binary operator token, or `None` if the token is not
/// a binary operator. Higher binds tighter.
pub fn binary_precedence(op: SyntaxKind) -> Option<u8> {
    use SyntaxKind::*;
    let level = match op {
        QuestionQuestionToken => 4,
        BarBarToken => 5,
        AmpersandAmpersandToken => 6,
        BarToken => 7,
        CaretToken => 8,
        AmpersandToken => 9,
        EqualsEqualsToken
        | ExclamationEqualsToken
        | EqualsEqualsEqualsToken
        | ExclamationEqualsEqualsToken => 10,
        LessThanToken
        | GreaterThanToken
        | LessThanEqualsToken
        | GreaterThanEqualsToken
        | InKeyword
        | InstanceOfKeyword => 11,
        LessThanLessThanToken
        | GreaterThanGreaterThanToken
        | GreaterThanGreaterThanGreaterThanToken => 12,
        PlusToken | MinusToken => 13,
        AsteriskToken | SlashToken | PercentToken => 14,
        AsteriskAsteriskToken => 15,
        _ => return None,
    };
    Some(level)
}

/// Associativity of a binary operator. Exponentiation is the one
/// right-associative binary operator.
pub fn binary_associativity(op: SyntaxKind) -> Assoc {
    if op == SyntaxKind::AsteriskAsteriskToken {
        Assoc::Right
    } else {
        Assoc::Left
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aspect_scanner::SyntaxKind::*;

    #[test]
    fn exponent_binds_tighter_than_multiplication_and_right_assoc() {
        assert!(binary_precedence(AsteriskAsteriskToken) > binary_precedence(AsteriskToken));
        assert_eq!(binary_associativity(AsteriskAsteriskToken), Assoc::Right);
        assert_eq!(binary_associativity(MinusToken), Assoc::Left);
    }

    #[test]
    fn nullish_sits_below_logical_or() {
        assert!(binary_precedence(QuestionQuestionToken) < binary_precedence(BarBarToken));
    }

    #[test]
    fn assignment_tokens_are_not_binary() {
        assert_eq!(binary_precedence(PlusEqualsToken), None);
        assert_eq!(binary_precedence(EqualsToken), None);
    }
}
