//! Comparison of a parsed value against a field's default text.

use crate::tokens::{TokenKind, lex};

/// Whether `tokens` (kind and text of each value token) spell the same value
/// as `default_text`.
///
/// Numbers compare by value, so `0` equals `0.000`. Brackets around MF values
/// are ignored on both sides.
pub fn is_default_value<'a>(
    default_text: &str,
    tokens: impl IntoIterator<Item = (TokenKind, &'a str)>,
) -> bool {
    let default_tokens: Vec<(TokenKind, &str)> = lex(default_text)
        .into_iter()
        .map(|t| (t.kind, t.text(default_text)))
        .collect();
    let value_tokens: Vec<(TokenKind, &str)> = tokens.into_iter().collect();

    let expected = strip_brackets(&default_tokens);
    let actual = strip_brackets(&value_tokens);
    expected.len() == actual.len()
        && expected
            .iter()
            .zip(actual)
            .all(|(&(kind_a, a), &(kind_b, b))| same_token(kind_a, a, kind_b, b))
}

fn strip_brackets<'t, 's>(tokens: &'t [(TokenKind, &'s str)]) -> &'t [(TokenKind, &'s str)] {
    match tokens {
        [(TokenKind::LeftBracket, _), inner @ .., (TokenKind::RightBracket, _)] => inner,
        other => other,
    }
}

fn same_token(kind_a: TokenKind, a: &str, kind_b: TokenKind, b: &str) -> bool {
    if kind_a == TokenKind::Number && kind_b == TokenKind::Number {
        return match (a.parse::<f64>(), b.parse::<f64>()) {
            (Ok(x), Ok(y)) => x == y,
            _ => a == b,
        };
    }
    kind_a == kind_b && a == b
}
