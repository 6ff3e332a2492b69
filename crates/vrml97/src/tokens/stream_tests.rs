use super::{TokenKind, TokenStream};
use crate::TokenError;

#[test]
fn state_and_rewind() {
    let mut stream = TokenStream::new("Group { }");
    assert_eq!(stream.next_token(), Some(0));
    let saved = stream.state();
    assert_eq!(stream.next_token(), Some(1));
    assert_eq!(stream.next_token(), Some(2));
    assert_eq!(stream.next_token(), None);
    stream.set_state(saved);
    assert_eq!(stream.text(stream.state()), "{");
}

#[test]
fn type_queries() {
    let stream = TokenStream::new(r#"[ 1 "s" ] { }"#);
    assert!(stream.is_left_bracket(0));
    assert!(stream.is_number(1));
    assert!(stream.is_quoted_string(2));
    assert!(stream.is_right_bracket(3));
    assert!(stream.is_left_brace(4));
    assert!(stream.is_right_brace(5));
    assert!(!stream.is_number(99));
    assert_eq!(stream.text(99), "");
}

#[test]
fn number_values() {
    let stream = TokenStream::new("42 -7 0x1F 2.5e1 abc 1.2.3");
    assert_eq!(stream.int_value(0), Ok(42));
    assert_eq!(stream.int_value(1), Ok(-7));
    assert_eq!(stream.int_value(2), Ok(31));
    assert_eq!(stream.float_value(3), Ok(25.0));
    assert_eq!(
        stream.float_value(4),
        Err(TokenError::NotANumber { text: "abc".into() })
    );
    assert!(stream.float_value(5).is_err());
    assert_eq!(
        stream.int_value(10),
        Err(TokenError::OutOfRange { pos: 10, len: 6 })
    );
}

#[test]
fn int_range() {
    let stream = TokenStream::new("2147483647 -2147483648 2147483648 4294967295 0xFFFFFFFF 0x100000000");
    assert_eq!(stream.int_value(0), Ok(i32::MAX));
    assert_eq!(stream.int_value(1), Ok(i32::MIN));
    assert_eq!(
        stream.int_value(2),
        Err(TokenError::NotANumber { text: "2147483648".into() })
    );
    assert!(stream.int_value(3).is_err());
    assert_eq!(stream.int_value(4), Ok(-1));
    assert!(stream.int_value(5).is_err());
}

#[test]
fn skip_to_number_counts_numeric_tokens() {
    let mut stream = TokenStream::new("[ 1 2 , 3 ] 4");
    // Commas are whitespace: `[` `1` `2` `3` `]` `4`.
    assert_eq!(stream.skip_to_number(2), Some(3));
    assert_eq!(stream.text(3), "3");
    assert_eq!(stream.skip_non_numbers(), Some(3));
    stream.set_state(4);
    assert_eq!(stream.skip_non_numbers(), Some(5));
    assert_eq!(stream.skip_to_number(1), None);
    assert!(stream.at_end());
}

#[test]
fn insert_shifts_following_tokens_by_two() {
    let mut stream = TokenStream::new("Group { children [ Shape { } ] }");
    let before: Vec<String> = (0..stream.len()).map(|i| stream.text(i).to_owned()).collect();

    let added = stream.insert(4, "DEF S1 ").unwrap();
    assert_eq!(added, 2);
    assert_eq!(stream.source(), "Group { children [ DEF S1 Shape { } ] }");
    assert_eq!(stream.text(4), "DEF");
    assert_eq!(stream.text(5), "S1");
    for (i, text) in before.iter().enumerate().skip(4) {
        assert_eq!(stream.text(i + 2), text);
    }
}

#[test]
fn insert_on_later_line_keeps_other_lines() {
    let mut stream = TokenStream::new("Group {\n  children [\n    Shape { }\n  ]\n}\n");
    assert_eq!(stream.insert(4, "DEF S1 ").unwrap(), 2);
    assert_eq!(stream.line(4), Some(2));
    assert_eq!(stream.line(6), Some(2));
    assert_eq!(stream.line(9), Some(3));
    assert_eq!(stream.byte_range(9), Some(44..45));
    assert_eq!(stream.line_text(2), Some("    DEF S1 Shape { }"));
}

#[test]
fn insert_with_newlines_shifts_lines() {
    let mut stream = TokenStream::new("A {}\nB {}\n");
    assert_eq!(stream.insert(3, "C {}\n").unwrap(), 3);
    let lines: Vec<_> = stream.tokens().iter().map(|t| t.line).collect();
    assert_eq!(lines, vec![0, 0, 0, 1, 1, 1, 2, 2, 2]);
    assert_eq!(stream.text(3), "C");
    assert_eq!(stream.text(6), "B");
}

#[test]
fn replace_token() {
    let mut stream = TokenStream::new("Sphere { radius 1 }");
    assert_eq!(stream.replace(3, "2.5").unwrap(), 0);
    assert_eq!(stream.source(), "Sphere { radius 2.5 }");
    assert_eq!(stream.replace_range(2..4, "").unwrap(), -2);
    assert_eq!(stream.source(), "Sphere {  }");
    assert_eq!(stream.peek_kind(2), Some(TokenKind::RightBrace));
}

#[test]
fn splice_through_strings_relexes_everything() {
    let mut stream = TokenStream::new("WorldInfo { title \"a\nb\" }");
    assert_eq!(stream.insert(2, "info \"x\" ").unwrap(), 2);
    assert_eq!(stream.text(3), "\"x\"");
    assert_eq!(stream.peek_kind(5), Some(TokenKind::QuotedString));
    assert_eq!(stream.peek_kind(6), Some(TokenKind::ContinuationString));
}

#[test]
fn insert_out_of_range() {
    let mut stream = TokenStream::new("Group {}");
    assert!(stream.insert(3, "x").is_ok());
    assert_eq!(
        stream.insert(9, "x"),
        Err(TokenError::OutOfRange { pos: 9, len: 4 })
    );
}

#[test]
fn header_detection() {
    assert!(TokenStream::new("#VRML V2.0 utf8\nGroup {}").has_header());
    assert!(!TokenStream::new("#VRML V1.0 ascii\n").has_header());
}
