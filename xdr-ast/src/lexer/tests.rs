use super::*;

fn kinds(src: &str) -> Vec<TokenKind> {
    Lexer::tokenize(src)
        .unwrap()
        .into_iter()
        .map(|t| t.kind)
        .collect()
}

#[test]
fn empty_input_is_just_eof() {
    assert_eq!(kinds(""), vec![TokenKind::Eof]);
}

#[test]
fn punctuation() {
    assert_eq!(
        kinds("{}()[]<>;,=*:"),
        vec![
            TokenKind::LBrace,
            TokenKind::RBrace,
            TokenKind::LParen,
            TokenKind::RParen,
            TokenKind::LBracket,
            TokenKind::RBracket,
            TokenKind::LAngle,
            TokenKind::RAngle,
            TokenKind::Semi,
            TokenKind::Comma,
            TokenKind::Eq,
            TokenKind::Star,
            TokenKind::Colon,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn keywords_and_identifiers() {
    assert_eq!(
        kinds("struct union foobar_t"),
        vec![
            TokenKind::KwStruct,
            TokenKind::KwUnion,
            TokenKind::Ident("foobar_t".into()),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn decimal_and_hex_integers() {
    let toks = kinds("42 0x2a -7");
    assert_eq!(
        toks,
        vec![
            TokenKind::Int {
                value: 42,
                text: "42".into()
            },
            TokenKind::Int {
                value: 42,
                text: "0x2a".into()
            },
            TokenKind::Int {
                value: -7,
                text: "-7".into()
            },
            TokenKind::Eof,
        ]
    );
}

#[test]
fn line_comment_is_skipped() {
    let toks = Lexer::tokenize("struct // a comment\nunion").unwrap();
    assert_eq!(toks[0].line, 1);
    assert_eq!(toks[1].line, 2);
    assert_eq!(toks[1].kind, TokenKind::KwUnion);
}

#[test]
fn block_comment_is_skipped() {
    let toks = kinds("struct /* skip\nthis */ union");
    assert_eq!(toks, vec![TokenKind::KwStruct, TokenKind::KwUnion, TokenKind::Eof]);
}

#[test]
fn line_numbers_track_newlines() {
    let toks = Lexer::tokenize("const\nA\n=\n1;").unwrap();
    assert_eq!(toks.iter().map(|t| t.line).collect::<Vec<_>>(), vec![1, 2, 3, 4, 4]);
}

#[test]
fn unterminated_block_comment_is_not_an_error_but_reaches_eof() {
    // The scanner treats end-of-input as a silent close, matching a
    // tolerant batch tool; nothing after the `/*` can be tokenized, so the
    // result is simply an empty stream aside from Eof.
    let toks = kinds("/* never closed");
    assert_eq!(toks, vec![TokenKind::Eof]);
}

#[test]
fn unknown_character_is_an_error() {
    let err = Lexer::tokenize("a $ b").unwrap_err();
    assert_eq!(err.line, 1);
    assert!(err.message.contains('$'));
}

#[test]
fn malformed_hex_literal_is_an_error() {
    // A bare "0x" with no digits following still lexes as hex (the `x`
    // marker is consumed), and then fails to parse as an integer.
    let err = Lexer::tokenize("0x").unwrap_err();
    assert_eq!(err.line, 1);
}
