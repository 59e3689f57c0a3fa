use mistql::lexer::{LexError, Lexer, Token};

fn tokens(input: &str) -> Vec<Token> {
    let mut lexer = Lexer::new(input);
    let mut out = Vec::new();
    loop {
        let tok = lexer.next_token().unwrap();
        let done = tok == Token::Eof;
        out.push(tok);
        if done {
            break;
        }
    }
    out
}

#[test]
fn single_character_tokens() {
    assert_eq!(tokens("@"), vec![Token::At, Token::Eof]);
    assert_eq!(tokens("$"), vec![Token::Dollar, Token::Eof]);
    assert_eq!(tokens("."), vec![Token::Dot, Token::Eof]);
    assert_eq!(tokens(","), vec![Token::Comma, Token::Eof]);
    assert_eq!(tokens(":"), vec![Token::Colon, Token::Eof]);
}

#[test]
fn two_character_operators_are_not_confused_with_their_prefixes() {
    assert_eq!(tokens("=="), vec![Token::EqEq, Token::Eof]);
    assert_eq!(tokens("=~"), vec![Token::Match, Token::Eof]);
    assert_eq!(tokens("!="), vec![Token::NotEq, Token::Eof]);
    assert_eq!(tokens("<="), vec![Token::Lte, Token::Eof]);
    assert_eq!(tokens(">="), vec![Token::Gte, Token::Eof]);
    assert_eq!(tokens("&&"), vec![Token::And, Token::Eof]);
    assert_eq!(tokens("||"), vec![Token::Or, Token::Eof]);
}

#[test]
fn a_bare_ampersand_is_a_lex_error() {
    let mut lexer = Lexer::new("&");
    assert!(matches!(lexer.next_token(), Err(LexError::BareAmpersand { .. })));
}

#[test]
fn a_bare_equals_is_a_lex_error() {
    let mut lexer = Lexer::new("=");
    assert!(matches!(lexer.next_token(), Err(LexError::BareEquals { .. })));
}

#[test]
fn numbers_with_fractions_and_exponents() {
    assert_eq!(tokens("1"), vec![Token::Number(1.0), Token::Eof]);
    assert_eq!(tokens("1.5"), vec![Token::Number(1.5), Token::Eof]);
    assert_eq!(tokens("1e3"), vec![Token::Number(1000.0), Token::Eof]);
    assert_eq!(tokens("1.5e-2"), vec![Token::Number(0.015), Token::Eof]);
}

#[test]
fn string_unicode_escape() {
    let mut lexer = Lexer::new(r#""ABC""#);
    assert_eq!(lexer.next_token().unwrap(), Token::String("ABC".to_string()));
}

#[test]
fn unterminated_string_is_a_lex_error() {
    let mut lexer = Lexer::new("\"abc");
    assert!(matches!(lexer.next_token(), Err(LexError::UnterminatedString { .. })));
}

#[test]
fn identifiers_allow_digits_and_underscores_after_the_first_character() {
    assert_eq!(tokens("_a1_b2"), vec![Token::Ident("_a1_b2".to_string()), Token::Eof]);
}

#[test]
fn minus_tightness_distinguishes_negation_from_subtraction() {
    let mut lexer = Lexer::new("-1");
    assert_eq!(lexer.next_token().unwrap(), Token::Minus);
    assert!(lexer.last_minus_is_tight());

    let mut lexer = Lexer::new("- 1");
    assert_eq!(lexer.next_token().unwrap(), Token::Minus);
    assert!(!lexer.last_minus_is_tight());
}

#[test]
fn keywords_are_not_identifiers() {
    assert_eq!(tokens("true"), vec![Token::True, Token::Eof]);
    assert_eq!(tokens("false"), vec![Token::False, Token::Eof]);
    assert_eq!(tokens("null"), vec![Token::Null, Token::Eof]);
}
