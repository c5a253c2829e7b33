use pretty_assertions::assert_eq;
use proptest::prelude::*;

use veld_basic::{SourceManager, StringSource, Token, TokenKind, TokenValue};
use veld_diagnostic::{CapturingConsumer, DiagId, Diagnostic, DiagnosticEngine, Severity};

use super::Lexer;

/// Lex the whole input, collecting tokens (including the final `eof`) and
/// every diagnostic emitted along the way.
fn lex_all(input: &str) -> (Vec<Token>, Vec<Diagnostic>) {
    let consumer = CapturingConsumer::new();
    let captured = consumer.clone();
    let mut engine = DiagnosticEngine::new(Box::new(consumer));
    let mut source_manager = SourceManager::new();
    let mut source = StringSource::new(input);
    let mut lexer = Lexer::new(&mut source, &mut source_manager, &mut engine);

    let mut tokens = Vec::new();
    loop {
        let token = lexer.lex();
        let done = token.is(TokenKind::Eof);
        tokens.push(token);
        if done {
            break;
        }
    }
    (tokens, captured.diagnostics())
}

fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
    tokens.iter().map(Token::kind).collect()
}

/// ((begin line, begin column), (end line, end column)), inclusive.
fn span(token: &Token) -> ((u32, u32), (u32, u32)) {
    let range = token.location().range;
    (
        (range.begin.line, range.begin.column),
        (range.end.line, range.end.column),
    )
}

// === Positions ===

#[test]
fn leading_space_shifts_keyword_and_eof_columns() {
    let (tokens, diags) = lex_all(" fn");
    assert!(diags.is_empty());
    assert_eq!(kinds(&tokens), vec![TokenKind::KwFn, TokenKind::Eof]);
    assert_eq!(span(&tokens[0]), ((1, 2), (1, 3)));
    assert_eq!(span(&tokens[1]), ((1, 4), (1, 4)));
}

#[test]
fn eol_is_its_own_token_and_resets_columns() {
    let (tokens, diags) = lex_all("let a = 1.42\nlet b = 7");
    assert!(diags.is_empty());
    assert_eq!(
        kinds(&tokens),
        vec![
            TokenKind::KwLet,
            TokenKind::Identifier,
            TokenKind::Equal,
            TokenKind::RealConstant,
            TokenKind::Eol,
            TokenKind::KwLet,
            TokenKind::Identifier,
            TokenKind::Equal,
            TokenKind::IntegerConstant,
            TokenKind::Eof,
        ]
    );
    assert_eq!(span(&tokens[0]), ((1, 1), (1, 3)));
    assert_eq!(span(&tokens[3]), ((1, 9), (1, 12)));
    assert_eq!(tokens[3].value(), &TokenValue::Real(1.42));
    // The newline reports its own position, on the line it ends.
    assert_eq!(span(&tokens[4]), ((1, 13), (1, 13)));
    assert_eq!(span(&tokens[5]), ((2, 1), (2, 3)));
    assert_eq!(tokens[8].value(), &TokenValue::Int(7));
}

#[test]
fn eof_token_is_sticky() {
    let consumer = CapturingConsumer::new();
    let mut engine = DiagnosticEngine::new(Box::new(consumer));
    let mut source_manager = SourceManager::new();
    let mut source = StringSource::new("x");
    let mut lexer = Lexer::new(&mut source, &mut source_manager, &mut engine);

    assert_eq!(lexer.lex().kind(), TokenKind::Identifier);
    let first_eof = lexer.lex();
    let second_eof = lexer.lex();
    assert_eq!(first_eof.kind(), TokenKind::Eof);
    assert_eq!(second_eof.kind(), TokenKind::Eof);
    assert_eq!(span(&first_eof), span(&second_eof));
}

// === Punctuators ===

#[test]
fn minus_binds_as_its_own_token() {
    let (tokens, _) = lex_all("-42");
    assert_eq!(
        kinds(&tokens),
        vec![TokenKind::Minus, TokenKind::IntegerConstant, TokenKind::Eof]
    );
    assert_eq!(span(&tokens[0]), ((1, 1), (1, 1)));
    assert_eq!(span(&tokens[1]), ((1, 2), (1, 3)));
    assert_eq!(tokens[1].value(), &TokenValue::Int(42));
}

#[test]
fn infix_minus_between_integers() {
    let (tokens, _) = lex_all("42-144");
    assert_eq!(span(&tokens[0]), ((1, 1), (1, 2)));
    assert_eq!(span(&tokens[1]), ((1, 3), (1, 3)));
    assert_eq!(span(&tokens[2]), ((1, 4), (1, 6)));
    assert_eq!(tokens[2].value(), &TokenValue::Int(144));
}

#[test]
fn infix_minus_between_reals() {
    let (tokens, _) = lex_all("1.42-3.1415");
    assert_eq!(
        kinds(&tokens),
        vec![
            TokenKind::RealConstant,
            TokenKind::Minus,
            TokenKind::RealConstant,
            TokenKind::Eof,
        ]
    );
    assert_eq!(span(&tokens[0]), ((1, 1), (1, 4)));
    assert_eq!(span(&tokens[1]), ((1, 5), (1, 5)));
    assert_eq!(span(&tokens[2]), ((1, 6), (1, 11)));
    assert_eq!(tokens[2].value(), &TokenValue::Real(3.1415));
}

#[test]
fn greedy_match_prefers_the_longest_punctuator() {
    let (tokens, _) = lex_all("&&");
    assert_eq!(tokens[0].kind(), TokenKind::AmpAmp);
    assert_eq!(span(&tokens[0]), ((1, 1), (1, 2)));

    let (tokens, _) = lex_all("& &");
    assert_eq!(
        kinds(&tokens),
        vec![TokenKind::Amp, TokenKind::Amp, TokenKind::Eof]
    );

    let (tokens, _) = lex_all("...");
    assert_eq!(tokens[0].kind(), TokenKind::Ellipsis);
    assert_eq!(span(&tokens[0]), ((1, 1), (1, 3)));

    let (tokens, _) = lex_all("->");
    assert_eq!(tokens[0].kind(), TokenKind::Arrow);
}

// === Keywords and identifiers ===

#[test]
fn keywords_and_identifiers_split_correctly() {
    let (tokens, _) = lex_all("fn joe");
    assert_eq!(tokens[0].kind(), TokenKind::KwFn);
    assert_eq!(span(&tokens[0]), ((1, 1), (1, 2)));
    assert_eq!(tokens[1].kind(), TokenKind::Identifier);
    assert_eq!(tokens[1].value(), &TokenValue::Str("joe".to_string()));
    assert_eq!(span(&tokens[1]), ((1, 4), (1, 6)));
}

#[test]
fn type_names_and_modifiers_are_keyword_like() {
    let (tokens, _) = lex_all("int signed true joe");
    assert_eq!(
        kinds(&tokens),
        vec![
            TokenKind::TyInt,
            TokenKind::TyModSigned,
            TokenKind::KwTrue,
            TokenKind::Identifier,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn keyword_prefix_stays_one_identifier() {
    let (tokens, _) = lex_all("letter if_not");
    assert_eq!(tokens[0].kind(), TokenKind::Identifier);
    assert_eq!(tokens[0].value(), &TokenValue::Str("letter".to_string()));
    assert_eq!(tokens[1].kind(), TokenKind::Identifier);
}

#[test]
fn non_ascii_identifiers_count_one_column_per_scalar() {
    let (tokens, _) = lex_all("héllo x");
    assert_eq!(tokens[0].kind(), TokenKind::Identifier);
    assert_eq!(tokens[0].value(), &TokenValue::Str("héllo".to_string()));
    assert_eq!(span(&tokens[0]), ((1, 1), (1, 5)));
    assert_eq!(span(&tokens[1]), ((1, 7), (1, 7)));
}

#[test]
fn unrecognized_character_becomes_unknown() {
    let (tokens, diags) = lex_all("$x");
    assert!(diags.is_empty());
    assert_eq!(tokens[0].kind(), TokenKind::Unknown);
    assert_eq!(tokens[0].value(), &TokenValue::Str("$".to_string()));
    assert_eq!(span(&tokens[0]), ((1, 1), (1, 1)));
    assert_eq!(tokens[1].kind(), TokenKind::Identifier);
}

// === Comments ===

#[test]
fn line_comment_runs_to_the_newline() {
    let (tokens, _) = lex_all("x # hi there\ny");
    assert_eq!(
        kinds(&tokens),
        vec![
            TokenKind::Identifier,
            TokenKind::Eol,
            TokenKind::Identifier,
            TokenKind::Eof,
        ]
    );
    assert_eq!(span(&tokens[1]), ((1, 13), (1, 13)));
    assert_eq!(span(&tokens[2]), ((2, 1), (2, 1)));
}

#[test]
fn comment_at_eof_yields_only_eof() {
    let (tokens, _) = lex_all("# nothing here");
    assert_eq!(kinds(&tokens), vec![TokenKind::Eof]);
}

// === Numbers ===

#[test]
fn underscore_separators_are_dropped() {
    let (tokens, diags) = lex_all("42_000");
    assert!(diags.is_empty());
    assert_eq!(tokens[0].value(), &TokenValue::Int(42_000));
    assert_eq!(span(&tokens[0]), ((1, 1), (1, 6)));

    let (tokens, _) = lex_all("31_415.62");
    assert_eq!(tokens[0].value(), &TokenValue::Real(31_415.62));
}

#[test]
fn based_literals() {
    let (tokens, _) = lex_all("0x1F");
    assert_eq!(tokens[0].value(), &TokenValue::Int(0x1F));
    assert_eq!(span(&tokens[0]), ((1, 1), (1, 4)));

    let (tokens, _) = lex_all("0b1010");
    assert_eq!(tokens[0].value(), &TokenValue::Int(10));
}

#[test]
fn bad_hex_digit_warns_and_is_dropped() {
    let (tokens, diags) = lex_all("0x2G");
    assert_eq!(tokens[0].value(), &TokenValue::Int(2));
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].id, DiagId::BadHexDigit);
    assert_eq!(diags[0].severity, Severity::Warning);
    assert_eq!(
        diags[0].message,
        "An invalid hexadecimal digit 'G' was encountered while lexing the source code shown above."
    );
}

#[test]
fn bad_binary_digit_warns_and_is_dropped() {
    let (tokens, diags) = lex_all("0b102");
    assert_eq!(tokens[0].value(), &TokenValue::Int(0b10));
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].id, DiagId::BadBinaryDigit);
    assert_eq!(diags[0].severity, Severity::Warning);
}

#[test]
fn range_spelling_is_not_a_fraction() {
    let (tokens, _) = lex_all("1..2");
    assert_eq!(
        kinds(&tokens),
        vec![
            TokenKind::IntegerConstant,
            TokenKind::PeriodPeriod,
            TokenKind::IntegerConstant,
            TokenKind::Eof,
        ]
    );
    assert_eq!(tokens[0].value(), &TokenValue::Int(1));
    assert_eq!(span(&tokens[1]), ((1, 2), (1, 3)));
    assert_eq!(tokens[2].value(), &TokenValue::Int(2));
}

#[test]
fn scientific_notation() {
    let (tokens, _) = lex_all("1e3");
    assert_eq!(tokens[0].value(), &TokenValue::Real(1000.0));

    let (tokens, _) = lex_all("2.5e-1");
    assert_eq!(tokens[0].kind(), TokenKind::RealConstant);
    assert_eq!(tokens[0].value(), &TokenValue::Real(0.25));
    assert_eq!(span(&tokens[0]), ((1, 1), (1, 6)));
}

// === Strings and runes ===

#[test]
fn short_string_with_double_quotes() {
    let (tokens, diags) = lex_all("\"hello\"");
    assert!(diags.is_empty());
    assert_eq!(tokens[0].kind(), TokenKind::StringConstant);
    assert_eq!(tokens[0].value(), &TokenValue::Str("hello".to_string()));
    assert_eq!(span(&tokens[0]), ((1, 1), (1, 7)));
}

#[test]
fn empty_short_string() {
    let (tokens, _) = lex_all("''");
    assert_eq!(tokens[0].kind(), TokenKind::StringConstant);
    assert_eq!(tokens[0].value(), &TokenValue::Str(String::new()));
    assert_eq!(span(&tokens[0]), ((1, 1), (1, 2)));
}

#[test]
fn single_code_point_becomes_a_rune() {
    let (tokens, _) = lex_all("'a'");
    assert_eq!(tokens[0].kind(), TokenKind::RuneConstant);
    assert_eq!(tokens[0].value(), &TokenValue::Rune('a'));
    assert_eq!(span(&tokens[0]), ((1, 1), (1, 3)));

    let (tokens, _) = lex_all("'\\n'");
    assert_eq!(tokens[0].value(), &TokenValue::Rune('\n'));
}

#[test]
fn atom_spelling_is_an_identifier() {
    let (tokens, diags) = lex_all("('a, 'b)");
    assert!(diags.is_empty());
    assert_eq!(
        kinds(&tokens),
        vec![
            TokenKind::LParen,
            TokenKind::Identifier,
            TokenKind::Comma,
            TokenKind::Identifier,
            TokenKind::RParen,
            TokenKind::Eof,
        ]
    );
    assert_eq!(tokens[1].value(), &TokenValue::Str("'a".to_string()));
    assert_eq!(span(&tokens[1]), ((1, 2), (1, 3)));
    assert_eq!(tokens[3].value(), &TokenValue::Str("'b".to_string()));
}

#[test]
fn long_string_with_quote_delimited_content() {
    // Four quotes on each side: the literal's content is `a`, with the
    // extra quote joining the delimiter on both ends.
    let (tokens, diags) = lex_all("''''a''''");
    assert!(diags.is_empty());
    assert_eq!(tokens[0].kind(), TokenKind::StringConstant);
    assert_eq!(tokens[0].value(), &TokenValue::Str("a".to_string()));
    assert_eq!(span(&tokens[0]), ((1, 1), (1, 9)));
}

#[test]
fn long_string_keeps_embedded_quotes() {
    let (tokens, _) = lex_all("'''it's'''");
    assert_eq!(tokens[0].value(), &TokenValue::Str("it's".to_string()));

    let (tokens, _) = lex_all("\"\"\"a\"\"b\"\"\"");
    assert_eq!(tokens[0].value(), &TokenValue::Str("a\"\"b".to_string()));
}

#[test]
fn long_string_spans_lines() {
    let (tokens, diags) = lex_all("\"\"\"a\nb\"\"\"");
    assert!(diags.is_empty());
    assert_eq!(tokens[0].value(), &TokenValue::Str("a\nb".to_string()));
    assert_eq!(span(&tokens[0]), ((1, 1), (2, 4)));
}

// === Escapes ===

#[test]
fn simple_escapes() {
    let (tokens, diags) = lex_all("\"a\\tb\\\\c\\0\"");
    assert!(diags.is_empty());
    assert_eq!(tokens[0].value(), &TokenValue::Str("a\tb\\c\0".to_string()));
}

#[test]
fn hex_and_unicode_escapes() {
    let (tokens, _) = lex_all("\"\\x41\"");
    assert_eq!(tokens[0].value(), &TokenValue::Rune('A'));

    let (tokens, _) = lex_all("\"\\u0041!\"");
    assert_eq!(tokens[0].value(), &TokenValue::Str("A!".to_string()));
}

#[test]
fn bad_hex_digit_in_escape_contributes_zero() {
    let (tokens, diags) = lex_all("\"\\xZ1\"");
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].id, DiagId::BadHexDigit);
    assert_eq!(tokens[0].value(), &TokenValue::Rune('\u{1}'));
}

#[test]
fn unknown_escape_is_fatal_but_keeps_the_character() {
    let (tokens, diags) = lex_all("\"a\\qb\"");
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].id, DiagId::BadEscapeSequence);
    assert_eq!(diags[0].severity, Severity::Fatal);
    assert_eq!(
        diags[0].message,
        "An unknown escape sequence '\\q' was encountered in a string literal."
    );
    assert_eq!(tokens[0].value(), &TokenValue::Str("aqb".to_string()));
}

// === Unterminated literals ===

#[test]
fn newline_terminates_short_string_fatally() {
    let (tokens, diags) = lex_all("\"abc\nrest");
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].id, DiagId::UnterminatedString);
    assert_eq!(diags[0].severity, Severity::Fatal);
    assert_eq!(
        diags[0].message,
        "A string literal was still open when the end of the line was reached."
    );
    // Best-effort token so downstream phases still see something.
    assert_eq!(tokens[0].kind(), TokenKind::StringConstant);
    assert_eq!(tokens[0].value(), &TokenValue::Str("abc".to_string()));
}

#[test]
fn eof_terminates_string_fatally() {
    let (tokens, diags) = lex_all("\"abc");
    assert_eq!(diags.len(), 1);
    assert_eq!(
        diags[0].message,
        "A string literal was still open when the end of the file was reached."
    );
    assert_eq!(tokens[0].value(), &TokenValue::Str("abc".to_string()));
}

#[test]
fn fatal_is_observable_through_the_lexer() {
    let consumer = CapturingConsumer::new();
    let mut engine = DiagnosticEngine::new(Box::new(consumer));
    let mut source_manager = SourceManager::new();
    let mut source = StringSource::new("\"abc");
    let mut lexer = Lexer::new(&mut source, &mut source_manager, &mut engine);

    assert!(!lexer.fatal_occurred());
    let token = lexer.lex();
    assert_eq!(token.kind(), TokenKind::StringConstant);
    assert!(lexer.fatal_occurred());
}

// === Line mirror ===

#[test]
fn lexed_lines_are_reconstructible() {
    let consumer = CapturingConsumer::new();
    let mut engine = DiagnosticEngine::new(Box::new(consumer));
    let mut source_manager = SourceManager::new();
    let mut source = StringSource::new("let a\nlet b");
    let mut lexer = Lexer::new(&mut source, &mut source_manager, &mut engine);

    let file = lexer.file();
    while !lexer.lex().is(TokenKind::Eof) {}
    drop(lexer);

    let info = source_manager.file_info(file);
    assert_eq!(info.line_to_string(1), "let a");
    assert_eq!(info.line_to_string(2), "let b");
}

// === Properties ===

proptest! {
    #[test]
    fn separators_never_change_integer_values(value in 0u64..1_000_000_000) {
        let separated: String = value
            .to_string()
            .chars()
            .flat_map(|c| [c, '_'])
            .collect();
        let (tokens, diags) = lex_all(&separated);
        prop_assert!(diags.is_empty());
        prop_assert_eq!(tokens[0].value(), &TokenValue::Int(value));
    }

    #[test]
    fn leading_spaces_shift_start_columns(pad in 0usize..8) {
        let input = format!("{}fn", " ".repeat(pad));
        let (tokens, _) = lex_all(&input);
        prop_assert_eq!(tokens[0].kind(), TokenKind::KwFn);
        let begin = tokens[0].location().range.begin;
        prop_assert_eq!(begin.column as usize, pad + 1);
    }
}
