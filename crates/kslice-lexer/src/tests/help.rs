use crate::tests::TokenMock;
use crate::token::TokenKind;
use crate::T;
use crate::assert_tokenizes_as;

#[test]
fn help_block_ends_at_dedent() {
    let input = "\thelp\n\t  Line one.\n\n\t  Line two.\nconfig B";
    assert_tokenizes_as!(
        input,
        "\t",
        T![help],
        TokenMock::help_text("\n\t  Line one.\n\n\t  Line two.\n"),
        T![config],
        ' ',
        TokenMock::word("B")
    );
}

#[test]
fn help_block_keeps_deeper_indentation() {
    let input = "help\n  a\n    nested\n  b\nselect X";
    let tokens = crate::tokenize(input);
    let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Help,
            TokenKind::HelpText,
            TokenKind::Select,
            TokenKind::Whitespace,
            TokenKind::Word
        ]
    );
    assert_eq!(tokens[1].len, "\n  a\n    nested\n  b\n".len());
}

#[test]
fn old_style_help_keyword() {
    let input = "---help---\n  text\n";
    assert_tokenizes_as!(
        input,
        TokenMock {
            kind: TokenKind::Help,
            text: std::borrow::Cow::Borrowed("---help---"),
            len: 10
        },
        TokenMock::help_text("\n  text\n")
    );
}

#[test]
fn empty_help_block() {
    let input = "help\nconfig A";
    assert_tokenizes_as!(
        input,
        T![help],
        TokenMock::help_text("\n"),
        T![config],
        ' ',
        TokenMock::word("A")
    );
}

#[test]
fn help_text_may_contain_keywords_and_quotes() {
    let input = "help\n  if you say \"y\" here, select it\n";
    let tokens = crate::tokenize(input);
    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens[1].kind, TokenKind::HelpText);
}
