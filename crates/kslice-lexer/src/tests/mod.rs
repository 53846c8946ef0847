use crate::token::{LexerErrorKind, TokenKind};
use crate::T;
use crate::assert_tokenizes_as;

pub(crate) use mock::TokenMock;

mod help;

#[test]
fn basic_comments() {
    assert_tokenizes_as!("# test", TokenMock::comment("# test"));
    assert_tokenizes_as!("#", TokenMock::comment("#"));
    assert_tokenizes_as!(
        "# one\n# two",
        TokenMock::comment("# one"),
        '\n',
        TokenMock::comment("# two")
    );
}

#[test]
fn config_header() {
    assert_tokenizes_as!(
        "config NET\n",
        T![config],
        ' ',
        TokenMock::word("NET"),
        '\n'
    );
    assert_tokenizes_as!(
        "menuconfig 64BIT",
        T![menuconfig],
        ' ',
        TokenMock::word("64BIT")
    );
}

#[test]
fn type_with_prompt() {
    assert_tokenizes_as!(
        "\ttristate \"TCP/IP networking\"",
        "\t",
        T![tristate],
        ' ',
        TokenMock::double_quoted("TCP/IP networking")
    );
}

#[test]
fn boolean_alias() {
    let tokens = crate::tokenize("boolean");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::Bool);
    assert_eq!(tokens[0].len, "boolean".len());
}

#[test]
fn depends_expression() {
    assert_tokenizes_as!(
        "depends on NET && !(INET || X=\"y\")",
        T![depends],
        ' ',
        T![on],
        ' ',
        TokenMock::word("NET"),
        ' ',
        T![&&],
        ' ',
        T![!],
        T!['('],
        TokenMock::word("INET"),
        ' ',
        T![||],
        ' ',
        TokenMock::word("X"),
        T![=],
        TokenMock::double_quoted("y"),
        T![')']
    );
}

#[test]
fn comparison_operators() {
    assert_tokenizes_as!(
        "A!=B<=C>=D<E>F",
        TokenMock::word("A"),
        T![!=],
        TokenMock::word("B"),
        T![<=],
        TokenMock::word("C"),
        T![>=],
        TokenMock::word("D"),
        T![<],
        TokenMock::word("E"),
        T![>],
        TokenMock::word("F")
    );
}

#[test]
fn select_with_guard() {
    assert_tokenizes_as!(
        "select CRYPTO if INET",
        T![select],
        ' ',
        TokenMock::word("CRYPTO"),
        ' ',
        T![if],
        ' ',
        TokenMock::word("INET")
    );
}

#[test]
fn negative_and_hex_numbers() {
    assert_tokenizes_as!(
        "range -1 0x1f",
        TokenMock::fixed(TokenKind::Range),
        ' ',
        TokenMock::word("-1"),
        ' ',
        TokenMock::word("0x1f")
    );
}

#[test]
fn source_path() {
    assert_tokenizes_as!(
        "source \"net/Kconfig\"",
        T![source],
        ' ',
        TokenMock::double_quoted("net/Kconfig")
    );
    assert_tokenizes_as!(
        "rsource 'sub/Kconfig'",
        TokenMock::fixed(TokenKind::Rsource),
        ' ',
        TokenMock::single_quoted("sub/Kconfig")
    );
}

#[test]
fn quoted_value_with_escapes() {
    assert_tokenizes_as!(
        r#"prompt "say \"hi\"""#,
        TokenMock::fixed(TokenKind::Prompt),
        ' ',
        TokenMock::double_quoted(r#"say \"hi\""#)
    );
}

#[test]
fn unterminated_quoted_value() {
    let tokens = crate::tokenize("prompt \"oops\nconfig A");
    assert_eq!(
        tokens[2].kind,
        TokenKind::Error(crate::token::LexerError {
            kind: LexerErrorKind::UnterminatedQuotedValue
        })
    );
}

#[test]
fn macro_references() {
    assert_tokenizes_as!(
        "def_bool $(cc-option,$(FLAG))",
        TokenMock::fixed(TokenKind::DefBool),
        ' ',
        TokenMock::macro_reference("$(cc-option,$(FLAG))")
    );
    assert_tokenizes_as!(
        "CC := gcc",
        TokenMock::word("CC"),
        ' ',
        T![:=],
        ' ',
        TokenMock::word("gcc")
    );
}

#[test]
fn escaped_newline() {
    assert_tokenizes_as!(
        "depends on A && \\\n B",
        T![depends],
        ' ',
        T![on],
        ' ',
        TokenMock::word("A"),
        ' ',
        T![&&],
        ' ',
        TokenMock::escaped_newline(),
        ' ',
        TokenMock::word("B")
    );
}

#[test]
fn unexpected_character() {
    let tokens = crate::tokenize("config A\n\t@");
    let last = tokens.last().unwrap();
    assert_eq!(
        last.kind,
        TokenKind::Error(crate::token::LexerError {
            kind: LexerErrorKind::UnexpectedCharacter
        })
    );
}

#[test]
fn non_ascii_lengths_are_bytes() {
    let input = "# Größe\nconfig A";
    let tokens = crate::tokenize(input);
    assert_eq!(tokens[0].len, "# Größe".len());
    let total: usize = tokens.iter().map(|t| t.len).sum();
    assert_eq!(total, input.len());
}
