use muncher::Muncher;
use phf::{self, phf_map};

use crate::token::{LexerError, LexerErrorKind, Token, TokenKind};

static KCONFIG_KEYWORDS: phf::Map<&'static str, TokenKind> = phf_map! {
    "bool" => TokenKind::Bool,
    "boolean" => TokenKind::Bool,
    "choice" => TokenKind::Choice,
    "comment" => TokenKind::Comment,
    "config" => TokenKind::Config,
    "def_bool" => TokenKind::DefBool,
    "def_tristate" => TokenKind::DefTristate,
    "default" => TokenKind::Default,
    "depends" => TokenKind::Depends,
    "endchoice" => TokenKind::EndChoice,
    "endif" => TokenKind::EndIf,
    "endmenu" => TokenKind::EndMenu,
    "help" => TokenKind::Help,
    "---help---" => TokenKind::Help,
    "hex" => TokenKind::Hex,
    "if" => TokenKind::If,
    "imply" => TokenKind::Imply,
    "int" => TokenKind::Int,
    "mainmenu" => TokenKind::MainMenu,
    "menu" => TokenKind::Menu,
    "menuconfig" => TokenKind::MenuConfig,
    "modules" => TokenKind::Modules,
    "on" => TokenKind::On,
    "option" => TokenKind::OptionKeyword,
    "optional" => TokenKind::Optional,
    "orsource" => TokenKind::Orsource,
    "osource" => TokenKind::Osource,
    "prompt" => TokenKind::Prompt,
    "range" => TokenKind::Range,
    "rsource" => TokenKind::Rsource,
    "select" => TokenKind::Select,
    "source" => TokenKind::Source,
    "string" => TokenKind::String,
    "transitional" => TokenKind::Transitional,
    "tristate" => TokenKind::Tristate,
    "visible" => TokenKind::Visible,
};

pub fn is_space_or_tab(c: char) -> bool {
    matches!(c, ' ' | '\t')
}

/// Symbol names, numeric constants and keywords all share one character class. `---help---`
/// falls out of it as well, which is why '-' is included.
fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-')
}

#[inline]
fn scan_comment(m: &mut Muncher) -> TokenKind {
    m.reset_peek();
    m.eat_until_count(|c| *c == '\n');
    TokenKind::CommentText
}

#[inline]
fn scan_quoted_value(m: &mut Muncher, quote_char: char) -> TokenKind {
    while let Some(c) = m.eat() {
        match c {
            c if c == quote_char => {
                return match quote_char {
                    '\'' => TokenKind::SingleQuotedValue,
                    _ => TokenKind::DoubleQuotedValue,
                };
            }
            '\\' => {
                // Escaped character, including an escaped quote
                if m.eat().is_none() {
                    break;
                }
            }
            // Unescaped newlines are not allowed
            '\n' => break,
            _ => {}
        }
    }

    TokenKind::Error(LexerError {
        kind: LexerErrorKind::UnterminatedQuotedValue,
    })
}

/// `$(...)` preprocessor references, possibly nested: `$(cc-option,$(FLAG))`
#[inline]
fn scan_macro_reference(m: &mut Muncher) -> TokenKind {
    let mut depth = 1usize;
    while let Some(c) = m.eat() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return TokenKind::MacroReference;
                }
            }
            '\n' => break,
            _ => {}
        }
    }

    TokenKind::Error(LexerError {
        kind: LexerErrorKind::UnterminatedMacroReference,
    })
}

/// Help text runs until the first non-blank line indented less than the first line of the text.
/// A first line with no indentation at all means the help block is empty.
fn scan_help_text(m: &mut Muncher) {
    let mut required_indent = None;

    loop {
        m.reset_peek();
        let mut indent = 0usize;
        let mut blank = false;
        let mut at_end = false;
        loop {
            match m.peek() {
                Some(' ') => indent += 1,
                Some('\t') => indent = (indent & !7) + 8,
                Some('\n') => {
                    blank = true;
                    break;
                }
                None => {
                    at_end = true;
                    break;
                }
                Some(_) => break,
            }
        }
        m.reset_peek();

        if at_end {
            break;
        }

        if !blank {
            match required_indent {
                None if indent == 0 => break,
                None => required_indent = Some(indent),
                Some(required) if indent < required => break,
                Some(_) => {}
            }
        }

        // Consume the whole line, including its newline
        m.eat_until_count(|c| *c == '\n');
        m.eat();
    }
}

#[derive(Debug, PartialEq, Eq)]
enum KconfigLexerState {
    Normal,
    /// Saw `help`; the rest of the line and the indented block that follows are help text
    ExpectHelpText,
}

pub struct KconfigLexer<'input> {
    input: &'input str,
    muncher: Muncher<'input>,
    /// Byte offset of each character position, plus one past the end
    offsets: Vec<usize>,
    pub(crate) token: Token,
    skip_whitespace: bool,
    state: KconfigLexerState,
}

impl<'input> KconfigLexer<'input> {
    pub fn new(input: &'input str, skip_whitespace: bool) -> KconfigLexer<'input> {
        let offsets = input
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(input.len()))
            .collect();

        let mut ret = KconfigLexer {
            input,
            muncher: Muncher::new(input),
            offsets,
            skip_whitespace,
            token: Token {
                kind: TokenKind::EndOfInput,
                len: 0,
            },
            state: KconfigLexerState::Normal,
        };
        ret.advance();
        ret
    }

    pub fn token(&self) -> Token {
        self.token.clone()
    }

    pub fn advance(&mut self) {
        self._advance_internal();

        while self.skip_whitespace && self.token.is_whitespace() {
            self._advance_internal();
        }
    }

    fn byte_offset(&self, position: usize) -> usize {
        self.offsets
            .get(position)
            .copied()
            .unwrap_or(self.input.len())
    }

    fn _emit(&mut self, start: usize, kind: TokenKind) {
        let len = self.byte_offset(self.muncher.position()) - self.byte_offset(start);
        self.token = Token { kind, len };
    }

    fn _eat_if(&mut self, expected: char) -> bool {
        self.muncher.reset_peek();
        if self.muncher.peek() == Some(&expected) {
            self.muncher.eat();
            return true;
        }
        self.muncher.reset_peek();
        false
    }

    fn _advance_internal(&mut self) {
        let start = self.muncher.position();
        let c = match self.muncher.eat() {
            Some(c) => c,
            None => {
                self.token = Token {
                    kind: TokenKind::EndOfInput,
                    len: 0,
                };
                return;
            }
        };

        // Common whitespace handling for all states
        if is_space_or_tab(c) {
            self.muncher.reset_peek();
            self.muncher.eat_until_count(|c| !is_space_or_tab(*c));
            self._emit(start, TokenKind::Whitespace);
            return;
        }

        if self.state == KconfigLexerState::ExpectHelpText {
            self.state = KconfigLexerState::Normal;
            if c != '\n' {
                // Anything trailing the `help` keyword on its own line is ignored
                self.muncher.reset_peek();
                self.muncher.eat_until_count(|c| *c == '\n');
                self.muncher.eat();
            }
            scan_help_text(&mut self.muncher);
            self._emit(start, TokenKind::HelpText);
            return;
        }

        let kind = match c {
            '#' => scan_comment(&mut self.muncher),
            '\n' => TokenKind::Newline,
            '\\' => {
                if self._eat_if('\n') {
                    TokenKind::EscapedNewline
                } else {
                    unexpected_character()
                }
            }
            '"' | '\'' => scan_quoted_value(&mut self.muncher, c),
            '$' => {
                if self._eat_if('(') {
                    scan_macro_reference(&mut self.muncher)
                } else {
                    unexpected_character()
                }
            }
            '(' => TokenKind::OpenParenthesis,
            ')' => TokenKind::CloseParenthesis,
            '&' => {
                if self._eat_if('&') {
                    TokenKind::And
                } else {
                    unexpected_character()
                }
            }
            '|' => {
                if self._eat_if('|') {
                    TokenKind::Or
                } else {
                    unexpected_character()
                }
            }
            '!' => {
                if self._eat_if('=') {
                    TokenKind::NotEquals
                } else {
                    TokenKind::Not
                }
            }
            '=' => TokenKind::Equals,
            '<' => {
                if self._eat_if('=') {
                    TokenKind::LessEquals
                } else {
                    TokenKind::Less
                }
            }
            '>' => {
                if self._eat_if('=') {
                    TokenKind::GreaterEquals
                } else {
                    TokenKind::Greater
                }
            }
            ':' => {
                if self._eat_if('=') {
                    TokenKind::ColonEquals
                } else {
                    unexpected_character()
                }
            }
            '+' => {
                if self._eat_if('=') {
                    TokenKind::PlusEquals
                } else {
                    unexpected_character()
                }
            }
            c if is_word_char(c) => {
                self.muncher.reset_peek();
                self.muncher.eat_until_count(|c| !is_word_char(*c));
                let end = self.muncher.position();
                let text = &self.input[self.byte_offset(start)..self.byte_offset(end)];
                match KCONFIG_KEYWORDS.get(text) {
                    Some(TokenKind::Help) => {
                        self.state = KconfigLexerState::ExpectHelpText;
                        TokenKind::Help
                    }
                    Some(keyword) => *keyword,
                    None => TokenKind::Word,
                }
            }
            _ => unexpected_character(),
        };

        self._emit(start, kind);
    }
}

fn unexpected_character() -> TokenKind {
    TokenKind::Error(LexerError {
        kind: LexerErrorKind::UnexpectedCharacter,
    })
}

pub fn tokenize(data: &str) -> Vec<Token> {
    let mut lexer = KconfigLexer::new(data, false);

    let mut ret = vec![];

    while lexer.token().kind != TokenKind::EndOfInput {
        ret.push(lexer.token());
        lexer.advance();
    }

    ret
}
