use itertools::Itertools;
use kslice_lexer::token::TokenKind;
use kslice_lexer::tokenize;
use kslice_util::line_index::LineIndex;

use crate::ast::{
    AssignmentOp, ConfigEntry, DefaultValue, Expr, Item, Prompt, Properties, Range,
    ReverseDependency, Root, SourceKind, SymbolType,
};
use crate::{ParseError, ParseErrorKind, ParserResult};

mod expr;

pub use expr::is_numeric_literal;


#[derive(Debug, Clone, Copy)]
struct Lexeme<'text> {
    kind: TokenKind,
    text: &'text str,
    offset: usize,
}

struct Parser<'text> {
    input: &'text str,
    /// Significant tokens only, always terminated by an `EndOfInput` lexeme
    lexemes: Vec<Lexeme<'text>>,
    pos: usize,
    lines: LineIndex,
}

/// Removes the surrounding quotes and resolves backslash escapes.
pub fn unquote(text: &str) -> String {
    let inner = text
        .get(1..text.len().saturating_sub(1))
        .unwrap_or_default();
    let mut ret = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => ret.extend(chars.next()),
            c => ret.push(c),
        }
    }
    ret
}

impl<'text> Parser<'text> {
    fn new(input: &'text str) -> Parser<'text> {
        let mut offset = 0;
        let mut lexemes = vec![];
        for token in tokenize(input) {
            let text = &input[offset..offset + token.len];
            if !token.is_whitespace() {
                lexemes.push(Lexeme {
                    kind: token.kind,
                    text,
                    offset,
                });
            }
            offset += token.len;
        }
        lexemes.push(Lexeme {
            kind: TokenKind::EndOfInput,
            text: "",
            offset: input.len(),
        });

        Parser {
            input,
            lexemes,
            pos: 0,
            lines: LineIndex::new(input),
        }
    }

    fn current(&self) -> Lexeme<'text> {
        self.lexemes[self.pos.min(self.lexemes.len() - 1)]
    }

    fn peek(&self) -> TokenKind {
        self.current().kind
    }

    fn peek_nth(&self, n: usize) -> TokenKind {
        self.lexemes
            .get(self.pos + n)
            .map(|l| l.kind)
            .unwrap_or(TokenKind::EndOfInput)
    }

    fn bump(&mut self) -> Lexeme<'text> {
        let ret = self.current();
        if ret.kind != TokenKind::EndOfInput {
            self.pos += 1;
        }
        ret
    }

    fn allow(&mut self, kind: TokenKind) -> bool {
        if self.peek() == kind {
            self.bump();
            return true;
        }

        false
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> ParserResult<Lexeme<'text>> {
        if self.peek() == kind {
            return Ok(self.bump());
        }
        Err(self.error_here(what))
    }

    fn line(&self) -> usize {
        self.lines.line(self.current().offset)
    }

    fn error(&self, kind: ParseErrorKind) -> ParseError {
        ParseError {
            line: self.line(),
            kind,
        }
    }

    fn error_here(&self, expected: &str) -> ParseError {
        let current = self.current();
        let kind = match current.kind {
            TokenKind::Error(e) => ParseErrorKind::Lexer(e),
            TokenKind::EndOfInput => ParseErrorKind::UnexpectedToken {
                expected: expected.to_string(),
                found: String::from("end of file"),
            },
            TokenKind::Newline | TokenKind::HelpText => ParseErrorKind::UnexpectedToken {
                expected: expected.to_string(),
                found: String::from("end of line"),
            },
            _ => ParseErrorKind::UnexpectedToken {
                expected: expected.to_string(),
                found: format!("`{}`", current.text.trim()),
            },
        };
        self.error(kind)
    }

    fn skip_newlines(&mut self) {
        while self.peek() == TokenKind::Newline {
            self.bump();
        }
    }

    fn expect_line_end(&mut self) -> ParserResult<()> {
        match self.peek() {
            TokenKind::Newline | TokenKind::HelpText => {
                self.bump();
                Ok(())
            }
            TokenKind::EndOfInput => Ok(()),
            _ => Err(self.error_here("end of line")),
        }
    }

    /// Ignores the remainder of the current line.
    fn skip_line(&mut self) -> ParserResult<()> {
        while !self.peek().is_line_end() {
            if let TokenKind::Error(e) = self.peek() {
                return Err(self.error(ParseErrorKind::Lexer(e)));
            }
            self.bump();
        }
        self.expect_line_end()
    }

    fn parse_string(&mut self, what: &str) -> ParserResult<String> {
        match self.peek() {
            TokenKind::DoubleQuotedValue | TokenKind::SingleQuotedValue => {
                Ok(unquote(self.bump().text))
            }
            _ => Err(self.error_here(what)),
        }
    }

    fn parse_name(&mut self) -> ParserResult<String> {
        Ok(self.expect(TokenKind::Word, "option name")?.text.to_string())
    }

    fn parse_if_condition(&mut self) -> ParserResult<Option<Expr>> {
        if self.allow(TokenKind::If) {
            return Ok(Some(self.parse_expr()?));
        }
        Ok(None)
    }

    fn parse_items(&mut self, terminator: Option<TokenKind>) -> ParserResult<Vec<Item>> {
        let mut items = vec![];

        loop {
            self.skip_newlines();
            match self.peek() {
                TokenKind::EndOfInput => {
                    return match terminator.and_then(|t| t.get_fixed_str()) {
                        Some(end) => Err(self.error(ParseErrorKind::UnterminatedBlock(end))),
                        None => Ok(items),
                    };
                }
                kind if Some(kind) == terminator => {
                    self.bump();
                    self.expect_line_end()?;
                    return Ok(items);
                }
                kind @ (TokenKind::EndChoice | TokenKind::EndMenu | TokenKind::EndIf) => {
                    let end = kind.get_fixed_str().unwrap_or("end");
                    return Err(self.error(ParseErrorKind::UnmatchedEnd(end)));
                }
                _ => items.push(self.parse_item()?),
            }
        }
    }

    fn parse_item(&mut self) -> ParserResult<Item> {
        match self.peek() {
            TokenKind::Config | TokenKind::MenuConfig => self.parse_config(),
            TokenKind::Choice => self.parse_choice(),
            TokenKind::Menu => self.parse_menu(),
            TokenKind::If => {
                let line = self.line();
                self.bump();
                let condition = self.parse_expr()?;
                self.expect_line_end()?;
                let items = self.parse_items(Some(TokenKind::EndIf))?;
                Ok(Item::If {
                    condition,
                    line,
                    items,
                })
            }
            kind if kind.is_source_keyword() => self.parse_source(),
            TokenKind::Comment => {
                let line = self.line();
                self.bump();
                let text = self.parse_string("comment text")?;
                self.expect_line_end()?;
                let depends = self.parse_menu_attributes(false)?.0;
                Ok(Item::Comment {
                    text,
                    line,
                    depends,
                })
            }
            TokenKind::MainMenu => {
                let line = self.line();
                self.bump();
                let title = self.parse_string("menu title")?;
                self.expect_line_end()?;
                Ok(Item::MainMenu { title, line })
            }
            TokenKind::Word
                if matches!(
                    self.peek_nth(1),
                    TokenKind::ColonEquals | TokenKind::Equals | TokenKind::PlusEquals
                ) =>
            {
                self.parse_assignment()
            }
            _ => Err(self.error_here(&statement_keywords())),
        }
    }

    fn parse_config(&mut self) -> ParserResult<Item> {
        let line = self.line();
        let is_menuconfig = self.bump().kind == TokenKind::MenuConfig;
        let name = self.parse_name()?;
        self.expect_line_end()?;
        let properties = self.parse_properties()?;

        Ok(Item::Config(ConfigEntry {
            name,
            line,
            is_menuconfig,
            properties,
        }))
    }

    fn parse_choice(&mut self) -> ParserResult<Item> {
        let line = self.line();
        self.bump();
        let name = match self.peek() {
            TokenKind::Word => Some(self.bump().text.to_string()),
            _ => None,
        };
        self.expect_line_end()?;
        let properties = self.parse_properties()?;
        let items = self.parse_items(Some(TokenKind::EndChoice))?;

        Ok(Item::Choice {
            name,
            line,
            properties,
            items,
        })
    }

    fn parse_menu(&mut self) -> ParserResult<Item> {
        let line = self.line();
        self.bump();
        let title = self.parse_string("menu title")?;
        self.expect_line_end()?;
        let (depends, visible) = self.parse_menu_attributes(true)?;
        let items = self.parse_items(Some(TokenKind::EndMenu))?;

        Ok(Item::Menu {
            title,
            line,
            depends,
            visible,
            items,
        })
    }

    /// `depends on` lines, plus `visible if` lines when `allow_visible` is set.
    fn parse_menu_attributes(&mut self, allow_visible: bool) -> ParserResult<(Vec<Expr>, Vec<Expr>)> {
        let mut depends = vec![];
        let mut visible = vec![];

        loop {
            self.skip_newlines();
            match self.peek() {
                TokenKind::Depends => {
                    self.bump();
                    self.expect(TokenKind::On, "`on`")?;
                    depends.push(self.parse_expr()?);
                }
                TokenKind::Visible if allow_visible => {
                    self.bump();
                    self.expect(TokenKind::If, "`if`")?;
                    visible.push(self.parse_expr()?);
                }
                _ => return Ok((depends, visible)),
            }
            self.expect_line_end()?;
        }
    }

    fn parse_source(&mut self) -> ParserResult<Item> {
        let line = self.line();
        let kind = match self.bump().kind {
            TokenKind::Rsource => SourceKind::Relative,
            TokenKind::Osource => SourceKind::Optional,
            TokenKind::Orsource => SourceKind::OptionalRelative,
            _ => SourceKind::Source,
        };
        let path = match self.peek() {
            TokenKind::Word => self.bump().text.to_string(),
            _ => self.parse_string("file path")?,
        };
        self.expect_line_end()?;

        Ok(Item::Source { kind, path, line })
    }

    fn parse_assignment(&mut self) -> ParserResult<Item> {
        let line = self.line();
        let name = self.bump().text.to_string();
        let op = match self.bump().kind {
            TokenKind::ColonEquals => AssignmentOp::Immediate,
            TokenKind::PlusEquals => AssignmentOp::Append,
            _ => AssignmentOp::Recursive,
        };

        // The value is raw text up to the end of the line
        let value_start = self.current().offset;
        while !self.peek().is_line_end() {
            self.bump();
        }
        let value = self.input[value_start..self.current().offset]
            .trim()
            .to_string();
        self.expect_line_end()?;

        Ok(Item::Assignment {
            name,
            op,
            value,
            line,
        })
    }

    fn parse_properties(&mut self) -> ParserResult<Properties> {
        let mut props = Properties::default();

        loop {
            self.skip_newlines();
            match self.peek() {
                TokenKind::Bool
                | TokenKind::Tristate
                | TokenKind::String
                | TokenKind::Int
                | TokenKind::Hex => {
                    props.symbol_type = symbol_type_for(self.bump().kind);
                    if matches!(
                        self.peek(),
                        TokenKind::DoubleQuotedValue | TokenKind::SingleQuotedValue
                    ) {
                        let text = self.parse_string("prompt")?;
                        let condition = self.parse_if_condition()?;
                        props.prompt = Some(Prompt { text, condition });
                    }
                }
                TokenKind::DefBool | TokenKind::DefTristate => {
                    props.symbol_type = symbol_type_for(self.bump().kind);
                    let value = self.parse_expr()?;
                    let condition = self.parse_if_condition()?;
                    props.defaults.push(DefaultValue { value, condition });
                }
                TokenKind::Prompt => {
                    self.bump();
                    let text = self.parse_string("prompt")?;
                    let condition = self.parse_if_condition()?;
                    props.prompt = Some(Prompt { text, condition });
                }
                TokenKind::Default => {
                    self.bump();
                    let value = self.parse_expr()?;
                    let condition = self.parse_if_condition()?;
                    props.defaults.push(DefaultValue { value, condition });
                }
                TokenKind::Depends => {
                    self.bump();
                    self.expect(TokenKind::On, "`on`")?;
                    props.depends.push(self.parse_expr()?);
                }
                kind @ (TokenKind::Select | TokenKind::Imply) => {
                    self.bump();
                    let target = self.parse_name()?;
                    let condition = self.parse_if_condition()?;
                    let dep = ReverseDependency { target, condition };
                    if kind == TokenKind::Select {
                        props.selects.push(dep);
                    } else {
                        props.implies.push(dep);
                    }
                }
                TokenKind::Range => {
                    self.bump();
                    let low = self.parse_primary()?;
                    let high = self.parse_primary()?;
                    let condition = self.parse_if_condition()?;
                    props.ranges.push(Range {
                        low,
                        high,
                        condition,
                    });
                }
                TokenKind::Help => {
                    self.bump();
                    self.allow(TokenKind::HelpText);
                    props.has_help = true;
                    continue;
                }
                TokenKind::Optional => {
                    self.bump();
                    props.optional = true;
                }
                TokenKind::OptionKeyword | TokenKind::Transitional | TokenKind::Modules => {
                    self.skip_line()?;
                    continue;
                }
                _ => return Ok(props),
            }
            self.expect_line_end()?;
        }
    }
}

fn symbol_type_for(kind: TokenKind) -> Option<SymbolType> {
    match kind {
        TokenKind::Bool | TokenKind::DefBool => Some(SymbolType::Bool),
        TokenKind::Tristate | TokenKind::DefTristate => Some(SymbolType::Tristate),
        TokenKind::String => Some(SymbolType::String),
        TokenKind::Int => Some(SymbolType::Int),
        TokenKind::Hex => Some(SymbolType::Hex),
        _ => None,
    }
}

fn statement_keywords() -> String {
    [
        TokenKind::Config,
        TokenKind::MenuConfig,
        TokenKind::Choice,
        TokenKind::Menu,
        TokenKind::If,
        TokenKind::Source,
        TokenKind::Comment,
    ]
    .iter()
    .filter_map(TokenKind::get_fixed_str)
    .map(|s| format!("`{s}`"))
    .join(", ")
}

/// Parses one Kconfig file. `source` statements are recorded, not followed.
pub fn parse_kconfig_from_str(input: &str) -> ParserResult<Root> {
    let mut parser = Parser::new(input);
    let items = parser.parse_items(None)?;
    Ok(Root { items })
}
