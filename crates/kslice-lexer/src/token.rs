use thiserror::Error;

#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte length of token
    pub len: usize,
}

impl Token {
    pub fn is_whitespace(&self) -> bool {
        self.kind.is_whitespace()
    }

    pub fn is_end_of_input(&self) -> bool {
        self.kind.is_end_of_input()
    }

    pub fn get_fixed_str(&self) -> Option<&'static str> {
        self.kind.get_fixed_str()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Error(LexerError),

    // Keywords
    Bool,
    Choice,
    Comment,
    Config,
    Default,
    DefBool,
    DefTristate,
    Depends,
    EndChoice,
    EndIf,
    EndMenu,
    Help,
    Hex,
    If,
    Imply,
    Int,
    MainMenu,
    Menu,
    MenuConfig,
    Modules,
    On,
    Optional,
    OptionKeyword,
    Orsource,
    Osource,
    Prompt,
    Range,
    Rsource,
    Select,
    Source,
    String,
    Transitional,
    Tristate,
    Visible,

    // Operators
    And,
    CloseParenthesis,
    ColonEquals,
    Equals,
    Greater,
    GreaterEquals,
    Less,
    LessEquals,
    Not,
    NotEquals,
    OpenParenthesis,
    Or,
    PlusEquals,

    // Everything else
    CommentText,
    DoubleQuotedValue,
    EndOfInput,
    EscapedNewline,
    HelpText,
    MacroReference,
    Newline,
    SingleQuotedValue,
    Whitespace,
    Word,
}

#[derive(Error, Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[error("{kind}")]
pub struct LexerError {
    pub kind: LexerErrorKind,
}

#[derive(Error, Debug, Eq, PartialEq, Copy, Clone, Hash)]
pub enum LexerErrorKind {
    #[error("unterminated quoted string")]
    UnterminatedQuotedValue,
    #[error("unterminated macro reference")]
    UnterminatedMacroReference,
    #[error("unexpected character")]
    UnexpectedCharacter,
}

impl TokenKind {
    pub fn is_whitespace(&self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace | TokenKind::EscapedNewline | TokenKind::CommentText
        )
    }

    pub fn is_end_of_input(&self) -> bool {
        matches!(self, TokenKind::EndOfInput)
    }

    /// Tokens that end a statement.
    pub fn is_line_end(&self) -> bool {
        matches!(
            self,
            TokenKind::Newline | TokenKind::HelpText | TokenKind::EndOfInput
        )
    }

    /// Type keywords that open the attribute list of a config entry.
    pub fn is_type_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Bool
                | TokenKind::Tristate
                | TokenKind::String
                | TokenKind::Int
                | TokenKind::Hex
                | TokenKind::DefBool
                | TokenKind::DefTristate
        )
    }

    pub fn is_source_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Source | TokenKind::Rsource | TokenKind::Osource | TokenKind::Orsource
        )
    }

    pub fn get_fixed_str(&self) -> Option<&'static str> {
        let ret = match self {
            TokenKind::And => "&&",
            TokenKind::Bool => "bool",
            TokenKind::Choice => "choice",
            TokenKind::CloseParenthesis => ")",
            TokenKind::ColonEquals => ":=",
            TokenKind::Comment => "comment",
            TokenKind::Config => "config",
            TokenKind::Default => "default",
            TokenKind::DefBool => "def_bool",
            TokenKind::DefTristate => "def_tristate",
            TokenKind::Depends => "depends",
            TokenKind::EndChoice => "endchoice",
            TokenKind::EndIf => "endif",
            TokenKind::EndMenu => "endmenu",
            TokenKind::Equals => "=",
            TokenKind::EscapedNewline => "\\\n",
            TokenKind::Greater => ">",
            TokenKind::GreaterEquals => ">=",
            TokenKind::Help => "help",
            TokenKind::Hex => "hex",
            TokenKind::If => "if",
            TokenKind::Imply => "imply",
            TokenKind::Int => "int",
            TokenKind::Less => "<",
            TokenKind::LessEquals => "<=",
            TokenKind::MainMenu => "mainmenu",
            TokenKind::Menu => "menu",
            TokenKind::MenuConfig => "menuconfig",
            TokenKind::Modules => "modules",
            TokenKind::Newline => "\n",
            TokenKind::Not => "!",
            TokenKind::NotEquals => "!=",
            TokenKind::On => "on",
            TokenKind::OpenParenthesis => "(",
            TokenKind::Optional => "optional",
            TokenKind::OptionKeyword => "option",
            TokenKind::Or => "||",
            TokenKind::Orsource => "orsource",
            TokenKind::Osource => "osource",
            TokenKind::PlusEquals => "+=",
            TokenKind::Prompt => "prompt",
            TokenKind::Range => "range",
            TokenKind::Rsource => "rsource",
            TokenKind::Select => "select",
            TokenKind::Source => "source",
            TokenKind::String => "string",
            TokenKind::Transitional => "transitional",
            TokenKind::Tristate => "tristate",
            TokenKind::Visible => "visible",
            _ => return None,
        };

        Some(ret)
    }
}

pub fn make_fixed_str_token(kind: TokenKind) -> Token {
    Token {
        kind,
        len: kind.get_fixed_str().map(str::len).unwrap_or_default(),
    }
}

#[macro_export]
macro_rules! T {
    ['('] => { $crate::token::make_fixed_str_token($crate::token::TokenKind::OpenParenthesis) };
    [')'] => { $crate::token::make_fixed_str_token($crate::token::TokenKind::CloseParenthesis) };
    [&&] => { $crate::token::make_fixed_str_token($crate::token::TokenKind::And) };
    [||] => { $crate::token::make_fixed_str_token($crate::token::TokenKind::Or) };
    [!] => { $crate::token::make_fixed_str_token($crate::token::TokenKind::Not) };
    [=] => { $crate::token::make_fixed_str_token($crate::token::TokenKind::Equals) };
    [!=] => { $crate::token::make_fixed_str_token($crate::token::TokenKind::NotEquals) };
    [<] => { $crate::token::make_fixed_str_token($crate::token::TokenKind::Less) };
    [<=] => { $crate::token::make_fixed_str_token($crate::token::TokenKind::LessEquals) };
    [>] => { $crate::token::make_fixed_str_token($crate::token::TokenKind::Greater) };
    [>=] => { $crate::token::make_fixed_str_token($crate::token::TokenKind::GreaterEquals) };
    [:=] => { $crate::token::make_fixed_str_token($crate::token::TokenKind::ColonEquals) };
    [+=] => { $crate::token::make_fixed_str_token($crate::token::TokenKind::PlusEquals) };
    [config] => { $crate::token::make_fixed_str_token($crate::token::TokenKind::Config) };
    [menuconfig] => { $crate::token::make_fixed_str_token($crate::token::TokenKind::MenuConfig) };
    [bool] => { $crate::token::make_fixed_str_token($crate::token::TokenKind::Bool) };
    [tristate] => { $crate::token::make_fixed_str_token($crate::token::TokenKind::Tristate) };
    [depends] => { $crate::token::make_fixed_str_token($crate::token::TokenKind::Depends) };
    [on] => { $crate::token::make_fixed_str_token($crate::token::TokenKind::On) };
    [select] => { $crate::token::make_fixed_str_token($crate::token::TokenKind::Select) };
    [default] => { $crate::token::make_fixed_str_token($crate::token::TokenKind::Default) };
    [if] => { $crate::token::make_fixed_str_token($crate::token::TokenKind::If) };
    [endif] => { $crate::token::make_fixed_str_token($crate::token::TokenKind::EndIf) };
    [source] => { $crate::token::make_fixed_str_token($crate::token::TokenKind::Source) };
    [help] => { $crate::token::make_fixed_str_token($crate::token::TokenKind::Help) };
}
