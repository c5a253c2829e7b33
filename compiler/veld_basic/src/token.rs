//! Token kinds, spellings, and the keyword/punctuator lookup tables.
//!
//! Everything in this module derives from the single `token_kinds!`
//! invocation below: the `TokenKind` enum, the stable snake-case names, the
//! spelling lookups, and the runtime tables the lexer consults. Adding a
//! keyword or punctuator means adding exactly one row.

use rustc_hash::FxHashMap;

use crate::source_location::SourceLocation;

/// Broad classification of a token kind, used to build the lookup tables.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TokenClass {
    /// Structural kinds: `eof`, `eol`, `unknown`.
    Misc,
    /// Integer/real/string/rune constants and plain identifiers.
    Literal,
    Keyword,
    /// Built-in type names (`int`, `float`, ...).
    Type,
    /// Type modifiers (`signed`, `unsigned`).
    TypeModifier,
    Punctuator,
}

/// One row of the token catalog.
#[derive(Copy, Clone, Debug)]
pub struct TokenEntry {
    pub kind: TokenKind,
    pub name: &'static str,
    pub class: TokenClass,
    pub spelling: Option<&'static str>,
    pub precedence: u8,
}

macro_rules! token_kinds {
    ($($name:ident = $str:literal, $class:ident, $spelling:expr, $prec:literal;)*) => {
        /// Every kind of token the lexer can produce.
        #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
        pub enum TokenKind {
            $($name,)*
        }

        impl TokenKind {
            /// Stable snake-case name (`kw_fn`, `integer_constant`, `ampamp`).
            pub fn name(self) -> &'static str {
                match self {
                    $(TokenKind::$name => $str,)*
                }
            }

            pub fn class(self) -> TokenClass {
                match self {
                    $(TokenKind::$name => TokenClass::$class,)*
                }
            }

            /// Fixed source spelling, if this kind has one.
            pub fn spelling(self) -> Option<&'static str> {
                match self {
                    $(TokenKind::$name => $spelling,)*
                }
            }
        }

        /// The single source of truth for all token metadata.
        pub const TOKEN_TABLE: &[TokenEntry] = &[
            $(TokenEntry {
                kind: TokenKind::$name,
                name: $str,
                class: TokenClass::$class,
                spelling: $spelling,
                precedence: $prec,
            },)*
        ];
    };
}

token_kinds! {
    // === Structural ===
    Unknown = "unknown", Misc, None, 0;
    Eof = "eof", Misc, None, 0;
    Eol = "eol", Misc, None, 0;

    // === Literals and identifiers ===
    Identifier = "identifier", Literal, None, 0;
    IntegerConstant = "integer_constant", Literal, None, 0;
    RealConstant = "real_constant", Literal, None, 0;
    StringConstant = "string_constant", Literal, None, 0;
    RuneConstant = "rune_constant", Literal, None, 0;

    // === Keywords ===
    KwFn = "kw_fn", Keyword, Some("fn"), 0;
    KwLet = "kw_let", Keyword, Some("let"), 0;
    KwVar = "kw_var", Keyword, Some("var"), 0;
    KwModule = "kw_module", Keyword, Some("module"), 0;
    KwImport = "kw_import", Keyword, Some("import"), 0;
    KwIf = "kw_if", Keyword, Some("if"), 0;
    KwElif = "kw_elif", Keyword, Some("elif"), 0;
    KwElse = "kw_else", Keyword, Some("else"), 0;
    KwMatch = "kw_match", Keyword, Some("match"), 0;
    KwReturn = "kw_return", Keyword, Some("return"), 0;
    KwTrue = "kw_true", Keyword, Some("true"), 0;
    KwFalse = "kw_false", Keyword, Some("false"), 0;

    // === Built-in type names ===
    TyInt = "ty_int", Type, Some("int"), 0;
    TyUint = "ty_uint", Type, Some("uint"), 0;
    TyFloat = "ty_float", Type, Some("float"), 0;
    TyString = "ty_string", Type, Some("string"), 0;
    TyRune = "ty_rune", Type, Some("rune"), 0;
    TyBool = "ty_bool", Type, Some("bool"), 0;

    // === Type modifiers ===
    TyModSigned = "ty_mod_signed", TypeModifier, Some("signed"), 0;
    TyModUnsigned = "ty_mod_unsigned", TypeModifier, Some("unsigned"), 0;

    // === Punctuators ===
    // Precedence is for the parser's binary-expression climbing; 0 means
    // "not a binary operator". Every proper prefix of a multi-character
    // punctuator must itself be a punctuator (the lexer's greedy matcher
    // relies on this; see `table_is_prefix_closed`).
    LParen = "lparen", Punctuator, Some("("), 0;
    RParen = "rparen", Punctuator, Some(")"), 0;
    LBrace = "lbrace", Punctuator, Some("{"), 0;
    RBrace = "rbrace", Punctuator, Some("}"), 0;
    LBracket = "lbracket", Punctuator, Some("["), 0;
    RBracket = "rbracket", Punctuator, Some("]"), 0;
    Amp = "amp", Punctuator, Some("&"), 14;
    AmpAmp = "ampamp", Punctuator, Some("&&"), 11;
    Pipe = "pipe", Punctuator, Some("|"), 12;
    PipePipe = "pipepipe", Punctuator, Some("||"), 10;
    Plus = "plus", Punctuator, Some("+"), 18;
    PlusPlus = "plusplus", Punctuator, Some("++"), 0;
    Minus = "minus", Punctuator, Some("-"), 18;
    MinusMinus = "minusminus", Punctuator, Some("--"), 0;
    Arrow = "arrow", Punctuator, Some("->"), 0;
    Star = "star", Punctuator, Some("*"), 19;
    Slash = "slash", Punctuator, Some("/"), 19;
    Percent = "percent", Punctuator, Some("%"), 19;
    Equal = "equal", Punctuator, Some("="), 2;
    EqualEqual = "equalequal", Punctuator, Some("=="), 15;
    Exclaim = "exclaim", Punctuator, Some("!"), 0;
    ExclaimEqual = "exclaimequal", Punctuator, Some("!="), 15;
    Less = "less", Punctuator, Some("<"), 16;
    LessEqual = "lessequal", Punctuator, Some("<="), 16;
    LessLess = "lessless", Punctuator, Some("<<"), 17;
    Greater = "greater", Punctuator, Some(">"), 16;
    GreaterEqual = "greaterequal", Punctuator, Some(">="), 16;
    GreaterGreater = "greatergreater", Punctuator, Some(">>"), 17;
    Caret = "caret", Punctuator, Some("^"), 13;
    Tilde = "tilde", Punctuator, Some("~"), 0;
    Period = "period", Punctuator, Some("."), 0;
    PeriodPeriod = "periodperiod", Punctuator, Some(".."), 5;
    Ellipsis = "ellipsis", Punctuator, Some("..."), 0;
    Comma = "comma", Punctuator, Some(","), 0;
    Colon = "colon", Punctuator, Some(":"), 0;
    ColonColon = "coloncolon", Punctuator, Some("::"), 0;
    Semi = "semi", Punctuator, Some(";"), 0;
    At = "at", Punctuator, Some("@"), 0;
    Question = "question", Punctuator, Some("?"), 0;
}

impl TokenKind {
    #[inline]
    pub fn is_keyword(self) -> bool {
        matches!(
            self.class(),
            TokenClass::Keyword | TokenClass::Type | TokenClass::TypeModifier
        )
    }

    #[inline]
    pub fn is_punctuator(self) -> bool {
        self.class() == TokenClass::Punctuator
    }

    /// Render this kind for a diagnostic message.
    ///
    /// Punctuators are quoted (`'&&'`), keywords render bare (`fn`), and
    /// everything else renders as its bracketed name (`<identifier>`).
    pub fn describe(self) -> String {
        match (self.class(), self.spelling()) {
            (TokenClass::Punctuator, Some(sp)) => format!("'{sp}'"),
            (_, Some(sp)) => sp.to_string(),
            (_, None) => format!("<{}>", self.name()),
        }
    }
}

/// Payload carried by a token.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum TokenValue {
    #[default]
    None,
    /// Identifier spelling or decoded string-literal content.
    Str(String),
    Int(u64),
    Real(f64),
    /// A single Unicode scalar value.
    Rune(char),
}

/// A classified, located unit of lexical output.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    kind: TokenKind,
    location: SourceLocation,
    value: TokenValue,
}

impl Token {
    pub fn new(kind: TokenKind, location: SourceLocation, value: TokenValue) -> Self {
        Token {
            kind,
            location,
            value,
        }
    }

    #[inline]
    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    #[inline]
    pub fn location(&self) -> SourceLocation {
        self.location
    }

    #[inline]
    pub fn value(&self) -> &TokenValue {
        &self.value
    }

    #[inline]
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    #[inline]
    pub fn is_not(&self, kind: TokenKind) -> bool {
        self.kind != kind
    }

    #[inline]
    pub fn is_keyword(&self) -> bool {
        self.kind.is_keyword()
    }

    #[inline]
    pub fn is_punctuator(&self) -> bool {
        self.kind.is_punctuator()
    }

    /// Rewrite the kind once, for caller-side disambiguation such as
    /// contextual keyword promotion.
    pub fn set_kind(&mut self, kind: TokenKind) {
        self.kind = kind;
    }
}

/// Keyword/type/type-modifier spelling metadata.
#[derive(Copy, Clone, Debug)]
pub struct IdentifierInfo {
    pub spelling: &'static str,
    pub kind: TokenKind,
}

/// Maps reserved spellings (`fn`, `int`, `signed`, ...) to their kinds.
///
/// Populated once from `TOKEN_TABLE`; misses are the expected case for
/// user-defined identifiers.
pub struct IdentifierTable {
    table: FxHashMap<&'static str, IdentifierInfo>,
}

impl IdentifierTable {
    pub fn new() -> Self {
        let mut table = FxHashMap::default();
        for entry in TOKEN_TABLE {
            let reserved = matches!(
                entry.class,
                TokenClass::Keyword | TokenClass::Type | TokenClass::TypeModifier
            );
            if let (true, Some(spelling)) = (reserved, entry.spelling) {
                table.insert(
                    spelling,
                    IdentifierInfo {
                        spelling,
                        kind: entry.kind,
                    },
                );
            }
        }
        IdentifierTable { table }
    }

    pub fn get(&self, spelling: &str) -> Option<IdentifierInfo> {
        self.table.get(spelling).copied()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl Default for IdentifierTable {
    fn default() -> Self {
        IdentifierTable::new()
    }
}

/// Punctuator spelling metadata, including parser precedence.
#[derive(Copy, Clone, Debug)]
pub struct PunctuatorInfo {
    pub spelling: &'static str,
    pub kind: TokenKind,
    pub precedence: u8,
}

/// Maps punctuator spellings to their kinds and precedences.
pub struct PunctuatorTable {
    table: FxHashMap<&'static str, PunctuatorInfo>,
}

impl PunctuatorTable {
    pub fn new() -> Self {
        let mut table = FxHashMap::default();
        for entry in TOKEN_TABLE {
            if let (TokenClass::Punctuator, Some(spelling)) = (entry.class, entry.spelling) {
                table.insert(
                    spelling,
                    PunctuatorInfo {
                        spelling,
                        kind: entry.kind,
                        precedence: entry.precedence,
                    },
                );
            }
        }
        PunctuatorTable { table }
    }

    pub fn get(&self, spelling: &str) -> Option<PunctuatorInfo> {
        self.table.get(spelling).copied()
    }

    /// True if any punctuator spelling starts with `prefix`.
    ///
    /// The lexer's greedy matcher extends its candidate while this holds.
    pub fn is_prefix(&self, prefix: &str) -> bool {
        self.table.keys().any(|sp| sp.starts_with(prefix))
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl Default for PunctuatorTable {
    fn default() -> Self {
        PunctuatorTable::new()
    }
}
