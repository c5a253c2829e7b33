//! The diagnostic catalog.
//!
//! Every reportable condition is one row in the `diag_ids!` invocation:
//! the `DiagId` enum, severities, component tags, titles, and message
//! templates all derive from it. Lexer, parser, and driver ids share one
//! id space.
//!
//! Template syntax is documented in [`crate::format`].

use crate::severity::Severity;

/// Which compiler stage owns a diagnostic.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Component {
    Lex,
    Parse,
    Driver,
}

macro_rules! diag_ids {
    ($($name:ident = $str:literal, $sev:ident, $component:ident, $title:literal, $template:literal;)*) => {
        /// Identifier for one catalog entry.
        #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
        pub enum DiagId {
            $($name,)*
        }

        impl DiagId {
            /// Stable snake-case name.
            pub fn name(self) -> &'static str {
                match self {
                    $(DiagId::$name => $str,)*
                }
            }

            /// Default severity, before engine options are applied.
            pub fn severity(self) -> Severity {
                match self {
                    $(DiagId::$name => Severity::$sev,)*
                }
            }

            pub fn component(self) -> Component {
                match self {
                    $(DiagId::$name => Component::$component,)*
                }
            }

            /// Short human-readable title.
            pub fn title(self) -> &'static str {
                match self {
                    $(DiagId::$name => $title,)*
                }
            }

            /// Message template with `%N` placeholders.
            pub fn template(self) -> &'static str {
                match self {
                    $(DiagId::$name => $template,)*
                }
            }
        }
    };
}

diag_ids! {
    // === Lexical ===
    BadHexDigit = "bad_hex_digit", Warning, Lex,
        "invalid hexadecimal digit",
        "An invalid hexadecimal digit '%0' was encountered while lexing the source code shown above.";
    BadBinaryDigit = "bad_binary_digit", Warning, Lex,
        "invalid binary digit",
        "An invalid binary digit '%0' was encountered while lexing the source code shown above.";
    BadEscapeSequence = "bad_escape_sequence", Fatal, Lex,
        "unknown escape sequence",
        "An unknown escape sequence '\\%0' was encountered in a string literal.";
    UnterminatedString = "unterminated_string", Fatal, Lex,
        "unterminated string",
        "A string literal was still open when the end of the %select{file|line}0 was reached.";

    // === Parser (same id space, defined ahead of the parser stage) ===
    ExpectedToken = "expected_token", Error, Parse,
        "expected token",
        "Expected %0 but found %1.";
    BadCallArgument = "bad_call_argument", Error, Parse,
        "bad call argument",
        "The %ordinal0 argument to '%1' is not valid here.";

    // === Driver ===
    CannotOpenFile = "cannot_open_file", Fatal, Driver,
        "cannot open file",
        "%0";
    TooManyErrors = "too_many_errors", Note, Driver,
        "too many errors",
        "%0 error%s0 emitted; giving up.";
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn catalog_metadata() {
        assert_eq!(DiagId::BadHexDigit.name(), "bad_hex_digit");
        assert_eq!(DiagId::BadHexDigit.severity(), Severity::Warning);
        assert_eq!(DiagId::BadHexDigit.component(), Component::Lex);
        assert_eq!(DiagId::UnterminatedString.severity(), Severity::Fatal);
        assert_eq!(DiagId::CannotOpenFile.component(), Component::Driver);
    }

    #[test]
    fn verbatim_template_is_exactly_percent_zero() {
        // CannotOpenFile relies on the verbatim pass-through path.
        assert_eq!(DiagId::CannotOpenFile.template(), "%0");
    }
}
