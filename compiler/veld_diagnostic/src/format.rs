//! Message template formatting.
//!
//! Templates contain `%N` placeholders (argument index 0-9) with optional
//! modifiers:
//!
//! - `%select{a|b|c}N` — picks the branch indexed by argument N, then
//!   formats the branch recursively
//! - `%sN` — a literal `s` when argument N is not 1 (pluralization)
//! - `%ordinalN` — argument N as an English ordinal (1st, 2nd, 3rd, ...)
//! - `%%` — a literal percent sign
//!
//! A template that is exactly `%0` with a string argument bypasses all
//! substitution and copies the argument verbatim, minus non-printable
//! characters. Drivers use this to pass raw OS error text through.

use veld_basic::TokenKind;

/// Upper bound on positional arguments per diagnostic.
pub const MAX_ARGUMENTS: usize = 10;

/// One positional argument of an in-flight diagnostic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiagArg {
    Str(String),
    Int(i64),
    Uint(u64),
    Token(TokenKind),
}

impl DiagArg {
    fn render(&self) -> String {
        match self {
            DiagArg::Str(s) => s.clone(),
            DiagArg::Int(i) => i.to_string(),
            DiagArg::Uint(u) => u.to_string(),
            DiagArg::Token(kind) => kind.describe(),
        }
    }

    /// Integer view, used by `%s`, `%select`, and `%ordinal`.
    fn numeric(&self) -> i64 {
        match self {
            DiagArg::Int(i) => *i,
            DiagArg::Uint(u) => i64::try_from(*u).unwrap_or(i64::MAX),
            DiagArg::Str(_) | DiagArg::Token(_) => {
                debug_assert!(false, "modifier applied to non-integer argument");
                0
            }
        }
    }
}

fn rendered(args: &[DiagArg], idx: usize) -> String {
    debug_assert!(idx < args.len(), "argument %{idx} was never supplied");
    args.get(idx).map(DiagArg::render).unwrap_or_default()
}

fn numeric(args: &[DiagArg], idx: usize) -> i64 {
    debug_assert!(idx < args.len(), "argument %{idx} was never supplied");
    args.get(idx).map_or(0, DiagArg::numeric)
}

fn ordinal(n: i64) -> String {
    let suffix = match (n % 100, n % 10) {
        (11..=13, _) => "th",
        (_, 1) => "st",
        (_, 2) => "nd",
        (_, 3) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

/// Substitute `args` into `template`.
pub fn format_message(template: &str, args: &[DiagArg]) -> String {
    // Verbatim pass-through for the exact template "%0".
    if template == "%0" {
        if let Some(DiagArg::Str(s)) = args.first() {
            return s.chars().filter(|c| !c.is_control()).collect();
        }
    }

    let chars: Vec<char> = template.chars().collect();
    let mut out = String::with_capacity(template.len());
    let mut i = 0;

    while i < chars.len() {
        if chars[i] != '%' {
            out.push(chars[i]);
            i += 1;
            continue;
        }
        i += 1;
        let Some(&next) = chars.get(i) else {
            out.push('%');
            break;
        };

        if next == '%' {
            out.push('%');
            i += 1;
        } else if next.is_ascii_digit() {
            let idx = (next as u8 - b'0') as usize;
            out.push_str(&rendered(args, idx));
            i += 1;
        } else if starts_with(&chars, i, "select{") {
            i += "select{".len();
            let (branches, after) = parse_select_branches(&chars, i);
            i = after;
            let Some(&digit) = chars.get(i).filter(|c| c.is_ascii_digit()) else {
                debug_assert!(false, "%select not followed by an argument index");
                continue;
            };
            i += 1;
            let idx = (digit as u8 - b'0') as usize;
            let choice = usize::try_from(numeric(args, idx)).unwrap_or(0);
            debug_assert!(choice < branches.len(), "%select index out of range");
            if let Some(branch) = branches.get(choice) {
                out.push_str(&format_message(branch, args));
            }
        } else if next == 's' && chars.get(i + 1).is_some_and(|c| c.is_ascii_digit()) {
            let idx = (chars[i + 1] as u8 - b'0') as usize;
            if numeric(args, idx) != 1 {
                out.push('s');
            }
            i += 2;
        } else if starts_with(&chars, i, "ordinal")
            && chars.get(i + "ordinal".len()).is_some_and(|c| c.is_ascii_digit())
        {
            i += "ordinal".len();
            let idx = (chars[i] as u8 - b'0') as usize;
            out.push_str(&ordinal(numeric(args, idx)));
            i += 1;
        } else {
            // Unknown modifier; keep the percent so the defect is visible.
            out.push('%');
        }
    }

    out
}

fn starts_with(chars: &[char], at: usize, needle: &str) -> bool {
    let mut i = at;
    for nc in needle.chars() {
        if chars.get(i) != Some(&nc) {
            return false;
        }
        i += 1;
    }
    true
}

/// Split the body of a `%select{...}` into top-level `|` branches.
///
/// Returns the branches and the index just past the closing brace.
fn parse_select_branches(chars: &[char], mut i: usize) -> (Vec<String>, usize) {
    let mut branches = Vec::new();
    let mut current = String::new();
    let mut depth = 1u32;

    while i < chars.len() {
        match chars[i] {
            '{' => {
                depth += 1;
                current.push('{');
            }
            '}' => {
                depth -= 1;
                if depth == 0 {
                    i += 1;
                    break;
                }
                current.push('}');
            }
            '|' if depth == 1 => {
                branches.push(std::mem::take(&mut current));
            }
            c => current.push(c),
        }
        i += 1;
    }
    branches.push(current);
    (branches, i)
}
