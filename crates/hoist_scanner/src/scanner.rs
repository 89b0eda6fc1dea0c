//! The scanner converts script text into tokens on demand.

use crate::char_codes::*;
use hoist_ast::syntax_kind::SyntaxKind;
use hoist_ast::types::TokenFlags;
use hoist_core::text::TextSpan;
use hoist_diagnostics::messages;
use hoist_diagnostics::{Diagnostic, DiagnosticCollection, DiagnosticMessage};

/// Saved scanner state for lookahead.
#[derive(Debug, Clone)]
pub struct ScannerState {
    pos: usize,
    token_start: usize,
    token: SyntaxKind,
    token_value: String,
    token_flags: TokenFlags,
    diagnostic_count: usize,
}

pub struct Scanner {
    text: Vec<char>,
    /// Current position (end of the current token).
    pos: usize,
    /// Start of the current token, after leading trivia.
    token_start: usize,
    token: SyntaxKind,
    /// Identifier name, keyword text, literal source text, or the cooked
    /// value of a string/template piece.
    token_value: String,
    token_flags: TokenFlags,
    diagnostics: DiagnosticCollection,
}

impl Scanner {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.chars().collect(),
            pos: 0,
            token_start: 0,
            token: SyntaxKind::Unknown,
            token_value: String::new(),
            token_flags: TokenFlags::NONE,
            diagnostics: DiagnosticCollection::new(),
        }
    }

    /// Skip a `#!` line at the very beginning of the script.
    /// Call this before the first `scan()`.
    pub fn skip_shebang(&mut self) {
        if self.pos == 0 && self.text.len() >= 2 && self.text[0] == '#' && self.text[1] == '!' {
            self.pos = 2;
            while !self.is_eof() && !is_line_break(self.text[self.pos]) {
                self.pos += 1;
            }
        }
    }

    pub fn text_len(&self) -> usize {
        self.text.len()
    }

    /// Run `f`, then put the scanner back exactly where it was. Diagnostics
    /// produced during the lookahead are discarded.
    pub fn look_ahead<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let state = self.save_state();
        let result = f(self);
        self.restore_state(state);
        result
    }

    #[inline]
    pub fn token(&self) -> SyntaxKind {
        self.token
    }

    #[inline]
    pub fn token_value(&self) -> &str {
        &self.token_value
    }

    #[inline]
    pub fn token_start(&self) -> usize {
        self.token_start
    }

    #[inline]
    pub fn token_end(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn token_flags(&self) -> TokenFlags {
        self.token_flags
    }

    #[inline]
    pub fn has_preceding_line_break(&self) -> bool {
        self.token_flags.contains(TokenFlags::PRECEDING_LINE_BREAK)
    }

    pub fn diagnostics(&self) -> &DiagnosticCollection {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> DiagnosticCollection {
        std::mem::take(&mut self.diagnostics)
    }

    pub fn save_state(&self) -> ScannerState {
        ScannerState {
            pos: self.pos,
            token_start: self.token_start,
            token: self.token,
            token_value: self.token_value.clone(),
            token_flags: self.token_flags,
            diagnostic_count: self.diagnostics.len(),
        }
    }

    pub fn restore_state(&mut self, state: ScannerState) {
        self.pos = state.pos;
        self.token_start = state.token_start;
        self.token = state.token;
        self.token_value = state.token_value;
        self.token_flags = state.token_flags;
        if self.diagnostics.len() > state.diagnostic_count {
            let mut kept = DiagnosticCollection::new();
            for d in self.diagnostics.diagnostics()[..state.diagnostic_count].iter() {
                kept.add(d.clone());
            }
            self.diagnostics = kept;
        }
    }

    /// Source text between two character offsets.
    pub fn text_slice(&self, start: usize, end: usize) -> String {
        let s = start.min(self.text.len());
        let e = end.min(self.text.len());
        self.text[s..e].iter().collect()
    }

    // ========================================================================
    // Core scanning
    // ========================================================================

    #[inline]
    fn current_char(&self) -> Option<char> {
        self.text.get(self.pos).copied()
    }

    #[inline]
    fn char_at(&self, offset: usize) -> Option<char> {
        self.text.get(self.pos + offset).copied()
    }

    #[inline]
    fn is_eof(&self) -> bool {
        self.pos >= self.text.len()
    }

    fn error(&mut self, message: &DiagnosticMessage, args: &[&str], start: usize, end: usize) {
        let span = TextSpan::from_bounds(start as u32, end.max(start) as u32);
        let mut diagnostic = Diagnostic::new(message, args);
        diagnostic.span = Some(span);
        self.diagnostics.add(diagnostic);
    }

    /// Skip whitespace and comments, recording whether a line break was seen.
    fn skip_trivia(&mut self) {
        loop {
            let Some(ch) = self.current_char() else {
                return;
            };
            match ch {
                '\r' => {
                    self.token_flags |= TokenFlags::PRECEDING_LINE_BREAK;
                    self.pos += 1;
                    if self.current_char() == Some('\n') {
                        self.pos += 1;
                    }
                }
                '\n' | '\u{2028}' | '\u{2029}' => {
                    self.token_flags |= TokenFlags::PRECEDING_LINE_BREAK;
                    self.pos += 1;
                }
                '/' if self.char_at(1) == Some('/') => {
                    self.pos += 2;
                    while !self.is_eof() && !is_line_break(self.text[self.pos]) {
                        self.pos += 1;
                    }
                }
                '/' if self.char_at(1) == Some('*') => {
                    let start = self.pos;
                    self.pos += 2;
                    let mut closed = false;
                    while !self.is_eof() {
                        if self.text[self.pos] == '*' && self.char_at(1) == Some('/') {
                            self.pos += 2;
                            closed = true;
                            break;
                        }
                        if is_line_break(self.text[self.pos]) {
                            self.token_flags |= TokenFlags::PRECEDING_LINE_BREAK;
                        }
                        self.pos += 1;
                    }
                    if !closed {
                        self.error(&messages::ASTERISK_SLASH_EXPECTED, &[], start, self.pos);
                    }
                }
                c if is_white_space_single_line(c) => {
                    self.pos += 1;
                }
                _ => return,
            }
        }
    }

    /// Scan the next token and return its kind.
    pub fn scan(&mut self) -> SyntaxKind {
        self.token_flags = TokenFlags::NONE;
        self.token_value.clear();

        self.skip_trivia();
        self.token_start = self.pos;

        let Some(ch) = self.current_char() else {
            self.token = SyntaxKind::EndOfFileToken;
            return self.token;
        };

        self.token = match ch {
            '(' => self.single(SyntaxKind::OpenParenToken),
            ')' => self.single(SyntaxKind::CloseParenToken),
            '{' => self.single(SyntaxKind::OpenBraceToken),
            '}' => self.single(SyntaxKind::CloseBraceToken),
            '[' => self.single(SyntaxKind::OpenBracketToken),
            ']' => self.single(SyntaxKind::CloseBracketToken),
            ';' => self.single(SyntaxKind::SemicolonToken),
            ',' => self.single(SyntaxKind::CommaToken),
            '~' => self.single(SyntaxKind::TildeToken),
            ':' => self.single(SyntaxKind::ColonToken),
            '@' => self.single(SyntaxKind::AtToken),
            '#' => self.single(SyntaxKind::HashToken),

            '.' => self.scan_dot(),
            '?' => self.scan_question(),
            '<' => self.scan_less_than(),
            '>' => self.scan_greater_than(),
            '=' => self.scan_equals(),
            '!' => self.scan_exclamation(),
            '+' => self.scan_doubling('+', SyntaxKind::PlusToken, SyntaxKind::PlusPlusToken, SyntaxKind::PlusEqualsToken),
            '-' => self.scan_doubling('-', SyntaxKind::MinusToken, SyntaxKind::MinusMinusToken, SyntaxKind::MinusEqualsToken),
            '*' => self.scan_asterisk(),
            '/' => self.scan_with_equals(SyntaxKind::SlashToken, SyntaxKind::SlashEqualsToken),
            '%' => self.scan_with_equals(SyntaxKind::PercentToken, SyntaxKind::PercentEqualsToken),
            '^' => self.scan_with_equals(SyntaxKind::CaretToken, SyntaxKind::CaretEqualsToken),
            '&' => self.scan_logical('&', SyntaxKind::AmpersandToken, SyntaxKind::AmpersandEqualsToken, SyntaxKind::AmpersandAmpersandToken, SyntaxKind::AmpersandAmpersandEqualsToken),
            '|' => self.scan_logical('|', SyntaxKind::BarToken, SyntaxKind::BarEqualsToken, SyntaxKind::BarBarToken, SyntaxKind::BarBarEqualsToken),

            '\'' | '"' => self.scan_string_literal(ch),
            '`' => {
                self.pos += 1;
                self.scan_template_piece(SyntaxKind::NoSubstitutionTemplateLiteral, SyntaxKind::TemplateHead)
            }

            '0'..='9' => self.scan_number(),

            _ if is_identifier_start(ch) => self.scan_identifier(),

            _ => {
                self.pos += 1;
                self.error(&messages::INVALID_CHARACTER, &[], self.token_start, self.pos);
                SyntaxKind::Unknown
            }
        };

        self.token
    }

    // ========================================================================
    // Punctuation
    // ========================================================================

    #[inline]
    fn single(&mut self, kind: SyntaxKind) -> SyntaxKind {
        self.pos += 1;
        kind
    }

    /// `x`, `x=`
    fn scan_with_equals(&mut self, plain: SyntaxKind, with_equals: SyntaxKind) -> SyntaxKind {
        if self.char_at(1) == Some('=') {
            self.pos += 2;
            with_equals
        } else {
            self.pos += 1;
            plain
        }
    }

    /// `x`, `xx`, `x=`
    fn scan_doubling(&mut self, ch: char, plain: SyntaxKind, doubled: SyntaxKind, with_equals: SyntaxKind) -> SyntaxKind {
        if self.char_at(1) == Some(ch) {
            self.pos += 2;
            doubled
        } else {
            self.scan_with_equals(plain, with_equals)
        }
    }

    /// `x`, `x=`, `xx`, `xx=`
    fn scan_logical(
        &mut self,
        ch: char,
        plain: SyntaxKind,
        with_equals: SyntaxKind,
        doubled: SyntaxKind,
        doubled_equals: SyntaxKind,
    ) -> SyntaxKind {
        if self.char_at(1) == Some(ch) {
            if self.char_at(2) == Some('=') {
                self.pos += 3;
                doubled_equals
            } else {
                self.pos += 2;
                doubled
            }
        } else {
            self.scan_with_equals(plain, with_equals)
        }
    }

    fn scan_dot(&mut self) -> SyntaxKind {
        if self.char_at(1) == Some('.') && self.char_at(2) == Some('.') {
            self.pos += 3;
            SyntaxKind::DotDotDotToken
        } else if self.char_at(1).is_some_and(is_digit) {
            self.scan_number()
        } else {
            self.pos += 1;
            SyntaxKind::DotToken
        }
    }

    fn scan_question(&mut self) -> SyntaxKind {
        if self.char_at(1) == Some('?') {
            if self.char_at(2) == Some('=') {
                self.pos += 3;
                SyntaxKind::QuestionQuestionEqualsToken
            } else {
                self.pos += 2;
                SyntaxKind::QuestionQuestionToken
            }
        } else if self.char_at(1) == Some('.') && !self.char_at(2).is_some_and(is_digit) {
            // `a?.5:b` is a conditional, not optional chaining.
            self.pos += 2;
            SyntaxKind::QuestionDotToken
        } else {
            self.pos += 1;
            SyntaxKind::QuestionToken
        }
    }

    fn scan_less_than(&mut self) -> SyntaxKind {
        if self.char_at(1) == Some('<') {
            if self.char_at(2) == Some('=') {
                self.pos += 3;
                SyntaxKind::LessThanLessThanEqualsToken
            } else {
                self.pos += 2;
                SyntaxKind::LessThanLessThanToken
            }
        } else {
            self.scan_with_equals(SyntaxKind::LessThanToken, SyntaxKind::LessThanEqualsToken)
        }
    }

    fn scan_greater_than(&mut self) -> SyntaxKind {
        match (self.char_at(1), self.char_at(2), self.char_at(3)) {
            (Some('>'), Some('>'), Some('=')) => {
                self.pos += 4;
                SyntaxKind::GreaterThanGreaterThanGreaterThanEqualsToken
            }
            (Some('>'), Some('>'), _) => {
                self.pos += 3;
                SyntaxKind::GreaterThanGreaterThanGreaterThanToken
            }
            (Some('>'), Some('='), _) => {
                self.pos += 3;
                SyntaxKind::GreaterThanGreaterThanEqualsToken
            }
            (Some('>'), _, _) => {
                self.pos += 2;
                SyntaxKind::GreaterThanGreaterThanToken
            }
            _ => self.scan_with_equals(SyntaxKind::GreaterThanToken, SyntaxKind::GreaterThanEqualsToken),
        }
    }

    fn scan_equals(&mut self) -> SyntaxKind {
        match (self.char_at(1), self.char_at(2)) {
            (Some('='), Some('=')) => {
                self.pos += 3;
                SyntaxKind::EqualsEqualsEqualsToken
            }
            (Some('='), _) => {
                self.pos += 2;
                SyntaxKind::EqualsEqualsToken
            }
            (Some('>'), _) => {
                self.pos += 2;
                SyntaxKind::EqualsGreaterThanToken
            }
            _ => {
                self.pos += 1;
                SyntaxKind::EqualsToken
            }
        }
    }

    fn scan_exclamation(&mut self) -> SyntaxKind {
        if self.char_at(1) == Some('=') {
            if self.char_at(2) == Some('=') {
                self.pos += 3;
                SyntaxKind::ExclamationEqualsEqualsToken
            } else {
                self.pos += 2;
                SyntaxKind::ExclamationEqualsToken
            }
        } else {
            self.pos += 1;
            SyntaxKind::ExclamationToken
        }
    }

    fn scan_asterisk(&mut self) -> SyntaxKind {
        if self.char_at(1) == Some('*') {
            if self.char_at(2) == Some('=') {
                self.pos += 3;
                SyntaxKind::AsteriskAsteriskEqualsToken
            } else {
                self.pos += 2;
                SyntaxKind::AsteriskAsteriskToken
            }
        } else {
            self.scan_with_equals(SyntaxKind::AsteriskToken, SyntaxKind::AsteriskEqualsToken)
        }
    }

    // ========================================================================
    // Strings and templates
    // ========================================================================

    fn scan_string_literal(&mut self, quote: char) -> SyntaxKind {
        if quote == '\'' {
            self.token_flags |= TokenFlags::SINGLE_QUOTE;
        }
        self.pos += 1;
        let mut result = String::new();
        loop {
            let Some(ch) = self.current_char() else {
                self.error(&messages::UNTERMINATED_STRING_LITERAL, &[], self.token_start, self.pos);
                self.token_flags |= TokenFlags::UNTERMINATED;
                break;
            };
            if ch == quote {
                self.pos += 1;
                break;
            }
            if ch == '\\' {
                self.scan_escape_sequence(&mut result);
                continue;
            }
            if is_line_break(ch) {
                self.error(&messages::UNTERMINATED_STRING_LITERAL, &[], self.token_start, self.pos);
                self.token_flags |= TokenFlags::UNTERMINATED;
                break;
            }
            result.push(ch);
            self.pos += 1;
        }
        self.token_value = result;
        SyntaxKind::StringLiteral
    }

    /// Scan template text up to the closing backtick (`end_kind`) or the next
    /// `${` (`substitution_kind`). The opening delimiter is already consumed.
    fn scan_template_piece(&mut self, end_kind: SyntaxKind, substitution_kind: SyntaxKind) -> SyntaxKind {
        let mut result = String::new();
        let kind = loop {
            let Some(ch) = self.current_char() else {
                self.error(&messages::UNTERMINATED_TEMPLATE_LITERAL, &[], self.token_start, self.pos);
                self.token_flags |= TokenFlags::UNTERMINATED;
                break end_kind;
            };
            match ch {
                '`' => {
                    self.pos += 1;
                    break end_kind;
                }
                '$' if self.char_at(1) == Some('{') => {
                    self.pos += 2;
                    break substitution_kind;
                }
                '\\' => self.scan_escape_sequence(&mut result),
                '\r' => {
                    // Template text normalizes CRLF and lone CR to LF.
                    self.pos += 1;
                    if self.current_char() == Some('\n') {
                        self.pos += 1;
                    }
                    result.push('\n');
                }
                _ => {
                    result.push(ch);
                    self.pos += 1;
                }
            }
        };
        self.token_value = result;
        kind
    }

    /// Continue a template after the `}` that closes a substitution. The
    /// parser calls this while `}` is the current token.
    pub fn rescan_template_token(&mut self) -> SyntaxKind {
        self.token_start = self.pos.saturating_sub(1);
        self.token_flags = TokenFlags::NONE;
        self.token = self.scan_template_piece(SyntaxKind::TemplateTail, SyntaxKind::TemplateMiddle);
        self.token
    }

    /// Cook one escape sequence starting at the backslash.
    fn scan_escape_sequence(&mut self, out: &mut String) {
        let start = self.pos;
        self.pos += 1;
        let Some(ch) = self.current_char() else {
            return;
        };
        self.pos += 1;
        match ch {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'b' => out.push('\u{0008}'),
            'f' => out.push('\u{000C}'),
            'v' => out.push('\u{000B}'),
            '0' if !self.current_char().is_some_and(is_digit) => out.push('\0'),
            '1'..='9' | '0' => {
                self.token_flags |= TokenFlags::CONTAINS_INVALID_ESCAPE;
                self.error(&messages::INVALID_ESCAPE_SEQUENCE, &[], start, self.pos);
                out.push(ch);
            }
            'x' => match self.scan_hex_value(2) {
                Some(c) => out.push(c),
                None => self.invalid_hex_escape(start),
            },
            'u' => {
                let cooked = if self.current_char() == Some('{') {
                    self.scan_extended_unicode_escape()
                } else {
                    self.scan_hex_value(4)
                };
                match cooked {
                    Some(c) => out.push(c),
                    None => self.invalid_hex_escape(start),
                }
            }
            '\r' => {
                // Line continuation.
                if self.current_char() == Some('\n') {
                    self.pos += 1;
                }
            }
            '\n' | '\u{2028}' | '\u{2029}' => {}
            other => out.push(other),
        }
    }

    fn invalid_hex_escape(&mut self, start: usize) {
        self.token_flags |= TokenFlags::CONTAINS_INVALID_ESCAPE;
        self.error(&messages::HEXADECIMAL_DIGIT_EXPECTED, &[], start, self.pos);
    }

    fn scan_hex_value(&mut self, count: usize) -> Option<char> {
        let mut value = 0u32;
        for _ in 0..count {
            let digit = self.current_char().and_then(|c| c.to_digit(16))?;
            value = value * 16 + digit;
            self.pos += 1;
        }
        char::from_u32(value)
    }

    /// `\u{1F600}`; the `u` is consumed and the current char is `{`.
    fn scan_extended_unicode_escape(&mut self) -> Option<char> {
        self.pos += 1;
        let mut value = 0u32;
        let mut digits = 0;
        while let Some(digit) = self.current_char().and_then(|c| c.to_digit(16)) {
            value = value.checked_mul(16)?.checked_add(digit)?;
            digits += 1;
            self.pos += 1;
        }
        if digits == 0 || self.current_char() != Some('}') {
            return None;
        }
        self.pos += 1;
        char::from_u32(value)
    }

    // ========================================================================
    // Numbers and identifiers
    // ========================================================================

    fn scan_number(&mut self) -> SyntaxKind {
        let start = self.pos;

        if self.text[self.pos] == '0' {
            let prefixed = match self.char_at(1) {
                Some('x') | Some('X') => Some((TokenFlags::HEX_SPECIFIER, 16)),
                Some('b') | Some('B') => Some((TokenFlags::BINARY_SPECIFIER, 2)),
                Some('o') | Some('O') => Some((TokenFlags::OCTAL_SPECIFIER, 8)),
                _ => None,
            };
            if let Some((flag, radix)) = prefixed {
                self.pos += 2;
                self.token_flags |= flag;
                let digits = self.scan_digits(radix);
                if digits == 0 {
                    let message = if radix == 16 {
                        &messages::HEXADECIMAL_DIGIT_EXPECTED
                    } else {
                        &messages::DIGIT_EXPECTED
                    };
                    self.error(message, &[], start, self.pos);
                }
                return self.finish_number(start);
            }
        }

        self.scan_digits(10);
        if self.current_char() == Some('.') {
            self.pos += 1;
            self.scan_digits(10);
        }

        if let Some('e') | Some('E') = self.current_char() {
            self.pos += 1;
            self.token_flags |= TokenFlags::SCIENTIFIC;
            if let Some('+') | Some('-') = self.current_char() {
                self.pos += 1;
            }
            if self.scan_digits(10) == 0 {
                self.error(&messages::DIGIT_EXPECTED, &[], start, self.pos);
            }
        }

        self.finish_number(start)
    }

    fn finish_number(&mut self, start: usize) -> SyntaxKind {
        if self.current_char() == Some('n') {
            self.pos += 1;
            self.error(&messages::_0_IS_NOT_SUPPORTED, &["BigInt literal"], start, self.pos);
        } else if self.current_char().is_some_and(is_identifier_start) {
            // `3in x` and `1abc` are both errors; the identifier must be separated.
            self.error(&messages::INVALID_CHARACTER, &[], self.pos, self.pos + 1);
        }
        self.token_value = self.text_slice(start, self.pos);
        SyntaxKind::NumericLiteral
    }

    /// Consume digits of the given radix and `_` separators, returning the
    /// number of digits seen.
    fn scan_digits(&mut self, radix: u32) -> usize {
        let mut count = 0;
        while let Some(ch) = self.current_char() {
            if ch == '_' {
                self.token_flags |= TokenFlags::CONTAINS_SEPARATOR;
            } else if ch.is_digit(radix) {
                count += 1;
            } else {
                break;
            }
            self.pos += 1;
        }
        count
    }

    fn scan_identifier(&mut self) -> SyntaxKind {
        let start = self.pos;
        self.pos += 1;
        while !self.is_eof() && is_identifier_part(self.text[self.pos]) {
            self.pos += 1;
        }
        let text = self.text_slice(start, self.pos);
        let kind = SyntaxKind::from_keyword(&text).unwrap_or(SyntaxKind::Identifier);
        self.token_value = text;
        kind
    }
}
