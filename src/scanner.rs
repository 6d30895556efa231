use crate::diagnostics::Diagnostics;
use crate::token::{LiteralValue, Token, TokenType};

/// Single-pass scanner, converting source text into a token stream.
///
/// Lexical errors are recorded in the [`Diagnostics`] collector and the
/// offending input is skipped; scanning always runs to the end of the
/// source and always terminates the stream with one `Eof` token.
pub struct Scanner<'a> {
    diagnostics: &'a mut Diagnostics,
    source: &'a str,
    bytes: &'a [u8],
    line: usize,
    start: usize,
    current: usize,
    tokens: Vec<Token>,
}

impl<'a> Scanner<'a> {
    pub fn new(diagnostics: &'a mut Diagnostics, source: &'a str) -> Scanner<'a> {
        Scanner {
            diagnostics,
            source,
            bytes: source.as_bytes(),
            line: 1,
            start: 0,
            current: 0,
            tokens: Vec::new(),
        }
    }

    pub fn scan_tokens(mut self) -> Vec<Token> {
        while !self.is_at_end() {
            self.scan_token();
            self.start = self.current;
        }

        self.add_token(TokenType::Eof);

        self.tokens
    }

    fn scan_token(&mut self) {
        let character = self.advance();

        match character {
            '(' => self.add_token(TokenType::LeftParen),
            ')' => self.add_token(TokenType::RightParen),
            '{' => self.add_token(TokenType::LeftBrace),
            '}' => self.add_token(TokenType::RightBrace),
            '.' => self.add_token(TokenType::Dot),
            ',' => self.add_token(TokenType::Comma),
            ';' => self.add_token(TokenType::Semicolon),
            '+' => self.add_token(TokenType::Plus),
            '-' => self.add_token(TokenType::Minus),
            '*' => self.add_token(TokenType::Star),
            '/' => {
                if self.match_char('/') {
                    // A comment runs to the end of the line.
                    while !self.is_at_end() && self.peek() != '\n' {
                        self.advance();
                    }
                } else {
                    self.add_token(TokenType::Slash)
                }
            }
            '!' => {
                let token_type = match self.match_char('=') {
                    true => TokenType::BangEqual,
                    false => TokenType::Bang,
                };
                self.add_token(token_type)
            }
            '=' => {
                let token_type = match self.match_char('=') {
                    true => TokenType::EqualEqual,
                    false => TokenType::Equal,
                };
                self.add_token(token_type)
            }
            '<' => {
                let token_type = match self.match_char('=') {
                    true => TokenType::LessEqual,
                    false => TokenType::Less,
                };
                self.add_token(token_type)
            }
            '>' => {
                let token_type = match self.match_char('=') {
                    true => TokenType::GreaterEqual,
                    false => TokenType::Greater,
                };
                self.add_token(token_type)
            }
            '"' => self.string(),
            ' ' | '\t' | '\r' => {}
            '\n' => {
                self.line += 1;
            }
            _ => {
                if is_digit(character) {
                    self.number();
                } else if is_alpha(character) {
                    self.identifier();
                } else {
                    self.diagnostics
                        .scanner_error(self.line, "Unexpected character.");
                }
            }
        }
    }

    fn string(&mut self) {
        loop {
            if self.is_at_end() {
                break;
            }

            match self.peek() {
                '\n' => {
                    self.line += 1;
                }
                '"' => {
                    break;
                }
                _ => {}
            }

            self.advance();
        }

        if !self.match_char('"') {
            self.diagnostics
                .scanner_error(self.line, "Unterminated string.");
            return;
        }

        let lexeme = self.lexeme();
        let value = lexeme[1..(lexeme.len() - 1)].to_string();
        self.add_full_token(TokenType::String, Some(LiteralValue::String(value)));
    }

    fn number(&mut self) {
        while !self.is_at_end() && is_digit(self.peek()) {
            self.advance();
        }

        // The dot belongs to the number only when a digit follows it.
        if !self.is_at_end() && self.peek() == '.' && is_digit(self.peek_next()) {
            self.advance();

            while !self.is_at_end() && is_digit(self.peek()) {
                self.advance();
            }
        }

        match self.lexeme().parse::<f64>() {
            Ok(value) => self.add_full_token(TokenType::Number, Some(LiteralValue::Number(value))),
            Err(_) => self
                .diagnostics
                .scanner_error(self.line, "Invalid number literal."),
        }
    }

    fn identifier(&mut self) {
        while !self.is_at_end() && is_alpha_numeric(self.peek()) {
            self.advance();
        }

        let type_ = resolve_keyword_type(self.lexeme()).unwrap_or(TokenType::Identifier);
        self.add_token(type_)
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn peek(&self) -> char {
        self.bytes[self.current] as char
    }

    fn peek_next(&self) -> char {
        match self.bytes.get(self.current + 1) {
            Some(byte) => *byte as char,
            None => '\0',
        }
    }

    fn advance(&mut self) -> char {
        let current = self.peek();
        self.current += 1;
        current
    }

    fn match_char(&mut self, character: char) -> bool {
        if !self.is_at_end() && self.peek() == character {
            self.advance();
            return true;
        }

        false
    }

    fn add_token(&mut self, token_type: TokenType) {
        self.add_full_token(token_type, Option::None)
    }

    fn add_full_token(&mut self, token_type: TokenType, literal: Option<LiteralValue>) {
        self.tokens.push(Token {
            token_type,
            line: self.line,
            literal,
            lexeme: self.lexeme().to_string(),
        })
    }

    fn lexeme(&self) -> &'a str {
        &self.source[self.start..self.current]
    }
}

fn is_digit(character: char) -> bool {
    character.is_ascii_digit()
}

fn is_alpha(character: char) -> bool {
    character.is_ascii_alphabetic() || character == '_'
}

fn is_alpha_numeric(character: char) -> bool {
    is_digit(character) || is_alpha(character)
}

fn resolve_keyword_type(lexeme: &str) -> Option<TokenType> {
    match lexeme {
        "var" => Some(TokenType::Var),
        "fun" => Some(TokenType::Fun),
        "class" => Some(TokenType::Class),
        "this" => Some(TokenType::This),
        "super" => Some(TokenType::Super),
        "if" => Some(TokenType::If),
        "else" => Some(TokenType::Else),
        "for" => Some(TokenType::For),
        "while" => Some(TokenType::While),
        "return" => Some(TokenType::Return),
        "print" => Some(TokenType::Print),
        "and" => Some(TokenType::And),
        "or" => Some(TokenType::Or),
        "true" => Some(TokenType::True),
        "false" => Some(TokenType::False),
        "nil" => Some(TokenType::Nil),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn scan(source: &str) -> (Vec<Token>, Diagnostics) {
        let mut diagnostics = Diagnostics::new();
        let tokens = Scanner::new(&mut diagnostics, source).scan_tokens();
        (tokens, diagnostics)
    }

    fn token_types(source: &str) -> Vec<TokenType> {
        scan(source).0.iter().map(|t| t.token_type).collect()
    }

    #[test]
    fn empty_source_yields_only_eof() {
        let (tokens, diagnostics) = scan("");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].token_type, TokenType::Eof);
        assert_eq!(tokens[0].line, 1);
        assert!(!diagnostics.had_error());
    }

    #[test]
    fn maximal_munch_for_two_character_operators() {
        use TokenType::*;
        assert_eq!(
            token_types("! != = == < <= > >="),
            vec![
                Bang, BangEqual, Equal, EqualEqual, Less, LessEqual, Greater, GreaterEqual, Eof
            ]
        );
    }

    #[test]
    fn line_comment_produces_no_tokens() {
        use TokenType::*;
        assert_eq!(token_types("// nothing here\n1 / 2"), vec![
            Number, Slash, Number, Eof
        ]);
    }

    #[test]
    fn number_literal_keeps_fractional_part() {
        let (tokens, _) = scan("12.5");
        assert_eq!(tokens[0].literal, Some(LiteralValue::Number(12.5)));
    }

    #[test]
    fn trailing_dot_is_not_part_of_the_number() {
        use TokenType::*;
        let (tokens, _) = scan("12.");
        assert_eq!(
            tokens.iter().map(|t| t.token_type).collect::<Vec<_>>(),
            vec![Number, Dot, Eof]
        );
        assert_eq!(tokens[0].literal, Some(LiteralValue::Number(12.0)));
    }

    #[test]
    fn string_literal_drops_the_quotes() {
        let (tokens, _) = scan("\"hello\"");
        assert_eq!(
            tokens[0].literal,
            Some(LiteralValue::String("hello".to_string()))
        );
        assert_eq!(tokens[0].lexeme, "\"hello\"");
    }

    #[test]
    fn multiline_string_counts_lines() {
        let (tokens, diagnostics) = scan("\"a\nb\"");
        assert!(!diagnostics.had_error());
        assert_eq!(tokens[0].line, 2);
    }

    #[test]
    fn unterminated_string_reports_and_continues() {
        let (tokens, diagnostics) = scan("\"oops");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics.iter().next().map(|d| d.to_string()),
            Some("[line 1] Error: Unterminated string.".to_string())
        );
        // Partial token discarded, stream still ends with Eof.
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].token_type, TokenType::Eof);
    }

    #[test]
    fn keywords_are_not_identifiers() {
        use TokenType::*;
        assert_eq!(token_types("var x = nil;"), vec![
            Var, Identifier, Equal, Nil, Semicolon, Eof
        ]);
    }

    #[test]
    fn identifier_may_start_with_underscore() {
        let (tokens, _) = scan("_private");
        assert_eq!(tokens[0].token_type, TokenType::Identifier);
        assert_eq!(tokens[0].lexeme, "_private");
    }

    #[test]
    fn unexpected_characters_accumulate_without_aborting() {
        let (tokens, diagnostics) = scan("@ 1 #");
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(
            tokens.iter().map(|t| t.token_type).collect::<Vec<_>>(),
            vec![TokenType::Number, TokenType::Eof]
        );
    }

    #[test]
    fn eof_carries_the_final_line_number() {
        let (tokens, _) = scan("1\n2\n3\n");
        assert_eq!(tokens.last().map(|t| t.line), Some(4));
    }
}
