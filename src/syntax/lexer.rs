use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Ident(String),
    StringLit(String),
    IntLit(i64),
    FloatLit(f64),
    BoolLit(bool),
    Equals,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Comma,
    Eof,
}

/// A token tagged with the 1-based position where it starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub line: usize,
    pub column: usize,
}

pub fn tokenize(source: &str) -> Result<Vec<Spanned>, ConfigError> {
    Lexer::new(source).run()
}

struct Lexer {
    chars: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    fn run(mut self) -> Result<Vec<Spanned>, ConfigError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia();
            let line = self.line;
            let column = self.column;
            let Some(c) = self.peek() else {
                tokens.push(Spanned {
                    token: Token::Eof,
                    line,
                    column,
                });
                return Ok(tokens);
            };
            let token = match c {
                '=' => {
                    self.advance();
                    Token::Equals
                }
                '{' => {
                    self.advance();
                    Token::LeftBrace
                }
                '}' => {
                    self.advance();
                    Token::RightBrace
                }
                '[' => {
                    self.advance();
                    Token::LeftBracket
                }
                ']' => {
                    self.advance();
                    Token::RightBracket
                }
                ',' => {
                    self.advance();
                    Token::Comma
                }
                '"' => self.string(line, column)?,
                c if c.is_ascii_digit() || c == '-' => self.number(line, column)?,
                c if c.is_alphabetic() || c == '_' => self.ident(),
                other => {
                    return Err(ConfigError::Parse {
                        line,
                        column,
                        message: format!("unexpected character '{other}'"),
                    });
                }
            };
            tokens.push(Spanned {
                token,
                line,
                column,
            });
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.position).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.position + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.position += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Skips whitespace and `#` / `//` comments.
    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some('#') => self.skip_line(),
                Some('/') if self.peek_at(1) == Some('/') => self.skip_line(),
                _ => return,
            }
        }
    }

    fn skip_line(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                return;
            }
            self.advance();
        }
    }

    fn string(&mut self, line: usize, column: usize) -> Result<Token, ConfigError> {
        let unterminated = |message: &str| ConfigError::Parse {
            line,
            column,
            message: message.to_string(),
        };

        self.advance(); // opening quote
        let mut value = String::new();
        loop {
            match self.advance() {
                None | Some('\n') => return Err(unterminated("unterminated string literal")),
                Some('"') => return Ok(Token::StringLit(value)),
                Some('\\') => {
                    let escaped = self
                        .advance()
                        .ok_or_else(|| unterminated("unterminated string literal"))?;
                    match escaped {
                        '"' => value.push('"'),
                        '\\' => value.push('\\'),
                        'n' => value.push('\n'),
                        't' => value.push('\t'),
                        other => {
                            return Err(ConfigError::Parse {
                                line,
                                column,
                                message: format!("unsupported escape sequence '\\{other}'"),
                            });
                        }
                    }
                }
                Some(c) => value.push(c),
            }
        }
    }

    fn number(&mut self, line: usize, column: usize) -> Result<Token, ConfigError> {
        let mut text = String::new();
        if self.peek() == Some('-') {
            text.push('-');
            self.advance();
        }
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() || c == '.' {
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }
        let token = if text.contains('.') {
            text.parse::<f64>().map(Token::FloatLit).ok()
        } else {
            text.parse::<i64>().map(Token::IntLit).ok()
        };
        token.ok_or_else(|| ConfigError::Parse {
            line,
            column,
            message: format!("invalid number literal \"{text}\""),
        })
    }

    fn ident(&mut self) -> Token {
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' || c == '-' {
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }
        match text.as_str() {
            "true" => Token::BoolLit(true),
            "false" => Token::BoolLit(false),
            _ => Token::Ident(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(source: &str) -> Vec<Token> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|spanned| spanned.token)
            .collect()
    }

    #[test]
    fn test_tokenize_attribute() {
        assert_eq!(
            tokens("bucket = \"my-state\""),
            vec![
                Token::Ident("bucket".to_string()),
                Token::Equals,
                Token::StringLit("my-state".to_string()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_tokenize_labeled_block() {
        assert_eq!(
            tokens("backend \"gcs\" {\n}\n"),
            vec![
                Token::Ident("backend".to_string()),
                Token::StringLit("gcs".to_string()),
                Token::LeftBrace,
                Token::RightBrace,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_tokenize_numbers_and_bools() {
        assert_eq!(
            tokens("count = 3\nratio = 0.5\nenabled = true\noffset = -2"),
            vec![
                Token::Ident("count".to_string()),
                Token::Equals,
                Token::IntLit(3),
                Token::Ident("ratio".to_string()),
                Token::Equals,
                Token::FloatLit(0.5),
                Token::Ident("enabled".to_string()),
                Token::Equals,
                Token::BoolLit(true),
                Token::Ident("offset".to_string()),
                Token::Equals,
                Token::IntLit(-2),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_tokenize_skips_hash_and_slash_comments() {
        let source = "# heading\nbucket = \"b\" // trailing\n// full line\n";
        assert_eq!(
            tokens(source),
            vec![
                Token::Ident("bucket".to_string()),
                Token::Equals,
                Token::StringLit("b".to_string()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_tokenize_string_escapes() {
        assert_eq!(
            tokens(r#"x = "a\"b\\c\nd""#),
            vec![
                Token::Ident("x".to_string()),
                Token::Equals,
                Token::StringLit("a\"b\\c\nd".to_string()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_tokenize_positions() {
        let spanned = tokenize("a = 1\n  b = 2").unwrap();
        assert_eq!(spanned[0].line, 1);
        assert_eq!(spanned[0].column, 1);
        // "b" on line 2, after two spaces
        assert_eq!(spanned[3].token, Token::Ident("b".to_string()));
        assert_eq!(spanned[3].line, 2);
        assert_eq!(spanned[3].column, 3);
    }

    #[test]
    fn test_tokenize_unterminated_string() {
        let err = tokenize("bucket = \"oops").unwrap_err();
        match err {
            ConfigError::Parse { line, column, message } => {
                assert_eq!(line, 1);
                assert_eq!(column, 10);
                assert!(message.contains("unterminated"));
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_tokenize_newline_terminates_string() {
        let err = tokenize("bucket = \"oops\n\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_tokenize_unexpected_character() {
        let err = tokenize("a = $").unwrap_err();
        match err {
            ConfigError::Parse { column, message, .. } => {
                assert_eq!(column, 5);
                assert!(message.contains('$'));
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_tokenize_unsupported_escape() {
        let err = tokenize(r#"a = "\q""#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("escape"));
    }
}
