// SQL lexer - tokenizes statements for the parser.

use super::token::Token;
use anyhow::{bail, Result};

pub struct Lexer {
    chars: Vec<char>,
    position: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            chars: input.chars().collect(),
            position: 0,
        }
    }

    /// Tokenizes the entire input, ending with `Token::Eof`.
    pub fn tokenize(&mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token == Token::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    fn next_token(&mut self) -> Result<Token> {
        self.skip_whitespace();

        let Some(ch) = self.current() else {
            return Ok(Token::Eof);
        };

        let token = match ch {
            '(' => {
                self.advance();
                Token::LeftParen
            }
            ')' => {
                self.advance();
                Token::RightParen
            }
            ',' => {
                self.advance();
                Token::Comma
            }
            ';' => {
                self.advance();
                Token::Semicolon
            }
            '-' => {
                self.advance();
                if self.current() == Some('-') {
                    self.skip_comment();
                    return self.next_token();
                }
                bail!("unexpected character '-'");
            }
            '"' => self.read_quoted_identifier(),
            c if c.is_alphabetic() || c == '_' => self.read_identifier(),
            c => bail!("unexpected character {c:?}"),
        };
        Ok(token)
    }

    fn current(&self) -> Option<char> {
        self.chars.get(self.position).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn skip_whitespace(&mut self) {
        while self.current().is_some_and(|c| c.is_whitespace()) {
            self.advance();
        }
    }

    /// Skips a single-line comment starting with --.
    fn skip_comment(&mut self) {
        while let Some(ch) = self.current() {
            self.advance();
            if ch == '\n' {
                break;
            }
        }
    }

    fn read_identifier(&mut self) -> Token {
        let mut identifier = String::new();
        while let Some(ch) = self.current() {
            if ch.is_alphanumeric() || ch == '_' {
                identifier.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        Token::keyword_from_str(&identifier).unwrap_or(Token::Identifier(identifier))
    }

    /// Reads a quoted identifier (e.g. "table name"); quoting also lets a
    /// keyword be used as a name.
    fn read_quoted_identifier(&mut self) -> Token {
        self.advance();
        let mut identifier = String::new();
        while let Some(ch) = self.current() {
            self.advance();
            if ch == '"' {
                break;
            }
            identifier.push(ch);
        }
        Token::Identifier(identifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_tokens() -> Result<()> {
        let tokens = Lexer::new("CREATE TABLE foo (x INT, y TEXT);").tokenize()?;
        assert_eq!(
            tokens,
            vec![
                Token::Create,
                Token::Table,
                Token::Identifier("foo".to_string()),
                Token::LeftParen,
                Token::Identifier("x".to_string()),
                Token::Int,
                Token::Comma,
                Token::Identifier("y".to_string()),
                Token::Text,
                Token::RightParen,
                Token::Semicolon,
                Token::Eof,
            ]
        );
        Ok(())
    }

    #[test]
    fn test_keywords_case_insensitive() -> Result<()> {
        let tokens = Lexer::new("show tables").tokenize()?;
        assert_eq!(tokens, vec![Token::Show, Token::Tables, Token::Eof]);
        Ok(())
    }

    #[test]
    fn test_quoted_identifier() -> Result<()> {
        let tokens = Lexer::new(r#"drop table "table""#).tokenize()?;
        assert_eq!(
            tokens,
            vec![
                Token::Drop,
                Token::Table,
                Token::Identifier("table".to_string()),
                Token::Eof,
            ]
        );
        Ok(())
    }

    #[test]
    fn test_comments() -> Result<()> {
        let tokens = Lexer::new("SHOW -- a comment\nTABLES").tokenize()?;
        assert_eq!(tokens, vec![Token::Show, Token::Tables, Token::Eof]);
        Ok(())
    }

    #[test]
    fn test_unexpected_character() {
        assert!(Lexer::new("SELECT *").tokenize().is_err());
    }
}
