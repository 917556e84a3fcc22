// Recursive-descent parser for the supported statement set.

use super::ast::{ColumnDef, Statement};
use super::lexer::Lexer;
use super::token::Token;
use crate::access::DataType;
use anyhow::{bail, Result};

pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    pub fn new(input: &str) -> Result<Self> {
        let tokens = Lexer::new(input).tokenize()?;
        Ok(Self {
            tokens,
            position: 0,
        })
    }

    /// Parses exactly one statement, with an optional trailing semicolon.
    pub fn parse_statement(&mut self) -> Result<Statement> {
        let statement = match self.peek() {
            Token::Create => self.parse_create()?,
            Token::Drop => self.parse_drop()?,
            Token::Show => self.parse_show()?,
            other => bail!("expected a statement, found {other:?}"),
        };
        if *self.peek() == Token::Semicolon {
            self.advance();
        }
        self.expect(Token::Eof)?;
        Ok(statement)
    }

    fn parse_create(&mut self) -> Result<Statement> {
        self.expect(Token::Create)?;
        self.expect(Token::Table)?;

        let if_not_exists = if *self.peek() == Token::If {
            self.advance();
            self.expect(Token::Not)?;
            self.expect(Token::Exists)?;
            true
        } else {
            false
        };

        let table_name = self.identifier()?;
        self.expect(Token::LeftParen)?;
        let mut columns = Vec::new();
        loop {
            let name = self.identifier()?;
            let data_type = self.data_type()?;
            columns.push(ColumnDef { name, data_type });
            match self.advance() {
                Token::Comma => continue,
                Token::RightParen => break,
                other => bail!("expected ',' or ')' in column list, found {other:?}"),
            }
        }

        Ok(Statement::CreateTable {
            table_name,
            columns,
            if_not_exists,
        })
    }

    fn parse_drop(&mut self) -> Result<Statement> {
        self.expect(Token::Drop)?;
        self.expect(Token::Table)?;
        let table_name = self.identifier()?;
        Ok(Statement::DropTable { table_name })
    }

    fn parse_show(&mut self) -> Result<Statement> {
        self.expect(Token::Show)?;
        match self.advance() {
            Token::Tables => Ok(Statement::ShowTables),
            Token::Columns => {
                self.expect(Token::From)?;
                let table_name = self.identifier()?;
                Ok(Statement::ShowColumns { table_name })
            }
            other => bail!("expected TABLES or COLUMNS after SHOW, found {other:?}"),
        }
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.position).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.position < self.tokens.len() {
            self.position += 1;
        }
        token
    }

    fn expect(&mut self, expected: Token) -> Result<()> {
        let token = self.advance();
        if token != expected {
            bail!("expected {expected:?}, found {token:?}");
        }
        Ok(())
    }

    fn identifier(&mut self) -> Result<String> {
        match self.advance() {
            Token::Identifier(name) => Ok(name),
            other => bail!("expected an identifier, found {other:?}"),
        }
    }

    fn data_type(&mut self) -> Result<DataType> {
        match self.advance() {
            Token::Int => Ok(DataType::Int),
            Token::Text => Ok(DataType::Text),
            other => bail!("expected a column type (INT or TEXT), found {other:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::parse;

    #[test]
    fn test_create_table() -> Result<()> {
        let statement = parse("CREATE TABLE foo (a INT, b TEXT)")?;
        assert_eq!(
            statement,
            Statement::CreateTable {
                table_name: "foo".to_string(),
                columns: vec![
                    ColumnDef {
                        name: "a".to_string(),
                        data_type: DataType::Int,
                    },
                    ColumnDef {
                        name: "b".to_string(),
                        data_type: DataType::Text,
                    },
                ],
                if_not_exists: false,
            }
        );
        Ok(())
    }

    #[test]
    fn test_create_table_if_not_exists() -> Result<()> {
        let statement = parse("create table if not exists foo (x int);")?;
        assert!(matches!(
            statement,
            Statement::CreateTable {
                if_not_exists: true,
                ..
            }
        ));
        Ok(())
    }

    #[test]
    fn test_drop_table() -> Result<()> {
        assert_eq!(
            parse("DROP TABLE foo;")?,
            Statement::DropTable {
                table_name: "foo".to_string(),
            }
        );
        Ok(())
    }

    #[test]
    fn test_show_statements() -> Result<()> {
        assert_eq!(parse("SHOW TABLES")?, Statement::ShowTables);
        assert_eq!(
            parse("SHOW COLUMNS FROM foo")?,
            Statement::ShowColumns {
                table_name: "foo".to_string(),
            }
        );
        Ok(())
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse("").is_err());
        assert!(parse("CREATE foo").is_err());
        assert!(parse("CREATE TABLE foo ()").is_err());
        assert!(parse("CREATE TABLE foo (a FLOAT)").is_err());
        assert!(parse("SHOW COLUMNS foo").is_err());
        assert!(parse("DROP TABLE foo extra").is_err());
    }
}
