// SQL tokens. Keywords are matched case-insensitively.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    // Keywords
    Create,
    Drop,
    Show,
    Table,
    Tables,
    Columns,
    From,
    If,
    Not,
    Exists,
    Int,
    Text,

    Identifier(String),

    // Punctuation
    LeftParen,
    RightParen,
    Comma,
    Semicolon,

    Eof,
}

impl Token {
    pub fn keyword_from_str(word: &str) -> Option<Token> {
        match word.to_ascii_uppercase().as_str() {
            "CREATE" => Some(Token::Create),
            "DROP" => Some(Token::Drop),
            "SHOW" => Some(Token::Show),
            "TABLE" => Some(Token::Table),
            "TABLES" => Some(Token::Tables),
            "COLUMNS" => Some(Token::Columns),
            "FROM" => Some(Token::From),
            "IF" => Some(Token::If),
            "NOT" => Some(Token::Not),
            "EXISTS" => Some(Token::Exists),
            "INT" | "INTEGER" => Some(Token::Int),
            "TEXT" => Some(Token::Text),
            _ => None,
        }
    }
}
