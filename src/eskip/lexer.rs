//! Tokenizer for eskip documents.

use super::parser::ParseError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Ident(String),
    Str(String),
    Regexp(String),
    Number(f64),
    Colon,
    Semicolon,
    Comma,
    OpenParen,
    CloseParen,
    OpenAngle,
    CloseAngle,
    And,
    Arrow,
    Any,
}

impl Token {
    pub(crate) fn describe(&self) -> String {
        match self {
            Token::Ident(s) => format!("identifier `{}`", s),
            Token::Str(_) => "string".to_string(),
            Token::Regexp(_) => "regexp".to_string(),
            Token::Number(_) => "number".to_string(),
            Token::Colon => "`:`".to_string(),
            Token::Semicolon => "`;`".to_string(),
            Token::Comma => "`,`".to_string(),
            Token::OpenParen => "`(`".to_string(),
            Token::CloseParen => "`)`".to_string(),
            Token::OpenAngle => "`<`".to_string(),
            Token::CloseAngle => "`>`".to_string(),
            Token::And => "`&&`".to_string(),
            Token::Arrow => "`->`".to_string(),
            Token::Any => "`*`".to_string(),
        }
    }
}

/// A token with the 1-based line and column where it starts.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Spanned {
    pub token: Token,
    pub line: usize,
    pub column: usize,
}

struct Cursor<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            line: 1,
            column: 1,
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(self.line, self.column, message)
    }
}

/// Split an eskip document into tokens, dropping whitespace and comments.
pub(crate) fn tokenize(input: &str) -> Result<Vec<Spanned>, ParseError> {
    let mut cursor = Cursor::new(input);
    let mut tokens = Vec::new();

    while let Some(c) = cursor.peek() {
        let (line, column) = (cursor.line, cursor.column);

        if c.is_whitespace() {
            cursor.bump();
            continue;
        }

        let token = match c {
            '/' => {
                cursor.bump();
                if cursor.peek() == Some('/') {
                    while let Some(c) = cursor.bump() {
                        if c == '\n' {
                            break;
                        }
                    }
                    continue;
                }
                Token::Regexp(read_regexp(&mut cursor)?)
            }
            '"' => {
                cursor.bump();
                Token::Str(read_string(&mut cursor)?)
            }
            '`' => {
                cursor.bump();
                Token::Str(read_raw_string(&mut cursor)?)
            }
            '-' => {
                cursor.bump();
                match cursor.peek() {
                    Some('>') => {
                        cursor.bump();
                        Token::Arrow
                    }
                    Some(d) if d.is_ascii_digit() => Token::Number(-read_number(&mut cursor)?),
                    _ => return Err(cursor.error("expected `->` or a number after `-`")),
                }
            }
            '&' => {
                cursor.bump();
                if cursor.bump() != Some('&') {
                    return Err(ParseError::new(line, column, "expected `&&`"));
                }
                Token::And
            }
            ':' => single(&mut cursor, Token::Colon),
            ';' => single(&mut cursor, Token::Semicolon),
            ',' => single(&mut cursor, Token::Comma),
            '(' => single(&mut cursor, Token::OpenParen),
            ')' => single(&mut cursor, Token::CloseParen),
            '<' => single(&mut cursor, Token::OpenAngle),
            '>' => single(&mut cursor, Token::CloseAngle),
            '*' => single(&mut cursor, Token::Any),
            d if d.is_ascii_digit() => Token::Number(read_number(&mut cursor)?),
            a if a.is_ascii_alphabetic() || a == '_' => Token::Ident(read_ident(&mut cursor)),
            other => {
                return Err(ParseError::new(
                    line,
                    column,
                    format!("unexpected character `{}`", other),
                ))
            }
        };

        tokens.push(Spanned {
            token,
            line,
            column,
        });
    }

    Ok(tokens)
}

fn single(cursor: &mut Cursor<'_>, token: Token) -> Token {
    cursor.bump();
    token
}

fn read_ident(cursor: &mut Cursor<'_>) -> String {
    let mut ident = String::new();
    while let Some(c) = cursor.peek() {
        if c.is_ascii_alphanumeric() || c == '_' {
            ident.push(c);
            cursor.bump();
        } else {
            break;
        }
    }
    ident
}

fn read_number(cursor: &mut Cursor<'_>) -> Result<f64, ParseError> {
    let mut digits = String::new();
    while let Some(c) = cursor.peek() {
        if c.is_ascii_digit() || c == '.' {
            digits.push(c);
            cursor.bump();
        } else {
            break;
        }
    }
    digits
        .parse()
        .map_err(|_| cursor.error(format!("invalid number `{}`", digits)))
}

fn read_string(cursor: &mut Cursor<'_>) -> Result<String, ParseError> {
    let mut value = String::new();
    loop {
        match cursor.bump() {
            None => return Err(cursor.error("unterminated string")),
            Some('"') => return Ok(value),
            Some('\\') => match cursor.bump() {
                Some('n') => value.push('\n'),
                Some('t') => value.push('\t'),
                Some('r') => value.push('\r'),
                Some(c @ ('"' | '\\')) => value.push(c),
                Some(c) => {
                    value.push('\\');
                    value.push(c);
                }
                None => return Err(cursor.error("unterminated string")),
            },
            Some(c) => value.push(c),
        }
    }
}

fn read_raw_string(cursor: &mut Cursor<'_>) -> Result<String, ParseError> {
    let mut value = String::new();
    loop {
        match cursor.bump() {
            None => return Err(cursor.error("unterminated raw string")),
            Some('`') => return Ok(value),
            Some(c) => value.push(c),
        }
    }
}

fn read_regexp(cursor: &mut Cursor<'_>) -> Result<String, ParseError> {
    let mut value = String::new();
    loop {
        match cursor.bump() {
            None | Some('\n') => return Err(cursor.error("unterminated regexp")),
            Some('/') => return Ok(value),
            Some('\\') => match cursor.bump() {
                Some('/') => value.push('/'),
                Some(c) => {
                    value.push('\\');
                    value.push(c);
                }
                None => return Err(cursor.error("unterminated regexp")),
            },
            Some(c) => value.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<Token> {
        tokenize(input).unwrap().into_iter().map(|s| s.token).collect()
    }

    #[test]
    fn test_route_tokens() {
        let tokens = kinds(r#"r1: Path("/a") && Method("GET") -> <shunt>"#);
        assert_eq!(
            tokens,
            vec![
                Token::Ident("r1".into()),
                Token::Colon,
                Token::Ident("Path".into()),
                Token::OpenParen,
                Token::Str("/a".into()),
                Token::CloseParen,
                Token::And,
                Token::Ident("Method".into()),
                Token::OpenParen,
                Token::Str("GET".into()),
                Token::CloseParen,
                Token::Arrow,
                Token::OpenAngle,
                Token::Ident("shunt".into()),
                Token::CloseAngle,
            ]
        );
    }

    #[test]
    fn test_comments_and_literals() {
        let tokens = kinds("// leading comment\nWeight(-2.5) Cookie(`raw\\`, /a\\/b/)");
        assert_eq!(tokens[2], Token::Number(-2.5));
        assert_eq!(tokens[6], Token::Str("raw\\".into()));
        assert_eq!(tokens[8], Token::Regexp("a/b".into()));
    }

    #[test]
    fn test_positions() {
        let tokens = tokenize("a:\n  *").unwrap();
        assert_eq!((tokens[2].line, tokens[2].column), (2, 3));
    }

    #[test]
    fn test_unterminated_string() {
        let err = tokenize("Path(\"/a").unwrap_err();
        assert!(err.to_string().contains("unterminated string"));
    }
}
