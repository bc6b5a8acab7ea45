use std::iter::Peekable;
use std::str::Chars;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Symbol(String),
    Str(String),
    Int(i64),
    Float(f64),
    Nil,
    True,
    False,

    LBracket, // [
    RBracket, // ]
    Comma,    // ,

    Eof,
}

#[derive(Debug, thiserror::Error)]
pub enum LexError {
    #[error("Unexpected character: {0}")]
    UnexpectedChar(char),
    #[error("Unterminated string")]
    UnterminatedString,
    #[error("Invalid escape sequence: \\{0}")]
    InvalidEscape(String),
    #[error("Invalid number: {0}")]
    InvalidNumber(String),
    #[error("Unknown bare word: {0}")]
    UnknownWord(String),
}

pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.chars.peek() {
            if c.is_whitespace() {
                self.chars.next();
            } else {
                break;
            }
        }
    }

    fn is_delimiter(c: char) -> bool {
        c.is_whitespace() || c == ',' || c == '[' || c == ']'
    }

    fn read_word(&mut self, first: Option<char>) -> String {
        let mut s = String::new();
        if let Some(c) = first {
            s.push(c);
        }
        while let Some(&c) = self.chars.peek() {
            if Self::is_delimiter(c) {
                break;
            }
            s.push(c);
            self.chars.next();
        }
        s
    }

    fn read_hex(&mut self, digits: usize) -> Result<u32, LexError> {
        let mut s = String::new();
        for _ in 0..digits {
            match self.chars.next() {
                Some(c) if c.is_ascii_hexdigit() => s.push(c),
                Some(c) => {
                    s.push(c);
                    return Err(LexError::InvalidEscape(s));
                }
                None => return Err(LexError::UnterminatedString),
            }
        }
        u32::from_str_radix(&s, 16).map_err(|_| LexError::InvalidEscape(s))
    }

    fn push_code_point(s: &mut String, code: u32) -> Result<(), LexError> {
        let c = char::from_u32(code)
            .ok_or_else(|| LexError::InvalidEscape(format!("u{:x}", code)))?;
        s.push(c);
        Ok(())
    }

    /// Reads a double-quoted string as printed by `String#inspect`.
    fn read_string(&mut self) -> Result<String, LexError> {
        let mut s = String::new();
        // \xNN escapes arrive byte by byte
        let mut bytes: Vec<u8> = Vec::new();
        loop {
            let c = self.chars.next().ok_or(LexError::UnterminatedString)?;
            if c == '\\' && self.chars.peek() == Some(&'x') {
                self.chars.next();
                bytes.push(self.read_hex(2)? as u8);
                continue;
            }
            if !bytes.is_empty() {
                s.push_str(&String::from_utf8_lossy(&bytes));
                bytes.clear();
            }
            match c {
                '"' => return Ok(s),
                '\\' => {
                    let esc = self.chars.next().ok_or(LexError::UnterminatedString)?;
                    match esc {
                        'n' => s.push('\n'),
                        't' => s.push('\t'),
                        'r' => s.push('\r'),
                        'e' => s.push('\u{1b}'),
                        'a' => s.push('\u{07}'),
                        'b' => s.push('\u{08}'),
                        'f' => s.push('\u{0c}'),
                        'v' => s.push('\u{0b}'),
                        's' => s.push(' '),
                        '0' => s.push('\0'),
                        'u' => {
                            if self.chars.peek() == Some(&'{') {
                                self.chars.next();
                                let mut hex = String::new();
                                loop {
                                    match self.chars.next() {
                                        Some('}') => break,
                                        Some(c) if c.is_ascii_hexdigit() => hex.push(c),
                                        Some(c) => {
                                            hex.push(c);
                                            let seq = format!("u{{{}", hex);
                                            return Err(LexError::InvalidEscape(seq));
                                        }
                                        None => return Err(LexError::UnterminatedString),
                                    }
                                }
                                let code = u32::from_str_radix(&hex, 16)
                                    .map_err(|_| LexError::InvalidEscape(format!("u{{{}}}", hex)))?;
                                Self::push_code_point(&mut s, code)?;
                            } else {
                                let code = self.read_hex(4)?;
                                Self::push_code_point(&mut s, code)?;
                            }
                        }
                        other => s.push(other),
                    }
                }
                c => s.push(c),
            }
        }
    }

    fn read_symbol(&mut self) -> Result<String, LexError> {
        if self.chars.peek() == Some(&'"') {
            self.chars.next();
            return self.read_string();
        }
        // :[] and :[]= start with a delimiter
        if self.chars.peek() == Some(&'[') {
            self.chars.next();
            if self.chars.next() != Some(']') {
                return Err(LexError::UnexpectedChar('['));
            }
            let mut name = String::from("[]");
            if self.chars.peek() == Some(&'=') {
                self.chars.next();
                name.push('=');
            }
            return Ok(name);
        }
        let name = self.read_word(None);
        if name.is_empty() {
            return Err(LexError::UnexpectedChar(':'));
        }
        Ok(name)
    }

    fn read_number(&mut self, first: char) -> Result<Token, LexError> {
        let word = self.read_word(Some(first));
        let digits: String = word.chars().filter(|&c| c != '_').collect();
        if digits.contains(|c: char| matches!(c, '.' | 'e' | 'E')) {
            digits
                .parse()
                .map(Token::Float)
                .map_err(|_| LexError::InvalidNumber(word))
        } else {
            digits
                .parse()
                .map(Token::Int)
                .map_err(|_| LexError::InvalidNumber(word))
        }
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace();

        let c = match self.chars.next() {
            Some(c) => c,
            None => return Ok(Token::Eof),
        };

        let tok = match c {
            '[' => Token::LBracket,
            ']' => Token::RBracket,
            ',' => Token::Comma,
            ':' => Token::Symbol(self.read_symbol()?),
            '"' => Token::Str(self.read_string()?),
            c if c.is_ascii_digit() || c == '-' => self.read_number(c)?,
            c if c.is_ascii_alphabetic() => match self.read_word(Some(c)).as_str() {
                "nil" => Token::Nil,
                "true" => Token::True,
                "false" => Token::False,
                other => return Err(LexError::UnknownWord(other.to_string())),
            },
            _ => return Err(LexError::UnexpectedChar(c)),
        };

        Ok(tok)
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token()?;
            if tok == Token::Eof {
                tokens.push(tok);
                break;
            }
            tokens.push(tok);
        }
        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_tokens() {
        let tokens = Lexer::new(r#"[:@ident, "t", [3, 14]]"#).tokenize().unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::LBracket,
                Token::Symbol("@ident".into()),
                Token::Comma,
                Token::Str("t".into()),
                Token::Comma,
                Token::LBracket,
                Token::Int(3),
                Token::Comma,
                Token::Int(14),
                Token::RBracket,
                Token::RBracket,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_quoted_and_operator_symbols() {
        let tokens = Lexer::new(r#":".", :"::", :+"#).tokenize().unwrap();
        assert_eq!(tokens[0], Token::Symbol(".".into()));
        assert_eq!(tokens[2], Token::Symbol("::".into()));
        assert_eq!(tokens[4], Token::Symbol("+".into()));
    }

    #[test]
    fn test_index_operator_symbols() {
        let tokens = Lexer::new("[:aref, :[], :[]=]").tokenize().unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::LBracket,
                Token::Symbol("aref".into()),
                Token::Comma,
                Token::Symbol("[]".into()),
                Token::Comma,
                Token::Symbol("[]=".into()),
                Token::RBracket,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_keywords() {
        let tokens = Lexer::new("nil true false").tokenize().unwrap();
        assert_eq!(tokens, vec![Token::Nil, Token::True, Token::False, Token::Eof]);
    }

    #[test]
    fn test_string_escapes() {
        let tokens = Lexer::new(r#""a\"b\\c\né\u{1F600}""#).tokenize().unwrap();
        assert_eq!(tokens[0], Token::Str("a\"b\\c\né\u{1F600}".into()));
    }

    #[test]
    fn test_hex_byte_escapes() {
        let tokens = Lexer::new(r#""\xC3\xA9t\xC3\xA9""#).tokenize().unwrap();
        assert_eq!(tokens[0], Token::Str("été".into()));
    }

    #[test]
    fn test_interpolation_escape() {
        let tokens = Lexer::new(r#""\#{x}""#).tokenize().unwrap();
        assert_eq!(tokens[0], Token::Str("#{x}".into()));
    }

    #[test]
    fn test_numbers() {
        let tokens = Lexer::new("42 -7 1.5").tokenize().unwrap();
        assert_eq!(
            tokens,
            vec![Token::Int(42), Token::Int(-7), Token::Float(1.5), Token::Eof]
        );
    }

    #[test]
    fn test_unterminated_string() {
        let err = Lexer::new(r#""abc"#).tokenize().unwrap_err();
        assert!(matches!(err, LexError::UnterminatedString));
    }

    #[test]
    fn test_unknown_word() {
        let err = Lexer::new("maybe").tokenize().unwrap_err();
        assert!(matches!(err, LexError::UnknownWord(w) if w == "maybe"));
    }
}
