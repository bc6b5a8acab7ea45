use super::lexer::{LexError, Lexer, Token};
use crate::node::Node;

#[derive(Debug, thiserror::Error)]
pub enum SexpError {
    #[error("Lex error: {0}")]
    Lex(#[from] LexError),
    #[error("Unexpected token: {0:?}, expected {1}")]
    Unexpected(Token, &'static str),
    #[error("Unexpected end of input")]
    UnexpectedEof,
}

/// Read a `p Ripper.sexp(source)` dump into a [`Node`] tree.
pub fn parse(input: &str) -> Result<Node, SexpError> {
    let mut reader = Reader::new(input)?;
    let node = reader.parse_value()?;
    match reader.advance().clone() {
        Token::Eof => Ok(node),
        tok => Err(SexpError::Unexpected(tok, "end of input")),
    }
}

struct Reader {
    tokens: Vec<Token>,
    pos: usize,
}

impl Reader {
    fn new(input: &str) -> Result<Self, SexpError> {
        let tokens = Lexer::new(input).tokenize()?;
        Ok(Self { tokens, pos: 0 })
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) -> &Token {
        let tok = self.tokens.get(self.pos).unwrap_or(&Token::Eof);
        self.pos += 1;
        tok
    }

    fn parse_value(&mut self) -> Result<Node, SexpError> {
        let node = match self.advance().clone() {
            Token::LBracket => self.parse_array()?,
            Token::Symbol(s) => Node::Symbol(s),
            Token::Str(s) => Node::Str(s),
            Token::Int(n) => Node::Int(n),
            Token::Float(n) => Node::Float(n),
            Token::True => Node::Bool(true),
            Token::False => Node::Bool(false),
            Token::Nil => Node::Nil,
            Token::Eof => return Err(SexpError::UnexpectedEof),
            tok => return Err(SexpError::Unexpected(tok, "value")),
        };
        Ok(node)
    }

    /// Parses the rest of an array after its opening bracket.
    fn parse_array(&mut self) -> Result<Node, SexpError> {
        let mut items = Vec::new();

        while *self.peek() != Token::RBracket {
            if *self.peek() == Token::Eof {
                return Err(SexpError::UnexpectedEof);
            }
            items.push(self.parse_value()?);

            match self.peek() {
                Token::Comma => {
                    self.advance();
                }
                Token::RBracket => {}
                Token::Eof => return Err(SexpError::UnexpectedEof),
                tok => return Err(SexpError::Unexpected(tok.clone(), "',' or ']'")),
            }
        }
        self.advance();

        // A leading symbol makes the array a tagged node
        if let Some(Node::Symbol(tag)) = items.first() {
            let tag = tag.clone();
            items.remove(0);
            return Ok(Node::Tagged {
                tag,
                children: items,
            });
        }

        Ok(Node::List(items))
    }
}
