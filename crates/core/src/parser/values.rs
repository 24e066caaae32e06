use super::Parser;
use crate::ast::ParamValue;
use crate::error::ParseError;
use crate::lexer::Token;
use crate::value::Value;

impl<'a> Parser<'a> {
    /// A parameter value: a single item, a bracketed list, or a bare
    /// comma-separated list.
    pub(super) fn parse_value(&mut self) -> Result<ParamValue, ParseError> {
        if self.peek() == &Token::LBracket {
            self.advance();
            let mut items = Vec::new();
            if self.peek() == &Token::RBracket {
                self.advance();
                return Ok(ParamValue::List(items));
            }
            loop {
                items.push(self.parse_item()?);
                match self.peek() {
                    Token::Comma => {
                        self.advance();
                    }
                    Token::RBracket => {
                        self.advance();
                        return Ok(ParamValue::List(items));
                    }
                    _ => return Err(self.expected("',' or ']'")),
                }
            }
        }

        let first = self.parse_item()?;
        if self.peek() != &Token::Comma {
            return Ok(first);
        }
        let mut items = vec![first];
        while self.peek() == &Token::Comma {
            self.advance();
            items.push(self.parse_item()?);
        }
        Ok(ParamValue::List(items))
    }

    fn parse_item(&mut self) -> Result<ParamValue, ParseError> {
        let item = match self.peek() {
            Token::Word(w) => ParamValue::Literal(match w.as_str() {
                "true" => Value::Bool(true),
                "false" => Value::Bool(false),
                _ => Value::Str(w.clone()),
            }),
            Token::Str(s) => ParamValue::Literal(Value::Str(s.clone())),
            Token::Int(n) => ParamValue::Literal(Value::Int(*n)),
            Token::Float(x) => ParamValue::Literal(Value::Float(*x)),
            Token::Ref(r) => ParamValue::Ref(r.clone()),
            Token::Hole(h) => ParamValue::Hole(h.clone()),
            Token::Alias(a) => ParamValue::Alias(a.clone()),
            _ => return Err(self.expected("value")),
        };
        self.advance();
        Ok(item)
    }
}
