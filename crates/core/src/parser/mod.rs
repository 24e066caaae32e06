//! Template parser: token stream → [`Template`].
//!
//! The language is line oriented. Each non-empty line is a command, a
//! command bound to a name, or a value bound to a name.

use std::collections::BTreeMap;

use crate::ast::{CommandNode, DeclarationNode, Expr, Node, Statement, Template};
use crate::error::ParseError;
use crate::lexer::{lex, Spanned, Token};

mod values;

/// Verbs the language knows about.
pub const ACTIONS: &[&str] = &[
    "create",
    "delete",
    "update",
    "attach",
    "detach",
    "start",
    "stop",
    "restart",
    "check",
    "copy",
    "import",
    "authenticate",
];

/// Resource kinds the language knows about.
pub const ENTITIES: &[&str] = &[
    "accesskey",
    "alarm",
    "bucket",
    "elasticip",
    "group",
    "image",
    "instance",
    "instanceprofile",
    "internetgateway",
    "keypair",
    "loadbalancer",
    "policy",
    "route",
    "routetable",
    "securitygroup",
    "subnet",
    "tag",
    "targetgroup",
    "user",
    "volume",
    "vpc",
    "zone",
];

pub fn is_action(s: &str) -> bool {
    ACTIONS.contains(&s)
}

pub fn is_entity(s: &str) -> bool {
    ENTITIES.contains(&s)
}

/// Parse template source text.
pub fn parse(src: &str) -> Result<Template, ParseError> {
    let tokens = lex(src)?;
    Parser::new(&tokens).parse_template()
}

// ──────────────────────────────────────────────
// Parser
// ──────────────────────────────────────────────

pub(crate) struct Parser<'a> {
    tokens: &'a [Spanned],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Spanned]) -> Self {
        Parser { tokens, pos: 0 }
    }

    fn cur(&self) -> &Spanned {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek(&self) -> &Token {
        &self.cur().token
    }

    fn peek_at(&self, offset: usize) -> &Token {
        let i = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[i].token
    }

    fn advance(&mut self) -> &Spanned {
        let t = &self.tokens[self.pos.min(self.tokens.len() - 1)];
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        t
    }

    fn err(&self, message: impl Into<String>) -> ParseError {
        let s = self.cur();
        ParseError::new(s.line, s.column, message)
    }

    fn expected(&self, what: &str) -> ParseError {
        self.err(format!("expected {}, found {}", what, describe(self.peek())))
    }

    fn expect_eq(&mut self) -> Result<(), ParseError> {
        if self.peek() == &Token::Eq {
            self.advance();
            Ok(())
        } else {
            Err(self.expected("'='"))
        }
    }

    fn take_word(&mut self, what: &str) -> Result<String, ParseError> {
        match self.peek().clone() {
            Token::Word(w) => {
                self.advance();
                Ok(w)
            }
            _ => Err(self.expected(what)),
        }
    }

    fn at_line_end(&self) -> bool {
        matches!(self.peek(), Token::Newline | Token::Eof)
    }

    fn parse_template(&mut self) -> Result<Template, ParseError> {
        let mut statements = Vec::new();
        loop {
            while self.peek() == &Token::Newline {
                self.advance();
            }
            if self.peek() == &Token::Eof {
                break;
            }
            statements.push(self.parse_statement()?);
            if !self.at_line_end() {
                return Err(self.expected("end of line"));
            }
        }
        Ok(Template { statements })
    }

    fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        let line = self.cur().line;
        if matches!(self.peek(), Token::Word(_)) && self.peek_at(1) == &Token::Eq {
            let ident = self.take_word("identifier")?;
            if !ident
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
            {
                return Err(ParseError::new(
                    line,
                    1,
                    format!("invalid identifier '{}'", ident),
                ));
            }
            self.expect_eq()?;
            let expr = if self.starts_command() {
                Expr::Command(self.parse_command()?)
            } else {
                Expr::Value(self.parse_value()?)
            };
            return Ok(Statement {
                node: Node::Declaration(DeclarationNode { ident, expr }),
                line,
            });
        }
        let cmd = self.parse_command()?;
        Ok(Statement {
            node: Node::Command(cmd),
            line,
        })
    }

    fn starts_command(&self) -> bool {
        match (self.peek(), self.peek_at(1)) {
            (Token::Word(a), Token::Word(e)) => is_action(a) && is_entity(e),
            _ => false,
        }
    }

    fn parse_command(&mut self) -> Result<CommandNode, ParseError> {
        let action = self.take_word("action")?;
        if !is_action(&action) {
            self.pos -= 1;
            return Err(self.err(format!("unknown action '{}'", action)));
        }
        let entity = self.take_word("entity")?;
        if !is_entity(&entity) {
            self.pos -= 1;
            return Err(self.err(format!("unknown entity '{}'", entity)));
        }

        let mut params = BTreeMap::new();
        while !self.at_line_end() {
            let (line, column) = (self.cur().line, self.cur().column);
            let key = self.take_word("param key")?;
            self.expect_eq()?;
            let value = self.parse_value()?;
            if params.insert(key.clone(), value).is_some() {
                return Err(ParseError::new(
                    line,
                    column,
                    format!("duplicate param '{}'", key),
                ));
            }
        }

        Ok(CommandNode {
            action,
            entity,
            params,
        })
    }
}

fn describe(t: &Token) -> String {
    match t {
        Token::Word(w) => format!("'{}'", w),
        Token::Str(s) => format!("string '{}'", s),
        Token::Int(n) => format!("'{}'", n),
        Token::Float(x) => format!("'{}'", x),
        Token::Ref(r) => format!("'${}'", r),
        Token::Hole(h) => format!("'{{{}}}'", h),
        Token::Alias(a) => format!("'@{}'", a),
        Token::LBracket => "'['".to_string(),
        Token::RBracket => "']'".to_string(),
        Token::Comma => "','".to_string(),
        Token::Eq => "'='".to_string(),
        Token::Newline => "end of line".to_string(),
        Token::Eof => "end of input".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::ParamValue;
    use crate::value::Value;

    fn lit(s: &str) -> ParamValue {
        ParamValue::Literal(Value::str(s))
    }

    fn single_command(src: &str) -> CommandNode {
        let t = parse(src).unwrap();
        assert_eq!(t.statements.len(), 1, "{src}");
        let cmd = t.commands().next().cloned().unwrap();
        cmd
    }

    #[test]
    fn parses_command_with_params() {
        let cmd = single_command("create bucket name=my-new-bucket acl=public-read");
        assert_eq!(cmd.action, "create");
        assert_eq!(cmd.entity, "bucket");
        assert_eq!(cmd.params["name"], lit("my-new-bucket"));
        assert_eq!(cmd.params["acl"], lit("public-read"));
    }

    #[test]
    fn parses_declarations() {
        let t = parse("inst = create instance count=1 image=ami-1\nip = 10.0.0.1\nstop instance id=$inst").unwrap();
        assert_eq!(t.statements.len(), 3);
        assert_eq!(t.statements[0].node.binding(), Some("inst"));
        assert!(t.statements[0].node.command().is_some());
        match &t.statements[1].node {
            Node::Declaration(DeclarationNode {
                ident,
                expr: Expr::Value(v),
            }) => {
                assert_eq!(ident, "ip");
                assert_eq!(v, &lit("10.0.0.1"));
            }
            other => panic!("unexpected node {other:?}"),
        }
        assert_eq!(t.statements[2].line, 3);
        let stop = t.statements[2].node.command().unwrap();
        assert_eq!(stop.params["id"], ParamValue::Ref("inst".into()));
    }

    #[test]
    fn parses_typed_literals() {
        let cmd = single_command("create keypair a=110 b=123test c=0.5 d=0.5:0.6:+1 e=true f=1/test");
        assert_eq!(cmd.params["a"], ParamValue::Literal(Value::Int(110)));
        assert_eq!(cmd.params["b"], lit("123test"));
        assert_eq!(cmd.params["c"], ParamValue::Literal(Value::Float(0.5)));
        assert_eq!(cmd.params["d"], lit("0.5:0.6:+1"));
        assert_eq!(cmd.params["e"], ParamValue::Literal(Value::Bool(true)));
        assert_eq!(cmd.params["f"], lit("1/test"));
    }

    #[test]
    fn parses_lists_with_refs_holes_and_aliases() {
        let cmd = single_command("create loadbalancer name=mylb subnets=[@mysubnet,$subnet2,{subnet3},sub-1]");
        assert_eq!(
            cmd.params["subnets"],
            ParamValue::List(vec![
                ParamValue::Alias("mysubnet".into()),
                ParamValue::Ref("subnet2".into()),
                ParamValue::Hole("subnet3".into()),
                lit("sub-1"),
            ])
        );
        let cmd = single_command("create loadbalancer subnets=subnet-1,subnet-2");
        assert_eq!(
            cmd.params["subnets"],
            ParamValue::List(vec![lit("subnet-1"), lit("subnet-2")])
        );
    }

    #[test]
    fn quoted_strings_keep_spaces_and_commas() {
        let cmd = single_command("create policy description=\"my desc, long\" action=ec2:Get*");
        assert_eq!(cmd.params["description"], lit("my desc, long"));
        assert_eq!(cmd.params["action"], lit("ec2:Get*"));
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let t = parse("# setup\n\ncreate vpc cidr=10.0.0.0/16 // main\n   \n").unwrap();
        assert_eq!(t.statements.len(), 1);
        assert_eq!(t.statements[0].line, 3);
    }

    #[test]
    fn duplicate_key_is_an_error() {
        let err = parse("create vpc cidr=10.0.0.0/16 cidr=10.0.0.0/24").unwrap_err();
        assert_eq!(err.message, "duplicate param 'cidr'");
        assert_eq!((err.line, err.column), (1, 29));
    }

    #[test]
    fn unknown_action_or_entity() {
        let err = parse("create vpc\nfly instance").unwrap_err();
        assert_eq!(err.to_string(), "line 2, column 1: unknown action 'fly'");
        let err = parse("create spaceship name=x").unwrap_err();
        assert_eq!(err.to_string(), "line 1, column 8: unknown entity 'spaceship'");
    }

    #[test]
    fn syntax_errors_name_the_expected_token() {
        let err = parse("create vpc cidr").unwrap_err();
        assert_eq!(err.message, "expected '=', found end of input");
        let err = parse("create vpc cidr=[a,b").unwrap_err();
        assert_eq!(err.message, "expected ',' or ']', found end of input");
        let err = parse("create vpc cidr==").unwrap_err();
        assert_eq!(err.message, "expected value, found '='");
    }
}
