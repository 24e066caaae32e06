//! Canonical text form of templates.
//!
//! Parameters are printed in key order, lists always in brackets, and
//! strings quoted only when the bare form would lex differently. Parsing the
//! output yields the same AST.

use std::fmt;

use crate::ast::{CommandNode, DeclarationNode, Expr, Node, ParamValue, Statement, Template};
use crate::lexer::is_word_char;
use crate::value::Value;

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines: Vec<String> = self.statements.iter().map(|s| s.to_string()).collect();
        write!(f, "{}", lines.join("\n"))
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.node.fmt(f)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Command(c) => c.fmt(f),
            Node::Declaration(DeclarationNode { ident, expr }) => match expr {
                Expr::Command(c) => write!(f, "{} = {}", ident, c),
                Expr::Value(v) => write!(f, "{} = {}", ident, v),
            },
        }
    }
}

impl fmt::Display for CommandNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.action, self.entity)?;
        for (k, v) in &self.params {
            write!(f, " {}={}", k, v)?;
        }
        Ok(())
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Literal(v) => write!(f, "{}", CanonicalValue(v)),
            ParamValue::Ref(r) => write!(f, "${}", r),
            ParamValue::Hole(h) => write!(f, "{{{}}}", h),
            ParamValue::Alias(a) => write!(f, "@{}", a),
            ParamValue::List(items) => {
                let parts: Vec<String> = items.iter().map(|i| i.to_string()).collect();
                write!(f, "[{}]", parts.join(","))
            }
        }
    }
}

/// A value rendered the way the parser reads it back.
pub struct CanonicalValue<'a>(pub &'a Value);

impl fmt::Display for CanonicalValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Value::Str(s) => write!(f, "{}", quote_if_needed(s)),
            Value::List(items) => {
                let parts: Vec<String> = items
                    .iter()
                    .map(|i| CanonicalValue(i).to_string())
                    .collect();
                write!(f, "[{}]", parts.join(","))
            }
            other => write!(f, "{}", other),
        }
    }
}

/// Quote `s` so that the lexer reads it back as a single string.
///
/// Quoted literals have no escapes: a value holding both quote kinds is
/// wrapped in double quotes as-is and does not survive a re-parse.
pub fn quote_if_needed(s: &str) -> String {
    if needs_quotes(s) {
        if s.contains('\'') {
            format!("\"{}\"", s)
        } else {
            format!("'{}'", s)
        }
    } else {
        s.to_string()
    }
}

fn needs_quotes(s: &str) -> bool {
    if s.is_empty() || s == "true" || s == "false" {
        return true;
    }
    if s.parse::<i64>().is_ok() || s.parse::<f64>().map(|_| s.contains('.')).unwrap_or(false) {
        return true;
    }
    if s.starts_with('@') || s.starts_with("//") {
        return true;
    }
    !s.chars().all(is_word_char)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn canonical_round_trip() {
        let sources = [
            "create bucket acl=public-read name=my-new-bucket",
            "inst = create instance count=1 image=ami-1 name='my instance' subnet=sub-1 type=t2.nano",
            "stop instance id=[id-1234,$inst,id-2345]",
            "create loadbalancer name=mylb subnets=[@mysubnet,$subnet2,{subnet3}]",
            "ip = '10'",
            "create policy action=ec2:Get* description=\"it's mine\" resource=*",
            "create keypair name={keypair.name}\ncreate tag key=Env resource=$x value='true'",
            "update securitygroup id=sg-1 portrange=10-22 ratio=0.5",
        ];
        for src in sources {
            let t = parse(src).unwrap();
            assert_eq!(t.to_string(), src);
        }
    }

    #[test]
    fn params_are_sorted() {
        let t = parse("create bucket name=b acl=private").unwrap();
        assert_eq!(t.to_string(), "create bucket acl=private name=b");
    }

    #[test]
    fn strings_are_quoted_only_when_needed() {
        assert_eq!(quote_if_needed("ami-123"), "ami-123");
        assert_eq!(quote_if_needed("10.0.0.0/16"), "10.0.0.0/16");
        assert_eq!(quote_if_needed("42"), "'42'");
        assert_eq!(quote_if_needed("0.5"), "'0.5'");
        assert_eq!(quote_if_needed("a b"), "'a b'");
        assert_eq!(quote_if_needed("@x"), "'@x'");
        assert_eq!(quote_if_needed("don't"), "\"don't\"");
        assert_eq!(quote_if_needed(""), "''");
    }

    #[test]
    fn both_quote_kinds_cannot_be_read_back() {
        let printed = quote_if_needed(r#"say "don't""#);
        assert_eq!(printed, r#""say "don't"""#);
        assert!(parse(&format!("create tag key=k resource=r value={printed}")).is_err());
    }
}
