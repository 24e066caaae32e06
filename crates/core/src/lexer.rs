use crate::error::ParseError;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Bare words: actions, entities, keys, identifiers and unquoted values
    Word(String),
    /// Quoted string literal (content without quotes, no escapes)
    Str(String),
    Int(i64),
    Float(f64),
    /// `$name`
    Ref(String),
    /// `{name}`
    Hole(String),
    /// `@name`
    Alias(String),
    // Punctuation
    LBracket,
    RBracket,
    Comma,
    Eq,
    Newline,
    // End of input
    Eof,
}

#[derive(Debug, Clone)]
pub struct Spanned {
    pub token: Token,
    pub line: u32,
    pub column: u32,
}

pub(crate) fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "-._:/+;~<>*@".contains(c)
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "-_.".contains(c)
}

pub fn lex(src: &str) -> Result<Vec<Spanned>, ParseError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = src.chars().collect();
    let mut pos = 0usize;
    let mut line: u32 = 1;
    let mut col: u32 = 1;

    macro_rules! push {
        ($tok:expr, $c:expr) => {
            tokens.push(Spanned {
                token: $tok,
                line,
                column: $c,
            })
        };
    }

    while pos < chars.len() {
        let c = chars[pos];
        let start_col = col;

        // Line comments: `#` or `//` when they start a token
        if c == '#' || (c == '/' && chars.get(pos + 1) == Some(&'/')) {
            while pos < chars.len() && chars[pos] != '\n' {
                pos += 1;
                col += 1;
            }
            continue;
        }

        match c {
            '\n' => {
                push!(Token::Newline, start_col);
                pos += 1;
                line += 1;
                col = 1;
            }
            ' ' | '\t' | '\r' => {
                pos += 1;
                col += 1;
            }
            '=' => {
                push!(Token::Eq, start_col);
                pos += 1;
                col += 1;
            }
            ',' => {
                push!(Token::Comma, start_col);
                pos += 1;
                col += 1;
            }
            '[' => {
                push!(Token::LBracket, start_col);
                pos += 1;
                col += 1;
            }
            ']' => {
                push!(Token::RBracket, start_col);
                pos += 1;
                col += 1;
            }
            '\'' | '"' => {
                let quote = c;
                pos += 1;
                col += 1;
                let (start_line, mut s) = (line, String::new());
                loop {
                    match chars.get(pos) {
                        None => {
                            return Err(ParseError::new(
                                start_line,
                                start_col,
                                "unterminated quoted string",
                            ))
                        }
                        Some(&ch) if ch == quote => {
                            pos += 1;
                            col += 1;
                            break;
                        }
                        Some(&ch) => {
                            s.push(ch);
                            pos += 1;
                            if ch == '\n' {
                                line += 1;
                                col = 1;
                            } else {
                                col += 1;
                            }
                        }
                    }
                }
                tokens.push(Spanned {
                    token: Token::Str(s),
                    line: start_line,
                    column: start_col,
                });
            }
            '$' => {
                pos += 1;
                col += 1;
                let name = take_while(&chars, &mut pos, &mut col, is_ident_char);
                if name.is_empty() {
                    return Err(ParseError::new(
                        line,
                        start_col,
                        "expected reference name after '$'",
                    ));
                }
                push!(Token::Ref(name), start_col);
            }
            '{' => {
                pos += 1;
                col += 1;
                let mut inner = String::new();
                loop {
                    match chars.get(pos) {
                        None | Some('\n') => {
                            return Err(ParseError::new(line, start_col, "unterminated hole"))
                        }
                        Some('}') => {
                            pos += 1;
                            col += 1;
                            break;
                        }
                        Some(&ch) => {
                            inner.push(ch);
                            pos += 1;
                            col += 1;
                        }
                    }
                }
                let name = inner.trim();
                if name.is_empty() || !name.chars().all(is_ident_char) {
                    return Err(ParseError::new(
                        line,
                        start_col,
                        format!("invalid hole name '{}'", name),
                    ));
                }
                push!(Token::Hole(name.to_string()), start_col);
            }
            '@' => {
                pos += 1;
                col += 1;
                let name = take_while(&chars, &mut pos, &mut col, is_word_char);
                if name.is_empty() {
                    return Err(ParseError::new(
                        line,
                        start_col,
                        "expected alias name after '@'",
                    ));
                }
                push!(Token::Alias(name), start_col);
            }
            c if is_word_char(c) => {
                let word = take_while(&chars, &mut pos, &mut col, is_word_char);
                push!(classify(word), start_col);
            }
            other => {
                return Err(ParseError::new(
                    line,
                    start_col,
                    format!("unexpected character '{}'", other),
                ));
            }
        }
    }

    tokens.push(Spanned {
        token: Token::Eof,
        line,
        column: col,
    });
    Ok(tokens)
}

fn take_while(chars: &[char], pos: &mut usize, col: &mut u32, f: fn(char) -> bool) -> String {
    let mut s = String::new();
    while *pos < chars.len() && f(chars[*pos]) {
        s.push(chars[*pos]);
        *pos += 1;
        *col += 1;
    }
    s
}

/// Numbers are recognised only when the whole word is one; `10.0.0.0/16`
/// or `10-22` stay words.
fn classify(word: String) -> Token {
    if let Ok(n) = word.parse::<i64>() {
        return Token::Int(n);
    }
    if is_decimal(&word) {
        if let Ok(x) = word.parse::<f64>() {
            return Token::Float(x);
        }
    }
    Token::Word(word)
}

fn is_decimal(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    match digits.split_once('.') {
        Some((int, frac)) => {
            !int.is_empty()
                && !frac.is_empty()
                && int.chars().all(|c| c.is_ascii_digit())
                && frac.chars().all(|c| c.is_ascii_digit())
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<Token> {
        lex(src).unwrap().into_iter().map(|s| s.token).collect()
    }

    #[test]
    fn lexes_command_line() {
        assert_eq!(
            kinds("create subnet cidr=10.0.0.0/24 vpc=$myvpc count=2"),
            vec![
                Token::Word("create".into()),
                Token::Word("subnet".into()),
                Token::Word("cidr".into()),
                Token::Eq,
                Token::Word("10.0.0.0/24".into()),
                Token::Word("vpc".into()),
                Token::Eq,
                Token::Ref("myvpc".into()),
                Token::Word("count".into()),
                Token::Eq,
                Token::Int(2),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn numbers_only_when_whole_word() {
        assert_eq!(kinds("0.5")[0], Token::Float(0.5));
        assert_eq!(kinds("-3")[0], Token::Int(-3));
        assert_eq!(kinds("10-22")[0], Token::Word("10-22".into()));
        assert_eq!(kinds("1.2.3")[0], Token::Word("1.2.3".into()));
    }

    #[test]
    fn quotes_holes_and_aliases() {
        assert_eq!(
            kinds("name='my instance' type={instance.type} subnet=@prod"),
            vec![
                Token::Word("name".into()),
                Token::Eq,
                Token::Str("my instance".into()),
                Token::Word("type".into()),
                Token::Eq,
                Token::Hole("instance.type".into()),
                Token::Word("subnet".into()),
                Token::Eq,
                Token::Alias("prod".into()),
                Token::Eof,
            ]
        );
        assert_eq!(kinds("\"it's\"")[0], Token::Str("it's".into()));
        assert_eq!(kinds("'just jack\r\n'")[0], Token::Str("just jack\r\n".into()));
    }

    #[test]
    fn comments_and_lines() {
        let toks = lex("# header\ncreate vpc // trailing\n\nstop instance").unwrap();
        let words: Vec<(String, u32, u32)> = toks
            .iter()
            .filter_map(|s| match &s.token {
                Token::Word(w) => Some((w.clone(), s.line, s.column)),
                _ => None,
            })
            .collect();
        assert_eq!(
            words,
            vec![
                ("create".into(), 2, 1),
                ("vpc".into(), 2, 8),
                ("stop".into(), 4, 1),
                ("instance".into(), 4, 6),
            ]
        );
    }

    #[test]
    fn unterminated_quote_is_located() {
        let err = lex("create bucket\ncreate tag key='oops").unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.column, 16);
        assert_eq!(err.message, "unterminated quoted string");
    }

    #[test]
    fn rejects_stray_characters() {
        assert!(lex("create vpc name=a!b").is_err());
        assert!(lex("x = $").is_err());
        assert!(lex("x = {unclosed").is_err());
    }
}
