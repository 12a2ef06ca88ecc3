//! Command template parsing.

use emu_core::Error;

/// Argument-class placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// `%N` - an integer; `$` and `0x` prefixes select hexadecimal.
    Number,
    /// `%P` - a float.
    Float,
    /// `%S` - any string.
    String,
    /// `%F` - a filename (existence is not checked at validation time).
    File,
}

/// One element of a command template.
#[derive(Debug, Clone)]
pub enum Element {
    /// A literal keyword, stored upper-case.
    Keyword(String),
    /// An argument placeholder.
    Placeholder(Placeholder),
    /// A `(...)` or `[...]` group of alternative branches.
    Group {
        optional: bool,
        branches: Vec<Vec<Element>>,
    },
}

impl Element {
    /// Short description used in "required" error messages.
    pub(crate) fn verbose(&self) -> String {
        match self {
            Element::Keyword(kw) => kw.clone(),
            Element::Placeholder(Placeholder::Number) => "numeric argument".into(),
            Element::Placeholder(Placeholder::Float) => "numeric argument".into(),
            Element::Placeholder(Placeholder::String) => "argument".into(),
            Element::Placeholder(Placeholder::File) => "filename".into(),
            Element::Group { .. } => "argument".into(),
        }
    }
}

/// Parse the argument portion of a command template (everything after
/// the command tag).
///
/// # Errors
///
/// `Error::Panic` on unbalanced groups or stray separators - malformed
/// templates are emulator bugs.
pub fn parse_template(template: &str) -> Result<Vec<Element>, Error> {
    let tokens = tokenize(template);
    let mut pos = 0;
    let elements = parse_sequence(&tokens, &mut pos, None)?;
    if pos != tokens.len() {
        return Err(Error::Panic(format!(
            "unbalanced group in template ({template})"
        )));
    }
    Ok(elements)
}

#[derive(Debug, PartialEq)]
enum Token {
    Word(String),
    Open(bool),  // optional?
    Close(bool), // optional?
    Pipe,
}

fn tokenize(template: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut word = String::new();

    for ch in template.chars() {
        match ch {
            '(' | '[' | ')' | ']' | '|' => {
                if !word.is_empty() {
                    tokens.push(Token::Word(std::mem::take(&mut word)));
                }
                tokens.push(match ch {
                    '(' => Token::Open(false),
                    '[' => Token::Open(true),
                    ')' => Token::Close(false),
                    ']' => Token::Close(true),
                    _ => Token::Pipe,
                });
            }
            c if c.is_whitespace() => {
                if !word.is_empty() {
                    tokens.push(Token::Word(std::mem::take(&mut word)));
                }
            }
            c => word.push(c),
        }
    }
    if !word.is_empty() {
        tokens.push(Token::Word(word));
    }
    tokens
}

/// Parse a sequence of elements until the matching group closer (or the
/// end of the template at the top level). Leaves `pos` on the closer or
/// pipe for the caller.
fn parse_sequence(
    tokens: &[Token],
    pos: &mut usize,
    closing: Option<bool>,
) -> Result<Vec<Element>, Error> {
    let mut elements = Vec::new();

    while *pos < tokens.len() {
        match &tokens[*pos] {
            Token::Word(w) => {
                elements.push(parse_word(w)?);
                *pos += 1;
            }
            Token::Open(optional) => {
                let optional = *optional;
                *pos += 1;
                let branches = parse_branches(tokens, pos, optional)?;
                elements.push(Element::Group { optional, branches });
            }
            Token::Close(_) | Token::Pipe => {
                if closing.is_none() {
                    return Err(Error::Panic("unexpected group separator".into()));
                }
                return Ok(elements);
            }
        }
    }

    if closing.is_some() {
        return Err(Error::Panic("unterminated group".into()));
    }
    Ok(elements)
}

/// Parse the `|`-separated branches of a group up to and including its
/// closer.
fn parse_branches(
    tokens: &[Token],
    pos: &mut usize,
    optional: bool,
) -> Result<Vec<Vec<Element>>, Error> {
    let mut branches = Vec::new();

    loop {
        let branch = parse_sequence(tokens, pos, Some(optional))?;
        branches.push(branch);

        match tokens.get(*pos) {
            Some(Token::Pipe) => {
                *pos += 1;
            }
            Some(Token::Close(opt)) if *opt == optional => {
                *pos += 1;
                return Ok(branches);
            }
            _ => return Err(Error::Panic("unterminated group".into())),
        }
    }
}

fn parse_word(word: &str) -> Result<Element, Error> {
    Ok(match word {
        "%N" => Element::Placeholder(Placeholder::Number),
        "%P" => Element::Placeholder(Placeholder::Float),
        "%S" => Element::Placeholder(Placeholder::String),
        "%F" => Element::Placeholder(Placeholder::File),
        w if w.starts_with('%') => {
            return Err(Error::Panic(format!("unknown placeholder ({w})")));
        }
        w => Element::Keyword(w.to_uppercase()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_sequence() {
        let elements = parse_template("READ %N").unwrap();
        assert_eq!(elements.len(), 2);
        assert!(matches!(&elements[0], Element::Keyword(k) if k == "READ"));
        assert!(matches!(
            elements[1],
            Element::Placeholder(Placeholder::Number)
        ));
    }

    #[test]
    fn group_with_branches() {
        let elements = parse_template("(arg [%N]|foo)").unwrap();
        assert_eq!(elements.len(), 1);
        let Element::Group { optional, branches } = &elements[0] else {
            panic!("expected group");
        };
        assert!(!optional);
        assert_eq!(branches.len(), 2);
        assert_eq!(branches[0].len(), 2);
        assert_eq!(branches[1].len(), 1);
        assert!(matches!(
            &branches[0][1],
            Element::Group { optional: true, .. }
        ));
    }

    #[test]
    fn malformed_templates() {
        assert!(parse_template("(unclosed").is_err());
        assert!(parse_template("mismatched]").is_err());
        assert!(parse_template("(wrong]").is_err());
        assert!(parse_template("%Q").is_err());
    }
}
