//! Input validation against parsed templates.

use emu_core::Error;

use crate::template::{Element, Placeholder};

/// The token queue for one input line.
#[derive(Debug)]
pub(crate) struct Tokens {
    tokens: Vec<String>,
    cursor: usize,
}

impl Tokens {
    pub(crate) fn new(input: &str) -> Self {
        Self {
            tokens: input.split_whitespace().map(str::to_string).collect(),
            cursor: 0,
        }
    }

    /// Take the next token from the queue.
    pub(crate) fn get(&mut self) -> Option<String> {
        let tok = self.tokens.get(self.cursor).cloned();
        if tok.is_some() {
            self.cursor += 1;
        }
        tok
    }

    fn position(&self) -> usize {
        self.cursor
    }

    fn rewind(&mut self, position: usize) {
        self.cursor = position;
    }
}

/// Validate a token queue against a sequence of template elements.
///
/// `speculative` marks branch attempts: failures are expected and the
/// caller will rewind and try an alternative.
pub(crate) fn validate_sequence(
    elements: &[Element],
    tokens: &mut Tokens,
    speculative: bool,
) -> Result<(), Error> {
    for element in elements {
        validate_element(element, tokens, speculative)?;
    }
    Ok(())
}

fn validate_element(
    element: &Element,
    tokens: &mut Tokens,
    speculative: bool,
) -> Result<(), Error> {
    match element {
        Element::Keyword(keyword) => {
            let Some(tok) = tokens.get() else {
                return Err(Error::Validation(format!("{} required", element.verbose())));
            };
            if tok.to_uppercase() == *keyword {
                Ok(())
            } else {
                Err(Error::Validation(format!("unrecognised argument ({tok})")))
            }
        }

        Element::Placeholder(placeholder) => {
            let Some(tok) = tokens.get() else {
                return Err(Error::Validation(format!("{} required", element.verbose())));
            };
            if placeholder_matches(*placeholder, &tok) {
                Ok(())
            } else {
                Err(Error::Validation(format!("unrecognised argument ({tok})")))
            }
        }

        Element::Group { optional, branches } => {
            let start = tokens.position();

            let mut first_failure = None;
            for branch in branches {
                tokens.rewind(start);
                match validate_sequence(branch, tokens, true) {
                    Ok(()) => return Ok(()),
                    Err(err) => {
                        if first_failure.is_none() {
                            first_failure = Some(err);
                        }
                    }
                }
            }

            // no branch matched. an optional group simply doesn't
            // consume anything; a required group propagates the failure
            tokens.rewind(start);
            if *optional {
                Ok(())
            } else if speculative {
                Err(first_failure
                    .unwrap_or_else(|| Error::Validation("argument required".into())))
            } else {
                match tokens.get() {
                    Some(tok) => Err(Error::Validation(format!("unrecognised argument ({tok})"))),
                    None => Err(Error::Validation(format!("{} required", element.verbose()))),
                }
            }
        }
    }
}

/// Whether a token satisfies a placeholder. `%N` normalises `$` and
/// `0x` hex notation.
fn placeholder_matches(placeholder: Placeholder, token: &str) -> bool {
    match placeholder {
        Placeholder::Number => parse_number(token).is_some(),
        Placeholder::Float => token.parse::<f32>().is_ok(),
        Placeholder::String | Placeholder::File => true,
    }
}

pub(crate) fn parse_number(token: &str) -> Option<i64> {
    if let Some(hex) = token.strip_prefix('$') {
        i64::from_str_radix(hex, 16).ok()
    } else if let Some(hex) = token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16).ok()
    } else {
        token.parse::<i64>().ok()
    }
}
