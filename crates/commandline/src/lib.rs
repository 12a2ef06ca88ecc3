//! Command templates and input validation.
//!
//! A debugger front-end defines its commands with templates like:
//!
//! ```text
//! TEST (arg [%N]|foo)
//! ```
//!
//! `(...)` is a required group, `[...]` an optional group, `|` separates
//! branches, and placeholders stand for argument classes: `%N` a number
//! (`$` and `0x` hex accepted), `%P` a float, `%S` a string, `%F` a
//! filename. Validation is case-insensitive and reports structured
//! `Validation` errors.

mod template;
mod validation;

use emu_core::Error;

pub use template::{parse_template, Element, Placeholder};

use validation::Tokens;

/// A single command definition.
#[derive(Debug, Clone)]
pub struct Command {
    tag: String,
    elements: Vec<Element>,
}

impl Command {
    /// The command keyword.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }
}

/// A collection of command definitions.
#[derive(Debug, Clone, Default)]
pub struct Commands {
    commands: Vec<Command>,
}

impl Commands {
    /// Parse a set of command templates.
    ///
    /// # Errors
    ///
    /// `Error::Panic` when a template is malformed - template authoring
    /// mistakes are emulator bugs, not user errors.
    pub fn new(templates: &[&str]) -> Result<Self, Error> {
        let mut commands = Vec::with_capacity(templates.len());
        for template in templates {
            commands.push(parse_command(template)?);
        }
        Ok(Self { commands })
    }

    /// Validate an input line against the command definitions.
    ///
    /// # Errors
    ///
    /// `Error::Validation` describing the first problem found.
    pub fn validate(&self, input: &str) -> Result<(), Error> {
        let mut tokens = Tokens::new(input);
        let Some(cmd) = tokens.get() else {
            return Ok(());
        };
        let cmd = cmd.to_uppercase();

        for command in &self.commands {
            if cmd == command.tag {
                validation::validate_sequence(&command.elements, &mut tokens, false)?;

                // anything left in the queue is unrecognised
                if let Some(arg) = tokens.get() {
                    return Err(Error::Validation(format!(
                        "unrecognised argument ({arg})"
                    )));
                }
                return Ok(());
            }
        }

        Err(Error::Validation(format!("unrecognised command ({cmd})")))
    }
}

fn parse_command(template: &str) -> Result<Command, Error> {
    let mut fields = template.split_whitespace();
    let tag = fields
        .next()
        .ok_or_else(|| Error::Panic("empty command template".into()))?
        .to_uppercase();

    let rest: Vec<&str> = fields.collect();
    let elements = parse_template(&rest.join(" "))?;

    Ok(Command { tag, elements })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commands(templates: &[&str]) -> Commands {
        Commands::new(templates).unwrap()
    }

    #[test]
    fn required_group_with_optional_number() {
        let cmds = commands(&["TEST (arg [%N]|foo)"]);

        assert!(cmds.validate("TEST arg 10").is_ok());
        assert!(cmds.validate("TEST arg").is_ok());
        assert!(cmds.validate("TEST foo").is_ok());

        let err = cmds.validate("TEST arg bar").unwrap_err();
        match err {
            Error::Validation(msg) => assert_eq!(msg, "unrecognised argument (bar)"),
            other => panic!("wrong error kind: {other}"),
        }
    }

    #[test]
    fn case_insensitive_matching() {
        let cmds = commands(&["TEST (arg [%N]|foo)"]);
        assert!(cmds.validate("test ARG 10").is_ok());
        assert!(cmds.validate("Test Foo").is_ok());
    }

    #[test]
    fn hex_notation_for_numbers() {
        let cmds = commands(&["PEEK %N"]);
        assert!(cmds.validate("PEEK 0x1ff8").is_ok());
        assert!(cmds.validate("PEEK $1FF8").is_ok());
        assert!(cmds.validate("PEEK 8184").is_ok());
        assert!(cmds.validate("PEEK banana").is_err());
    }

    #[test]
    fn required_argument_missing() {
        let cmds = commands(&["PEEK %N"]);
        let err = cmds.validate("PEEK").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn unknown_command() {
        let cmds = commands(&["TEST"]);
        let err = cmds.validate("NOPE").unwrap_err();
        match err {
            Error::Validation(msg) => assert_eq!(msg, "unrecognised command (NOPE)"),
            other => panic!("wrong error kind: {other}"),
        }
    }

    #[test]
    fn branches_and_nesting() {
        let cmds = commands(&["WATCH (READ|WRITE) %N", "RUN [TO (%N|END)]"]);
        assert!(cmds.validate("WATCH READ 0x80").is_ok());
        assert!(cmds.validate("WATCH WRITE $280").is_ok());
        assert!(cmds.validate("WATCH ANY 0x80").is_err());

        assert!(cmds.validate("RUN").is_ok());
        assert!(cmds.validate("RUN TO 100").is_ok());
        assert!(cmds.validate("RUN TO END").is_ok());
    }

    #[test]
    fn leftover_tokens_rejected() {
        let cmds = commands(&["STEP"]);
        let err = cmds.validate("STEP extra").unwrap_err();
        match err {
            Error::Validation(msg) => assert_eq!(msg, "unrecognised argument (extra)"),
            other => panic!("wrong error kind: {other}"),
        }
    }

    #[test]
    fn float_and_string_placeholders() {
        let cmds = commands(&["GAIN %P", "LABEL %S"]);
        assert!(cmds.validate("GAIN 0.5").is_ok());
        assert!(cmds.validate("GAIN x").is_err());
        assert!(cmds.validate("LABEL anything").is_ok());
    }
}
