//! Command line tokenizer.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub name: String,
    pub args: Vec<String>,
    pub flags: Vec<String>,
    pub raw: String,
}

impl ParsedCommand {
    pub fn has_flag(&self, names: &[&str]) -> bool {
        self.flags.iter().any(|flag| names.contains(&flag.as_str()))
    }

    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Empty command")]
    Empty,

    #[error("Unterminated quoted string")]
    UnterminatedQuote,
}

fn tokenize(input: &str) -> Result<Vec<String>, ParseError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    for c in input.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c.is_whitespace() => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            None => current.push(c),
        }
    }

    if quote.is_some() {
        return Err(ParseError::UnterminatedQuote);
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    Ok(tokens)
}

/// Split a command line into a name, positional args and `-` flags.
pub fn parse_command(input: &str) -> Result<ParsedCommand, ParseError> {
    let tokens = tokenize(input.trim())?;
    let mut tokens = tokens.into_iter();
    let name = tokens.next().ok_or(ParseError::Empty)?;

    let (flags, args) = tokens.partition(|t| t.starts_with('-') && t != "-");

    Ok(ParsedCommand {
        name,
        args,
        flags,
        raw: input.to_string(),
    })
}
