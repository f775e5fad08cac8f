//! Grammar check for placeholder text: `IDENT ('.' IDENT)*`.

use std::iter::Peekable;
use std::str::CharIndices;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Ident(&'a str),
    Period,
    Invalid(char),
}

struct Lexer<'a> {
    text: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            chars: text.char_indices().peekable(),
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        while self.chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}

        let (start, c) = self.chars.next()?;
        let token = match c {
            '.' => Token::Period,
            c if c == '_' || is_letter(c) => {
                let mut end = start + c.len_utf8();
                while let Some((i, c)) = self
                    .chars
                    .next_if(|&(_, c)| c == '_' || is_letter(c) || c.is_ascii_digit())
                {
                    end = i + c.len_utf8();
                }
                Token::Ident(&self.text[start..end])
            }
            c => Token::Invalid(c),
        };
        Some(token)
    }
}

// Letter-numbers such as `Ⅻ` are alphabetic but not letters.
fn is_letter(c: char) -> bool {
    c.is_alphabetic() && !c.is_numeric()
}

/// Validates placeholder text and returns it normalized.
///
/// Whitespace between tokens is dropped, so `user . id` comes back as
/// `user.id`.
///
/// ```
/// use sqlx_path_bind::ident::validate_identifier;
///
/// assert_eq!(validate_identifier("user.address.zip")?, "user.address.zip");
/// assert!(validate_identifier("id..name").is_err());
/// # Ok::<(), sqlx_path_bind::Error>(())
/// ```
pub fn validate_identifier(text: &str) -> Result<String> {
    if text.is_empty() {
        return Err(Error::EmptyIdentifier(text.to_string()));
    }
    if text.contains(';') {
        return Err(Error::IllegalCharacter(text.to_string()));
    }

    let mut identifier = String::with_capacity(text.len());
    let mut first = true;
    let mut last_period = false;
    for token in Lexer::new(text) {
        tracing::trace!(?token, "identifier token");
        match token {
            Token::Ident(lit) => {
                if !first && !last_period {
                    return Err(Error::MissingPathSeparator(text.to_string()));
                }
                first = false;
                last_period = false;
                identifier.push_str(lit);
            }
            Token::Period => {
                if first || last_period {
                    return Err(Error::MalformedPath(text.to_string()));
                }
                last_period = true;
                identifier.push('.');
            }
            Token::Invalid(_) => {
                return Err(Error::InvalidIdentifierCharacter(text.to_string()));
            }
        }
    }

    if first {
        return Err(Error::EmptyIdentifier(text.to_string()));
    }
    if last_period {
        return Err(Error::MalformedPath(text.to_string()));
    }
    Ok(identifier)
}
