//! Parser for the dotted path syntax

use super::{PathStep, PropertyPath};
use crate::error::{Error, Result};
use std::iter::Peekable;
use std::str::CharIndices;

struct Parser<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

pub(super) fn parse(input: &str) -> Result<PropertyPath> {
    if input.is_empty() {
        return Ok(PropertyPath::root());
    }
    Parser {
        input,
        chars: input.char_indices().peekable(),
    }
    .parse()
}

impl<'a> Parser<'a> {
    fn parse(mut self) -> Result<PropertyPath> {
        let mut steps = Vec::new();
        loop {
            steps.push(self.parse_step()?);
            match self.chars.next() {
                None => break,
                Some((_, '.')) => continue,
                Some((position, ch)) => {
                    return Err(self.error(position, format!("expected '.', found '{}'", ch)))
                }
            }
        }
        Ok(PropertyPath::from_steps(steps))
    }

    fn parse_step(&mut self) -> Result<PathStep> {
        let name = match self.chars.peek() {
            Some(&(_, '"')) => self.parse_quoted()?,
            _ => self.parse_bare()?,
        };

        let index = match self.chars.peek() {
            Some(&(_, '[')) => {
                self.chars.next();
                Some(self.parse_index()?)
            }
            _ => None,
        };
        Ok(PathStep { name, index })
    }

    fn parse_bare(&mut self) -> Result<String> {
        let start = self.position();
        let mut name = String::new();
        while let Some(&(_, ch)) = self.chars.peek() {
            if matches!(ch, '.' | '[' | ']') {
                break;
            }
            name.push(ch);
            self.chars.next();
        }
        if name.is_empty() {
            return Err(self.error(start, "empty property name"));
        }
        Ok(name)
    }

    /// `"..."` with `\"` and `\\` escapes; may be empty
    fn parse_quoted(&mut self) -> Result<String> {
        self.chars.next();
        let mut name = String::new();
        loop {
            match self.chars.next() {
                Some((_, '"')) => return Ok(name),
                Some((position, '\\')) => match self.chars.next() {
                    Some((_, ch @ ('"' | '\\'))) => name.push(ch),
                    Some((_, ch)) => {
                        return Err(self.error(position, format!("invalid escape '\\{}'", ch)))
                    }
                    None => return Err(self.error(self.input.len(), "unterminated name")),
                },
                Some((_, ch)) => name.push(ch),
                None => return Err(self.error(self.input.len(), "unterminated name")),
            }
        }
    }

    fn parse_index(&mut self) -> Result<usize> {
        let start = self.position();
        let mut digits = String::new();
        loop {
            match self.chars.next() {
                Some((_, ']')) => break,
                Some((_, ch)) if ch.is_ascii_digit() => digits.push(ch),
                Some((position, ch)) => {
                    return Err(self.error(position, format!("invalid index character '{}'", ch)))
                }
                None => return Err(self.error(self.input.len(), "unterminated index")),
            }
        }
        if digits.is_empty() {
            return Err(self.error(start, "empty index"));
        }
        digits
            .parse()
            .map_err(|_| self.error(start, format!("index {} out of range", digits)))
    }

    fn position(&mut self) -> usize {
        self.chars
            .peek()
            .map(|&(position, _)| position)
            .unwrap_or(self.input.len())
    }

    fn error(&self, position: usize, message: impl Into<String>) -> Error {
        Error::PathParse {
            input: self.input.to_string(),
            position,
            message: message.into(),
        }
    }
}
