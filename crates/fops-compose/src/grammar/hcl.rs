//! Structural HCL parser.
//!
//! Checks what composition can get wrong: balanced brackets, terminated
//! strings, interpolations, comments and heredocs, and well-formed top-level
//! statements (`name = value` or `type "label" { ... }`). Expressions are
//! not type-checked.

use fops_core::errors::CompositionError;

use super::{failure, Grammar};

/// Top-level statements of a parsed file, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HclBody {
    pub blocks: Vec<String>,
    pub attributes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HclError {
    pub line: usize,
    pub message: String,
}

pub fn check(file: &str, text: &str) -> Result<(), CompositionError> {
    parse(text)
        .map(|_| ())
        .map_err(|e| failure(file, Grammar::Hcl, e.line, e.message))
}

pub fn parse(text: &str) -> Result<HclBody, HclError> {
    let mut parser = Parser {
        chars: text.chars().collect(),
        pos: 0,
        line: 1,
        stack: Vec::new(),
        state: Statement::Start,
        pending: None,
        body: HclBody::default(),
    };
    parser.run()?;
    Ok(parser.body)
}

#[derive(Debug, Clone, Copy)]
enum Frame {
    Bracket { open: char, line: usize },
    Interp { line: usize },
    Str { line: usize },
}

/// Where a top-level statement is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Statement {
    Start,
    Header,
    Value,
    AfterBlock,
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    stack: Vec<Frame>,
    state: Statement,
    pending: Option<String>,
    body: HclBody,
}

fn err(line: usize, message: impl Into<String>) -> HclError {
    HclError {
        line,
        message: message.into(),
    }
}

impl Parser {
    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek(0)?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn run(&mut self) -> Result<(), HclError> {
        while let Some(c) = self.peek(0) {
            if matches!(self.stack.last(), Some(Frame::Str { .. })) {
                self.string_char()?;
            } else {
                self.code_char(c)?;
            }
        }

        if let Some(frame) = self.stack.last() {
            return Err(match *frame {
                Frame::Str { line } => err(line, "unterminated string"),
                Frame::Interp { line } => err(line, "unterminated interpolation"),
                Frame::Bracket { open, line } => err(line, format!("unclosed '{open}'")),
            });
        }
        if self.state == Statement::Header {
            let name = self.pending.clone().unwrap_or_default();
            return Err(err(self.line, format!("incomplete statement '{name}'")));
        }
        Ok(())
    }

    fn string_char(&mut self) -> Result<(), HclError> {
        let line = self.line;
        match self.bump() {
            Some('\\') => {
                self.bump();
            }
            Some('"') => {
                self.stack.pop();
            }
            Some('\n') => return Err(err(line, "unterminated string")),
            Some(c @ ('$' | '%')) => {
                if self.peek(0) == Some(c) && self.peek(1) == Some('{') {
                    // `$${` is a literal `${`.
                    self.pos += 2;
                } else if self.peek(0) == Some('{') {
                    self.pos += 1;
                    self.stack.push(Frame::Interp { line });
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn code_char(&mut self, c: char) -> Result<(), HclError> {
        let line = self.line;
        if c == '#' || (c == '/' && self.peek(1) == Some('/')) {
            while self.peek(0).is_some_and(|c| c != '\n') {
                self.pos += 1;
            }
            return Ok(());
        }
        if c == '/' && self.peek(1) == Some('*') {
            return self.block_comment();
        }
        let top_level = self.stack.is_empty();
        if c == '<' && self.peek(1) == Some('<') && (!top_level || self.state == Statement::Value) {
            return self.heredoc();
        }
        if top_level {
            return self.statement_char(c);
        }

        self.bump();
        match c {
            '"' => self.stack.push(Frame::Str { line }),
            '{' | '[' | '(' => self.stack.push(Frame::Bracket { open: c, line }),
            '}' | ']' | ')' => self.close(c, line)?,
            _ => {}
        }
        Ok(())
    }

    fn statement_char(&mut self, c: char) -> Result<(), HclError> {
        let line = self.line;
        match self.state {
            Statement::Start => {
                if c.is_whitespace() {
                    self.bump();
                } else if c.is_ascii_alphabetic() || c == '_' {
                    let word = self.read_ident();
                    self.pending = Some(word);
                    self.state = Statement::Header;
                } else {
                    return Err(err(line, format!("unexpected '{c}' at top level")));
                }
            }
            Statement::Header => {
                let name = self.pending.clone().unwrap_or_default();
                match c {
                    '\n' => return Err(err(line, format!("incomplete statement '{name}'"))),
                    ' ' | '\t' | '\r' => {
                        self.bump();
                    }
                    '"' => {
                        self.bump();
                        self.stack.push(Frame::Str { line });
                    }
                    '=' => {
                        self.bump();
                        self.body.attributes.push(name);
                        self.pending = None;
                        self.state = Statement::Value;
                    }
                    '{' => {
                        self.bump();
                        self.body.blocks.push(name);
                        self.pending = None;
                        self.stack.push(Frame::Bracket { open: c, line });
                        self.state = Statement::AfterBlock;
                    }
                    c if c.is_ascii_alphabetic() || c == '_' => {
                        self.read_ident();
                    }
                    _ => return Err(err(line, format!("unexpected '{c}' after '{name}'"))),
                }
            }
            Statement::Value => {
                self.bump();
                match c {
                    '\n' => self.state = Statement::Start,
                    '"' => self.stack.push(Frame::Str { line }),
                    '{' | '[' | '(' => self.stack.push(Frame::Bracket { open: c, line }),
                    '}' | ']' | ')' => self.close(c, line)?,
                    _ => {}
                }
            }
            Statement::AfterBlock => {
                if c == '\n' {
                    self.bump();
                    self.state = Statement::Start;
                } else if c.is_whitespace() {
                    self.bump();
                } else {
                    return Err(err(line, format!("unexpected '{c}' after block")));
                }
            }
        }
        Ok(())
    }

    fn close(&mut self, c: char, line: usize) -> Result<(), HclError> {
        match self.stack.last().copied() {
            Some(Frame::Bracket { open, .. })
                if matches!((open, c), ('{', '}') | ('[', ']') | ('(', ')')) =>
            {
                self.stack.pop();
                Ok(())
            }
            Some(Frame::Interp { .. }) if c == '}' => {
                self.stack.pop();
                Ok(())
            }
            Some(Frame::Bracket { open, line: opened }) => Err(err(
                line,
                format!("'{c}' does not close '{open}' opened at line {opened}"),
            )),
            _ => Err(err(line, format!("unexpected '{c}'"))),
        }
    }

    fn read_ident(&mut self) -> String {
        let mut word = String::new();
        while let Some(c) = self.peek(0) {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                word.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        word
    }

    fn block_comment(&mut self) -> Result<(), HclError> {
        let start = self.line;
        self.pos += 2;
        loop {
            match self.bump() {
                Some('*') if self.peek(0) == Some('/') => {
                    self.pos += 1;
                    return Ok(());
                }
                Some(_) => {}
                None => return Err(err(start, "unterminated comment")),
            }
        }
    }

    fn heredoc(&mut self) -> Result<(), HclError> {
        let start = self.line;
        self.pos += 2;
        if self.peek(0) == Some('-') {
            self.pos += 1;
        }
        let marker = self.read_ident();
        if marker.is_empty() {
            return Err(err(start, "heredoc without marker"));
        }
        // Rest of the opening line.
        while self.peek(0).is_some_and(|c| c != '\n') {
            self.pos += 1;
        }
        if self.bump().is_none() {
            return Err(err(start, format!("unterminated heredoc <<{marker}")));
        }
        loop {
            let begin = self.pos;
            while self.peek(0).is_some_and(|c| c != '\n') {
                self.pos += 1;
            }
            let content: String = self.chars[begin..self.pos].iter().collect();
            if content.trim() == marker {
                return Ok(());
            }
            if self.bump().is_none() {
                return Err(err(start, format!("unterminated heredoc <<{marker}")));
            }
        }
    }
}
