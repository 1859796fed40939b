//! Grammar file parser.
//!
//! The accepted format is a small line-oriented command grammar:
//!
//! ```text
//! # comment, starting with the engine's comment character
//! CLICON_MODE="operation";
//! show("Show information") {
//!     version, show_version();
//!     interface <name:string>("Interface name"), show_interface("brief");
//! }
//! ```
//!
//! A statement is a chain of elements, each a child of the previous one,
//! optionally followed by `, callback(args)` and closed by `;` or by a
//! `{ ... }` block holding statements nested under the last element.

use super::tree::{Callback, CommandNode, Globals, ParseTree, VarType};
use crate::error::CliError;
use crate::Result;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Word(String),
    Str(String),
    Punct(char),
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Word(w) => format!("'{}'", w),
            Token::Str(s) => format!("string \"{}\"", s),
            Token::Punct(c) => format!("'{}'", c),
        }
    }
}

const PUNCT: &[char] = &[';', ',', '{', '}', '(', ')', '<', '>', '=', ':'];

/// Deepest command nesting a grammar may produce, counting chain elements
/// and block levels alike.
pub const MAX_NESTING: usize = 128;

/// Parse grammar text into a tree and its global assignments.
///
/// `name` is only used in error messages. Lines whose first non-blank
/// character is `comment` are ignored.
pub fn parse_grammar(text: &str, name: &str, comment: char) -> Result<(ParseTree, Globals)> {
    let tokens = tokenize(text, name, comment)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        name,
        last_line: text.lines().count().max(1),
        depth: 0,
    };
    parser.parse_file()
}

fn tokenize(text: &str, name: &str, comment: char) -> Result<Vec<(Token, usize)>> {
    let mut tokens = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        let lineno = idx + 1;
        if line.trim_start().starts_with(comment) {
            continue;
        }

        let mut chars = line.chars().peekable();
        while let Some(&c) = chars.peek() {
            if c.is_whitespace() {
                chars.next();
            } else if c == '"' {
                chars.next();
                let mut value = String::new();
                let mut closed = false;
                while let Some(c) = chars.next() {
                    match c {
                        '"' => {
                            closed = true;
                            break;
                        }
                        '\\' => match chars.next() {
                            Some('n') => value.push('\n'),
                            Some('t') => value.push('\t'),
                            Some(other) => value.push(other),
                            None => break,
                        },
                        other => value.push(other),
                    }
                }
                if !closed {
                    return Err(parse_error(name, lineno, "unterminated string"));
                }
                tokens.push((Token::Str(value), lineno));
            } else if PUNCT.contains(&c) {
                chars.next();
                tokens.push((Token::Punct(c), lineno));
            } else {
                let mut word = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_whitespace() || c == '"' || PUNCT.contains(&c) {
                        break;
                    }
                    word.push(c);
                    chars.next();
                }
                tokens.push((Token::Word(word), lineno));
            }
        }
    }

    Ok(tokens)
}

fn parse_error(name: &str, line: usize, message: impl Into<String>) -> CliError {
    CliError::GrammarParse {
        name: name.to_string(),
        line,
        message: message.into(),
    }
}

struct Parser<'a> {
    tokens: Vec<(Token, usize)>,
    pos: usize,
    name: &'a str,
    last_line: usize,
    depth: usize,
}

impl Parser<'_> {
    fn parse_file(&mut self) -> Result<(ParseTree, Globals)> {
        let mut tree = ParseTree::new();
        let mut globals = Globals::new();

        while self.peek().is_some() {
            if self.at_assignment() {
                let (name, value) = self.parse_assignment()?;
                globals.push(name, value);
            } else {
                tree.insert(self.parse_statement()?);
            }
        }

        Ok((tree, globals))
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn line(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|(_, l)| *l)
            .unwrap_or(self.last_line)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|(t, _)| t.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn error(&self, message: impl Into<String>) -> CliError {
        parse_error(self.name, self.line(), message)
    }

    fn expect_punct(&mut self, expected: char) -> Result<()> {
        match self.peek() {
            Some(Token::Punct(c)) if *c == expected => {
                self.pos += 1;
                Ok(())
            }
            Some(other) => Err(self.error(format!(
                "expected '{}', found {}",
                expected,
                other.describe()
            ))),
            None => Err(self.error(format!("expected '{}', found end of input", expected))),
        }
    }

    fn expect_word(&mut self, what: &str) -> Result<String> {
        match self.peek() {
            Some(Token::Word(w)) => {
                let w = w.clone();
                self.pos += 1;
                Ok(w)
            }
            Some(other) => Err(self.error(format!("expected {}, found {}", what, other.describe()))),
            None => Err(self.error(format!("expected {}, found end of input", what))),
        }
    }

    fn expect_string(&mut self, what: &str) -> Result<String> {
        match self.peek() {
            Some(Token::Str(s)) => {
                let s = s.clone();
                self.pos += 1;
                Ok(s)
            }
            Some(other) => Err(self.error(format!("expected {}, found {}", what, other.describe()))),
            None => Err(self.error(format!("expected {}, found end of input", what))),
        }
    }

    fn at_punct(&self, c: char) -> bool {
        matches!(self.peek(), Some(Token::Punct(p)) if *p == c)
    }

    fn at_assignment(&self) -> bool {
        matches!(
            (self.tokens.get(self.pos), self.tokens.get(self.pos + 1)),
            (Some((Token::Word(_), _)), Some((Token::Punct('='), _)))
        )
    }

    fn parse_assignment(&mut self) -> Result<(String, String)> {
        let name = self.expect_word("global name")?;
        self.expect_punct('=')?;
        let value = self.expect_string("quoted value")?;
        self.expect_punct(';')?;
        Ok((name, value))
    }

    fn parse_statement(&mut self) -> Result<CommandNode> {
        let mut chain = vec![self.parse_element()?];
        while matches!(self.peek(), Some(Token::Word(_)) | Some(Token::Punct('<'))) {
            chain.push(self.parse_element()?);
        }
        if self.depth + chain.len() > MAX_NESTING {
            return Err(self.error(format!(
                "commands nested deeper than {} levels",
                MAX_NESTING
            )));
        }

        if self.at_punct(',') {
            self.next();
            let callback = self.parse_callback()?;
            if let Some(last) = chain.last_mut() {
                last.callback = Some(callback);
            }
        }

        if self.at_punct('{') {
            self.next();
            let mut block = ParseTree::new();
            self.depth += chain.len();
            while !self.at_punct('}') {
                if self.peek().is_none() {
                    return Err(self.error("unterminated block, expected '}'"));
                }
                block.insert(self.parse_statement()?);
            }
            self.depth -= chain.len();
            self.next();
            // A trailing ';' after a block is tolerated.
            if self.at_punct(';') {
                self.next();
            }
            if let Some(last) = chain.last_mut() {
                last.children.merge(block);
            }
        } else {
            self.expect_punct(';')?;
        }

        Ok(fold_chain(chain))
    }

    fn parse_element(&mut self) -> Result<CommandNode> {
        let mut node = match self.next() {
            Some(Token::Word(word)) => CommandNode::keyword(word),
            Some(Token::Punct('<')) => {
                let name = self.expect_word("variable name")?;
                self.expect_punct(':')?;
                let type_name = self.expect_word("variable type")?;
                let var_type = VarType::from_name(&type_name)
                    .ok_or_else(|| self.error(format!("unknown variable type '{}'", type_name)))?;
                self.expect_punct('>')?;
                CommandNode::variable(name, var_type)
            }
            Some(other) => {
                self.pos -= 1;
                return Err(self.error(format!("expected command, found {}", other.describe())));
            }
            None => return Err(self.error("expected command, found end of input")),
        };

        if self.at_punct('(') {
            self.next();
            node.help = Some(self.expect_string("help text")?);
            self.expect_punct(')')?;
        }

        Ok(node)
    }

    fn parse_callback(&mut self) -> Result<Callback> {
        let mut callback = Callback::new(self.expect_word("callback name")?);
        self.expect_punct('(')?;
        if !self.at_punct(')') {
            loop {
                callback.args.push(self.expect_string("callback argument")?);
                if self.at_punct(',') {
                    self.next();
                } else {
                    break;
                }
            }
        }
        self.expect_punct(')')?;
        Ok(callback)
    }
}

/// Nest a chain `a b c` into `a { b { c } }`.
fn fold_chain(chain: Vec<CommandNode>) -> CommandNode {
    let mut iter = chain.into_iter().rev();
    // parse_statement always yields at least one element
    let mut node = iter.next().unwrap_or_else(|| CommandNode::keyword(""));
    for mut parent in iter {
        parent.children.insert(node);
        node = parent;
    }
    node
}
