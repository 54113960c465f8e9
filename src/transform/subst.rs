use std::io::{self, BufRead, BufReader, Read};
use std::mem;
use std::str;
use std::sync::Arc;

use regex::Regex;

use crate::error::{LoadError, Result};
use crate::stream::ReadChannel;

use super::Transformer;

/// One sed-like rule: `s/pattern/replacement/` with an optional trailing
/// `g` to replace every occurrence instead of the first. Any delimiter
/// character works, and a delimiter inside the pattern can be escaped with
/// a backslash.
#[derive(Debug, Clone)]
pub struct Substitution {
    pattern: Regex,
    replacement: String,
    global: bool,
}

impl Substitution {
    pub fn parse(rule: &str) -> Result<Self> {
        let invalid = |message: &str| LoadError::InvalidRule {
            rule: rule.to_string(),
            source: regex::Error::Syntax(message.to_string()),
        };

        let rest = rule
            .strip_prefix('s')
            .ok_or_else(|| invalid("substitution must start with 's'"))?;
        let mut chars = rest.chars();
        let delimiter = chars
            .next()
            .ok_or_else(|| invalid("substitution is missing its delimiter"))?;
        let parts = split_unescaped(chars.as_str(), delimiter);
        if parts.len() < 2 {
            return Err(invalid("substitution needs a pattern and a replacement"));
        }

        let pattern = Regex::new(&parts[0]).map_err(|source| LoadError::InvalidRule {
            rule: rule.to_string(),
            source,
        })?;
        let flags = parts.get(2).map(String::as_str).unwrap_or("");
        Ok(Substitution {
            pattern,
            replacement: parts[1].clone(),
            global: flags.contains('g'),
        })
    }

    /// Apply to one line of text, without its trailing newline.
    pub fn apply(&self, line: &str) -> String {
        if self.global {
            self.pattern
                .replace_all(line, self.replacement.as_str())
                .into_owned()
        } else {
            self.pattern
                .replace(line, self.replacement.as_str())
                .into_owned()
        }
    }
}

/// Split on `delimiter`, honoring backslash escapes of the delimiter.
fn split_unescaped(input: &str, delimiter: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' && chars.peek() == Some(&delimiter) {
            current.push(delimiter);
            chars.next();
        } else if c == delimiter {
            parts.push(mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    parts.push(current);
    parts
}

/// A [`Transformer`] applying sed-like substitutions line by line.
///
/// Only the current line is ever buffered, so chunked reads produce
/// exactly the bytes a whole-resource read would. Rules apply to each line
/// in the order given; lines that are not valid UTF-8 pass through
/// untouched.
pub struct SubstitutionTransformer {
    name: String,
    rules: Arc<[Substitution]>,
}

impl SubstitutionTransformer {
    pub fn new(name: impl Into<String>, rules: Vec<Substitution>) -> Self {
        SubstitutionTransformer {
            name: name.into(),
            rules: rules.into(),
        }
    }

    /// Shorthand for a transformer with a single parsed rule.
    pub fn single(name: impl Into<String>, rule: &str) -> Result<Self> {
        Ok(Self::new(name, vec![Substitution::parse(rule)?]))
    }
}

impl Transformer for SubstitutionTransformer {
    fn name(&self) -> &str {
        &self.name
    }

    fn attach(&self, channel: ReadChannel) -> ReadChannel {
        Box::new(SubstitutionReader {
            inner: BufReader::new(channel),
            rules: Arc::clone(&self.rules),
            pending: io::Cursor::new(Vec::new()),
        })
    }
}

struct SubstitutionReader {
    inner: BufReader<ReadChannel>,
    rules: Arc<[Substitution]>,
    pending: io::Cursor<Vec<u8>>,
}

impl Read for SubstitutionReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            let n = self.pending.read(buf)?;
            if n > 0 || buf.is_empty() {
                return Ok(n);
            }
            let mut line = Vec::new();
            if self.inner.read_until(b'\n', &mut line)? == 0 {
                return Ok(0);
            }
            self.pending = io::Cursor::new(rewrite_line(&line, &self.rules));
        }
    }
}

fn rewrite_line(line: &[u8], rules: &[Substitution]) -> Vec<u8> {
    let (content, newline) = match line.split_last() {
        Some((&b'\n', content)) => (content, true),
        _ => (line, false),
    };
    let text = match str::from_utf8(content) {
        Ok(text) => text,
        Err(_) => return line.to_vec(),
    };
    let mut rewritten = text.to_string();
    for rule in rules {
        rewritten = rule.apply(&rewritten);
    }
    let mut out = rewritten.into_bytes();
    if newline {
        out.push(b'\n');
    }
    out
}
