//! Structural scanner for existing PHP files.
//!
//! This is not a PHP parser. It tracks brace depth (skipping strings,
//! heredocs and comments) well enough to split a file into its top-level functions, or a
//! class into its members, so that regenerated code can be merged in while
//! hand-written code is kept verbatim.

use crate::php::{ClassMember, MemberKind, PhpFunction};
use hookwright_types::{GenerationError, Result};
use regex::Regex;

/// A piece of a procedural file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// A top-level function with its leading docblock
    Function(PhpFunction),
    /// Anything else, verbatim
    Other(Vec<String>),
}

/// A procedural file split into segments.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedProcedural {
    /// Segments in file order
    pub segments: Vec<Segment>,
}

impl ParsedProcedural {
    /// Names of all top-level functions, in file order.
    pub fn function_names(&self) -> Vec<&str> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Function(f) => Some(f.name.as_str()),
                Segment::Other(_) => None,
            })
            .collect()
    }

    /// Whether a function exists.
    pub fn has_function(&self, name: &str) -> bool {
        self.function_names().contains(&name)
    }

    /// Replace a function wholesale. Returns false if it does not exist.
    pub fn replace_function(&mut self, function: PhpFunction) -> bool {
        for segment in &mut self.segments {
            if let Segment::Function(existing) = segment {
                if existing.name == function.name {
                    *existing = function;
                    return true;
                }
            }
        }
        false
    }

    /// Insert a function directly after another one.
    ///
    /// Falls back to appending when `anchor` does not exist.
    pub fn insert_after(&mut self, anchor: &str, function: PhpFunction) {
        let position = self
            .segments
            .iter()
            .position(|s| matches!(s, Segment::Function(f) if f.name == anchor));
        match position {
            Some(index) => {
                self.segments
                    .insert(index + 1, Segment::Other(vec![String::new()]));
                self.segments.insert(index + 2, Segment::Function(function));
            }
            None => self.append(function),
        }
    }

    /// Append a function at the end of the file.
    pub fn append(&mut self, function: PhpFunction) {
        if let Some(Segment::Other(lines)) = self.segments.last_mut() {
            while lines.last().map_or(false, |l| l.trim().is_empty()) {
                lines.pop();
            }
        }
        if !self.segments.is_empty() {
            self.segments.push(Segment::Other(vec![String::new()]));
        }
        self.segments.push(Segment::Function(function));
    }

    /// Imported class names.
    pub fn uses(&self) -> Vec<String> {
        match self.segments.first() {
            Some(Segment::Other(lines)) => use_statements(lines),
            _ => Vec::new(),
        }
    }

    /// Add imports that are not present yet after the existing ones.
    pub fn add_uses(&mut self, uses: &[String]) {
        let existing = self.uses();
        let missing: Vec<String> = uses.iter().filter(|u| !existing.contains(u)).cloned().collect();
        if missing.is_empty() {
            return;
        }
        if !matches!(self.segments.first(), Some(Segment::Other(_))) {
            self.segments.insert(0, Segment::Other(vec!["<?php".to_string(), String::new()]));
        }
        if let Some(Segment::Other(lines)) = self.segments.first_mut() {
            insert_uses(lines, &missing, &["*/", "<?php"]);
        }
    }

    /// Render back to text.
    pub fn render(&self) -> String {
        let mut lines: Vec<String> = Vec::new();
        for segment in &self.segments {
            match segment {
                Segment::Function(f) => lines.extend(f.lines.iter().cloned()),
                Segment::Other(other) => lines.extend(other.iter().cloned()),
            }
        }
        crate::php::join_lines(&lines)
    }
}

/// A class file split into header, members, and footer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedClass {
    /// Lines up to and including the class opening brace
    pub header: Vec<String>,
    /// Members in file order
    pub members: Vec<ClassMember>,
    /// Closing brace and anything after it
    pub footer: Vec<String>,
}

impl ParsedClass {
    /// Imported class names.
    pub fn uses(&self) -> Vec<String> {
        use_statements(&self.header)
    }

    /// Add imports that are not present yet after the existing ones.
    pub fn add_uses(&mut self, uses: &[String]) {
        let existing = self.uses();
        let missing: Vec<String> = uses.iter().filter(|u| !existing.contains(u)).cloned().collect();
        if !missing.is_empty() {
            insert_uses(&mut self.header, &missing, &["namespace ", "<?php"]);
        }
    }

    /// Position of a member.
    pub fn find(&self, kind: MemberKind, name: &str) -> Option<usize> {
        self.members.iter().position(|m| m.kind == kind && m.name == name)
    }

    /// Render back to text. Members are separated by one blank line.
    pub fn render(&self) -> String {
        let mut lines = self.header.clone();
        lines.push(String::new());
        for member in &self.members {
            lines.extend(member.lines.iter().cloned());
            lines.push(String::new());
        }
        lines.extend(self.footer.iter().cloned());
        crate::php::join_lines(&lines)
    }
}

fn use_statements(lines: &[String]) -> Vec<String> {
    lines
        .iter()
        .filter_map(|l| {
            l.trim()
                .strip_prefix("use ")
                .and_then(|rest| rest.strip_suffix(';'))
                .map(|name| name.trim().trim_start_matches('\\').to_string())
        })
        .collect()
}

/// Insert `use` lines after the last existing one, or after the first line
/// starting with one of `anchors`.
fn insert_uses(lines: &mut Vec<String>, uses: &[String], anchors: &[&str]) {
    let statements: Vec<String> = uses.iter().map(|u| format!("use {};", u)).collect();

    if let Some(last) = lines.iter().rposition(|l| l.trim().starts_with("use ")) {
        for (offset, statement) in statements.into_iter().enumerate() {
            lines.insert(last + 1 + offset, statement);
        }
        return;
    }

    let anchor = anchors
        .iter()
        .find_map(|a| lines.iter().position(|l| l.trim().starts_with(a)));
    let at = anchor.map_or(lines.len(), |i| i + 1);
    let mut block = vec![String::new()];
    block.extend(statements);
    // Keep one blank line between the imports and whatever follows.
    if lines.get(at).map_or(true, |l| !l.trim().is_empty()) {
        block.push(String::new());
    }
    for (offset, line) in block.into_iter().enumerate() {
        lines.insert(at + offset, line);
    }
}

#[derive(Debug, Default)]
struct LexState {
    in_block_comment: bool,
    in_string: Option<char>,
    /// Closing label of the heredoc or nowdoc being read
    in_heredoc: Option<String>,
}

#[derive(Debug, Default)]
struct LineInfo {
    braces: i32,
    nesting: i32,
    opened: bool,
    ends_statement: bool,
}

impl LexState {
    fn is_code(&self) -> bool {
        !self.in_block_comment && self.in_string.is_none() && self.in_heredoc.is_none()
    }

    fn scan(&mut self, line: &str) -> LineInfo {
        let mut info = LineInfo::default();
        let chars: Vec<char> = line.chars().collect();
        let mut last_code: Option<char> = None;
        let mut i = 0;

        if let Some(label) = &self.in_heredoc {
            match heredoc_end(&chars, label) {
                Some(end) => {
                    self.in_heredoc = None;
                    i = end;
                }
                None => return info,
            }
        }

        while i < chars.len() {
            let c = chars[i];
            let next = chars.get(i + 1).copied();

            if self.in_block_comment {
                if c == '*' && next == Some('/') {
                    self.in_block_comment = false;
                    i += 1;
                }
                i += 1;
                continue;
            }

            if let Some(quote) = self.in_string {
                if c == '\\' {
                    i += 1;
                } else if c == quote {
                    self.in_string = None;
                    last_code = Some(c);
                }
                i += 1;
                continue;
            }

            match c {
                '/' if next == Some('/') => break,
                '#' if next != Some('[') => break,
                '/' if next == Some('*') => {
                    self.in_block_comment = true;
                    i += 1;
                }
                '<' if chars[i..].starts_with(&['<', '<', '<']) => {
                    if let Some(label) = heredoc_label(&chars[i + 3..]) {
                        self.in_heredoc = Some(label);
                        break;
                    }
                }
                '\'' | '"' => self.in_string = Some(c),
                '{' => {
                    info.braces += 1;
                    info.opened = true;
                }
                '}' => info.braces -= 1,
                '(' | '[' => info.nesting += 1,
                ')' | ']' => info.nesting -= 1,
                _ => {}
            }
            if !c.is_whitespace() && !self.in_block_comment {
                last_code = Some(c);
            }
            i += 1;
        }

        info.ends_statement = matches!(last_code, Some(';') | Some('}'));
        info
    }
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Label of a heredoc or nowdoc opened by `<<<` followed by `rest`.
fn heredoc_label(rest: &[char]) -> Option<String> {
    let mut chars = rest.iter().copied().skip_while(|c| *c == ' ' || *c == '\t').peekable();
    let quote = chars.next_if(|c| *c == '\'' || *c == '"');
    let label: String = std::iter::from_fn(|| chars.next_if(|c| is_identifier_char(*c))).collect();
    if label.is_empty() || label.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    if let Some(quote) = quote {
        chars.next_if_eq(&quote)?;
    }
    chars.all(char::is_whitespace).then_some(label)
}

/// Index just past the closing label, if `chars` closes the heredoc.
fn heredoc_end(chars: &[char], label: &str) -> Option<usize> {
    let start = chars.iter().position(|c| !c.is_whitespace())?;
    let end = start + label.chars().count();
    let candidate: String = chars.get(start..end)?.iter().collect();
    if candidate != label || chars.get(end).map_or(false, |c| is_identifier_char(*c)) {
        return None;
    }
    Some(end)
}

fn is_comment_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    ["/**", "/*", "*", "*/", "//", "#["]
        .iter()
        .any(|p| trimmed.starts_with(p))
}

/// Split trailing docblock/comment/attribute lines off `lines`.
fn take_leading_comment(lines: &mut Vec<String>) -> Vec<String> {
    let mut start = lines.len();
    while start > 0 && is_comment_line(&lines[start - 1]) {
        start -= 1;
    }
    lines.split_off(start)
}

/// Scanner holding the compiled member patterns.
#[derive(Debug, Clone)]
pub struct PhpScanner {
    function: Regex,
    class: Regex,
    method: Regex,
    property: Regex,
    constant: Regex,
    trait_use: Regex,
}

impl PhpScanner {
    /// Compile the patterns.
    pub fn new() -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| GenerationError::Config(format!("Invalid regex: {}", e)))
        };
        Ok(Self {
            function: compile(r"^function\s+&?\s*([A-Za-z_][A-Za-z0-9_]*)\s*\(")?,
            class: compile(r"^(?:(?:abstract|final|readonly)\s+)*(?:class|interface|trait|enum)\s+\w+")?,
            method: compile(
                r"^\s*(?:(?:abstract|final|public|protected|private|static)\s+)*function\s+&?\s*(\w+)\s*\(",
            )?,
            property: compile(
                r"^\s*(?:(?:public|protected|private|static|readonly|var)\s+)+(?:\??[\w\\|]+\s+)?\$(\w+)",
            )?,
            constant: compile(r"^\s*(?:(?:public|protected|private|final)\s+)*const\s+(?:[\w\\?|]+\s+)?(\w+)\s*=")?,
            trait_use: compile(r"^\s*use\s+\\?([\w\\]+)\s*;")?,
        })
    }

    /// Split a procedural file into functions and everything else.
    pub fn parse_procedural(&self, path: &str, source: &str) -> Result<ParsedProcedural> {
        let lines: Vec<&str> = source.lines().collect();
        let mut state = LexState::default();
        let mut segments = Vec::new();
        let mut other: Vec<String> = Vec::new();
        let mut depth = 0i32;
        let mut i = 0;

        while i < lines.len() {
            let starts_function = depth == 0 && state.is_code();
            let name = match starts_function.then(|| self.function.captures(lines[i])).flatten() {
                Some(caps) => caps.get(1).map(|m| m.as_str().to_string()),
                None => None,
            };

            let Some(name) = name else {
                depth += state.scan(lines[i]).braces;
                other.push(lines[i].to_string());
                i += 1;
                continue;
            };

            let mut text = take_leading_comment(&mut other);
            let mut opened = false;
            let mut nesting = 0;
            loop {
                let Some(line) = lines.get(i) else {
                    return Err(unbalanced(path, &name));
                };
                let info = state.scan(line);
                depth += info.braces;
                nesting += info.nesting;
                opened |= info.opened;
                text.push(line.to_string());
                i += 1;
                if depth == 0 && nesting == 0 && (opened || info.ends_statement) {
                    break;
                }
            }

            if !other.is_empty() {
                segments.push(Segment::Other(std::mem::take(&mut other)));
            }
            segments.push(Segment::Function(PhpFunction { name, lines: text }));
        }

        if depth != 0 {
            return Err(GenerationError::ExistingCode {
                path: path.to_string(),
                reason: "unbalanced braces".to_string(),
            });
        }
        if !other.is_empty() {
            segments.push(Segment::Other(other));
        }
        Ok(ParsedProcedural { segments })
    }

    /// Split a class file into header, members, and footer.
    pub fn parse_class(&self, path: &str, source: &str) -> Result<ParsedClass> {
        let lines: Vec<&str> = source.lines().collect();
        let mut state = LexState::default();
        let mut header = Vec::new();
        let mut depth = 0i32;
        let mut i = 0;
        let mut seen_class = false;

        // Header: everything up to the brace that opens the class body.
        while i < lines.len() {
            let line = lines[i];
            if depth == 0 && state.is_code() && self.class.is_match(line.trim_start()) {
                seen_class = true;
            }
            depth += state.scan(line).braces;
            header.push(line.to_string());
            i += 1;
            if seen_class && depth == 1 {
                break;
            }
        }
        if !seen_class || depth != 1 {
            return Err(GenerationError::ExistingCode {
                path: path.to_string(),
                reason: "no class declaration found".to_string(),
            });
        }

        let mut members = Vec::new();
        let mut pending: Vec<String> = Vec::new();
        let mut footer = Vec::new();

        while i < lines.len() {
            let line = lines[i];

            if !state.is_code() || is_comment_line(line) {
                state.scan(line);
                pending.push(line.to_string());
                i += 1;
                continue;
            }
            if line.trim().is_empty() {
                i += 1;
                continue;
            }

            let member = self.member_start(line);
            let Some((kind, name)) = member else {
                let info = state.scan(line);
                depth += info.braces;
                if depth <= 0 {
                    footer.append(&mut pending);
                    footer.extend(lines[i..].iter().map(|l| l.to_string()));
                    break;
                }
                pending.push(line.to_string());
                i += 1;
                continue;
            };

            let mut text = std::mem::take(&mut pending);
            let mut opened = false;
            let mut nesting = 0;
            loop {
                let Some(line) = lines.get(i) else {
                    return Err(unbalanced(path, &name));
                };
                let info = state.scan(line);
                depth += info.braces;
                nesting += info.nesting;
                opened |= info.opened;
                text.push(line.to_string());
                i += 1;
                let done = match kind {
                    MemberKind::Method => {
                        depth == 1 && nesting == 0 && (opened || info.ends_statement)
                    }
                    _ => depth == 1 && nesting == 0 && info.ends_statement,
                };
                if done {
                    break;
                }
            }
            members.push(ClassMember { kind, name, lines: text });
        }

        if footer.is_empty() {
            return Err(GenerationError::ExistingCode {
                path: path.to_string(),
                reason: "class body is not closed".to_string(),
            });
        }

        Ok(ParsedClass { header, members, footer })
    }

    fn member_start(&self, line: &str) -> Option<(MemberKind, String)> {
        let patterns = [
            (MemberKind::Method, &self.method),
            (MemberKind::Constant, &self.constant),
            (MemberKind::Property, &self.property),
            (MemberKind::Trait, &self.trait_use),
        ];
        for (kind, pattern) in patterns {
            if let Some(name) = pattern.captures(line).and_then(|c| c.get(1)) {
                let name = match kind {
                    MemberKind::Trait => crate::php::short_class_name(name.as_str()).to_string(),
                    _ => name.as_str().to_string(),
                };
                return Some((kind, name));
            }
        }
        None
    }
}

fn unbalanced(path: &str, name: &str) -> GenerationError {
    GenerationError::ExistingCode {
        path: path.to_string(),
        reason: format!("'{}' is not terminated", name),
    }
}
