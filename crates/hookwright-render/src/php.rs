//! PHP file models: classes and procedural files.
//!
//! Both models keep named members as separately addressable blocks of lines
//! so that they can be merged into existing files member by member.

use crate::annotation::Annotation;
use crate::docblock::Docblock;
use std::collections::BTreeSet;

/// What kind of class-level member a block is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MemberKind {
    /// `use SomeTrait;` inside the class body
    Trait,
    /// `const NAME = ...;`
    Constant,
    /// `protected $name;`
    Property,
    /// `public function name()`
    Method,
}

/// A named block of lines inside a class body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassMember {
    /// Member kind
    pub kind: MemberKind,
    /// Member name (without `$` for properties)
    pub name: String,
    /// Full lines including docblock, indented for the class body
    pub lines: Vec<String>,
}

impl ClassMember {
    /// Build a method from its parts.
    pub fn method(name: impl Into<String>, docblock: Docblock, declaration: &str, body: &[String]) -> Self {
        let mut lines = docblock.render_indented(2);
        lines.push(format!("  {} {{", declaration));
        for line in body {
            lines.push(indent_line(line, 4));
        }
        lines.push("  }".to_string());
        Self {
            kind: MemberKind::Method,
            name: name.into(),
            lines,
        }
    }

    /// Build a property from its parts.
    pub fn property(name: impl Into<String>, docblock: Docblock, declaration: &str) -> Self {
        let mut lines = docblock.render_indented(2);
        lines.push(format!("  {};", declaration.trim_end_matches(';')));
        Self {
            kind: MemberKind::Property,
            name: name.into(),
            lines,
        }
    }

    /// Build a constant.
    pub fn constant(name: impl Into<String>, docblock: Docblock, value: &str) -> Self {
        let name = name.into();
        let mut lines = docblock.render_indented(2);
        lines.push(format!("  const {} = {};", name, value));
        Self {
            kind: MemberKind::Constant,
            name,
            lines,
        }
    }

    /// A trait import inside the class body.
    pub fn trait_use(short_name: impl Into<String>) -> Self {
        let name = short_name.into();
        Self {
            kind: MemberKind::Trait,
            lines: vec![format!("  use {};", name)],
            name,
        }
    }
}

/// How plugin metadata is attached to a class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassMetadata {
    /// Doctrine annotation inside the docblock
    Annotation(Annotation),
    /// Native attribute above the class
    Attribute(Annotation),
}

/// A PHP class file.
///
/// ```
/// use hookwright_render::{ClassMember, Docblock, PhpClass};
///
/// let mut class = PhpClass::new("Drupal\\test_module", "Alpha");
/// class.docblock = Docblock::new("Alpha service.");
/// let short = class.import("Drupal\\Core\\Session\\AccountProxyInterface");
/// class.add_member(ClassMember::property("currentUser", Docblock::new("The current user."),
///     &format!("protected {} $currentUser", short)));
///
/// let text = class.render();
/// assert!(text.starts_with("<?php\n\nnamespace Drupal\\test_module;\n\nuse Drupal\\Core\\Session\\AccountProxyInterface;\n"));
/// assert!(text.contains("class Alpha {\n\n  /**\n   * The current user.\n"));
/// assert!(text.ends_with("  protected AccountProxyInterface $currentUser;\n\n}\n"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhpClass {
    /// Namespace without leading backslash
    pub namespace: String,
    /// Short class name
    pub name: String,
    /// `class`, `final class`, `abstract class`, `interface`, or `trait`
    pub keyword: String,
    /// Imports, sorted on output
    pub uses: BTreeSet<String>,
    /// Class docblock
    pub docblock: Docblock,
    /// Plugin metadata, if any
    pub metadata: Option<ClassMetadata>,
    /// Parent class short name
    pub extends: Option<String>,
    /// Implemented interface short names
    pub implements: Vec<String>,
    /// Class members in insertion order
    pub members: Vec<ClassMember>,
}

impl PhpClass {
    /// An empty class.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into().trim_start_matches('\\').to_string(),
            name: name.into(),
            keyword: "class".to_string(),
            uses: BTreeSet::new(),
            docblock: Docblock::empty(),
            metadata: None,
            extends: None,
            implements: Vec::new(),
            members: Vec::new(),
        }
    }

    /// Fully-qualified class name.
    pub fn qualified_name(&self) -> String {
        format!("{}\\{}", self.namespace, self.name)
    }

    /// Import a class and return its short name for use in code.
    ///
    /// Classes in the same namespace need no import.
    pub fn import(&mut self, qualified: &str) -> String {
        let qualified = qualified.trim_start_matches('\\');
        let short = short_class_name(qualified).to_string();
        let namespace = qualified.rsplit_once('\\').map(|(ns, _)| ns).unwrap_or("");
        if namespace != self.namespace && !namespace.is_empty() {
            self.uses.insert(qualified.to_string());
        }
        short
    }

    /// Add a member, replacing any member of the same kind and name.
    pub fn add_member(&mut self, member: ClassMember) {
        match self
            .members
            .iter_mut()
            .find(|m| m.kind == member.kind && m.name == member.name)
        {
            Some(existing) => *existing = member,
            None => self.members.push(member),
        }
    }

    /// Whether a member exists.
    pub fn has_member(&self, kind: MemberKind, name: &str) -> bool {
        self.members.iter().any(|m| m.kind == kind && m.name == name)
    }

    /// Members in output order: traits, constants, properties, methods.
    pub fn ordered_members(&self) -> Vec<&ClassMember> {
        let mut members: Vec<&ClassMember> = self.members.iter().collect();
        members.sort_by_key(|m| m.kind);
        members
    }

    /// Lines up to and including the opening brace of the class.
    pub fn header_lines(&self) -> Vec<String> {
        let mut lines = vec!["<?php".to_string(), String::new()];
        if !self.namespace.is_empty() {
            lines.push(format!("namespace {};", self.namespace));
            lines.push(String::new());
        }
        if !self.uses.is_empty() {
            lines.extend(self.uses.iter().map(|u| format!("use {};", u)));
            lines.push(String::new());
        }

        let mut docblock = self.docblock.clone();
        if let Some(ClassMetadata::Annotation(annotation)) = &self.metadata {
            docblock = docblock.raw(annotation.render_annotation());
        }
        if !docblock.is_empty() {
            lines.extend(docblock.render());
        }
        if let Some(ClassMetadata::Attribute(attribute)) = &self.metadata {
            lines.extend(attribute.render_attribute());
        }

        let mut declaration = format!("{} {}", self.keyword, self.name);
        if let Some(parent) = &self.extends {
            declaration.push_str(&format!(" extends {}", parent));
        }
        if !self.implements.is_empty() {
            let keyword = if self.keyword == "interface" { "extends" } else { "implements" };
            declaration.push_str(&format!(" {} {}", keyword, self.implements.join(", ")));
        }
        declaration.push_str(" {");
        lines.push(declaration);
        lines
    }

    /// Render the file.
    pub fn render(&self) -> String {
        let mut lines = self.header_lines();
        lines.push(String::new());
        for member in self.ordered_members() {
            lines.extend(member.lines.iter().cloned());
            lines.push(String::new());
        }
        lines.push("}".to_string());
        join_lines(&lines)
    }
}

/// A top-level function in a procedural file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhpFunction {
    /// Function name
    pub name: String,
    /// Full lines including docblock
    pub lines: Vec<String>,
}

impl PhpFunction {
    /// Build a function from a docblock, a declaration with the final name,
    /// and body lines.
    pub fn new(name: impl Into<String>, docblock: Docblock, declaration: &str, body: &[String]) -> Self {
        let mut lines = docblock.render();
        lines.push(format!("{} {{", declaration));
        for line in body {
            lines.push(indent_line(line, 2));
        }
        lines.push("}".to_string());
        Self {
            name: name.into(),
            lines,
        }
    }
}

/// A procedural PHP file such as `.module` or `.install`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProceduralFile {
    /// `@file` description
    pub description: String,
    /// Imports
    pub uses: BTreeSet<String>,
    /// Functions in contribution order
    pub functions: Vec<PhpFunction>,
}

impl ProceduralFile {
    /// An empty file.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            uses: BTreeSet::new(),
            functions: Vec::new(),
        }
    }

    /// Add a function, replacing one of the same name.
    pub fn add_function(&mut self, function: PhpFunction) {
        match self.functions.iter_mut().find(|f| f.name == function.name) {
            Some(existing) => *existing = function,
            None => self.functions.push(function),
        }
    }

    /// Lines before the first function.
    pub fn header_lines(&self) -> Vec<String> {
        let mut lines = vec!["<?php".to_string(), String::new()];
        lines.extend(
            Docblock::empty()
                .tag("file", "")
                .paragraph(self.description.clone())
                .render(),
        );
        lines.push(String::new());
        if !self.uses.is_empty() {
            lines.extend(self.uses.iter().map(|u| format!("use {};", u)));
            lines.push(String::new());
        }
        lines
    }

    /// Render the file.
    pub fn render(&self) -> String {
        let mut lines = self.header_lines();
        for (index, function) in self.functions.iter().enumerate() {
            if index > 0 {
                lines.push(String::new());
            }
            lines.extend(function.lines.iter().cloned());
        }
        join_lines(&lines)
    }
}

/// Last segment of a qualified class name.
pub fn short_class_name(qualified: &str) -> &str {
    qualified.rsplit('\\').next().unwrap_or(qualified)
}

fn indent_line(line: &str, indent: usize) -> String {
    if line.is_empty() {
        String::new()
    } else {
        format!("{}{}", " ".repeat(indent), line)
    }
}

/// Join lines into file text with exactly one trailing newline.
pub fn join_lines(lines: &[String]) -> String {
    let mut text = lines.join("\n");
    while text.ends_with('\n') {
        text.pop();
    }
    text.push('\n');
    text
}
