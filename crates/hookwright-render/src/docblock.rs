//! PHP docblocks with paragraph wrapping.

/// A docblock under construction.
///
/// ```
/// use hookwright_render::Docblock;
///
/// let lines = Docblock::new("Implements hook_help().").render();
/// assert_eq!(lines, vec!["/**", " * Implements hook_help().", " */"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Docblock {
    sections: Vec<Section>,
    width: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Section {
    Paragraph(String),
    Raw(Vec<String>),
    Tag(String, String),
}

/// Default maximum line length, matching the framework's coding standard.
pub const DEFAULT_WIDTH: usize = 80;

impl Docblock {
    /// A docblock with a one-line summary.
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            sections: vec![Section::Paragraph(summary.into())],
            width: None,
        }
    }

    /// An empty docblock.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Wrap at `width` columns instead of the default.
    pub fn width(mut self, width: usize) -> Self {
        self.width = Some(width);
        self
    }

    /// Add a wrapped paragraph.
    pub fn paragraph(mut self, text: impl Into<String>) -> Self {
        self.sections.push(Section::Paragraph(text.into()));
        self
    }

    /// Add pre-formatted lines, e.g. a rendered annotation.
    pub fn raw(mut self, lines: Vec<String>) -> Self {
        self.sections.push(Section::Raw(lines));
        self
    }

    /// Add a tag such as `@param string $name` or `@file`.
    pub fn tag(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.sections.push(Section::Tag(name.into(), value.into()));
        self
    }

    /// Whether nothing has been added.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Render without indentation.
    pub fn render(&self) -> Vec<String> {
        self.render_indented(0)
    }

    /// Render with every line indented by `indent` spaces.
    ///
    /// Paragraphs are separated by an empty comment line; consecutive tags of
    /// the same name are kept together.
    pub fn render_indented(&self, indent: usize) -> Vec<String> {
        let pad = " ".repeat(indent);
        let available = self
            .width
            .unwrap_or(DEFAULT_WIDTH)
            .saturating_sub(indent + 3)
            .max(20);

        let mut lines = vec![format!("{}/**", pad)];
        let mut previous_tag: Option<&str> = None;

        for (index, section) in self.sections.iter().enumerate() {
            let tag_name = match section {
                Section::Tag(name, _) => Some(name.as_str()),
                _ => None,
            };
            let grouped = tag_name.is_some() && tag_name == previous_tag;
            // @file is followed by its description without a gap.
            let follows_file = previous_tag == Some("file");
            if index > 0 && !grouped && !follows_file {
                lines.push(format!("{} *", pad));
            }
            previous_tag = tag_name;

            match section {
                Section::Paragraph(text) => {
                    for line in wrap(text, available) {
                        lines.push(comment_line(&pad, &line));
                    }
                }
                Section::Raw(raw) => {
                    for line in raw {
                        lines.push(comment_line(&pad, line));
                    }
                }
                Section::Tag(name, value) => {
                    let text = if value.is_empty() {
                        format!("@{}", name)
                    } else {
                        format!("@{} {}", name, value)
                    };
                    let mut wrapped = wrap(&text, available).into_iter();
                    if let Some(first) = wrapped.next() {
                        lines.push(comment_line(&pad, &first));
                    }
                    for rest in wrapped {
                        lines.push(comment_line(&pad, &format!("  {}", rest)));
                    }
                }
            }
        }

        lines.push(format!("{} */", pad));
        lines
    }
}

fn comment_line(pad: &str, text: &str) -> String {
    if text.is_empty() {
        format!("{} *", pad)
    } else {
        format!("{} * {}", pad, text)
    }
}

/// Greedy word wrap. Words longer than `width` get a line of their own.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for source_line in text.lines() {
        let mut current = String::new();
        for word in source_line.split_whitespace() {
            if !current.is_empty() && current.len() + 1 + word.len() > width {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_respects_width() {
        let text = "Provides a block that displays the alpha content for the current user on every page.";
        let wrapped = wrap(text, 40);
        assert!(wrapped.iter().all(|l| l.len() <= 40));
        assert_eq!(wrapped.join(" "), text);
    }

    #[test]
    fn test_file_docblock() {
        let lines = Docblock::empty()
            .tag("file", "")
            .paragraph("Primary module hooks for Test module module.")
            .render();
        assert_eq!(
            lines,
            vec![
                "/**",
                " * @file",
                " * Primary module hooks for Test module module.",
                " */",
            ]
        );
    }

    #[test]
    fn test_params_group_and_indent() {
        let lines = Docblock::new("Constructs a new Alpha object.")
            .tag("param", "array $configuration")
            .tag("param", "string $plugin_id")
            .render_indented(2);
        assert_eq!(
            lines,
            vec![
                "  /**",
                "   * Constructs a new Alpha object.",
                "   *",
                "   * @param array $configuration",
                "   * @param string $plugin_id",
                "   */",
            ]
        );
    }

    #[test]
    fn test_long_lines_wrap_within_width() {
        let long = "word ".repeat(40);
        let lines = Docblock::new(long.trim()).width(60).render_indented(2);
        assert!(lines.iter().all(|l| l.len() <= 60));
    }
}
