//! Markdown documents with frontmatter

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Extension of rendered documents
pub const MARKDOWN_EXTENSION: &str = ".md";

/// One normalized document produced from a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Snapshot identifier this document came from
    pub identifier: String,
    /// Page URL from the provenance log
    pub source_url: Option<String>,
    /// Page title
    pub title: Option<String>,
    /// Author name
    pub author: Option<String>,
    /// Publication date, `YYYY-MM-DD`
    pub date: Option<String>,
    /// Summary from meta tags or structured data
    pub description: Option<String>,
    /// Main content as Markdown
    pub body_markdown: String,
}

impl Document {
    /// Output file name: the identifier with `.html` swapped for `.md`
    pub fn file_name(&self) -> String {
        let stem = self
            .identifier
            .strip_suffix(".html")
            .unwrap_or(&self.identifier);
        format!("{}{}", stem, MARKDOWN_EXTENSION)
    }

    /// Render as frontmatter followed by the body.
    ///
    /// Absent fields are omitted from the frontmatter, and the `# title`
    /// heading is omitted when there is no title.
    pub fn render(&self) -> String {
        let mut out = String::from("---\n");

        let fields = [
            ("title", &self.title),
            ("author", &self.author),
            ("date", &self.date),
            ("description", &self.description),
            ("url", &self.source_url),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                push_field(&mut out, key, value);
            }
        }
        push_field(&mut out, "source_file", &self.identifier);
        out.push_str("---\n\n");

        if let Some(title) = &self.title {
            let _ = write!(out, "# {}\n\n", single_line(title));
        }
        out.push_str(&self.body_markdown);
        out
    }
}

fn push_field(out: &mut String, key: &str, value: &str) {
    let _ = writeln!(out, "{}: \"{}\"", key, quote(&single_line(value)));
}

/// Escape for a double-quoted YAML scalar
fn quote(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

fn single_line(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn doc() -> Document {
        Document {
            identifier: "_docs_intro.html".into(),
            source_url: Some("https://x.com/docs/intro/".into()),
            title: Some("Intro".into()),
            author: None,
            date: None,
            description: None,
            body_markdown: "Hello.".into(),
        }
    }

    #[test]
    fn test_file_name() {
        assert_eq!(doc().file_name(), "_docs_intro.md");

        let index = Document {
            identifier: "index.html".into(),
            ..doc()
        };
        assert_eq!(index.file_name(), "index.md");
    }

    #[test]
    fn test_render_minimal() {
        assert_eq!(
            doc().render(),
            "---\n\
             title: \"Intro\"\n\
             url: \"https://x.com/docs/intro/\"\n\
             source_file: \"_docs_intro.html\"\n\
             ---\n\
             \n\
             # Intro\n\
             \n\
             Hello."
        );
    }

    #[test]
    fn test_render_full_field_order() {
        let d = Document {
            author: Some("Ada".into()),
            date: Some("2024-03-01".into()),
            description: Some("About things".into()),
            ..doc()
        };
        let rendered = d.render();
        let keys: Vec<&str> = rendered
            .lines()
            .skip(1)
            .take_while(|l| *l != "---")
            .filter_map(|l| l.split(':').next())
            .collect();
        assert_eq!(
            keys,
            vec!["title", "author", "date", "description", "url", "source_file"]
        );
    }

    #[test]
    fn test_render_without_title_or_url() {
        let d = Document {
            title: None,
            source_url: None,
            ..doc()
        };
        assert_eq!(
            d.render(),
            "---\nsource_file: \"_docs_intro.html\"\n---\n\nHello."
        );
    }

    #[test]
    fn test_values_are_escaped() {
        let d = Document {
            title: Some("The \"best\"\n guide \\o/".into()),
            ..doc()
        };
        let rendered = d.render();
        assert!(rendered.contains(r#"title: "The \"best\" guide \\o/""#));
        assert!(rendered.contains("# The \"best\" guide \\o/\n"));
    }
}
