use crate::markup::{self, Token};
use regex::Regex;
use serde_json::{json, Value};
use std::sync::LazyLock;

static BLANK_LINES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n+").unwrap());
static SPACE_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" {2,}").unwrap());

/// Inline formatting tags kept verbatim in section descriptions
const PRESERVED_TAGS: &[&str] = &["b", "strong", "i", "em", "a", "sup", "sub"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingType {
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
    /// Content that precedes any heading
    P,
}

impl HeadingType {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "h1" => Some(Self::H1),
            "h2" => Some(Self::H2),
            "h3" => Some(Self::H3),
            "h4" => Some(Self::H4),
            "h5" => Some(Self::H5),
            "h6" => Some(Self::H6),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::H1 => "h1",
            Self::H2 => "h2",
            Self::H3 => "h3",
            Self::H4 => "h4",
            Self::H5 => "h5",
            Self::H6 => "h6",
            Self::P => "p",
        }
    }
}

/// One heading plus the body text that follows it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub heading_type: HeadingType,
    /// Trimmed heading text, empty for content before the first heading
    pub section: String,
    pub description: String,
}

impl Section {
    /// JSON object with keys in output order: headingType, section, description
    pub fn to_value(&self) -> Value {
        json!({
            "headingType": self.heading_type.as_str(),
            "section": self.section,
            "description": self.description,
        })
    }
}

/// Split an HTML fragment into heading sections.
///
/// Never fails: unknown tags are unwrapped and malformed markup degrades to
/// plain text flow. Each call starts from a fresh parser state.
pub fn parse_sections(html: &str) -> Vec<Section> {
    if html.trim().is_empty() {
        return Vec::new();
    }

    let mut builder = SectionBuilder::new();
    for token in markup::tokenize(html) {
        builder.feed(token);
    }
    builder.finish()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// No heading seen yet; text becomes leading "p" content
    BeforeFirstSection,
    InHeading,
    InBody,
}

struct SectionBuilder {
    mode: Mode,
    heading_type: Option<HeadingType>,
    heading_text: String,
    parts: Vec<String>,
    /// Open preserved tags, document-wide
    open_tags: Vec<String>,
    sections: Vec<Section>,
}

impl SectionBuilder {
    fn new() -> Self {
        Self {
            mode: Mode::BeforeFirstSection,
            heading_type: None,
            heading_text: String::new(),
            parts: Vec::new(),
            open_tags: Vec::new(),
            sections: Vec::new(),
        }
    }

    fn feed(&mut self, token: Token) {
        match token {
            Token::Start { name, attrs } => self.start_tag(name, &attrs),
            Token::End { name } => self.end_tag(&name),
            Token::Text(text) => self.text(text),
        }
    }

    fn start_tag(&mut self, name: String, attrs: &[(String, String)]) {
        if let Some(level) = HeadingType::from_tag(&name) {
            if self.has_pending() {
                self.finalize_section();
            }
            self.heading_type = Some(level);
            self.heading_text.clear();
            self.mode = Mode::InHeading;
            return;
        }

        if PRESERVED_TAGS.contains(&name.as_str()) {
            self.parts.push(render_start_tag(&name, attrs));
            self.open_tags.push(name);
        } else if name == "br" {
            self.parts.push("\n".to_string());
        }
    }

    fn end_tag(&mut self, name: &str) {
        if HeadingType::from_tag(name).is_some() {
            if self.mode == Mode::InHeading {
                self.mode = Mode::InBody;
            }
            return;
        }

        if !PRESERVED_TAGS.contains(&name) {
            return;
        }

        // Stray or mismatched end tags are dropped
        if self.open_tags.last().map(String::as_str) == Some(name) {
            self.parts.push(format!("</{}>", name));
            self.open_tags.pop();
        }
    }

    fn text(&mut self, text: String) {
        match self.mode {
            Mode::InHeading => self.heading_text.push_str(&text),
            Mode::BeforeFirstSection | Mode::InBody => self.parts.push(text),
        }
    }

    fn has_pending(&self) -> bool {
        self.heading_type.is_some() || !self.parts.is_empty()
    }

    fn finalize_section(&mut self) {
        let heading = self.heading_text.trim().to_string();

        // Any collected fragment counts, even whitespace
        if !heading.is_empty() || !self.parts.is_empty() {
            self.sections.push(Section {
                heading_type: self.heading_type.unwrap_or(HeadingType::P),
                section: heading,
                description: normalize_description(&self.parts.concat()),
            });
        }

        self.heading_type = None;
        self.heading_text.clear();
        self.parts.clear();
    }

    fn finish(mut self) -> Vec<Section> {
        if self.has_pending() {
            self.finalize_section();
        }
        self.sections
    }
}

fn render_start_tag(name: &str, attrs: &[(String, String)]) -> String {
    if attrs.is_empty() {
        return format!("<{}>", name);
    }

    let rendered: Vec<String> = attrs
        .iter()
        .map(|(key, value)| format!("{}=\"{}\"", key, value))
        .collect();
    format!("<{} {}>", name, rendered.join(" "))
}

/// Trim, collapse blank-line runs to one blank line and space runs to one space
pub fn normalize_description(raw: &str) -> String {
    let collapsed = BLANK_LINES_RE.replace_all(raw.trim(), "\n\n");
    let collapsed = SPACE_RUN_RE.replace_all(&collapsed, " ");
    collapsed.trim().to_string()
}
