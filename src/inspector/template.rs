//! Inspection page template
//!
//! The page is a plain HTML asset with `{{name}}` placeholders and a single
//! `{{#rows}} ... {{/rows}}` block repeated once per record. It is parsed
//! once when the server starts, so a broken asset fails startup instead of
//! every request. Every substituted value is HTML-escaped.

use super::errors::TemplateError;
use super::mapper::DisplayRecord;
use super::page::PageView;

/// The embedded page asset.
pub const INSPECT_HTML: &str = include_str!("inspect.html");

const ROWS_OPEN: &str = "{{#rows}}";
const ROWS_CLOSE: &str = "{{/rows}}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageField {
    Prefix,
    Count,
    Endpoint,
    ResumePath,
}

impl PageField {
    fn lookup(name: &str) -> Option<Self> {
        match name {
            "prefix" => Some(PageField::Prefix),
            "count" => Some(PageField::Count),
            "endpoint" => Some(PageField::Endpoint),
            "resume_path" => Some(PageField::ResumePath),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowField {
    Key,
    Kind,
    Timestamp,
    EntityId,
    Namespace,
    Detail,
    Scores,
}

impl RowField {
    fn lookup(name: &str) -> Option<Self> {
        match name {
            "key" => Some(RowField::Key),
            "kind" => Some(RowField::Kind),
            "timestamp" => Some(RowField::Timestamp),
            "entity_id" => Some(RowField::EntityId),
            "namespace" => Some(RowField::Namespace),
            "detail" => Some(RowField::Detail),
            "scores" => Some(RowField::Scores),
            _ => None,
        }
    }

    fn pick<'a>(&self, record: &'a DisplayRecord) -> &'a str {
        match self {
            RowField::Key => &record.key,
            RowField::Kind => &record.kind,
            RowField::Timestamp => &record.timestamp,
            RowField::EntityId => &record.entity_id,
            RowField::Namespace => &record.namespace,
            RowField::Detail => &record.detail,
            RowField::Scores => &record.scores,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment<F> {
    Text(String),
    Field(F),
}

/// Links rendered into the page next to the records.
#[derive(Debug, Clone, Copy)]
pub struct PageLinks<'a> {
    /// Path of the inspection endpoint (form target)
    pub endpoint: &'a str,
    /// Path of the resume endpoint
    pub resume_path: &'a str,
}

/// A parsed page template.
#[derive(Debug, Clone)]
pub struct InspectTemplate {
    head: Vec<Segment<PageField>>,
    row: Vec<Segment<RowField>>,
    tail: Vec<Segment<PageField>>,
}

impl InspectTemplate {
    /// Parse the embedded asset.
    pub fn embedded() -> Result<Self, TemplateError> {
        Self::parse(INSPECT_HTML)
    }

    /// Parse a template source.
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let open = source.find(ROWS_OPEN).ok_or(TemplateError::MissingRowBlock)?;
        let body_start = open + ROWS_OPEN.len();
        let close = source[body_start..]
            .find(ROWS_CLOSE)
            .map(|at| body_start + at)
            .ok_or(TemplateError::MissingRowBlock)?;
        let tail_start = close + ROWS_CLOSE.len();

        if source[tail_start..].contains(ROWS_OPEN) || source[..open].contains(ROWS_CLOSE) {
            return Err(TemplateError::DuplicateRowBlock);
        }

        Ok(Self {
            head: tokenize(&source[..open], 0, "page", PageField::lookup)?,
            row: tokenize(&source[body_start..close], body_start, "row", RowField::lookup)?,
            tail: tokenize(&source[tail_start..], tail_start, "page", PageField::lookup)?,
        })
    }

    /// Render a page.
    pub fn render(&self, page: &PageView, links: PageLinks<'_>) -> String {
        let mut out = String::with_capacity(4096 + page.items.len() * 256);
        let count = page.items.len().to_string();

        for segment in &self.head {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Field(field) => {
                    escape_html(&mut out, page_value(*field, page, &count, links))
                }
            }
        }

        for record in &page.items {
            for segment in &self.row {
                match segment {
                    Segment::Text(text) => out.push_str(text),
                    Segment::Field(field) => escape_html(&mut out, field.pick(record)),
                }
            }
        }

        for segment in &self.tail {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Field(field) => {
                    escape_html(&mut out, page_value(*field, page, &count, links))
                }
            }
        }

        out
    }
}

fn page_value<'a>(
    field: PageField,
    page: &'a PageView,
    count: &'a str,
    links: PageLinks<'a>,
) -> &'a str {
    match field {
        PageField::Prefix => &page.prefix,
        PageField::Count => count,
        PageField::Endpoint => links.endpoint,
        PageField::ResumePath => links.resume_path,
    }
}

fn tokenize<F>(
    source: &str,
    base_offset: usize,
    section: &'static str,
    lookup: fn(&str) -> Option<F>,
) -> Result<Vec<Segment<F>>, TemplateError> {
    let mut segments = Vec::new();
    let mut rest = source;
    let mut offset = base_offset;

    while let Some(open) = rest.find("{{") {
        if open > 0 {
            segments.push(Segment::Text(rest[..open].to_string()));
        }
        let after_open = &rest[open + 2..];
        let close = after_open
            .find("}}")
            .ok_or(TemplateError::Unterminated(offset + open))?;
        let name = after_open[..close].trim();
        let field = lookup(name).ok_or_else(|| TemplateError::UnknownPlaceholder {
            name: name.to_string(),
            section,
        })?;
        segments.push(Segment::Field(field));

        let consumed = open + 2 + close + 2;
        rest = &rest[consumed..];
        offset += consumed;
    }

    if !rest.is_empty() {
        segments.push(Segment::Text(rest.to_string()));
    }

    Ok(segments)
}

/// Append `value` to `out` with HTML special characters escaped.
pub fn escape_html(out: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
}
