//! Formatter: renders a feed item into publish text.
//!
//! Templates use `{title}` and `{link}` placeholders; `{{` and `}}` stand for
//! literal braces. Lengths are counted in Unicode scalar values.

use crate::error::FormatError;
use crate::source::FeedItem;

/// Default maximum length of a post.
pub const DEFAULT_MAX_LENGTH: usize = 280;

/// Appended to text that had to be cut.
pub const ELLIPSIS: &str = "...";

/// Default post template.
pub const DEFAULT_TEMPLATE: &str = "{title} {link}";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formatter {
    template: String,
    max_length: usize,
}

impl Formatter {
    pub fn new(template: impl Into<String>, max_length: usize) -> Self {
        Self {
            template: template.into(),
            max_length,
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Render `item`, truncating to the length limit if needed.
    pub fn format(&self, item: &FeedItem) -> Result<String, FormatError> {
        let text = render(&self.template, item)?;
        truncate(text, self.max_length)
    }
}

fn render(template: &str, item: &FeedItem) -> Result<String, FormatError> {
    let mut out = String::with_capacity(template.len() + item.title.len() + item.link.len());
    let mut chars = template.char_indices().peekable();

    while let Some((offset, c)) = chars.next() {
        match c {
            '{' if chars.next_if(|&(_, n)| n == '{').is_some() => out.push('{'),
            '}' if chars.next_if(|&(_, n)| n == '}').is_some() => out.push('}'),
            '{' => {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some((_, '}')) => break,
                        Some((_, '{')) | None => {
                            return Err(FormatError::Malformed { brace: '{', offset })
                        }
                        Some((_, n)) => name.push(n),
                    }
                }
                match name.as_str() {
                    "title" => out.push_str(&item.title),
                    "link" => out.push_str(&item.link),
                    _ => return Err(FormatError::UnknownPlaceholder(name)),
                }
            }
            '}' => return Err(FormatError::Malformed { brace: '}', offset }),
            _ => out.push(c),
        }
    }

    Ok(out)
}

fn truncate(text: String, limit: usize) -> Result<String, FormatError> {
    let len = text.chars().count();
    if len <= limit {
        return Ok(text);
    }

    let keep = limit.saturating_sub(ELLIPSIS.len());
    if keep == 0 {
        return Err(FormatError::TruncationImpossible { len, limit });
    }

    tracing::warn!(len, limit, "post text exceeds the length limit, truncating");
    let mut cut: String = text.chars().take(keep).collect();
    cut.push_str(ELLIPSIS);
    Ok(cut)
}
