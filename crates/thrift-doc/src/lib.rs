//! Width-aware pretty-printing document IR.
//!
//! A [`Doc`] is a small algebra of text, line breaks, indentation, and
//! groups. [`render`] walks the document with an explicit work stack and
//! decides per [`Doc::Group`] whether its contents fit flat on the current
//! line; a [`Doc::SoftLine`] flattens to a single space in flat mode and
//! breaks (newline plus indentation) otherwise. A [`Doc::Line`] always
//! breaks.
//!
//! Rendering is deterministic: the same document and options always produce
//! the same bytes.

use thiserror::Error;

/// A pretty-printing document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Doc {
    /// Nothing.
    Empty,
    /// Literal text; must not contain line terminators.
    Text(String),
    /// A hard line break.
    Line,
    /// A soft break: a single space in flat mode, a break otherwise.
    SoftLine,
    /// Concatenation in order.
    Concat(Vec<Doc>),
    /// Increases the indent level for breaks inside.
    Indent(Box<Doc>),
    /// Tries to render its contents flat; falls back to break mode.
    Group(Box<Doc>),
}

impl Doc {
    /// Literal text.
    pub fn text(text: impl Into<String>) -> Doc {
        let text = text.into();
        if text.is_empty() { Doc::Empty } else { Doc::Text(text) }
    }

    /// Concatenation; flattens nested concats and drops empties.
    pub fn concat(docs: impl IntoIterator<Item = Doc>) -> Doc {
        let mut flat = Vec::new();
        for doc in docs {
            match doc {
                Doc::Empty => {}
                Doc::Concat(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        match flat.len() {
            0 => Doc::Empty,
            1 => flat.into_iter().next().unwrap_or(Doc::Empty),
            _ => Doc::Concat(flat),
        }
    }

    /// Indented subdocument; `Indent(Empty)` is `Empty`.
    pub fn indent(doc: Doc) -> Doc {
        if doc == Doc::Empty { Doc::Empty } else { Doc::Indent(Box::new(doc)) }
    }

    /// Grouped subdocument; `Group(Empty)` is `Empty`.
    pub fn group(doc: Doc) -> Doc {
        if doc == Doc::Empty { Doc::Empty } else { Doc::Group(Box::new(doc)) }
    }
}

/// Options controlling [`render`].
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Maximum preferred line width in bytes
    pub line_width: usize,
    /// One indent level (e.g. two spaces)
    pub indent: String,
    /// Line terminator; must be `"\n"` or `"\r\n"`
    pub newline: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { line_width: 100, indent: "  ".to_string(), newline: "\n".to_string() }
    }
}

/// Rendering failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// The newline option is not `"\n"` or `"\r\n"`.
    #[error("invalid newline {0:?}; expected \"\\n\" or \"\\r\\n\"")]
    InvalidNewline(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Flat,
    Break,
}

/// Renders a document to a string.
pub fn render(doc: &Doc, options: &RenderOptions) -> Result<String, RenderError> {
    if options.newline != "\n" && options.newline != "\r\n" {
        return Err(RenderError::InvalidNewline(options.newline.clone()));
    }

    let mut out = String::new();
    let mut column = 0usize;
    // Work stack of (indent level, mode, doc); top of stack renders next.
    let mut stack: Vec<(usize, Mode, &Doc)> = vec![(0, Mode::Break, doc)];

    while let Some((level, mode, doc)) = stack.pop() {
        match doc {
            Doc::Empty => {}
            Doc::Text(text) => {
                out.push_str(text);
                column += text.len();
            }
            Doc::Line => {
                out.push_str(&options.newline);
                for _ in 0..level {
                    out.push_str(&options.indent);
                }
                column = level * options.indent.len();
            }
            Doc::SoftLine => {
                if mode == Mode::Flat {
                    out.push(' ');
                    column += 1;
                } else {
                    out.push_str(&options.newline);
                    for _ in 0..level {
                        out.push_str(&options.indent);
                    }
                    column = level * options.indent.len();
                }
            }
            Doc::Concat(docs) => {
                for doc in docs.iter().rev() {
                    stack.push((level, mode, doc));
                }
            }
            Doc::Indent(inner) => {
                stack.push((level + 1, mode, inner));
            }
            Doc::Group(inner) => {
                let available = options.line_width.saturating_sub(column);
                let mode =
                    if fits(inner, &stack, available) { Mode::Flat } else { Mode::Break };
                stack.push((level, mode, inner));
            }
        }
    }

    Ok(out)
}

/// True when `doc` followed by the rest of the work stack fits within
/// `width` columns, measuring up to the next hard break.
fn fits(doc: &Doc, rest: &[(usize, Mode, &Doc)], width: usize) -> bool {
    let mut remaining = width as isize;
    let mut stack: Vec<(Mode, &Doc)> = rest.iter().map(|&(_, m, d)| (m, d)).collect();
    stack.push((Mode::Flat, doc));

    while let Some((mode, doc)) = stack.pop() {
        if remaining < 0 {
            return false;
        }
        match doc {
            Doc::Empty => {}
            Doc::Text(text) => remaining -= text.len() as isize,
            Doc::Line => return true,
            Doc::SoftLine => {
                if mode == Mode::Flat {
                    remaining -= 1;
                } else {
                    return true;
                }
            }
            Doc::Concat(docs) => {
                for doc in docs.iter().rev() {
                    stack.push((mode, doc));
                }
            }
            Doc::Indent(inner) => stack.push((mode, inner)),
            // Nested groups measure flat inside a flat candidate.
            Doc::Group(inner) => stack.push((mode, inner)),
        }
    }
    remaining >= 0
}

/// Measures the flat rendering width of `doc`, or `None` if it contains a
/// hard break.
pub fn flat_width(doc: &Doc) -> Option<usize> {
    match doc {
        Doc::Empty => Some(0),
        Doc::Text(text) => Some(text.len()),
        Doc::Line => None,
        Doc::SoftLine => Some(1),
        Doc::Concat(docs) => {
            let mut total = 0;
            for doc in docs {
                total += flat_width(doc)?;
            }
            Some(total)
        }
        Doc::Indent(inner) | Doc::Group(inner) => flat_width(inner),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn opts(width: usize) -> RenderOptions {
        RenderOptions { line_width: width, ..RenderOptions::default() }
    }

    #[test]
    fn smart_constructors_normalize() {
        assert_eq!(Doc::text(""), Doc::Empty);
        assert_eq!(Doc::indent(Doc::Empty), Doc::Empty);
        assert_eq!(Doc::group(Doc::Empty), Doc::Empty);
        assert_eq!(
            Doc::concat([Doc::Empty, Doc::concat([Doc::text("a"), Doc::text("b")]), Doc::Empty]),
            Doc::Concat(vec![Doc::Text("a".into()), Doc::Text("b".into())])
        );
        assert_eq!(Doc::concat([Doc::text("a")]), Doc::Text("a".into()));
    }

    #[test]
    fn group_renders_flat_when_it_fits() {
        let doc = Doc::group(Doc::concat([
            Doc::text("map"),
            Doc::SoftLine,
            Doc::text("<i32,"),
            Doc::SoftLine,
            Doc::text("string>"),
        ]));
        assert_eq!(render(&doc, &opts(40)).unwrap(), "map <i32, string>");
    }

    #[test]
    fn group_breaks_when_too_wide() {
        let doc = Doc::group(Doc::concat([
            Doc::text("aaaa"),
            Doc::SoftLine,
            Doc::text("bbbb"),
            Doc::SoftLine,
            Doc::text("cccc"),
        ]));
        assert_eq!(render(&doc, &opts(8)).unwrap(), "aaaa\nbbbb\ncccc");
    }

    #[test]
    fn indent_applies_to_breaks_not_current_line() {
        let doc = Doc::concat([
            Doc::text("head"),
            Doc::indent(Doc::concat([Doc::Line, Doc::text("body")])),
            Doc::Line,
            Doc::text("tail"),
        ]);
        assert_eq!(render(&doc, &opts(80)).unwrap(), "head\n  body\ntail");
    }

    #[test]
    fn softline_outside_group_breaks() {
        let doc = Doc::concat([Doc::text("a"), Doc::SoftLine, Doc::text("b")]);
        assert_eq!(render(&doc, &opts(80)).unwrap(), "a\nb");
    }

    #[test]
    fn hard_line_inside_group_forces_surrounding_fit_check() {
        // The group fits because measurement stops at the hard Line.
        let doc = Doc::group(Doc::concat([
            Doc::text("ab"),
            Doc::SoftLine,
            Doc::text("cd"),
            Doc::Line,
            Doc::text("the rest can be very long indeed"),
        ]));
        let rendered = render(&doc, &opts(8)).unwrap();
        assert_eq!(rendered, "ab cd\nthe rest can be very long indeed");
    }

    #[test]
    fn crlf_newline_and_custom_indent() {
        let doc = Doc::concat([
            Doc::text("a"),
            Doc::indent(Doc::concat([Doc::Line, Doc::text("b")])),
        ]);
        let options = RenderOptions {
            line_width: 80,
            indent: "    ".to_string(),
            newline: "\r\n".to_string(),
        };
        assert_eq!(render(&doc, &options).unwrap(), "a\r\n    b");
    }

    #[test]
    fn invalid_newline_rejected() {
        let options = RenderOptions { newline: "\r".to_string(), ..RenderOptions::default() };
        assert_eq!(
            render(&Doc::text("x"), &options),
            Err(RenderError::InvalidNewline("\r".to_string()))
        );
    }

    #[test]
    fn render_is_deterministic() {
        let doc = Doc::group(Doc::concat([
            Doc::text("one"),
            Doc::SoftLine,
            Doc::text("two"),
            Doc::SoftLine,
            Doc::text("three"),
        ]));
        let first = render(&doc, &opts(10)).unwrap();
        let second = render(&doc, &opts(10)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn flat_width_measures() {
        let doc = Doc::concat([Doc::text("ab"), Doc::SoftLine, Doc::text("cd")]);
        assert_eq!(flat_width(&doc), Some(5));
        assert_eq!(flat_width(&Doc::concat([Doc::text("x"), Doc::Line])), None);
    }
}
