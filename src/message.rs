//! Log message variants and the fixed strings used to render them.
//!
//! A call to [`Logger::output`](crate::logger::Logger::output) takes a slice
//! of [`LogMessage`]s. Each variant is rendered differently: plain text is a
//! line, headings get a bracketed prefix and a blank line before them, and
//! arbitrary serializable values are dumped as YAML inside a bordered,
//! folded block.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::Result;
use crate::pretty;

/// One indentation unit.
pub const TAB: &str = "\t";
/// Marker placed after the indentation of bordered lines.
pub const BORDER: &str = " | ";
/// Opens a foldable region.
pub const FOLDING_OPEN: &str = "|{";
/// Closes a foldable region.
pub const FOLDING_CLOSE: &str = "}|";
/// Rule written for [`LogMessage::Separator`].
pub const SINGLE_LINE: &str =
    "--------------------------------------------------------------------------------";
/// Rule written for [`LogMessage::DoubleSeparator`].
pub const DOUBLE_LINE: &str =
    "================================================================================";

/// Heading levels, from most to least prominent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
}

impl HeadingLevel {
    /// The prefix written before the heading text.
    pub fn prefix(self) -> &'static str {
        match self {
            HeadingLevel::H1 => "{**} ",
            HeadingLevel::H2 => "{++} ",
            HeadingLevel::H3 => "{--} ",
            HeadingLevel::H4 => " {*} ",
            HeadingLevel::H5 => " {+} ",
            HeadingLevel::H6 => " {-} ",
        }
    }
}

/// A single element of a log call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogMessage {
    /// Written as one (possibly multi-line) line.
    Text(String),
    /// A blank line, then the level's prefix and the text.
    Heading(HeadingLevel, String),
    /// An 80 column `-` rule.
    Separator,
    /// An 80 column `=` rule.
    DoubleSeparator,
    /// `TRUE` or `FALSE`.
    Boolean(bool),
    /// `NIL`, for an absent value.
    Nil,
    /// A serialized value, written as a bordered and folded block.
    Dump { type_name: String, body: String },
}

impl LogMessage {
    pub fn text(text: impl Into<String>) -> Self {
        LogMessage::Text(text.into())
    }

    pub fn heading(level: HeadingLevel, text: impl Into<String>) -> Self {
        LogMessage::Heading(level, text.into())
    }

    /// Serialize `value` to YAML for a folded dump block.
    ///
    /// The block header names the value's type without its module path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Yaml`](crate::error::Error::Yaml) when the value
    /// cannot be serialized.
    pub fn dump<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        let body = serde_yaml::to_string(value)?;
        Ok(LogMessage::Dump {
            type_name: short_type_name::<T>().to_string(),
            body: body.trim_end_matches('\n').to_string(),
        })
    }

    /// Render a string map as an aligned `key => |value|` table.
    pub fn table(map: &BTreeMap<String, String>, value_width: usize) -> Self {
        LogMessage::Text(pretty::table(map, value_width))
    }

    /// The message as plain text, without any decoration.
    ///
    /// Used when recording failures.
    pub fn plain_text(&self) -> String {
        match self {
            LogMessage::Text(text) => text.clone(),
            LogMessage::Heading(_, text) => text.clone(),
            LogMessage::Separator => SINGLE_LINE.to_string(),
            LogMessage::DoubleSeparator => DOUBLE_LINE.to_string(),
            LogMessage::Boolean(true) => "TRUE".to_string(),
            LogMessage::Boolean(false) => "FALSE".to_string(),
            LogMessage::Nil => "NIL".to_string(),
            LogMessage::Dump { type_name, body } => format!("[= {} =]\n{}", type_name, body),
        }
    }
}

impl From<&str> for LogMessage {
    fn from(text: &str) -> Self {
        LogMessage::Text(text.to_string())
    }
}

impl From<String> for LogMessage {
    fn from(text: String) -> Self {
        LogMessage::Text(text)
    }
}

impl From<bool> for LogMessage {
    fn from(value: bool) -> Self {
        LogMessage::Boolean(value)
    }
}

impl<T: Into<LogMessage>> From<Option<T>> for LogMessage {
    fn from(value: Option<T>) -> Self {
        value.map_or(LogMessage::Nil, Into::into)
    }
}

fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Episode {
        show: String,
        season: u32,
    }

    #[test]
    fn test_heading_prefixes() {
        assert_eq!(HeadingLevel::H1.prefix(), "{**} ");
        assert_eq!(HeadingLevel::H3.prefix(), "{--} ");
        assert_eq!(HeadingLevel::H6.prefix(), " {-} ");
    }

    #[test]
    fn test_rules_are_80_columns() {
        assert_eq!(SINGLE_LINE.len(), 80);
        assert_eq!(DOUBLE_LINE.len(), 80);
        assert!(SINGLE_LINE.chars().all(|c| c == '-'));
        assert!(DOUBLE_LINE.chars().all(|c| c == '='));
    }

    #[test]
    fn test_dump_uses_short_type_name() {
        let episode = Episode {
            show: "Columbo".to_string(),
            season: 2,
        };
        let message = LogMessage::dump(&episode).unwrap();
        match message {
            LogMessage::Dump { type_name, body } => {
                assert_eq!(type_name, "Episode");
                assert_eq!(body, "show: Columbo\nseason: 2");
            }
            other => panic!("expected dump, got {:?}", other),
        }
    }

    #[test]
    fn test_dump_generic_type_name() {
        let message = LogMessage::dump(&vec![1, 2]).unwrap();
        match message {
            LogMessage::Dump { type_name, body } => {
                assert_eq!(type_name, "Vec");
                assert_eq!(body, "- 1\n- 2");
            }
            other => panic!("expected dump, got {:?}", other),
        }
    }

    #[test]
    fn test_conversions() {
        assert_eq!(LogMessage::from("hi"), LogMessage::Text("hi".to_string()));
        assert_eq!(LogMessage::from(true), LogMessage::Boolean(true));
        assert_eq!(LogMessage::from(None::<&str>), LogMessage::Nil);
        assert_eq!(LogMessage::from(Some("x")), LogMessage::text("x"));
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(LogMessage::Nil.plain_text(), "NIL");
        assert_eq!(
            LogMessage::heading(HeadingLevel::H2, "Section").plain_text(),
            "Section"
        );
        assert_eq!(LogMessage::Boolean(false).plain_text(), "FALSE");
    }
}
