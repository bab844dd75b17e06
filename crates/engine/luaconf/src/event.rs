//! Structural events emitted while walking a Lua value

use std::fmt;

/// One unit of the event stream
///
/// Events nest: every `ObjectOpen` is closed by an `ObjectClose` at the same depth
/// (likewise for arrays), a `Key` is followed by exactly one value, and a `TypeTag`
/// is followed by exactly one value holding the tagged payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Event {
    /// Start of a map table
    ObjectOpen,
    /// End of a map table
    ObjectClose,
    /// Start of a sequence table
    ArrayOpen,
    /// End of a sequence table
    ArrayClose,
    /// Map key, rendered as text
    Key(String),
    /// Scalar value, rendered as text
    Primitive(String),
    /// Variant name of a tagged carrier
    TypeTag(String),
}

impl Event {
    /// True for events that begin a value (in a sequence, after a key or after a tag)
    pub fn starts_value(&self) -> bool {
        matches!(
            self,
            Event::ObjectOpen | Event::ArrayOpen | Event::Primitive(_) | Event::TypeTag(_)
        )
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::ObjectOpen => f.write_str("start of map"),
            Event::ObjectClose => f.write_str("end of map"),
            Event::ArrayOpen => f.write_str("start of sequence"),
            Event::ArrayClose => f.write_str("end of sequence"),
            Event::Key(key) => write!(f, "key `{}`", key),
            Event::Primitive(text) => write!(f, "value `{}`", text),
            Event::TypeTag(name) => write!(f, "tag `{}`", name),
        }
    }
}
