//! Append-only event path used to locate errors
//!
//! A [`Path`] records every event emitted so far. Extending it never touches the
//! existing value: `push` returns a new path sharing its prefix with the old one,
//! so each event handed out by the walker can carry its own path cheaply.

use crate::Event;
use std::fmt;
use std::sync::Arc;

/// Persistent sequence of events, rooted at a source label
#[derive(Clone)]
pub struct Path {
    source: Arc<str>,
    tail: Option<Arc<Node>>,
}

struct Node {
    event: Event,
    parent: Option<Arc<Node>>,
    len: usize,
}

// Unlink iteratively so long paths don't overflow the stack on drop.
impl Drop for Node {
    fn drop(&mut self) {
        let mut parent = self.parent.take();
        while let Some(node) = parent {
            match Arc::try_unwrap(node) {
                Ok(mut node) => parent = node.parent.take(),
                Err(_) => break,
            }
        }
    }
}

impl Path {
    /// Create an empty path for the given source label (e.g. a file name)
    pub fn new(source: impl Into<Arc<str>>) -> Self {
        Self {
            source: source.into(),
            tail: None,
        }
    }

    /// Return a new path with `event` appended
    pub fn push(&self, event: Event) -> Path {
        let len = self.len() + 1;
        Path {
            source: self.source.clone(),
            tail: Some(Arc::new(Node {
                event,
                parent: self.tail.clone(),
                len,
            })),
        }
    }

    /// Number of events in the path
    pub fn len(&self) -> usize {
        self.tail.as_ref().map_or(0, |node| node.len)
    }

    pub fn is_empty(&self) -> bool {
        self.tail.is_none()
    }

    /// Most recent event
    pub fn last(&self) -> Option<&Event> {
        self.tail.as_ref().map(|node| &node.event)
    }

    /// Source label the path is rooted at
    pub fn source(&self) -> &str {
        &self.source
    }

    /// All events, oldest first
    pub fn events(&self) -> Vec<Event> {
        let mut events = Vec::with_capacity(self.len());
        let mut cursor = self.tail.as_deref();
        while let Some(node) = cursor {
            events.push(node.event.clone());
            cursor = node.parent.as_deref();
        }
        events.reverse();
        events
    }

    /// Human-readable position, e.g. `$.shapes[2]<circle>.radius`
    ///
    /// Sequence positions are 1-based to match Lua indexing.
    pub fn location(&self) -> String {
        let mut frames: Vec<Frame> = Vec::new();
        for event in self.events() {
            if event.starts_value() {
                if let Some(Frame::Array(count)) = frames.last_mut() {
                    *count += 1;
                }
            }
            match event {
                Event::ObjectOpen => frames.push(Frame::Object(None)),
                Event::ArrayOpen => frames.push(Frame::Array(0)),
                Event::TypeTag(name) => frames.push(Frame::Tag(name)),
                Event::Key(key) => {
                    if let Some(Frame::Object(slot)) = frames.last_mut() {
                        *slot = Some(key);
                    }
                }
                Event::Primitive(_) => close_tags(&mut frames),
                Event::ObjectClose | Event::ArrayClose => {
                    frames.pop();
                    close_tags(&mut frames);
                }
            }
        }

        let mut out = String::from("$");
        for frame in &frames {
            match frame {
                Frame::Object(Some(key)) if is_identifier(key) => {
                    out.push('.');
                    out.push_str(key);
                }
                Frame::Object(Some(key)) => out.push_str(&format!("[{:?}]", key)),
                Frame::Object(None) => {}
                Frame::Array(0) => {}
                Frame::Array(index) => out.push_str(&format!("[{}]", index)),
                Frame::Tag(name) => out.push_str(&format!("<{}>", name)),
            }
        }
        out
    }
}

enum Frame {
    Object(Option<String>),
    Array(usize),
    Tag(String),
}

/// A completed value also completes any tags wrapping it
fn close_tags(frames: &mut Vec<Frame>) {
    while matches!(frames.last(), Some(Frame::Tag(_))) {
        frames.pop();
    }
}

fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.source.is_empty() {
            f.write_str(&self.location())
        } else {
            write!(f, "{}:{}", self.source, self.location())
        }
    }
}

impl fmt::Debug for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Path")
            .field("source", &self.source)
            .field("events", &self.events())
            .finish()
    }
}
