//! Lazy depth-first walk over a Lua value
//!
//! The walker keeps an explicit stack of levels instead of recursing. Each level
//! lazily yields steps: an event plus, for containers and tagged carriers, the
//! level holding that value's children. Pulling one event does the minimum work
//! needed to produce it, so a consumer that stops early never touches the rest of
//! the tree.

use crate::error::Fault;
use crate::value::{self, Dynamic, TableKind};
use crate::{Environment, Error, Event, Options, Path, Result};
use mlua::prelude::*;
use std::marker::PhantomData;
use tracing::trace;

/// Walk `root`, yielding each event with the path that ends at it
pub fn walk(env: &Environment, root: LuaValue) -> Walker<'_> {
    Walker::new(env, root, Path::new(""), &Options::default())
}

/// Iterator over `(Event, Path)` pairs for one Lua value
///
/// Not rewindable: walking again requires a new walker. After an error the walker
/// yields nothing more.
pub struct Walker<'env> {
    stack: Vec<Level>,
    path: Path,
    cursor: Cursor,
    _env: PhantomData<&'env Environment>,
}

/// Per-walk settings shared by every level
struct Cursor {
    next: LuaFunction,
    max_depth: usize,
    strict_integers: bool,
}

struct Step {
    event: Event,
    level: Option<Level>,
}

impl Step {
    fn leaf(event: Event) -> Self {
        Self { event, level: None }
    }

    fn descend(event: Event, level: Level) -> Self {
        Self {
            event,
            level: Some(level),
        }
    }
}

enum Level {
    /// A single value still to be processed
    Value(Option<LuaValue>),
    /// Key/value pairs of a map, then `ObjectClose`
    Entries {
        table: LuaTable,
        key: LuaValue,
        pending: Option<LuaValue>,
        closed: bool,
    },
    /// Elements `1..=len` of a sequence, then `ArrayClose`
    Elements {
        table: LuaTable,
        index: usize,
        len: usize,
        closed: bool,
    },
}

impl Level {
    fn pull(&mut self, cursor: &Cursor) -> std::result::Result<Option<Step>, Fault> {
        match self {
            Level::Value(value) => match value.take() {
                Some(value) => cursor.process(value).map(Some),
                None => Ok(None),
            },
            Level::Entries {
                table,
                key,
                pending,
                closed,
            } => {
                if let Some(value) = pending.take() {
                    return cursor.process(value).map(Some);
                }
                if *closed {
                    return Ok(None);
                }
                let (k, v): (LuaValue, LuaValue) =
                    cursor.next.call((table.clone(), key.clone()))?;
                if k.is_nil() {
                    *closed = true;
                    return Ok(Some(Step::leaf(Event::ObjectClose)));
                }
                let text = value::key_text(k.clone())?;
                *key = k;
                *pending = Some(v);
                Ok(Some(Step::leaf(Event::Key(text))))
            }
            Level::Elements {
                table,
                index,
                len,
                closed,
            } => {
                if *index < *len {
                    *index += 1;
                    let element: LuaValue = table.raw_get(*index)?;
                    return cursor.process(element).map(Some);
                }
                if *closed {
                    return Ok(None);
                }
                *closed = true;
                Ok(Some(Step::leaf(Event::ArrayClose)))
            }
        }
    }
}

impl Cursor {
    fn process(&self, value: LuaValue) -> std::result::Result<Step, Fault> {
        match Dynamic::from_lua(value)? {
            Dynamic::Scalar(value::Scalar::Float(f))
                if self.strict_integers && value::is_imprecise_integer(f) =>
            {
                Err(Fault::invalid(format!(
                    "Number [{}] is too large to be represented exactly",
                    f
                )))
            }
            Dynamic::Scalar(scalar) => Ok(Step::leaf(Event::Primitive(scalar.to_text()))),
            Dynamic::Table(table) => match value::classify(&table)? {
                TableKind::Tagged { name, payload } => Ok(Step::descend(
                    Event::TypeTag(name),
                    Level::Value(Some(payload)),
                )),
                TableKind::Map => Ok(Step::descend(
                    Event::ObjectOpen,
                    Level::Entries {
                        table,
                        key: LuaValue::Nil,
                        pending: None,
                        closed: false,
                    },
                )),
                TableKind::Sequence(len) => Ok(Step::descend(
                    Event::ArrayOpen,
                    Level::Elements {
                        table,
                        index: 0,
                        len,
                        closed: false,
                    },
                )),
            },
        }
    }
}

impl<'env> Walker<'env> {
    /// Start a walk whose paths are rooted at `path`
    pub fn new(env: &'env Environment, root: LuaValue, path: Path, options: &Options) -> Self {
        Self {
            stack: vec![Level::Value(Some(root))],
            path,
            cursor: Cursor {
                next: env.next_function().clone(),
                max_depth: options.max_depth,
                strict_integers: options.strict_integers,
            },
            _env: PhantomData,
        }
    }

    /// Path of the last event produced
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn fail(&mut self, fault: Fault) -> Error {
        self.stack.clear();
        fault.at(&self.path)
    }
}

impl Iterator for Walker<'_> {
    type Item = Result<(Event, Path)>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let level = self.stack.last_mut()?;
            let step = match level.pull(&self.cursor) {
                Ok(Some(step)) => step,
                Ok(None) => {
                    self.stack.pop();
                    continue;
                }
                Err(fault) => return Some(Err(self.fail(fault))),
            };
            // A single-value level is done once its step is out.
            if matches!(self.stack.last(), Some(Level::Value(None))) {
                self.stack.pop();
            }

            if let Some(level) = step.level {
                if self.stack.len() >= self.cursor.max_depth {
                    let fault = Fault::invalid(format!(
                        "Nesting exceeds {} levels (is a table referencing itself?)",
                        self.cursor.max_depth
                    ));
                    return Some(Err(self.fail(fault)));
                }
                self.stack.push(level);
            }

            self.path = self.path.push(step.event.clone());
            trace!(event = %step.event, depth = self.stack.len(), "walk");
            return Some(Ok((step.event, self.path.clone())));
        }
    }
}
