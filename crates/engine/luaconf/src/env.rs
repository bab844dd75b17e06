//! Lua environment and script evaluation
//!
//! Every load gets a fresh [`Environment`]: tag constructors installed for one
//! configuration are never visible to another.

use crate::{Error, Result};
use mlua::prelude::*;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Lua state scoped to a single load
pub struct Environment {
    lua: Lua,
    next: LuaFunction,
    /// Bound tag name -> base type that declared it
    tags: HashMap<String, String>,
}

impl Environment {
    /// Create a Lua state with the safe standard libraries loaded
    pub fn new() -> Result<Self> {
        let lua = Lua::new();
        // Captured before any script runs; a script may reassign the global.
        let next = lua.globals().raw_get::<LuaFunction>("next")?;
        debug!("created Lua environment");
        Ok(Self {
            lua,
            next,
            tags: HashMap::new(),
        })
    }

    /// Get the underlying Lua state
    pub fn lua(&self) -> &Lua {
        &self.lua
    }

    /// Install a named global callable
    pub fn install(&self, name: &str, function: LuaFunction) -> Result<()> {
        self.lua.globals().raw_set(name, function)?;
        Ok(())
    }

    /// Check whether a global with this name already exists
    pub fn has_global(&self, name: &str) -> Result<bool> {
        let value: LuaValue = self.lua.globals().raw_get(name)?;
        Ok(!value.is_nil())
    }

    /// Base type a tag name is bound to, if any
    pub fn tag_owner(&self, name: &str) -> Option<&str> {
        self.tags.get(name).map(String::as_str)
    }

    pub(crate) fn record_tag(&mut self, name: &str, base: &str) {
        self.tags.insert(name.to_string(), base.to_string());
    }

    pub(crate) fn next_function(&self) -> &LuaFunction {
        &self.next
    }
}

/// Script source handed to an evaluator
#[derive(Debug, Clone, Copy)]
pub enum Source<'a> {
    /// Inline code with a chunk name used in Lua diagnostics
    Text { code: &'a str, name: &'a str },
    /// Script file
    File(&'a Path),
}

impl Source<'_> {
    /// Label used as the root of event paths
    pub fn label(&self) -> String {
        match self {
            Source::Text { name, .. } => name.to_string(),
            Source::File(path) => path.display().to_string(),
        }
    }
}

/// Turns script source into a root value
pub trait Evaluate {
    fn evaluate(&self, env: &Environment, source: Source<'_>) -> Result<LuaValue>;
}

/// Default evaluator backed by the Lua interpreter
///
/// A chunk that parses as an expression yields its value; otherwise the chunk runs
/// as statements and yields its first return value.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptEvaluator;

impl Evaluate for ScriptEvaluator {
    fn evaluate(&self, env: &Environment, source: Source<'_>) -> Result<LuaValue> {
        let value = match source {
            Source::Text { code, name } => {
                debug!(chunk = %name, "evaluating script");
                env.lua().load(code).set_name(format!("={}", name)).eval()?
            }
            Source::File(path) => {
                debug!(path = %path.display(), "evaluating script file");
                let code = std::fs::read_to_string(path).map_err(|err| {
                    if err.kind() == std::io::ErrorKind::NotFound {
                        Error::FileNotFound(path.to_path_buf())
                    } else {
                        Error::Io(err)
                    }
                })?;
                env.lua()
                    .load(code.as_str())
                    .set_name(format!("@{}", path.display()))
                    .eval()?
            }
        };
        Ok(value)
    }
}
