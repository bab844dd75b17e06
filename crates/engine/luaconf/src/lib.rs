//! Lua scripts as configuration
//!
//! A configuration is a Lua chunk that evaluates to a value. That value is walked
//! lazily into a stream of structural events which serde turns into typed Rust
//! data. Polymorphic types get one constructor per variant in the script's
//! globals, so a script can say which variant it means:
//!
//! ```lua
//! return {
//!     name = "demo",
//!     shapes = { circle { radius = 1 }, square { side = 2.5 } },
//! }
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use luaconf::LuaConf;
//!
//! #[derive(serde::Deserialize)]
//! enum Shape {
//!     #[serde(rename = "circle")]
//!     Circle { radius: f64 },
//!     #[serde(rename = "square")]
//!     Square { side: f64 },
//! }
//!
//! #[derive(serde::Deserialize)]
//! struct Scene {
//!     name: String,
//!     shapes: Vec<Shape>,
//! }
//!
//! let scene: Scene = LuaConf::new()
//!     .variants::<Shape>()?
//!     .parse_file("config/scene.lua")?;
//! ```

mod de;
mod env;
mod error;
mod event;
mod options;
mod path;
mod tags;
mod value;
mod walker;

pub use de::{from_events, Deserializer};
pub use env::{Environment, Evaluate, ScriptEvaluator, Source};
pub use error::{Error, Result};
pub use event::Event;
pub use options::Options;
pub use path::Path;
pub use tags::{bind, Variant, VariantSet};
pub use value::{format_float, Scalar, TYPE_KEY, VALUE_KEY};
pub use walker::{walk, Walker};

// Re-export mlua for downstream crates
pub use mlua;

use serde::de::DeserializeOwned;
use tracing::debug;

/// Loader for Lua configurations
///
/// Holds the polymorphic types whose tag constructors are installed before each
/// script runs. Every load creates its own [`Environment`].
pub struct LuaConf<E = ScriptEvaluator> {
    variants: Vec<VariantSet>,
    options: Options,
    evaluator: E,
}

impl LuaConf {
    pub fn new() -> Self {
        Self {
            variants: Vec::new(),
            options: Options::default(),
            evaluator: ScriptEvaluator,
        }
    }
}

impl Default for LuaConf {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Evaluate> LuaConf<E> {
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Replace the evaluator that turns source into a root value
    pub fn with_evaluator<F: Evaluate>(self, evaluator: F) -> LuaConf<F> {
        LuaConf {
            variants: self.variants,
            options: self.options,
            evaluator,
        }
    }

    /// Register the variants of a serde enum as tag constructors
    pub fn variants<T: DeserializeOwned>(self) -> Result<Self> {
        self.register(VariantSet::of::<T>()?)
    }

    /// Register an explicit variant set
    ///
    /// Fails if a name repeats within the set or is already declared by a
    /// different base type.
    pub fn register(mut self, set: VariantSet) -> Result<Self> {
        if let Some(err) = set.repeated() {
            return Err(err);
        }
        if let Some(err) = self.variants.iter().find_map(|known| known.conflict(&set)) {
            return Err(err);
        }
        if !self.variants.contains(&set) {
            self.variants.push(set);
        }
        Ok(self)
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Evaluate inline source
    pub fn load_str(&self, code: &str) -> Result<Document> {
        self.load(Source::Text {
            code,
            name: &self.options.chunk_name,
        })
    }

    /// Evaluate a script file
    pub fn load_file(&self, path: impl AsRef<std::path::Path>) -> Result<Document> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        self.load(Source::File(path))
    }

    pub fn parse_str<T: DeserializeOwned>(&self, code: &str) -> Result<T> {
        self.load_str(code)?.deserialize()
    }

    pub fn parse_file<T: DeserializeOwned>(&self, path: impl AsRef<std::path::Path>) -> Result<T> {
        self.load_file(path)?.deserialize()
    }

    fn load(&self, source: Source<'_>) -> Result<Document> {
        let mut env = Environment::new()?;
        for set in &self.variants {
            bind(&mut env, set)?;
        }
        let root = self.evaluator.evaluate(&env, source)?;
        debug!(source = %source.label(), kind = root.type_name(), "evaluated configuration");
        Ok(Document {
            env,
            root,
            source: source.label(),
            options: self.options.clone(),
        })
    }
}

/// Result of evaluating one configuration script
///
/// Owns the Lua environment the root value lives in.
pub struct Document {
    env: Environment,
    root: mlua::Value,
    source: String,
    options: Options,
}

impl Document {
    pub fn root(&self) -> &mlua::Value {
        &self.root
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    /// Source label, used as the root of every event path
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Start a fresh walk over the root value
    pub fn events(&self) -> Walker<'_> {
        Walker::new(
            &self.env,
            self.root.clone(),
            Path::new(self.source.as_str()),
            &self.options,
        )
    }

    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        from_events(self.events())
    }
}

/// Parse inline source with no tag constructors
pub fn from_str<T: DeserializeOwned>(code: &str) -> Result<T> {
    LuaConf::new().parse_str(code)
}

/// Parse a script file with no tag constructors
pub fn from_file<T: DeserializeOwned>(path: impl AsRef<std::path::Path>) -> Result<T> {
    LuaConf::new().parse_file(path)
}
