use std::env;

/// Loader configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Chunk name for inline sources, shown in Lua errors and event paths
    pub chunk_name: String,
    /// Deepest table nesting the walker follows before failing
    pub max_depth: usize,
    /// Fail on integral floats too large to be represented exactly
    pub strict_integers: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            chunk_name: "text".to_string(),
            max_depth: 128,
            strict_integers: false,
        }
    }
}

impl Options {
    /// Builds options from `LUACONF_*` environment variables, falling back to the
    /// defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let chunk_name = env::var("LUACONF_CHUNK_NAME").unwrap_or(defaults.chunk_name);
        let max_depth = env::var("LUACONF_MAX_DEPTH")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|depth| *depth > 0)
            .unwrap_or(defaults.max_depth);
        let strict_integers = env::var("LUACONF_STRICT_INTEGERS")
            .ok()
            .and_then(|v| parse_flag(&v))
            .unwrap_or(defaults.strict_integers);

        Self {
            chunk_name,
            max_depth,
            strict_integers,
        }
    }

    pub fn with_chunk_name(mut self, name: impl Into<String>) -> Self {
        self.chunk_name = name.into();
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_strict_integers(mut self, strict: bool) -> Self {
        self.strict_integers = strict;
        self
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag(" off "), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn test_builders() {
        let options = Options::default()
            .with_chunk_name("conf")
            .with_max_depth(4)
            .with_strict_integers(true);
        assert_eq!(options.chunk_name, "conf");
        assert_eq!(options.max_depth, 4);
        assert!(options.strict_integers);
    }

    #[test]
    fn test_from_env_falls_back_to_defaults() {
        let defaults = Options::default();

        env::remove_var("LUACONF_MAX_DEPTH");
        env::remove_var("LUACONF_STRICT_INTEGERS");
        let unset = Options::from_env();
        assert_eq!(unset.max_depth, defaults.max_depth);
        assert_eq!(unset.strict_integers, defaults.strict_integers);

        env::set_var("LUACONF_MAX_DEPTH", "0");
        env::set_var("LUACONF_STRICT_INTEGERS", "junk");
        let invalid = Options::from_env();
        assert_eq!(invalid.max_depth, defaults.max_depth);
        assert!(!invalid.strict_integers);

        env::set_var("LUACONF_MAX_DEPTH", "junk");
        assert_eq!(Options::from_env().max_depth, defaults.max_depth);

        env::set_var("LUACONF_MAX_DEPTH", "32");
        env::set_var("LUACONF_STRICT_INTEGERS", "yes");
        let set = Options::from_env();
        assert_eq!(set.max_depth, 32);
        assert!(set.strict_integers);

        env::remove_var("LUACONF_MAX_DEPTH");
        env::remove_var("LUACONF_STRICT_INTEGERS");
    }
}
