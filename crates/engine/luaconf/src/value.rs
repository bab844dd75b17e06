//! Lua values as seen by the walker
//!
//! Converts `mlua::Value` into a closed set of kinds right after evaluation and
//! formats scalars into the text carried by primitive events.

use crate::error::Fault;
use mlua::prelude::*;
use std::fmt;

/// Table key marking a tagged carrier
pub const TYPE_KEY: &str = "_type";
/// Table key holding a tagged carrier's payload
pub const VALUE_KEY: &str = "_value";

/// Largest integer magnitude an `f64` represents exactly (2^53)
const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_992.0;

/// Scalar Lua value
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Nil,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl Scalar {
    /// Canonical text of the scalar in the event stream
    pub fn to_text(&self) -> String {
        match self {
            Scalar::Nil => "null".to_string(),
            Scalar::Boolean(b) => b.to_string(),
            Scalar::Integer(i) => i.to_string(),
            Scalar::Float(f) => format_float(*f),
            Scalar::String(s) => s.clone(),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

/// Format a float, dropping the fraction when the value is integral
///
/// Integral values inside the `i64` range print as integers. Integral values
/// outside it print with Rust's float display, which also has no fraction but may
/// not round-trip the digits the script author wrote.
pub fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        if value >= i64::MIN as f64 && value < i64::MAX as f64 {
            return (value as i64).to_string();
        }
        return format!("{}", value);
    }
    format!("{}", value)
}

/// True when an integral float may have lost precision
pub fn is_imprecise_integer(value: f64) -> bool {
    value.is_finite() && value.fract() == 0.0 && value.abs() > MAX_EXACT_FLOAT
}

/// A Lua value the walker knows how to emit
#[derive(Debug, Clone)]
pub(crate) enum Dynamic {
    Scalar(Scalar),
    Table(LuaTable),
}

impl Dynamic {
    pub(crate) fn from_lua(value: LuaValue) -> Result<Self, Fault> {
        let scalar = match value {
            LuaValue::Nil => Scalar::Nil,
            LuaValue::Boolean(b) => Scalar::Boolean(b),
            LuaValue::Integer(i) => Scalar::Integer(i),
            LuaValue::Number(n) => Scalar::Float(n),
            LuaValue::String(s) => Scalar::String(lua_text(&s)?),
            LuaValue::Table(t) => return Ok(Dynamic::Table(t)),
            other => {
                return Err(Fault::invalid(format!(
                    "Unknown data type [{}]",
                    other.type_name()
                )))
            }
        };
        Ok(Dynamic::Scalar(scalar))
    }
}

/// How a table is presented in the event stream
#[derive(Debug)]
pub(crate) enum TableKind {
    /// Carrier produced by a tag constructor
    Tagged { name: String, payload: LuaValue },
    /// Contiguous values from index 1
    Sequence(usize),
    /// Anything else, including the empty table
    Map,
}

pub(crate) fn classify(table: &LuaTable) -> Result<TableKind, Fault> {
    match table.raw_get::<LuaValue>(TYPE_KEY)? {
        LuaValue::Nil => {}
        LuaValue::String(name) => {
            return Ok(TableKind::Tagged {
                name: lua_text(&name)?,
                payload: table.raw_get(VALUE_KEY)?,
            })
        }
        other => {
            return Err(Fault::invalid(format!(
                "`{}` must be a string, found [{}]",
                TYPE_KEY,
                other.type_name()
            )))
        }
    }
    if table.raw_get::<LuaValue>(1)?.is_nil() {
        Ok(TableKind::Map)
    } else {
        Ok(TableKind::Sequence(table.raw_len()))
    }
}

/// Text of a map key
pub(crate) fn key_text(key: LuaValue) -> Result<String, Fault> {
    match Dynamic::from_lua(key)? {
        Dynamic::Scalar(scalar) => Ok(scalar.to_text()),
        Dynamic::Table(_) => Err(Fault::invalid("Unsupported key type [table]")),
    }
}

fn lua_text(s: &LuaString) -> Result<String, Fault> {
    s.to_str()
        .map(|s| (*s).to_owned())
        .map_err(|_| Fault::invalid("String is not valid UTF-8"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_text() {
        assert_eq!(Scalar::Nil.to_text(), "null");
        assert_eq!(Scalar::Boolean(true).to_text(), "true");
        assert_eq!(Scalar::Boolean(false).to_text(), "false");
        assert_eq!(Scalar::Integer(-42).to_text(), "-42");
        assert_eq!(Scalar::String("a \"b\"\n".into()).to_text(), "a \"b\"\n");
    }

    #[test]
    fn test_integral_floats_render_as_integers() {
        for n in [0.0, 1.0, -3.0, 1024.0, 1e15] {
            let text = format_float(n);
            assert_eq!(text.parse::<i64>().unwrap() as f64, n);
        }
        assert_eq!(format_float(-0.0), "0");
    }

    #[test]
    fn test_fractional_floats_keep_fraction() {
        for n in [0.5, -2.25, 1e-7, 123456.789] {
            let text = format_float(n);
            assert!(text.contains('.') || text.contains('e'), "{}", text);
            assert_eq!(text.parse::<f64>().unwrap(), n);
        }
    }

    #[test]
    fn test_huge_integral_float_has_no_fraction() {
        let text = format_float(1e20);
        assert_eq!(text, "100000000000000000000");
        assert!(is_imprecise_integer(1e20));
        assert!(!is_imprecise_integer(1e15));
        assert!(!is_imprecise_integer(0.5));
    }

    #[test]
    fn test_classify_tables() {
        let lua = Lua::new();
        let seq: LuaTable = lua.load("{1, 2, 3}").eval().unwrap();
        let map: LuaTable = lua.load("{a = 1}").eval().unwrap();
        let empty: LuaTable = lua.load("{}").eval().unwrap();
        let tagged: LuaTable = lua.load("{1, _type = 'x', _value = 5}").eval().unwrap();

        assert!(matches!(classify(&seq).unwrap(), TableKind::Sequence(3)));
        assert!(matches!(classify(&map).unwrap(), TableKind::Map));
        assert!(matches!(classify(&empty).unwrap(), TableKind::Map));
        match classify(&tagged).unwrap() {
            TableKind::Tagged { name, payload } => {
                assert_eq!(name, "x");
                assert_eq!(payload, LuaValue::Integer(5));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_rejects_functions() {
        let lua = Lua::new();
        let print: LuaValue = lua.globals().get("print").unwrap();
        match Dynamic::from_lua(print) {
            Err(Fault::Invalid(message)) => assert!(message.contains("function")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_key_text() {
        assert_eq!(key_text(LuaValue::Integer(7)).unwrap(), "7");
        assert_eq!(key_text(LuaValue::Number(2.5)).unwrap(), "2.5");
        assert_eq!(key_text(LuaValue::Boolean(true)).unwrap(), "true");
    }
}
