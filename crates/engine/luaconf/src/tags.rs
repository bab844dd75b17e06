//! Tag constructors for polymorphic types
//!
//! Each variant of a polymorphic type gets a global Lua function named after it.
//! Calling `circle { radius = 2 }` in a script produces the carrier table
//! `{ _type = "circle", _value = { radius = 2 } }`, which the walker reports as
//! a `TypeTag("circle")` followed by the payload.

use crate::value::{TYPE_KEY, VALUE_KEY};
use crate::{Environment, Error, Result};
use mlua::prelude::*;
use serde::de::{self, DeserializeOwned, Visitor};
use tracing::{debug, warn};

/// Declared variant names of one polymorphic base type, in declaration order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantSet {
    base: String,
    names: Vec<String>,
}

/// One variant of a [`VariantSet`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Variant<'a> {
    pub base: &'a str,
    pub index: usize,
    pub name: &'a str,
}

impl VariantSet {
    pub fn new<I, S>(base: impl Into<String>, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            base: base.into(),
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Read the variant names of a serde enum
    ///
    /// Names honour `#[serde(rename)]`. Newtype structs and `Option` around the
    /// enum are looked through.
    pub fn of<T: DeserializeOwned>() -> Result<Self> {
        let mut reader = VariantReader::default();
        let _ = T::deserialize(&mut reader);
        match reader.found {
            Some((base, names)) => Ok(Self::new(base, names.iter().copied())),
            None => Err(Error::NotPolymorphic(std::any::type_name::<T>().to_string())),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn iter(&self) -> impl Iterator<Item = Variant<'_>> {
        self.names.iter().enumerate().map(move |(index, name)| Variant {
            base: &self.base,
            index,
            name,
        })
    }

    /// First name declared more than once within this set
    pub fn repeated(&self) -> Option<Error> {
        self.names
            .iter()
            .enumerate()
            .find(|(k, name)| self.names[..*k].contains(name))
            .map(|(_, name)| Error::DuplicateTag {
                name: name.clone(),
                first: self.base.clone(),
                second: self.base.clone(),
            })
    }

    /// First name this set shares with `other` under a different base type
    pub fn conflict(&self, other: &VariantSet) -> Option<Error> {
        if self.base == other.base {
            return None;
        }
        self.names
            .iter()
            .find(|name| other.names.contains(name))
            .map(|name| Error::DuplicateTag {
                name: name.clone(),
                first: self.base.clone(),
                second: other.base.clone(),
            })
    }
}

/// Install one constructor per variant into the environment's globals
///
/// Nothing is installed when a name repeats within the set or is already bound
/// to another base type.
pub fn bind(env: &mut Environment, variants: &VariantSet) -> Result<()> {
    if let Some(err) = variants.repeated() {
        return Err(err);
    }
    for variant in variants.iter() {
        if let Some(owner) = env.tag_owner(variant.name) {
            if owner != variant.base {
                return Err(Error::DuplicateTag {
                    name: variant.name.to_string(),
                    first: owner.to_string(),
                    second: variant.base.to_string(),
                });
            }
        }
    }

    for variant in variants.iter() {
        if env.tag_owner(variant.name).is_some() {
            continue;
        }
        if env.has_global(variant.name)? {
            warn!(tag = %variant.name, "tag constructor shadows an existing global");
        }

        let name = variant.name.to_string();
        let constructor = env
            .lua()
            .create_function(move |lua, value: LuaValue| {
                let carrier = lua.create_table()?;
                carrier.raw_set(TYPE_KEY, name.as_str())?;
                carrier.raw_set(VALUE_KEY, value)?;
                Ok(carrier)
            })?;
        env.install(variant.name, constructor)?;
        env.record_tag(variant.name, variant.base);
        debug!(tag = %variant.name, base = %variant.base, "bound tag constructor");
    }
    Ok(())
}

/// Deserializer that only records the enum metadata serde hands it
#[derive(Default)]
struct VariantReader {
    found: Option<(&'static str, &'static [&'static str])>,
}

impl<'de> de::Deserializer<'de> for &mut VariantReader {
    type Error = Error;

    fn deserialize_any<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value> {
        Err(Error::Message("not an enum".to_string()))
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_some(self)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value> {
        self.found = Some((name, variants));
        Err(Error::Message("enum found".to_string()))
    }

    serde::forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple tuple_struct map struct
        identifier ignored_any
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[allow(dead_code)]
    #[derive(Deserialize)]
    enum Shape {
        #[serde(rename = "circle")]
        Circle { radius: f64 },
        #[serde(rename = "square")]
        Square { side: f64 },
    }

    #[allow(dead_code)]
    #[derive(Deserialize)]
    struct Wrapped(Shape);

    #[allow(dead_code)]
    #[derive(Deserialize)]
    struct Plain {
        a: i32,
    }

    #[test]
    fn test_variants_of_enum() {
        let set = VariantSet::of::<Shape>().unwrap();
        assert_eq!(set.base(), "Shape");
        assert_eq!(set.names(), ["circle", "square"]);
        let second = set.iter().nth(1).unwrap();
        assert_eq!(second.index, 1);
        assert_eq!(second.name, "square");
    }

    #[test]
    fn test_variants_through_wrappers() {
        assert_eq!(VariantSet::of::<Wrapped>().unwrap().base(), "Shape");
        assert_eq!(VariantSet::of::<Option<Shape>>().unwrap().base(), "Shape");
    }

    #[test]
    fn test_non_enum_is_rejected() {
        assert!(matches!(
            VariantSet::of::<Plain>(),
            Err(Error::NotPolymorphic(_))
        ));
    }

    #[test]
    fn test_bound_constructor_builds_carrier() {
        let mut env = Environment::new().unwrap();
        bind(&mut env, &VariantSet::new("Shape", ["circle"])).unwrap();

        let carrier: LuaTable = env.lua().load("circle { radius = 2 }").eval().unwrap();
        let tag: String = carrier.raw_get(TYPE_KEY).unwrap();
        let payload: LuaTable = carrier.raw_get(VALUE_KEY).unwrap();
        let radius: i64 = payload.raw_get("radius").unwrap();
        assert_eq!(tag, "circle");
        assert_eq!(radius, 2);
    }

    #[test]
    fn test_duplicate_name_fails() {
        let mut env = Environment::new().unwrap();
        bind(&mut env, &VariantSet::new("Shape", ["a", "b"])).unwrap();
        // Same base again is harmless
        bind(&mut env, &VariantSet::new("Shape", ["a", "b"])).unwrap();

        match bind(&mut env, &VariantSet::new("Color", ["red", "b"])) {
            Err(Error::DuplicateTag {
                name,
                first,
                second,
            }) => {
                assert_eq!(name, "b");
                assert_eq!(first, "Shape");
                assert_eq!(second, "Color");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(!env.has_global("red").unwrap());
    }

    #[test]
    fn test_repeated_name_in_one_set_fails() {
        let mut env = Environment::new().unwrap();
        match bind(&mut env, &VariantSet::new("Base", ["a", "b", "a"])) {
            Err(Error::DuplicateTag {
                name,
                first,
                second,
            }) => {
                assert_eq!(name, "a");
                assert_eq!(first, "Base");
                assert_eq!(second, "Base");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(!env.has_global("a").unwrap());
        assert!(!env.has_global("b").unwrap());
        assert!(VariantSet::new("Base", ["a", "b"]).repeated().is_none());
    }

    #[test]
    fn test_conflict_between_sets() {
        let shapes = VariantSet::new("Shape", ["a", "b"]);
        let colors = VariantSet::new("Color", ["b"]);
        assert!(shapes.conflict(&shapes.clone()).is_none());
        assert!(matches!(
            shapes.conflict(&colors),
            Some(Error::DuplicateTag { .. })
        ));
    }
}
