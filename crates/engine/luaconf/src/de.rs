//! Serde deserializer driven by an event stream
//!
//! Any iterator of `(Event, Path)` pairs can be turned into a typed value. Scalars
//! arrive as text and are parsed into whatever type the target asks for; failures
//! are reported with the path of the event being consumed.

use crate::{Error, Event, Path, Result};
use serde::de::{
    self, DeserializeOwned, DeserializeSeed, EnumAccess, IntoDeserializer, MapAccess, SeqAccess,
    Unexpected, VariantAccess, Visitor,
};

/// Deserialize `T` from a stream of events
pub fn from_events<T, I>(events: I) -> Result<T>
where
    T: DeserializeOwned,
    I: IntoIterator<Item = Result<(Event, Path)>>,
{
    let mut de = Deserializer::new(events.into_iter());
    let value = T::deserialize(&mut de).map_err(|err| de.locate(err))?;
    de.end().map_err(|err| de.locate(err))?;
    Ok(value)
}

/// Deserializer reading one value from an event iterator
pub struct Deserializer<I> {
    events: I,
    peeked: Option<(Event, Path)>,
    path: Path,
}

impl<I> Deserializer<I>
where
    I: Iterator<Item = Result<(Event, Path)>>,
{
    pub fn new(events: I) -> Self {
        Self {
            events,
            peeked: None,
            path: Path::new(""),
        }
    }

    /// Path of the event currently being looked at
    pub fn path(&self) -> &Path {
        match &self.peeked {
            Some((_, path)) => path,
            None => &self.path,
        }
    }

    /// Check that the stream holds nothing after the value
    pub fn end(&mut self) -> Result<()> {
        match self.fetch()? {
            None => Ok(()),
            Some(event) => Err(Error::Message(format!("trailing {}", event))),
        }
    }

    fn locate(&self, err: Error) -> Error {
        match err {
            Error::Message(message) => Error::Deserialize {
                path: self.path().clone(),
                message,
            },
            other => other,
        }
    }

    fn fetch(&mut self) -> Result<Option<&Event>> {
        if self.peeked.is_none() {
            match self.events.next() {
                Some(item) => self.peeked = Some(item?),
                None => return Ok(None),
            }
        }
        Ok(self.peeked.as_ref().map(|(event, _)| event))
    }

    fn peek(&mut self) -> Result<&Event> {
        self.fetch()?
            .ok_or_else(|| Error::Message("unexpected end of input".to_string()))
    }

    fn next_event(&mut self) -> Result<Event> {
        self.peek()?;
        match self.peeked.take() {
            Some((event, path)) => {
                self.path = path;
                Ok(event)
            }
            None => Err(Error::Message("unexpected end of input".to_string())),
        }
    }

    fn expect(&mut self, expected: Event) -> Result<()> {
        let event = self.next_event()?;
        if event == expected {
            Ok(())
        } else {
            Err(Error::Message(format!("expected {}, found {}", expected, event)))
        }
    }

    fn primitive(&mut self, expected: &str) -> Result<String> {
        match self.next_event()? {
            Event::Primitive(text) => Ok(text),
            other => Err(Error::Message(format!("expected {}, found {}", expected, other))),
        }
    }

    /// Consume one complete value
    fn skip_value(&mut self) -> Result<()> {
        let mut depth = 0usize;
        loop {
            match self.next_event()? {
                Event::ObjectOpen | Event::ArrayOpen => depth += 1,
                Event::ObjectClose | Event::ArrayClose => {
                    depth = depth
                        .checked_sub(1)
                        .ok_or_else(|| Error::Message("unbalanced close".to_string()))?;
                }
                Event::Key(_) | Event::TypeTag(_) => continue,
                Event::Primitive(_) => {}
            }
            if depth == 0 {
                return Ok(());
            }
        }
    }

    /// Payload of a unit variant or unit value: nil or an empty table
    fn unit_payload(&mut self) -> Result<()> {
        match self.next_event()? {
            Event::Primitive(text) if text == "null" => Ok(()),
            Event::ObjectOpen => self.expect(Event::ObjectClose),
            other => Err(Error::Message(format!("expected unit, found {}", other))),
        }
    }
}

macro_rules! deserialize_scalar {
    ($($method:ident => $expected:literal,)*) => {
        $(
            fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
                let text = self.primitive($expected)?;
                de::Deserializer::$method(Scalar::new(text), visitor)
            }
        )*
    };
}

impl<'de, I> de::Deserializer<'de> for &mut Deserializer<I>
where
    I: Iterator<Item = Result<(Event, Path)>>,
{
    type Error = Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.next_event()? {
            Event::Primitive(text) => de::Deserializer::deserialize_any(Scalar::new(text), visitor),
            Event::ObjectOpen => {
                let value = visitor.visit_map(Entries { de: &mut *self })?;
                self.expect(Event::ObjectClose)?;
                Ok(value)
            }
            Event::ArrayOpen => {
                let value = visitor.visit_seq(Elements { de: &mut *self })?;
                self.expect(Event::ArrayClose)?;
                Ok(value)
            }
            Event::TypeTag(name) => visitor.visit_map(TaggedEntry {
                de: self,
                name: Some(name),
            }),
            other => Err(Error::Message(format!("expected a value, found {}", other))),
        }
    }

    deserialize_scalar! {
        deserialize_bool => "a boolean",
        deserialize_i8 => "an integer",
        deserialize_i16 => "an integer",
        deserialize_i32 => "an integer",
        deserialize_i64 => "an integer",
        deserialize_i128 => "an integer",
        deserialize_u8 => "an integer",
        deserialize_u16 => "an integer",
        deserialize_u32 => "an integer",
        deserialize_u64 => "an integer",
        deserialize_u128 => "an integer",
        deserialize_f32 => "a number",
        deserialize_f64 => "a number",
        deserialize_char => "a character",
        deserialize_str => "a string",
        deserialize_string => "a string",
        deserialize_bytes => "a string",
        deserialize_byte_buf => "a string",
        deserialize_identifier => "an identifier",
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        if matches!(self.peek()?, Event::Primitive(text) if text == "null") {
            self.next_event()?;
            visitor.visit_none()
        } else {
            visitor.visit_some(self)
        }
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.unit_payload()?;
        visitor.visit_unit()
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value> {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.next_event()? {
            Event::ArrayOpen => {
                let value = visitor.visit_seq(Elements { de: &mut *self })?;
                self.expect(Event::ArrayClose)?;
                Ok(value)
            }
            // `{}` is classified as a map but is also the empty sequence
            Event::ObjectOpen => {
                self.expect(Event::ObjectClose)?;
                visitor.visit_seq(NoElements)
            }
            other => Err(Error::Message(format!("expected a sequence, found {}", other))),
        }
    }

    fn deserialize_tuple<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.next_event()? {
            Event::ObjectOpen => {
                let value = visitor.visit_map(Entries { de: &mut *self })?;
                self.expect(Event::ObjectClose)?;
                Ok(value)
            }
            other => Err(Error::Message(format!("expected a map, found {}", other))),
        }
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        self.deserialize_map(visitor)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        match self.next_event()? {
            Event::TypeTag(name) => visitor.visit_enum(Tagged { de: self, name }),
            Event::Primitive(name) => visitor.visit_enum(name.into_deserializer()),
            // `{ name = payload }`
            Event::ObjectOpen => {
                let name = match self.next_event()? {
                    Event::Key(name) => name,
                    other => {
                        return Err(Error::Message(format!(
                            "expected a variant, found {}",
                            other
                        )))
                    }
                };
                let value = visitor.visit_enum(Tagged {
                    de: &mut *self,
                    name,
                })?;
                self.expect(Event::ObjectClose)?;
                Ok(value)
            }
            other => Err(Error::Message(format!("expected a variant, found {}", other))),
        }
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.skip_value()?;
        visitor.visit_unit()
    }
}

struct Elements<'a, I> {
    de: &'a mut Deserializer<I>,
}

impl<'de, I> SeqAccess<'de> for Elements<'_, I>
where
    I: Iterator<Item = Result<(Event, Path)>>,
{
    type Error = Error;

    fn next_element_seed<T: DeserializeSeed<'de>>(&mut self, seed: T) -> Result<Option<T::Value>> {
        if *self.de.peek()? == Event::ArrayClose {
            return Ok(None);
        }
        seed.deserialize(&mut *self.de).map(Some)
    }
}

struct NoElements;

impl<'de> SeqAccess<'de> for NoElements {
    type Error = Error;

    fn next_element_seed<T: DeserializeSeed<'de>>(&mut self, _seed: T) -> Result<Option<T::Value>> {
        Ok(None)
    }

    fn size_hint(&self) -> Option<usize> {
        Some(0)
    }
}

struct Entries<'a, I> {
    de: &'a mut Deserializer<I>,
}

impl<'de, I> MapAccess<'de> for Entries<'_, I>
where
    I: Iterator<Item = Result<(Event, Path)>>,
{
    type Error = Error;

    fn next_key_seed<K: DeserializeSeed<'de>>(&mut self, seed: K) -> Result<Option<K::Value>> {
        if *self.de.peek()? == Event::ObjectClose {
            return Ok(None);
        }
        match self.de.next_event()? {
            Event::Key(key) => seed.deserialize(Scalar::new(key)).map(Some),
            other => Err(Error::Message(format!("expected a key, found {}", other))),
        }
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value> {
        seed.deserialize(&mut *self.de)
    }
}

/// A tagged carrier seen by a self-describing target: `{ name: payload }`
struct TaggedEntry<'a, I> {
    de: &'a mut Deserializer<I>,
    name: Option<String>,
}

impl<'de, I> MapAccess<'de> for TaggedEntry<'_, I>
where
    I: Iterator<Item = Result<(Event, Path)>>,
{
    type Error = Error;

    fn next_key_seed<K: DeserializeSeed<'de>>(&mut self, seed: K) -> Result<Option<K::Value>> {
        match self.name.take() {
            Some(name) => seed.deserialize(Scalar::new(name)).map(Some),
            None => Ok(None),
        }
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value> {
        seed.deserialize(&mut *self.de)
    }
}

struct Tagged<'a, I> {
    de: &'a mut Deserializer<I>,
    name: String,
}

impl<'de, 'a, I> EnumAccess<'de> for Tagged<'a, I>
where
    I: Iterator<Item = Result<(Event, Path)>>,
{
    type Error = Error;
    type Variant = Self;

    fn variant_seed<V: DeserializeSeed<'de>>(self, seed: V) -> Result<(V::Value, Self)> {
        let variant = seed.deserialize(Scalar::new(self.name.clone()))?;
        Ok((variant, self))
    }
}

impl<'de, 'a, I> VariantAccess<'de> for Tagged<'a, I>
where
    I: Iterator<Item = Result<(Event, Path)>>,
{
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        self.de.unit_payload()
    }

    fn newtype_variant_seed<T: DeserializeSeed<'de>>(self, seed: T) -> Result<T::Value> {
        seed.deserialize(&mut *self.de)
    }

    fn tuple_variant<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value> {
        de::Deserializer::deserialize_seq(&mut *self.de, visitor)
    }

    fn struct_variant<V: Visitor<'de>>(
        self,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        de::Deserializer::deserialize_map(&mut *self.de, visitor)
    }
}

/// Deserializer for the text of one primitive or key
struct Scalar {
    text: String,
}

impl Scalar {
    fn new(text: String) -> Self {
        Self { text }
    }

    fn parse<T: std::str::FromStr>(&self, expected: &str) -> Result<T> {
        self.text.parse().map_err(|_| {
            Error::Message(format!("invalid value `{}`, expected {}", self.text, expected))
        })
    }

    fn looks_numeric(&self) -> bool {
        let digits = self.text.strip_prefix('-').unwrap_or(&self.text);
        digits.starts_with(|c: char| c.is_ascii_digit())
    }
}

impl<'de> de::Deserializer<'de> for Scalar {
    type Error = Error;

    /// Infers null, boolean, integer, float or string from the text
    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.text.as_str() {
            "null" => return visitor.visit_unit(),
            "true" => return visitor.visit_bool(true),
            "false" => return visitor.visit_bool(false),
            _ => {}
        }
        if self.looks_numeric() {
            if let Ok(i) = self.text.parse::<i64>() {
                return visitor.visit_i64(i);
            }
            if let Ok(u) = self.text.parse::<u64>() {
                return visitor.visit_u64(u);
            }
            if let Ok(f) = self.text.parse::<f64>() {
                return visitor.visit_f64(f);
            }
        }
        visitor.visit_string(self.text)
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.text.as_str() {
            "true" => visitor.visit_bool(true),
            "false" => visitor.visit_bool(false),
            _ => Err(de::Error::invalid_type(Unexpected::Str(&self.text), &visitor)),
        }
    }

    fn deserialize_i8<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_i8(self.parse("i8")?)
    }

    fn deserialize_i16<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_i16(self.parse("i16")?)
    }

    fn deserialize_i32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_i32(self.parse("i32")?)
    }

    fn deserialize_i64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_i64(self.parse("i64")?)
    }

    fn deserialize_i128<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_i128(self.parse("i128")?)
    }

    fn deserialize_u8<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_u8(self.parse("u8")?)
    }

    fn deserialize_u16<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_u16(self.parse("u16")?)
    }

    fn deserialize_u32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_u32(self.parse("u32")?)
    }

    fn deserialize_u64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_u64(self.parse("u64")?)
    }

    fn deserialize_u128<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_u128(self.parse("u128")?)
    }

    fn deserialize_f32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_f32(self.parse("f32")?)
    }

    fn deserialize_f64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_f64(self.parse("f64")?)
    }

    fn deserialize_char<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let mut chars = self.text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => visitor.visit_char(c),
            _ => Err(de::Error::invalid_value(Unexpected::Str(&self.text), &visitor)),
        }
    }

    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_string(self.text)
    }

    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_string(self.text)
    }

    fn deserialize_bytes<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_byte_buf(self.text.into_bytes())
    }

    fn deserialize_byte_buf<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_byte_buf(self.text.into_bytes())
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        if self.text == "null" {
            visitor.visit_none()
        } else {
            visitor.visit_some(self)
        }
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        if self.text == "null" {
            visitor.visit_unit()
        } else {
            Err(de::Error::invalid_type(Unexpected::Str(&self.text), &visitor))
        }
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value> {
        self.deserialize_unit(visitor)
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
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        visitor.visit_enum(self.text.into_deserializer())
    }

    fn deserialize_identifier<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_string(self.text)
    }

    serde::forward_to_deserialize_any! {
        seq tuple tuple_struct map struct ignored_any
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::collections::BTreeMap;

    fn stream(events: Vec<Event>) -> impl Iterator<Item = Result<(Event, Path)>> {
        let mut path = Path::new("test");
        events.into_iter().map(move |event| {
            path = path.push(event.clone());
            Ok((event, path.clone()))
        })
    }

    fn key(k: &str) -> Event {
        Event::Key(k.to_string())
    }

    fn prim(text: &str) -> Event {
        Event::Primitive(text.to_string())
    }

    fn tag(name: &str) -> Event {
        Event::TypeTag(name.to_string())
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct AllRoot {
        a: i32,
        b: String,
        c: Vec<i32>,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    enum Base {
        #[serde(rename = "a")]
        A(A),
        #[serde(rename = "b")]
        B(B),
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct A {}

    #[derive(Debug, Deserialize, PartialEq)]
    struct B;

    #[test]
    fn test_flat_map() {
        let got: AllRoot = from_events(stream(vec![
            Event::ObjectOpen,
            key("a"),
            prim("1"),
            key("b"),
            prim("string"),
            key("c"),
            Event::ArrayOpen,
            prim("1"),
            prim("2"),
            prim("3"),
            Event::ArrayClose,
            Event::ObjectClose,
        ]))
        .unwrap();
        assert_eq!(
            got,
            AllRoot {
                a: 1,
                b: "string".into(),
                c: vec![1, 2, 3],
            }
        );
    }

    #[test]
    fn test_tagged_sequence() {
        let got: Vec<Base> = from_events(stream(vec![
            Event::ArrayOpen,
            tag("a"),
            Event::ObjectOpen,
            Event::ObjectClose,
            tag("b"),
            Event::ObjectOpen,
            Event::ObjectClose,
            Event::ArrayClose,
        ]))
        .unwrap();
        assert_eq!(got, vec![Base::A(A {}), Base::B(B)]);
    }

    #[test]
    fn test_unit_variants_by_name() {
        #[derive(Debug, Deserialize, PartialEq)]
        #[serde(rename_all = "lowercase")]
        enum Mode {
            Fast,
            Slow,
        }

        let got: Vec<Mode> = from_events(stream(vec![
            Event::ArrayOpen,
            prim("fast"),
            tag("slow"),
            prim("null"),
            Event::ArrayClose,
        ]))
        .unwrap();
        assert_eq!(got, vec![Mode::Fast, Mode::Slow]);
    }

    #[test]
    fn test_single_key_map_as_variant() {
        #[derive(Debug, Deserialize, PartialEq)]
        enum Shape {
            #[serde(rename = "circle")]
            Circle { radius: f64 },
        }

        let got: Shape = from_events(stream(vec![
            Event::ObjectOpen,
            key("circle"),
            Event::ObjectOpen,
            key("radius"),
            prim("1.5"),
            Event::ObjectClose,
            Event::ObjectClose,
        ]))
        .unwrap();
        assert_eq!(got, Shape::Circle { radius: 1.5 });
    }

    #[test]
    fn test_empty_table_as_sequence_and_option() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Conf {
            items: Vec<u8>,
            name: Option<String>,
            extra: Option<u8>,
        }

        let got: Conf = from_events(stream(vec![
            Event::ObjectOpen,
            key("items"),
            Event::ObjectOpen,
            Event::ObjectClose,
            key("name"),
            prim("null"),
            key("extra"),
            prim("7"),
            Event::ObjectClose,
        ]))
        .unwrap();
        assert_eq!(
            got,
            Conf {
                items: vec![],
                name: None,
                extra: Some(7),
            }
        );
    }

    #[test]
    fn test_numeric_keys() {
        let got: BTreeMap<u32, String> = from_events(stream(vec![
            Event::ObjectOpen,
            key("10"),
            prim("ten"),
            key("20"),
            prim("twenty"),
            Event::ObjectClose,
        ]))
        .unwrap();
        assert_eq!(got.get(&20).map(String::as_str), Some("twenty"));
    }

    #[test]
    fn test_unknown_fields_are_skipped() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Conf {
            keep: bool,
        }

        let got: Conf = from_events(stream(vec![
            Event::ObjectOpen,
            key("skip"),
            tag("x"),
            Event::ArrayOpen,
            Event::ObjectOpen,
            key("deep"),
            prim("1"),
            Event::ObjectClose,
            Event::ArrayClose,
            key("keep"),
            prim("true"),
            Event::ObjectClose,
        ]))
        .unwrap();
        assert_eq!(got, Conf { keep: true });
    }

    #[test]
    fn test_error_carries_path() {
        let err = from_events::<AllRoot, _>(stream(vec![
            Event::ObjectOpen,
            key("a"),
            prim("one"),
        ]))
        .unwrap_err();
        match err {
            Error::Deserialize { path, message } => {
                assert_eq!(path.location(), "$.a");
                assert_eq!(path.last(), Some(&prim("one")));
                assert!(message.contains("one"), "{}", message);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_walker_errors_pass_through() {
        let events = vec![
            Ok((Event::ArrayOpen, Path::new("t").push(Event::ArrayOpen))),
            Err(Error::InvalidStream {
                path: Path::new("t"),
                message: "boom".into(),
            }),
        ];
        let err = from_events::<Vec<i32>, _>(events).unwrap_err();
        assert!(matches!(err, Error::InvalidStream { .. }));
    }

    #[test]
    fn test_any_inference() {
        let got: serde_json::Value = from_events(stream(vec![
            Event::ObjectOpen,
            key("n"),
            prim("-3"),
            key("f"),
            prim("2.5"),
            key("s"),
            prim("-inf"),
            key("t"),
            tag("a"),
            Event::ObjectOpen,
            Event::ObjectClose,
            Event::ObjectClose,
        ]))
        .unwrap();
        assert_eq!(
            got,
            serde_json::json!({ "n": -3, "f": 2.5, "s": "-inf", "t": { "a": {} } })
        );
    }

    #[test]
    fn test_trailing_events_fail() {
        let result = from_events::<i32, _>(stream(vec![prim("1"), prim("2")]));
        assert!(matches!(result, Err(Error::Deserialize { .. })));
    }
}
