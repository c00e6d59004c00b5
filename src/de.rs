use std::path::Path;

use serde::de::{
    self, DeserializeOwned, DeserializeSeed, IntoDeserializer, MapAccess, SeqAccess, Unexpected,
    Visitor,
};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::hash::StringHash;
use crate::ini::{IniFile, Key, Property, Value};

/// Parse ini text and deserialize it into `T`.
pub fn from_str<T>(s: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    let mut ini = IniFile::new();
    ini.parse_buffer(s)?;
    from_ini(&ini)
}

/// Read an ini file and deserialize it into `T`.
pub fn from_path<T>(path: impl AsRef<Path>) -> Result<T>
where
    T: DeserializeOwned,
{
    let mut ini = IniFile::new();
    ini.load_from_path(path)?;
    from_ini(&ini)
}

/// Deserialize an already parsed `IniFile`.
///
/// Struct fields at the root map to properties of the default section,
/// and otherwise to a section of the same name. Inside a section they map
/// to the properties of that section.
pub fn from_ini<'a, T>(ini: &'a IniFile) -> Result<T>
where
    T: Deserialize<'a>,
{
    let keys = ini
        .sections()
        .iter()
        .find(|s| s.name.is_none())
        .map(|s| ini.section_keys(s))
        .unwrap_or(&[]);
    T::deserialize(TableDeserializer { ini, keys, root: true })
}

// What a struct field or map key resolved to.
enum Entry<'a> {
    Property(Property<'a>),
    Table(&'a [Key]),
}

// A section, or the default section at the root.
struct TableDeserializer<'a> {
    ini: &'a IniFile,
    keys: &'a [Key],
    root: bool,
}

impl<'a> TableDeserializer<'a> {
    fn property(&self, key: &'a Key) -> Entry<'a> {
        Entry::Property(self.ini.key_property(key))
    }

    // Entries for the named struct fields that are present.
    fn field_entries(&self, fields: &'static [&'static str]) -> Vec<(&'a str, Entry<'a>)> {
        let mut entries = Vec::new();
        for &field in fields {
            let hash = StringHash::new(field);
            if let Some(key) = self.keys.iter().find(|k| k.name == hash) {
                entries.push((field, self.property(key)));
                continue;
            }
            if !self.root {
                continue;
            }
            let section = self.ini.sections().iter().find(|s| s.name == Some(hash));
            if let Some(section) = section {
                entries.push((field, Entry::Table(self.ini.section_keys(section))));
            }
        }
        entries
    }

    // Every property, and at the root every named section. Repeated
    // names only show up once, the first one wins like in a lookup.
    fn all_entries(&self) -> Vec<(&'a str, Entry<'a>)> {
        let mut seen: Vec<StringHash> = Vec::new();
        let mut entries = Vec::new();
        for key in self.keys {
            if !seen.contains(&key.name) {
                seen.push(key.name);
                entries.push((key.label.as_str(), self.property(key)));
            }
        }
        if self.root {
            let mut seen_sections: Vec<StringHash> = Vec::new();
            for section in self.ini.sections() {
                if let (Some(name), Some(label)) = (section.name, section.label.as_ref()) {
                    if !seen_sections.contains(&name) {
                        seen_sections.push(name);
                        entries.push((label.as_str(), Entry::Table(self.ini.section_keys(section))));
                    }
                }
            }
        }
        entries
    }
}

impl<'de> de::Deserializer<'de> for TableDeserializer<'de> {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_map(visitor)
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_some(self)
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        debug!("deserialize_map (root: {})", self.root);
        let entries = self.all_entries();
        visitor.visit_map(EntryAccess::new(self.ini, entries))
    }

    fn deserialize_struct<V>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        debug!("deserialize_struct({})", name);
        let entries = self.field_entries(fields);
        visitor.visit_map(EntryAccess::new(self.ini, entries))
    }

    serde::forward_to_deserialize_any! {
        bool i8 i16 i32 i64 u8 u16 u32 u64 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple
        tuple_struct enum identifier ignored_any
    }
}

// Hands the resolved entries to a struct or map visitor.
struct EntryAccess<'a> {
    ini: &'a IniFile,
    entries: std::vec::IntoIter<(&'a str, Entry<'a>)>,
    value: Option<Entry<'a>>,
}

impl<'a> EntryAccess<'a> {
    fn new(ini: &'a IniFile, entries: Vec<(&'a str, Entry<'a>)>) -> Self {
        EntryAccess {
            ini,
            entries: entries.into_iter(),
            value: None,
        }
    }
}

impl<'de> MapAccess<'de> for EntryAccess<'de> {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: DeserializeSeed<'de>,
    {
        match self.entries.next() {
            Some((name, entry)) => {
                self.value = Some(entry);
                seed.deserialize(name.into_deserializer()).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: DeserializeSeed<'de>,
    {
        match self.value.take() {
            Some(Entry::Property(property)) => seed.deserialize(PropertyDeserializer { property }),
            Some(Entry::Table(keys)) => seed.deserialize(TableDeserializer {
                ini: self.ini,
                keys,
                root: false,
            }),
            None => Err(de::Error::custom("value requested before key")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.entries.len())
    }
}

// All values of one property.
struct PropertyDeserializer<'a> {
    property: Property<'a>,
}

impl<'de> de::Deserializer<'de> for PropertyDeserializer<'de> {
    type Error = Error;

    // One value is a scalar, more are a sequence, none is unit.
    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.property.values() {
            [] => visitor.visit_unit(),
            [value] => de::Deserializer::deserialize_any(ValueDeserializer { value }, visitor),
            values => visitor.visit_seq(ValueSeq { iter: values.iter() }),
        }
    }

    // No value means "true", so a bare "vsync" is the same as "vsync = true".
    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        if self.property.is_empty() {
            return visitor.visit_bool(true);
        }
        self.deserialize_any(visitor)
    }

    // The property exists, so it is always `Some`.
    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_some(self)
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    // A single value is accepted as a one element sequence.
    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_seq(ValueSeq {
            iter: self.property.values().iter(),
        })
    }

    fn deserialize_tuple<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_enum<V>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.property.values() {
            [value] => {
                de::Deserializer::deserialize_enum(ValueDeserializer { value }, name, variants, visitor)
            }
            values => Err(de::Error::invalid_length(values.len(), &"a single value")),
        }
    }

    serde::forward_to_deserialize_any! {
        i8 i16 i32 i64 u8 u16 u32 u64 f32 f64 char str string
        bytes byte_buf unit unit_struct map struct identifier ignored_any
    }
}

struct ValueSeq<'a> {
    iter: std::slice::Iter<'a, Value>,
}

impl<'de> SeqAccess<'de> for ValueSeq<'de> {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(value) => seed.deserialize(ValueDeserializer { value }).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

// A single value. Width conversions (i64 to u16 etc) are left to the
// visitor, which checks the range.
struct ValueDeserializer<'a> {
    value: &'a Value,
}

impl<'de> de::Deserializer<'de> for ValueDeserializer<'de> {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match *self.value {
            Value::Bool(b) => visitor.visit_bool(b),
            Value::Int(n) => visitor.visit_i64(n),
            Value::Double(d) => visitor.visit_f64(d),
            Value::String(ref s) => visitor.visit_borrowed_str(s.as_str()),
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_some(self)
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    // Only unit variants, named by a string value.
    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match *self.value {
            Value::String(ref s) => visitor.visit_enum(s.as_str().into_deserializer()),
            ref other => Err(de::Error::invalid_type(unexpected(other), &"a variant name")),
        }
    }

    serde::forward_to_deserialize_any! {
        bool i8 i16 i32 i64 u8 u16 u32 u64 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple
        tuple_struct map struct identifier ignored_any
    }
}

fn unexpected(value: &Value) -> Unexpected<'_> {
    match *value {
        Value::Bool(b) => Unexpected::Bool(b),
        Value::Int(n) => Unexpected::Signed(n),
        Value::Double(d) => Unexpected::Float(d),
        Value::String(ref s) => Unexpected::Str(s),
    }
}
