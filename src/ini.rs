use std::fmt::{self, Write};
use std::path::Path;

use crate::error::{Error, Result};
use crate::file;
use crate::hash::StringHash;
use crate::parser::Parser;
use crate::watch::{ExpandedPath, Watcher};

/// Type of a property. All values of one property share it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Bool,
    Int,
    Double,
    String,
}

impl ValueType {
    pub fn as_str(&self) -> &'static str {
        match *self {
            ValueType::Bool => "bool",
            ValueType::Int => "int",
            ValueType::Double => "double",
            ValueType::String => "string",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single parsed value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match *self {
            Value::Bool(_) => ValueType::Bool,
            Value::Int(_) => ValueType::Int,
            Value::Double(_) => ValueType::Double,
            Value::String(_) => ValueType::String,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            // `{:?}` keeps a '.' or an exponent, so the text reads back as a
            // double. `inf` and `nan` need a sign to start a number.
            Value::Double(d) if d.is_nan() => f.write_str("+nan"),
            Value::Double(d) if d.is_infinite() => {
                f.write_str(if d > 0.0 { "+inf" } else { "-inf" })
            }
            Value::Double(d) => write!(f, "{:?}", d),
            Value::String(ref s) => write!(f, "\"{}\"", s),
        }
    }
}

/// A run of consecutive keys.
#[derive(Debug, Clone)]
pub struct Section {
    /// `None` for the implicit section before the first header.
    pub name: Option<StringHash>,
    /// Header text, as written between the brackets.
    pub label: Option<String>,
    pub key_offset: usize,
    pub count: usize,
}

/// A property and the range of its values.
#[derive(Debug, Clone)]
pub struct Key {
    pub name: StringHash,
    pub label: String,
    pub value_offset: usize,
    pub count: usize,
    pub ty: ValueType,
}

/// Result of a property lookup.
///
/// A lookup that found nothing has no values; check `count()` (or use the
/// `Option` returning accessors) before reading.
#[derive(Debug, Clone, Copy)]
pub struct Property<'a> {
    ty: ValueType,
    values: &'a [Value],
}

impl<'a> Property<'a> {
    fn empty() -> Property<'a> {
        Property { ty: ValueType::Bool, values: &[] }
    }

    pub fn value_type(&self) -> ValueType {
        self.ty
    }

    /// Number of values, more than one for an array.
    pub fn count(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn first(&self) -> Option<&'a Value> {
        self.values.first()
    }

    pub fn values(&self) -> &'a [Value] {
        self.values
    }

    pub fn as_bool(&self, idx: usize) -> Option<bool> {
        match self.values.get(idx) {
            Some(Value::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self, idx: usize) -> Option<i64> {
        match self.values.get(idx) {
            Some(Value::Int(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn as_double(&self, idx: usize) -> Option<f64> {
        match self.values.get(idx) {
            Some(Value::Double(d)) => Some(*d),
            _ => None,
        }
    }

    pub fn as_str(&self, idx: usize) -> Option<&'a str> {
        match self.values.get(idx) {
            Some(Value::String(s)) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// Parsed ini data.
///
/// Sections, keys and values are kept in three flat lists. A section
/// owns a contiguous range of keys, a key a contiguous range of values.
/// Data is only ever appended, by `parse_buffer` and the loaders.
#[derive(Debug, Default)]
pub struct IniFile {
    pub(crate) sections: Vec<Section>,
    pub(crate) keys: Vec<Key>,
    pub(crate) values: Vec<Value>,
    watcher: Option<Watcher>,
}

impl IniFile {
    pub fn new() -> IniFile {
        IniFile::default()
    }

    /// Register every file loaded from now on with `watcher`.
    pub fn with_watcher(mut self, watcher: Watcher) -> IniFile {
        self.watcher = Some(watcher);
        self
    }

    /// The attached watcher, if any.
    pub fn watcher(&self) -> Option<&Watcher> {
        self.watcher.as_ref()
    }

    /// Parse `text` and append the result.
    ///
    /// On a syntax error parsing stops; whatever was parsed before the
    /// error stays in the store.
    pub fn parse_buffer(&mut self, text: &str) -> Result<()> {
        Parser::new(text, self).run()
    }

    /// Read and parse a file.
    pub fn load_from_path(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let text = read_text(path)?;
        // Watch the file even if it does not parse, so a fix gets noticed.
        if let Some(watcher) = self.watcher.as_ref() {
            watcher.add_file(path)?;
        }
        self.parse_buffer(&text)
    }

    /// Load every file matching a glob pattern, in sorted order.
    ///
    /// A pattern that matches nothing is a `FileNotFound` error.
    pub fn load_from_glob(&mut self, pattern: &str) -> Result<()> {
        let paths = ExpandedPath::expand(pattern)?;
        if let Some(watcher) = self.watcher.as_ref() {
            watcher.add_expanded(paths.clone());
        }
        for path in &paths {
            let text = read_text(Path::new(path))?;
            self.parse_buffer(&text)?;
        }
        Ok(())
    }

    /// Look up a property by name, optionally restricted to a section.
    pub fn get_property(&self, key: &str, section: Option<&str>) -> Property<'_> {
        self.get_property_hashed(StringHash::new(key), section.map(StringHash::new))
    }

    /// Like `get_property`, with pre-hashed names.
    ///
    /// Without a section all keys are searched; with a section only the
    /// keys of the first section of that name. The first match wins.
    pub fn get_property_hashed(&self, key: StringHash, section: Option<StringHash>) -> Property<'_> {
        let keys = match section {
            None => &self.keys[..],
            Some(name) => match self.sections.iter().find(|s| s.name == Some(name)) {
                Some(s) => self.section_keys(s),
                None => return Property::empty(),
            },
        };
        match keys.iter().find(|k| k.name == key) {
            Some(k) => self.key_property(k),
            None => Property::empty(),
        }
    }

    /// View on the values of `key`.
    pub fn key_property(&self, key: &Key) -> Property<'_> {
        Property {
            ty: key.ty,
            values: self.key_values(key),
        }
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Keys of `section`. Empty if the range does not fit this store.
    pub fn section_keys(&self, section: &Section) -> &[Key] {
        range(&self.keys, section.key_offset, section.count)
    }

    /// Values of `key`. Empty if the range does not fit this store.
    pub fn key_values(&self, key: &Key) -> &[Value] {
        range(&self.values, key.value_offset, key.count)
    }

    /// Write the store back as ini text.
    ///
    /// Parsing the result gives the same sections, keys and values. Fails
    /// if a string contains a '"', or a name cannot be read back.
    pub fn to_ini_string(&self) -> Result<String> {
        let mut out = String::new();
        for section in &self.sections {
            if let Some(label) = section.label.as_ref() {
                if label.contains(']') {
                    return Err(Error::Unrepresentable(format!("section name `{}'", label)));
                }
                if !out.is_empty() {
                    out.push('\n');
                }
                writeln!(out, "[{}]", label).map_err(fmt_err)?;
            }
            for key in self.section_keys(section) {
                let valid = key.label.bytes().all(|c| c.is_ascii_alphanumeric())
                    && key.label.bytes().next().map_or(false, |c| !c.is_ascii_digit());
                if !valid {
                    return Err(Error::Unrepresentable(format!("property name `{}'", key.label)));
                }
                out.push_str(&key.label);
                for (i, value) in self.key_values(key).iter().enumerate() {
                    if let Value::String(s) = value {
                        if s.contains('"') {
                            return Err(Error::Unrepresentable(format!(
                                "string value of `{}' contains '\"'",
                                key.label
                            )));
                        }
                    }
                    let sep = if i == 0 { " = " } else { ", " };
                    write!(out, "{}{}", sep, value).map_err(fmt_err)?;
                }
                out.push('\n');
            }
        }
        Ok(out)
    }

    /// Write the store to a file, creating missing directories.
    pub fn save_to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let text = self.to_ini_string()?;
        file::write(path, text.as_bytes())
    }
}

fn range<T>(items: &[T], offset: usize, count: usize) -> &[T] {
    offset
        .checked_add(count)
        .and_then(|end| items.get(offset..end))
        .unwrap_or(&[])
}

fn read_text(path: &Path) -> Result<String> {
    debug!("loading {}", path.display());
    let data = file::read(path)?;
    String::from_utf8(data).map_err(|e| Error::FileIo {
        path: path.to_path_buf(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
    })
}

fn fmt_err(e: fmt::Error) -> Error {
    Error::Unrepresentable(e.to_string())
}
