//! Typed INI configuration files.
//!
//! A config text is parsed in one pass into a flat store of sections,
//! keys and values. Values are typed (bool, integer, double, string) and
//! a key can hold a homogeneous array of them.
//!
//! ```
//! let mut ini = inicfg::IniFile::new();
//! ini.parse_buffer("[window]\nwidth = 1280\nscale = 1.0, 2.0\n").unwrap();
//!
//! let width = ini.get_property("width", Some("window"));
//! assert_eq!(width.as_int(0), Some(1280));
//! assert_eq!(ini.get_property("scale", None).count(), 2);
//! ```
#![doc(html_root_url = "https://docs.rs/inicfg/0.1.0")]

#[macro_use]
extern crate log;

mod cursor;
mod de;
mod error;
mod file;
mod hash;
mod ini;
mod number;
mod parser;
mod watch;

pub use de::{from_ini, from_path, from_str};
pub use error::{Error, Result};
pub use file::{read as read_file, write as write_file};
pub use hash::StringHash;
pub use ini::{IniFile, Key, Property, Section, Value, ValueType};
pub use watch::Watcher;
