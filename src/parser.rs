use crate::cursor::Cursor;
use crate::error::{Error, Result};
use crate::hash::StringHash;
use crate::ini::{IniFile, Key, Section, Value, ValueType};
use crate::number;

// Single pass over one buffer, appending to an `IniFile`.
pub(crate) struct Parser<'a, 'i> {
    cursor: Cursor<'a>,
    ini: &'i mut IniFile,
    // Property that `=` and `,` values attach to.
    current: Option<usize>,
}

impl<'a, 'i> Parser<'a, 'i> {
    pub fn new(text: &'a str, ini: &'i mut IniFile) -> Parser<'a, 'i> {
        Parser {
            cursor: Cursor::new(text),
            ini,
            current: None,
        }
    }

    pub fn run(mut self) -> Result<()> {
        if self.ini.sections.is_empty() {
            self.ini.sections.push(Section {
                name: None,
                label: None,
                key_offset: self.ini.keys.len(),
                count: 0,
            });
        }

        loop {
            self.cursor.skip_whitespace();
            match self.cursor.current() {
                None => break,
                Some(b';') => self.cursor.skip_line(),
                Some(b'[') => self.section()?,
                Some(b'=') | Some(b',') => self.value()?,
                Some(_) => self.property()?,
            }
        }
        debug!(
            "parsed up to line {}: {} sections, {} keys, {} values",
            self.cursor.line(),
            self.ini.sections.len(),
            self.ini.keys.len(),
            self.ini.values.len()
        );
        Ok(())
    }

    // '[' name ']'
    fn section(&mut self) -> Result<()> {
        let errline = self.cursor.line();
        self.cursor.bump();
        let beg = self.cursor.offset();
        if !self.cursor.advance_to_next(b']') {
            return Err(Error::syntax(errline, "Unterminated section"));
        }
        let label = self.cursor.slice(beg, self.cursor.offset());
        self.cursor.bump();

        debug!("line {}: section [{}]", errline, label);
        self.ini.sections.push(Section {
            name: Some(StringHash::new(label)),
            label: Some(label.to_string()),
            key_offset: self.ini.keys.len(),
            count: 0,
        });
        self.current = None;
        Ok(())
    }

    // ('=' | ',') value
    fn value(&mut self) -> Result<()> {
        let key_idx = match self.current {
            Some(idx) => idx,
            None => {
                return Err(Error::syntax(
                    self.cursor.line(),
                    "Unexpected '=' or ',' no property name was specified",
                ))
            }
        };

        self.cursor.bump();
        self.cursor.skip_whitespace();
        while self.cursor.current() == Some(b';') {
            self.cursor.skip_line();
            self.cursor.skip_whitespace();
        }
        let errline = self.cursor.line();

        let value = match self.cursor.current() {
            Some(b'"') => {
                self.cursor.bump();
                let beg = self.cursor.offset();
                if !self.cursor.advance_to_next(b'"') {
                    return Err(Error::syntax(errline, "Unterminated string"));
                }
                let s = self.cursor.slice(beg, self.cursor.offset());
                self.cursor.bump();
                Value::String(s.to_string())
            }
            Some(c @ b't') | Some(c @ b'f') => {
                self.cursor.advance_to_next_whitespace_or_comma();
                Value::Bool(c == b't')
            }
            Some(c) if c.is_ascii_digit() || c == b'-' || c == b'+' => {
                let beg = self.cursor.offset();
                self.cursor.advance_to_next_whitespace_or_comma();
                number::classify(self.cursor.slice(beg, self.cursor.offset()))
            }
            _ => return Err(Error::syntax(errline, "Invalid value")),
        };

        let key = &mut self.ini.keys[key_idx];
        let ty = value.value_type();
        if key.count > 0 && key.ty != ty {
            return Err(Error::syntax(
                errline,
                format!("Invalid array (arrays must be homogeneous): {} after {}", ty, key.ty),
            ));
        }
        key.ty = ty;
        key.count += 1;
        self.ini.values.push(value);
        Ok(())
    }

    // A new property name.
    fn property(&mut self) -> Result<()> {
        let line = self.cursor.line();
        match self.cursor.current() {
            Some(c) if c.is_ascii_digit() => {
                return Err(Error::syntax(line, "Property names cannot begin with a number"));
            }
            Some(c) if !c.is_ascii_alphanumeric() => {
                return Err(Error::syntax(line, "Invalid property name"));
            }
            _ => {}
        }

        let beg = self.cursor.offset();
        if !self.cursor.advance_to_next_non_alphanumeric() {
            return Err(Error::syntax(line, "Unexpected end of file"));
        }
        let label = self.cursor.slice(beg, self.cursor.offset());

        self.current = Some(self.ini.keys.len());
        self.ini.keys.push(Key {
            name: StringHash::new(label),
            label: label.to_string(),
            value_offset: self.ini.values.len(),
            count: 0,
            ty: ValueType::Bool,
        });
        if let Some(section) = self.ini.sections.last_mut() {
            section.count += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::ini::{IniFile, Value, ValueType};
    use crate::Error;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn parse(text: &str) -> (IniFile, crate::Result<()>) {
        init();
        let mut ini = IniFile::new();
        let res = ini.parse_buffer(text);
        (ini, res)
    }

    fn syntax_line(res: crate::Result<()>) -> u32 {
        match res {
            Err(Error::Syntax { line, .. }) => line,
            other => panic!("expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_graphics_section() {
        let text = r#"
[graphics]
width = 1920
height = 1080
fullscreen = true
title = "My Game"
scale = 1.5, 2.0, 3.0
"#;
        let (ini, res) = parse(text);
        res.unwrap();

        // default section plus "graphics".
        assert_eq!(ini.sections().len(), 2);
        assert_eq!(ini.sections()[0].count, 0);
        let graphics = &ini.sections()[1];
        assert_eq!(graphics.label.as_deref(), Some("graphics"));
        assert_eq!(graphics.key_offset, 0);
        assert_eq!(graphics.count, 5);

        let p = ini.get_property("width", Some("graphics"));
        assert_eq!(p.value_type(), ValueType::Int);
        assert_eq!(p.values(), &[Value::Int(1920)]);
        assert_eq!(ini.get_property("height", None).as_int(0), Some(1080));
        assert_eq!(ini.get_property("fullscreen", None).as_bool(0), Some(true));
        assert_eq!(ini.get_property("title", None).as_str(0), Some("My Game"));

        let scale = ini.get_property("scale", Some("graphics"));
        assert_eq!(scale.value_type(), ValueType::Double);
        assert_eq!(
            scale.values(),
            &[Value::Double(1.5), Value::Double(2.0), Value::Double(3.0)]
        );
    }

    #[test]
    fn test_int_array() {
        let (ini, res) = parse("a = 1, 2, 3\n");
        res.unwrap();
        let a = ini.get_property("a", None);
        assert_eq!(a.count(), 3);
        assert_eq!(a.value_type(), ValueType::Int);
        assert!(a.values().iter().all(|v| v.value_type() == ValueType::Int));
    }

    #[test]
    fn test_repeated_equals_extends_array() {
        let (ini, res) = parse("a = 1 = 2\nb, 3\n");
        res.unwrap();
        assert_eq!(ini.get_property("a", None).values(), &[Value::Int(1), Value::Int(2)]);
        assert_eq!(ini.get_property("b", None).values(), &[Value::Int(3)]);
    }

    #[test]
    fn test_comments() {
        let text = "; leading comment\nx = ; before the value\n  ; and another\n 5 ; trailing\n";
        let (ini, res) = parse(text);
        res.unwrap();
        assert_eq!(ini.get_property("x", None).values(), &[Value::Int(5)]);
    }

    #[test]
    fn test_loose_booleans() {
        let (ini, res) = parse("a = tomato, false, fnord\n");
        res.unwrap();
        let a = ini.get_property("a", None);
        assert_eq!(
            a.values(),
            &[Value::Bool(true), Value::Bool(false), Value::Bool(false)]
        );
    }

    #[test]
    fn test_strings_are_verbatim() {
        let (ini, res) = parse("path = \"C:\\temp\\n ; not a comment\"\n");
        res.unwrap();
        assert_eq!(
            ini.get_property("path", None).as_str(0),
            Some("C:\\temp\\n ; not a comment")
        );
    }

    #[test]
    fn test_numeric_name_is_error() {
        let (ini, res) = parse("ok = 1\n\n2fast = 3\nlater = 4\n");
        assert_eq!(syntax_line(res), 3);
        // parsing stopped, earlier data is kept.
        assert_eq!(ini.get_property("ok", None).count(), 1);
        assert_eq!(ini.get_property("later", None).count(), 0);
    }

    #[test]
    fn test_value_without_property() {
        let (_, res) = parse("= 1\n");
        assert_eq!(syntax_line(res), 1);

        let (_, res) = parse("x = 1\n[s]\n, 2\n");
        assert_eq!(syntax_line(res), 3);
    }

    #[test]
    fn test_heterogeneous_array() {
        let (ini, res) = parse("a = 1, \"x\"\n");
        match res {
            Err(Error::Syntax { line, msg }) => {
                assert_eq!(line, 1);
                assert!(msg.contains("arrays must be homogeneous"));
                assert!(msg.ends_with("string after int"));
            }
            other => panic!("expected syntax error, got {:?}", other),
        }
        let a = ini.get_property("a", None);
        assert_eq!(a.value_type(), ValueType::Int);
        assert_eq!(a.count(), 1);
        assert_eq!(ini.values().len(), 1);
    }

    #[test]
    fn test_unterminated() {
        let (_, res) = parse("\n[foo\nx = 1\n");
        assert_eq!(syntax_line(res), 2);

        let (_, res) = parse("a = 1\nb =\n  \"open\n\n");
        assert_eq!(syntax_line(res), 3);
    }

    #[test]
    fn test_invalid_value() {
        let (_, res) = parse("a = yes\n");
        assert_eq!(syntax_line(res), 1);
        let (_, res) = parse("a =");
        assert_eq!(syntax_line(res), 1);
    }

    #[test]
    fn test_invalid_names() {
        let (_, res) = parse("_x = 1\n");
        assert_eq!(syntax_line(res), 1);
        let (_, res) = parse("x = 1\nflag");
        assert_eq!(syntax_line(res), 2);
    }

    #[test]
    fn test_bare_property() {
        let (ini, res) = parse("verbose\nlevel = 2\n");
        res.unwrap();
        let verbose = ini.get_property("verbose", None);
        assert_eq!(verbose.count(), 0);
        assert!(verbose.first().is_none());
        assert_eq!(ini.get_property("level", None).as_int(0), Some(2));
    }

    #[test]
    fn test_multiple_buffers_append() {
        init();
        let mut ini = IniFile::new();
        ini.parse_buffer("x = 1\n[a]\ny = 2\n").unwrap();
        ini.parse_buffer("[b]\nz = \"three\"\n").unwrap();

        // still exactly one default section.
        assert_eq!(ini.sections().iter().filter(|s| s.name.is_none()).count(), 1);
        assert_eq!(ini.sections().len(), 3);
        assert_eq!(ini.get_property("x", None).as_int(0), Some(1));
        assert_eq!(ini.get_property("y", Some("a")).as_int(0), Some(2));
        assert_eq!(ini.get_property("z", Some("b")).as_str(0), Some("three"));

        // a new buffer cannot continue the previous buffer's last property.
        let res = ini.parse_buffer(", 4\n");
        assert_eq!(syntax_line(res), 1);
        assert_eq!(ini.get_property("z", None).count(), 1);
    }

    #[test]
    fn test_sections_partition_keys() {
        let (ini, res) = parse("a = 1\nb = 2\n[s1]\nc = 3\n[s2]\n[s3]\nd = 4\ne = 5\n");
        res.unwrap();
        let mut next = 0;
        for section in ini.sections() {
            assert_eq!(section.key_offset, next);
            next += section.count;
        }
        assert_eq!(next, ini.keys().len());
        let counts: Vec<usize> = ini.sections().iter().map(|s| s.count).collect();
        assert_eq!(counts, vec![2, 1, 0, 2]);
    }
}
