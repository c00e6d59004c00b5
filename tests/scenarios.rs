use inicfg::{Error, IniFile, Value, ValueType};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

const GAME_INI: &str = r#"
; engine settings
[graphics]
width = 1920
height = 1080
fullscreen = true
title = "My Game"
scale = 1.5, 2.0, 3.0
"#;

#[test]
fn graphics_section() {
    init();
    let mut ini = IniFile::new();
    ini.parse_buffer(GAME_INI).unwrap();

    let named: Vec<_> = ini.sections().iter().filter(|s| s.name.is_some()).collect();
    assert_eq!(named.len(), 1);
    assert_eq!(named[0].count, 5);

    let section = Some("graphics");
    assert_eq!(ini.get_property("width", section).first(), Some(&Value::Int(1920)));
    assert_eq!(ini.get_property("height", section).first(), Some(&Value::Int(1080)));
    assert_eq!(ini.get_property("fullscreen", section).first(), Some(&Value::Bool(true)));
    assert_eq!(
        ini.get_property("title", section).first(),
        Some(&Value::String("My Game".to_string()))
    );
    let scale = ini.get_property("scale", section);
    assert_eq!(scale.value_type(), ValueType::Double);
    assert_eq!(scale.count(), 3);
    assert_eq!(scale.as_double(2), Some(3.0));
}

#[test]
fn numeric_classification() {
    init();
    let mut ini = IniFile::new();
    ini.parse_buffer("a = 1.0\nb = 1e5\nc = 3E1\nd = -inf\ne = +nan\nf = 42\ng = -7\n")
        .unwrap();
    for name in &["a", "b", "c", "d", "e"] {
        assert_eq!(ini.get_property(name, None).value_type(), ValueType::Double, "{}", name);
    }
    for name in &["f", "g"] {
        assert_eq!(ini.get_property(name, None).value_type(), ValueType::Int, "{}", name);
    }
}

#[test]
fn errors_stop_parsing() {
    init();
    let cases = &[
        ("x = 1\n1x = 2\ny = 3\n", 2),
        ("a = 1, \"x\"\ny = 3\n", 1),
        ("\n\n[foo\ny = 3\n", 3),
        ("t = \"abc\ny = 3\n", 1),
    ];
    for &(text, line) in cases {
        let mut ini = IniFile::new();
        match ini.parse_buffer(text) {
            Err(Error::Syntax { line: l, .. }) => assert_eq!(l, line, "{:?}", text),
            other => panic!("{:?}: expected syntax error, got {:?}", text, other),
        }
        assert_eq!(ini.get_property("y", None).count(), 0, "{:?}", text);
    }
}

#[test]
fn lookups_never_fail() {
    init();
    let mut ini = IniFile::new();
    assert_eq!(ini.get_property("missing", None).count(), 0);
    ini.parse_buffer("x = 5").unwrap();
    assert_eq!(ini.get_property("x", None).as_int(0), Some(5));
    assert_eq!(ini.get_property("x", Some("graphics")).count(), 0);
    assert_eq!(ini.get_property("missing", None).count(), 0);
}

#[test]
fn serde_and_files() {
    init();

    #[derive(serde::Deserialize, Debug)]
    struct Game {
        graphics: Graphics,
    }

    #[derive(serde::Deserialize, Debug)]
    struct Graphics {
        width: u32,
        title: String,
        scale: Vec<f64>,
    }

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config").join("game.ini");
    inicfg::write_file(&path, GAME_INI.as_bytes()).unwrap();

    let game: Game = inicfg::from_path(&path).unwrap();
    assert_eq!(game.graphics.width, 1920);
    assert_eq!(game.graphics.title, "My Game");
    assert_eq!(game.graphics.scale, vec![1.5, 2.0, 3.0]);
}
