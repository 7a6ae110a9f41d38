use assert_cmd::Command;
use pretty_assertions::assert_eq;

fn replay(args: &[&str]) -> (String, String, Option<i32>) {
    let mut cmd = Command::cargo_bin("rckeys").unwrap();

    let assert = cmd.arg("replay").args(args).assert();

    let output = assert.get_output();

    (
        String::from_utf8_lossy(&output.stdout).into_owned(),
        String::from_utf8_lossy(&output.stderr).into_owned(),
        output.status.code(),
    )
}

#[test]
fn tap() {
    let (stdout, stderr, code) = replay(&[
        "--keytable",
        "testdata/keytables/fab4.toml",
        "testdata/replay/tap.txt",
    ]);

    assert_eq!(stderr, "");
    assert_eq!(code, Some(0));
    assert_eq!(
        stdout,
        r#"down code=0x7689a05f ticks=1000
repeat code=0x7689a05f ticks=1108
press code=0x7689a05f ticks=1250
up code=0x7689a05f ticks=1250
"#
    );
}

#[test]
fn hold() {
    // raw codes need no key table
    let (stdout, stderr, _) = replay(&["testdata/replay/hold.txt"]);

    assert_eq!(stderr, "");
    assert_eq!(
        stdout,
        r#"down code=0x7689807f ticks=5000
repeat code=0x7689807f ticks=5108
repeat code=0x7689807f ticks=5216
repeat code=0x7689807f ticks=5900
hold code=0x7689807f ticks=5900
repeat code=0x7689807f ticks=6008
up code=0x7689807f ticks=6100
"#
    );
}

#[test]
fn names() {
    let (stdout, stderr, _) = replay(&[
        "-k",
        "testdata/keytables/fab4.toml",
        "testdata/replay/lircd.txt",
    ]);

    assert_eq!(stderr, "");
    assert_eq!(
        stdout,
        r#"down code=0x7689a05f ticks=100
press code=0x7689a05f ticks=400
up code=0x7689a05f ticks=400
down code=0x7689807f ticks=600
repeat code=0x7689807f ticks=700
repeat code=0x7689807f ticks=1600
hold code=0x7689807f ticks=1600
up code=0x7689807f ticks=1700
"#
    );
}

#[test]
fn event_filter() {
    let (stdout, stderr, _) = replay(&[
        "-k",
        "testdata/keytables/fab4.toml",
        "--events",
        "press,hold",
        "testdata/replay/lircd.txt",
    ]);

    assert_eq!(stderr, "");
    assert_eq!(
        stdout,
        r#"press code=0x7689a05f ticks=400
hold code=0x7689807f ticks=1600
"#
    );
}

#[test]
fn repeat_escalation() {
    let expected = r#"down code=0x7689a05f ticks=100
press code=0x7689a05f ticks=320
up code=0x7689a05f ticks=320
down code=0x7689a05f ticks=900
"#;

    let (stdout, stderr, _) = replay(&[
        "-k",
        "testdata/keytables/escalation.toml",
        "testdata/replay/escalation.txt",
    ]);

    assert_eq!(stderr, "");
    assert_eq!(stdout, expected);

    let (stdout, stderr, _) = replay(&[
        "-k",
        "testdata/keytables/fab4.toml",
        "--release-on-repeat-escalation",
        "testdata/replay/escalation.txt",
    ]);

    assert_eq!(stderr, "");
    assert_eq!(stdout, expected);

    // without the rule, the repeats are dropped and the press carries on
    let (stdout, _, _) = replay(&[
        "-k",
        "testdata/keytables/fab4.toml",
        "testdata/replay/escalation.txt",
    ]);

    assert_eq!(
        stdout,
        r#"down code=0x7689a05f ticks=100
repeat code=0x7689a05f ticks=900
"#
    );
}

#[test]
fn bad_script() {
    let (stdout, stderr, code) = replay(&["testdata/replay/bad.txt"]);

    assert_eq!(stdout, "");
    assert_eq!(
        stderr,
        "error: testdata/replay/bad.txt: parse error at 2:1\n"
    );
    assert_eq!(code, Some(2));
}

#[test]
fn bad_keytable() {
    let (stdout, stderr, code) = replay(&[
        "-k",
        "testdata/keytables/bad.toml",
        "testdata/replay/tap.txt",
    ]);

    assert_eq!(stdout, "");
    assert!(
        stderr.starts_with("error: testdata/keytables/bad.toml: "),
        "{stderr}"
    );
    assert_eq!(code, Some(2));
}

#[test]
fn keytable() {
    let mut cmd = Command::cargo_bin("rckeys").unwrap();

    let assert = cmd
        .args(["keytable", "testdata/keytables/escalation.toml"])
        .assert();

    let output = assert.get_output();

    assert_eq!(String::from_utf8_lossy(&output.stderr), "");
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        r#"release-on-repeat-escalation
key KEY_PLAY 0x7689a05f
key KEY_VOLUMEUP 0x7689807f repeat
"#
    );
}
