use anyhow::Result;
use insta_cmd::assert_cmd_snapshot;
use pretty_assertions::assert_eq;

use crate::{CliTest, TEMP_DIR_FILTER, stderr, stdout};

const CATALOG: &str = "src/main/po/keys.pot";

/// Keeps the rendered header short so whole catalogs can be compared.
const BARE_HEADER_CONFIG: &str = r#"{ "headerComments": [], "headerFields": [] }"#;

const GREETER: &str = r#"package app;

class Greeter {
    void greet(boolean cond, String variable) {
        I18n.tr("hello");
        I18n.tr("hello");
        I18n.tr("a" + "b");
        I18n.tr(cond ? "x" : "y");
        I18n.tr(variable);
        I18n.trn("{0} apple", "{0} apples", 3);
    }
}
"#;

fn greeter_project() -> Result<CliTest> {
    let test = CliTest::with_file("src/main/java/app/Greeter.java", GREETER)?;
    test.write_file(".glotpotrc.json", BARE_HEADER_CONFIG)?;
    Ok(test)
}

#[test]
fn test_extract_writes_catalog() -> Result<()> {
    let test = greeter_project()?;

    assert_cmd_snapshot!(test.extract_command(), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    ✓ Extracted 3 messages from 1 source file (3 new, 0 removed) -> ./src/main/po/keys.pot

    ----- stderr -----
    ");
    assert_eq!(
        test.read_file(CATALOG)?,
        r#"msgid ""
msgstr ""
"Content-Type: text/plain; charset=UTF-8\n"
"Content-Transfer-Encoding: 8bit\n"

#: src/main/java/app/Greeter.java:7
msgid "ab"
msgstr ""

#: src/main/java/app/Greeter.java:5 src/main/java/app/Greeter.java:6
msgid "hello"
msgstr ""

#: src/main/java/app/Greeter.java:10
msgid "{0} apple"
msgid_plural "{0} apples"
msgstr[0] ""
msgstr[1] ""
"#
    );

    Ok(())
}

#[test]
fn test_extract_twice_is_stable() -> Result<()> {
    let test = greeter_project()?;

    test.extract_command().output()?;
    let first = test.read_file(CATALOG)?;

    let output = test.extract_command().output()?;
    assert!(output.status.success());
    assert!(stdout(&output).contains("(0 new, 0 removed)"));
    assert_eq!(test.read_file(CATALOG)?, first);

    Ok(())
}

#[test]
fn test_extract_keeps_previous_order_and_drops_unused() -> Result<()> {
    let test = greeter_project()?;
    test.extract_command().output()?;

    test.write_file(
        "src/main/java/app/Greeter.java",
        r#"package app;

class Greeter {
    void greet() {
        I18n.tr("a" + "b");
        I18n.trn("{0} apple", "{0} apples", 3);
        I18n.tr("aardvark");
    }
}
"#,
    )?;
    let output = test.extract_command().output()?;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("(1 new, 1 removed)"));
    let catalog = test.read_file(CATALOG)?;
    let msgids: Vec<&str> = catalog
        .lines()
        .filter(|l| l.starts_with("msgid \"") && *l != "msgid \"\"")
        .collect();
    // Known messages keep their old order; the new one goes last despite sorting first.
    assert_eq!(
        msgids,
        vec!["msgid \"ab\"", "msgid \"{0} apple\"", "msgid \"aardvark\""]
    );
    assert!(catalog.contains("#: src/main/java/app/Greeter.java:5\nmsgid \"ab\""));

    Ok(())
}

#[test]
fn test_extract_keep_unused() -> Result<()> {
    let test = greeter_project()?;
    test.extract_command().output()?;

    test.write_file(
        "src/main/java/app/Greeter.java",
        "package app;\nclass Greeter { String s = I18n.tr(\"ab\"); }\n",
    )?;

    assert_cmd_snapshot!(test.extract_command().arg("--keep-unused"), @r#"
    success: true
    exit_code: 0
    ----- stdout -----
    ✓ Extracted 3 messages from 1 source file (0 new, 0 removed) -> ./src/main/po/keys.pot
      - kept 2 unused messages (--keep-unused or "removeUnused": false in config):
          "hello"
          "{0} apple"

    ----- stderr -----
    "#);
    let catalog = test.read_file(CATALOG)?;
    assert!(catalog.contains("msgid \"hello\""));
    assert!(catalog.contains("#: src/main/java/app/Greeter.java:2\nmsgid \"ab\""));

    Ok(())
}

#[test]
fn test_extract_keeps_unused_when_config_disables_removal() -> Result<()> {
    let test = greeter_project()?;
    test.extract_command().output()?;

    test.write_file(
        ".glotpotrc.json",
        r#"{ "headerComments": [], "headerFields": [], "removeUnused": false }"#,
    )?;
    test.write_file(
        "src/main/java/app/Greeter.java",
        "package app;\nclass Greeter {}\n",
    )?;
    let output = test.extract_command().output()?;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("kept 3 unused messages"));
    let catalog = test.read_file(CATALOG)?;
    let references = "#: src/main/java/app/Greeter.java:5 src/main/java/app/Greeter.java:6";
    assert!(catalog.contains(references));

    Ok(())
}

#[test]
fn test_unused_message_keeps_path_with_spaces() -> Result<()> {
    let test = CliTest::with_file(
        "src/main/java/my app/A.java",
        "class A { String s = tr(\"kept\"); }\n",
    )?;
    test.extract_command().output()?;

    test.write_file("src/main/java/my app/A.java", "class A {}\n")?;
    let output = test.extract_command().arg("--keep-unused").output()?;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(
        test.read_file(CATALOG)?
            .contains("#: src/main/java/my app/A.java:1\nmsgid \"kept\"")
    );

    Ok(())
}

#[test]
fn test_extract_dry_run() -> Result<()> {
    let test = greeter_project()?;

    assert_cmd_snapshot!(test.extract_command().arg("--dry-run"), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    ✓ Extracted 3 messages from 1 source file (3 new, 0 removed) (dry run, nothing written)

    ----- stderr -----
    ");
    assert!(!test.root().join(CATALOG).exists());

    Ok(())
}

#[test]
fn test_extract_with_cli_rules_and_output() -> Result<()> {
    let test = CliTest::with_file(
        "src/main/java/app/Form.java",
        r#"package app;

import org.i18n.Label;

class Form {
    @Label(text = "Name", hint = "Your full name")
    String name;

    void show() {
        msg("Saved");
        tr("Default rules still apply");
    }
}
"#,
    )?;

    let output = test
        .extract_command()
        .args(["-k", "msg", "--annotation", "org.i18n.Label:text,hint"])
        .args(["--output", "po/app.pot"])
        .output()?;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let catalog = test.read_file("po/app.pot")?;
    for msgid in ["Name", "Your full name", "Saved", "Default rules still apply"] {
        assert!(
            catalog.contains(&format!("msgid \"{}\"", msgid)),
            "missing {} in:\n{}",
            msgid,
            catalog
        );
    }
    assert!(catalog.contains("#: src/main/java/app/Form.java:6\nmsgid \"Name\""));

    Ok(())
}

#[test]
fn test_extract_with_root_argument() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(
        "module/src/main/java/A.java",
        "class A { String s = tr(\"from module\"); }\n",
    )?;

    let output = test.extract_command().args(["--root", "module"]).output()?;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let catalog = test.read_file("module/src/main/po/keys.pot")?;
    assert!(catalog.contains("#: src/main/java/A.java:1\nmsgid \"from module\""));

    Ok(())
}

#[test]
fn test_extract_encoding() -> Result<()> {
    let test = CliTest::with_file(
        "src/main/java/A.java",
        "class A { String s = tr(\"caf\\u00e9\"); }\n",
    )?;

    let output = test
        .extract_command()
        .args(["--encoding", "latin1"])
        .output()?;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let bytes = std::fs::read(test.root().join(CATALOG))?;
    assert!(bytes.windows(5).any(|w| w == b"caf\xE9\""));

    Ok(())
}

#[test]
fn test_syntax_error_fails_without_writing() -> Result<()> {
    let test = greeter_project()?;
    let broken = "class Broken { void f( }\n";
    test.write_file("src/main/java/app/Broken.java", broken)?;

    assert_cmd_snapshot!(test.extract_command(), @r"
    success: false
    exit_code: 2
    ----- stdout -----

    ----- stderr -----
    Error: src/main/java/app/Broken.java:1: syntax error
    ");
    assert!(!test.root().join(CATALOG).exists());

    Ok(())
}

#[test]
fn test_missing_source_root_fails() -> Result<()> {
    let test = CliTest::new()?;

    assert_cmd_snapshot!(test.extract_command(), @r"
    success: false
    exit_code: 2
    ----- stdout -----

    ----- stderr -----
    Error: Source root does not exist: ./src/main/java
    ");

    Ok(())
}

#[test]
fn test_invalid_config_fails() -> Result<()> {
    let test = greeter_project()?;
    test.write_file(".glotpotrc.json", r#"{ "encoding": "no-such-charset" }"#)?;

    insta::with_settings!({ filters => vec![TEMP_DIR_FILTER] }, {
        assert_cmd_snapshot!(test.extract_command(), @r#"
        success: false
        exit_code: 2
        ----- stdout -----

        ----- stderr -----
        Error: Invalid config file: "[TEMP_DIR]/.glotpotrc.json": Invalid 'encoding': "no-such-charset": Unknown encoding label 'no-such-charset'
        "#);
    });

    Ok(())
}

#[test]
fn test_extract_with_absolute_root() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(
        "module/src/main/java/A.java",
        "class A { String s = tr(\"from module\"); }\n",
    )?;
    let mut cmd = test.extract_command();
    cmd.arg("--root").arg(test.root().join("module"));

    insta::with_settings!({ filters => vec![TEMP_DIR_FILTER] }, {
        assert_cmd_snapshot!(cmd, @r"
        success: true
        exit_code: 0
        ----- stdout -----
        ✓ Extracted 1 message from 1 source file (1 new, 0 removed) -> [TEMP_DIR]/module/src/main/po/keys.pot

        ----- stderr -----
        ");
    });

    Ok(())
}

#[test]
fn test_invalid_keyword_is_a_usage_error() -> Result<()> {
    let test = greeter_project()?;

    let output = test.extract_command().args(["-k", "tr:0"]).output()?;

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("tr:0"));

    Ok(())
}

#[test]
fn test_verbose_logs_skipped_arguments() -> Result<()> {
    let test = greeter_project()?;

    let output = test.extract_command().arg("-v").output()?;

    assert!(output.status.success());
    assert!(
        stderr(&output).contains("skipping non-constant text"),
        "stderr: {}",
        stderr(&output)
    );

    Ok(())
}

#[test]
fn test_help() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.command().arg("--help").output()?;

    assert!(output.status.success());
    let help = stdout(&output);
    assert!(help.contains("extract"));
    assert!(help.contains("init"));

    Ok(())
}
