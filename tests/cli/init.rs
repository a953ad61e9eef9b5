use anyhow::{Context, Result};
use insta_cmd::assert_cmd_snapshot;
use serde_json::Value;

use crate::{CliTest, stderr};

/// Validates config file structure and default values.
fn assert_config_content(content: &str) -> Result<()> {
    let parsed: Value = serde_json::from_str(content).context("Config should be valid JSON")?;

    for field in ["includes", "output", "encoding", "removeUnused", "keywords"] {
        assert!(
            parsed.get(field).is_some(),
            "Config should have '{}' field",
            field
        );
    }
    assert_eq!(parsed["output"], "src/main/po/keys.pot");

    assert!(
        content.contains("  "),
        "Config should use 2-space indentation"
    );

    Ok(())
}

#[test]
fn test_init_creates_config() -> Result<()> {
    let test = CliTest::new()?;

    assert_cmd_snapshot!(test.command().arg("init"), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    ✓ Created .glotpotrc.json

    ----- stderr -----
    ");

    assert!(test.root().join(".glotpotrc.json").exists());
    let content = test.read_file(".glotpotrc.json")?;
    assert_config_content(&content)?;

    Ok(())
}

#[test]
fn test_init_fails_if_exists() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(".glotpotrc.json", "{}")?;

    assert_cmd_snapshot!(test.command().arg("init"), @r"
    success: false
    exit_code: 1
    ----- stdout -----

    ----- stderr -----
    Error: .glotpotrc.json already exists
    ");
    assert_eq!(test.read_file(".glotpotrc.json")?, "{}");

    Ok(())
}

#[test]
fn test_init_config_is_immediately_usable() -> Result<()> {
    let test = CliTest::new()?;

    test.command().arg("init").output()?;
    test.write_file(
        "src/main/java/App.java",
        "class App { String title = tr(\"My App\"); }\n",
    )?;

    let output = test.extract_command().output()?;
    assert!(
        output.status.success(),
        "Extract should work with initialized config. stderr: {}",
        stderr(&output)
    );
    let catalog = test.read_file("src/main/po/keys.pot")?;
    assert!(catalog.contains("msgid \"My App\""));

    Ok(())
}
