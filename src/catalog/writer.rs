use std::{
    fmt::Write as _,
    fs,
    path::{Path, PathBuf},
};

use encoding_rs::Encoding;
use tracing::info;

use super::{CatalogError, escape::escape};
use crate::core::store::{MessageStore, TranslatableMessage};

/// Reference lines are wrapped at this width, like xgettext does.
const REFERENCE_WIDTH: usize = 79;

/// Leading comments and header entry fields of a rendered catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogHeader {
    pub comments: Vec<String>,
    /// `Name: value` lines written after the charset fields.
    pub fields: Vec<String>,
}

/// Render the store as PO text, messages in catalog order.
pub fn render_catalog(
    store: &MessageStore,
    header: &CatalogHeader,
    encoding: &'static Encoding,
) -> String {
    let mut out = String::new();

    for comment in &header.comments {
        if comment.is_empty() {
            out.push_str("#\n");
            continue;
        }
        // Every line of a multi-line comment needs its own marker.
        for line in comment.lines() {
            if line.is_empty() {
                out.push_str("#\n");
            } else {
                let _ = writeln!(out, "# {}", line);
            }
        }
    }

    out.push_str("msgid \"\"\nmsgstr \"\"\n");
    let _ = writeln!(
        out,
        "\"Content-Type: text/plain; charset={}\\n\"",
        encoding.name()
    );
    out.push_str("\"Content-Transfer-Encoding: 8bit\\n\"\n");
    for field in &header.fields {
        let _ = writeln!(out, "\"{}\\n\"", escape(field));
    }

    for message in store.sorted() {
        out.push('\n');
        render_message(&mut out, message);
    }

    out
}

fn render_message(out: &mut String, message: &TranslatableMessage) {
    let mut line = String::from("#:");
    for occurrence in &message.occurrences {
        let reference = occurrence.to_string();
        if line.len() > 2 && line.len() + 1 + reference.len() > REFERENCE_WIDTH {
            let _ = writeln!(out, "{}", line);
            line = String::from("#:");
        }
        line.push(' ');
        line.push_str(&reference);
    }
    if line.len() > 2 {
        let _ = writeln!(out, "{}", line);
    }

    render_string(out, "msgid", message.singular());
    match message.plural() {
        Some(plural) => {
            render_string(out, "msgid_plural", plural);
            out.push_str("msgstr[0] \"\"\nmsgstr[1] \"\"\n");
        }
        None => out.push_str("msgstr \"\"\n"),
    }
}

/// Multi-line text is written as `""` followed by one string per line.
fn render_string(out: &mut String, keyword: &str, text: &str) {
    let lines: Vec<&str> = text.split_inclusive('\n').collect();
    if lines.len() <= 1 {
        let _ = writeln!(out, "{} \"{}\"", keyword, escape(text));
        return;
    }
    let _ = writeln!(out, "{} \"\"", keyword);
    for line in lines {
        let _ = writeln!(out, "\"{}\"", escape(line));
    }
}

/// Render and write the catalog, creating parent directories as needed.
///
/// The text goes to a sibling temporary file that then replaces `path`, so an
/// existing catalog is either fully replaced or left untouched.
pub fn write_catalog(
    path: &Path,
    store: &MessageStore,
    header: &CatalogHeader,
    encoding: &'static Encoding,
) -> Result<(), CatalogError> {
    let text = render_catalog(store, header, encoding);
    let (bytes, _, unmappable) = encoding.encode(&text);
    if unmappable {
        return Err(CatalogError::Unencodable {
            path: path.to_path_buf(),
            encoding: encoding.name(),
        });
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| CatalogError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let temp_path = temp_path_for(path);
    let replaced = fs::write(&temp_path, &bytes).and_then(|()| fs::rename(&temp_path, path));
    if let Err(source) = replaced {
        let _ = fs::remove_file(&temp_path);
        return Err(CatalogError::Io {
            path: path.to_path_buf(),
            source,
        });
    }

    info!(path = %path.display(), messages = store.len(), "wrote catalog");
    Ok(())
}

/// `po/keys.pot` becomes `po/.keys.pot.tmp`.
fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.tmp", name))
}

#[cfg(test)]
mod tests {
    use encoding_rs::{UTF_8, WINDOWS_1252};
    use insta::assert_snapshot;
    use tempfile::tempdir;

    use super::*;
    use crate::core::store::{MessageKey, Occurrence, Position};

    fn header() -> CatalogHeader {
        CatalogHeader {
            comments: vec!["Messages for the demo app.".to_string(), String::new()],
            fields: vec!["Project-Id-Version: demo 1.0".to_string()],
        }
    }

    #[test]
    fn test_render_catalog() {
        let mut store = MessageStore::new();
        store.record("hello", None, Occurrence::new("src/B.java", 5));
        store.record("hello", None, Occurrence::new("src/a.java", 4));
        store.record(
            "{0} file",
            Some("{0} files".to_string()),
            Occurrence::new("src/a.java", 9),
        );
        store.insert(
            TranslatableMessage::new(MessageKey::new("first line\nsecond \"line\"", None))
                .with_position(Position::Positioned(0)),
        );

        assert_snapshot!(render_catalog(&store, &header(), UTF_8), @r#"
        # Messages for the demo app.
        #
        msgid ""
        msgstr ""
        "Content-Type: text/plain; charset=UTF-8\n"
        "Content-Transfer-Encoding: 8bit\n"
        "Project-Id-Version: demo 1.0\n"

        msgid ""
        "first line\n"
        "second \"line\""
        msgstr ""

        #: src/a.java:4 src/B.java:5
        msgid "hello"
        msgstr ""

        #: src/a.java:9
        msgid "{0} file"
        msgid_plural "{0} files"
        msgstr[0] ""
        msgstr[1] ""
        "#);
    }

    #[test]
    fn test_reference_lines_wrap() {
        let mut store = MessageStore::new();
        for line in 1..=8 {
            store.record(
                "wrapped",
                None,
                Occurrence::new("src/main/java/org/example/Long.java", line),
            );
        }
        let text = render_catalog(&store, &CatalogHeader::default(), UTF_8);
        let reference_lines: Vec<&str> = text.lines().filter(|l| l.starts_with("#:")).collect();

        assert!(reference_lines.len() > 1);
        assert!(reference_lines.iter().all(|l| l.len() <= REFERENCE_WIDTH));
        let total: usize = reference_lines
            .iter()
            .map(|l| l.split_whitespace().count() - 1)
            .sum();
        assert_eq!(total, 8);
    }

    #[test]
    fn test_write_catalog_encodes_and_creates_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("po").join("keys.pot");
        let mut store = MessageStore::new();
        store.record("café", None, Occurrence::new("A.java", 1));

        write_catalog(&path, &store, &CatalogHeader::default(), WINDOWS_1252).unwrap();

        let bytes = fs::read(&path).unwrap();
        assert!(bytes.windows(5).any(|w| w == b"caf\xE9\""));
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("charset=windows-1252"));
    }

    #[test]
    fn test_write_catalog_replaces_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("keys.pot");
        fs::write(&path, "old content").unwrap();
        let mut store = MessageStore::new();
        store.record("new", None, Occurrence::new("A.java", 1));

        write_catalog(&path, &store, &CatalogHeader::default(), UTF_8).unwrap();

        assert!(fs::read_to_string(&path).unwrap().contains("msgid \"new\""));
        assert!(!dir.path().join(".keys.pot.tmp").exists());
    }

    #[test]
    fn test_failed_replace_leaves_target_and_no_temp_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("keys.pot");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), "x").unwrap();

        let store = MessageStore::new();
        let header = CatalogHeader::default();
        let err = write_catalog(&path, &store, &header, UTF_8).unwrap_err();

        assert!(matches!(err, CatalogError::Io { .. }));
        assert!(path.join("keep").exists());
        assert!(!dir.path().join(".keys.pot.tmp").exists());
    }

    #[test]
    fn test_multi_line_header_comment_is_prefixed_per_line() {
        let header = CatalogHeader {
            comments: vec!["line one\n\nline two".to_string()],
            fields: Vec::new(),
        };
        let text = render_catalog(&MessageStore::new(), &header, UTF_8);

        assert!(text.starts_with("# line one\n#\n# line two\nmsgid \"\"\n"));
    }

    #[test]
    fn test_write_catalog_rejects_unencodable_text() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("keys.pot");
        let mut store = MessageStore::new();
        store.record("日本語", None, Occurrence::new("A.java", 1));

        let header = CatalogHeader::default();
        let err = write_catalog(&path, &store, &header, WINDOWS_1252).unwrap_err();
        assert!(matches!(err, CatalogError::Unencodable { .. }));
        assert!(!path.exists());
    }
}
