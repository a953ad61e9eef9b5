use std::{fs, path::Path};

use encoding_rs::Encoding;
use tracing::debug;

use super::{CatalogError, escape::unquote};
use crate::core::store::{MessageKey, MessageStore, Occurrence, Position, TranslatableMessage};

/// Read and decode a catalog file into a store of positioned messages.
pub fn read_catalog(
    path: &Path,
    encoding: &'static Encoding,
) -> Result<MessageStore, CatalogError> {
    let bytes = fs::read(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let (content, _, malformed) = encoding.decode(&bytes);
    if malformed {
        return Err(CatalogError::Undecodable {
            path: path.to_path_buf(),
            encoding: encoding.name(),
        });
    }
    parse_catalog(&content, path)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Msgctxt,
    Msgid,
    MsgidPlural,
    Msgstr,
}

#[derive(Debug, Default)]
struct Entry {
    references: Vec<Occurrence>,
    msgid: Option<String>,
    msgid_plural: Option<String>,
    has_msgstr: bool,
    field: Option<Field>,
}

impl Entry {
    fn is_empty(&self) -> bool {
        self.msgid.is_none() && self.references.is_empty()
    }

    fn append(&mut self, text: &str) -> bool {
        let target = match self.field {
            Some(Field::Msgid) => self.msgid.as_mut(),
            Some(Field::MsgidPlural) => self.msgid_plural.as_mut(),
            // Context and translations are read but not kept.
            Some(Field::Msgctxt | Field::Msgstr) => return true,
            None => return false,
        };
        match target {
            Some(value) => {
                value.push_str(text);
                true
            }
            None => false,
        }
    }
}

/// Parse PO text. Messages get `Positioned(i)` in order of appearance; the
/// header entry and obsolete (`#~`) entries are skipped.
///
/// `path` is only used for error reporting.
pub fn parse_catalog(content: &str, path: &Path) -> Result<MessageStore, CatalogError> {
    let syntax = |line: usize, message: &str| CatalogError::Syntax {
        path: path.to_path_buf(),
        line,
        message: message.to_string(),
    };

    let mut store = MessageStore::new();
    let mut next_position = 0;
    let mut entry = Entry::default();

    let mut finish = |entry: Entry, line: usize| -> Result<(), CatalogError> {
        let Some(msgid) = entry.msgid else {
            if entry.references.is_empty() {
                return Ok(());
            }
            return Err(syntax(line, "references without msgid"));
        };
        if msgid.is_empty() {
            // Header entry.
            return Ok(());
        }
        if !entry.has_msgstr {
            return Err(syntax(line, "entry without msgstr"));
        }
        let mut message = TranslatableMessage::new(MessageKey::new(msgid, entry.msgid_plural))
            .with_position(Position::Positioned(next_position));
        message.occurrences.extend(entry.references);
        store.insert(message);
        next_position += 1;
        Ok(())
    };

    for (index, raw) in content.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim();

        if line.is_empty() {
            if !entry.is_empty() {
                finish(std::mem::take(&mut entry), line_no)?;
            }
            continue;
        }

        if line.starts_with("#~") {
            continue;
        }

        if let Some(references) = line.strip_prefix("#:") {
            if entry.msgid.is_some() {
                finish(std::mem::take(&mut entry), line_no)?;
            }
            for reference in split_references(references) {
                match parse_reference(reference) {
                    Some(occurrence) => entry.references.push(occurrence),
                    None => debug!(
                        line = line_no,
                        reference,
                        "ignoring reference without line number"
                    ),
                }
            }
            continue;
        }

        if line.starts_with('#') {
            continue;
        }

        if line.starts_with('"') {
            let text = unquote(line).ok_or_else(|| syntax(line_no, "malformed string"))?;
            if !entry.append(&text) {
                return Err(syntax(line_no, "string continuation outside of an entry"));
            }
            continue;
        }

        let (keyword, value) = line
            .split_once(char::is_whitespace)
            .ok_or_else(|| syntax(line_no, "expected keyword and string"))?;
        let text = unquote(value).ok_or_else(|| syntax(line_no, "malformed string"))?;

        match keyword {
            "msgctxt" | "msgid" if entry.msgid.is_some() && entry.has_msgstr => {
                finish(std::mem::take(&mut entry), line_no)?;
                set_field(&mut entry, keyword, text);
            }
            "msgctxt" | "msgid" if entry.msgid.is_some() => {
                return Err(syntax(line_no, "msgid without msgstr"));
            }
            "msgctxt" | "msgid" => set_field(&mut entry, keyword, text),
            "msgid_plural" => {
                if entry.msgid.is_none() {
                    return Err(syntax(line_no, "msgid_plural before msgid"));
                }
                entry.msgid_plural = Some(text);
                entry.field = Some(Field::MsgidPlural);
            }
            _ if keyword == "msgstr" || is_indexed_msgstr(keyword) => {
                if entry.msgid.is_none() {
                    return Err(syntax(line_no, "msgstr before msgid"));
                }
                entry.has_msgstr = true;
                entry.field = Some(Field::Msgstr);
            }
            _ => return Err(syntax(line_no, &format!("unknown keyword '{}'", keyword))),
        }
    }

    if !entry.is_empty() {
        finish(entry, content.lines().count())?;
    }

    Ok(store)
}

fn set_field(entry: &mut Entry, keyword: &str, text: String) {
    if keyword == "msgctxt" {
        entry.field = Some(Field::Msgctxt);
    } else {
        entry.msgid = Some(text);
        entry.field = Some(Field::Msgid);
    }
}

fn is_indexed_msgstr(keyword: &str) -> bool {
    keyword
        .strip_prefix("msgstr[")
        .and_then(|rest| rest.strip_suffix(']'))
        .is_some_and(is_digits)
}

/// Split a `#:` line into references.
///
/// A reference ends at a word with a `:line` suffix, so paths containing
/// spaces stay whole. Trailing words without a line number form one last
/// reference.
fn split_references(text: &str) -> Vec<&str> {
    let mut references = Vec::new();
    let mut start = None;
    let mut word_start = None;
    for (i, c) in text.char_indices().chain([(text.len(), ' ')]) {
        if !c.is_whitespace() {
            word_start.get_or_insert(i);
            start.get_or_insert(i);
            continue;
        }
        let Some(word) = word_start.take().map(|w| &text[w..i]) else {
            continue;
        };
        if has_line_suffix(word) {
            if let Some(s) = start.take() {
                references.push(&text[s..i]);
            }
        }
    }
    if let Some(s) = start {
        references.push(text[s..].trim_end());
    }
    references
}

fn has_line_suffix(word: &str) -> bool {
    word.rsplit_once(':').is_some_and(|(_, n)| is_digits(n))
}

fn is_digits(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

/// `path:line`; the path itself may contain colons.
fn parse_reference(reference: &str) -> Option<Occurrence> {
    let (path, line) = reference.rsplit_once(':')?;
    let line = line.parse().ok()?;
    if path.is_empty() {
        return None;
    }
    Some(Occurrence::new(path, line))
}
