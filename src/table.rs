//! The type table: which tags the collections library supports, how each one
//! compares, and how it is spelled in C.
//!
//! Every entry carries an explicit [`Signedness`]. Nothing downstream inspects
//! the spelling of a tag to decide how it compares.
use std::borrow::Cow;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use indexmap::map::Entry;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::lower::dictionary_ctor_name;
use crate::path_de::{from_str_with_path, PathError};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Signedness {
    /// plain subtraction is safe
    Signed,
    /// must compare by branching; subtraction would wrap
    Unsigned,
    /// no numeric C spelling (`shallow`, `string`); dictionary-only
    Opaque,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeEntry {
    pub tag: String,
    pub signedness: Signedness,
    /// C spelling; defaults to the tag with `_` replaced by spaces
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub c_type: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TypeTable {
    entries: IndexMap<String, TypeEntry>,
}

#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("failed to read type table {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid type table at `{path}`: {message}")]
    Parse { path: String, message: String },
    #[error("type tag `{0}` is not a C identifier")]
    InvalidTag(String),
    #[error("C type `{c_type}` for tag `{tag}` is not a valid type spelling")]
    InvalidCType { tag: String, c_type: String },
    #[error("type tag `{0}` is declared more than once")]
    DuplicateTag(String),
    #[error("tags collide on dictionary constructor `{name}`")]
    AmbiguousCtorName { name: String },
    #[error("type table is empty")]
    Empty,
    #[error(transparent)]
    Serialize(#[from] serde_json::Error),
}

/// On-disk shape accepted by `--types` and printed by `collgen table`.
#[derive(Debug, Serialize, Deserialize)]
struct TableFile {
    types: Vec<TypeEntry>,
}

// ————————————————————————————————————————————————————————————————————————————
// BUILT-IN TABLE
// ————————————————————————————————————————————————————————————————————————————

const BUILTIN: &[(&str, Signedness, Option<&str>)] = &[
    ("shallow", Signedness::Opaque, None),
    ("string", Signedness::Opaque, None),
    ("char", Signedness::Signed, Some("char")),
    ("double", Signedness::Signed, Some("double")),
    ("float", Signedness::Signed, Some("float")),
    ("int", Signedness::Signed, Some("int")),
    ("long", Signedness::Signed, Some("long")),
    ("short", Signedness::Signed, Some("short")),
    ("unsigned_char", Signedness::Unsigned, Some("unsigned char")),
    ("unsigned_int", Signedness::Unsigned, Some("unsigned int")),
    ("unsigned_long", Signedness::Unsigned, Some("unsigned long")),
    ("unsigned_short", Signedness::Unsigned, Some("unsigned short")),
];

static IDENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier regex"));

static C_TYPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*( [A-Za-z_][A-Za-z0-9_]*)*$").expect("c type regex")
});

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl TypeEntry {
    pub fn new(tag: impl Into<String>, signedness: Signedness) -> Self {
        Self { tag: tag.into(), signedness, c_type: None }
    }

    pub fn with_c_type(mut self, c_type: impl Into<String>) -> Self {
        self.c_type = Some(c_type.into());
        self
    }

    pub fn c_type(&self) -> Cow<'_, str> {
        match self.c_type.as_deref() {
            Some(c_type) => Cow::Borrowed(c_type),
            None => Cow::Owned(self.tag.replace('_', " ")),
        }
    }

    fn validate(&self) -> Result<(), TableError> {
        if !IDENT.is_match(&self.tag) {
            return Err(TableError::InvalidTag(self.tag.clone()));
        }
        let c_type = self.c_type();
        if !C_TYPE.is_match(&c_type) {
            return Err(TableError::InvalidCType {
                tag: self.tag.clone(),
                c_type: c_type.into_owned(),
            });
        }
        Ok(())
    }
}

impl TypeTable {
    /// The twelve tags the collections library ships with.
    pub fn builtin() -> Self {
        let entries = BUILTIN
            .iter()
            .map(|(tag, signedness, c_type)| {
                let entry = TypeEntry {
                    tag: (*tag).to_string(),
                    signedness: *signedness,
                    c_type: c_type.map(str::to_string),
                };
                (entry.tag.clone(), entry)
            })
            .collect();
        Self { entries }
    }

    pub fn from_entries<I>(entries: I) -> Result<Self, TableError>
    where
        I: IntoIterator<Item = TypeEntry>,
    {
        let mut out = IndexMap::<String, TypeEntry>::new();
        for entry in entries {
            entry.validate()?;
            match out.entry(entry.tag.clone()) {
                Entry::Occupied(_) => return Err(TableError::DuplicateTag(entry.tag)),
                Entry::Vacant(slot) => {
                    slot.insert(entry);
                }
            }
        }
        if out.is_empty() {
            return Err(TableError::Empty);
        }
        let table = Self { entries: out };
        table.check_ctor_names()?;
        Ok(table)
    }

    pub fn from_json_str(src: &str) -> Result<Self, TableError> {
        let file = from_str_with_path::<TableFile>(src)
            .map_err(|PathError { path, message }| TableError::Parse { path, message })?;
        Self::from_entries(file.types)
    }

    pub fn load(path: &Path) -> Result<Self, TableError> {
        let source = std::fs::read_to_string(path).map_err(|source| TableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_json_str(&source)?;
        tracing::debug!(path = %path.display(), entries = table.len(), "loaded type table");
        Ok(table)
    }

    /// `--types` if given, otherwise the built-in table.
    pub fn load_or_builtin(path: Option<&Path>) -> Result<Self, TableError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::builtin()),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, TableError> {
        let file = TableFile { types: self.entries.values().cloned().collect() };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn get(&self, tag: &str) -> Option<&TypeEntry> {
        self.entries.get(tag)
    }

    /// All entries, in declared order.
    pub fn entries(&self) -> impl Iterator<Item = &TypeEntry> {
        self.entries.values()
    }

    // `a_to_b` x `c` and `a` x `b_to_c` both spell `a_to_b_to_c_dictionary_create`
    fn check_ctor_names(&self) -> Result<(), TableError> {
        let mut seen = HashSet::with_capacity(self.len() * self.len());
        for key in self.entries() {
            for value in self.entries() {
                let name = dictionary_ctor_name(&key.tag, &value.tag);
                if !seen.insert(name.clone()) {
                    return Err(TableError::AmbiguousCtorName { name });
                }
            }
        }
        Ok(())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
    use super::*;

    fn tags<'a>(it: impl Iterator<Item = &'a TypeEntry>) -> Vec<&'a str> {
        it.map(|e| e.tag.as_str()).collect()
    }

    #[test]
    fn builtin_order_and_signedness() {
        let table = TypeTable::builtin();
        assert_eq!(table.len(), 12);
        assert_eq!(
            tags(table.entries()),
            vec![
                "shallow", "string", "char", "double", "float", "int", "long", "short",
                "unsigned_char", "unsigned_int", "unsigned_long", "unsigned_short",
            ]
        );
        assert_eq!(
            tags(table.entries().filter(|e| e.signedness == Signedness::Unsigned)),
            vec!["unsigned_char", "unsigned_int", "unsigned_long", "unsigned_short"]
        );
        assert_eq!(
            tags(table.entries().filter(|e| e.signedness == Signedness::Opaque)),
            vec!["shallow", "string"]
        );
    }

    #[test]
    fn builtin_entries_pass_validation() {
        let rebuilt = TypeTable::from_entries(TypeTable::builtin().entries().cloned());
        assert!(rebuilt.is_ok());
    }

    #[test]
    fn c_type_defaults_from_tag() {
        let entry = TypeEntry::new("unsigned_long_long", Signedness::Unsigned);
        assert_eq!(entry.c_type(), "unsigned long long");
        let entry = entry.with_c_type("uint64_t");
        assert_eq!(entry.c_type(), "uint64_t");
    }

    #[test]
    fn signedness_is_explicit_not_spelled() {
        let src = r#"{ "types": [
            { "tag": "int_unsigned_special", "signedness": "signed", "c_type": "int" }
        ] }"#;
        let table = TypeTable::from_json_str(src).unwrap();
        let entry = table.get("int_unsigned_special").unwrap();
        assert_eq!(entry.signedness, Signedness::Signed);
    }

    #[test]
    fn duplicate_tags_are_rejected() {
        let err = TypeTable::from_entries([
            TypeEntry::new("int", Signedness::Signed),
            TypeEntry::new("int", Signedness::Unsigned),
        ])
        .unwrap_err();
        assert!(matches!(err, TableError::DuplicateTag(tag) if tag == "int"));
    }

    #[test]
    fn bad_identifiers_are_rejected() {
        let err = TypeTable::from_entries([TypeEntry::new("unsigned int", Signedness::Unsigned)])
            .unwrap_err();
        assert!(matches!(err, TableError::InvalidTag(_)));

        let err = TypeTable::from_entries([
            TypeEntry::new("ptr", Signedness::Signed).with_c_type("int*"),
        ])
        .unwrap_err();
        assert!(matches!(err, TableError::InvalidCType { .. }));
    }

    #[test]
    fn colliding_ctor_names_are_rejected() {
        let src = r#"{ "types": [
            { "tag": "a_to_b", "signedness": "opaque" },
            { "tag": "c", "signedness": "opaque" },
            { "tag": "a", "signedness": "opaque" },
            { "tag": "b_to_c", "signedness": "opaque" }
        ] }"#;
        match TypeTable::from_json_str(src).unwrap_err() {
            TableError::AmbiguousCtorName { name } => {
                assert_eq!(name, "a_to_b_to_c_dictionary_create");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn to_in_a_tag_is_fine_without_a_collision() {
        let table = TypeTable::from_entries([
            TypeEntry::new("a_to_b", Signedness::Opaque),
            TypeEntry::new("c", Signedness::Opaque),
        ]);
        assert!(table.is_ok());
    }

    #[test]
    fn empty_table_is_rejected() {
        let err = TypeTable::from_json_str(r#"{ "types": [] }"#).unwrap_err();
        assert!(matches!(err, TableError::Empty));
    }

    #[test]
    fn parse_errors_point_at_the_field() {
        let src = r#"{ "types": [ { "tag": "int", "signedness": "sideways" } ] }"#;
        match TypeTable::from_json_str(src).unwrap_err() {
            TableError::Parse { path, .. } => assert!(path.contains("signedness"), "{path}"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn json_dump_reloads_to_the_same_table() {
        let builtin = TypeTable::builtin();
        let src = builtin.to_json_pretty().unwrap();
        let reloaded = TypeTable::from_json_str(&src).unwrap();
        assert_eq!(
            builtin.entries().collect::<Vec<_>>(),
            reloaded.entries().collect::<Vec<_>>()
        );
        assert!(!src.contains("\"c_type\": null"));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = TypeTable::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, TableError::Io { .. }));
    }
}
