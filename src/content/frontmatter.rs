//! Front-matter parsing
//!
//! A post starts with a `---` line, a YAML mapping, and a closing `---`
//! line. Everything after the closing line is the body, kept verbatim.

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::error::ErrorKind;

const BOM: &str = "\u{feff}";

/// A front-matter value, resolved from YAML into a closed set of shapes
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Number(serde_yaml::Number),
    String(String),
    List(Vec<FieldValue>),
    Map(IndexMap<String, FieldValue>),
}

impl FieldValue {
    fn from_yaml(value: serde_yaml::Value) -> Result<Self, String> {
        use serde_yaml::Value;

        Ok(match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Bool(b),
            Value::Number(n) => FieldValue::Number(n),
            Value::String(s) => FieldValue::String(s),
            Value::Sequence(seq) => FieldValue::List(
                seq.into_iter()
                    .map(FieldValue::from_yaml)
                    .collect::<Result<_, _>>()?,
            ),
            Value::Mapping(map) => FieldValue::Map(convert_mapping(map)?),
            // Custom tags (`!foo bar`) carry no meaning here
            Value::Tagged(tagged) => FieldValue::from_yaml(tagged.value)?,
        })
    }

    /// Human-readable name of the value's shape, used in type errors
    pub fn kind_name(&self) -> &'static str {
        match self {
            FieldValue::Null => "null",
            FieldValue::Bool(_) => "boolean",
            FieldValue::Number(_) => "number",
            FieldValue::String(_) => "string",
            FieldValue::List(_) => "list",
            FieldValue::Map(_) => "mapping",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }
}

fn convert_mapping(map: serde_yaml::Mapping) -> Result<IndexMap<String, FieldValue>, String> {
    use serde_yaml::Value;

    let mut fields = IndexMap::with_capacity(map.len());
    for (key, value) in map {
        let key = match key {
            Value::String(s) => s,
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            other => {
                return Err(format!(
                    "keys must be plain scalars, found {}",
                    yaml_kind(&other)
                ))
            }
        };
        if fields.contains_key(&key) {
            return Err(format!("duplicate key `{}`", key));
        }
        fields.insert(key, FieldValue::from_yaml(value)?);
    }
    Ok(fields)
}

fn yaml_kind(value: &serde_yaml::Value) -> &'static str {
    match value {
        serde_yaml::Value::Sequence(_) => "a list",
        serde_yaml::Value::Mapping(_) => "a mapping",
        serde_yaml::Value::Null => "null",
        _ => "a tagged value",
    }
}

/// The Markdown that follows the front-matter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Body<'a> {
    pub text: &'a str,
    /// Byte offset of `text` within the original file
    pub offset: usize,
}

/// The raw pieces of a file before the metadata block is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawDocument<'a> {
    pub metadata: &'a str,
    pub body: Body<'a>,
}

/// Split a file into its metadata block and body.
///
/// The opening `---` must be the very first line (a UTF-8 BOM is
/// tolerated). Delimiter lines may carry trailing spaces and CRLF endings.
pub fn split(content: &str) -> Result<RawDocument<'_>, ErrorKind> {
    lazy_static! {
        static ref OPENING: Regex = Regex::new(r"\A---[ \t]*\r?(?:\n|\z)").unwrap();
        static ref CLOSING: Regex = Regex::new(r"(?m)^---[ \t]*\r?$").unwrap();
    }

    let start = if content.starts_with(BOM) { BOM.len() } else { 0 };
    let text = &content[start..];

    let opening = OPENING.find(text).ok_or(ErrorKind::MissingFrontMatter)?;
    let block_start = start + opening.end();
    let rest = &content[block_start..];

    let closing = CLOSING
        .find(rest)
        .ok_or(ErrorKind::UnterminatedFrontMatter)?;

    let metadata = &rest[..closing.start()];
    let mut body_offset = block_start + closing.end();
    if content[body_offset..].starts_with('\n') {
        body_offset += 1;
    }

    Ok(RawDocument {
        metadata,
        body: Body {
            text: &content[body_offset..],
            offset: body_offset,
        },
    })
}

/// Parsed front-matter: key/value pairs in file order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrontMatter {
    fields: IndexMap<String, FieldValue>,
}

impl FrontMatter {
    /// Parse front-matter from file content.
    /// Returns (front_matter, body)
    pub fn parse(content: &str) -> Result<(Self, Body<'_>), ErrorKind> {
        let raw = split(content)?;
        let fm = Self::parse_block(raw.metadata)?;
        Ok((fm, raw.body))
    }

    /// Interpret the text between the delimiters as a YAML mapping
    pub fn parse_block(block: &str) -> Result<Self, ErrorKind> {
        let malformed = |message: String| ErrorKind::MalformedFrontMatter { message };

        let value: serde_yaml::Value =
            serde_yaml::from_str(block).map_err(|e| malformed(e.to_string()))?;

        let fields = match value {
            // Empty block or comments only
            serde_yaml::Value::Null => IndexMap::new(),
            serde_yaml::Value::Mapping(map) => convert_mapping(map).map_err(malformed)?,
            other => {
                return Err(malformed(format!(
                    "expected `key: value` pairs, found {}",
                    FieldValue::from_yaml(other)
                        .map(|v| v.kind_name())
                        .unwrap_or("an unsupported value")
                )))
            }
        };

        Ok(Self { fields })
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn into_fields(self) -> IndexMap<String, FieldValue> {
        self.fields
    }
}
