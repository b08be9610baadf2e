//! Post record validation
//!
//! Turns loosely-typed front-matter into typed post fields. Every problem in
//! a file is reported, not just the first one.

use chrono::{DateTime, FixedOffset};
use chrono_tz::Tz;
use indexmap::{IndexMap, IndexSet};

use super::{FieldValue, FrontMatter};
use crate::error::ErrorKind;
use crate::helpers::parse_post_date;

/// Typed fields of a post, ready to become a `PostRecord`
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedFields {
    pub title: String,
    pub date: DateTime<FixedOffset>,
    pub draft: bool,
    pub tags: Vec<String>,
    /// Unknown keys, kept in file order and never checked
    pub extra: IndexMap<String, FieldValue>,
}

/// Validates front-matter against the post schema
#[derive(Debug, Clone, Copy)]
pub struct Validator {
    timezone: Tz,
}

impl Default for Validator {
    fn default() -> Self {
        Self {
            timezone: chrono_tz::UTC,
        }
    }
}

impl Validator {
    /// `timezone` applies to dates written without an offset
    pub fn new(timezone: Tz) -> Self {
        Self { timezone }
    }

    pub fn validate(&self, front_matter: FrontMatter) -> Result<ValidatedFields, Vec<ErrorKind>> {
        let mut fields = front_matter.into_fields();
        let mut errors = Vec::new();

        let title = check_title(fields.shift_remove("title"), &mut errors);
        let date = self.check_date(fields.shift_remove("date"), &mut errors);
        let draft = check_draft(fields.shift_remove("draft"), &mut errors);
        let tags = check_tags(fields.shift_remove("tags"), &mut errors);

        match (title, date) {
            (Some(title), Some(date)) if errors.is_empty() => Ok(ValidatedFields {
                title,
                date,
                draft,
                tags,
                extra: fields,
            }),
            _ => Err(errors),
        }
    }

    fn check_date(
        &self,
        value: Option<FieldValue>,
        errors: &mut Vec<ErrorKind>,
    ) -> Option<DateTime<FixedOffset>> {
        match value {
            None | Some(FieldValue::Null) => {
                errors.push(ErrorKind::validation("date"));
                None
            }
            Some(FieldValue::String(s)) => {
                let parsed = parse_post_date(&s, self.timezone);
                if parsed.is_none() {
                    errors.push(ErrorKind::InvalidDate { value: s });
                }
                parsed
            }
            Some(other) => {
                errors.push(ErrorKind::type_mismatch(
                    "date",
                    "a date string",
                    other.kind_name(),
                ));
                None
            }
        }
    }
}

fn check_title(value: Option<FieldValue>, errors: &mut Vec<ErrorKind>) -> Option<String> {
    match value {
        Some(FieldValue::String(s)) if !s.trim().is_empty() => Some(s),
        None | Some(FieldValue::Null) | Some(FieldValue::String(_)) => {
            errors.push(ErrorKind::validation("title"));
            None
        }
        Some(other) => {
            errors.push(ErrorKind::type_mismatch(
                "title",
                "string",
                other.kind_name(),
            ));
            None
        }
    }
}

fn check_draft(value: Option<FieldValue>, errors: &mut Vec<ErrorKind>) -> bool {
    match value {
        None | Some(FieldValue::Null) => false,
        Some(FieldValue::Bool(b)) => b,
        Some(other) => {
            errors.push(ErrorKind::type_mismatch(
                "draft",
                "boolean",
                other.kind_name(),
            ));
            false
        }
    }
}

fn check_tags(value: Option<FieldValue>, errors: &mut Vec<ErrorKind>) -> Vec<String> {
    let items = match value {
        None | Some(FieldValue::Null) => return Vec::new(),
        Some(FieldValue::List(items)) => items,
        Some(other) => {
            errors.push(ErrorKind::type_mismatch(
                "tags",
                "list of strings",
                other.kind_name(),
            ));
            return Vec::new();
        }
    };

    // Tags are a set; the first occurrence fixes display order
    let mut tags = IndexSet::with_capacity(items.len());
    for (i, item) in items.into_iter().enumerate() {
        match item {
            FieldValue::String(tag) => {
                tags.insert(tag);
            }
            other => errors.push(ErrorKind::type_mismatch(
                format!("tags[{}]", i),
                "string",
                other.kind_name(),
            )),
        }
    }
    tags.into_iter().collect()
}
