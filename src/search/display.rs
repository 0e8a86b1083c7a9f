//! Display labels for interactive lookups
//!
//! Builds the human label shown for a record in a search-as-you-type list,
//! and the ordering those lists are sorted in.

use crate::types::{scalar_to_string, Record};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Which fields make up a record's label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NameFieldSpec {
    /// One field, used as-is
    Single(String),
    /// Several fields joined with a space, empty ones skipped
    Concat(Vec<String>),
    /// The first alternative that yields a non-blank label
    FirstOf {
        first_of: Vec<NameFieldSpec>,
    },
}

impl NameFieldSpec {
    /// Label from the record's fields, or an empty string
    pub fn label(&self, record: &Record) -> String {
        match self {
            NameFieldSpec::Single(field) => field_text(record, field).unwrap_or_default(),
            NameFieldSpec::Concat(fields) => fields
                .iter()
                .filter_map(|field| field_text(record, field))
                .filter(|value| !value.trim().is_empty())
                .collect::<Vec<_>>()
                .join(" "),
            NameFieldSpec::FirstOf { first_of } => first_of
                .iter()
                .map(|spec| spec.label(record))
                .find(|label| !label.trim().is_empty())
                .unwrap_or_default(),
        }
    }
}

impl From<&str> for NameFieldSpec {
    fn from(field: &str) -> Self {
        NameFieldSpec::Single(field.to_string())
    }
}

impl<const N: usize> From<[&str; N]> for NameFieldSpec {
    fn from(fields: [&str; N]) -> Self {
        NameFieldSpec::Concat(fields.iter().map(|f| (*f).to_string()).collect())
    }
}

fn field_text(record: &Record, field: &str) -> Option<String> {
    record.get(field).and_then(scalar_to_string)
}

/// Optional field appended to a label when present, e.g. ` (pdf)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelExtra {
    pub field: String,
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub suffix: String,
    /// Keep only the date of a `YYYY-MM-DDThh:mm:ss` or `YYYY-MM-DD hh:mm:ss` value
    #[serde(default)]
    pub date_only: bool,
}

impl LabelExtra {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            prefix: String::new(),
            suffix: String::new(),
            date_only: false,
        }
    }

    #[must_use]
    pub fn wrapped(mut self, prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self.suffix = suffix.into();
        self
    }

    #[must_use]
    pub fn date_only(mut self) -> Self {
        self.date_only = true;
        self
    }

    fn render(&self, record: &Record) -> Option<String> {
        let value = field_text(record, &self.field)?;
        let value = if self.date_only {
            value
                .split(['T', ' '])
                .next()
                .unwrap_or_default()
                .to_string()
        } else {
            value
        };
        if value.trim().is_empty() {
            return None;
        }
        Some(format!("{}{}{}", self.prefix, value, self.suffix))
    }
}

/// How to label records of one resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayNameSpec {
    /// Field holding the identifier used as the option value
    pub id_field: String,
    /// Fields forming the label
    pub name_fields: NameFieldSpec,
    /// Resource type used in the fallback label, e.g. `Company`
    pub resource_type: String,
    /// Appended after the name (or the fallback), in order
    pub extras: Vec<LabelExtra>,
}

impl DisplayNameSpec {
    pub fn new(
        id_field: impl Into<String>,
        name_fields: impl Into<NameFieldSpec>,
        resource_type: impl Into<String>,
    ) -> Self {
        Self {
            id_field: id_field.into(),
            name_fields: name_fields.into(),
            resource_type: resource_type.into(),
            extras: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_extras(mut self, extras: Vec<LabelExtra>) -> Self {
        self.extras = extras;
        self
    }

    /// Identifier of the record as a string, if present
    pub fn id_of(&self, record: &Record) -> Option<String> {
        record.get(&self.id_field).and_then(scalar_to_string)
    }

    /// Label of the record, falling back to `"<ResourceType> <id>"`, then
    /// followed by any extras present on the record
    pub fn label(&self, record: &Record) -> String {
        let mut label = self.name_fields.label(record);
        if label.trim().is_empty() {
            label = format!(
                "{} {}",
                self.resource_type,
                self.id_of(record).unwrap_or_default()
            );
        }
        for extra in &self.extras {
            if let Some(text) = extra.render(record) {
                label.push_str(&text);
            }
        }
        label
    }

    /// Option for the record, or `None` when it has no identifier
    pub fn option(&self, record: &Record) -> Option<ListOption> {
        let value = self.id_of(record)?;
        Some(ListOption {
            label: self.label(record),
            value,
        })
    }
}

/// How a nested option names its parent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParentLabel {
    /// `"<child> (<parent>)"`; the filter sees the child label only
    #[default]
    Parens,
    /// `"<child> [<parent>]"`; the filter sees the whole label
    Brackets,
}

impl ParentLabel {
    pub fn join(self, child: &str, parent: &str) -> String {
        match self {
            ParentLabel::Parens => format!("{child} ({parent})"),
            ParentLabel::Brackets => format!("{child} [{parent}]"),
        }
    }

    /// Whether the parent name takes part in filtering
    pub fn filters_parent(self) -> bool {
        matches!(self, ParentLabel::Brackets)
    }
}

/// One entry of a lookup list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListOption {
    /// Text shown to the user
    pub label: String,
    /// Identifier submitted when the entry is picked
    pub value: String,
}

/// Case-insensitive substring match; an absent or empty filter matches all
pub fn matches_filter(label: &str, filter: Option<&str>) -> bool {
    match filter {
        Some(filter) if !filter.is_empty() => {
            label.to_lowercase().contains(&filter.to_lowercase())
        }
        _ => true,
    }
}

/// Keep options matching `filter` and sort them by label
pub fn filter_and_sort(options: Vec<ListOption>, filter: Option<&str>) -> Vec<ListOption> {
    let mut options: Vec<ListOption> = options
        .into_iter()
        .filter(|option| matches_filter(&option.label, filter))
        .collect();
    options.sort_by(|a, b| compare_labels(&a.label, &b.label));
    options
}

/// Dictionary order for labels: accents and case are ignored first, then
/// unaccented before accented, then lower case before upper case.
pub fn compare_labels(a: &str, b: &str) -> Ordering {
    let (a_lower, b_lower) = (a.to_lowercase(), b.to_lowercase());
    fold_accents(&a_lower)
        .cmp(&fold_accents(&b_lower))
        .then_with(|| a_lower.cmp(&b_lower))
        .then_with(|| b.cmp(a))
}

fn fold_accents(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => out.push('a'),
            'ç' => out.push('c'),
            'è' | 'é' | 'ê' | 'ë' => out.push('e'),
            'ì' | 'í' | 'î' | 'ï' => out.push('i'),
            'ñ' => out.push('n'),
            'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' => out.push('o'),
            'ù' | 'ú' | 'û' | 'ü' => out.push('u'),
            'ý' | 'ÿ' => out.push('y'),
            'æ' => out.push_str("ae"),
            'œ' => out.push_str("oe"),
            other => out.push(other),
        }
    }
    out
}
