//! The fixed property schema of the remote reference database.
//!
//! Every property that can be transmitted is a [`SchemaField`] paired with a
//! [`PropertyKind`] that decides its wire envelope. Anything outside this
//! closed set is dropped before submission.

use std::{borrow::Cow, collections::BTreeMap};

use serde::ser::{Serialize, SerializeMap, Serializer};

/// A property name from the closed set understood by the reference database.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SchemaField {
    /// Publication year, stored as a number.
    Year,
    /// The DOI of the reference.
    Doi,
    /// Publisher name.
    Publisher,
    /// Title of the work.
    Title,
    /// Resolver URL of the reference.
    Url,
    /// Journal the work appeared in.
    Journal,
    /// Publication month.
    Month,
    /// Authors of the work.
    Author,
    /// The normalized `BibTeX` rendition of the whole entry.
    BibTex,
    /// Human-readable record name, derived from the cite key.
    Name,
}

impl SchemaField {
    /// Every field of the schema, in serialization order.
    pub const ALL: [Self; 10] = [
        Self::Year,
        Self::Doi,
        Self::Publisher,
        Self::Title,
        Self::Url,
        Self::Journal,
        Self::Month,
        Self::Author,
        Self::BibTex,
        Self::Name,
    ];

    /// The property name as it appears in the database.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Year => "Year",
            Self::Doi => "DOI",
            Self::Publisher => "Publisher",
            Self::Title => "Title",
            Self::Url => "URL",
            Self::Journal => "Journal",
            Self::Month => "Month",
            Self::Author => "Author",
            Self::BibTex => "BibTeX",
            Self::Name => "Name",
        }
    }

    /// The value kind of this field.
    #[must_use]
    pub const fn kind(self) -> PropertyKind {
        match self {
            Self::Year => PropertyKind::Number,
            Self::Url => PropertyKind::Url,
            Self::Name => PropertyKind::Title,
            _ => PropertyKind::RichText,
        }
    }

    /// Finds the field with the given property name, if it is part of the schema.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.name() == name)
    }
}

/// The value kind of a [`SchemaField`], deciding its wire envelope.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PropertyKind {
    /// A scalar number.
    Number,
    /// Rich text, transmitted as a single text run.
    RichText,
    /// A scalar URL string.
    Url,
    /// The record title, transmitted as a single text run.
    Title,
}

impl PropertyKind {
    /// The kind name used as the envelope key on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::RichText => "rich_text",
            Self::Url => "url",
            Self::Title => "title",
        }
    }
}

/// A property value before it is wrapped in its kind-specific envelope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PropertyValue {
    /// An integer value.
    Number(i64),
    /// A plain string value.
    Text(String),
}

impl PropertyValue {
    /// The value as text, rendering numbers with their decimal form.
    #[must_use]
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Self::Number(n) => Cow::Owned(n.to_string()),
            Self::Text(s) => Cow::Borrowed(s),
        }
    }
}

/// Schema field values ready for submission to the reference database.
///
/// Serializes to the `properties` object of the remote store API: number and
/// url kinds are scalars, rich text and title kinds wrap the string in a
/// single-run text list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MappedProperties(BTreeMap<SchemaField, PropertyValue>);

impl MappedProperties {
    /// Creates an empty set of properties.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Sets the value for a field, returning the previous value if one was set.
    pub fn insert(&mut self, field: SchemaField, value: PropertyValue) -> Option<PropertyValue> {
        self.0.insert(field, value)
    }

    /// Returns the value for a field, if set.
    #[must_use]
    pub fn get(&self, field: SchemaField) -> Option<&PropertyValue> {
        self.0.get(&field)
    }

    /// Number of fields with a value.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no field has a value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The fields with a value, in serialization order.
    pub fn fields(&self) -> impl Iterator<Item = SchemaField> + '_ {
        self.0.keys().copied()
    }
}

impl Serialize for MappedProperties {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (field, value) in &self.0 {
            map.serialize_entry(
                field.name(),
                &Property {
                    kind: field.kind(),
                    value,
                },
            )?;
        }
        map.end()
    }
}

struct Property<'a> {
    kind: PropertyKind,
    value: &'a PropertyValue,
}

#[derive(serde::Serialize)]
struct TextRun<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: TextContent<'a>,
}

#[derive(serde::Serialize)]
struct TextContent<'a> {
    content: &'a str,
}

impl Serialize for Property<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self.kind {
            PropertyKind::Number | PropertyKind::Url => match self.value {
                PropertyValue::Number(n) => map.serialize_entry(self.kind.as_str(), n)?,
                PropertyValue::Text(s) => map.serialize_entry(self.kind.as_str(), s)?,
            },
            PropertyKind::RichText | PropertyKind::Title => {
                let content = self.value.as_text();
                let runs = [TextRun {
                    kind: "text",
                    text: TextContent { content: &content },
                }];
                map.serialize_entry(self.kind.as_str(), &runs)?;
            }
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {

    use serde_json::json;

    use super::*;

    #[test]
    fn every_field_name_round_trips() {
        for field in SchemaField::ALL {
            assert_eq!(Some(field), SchemaField::from_name(field.name()));
        }
    }

    #[test]
    fn unknown_names_are_not_part_of_the_schema() {
        assert_eq!(None, SchemaField::from_name("Volume"));
        // only the database spellings count, not the raw bibtex ones
        assert_eq!(None, SchemaField::from_name("Url"));
        assert_eq!(None, SchemaField::from_name("Doi"));
    }

    #[test]
    fn field_kinds_match_the_database_schema() {
        assert_eq!(PropertyKind::Number, SchemaField::Year.kind());
        assert_eq!(PropertyKind::Url, SchemaField::Url.kind());
        assert_eq!(PropertyKind::Title, SchemaField::Name.kind());
        assert_eq!(PropertyKind::RichText, SchemaField::Doi.kind());
        assert_eq!(PropertyKind::RichText, SchemaField::BibTex.kind());
    }

    #[test]
    fn serialization_uses_kind_specific_envelopes() {
        let mut props = MappedProperties::new();
        props.insert(SchemaField::Year, PropertyValue::Number(2020));
        props.insert(SchemaField::Url, PropertyValue::Text("http://x".to_owned()));
        props.insert(SchemaField::Title, PropertyValue::Text("Foo".to_owned()));
        props.insert(
            SchemaField::Name,
            PropertyValue::Text("Smith 2020".to_owned()),
        );

        let value = serde_json::to_value(&props).expect("properties are always serializable");

        assert_eq!(
            json!({
                "Year": { "number": 2020 },
                "URL": { "url": "http://x" },
                "Title": {
                    "rich_text": [{ "type": "text", "text": { "content": "Foo" } }]
                },
                "Name": {
                    "title": [{ "type": "text", "text": { "content": "Smith 2020" } }]
                },
            }),
            value
        );
    }

    #[test]
    fn insert_replaces_existing_values() {
        let mut props = MappedProperties::new();
        assert_eq!(
            None,
            props.insert(SchemaField::Title, PropertyValue::Text("one".to_owned()))
        );
        assert_eq!(
            Some(PropertyValue::Text("one".to_owned())),
            props.insert(SchemaField::Title, PropertyValue::Text("two".to_owned()))
        );
        assert_eq!(1, props.len());
    }
}
