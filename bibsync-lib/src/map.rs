//! Mapping of raw `BibTeX` metadata into database properties.

use biblatex::{Bibliography, ChunksExt};

use crate::{
    schema::{MappedProperties, PropertyValue, SchemaField},
    Error, ErrorKind,
};

/// Maps a raw `BibTeX` entry into properties conforming to the database schema.
///
/// The cite key becomes the `Name` property with underscores replaced by
/// spaces, the `url` and `doi` fields keep their database spellings (`URL`,
/// `DOI`), a normalized rendition of the whole entry is stored under `BibTeX`,
/// and every field outside the schema is dropped. When the text holds more
/// than one entry only the first is used.
///
/// # Errors
///
/// An `Err` of kind [`ErrorKind::Mapping`] is returned when the text cannot be
/// parsed as `BibTeX`, when the cite key, `url`, `doi`, or `year` field is
/// missing, or when the `year` value is not numeric.
pub fn map_fields(raw: &str) -> Result<MappedProperties, Error> {
    let biblio = Bibliography::parse(raw)
        .filter(|b| b.len() != 0)
        .ok_or_else(|| Error::new(ErrorKind::Mapping, "unable to parse text as BibTeX"))?;

    let entry = biblio
        .into_iter()
        .next()
        .ok_or_else(|| Error::new(ErrorKind::Mapping, "no bibliography entry found"))?;

    // Deconstruct to avoid cloning
    let biblatex::Entry {
        key,
        entry_type,
        fields,
    } = entry;

    if key.is_empty() {
        return Err(Error::new(ErrorKind::Mapping, "entry has no cite key"));
    }

    let mut values: Vec<(String, String)> = fields
        .into_iter()
        .map(|(name, value)| (name, value.format_verbatim()))
        .collect();
    values.sort();

    let kind = entry_type.to_string().to_lowercase();
    let bibtex = compose_entry(&kind, &key, &values);

    let mut props = MappedProperties::new();
    let mut year = None;

    for (name, value) in values {
        let field = match name.as_str() {
            "url" => SchemaField::Url,
            "doi" => SchemaField::Doi,
            "year" => {
                year = Some(value);
                continue;
            }
            _ => {
                if let Some(field) = SchemaField::from_name(&capitalize(&name)) {
                    field
                } else {
                    continue;
                }
            }
        };
        props.insert(field, PropertyValue::Text(value));
    }

    if props.get(SchemaField::Url).is_none() {
        return Err(Error::new(
            ErrorKind::Mapping,
            "entry is missing the required 'url' field",
        ));
    }
    if props.get(SchemaField::Doi).is_none() {
        return Err(Error::new(
            ErrorKind::Mapping,
            "entry is missing the required 'doi' field",
        ));
    }

    let year_value = year.ok_or_else(|| {
        Error::new(ErrorKind::Mapping, "entry is missing the required 'year' field")
    })?;
    let year: i64 = year_value.trim().parse().map_err(|_| {
        Error::new(
            ErrorKind::Mapping,
            format!("year '{year_value}' is not numeric"),
        )
    })?;

    props.insert(SchemaField::Year, PropertyValue::Number(year));
    props.insert(SchemaField::Name, PropertyValue::Text(key.replace('_', " ")));
    props.insert(SchemaField::BibTex, PropertyValue::Text(bibtex));

    Ok(props)
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    chars
        .next()
        .map_or_else(String::new, |first| first.to_uppercase().chain(chars).collect())
}

fn compose_entry(kind: &str, cite: &str, fields: &[(String, String)]) -> String {
    let fields: String = fields
        .iter()
        .map(|(name, value)| format!("    {name} = {{{value}}},\n"))
        .collect();

    format!("@{kind}{{{cite},\n{fields}}}\n")
}

#[cfg(test)]
mod tests {

    use super::*;

    const SMITH: &str = "@article{Smith_2020, doi={10.1/xyz}, url={http://x}, year={2020}, title={Foo}}";

    #[test]
    fn known_fields_are_renamed_and_wrapped() {
        let props = map_fields(SMITH).expect("entry holds every required field");

        assert_eq!(
            Some(&PropertyValue::Text("Smith 2020".to_owned())),
            props.get(SchemaField::Name)
        );
        assert_eq!(
            Some(&PropertyValue::Number(2020)),
            props.get(SchemaField::Year)
        );
        assert_eq!(
            Some(&PropertyValue::Text("http://x".to_owned())),
            props.get(SchemaField::Url)
        );
        assert_eq!(
            Some(&PropertyValue::Text("10.1/xyz".to_owned())),
            props.get(SchemaField::Doi)
        );
        assert_eq!(
            Some(&PropertyValue::Text("Foo".to_owned())),
            props.get(SchemaField::Title)
        );
    }

    #[test]
    fn mapped_properties_hold_exactly_the_schema_fields() {
        let props = map_fields(SMITH).expect("entry holds every required field");

        let fields: Vec<_> = props.fields().collect();
        assert_eq!(
            vec![
                SchemaField::Year,
                SchemaField::Doi,
                SchemaField::Title,
                SchemaField::Url,
                SchemaField::BibTex,
                SchemaField::Name,
            ],
            fields
        );
    }

    #[test]
    fn fields_outside_the_schema_are_dropped() {
        let raw = "@article{a, doi={d}, url={u}, year={1999}, volume={12}, pages={1--10}}";
        let props = map_fields(raw).expect("entry holds every required field");

        // volume and pages have no schema counterpart
        assert_eq!(5, props.len());
    }

    #[test]
    fn normalized_bibtex_is_stored_verbatim() {
        let props = map_fields(SMITH).expect("entry holds every required field");

        let bibtex = props
            .get(SchemaField::BibTex)
            .map(PropertyValue::as_text)
            .expect("the BibTeX property is always set");

        assert!(bibtex.starts_with("@article{Smith_2020,\n"));
        assert!(bibtex.contains("    doi = {10.1/xyz},\n"));
        assert!(bibtex.contains("    title = {Foo},\n"));
        assert!(bibtex.ends_with("}\n"));
    }

    #[test]
    fn non_numeric_year_is_a_mapping_error() {
        let raw = "@article{a, doi={d}, url={u}, year={n/a}, title={Bad}}";
        let err = map_fields(raw).expect_err("a year of 'n/a' cannot be coerced to a number");

        assert_eq!(ErrorKind::Mapping, err.kind());
    }

    #[test]
    fn missing_required_fields_are_mapping_errors() {
        let missing_url = "@article{a, doi={d}, year={1999}}";
        let missing_doi = "@article{a, url={u}, year={1999}}";
        let missing_year = "@article{a, doi={d}, url={u}}";

        for raw in [missing_url, missing_doi, missing_year] {
            let err = map_fields(raw).expect_err("a required field is missing");
            assert_eq!(ErrorKind::Mapping, err.kind());
        }
    }

    #[test]
    fn garbage_input_is_a_mapping_error() {
        let err = map_fields("This is not valid BibTeX").expect_err("input is not BibTeX");

        assert_eq!(ErrorKind::Mapping, err.kind());
    }

    #[test]
    fn first_entry_wins_when_multiple_are_present() {
        let raw = "@article{first, doi={d1}, url={u1}, year={2001}}\n\
                   @article{second, doi={d2}, url={u2}, year={2002}}";
        let props = map_fields(raw).expect("first entry holds every required field");

        assert_eq!(
            Some(&PropertyValue::Text("first".to_owned())),
            props.get(SchemaField::Name)
        );
        assert_eq!(
            Some(&PropertyValue::Number(2001)),
            props.get(SchemaField::Year)
        );
    }

    #[test]
    fn mapping_is_idempotent_for_fixed_input() {
        let first = map_fields(SMITH).expect("entry holds every required field");
        let second = map_fields(SMITH).expect("entry holds every required field");

        assert_eq!(first, second);
    }
}
