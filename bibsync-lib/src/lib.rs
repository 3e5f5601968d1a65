#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::perf,
    clippy::style,
    clippy::missing_safety_doc,
    clippy::missing_const_for_fn
)]
#![warn(missing_docs, rust_2018_idioms)]
#![allow(clippy::module_name_repetitions)]
#![doc = include_str!("../README.md")]

mod api;
mod error;
mod map;
mod reconcile;
pub mod schema;
mod store;

pub use error::{Error, ErrorKind};
pub use map::map_fields;
pub use reconcile::Summary;

use log::trace;
use schema::MappedProperties;

type Client = reqwest::blocking::Client;

/// Synchronizes the reference database: fills in placeholder records that only
/// hold a URL, then creates a new record for each of the given `dois`.
///
/// Failing items never abort the run; the returned [`Summary`] reports how
/// many were filled, added, skipped, and failed.
#[must_use]
pub fn sync(token: &str, database_id: &str, dois: &[String]) -> Summary {
    trace!("Synchronizing with {} explicit DOI(s)", dois.len());
    let db = store::Database::<Client>::new(token, database_id);
    reconcile::reconcile(&db, dois)
}

/// Resolves a `doi` to its raw `BibTeX` metadata.
///
/// # Errors
///
/// An `Err` is returned when the resolver is unreachable or returns an empty
/// response.
#[inline]
pub fn bibtex_by_doi(doi: &str) -> Result<String, Error> {
    trace!("Resolve BibTeX metadata for '{doi}'");
    api::doi_org::get_bibtex::<Client>(doi)
}

/// Resolves a `doi` and maps its metadata into database properties.
///
/// # Errors
///
/// An `Err` is returned when the resolver is unreachable or when the response
/// cannot be mapped into the database schema.
#[inline]
pub fn properties_by_doi(doi: &str) -> Result<MappedProperties, Error> {
    trace!("Resolve database properties for '{doi}'");
    reconcile::fetch_properties::<Client>(doi)
}
