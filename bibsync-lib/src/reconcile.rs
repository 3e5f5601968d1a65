//! The two-phase synchronization run: fill placeholder records, then add new
//! references.

use std::fmt;

use log::{info, trace, warn};

use crate::{
    api::{doi_org, Client},
    map,
    schema::MappedProperties,
    store::Database,
    Error,
};

/// Outcome counts of a synchronization run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    /// Placeholder records that were filled in.
    pub filled: usize,
    /// New records that were created.
    pub added: usize,
    /// Items skipped because resolution or mapping failed.
    pub skipped: usize,
    /// Items that failed against the remote store after retries.
    pub failed: usize,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} filled, {} added, {} skipped, {} failed",
            self.filled, self.added, self.skipped, self.failed
        )
    }
}

/// Runs both phases in sequence and reports the outcome.
///
/// A failing item never aborts the run: resolution and mapping failures skip
/// the item, remote store failures are counted after their retries are
/// exhausted.
pub(crate) fn reconcile<C: Client>(db: &Database<C>, dois: &[String]) -> Summary {
    let mut summary = Summary::default();
    fill_placeholders(db, &mut summary);
    add_references(db, dois, &mut summary);
    summary
}

/// Resolves a DOI and maps the metadata into database properties.
pub(crate) fn fetch_properties<C: Client>(doi: &str) -> Result<MappedProperties, Error> {
    doi_org::get_bibtex::<C>(doi).and_then(|raw| map::map_fields(&raw))
}

fn fill_placeholders<C: Client>(db: &Database<C>, summary: &mut Summary) {
    info!("searching for placeholder references");
    let records = match db.query_placeholders() {
        Ok(records) => records,
        Err(err) => {
            warn!("placeholder query failed: {err}");
            summary.failed += 1;
            return;
        }
    };

    if records.is_empty() {
        info!("no placeholder references found");
        return;
    }

    let total = records.len();
    for (i, record) in records.iter().enumerate() {
        let doi = if let Some(doi) = record.url() {
            doi
        } else {
            warn!("placeholder {} has no URL value, skipping", record.id);
            summary.skipped += 1;
            continue;
        };

        info!("({}/{total}) filling placeholder reference: {doi}", i + 1);
        match fetch_properties::<C>(doi) {
            Ok(properties) => match db.update(&record.id, &properties) {
                Ok(()) => summary.filled += 1,
                Err(err) => {
                    warn!("failed to update reference {}: {err}", record.id);
                    summary.failed += 1;
                }
            },
            Err(err) => {
                warn!("skipping reference {}: {err}", record.id);
                summary.skipped += 1;
            }
        }
    }
}

fn add_references<C: Client>(db: &Database<C>, dois: &[String], summary: &mut Summary) {
    let total = dois.len();
    for (i, doi) in dois.iter().enumerate() {
        info!("({}/{total}) adding reference: {doi}", i + 1);
        match fetch_properties::<C>(doi) {
            Ok(properties) => match db.create(&properties) {
                Ok(id) => {
                    trace!("created reference {id} for '{doi}'");
                    summary.added += 1;
                }
                Err(err) => {
                    warn!("failed to create a reference for '{doi}': {err}");
                    summary.failed += 1;
                }
            },
            Err(err) => {
                warn!("skipping '{doi}': {err}");
                summary.skipped += 1;
            }
        }
    }
}
