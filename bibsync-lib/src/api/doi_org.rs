use crate::{Error, ErrorKind};

use super::Client;

const RESOLVER_PREFIX: &str = "http://dx.doi.org/";
const BIBTEX_ACCEPT: &str = "application/x-bibtex";

/// Resolves a `doi` to its raw `BibTeX` metadata.
///
/// A bare DOI is turned into a resolver URL by prepending the standard
/// `dx.doi.org` prefix, a full URL is used as-is.
pub(crate) fn get_bibtex<C: Client>(doi: &str) -> Result<String, Error> {
    let url = if doi.starts_with("http") {
        doi.to_owned()
    } else {
        format!("{RESOLVER_PREFIX}{doi}")
    };

    let client = C::default();
    let text = client
        .get_text(&url, BIBTEX_ACCEPT)
        .map_err(|e| Error::wrap(ErrorKind::Resolution, e))?;

    if text.is_empty() {
        Err(Error::new(
            ErrorKind::Resolution,
            format!("empty response when resolving '{doi}'"),
        ))
    } else {
        Ok(text)
    }
}
