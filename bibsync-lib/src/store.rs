//! Client for the remote paged-database service holding the references.

use std::{thread, time::Duration};

use log::warn;
use reqwest::Method;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};

use crate::{api::Client, schema::MappedProperties, Error, ErrorKind};

const NOTION_API: &str = "https://api.notion.com/v1";
const NOTION_VERSION: &str = "2022-06-28";

const MAX_ATTEMPTS: u32 = 3;
const RETRY_DELAY: Duration = Duration::from_millis(250);

/// A reference database hosted by the remote store.
pub(crate) struct Database<C> {
    client: C,
    token: String,
    database_id: String,
}

/// A record returned from a placeholder query.
#[derive(Debug, Deserialize)]
pub(crate) struct RemoteRecord {
    pub(crate) id: String,
    properties: RecordProperties,
}

impl RemoteRecord {
    pub(crate) fn url(&self) -> Option<&str> {
        self.properties.url.url.as_deref()
    }
}

#[derive(Debug, Deserialize)]
struct RecordProperties {
    #[serde(rename = "URL")]
    url: UrlProperty,
}

#[derive(Debug, Deserialize)]
struct UrlProperty {
    url: Option<String>,
}

#[derive(Deserialize)]
struct QueryResult {
    results: Vec<RemoteRecord>,
}

#[derive(Deserialize)]
struct Page {
    id: String,
}

impl<C: Client> Database<C> {
    pub(crate) fn new(token: impl Into<String>, database_id: impl Into<String>) -> Self {
        Self {
            client: C::default(),
            token: token.into(),
            database_id: database_id.into(),
        }
    }

    /// Queries for placeholder records, ones with an empty title and a non-empty URL.
    pub(crate) fn query_placeholders(&self) -> Result<Vec<RemoteRecord>, Error> {
        let url = format!("{NOTION_API}/databases/{}/query", self.database_id);
        let body = json!({
            "filter": {
                "and": [
                    { "property": "Name", "title": { "is_empty": true } },
                    { "property": "URL", "url": { "is_not_empty": true } },
                ]
            }
        });

        let result: QueryResult = self.send(Method::POST, &url, &body)?;
        Ok(result.results)
    }

    /// Creates a new record in the database, returning its id.
    pub(crate) fn create(&self, properties: &MappedProperties) -> Result<String, Error> {
        let url = format!("{NOTION_API}/pages");
        let body = json!({
            "parent": { "type": "database_id", "database_id": self.database_id },
            "properties": properties,
        });

        let page: Page = self.send(Method::POST, &url, &body)?;
        Ok(page.id)
    }

    /// Updates an existing record in place.
    pub(crate) fn update(
        &self,
        record_id: &str,
        properties: &MappedProperties,
    ) -> Result<(), Error> {
        let url = format!("{NOTION_API}/pages/{record_id}");
        let body = json!({ "properties": properties });

        let _: Page = self.send(Method::PATCH, &url, &body)?;
        Ok(())
    }

    /// Sends an authenticated call, retrying transient transport failures with
    /// a bounded linear backoff.
    fn send<T: DeserializeOwned>(&self, method: Method, url: &str, body: &Value) -> Result<T, Error> {
        let bearer = format!("Bearer {}", self.token);
        let headers = [
            ("Authorization", bearer.as_str()),
            ("Notion-Version", NOTION_VERSION),
        ];

        let mut attempt = 1;
        loop {
            match self.client.send_json(method.clone(), url, &headers, body) {
                Ok(value) => return Ok(value),
                Err(err) if err.kind() == ErrorKind::Io && attempt < MAX_ATTEMPTS => {
                    warn!("remote store call failed (attempt {attempt}/{MAX_ATTEMPTS}): {err}");
                    thread::sleep(RETRY_DELAY * attempt);
                    attempt += 1;
                }
                Err(err) => return Err(Error::wrap(ErrorKind::RemoteStore, err)),
            }
        }
    }
}
