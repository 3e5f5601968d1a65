use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub(crate) mod doi_org;

pub trait Client
where
    Self: Default,
{
    fn get_text(&self, url: &str, accept: &str) -> Result<String, Error>;
    fn send_json<T>(
        &self,
        method: Method,
        url: &str,
        headers: &[(&str, &str)],
        body: &Value,
    ) -> Result<T, Error>
    where
        T: DeserializeOwned;
}

impl Client for reqwest::blocking::Client {
    fn get_text(&self, url: &str, accept: &str) -> Result<String, Error> {
        self.get(url)
            .header(reqwest::header::ACCEPT, accept)
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .map_err(|e| Error::wrap(ErrorKind::Io, e))
            .and_then(|r| r.text().map_err(|e| Error::wrap(ErrorKind::Deserialize, e)))
    }

    fn send_json<T>(
        &self,
        method: Method,
        url: &str,
        headers: &[(&str, &str)],
        body: &Value,
    ) -> Result<T, Error>
    where
        T: DeserializeOwned,
    {
        let mut request = self.request(method, url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        request
            .json(body)
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .map_err(|e| Error::wrap(ErrorKind::Io, e))
            .and_then(|r| r.json().map_err(|e| Error::wrap(ErrorKind::Deserialize, e)))
    }
}

#[cfg(test)]
pub(crate) use test::{
    assert_url, impl_text_producer, last_url, take_requests, MockClient, NetworkErrorProducer,
    Producer, Request,
};

use crate::{Error, ErrorKind};
