use std::collections::BTreeMap;

use reqwest::Method;

/// Query parameter value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QueryValue {
    Single(String),
    /// Sent as repeated `key=value` pairs.
    List(Vec<String>),
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        Self::Single(value.to_owned())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        Self::Single(value)
    }
}

impl From<u32> for QueryValue {
    fn from(value: u32) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<Vec<String>> for QueryValue {
    fn from(values: Vec<String>) -> Self {
        Self::List(values)
    }
}

impl<const N: usize> From<[&str; N]> for QueryValue {
    fn from(values: [&str; N]) -> Self {
        Self::List(values.iter().map(|value| (*value).to_owned()).collect())
    }
}

/// A single logical HTTP request.
///
/// Built once through [`RequestBuilder`] and never mutated afterwards, so the
/// same value can be replayed on every retry attempt.
#[derive(Clone, Debug, PartialEq)]
pub struct Request {
    method: Method,
    url: String,
    headers: BTreeMap<String, String>,
    query: BTreeMap<String, QueryValue>,
    body: Option<serde_json::Value>,
}

impl Request {
    pub fn builder(method: Method, url: impl Into<String>) -> RequestBuilder {
        RequestBuilder {
            inner: Request {
                method,
                url: url.into(),
                headers: BTreeMap::new(),
                query: BTreeMap::new(),
                body: None,
            },
        }
    }

    pub fn get(url: impl Into<String>) -> RequestBuilder {
        Self::builder(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> RequestBuilder {
        Self::builder(Method::POST, url)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Absolute URL or a path relative to the caller's base URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn query(&self) -> &BTreeMap<String, QueryValue> {
        &self.query
    }

    pub fn body(&self) -> Option<&serde_json::Value> {
        self.body.as_ref()
    }

    /// Flattens query parameters into ordered `(key, value)` pairs.
    pub fn query_pairs(&self) -> Vec<(&str, &str)> {
        let mut pairs = Vec::with_capacity(self.query.len());
        for (key, value) in &self.query {
            match value {
                QueryValue::Single(value) => pairs.push((key.as_str(), value.as_str())),
                QueryValue::List(values) => {
                    pairs.extend(values.iter().map(|value| (key.as_str(), value.as_str())));
                }
            }
        }
        pairs
    }

    /// Resolves the request URL against `base_url`.
    ///
    /// Absolute `http://` and `https://` URLs are returned untouched.
    pub fn resolve_url(&self, base_url: &str) -> String {
        let url = self.url.trim();
        if has_http_scheme(url) {
            return url.to_owned();
        }
        format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            url.trim_start_matches('/')
        )
    }
}

fn has_http_scheme(url: &str) -> bool {
    ["http://", "https://"].iter().any(|scheme| {
        url.get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}

/// Consuming builder for [`Request`].
#[derive(Clone, Debug)]
pub struct RequestBuilder {
    inner: Request,
}

impl RequestBuilder {
    /// Sets a header, replacing any earlier value for the same name.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.inner.headers.insert(name.into(), value.into());
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.inner.query.insert(key.into(), value.into());
        self
    }

    /// Sets the query parameter only when `value` is `Some`.
    pub fn query_opt<V: Into<QueryValue>>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.inner.body = Some(body);
        self
    }

    pub fn build(self) -> Request {
        self.inner
    }
}

impl From<RequestBuilder> for Request {
    fn from(builder: RequestBuilder) -> Self {
        builder.build()
    }
}
