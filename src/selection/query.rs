//! Order-preserving query string handling.
//!
//! Parameters are kept as their raw `key=value` text so that rewriting the
//! URL leaves every parameter it doesn't manage byte-for-byte unchanged.

use url::form_urlencoded;

#[derive(Clone, Debug, PartialEq, Eq)]
struct QueryParam {
    raw: String,
    key: String,
    value: String,
}

impl QueryParam {
    fn parse(raw: &str) -> Self {
        let (key, value) = form_urlencoded::parse(raw.as_bytes())
            .next()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .unwrap_or_default();
        Self {
            raw: raw.to_string(),
            key,
            value,
        }
    }

    // Values are written unencoded, matching the app's URL convention. Only
    // characters that would change meaning in a query are escaped.
    fn unencoded(key: &str, value: &str) -> Self {
        let escaped = value
            .replace('&', "%26")
            .replace('#', "%23")
            .replace('+', "%2B");
        Self {
            raw: format!("{}={}", key, escaped),
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryParams {
    params: Vec<QueryParam>,
}

impl QueryParams {
    /// Parse a search string, with or without the leading `?`.
    pub fn parse(search: &str) -> Self {
        let search = search.strip_prefix('?').unwrap_or(search);
        Self {
            params: search
                .split('&')
                .filter(|part| !part.is_empty())
                .map(QueryParam::parse)
                .collect(),
        }
    }

    /// Decoded value of the first parameter named `key`.
    pub fn first(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|p| p.key == key)
            .map(|p| p.value.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.params.iter().any(|p| p.key == key)
    }

    pub fn remove(&mut self, key: &str) {
        self.params.retain(|p| p.key != key);
    }

    /// Set `key`, keeping the position of an existing parameter and dropping
    /// any later duplicates.
    pub fn set(&mut self, key: &str, value: &str) {
        match self.params.iter().position(|p| p.key == key) {
            Some(index) => {
                self.params[index] = QueryParam::unencoded(key, value);
                let mut seen = 0usize;
                self.params.retain(|p| {
                    if p.key != key {
                        return true;
                    }
                    seen += 1;
                    seen == 1
                });
            }
            None => self.params.push(QueryParam::unencoded(key, value)),
        }
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// `?a=b&c=d`, or an empty string when there are no parameters.
    pub fn to_search(&self) -> String {
        if self.params.is_empty() {
            return String::new();
        }
        let joined: Vec<&str> = self.params.iter().map(|p| p.raw.as_str()).collect();
        format!("?{}", joined.join("&"))
    }
}
