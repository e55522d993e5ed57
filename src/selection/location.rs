//! Location and history abstractions.
//!
//! The browser's `location`/`history` objects are collaborators; the codec
//! only needs to read the current location and replace it without adding a
//! history entry.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub pathname: String,
    /// Query string including the leading `?`, or empty.
    pub search: String,
    /// Fragment including the leading `#`, or empty.
    pub hash: String,
}

impl Location {
    /// Split `pathname?search#hash`.
    pub fn parse(href: &str) -> Self {
        let (rest, hash) = match href.find('#') {
            Some(i) => (&href[..i], &href[i..]),
            None => (href, ""),
        };
        let (pathname, search) = match rest.find('?') {
            Some(i) => (&rest[..i], &rest[i..]),
            None => (rest, ""),
        };
        Self {
            pathname: pathname.to_string(),
            search: search.to_string(),
            hash: hash.to_string(),
        }
    }

    pub fn href(&self) -> String {
        format!("{}{}{}", self.pathname, self.search, self.hash)
    }
}

/// The history capability: read the location, replace it in place.
pub trait History {
    fn location(&self) -> Location;
    fn replace_state(&mut self, location: Location);
}

/// In-memory history for hosts without a browser and for tests.
#[derive(Clone, Debug, Default)]
pub struct MemoryHistory {
    current: Location,
    replacements: usize,
}

impl MemoryHistory {
    pub fn new(href: &str) -> Self {
        Self {
            current: Location::parse(href),
            replacements: 0,
        }
    }

    /// Number of `replace_state` calls so far.
    pub fn replacements(&self) -> usize {
        self.replacements
    }

    pub fn href(&self) -> String {
        self.current.href()
    }
}

impl History for MemoryHistory {
    fn location(&self) -> Location {
        self.current.clone()
    }

    fn replace_state(&mut self, location: Location) {
        self.current = location;
        self.replacements += 1;
    }
}
