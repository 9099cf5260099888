use std::collections::BTreeMap;
use std::fmt;

use crate::Resource;

/// Identity of a filtered, paginated view.
///
/// Filters live in a `BTreeMap` so two keys built from the same values in a
/// different order compare and hash equal. Empty values are dropped, which
/// makes a cleared search box the same view as no search at all.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey {
    resource: Resource,
    limit: u32,
    filters: BTreeMap<String, String>,
}

impl QueryKey {
    pub fn new(resource: Resource, limit: u32) -> Self {
        Self {
            resource,
            limit,
            filters: BTreeMap::new(),
        }
    }

    pub fn with_filter(mut self, name: impl Into<String>, value: impl AsRef<str>) -> Self {
        self.set_filter(name, value);
        self
    }

    pub(crate) fn set_filter(&mut self, name: impl Into<String>, value: impl AsRef<str>) {
        let name = name.into();
        let value = value.as_ref().trim();
        if value.is_empty() {
            self.filters.remove(&name);
        } else {
            self.filters.insert(name, value.to_string());
        }
    }

    pub(crate) fn set_limit(&mut self, limit: u32) {
        self.limit = limit;
    }

    pub fn resource(&self) -> Resource {
        self.resource
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn filters(&self) -> &BTreeMap<String, String> {
        &self.filters
    }

    pub fn filter(&self, name: &str) -> Option<&str> {
        self.filters.get(name).map(String::as_str)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[limit={}", self.resource, self.limit)?;
        for (name, value) in &self.filters {
            write!(f, " {name}={value}")?;
        }
        f.write_str("]")
    }
}
