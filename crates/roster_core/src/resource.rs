use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A paginated collection exposed by the console API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Resource {
    Students,
    Bills,
    Centers,
}

impl Resource {
    pub const ALL: [Resource; 3] = [Resource::Students, Resource::Bills, Resource::Centers];

    /// Name used in URLs and in the `data.<name>` field of list responses.
    pub fn name(self) -> &'static str {
        match self {
            Resource::Students => "students",
            Resource::Bills => "bills",
            Resource::Centers => "centers",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Resource::Students => "Students",
            Resource::Bills => "Bills",
            Resource::Centers => "Centers",
        }
    }

    /// Record fields shown as table columns, in display order.
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Resource::Students => &["registrationNo", "name", "course", "year", "status"],
            Resource::Bills => &["billNo", "studentName", "amount", "status", "createdAt"],
            Resource::Centers => &["centerCode", "name", "city", "status"],
        }
    }

    /// Filter names the server accepts for this resource.
    pub fn filters(self) -> &'static [&'static str] {
        match self {
            Resource::Students => &["search", "status", "course", "year"],
            Resource::Bills => &["search", "status", "year"],
            Resource::Centers => &["search", "status"],
        }
    }

    pub fn statuses(self) -> &'static [&'static str] {
        match self {
            Resource::Students => &["pending", "approved", "rejected", "completed"],
            Resource::Bills => &["paid", "unpaid", "cancelled"],
            Resource::Centers => &["active", "inactive", "suspended"],
        }
    }

    pub fn empty_message(self) -> String {
        format!("No {} found.", self.name())
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Resource {
    type Err = crate::ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Resource::ALL
            .into_iter()
            .find(|resource| resource.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| crate::ValidationError::UnknownResource(wanted.to_string()))
    }
}

/// One row of a resource list, flattened to display strings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Record {
    pub id: String,
    pub fields: BTreeMap<String, String>,
}

impl Record {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}
