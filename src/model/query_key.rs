use std::fmt;

/// Structured cache identifier: `[logical name, tenant id]`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey {
    name: String,
    tenant_id: String,
}

impl QueryKey {
    pub fn new(
        name: impl Into<String>,
        tenant_id: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            tenant_id: tenant_id.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    /// Key segments in the order the query cache expects them
    pub fn parts(&self) -> [&str; 2] {
        [&self.name, &self.tenant_id]
    }
}

impl fmt::Display for QueryKey {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "[{},{}]", self.name, self.tenant_id)
    }
}
