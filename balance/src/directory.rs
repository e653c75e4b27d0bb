use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// Identity of one logical service call, used as the routing key.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServiceDirectory {
    group: String,
    provider: String,
    version: String,
}

impl ServiceDirectory {
    pub fn new(
        group: impl Into<String>,
        provider: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            provider: provider.into(),
            version: version.into(),
        }
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// `group-provider-version`
    pub fn directory_string(&self) -> String {
        let mut key = String::with_capacity(self.group.len() + self.provider.len() + self.version.len() + 2);
        key.push_str(&self.group);
        key.push('-');
        key.push_str(&self.provider);
        key.push('-');
        key.push_str(&self.version);
        key
    }
}

impl Display for ServiceDirectory {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.group, self.provider, self.version)
    }
}

#[test]
fn directory_string() {
    let directory = ServiceDirectory::new("test", "UserService", "1.0.0");
    assert_eq!(directory.directory_string(), "test-UserService-1.0.0");
    assert_eq!(directory.to_string(), directory.directory_string());
}
