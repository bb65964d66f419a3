use anyhow::{Context, Result};
use fragments_sdk::Binding;
use fragments_sdk::testing::MemorySource;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Canned result rows, replayed by a [`MemorySource`].
///
/// ```yaml
/// default_rows:
///   - "?id": "<http://example.org/e1>"
///     "?name": '"Alice"'
/// queries:
///   "SELECT * WHERE { ... }":
///     - "?id": "<http://example.org/e2>"
/// ```
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default)]
pub struct Fixtures {
    /// Rows for any query not listed in `queries`
    pub default_rows: Vec<Binding>,
    /// Rows per exact query string
    pub queries: BTreeMap<String, Vec<Binding>>,
}

impl Fixtures {
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read fixtures file: {}", path.display()))?;

        let fixtures: Fixtures = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse fixtures file: {}", path.display()))?;

        debug!(
            path = %path.display(),
            default_rows = fixtures.default_rows.len(),
            queries = fixtures.queries.len(),
            "loaded fixtures"
        );
        Ok(fixtures)
    }

    pub fn into_source(self, buffer: usize) -> MemorySource {
        let mut source = MemorySource::new()
            .with_buffer(buffer)
            .with_default_rows(self.default_rows);
        for (query, rows) in self.queries {
            source = source.on_query(query, rows);
        }
        source
    }
}
