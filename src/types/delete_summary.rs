use serde::Serialize;

/// Outcome of a bulk deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteSummary {
    pub deleted_count: u64,
}

impl DeleteSummary {
    pub fn new(deleted_count: u64) -> Self {
        Self { deleted_count }
    }

    pub fn is_empty(&self) -> bool {
        self.deleted_count == 0
    }
}

impl From<u64> for DeleteSummary {
    fn from(value: u64) -> Self {
        Self::new(value)
    }
}
