use crate::batch::Batch;

/// Body accepted by every sort endpoint.
///
/// A missing or `null` `to_sort` is an empty batch. Unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SortRequest {
    #[serde(default)]
    pub to_sort: Option<Batch>,
}

impl SortRequest {
    pub fn new(batch: Batch) -> Self {
        SortRequest {
            to_sort: Some(batch),
        }
    }

    pub fn into_batch(self) -> Batch {
        self.to_sort.unwrap_or_default()
    }
}

/// A sort task that faulted instead of producing its sequence.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TaskFailure {
    /// Position of the sequence in the submitted batch.
    pub index: usize,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SortResponse {
    pub sorted_arrays: Batch,
    /// Wall-clock time of the sort phase only.
    pub time_ns: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_tasks: Vec<TaskFailure>,
}
