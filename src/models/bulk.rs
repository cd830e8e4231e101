use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::MarketDataError;

use super::InstrumentData;

/// Failure category for one symbol inside a bulk request.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkErrorKind {
    Validation,
    Provider,
    Internal,
}

/// Per-symbol failure record in a bulk result.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BulkError {
    pub kind: BulkErrorKind,
    pub message: String,
}

impl From<&MarketDataError> for BulkError {
    fn from(error: &MarketDataError) -> Self {
        let kind = match error {
            MarketDataError::Validation(_) => BulkErrorKind::Validation,
            MarketDataError::Provider { .. } => BulkErrorKind::Provider,
            MarketDataError::RateLimited { .. } | MarketDataError::Internal(_) => {
                BulkErrorKind::Internal
            }
        };
        Self {
            kind,
            message: error.to_string(),
        }
    }
}

/// Outcome of a bulk fetch. Every unique requested symbol lands in exactly
/// one of the two partitions.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BulkResult {
    pub request_id: Uuid,
    pub data: HashMap<String, InstrumentData>,
    pub errors: HashMap<String, BulkError>,
    pub success_count: usize,
    pub failure_count: usize,
    pub elapsed_ms: u64,
}

impl BulkResult {
    pub fn new(
        data: HashMap<String, InstrumentData>,
        errors: HashMap<String, BulkError>,
        elapsed_ms: u64,
    ) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            success_count: data.len(),
            failure_count: errors.len(),
            data,
            errors,
            elapsed_ms,
        }
    }
}
