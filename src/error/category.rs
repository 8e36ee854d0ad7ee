//! Coarse error classification.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Broad error category, used by callers to decide how to react to a failed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorCategory {
    /// Tool schemas could not be generated; nothing was sent to the backend.
    Schema,
    /// A tool produced a value that cannot be reported back as text.
    ResultCoercion,
    /// A tool callable failed.
    ToolExecution,
    /// Transport, protocol or status failure at the backend boundary.
    Backend,
    Authentication,
    RateLimit,
    Configuration,
    Serialization,
}
