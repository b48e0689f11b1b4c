use std::str::FromStr;

use serde::Deserialize;

/// How a job with multiple predecessors becomes ready.
///
/// - `All`: every predecessor must have succeeded (default). A failed
///   predecessor permanently blocks the job.
/// - `Any`: one successful predecessor is enough. The job is only blocked
///   once no predecessor can succeed any more.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FanInPolicy {
    All,
    Any,
}

impl Default for FanInPolicy {
    fn default() -> Self {
        FanInPolicy::All
    }
}

impl FromStr for FanInPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(FanInPolicy::All),
            "any" => Ok(FanInPolicy::Any),
            other => Err(format!(
                "invalid fan-in policy: {other} (expected \"all\" or \"any\")"
            )),
        }
    }
}
