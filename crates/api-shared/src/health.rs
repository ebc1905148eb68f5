use crate::wire::HealthRes;

/// Status string reported while the process is serving requests.
pub const HEALTHY_STATUS: &str = "OK";

/// Liveness check shared by the API surfaces.
///
/// Liveness only: the converter is not probed, so a missing or broken converter
/// still reports healthy.
#[derive(Clone, Default)]
pub struct HealthService;

impl HealthService {
    /// Returns the liveness payload.
    ///
    /// # Returns
    /// A `HealthRes` with status `"OK"`.
    pub fn check_health() -> HealthRes {
        HealthRes {
            status: HEALTHY_STATUS.into(),
        }
    }
}
