use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// How long a position request may take before it counts as timed out.
pub const LOCATE_TIMEOUT: Duration = Duration::from_secs(10);

/// A geographic position. Passed through to the model as-is; no range checks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// One-shot position request options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub enable_high_accuracy: bool,
    pub timeout: Duration,
    /// Oldest acceptable cached position. Zero means always ask afresh.
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            enable_high_accuracy: true,
            timeout: LOCATE_TIMEOUT,
            maximum_age: Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LocateError {
    #[error("location permission denied")]
    PermissionDenied,
    #[error("position unavailable")]
    PositionUnavailable,
    #[error("location request timed out")]
    Timeout,
}

/// Source of the user's current position.
pub trait LocationProvider: Send + Sync {
    fn current_position(
        &self,
        options: &PositionOptions,
    ) -> impl Future<Output = Result<Coordinates, LocateError>> + Send;
}

/// Resolve a position, enforcing `options.timeout` regardless of the provider.
pub async fn locate<P: LocationProvider>(
    provider: &P,
    options: &PositionOptions,
) -> Result<Coordinates, LocateError> {
    debug!(
        high_accuracy = options.enable_high_accuracy,
        max_age_ms = options.maximum_age.as_millis() as u64,
        timeout_ms = options.timeout.as_millis() as u64,
        "requesting position"
    );
    match tokio::time::timeout(options.timeout, provider.current_position(options)).await {
        Ok(result) => {
            debug!(ok = result.is_ok(), "position resolved");
            result
        }
        Err(_) => Err(LocateError::Timeout),
    }
}

/// Coordinates the user shared with a single command invocation.
///
/// Nothing is remembered between invocations, so a cached position is never
/// reused. Sharing neither coordinate is treated as withholding permission.
#[derive(Debug, Clone, Copy, Default)]
pub struct SharedPosition {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl LocationProvider for SharedPosition {
    async fn current_position(
        &self,
        _options: &PositionOptions,
    ) -> Result<Coordinates, LocateError> {
        match (self.latitude, self.longitude) {
            (None, None) => Err(LocateError::PermissionDenied),
            (Some(latitude), Some(longitude)) if latitude.is_finite() && longitude.is_finite() => {
                Ok(Coordinates {
                    latitude,
                    longitude,
                })
            }
            _ => Err(LocateError::PositionUnavailable),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SlowProvider(Duration);

    impl LocationProvider for SlowProvider {
        async fn current_position(
            &self,
            _options: &PositionOptions,
        ) -> Result<Coordinates, LocateError> {
            tokio::time::sleep(self.0).await;
            Ok(Coordinates {
                latitude: 1.0,
                longitude: 2.0,
            })
        }
    }

    #[test]
    fn test_default_options() {
        let options = PositionOptions::default();
        assert!(options.enable_high_accuracy);
        assert_eq!(options.timeout, Duration::from_secs(10));
        assert_eq!(options.maximum_age, Duration::ZERO);
    }

    #[tokio::test]
    async fn test_shared_position_passes_values_through() {
        let provider = SharedPosition {
            latitude: Some(123.0),
            longitude: Some(-500.0),
        };
        let coords = locate(&provider, &PositionOptions::default()).await.unwrap();
        assert_eq!(coords.latitude, 123.0);
        assert_eq!(coords.longitude, -500.0);
    }

    #[tokio::test]
    async fn test_shared_position_failure_classes() {
        let options = PositionOptions::default();
        assert_eq!(
            locate(&SharedPosition::default(), &options).await,
            Err(LocateError::PermissionDenied)
        );
        let half = SharedPosition {
            latitude: Some(10.0),
            longitude: None,
        };
        assert_eq!(
            locate(&half, &options).await,
            Err(LocateError::PositionUnavailable)
        );
        let nan = SharedPosition {
            latitude: Some(f64::NAN),
            longitude: Some(0.0),
        };
        assert_eq!(
            locate(&nan, &options).await,
            Err(LocateError::PositionUnavailable)
        );
    }

    #[tokio::test]
    async fn test_slow_provider_times_out() {
        let options = PositionOptions {
            timeout: Duration::from_millis(20),
            ..Default::default()
        };
        let result = locate(&SlowProvider(Duration::from_millis(500)), &options).await;
        assert_eq!(result, Err(LocateError::Timeout));

        let result = locate(&SlowProvider(Duration::from_millis(1)), &PositionOptions::default()).await;
        assert!(result.is_ok());
    }
}
