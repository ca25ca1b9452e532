//! Remote catalog queries.

use atid_core::{AstronomicalTarget, CoordinateWindow, ConeRegion, SkyCoord};

use crate::config::RemoteConfig;
use crate::error::RemoteError;
use crate::reply::parse_reply;
use crate::script::Script;
use crate::transport::{HttpTransport, Transport};

/// Client for the remote name-resolution service.
pub struct RemoteCatalog {
    transport: Box<dyn Transport>,
}

impl RemoteCatalog {
    /// Creates a client using HTTP with the configured endpoint and timeout.
    pub fn new(config: RemoteConfig) -> Self {
        Self::with_transport(HttpTransport::new(config.endpoint, config.timeout))
    }

    /// Creates a client over an arbitrary transport.
    pub fn with_transport(transport: impl Transport + 'static) -> Self {
        Self {
            transport: Box::new(transport),
        }
    }

    /// Resolves an identifier. Returns the first matching record.
    pub fn query_by_name(&self, name: &str) -> Result<Option<AstronomicalTarget>, RemoteError> {
        if name.trim().is_empty() {
            return Ok(None);
        }
        let targets = self.run(&Script::by_name(name))?;
        Ok(targets.into_iter().next())
    }

    /// Stars within `radius` degrees of `center`.
    pub fn query_cone(
        &self,
        center: SkyCoord,
        radius: f64,
    ) -> Result<Vec<AstronomicalTarget>, RemoteError> {
        self.run(&Script::in_cone(ConeRegion::new(center, radius)))
    }

    /// Stars inside the box spanned by two opposite corners.
    ///
    /// Corners may come in either order; the request carries the normalized
    /// window's center and extent.
    pub fn query_box(
        &self,
        top_left: SkyCoord,
        bottom_right: SkyCoord,
    ) -> Result<Vec<AstronomicalTarget>, RemoteError> {
        let window = CoordinateWindow::from_corners(top_left, bottom_right);
        self.run(&Script::in_box(window.to_region()))
    }

    fn run(&self, script: &Script) -> Result<Vec<AstronomicalTarget>, RemoteError> {
        let result = self
            .transport
            .fetch(&script.to_string())
            .and_then(|body| parse_reply(&body).map_err(RemoteError::from));

        match &result {
            Ok(targets) => tracing::debug!(
                "Remote catalog: {} record(s) for '{}'",
                targets.len(),
                script.query().clause()
            ),
            Err(RemoteError::Timeout(timeout)) => tracing::info!(
                "Remote catalog: no reply within {:?}, request abandoned",
                timeout
            ),
            Err(e) => tracing::warn!("Remote catalog: {}", e),
        }
        result
    }
}

impl std::fmt::Debug for RemoteCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteCatalog").finish_non_exhaustive()
    }
}
