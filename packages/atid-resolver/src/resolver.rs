//! Resolution coordinator.
//!
//! Chooses between the local catalog and the remote service for each query.
//! Backend trouble is logged and turns into empty results or a remote
//! fallback; only a forced local lookup without a local catalog is an error.

use std::sync::Arc;

use atid_core::error::ConnectionError;
use atid_core::{AstronomicalTarget, CatalogConnection, DriverRegistry, Settings, SkyCoord};
use atid_remote::RemoteCatalog;

use crate::config::{ResolverConfig, DEFAULT_SLOT};
use crate::error::ResolverError;
use crate::local::LocalCatalog;

/// Per-call source override for name lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ForceMode {
    /// Local catalog unless it is disabled or unreachable
    #[default]
    None,
    /// Local catalog only
    ForceLocal,
    /// Remote service only
    ForceRemote,
}

/// Public facade over both sources.
#[derive(Debug)]
pub struct TargetResolver {
    config: ResolverConfig,
    local: Option<LocalCatalog>,
    remote: RemoteCatalog,
}

impl TargetResolver {
    /// Builds a resolver for the `ATID` slot and connects its local catalog.
    pub fn open(
        settings: Arc<Settings>,
        registry: Arc<DriverRegistry>,
    ) -> Result<Self, ResolverError> {
        Self::open_slot(settings, registry, DEFAULT_SLOT)
    }

    /// Builds a resolver for any catalog slot.
    ///
    /// A local catalog that fails to connect is kept in its `Disabled` or
    /// `Failed` state; queries then go to the remote service.
    pub fn open_slot(
        settings: Arc<Settings>,
        registry: Arc<DriverRegistry>,
        slot: &str,
    ) -> Result<Self, ResolverError> {
        let config = ResolverConfig::from_settings(&settings, slot)?;
        let remote = RemoteCatalog::new(config.remote.clone());
        let local = if config.local_enabled {
            let mut connection = CatalogConnection::new(slot, registry, settings);
            connection.connect_configured();
            Some(LocalCatalog::new(connection))
        } else {
            tracing::info!("Catalog {}: local catalog disabled by configuration", slot);
            None
        };
        Ok(Self::with_parts(config, local, remote))
    }

    /// Assembles a resolver from existing parts.
    pub fn with_parts(
        config: ResolverConfig,
        local: Option<LocalCatalog>,
        remote: RemoteCatalog,
    ) -> Self {
        Self {
            config,
            local,
            remote,
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn local(&self) -> Option<&LocalCatalog> {
        self.local.as_ref()
    }

    /// True when unforced queries would be answered locally.
    pub fn local_available(&self) -> bool {
        self.config.local_enabled && self.local.as_ref().is_some_and(LocalCatalog::is_open)
    }

    /// Targets within `radius` degrees of `center`.
    pub fn query_cone(&mut self, center: SkyCoord, radius: f64) -> Vec<AstronomicalTarget> {
        if !self.config.prefer_remote {
            if let Some(targets) = self.from_local("cone search", |l| l.find_in_cone(center, radius))
            {
                return targets;
            }
        }
        self.remote.query_cone(center, radius).unwrap_or_default()
    }

    /// Targets inside the box spanned by two opposite corners.
    pub fn query_box(
        &mut self,
        top_left: SkyCoord,
        bottom_right: SkyCoord,
    ) -> Vec<AstronomicalTarget> {
        if !self.config.prefer_remote {
            if let Some(targets) =
                self.from_local("box search", |l| l.find_in_box(top_left, bottom_right))
            {
                return targets;
            }
        }
        self.remote
            .query_box(top_left, bottom_right)
            .unwrap_or_default()
    }

    /// Looks up a target by name.
    ///
    /// `Ok(None)` means not found, including when the chosen backend failed.
    pub fn query_by_name(
        &mut self,
        name: &str,
        mode: ForceMode,
    ) -> Result<Option<AstronomicalTarget>, ResolverError> {
        match mode {
            ForceMode::ForceRemote => Ok(self.remote_by_name(name)),
            ForceMode::ForceLocal => {
                let slot = &self.config.slot;
                let local = self.local.as_mut().ok_or_else(|| {
                    ResolverError::LocalCatalogUnavailable { slot: slot.clone() }
                })?;
                Ok(local.find_by_name(name).unwrap_or_else(|e| {
                    tracing::warn!("Catalog {}: name lookup failed: {}", slot, e);
                    None
                }))
            }
            ForceMode::None => match self.from_local("name lookup", |l| l.find_by_name(name)) {
                Some(found) => Ok(found),
                None => Ok(self.remote_by_name(name)),
            },
        }
    }

    fn remote_by_name(&self, name: &str) -> Option<AstronomicalTarget> {
        self.remote.query_by_name(name).unwrap_or_default()
    }

    /// Runs `query` locally when the local catalog is usable.
    ///
    /// `None` tells the caller to use the remote service instead.
    fn from_local<T>(
        &mut self,
        what: &str,
        query: impl FnOnce(&mut LocalCatalog) -> Result<T, ConnectionError>,
    ) -> Option<T> {
        let slot = &self.config.slot;
        if !self.config.local_enabled {
            tracing::debug!("Catalog {}: {} sent to remote service", slot, what);
            return None;
        }
        match self.local.as_mut() {
            Some(local) if local.is_open() => match query(local) {
                Ok(result) => Some(result),
                Err(e) => {
                    tracing::warn!(
                        "Catalog {}: {} failed: {}; falling back to remote service",
                        slot,
                        what,
                        e
                    );
                    None
                }
            },
            Some(local) => {
                tracing::warn!(
                    "Catalog {}: local catalog {}; falling back to remote service for {}",
                    slot,
                    local.status(),
                    what
                );
                None
            }
            None => {
                tracing::info!(
                    "Catalog {}: no local catalog; {} sent to remote service",
                    slot,
                    what
                );
                None
            }
        }
    }
}
