//! Current-location lookup
//!
//! Permission prompt, position fix, then reverse geocoding. Only one lookup
//! runs at a time, and every lookup carries a ticket so a result that resolves
//! after the draft was cleared or dismissed can be recognised and dropped.

use super::attachment::LocationFix;
use crate::providers::{Capability, GeolocationProvider};
use crate::utils::InFlight;
use crate::{EcoReportError, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Identifies the generation a lookup was started in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupTicket(u64);

#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    Resolved { fix: LocationFix, ticket: LookupTicket },
    /// Another lookup was already running; nothing was requested
    AlreadyInFlight,
}

pub struct LocationLookup {
    provider: Arc<dyn GeolocationProvider>,
    in_flight: InFlight,
    generation: AtomicU64,
}

impl LocationLookup {
    pub fn new(provider: Arc<dyn GeolocationProvider>) -> Self {
        Self {
            provider,
            in_flight: InFlight::new(),
            generation: AtomicU64::new(0),
        }
    }

    pub async fn lookup(&self) -> Result<LookupOutcome> {
        let Some(_guard) = self.in_flight.try_begin() else {
            debug!("Location lookup already in flight, ignoring request");
            return Ok(LookupOutcome::AlreadyInFlight);
        };
        let ticket = LookupTicket(self.generation.load(Ordering::SeqCst));

        if !self.provider.request_permission().await.is_granted() {
            return Err(EcoReportError::PermissionDenied(Capability::Location));
        }

        let coordinates = self.provider.current_position().await?;
        debug!("Position fix: {}", coordinates);

        // A failed geocode fails the whole lookup; the fix is not applied
        let results = self
            .provider
            .reverse_geocode(coordinates)
            .await
            .inspect_err(|e| warn!("Reverse geocoding failed: {}", e))?;
        let address = results
            .first()
            .map(|components| components.formatted())
            .filter(|address| !address.is_empty());

        Ok(LookupOutcome::Resolved {
            fix: LocationFix {
                coordinates,
                address,
            },
            ticket,
        })
    }

    /// Whether a result from this ticket may still be applied
    pub fn is_current(&self, ticket: LookupTicket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.0
    }

    /// Make every outstanding ticket stale
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_active()
    }
}
