use serde::{Deserialize, Serialize};

/// A device position fix
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy_meters: Option<f64>,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy_meters: None,
        }
    }

    pub fn with_accuracy(mut self, meters: f64) -> Self {
        self.accuracy_meters = Some(meters);
        self
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Lat: {:.6}, Lng: {:.6}", self.latitude, self.longitude)?;
        if let Some(accuracy) = self.accuracy_meters {
            write!(f, " (±{:.0}m)", accuracy)?;
        }
        Ok(())
    }
}

/// Location half of a report draft
///
/// The address is free text. It is pre-filled by reverse geocoding but the
/// user may type one without ever fetching coordinates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationAttachment {
    pub coordinates: Option<Coordinates>,
    pub address: String,
}

impl LocationAttachment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the address verbatim
    pub fn edit_address(&mut self, text: impl Into<String>) {
        self.address = text.into();
    }

    pub fn clear(&mut self) {
        self.coordinates = None;
        self.address.clear();
    }

    /// Apply a resolved lookup. A fix without an address keeps the current one.
    pub fn apply_fix(&mut self, fix: LocationFix) {
        self.coordinates = Some(fix.coordinates);
        if let Some(address) = fix.address {
            self.address = address;
        }
    }

    pub fn has_address(&self) -> bool {
        !self.address.trim().is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.coordinates.is_none() && self.address.is_empty()
    }
}

/// Result of a successful position lookup
#[derive(Debug, Clone, PartialEq)]
pub struct LocationFix {
    pub coordinates: Coordinates,
    /// Formatted first reverse-geocoding result, if there was one
    pub address: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_address_round_trip() {
        let mut location = LocationAttachment::new();
        location.edit_address("  12 Main St ");
        assert_eq!(location.address, "  12 Main St ");
        assert!(location.has_address());

        location.edit_address("   ");
        assert!(!location.has_address());
    }

    #[test]
    fn test_manual_address_without_coordinates() {
        let mut location = LocationAttachment::new();
        location.edit_address("Corner of Loop and Bree");
        assert!(location.coordinates.is_none());
        assert!(location.has_address());
    }

    #[test]
    fn test_fix_without_address_keeps_typed_one() {
        let mut location = LocationAttachment::new();
        location.edit_address("Typed by hand");
        location.apply_fix(LocationFix {
            coordinates: Coordinates::new(1.0, 2.0),
            address: None,
        });
        assert_eq!(location.coordinates, Some(Coordinates::new(1.0, 2.0)));
        assert_eq!(location.address, "Typed by hand");
    }

    #[test]
    fn test_clear() {
        let mut location = LocationAttachment::new();
        location.apply_fix(LocationFix {
            coordinates: Coordinates::new(1.0, 2.0),
            address: Some("Somewhere".to_string()),
        });
        location.clear();
        assert!(location.is_empty());
    }

    #[test]
    fn test_coordinates_display() {
        let coords = Coordinates::new(-33.9248701, 18.4240553).with_accuracy(12.4);
        assert_eq!(coords.to_string(), "Lat: -33.924870, Lng: 18.424055 (±12m)");
    }
}
