//! Request and response payloads for the service calls.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    Composition, CompositionSegment, CompositionUnit, Disturbance, Station, VehicleInfo,
    VehicleStop,
};

/// Request for current disturbances.
#[derive(Debug, Default, Deserialize)]
pub struct DisturbancesRequest {
    /// Replacement for line breaks in descriptions
    pub line_break_character: Option<String>,
}

/// Request for a vehicle's stops.
#[derive(Debug, Deserialize)]
pub struct VehicleRequest {
    /// Vehicle id, e.g. `BE.NMBS.IC1832`
    pub vehicle_id: String,

    /// Service date (defaults to today)
    pub date: Option<NaiveDate>,

    /// Include alerts
    #[serde(default)]
    pub alerts: bool,
}

/// Request for a train's composition.
#[derive(Debug, Deserialize)]
pub struct CompositionRequest {
    pub train_id: String,
}

/// Request for the station list.
#[derive(Debug, Default, Deserialize)]
pub struct StationsRequest {
    /// Case-insensitive substring of the station name
    pub name_filter: Option<String>,
}

/// A disturbance in a service response.
#[derive(Debug, Serialize)]
pub struct DisturbanceResult {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl DisturbanceResult {
    pub fn from_disturbance(d: &Disturbance) -> Self {
        Self {
            id: d.id.clone(),
            title: d.title.clone(),
            description: d.description.clone(),
            kind: d.kind.clone(),
            timestamp: d.timestamp,
            link: d.link.clone(),
        }
    }
}

/// Response to a disturbances request.
///
/// `error` is set, and the list empty, when iRail could not be reached.
#[derive(Debug, Serialize)]
pub struct DisturbancesResponse {
    pub disturbances: Vec<DisturbanceResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A stop in a vehicle response.
#[derive(Debug, Serialize)]
pub struct StopResult {
    pub station: String,
    pub platform: String,
    pub time: DateTime<Utc>,
    /// Delay in seconds
    pub delay: i64,
    pub canceled: bool,
}

impl StopResult {
    pub fn from_stop(stop: &VehicleStop) -> Self {
        Self {
            station: stop.station.clone(),
            platform: stop.platform.clone(),
            time: stop.time,
            delay: stop.delay,
            canceled: stop.canceled,
        }
    }
}

/// Response to a vehicle request.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum VehicleResponse {
    Found {
        vehicle_id: String,
        name: Option<String>,
        stops: Vec<StopResult>,
    },
    NotFound {
        vehicle_id: String,
        error: String,
    },
}

impl VehicleResponse {
    pub fn from_vehicle(vehicle: &VehicleInfo) -> Self {
        VehicleResponse::Found {
            vehicle_id: vehicle.vehicle_id.clone(),
            name: vehicle.name.clone(),
            stops: vehicle.stops.iter().map(StopResult::from_stop).collect(),
        }
    }
}

/// A rolling stock unit in a composition response.
#[derive(Debug, Serialize)]
pub struct UnitResult {
    pub material_type: String,
    pub has_toilet: bool,
    pub has_bike_section: bool,
    pub has_prm_section: bool,
}

impl UnitResult {
    fn from_unit(unit: &CompositionUnit) -> Self {
        Self {
            material_type: unit.material_type.clone(),
            has_toilet: unit.has_toilet,
            has_bike_section: unit.has_bike_section,
            has_prm_section: unit.has_prm_section,
        }
    }
}

/// A segment in a composition response.
#[derive(Debug, Serialize)]
pub struct SegmentResult {
    pub origin: String,
    pub destination: String,
    pub units: Vec<UnitResult>,
}

impl SegmentResult {
    fn from_segment(segment: &CompositionSegment) -> Self {
        Self {
            origin: segment.origin.clone(),
            destination: segment.destination.clone(),
            units: segment.units.iter().map(UnitResult::from_unit).collect(),
        }
    }
}

/// Response to a composition request.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum CompositionResponse {
    Found {
        train_id: String,
        segments: Vec<SegmentResult>,
    },
    NotFound {
        train_id: String,
        error: String,
    },
}

impl CompositionResponse {
    pub fn from_composition(train_id: &str, composition: &Composition) -> Self {
        CompositionResponse::Found {
            train_id: train_id.to_string(),
            segments: composition
                .segments
                .iter()
                .map(SegmentResult::from_segment)
                .collect(),
        }
    }
}

/// A station in a stations response.
#[derive(Debug, Serialize)]
pub struct StationResult {
    pub id: String,
    pub name: String,
    pub standard_name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl StationResult {
    pub fn from_station(station: &Station) -> Self {
        Self {
            id: station.id.to_string(),
            name: station.name.clone(),
            standard_name: station.standard_name.clone(),
            latitude: station.latitude,
            longitude: station.longitude,
        }
    }
}

/// Response to a stations request.
#[derive(Debug, Serialize)]
pub struct StationsResponse {
    pub stations: Vec<StationResult>,
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vehicle_request_defaults() {
        let req: VehicleRequest =
            serde_json::from_str(r#"{"vehicle_id": "BE.NMBS.IC1832"}"#).unwrap();
        assert_eq!(req.vehicle_id, "BE.NMBS.IC1832");
        assert!(req.date.is_none());
        assert!(!req.alerts);

        let req: VehicleRequest = serde_json::from_str(
            r#"{"vehicle_id": "BE.NMBS.IC1832", "date": "2024-12-11", "alerts": true}"#,
        )
        .unwrap();
        assert_eq!(req.date, NaiveDate::from_ymd_opt(2024, 12, 11));
        assert!(req.alerts);
    }

    #[test]
    fn not_found_responses_carry_only_id_and_error() {
        let resp = VehicleResponse::NotFound {
            vehicle_id: "BE.NMBS.INVALID".into(),
            error: "Vehicle not found or API error".into(),
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["vehicle_id"], "BE.NMBS.INVALID");
        assert!(json.get("stops").is_none());

        let resp = CompositionResponse::NotFound {
            train_id: "INVALID".into(),
            error: "Composition not found or API error".into(),
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["train_id"], "INVALID");
        assert!(json.get("segments").is_none());
    }

    #[test]
    fn disturbance_kind_serializes_as_type() {
        let d = Disturbance {
            id: "1".into(),
            title: "Delay on line Brussels-Ghent".into(),
            description: "Train delayed by 15 minutes".into(),
            kind: "disturbance".into(),
            timestamp: DateTime::from_timestamp(1_733_913_000, 0).unwrap(),
            link: None,
        };

        let json = serde_json::to_value(DisturbanceResult::from_disturbance(&d)).unwrap();
        assert_eq!(json["type"], "disturbance");
        assert!(json.get("kind").is_none());
        assert!(json.get("link").is_none());
    }
}
