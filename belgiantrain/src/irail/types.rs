//! iRail API response DTOs.
//!
//! These types map directly to the iRail JSON responses. iRail serialises
//! almost every scalar as a string and omits fields freely, so every field
//! that can be missing carries a serde default here. Nothing past the
//! conversion layer has to care about which fields were present.

use serde::Deserialize;

/// Lenient scalar decoding for iRail's stringly-typed payloads.
pub(crate) mod de {
    use serde::{Deserialize, Deserializer, de::Error};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Str(String),
        Int(i64),
        Float(f64),
        Bool(bool),
    }

    /// An integer sent as a number or a numeric string. Empty strings are 0.
    pub fn int<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
        match Scalar::deserialize(d)? {
            Scalar::Int(n) => Ok(n),
            Scalar::Float(f) => Ok(f as i64),
            Scalar::Bool(b) => Ok(i64::from(b)),
            Scalar::Str(s) => {
                let s = s.trim();
                if s.is_empty() {
                    return Ok(0);
                }
                s.parse::<i64>()
                    .or_else(|_| s.parse::<f64>().map(|f| f as i64))
                    .map_err(|_| D::Error::custom(format!("expected integer, got {s:?}")))
            }
        }
    }

    /// A boolean sent as `"0"`/`"1"`, `0`/`1` or a JSON boolean.
    pub fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        match Scalar::deserialize(d)? {
            Scalar::Bool(b) => Ok(b),
            Scalar::Int(n) => Ok(n != 0),
            Scalar::Float(f) => Ok(f != 0.0),
            Scalar::Str(s) => match s.trim() {
                "" | "0" | "false" => Ok(false),
                "1" | "true" => Ok(true),
                other => Err(D::Error::custom(format!("expected flag, got {other:?}"))),
            },
        }
    }

    /// An optional float; unparseable or empty strings become `None`.
    pub fn opt_float<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        Ok(match Option::<Scalar>::deserialize(d)? {
            Some(Scalar::Float(f)) => Some(f),
            Some(Scalar::Int(n)) => Some(n as f64),
            Some(Scalar::Str(s)) => s.trim().parse().ok(),
            Some(Scalar::Bool(_)) | None => None,
        })
    }
}

/// Response from `/stations/`.
#[derive(Debug, Clone, Deserialize)]
pub struct StationsResponse {
    #[serde(default)]
    pub station: Vec<StationDto>,
}

/// A station record. Also used for the nested `stationinfo` objects,
/// which is why every field has a default.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StationDto {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default, rename = "standardname")]
    pub standard_name: String,

    /// Longitude.
    #[serde(default, rename = "locationX", deserialize_with = "de::opt_float")]
    pub location_x: Option<f64>,

    /// Latitude.
    #[serde(default, rename = "locationY", deserialize_with = "de::opt_float")]
    pub location_y: Option<f64>,
}

/// Response from `/liveboard/`.
#[derive(Debug, Clone, Deserialize)]
pub struct LiveboardResponse {
    #[serde(default)]
    pub station: String,

    #[serde(default)]
    pub departures: DeparturesDto,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeparturesDto {
    #[serde(default)]
    pub departure: Vec<LiveboardDepartureDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LiveboardDepartureDto {
    /// Destination station name.
    #[serde(default)]
    pub station: String,

    /// Scheduled departure, Unix seconds.
    #[serde(deserialize_with = "de::int")]
    pub time: i64,

    #[serde(default, deserialize_with = "de::int")]
    pub delay: i64,

    #[serde(default)]
    pub platform: String,

    #[serde(default)]
    pub vehicle: String,

    #[serde(default, deserialize_with = "de::flag")]
    pub canceled: bool,

    #[serde(default, deserialize_with = "de::flag")]
    pub left: bool,

    #[serde(default, rename = "isExtra", deserialize_with = "de::flag")]
    pub is_extra: bool,
}

/// Response from `/connections/`.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionsResponse {
    #[serde(default)]
    pub connection: Vec<ConnectionDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionDto {
    pub departure: ConnectionDepartureDto,

    pub arrival: ConnectionArrivalDto,

    /// Absent for direct trains.
    #[serde(default)]
    pub vias: Option<ViasDto>,

    /// Scheduled duration in seconds.
    #[serde(default, deserialize_with = "de::int")]
    pub duration: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionDepartureDto {
    #[serde(default)]
    pub station: String,

    #[serde(default, rename = "stationinfo")]
    pub station_info: Option<StationDto>,

    #[serde(deserialize_with = "de::int")]
    pub time: i64,

    #[serde(default, deserialize_with = "de::int")]
    pub delay: i64,

    #[serde(default)]
    pub platform: String,

    #[serde(default)]
    pub vehicle: String,

    #[serde(default, deserialize_with = "de::flag")]
    pub canceled: bool,

    #[serde(default, deserialize_with = "de::flag")]
    pub left: bool,

    #[serde(default)]
    pub direction: Option<DirectionDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionArrivalDto {
    #[serde(default)]
    pub station: String,

    #[serde(deserialize_with = "de::int")]
    pub time: i64,

    #[serde(default, deserialize_with = "de::int")]
    pub delay: i64,

    #[serde(default)]
    pub platform: String,

    #[serde(default, deserialize_with = "de::flag")]
    pub canceled: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DirectionDto {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ViasDto {
    #[serde(default)]
    pub via: Vec<ViaDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ViaDto {
    #[serde(default)]
    pub station: String,

    pub arrival: ViaStopDto,

    pub departure: ViaStopDto,

    /// Transfer time in seconds.
    #[serde(default, rename = "timebetween", deserialize_with = "de::int")]
    pub time_between: i64,

    #[serde(default)]
    pub vehicle: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ViaStopDto {
    #[serde(deserialize_with = "de::int")]
    pub time: i64,

    #[serde(default)]
    pub platform: String,

    #[serde(default, deserialize_with = "de::int")]
    pub delay: i64,

    #[serde(default, deserialize_with = "de::flag")]
    pub canceled: bool,
}

/// Response from `/disturbances/`.
#[derive(Debug, Clone, Deserialize)]
pub struct DisturbancesResponse {
    #[serde(default)]
    pub disturbance: Vec<DisturbanceDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DisturbanceDto {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default, rename = "type")]
    pub kind: String,

    #[serde(default, deserialize_with = "de::int")]
    pub timestamp: i64,

    #[serde(default)]
    pub link: Option<String>,
}

/// Response from `/vehicle/`.
#[derive(Debug, Clone, Deserialize)]
pub struct VehicleResponse {
    #[serde(default)]
    pub vehicle: String,

    #[serde(default, rename = "vehicleinfo")]
    pub vehicle_info: Option<VehicleInfoDto>,

    #[serde(default)]
    pub stops: StopsDto,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VehicleInfoDto {
    #[serde(default)]
    pub name: String,

    #[serde(default, rename = "shortname")]
    pub short_name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StopsDto {
    #[serde(default)]
    pub stop: Vec<StopDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StopDto {
    #[serde(default)]
    pub station: String,

    #[serde(deserialize_with = "de::int")]
    pub time: i64,

    #[serde(default)]
    pub platform: String,

    #[serde(default, deserialize_with = "de::int")]
    pub delay: i64,

    #[serde(default, deserialize_with = "de::flag")]
    pub canceled: bool,
}

/// Response from `/composition/`.
#[derive(Debug, Clone, Deserialize)]
pub struct CompositionResponse {
    #[serde(default)]
    pub composition: CompositionDto,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompositionDto {
    #[serde(default)]
    pub segments: SegmentsDto,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SegmentsDto {
    #[serde(default)]
    pub segment: Vec<SegmentDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SegmentDto {
    #[serde(default)]
    pub origin: StationDto,

    #[serde(default)]
    pub destination: StationDto,

    #[serde(default)]
    pub composition: SegmentCompositionDto,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SegmentCompositionDto {
    #[serde(default)]
    pub units: UnitsDto,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UnitsDto {
    #[serde(default)]
    pub unit: Vec<UnitDto>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitDto {
    #[serde(default)]
    pub material_type: MaterialTypeDto,

    #[serde(default, deserialize_with = "de::flag")]
    pub has_toilets: bool,

    #[serde(default, deserialize_with = "de::flag")]
    pub has_bike_section: bool,

    #[serde(default, deserialize_with = "de::flag")]
    pub has_prm_section: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MaterialTypeDto {
    #[serde(default)]
    pub parent_type: String,
}
