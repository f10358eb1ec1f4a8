//! Conversion from iRail DTOs to domain types.
//!
//! Records that cannot be converted (unparseable station ids, out-of-range
//! timestamps) are logged and skipped rather than failing the whole
//! response: one bad departure should not blank a liveboard.

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::domain::{
    Composition, CompositionSegment, CompositionUnit, Connection, ConnectionArrival,
    ConnectionDeparture, ConnectionResult, Disturbance, LiveboardDeparture, LiveboardResult,
    Station, StationId, VehicleInfo, VehicleStop, Via, ViaStop,
};

use super::types::{
    CompositionResponse, ConnectionDto, ConnectionsResponse, DisturbanceDto,
    DisturbancesResponse, LiveboardDepartureDto, LiveboardResponse, StationDto,
    StationsResponse, StopDto, UnitDto, VehicleResponse, ViaDto, ViaStopDto,
};

/// Error during DTO to domain conversion.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConversionError {
    /// Failed to parse a station id
    #[error("invalid station id: {0:?}")]
    InvalidStationId(String),

    /// Timestamp outside the representable range
    #[error("invalid timestamp: {0}")]
    InvalidTime(i64),
}

fn timestamp(secs: i64) -> Result<DateTime<Utc>, ConversionError> {
    DateTime::from_timestamp(secs, 0).ok_or(ConversionError::InvalidTime(secs))
}

/// Convert a single station record.
pub fn convert_station(dto: &StationDto) -> Result<Station, ConversionError> {
    let id =
        StationId::parse(&dto.id).map_err(|_| ConversionError::InvalidStationId(dto.id.clone()))?;

    // Some records have no standard name; fall back to the localised one.
    let standard_name = if dto.standard_name.is_empty() {
        dto.name.clone()
    } else {
        dto.standard_name.clone()
    };

    Ok(Station {
        id,
        name: dto.name.clone(),
        standard_name,
        latitude: dto.location_y,
        longitude: dto.location_x,
    })
}

/// Convert the station list, skipping invalid records.
pub fn convert_stations(resp: &StationsResponse) -> Vec<Station> {
    resp.station
        .iter()
        .filter_map(|dto| match convert_station(dto) {
            Ok(station) => Some(station),
            Err(e) => {
                warn!(name = %dto.name, error = %e, "Skipping station");
                None
            }
        })
        .collect()
}

fn convert_via_stop(dto: &ViaStopDto) -> Result<ViaStop, ConversionError> {
    Ok(ViaStop {
        time: timestamp(dto.time)?,
        platform: dto.platform.clone(),
        delay: dto.delay,
        canceled: dto.canceled,
    })
}

fn convert_via(dto: &ViaDto) -> Result<Via, ConversionError> {
    Ok(Via {
        station: dto.station.clone(),
        arrival: convert_via_stop(&dto.arrival)?,
        departure: convert_via_stop(&dto.departure)?,
        time_between: dto.time_between,
        vehicle: dto.vehicle.clone(),
    })
}

/// Convert a single ride option.
pub fn convert_connection(dto: &ConnectionDto) -> Result<Connection, ConversionError> {
    let dep = &dto.departure;
    let arr = &dto.arrival;
    let info = dep.station_info.as_ref();

    let departure = ConnectionDeparture {
        station: dep.station.clone(),
        time: timestamp(dep.time)?,
        delay: dep.delay,
        platform: dep.platform.clone(),
        canceled: dep.canceled,
        left: dep.left,
        vehicle: dep.vehicle.clone(),
        direction: dep
            .direction
            .as_ref()
            .map(|d| d.name.clone())
            .unwrap_or_default(),
        latitude: info.and_then(|i| i.location_y),
        longitude: info.and_then(|i| i.location_x),
    };

    let arrival = ConnectionArrival {
        station: arr.station.clone(),
        time: timestamp(arr.time)?,
        delay: arr.delay,
        platform: arr.platform.clone(),
        canceled: arr.canceled,
    };

    let vias = match &dto.vias {
        Some(vias) => vias.via.iter().map(convert_via).collect::<Result<_, _>>()?,
        None => Vec::new(),
    };

    Ok(Connection {
        departure,
        arrival,
        vias,
        duration: dto.duration,
    })
}

/// Convert a connections response, skipping invalid ride options.
pub fn convert_connections(resp: &ConnectionsResponse) -> ConnectionResult {
    let connections = resp
        .connection
        .iter()
        .filter_map(|dto| match convert_connection(dto) {
            Ok(connection) => Some(connection),
            Err(e) => {
                warn!(vehicle = %dto.departure.vehicle, error = %e, "Skipping connection");
                None
            }
        })
        .collect();

    ConnectionResult { connections }
}

fn convert_departure(dto: &LiveboardDepartureDto) -> Result<LiveboardDeparture, ConversionError> {
    Ok(LiveboardDeparture {
        station: dto.station.clone(),
        time: timestamp(dto.time)?,
        delay: dto.delay,
        platform: dto.platform.clone(),
        vehicle: dto.vehicle.clone(),
        is_extra: dto.is_extra,
        canceled: dto.canceled,
        left: dto.left,
    })
}

/// Convert a liveboard response, skipping invalid departures.
pub fn convert_liveboard(resp: &LiveboardResponse) -> LiveboardResult {
    let departures = resp
        .departures
        .departure
        .iter()
        .filter_map(|dto| match convert_departure(dto) {
            Ok(departure) => Some(departure),
            Err(e) => {
                warn!(vehicle = %dto.vehicle, error = %e, "Skipping departure");
                None
            }
        })
        .collect();

    LiveboardResult {
        station: resp.station.clone(),
        departures,
    }
}

fn convert_disturbance(dto: &DisturbanceDto) -> Result<Disturbance, ConversionError> {
    Ok(Disturbance {
        id: dto.id.clone(),
        title: dto.title.clone(),
        description: dto.description.clone(),
        kind: dto.kind.clone(),
        timestamp: timestamp(dto.timestamp)?,
        link: dto.link.clone().filter(|l| !l.is_empty()),
    })
}

pub fn convert_disturbances(resp: &DisturbancesResponse) -> Vec<Disturbance> {
    resp.disturbance
        .iter()
        .filter_map(|dto| match convert_disturbance(dto) {
            Ok(d) => Some(d),
            Err(e) => {
                warn!(id = %dto.id, error = %e, "Skipping disturbance");
                None
            }
        })
        .collect()
}

fn convert_stop(dto: &StopDto) -> Result<VehicleStop, ConversionError> {
    Ok(VehicleStop {
        station: dto.station.clone(),
        platform: dto.platform.clone(),
        time: timestamp(dto.time)?,
        delay: dto.delay,
        canceled: dto.canceled,
    })
}

/// Convert a vehicle response.
///
/// `requested_id` is used when the response does not echo the vehicle id.
pub fn convert_vehicle(resp: &VehicleResponse, requested_id: &str) -> VehicleInfo {
    let vehicle_id = if resp.vehicle.is_empty() {
        requested_id.to_string()
    } else {
        resp.vehicle.clone()
    };

    let name = resp
        .vehicle_info
        .as_ref()
        .map(|info| {
            if info.short_name.is_empty() {
                info.name.clone()
            } else {
                info.short_name.clone()
            }
        })
        .filter(|n| !n.is_empty());

    let stops = resp
        .stops
        .stop
        .iter()
        .filter_map(|dto| match convert_stop(dto) {
            Ok(stop) => Some(stop),
            Err(e) => {
                warn!(station = %dto.station, error = %e, "Skipping vehicle stop");
                None
            }
        })
        .collect();

    VehicleInfo {
        vehicle_id,
        name,
        stops,
    }
}

fn convert_unit(dto: &UnitDto) -> CompositionUnit {
    CompositionUnit {
        material_type: dto.material_type.parent_type.clone(),
        has_toilet: dto.has_toilets,
        has_bike_section: dto.has_bike_section,
        has_prm_section: dto.has_prm_section,
    }
}

fn station_label(dto: &StationDto) -> String {
    if dto.name.is_empty() {
        dto.standard_name.clone()
    } else {
        dto.name.clone()
    }
}

pub fn convert_composition(resp: &CompositionResponse) -> Composition {
    let segments = resp
        .composition
        .segments
        .segment
        .iter()
        .map(|seg| CompositionSegment {
            origin: station_label(&seg.origin),
            destination: station_label(&seg.destination),
            units: seg.composition.units.unit.iter().map(convert_unit).collect(),
        })
        .collect();

    Composition { segments }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::irail::types::{DeparturesDto, StopsDto, VehicleInfoDto};

    fn departure_dto(time: i64) -> LiveboardDepartureDto {
        LiveboardDepartureDto {
            station: "Ostend".into(),
            time,
            delay: 0,
            platform: "3".into(),
            vehicle: "BE.NMBS.IC1832".into(),
            canceled: false,
            left: false,
            is_extra: false,
        }
    }

    #[test]
    fn station_coordinates_are_swapped_into_place() {
        let dto = StationDto {
            id: "BE.NMBS.008812005".into(),
            name: "Brussels-Central".into(),
            standard_name: "Brussel-Centraal".into(),
            location_x: Some(4.356801),
            location_y: Some(50.845658),
        };

        let station = convert_station(&dto).unwrap();
        assert_eq!(station.latitude, Some(50.845658));
        assert_eq!(station.longitude, Some(4.356801));
        assert_eq!(station.standard_name, "Brussel-Centraal");
    }

    #[test]
    fn missing_standard_name_falls_back_to_name() {
        let dto = StationDto {
            id: "BE.NMBS.008812005".into(),
            name: "Brussels-Central".into(),
            ..Default::default()
        };
        assert_eq!(convert_station(&dto).unwrap().standard_name, "Brussels-Central");
    }

    #[test]
    fn invalid_stations_are_skipped() {
        let resp = StationsResponse {
            station: vec![
                StationDto {
                    id: "BE.NMBS.008812005".into(),
                    name: "Brussels-Central".into(),
                    ..Default::default()
                },
                StationDto {
                    id: String::new(),
                    name: "Nowhere".into(),
                    ..Default::default()
                },
            ],
        };

        let stations = convert_stations(&resp);
        assert_eq!(stations.len(), 1);
        assert_eq!(stations[0].name, "Brussels-Central");
    }

    #[test]
    fn liveboard_skips_out_of_range_times() {
        let resp = LiveboardResponse {
            station: "Brussels-Central".into(),
            departures: DeparturesDto {
                departure: vec![departure_dto(1_700_000_000), departure_dto(i64::MAX)],
            },
        };

        let board = convert_liveboard(&resp);
        assert_eq!(board.departures.len(), 1);
        assert_eq!(board.departures[0].time.timestamp(), 1_700_000_000);
    }

    #[test]
    fn vehicle_prefers_short_name_and_echoes_requested_id() {
        let resp = VehicleResponse {
            vehicle: String::new(),
            vehicle_info: Some(VehicleInfoDto {
                name: "BE.NMBS.IC1832".into(),
                short_name: "IC 1832".into(),
            }),
            stops: StopsDto {
                stop: vec![StopDto {
                    station: "Brussels-Central".into(),
                    time: 1_700_000_000,
                    platform: "3".into(),
                    delay: 60,
                    canceled: false,
                }],
            },
        };

        let vehicle = convert_vehicle(&resp, "IC1832");
        assert_eq!(vehicle.vehicle_id, "IC1832");
        assert_eq!(vehicle.name.as_deref(), Some("IC 1832"));
        assert_eq!(vehicle.stops[0].delay, 60);
    }
}
