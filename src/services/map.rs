//! Map data: emergency-zone CRUD with polygon nesting for the map view,
//! and the one-shot public-shelter import from the bundled GeoJSON dataset.

use rust_embed::RustEmbed;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::db::{NewShelter, Store, ZoneInput};
use crate::domain::ZoneId;
use crate::entities::{emergency_zones, shelters};
use crate::geo;

#[derive(RustEmbed)]
#[folder = "resources/"]
struct MapResources;

const SHELTER_DATASET: &str = "tilfluktsrom.geojson";

#[derive(Debug, Error)]
pub enum MapError {
    #[error("Zone not found: {0}")]
    ZoneNotFound(ZoneId),

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Import failed: {0}")]
    Import(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for MapError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// GeoJSON polygon: outer ring first, holes after, vertices as [lon, lat].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolygonGeometry {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: Vec<Vec<[f64; 2]>>,
}

impl PolygonGeometry {
    fn validate(&self) -> Result<(), MapError> {
        if self.kind != "Polygon" {
            return Err(MapError::InvalidGeometry(format!(
                "Expected Polygon geometry, got {}",
                self.kind
            )));
        }

        let Some(outer) = self.coordinates.first() else {
            return Err(MapError::InvalidGeometry("Polygon has no rings".to_string()));
        };

        if outer.len() < 4 {
            return Err(MapError::InvalidGeometry(
                "Polygon ring needs at least four vertices".to_string(),
            ));
        }

        Ok(())
    }

    fn outer_ring(&self) -> &[[f64; 2]] {
        self.coordinates.first().map_or(&[], Vec::as_slice)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ZoneDto {
    pub id: ZoneId,
    pub name: String,
    pub zone_type: String,
    pub severity_level: i32,
    pub description: Option<String>,
    pub geometry: PolygonGeometry,
    pub updated_at: String,
}

/// A zone with the zones it spatially contains nested beneath it.
#[derive(Debug, Clone, Serialize)]
pub struct ZoneNode {
    #[serde(flatten)]
    pub zone: ZoneDto,
    pub children: Vec<ZoneNode>,
}

#[derive(Debug, Clone)]
pub struct ZoneWrite {
    pub name: String,
    pub zone_type: String,
    pub severity_level: i32,
    pub description: Option<String>,
    pub geometry: PolygonGeometry,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShelterDto {
    pub id: i32,
    pub room_nr: Option<i64>,
    pub address: String,
    pub municipality: Option<String>,
    pub capacity: i32,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<shelters::Model> for ShelterDto {
    fn from(model: shelters::Model) -> Self {
        Self {
            id: model.id,
            room_nr: model.room_nr,
            address: model.address,
            municipality: model.municipality,
            capacity: model.capacity,
            latitude: model.latitude,
            longitude: model.longitude,
        }
    }
}

// ============================================================================
// Polygon math
// ============================================================================

/// Ray-casting point-in-ring test.
#[must_use]
pub fn point_in_ring(point: [f64; 2], ring: &[[f64; 2]]) -> bool {
    let mut inside = false;
    let n = ring.len();

    let mut j = n.wrapping_sub(1);
    for i in 0..n {
        let [xi, yi] = ring[i];
        let [xj, yj] = ring[j];

        let crosses = (yi > point[1]) != (yj > point[1])
            && point[0] < (xj - xi) * (point[1] - yi) / (yj - yi) + xi;
        if crosses {
            inside = !inside;
        }
        j = i;
    }

    inside
}

/// Shoelace area (absolute value); used only to pick the tightest parent.
#[must_use]
pub fn ring_area(ring: &[[f64; 2]]) -> f64 {
    let n = ring.len();
    if n < 3 {
        return 0.0;
    }

    let mut sum = 0.0;
    for i in 0..n {
        let [x1, y1] = ring[i];
        let [x2, y2] = ring[(i + 1) % n];
        sum += x1 * y2 - x2 * y1;
    }
    (sum / 2.0).abs()
}

/// Nests zones by polygon containment: a zone becomes a child of the
/// smallest zone whose outer ring contains its first vertex.
#[must_use]
pub fn nest_zones(zones: Vec<ZoneDto>) -> Vec<ZoneNode> {
    let n = zones.len();
    let mut parent: Vec<Option<usize>> = vec![None; n];

    for i in 0..n {
        let Some(&probe) = zones[i].geometry.outer_ring().first() else {
            continue;
        };
        let own_area = ring_area(zones[i].geometry.outer_ring());

        let mut best: Option<(usize, f64)> = None;
        for (j, candidate) in zones.iter().enumerate() {
            if i == j {
                continue;
            }

            let ring = candidate.geometry.outer_ring();
            if !point_in_ring(probe, ring) {
                continue;
            }

            let area = ring_area(ring);
            if area <= own_area {
                continue;
            }

            if best.is_none_or(|(_, best_area)| area < best_area) {
                best = Some((j, area));
            }
        }

        parent[i] = best.map(|(j, _)| j);
    }

    fn build(index: usize, zones: &[ZoneDto], parent: &[Option<usize>]) -> ZoneNode {
        let children = parent
            .iter()
            .enumerate()
            .filter(|(_, p)| **p == Some(index))
            .map(|(child, _)| build(child, zones, parent))
            .collect();

        ZoneNode {
            zone: zones[index].clone(),
            children,
        }
    }

    (0..n)
        .filter(|i| parent[*i].is_none())
        .map(|i| build(i, &zones, &parent))
        .collect()
}

// ============================================================================
// Shelter dataset parsing
// ============================================================================

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    properties: ShelterProperties,
    geometry: PointGeometry,
}

#[derive(Debug, Default, Deserialize)]
struct ShelterProperties {
    romnr: Option<i64>,
    adresse: Option<String>,
    plasser: Option<i64>,
    kommune: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PointGeometry {
    #[serde(rename = "type")]
    kind: String,
    coordinates: Vec<f64>,
}

/// Parses the DSB shelter dataset: point features with EPSG:25833
/// easting/northing coordinates.
pub fn parse_shelter_geojson(raw: &str) -> Result<Vec<NewShelter>, MapError> {
    let collection: FeatureCollection =
        serde_json::from_str(raw).map_err(|e| MapError::Import(e.to_string()))?;

    let mut rows = Vec::with_capacity(collection.features.len());
    for feature in collection.features {
        if feature.geometry.kind != "Point" || feature.geometry.coordinates.len() < 2 {
            continue;
        }

        let easting = feature.geometry.coordinates[0];
        let northing = feature.geometry.coordinates[1];
        let (latitude, longitude) = geo::utm_to_wgs84(geo::NORWAY_ZONE, easting, northing);

        #[allow(clippy::cast_possible_truncation)]
        rows.push(NewShelter {
            room_nr: feature.properties.romnr,
            address: feature.properties.adresse.unwrap_or_default(),
            municipality: feature.properties.kommune,
            capacity: feature.properties.plasser.unwrap_or(0) as i32,
            latitude,
            longitude,
        });
    }

    Ok(rows)
}

// ============================================================================
// Service
// ============================================================================

pub struct MapService {
    store: Store,
}

impl MapService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    fn to_zone_dto(model: emergency_zones::Model) -> Result<ZoneDto, MapError> {
        let geometry: PolygonGeometry = serde_json::from_str(&model.geometry)
            .map_err(|e| MapError::InvalidGeometry(e.to_string()))?;

        Ok(ZoneDto {
            id: model.id,
            name: model.name,
            zone_type: model.zone_type,
            severity_level: model.severity_level,
            description: model.description,
            geometry,
            updated_at: model.updated_at,
        })
    }

    fn to_zone_input(write: &ZoneWrite) -> Result<ZoneInput, MapError> {
        write.geometry.validate()?;

        if write.name.trim().is_empty() {
            return Err(MapError::InvalidGeometry("Zone name cannot be empty".to_string()));
        }

        let geometry = serde_json::to_string(&write.geometry)
            .map_err(|e| MapError::InvalidGeometry(e.to_string()))?;

        Ok(ZoneInput {
            name: write.name.trim().to_string(),
            zone_type: write.zone_type.clone(),
            severity_level: write.severity_level,
            description: write.description.clone(),
            geometry,
        })
    }

    pub async fn create_zone(&self, write: &ZoneWrite) -> Result<ZoneDto, MapError> {
        let input = Self::to_zone_input(write)?;
        let row = self.store.create_zone(&input).await?;
        Self::to_zone_dto(row)
    }

    pub async fn get_zone(&self, id: ZoneId) -> Result<ZoneDto, MapError> {
        let row = self
            .store
            .get_zone(id)
            .await?
            .ok_or(MapError::ZoneNotFound(id))?;
        Self::to_zone_dto(row)
    }

    pub async fn list_zones(&self) -> Result<Vec<ZoneDto>, MapError> {
        let rows = self.store.list_zones().await?;
        rows.into_iter().map(Self::to_zone_dto).collect()
    }

    pub async fn update_zone(&self, id: ZoneId, write: &ZoneWrite) -> Result<ZoneDto, MapError> {
        let input = Self::to_zone_input(write)?;
        let row = self
            .store
            .update_zone(id, &input)
            .await?
            .ok_or(MapError::ZoneNotFound(id))?;
        Self::to_zone_dto(row)
    }

    pub async fn delete_zone(&self, id: ZoneId) -> Result<(), MapError> {
        let removed = self.store.remove_zone(id).await?;
        if !removed {
            return Err(MapError::ZoneNotFound(id));
        }
        Ok(())
    }

    /// Zones grouped for the map view, children nested under the zone that
    /// spatially contains them.
    pub async fn zones_nested(&self) -> Result<Vec<ZoneNode>, MapError> {
        let zones = self.list_zones().await?;
        Ok(nest_zones(zones))
    }

    /// Reads the bundled shelter dataset once and replaces the stored rows.
    pub async fn import_shelters(&self) -> Result<usize, MapError> {
        let file = MapResources::get(SHELTER_DATASET)
            .ok_or_else(|| MapError::Import(format!("Missing resource {SHELTER_DATASET}")))?;

        let raw = std::str::from_utf8(file.data.as_ref())
            .map_err(|e| MapError::Import(e.to_string()))?;

        let rows = parse_shelter_geojson(raw)?;
        let count = self.store.replace_shelters(&rows).await?;
        info!("Shelter import complete: {} rows", count);
        Ok(count)
    }

    pub async fn list_shelters(&self) -> Result<Vec<ShelterDto>, MapError> {
        let rows = self.store.list_shelters().await?;
        Ok(rows.into_iter().map(ShelterDto::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(id: ZoneId, min: f64, max: f64) -> ZoneDto {
        ZoneDto {
            id,
            name: format!("zone-{id}"),
            zone_type: "flom".to_string(),
            severity_level: 2,
            description: None,
            geometry: PolygonGeometry {
                kind: "Polygon".to_string(),
                coordinates: vec![vec![
                    [min, min],
                    [max, min],
                    [max, max],
                    [min, max],
                    [min, min],
                ]],
            },
            updated_at: String::new(),
        }
    }

    #[test]
    fn test_point_in_ring() {
        let ring = square(1, 0.0, 10.0).geometry.coordinates[0].clone();
        assert!(point_in_ring([5.0, 5.0], &ring));
        assert!(!point_in_ring([15.0, 5.0], &ring));
        assert!(!point_in_ring([-1.0, -1.0], &ring));
    }

    #[test]
    fn test_ring_area() {
        let ring = square(1, 0.0, 10.0).geometry.coordinates[0].clone();
        assert!((ring_area(&ring) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_nesting_picks_tightest_parent() {
        // outer (0..100) > middle (10..50) > inner (20..30)
        let zones = vec![
            square(1, 0.0, 100.0),
            square(2, 10.0, 50.0),
            square(3, 20.0, 30.0),
            square(4, 200.0, 250.0),
        ];

        let roots = nest_zones(zones);
        assert_eq!(roots.len(), 2);

        let outer = roots.iter().find(|n| n.zone.id == 1).unwrap();
        assert_eq!(outer.children.len(), 1);
        assert_eq!(outer.children[0].zone.id, 2);
        assert_eq!(outer.children[0].children[0].zone.id, 3);

        let lone = roots.iter().find(|n| n.zone.id == 4).unwrap();
        assert!(lone.children.is_empty());
    }

    #[test]
    fn test_parse_shelter_geojson() {
        let raw = r#"{
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": {"romnr": 101, "adresse": "Storgata 1", "plasser": 250, "kommune": "Oslo"},
                    "geometry": {"type": "Point", "coordinates": [262000.0, 6650000.0]}
                },
                {
                    "type": "Feature",
                    "properties": {},
                    "geometry": {"type": "LineString", "coordinates": [1.0, 2.0]}
                }
            ]
        }"#;

        let rows = parse_shelter_geojson(raw).unwrap();
        assert_eq!(rows.len(), 1);

        let shelter = &rows[0];
        assert_eq!(shelter.address, "Storgata 1");
        assert_eq!(shelter.capacity, 250);
        assert!((59.0..61.0).contains(&shelter.latitude));
        assert!((10.0..12.0).contains(&shelter.longitude));
    }

    #[test]
    fn test_bundled_dataset_parses() {
        let file = MapResources::get(SHELTER_DATASET).expect("dataset is bundled");
        let raw = std::str::from_utf8(file.data.as_ref()).unwrap();
        let rows = parse_shelter_geojson(raw).unwrap();
        assert!(!rows.is_empty());
    }

    #[test]
    fn test_geometry_validation() {
        let mut write = ZoneWrite {
            name: "Flomsone".to_string(),
            zone_type: "flom".to_string(),
            severity_level: 2,
            description: None,
            geometry: PolygonGeometry {
                kind: "Point".to_string(),
                coordinates: vec![],
            },
        };
        assert!(MapService::to_zone_input(&write).is_err());

        write.geometry = square(1, 0.0, 1.0).geometry;
        assert!(MapService::to_zone_input(&write).is_ok());
    }
}
