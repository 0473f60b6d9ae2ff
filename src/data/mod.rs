use anyhow::{Context, Result};
use geojson::{feature::Id, GeoJson, Value};
use glam::DVec2;
use std::fs;
use std::path::{Path, PathBuf};

use crate::globe::geometry::{Feature, FeatureGeometry, Ring};

/// Anything that can hand the globe an ordered feature list.
pub trait FeatureSource {
    fn load(&self) -> Result<Vec<Feature>>;
}

impl FeatureSource for Vec<Feature> {
    fn load(&self) -> Result<Vec<Feature>> {
        Ok(self.clone())
    }
}

/// Natural Earth resolution
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DetailLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl DetailLevel {
    pub fn scale(&self) -> &'static str {
        match self {
            DetailLevel::Low => "110m",
            DetailLevel::Medium => "50m",
            DetailLevel::High => "10m",
        }
    }

    /// `ne_110m_countries.json`, `ne_10m_land.json`, ...
    pub fn file_name(&self, countries: bool) -> String {
        let layer = if countries { "countries" } else { "land" };
        format!("ne_{}_{}.json", self.scale(), layer)
    }
}

/// A single GeoJSON file on disk
#[derive(Clone, Debug)]
pub struct GeoJsonFile {
    pub path: PathBuf,
}

impl GeoJsonFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl FeatureSource for GeoJsonFile {
    fn load(&self) -> Result<Vec<Feature>> {
        load_geojson(&self.path)
    }
}

/// Natural Earth dataset in a data directory, picked by detail level and
/// layer (country borders or land masses).
#[derive(Clone, Debug)]
pub struct DatasetSource {
    pub data_dir: PathBuf,
    pub detail: DetailLevel,
    pub countries: bool,
}

impl DatasetSource {
    pub fn new(data_dir: impl Into<PathBuf>, detail: DetailLevel, countries: bool) -> Self {
        Self {
            data_dir: data_dir.into(),
            detail,
            countries,
        }
    }

    pub fn path(&self) -> PathBuf {
        self.data_dir.join(self.detail.file_name(self.countries))
    }
}

impl FeatureSource for DatasetSource {
    fn load(&self) -> Result<Vec<Feature>> {
        load_geojson(&self.path())
    }
}

/// Read and parse a GeoJSON file into polygon features.
pub fn load_geojson(path: &Path) -> Result<Vec<Feature>> {
    let mut bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let geojson: GeoJson =
        simd_json::serde::from_slice(&mut bytes).with_context(|| format!("parsing {}", path.display()))?;
    Ok(features_from_geojson(geojson))
}

/// Polygon and MultiPolygon features in document order. Other geometry is
/// skipped.
pub fn features_from_geojson(geojson: GeoJson) -> Vec<Feature> {
    let features = match geojson {
        GeoJson::FeatureCollection(fc) => fc.features,
        GeoJson::Feature(f) => vec![f],
        GeoJson::Geometry(geometry) => vec![geojson::Feature {
            bbox: None,
            geometry: Some(geometry),
            id: None,
            properties: None,
            foreign_members: None,
        }],
    };

    let mut out = Vec::with_capacity(features.len());
    for (ordinal, feature) in features.into_iter().enumerate() {
        let id = feature_id(&feature, ordinal);
        let Some(geometry) = feature.geometry else {
            tracing::debug!(%id, "feature without geometry skipped");
            continue;
        };
        match geometry.value {
            Value::Polygon(rings) => out.push(Feature::new(id, FeatureGeometry::Polygon(convert_rings(&rings)))),
            Value::MultiPolygon(polygons) => {
                let polygons = polygons.iter().map(|rings| convert_rings(rings)).collect();
                out.push(Feature::new(id, FeatureGeometry::MultiPolygon(polygons)));
            }
            _ => tracing::debug!(%id, "non-polygon geometry skipped"),
        }
    }
    out
}

fn convert_rings(rings: &[Vec<Vec<f64>>]) -> Vec<Ring> {
    rings
        .iter()
        .map(|ring| {
            ring.iter()
                .filter(|c| c.len() >= 2)
                .map(|c| DVec2::new(c[0], c[1]))
                .collect()
        })
        .collect()
}

/// `ID` property, then the feature id, then `NAME`, then the ordinal.
fn feature_id(feature: &geojson::Feature, ordinal: usize) -> String {
    let property = |key: &str| {
        feature.property(key).and_then(|v| match v {
            geojson::JsonValue::String(s) => Some(s.clone()),
            geojson::JsonValue::Number(n) => Some(n.to_string()),
            _ => None,
        })
    };

    property("ID")
        .or_else(|| {
            feature.id.as_ref().map(|id| match id {
                Id::String(s) => s.clone(),
                Id::Number(n) => n.to_string(),
            })
        })
        .or_else(|| property("NAME"))
        .unwrap_or_else(|| ordinal.to_string())
}

/// Coarse continent outlines for when no data file is available
pub fn builtin_world() -> Vec<Feature> {
    let continent = |id: &str, coords: &[(f64, f64)]| {
        let mut ring: Ring = coords.iter().map(|&(lon, lat)| DVec2::new(lon, lat)).collect();
        if ring.first() != ring.last() {
            if let Some(&first) = ring.first() {
                ring.push(first);
            }
        }
        Feature::polygon(id, vec![ring])
    };

    vec![
        continent(
            "north-america",
            &[
                (-168.0, 65.0), (-166.0, 60.0), (-141.0, 60.0), (-130.0, 55.0),
                (-125.0, 48.0), (-124.0, 40.0), (-117.0, 32.0), (-110.0, 25.0),
                (-97.0, 25.0), (-97.0, 28.0), (-82.0, 24.0), (-80.0, 25.0),
                (-81.0, 31.0), (-75.0, 35.0), (-70.0, 41.0), (-67.0, 45.0),
                (-65.0, 47.0), (-55.0, 47.0), (-52.0, 47.0), (-55.0, 52.0),
                (-58.0, 55.0), (-64.0, 60.0), (-73.0, 62.0), (-80.0, 63.0),
                (-95.0, 62.0), (-110.0, 68.0), (-130.0, 70.0), (-145.0, 70.0),
            ],
        ),
        continent(
            "south-america",
            &[
                (-80.0, 10.0), (-75.0, 5.0), (-70.0, 5.0), (-60.0, 5.0),
                (-50.0, 0.0), (-35.0, -5.0), (-35.0, -10.0), (-38.0, -15.0),
                (-40.0, -22.0), (-48.0, -25.0), (-55.0, -34.0), (-58.0, -38.0),
                (-65.0, -42.0), (-68.0, -50.0), (-75.0, -52.0), (-75.0, -45.0),
                (-72.0, -40.0), (-72.0, -30.0), (-70.0, -20.0), (-70.0, -15.0),
                (-80.0, -5.0), (-80.0, 0.0),
            ],
        ),
        continent(
            "europe",
            &[
                (-10.0, 36.0), (-5.0, 36.0), (0.0, 38.0), (5.0, 43.0),
                (10.0, 44.0), (15.0, 45.0), (20.0, 40.0), (25.0, 37.0),
                (30.0, 40.0), (35.0, 42.0), (40.0, 43.0), (40.0, 55.0),
                (30.0, 60.0), (25.0, 65.0), (20.0, 70.0), (10.0, 71.0),
                (5.0, 62.0), (5.0, 58.0), (-5.0, 58.0), (-10.0, 52.0),
                (-5.0, 48.0), (-5.0, 43.0),
            ],
        ),
        continent(
            "africa",
            &[
                (-17.0, 15.0), (-17.0, 20.0), (-15.0, 28.0), (-5.0, 35.0),
                (10.0, 37.0), (20.0, 33.0), (25.0, 32.0), (35.0, 30.0),
                (35.0, 20.0), (42.0, 12.0), (50.0, 12.0), (45.0, 5.0),
                (40.0, -5.0), (40.0, -15.0), (35.0, -25.0), (30.0, -32.0),
                (20.0, -35.0), (18.0, -33.0), (12.0, -18.0), (13.0, -8.0),
                (9.0, 2.0), (5.0, 5.0), (-5.0, 5.0), (-10.0, 7.0),
            ],
        ),
        continent(
            "asia",
            &[
                (40.0, 43.0), (50.0, 40.0), (55.0, 37.0), (60.0, 25.0),
                (65.0, 25.0), (70.0, 20.0), (75.0, 15.0), (80.0, 8.0),
                (80.0, 15.0), (88.0, 22.0), (92.0, 22.0), (95.0, 16.0),
                (100.0, 14.0), (105.0, 10.0), (110.0, 20.0), (115.0, 22.0),
                (120.0, 22.0), (122.0, 25.0), (125.0, 30.0), (130.0, 35.0),
                (135.0, 35.0), (140.0, 40.0), (145.0, 45.0), (145.0, 50.0),
                (140.0, 55.0), (135.0, 55.0), (130.0, 52.0), (130.0, 43.0),
                (120.0, 40.0), (110.0, 45.0), (90.0, 50.0), (70.0, 55.0),
                (60.0, 55.0), (50.0, 50.0),
            ],
        ),
        continent(
            "australia",
            &[
                (115.0, -20.0), (120.0, -18.0), (130.0, -12.0), (140.0, -12.0),
                (145.0, -15.0), (150.0, -25.0), (153.0, -30.0), (150.0, -35.0),
                (145.0, -38.0), (140.0, -38.0), (135.0, -35.0), (130.0, -32.0),
                (125.0, -32.0), (115.0, -35.0), (115.0, -25.0),
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLLECTION: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": { "ID": "AAA", "NAME": "Alpha" },
                "geometry": { "type": "Polygon", "coordinates": [[[0,0],[10,0],[10,10],[0,10],[0,0]]] }
            },
            {
                "type": "Feature",
                "id": 7,
                "properties": { "NAME": "Beta" },
                "geometry": { "type": "MultiPolygon", "coordinates": [[[[20,0],[30,0],[30,10],[20,0]]]] }
            },
            {
                "type": "Feature",
                "properties": { "NAME": "Gamma" },
                "geometry": { "type": "LineString", "coordinates": [[0,0],[1,1]] }
            },
            {
                "type": "Feature",
                "properties": { "NAME": "Delta" },
                "geometry": { "type": "Polygon", "coordinates": [[[40,0],[50,0],[50,10],[40,0]]] }
            },
            {
                "type": "Feature",
                "properties": {},
                "geometry": { "type": "Polygon", "coordinates": [[[60,0],[70,0],[70,10],[60,0]]] }
            }
        ]
    }"#;

    fn parse(text: &str) -> Vec<Feature> {
        let mut bytes = text.as_bytes().to_vec();
        let geojson: GeoJson = simd_json::serde::from_slice(&mut bytes).unwrap();
        features_from_geojson(geojson)
    }

    #[test]
    fn test_polygons_in_document_order() {
        let features = parse(COLLECTION);
        let ids: Vec<&str> = features.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["AAA", "7", "Delta", "4"]);
        assert_eq!(features[1].geometry.kind(), "MultiPolygon");
        assert!(features[0].geometry.contains(DVec2::new(5.0, 5.0)));
    }

    #[test]
    fn test_short_positions_skipped() {
        let rings = convert_rings(&[vec![vec![0.0, 0.0], vec![5.0], vec![5.0, 5.0], vec![0.0, 0.0]]]);
        assert_eq!(rings[0].len(), 3);
    }

    #[test]
    fn test_detail_file_names() {
        assert_eq!(DetailLevel::Low.file_name(true), "ne_110m_countries.json");
        assert_eq!(DetailLevel::High.file_name(false), "ne_10m_land.json");
        let source = DatasetSource::new("data", DetailLevel::Medium, true);
        assert_eq!(source.path(), Path::new("data").join("ne_50m_countries.json"));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let source = GeoJsonFile::new("does/not/exist.json");
        let err = source.load().unwrap_err();
        assert!(format!("{err:#}").contains("does/not/exist.json"));
    }

    #[test]
    fn test_builtin_world_rings_closed() {
        let world = builtin_world();
        assert_eq!(world.len(), 6);
        for feature in &world {
            let ring = feature.geometry.rings().next().unwrap();
            assert_eq!(ring.first(), ring.last());
        }
        let europe = world.iter().find(|f| f.id == "europe").unwrap();
        // Paris
        assert!(europe.geometry.contains(DVec2::new(2.3, 48.9)));
    }
}
