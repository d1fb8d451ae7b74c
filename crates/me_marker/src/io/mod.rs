//! This module deals with serializing and deserializing marker files
//!
//! A marker file is json. It contains the markers that an application creates (dynamic / legacy fast)
//! and the records of a marker store (which become engine managed markers during a layout pass).
//! Explicit images are runtime handles and are never serialized. Use cached image names in files.

use cap_std::fs_utf8::Dir;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use tracing::{info, warn};

use crate::{
    is_default, GeoCoordinate, MarkerDescriptor, MarkerError, MarkerKind, MarkerRecord,
    RotationType,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarkerFile {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub markers: Vec<MarkerEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub records: Vec<MarkerRecord>,
}

impl MarkerFile {
    pub fn from_descriptors<'a>(markers: impl IntoIterator<Item = &'a MarkerDescriptor>) -> Self {
        Self {
            markers: markers.into_iter().map(MarkerEntry::from).collect(),
            records: vec![],
        }
    }
    pub fn descriptors(&self) -> Vec<MarkerDescriptor> {
        self.markers.iter().cloned().map(MarkerDescriptor::from).collect()
    }
}

fn default_true() -> bool {
    true
}
fn is_true(value: &bool) -> bool {
    *value
}

/// The json form of [MarkerDescriptor]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerEntry {
    pub kind: MarkerKind,
    #[serde(default)]
    pub name: SmolStr,
    #[serde(default, skip_serializing_if = "is_default")]
    pub weight: f64,
    #[serde(default, skip_serializing_if = "is_default")]
    pub rotation: f64,
    #[serde(default, skip_serializing_if = "is_default")]
    pub rotation_type: RotationType,
    pub location: GeoCoordinate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached_image_name: Option<SmolStr>,
    #[serde(default, skip_serializing_if = "is_default")]
    pub anchor_point: Vec2,
    #[serde(default, skip_serializing_if = "is_default")]
    pub offset: Vec2,
    #[serde(default, skip_serializing_if = "is_default")]
    pub hit_test_size: Vec2,
    #[serde(default, skip_serializing_if = "is_default")]
    pub minimum_level: u32,
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub visible: bool,
    #[serde(default, skip_serializing_if = "is_default")]
    pub nearest_neighbor_sampling: bool,
    #[serde(default, skip_serializing_if = "is_default")]
    pub compress_texture: bool,
}

impl MarkerEntry {
    /// the first float field that json can't round trip
    pub fn non_finite_field(&self) -> Option<&'static str> {
        let vectors = [
            ("anchor_point", self.anchor_point),
            ("offset", self.offset),
            ("hit_test_size", self.hit_test_size),
        ];
        non_finite_field(self.weight, self.location)
            .or_else(|| (!self.rotation.is_finite()).then_some("rotation"))
            .or_else(|| {
                vectors
                    .into_iter()
                    .find(|(_, value)| !value.is_finite())
                    .map(|(field, _)| field)
            })
    }
}

fn non_finite_field(weight: f64, location: GeoCoordinate) -> Option<&'static str> {
    if !weight.is_finite() {
        Some("weight")
    } else if !location.latitude.is_finite() {
        Some("latitude")
    } else if !location.longitude.is_finite() {
        Some("longitude")
    } else {
        None
    }
}

impl From<&MarkerDescriptor> for MarkerEntry {
    fn from(marker: &MarkerDescriptor) -> Self {
        if marker.image.is_some() {
            warn!(name = %marker.name, "explicit images are not serialized");
        }
        Self {
            kind: marker.kind,
            name: marker.name.clone(),
            weight: marker.weight,
            rotation: marker.rotation,
            rotation_type: marker.rotation_type,
            location: marker.location,
            cached_image_name: marker.cached_image_name.clone(),
            anchor_point: marker.anchor_point,
            offset: marker.offset,
            hit_test_size: marker.hit_test_size,
            minimum_level: marker.minimum_level,
            visible: marker.is_visible(),
            nearest_neighbor_sampling: marker.nearest_neighbor_sampling(),
            compress_texture: marker.compress_texture(),
        }
    }
}

impl From<MarkerEntry> for MarkerDescriptor {
    fn from(entry: MarkerEntry) -> Self {
        let mut marker = MarkerDescriptor::new(entry.kind, entry.name, entry.location);
        marker.weight = entry.weight;
        marker.rotation = entry.rotation;
        marker.rotation_type = entry.rotation_type;
        marker.cached_image_name = entry.cached_image_name;
        marker.anchor_point = entry.anchor_point;
        marker.offset = entry.offset;
        marker.hit_test_size = entry.hit_test_size;
        marker.minimum_level = entry.minimum_level;
        marker.set_visible(entry.visible);
        marker.set_nearest_neighbor_sampling(entry.nearest_neighbor_sampling);
        marker.set_compress_texture(entry.compress_texture);
        marker
    }
}

pub fn parse_marker_file(json: &str) -> Result<MarkerFile, MarkerError> {
    Ok(serde_json::from_str(json)?)
}

pub fn load_marker_file(dir: &Dir, path: &str) -> Result<MarkerFile, MarkerError> {
    let json = dir.read_to_string(path).map_err(MarkerError::io(path))?;
    let file = parse_marker_file(&json)?;
    info!(
        path,
        markers = file.markers.len(),
        records = file.records.len(),
        "loaded marker file"
    );
    Ok(file)
}

/// fails without touching the file if any marker or record has a NaN or infinite value
pub fn save_marker_file(dir: &Dir, path: &str, file: &MarkerFile) -> Result<(), MarkerError> {
    for entry in file.markers.iter() {
        if let Some(field) = entry.non_finite_field() {
            return Err(MarkerError::NonFiniteValue {
                marker: entry.name.to_string(),
                field,
            });
        }
    }
    for record in file.records.iter() {
        if let Some(field) = non_finite_field(record.weight, record.location) {
            return Err(MarkerError::NonFiniteValue {
                marker: format!("#{}", record.uid),
                field,
            });
        }
    }
    let json = serde_json::to_string_pretty(file)?;
    dir.write(path, json).map_err(MarkerError::io(path))?;
    info!(path, markers = file.markers.len(), "saved marker file");
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::marker::test_support::solid_image;
    use cap_std::ambient_authority;
    use glam::vec2;
    use rstest::*;
    use similar_asserts::assert_eq;
    use tempfile::TempDir;

    const TEST_JSON: &str = r#"{
        "markers": [
            {
                "kind": { "type": "dynamic" },
                "name": "plane",
                "weight": 3200.0,
                "rotation": 45.0,
                "rotation_type": "true_north_aligned",
                "location": { "latitude": 38.9, "longitude": -77.0 },
                "cached_image_name": "plane",
                "anchor_point": [16.0, 16.0],
                "compress_texture": true
            },
            {
                "kind": { "type": "legacy_fast" },
                "name": "tower",
                "location": { "latitude": 0.0, "longitude": 0.0 },
                "minimum_level": 9
            }
        ],
        "records": [
            { "uid": 12, "meta_data": "row 12", "weight": 1.5, "location": { "latitude": 1.0, "longitude": 2.0 } }
        ]
    }"#;

    #[rstest]
    fn parse_test_json() {
        let file = parse_marker_file(TEST_JSON).expect("failed to parse marker file");
        let markers = file.descriptors();
        assert_eq!(markers.len(), 2);

        let plane = &markers[0];
        assert_eq!(plane.kind, MarkerKind::Dynamic);
        assert_eq!(plane.rotation_type, RotationType::TrueNorthAligned);
        assert_eq!(plane.anchor_point, vec2(16.0, 16.0));
        assert_eq!(plane.cached_image_name.as_deref(), Some("plane"));
        assert!(plane.compress_texture());
        assert!(plane.is_visible());

        let tower = &markers[1];
        assert_eq!(tower.kind, MarkerKind::LegacyFast);
        assert_eq!(tower.minimum_level, 9);
        assert_eq!(tower.rotation_type, RotationType::ScreenEdgeAligned);
        assert_eq!(tower.hit_test_size, Vec2::ZERO);

        assert_eq!(
            file.records,
            vec![MarkerRecord {
                uid: 12,
                meta_data: "row 12".into(),
                weight: 1.5,
                location: GeoCoordinate::new(1.0, 2.0),
            }]
        );
    }

    #[rstest]
    fn defaults_are_not_written() {
        let marker = MarkerDescriptor::dynamic("plain", GeoCoordinate::new(1.0, 1.0));
        let json = serde_json::to_value(MarkerEntry::from(&marker)).expect("failed to serialize");
        let object = json.as_object().expect("entry is not an object");
        let mut keys: Vec<&str> = object.keys().map(|k| k.as_str()).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["kind", "location", "name"]);
    }

    #[rstest]
    fn hidden_engine_marker_keeps_its_flag() {
        let mut marker = MarkerDescriptor::engine_managed(5, "hidden", 0.0, GeoCoordinate::default());
        marker.set_visible(false);
        marker.image = Some(solid_image(1, 1, 255));
        let file = MarkerFile::from_descriptors([&marker]);
        let json = serde_json::to_string(&file).expect("failed to serialize");
        let back = parse_marker_file(&json).expect("failed to parse");
        let back = &back.descriptors()[0];
        assert!(!back.is_visible());
        assert_eq!(back.uid(), Some(5));
        // images stay in memory
        assert_eq!(back.image, None);
    }

    #[fixture]
    fn temp_dir() -> (TempDir, Dir) {
        let tdir = tempfile::tempdir().expect("failed to create temp dir");
        let dir = Dir::open_ambient_dir(
            tdir.path().to_str().expect("utf-8 temp dir"),
            ambient_authority(),
        )
        .expect("failed to open temp dir");
        (tdir, dir)
    }

    #[rstest]
    fn save_and_load_from_dir(temp_dir: (TempDir, Dir)) {
        let (_tdir, dir) = temp_dir;
        let file = parse_marker_file(TEST_JSON).expect("failed to parse marker file");
        save_marker_file(&dir, "markers.json", &file).expect("failed to save");
        let loaded = load_marker_file(&dir, "markers.json").expect("failed to load");
        assert_eq!(loaded, file);

        assert!(matches!(
            load_marker_file(&dir, "missing.json"),
            Err(MarkerError::Io { .. })
        ));
    }

    #[rstest]
    #[case::weight(|m: &mut MarkerDescriptor| m.weight = f64::NAN, "weight")]
    #[case::rotation(|m: &mut MarkerDescriptor| m.rotation = f64::INFINITY, "rotation")]
    #[case::latitude(|m: &mut MarkerDescriptor| m.location.latitude = f64::NAN, "latitude")]
    #[case::anchor(|m: &mut MarkerDescriptor| m.anchor_point.x = f32::NAN, "anchor_point")]
    #[case::offset(|m: &mut MarkerDescriptor| m.offset.y = f32::NEG_INFINITY, "offset")]
    #[case::hit_test_size(|m: &mut MarkerDescriptor| m.hit_test_size.x = f32::NAN, "hit_test_size")]
    fn non_finite_markers_are_not_saved(
        temp_dir: (TempDir, Dir),
        #[case] spoil: fn(&mut MarkerDescriptor),
        #[case] expected: &str,
    ) {
        let (_tdir, dir) = temp_dir;
        let mut marker = MarkerDescriptor::dynamic("spoiled", GeoCoordinate::new(1.0, 1.0));
        spoil(&mut marker);
        let file = MarkerFile::from_descriptors([&marker]);
        match save_marker_file(&dir, "markers.json", &file) {
            Err(MarkerError::NonFiniteValue { marker, field }) => {
                assert_eq!(marker.as_str(), "spoiled");
                assert_eq!(field, expected);
            }
            other => panic!("expected a non finite value error, got {other:?}"),
        }
        assert!(!dir.exists("markers.json"));
    }

    #[rstest]
    fn non_finite_records_are_not_saved(temp_dir: (TempDir, Dir)) {
        let (_tdir, dir) = temp_dir;
        let file = MarkerFile {
            markers: vec![],
            records: vec![MarkerRecord {
                uid: 4,
                meta_data: "".into(),
                weight: f64::INFINITY,
                location: GeoCoordinate::new(0.0, 0.0),
            }],
        };
        assert!(matches!(
            save_marker_file(&dir, "markers.json", &file),
            Err(MarkerError::NonFiniteValue { field: "weight", .. })
        ));
    }

    #[rstest]
    fn broken_json_is_an_error() {
        assert!(matches!(
            parse_marker_file(r#"{ "markers": [ { "name": "no kind" } ] }"#),
            Err(MarkerError::Json(_))
        ));
    }
}
