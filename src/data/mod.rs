use crate::sky::projection::wrap_deg_360;
use crate::sky::{Footprint, RaDec};
use anyhow::Result;
use geojson::{GeoJson, JsonValue, Value};
use std::fs;
use std::path::Path;

/// Load every footprint catalog (`*.json` / `*.geojson`) in a directory.
/// A file that fails to parse is reported and skipped; it never aborts
/// the rest of the load.
pub fn load_catalog_dir(dir: &Path) -> Result<Vec<Footprint>> {
    let mut paths: Vec<_> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            matches!(
                p.extension().and_then(|e| e.to_str()),
                Some("json") | Some("geojson")
            )
        })
        .collect();
    paths.sort();

    let mut footprints = Vec::new();
    for path in paths {
        match load_catalog(&path) {
            Ok(mut fps) => footprints.append(&mut fps),
            Err(e) => eprintln!("Warning: failed to load {}: {}", path.display(), e),
        }
    }
    Ok(footprints)
}

/// Load footprints from a single GeoJSON file. Each Polygon feature is one
/// footprint; coordinates are [ra, dec] pairs in degrees.
pub fn load_catalog(path: &Path) -> Result<Vec<Footprint>> {
    let content = fs::read_to_string(path)?;
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("catalog");
    parse_catalog(&content, stem)
}

fn parse_catalog(content: &str, source: &str) -> Result<Vec<Footprint>> {
    let geojson: GeoJson = content.parse()?;
    let features = match geojson {
        GeoJson::FeatureCollection(fc) => fc.features,
        GeoJson::Feature(f) => vec![f],
        GeoJson::Geometry(_) => {
            eprintln!("Warning: {source}: bare geometry has no id, skipping");
            return Ok(Vec::new());
        }
    };

    let mut out = Vec::new();
    for (idx, feature) in features.into_iter().enumerate() {
        let meta = feature.properties.clone().unwrap_or_default();
        let id = feature_id(&feature, &meta).unwrap_or_else(|| format!("{source}-{idx}"));

        let Some(geometry) = feature.geometry else {
            eprintln!("Warning: {source}: feature {id} has no geometry, skipping");
            continue;
        };
        let Value::Polygon(rings) = geometry.value else {
            eprintln!("Warning: {source}: feature {id} is not a Polygon, skipping");
            continue;
        };
        let Some(exterior) = rings.first() else {
            eprintln!("Warning: {source}: feature {id} has an empty Polygon, skipping");
            continue;
        };

        let mut vertices: Vec<RaDec> = exterior
            .iter()
            .filter(|c| c.len() >= 2)
            .map(|c| RaDec {
                ra: wrap_deg_360(c[0]),
                dec: c[1].clamp(-90.0, 90.0),
            })
            .collect();
        // GeoJSON rings repeat the first vertex at the end; the polygon
        // here is implicitly closed.
        if vertices.len() >= 2 && vertices.first() == vertices.last() {
            vertices.pop();
        }

        if vertices.len() < 3 || vertices.iter().any(|v| !v.ra.is_finite() || !v.dec.is_finite())
        {
            eprintln!("Warning: {source}: feature {id} has a degenerate outline, skipping");
            continue;
        }

        out.push(Footprint { id, vertices, meta });
    }
    Ok(out)
}

fn feature_id(feature: &geojson::Feature, props: &geojson::JsonObject) -> Option<String> {
    if let Some(id) = &feature.id {
        return Some(match id {
            geojson::feature::Id::String(s) => s.clone(),
            geojson::feature::Id::Number(n) => n.to_string(),
        });
    }
    props
        .get("id")
        .or_else(|| props.get("name"))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

/// Built-in catalog of well-known deep fields, used when no catalog file
/// is available.
pub fn generate_demo_sky() -> Vec<Footprint> {
    vec![
        demo_quad("COSMOS", 150.1, 2.2, 7.0, 6.0, "wide survey"),
        demo_quad("GOODS-N", 189.2, 62.2, 10.0, 5.0, "deep survey"),
        demo_quad("GOODS-S", 53.1, -27.8, 6.5, 5.5, "deep survey"),
        demo_quad("UDS", 34.4, -5.2, 5.0, 4.0, "deep survey"),
        demo_quad("Abell 2744", 3.6, -30.4, 6.0, 5.0, "cluster field"),
        // EGS is traditionally drawn as a tilted strip.
        Footprint {
            id: "EGS".to_string(),
            vertices: vec![
                RaDec { ra: 210.0, dec: 50.0 },
                RaDec { ra: 218.0, dec: 52.0 },
                RaDec { ra: 220.0, dec: 56.0 },
                RaDec { ra: 212.0, dec: 54.0 },
            ],
            meta: demo_meta("strip survey"),
        },
    ]
}

fn demo_meta(kind: &str) -> geojson::JsonObject {
    let mut meta = geojson::JsonObject::new();
    meta.insert("survey".to_string(), JsonValue::from(kind));
    meta
}

fn demo_quad(id: &str, ra: f64, dec: f64, half_ra: f64, half_dec: f64, kind: &str) -> Footprint {
    Footprint {
        id: id.to_string(),
        vertices: vec![
            RaDec {
                ra: wrap_deg_360(ra - half_ra),
                dec: dec - half_dec,
            },
            RaDec {
                ra: wrap_deg_360(ra + half_ra),
                dec: dec - half_dec,
            },
            RaDec {
                ra: wrap_deg_360(ra + half_ra),
                dec: dec + half_dec,
            },
            RaDec {
                ra: wrap_deg_360(ra - half_ra),
                dec: dec + half_dec,
            },
        ],
        meta: demo_meta(kind),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "id": "F001",
                "properties": {"survey": "demo"},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[10.0, -5.0], [20.0, -5.0], [20.0, 5.0], [10.0, 5.0], [10.0, -5.0]]]
                }
            },
            {
                "type": "Feature",
                "properties": {"name": "named-field"},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[100.0, 10.0], [110.0, 10.0], [105.0, 20.0], [100.0, 10.0]]]
                }
            },
            {
                "type": "Feature",
                "properties": {},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[1.0, 1.0], [2.0, 2.0], [1.0, 1.0]]]
                }
            }
        ]
    }"#;

    #[test]
    fn test_parse_catalog() {
        let fps = parse_catalog(CATALOG, "test").unwrap();
        // The two-vertex ring is degenerate and dropped.
        assert_eq!(fps.len(), 2);

        assert_eq!(fps[0].id, "F001");
        // Closing duplicate removed.
        assert_eq!(fps[0].vertices.len(), 4);
        assert_eq!(fps[0].vertices[0], RaDec { ra: 10.0, dec: -5.0 });
        assert_eq!(fps[0].meta.get("survey").and_then(|v| v.as_str()), Some("demo"));

        assert_eq!(fps[1].id, "named-field");
        assert_eq!(fps[1].vertices.len(), 3);
    }

    #[test]
    fn test_parse_catalog_wraps_ra_and_clamps_dec() {
        let raw = r#"{
            "type": "Feature",
            "properties": {"id": "wrapped"},
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[-10.0, 95.0], [370.0, -95.0], [5.0, 0.0]]]
            }
        }"#;
        let fps = parse_catalog(raw, "test").unwrap();
        assert_eq!(fps.len(), 1);
        assert_eq!(fps[0].vertices[0], RaDec { ra: 350.0, dec: 90.0 });
        assert_eq!(fps[0].vertices[1], RaDec { ra: 10.0, dec: -90.0 });
    }

    #[test]
    fn test_demo_sky_is_well_formed() {
        let fps = generate_demo_sky();
        assert!(!fps.is_empty());
        for fp in &fps {
            assert!(fp.vertices.len() >= 3, "{} too small", fp.id);
            assert!(fp.center().is_some(), "{} has no center", fp.id);
            for v in &fp.vertices {
                assert!((0.0..360.0).contains(&v.ra));
                assert!((-90.0..=90.0).contains(&v.dec));
            }
        }
    }
}
