//! End-to-end scenarios: rendering a known city, loading damaged presets,
//! and driving the preview pane from city files on disk.

use std::collections::BTreeSet;
use std::fs;

use sc4_cartographer::city::write_city_json;
use sc4_cartographer::persistence::{self, DEFAULT_PRESET_NAME};
use sc4_cartographer::synthetic::{generate_city, SyntheticCityConfig};
use sc4_cartographer::terrain::ElevationRange;
use sc4_cartographer::tilemap::Tilemap;
use sc4_cartographer::{
    render_map, AppearanceModel, CartographerError, CityData, CityFile, Lot, MalformedKind,
    MapColorRole, MapObjectLayer, PreviewOrchestrator, SaveIdentity, TerrainGrid, ZoneType,
    ZoneWealth,
};

#[test]
fn two_by_two_city_renders_lot_over_flat_terrain() {
    let terrain = TerrainGrid::new(Tilemap::new_with(2, 2, 0.0));
    let lots = [Lot::single(ZoneType::Residential, ZoneWealth::Low, 0, 0)];
    let model = AppearanceModel {
        grid_segment_size: 10,
        segment_padding_x: 0,
        segment_padding_y: 0,
        segment_offset_x: 0,
        segment_offset_y: 0,
        show_grid_lines: false,
        show_zone_outlines: false,
        visible_layers: BTreeSet::from([
            MapObjectLayer::ResidentialLowZone,
            MapObjectLayer::TerrainMap,
        ]),
        ..AppearanceModel::default()
    };

    let bitmap = render_map(Some(&terrain), &lots, &model).unwrap();
    assert_eq!((bitmap.width(), bitmap.height()), (20, 20));

    let zone = model.color(MapColorRole::ResidentialLow);
    let ground = ElevationRange { min: 0.0, max: 0.0 }.shade(0.0);
    for y in 0..20 {
        for x in 0..20 {
            let expected = if x < 10 && y < 10 { zone } else { ground };
            assert_eq!(bitmap.pixel(x, y), expected, "pixel {},{}", x, y);
        }
    }
}

#[test]
fn corrupt_preset_rejected_then_valid_preset_loads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(DEFAULT_PRESET_NAME);

    let mut custom = AppearanceModel::default();
    custom.grid_segment_size = 7;
    custom.show_zone_outlines = true;
    persistence::save_to_file(&custom, &path).unwrap();

    let mut bytes = fs::read(&path).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0x20;
    let corrupt = dir.path().join("corrupt.sc4cart");
    fs::write(&corrupt, &bytes).unwrap();

    let mut target = AppearanceModel::default();
    let before = target.clone();
    let err = persistence::load_into(&mut target, &corrupt).unwrap_err();
    assert_eq!(err.malformed_kind(), Some(&MalformedKind::ChecksumMismatch));
    assert_eq!(target, before);

    persistence::load_into(&mut target, &path).unwrap();
    assert_eq!(target, custom);
}

#[test]
fn truncated_preset_reports_truncation() {
    let bytes = persistence::serialize(&AppearanceModel::default()).unwrap();
    let err = persistence::deserialize(&bytes[..20]).unwrap_err();
    assert!(matches!(
        err,
        CartographerError::MalformedAppearanceFile {
            kind: MalformedKind::Truncated { len: 20 }
        }
    ));
}

#[test]
fn preview_reloads_when_city_file_changes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("City - Lakeside.json");
    let city = CityData::new(
        SaveIdentity::named("City - Lakeside"),
        Some(TerrainGrid::new(Tilemap::new_with(3, 3, 250.0))),
        vec![Lot::single(ZoneType::Industrial, ZoneWealth::High, 1, 1)],
    );
    write_city_json(&city, &path).unwrap();

    let model = AppearanceModel::default();
    let mut orchestrator = PreviewOrchestrator::new();
    let file = CityFile::open(&path).unwrap();
    orchestrator.render(&file, &model).unwrap();
    assert_eq!(orchestrator.default_map_name().as_deref(), Some("Lakeside"));
    let info = orchestrator.inspect(7, 7, &model).unwrap();
    assert_eq!(info.zone, Some((ZoneType::Industrial, ZoneWealth::High)));

    // A larger city under the same path changes the file size, and with it
    // the identity.
    let bigger = CityData::new(
        city.identity.clone(),
        Some(TerrainGrid::new(Tilemap::new_with(6, 6, 250.0))),
        vec![Lot::new(ZoneType::Airport, ZoneWealth::None, (0, 5), (0, 5))],
    );
    write_city_json(&bigger, &path).unwrap();
    let previews = orchestrator.render(&file, &model).unwrap();
    assert_eq!(previews.normal.width(), 30);
    let info = orchestrator.inspect(7, 7, &model).unwrap();
    assert_eq!(info.zone, Some((ZoneType::Airport, ZoneWealth::None)));
}

#[test]
fn synthetic_city_exports_png_and_jpeg() {
    let dir = tempfile::tempdir().unwrap();
    let city = generate_city(&SyntheticCityConfig {
        width: 24,
        depth: 16,
        lots: 40,
        ..Default::default()
    });

    let mut model = AppearanceModel::default();
    model.output_path = dir.path().to_string_lossy().into_owned();
    let mut orchestrator = PreviewOrchestrator::new();
    orchestrator.render(&city, &model).unwrap();

    let png = orchestrator.export_map(&model, None).unwrap();
    assert_eq!(png, dir.path().join("Synthetic 42.png"));
    let image = image::open(&png).unwrap();
    assert_eq!((image.width(), image.height()), (120, 80));

    model.output_format = "jpeg".parse().unwrap();
    let jpg = orchestrator.export_map(&model, Some("lake")).unwrap();
    assert_eq!(jpg, dir.path().join("lake.jpg"));
    assert!(image::open(&jpg).is_ok());
}
