use crate::errors::IntentError;
use crate::geom::Footprint;
use crate::intent::{normalize, AccessPreset, AccessTable, FootprintSpec, RoomType, Units};
use crate::testutil::{intent, room};

#[test]
fn duplicate_ids_are_rejected() {
    let bad = intent(
        [0.0, 0.0, 10.0, 8.0],
        vec![],
        vec![room("a", RoomType::Living, 10.0), room("a", RoomType::Bedroom, 10.0)],
    );
    assert!(matches!(normalize(bad), Err(IntentError::DuplicateRoomId(id)) if id == "a"));
}

#[test]
fn unknown_adjacency_target_is_rejected() {
    let mut living = room("living", RoomType::Living, 10.0);
    living.adjacent_to = vec!["nope".into()];
    let bad = intent([0.0, 0.0, 10.0, 8.0], vec![], vec![living]);
    assert!(matches!(
        normalize(bad),
        Err(IntentError::UnknownRoomReference { room, target }) if room == "living" && target == "nope"
    ));
}

#[test]
fn self_adjacency_is_rejected() {
    let mut living = room("living", RoomType::Living, 10.0);
    living.adjacent_to = vec!["living".into()];
    let bad = intent([0.0, 0.0, 10.0, 8.0], vec![], vec![living]);
    assert!(matches!(normalize(bad), Err(IntentError::SelfAdjacency(_))));
}

#[test]
fn non_positive_area_is_rejected() {
    let bad = intent([0.0, 0.0, 10.0, 8.0], vec![], vec![room("a", RoomType::Living, 0.0)]);
    assert!(matches!(normalize(bad), Err(IntentError::NonPositiveArea(_))));
}

#[test]
fn footprint_must_be_exactly_one_variant() {
    let mut both = intent([0.0, 0.0, 10.0, 8.0], vec![], vec![room("a", RoomType::Living, 10.0)]);
    both.footprint.polygon = Some(vec![[0.0, 0.0], [10.0, 0.0], [10.0, 8.0]]);
    assert!(matches!(normalize(both), Err(IntentError::BadFootprint(_))));

    let mut neither = intent([0.0, 0.0, 10.0, 8.0], vec![], vec![room("a", RoomType::Living, 10.0)]);
    neither.footprint = FootprintSpec::default();
    assert!(matches!(normalize(neither), Err(IntentError::BadFootprint(_))));
}

#[test]
fn centimeters_convert_to_meters() {
    let mut raw = intent(
        [0.0, 0.0, 1200.0, 1000.0],
        vec![],
        vec![room("living", RoomType::Living, 200_000.0)],
    );
    raw.units = Units::Cm;
    raw.rooms[0].min_width = Some(300.0);

    let normalized = normalize(raw).unwrap();
    let bounds = normalized.footprint.bounding_rect();
    assert_eq!(bounds.width(), 12.0);
    assert_eq!(bounds.height(), 10.0);
    assert!((normalized.rooms[0].min_area - 20.0).abs() < 1e-9);
    assert_eq!(normalized.rooms[0].min_width, Some(3.0));
}

#[test]
fn meters_pass_through_untouched() {
    let normalized = normalize(intent(
        [0.0, 0.0, 12.0, 10.0],
        vec![],
        vec![room("living", RoomType::Living, 20.0)],
    ))
    .unwrap();
    assert!(matches!(&normalized.footprint, Footprint::Rect(r) if r.width() == 12.0));
    assert_eq!(normalized.rooms[0].min_area, 20.0);
}

#[test]
fn ensuite_owner_is_derived_from_adjacency() {
    let mut master = room("master", RoomType::Bedroom, 14.0);
    master.must_touch_exterior = true;
    let mut ensuite = room("ensuite", RoomType::Bath, 4.0);
    ensuite.is_ensuite = true;
    ensuite.adjacent_to = vec!["master".into()];

    let normalized = normalize(intent([0.0, 0.0, 12.0, 10.0], vec![], vec![master, ensuite])).unwrap();
    assert_eq!(normalized.owner_of("ensuite"), Some("master"));
    assert!(normalized.is_attached("ensuite"));
    assert!(!normalized.is_attached("master"));
    let attached: Vec<_> = normalized.attachments_of("master").map(|r| r.id.as_str()).collect();
    assert_eq!(attached, vec!["ensuite"]);
}

#[test]
fn single_adjacency_bath_attaches_to_its_bedroom() {
    let bedroom = room("bed", RoomType::Bedroom, 12.0);
    let mut bath = room("bath", RoomType::Bath, 4.0);
    bath.adjacent_to = vec!["bed".into()];

    let normalized = normalize(intent([0.0, 0.0, 12.0, 10.0], vec![], vec![bedroom, bath])).unwrap();
    assert_eq!(normalized.owner_of("bath"), Some("bed"));
}

#[test]
fn shared_bath_stays_standalone() {
    let hall = room("hall", RoomType::Hall, 8.0);
    let mut bath = room("bath", RoomType::Bath, 4.0);
    bath.adjacent_to = vec!["hall".into()];

    let normalized = normalize(intent([0.0, 0.0, 12.0, 10.0], vec![], vec![hall, bath])).unwrap();
    assert_eq!(normalized.owner_of("bath"), None);
}

#[test]
fn ensuite_without_owner_is_rejected() {
    let mut ensuite = room("ensuite", RoomType::Ensuite, 4.0);
    ensuite.adjacent_to = Vec::new();
    let bad = intent([0.0, 0.0, 12.0, 10.0], vec![], vec![ensuite]);
    assert!(matches!(normalize(bad), Err(IntentError::AttachmentWithoutOwner(_))));
}

#[test]
fn presets_gate_bedroom_doors_differently() {
    let open = AccessTable::from_preset(AccessPreset::OpenPlan);
    let privacy = AccessTable::from_preset(AccessPreset::PrivacyFocused);

    // Open plan has no bedroom rule, so a bedroom-living door is fine.
    assert!(open.door_allowed(RoomType::Bedroom, RoomType::Living));
    // Privacy focused gates every private room behind circulation.
    assert!(!privacy.door_allowed(RoomType::Bedroom, RoomType::Living));
    assert!(privacy.door_allowed(RoomType::Bedroom, RoomType::Hall));
}

#[test]
fn circulation_is_always_an_acceptable_source() {
    for preset in [AccessPreset::OpenPlan, AccessPreset::Traditional, AccessPreset::PrivacyFocused] {
        let table = AccessTable::from_preset(preset);
        assert!(table.door_allowed(RoomType::Bath, RoomType::Corridor));
        assert!(table.door_allowed(RoomType::Bedroom, RoomType::Foyer));
    }
}

#[test]
fn default_weights_are_modest() {
    let normalized = normalize(intent(
        [0.0, 0.0, 12.0, 10.0],
        vec![],
        vec![room("a", RoomType::Living, 10.0)],
    ))
    .unwrap();
    let w = normalized.weights;
    for value in [w.zone, w.adjacency, w.hall_area, w.glazing, w.bath_cluster, w.compactness, w.wall_breaks] {
        assert!((1.0..=3.0).contains(&value));
    }
}
