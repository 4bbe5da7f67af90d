use crate::frame::Frame;
use crate::geom::Edge;
use crate::intent::{normalize, DepthSpec, RoomType};
use crate::testutil::{band, intent, room};

fn depth(id: &str, target: f64) -> DepthSpec {
    DepthSpec {
        id: id.into(),
        min_depth: None,
        target_depth: Some(target),
        max_depth: None,
    }
}

#[test]
fn explicit_bands_partition_the_width() {
    let normalized = normalize(intent(
        [0.0, 0.0, 12.0, 10.0],
        vec![band("private", 4.0), band("circulation", 2.0), band("public", 6.0)],
        vec![room("a", RoomType::Living, 10.0)],
    ))
    .unwrap();
    let frame = Frame::build(&normalized);

    assert_eq!(frame.bands.len(), 3);
    assert_eq!(frame.bands[0].x1, 0.0);
    assert_eq!(frame.bands[0].x2, 4.0);
    assert_eq!(frame.bands[1].x2, 6.0);
    assert_eq!(frame.bands[2].x2, 12.0);
    assert_eq!(frame.cells.len(), 3);
    assert!(frame.cells.iter().all(|c| c.inside_footprint));
}

#[test]
fn band_targets_scale_to_the_footprint() {
    // Targets sum to 6 on a 12m footprint: everything doubles.
    let normalized = normalize(intent(
        [0.0, 0.0, 12.0, 10.0],
        vec![band("left", 2.0), band("right", 4.0)],
        vec![room("a", RoomType::Living, 10.0)],
    ))
    .unwrap();
    let frame = Frame::build(&normalized);
    assert_eq!(frame.bands[0].x2, 4.0);
    assert_eq!(frame.bands[1].x2, 12.0);
}

#[test]
fn last_band_absorbs_rounding() {
    let normalized = normalize(intent(
        [0.0, 0.0, 10.0, 8.0],
        vec![band("a", 3.33), band("b", 3.33), band("c", 3.33)],
        vec![room("r", RoomType::Living, 10.0)],
    ))
    .unwrap();
    let frame = Frame::build(&normalized);
    let last = frame.bands.last().unwrap();
    assert_eq!(last.x2, 10.0);
    // Every boundary sits on the grid.
    for b in &frame.bands {
        assert!((b.x1 / 0.05 - (b.x1 / 0.05).round()).abs() < 1e-9);
    }
}

#[test]
fn bands_derive_from_left_right_preferences() {
    let mut a = room("a", RoomType::Living, 10.0);
    a.preferred_bands = vec!["left".into()];
    let mut b = room("b", RoomType::Bedroom, 10.0);
    b.preferred_bands = vec!["right".into()];

    let normalized = normalize(intent([0.0, 0.0, 10.0, 8.0], vec![], vec![a, b])).unwrap();
    let frame = Frame::build(&normalized);
    assert_eq!(frame.bands.len(), 2);
    assert_eq!(frame.bands[0].id, "left");
    assert_eq!(frame.bands[0].x2, 4.0);
    assert_eq!(frame.bands[1].x2, 10.0);
}

#[test]
fn center_preference_derives_three_bands() {
    let mut a = room("a", RoomType::Living, 10.0);
    a.preferred_bands = vec!["center".into()];
    let normalized = normalize(intent([0.0, 0.0, 10.0, 8.0], vec![], vec![a])).unwrap();
    let frame = Frame::build(&normalized);
    let ids: Vec<&str> = frame.bands.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, vec!["left", "center", "right"]);
    assert_eq!(frame.bands[1].x1, 3.0);
    assert_eq!(frame.bands[1].x2, 7.0);
}

#[test]
fn no_preferences_give_a_single_full_band() {
    let normalized = normalize(intent([0.0, 0.0, 10.0, 8.0], vec![], vec![room("a", RoomType::Living, 10.0)])).unwrap();
    let frame = Frame::build(&normalized);
    assert_eq!(frame.bands.len(), 1);
    assert_eq!(frame.bands[0].id, "full");
    assert_eq!(frame.cells.len(), 1);
}

#[test]
fn depths_follow_front_edge_orientation() {
    // South front: the first (front) depth starts at the bottom.
    let mut south = intent([0.0, 0.0, 10.0, 10.0], vec![], vec![room("a", RoomType::Living, 10.0)]);
    south.depths = vec![depth("front", 4.0), depth("back", 6.0)];
    let frame = Frame::build(&normalize(south).unwrap());
    assert_eq!(frame.depths[0].id, "front");
    assert_eq!(frame.depths[0].y1, 0.0);
    assert_eq!(frame.depths[0].y2, 4.0);

    // North front: reversed, the front depth hugs the top.
    let mut north = intent([0.0, 0.0, 10.0, 10.0], vec![], vec![room("a", RoomType::Living, 10.0)]);
    north.depths = vec![depth("front", 4.0), depth("back", 6.0)];
    north.front_edge = Edge::North;
    let frame = Frame::build(&normalize(north).unwrap());
    assert_eq!(frame.depths[0].id, "front");
    assert_eq!(frame.depths[0].y2, 10.0);
    assert_eq!(frame.depths[0].y1, 6.0);
}

#[test]
fn polygon_footprint_marks_outside_cells() {
    // L-shape: the north-east quadrant is missing.
    let mut l_shaped = intent([0.0, 0.0, 0.0, 0.0], vec![band("west", 5.0), band("east", 5.0)], vec![
        room("a", RoomType::Living, 10.0),
    ]);
    l_shaped.footprint.rect = None;
    l_shaped.footprint.polygon = Some(vec![
        [0.0, 0.0],
        [10.0, 0.0],
        [10.0, 4.0],
        [5.0, 4.0],
        [5.0, 8.0],
        [0.0, 8.0],
    ]);
    l_shaped.depths = vec![depth("front", 4.0), depth("back", 4.0)];

    let frame = Frame::build(&normalize(l_shaped).unwrap());
    assert_eq!(frame.cells.len(), 4);
    let cell = |band: &str, depth: &str| {
        frame
            .cells
            .iter()
            .find(|c| c.band_id == band && c.depth_id == depth)
            .unwrap()
    };
    assert!(cell("west", "front").inside_footprint);
    assert!(cell("west", "back").inside_footprint);
    assert!(cell("east", "front").inside_footprint);
    assert!(!cell("east", "back").inside_footprint);
}
