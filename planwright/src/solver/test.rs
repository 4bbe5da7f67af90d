use crate::frame::Frame;
use crate::geom::{Edge, Rect, GRID};
use crate::intent::{normalize, RoomType};
use crate::plan::{OpeningKind, PlacedRoom, PlanState};
use crate::solve::{solve, SolveOptions};
use crate::solver::{candidates, ordered_rooms, repair};
use crate::testutil::{band, intent, room};

fn two_room_intent() -> crate::intent::LayoutIntent {
    let mut living = room("living", RoomType::Living, 25.0);
    living.preferred_bands = vec!["left".into()];
    living.must_touch_exterior = true;
    let mut bedroom = room("bedroom", RoomType::Bedroom, 20.0);
    bedroom.preferred_bands = vec!["right".into()];
    bedroom.must_touch_exterior = true;

    intent(
        [0.0, 0.0, 12.0, 8.0],
        vec![band("left", 6.0), band("right", 6.0)],
        vec![living, bedroom],
    )
}

fn basic_house_intent() -> crate::intent::LayoutIntent {
    let mut hall = room("hall", RoomType::Hall, 8.0);
    hall.must_touch_edge = Some(Edge::South);
    hall.has_exterior_door = true;
    hall.is_circulation = true;
    let mut living = room("living", RoomType::Living, 20.0);
    living.must_touch_exterior = true;
    living.adjacent_to = vec!["hall".into()];
    let mut bedroom = room("bedroom", RoomType::Bedroom, 12.0);
    bedroom.must_touch_exterior = true;
    bedroom.adjacent_to = vec!["hall".into()];

    intent(
        [0.0, 0.0, 12.0, 10.0],
        vec![band("private", 4.0), band("circulation", 2.0), band("public", 6.0)],
        vec![hall, living, bedroom],
    )
}

/// Two rooms banded east/west both end up on their own side.
#[test]
fn two_rooms_split_east_west() {
    let solution = solve(two_room_intent(), &SolveOptions::default()).unwrap();
    let state = &solution.state;

    let living = state.get("living").expect("living placed");
    let bedroom = state.get("bedroom").expect("bedroom placed");
    assert!(living.rect.x2 <= 7.0, "living drifted east: {}", living.rect);
    assert!(bedroom.rect.x1 >= 5.0, "bedroom drifted west: {}", bedroom.rect);
    assert!(!living.rect.overlaps(&bedroom.rect));
}

/// The basic house: hall on the street edge, living and bedroom both
/// reachable through it.
#[test]
fn basic_house_solves() {
    let solution = solve(basic_house_intent(), &SolveOptions::default()).unwrap();
    let state = &solution.state;

    assert_eq!(state.placed.len(), 3);
    let hall = state.get("hall").unwrap();
    assert_eq!(hall.rect.y1, 0.0, "hall must sit on the south edge");

    for id in ["living", "bedroom"] {
        let shared = state.get(id).unwrap().rect.shared_edge_len(&hall.rect);
        assert!(shared >= 0.9, "{id} shares only {shared:.2}m with the hall");
    }

    let exterior_doors: Vec<_> = state
        .openings
        .iter()
        .filter(|o| o.kind == OpeningKind::Door && o.is_exterior)
        .collect();
    assert_eq!(exterior_doors.len(), 1);
    assert_eq!(exterior_doors[0].room_id, "hall");
}

/// The look-ahead regression: three rooms all competing for the hall's
/// band boundary must each keep a door-worthy slice of it.
#[test]
fn tight_private_band_keeps_frontage_for_everyone() {
    let mut hall = room("hall", RoomType::Hall, 8.0);
    hall.must_touch_edge = Some(Edge::South);
    hall.has_exterior_door = true;
    hall.is_circulation = true;
    hall.preferred_bands = vec!["circulation".into()];
    let mut bedroom1 = room("bedroom1", RoomType::Bedroom, 12.0);
    bedroom1.must_touch_edge = Some(Edge::North);
    bedroom1.adjacent_to = vec!["hall".into()];
    bedroom1.preferred_bands = vec!["private".into()];
    let mut bedroom2 = room("bedroom2", RoomType::Bedroom, 10.0);
    bedroom2.must_touch_edge = Some(Edge::South);
    bedroom2.adjacent_to = vec!["hall".into()];
    bedroom2.preferred_bands = vec!["private".into()];
    let mut bath = room("bath", RoomType::Bath, 4.0);
    bath.adjacent_to = vec!["hall".into()];
    bath.preferred_bands = vec!["private".into()];

    let solution = solve(
        intent(
            [0.0, 0.0, 12.0, 10.0],
            vec![band("private", 4.0), band("circulation", 2.0), band("public", 6.0)],
            vec![hall, bedroom1, bedroom2, bath],
        ),
        &SolveOptions::default(),
    )
    .unwrap();
    let state = &solution.state;
    let hall_rect = state.get("hall").unwrap().rect;

    for id in ["bedroom1", "bedroom2", "bath"] {
        let shared = state.get(id).unwrap().rect.shared_edge_len(&hall_rect);
        assert!(shared > 0.0, "{id} lost contact with the hall");
    }
    for id in ["bedroom2", "bath"] {
        let shared = state.get(id).unwrap().rect.shared_edge_len(&hall_rect);
        assert!(shared >= 0.9, "{id} kept only {shared:.2}m of hall frontage");
    }
}

fn ensuite_intent() -> crate::intent::LayoutIntent {
    let mut hall = room("hall", RoomType::Hall, 8.0);
    hall.must_touch_edge = Some(Edge::South);
    hall.has_exterior_door = true;
    hall.is_circulation = true;
    let mut master = room("master", RoomType::Bedroom, 14.0);
    master.adjacent_to = vec!["hall".into()];
    master.must_touch_exterior = true;
    let mut ensuite = room("ensuite", RoomType::Bath, 4.0);
    ensuite.adjacent_to = vec!["master".into()];
    ensuite.is_ensuite = true;
    let mut living = room("living", RoomType::Living, 18.0);
    living.adjacent_to = vec!["hall".into()];
    living.must_touch_exterior = true;

    intent([0.0, 0.0, 14.0, 10.0], vec![], vec![hall, master, ensuite, living])
}

/// The ensuite is ordered right after its owner and placed against it.
#[test]
fn ensuite_follows_its_owner() {
    let normalized = normalize(ensuite_intent()).unwrap();
    let order: Vec<&str> = ordered_rooms(&normalized).iter().map(|r| r.id.as_str()).collect();
    let master_pos = order.iter().position(|id| *id == "master").unwrap();
    assert_eq!(order[master_pos + 1], "ensuite");

    let solution = solve(ensuite_intent(), &SolveOptions::default()).unwrap();
    let state = &solution.state;
    let master = state.get("master").unwrap();
    let ensuite = state.get("ensuite").unwrap();
    assert!(
        ensuite.rect.shared_edge_len(&master.rect) > 0.0,
        "ensuite detached from master"
    );

    // Exactly one interior door, and it opens into the master bedroom.
    let doors: Vec<_> = state.interior_doors().filter(|d| d.connects("ensuite")).collect();
    assert_eq!(doors.len(), 1);
    let partner = if doors[0].room_id == "ensuite" {
        doors[0].connects_to.as_deref().unwrap()
    } else {
        doors[0].room_id.as_str()
    };
    assert_eq!(partner, "master");
}

/// Solving the same intent twice yields byte-identical plans.
#[test]
fn solve_is_deterministic() {
    let a = solve(basic_house_intent(), &SolveOptions::default()).unwrap();
    let b = solve(basic_house_intent(), &SolveOptions::default()).unwrap();
    let json_a = serde_json::to_string(&a.state).unwrap();
    let json_b = serde_json::to_string(&b.state).unwrap();
    assert_eq!(json_a, json_b);
    assert_eq!(a.score.total, b.score.total);
}

/// Post-solve structural invariants: no overlaps, grid-snapped
/// coordinates, containment, and gap fill at a fixed point.
#[test]
fn solved_plans_hold_their_invariants() {
    for build in [two_room_intent, basic_house_intent, ensuite_intent] {
        let raw = build();
        let normalized = normalize(raw.clone()).unwrap();
        let frame = Frame::build(&normalized);
        let solution = solve(raw, &SolveOptions::default()).unwrap();
        let mut state = solution.state;

        let rooms: Vec<_> = state.rooms().cloned().collect();
        for i in 0..rooms.len() {
            for j in i + 1..rooms.len() {
                assert!(
                    !rooms[i].rect.overlaps(&rooms[j].rect),
                    "{} overlaps {}",
                    rooms[i].id,
                    rooms[j].id
                );
            }
            assert!(
                normalized.footprint.contains_rect(&rooms[i].rect),
                "{} left the footprint",
                rooms[i].id
            );
            for v in [rooms[i].rect.x1, rooms[i].rect.y1, rooms[i].rect.x2, rooms[i].rect.y2] {
                let steps = v / GRID;
                assert!((steps - steps.round()).abs() < 1e-6, "{v} is off-grid");
            }
        }

        // Gap fill already ran inside the solve; a second run must be a
        // no-op.
        let changed = repair::fill_gaps(&mut state, &frame, &normalized);
        assert_eq!(changed, 0, "gap fill was not at a fixed point");
    }
}

/// Door positions stay within their walls and doors only appear on
/// shared walls long enough to hold them.
#[test]
fn door_geometry_is_sane() {
    let solution = solve(basic_house_intent(), &SolveOptions::default()).unwrap();
    let state = &solution.state;
    for opening in &state.openings {
        assert!((0.0..=1.0).contains(&opening.position));
        assert!(opening.width > 0.0);
        if opening.is_interior_door() {
            let a = state.get(&opening.room_id).unwrap();
            let b = state.get(opening.connects_to.as_deref().unwrap()).unwrap();
            let shared = a.rect.shared_edge_len(&b.rect);
            assert!(shared >= opening.width + 0.4 - 1e-9);
        }
    }
}

/// A plan that falls into disconnected pieces is stitched by a corridor
/// inserted as a real room.
#[test]
fn corridor_connects_split_plans() {
    // Two fat rooms pinned to opposite edges with a bedroom gap between
    // them; no adjacency requests, so nothing pulls them together.
    let mut north_room = room("studio", RoomType::Living, 30.0);
    north_room.must_touch_edge = Some(Edge::North);
    north_room.max_height = Some(3.0);
    let mut south_room = room("workshop", RoomType::Garage, 30.0);
    south_room.must_touch_edge = Some(Edge::South);
    south_room.max_height = Some(3.0);

    let raw = intent([0.0, 0.0, 12.0, 9.0], vec![], vec![north_room, south_room]);
    let solution = solve(raw, &SolveOptions::default()).unwrap();
    let state = &solution.state;

    assert!(state.corridor.is_some(), "expected a corridor strip");
    let corridor = state.get("auto_corridor").expect("corridor placed as a room");
    for id in ["studio", "workshop"] {
        assert!(
            state.get(id).unwrap().rect.shared_edge_len(&corridor.rect) > 0.0,
            "{id} not touching the corridor"
        );
    }
    // And the corridor makes everything reachable.
    assert!(solution.score.total > 0.0);
}

/// Priority ordering puts circulation first and floating service rooms
/// last.
#[test]
fn priority_ordering_matches_constraints() {
    let mut hall = room("hall", RoomType::Hall, 8.0);
    hall.has_exterior_door = true;
    hall.is_circulation = true;
    let mut living = room("living", RoomType::Living, 20.0);
    living.adjacent_to = vec!["hall".into()];
    let laundry = room("laundry", RoomType::Laundry, 4.0);

    let normalized = normalize(intent(
        [0.0, 0.0, 12.0, 10.0],
        vec![],
        vec![laundry, living, hall],
    ))
    .unwrap();
    let order: Vec<&str> = ordered_rooms(&normalized).iter().map(|r| r.id.as_str()).collect();
    assert_eq!(order, vec!["hall", "living", "laundry"]);
}

/// Rooms that cannot fit are reported, not silently dropped.
#[test]
fn impossible_room_fails_with_reasons() {
    // A room wider than the footprint can never be placed.
    let mut hangar = room("hangar", RoomType::Other, 50.0);
    hangar.min_width = Some(20.0);
    let raw = intent([0.0, 0.0, 12.0, 8.0], vec![], vec![hangar]);

    match solve(raw, &SolveOptions::default()) {
        Err(crate::errors::SolveError::UnplacedRooms { room_ids, partial }) => {
            assert_eq!(room_ids, vec!["hangar".to_string()]);
            assert_eq!(partial.failures.len(), 1);
            assert_eq!(partial.failures[0].room_id, "hangar");
        }
        other => panic!("expected UnplacedRooms, got {other:?}"),
    }
}

/// fill_cell rooms take their whole cell instead of sizing from area.
#[test]
fn fill_cell_rooms_take_the_cell() {
    let mut garage = room("garage", RoomType::Garage, 15.0);
    garage.fill_cell = true;
    garage.preferred_bands = vec!["west".into()];
    let normalized = normalize(intent(
        [0.0, 0.0, 12.0, 8.0],
        vec![band("west", 5.0), band("east", 7.0)],
        vec![garage],
    ))
    .unwrap();
    let frame = Frame::build(&normalized);
    let state = PlanState::new(normalized.footprint.clone());

    let ctx = candidates::GenContext {
        frame: &frame,
        state: &state,
        required_adjacent: &[],
        reserved_area: 0.0,
    };
    let cands = candidates::generate(&normalized.rooms[0], &[0], &ctx, 15);
    assert!(!cands.is_empty());
    assert_eq!(cands[0].rect, frame.cells[0].rect);
}

/// Polygon footprints confine placement and gap filling to the actual
/// buildable region, not the bounding box.
#[test]
fn polygon_footprint_contains_all_rooms() {
    let mut living = room("living", RoomType::Living, 12.0);
    living.must_touch_exterior = true;
    let mut bed = room("bed", RoomType::Bedroom, 8.0);
    bed.adjacent_to = vec!["living".into()];

    let mut raw = intent([0.0, 0.0, 0.0, 0.0], vec![], vec![living, bed]);
    raw.footprint.rect = None;
    raw.footprint.polygon = Some(vec![
        [0.0, 0.0],
        [10.0, 0.0],
        [10.0, 4.0],
        [5.0, 4.0],
        [5.0, 8.0],
        [0.0, 8.0],
    ]);

    let normalized = normalize(raw.clone()).unwrap();
    let solution = solve(raw, &SolveOptions::default()).unwrap();
    let state = &solution.state;

    assert_eq!(state.placed.len(), 2);
    let rooms: Vec<_> = state.rooms().collect();
    for room in &rooms {
        assert!(
            normalized.footprint.contains_rect(&room.rect),
            "{} left the polygon: {}",
            room.id,
            room.rect
        );
    }
    assert!(!rooms[0].rect.overlaps(&rooms[1].rect));
}

/// Swapping two similar-sized rooms happens when it wins an adjacency.
#[test]
fn swap_repair_trades_positions_for_adjacency() {
    let mut hall = room("hall", RoomType::Hall, 20.0);
    hall.is_circulation = true;
    let mut bedroom = room("bedroom", RoomType::Bedroom, 8.0);
    bedroom.adjacent_to = vec!["hall".into()];
    let office = room("office", RoomType::Office, 8.0);

    let normalized = normalize(intent(
        [0.0, 0.0, 12.0, 8.0],
        vec![],
        vec![hall, bedroom, office],
    ))
    .unwrap();
    let frame = Frame::build(&normalized);

    let mut state = PlanState::new(normalized.footprint.clone());
    let placed = |id: &str, kind: RoomType, rect: Rect| PlacedRoom {
        id: id.into(),
        rect,
        kind,
        label: id.into(),
        band_id: None,
        depth_id: None,
    };
    state.insert_room(placed("hall", RoomType::Hall, Rect::new(0.0, 0.0, 12.0, 2.0)));
    // The bedroom sits away from the hall, the office right against it.
    state.insert_room(placed("bedroom", RoomType::Bedroom, Rect::new(0.0, 6.0, 4.0, 8.0)));
    state.insert_room(placed("office", RoomType::Office, Rect::new(0.0, 2.0, 4.0, 4.1)));

    let swaps = repair::swap_repair(&mut state, &frame, &normalized);
    assert_eq!(swaps, 1);
    assert_eq!(state.get("bedroom").unwrap().rect, Rect::new(0.0, 2.0, 4.0, 4.1));
    assert_eq!(state.get("office").unwrap().rect, Rect::new(0.0, 6.0, 4.0, 8.0));
}

/// The plan score carries all seven weighted components.
#[test]
fn plan_score_has_all_components() {
    let solution = solve(basic_house_intent(), &SolveOptions::default()).unwrap();
    let names: Vec<&str> = solution.score.components.keys().map(String::as_str).collect();
    assert_eq!(
        names,
        vec!["zone", "adjacency", "hall_area", "glazing", "bath_cluster", "compactness", "wall_breaks"]
    );
    let sum: f64 = solution.score.components.values().sum();
    assert!((sum - solution.score.total).abs() < 1e-9);
}

/// Reachability failure names the cut-off rooms. Privacy rules forbid
/// bedroom-to-bedroom doors, so three bedrooms with no hall cannot form
/// a door graph.
#[test]
fn unreachable_rooms_fail_the_solve() {
    let rooms = vec![
        room("a", RoomType::Bedroom, 15.0),
        room("b", RoomType::Bedroom, 15.0),
        room("c", RoomType::Bedroom, 15.0),
    ];
    let mut raw = intent([0.0, 0.0, 12.0, 8.0], vec![], rooms);
    raw.access_rule_preset = Some(crate::intent::AccessPreset::PrivacyFocused);

    match solve(raw, &SolveOptions::default()) {
        Err(error @ crate::errors::SolveError::UnreachableRooms { .. }) => {
            let message = error.to_string();
            assert!(message.contains("unreachable"), "message was: {message}");
        }
        other => panic!("expected UnreachableRooms, got {other:?}"),
    }
}
