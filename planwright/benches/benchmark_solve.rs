use criterion::{black_box, criterion_group, criterion_main, Criterion};
use planwright::{parse_intent, solve, SolveOptions};

const HOUSE: &str = r#"{
    "footprint": {"rect": [0, 0, 16, 11]},
    "bands": [
        {"id": "private", "target_width": 6},
        {"id": "circulation", "target_width": 2},
        {"id": "public", "target_width": 8}
    ],
    "front_edge": "south",
    "garden_edge": "north",
    "rooms": [
        {"id": "hall", "type": "hall", "min_area": 9, "must_touch_edge": "south",
         "has_exterior_door": true, "is_circulation": true,
         "preferred_bands": ["circulation"]},
        {"id": "living", "type": "living", "min_area": 24, "must_touch_exterior": true,
         "adjacent_to": ["hall"], "preferred_bands": ["public"]},
        {"id": "dining", "type": "dining", "min_area": 12, "adjacent_to": ["living"],
         "preferred_bands": ["public"]},
        {"id": "kitchen", "type": "kitchen", "min_area": 10, "adjacent_to": ["dining"],
         "must_touch_exterior": true, "preferred_bands": ["public"]},
        {"id": "master", "type": "bedroom", "min_area": 16, "must_touch_exterior": true,
         "adjacent_to": ["hall"], "preferred_bands": ["private"]},
        {"id": "ensuite", "type": "bath", "min_area": 4.5, "is_ensuite": true,
         "adjacent_to": ["master"]},
        {"id": "bedroom2", "type": "bedroom", "min_area": 12, "must_touch_exterior": true,
         "adjacent_to": ["hall"], "preferred_bands": ["private"]},
        {"id": "bath", "type": "bath", "min_area": 5, "adjacent_to": ["hall"],
         "preferred_bands": ["private"]},
        {"id": "laundry", "type": "laundry", "min_area": 4,
         "preferred_bands": ["public"]},
        {"id": "office", "type": "office", "min_area": 9, "must_touch_exterior": true,
         "preferred_bands": ["private"]}
    ]
}"#;

pub fn benchmark_solve(c: &mut Criterion) {
    let intent = parse_intent(HOUSE).expect("benchmark intent parses");

    c.bench_function("solve ten-room house", |b| {
        b.iter(|| {
            let result = solve(black_box(intent.clone()), &SolveOptions::default());
            black_box(result).ok()
        })
    });
}

criterion_group!(benches, benchmark_solve);
criterion_main!(benches);
