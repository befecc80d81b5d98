use super::*;
use image::{Rgba, RgbaImage};
use serde_json::json;
use std::fs;

fn obj(v: Value) -> Map<String, Value> {
    match v {
        Value::Object(m) => m,
        _ => panic!("not an object"),
    }
}

fn set(p1: &str, p2: &str) -> Value {
    json!({
        "player1": "Alice",
        "player2": "Bob",
        "p1_character": p1,
        "p2_character": p2,
        "round": "Pools"
    })
}

fn project() -> tempfile::TempDir {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    fs::create_dir_all(root.join("configs")).unwrap();
    fs::write(
        root.join("configs/main.json"),
        json!({
            "current_event": "ev",
            "events": [{"id": "ev", "config_path": "configs/ev.json"}]
        })
        .to_string(),
    )
    .unwrap();
    fs::write(
        root.join("configs/ev.json"),
        json!({
            "base_image": "base.png",
            "text": {
                "event_title": {"enabled": false, "text": "Weekly"},
                "round_title": {"enabled": false}
            }
        })
        .to_string(),
    )
    .unwrap();
    RgbaImage::from_pixel(192, 108, Rgba([5, 5, 5, 255]))
        .save(root.join("base.png"))
        .unwrap();
    for name in ["Fox", "Falco"] {
        let dir = root.join(DEFAULT_CHARACTER_DIR).join("vs_screen").join(name);
        fs::create_dir_all(&dir).unwrap();
        for side in ["Left", "Right"] {
            RgbaImage::from_pixel(10, 20, Rgba([250, 250, 250, 255]))
                .save(dir.join(format!("Default {side}.png")))
                .unwrap();
        }
    }
    tmp
}

#[test]
fn missing_keys_are_sorted_and_respect_empty_values() {
    let full = obj(set("Fox", "Falco"));
    assert!(missing_keys(&full, true).is_empty());

    let mut partial = full.clone();
    partial.remove("round");
    partial.insert("player1".into(), json!(""));
    assert_eq!(missing_keys(&partial, false), vec!["round"]);
    assert_eq!(missing_keys(&partial, true), vec!["player1", "round"]);
}

#[test]
fn job_parsing_fills_defaults() {
    let mut o = obj(set("Fox", "Falco"));
    o.insert("p2_color".into(), json!(""));
    o.insert("character_set".into(), json!("portraits"));
    o.insert("slug".into(), json!("custom"));
    let job = RenderJob::from_object(&o, true).unwrap();
    assert_eq!(job.request.p1_color, "Default");
    assert_eq!(job.request.p2_color, "Default");
    assert_eq!(job.request.character_set, crate::assets::locator::AssetSet::Portraits);
    assert_eq!(job.slug.as_deref(), Some("custom"));
    assert!(!job.metadata);

    o.remove("p1_character");
    let err = RenderJob::from_object(&o, true).unwrap_err();
    assert!(err.to_string().contains("p1_character"), "{err}");
}

#[test]
fn next_batch_dir_counts_past_the_highest() {
    let tmp = tempfile::tempdir().unwrap();
    assert_eq!(
        next_batch_dir(tmp.path()),
        tmp.path().join("set_thumbnail_test_1")
    );
    for name in ["set_thumbnail_test_2", "set_thumbnail_test_10", "set_thumbnail_test_x"] {
        fs::create_dir_all(tmp.path().join(name)).unwrap();
    }
    fs::write(tmp.path().join("set_thumbnail_test_99"), b"file").unwrap();
    assert_eq!(
        next_batch_dir(tmp.path()),
        tmp.path().join("set_thumbnail_test_11")
    );
    assert_eq!(
        next_batch_dir(&tmp.path().join("missing")),
        tmp.path().join("missing/set_thumbnail_test_1")
    );
}

#[test]
fn run_job_writes_slugged_png() {
    let tmp = project();
    let mut job = RenderJob::from_object(&obj(set("Fox", "Falco")), true).unwrap();
    job.metadata = true;
    let mut engine = TextEngine::new();
    let saved = run_job(tmp.path(), &job, &mut engine).unwrap();

    assert_eq!(
        saved.image,
        tmp.path().join(DEFAULT_OUTPUT_DIR).join("alice_vs_bob.png")
    );
    let png = image::open(&saved.image).unwrap();
    assert_eq!((png.width(), png.height()), (192, 108));
    assert!(saved.metadata.unwrap().is_file());
}

#[test]
fn quick_config_requires_values() {
    let tmp = project();
    let path = tmp.path().join("quick.json");
    let mut o = obj(set("Fox", "Falco"));
    o.insert("round".into(), json!(""));
    fs::write(&path, Value::Object(o).to_string()).unwrap();
    let err = load_quick_job(tmp.path(), Path::new("quick.json")).unwrap_err();
    assert!(err.to_string().contains("round"), "{err}");

    assert!(load_quick_job(tmp.path(), Path::new("nope.json")).is_err());
}

#[test]
fn batch_counts_failures_and_keeps_going() {
    let tmp = project();
    let sets_path = tmp.path().join("sets.json");
    fs::write(
        &sets_path,
        json!([set("Fox", "Falco"), "nope", set("Kirby", "Fox"), set("Falco", "Fox")]).to_string(),
    )
    .unwrap();

    let sets = load_batch_sets(tmp.path(), &sets_path, None, None).unwrap();
    assert_eq!(sets.len(), 4);
    assert_eq!(
        load_batch_sets(tmp.path(), &sets_path, Some(2), None)
            .unwrap()
            .len(),
        2
    );

    let out_root = tmp.path().join("output");
    let mut engine = TextEngine::new();
    let report = run_batch(tmp.path(), &sets, &out_root, &mut engine).unwrap();
    assert_eq!(report.output_dir, out_root.join("set_thumbnail_test_1"));
    assert_eq!(report.failures, 2);
    assert_eq!(report.rendered.len(), 2);
    assert!(report.rendered.iter().all(|p| p.starts_with(&report.output_dir)));

    let again = run_batch(tmp.path(), &sets[..1], &out_root, &mut engine).unwrap();
    assert_eq!(again.output_dir, out_root.join("set_thumbnail_test_2"));
}

#[test]
fn batch_file_must_be_an_array_or_a_sweep() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("sets.json");
    fs::write(&path, "42").unwrap();
    assert!(matches!(
        load_batch_sets(tmp.path(), &path, None, None),
        Err(ThumbError::Config(_))
    ));

    fs::write(&path, "{}").unwrap();
    let err = load_batch_sets(tmp.path(), &path, None, None).unwrap_err();
    assert!(err.to_string().contains("round"), "{err}");
}

fn add_color(root: &Path, character: &str, color: &str) {
    let dir = root.join(DEFAULT_CHARACTER_DIR).join("vs_screen").join(character);
    for side in ["Left", "Right"] {
        RgbaImage::from_pixel(10, 20, Rgba([200, 0, 0, 255]))
            .save(dir.join(format!("{color} {side}.png")))
            .unwrap();
    }
}

fn sweep(seed: Option<u64>) -> RosterSweep {
    RosterSweep {
        rounds: vec!["Pools".to_owned(), "Top 8".to_owned()],
        anchor_character: Some("fox".to_owned()),
        seed,
        ..Default::default()
    }
}

#[test]
fn roster_sweep_pairs_the_anchor_with_everyone_on_both_sides() {
    let tmp = project();
    add_color(tmp.path(), "Falco", "Red");

    let sets = sweep(Some(7)).build_sets(tmp.path(), None).unwrap();
    let slugs: Vec<_> = sets.iter().map(|s| s["slug"].as_str().unwrap()).collect();
    assert_eq!(
        slugs,
        [
            "left_fox_right_falco",
            "right_fox_left_falco",
            "left_fox_right_fox",
            "right_fox_left_fox"
        ]
    );
    assert_eq!(sets[0]["p1_character"], "Fox");
    assert_eq!(sets[0]["p2_character"], "Falco");
    assert_eq!(sets[1]["p1_character"], "Falco");
    assert_eq!(sets[1]["player2"], "Fox");
    assert_eq!(sets[0]["character_set"], "vs_screen");
    for set in &sets {
        assert!(["Pools", "Top 8"].contains(&set["round"].as_str().unwrap()));
        assert_eq!(missing_keys(set.as_object().unwrap(), true), Vec::<&str>::new());
    }
    assert!(["Default", "Red"].contains(&sets[0]["p2_color"].as_str().unwrap()));
    assert_eq!(sets[0]["p1_color"], "Default");

    assert_eq!(sweep(Some(7)).build_sets(tmp.path(), None).unwrap(), sets);
    assert_eq!(sweep(None).build_sets(tmp.path(), Some(7)).unwrap(), sets);
    assert_eq!(sweep(Some(1)).build_sets(tmp.path(), Some(7)).unwrap(), sets);
}

#[test]
fn roster_sweep_file_renders_every_pairing() {
    let tmp = project();
    let path = tmp.path().join("sweep.json");
    fs::write(
        &path,
        json!({"rounds": ["Pools"], "anchor_character": "Fox", "seed": 3}).to_string(),
    )
    .unwrap();

    let sets = load_batch_sets(tmp.path(), &path, None, None).unwrap();
    assert_eq!(sets.len(), 4);
    assert_eq!(load_batch_sets(tmp.path(), &path, Some(3), None).unwrap().len(), 3);

    let mut engine = TextEngine::new();
    let report = run_batch(tmp.path(), &sets, &tmp.path().join("output"), &mut engine).unwrap();
    assert_eq!(report.failures, 0);
    assert!(report.output_dir.join("right_fox_left_falco.png").is_file());
}

#[test]
fn roster_sweep_rejects_unknown_anchor_and_missing_rounds() {
    let tmp = project();
    let mut bad = sweep(Some(1));
    bad.anchor_character = Some("Kirby".to_owned());
    let err = bad.build_sets(tmp.path(), None).unwrap_err();
    assert!(matches!(err, ThumbError::Config(_)), "{err}");

    let mut empty = sweep(Some(1));
    empty.rounds.clear();
    assert!(matches!(
        empty.build_sets(tmp.path(), None),
        Err(ThumbError::Config(_))
    ));

    let mut portraits = sweep(Some(1));
    portraits.character_set = crate::assets::locator::AssetSet::Portraits;
    assert!(matches!(
        portraits.build_sets(tmp.path(), None),
        Err(ThumbError::AssetNotFound(_))
    ));
}
