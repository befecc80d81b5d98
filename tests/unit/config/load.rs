use super::*;
use serde_json::json;
use std::fs;

fn write_json(path: &Path, v: &Value) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, serde_json::to_vec_pretty(v).unwrap()).unwrap();
}

#[test]
fn resolve_path_joins_relative_and_skips_empty() {
    let root = Path::new("/proj");
    assert_eq!(
        resolve_path(root, Some("assets/base.png")),
        Some(PathBuf::from("/proj/assets/base.png"))
    );
    assert_eq!(
        resolve_path(root, Some("/abs/x.png")),
        Some(PathBuf::from("/abs/x.png"))
    );
    assert_eq!(resolve_path(root, Some("  ")), None);
    assert_eq!(resolve_path(root, None), None);
}

#[test]
fn main_config_selects_current_event() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_json(
        &root.join(MAIN_CONFIG_PATH),
        &json!({
            "current_event": "weekly",
            "events": [
                "junk",
                {"id": "other", "config_path": "configs/other.json"},
                {"id": "weekly", "config_path": "configs/weekly.json"}
            ]
        }),
    );
    write_json(
        &root.join("configs/weekly.json"),
        &json!({"base_image": "assets/base.png", "text": {}}),
    );

    let ev = load_current_event(root).unwrap();
    assert_eq!(ev.path, root.join("configs/weekly.json"));
    assert_eq!(ev.def.base_image.as_deref(), Some("assets/base.png"));
}

#[test]
fn main_config_errors() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    assert!(matches!(load_main_config(root), Err(ThumbError::Config(_))));

    write_json(&root.join(MAIN_CONFIG_PATH), &json!({"events": []}));
    assert!(matches!(load_main_config(root), Err(ThumbError::Config(_))));

    write_json(
        &root.join(MAIN_CONFIG_PATH),
        &json!({"current_event": "x", "events": [{"id": "y", "config_path": "a.json"}]}),
    );
    let err = load_current_event(root).unwrap_err();
    assert!(err.to_string().contains("'x' not found"));

    fs::write(root.join("broken.json"), "{not json").unwrap();
    assert!(matches!(
        read_json_object(&root.join("broken.json")),
        Err(ThumbError::Serde(_))
    ));
    fs::write(root.join("list.json"), "[1, 2]").unwrap();
    assert!(matches!(
        read_json_object(&root.join("list.json")),
        Err(ThumbError::Config(_))
    ));
}

#[test]
fn override_payload_prefers_inline() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_json(
        &root.join("overrides.json"),
        &json!({"defaults": {"scale": 2.0}}),
    );

    let ev = LoadedEvent::from_raw(
        root.join("event.json"),
        json!({
            "character_overrides": {"defaults": {"scale": 0.5}},
            "character_overrides_path": "overrides.json"
        })
        .as_object()
        .unwrap()
        .clone(),
    )
    .unwrap();
    let payload = ev.override_payload(root).unwrap().unwrap();
    assert_eq!(payload["defaults"]["scale"], json!(0.5));

    let ev = LoadedEvent::from_raw(
        root.join("event.json"),
        json!({"character_overrides_path": "overrides.json"})
            .as_object()
            .unwrap()
            .clone(),
    )
    .unwrap();
    let payload = ev.override_payload(root).unwrap().unwrap();
    assert_eq!(payload["defaults"]["scale"], json!(2.0));

    let ev = LoadedEvent::from_raw(
        root.join("event.json"),
        json!({"character_overrides_path": "missing.json"})
            .as_object()
            .unwrap()
            .clone(),
    )
    .unwrap();
    assert!(ev.override_payload(root).unwrap().is_none());
}
