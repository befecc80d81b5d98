use super::*;
use crate::foundation::core::CanvasGeometry;
use crate::text::measure::FixedAdvance;
use serde_json::json;

fn setup() -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().to_path_buf();
    std::fs::write(root.join("font.ttf"), b"stub").unwrap();
    (dir, root)
}

fn names_def(extra: serde_json::Value) -> TextBlockDef {
    let mut v = json!({"font_path": "font.ttf", "max_size": 100, "min_size": 20});
    if let (Some(base), Some(extra)) = (v.as_object_mut(), extra.as_object()) {
        base.extend(extra.clone());
    }
    serde_json::from_value(v).unwrap()
}

fn run(root: &Path, def: &TextBlockDef, l: &str, r: &str) -> Option<PlayerNamesLayout> {
    let env = LayoutEnv {
        root,
        geom: CanvasGeometry::new(1920, 1080).unwrap(),
    };
    layout_player_names(&mut FixedAdvance, &env, def, l, r).unwrap()
}

#[test]
fn edge_alignment_pads_from_each_border() {
    let (_d, root) = setup();
    let laid = run(&root, &names_def(json!({})), "Mango", "Zain").unwrap();
    assert_eq!(laid.align, NamesAlign::Edge);
    assert_eq!((laid.left.runs[0].x, laid.left.runs[0].y), (130, 60));
    assert_eq!(laid.right.runs[0].x, 1920 - 130 - 200);
    assert_eq!(laid.left.size, 100);
}

#[test]
fn center_alignment_uses_symmetric_zones() {
    let (_d, root) = setup();
    let laid = run(&root, &names_def(json!({"align": "center"})), "Mango", "Zain").unwrap();
    assert_eq!(laid.left.runs[0].x, 340);
    assert_eq!(laid.right.runs[0].x, 1355);
}

#[test]
fn shorter_block_is_centered_on_taller() {
    let (_d, root) = setup();
    let long = "a".repeat(30);
    let laid = run(&root, &names_def(json!({})), &long, "Zain").unwrap();
    assert_eq!(laid.left.size, 44);
    assert_eq!(laid.right.size, 100);
    assert_eq!(laid.left.y, 60 + (100 - 44) / 2);
    assert_eq!(laid.right.y, 60);
}

#[test]
fn explicit_max_width_overrides_budget() {
    let (_d, root) = setup();
    let laid = run(&root, &names_def(json!({"max_width": 100})), "Mango", "Zain").unwrap();
    // 5 chars * size / 2 <= 100 -> size 40.
    assert_eq!(laid.left.size, 40);
}

#[test]
fn skipped_when_disabled_or_empty() {
    let (_d, root) = setup();
    assert!(run(&root, &names_def(json!({"enabled": false})), "A", "B").is_none());
    assert!(run(&root, &names_def(json!({})), "  ", "").is_none());
    let laid = run(&root, &names_def(json!({})), "", "Zain").unwrap();
    assert_eq!(laid.right.runs[0].text, "Zain");
}
