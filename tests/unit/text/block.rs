use super::*;
use crate::text::measure::FixedAdvance;
use serde_json::json;

struct Fixture {
    _dir: tempfile::TempDir,
    root: PathBuf,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().to_path_buf();
    std::fs::write(root.join("font.ttf"), b"stub").unwrap();
    Fixture { _dir: dir, root }
}

fn block(v: serde_json::Value) -> TextBlockDef {
    serde_json::from_value(v).unwrap()
}

fn env(root: &Path, w: u32, h: u32) -> LayoutEnv<'_> {
    LayoutEnv {
        root,
        geom: CanvasGeometry::new(w, h).unwrap(),
    }
}

#[test]
fn simple_block_top_left() {
    let fx = fixture();
    let env = env(&fx.root, 1920, 1080);
    let def = block(json!({"text": " Top 8 ", "font_path": "font.ttf", "max_size": 40, "x": 100, "y": 50}));
    let laid = layout_block(&mut FixedAdvance, &env, "round_title", &def, None, None)
        .unwrap()
        .unwrap();
    assert_eq!(laid.size, 40);
    assert_eq!((laid.x, laid.y, laid.height), (100, 50, 40));
    assert_eq!(laid.runs.len(), 1);
    assert_eq!(laid.runs[0].text, "Top 8");
    assert_eq!(laid.runs[0].ascent, 32);
    assert_eq!(laid.runs[0].style.stroke_width, 8);
    assert_eq!(laid.bottom(), 90);
}

#[test]
fn align_and_anchor_shift_origin() {
    let fx = fixture();
    let env = env(&fx.root, 1920, 1080);
    let def = block(json!({
        "text": "abcd", "font_path": "font.ttf", "max_size": 40,
        "x": 960, "y": 500, "align": "CENTER", "anchor": "bottom"
    }));
    let laid = layout_block(&mut FixedAdvance, &env, "vs_logo", &def, None, None)
        .unwrap()
        .unwrap();
    assert_eq!(laid.runs[0].x, 920);
    assert_eq!(laid.y, 460);

    let def = block(json!({
        "text": "abcd", "font_path": "font.ttf", "max_size": 40,
        "x": 960, "y": 500, "align": "right", "anchor": "center"
    }));
    let laid = layout_block(&mut FixedAdvance, &env, "vs_logo", &def, None, None)
        .unwrap()
        .unwrap();
    assert_eq!(laid.runs[0].x, 880);
    assert_eq!(laid.y, 480);
}

#[test]
fn wrapped_lines_use_line_spacing() {
    let fx = fixture();
    let env = env(&fx.root, 1920, 1080);
    let def = block(json!({
        "text": "aaaa bbbb", "font_path": "font.ttf", "max_size": 40,
        "max_width": 100, "max_lines": 2
    }));
    let laid = layout_block(&mut FixedAdvance, &env, "event_title", &def, None, None)
        .unwrap()
        .unwrap();
    assert_eq!(laid.size, 40);
    assert_eq!(laid.runs.len(), 2);
    assert_eq!(laid.runs[1].y, 50);
    assert_eq!(laid.height, 90);
}

#[test]
fn segments_share_a_baseline() {
    let fx = fixture();
    let env = env(&fx.root, 1920, 1080);
    let def = block(json!({
        "text": "Genesis #54",
        "font_path": "font.ttf",
        "max_size": 40,
        "segments": [
            {"text": "GENESIS "},
            {"text": "{event_number}", "size_scale": 0.5, "x_adjust": 10},
            {"text": ""}
        ]
    }));
    let laid = layout_block(&mut FixedAdvance, &env, "event_title", &def, None, None)
        .unwrap()
        .unwrap();
    assert_eq!(laid.runs.len(), 2);
    assert_eq!(laid.runs[1].text, "#54");
    assert_eq!(laid.runs[1].size, 20);
    assert_eq!(laid.runs[1].x, 160);
    assert_eq!(laid.runs[0].y, 0);
    assert_eq!(laid.runs[1].y, 16);
    assert_eq!(laid.runs[0].y + laid.runs[0].ascent, laid.runs[1].y + laid.runs[1].ascent);
    assert_eq!(laid.width, 200);
    assert_eq!(laid.height, 40);
}

#[test]
fn segment_token_falls_back_to_companion() {
    let fx = fixture();
    let env = env(&fx.root, 1920, 1080);
    let def = block(json!({
        "font_path": "font.ttf",
        "max_size": 40,
        "segments": [{"text": "WEEKLY {event_number}"}]
    }));
    let laid = layout_block(&mut FixedAdvance, &env, "event_title", &def, Some("Weekly #7"), None)
        .unwrap()
        .unwrap();
    assert_eq!(laid.runs[0].text, "WEEKLY #7");
}

#[test]
fn segment_list_without_objects_draws_nothing() {
    let fx = fixture();
    let env = env(&fx.root, 1920, 1080);
    let def = block(json!({
        "text": "Fallback", "font_path": "font.ttf", "max_size": 40,
        "segments": [1, "two"]
    }));
    assert!(
        layout_block(&mut FixedAdvance, &env, "event_title", &def, None, Some(5))
            .unwrap()
            .is_none()
    );

    let def = block(json!({
        "text": "Plain", "font_path": "font.ttf", "max_size": 40, "segments": []
    }));
    let laid = layout_block(&mut FixedAdvance, &env, "event_title", &def, None, None)
        .unwrap()
        .unwrap();
    assert_eq!(laid.runs[0].text, "Plain");
}

#[test]
fn disabled_and_empty_blocks_are_skipped() {
    let fx = fixture();
    let env = env(&fx.root, 1920, 1080);
    let def = block(json!({"text": "x", "enabled": false}));
    assert!(layout_block(&mut FixedAdvance, &env, "a", &def, None, Some(5)).unwrap().is_none());
    let def = block(json!({"text": "   "}));
    assert!(layout_block(&mut FixedAdvance, &env, "a", &def, None, Some(5)).unwrap().is_none());
}

#[test]
fn fatal_config_errors() {
    let fx = fixture();
    let env = env(&fx.root, 1920, 1080);
    let def = block(json!({"text": "x", "font_path": "font.ttf"}));
    let err = layout_block(&mut FixedAdvance, &env, "round_title", &def, None, None).unwrap_err();
    assert!(err.to_string().contains("round_title max_size"), "{err}");

    let def = block(json!({"text": "x", "font_path": "nope.ttf", "max_size": 10}));
    assert!(matches!(
        layout_block(&mut FixedAdvance, &env, "a", &def, None, None),
        Err(ThumbError::Config(_))
    ));
}

#[test]
fn css_colors_parse_and_bad_colors_fall_back() {
    let fx = fixture();
    let env = env(&fx.root, 1920, 1080);
    let def = block(json!({
        "text": "x", "font_path": "font.ttf", "max_size": 10,
        "fill": "navy", "stroke_fill": "rgb(10, 20, 30)"
    }));
    let laid = layout_block(&mut FixedAdvance, &env, "round_title", &def, None, None)
        .unwrap()
        .unwrap();
    assert_eq!(laid.runs[0].style.fill, Rgba8::rgb(0, 0, 128));
    assert_eq!(laid.runs[0].style.stroke_fill, Rgba8::rgb(10, 20, 30));

    let def = block(json!({
        "text": "x", "font_path": "font.ttf", "max_size": 10,
        "fill": "octarine", "stroke_fill": "#12345"
    }));
    let laid = layout_block(&mut FixedAdvance, &env, "round_title", &def, None, None)
        .unwrap()
        .unwrap();
    assert_eq!(laid.runs[0].style.fill, Rgba8::WHITE);
    assert_eq!(laid.runs[0].style.stroke_fill, Rgba8::BLACK);
}

#[test]
fn design_values_scale_with_canvas() {
    let fx = fixture();
    let env = env(&fx.root, 960, 540);
    let def = block(json!({"text": "ab", "font_path": "font.ttf", "max_size": 40, "x": 100, "y": 60}));
    let laid = layout_block(&mut FixedAdvance, &env, "a", &def, None, None)
        .unwrap()
        .unwrap();
    assert_eq!(laid.size, 20);
    assert_eq!((laid.x, laid.y), (50, 30));
    assert_eq!(laid.runs[0].style.stroke_width, 4);
}

#[test]
fn stacking_chain_skips_empty_blocks() {
    let fx = fixture();
    let env = env(&fx.root, 1920, 1080);
    let cfg: TextConfigDef = serde_json::from_value(json!({
        "event_title": {"text": "AA", "font_path": "font.ttf", "max_size": 20, "y": 10},
        "event_number": {"text": "#5", "font_path": "font.ttf", "max_size": 10,
                         "stack": true, "stack_gap": 4, "y": 999},
        "round_title": {"text": "", "stack": true},
        "vs_logo": {"text": "VS", "font_path": "font.ttf", "max_size": 10,
                    "stack": true, "y": 500}
    }))
    .unwrap();
    let layers = layout_text_layers(&mut FixedAdvance, &env, &cfg, "", "").unwrap();
    let names: Vec<&str> = layers.blocks.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, vec!["event_title", "event_number", "vs_logo"]);
    assert_eq!(layers.blocks[1].y, 34);
    assert_eq!(layers.blocks[2].y, 500);
    assert!(layers.player_names.is_none());
    assert_eq!(layers.runs().count(), 3);
}
