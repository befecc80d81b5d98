use super::*;
use image::Rgba;
use serde_json::{Value, json};
use std::fs;

fn geom() -> CanvasGeometry {
    CanvasGeometry::new(1920, 1080).unwrap()
}

fn sprite(dir: &Path, name: &str, w: u32, h: u32, color: [u8; 4]) {
    fs::create_dir_all(dir).unwrap();
    RgbaImage::from_pixel(w, h, Rgba(color))
        .save(dir.join(format!("{name}.png")))
        .unwrap();
}

/// Project root with a blank 1920x1080 base and Fox/Falco vs_screen sprites.
fn project(event: Value) -> (tempfile::TempDir, EventContext) {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    RgbaImage::from_pixel(1920, 1080, Rgba([0, 0, 0, 255]))
        .save(root.join("base.png"))
        .unwrap();
    let vs = root.join(DEFAULT_CHARACTER_DIR).join("vs_screen");
    sprite(&vs.join("Fox"), "Default Left", 100, 200, [255, 0, 0, 255]);
    sprite(&vs.join("Fox"), "Default Right", 100, 200, [0, 255, 0, 255]);
    sprite(&vs.join("Falco"), "Default Left", 100, 200, [0, 0, 255, 255]);
    sprite(&vs.join("Falco"), "Default Right", 100, 200, [255, 255, 0, 255]);

    let Value::Object(raw) = event else {
        panic!("event must be an object")
    };
    let loaded = LoadedEvent::from_raw(root.join("event.json"), raw).unwrap();
    let ctx = EventContext::load(root, loaded, Some("base.png")).unwrap();
    (tmp, ctx)
}

fn request() -> ThumbnailRequest {
    ThumbnailRequest {
        player1: "Alice".to_owned(),
        player2: "Bob".to_owned(),
        p1_character: "Fox".to_owned(),
        p2_character: "Falco".to_owned(),
        p1_color: DEFAULT_COLOR.to_owned(),
        p2_color: DEFAULT_COLOR.to_owned(),
        round: "Winners Final".to_owned(),
        character_set: AssetSet::VsScreen,
    }
}

fn with_round_block(extra: Value) -> Value {
    let mut event = json!({"text": {"round_title": {"enabled": false}}});
    if let (Value::Object(e), Value::Object(x)) = (&mut event, extra) {
        e.extend(x);
    }
    event
}

#[test]
fn sprite_bottom_sits_on_the_margin_line() {
    let g = geom();
    let (x, y) = sprite_origin(&g, Side::Left, 100, 200, 0, 0, 0);
    assert_eq!((x, y), (130, 770));
    assert_eq!(y + 200, 1080 - 50 - 60);

    let (x, _) = sprite_origin(&g, Side::Right, 100, 200, 0, 0, 0);
    assert_eq!(x, 1920 - 130 - 100);
}

#[test]
fn outline_pulls_the_origin_back_and_offsets_apply() {
    let g = geom();
    assert_eq!(sprite_origin(&g, Side::Left, 100, 200, 0, 0, 5), (125, 765));
    assert_eq!(sprite_origin(&g, Side::Left, 100, 200, 20, -30, 0), (150, 740));
    assert_eq!(sprite_origin(&g, Side::Right, 100, 200, -20, 0, 0), (1670, 770));
}

#[test]
fn geometry_scales_on_smaller_canvases() {
    let g = CanvasGeometry::new(960, 540).unwrap();
    let (x, y) = sprite_origin(&g, Side::Left, 50, 100, 0, 0, 0);
    assert_eq!(x, 25 + 40);
    assert_eq!(y + 100, 540 - 25 - 30);
}

#[test]
fn round_override_rules() {
    let mut text = TextConfigDef::default();
    assert!(matches!(
        apply_round(&mut text, "Grand Final"),
        Err(ThumbError::Config(_))
    ));
    apply_round(&mut text, "   ").unwrap();

    text.round_title = Some(Default::default());
    apply_round(&mut text, " Grand Final ").unwrap();
    assert_eq!(
        text.round_title.as_ref().unwrap().text.as_deref(),
        Some("Grand Final")
    );

    let block = text.round_title.as_mut().unwrap();
    block.enabled = Some(false);
    block.text = Some("Pools".to_owned());
    apply_round(&mut text, "Losers R1").unwrap();
    assert_eq!(
        text.round_title.as_ref().unwrap().text.as_deref(),
        Some("Pools")
    );
}

#[test]
fn end_to_end_placements_are_symmetric() {
    let (tmp, ctx) = project(with_round_block(json!({})));
    let mut engine = TextEngine::new();
    let thumb = render_thumbnail(&ctx, &mut engine, Path::new(DEFAULT_CHARACTER_DIR), &request())
        .unwrap();
    let left = thumb.report.left.placement;
    let right = thumb.report.right.placement;

    assert_eq!((left.width, left.height), (160, 320));
    assert_eq!(left.art_bottom(), 1080 - 50 - 60);
    assert_eq!(right.art_bottom(), 1080 - 50 - 60);
    assert_eq!(left.x + left.width as i32 / 2 + right.x + right.width as i32 / 2, 1920);
    assert!(thumb.report.text.blocks.is_empty());

    let rgba = thumb.canvas.to_rgba_image().unwrap();
    assert_eq!(rgba.get_pixel(140, 900).0, [255, 0, 0, 255]);
    assert_eq!(rgba.get_pixel(1700, 900).0, [255, 255, 0, 255]);
    assert_eq!(rgba.get_pixel(960, 900).0, [0, 0, 0, 255]);
    drop(tmp);
}

#[test]
fn outline_grows_the_drawn_sprite() {
    let (_tmp, ctx) = project(with_round_block(
        json!({"character_outline": {"enabled": true, "size": 4, "color": "#ffffff"}}),
    ));
    let mut engine = TextEngine::new();
    let thumb = render_thumbnail(&ctx, &mut engine, Path::new(DEFAULT_CHARACTER_DIR), &request())
        .unwrap();
    let left = thumb.report.left.placement;
    assert_eq!(left.outline_px, 4);
    assert_eq!((left.x, left.y), (126, 970 - 320 - 4));
    assert_eq!(left.art_bottom(), 970);

    let rgba = thumb.canvas.to_rgba_image().unwrap();
    assert_eq!(rgba.get_pixel(127, 900).0, [255, 255, 255, 255]);
    assert_eq!(rgba.get_pixel(131, 900).0, [255, 0, 0, 255]);
}

#[test]
fn side_flags_swap_source_and_flip() {
    let (_tmp, ctx) = project(with_round_block(json!({
        "character_overrides": {
            "characters": {
                "Falco": {"right": {"use_other_side": true, "mirror": true, "offset_x": 40}}
            }
        }
    })));
    let mut engine = TextEngine::new();
    let thumb = render_thumbnail(&ctx, &mut engine, Path::new(DEFAULT_CHARACTER_DIR), &request())
        .unwrap();
    let right = &thumb.report.right;
    assert!(right.use_other_side);
    assert!(right.mirrored);
    assert!(right.path.ends_with("Falco/Default Left.png"));
    assert_eq!(right.placement.x, 1920 - 130 - 160 + 40);
}

#[test]
fn missing_text_block_and_character_are_errors() {
    let (_tmp, ctx) = project(json!({}));
    let mut engine = TextEngine::new();
    let err = render_thumbnail(&ctx, &mut engine, Path::new(DEFAULT_CHARACTER_DIR), &request())
        .unwrap_err();
    assert!(matches!(err, ThumbError::Config(_)));

    let (_tmp, ctx) = project(with_round_block(json!({})));
    let mut req = request();
    req.p2_character = "Kirby".to_owned();
    let err = render_thumbnail(&ctx, &mut engine, Path::new(DEFAULT_CHARACTER_DIR), &req)
        .unwrap_err();
    assert!(matches!(err, ThumbError::AssetNotFound(_)));
}

#[test]
fn missing_base_image_is_config_error() {
    let tmp = tempfile::tempdir().unwrap();
    let loaded =
        LoadedEvent::from_raw(tmp.path().join("event.json"), serde_json::Map::new()).unwrap();
    let err = EventContext::load(tmp.path(), loaded, Some("nope.png")).unwrap_err();
    assert!(matches!(err, ThumbError::Config(_)));
}
