use super::*;

#[test]
fn design_canvas_has_unit_scale() {
    let g = CanvasGeometry::new(1920, 1080).unwrap();
    assert_eq!(g.scale_x, 1.0);
    assert_eq!(g.scale_y, 1.0);
    assert_eq!(g.border(), 50);
    assert_eq!(g.margin_x(), 80);
    assert_eq!(g.margin_y(), 60);
    assert_eq!(g.character_box(), (760, 680));
}

#[test]
fn half_size_canvas_scales_constants() {
    let g = CanvasGeometry::new(960, 540).unwrap();
    assert_eq!(g.border(), 25);
    assert_eq!(g.margin_x(), 40);
    assert_eq!(g.margin_y(), 30);
}

#[test]
fn scale_value_rounds_ties_to_even() {
    assert_eq!(scale_value(5, 0.5), 2);
    assert_eq!(scale_value(7, 0.5), 4);
    assert_eq!(scale_value(-5, 0.5), -2);
    assert_eq!(scale_value(10, 1.26), 13);
}

#[test]
fn empty_canvas_is_rejected() {
    assert!(CanvasGeometry::new(0, 1080).is_err());
}

#[test]
fn side_parse_and_opposite() {
    assert_eq!(Side::parse("LEFT").unwrap(), Side::Left);
    assert_eq!(Side::parse(" right ").unwrap(), Side::Right);
    assert!(Side::parse("middle").is_err());
    assert_eq!(Side::Left.opposite(), Side::Right);
    assert_eq!(Side::Right.label(), "Right");
}
