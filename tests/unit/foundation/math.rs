use super::*;

#[test]
fn mul_div255_variants_align() {
    for x in [0u16, 1, 127, 255] {
        for y in [0u16, 1, 127, 255] {
            assert_eq!(u16::from(mul_div255_u8(x, y)), mul_div255_u16(x, y));
        }
    }
}

#[test]
fn premultiply_zeroes_transparent_color() {
    let mut px = [200u8, 100, 50, 0, 200, 100, 50, 255];
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(px, [0, 0, 0, 0, 200, 100, 50, 255]);
}

#[test]
fn unpremultiply_restores_half_alpha_color() {
    let mut px = [100u8, 50, 200, 128];
    premultiply_rgba8_in_place(&mut px);
    unpremultiply_rgba8_in_place(&mut px);
    for (got, want) in px.iter().zip([100u8, 50, 200, 128]) {
        assert!((i16::from(*got) - i16::from(want)).abs() <= 1);
    }
}

#[test]
fn over_opaque_source_replaces_destination() {
    assert_eq!(
        premul_over_px([10, 20, 30, 255], [1, 2, 3, 255]),
        [1, 2, 3, 255]
    );
    assert_eq!(
        premul_over_px([10, 20, 30, 255], [0, 0, 0, 0]),
        [10, 20, 30, 255]
    );
}
