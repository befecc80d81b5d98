use super::*;

#[test]
fn default_build_has_every_codec() {
    let caps = Capabilities::probe().unwrap();
    assert!(caps.png_decode && caps.png_encode && caps.jpeg_decode && caps.jpeg_encode);
    assert!(caps.missing().is_empty());
}

#[test]
fn missing_lists_every_required_codec() {
    let caps = Capabilities {
        png_decode: true,
        png_encode: false,
        jpeg_decode: false,
        jpeg_encode: false,
    };
    assert_eq!(caps.missing(), vec!["png encode", "jpeg decode", "jpeg encode"]);

    let caps = Capabilities {
        jpeg_encode: false,
        ..Capabilities::detect()
    };
    assert_eq!(caps.missing(), vec!["jpeg encode"]);
}
