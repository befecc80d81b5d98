pub mod decode;
pub mod locator;
