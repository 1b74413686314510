pub(crate) mod decode;
pub(crate) mod loader;
pub(crate) mod preload;
pub(crate) mod sequence;
