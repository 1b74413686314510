pub(crate) mod draw;
pub(crate) mod fit;
pub(crate) mod surface;
