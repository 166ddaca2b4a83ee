pub(crate) mod executor;
pub(crate) mod tiles;
