pub(crate) mod garment;
pub(crate) mod geometry;
pub(crate) mod interaction;
pub(crate) mod schedule;
pub(crate) mod session;
