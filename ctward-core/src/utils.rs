pub(crate) mod codec;
pub(crate) mod u24;
pub(crate) mod vec;
