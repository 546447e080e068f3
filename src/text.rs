pub(crate) mod normalize;
