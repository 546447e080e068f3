pub(crate) mod cancel;
pub(crate) mod ffmpeg;
pub(crate) mod slot;
