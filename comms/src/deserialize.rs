use std::io;

/// Anything that can be read back from the body of a frame.
pub trait Deserialize: Sized {
    fn deserialize(buf: &[u8]) -> io::Result<Self>;
}
