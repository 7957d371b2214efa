use std::io;

/// Anything that can be written as the body of a frame.
pub trait Serialize {
    /// Appends the encoded body of `self` to `buf`.
    fn serialize(&self, buf: &mut Vec<u8>) -> io::Result<()>;
}
