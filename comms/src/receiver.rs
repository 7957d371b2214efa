use std::io;

use tokio::io::{self as tokio_io, AsyncRead, AsyncReadExt};

use crate::{Deserialize, LEN_TYPE_SIZE, LenType, MAX_FRAME_LEN};

/// The receiving end handle of the communication.
pub struct FrameReceiver<R: AsyncRead + Unpin> {
    rx: R,
    buf: Vec<u8>,
}

impl<R: AsyncRead + Unpin> FrameReceiver<R> {
    /// Creates a new `FrameReceiver` instance.
    ///
    /// # Arguments
    /// * `rx` - The underlying reader.
    pub(super) fn new(rx: R) -> Self {
        Self {
            rx,
            buf: Vec::new(),
        }
    }

    /// Waits to receive a new frame from the inner reader and decodes it.
    ///
    /// # Returns
    /// A result object that returns `T` on success or `io::Error` on failure.
    /// A closed reader surfaces as `UnexpectedEof`, an oversized frame is
    /// skipped and reported as `InvalidData`.
    pub async fn recv<T: Deserialize>(&mut self) -> io::Result<T> {
        let mut size_buf = [0; LEN_TYPE_SIZE];
        self.rx.read_exact(&mut size_buf).await?;
        let len = LenType::from_be_bytes(size_buf);

        if len > MAX_FRAME_LEN as LenType {
            // Skip the body so the next frame still starts on a header.
            tokio_io::copy(&mut (&mut self.rx).take(len), &mut tokio_io::sink()).await?;

            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("announced frame of {len} bytes exceeds the {MAX_FRAME_LEN} bytes limit"),
            ));
        }

        self.buf.clear();
        self.buf.resize(len as usize, 0);
        self.rx.read_exact(&mut self.buf).await?;

        T::deserialize(&self.buf)
    }
}
