//! The inbound channel clients deposit envelopes into.

use std::path::Path;

use async_trait::async_trait;
use tokio::fs::File;
use tokio::io::AsyncReadExt;

use crate::error::ChannelError;

/// Something the dispatcher can drain on every poll.
#[async_trait]
pub trait InboundSource: Send {
    /// Append every byte currently available to `buf` and return how many
    /// were read. Zero means nothing arrived since the last drain.
    async fn drain(&mut self, buf: &mut Vec<u8>) -> Result<usize, ChannelError>;
}

/// A file (normally a named pipe) read until end-of-file on each drain.
///
/// Opening a named pipe blocks until a writer shows up. After that, every
/// drain returns whatever writers produced since the previous one.
#[derive(Debug)]
pub struct FileSource {
    file: File,
}

impl FileSource {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, ChannelError> {
        let path = path.as_ref();
        let file = File::open(path)
            .await
            .map_err(|source| ChannelError::OpenFailed {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self { file })
    }
}

#[async_trait]
impl InboundSource for FileSource {
    async fn drain(&mut self, buf: &mut Vec<u8>) -> Result<usize, ChannelError> {
        Ok(self.file.read_to_end(buf).await?)
    }
}
