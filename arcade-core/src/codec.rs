//! Byte-buffer compression of states.
//!
//! The replay buffer keeps every end-state compressed. A codec compresses into
//! a scratch buffer bounded by [`StateCodec::compress_bound`], and decompresses
//! straight into caller memory. Either direction reporting a non-positive byte
//! count is an error; no partially written data is handed out.
use crate::error::ArcadeError;
use anyhow::Result;
use lz4_flex::block;

/// Compression and decompression of byte buffers.
pub trait StateCodec {
    /// Worst-case size of the compressed form of `len` bytes.
    fn compress_bound(&self, len: usize) -> usize;

    /// Compresses `src` into `dst`, returning the number of bytes written.
    ///
    /// `dst` must be at least [`StateCodec::compress_bound`]`(src.len())` long.
    fn compress_into(&self, src: &[u8], dst: &mut [u8]) -> Result<usize>;

    /// Decompresses `src` into `dst`, returning the number of bytes written.
    fn decompress_into(&self, src: &[u8], dst: &mut [u8]) -> Result<usize>;

    /// Compresses `src` into a freshly allocated, tightly sized buffer.
    ///
    /// `scratch` is reused across calls to avoid allocating the worst-case
    /// buffer every time.
    fn compress(&self, src: &[u8], scratch: &mut Vec<u8>) -> Result<Box<[u8]>> {
        let bound = self.compress_bound(src.len());
        if scratch.len() < bound {
            scratch.resize(bound, 0);
        }
        let n = self.compress_into(src, &mut scratch[..bound])?;
        if n < 1 {
            return Err(ArcadeError::Compression("codec wrote no bytes".to_string()).into());
        }
        Ok(scratch[..n].to_vec().into_boxed_slice())
    }

    /// Decompresses `src` into `dst`, which must receive exactly `dst.len()` bytes.
    fn decompress(&self, src: &[u8], dst: &mut [u8]) -> Result<()> {
        let n = self.decompress_into(src, dst)?;
        if n < 1 || n != dst.len() {
            return Err(ArcadeError::Decompression {
                expected: dst.len(),
                actual: n,
            }
            .into());
        }
        Ok(())
    }
}

/// LZ4 block codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lz4Codec;

impl StateCodec for Lz4Codec {
    /// At least the classic LZ4 bound `len + len / 255 + 16`.
    fn compress_bound(&self, len: usize) -> usize {
        (len + len / 255 + 16).max(block::get_maximum_output_size(len))
    }

    fn compress_into(&self, src: &[u8], dst: &mut [u8]) -> Result<usize> {
        block::compress_into(src, dst).map_err(|e| ArcadeError::Compression(e.to_string()).into())
    }

    fn decompress_into(&self, src: &[u8], dst: &mut [u8]) -> Result<usize> {
        match block::decompress_into(src, dst) {
            Ok(n) => Ok(n),
            Err(e) => {
                log::debug!("LZ4 decompression failed: {}", e);
                Err(ArcadeError::Decompression {
                    expected: dst.len(),
                    actual: 0,
                }
                .into())
            }
        }
    }
}
