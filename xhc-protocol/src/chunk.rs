//! Chunk reassembly for host → pendant reports.
//!
//! The host splits each 37-byte output report into 7-byte chunks and sends
//! them one feature report at a time. Chunks carry no sequence number, so the
//! assembler relies on a single rule: a chunk that starts with the magic
//! marker always restarts assembly at offset 0.
//!
//! Chunk stream for one report:
//! ```text
//! [FE FD day ....] [.......] [.......] [.......] [.......] [....pad]
//!  0               7         14        21        28        35      42
//! ```
//!
//! Malformed streams are never reported as errors. A chunk that would overflow
//! the buffer drops the partial report and the assembler waits for the next
//! marker.

use crate::report::{OutputReport, OUTPUT_REPORT_LEN};
use crate::MAGIC;

/// Chunk size delivered by the host
pub const CHUNK_SIZE: usize = 7;

/// Assembly buffer capacity (six chunks)
pub const ASSEMBLY_CAPACITY: usize = 6 * CHUNK_SIZE;

/// One fixed-size chunk as delivered by the transport
pub type RawChunk = [u8; CHUNK_SIZE];

/// Returns true if `chunk` begins with the little-endian magic marker
pub fn starts_with_magic(chunk: &[u8]) -> bool {
    chunk.len() >= 2 && u16::from_le_bytes([chunk[0], chunk[1]]) == MAGIC
}

/// State machine that turns a chunk stream into output reports
///
/// Bytes 37..42 of the buffer are padding from the last chunk and are never
/// interpreted.
#[derive(Debug, Clone)]
pub struct ChunkAssembler {
    buffer: [u8; ASSEMBLY_CAPACITY],
    cursor: usize,
    state: AssemblyState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum AssemblyState {
    /// Waiting for a chunk that starts with the magic marker
    WaitingForMagic,
    /// Appending chunks after a marker
    Collecting,
}

impl Default for ChunkAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl ChunkAssembler {
    /// Create a new assembler waiting for a marker
    pub const fn new() -> Self {
        Self {
            buffer: [0; ASSEMBLY_CAPACITY],
            cursor: 0,
            state: AssemblyState::WaitingForMagic,
        }
    }

    /// Drop any partial report and wait for the next marker
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.state = AssemblyState::WaitingForMagic;
    }

    /// True while a report is being collected
    pub fn is_collecting(&self) -> bool {
        self.state == AssemblyState::Collecting
    }

    /// Bytes collected for the current report
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Feed one chunk to the assembler
    ///
    /// Returns the decoded report once 37 bytes have been collected since the
    /// last marker.
    pub fn feed(&mut self, chunk: &[u8]) -> Option<OutputReport> {
        if starts_with_magic(chunk) {
            #[cfg(feature = "defmt")]
            if self.is_collecting() {
                defmt::debug!("resync: dropping {} partial bytes", self.cursor);
            }
            self.cursor = 0;
            self.state = AssemblyState::Collecting;
        }

        match self.state {
            AssemblyState::WaitingForMagic => {
                // Silently ignore chunks until the next marker
                None
            }
            AssemblyState::Collecting => {
                let end = self.cursor + chunk.len();
                if end > ASSEMBLY_CAPACITY {
                    #[cfg(feature = "defmt")]
                    defmt::warn!(
                        "chunk overflows assembly buffer at {}, waiting for magic",
                        self.cursor
                    );
                    self.reset();
                    return None;
                }

                self.buffer[self.cursor..end].copy_from_slice(chunk);
                self.cursor = end;

                if self.cursor < OUTPUT_REPORT_LEN {
                    return None;
                }

                let mut bytes = [0u8; OUTPUT_REPORT_LEN];
                bytes.copy_from_slice(&self.buffer[..OUTPUT_REPORT_LEN]);
                self.reset();
                Some(OutputReport::decode(&bytes))
            }
        }
    }

    /// Feed a contiguous byte stream, split into fixed-size chunks
    ///
    /// Returns the last report completed by the stream, if any. A trailing
    /// short chunk is fed as-is.
    pub fn feed_stream(&mut self, bytes: &[u8]) -> Option<OutputReport> {
        let mut last = None;
        for chunk in bytes.chunks(CHUNK_SIZE) {
            if let Some(report) = self.feed(chunk) {
                last = Some(report);
            }
        }
        last
    }
}
