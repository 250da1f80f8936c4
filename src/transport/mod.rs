//! Byte sinks that packets are written to
//!
//! Anything implementing [`std::io::Write`] is a sink, which covers an opened
//! `serialport` handle as well as plain buffers. [`RecordingSink`] keeps each
//! packet with its send time so pacing can be checked without hardware, and
//! [`HexDumpSink`] prints packets for dry runs.

pub mod discovery;

use crate::controller::packet::Packet;
use std::io::{self, Write};
use std::time::Instant;
use tracing::debug;

/// Destination for encoded packets
pub trait ByteSink {
    /// Writes one complete packet. Failures are returned unchanged; no retry.
    fn send(&mut self, bytes: &[u8]) -> io::Result<()>;
}

impl<W: Write + ?Sized> ByteSink for W {
    fn send(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.write_all(bytes)?;
        self.flush()
    }
}

/// A packet captured by [`RecordingSink`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentPacket {
    pub bytes: Vec<u8>,
    pub sent_at: Instant,
}

/// In-memory sink recording every write
#[derive(Debug, Default)]
pub struct RecordingSink {
    packets: Vec<SentPacket>,
    fail_after: Option<usize>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts `count` packets, then fails every write like an unplugged device
    pub fn failing_after(count: usize) -> Self {
        Self {
            packets: Vec::new(),
            fail_after: Some(count),
        }
    }

    pub fn packets(&self) -> &[SentPacket] {
        &self.packets
    }

    pub fn bytes(&self) -> Vec<Vec<u8>> {
        self.packets.iter().map(|p| p.bytes.clone()).collect()
    }

    pub fn last(&self) -> Option<&[u8]> {
        self.packets.last().map(|p| p.bytes.as_slice())
    }

    pub fn len(&self) -> usize {
        self.packets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }
}

impl ByteSink for RecordingSink {
    fn send(&mut self, bytes: &[u8]) -> io::Result<()> {
        if self.fail_after.is_some_and(|limit| self.packets.len() >= limit) {
            return Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "recording sink disconnected",
            ));
        }
        self.packets.push(SentPacket {
            bytes: bytes.to_vec(),
            sent_at: Instant::now(),
        });
        Ok(())
    }
}

/// Prints each packet as a line of hex instead of sending it anywhere
#[derive(Debug)]
pub struct HexDumpSink<W: Write> {
    out: W,
    count: u64,
}

impl<W: Write> HexDumpSink<W> {
    pub fn new(out: W) -> Self {
        Self { out, count: 0 }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ByteSink for HexDumpSink<W> {
    fn send(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.count += 1;
        match Packet::decode(bytes) {
            Ok(state) => debug!(
                "Dry run packet {}: buttons={:?} dpad={}",
                self.count,
                state.pressed(),
                state.dpad
            ),
            Err(e) => debug!("Dry run packet {} not decodable: {}", self.count, e),
        }

        let line = bytes
            .iter()
            .map(|b| format!("{b:02X}"))
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(self.out, "{line}")?;
        self.out.flush()
    }
}
