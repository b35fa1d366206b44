use std::fs::File;
use std::path::Path;

use pcap_parser::{
    Block, LegacyPcapReader, Linktype, PcapBlockOwned, PcapError, PcapNGReader,
    traits::PcapReaderIterator,
};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::source::{DatagramSource, SourceError};

use super::error::CaptureError;
use super::layout;
use super::reader::{
    is_pcapng_magic, linktype_for_interface, pcapng_ts_to_seconds, read_magic_and_rewind,
    update_ts_bounds,
};
use super::udp::parse_udp_datagram;

/// Counters collected while replaying a capture.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaptureStats {
    /// Link-layer packets read from the file.
    pub packets_total: u64,
    /// UDP payloads handed to the dispatcher.
    pub datagrams: u64,
    /// Packets that were not UDP, failed to slice, or went to another port.
    pub skipped: u64,
    /// Seconds since the epoch of the first packet, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_ts: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_ts: Option<f64>,
}

/// Replays UDP payloads recorded in a PCAP or PCAPNG file.
pub struct CaptureDatagramSource {
    inner: PcapReader,
    port: Option<u16>,
    payload: Vec<u8>,
    stats: CaptureStats,
}

enum PcapReader {
    Legacy {
        reader: LegacyPcapReader<File>,
        linktype: Option<Linktype>,
    },
    Ng {
        reader: PcapNGReader<File>,
        linktypes: Vec<Linktype>,
    },
}

struct CapturedPacket {
    ts: f64,
    linktype: Linktype,
    data: Vec<u8>,
}

impl CaptureDatagramSource {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let file = File::open(path)?;
        let inner = create_reader(file)?;
        Ok(Self {
            inner,
            port: None,
            payload: Vec::new(),
            stats: CaptureStats::default(),
        })
    }

    /// Only yield datagrams sent to `port`.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn stats(&self) -> &CaptureStats {
        &self.stats
    }
}

impl DatagramSource for CaptureDatagramSource {
    fn next_datagram(&mut self) -> Result<Option<&[u8]>, SourceError> {
        while let Some(packet) = next_packet(&mut self.inner)? {
            self.stats.packets_total += 1;
            update_ts_bounds(&mut self.stats.first_ts, &mut self.stats.last_ts, packet.ts);

            let udp = match parse_udp_datagram(packet.linktype, &packet.data) {
                Ok(Some(udp)) => udp,
                Ok(None) => {
                    self.stats.skipped += 1;
                    continue;
                }
                Err(err) => {
                    trace!(%err, "skipping unparseable packet");
                    self.stats.skipped += 1;
                    continue;
                }
            };
            if self.port.is_some_and(|port| udp.dst.port() != port) {
                trace!(src = %udp.src, dst = %udp.dst, "datagram for another port skipped");
                self.stats.skipped += 1;
                continue;
            }

            self.payload.clear();
            self.payload.extend_from_slice(udp.payload);
            self.stats.datagrams += 1;
            return Ok(Some(&self.payload));
        }
        Ok(None)
    }
}

fn create_reader(mut file: File) -> Result<PcapReader, CaptureError> {
    let magic = read_magic_and_rewind(&mut file)?;
    let buffer = layout::PCAP_READER_BUFFER_SIZE;
    Ok(if is_pcapng_magic(&magic) {
        PcapReader::Ng {
            reader: PcapNGReader::new(buffer, file).map_err(pcap_error("pcapng reader init"))?,
            linktypes: Vec::new(),
        }
    } else {
        PcapReader::Legacy {
            reader: LegacyPcapReader::new(buffer, file).map_err(pcap_error("pcap reader init"))?,
            linktype: None,
        }
    })
}

fn next_packet(reader: &mut PcapReader) -> Result<Option<CapturedPacket>, CaptureError> {
    match reader {
        PcapReader::Legacy { reader, linktype } => next_block(reader, |block| match block {
            PcapBlockOwned::LegacyHeader(header) => {
                *linktype = Some(header.network);
                None
            }
            PcapBlockOwned::Legacy(packet) => Some(CapturedPacket {
                ts: packet.ts_sec as f64 + packet.ts_usec as f64 / 1e6,
                linktype: linktype.unwrap_or(Linktype::ETHERNET),
                data: packet.data.to_vec(),
            }),
            _ => None,
        }),
        PcapReader::Ng { reader, linktypes } => next_block(reader, |block| match block {
            PcapBlockOwned::NG(Block::InterfaceDescription(intf)) => {
                linktypes.push(intf.linktype);
                None
            }
            PcapBlockOwned::NG(Block::EnhancedPacket(packet)) => Some(CapturedPacket {
                ts: pcapng_ts_to_seconds(packet.ts_high, packet.ts_low),
                linktype: linktype_for_interface(linktypes, packet.if_id),
                data: packet.data.to_vec(),
            }),
            _ => None,
        }),
    }
}

/// Advance `reader` block by block until `visit` yields a packet or the
/// file ends. Short reads refill the buffer and retry.
fn next_block<R: PcapReaderIterator>(
    reader: &mut R,
    mut visit: impl FnMut(PcapBlockOwned<'_>) -> Option<CapturedPacket>,
) -> Result<Option<CapturedPacket>, CaptureError> {
    loop {
        match reader.next() {
            Ok((offset, block)) => {
                let packet = visit(block);
                reader.consume(offset);
                if packet.is_some() {
                    return Ok(packet);
                }
            }
            Err(PcapError::Eof) => return Ok(None),
            Err(PcapError::Incomplete(_)) => {
                reader.refill().map_err(pcap_error("capture refill"))?;
            }
            Err(err) => return Err(pcap_error("capture next block")(err)),
        }
    }
}

fn pcap_error<E: std::fmt::Display>(context: &'static str) -> impl FnOnce(E) -> CaptureError {
    move |err| CaptureError::Pcap {
        context,
        message: err.to_string(),
    }
}
