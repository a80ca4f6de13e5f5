//! IPv4 / TCP packet crafting for SYN scanning.
//!
//! Headers are encoded to and decoded from byte buffers field by field in
//! network byte order; nothing here reinterprets memory as a header.
//!
//! # Layouts (no options)
//!
//! IPv4, 20 bytes:
//!
//! | offset | width | field                          |
//! |--------|-------|--------------------------------|
//! | 0      | 1     | version (high 4 bits), IHL     |
//! | 1      | 1     | type of service                |
//! | 2      | 2     | total length                   |
//! | 4      | 2     | identification                 |
//! | 6      | 2     | flags (3 bits), fragment offset|
//! | 8      | 1     | TTL                            |
//! | 9      | 1     | protocol                       |
//! | 10     | 2     | header checksum                |
//! | 12     | 4     | source address                 |
//! | 16     | 4     | destination address            |
//!
//! TCP, 20 bytes:
//!
//! | offset | width | field                          |
//! |--------|-------|--------------------------------|
//! | 0      | 2     | source port                    |
//! | 2      | 2     | destination port               |
//! | 4      | 4     | sequence number                |
//! | 8      | 4     | acknowledgement number         |
//! | 12     | 1     | data offset (high 4 bits)      |
//! | 13     | 1     | flags (CWR..FIN)               |
//! | 14     | 2     | window                         |
//! | 16     | 2     | checksum                       |
//! | 18     | 2     | urgent pointer                 |
//!
//! The TCP checksum covers a 12-byte pseudo-header (source, destination,
//! zero, protocol, TCP length) followed by the TCP header. The
//! pseudo-header is never transmitted.

use std::fmt;
use std::net::Ipv4Addr;

/// IPv4 header length without options.
pub const IPV4_HEADER_LEN: usize = 20;
/// TCP header length without options.
pub const TCP_HEADER_LEN: usize = 20;
/// Pseudo-header length used for the TCP checksum.
pub const PSEUDO_HEADER_LEN: usize = 12;
/// IP protocol number for TCP.
pub const IPPROTO_TCP: u8 = 6;

/// Fixed source port of outgoing SYN probes.
pub const SYN_SOURCE_PORT: u16 = 12345;
/// Fixed sequence number of outgoing SYN probes.
pub const SYN_SEQUENCE: u32 = 1_105_024_978;
/// IP identification of outgoing SYN probes.
pub const SYN_IDENTIFICATION: u16 = 54321;
/// TTL of outgoing SYN probes.
pub const SYN_TTL: u8 = 255;
/// Advertised window of outgoing SYN probes.
pub const SYN_WINDOW: u16 = 5840;

/// TCP control flags (byte 13 of the TCP header).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TcpFlags(pub u8);

impl TcpFlags {
    pub const FIN: Self = Self(0x01);
    pub const SYN: Self = Self(0x02);
    pub const RST: Self = Self(0x04);
    pub const PSH: Self = Self(0x08);
    pub const ACK: Self = Self(0x10);
    pub const URG: Self = Self(0x20);

    /// Check whether every bit of `other` is set.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Union of two flag sets.
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// SYN and ACK both set: the target accepted the half-open handshake.
    pub const fn is_syn_ack(self) -> bool {
        self.contains(Self::SYN.union(Self::ACK))
    }

    /// RST set: the target refused the connection.
    pub const fn is_rst(self) -> bool {
        self.contains(Self::RST)
    }
}

impl fmt::Display for TcpFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            (Self::URG, "URG"),
            (Self::ACK, "ACK"),
            (Self::PSH, "PSH"),
            (Self::RST, "RST"),
            (Self::SYN, "SYN"),
            (Self::FIN, "FIN"),
        ];
        let set: Vec<&str> = names
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        write!(f, "{}", set.join("|"))
    }
}

/// An IPv4 header without options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ipv4Header {
    /// Header length in 32-bit words.
    pub ihl: u8,
    pub tos: u8,
    pub total_length: u16,
    pub identification: u16,
    /// Flags (top 3 bits) and fragment offset.
    pub flags_fragment: u16,
    pub ttl: u8,
    pub protocol: u8,
    pub checksum: u16,
    pub source: Ipv4Addr,
    pub destination: Ipv4Addr,
}

impl Ipv4Header {
    /// Serialize to wire order. The checksum field is written as stored.
    pub fn encode(&self) -> [u8; IPV4_HEADER_LEN] {
        let mut bytes = [0u8; IPV4_HEADER_LEN];
        bytes[0] = (4 << 4) | (self.ihl & 0x0f);
        bytes[1] = self.tos;
        bytes[2..4].copy_from_slice(&self.total_length.to_be_bytes());
        bytes[4..6].copy_from_slice(&self.identification.to_be_bytes());
        bytes[6..8].copy_from_slice(&self.flags_fragment.to_be_bytes());
        bytes[8] = self.ttl;
        bytes[9] = self.protocol;
        bytes[10..12].copy_from_slice(&self.checksum.to_be_bytes());
        bytes[12..16].copy_from_slice(&self.source.octets());
        bytes[16..20].copy_from_slice(&self.destination.octets());
        bytes
    }

    /// Parse the fixed part of an IPv4 header.
    ///
    /// Returns `None` for short buffers, non-IPv4 versions or an IHL below
    /// five words.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < IPV4_HEADER_LEN || bytes[0] >> 4 != 4 {
            return None;
        }
        let ihl = bytes[0] & 0x0f;
        if ihl < 5 {
            return None;
        }

        Some(Self {
            ihl,
            tos: bytes[1],
            total_length: u16::from_be_bytes([bytes[2], bytes[3]]),
            identification: u16::from_be_bytes([bytes[4], bytes[5]]),
            flags_fragment: u16::from_be_bytes([bytes[6], bytes[7]]),
            ttl: bytes[8],
            protocol: bytes[9],
            checksum: u16::from_be_bytes([bytes[10], bytes[11]]),
            source: Ipv4Addr::new(bytes[12], bytes[13], bytes[14], bytes[15]),
            destination: Ipv4Addr::new(bytes[16], bytes[17], bytes[18], bytes[19]),
        })
    }

    /// Header length in bytes, including options.
    pub fn header_len(&self) -> usize {
        usize::from(self.ihl) * 4
    }

    /// Fill in the header checksum.
    pub fn with_checksum(mut self) -> Self {
        self.checksum = 0;
        self.checksum = internet_checksum(&self.encode());
        self
    }
}

/// A TCP header without options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TcpHeader {
    pub source_port: u16,
    pub destination_port: u16,
    pub sequence: u32,
    pub acknowledgement: u32,
    /// Header length in 32-bit words.
    pub data_offset: u8,
    pub flags: TcpFlags,
    pub window: u16,
    pub checksum: u16,
    pub urgent_ptr: u16,
}

impl TcpHeader {
    /// Serialize to wire order. The checksum field is written as stored.
    pub fn encode(&self) -> [u8; TCP_HEADER_LEN] {
        let mut bytes = [0u8; TCP_HEADER_LEN];
        bytes[0..2].copy_from_slice(&self.source_port.to_be_bytes());
        bytes[2..4].copy_from_slice(&self.destination_port.to_be_bytes());
        bytes[4..8].copy_from_slice(&self.sequence.to_be_bytes());
        bytes[8..12].copy_from_slice(&self.acknowledgement.to_be_bytes());
        bytes[12] = (self.data_offset & 0x0f) << 4;
        bytes[13] = self.flags.0;
        bytes[14..16].copy_from_slice(&self.window.to_be_bytes());
        bytes[16..18].copy_from_slice(&self.checksum.to_be_bytes());
        bytes[18..20].copy_from_slice(&self.urgent_ptr.to_be_bytes());
        bytes
    }

    /// Parse the fixed part of a TCP header.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < TCP_HEADER_LEN {
            return None;
        }

        Some(Self {
            source_port: u16::from_be_bytes([bytes[0], bytes[1]]),
            destination_port: u16::from_be_bytes([bytes[2], bytes[3]]),
            sequence: u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
            acknowledgement: u32::from_be_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]),
            data_offset: bytes[12] >> 4,
            flags: TcpFlags(bytes[13]),
            window: u16::from_be_bytes([bytes[14], bytes[15]]),
            checksum: u16::from_be_bytes([bytes[16], bytes[17]]),
            urgent_ptr: u16::from_be_bytes([bytes[18], bytes[19]]),
        })
    }

    /// Fill in the checksum over the pseudo-header and this header.
    pub fn with_checksum(mut self, source: Ipv4Addr, destination: Ipv4Addr) -> Self {
        self.checksum = 0;
        self.checksum = segment_checksum(
            source,
            destination,
            TCP_HEADER_LEN as u16,
            &self.encode(),
        );
        self
    }
}

/// 16-bit one's-complement Internet checksum (RFC 1071).
///
/// Words are read big-endian; an odd trailing byte is padded with zero.
pub fn internet_checksum(data: &[u8]) -> u16 {
    let mut sum: u64 = 0;
    let mut chunks = data.chunks_exact(2);
    for word in &mut chunks {
        sum += u64::from(u16::from_be_bytes([word[0], word[1]]));
    }
    if let [last] = chunks.remainder() {
        sum += u64::from(*last) << 8;
    }

    while sum >> 16 != 0 {
        sum = (sum & 0xffff) + (sum >> 16);
    }
    !(sum as u16)
}

/// Encode the TCP pseudo-header.
pub fn pseudo_header(
    source: Ipv4Addr,
    destination: Ipv4Addr,
    protocol: u8,
    segment_len: u16,
) -> [u8; PSEUDO_HEADER_LEN] {
    let mut bytes = [0u8; PSEUDO_HEADER_LEN];
    bytes[0..4].copy_from_slice(&source.octets());
    bytes[4..8].copy_from_slice(&destination.octets());
    bytes[8] = 0;
    bytes[9] = protocol;
    bytes[10..12].copy_from_slice(&segment_len.to_be_bytes());
    bytes
}

/// Checksum of a TCP segment (header plus payload) for the given endpoints.
///
/// Returns `None` if the segment is too long for the pseudo-header's
/// 16-bit length field.
pub fn tcp_checksum(source: Ipv4Addr, destination: Ipv4Addr, segment: &[u8]) -> Option<u16> {
    let segment_len = u16::try_from(segment.len()).ok()?;
    Some(segment_checksum(source, destination, segment_len, segment))
}

fn segment_checksum(
    source: Ipv4Addr,
    destination: Ipv4Addr,
    segment_len: u16,
    segment: &[u8],
) -> u16 {
    let mut buf = Vec::with_capacity(PSEUDO_HEADER_LEN + segment.len());
    buf.extend_from_slice(&pseudo_header(source, destination, IPPROTO_TCP, segment_len));
    buf.extend_from_slice(segment);
    internet_checksum(&buf)
}

/// Build a complete IPv4 + TCP SYN datagram for an `IP_HDRINCL` socket.
pub fn build_syn_packet(
    source: Ipv4Addr,
    destination: Ipv4Addr,
    destination_port: u16,
) -> [u8; IPV4_HEADER_LEN + TCP_HEADER_LEN] {
    let ip = Ipv4Header {
        ihl: 5,
        tos: 0,
        total_length: (IPV4_HEADER_LEN + TCP_HEADER_LEN) as u16,
        identification: SYN_IDENTIFICATION,
        flags_fragment: 0,
        ttl: SYN_TTL,
        protocol: IPPROTO_TCP,
        checksum: 0,
        source,
        destination,
    }
    .with_checksum();

    let tcp = TcpHeader {
        source_port: SYN_SOURCE_PORT,
        destination_port,
        sequence: SYN_SEQUENCE,
        acknowledgement: 0,
        data_offset: 5,
        flags: TcpFlags::SYN,
        window: SYN_WINDOW,
        checksum: 0,
        urgent_ptr: 0,
    }
    .with_checksum(source, destination);

    let mut packet = [0u8; IPV4_HEADER_LEN + TCP_HEADER_LEN];
    packet[..IPV4_HEADER_LEN].copy_from_slice(&ip.encode());
    packet[IPV4_HEADER_LEN..].copy_from_slice(&tcp.encode());
    packet
}

/// The parts of a received IPv4 + TCP frame a SYN scan cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TcpReply {
    pub source: Ipv4Addr,
    pub destination: Ipv4Addr,
    pub source_port: u16,
    pub destination_port: u16,
    pub flags: TcpFlags,
}

impl TcpReply {
    /// Decode a raw frame as read from a raw IPv4/TCP socket.
    ///
    /// The IHL field locates the TCP header, so frames carrying IP options
    /// are handled. Returns `None` for anything that is not IPv4 + TCP or
    /// is truncated.
    pub fn parse(frame: &[u8]) -> Option<Self> {
        let ip = Ipv4Header::decode(frame)?;
        if ip.protocol != IPPROTO_TCP {
            return None;
        }
        let tcp = TcpHeader::decode(frame.get(ip.header_len()..)?)?;

        Some(Self {
            source: ip.source,
            destination: ip.destination,
            source_port: tcp.source_port,
            destination_port: tcp.destination_port,
            flags: tcp.flags,
        })
    }
}
