//! Binary macaroon decoding.
//!
//! lnd writes `admin.macaroon` in the V2 binary layout; older tooling produced
//! V1 packets. Both are parsed into a [`Macaroon`] so a corrupt or truncated
//! file is caught at startup. Signatures are NOT verified here, the daemon
//! does that on every call.

use thiserror::Error;

const V2_VERSION: u8 = 0x02;

const FIELD_EOS: u64 = 0;
const FIELD_LOCATION: u64 = 1;
const FIELD_IDENTIFIER: u64 = 2;
const FIELD_VID: u64 = 4;
const FIELD_SIGNATURE: u64 = 6;

const SIGNATURE_LEN: usize = 32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MacaroonError {
    #[error("macaroon is empty")]
    Empty,
    #[error("unexpected end of macaroon data")]
    Truncated,
    #[error("unsupported macaroon format")]
    UnknownFormat,
    #[error("unexpected field type {0}")]
    UnexpectedField(u64),
    #[error("field length overflows")]
    BadLength,
    #[error("missing identifier")]
    MissingIdentifier,
    #[error("signature has {0} bytes, expected 32")]
    BadSignature(usize),
    #[error("malformed v1 packet: {0}")]
    BadPacket(&'static str),
    #[error("trailing bytes after signature")]
    TrailingData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacaroonVersion {
    V1,
    V2,
}

/// A first or third party caveat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caveat {
    pub id: Vec<u8>,
    /// Only present on third party caveats.
    pub verification_id: Option<Vec<u8>>,
    pub location: Option<String>,
}

/// Decoded macaroon. `raw` is kept untouched because lnd wants the exact
/// serialization back in the `macaroon` header.
#[derive(Clone, PartialEq, Eq)]
pub struct Macaroon {
    pub version: MacaroonVersion,
    pub location: Option<String>,
    pub identifier: Vec<u8>,
    pub caveats: Vec<Caveat>,
    pub signature: [u8; SIGNATURE_LEN],
    raw: Vec<u8>,
}

// Bearer credential: keep it out of logs.
impl std::fmt::Debug for Macaroon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Macaroon")
            .field("version", &self.version)
            .field("location", &self.location)
            .field("caveats", &self.caveats.len())
            .finish_non_exhaustive()
    }
}

impl Macaroon {
    /// Decode a binary macaroon, V2 or V1.
    pub fn from_binary(data: &[u8]) -> Result<Self, MacaroonError> {
        match data.first() {
            None => Err(MacaroonError::Empty),
            Some(&V2_VERSION) => decode_v2(data),
            Some(b) if b.is_ascii_hexdigit() => decode_v1(data),
            Some(_) => Err(MacaroonError::UnknownFormat),
        }
    }

    /// The serialization as read from disk.
    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }

    /// Hex form sent in the per-call `macaroon` metadata header.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.raw)
    }
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn is_empty(&self) -> bool {
        self.pos >= self.buf.len()
    }

    fn peek(&self) -> Option<u8> {
        self.buf.get(self.pos).copied()
    }

    fn byte(&mut self) -> Result<u8, MacaroonError> {
        let b = self.peek().ok_or(MacaroonError::Truncated)?;
        self.pos += 1;
        Ok(b)
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], MacaroonError> {
        let end = self.pos.checked_add(n).ok_or(MacaroonError::BadLength)?;
        let out = self.buf.get(self.pos..end).ok_or(MacaroonError::Truncated)?;
        self.pos = end;
        Ok(out)
    }

    /// Unsigned LEB128, at most 64 bits.
    fn uvarint(&mut self) -> Result<u64, MacaroonError> {
        let mut value = 0u64;
        for shift in (0..64).step_by(7) {
            let b = self.byte()?;
            value |= u64::from(b & 0x7f) << shift;
            if b & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(MacaroonError::BadLength)
    }

    /// Read one `(type, len, data)` field. EOS has no length or data.
    fn field(&mut self) -> Result<(u64, &'a [u8]), MacaroonError> {
        let kind = self.uvarint()?;
        if kind == FIELD_EOS {
            return Ok((FIELD_EOS, &[][..]));
        }
        let len = usize::try_from(self.uvarint()?).map_err(|_| MacaroonError::BadLength)?;
        Ok((kind, self.take(len)?))
    }
}

/// One section of V2 fields up to EOS, as `(location, identifier, vid)`.
type V2Section = (Option<String>, Option<Vec<u8>>, Option<Vec<u8>>);

fn read_section(r: &mut Reader<'_>, allow_vid: bool) -> Result<V2Section, MacaroonError> {
    let mut location = None;
    let mut id = None;
    let mut vid = None;
    loop {
        let (kind, data) = r.field()?;
        match kind {
            FIELD_EOS => return Ok((location, id, vid)),
            FIELD_LOCATION if location.is_none() && id.is_none() => {
                location = Some(String::from_utf8_lossy(data).into_owned());
            }
            FIELD_IDENTIFIER if id.is_none() => id = Some(data.to_vec()),
            FIELD_VID if allow_vid && id.is_some() && vid.is_none() => vid = Some(data.to_vec()),
            other => return Err(MacaroonError::UnexpectedField(other)),
        }
    }
}

fn decode_v2(data: &[u8]) -> Result<Macaroon, MacaroonError> {
    let mut r = Reader::new(data);
    r.byte()?;

    let (location, identifier, _) = read_section(&mut r, false)?;
    let identifier = identifier.ok_or(MacaroonError::MissingIdentifier)?;

    let mut caveats = Vec::new();
    loop {
        // an empty section closes the caveat list
        if r.peek().ok_or(MacaroonError::Truncated)? == FIELD_EOS as u8 {
            r.byte()?;
            break;
        }
        let (location, id, verification_id) = read_section(&mut r, true)?;
        let id = id.ok_or(MacaroonError::MissingIdentifier)?;
        caveats.push(Caveat { id, verification_id, location });
    }

    let (kind, sig) = r.field()?;
    if kind != FIELD_SIGNATURE {
        return Err(MacaroonError::UnexpectedField(kind));
    }
    let signature: [u8; SIGNATURE_LEN] =
        sig.try_into().map_err(|_| MacaroonError::BadSignature(sig.len()))?;
    if !r.is_empty() {
        return Err(MacaroonError::TrailingData);
    }

    Ok(Macaroon {
        version: MacaroonVersion::V2,
        location,
        identifier,
        caveats,
        signature,
        raw: data.to_vec(),
    })
}

fn decode_v1(data: &[u8]) -> Result<Macaroon, MacaroonError> {
    let mut r = Reader::new(data);
    let mut location = None;
    let mut identifier = None;
    let mut caveats: Vec<Caveat> = Vec::new();
    let mut signature = None;

    while !r.is_empty() {
        if signature.is_some() {
            return Err(MacaroonError::TrailingData);
        }
        let len_hex = r.take(4)?;
        let len_str = std::str::from_utf8(len_hex).map_err(|_| MacaroonError::BadPacket("length"))?;
        let len = usize::from_str_radix(len_str, 16).map_err(|_| MacaroonError::BadPacket("length"))?;
        // the length counts its own four header bytes
        let body_len = len.checked_sub(4).ok_or(MacaroonError::BadPacket("length"))?;
        let body = r.take(body_len)?;
        let body = body.strip_suffix(b"\n").ok_or(MacaroonError::BadPacket("missing newline"))?;
        let split = body
            .iter()
            .position(|&b| b == b' ')
            .ok_or(MacaroonError::BadPacket("missing key separator"))?;
        let (key, value) = (&body[..split], &body[split + 1..]);

        match key {
            b"location" if identifier.is_none() => {
                location = Some(String::from_utf8_lossy(value).into_owned());
            }
            b"identifier" if identifier.is_none() => identifier = Some(value.to_vec()),
            b"cid" if identifier.is_some() => caveats.push(Caveat {
                id: value.to_vec(),
                verification_id: None,
                location: None,
            }),
            b"vid" => match caveats.last_mut() {
                Some(c) if c.verification_id.is_none() => c.verification_id = Some(value.to_vec()),
                _ => return Err(MacaroonError::BadPacket("vid without caveat")),
            },
            b"cl" => match caveats.last_mut() {
                Some(c) if c.location.is_none() => {
                    c.location = Some(String::from_utf8_lossy(value).into_owned())
                }
                _ => return Err(MacaroonError::BadPacket("cl without caveat")),
            },
            b"signature" => {
                let sig: [u8; SIGNATURE_LEN] = value
                    .try_into()
                    .map_err(|_| MacaroonError::BadSignature(value.len()))?;
                signature = Some(sig);
            }
            _ => return Err(MacaroonError::BadPacket("unexpected key")),
        }
    }

    Ok(Macaroon {
        version: MacaroonVersion::V1,
        location,
        identifier: identifier.ok_or(MacaroonError::MissingIdentifier)?,
        caveats,
        signature: signature.ok_or(MacaroonError::Truncated)?,
        raw: data.to_vec(),
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    fn push_field(out: &mut Vec<u8>, kind: u8, data: &[u8]) {
        out.push(kind);
        assert!(data.len() < 0x80);
        out.push(data.len() as u8);
        out.extend_from_slice(data);
    }

    /// V2 macaroon shaped like the ones lnd bakes.
    pub(crate) fn sample_v2() -> Vec<u8> {
        let mut m = vec![V2_VERSION];
        push_field(&mut m, 1, b"lnd");
        push_field(&mut m, 2, b"\x03\x01admin-root-key-id");
        m.push(0);
        push_field(&mut m, 2, b"time-before 2030-01-01T00:00:00Z");
        m.push(0);
        push_field(&mut m, 1, b"https://auth.example");
        push_field(&mut m, 2, b"third-party-id");
        push_field(&mut m, 4, &[7u8; 16]);
        m.push(0);
        m.push(0);
        push_field(&mut m, 6, &[0xab; 32]);
        m
    }

    fn packet(key: &str, value: &[u8]) -> Vec<u8> {
        let len = 4 + key.len() + 1 + value.len() + 1;
        let mut p = format!("{:04x}{} ", len, key).into_bytes();
        p.extend_from_slice(value);
        p.push(b'\n');
        p
    }

    #[test]
    fn decodes_v2() {
        let raw = sample_v2();
        let mac = Macaroon::from_binary(&raw).unwrap();
        assert_eq!(mac.version, MacaroonVersion::V2);
        assert_eq!(mac.location.as_deref(), Some("lnd"));
        assert_eq!(mac.identifier, b"\x03\x01admin-root-key-id");
        assert_eq!(mac.caveats.len(), 2);
        assert_eq!(mac.caveats[0].verification_id, None);
        assert_eq!(mac.caveats[1].location.as_deref(), Some("https://auth.example"));
        assert_eq!(mac.caveats[1].verification_id.as_deref(), Some(&[7u8; 16][..]));
        assert_eq!(mac.signature, [0xab; 32]);
        assert_eq!(mac.as_bytes(), &raw[..]);
        assert_eq!(mac.to_hex(), hex::encode(&raw));
    }

    #[test]
    fn decodes_v2_without_caveats() {
        let mut m = vec![V2_VERSION];
        push_field(&mut m, 2, b"id");
        m.push(0);
        m.push(0);
        push_field(&mut m, 6, &[1; 32]);
        let mac = Macaroon::from_binary(&m).unwrap();
        assert!(mac.location.is_none());
        assert!(mac.caveats.is_empty());
    }

    #[test]
    fn rejects_truncated_v2() {
        let raw = sample_v2();
        for cut in [1, 5, raw.len() / 2, raw.len() - 1] {
            assert!(Macaroon::from_binary(&raw[..cut]).is_err(), "cut at {}", cut);
        }
    }

    #[test]
    fn rejects_short_signature_and_trailing_bytes() {
        let mut m = vec![V2_VERSION];
        push_field(&mut m, 2, b"id");
        m.push(0);
        m.push(0);
        push_field(&mut m, 6, &[1; 31]);
        assert_eq!(Macaroon::from_binary(&m), Err(MacaroonError::BadSignature(31)));

        let mut raw = sample_v2();
        raw.push(0x42);
        assert_eq!(Macaroon::from_binary(&raw), Err(MacaroonError::TrailingData));
    }

    #[test]
    fn rejects_missing_identifier_and_garbage() {
        let m = vec![V2_VERSION, 0, 0];
        assert_eq!(Macaroon::from_binary(&m), Err(MacaroonError::MissingIdentifier));
        assert_eq!(Macaroon::from_binary(&[]), Err(MacaroonError::Empty));
        assert_eq!(Macaroon::from_binary(b"\xff\xfe"), Err(MacaroonError::UnknownFormat));
        assert!(Macaroon::from_binary(b"not a macaroon").is_err());
    }

    #[test]
    fn decodes_v1() {
        let mut raw = Vec::new();
        raw.extend(packet("location", b"lnd"));
        raw.extend(packet("identifier", b"root"));
        raw.extend(packet("cid", b"ipaddr 127.0.0.1"));
        raw.extend(packet("cid", b"3rd"));
        raw.extend(packet("vid", b"vvvv"));
        raw.extend(packet("cl", b"remote"));
        raw.extend(packet("signature", &[9u8; 32]));

        let mac = Macaroon::from_binary(&raw).unwrap();
        assert_eq!(mac.version, MacaroonVersion::V1);
        assert_eq!(mac.identifier, b"root");
        assert_eq!(mac.caveats.len(), 2);
        assert_eq!(mac.caveats[1].location.as_deref(), Some("remote"));
        assert_eq!(mac.signature, [9u8; 32]);
    }

    #[test]
    fn rejects_v1_without_signature() {
        let mut raw = Vec::new();
        raw.extend(packet("identifier", b"root"));
        assert_eq!(Macaroon::from_binary(&raw), Err(MacaroonError::Truncated));
    }

    #[test]
    fn debug_hides_secret_material() {
        let mac = Macaroon::from_binary(&sample_v2()).unwrap();
        let dbg = format!("{:?}", mac);
        assert!(!dbg.contains("admin-root-key-id"));
        assert!(!dbg.contains(&hex::encode([0xab; 32])));
    }
}
