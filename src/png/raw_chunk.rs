use core::fmt::{Debug, Write as _};

use super::*;

/// The first eight bytes of a PNG datastream should match these bytes.
pub const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Chunk lengths are limited to `2^31 - 1` bytes.
pub const MAX_CHUNK_LEN: u32 = (1 << 31) - 1;

// Chunk data buffers are pre-sized from the declared length, up to this much.
// Past this we let the buffer grow as the bytes actually arrive, so that a
// bogus length can't make us allocate gigabytes up front.
const PRESIZE_LIMIT: usize = 1 << 20;

/// The four byte type tag of a chunk.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct PngRawChunkType(pub [u8; 4]);
#[allow(nonstandard_style)]
impl PngRawChunkType {
  /// Image header
  pub const IHDR: Self = Self(*b"IHDR");
  /// Palette
  pub const PLTE: Self = Self(*b"PLTE");
  /// Image data
  pub const IDAT: Self = Self(*b"IDAT");
  /// Image trailer
  pub const IEND: Self = Self(*b"IEND");
  /// Transparency
  pub const tRNS: Self = Self(*b"tRNS");
  /// Image gamma
  pub const gAMA: Self = Self(*b"gAMA");
  /// Standard RGB color space
  pub const sRGB: Self = Self(*b"sRGB");
  /// Latin-1 text
  pub const tEXt: Self = Self(*b"tEXt");
  /// Compressed Latin-1 text
  pub const zTXt: Self = Self(*b"zTXt");

  /// Critical chunks have an uppercase first letter (bit 5 clear).
  #[inline]
  #[must_use]
  pub const fn is_critical(self) -> bool {
    (self.0[0] & (1 << 5)) == 0
  }
}
impl Debug for PngRawChunkType {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.write_char(self.0[0] as char)?;
    f.write_char(self.0[1] as char)?;
    f.write_char(self.0[2] as char)?;
    f.write_char(self.0[3] as char)?;
    Ok(())
  }
}

/// An unparsed chunk read from a PNG byte source.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PngRawChunk {
  pub(crate) type_: PngRawChunkType,
  pub(crate) data: Vec<u8>,
  pub(crate) declared_crc: u32,
}
impl Debug for PngRawChunk {
  #[inline]
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("PngRawChunk")
      .field("type_", &self.type_)
      .field("data", &(&self.data[..self.data.len().min(12)], self.data.len()))
      .field("declared_crc", &self.declared_crc)
      .finish()
  }
}
impl PngRawChunk {
  /// The chunk's type tag.
  #[inline]
  #[must_use]
  pub const fn type_(&self) -> PngRawChunkType {
    self.type_
  }
  /// The chunk's data bytes.
  #[inline]
  #[must_use]
  pub fn data(&self) -> &[u8] {
    &self.data
  }
  /// The CRC stored in the datastream for this chunk.
  #[inline]
  #[must_use]
  pub const fn declared_crc(&self) -> u32 {
    self.declared_crc
  }
  /// The CRC that the chunk's type and data actually have.
  #[inline]
  #[must_use]
  pub fn compute_actual_crc(&self) -> u32 {
    png_chunk_crc(self.type_.0, &self.data)
  }
}

#[inline]
fn read_exact_or_truncated<R: Read>(source: &mut R, buf: &mut [u8]) -> PngResult<()> {
  source.read_exact(buf).map_err(PngError::TruncatedRead)
}

#[inline]
fn write_all_or_short<W: Write>(sink: &mut W, buf: &[u8]) -> PngResult<()> {
  sink.write_all(buf).map_err(PngError::ShortWrite)
}

/// Reads successive chunks from a PNG byte source.
///
/// The reader stops at the `IEND` chunk: after that [`next_chunk`] keeps
/// returning `Ok(None)` without touching the source again.
///
/// [`next_chunk`]: PngChunkReader::next_chunk
#[derive(Debug)]
pub struct PngChunkReader<R> {
  source: R,
  confirm_crc: bool,
  saw_end: bool,
}
impl<R: Read> PngChunkReader<R> {
  /// Wraps a byte source. CRC checking is on.
  #[inline]
  #[must_use]
  pub fn new(source: R) -> Self {
    Self { source, confirm_crc: true, saw_end: false }
  }

  /// Turns CRC checking on or off.
  #[inline]
  #[must_use]
  pub fn with_crc_check(mut self, confirm_crc: bool) -> Self {
    self.confirm_crc = confirm_crc;
    self
  }

  /// Gives back the byte source.
  #[inline]
  #[must_use]
  pub fn into_inner(self) -> R {
    self.source
  }

  /// Reads and checks the 8 byte PNG signature.
  pub fn read_signature(&mut self) -> PngResult<()> {
    let mut signature = [0_u8; 8];
    match self.source.read_exact(&mut signature) {
      Ok(()) if signature == PNG_SIGNATURE => Ok(()),
      Ok(()) => Err(PngError::NotAPng),
      // too short to even be a signature
      Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Err(PngError::NotAPng),
      Err(e) => Err(PngError::TruncatedRead(e)),
    }
  }

  /// Reads the first chunk, which must be the `IHDR` chunk.
  ///
  /// A first chunk of any other type means this isn't PNG data.
  pub fn read_header(&mut self) -> PngResult<IHDR> {
    let (length, chunk_ty) = self.read_length_and_type()?;
    if chunk_ty != PngRawChunkType::IHDR {
      return Err(PngError::NotAPng);
    }
    if length != 13 {
      return Err(PngError::MalformedChunkSequence("IHDR chunk length is not 13"));
    }
    let chunk = self.read_data_and_crc(length, chunk_ty)?;
    let ihdr = IHDR::try_from(chunk.data())?;
    debug!("{ihdr:?}");
    Ok(ihdr)
  }

  /// Reads the next chunk.
  ///
  /// Gives `Ok(None)` once the `IEND` chunk has been read.
  pub fn next_chunk(&mut self) -> PngResult<Option<PngRawChunk>> {
    if self.saw_end {
      return Ok(None);
    }
    let (length, chunk_ty) = self.read_length_and_type()?;
    let chunk = self.read_data_and_crc(length, chunk_ty)?;
    if chunk.type_ == PngRawChunkType::IEND {
      if !chunk.data.is_empty() {
        return Err(PngError::MalformedChunkSequence("IEND chunk has data"));
      }
      self.saw_end = true;
      return Ok(None);
    }
    Ok(Some(chunk))
  }

  fn read_length_and_type(&mut self) -> PngResult<(u32, PngRawChunkType)> {
    let mut buf = [0_u8; 8];
    read_exact_or_truncated(&mut self.source, &mut buf)?;
    let [l0, l1, l2, l3, t0, t1, t2, t3] = buf;
    let length = u32::from_be_bytes([l0, l1, l2, l3]);
    let chunk_ty = PngRawChunkType([t0, t1, t2, t3]);
    if length > MAX_CHUNK_LEN {
      return Err(PngError::MalformedChunkSequence("chunk length exceeds 2^31-1"));
    }
    trace!("chunk {chunk_ty:?}, {length} bytes");
    Ok((length, chunk_ty))
  }

  fn read_data_and_crc(&mut self, length: u32, chunk_ty: PngRawChunkType) -> PngResult<PngRawChunk> {
    let length = length as usize;
    let mut data = Vec::with_capacity(length.min(PRESIZE_LIMIT));
    let got = (&mut self.source)
      .take(length as u64)
      .read_to_end(&mut data)
      .map_err(PngError::TruncatedRead)?;
    if got != length {
      return Err(PngError::TruncatedRead(std::io::ErrorKind::UnexpectedEof.into()));
    }
    let mut crc_bytes = [0_u8; 4];
    read_exact_or_truncated(&mut self.source, &mut crc_bytes)?;
    let chunk = PngRawChunk { type_: chunk_ty, data, declared_crc: u32::from_be_bytes(crc_bytes) };
    if self.confirm_crc {
      let computed = chunk.compute_actual_crc();
      if computed != chunk.declared_crc {
        return Err(PngError::CrcMismatch {
          chunk: chunk_ty,
          declared: chunk.declared_crc,
          computed,
        });
      }
    }
    Ok(chunk)
  }
}

/// Reads the signature and the image header from a byte source.
///
/// ## Failure
/// * [`PngError::NotAPng`] if the signature is wrong or the first chunk isn't
///   an `IHDR`.
/// * Any error of [`PngChunkReader::read_header`].
pub fn read_signature_and_header<R: Read>(source: &mut R) -> PngResult<IHDR> {
  let mut reader = PngChunkReader::new(source);
  reader.read_signature()?;
  reader.read_header()
}

/// Checks if a byte source starts with a PNG signature and header chunk.
///
/// On success gives the `(width, height)` of the image.
///
/// This reads exactly 24 bytes (signature, first chunk's length and type,
/// width, height) and never more. Any short read or mismatch is just `None`,
/// never an error.
pub fn png_match<R: Read>(mut source: R) -> Option<(u32, u32)> {
  let mut buf = [0_u8; 24];
  source.read_exact(&mut buf).ok()?;
  match buf {
    [137, 80, 78, 71, 13, 10, 26, 10, _, _, _, _, b'I', b'H', b'D', b'R', w0, w1, w2, w3, h0, h1, h2, h3] => {
      Some((u32::from_be_bytes([w0, w1, w2, w3]), u32::from_be_bytes([h0, h1, h2, h3])))
    }
    _ => None,
  }
}

/// Writes one chunk: length, type, data, then the CRC of type and data.
pub fn write_chunk<W: Write>(
  sink: &mut W, chunk_ty: PngRawChunkType, data: &[u8],
) -> PngResult<()> {
  let length = match u32::try_from(data.len()) {
    Ok(length) if length <= MAX_CHUNK_LEN => length,
    _ => return Err(PngError::MalformedChunkSequence("chunk length exceeds 2^31-1")),
  };
  trace!("writing chunk {chunk_ty:?}, {length} bytes");
  write_all_or_short(sink, &length.to_be_bytes())?;
  write_all_or_short(sink, &chunk_ty.0)?;
  write_all_or_short(sink, data)?;
  write_all_or_short(sink, &png_chunk_crc(chunk_ty.0, data).to_be_bytes())
}

/// Writes the 8 byte PNG signature.
#[inline]
pub fn write_signature<W: Write>(sink: &mut W) -> PngResult<()> {
  write_all_or_short(sink, &PNG_SIGNATURE)
}

#[cfg(test)]
mod raw_chunk_tests {
  use super::*;

  fn chunk_bytes(chunk_ty: PngRawChunkType, data: &[u8]) -> Vec<u8> {
    let mut v = Vec::new();
    write_chunk(&mut v, chunk_ty, data).unwrap();
    v
  }

  #[test]
  fn test_write_then_read_chunk() {
    let mut bytes = chunk_bytes(PngRawChunkType::tEXt, b"Title\0hello");
    bytes.extend(chunk_bytes(PngRawChunkType::IEND, &[]));
    assert_eq!(&bytes[..8], &[0, 0, 0, 11, b't', b'E', b'X', b't']);
    let mut reader = PngChunkReader::new(&bytes[..]);
    let chunk = reader.next_chunk().unwrap().unwrap();
    assert_eq!(chunk.type_(), PngRawChunkType::tEXt);
    assert_eq!(chunk.data(), b"Title\0hello");
    assert_eq!(chunk.declared_crc(), chunk.compute_actual_crc());
    assert!(reader.next_chunk().unwrap().is_none());
    assert!(reader.next_chunk().unwrap().is_none());
  }

  #[test]
  fn test_crc_mismatch_is_reported() {
    let mut bytes = chunk_bytes(PngRawChunkType::gAMA, &100_000_u32.to_be_bytes());
    let last = bytes.len() - 1;
    bytes[last] ^= 0xFF;
    let mut reader = PngChunkReader::new(&bytes[..]);
    assert!(matches!(
      reader.next_chunk(),
      Err(PngError::CrcMismatch { chunk: PngRawChunkType::gAMA, .. })
    ));
    // and with checking off, the same bytes are fine
    let mut reader = PngChunkReader::new(&bytes[..]).with_crc_check(false);
    assert!(reader.next_chunk().unwrap().is_some());
  }

  #[test]
  fn test_truncated_chunk_data() {
    let bytes = chunk_bytes(PngRawChunkType::IDAT, &[1, 2, 3, 4, 5, 6]);
    let mut reader = PngChunkReader::new(&bytes[..10]);
    assert!(matches!(reader.next_chunk(), Err(PngError::TruncatedRead(_))));
  }

  #[test]
  fn test_iend_with_data_is_malformed() {
    let bytes = chunk_bytes(PngRawChunkType::IEND, &[0]);
    let mut reader = PngChunkReader::new(&bytes[..]);
    assert!(matches!(reader.next_chunk(), Err(PngError::MalformedChunkSequence(_))));
  }

  #[test]
  fn test_oversized_length_is_malformed() {
    let bytes = [0xFF, 0xFF, 0xFF, 0xFF, b'I', b'D', b'A', b'T'];
    let mut reader = PngChunkReader::new(&bytes[..]);
    assert!(matches!(reader.next_chunk(), Err(PngError::MalformedChunkSequence(_))));
  }

  #[test]
  fn test_chunk_criticality() {
    for ty in [
      PngRawChunkType::IHDR,
      PngRawChunkType::PLTE,
      PngRawChunkType::IDAT,
      PngRawChunkType::IEND,
      PngRawChunkType(*b"ABCD"),
    ] {
      assert!(ty.is_critical(), "{ty:?}");
    }
    for ty in [PngRawChunkType::tRNS, PngRawChunkType::gAMA, PngRawChunkType::tEXt] {
      assert!(!ty.is_critical(), "{ty:?}");
    }
  }

  #[test]
  fn test_png_match_reads_24_bytes() {
    let mut bytes = PNG_SIGNATURE.to_vec();
    bytes.extend(chunk_bytes(PngRawChunkType::IHDR, &[0, 0, 1, 0, 0, 0, 0, 3, 8, 0, 0, 0, 0]));
    let mut source = &bytes[..];
    assert_eq!(png_match(&mut source), Some((256, 3)));
    assert_eq!(source.len(), bytes.len() - 24);
    // wrong signature, or wrong first chunk
    let mut bad = bytes.clone();
    bad[1] = b'X';
    assert_eq!(png_match(&bad[..]), None);
    let mut bad = bytes.clone();
    bad[12] = b'i';
    assert_eq!(png_match(&bad[..]), None);
    // truncated anywhere
    for len in 0..24 {
      assert_eq!(png_match(&bytes[..len]), None);
    }
  }
}
