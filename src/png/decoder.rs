use std::borrow::Cow;

use super::*;

/// Options for [`PngDecoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecoderOptions {
  /// Images wider than this are rejected before any image data is read.
  pub max_width: u32,
  /// Images taller than this are rejected before any image data is read.
  pub max_height: u32,
  /// Check each chunk's CRC.
  pub confirm_crc: bool,
  /// Allowed pixel transformations.
  pub capabilities: Capabilities,
}
impl Default for DecoderOptions {
  #[inline]
  fn default() -> Self {
    Self {
      max_width: 1 << 17,
      max_height: 1 << 17,
      confirm_crc: true,
      capabilities: Capabilities::all(),
    }
  }
}
impl DecoderOptions {
  /// Sets the maximum width.
  #[inline]
  #[must_use]
  pub const fn with_max_width(self, max_width: u32) -> Self {
    Self { max_width, ..self }
  }
  /// Sets the maximum height.
  #[inline]
  #[must_use]
  pub const fn with_max_height(self, max_height: u32) -> Self {
    Self { max_height, ..self }
  }
  /// Sets if CRCs are checked.
  #[inline]
  #[must_use]
  pub const fn with_confirm_crc(self, confirm_crc: bool) -> Self {
    Self { confirm_crc, ..self }
  }
  /// Sets the allowed pixel transformations.
  #[inline]
  #[must_use]
  pub const fn with_capabilities(self, capabilities: Capabilities) -> Self {
    Self { capabilities, ..self }
  }
}

/// The part of an image to decode.
///
/// The region is clipped to the image, so a region larger than the image is
/// fine, and a region entirely outside the image gives an empty block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecodeRegion {
  /// left edge
  pub src_x: u32,
  /// top edge
  pub src_y: u32,
  /// width in pixels
  pub width: u32,
  /// height in pixels
  pub height: u32,
}
impl DecodeRegion {
  /// A region.
  #[inline]
  #[must_use]
  pub const fn new(src_x: u32, src_y: u32, width: u32, height: u32) -> Self {
    Self { src_x, src_y, width, height }
  }

  /// The whole image, whatever its size.
  #[inline]
  #[must_use]
  pub const fn full() -> Self {
    Self::new(0, 0, u32::MAX, u32::MAX)
  }

  /// Clips the region to an image of the given size.
  ///
  /// Gives `None` when nothing of the image is inside the region.
  #[inline]
  #[must_use]
  pub fn clip(&self, image_width: u32, image_height: u32) -> Option<Self> {
    let width = self.width.min(image_width.checked_sub(self.src_x)?);
    let height = self.height.min(image_height.checked_sub(self.src_y)?);
    if width == 0 || height == 0 {
      None
    } else {
      Some(Self { width, height, ..*self })
    }
  }
}
impl Default for DecodeRegion {
  #[inline]
  fn default() -> Self {
    Self::full()
  }
}

/// Information about a decoded PNG stream.
#[derive(Debug, Clone, PartialEq)]
pub struct PngInfo {
  /// The image header.
  pub header: IHDR,
  /// The palette, if there was one.
  pub palette: Option<PLTE>,
  /// The transparency data, if there was any.
  pub transparency: Option<tRNS>,
  /// The file gamma, if given.
  pub gamma: Option<gAMA>,
  /// The sRGB rendering intent, if given.
  pub srgb: Option<SrgbIntent>,
  /// Text annotations, in stream order.
  pub text: TextAnnotations,
}

/// The output of a decode.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedPng {
  /// Stream information
  pub info: PngInfo,
  /// The decoded pixels of the requested region.
  pub block: PixelBlock<'static>,
}

/// Everything read from the chunks of one stream.
#[derive(Debug)]
struct DecodeSession {
  header: IHDR,
  palette: Option<PLTE>,
  trns: Option<tRNS>,
  gama: Option<gAMA>,
  srgb: Option<sRGB>,
  text: TextAnnotations,
  idat: Vec<Vec<u8>>,
}
impl DecodeSession {
  fn new(header: IHDR) -> Self {
    Self {
      header,
      palette: None,
      trns: None,
      gama: None,
      srgb: None,
      text: TextAnnotations::default(),
      idat: Vec::new(),
    }
  }

  /// Reads every chunk up to `IEND`, checking the chunk order.
  fn read_chunks<R: Read>(&mut self, reader: &mut PngChunkReader<R>) -> PngResult<()> {
    let mut last_was_idat = false;
    while let Some(chunk) = reader.next_chunk()? {
      let is_idat = chunk.type_() == PngRawChunkType::IDAT;
      if is_idat && !last_was_idat && !self.idat.is_empty() {
        return Err(PngError::MalformedChunkSequence("IDAT chunks are not consecutive"));
      }
      last_was_idat = is_idat;
      self.accept(chunk)?;
    }
    if self.idat.is_empty() {
      return Err(PngError::MalformedChunkSequence("no IDAT chunk"));
    }
    if self.header.color_type.is_palette() && self.palette.is_none() {
      return Err(PngError::MalformedChunkSequence("indexed color image without a PLTE chunk"));
    }
    Ok(())
  }

  fn accept(&mut self, chunk: PngRawChunk) -> PngResult<()> {
    let seen_idat = !self.idat.is_empty();
    let data = chunk.data();
    match chunk.type_() {
      PngRawChunkType::IHDR => {
        return Err(PngError::MalformedChunkSequence("more than one IHDR chunk"));
      }
      PngRawChunkType::IDAT => {
        trace!("IDAT: {} bytes", data.len());
        self.idat.push(chunk.data);
      }
      PngRawChunkType::PLTE => {
        if seen_idat {
          return Err(PngError::MalformedChunkSequence("PLTE after IDAT"));
        }
        if self.palette.is_some() {
          return Err(PngError::MalformedChunkSequence("more than one PLTE chunk"));
        }
        let plte = PLTE::try_from(data)?;
        trace!("{plte:?}");
        if self.header.color_type.has_color() {
          self.palette = Some(plte);
        } else {
          warn!("ignoring PLTE chunk in a grayscale image");
        }
      }
      ty @ (PngRawChunkType::tRNS | PngRawChunkType::gAMA | PngRawChunkType::sRGB)
        if seen_idat =>
      {
        warn!("ignoring {ty:?} chunk after IDAT");
      }
      PngRawChunkType::tRNS => match tRNS::parse(self.header.color_type, data) {
        Some(trns) => {
          trace!("{trns:?}");
          self.trns = Some(trns);
        }
        None => warn!("ignoring malformed tRNS chunk"),
      },
      PngRawChunkType::gAMA => match gAMA::try_from(data) {
        Ok(gama) => {
          trace!("{gama:?}");
          self.gama = Some(gama);
        }
        Err(e) => warn!("ignoring gAMA chunk: {e}"),
      },
      PngRawChunkType::sRGB => match sRGB::try_from(data) {
        Ok(srgb) => {
          trace!("{srgb:?}");
          self.srgb = Some(srgb);
        }
        Err(e) => warn!("ignoring sRGB chunk: {e}"),
      },
      PngRawChunkType::tEXt => match TextAnnotation::parse_tEXt(data) {
        Some(text) => self.text.push(text),
        None => warn!("ignoring malformed tEXt chunk"),
      },
      PngRawChunkType::zTXt => match TextAnnotation::parse_zTXt(data) {
        Some(text) => self.text.push(text),
        None => warn!("ignoring malformed zTXt chunk"),
      },
      other if other.is_critical() => {
        trace!("skipping unknown critical chunk {other:?} ({} bytes)", data.len());
      }
      other => {
        trace!("skipping {other:?} chunk ({} bytes)", data.len());
      }
    }
    Ok(())
  }

  fn into_info(self) -> PngInfo {
    PngInfo {
      header: self.header,
      palette: self.palette,
      transparency: self.trns,
      gamma: self.gama,
      srgb: self.srgb.map(|s| s.0),
      text: self.text,
    }
  }
}

/// Decodes a PNG stream from a byte source.
///
/// ```no_run
/// # use pngblock::png::*;
/// # fn main() -> Result<(), pngblock::PngError> {
/// let file = std::fs::File::open("image.png").map_err(pngblock::PngError::TruncatedRead)?;
/// let decoded = PngDecoder::new(std::io::BufReader::new(file))
///   .decode_region(DecodeRegion::new(10, 10, 64, 64))?;
/// println!("{}x{}", decoded.block.width, decoded.block.height);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct PngDecoder<R> {
  reader: PngChunkReader<R>,
  options: DecoderOptions,
}
impl<R: Read> PngDecoder<R> {
  /// Makes a decoder with the default options.
  #[inline]
  pub fn new(source: R) -> Self {
    Self::new_with_options(source, DecoderOptions::default())
  }

  /// Makes a decoder with the given options.
  #[inline]
  pub fn new_with_options(source: R, options: DecoderOptions) -> Self {
    Self { reader: PngChunkReader::new(source).with_crc_check(options.confirm_crc), options }
  }

  /// Decodes the whole image.
  #[inline]
  pub fn decode(self) -> PngResult<DecodedPng> {
    self.decode_region(DecodeRegion::full())
  }

  /// Decodes part of the image.
  ///
  /// The region is clipped to the image first. If nothing is left the decode
  /// succeeds right away with an empty block, and the rest of the stream isn't
  /// read.
  ///
  /// ## Failure
  /// Any error stops the decode, and no pixels are given back. The byte source
  /// is left wherever the error happened.
  pub fn decode_region(mut self, region: DecodeRegion) -> PngResult<DecodedPng> {
    self.reader.read_signature()?;
    let header = self.reader.read_header()?;
    debug!("{header:?}");
    if header.width > self.options.max_width || header.height > self.options.max_height {
      return Err(PngError::DimensionsTooLarge { width: header.width, height: header.height });
    }
    let mut session = DecodeSession::new(header);
    let region = match region.clip(header.width, header.height) {
      Some(region) => region,
      None => {
        debug!("{region:?} is outside of the image, nothing to decode");
        return Ok(DecodedPng { info: session.into_info(), block: PixelBlock::default() });
      }
    };
    session.read_chunks(&mut self.reader)?;
    let block = decode_pixels(&session, region, self.options.capabilities)?;
    Ok(DecodedPng { info: session.into_info(), block })
  }

  /// Gives back the byte source.
  #[inline]
  pub fn into_inner(self) -> R {
    self.reader.into_inner()
  }
}

/// Inflates, unfilters, and normalizes the image data of a session into a
/// block of the region.
fn decode_pixels(
  session: &DecodeSession, region: DecodeRegion, caps: Capabilities,
) -> PngResult<PixelBlock<'static>> {
  let header = session.header;
  let layout = OutputLayout::for_image(&header, session.trns.is_some(), caps)?;
  debug!("output layout: {layout:?}");

  let zlib_len = header.get_zlib_decompression_requirement();
  let mut filtered = inflate_image_data(session.idat.iter().map(Vec::as_slice), zlib_len)?;

  // the full image, rows addressed by offset
  let too_large = || PngError::DimensionsTooLarge { width: header.width, height: header.height };
  let full_pitch = (header.width as usize).checked_mul(layout.pixel_size).ok_or_else(too_large)?;
  let full_len = full_pitch.checked_mul(header.height as usize).ok_or_else(too_large)?;
  let mut full: Vec<u8> = Vec::new();
  full.try_reserve_exact(full_len).map_err(|_| too_large())?;
  full.resize(full_len, 0);

  let palette = session.palette.as_ref();
  let palette_len = palette.map_or(0, |plte| plte.entries().len());
  let normalizer = PixelNormalizer::new(header, layout, palette, session.trns.as_ref());
  let pixel_size = layout.pixel_size;
  let mut excess_indices = 0_usize;
  unfilter_decompressed_data(&header, &mut filtered, |x, y, data| {
    if header.color_type.is_palette() && usize::from(data[0]) >= palette_len {
      excess_indices += 1;
    }
    let start = y as usize * full_pitch + x as usize * pixel_size;
    normalizer.normalize(data, &mut full[start..start + pixel_size]);
  })?;
  drop(filtered);
  if excess_indices > 0 {
    warn!("{excess_indices} pixels index past the end of the palette, drawn as black");
  }

  if let Some(exponent) = gamma_exponent(session.srgb, session.gama, caps) {
    debug!("gamma exponent: {exponent}");
    GammaCorrection::new(exponent).apply(&mut full, &layout);
  }

  let (pitch, pixels) = if region.width == header.width && region.height == header.height {
    (full_pitch, full)
  } else {
    debug!("cropping to {region:?}");
    let pitch = region.width as usize * pixel_size;
    let mut cropped = Vec::with_capacity(pitch * region.height as usize);
    for y in region.src_y..region.src_y + region.height {
      let start = y as usize * full_pitch + region.src_x as usize * pixel_size;
      cropped.extend_from_slice(&full[start..start + pitch]);
    }
    (pitch, cropped)
  };
  Ok(PixelBlock {
    width: region.width,
    height: region.height,
    pitch,
    pixel_size,
    offset: layout.offset,
    pixels: Cow::Owned(pixels),
  })
}

/// Decodes a whole PNG from a byte source with the default options.
#[inline]
pub fn decode_png<R: Read>(source: R) -> PngResult<DecodedPng> {
  PngDecoder::new(source).decode()
}

/// Decodes a whole PNG held in memory with the default options.
#[inline]
pub fn decode_png_bytes(bytes: &[u8]) -> PngResult<DecodedPng> {
  decode_png(bytes)
}
