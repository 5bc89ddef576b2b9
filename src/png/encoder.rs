use super::*;

/// How the encoder lays out the image data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum InterlaceMethod {
  /// Rows top to bottom.
  None,
  /// The 7 Adam7 passes.
  #[default]
  Adam7,
}

/// Options for [`PngEncoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EncoderOptions {
  /// Interlacing of the written image.
  pub interlace: InterlaceMethod,
  /// How each scanline's filter is picked.
  pub filter: FilterStrategy,
  /// zlib compression level, `0` to `10`.
  pub compression_level: u8,
}
impl Default for EncoderOptions {
  #[inline]
  fn default() -> Self {
    Self {
      interlace: InterlaceMethod::Adam7,
      filter: FilterStrategy::default(),
      compression_level: 6,
    }
  }
}
impl EncoderOptions {
  /// Sets the interlace method.
  #[inline]
  #[must_use]
  pub const fn with_interlace(self, interlace: InterlaceMethod) -> Self {
    Self { interlace, ..self }
  }
  /// Sets the filter strategy.
  #[inline]
  #[must_use]
  pub const fn with_filter(self, filter: FilterStrategy) -> Self {
    Self { filter, ..self }
  }
  /// Sets the compression level (clamped to `10`).
  #[inline]
  #[must_use]
  pub const fn with_compression_level(self, level: u8) -> Self {
    let compression_level = if level > 10 { 10 } else { level };
    Self { compression_level, ..self }
  }
}

/// Writes pixel blocks as PNG streams to a byte sink.
///
/// The written image is always 8 bits per channel, grayscale or RGB, with an
/// alpha channel if the block has one (see [`EncodeLayout::derive`]). A `gAMA`
/// chunk of 1.0 is always written.
///
/// If an error happens partway through, the sink may hold a partial stream.
/// Cleaning that up is up to the caller.
#[derive(Debug)]
pub struct PngEncoder<W> {
  sink: W,
  options: EncoderOptions,
}
impl<W: Write> PngEncoder<W> {
  /// Makes an encoder with the default options.
  #[inline]
  pub fn new(sink: W) -> Self {
    Self::new_with_options(sink, EncoderOptions::default())
  }

  /// Makes an encoder with the given options.
  #[inline]
  pub fn new_with_options(sink: W, options: EncoderOptions) -> Self {
    Self { sink, options }
  }

  /// Gives back the byte sink.
  #[inline]
  pub fn into_inner(self) -> W {
    self.sink
  }

  /// Writes one complete PNG stream.
  ///
  /// ## Failure
  /// * The block is inconsistent ([`InvalidPixelBlock`](PngError::InvalidPixelBlock)).
  ///   This is found before anything is written.
  /// * The sink refuses a write ([`ShortWrite`](PngError::ShortWrite)).
  pub fn encode(&mut self, block: &PixelBlock<'_>, text: &TextAnnotations) -> PngResult<()> {
    let layout = EncodeLayout::derive(block)?;
    let header = IHDR {
      width: block.width,
      height: block.height,
      bit_depth: 8,
      color_type: layout.color_type,
      is_interlaced: self.options.interlace == InterlaceMethod::Adam7,
    };
    let text_chunks = text
      .iter()
      .map(|t| t.to_chunk(self.options.compression_level))
      .collect::<PngResult<Vec<_>>>()?;
    let packed = PackedPixels::from_block(block, &layout);
    let filtered = filter_image(&header, &packed, self.options.filter);
    let compressed = deflate_image_data(&filtered, self.options.compression_level);
    drop(filtered);

    let sink = &mut self.sink;
    write_signature(sink)?;
    write_chunk(sink, PngRawChunkType::IHDR, &header.to_chunk_data())?;
    write_chunk(sink, PngRawChunkType::gAMA, &gAMA::IDENTITY.to_chunk_data())?;
    for (chunk_ty, data) in &text_chunks {
      write_chunk(sink, *chunk_ty, data)?;
    }
    for idat in compressed.chunks(IDAT_CHUNK_SIZE) {
      write_chunk(sink, PngRawChunkType::IDAT, idat)?;
    }
    write_chunk(sink, PngRawChunkType::IEND, &[])?;
    sink.flush().map_err(PngError::ShortWrite)
  }
}

/// Filters every scanline of every pass, giving the data to be compressed.
fn filter_image(header: &IHDR, packed: &PackedPixels<'_>, strategy: FilterStrategy) -> Vec<u8> {
  let bpp = header.filter_chunk_size();
  let mut out = Vec::with_capacity(header.get_zlib_decompression_requirement());
  let mut line = Vec::new();
  let mut prev_line = Vec::new();
  for pass in image_passes(header.width, header.height, header.is_interlaced) {
    trace!("filtering image level {}: {}x{}", pass.image_level, pass.width, pass.height);
    prev_line.clear();
    for reduced_y in 0..pass.height {
      line.clear();
      for reduced_x in 0..pass.width {
        let (x, y) = pass.full_pos(reduced_x, reduced_y);
        line.extend_from_slice(packed.pixel(x, y));
      }
      filter_line_with_strategy(strategy, bpp, &prev_line, &line, &mut out);
      core::mem::swap(&mut line, &mut prev_line);
    }
  }
  out
}

/// Writes a PNG stream to a byte sink with the default options.
#[inline]
pub fn encode_png<W: Write>(
  sink: W, block: &PixelBlock<'_>, text: &TextAnnotations,
) -> PngResult<()> {
  PngEncoder::new(sink).encode(block, text)
}

/// Writes a PNG stream into a new `Vec` with the default options.
#[inline]
pub fn encode_png_to_vec(block: &PixelBlock<'_>, text: &TextAnnotations) -> PngResult<Vec<u8>> {
  let mut out = Vec::new();
  encode_png(&mut out, block, text)?;
  Ok(out)
}
