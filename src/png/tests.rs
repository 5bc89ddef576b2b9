use super::*;

#[test]
fn test_reduced_image_dimensions() {
  assert_eq!(reduced_image_dimensions(0, 0), [(0, 0); 8]);
  // one
  for (w, ex) in (1..=8).zip([1, 1, 1, 1, 1, 1, 1, 1]) {
    assert_eq!(reduced_image_dimensions(w, 0)[1].0, ex, "failed w:{w}");
  }
  for (h, ex) in (1..=8).zip([1, 1, 1, 1, 1, 1, 1, 1]) {
    assert_eq!(reduced_image_dimensions(0, h)[1].1, ex, "failed h:{h}");
  }
  // two
  for (w, ex) in (1..=8).zip([0, 0, 0, 0, 1, 1, 1, 1]) {
    assert_eq!(reduced_image_dimensions(w, 0)[2].0, ex, "failed w:{w}");
  }
  for (h, ex) in (1..=8).zip([1, 1, 1, 1, 1, 1, 1, 1]) {
    assert_eq!(reduced_image_dimensions(0, h)[2].1, ex, "failed h:{h}");
  }
  // three
  for (w, ex) in (1..=8).zip([1, 1, 1, 1, 2, 2, 2, 2]) {
    assert_eq!(reduced_image_dimensions(w, 0)[3].0, ex, "failed w: {w}");
  }
  for (h, ex) in (1..=8).zip([0, 0, 0, 0, 1, 1, 1, 1]) {
    assert_eq!(reduced_image_dimensions(0, h)[3].1, ex, "failed h: {h}");
  }
  // four
  for (w, ex) in (1..=8).zip([0, 0, 1, 1, 1, 1, 2, 2]) {
    assert_eq!(reduced_image_dimensions(w, 0)[4].0, ex, "failed w: {w}");
  }
  for (h, ex) in (1..=8).zip([1, 1, 1, 1, 2, 2, 2, 2]) {
    assert_eq!(reduced_image_dimensions(0, h)[4].1, ex, "failed h: {h}");
  }
  // five
  for (w, ex) in (1..=8).zip([1, 1, 2, 2, 3, 3, 4, 4]) {
    assert_eq!(reduced_image_dimensions(w, 0)[5].0, ex, "failed w: {w}");
  }
  for (h, ex) in (1..=8).zip([0, 0, 1, 1, 1, 1, 2, 2]) {
    assert_eq!(reduced_image_dimensions(0, h)[5].1, ex, "failed h: {h}");
  }
  // six
  for (w, ex) in (1..=8).zip([0, 1, 1, 2, 2, 3, 3, 4]) {
    assert_eq!(reduced_image_dimensions(w, 0)[6].0, ex, "failed w: {w}");
  }
  for (h, ex) in (1..=8).zip([1, 1, 2, 2, 3, 3, 4, 4]) {
    assert_eq!(reduced_image_dimensions(0, h)[6].1, ex, "failed h: {h}");
  }
  // seven
  for (w, ex) in (1..=8).zip([1, 2, 3, 4, 5, 6, 7, 8]) {
    assert_eq!(reduced_image_dimensions(w, 0)[7].0, ex, "failed w: {w}");
  }
  for (h, ex) in (1..=8).zip([0, 1, 1, 2, 2, 3, 3, 4]) {
    assert_eq!(reduced_image_dimensions(0, h)[7].1, ex, "failed h: {h}");
  }
  //
  assert_eq!(
    reduced_image_dimensions(8, 8),
    [
      (8, 8), // zeroth
      (1, 1), // one
      (1, 1), // two
      (2, 1), // three
      (2, 2), // four
      (4, 2), // five
      (4, 4), // six
      (8, 4), // seven
    ]
  );
}

#[test]
fn test_adam7_pass_geometry() {
  let total: u32 = image_passes(15, 15, true).map(|p| p.width * p.height).sum();
  assert_eq!(total, 225);
  //
  let passes: Vec<_> = image_passes(1, 1, true).collect();
  assert_eq!(passes.len(), 1);
  assert_eq!(passes[0].image_level, 1);
  assert_eq!((passes[0].geometry.x_start, passes[0].geometry.y_start), (0, 0));
  //
  let plain: Vec<_> = image_passes(15, 15, false).collect();
  assert_eq!(plain.len(), 1);
  assert_eq!((plain[0].width, plain[0].height), (15, 15));
  assert_eq!(plain[0].geometry, FULL_IMAGE_PASS);
  //
  // every pixel of a full image is hit exactly once
  let (w, h) = (13, 6);
  let mut hits = vec![0_u8; (w * h) as usize];
  for pass in image_passes(w, h, true) {
    for ry in 0..pass.height {
      for rx in 0..pass.width {
        let (x, y) = pass.full_pos(rx, ry);
        hits[(y * w + x) as usize] += 1;
      }
    }
  }
  assert!(hits.iter().all(|&n| n == 1));
  assert_eq!(interlaced_pos_to_full_pos(4, 1, 1), (6, 4));
  assert_eq!(interlaced_pos_to_full_pos(0, 3, 9), (3, 9));
}

/// Small deterministic noise for test data.
fn noise(seed: u32, len: usize) -> Vec<u8> {
  let mut state = seed.wrapping_mul(0x9E37_79B9) | 1;
  (0..len)
    .map(|_| {
      state ^= state << 13;
      state ^= state >> 17;
      state ^= state << 5;
      (state >> 24) as u8
    })
    .collect()
}

#[test]
fn test_filter_then_unfilter_is_identity() {
  for filter in FilterType::ALL {
    for bpp in [1, 2, 3, 4, 6, 8] {
      let line = noise(bpp as u32 * 7 + filter as u32, bpp * 5);
      for prev in [Vec::new(), noise(bpp as u32 + 100, bpp * 5)] {
        let mut filtered = vec![0; line.len()];
        filter_line(filter, bpp, &prev, &line, &mut filtered);
        unfilter_line(filter, bpp, &prev, &mut filtered);
        assert_eq!(filtered, line, "filter: {filter:?}, bpp: {bpp}");
      }
    }
  }
}

fn header(width: u32, height: u32, bit_depth: u8, color_type: PngColorType) -> IHDR {
  IHDR { width, height, bit_depth, color_type, is_interlaced: false }
}

fn chunk(ty: PngRawChunkType, data: &[u8]) -> (PngRawChunkType, Vec<u8>) {
  (ty, data.to_vec())
}

fn ihdr_chunk(h: IHDR) -> (PngRawChunkType, Vec<u8>) {
  chunk(PngRawChunkType::IHDR, &h.to_chunk_data())
}

fn idat_chunk(filtered: &[u8]) -> (PngRawChunkType, Vec<u8>) {
  (PngRawChunkType::IDAT, deflate_image_data(filtered, 6))
}

fn gama_identity() -> (PngRawChunkType, Vec<u8>) {
  chunk(PngRawChunkType::gAMA, &gAMA::IDENTITY.to_chunk_data())
}

/// Signature, the chunks, and `IEND`.
fn png_stream(chunks: &[(PngRawChunkType, Vec<u8>)]) -> Vec<u8> {
  let mut out = Vec::new();
  write_signature(&mut out).unwrap();
  for (ty, data) in chunks {
    write_chunk(&mut out, *ty, data).unwrap();
  }
  write_chunk(&mut out, PngRawChunkType::IEND, &[]).unwrap();
  out
}

#[test]
fn test_two_by_two_gray_round_trip() {
  let pixels = [10_u8, 10, 10, 10];
  let block = PixelBlock::borrowed(2, 2, 2, 1, [0, 0, 0, 0], &pixels);
  let bytes = encode_png_to_vec(&block, &TextAnnotations::default()).unwrap();
  assert_eq!(png_match(&bytes[..]), Some((2, 2)));
  let decoded = decode_png_bytes(&bytes).unwrap();
  assert_eq!(decoded.block.pixels.as_ref(), &pixels);
  assert_eq!(decoded.block.offset, [0, 0, 0, 0]);
  assert_eq!(decoded.block.pixel_size, 1);
  assert_eq!(decoded.block.pitch, 2);
  assert_eq!(decoded.info.header.color_type, PngColorType::Y);
  assert_eq!(decoded.info.header.bit_depth, 8);
  assert_eq!(decoded.info.gamma, Some(gAMA::IDENTITY));
}

#[test]
fn test_round_trip_every_layout() {
  let (w, h) = (13, 11);
  let data = noise(42, (w * h * 4) as usize);
  let blocks = [
    PixelBlock::gray8(w, h, &data),
    PixelBlock::borrowed(w, h, w as usize * 2, 2, [0, 0, 0, 1], &data),
    PixelBlock::rgb8(w, h, &data),
    PixelBlock::rgba8(w, h, &data),
  ];
  let option_sets = [
    EncoderOptions::default(),
    EncoderOptions::default().with_interlace(InterlaceMethod::None),
    EncoderOptions::default().with_filter(FilterStrategy::Adaptive),
    EncoderOptions::default()
      .with_interlace(InterlaceMethod::None)
      .with_filter(FilterStrategy::Fixed(FilterType::Paeth))
      .with_compression_level(1),
  ];
  for block in &blocks {
    for options in option_sets {
      let mut encoder = PngEncoder::new_with_options(Vec::new(), options);
      encoder.encode(block, &TextAnnotations::default()).unwrap();
      let bytes = encoder.into_inner();
      let decoded = decode_png_bytes(&bytes).unwrap().block;
      let len = block.pitch * h as usize;
      assert_eq!(decoded.pixels.as_ref(), &data[..len], "{options:?}");
      assert_eq!((decoded.pitch, decoded.pixel_size), (block.pitch, block.pixel_size));
      assert_eq!(decoded.offset, block.offset);
    }
  }
}

#[test]
fn test_round_trip_repacked_block() {
  // xRGB pixels in rows padded out to 16 bytes
  let (w, h) = (3, 2);
  let data = noise(7, 32);
  let block = PixelBlock::borrowed(w, h, 16, 4, [1, 2, 3, 0], &data);
  let bytes = encode_png_to_vec(&block, &Default::default()).unwrap();
  let decoded = decode_png_bytes(&bytes).unwrap();
  assert_eq!(decoded.block.offset, [0, 1, 2, 0]);
  for y in 0..h {
    for x in 0..w {
      assert_eq!(decoded.block.pixel(x, y), block.pixel(x, y).map(|p| &p[1..4]));
    }
  }
}

#[test]
fn test_crc_mismatch_fails_decode() {
  let pixels = [1, 2, 3, 4];
  let block = PixelBlock::gray8(2, 2, &pixels);
  let mut bytes = encode_png_to_vec(&block, &Default::default()).unwrap();
  // signature (8) + IHDR (25) + gAMA length, type, and data (12): the gAMA CRC
  assert_eq!(&bytes[37..41], b"gAMA");
  bytes[46] ^= 0xFF;
  match decode_png_bytes(&bytes) {
    Err(PngError::CrcMismatch { chunk, .. }) => assert_eq!(chunk, PngRawChunkType::gAMA),
    other => panic!("expected a CRC mismatch, got {other:?}"),
  }
  let unchecked = DecoderOptions::default().with_confirm_crc(false);
  let decoded = PngDecoder::new_with_options(&bytes[..], unchecked).decode().unwrap();
  assert_eq!(decoded.block.pixels.as_ref(), &pixels);
}

#[test]
fn test_cropped_decode() {
  let pixels: Vec<u8> = (0..16).collect();
  let bytes = encode_png_to_vec(&PixelBlock::gray8(4, 4, &pixels), &Default::default()).unwrap();
  let region =
    |x, y, w, h| PngDecoder::new(&bytes[..]).decode_region(DecodeRegion::new(x, y, w, h));
  //
  let part = region(1, 2, 2, 5).unwrap().block;
  assert_eq!((part.width, part.height, part.pitch), (2, 2, 2));
  assert_eq!(part.pixels.as_ref(), &[9, 10, 13, 14]);
  //
  for (x, y, w, h) in [(4, 0, 1, 1), (0, 4, 1, 1), (0, 0, 0, 3), (9, 9, 9, 9)] {
    let empty = region(x, y, w, h).unwrap();
    assert_eq!((empty.block.width, empty.block.height), (0, 0));
    assert!(empty.block.pixels.is_empty());
    assert_eq!(empty.info.header.width, 4);
  }
}

#[test]
fn test_decode_palette_with_transparency() {
  // indexes 0, 1, 2 at 2 bits per pixel
  let bytes = png_stream(&[
    ihdr_chunk(header(3, 1, 2, PngColorType::Index)),
    gama_identity(),
    chunk(PngRawChunkType::PLTE, &[10, 20, 30, 40, 50, 60, 70, 80, 90]),
    chunk(PngRawChunkType::tRNS, &[0, 128]),
    idat_chunk(&[0, 0b0001_1000]),
  ]);
  let decoded = decode_png_bytes(&bytes).unwrap();
  assert_eq!(decoded.block.offset, [0, 1, 2, 3]);
  assert_eq!(
    decoded.block.pixels.as_ref(),
    &[10, 20, 30, 0, 40, 50, 60, 128, 70, 80, 90, 255]
  );
  assert_eq!(decoded.info.palette.as_ref().map(|p| p.entries().len()), Some(3));
  assert_eq!(decoded.info.transparency, Some(tRNS::Index { alphas: vec![0, 128] }));
  //
  let no_expand = DecoderOptions::default()
    .with_capabilities(Capabilities { expand: false, ..Capabilities::all() });
  assert!(matches!(
    PngDecoder::new_with_options(&bytes[..], no_expand).decode(),
    Err(PngError::UnsupportedFeature(_))
  ));
}

#[test]
fn test_decode_gray_key_color() {
  let bytes = png_stream(&[
    ihdr_chunk(header(2, 1, 8, PngColorType::Y)),
    gama_identity(),
    chunk(PngRawChunkType::tRNS, &[0, 7]),
    idat_chunk(&[0, 7, 8]),
  ]);
  let block = decode_png_bytes(&bytes).unwrap().block;
  assert_eq!(block.offset, [0, 0, 0, 1]);
  assert_eq!(block.pixels.as_ref(), &[7, 0, 8, 255]);
}

#[test]
fn test_decode_low_bit_depth_gray() {
  let bytes = png_stream(&[
    ihdr_chunk(header(10, 1, 1, PngColorType::Y)),
    gama_identity(),
    idat_chunk(&[0, 0b1010_1010, 0b1100_0000]),
  ]);
  let block = decode_png_bytes(&bytes).unwrap().block;
  assert_eq!(block.pixels.as_ref(), &[255, 0, 255, 0, 255, 0, 255, 0, 255, 255]);
}

#[test]
fn test_decode_sixteen_bit() {
  let stream = |h: IHDR, filtered: &[u8]| {
    png_stream(&[ihdr_chunk(h), gama_identity(), idat_chunk(filtered)])
  };
  let gray = stream(header(2, 1, 16, PngColorType::Y), &[0, 0x12, 0x34, 0xAB, 0xCD]);
  let block = decode_png_bytes(&gray).unwrap().block;
  assert_eq!((block.pixel_size, block.offset), (1, [0, 0, 0, 0]));
  assert_eq!(block.pixels.as_ref(), &[0x12, 0xAB]);
  //
  let keep_16 = DecoderOptions::default()
    .with_capabilities(Capabilities { strip_16: false, ..Capabilities::all() });
  let block = PngDecoder::new_with_options(&gray[..], keep_16).decode().unwrap().block;
  assert_eq!((block.pixel_size, block.offset), (2, [0, 0, 0, 0]));
  assert_eq!(block.pixels.as_ref(), &[0x12, 0x34, 0xAB, 0xCD]);
  //
  let rgba = stream(header(1, 1, 16, PngColorType::RGBA), &[0, 1, 2, 3, 4, 5, 6, 7, 8]);
  let block = PngDecoder::new_with_options(&rgba[..], keep_16).decode().unwrap().block;
  assert_eq!((block.pixel_size, block.offset), (8, [0, 2, 4, 6]));
  let block = decode_png_bytes(&rgba).unwrap().block;
  assert_eq!(block.pixels.as_ref(), &[1, 3, 5, 7]);
}

#[test]
fn test_decode_gamma_choices() {
  let base = || vec![ihdr_chunk(header(1, 1, 8, PngColorType::Y)), idat_chunk(&[0, 128])];
  // no gAMA or sRGB: the default exponent
  let block = decode_png_bytes(&png_stream(&base())).unwrap().block;
  assert_eq!(block.pixels.as_ref(), &[186]);
  // sRGB wins over gAMA
  let mut chunks = base();
  chunks.insert(1, chunk(PngRawChunkType::sRGB, &[0]));
  chunks.insert(1, gama_identity());
  let decoded = decode_png_bytes(&png_stream(&chunks)).unwrap();
  assert_eq!(decoded.block.pixels.as_ref(), &[56]);
  assert_eq!(decoded.info.srgb, Some(SrgbIntent::Perceptual));
  // gamma turned off
  let no_gamma = DecoderOptions::default()
    .with_capabilities(Capabilities { gamma: false, ..Capabilities::all() });
  let bytes = png_stream(&base());
  let block = PngDecoder::new_with_options(&bytes[..], no_gamma).decode().unwrap().block;
  assert_eq!(block.pixels.as_ref(), &[128]);
}

#[test]
fn test_text_round_trip() {
  let long = "0123456789".repeat(200);
  let text = TextAnnotations::from_format_list(&["png", "Title", "hi", "Comment", long.as_str()]).unwrap();
  let bytes = encode_png_to_vec(&PixelBlock::gray8(1, 1, &[0]), &text).unwrap();
  let decoded = decode_png_bytes(&bytes).unwrap();
  assert_eq!(decoded.info.text, text);
  let kinds: Vec<_> = decoded.info.text.iter().map(TextAnnotation::compression).collect();
  assert_eq!(kinds, [TextCompression::None, TextCompression::Zlib]);
}

#[test]
fn test_malformed_chunk_sequences() {
  let gray = ihdr_chunk(header(1, 1, 8, PngColorType::Y));
  let index = ihdr_chunk(header(1, 1, 8, PngColorType::Index));
  let plte = chunk(PngRawChunkType::PLTE, &[1, 2, 3]);
  let z = deflate_image_data(&[0, 0], 6);
  let cases: [(&str, Vec<(PngRawChunkType, Vec<u8>)>); 6] = [
    ("no IDAT", vec![gray.clone()]),
    ("two IHDR", vec![gray.clone(), gray.clone(), idat_chunk(&[0, 0])]),
    ("no PLTE", vec![index.clone(), idat_chunk(&[0, 0])]),
    ("late PLTE", vec![index.clone(), idat_chunk(&[0, 0]), plte.clone()]),
    ("two PLTE", vec![index, plte.clone(), plte, idat_chunk(&[0, 0])]),
    (
      "split IDAT",
      vec![
        gray,
        chunk(PngRawChunkType::IDAT, &z[..2]),
        chunk(PngRawChunkType(*b"teSt"), &[]),
        chunk(PngRawChunkType::IDAT, &z[2..]),
      ],
    ),
  ];
  for (name, chunks) in cases {
    assert!(
      matches!(decode_png_bytes(&png_stream(&chunks)), Err(PngError::MalformedChunkSequence(_))),
      "{name}"
    );
  }
}

#[test]
fn test_unknown_chunks_are_skipped() {
  let z = deflate_image_data(&[0, 99], 6);
  let bytes = png_stream(&[
    ihdr_chunk(header(1, 1, 8, PngColorType::Y)),
    chunk(PngRawChunkType(*b"teSt"), b"ancillary"),
    chunk(PngRawChunkType(*b"ABCD"), b"critical"),
    gama_identity(),
    chunk(PngRawChunkType::IDAT, &z[..3]),
    chunk(PngRawChunkType::IDAT, &z[3..]),
    chunk(PngRawChunkType(*b"zzZz"), &[]),
  ]);
  assert_eq!(decode_png_bytes(&bytes).unwrap().block.pixels.as_ref(), &[99]);
}

#[test]
fn test_bad_image_data() {
  let gray = ihdr_chunk(header(1, 1, 8, PngColorType::Y));
  let bad_filter = png_stream(&[gray.clone(), idat_chunk(&[5, 0])]);
  assert!(matches!(decode_png_bytes(&bad_filter), Err(PngError::IllegalAdaptiveFilterType(5))));
  //
  let tall = ihdr_chunk(header(1, 4, 8, PngColorType::Y));
  let short = png_stream(&[tall, idat_chunk(&[0, 0, 0])]);
  assert!(matches!(decode_png_bytes(&short), Err(PngError::CompressionFailure(_))));
  //
  let garbage = png_stream(&[gray, chunk(PngRawChunkType::IDAT, &[1, 2, 3, 4])]);
  assert!(matches!(decode_png_bytes(&garbage), Err(PngError::CompressionFailure(_))));
}

#[test]
fn test_decoder_limits_and_input_errors() {
  let bytes = encode_png_to_vec(&PixelBlock::gray8(3, 2, &[0; 6]), &Default::default()).unwrap();
  let small = DecoderOptions::default().with_max_width(2);
  assert!(matches!(
    PngDecoder::new_with_options(&bytes[..], small).decode(),
    Err(PngError::DimensionsTooLarge { width: 3, height: 2 })
  ));
  //
  let err = decode_png_bytes(b"GIF89a and then some more bytes").unwrap_err();
  assert!(err.is_not_png());
  //
  let truncated = &bytes[..bytes.len() - 10];
  assert!(matches!(decode_png_bytes(truncated), Err(PngError::TruncatedRead(_))));
}

/// A sink that accepts a fixed number of bytes, then no more.
struct LimitedSink {
  room: usize,
  written: Vec<u8>,
}
impl Write for LimitedSink {
  fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
    let n = buf.len().min(self.room);
    self.room -= n;
    self.written.extend_from_slice(&buf[..n]);
    Ok(n)
  }
  fn flush(&mut self) -> std::io::Result<()> {
    Ok(())
  }
}

#[test]
fn test_encoder_errors() {
  let pixels = [0_u8; 4];
  let mut sink = LimitedSink { room: 20, written: Vec::new() };
  let result = encode_png(&mut sink, &PixelBlock::gray8(2, 2, &pixels), &Default::default());
  assert!(matches!(result, Err(PngError::ShortWrite(_))));
  assert_eq!(sink.written.len(), 20);
  //
  let mut sink = LimitedSink { room: 1000, written: Vec::new() };
  let too_big = PixelBlock::gray8(3, 2, &pixels);
  let result = encode_png(&mut sink, &too_big, &Default::default());
  assert!(matches!(result, Err(PngError::InvalidPixelBlock(_))));
  assert!(sink.written.is_empty());
}

/// Packs one sample set per pixel into the filtered scanlines of every pass.
///
/// Pixels below 8 bits are a single sample value, packed high bits first.
fn filtered_image_data(h: &IHDR, pixels: &[Vec<u8>], filter: FilterType) -> Vec<u8> {
  let bpp = h.filter_chunk_size();
  let bits = usize::from(h.bit_depth);
  let mut out = Vec::new();
  for pass in image_passes(h.width, h.height, h.is_interlaced) {
    let mut prev: Vec<u8> = Vec::new();
    for reduced_y in 0..pass.height {
      let mut line = vec![0_u8; h.bytes_per_scanline(pass.width)];
      for reduced_x in 0..pass.width {
        let (x, y) = pass.full_pos(reduced_x, reduced_y);
        let pixel = &pixels[(y * h.width + x) as usize];
        if bits < 8 {
          let bit = reduced_x as usize * bits;
          line[bit / 8] |= pixel[0] << (8 - bits - bit % 8);
        } else {
          let start = reduced_x as usize * pixel.len();
          line[start..start + pixel.len()].copy_from_slice(pixel);
        }
      }
      let mut filtered = vec![0; line.len()];
      filter_line(filter, bpp, &prev, &line, &mut filtered);
      out.push(filter as u8);
      out.extend_from_slice(&filtered);
      prev = line;
    }
  }
  out
}

#[test]
fn test_interlaced_matches_progressive() {
  let palette = noise(3, 16 * 3);
  let formats = [
    (1, PngColorType::Y),
    (2, PngColorType::Y),
    (4, PngColorType::Y),
    (4, PngColorType::Index),
    (16, PngColorType::RGB),
    (16, PngColorType::RGBA),
  ];
  for (bit_depth, color_type) in formats {
    let pixel_bytes = if bit_depth == 16 { color_type.channel_count() * 2 } else { 1 };
    for (width, height) in [(1, 1), (5, 3), (17, 11)] {
      let seed = width * height + u32::from(bit_depth);
      let raw = noise(seed, (width * height) as usize * pixel_bytes);
      let pixels: Vec<Vec<u8>> = raw
        .chunks(pixel_bytes)
        .map(|p| if bit_depth < 8 { vec![p[0] >> (8 - bit_depth)] } else { p.to_vec() })
        .collect();
      for filter in FilterType::ALL {
        let decode = |is_interlaced| {
          let h = IHDR { width, height, bit_depth, color_type, is_interlaced };
          let mut chunks = vec![ihdr_chunk(h), gama_identity()];
          if color_type == PngColorType::Index {
            chunks.push(chunk(PngRawChunkType::PLTE, &palette));
          }
          chunks.push(idat_chunk(&filtered_image_data(&h, &pixels, filter)));
          decode_png_bytes(&png_stream(&chunks)).unwrap().block
        };
        let progressive = decode(false);
        let interlaced = decode(true);
        let what = format!("{bit_depth}-bit {color_type:?}, {width}x{height}, {filter:?}");
        assert_eq!(interlaced, progressive, "{what}");
        assert_eq!((progressive.width, progressive.height), (width, height), "{what}");
        // spot check the last pixel against the source samples
        let last = progressive.pixel(width - 1, height - 1).unwrap();
        let source = &pixels[(width * height - 1) as usize];
        match (bit_depth, color_type) {
          (16, _) => {
            let high: Vec<u8> = source.iter().step_by(2).copied().collect();
            assert_eq!(last, &high[..], "{what}");
          }
          (_, PngColorType::Index) => {
            let i = usize::from(source[0]) * 3;
            assert_eq!(last, &palette[i..i + 3], "{what}");
          }
          (depth, _) => {
            let expected = bitfrob::u8_replicate_bits(u32::from(depth), source[0]);
            assert_eq!(last, &[expected], "{what}");
          }
        }
      }
    }
  }
}
