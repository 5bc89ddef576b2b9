use pngblock::{png::*, PixelBlock, PngError};
use walkdir::WalkDir;

#[test]
fn test_png_match_and_decode_no_panics() {
  // every file in the test folder, even non-png files shouldn't cause a panic.
  for entry in WalkDir::new("tests/").into_iter().filter_map(|e| e.ok()) {
    println!("{}", entry.path().display());
    let v = match std::fs::read(entry.path()) {
      Ok(v) => v,
      Err(e) => {
        println!("Error reading file: {e:?}");
        continue;
      }
    };
    let _ = png_match(&v[..]);
    let _ = decode_png_bytes(&v);
  }
  // even totally random data should never panic!
  for _ in 0..10 {
    let v = super::rand_bytes(1024);
    assert_eq!(png_match(&v[..]), None);
    assert!(decode_png_bytes(&v).is_err());
  }
}

#[test]
fn test_png_match_on_truncated_input() {
  let bytes = encode_png_to_vec(&PixelBlock::gray8(5, 7, &[0; 35]), &Default::default()).unwrap();
  assert_eq!(png_match(&bytes[..]), Some((5, 7)));
  for len in 0..24 {
    assert_eq!(png_match(&bytes[..len]), None, "len: {len}");
  }
  let mut bad_signature = bytes.clone();
  bad_signature[0] = 0x88;
  assert_eq!(png_match(&bad_signature[..]), None);
  //
  // the probe reads exactly 24 bytes and leaves the rest
  let mut source = &bytes[..];
  assert_eq!(png_match(&mut source), Some((5, 7)));
  assert_eq!(source.len(), bytes.len() - 24);
}

#[test]
fn test_random_round_trips() {
  for _ in 0..10 {
    let dims = super::rand_bytes(2);
    let (w, h) = (u32::from(dims[0] % 40) + 1, u32::from(dims[1] % 40) + 1);
    let pixels = super::rand_bytes((w * h * 4) as usize);
    let block = PixelBlock::rgba8(w, h, &pixels);
    for interlace in [InterlaceMethod::None, InterlaceMethod::Adam7] {
      let options = EncoderOptions::default()
        .with_interlace(interlace)
        .with_filter(FilterStrategy::Adaptive);
      let mut encoder = PngEncoder::new_with_options(Vec::new(), options);
      encoder.encode(&block, &TextAnnotations::default()).unwrap();
      let decoded = decode_png_bytes(&encoder.into_inner()).unwrap();
      assert_eq!(decoded.block, block, "{w}x{h} {interlace:?}");
    }
  }
}

#[test]
fn test_corrupted_streams_never_panic() {
  let pixels = super::rand_bytes(6 * 5 * 3);
  let text = TextAnnotations::from_format_list(&["png", "Comment", "hello"]).unwrap();
  let bytes = encode_png_to_vec(&PixelBlock::rgb8(6, 5, &pixels), &text).unwrap();
  let unchecked = DecoderOptions::default()
    .with_confirm_crc(false)
    .with_max_width(64)
    .with_max_height(64);
  for i in 0..bytes.len() {
    let mut corrupt = bytes.clone();
    corrupt[i] ^= 0x5A;
    // with CRC checks on, any change after the signature is caught
    match decode_png_bytes(&corrupt) {
      Err(_) => (),
      Ok(_) => panic!("corruption at byte {i} wasn't noticed"),
    }
    let _ = PngDecoder::new_with_options(&corrupt[..], unchecked).decode();
  }
  // random bytes after a real signature and header
  for _ in 0..10 {
    let mut v = bytes[..33].to_vec();
    v.extend_from_slice(&super::rand_bytes(512));
    let _ = PngDecoder::new_with_options(&v[..], unchecked).decode();
  }
}

#[test]
fn test_not_a_png_is_distinguishable() {
  let err = decode_png_bytes(b"\x89PNG\r\n\x1a\n\0\0\0\x04JUNKdata").unwrap_err();
  assert!(err.is_not_png(), "{err}");
  assert!(matches!(decode_png_bytes(&[]), Err(PngError::NotAPng)));
  let bytes = encode_png_to_vec(&PixelBlock::gray8(1, 1, &[0]), &Default::default()).unwrap();
  let err = decode_png_bytes(&bytes[..20]).unwrap_err();
  assert!(!err.is_not_png(), "{err}");
}
