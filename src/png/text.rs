use super::*;

/// Encoded text values longer than this many bytes are written as `zTXt`.
pub const COMPRESS_THRESHOLD: usize = 1024;

/// How a text annotation is stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TextCompression {
  /// Stored as a `tEXt` chunk.
  #[default]
  None,
  /// Stored as a `zTXt` chunk.
  Zlib,
}

/// One key/value pair of textual metadata.
///
/// Both parts are stored as Latin-1 in the PNG, so every `char` must be at most
/// `U+00FF`. The keyword must be 1 to 79 bytes with no null byte.
///
/// Spec: [tEXt](https://www.w3.org/TR/png/#11tEXt),
/// [zTXt](https://www.w3.org/TR/png/#11zTXt)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextAnnotation {
  keyword: String,
  text: String,
  compression: TextCompression,
}
impl TextAnnotation {
  /// Makes an annotation, picking the compression from the text length.
  pub fn new(keyword: &str, text: &str) -> PngResult<Self> {
    let key_bytes = latin1_bytes(keyword)?;
    if key_bytes.is_empty() || key_bytes.len() > 79 {
      return Err(PngError::InvalidText("keyword must be 1 to 79 bytes"));
    }
    if key_bytes.contains(&0) {
      return Err(PngError::InvalidText("keyword contains a null byte"));
    }
    let compression = if latin1_bytes(text)?.len() > COMPRESS_THRESHOLD {
      TextCompression::Zlib
    } else {
      TextCompression::None
    };
    Ok(Self { keyword: keyword.to_string(), text: text.to_string(), compression })
  }

  /// The keyword
  #[inline]
  #[must_use]
  pub fn keyword(&self) -> &str {
    &self.keyword
  }

  /// The text value
  #[inline]
  #[must_use]
  pub fn text(&self) -> &str {
    &self.text
  }

  /// How this will be stored.
  #[inline]
  #[must_use]
  pub const fn compression(&self) -> TextCompression {
    self.compression
  }

  /// Builds the chunk type and chunk data to write this annotation.
  pub fn to_chunk(&self, compression_level: u8) -> PngResult<(PngRawChunkType, Vec<u8>)> {
    let mut data = latin1_bytes(&self.keyword)?;
    data.push(0);
    let text = latin1_bytes(&self.text)?;
    Ok(match self.compression {
      TextCompression::None => {
        data.extend_from_slice(&text);
        (PngRawChunkType::tEXt, data)
      }
      TextCompression::Zlib => {
        // compression method: zlib
        data.push(0);
        data.extend_from_slice(&deflate_text(&text, compression_level));
        (PngRawChunkType::zTXt, data)
      }
    })
  }

  /// Parses `tEXt` chunk data.
  #[allow(nonstandard_style)]
  #[must_use]
  pub fn parse_tEXt(data: &[u8]) -> Option<Self> {
    let (keyword, text) = split_keyword(data)?;
    Some(Self {
      keyword: latin1_string(keyword),
      text: latin1_string(text),
      compression: TextCompression::None,
    })
  }

  /// Parses `zTXt` chunk data, decompressing the text.
  #[allow(nonstandard_style)]
  #[must_use]
  pub fn parse_zTXt(data: &[u8]) -> Option<Self> {
    let (keyword, rest) = split_keyword(data)?;
    match rest {
      [0, compressed @ ..] => {
        let text = inflate_text(compressed).ok()?;
        Some(Self {
          keyword: latin1_string(keyword),
          text: latin1_string(&text),
          compression: TextCompression::Zlib,
        })
      }
      _ => None,
    }
  }
}

/// An ordered list of text annotations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TextAnnotations(Vec<TextAnnotation>);
impl TextAnnotations {
  /// Builds the list from a format description list.
  ///
  /// The first element names the format (eg: `"png"`) and is skipped. The
  /// elements after it are taken as `keyword, text` pairs. With fewer than two
  /// elements after the name there are no annotations, and an unpaired last
  /// element is ignored.
  ///
  /// Every complete pair counts. Older tools computed `len / 2 - 1` pairs,
  /// which drops the last pair of an odd length list, so `["png", "k", "v"]`
  /// gives one annotation here where they gave none.
  pub fn from_format_list<S: AsRef<str>>(list: &[S]) -> PngResult<Self> {
    let pairs = match list {
      [_format_name, rest @ ..] if rest.len() >= 2 => rest,
      _ => return Ok(Self::default()),
    };
    pairs
      .chunks_exact(2)
      .map(|pair| TextAnnotation::new(pair[0].as_ref(), pair[1].as_ref()))
      .collect::<PngResult<Vec<_>>>()
      .map(Self)
  }

  /// Adds an annotation to the end of the list.
  #[inline]
  pub fn push(&mut self, annotation: TextAnnotation) {
    self.0.push(annotation)
  }

  /// Iterates the annotations in order.
  #[inline]
  pub fn iter(&self) -> impl Iterator<Item = &TextAnnotation> {
    self.0.iter()
  }

  /// Number of annotations.
  #[inline]
  #[must_use]
  pub fn len(&self) -> usize {
    self.0.len()
  }

  /// If there's no annotations.
  #[inline]
  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}
impl From<Vec<TextAnnotation>> for TextAnnotations {
  #[inline]
  fn from(annotations: Vec<TextAnnotation>) -> Self {
    Self(annotations)
  }
}

fn split_keyword(data: &[u8]) -> Option<(&[u8], &[u8])> {
  let nul = data.iter().position(|&b| b == 0)?;
  let (keyword, rest) = data.split_at(nul);
  if keyword.is_empty() || keyword.len() > 79 {
    return None;
  }
  Some((keyword, &rest[1..]))
}

fn latin1_bytes(s: &str) -> PngResult<Vec<u8>> {
  s.chars()
    .map(|c| u8::try_from(u32::from(c)).map_err(|_| PngError::InvalidText("text is not Latin-1")))
    .collect()
}

fn latin1_string(bytes: &[u8]) -> String {
  bytes.iter().copied().map(char::from).collect()
}

#[cfg(test)]
mod text_tests {
  use super::*;

  #[test]
  fn test_compression_threshold() {
    let long = "a".repeat(2000);
    let short = "a".repeat(500);
    assert_eq!(TextAnnotation::new("k", &long).unwrap().compression(), TextCompression::Zlib);
    assert_eq!(TextAnnotation::new("k", &short).unwrap().compression(), TextCompression::None);
    let edge = "a".repeat(COMPRESS_THRESHOLD);
    assert_eq!(TextAnnotation::new("k", &edge).unwrap().compression(), TextCompression::None);
  }

  #[test]
  fn test_format_list() {
    assert!(TextAnnotations::from_format_list::<&str>(&[]).unwrap().is_empty());
    assert!(TextAnnotations::from_format_list(&["png"]).unwrap().is_empty());
    assert!(TextAnnotations::from_format_list(&["png", "Author"]).unwrap().is_empty());
    let list =
      TextAnnotations::from_format_list(&["png", "Author", "me", "Title", "x", "odd"]).unwrap();
    let pairs: Vec<_> = list.iter().map(|t| (t.keyword(), t.text())).collect();
    assert_eq!(pairs, [("Author", "me"), ("Title", "x")]);
    // every complete pair counts, including the last
    assert_eq!(TextAnnotations::from_format_list(&["png", "k", "v"]).unwrap().len(), 1);
    assert_eq!(TextAnnotations::from_format_list(&["png", "a", "1", "b", "2"]).unwrap().len(), 2);
  }

  #[test]
  fn test_invalid_text() {
    assert!(matches!(TextAnnotation::new("", "v"), Err(PngError::InvalidText(_))));
    assert!(matches!(TextAnnotation::new(&"k".repeat(80), "v"), Err(PngError::InvalidText(_))));
    assert!(matches!(TextAnnotation::new("k", "snow \u{2603}"), Err(PngError::InvalidText(_))));
    assert!(matches!(TextAnnotation::new("a\0b", "v"), Err(PngError::InvalidText(_))));
    assert!(TextAnnotation::new("caf\u{e9}", "na\u{ef}ve").is_ok());
  }

  #[test]
  fn test_chunk_round_trip() {
    let small = TextAnnotation::new("Comment", "caf\u{e9}").unwrap();
    let (ty, data) = small.to_chunk(6).unwrap();
    assert_eq!(ty, PngRawChunkType::tEXt);
    assert_eq!(data, b"Comment\0caf\xE9");
    assert_eq!(TextAnnotation::parse_tEXt(&data), Some(small));
    //
    let big = TextAnnotation::new("Comment", &"xyz".repeat(1000)).unwrap();
    let (ty, data) = big.to_chunk(6).unwrap();
    assert_eq!(ty, PngRawChunkType::zTXt);
    assert!(data.len() < 3000);
    assert_eq!(TextAnnotation::parse_zTXt(&data), Some(big));
    //
    assert_eq!(TextAnnotation::parse_tEXt(b"no null here"), None);
    assert_eq!(TextAnnotation::parse_zTXt(b"key\0\x01junk"), None);
  }
}
