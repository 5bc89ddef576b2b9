//! Holds all the tools for decoding and encoding PNG data.
//!
//! * [Portable Network Graphics Specification (Second Edition)][png-spec]
//!
//! [png-spec]: https://www.w3.org/TR/2003/REC-PNG-20031110/
//!
//! ## Automated Decoding and Encoding
//!
//! * [`png_match`] checks if a byte source starts like a PNG and reports the
//!   image dimensions. It consumes exactly 24 bytes and never errors.
//! * [`PngDecoder`] reads a whole PNG from any [`Read`] source and gives back a
//!   [`PixelBlock`](crate::PixelBlock) in the canonical layout: 8 bits per
//!   channel, gray or RGB, with alpha only when the image has alpha or
//!   transparency data. A sub-rectangle of the image can be requested.
//! * [`PngEncoder`] writes any pixel block to a [`Write`] sink, picking the
//!   smallest PNG color type that holds the block's channels.
//!
//! ## The Decoding Process
//!
//! The general format of a PNG is that the information is stored in "chunks".
//! There's four "critical" chunk types:
//! * **Header** - This has all the important information about the image's
//!   dimensions, pixel format, and if the image is interlaced or not.
//! * **Palette** - If an image uses indexed color it will have a palette of
//!   what index values map to what RGB values.
//! * **Image Data** - One or more chunks of compressed data. All of the
//!   compressed data forms a single zlib data stream.
//! * **End** - The last chunk, lets you know you had the full PNG and your data
//!   wasn't truncated accidentally.
//!
//! Between the header and the image data there can be "ancillary" chunks. This
//! crate reads the transparency, gamma, sRGB, and text chunks, and skips any
//! other chunk it doesn't know.
//!
//! When storing the PNG, the raw pixel values are first "filtered" (to try and
//! make them more compression-friendly), and then compressed into a zlib data
//! stream. To decode the PNG you reverse the operations:
//!
//! * **Decompression:** see [`inflate_image_data`].
//! * **Unfiltering:** each line of the decompressed data has an extra byte on
//!   the front which says what filter was used for that line. See
//!   [`unfilter_decompressed_data`].
//! * **De-interlacing:** if the image is interlaced then the data is stored as
//!   seven "reduced" images of varying resolutions. See
//!   [`reduced_image_dimensions`].
//! * **Pixel Format Changes:** the stored pixel format is turned into the
//!   canonical pixel block layout, including gamma correction.

use std::io::{Read, Write};

use log::{debug, trace, warn};

use crate::{PixelBlock, PngError, PngResult, SrgbIntent};

mod crc32;
pub(crate) use crc32::*;

mod raw_chunk;
pub use raw_chunk::*;

mod ihdr;
pub use ihdr::*;

mod plte;
pub use plte::*;

mod trns;
pub use trns::*;

mod gama;
pub use gama::*;

mod srgb;
pub use srgb::*;

mod text;
pub use text::*;

mod zlib;
pub use zlib::*;

mod filtering;
pub use filtering::*;

mod interlace;
pub use interlace::*;

mod unfilter;
pub use unfilter::*;

mod normalize;
pub use normalize::*;

mod decoder;
pub use decoder::*;

mod encoder;
pub use encoder::*;

#[cfg(test)]
mod tests;
