//! Binary program images.
//!
//! An image is a stream of little-endian 16-bit words. Word `i` of the image is loaded into
//! memory at `base + i`.

use nom::{error::ErrorKind, multi::many0, number::complete::le_u16, IResult};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Image {
    pub words: Vec<u16>,
}

fn take_words(input: &[u8]) -> IResult<&[u8], Vec<u16>, (&[u8], ErrorKind)> {
    many0(le_u16)(input)
}

impl Image {
    /// Parses an image from raw bytes.
    ///
    /// A trailing odd byte becomes a final word holding only that low byte.
    pub fn parse(bytes: &[u8]) -> Image {
        let (rest, mut words) = match take_words(bytes) {
            Ok(parsed) => parsed,
            Err(_) => (bytes, Vec::new()),
        };

        if let Some(&low) = rest.first() {
            words.push(u16::from(low));
        }

        Image { words }
    }

    pub fn from_words<I: IntoIterator<Item = u16>>(words: I) -> Image {
        Image {
            words: words.into_iter().collect(),
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.words.iter().flat_map(|word| word.to_le_bytes().to_vec()).collect()
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_little_endian() {
        let image = Image::parse(&[0x13, 0x00, 0x41, 0x00, 0x07, 0x80]);
        assert_eq!(image.words, vec![19, 65, 0x8007]);
    }

    #[test]
    fn test_parse_odd_trailing_byte() {
        let image = Image::parse(&[0x15, 0x00, 0xAB]);
        assert_eq!(image.words, vec![21, 0xAB]);
    }

    #[test]
    fn test_parse_empty() {
        assert!(Image::parse(&[]).is_empty());
    }

    #[test]
    fn test_to_bytes() {
        let image = Image::from_words(vec![0x8001, 2]);
        assert_eq!(image.to_bytes(), vec![0x01, 0x80, 0x02, 0x00]);
        assert_eq!(Image::parse(&image.to_bytes()), image);
    }
}
