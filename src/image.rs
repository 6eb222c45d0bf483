use crate::{RGBA, RenderError, Scalar, Size};
use std::{io::Write, path::Path};

/// Image with straight alpha sRGBA pixels
pub type PixelBuffer = ImageOwned<RGBA>;

/// Per pixel coverage in [0, 1]
pub type AlphaMask = ImageOwned<Scalar>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    /// Width of the image
    pub width: usize,
    /// Height of the image
    pub height: usize,
    /// How many elements we need to skip to get to the next row.
    pub row_stride: usize,
    /// How many elements we need to skip to get to the next column.
    pub col_stride: usize,
}

impl Shape {
    /// Densely packed row-major shape
    pub fn packed(size: Size) -> Self {
        Self {
            width: size.width,
            height: size.height,
            row_stride: size.width,
            col_stride: 1,
        }
    }

    #[inline]
    pub fn offset(&self, row: usize, col: usize) -> usize {
        row * self.row_stride + col * self.col_stride
    }

    #[inline]
    pub fn nth(&self, n: usize) -> Option<(usize, usize)> {
        if self.width == 0 {
            return None;
        }
        let row = n / self.width;
        let col = n - row * self.width;
        (row < self.height).then_some((row, col))
    }

    pub fn size(&self) -> Size {
        Size {
            width: self.width,
            height: self.height,
        }
    }
}

pub trait Image {
    type Pixel;

    fn data(&self) -> &[Self::Pixel];

    fn shape(&self) -> Shape;

    fn width(&self) -> usize {
        self.shape().width
    }

    fn height(&self) -> usize {
        self.shape().height
    }

    fn size(&self) -> Size {
        self.shape().size()
    }

    fn get(&self, row: usize, col: usize) -> Option<&Self::Pixel> {
        if row >= self.height() || col >= self.width() {
            return None;
        }
        let offset = self.shape().offset(row, col);
        self.data().get(offset)
    }

    fn iter(&self) -> ImageIter<'_, Self::Pixel> {
        ImageIter {
            index: 0,
            shape: self.shape(),
            data: self.data(),
        }
    }
}

pub struct ImageIter<'a, P> {
    index: usize,
    shape: Shape,
    data: &'a [P],
}

impl<'a, P> Iterator for ImageIter<'a, P> {
    type Item = &'a P;

    fn next(&mut self) -> Option<Self::Item> {
        self.nth(0)
    }

    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        self.index += n + 1;
        let (row, col) = self.shape.nth(self.index - 1)?;
        self.data.get(self.shape.offset(row, col))
    }
}

pub trait ImageMut: Image {
    fn data_mut(&mut self) -> &mut [Self::Pixel];

    fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut Self::Pixel> {
        if row >= self.height() || col >= self.width() {
            return None;
        }
        let index = self.shape().offset(row, col);
        self.data_mut().get_mut(index)
    }

    fn clear(&mut self)
    where
        Self::Pixel: Default,
    {
        let shape = self.shape();
        let data = self.data_mut();
        for row in 0..shape.height {
            for col in 0..shape.width {
                data[shape.offset(row, col)] = Default::default();
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageOwned<P> {
    shape: Shape,
    data: Vec<P>,
}

impl<P> ImageOwned<P> {
    pub fn new(shape: Shape, data: Vec<P>) -> Self {
        Self { shape, data }
    }

    pub fn new_default(size: Size) -> Self
    where
        P: Default,
    {
        Self::new_with(size, |_, _| Default::default())
    }

    pub fn new_with<F>(size: Size, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> P,
    {
        let mut data = Vec::with_capacity(size.height * size.width);
        for row in 0..size.height {
            for col in 0..size.width {
                data.push(f(row, col))
            }
        }
        Self {
            shape: Shape::packed(size),
            data,
        }
    }

    pub fn to_vec(self) -> Vec<P> {
        self.data
    }
}

impl<P> Image for ImageOwned<P> {
    type Pixel = P;

    fn shape(&self) -> Shape {
        self.shape
    }

    fn data(&self) -> &[Self::Pixel] {
        &self.data
    }
}

impl<C> ImageMut for ImageOwned<C> {
    fn data_mut(&mut self) -> &mut [Self::Pixel] {
        &mut self.data
    }
}

impl PixelBuffer {
    /// Decode image file of any supported format
    ///
    /// Missing file is reported as [`RenderError::AssetNotFound`], any other
    /// failure as [`RenderError::AssetLoad`].
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RenderError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(RenderError::AssetNotFound(path.to_owned()));
        }
        let image = ::image::open(path)
            .map_err(|error| RenderError::AssetLoad {
                path: path.to_owned(),
                reason: error.to_string(),
            })?
            .into_rgba8();
        let size = Size::new(image.width() as usize, image.height() as usize);
        let data = bytemuck::cast_slice::<u8, RGBA>(image.as_raw()).to_vec();
        Ok(Self::new(Shape::packed(size), data))
    }

    /// Load optional asset, empty or missing path results in `None`
    pub fn open_optional(path: &str) -> Result<Option<Self>, RenderError> {
        if path.is_empty() {
            return Ok(None);
        }
        match Self::open(path) {
            Ok(image) => Ok(Some(image)),
            Err(RenderError::AssetNotFound(path)) => {
                tracing::warn!("[asset] {} does not exist, using fill instead", path.display());
                Ok(None)
            }
            Err(error) => Err(error),
        }
    }

    /// Encode as 8-bit RGBA PNG
    pub fn write_png(&self, w: impl Write) -> Result<(), png::EncodingError> {
        let mut encoder = png::Encoder::new(w, self.width() as u32, self.height() as u32);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(bytemuck::cast_slice(self.data()))?;
        writer.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_owned() {
        let mut img = ImageOwned::new_with(Size::new(3, 2), |row, col| row * 10 + col);
        assert_eq!(img.size(), Size::new(3, 2));
        assert_eq!(img.get(1, 2), Some(&12));
        assert_eq!(img.get(2, 0), None);
        assert_eq!(img.get(0, 3), None);
        *img.get_mut(0, 1).unwrap() = 7;
        assert_eq!(img.iter().copied().collect::<Vec<_>>(), vec![0, 7, 2, 10, 11, 12]);
        img.clear();
        assert!(img.iter().all(|v| *v == 0));
    }

    #[test]
    fn test_png_roundtrip() -> Result<(), Box<dyn std::error::Error>> {
        let img = PixelBuffer::new_with(Size::new(4, 3), |row, col| {
            RGBA::new(row as u8 * 80, col as u8 * 60, 7, 255 - row as u8)
        });
        let mut bytes = Vec::new();
        img.write_png(&mut bytes)?;
        let decoded = ::image::load_from_memory(&bytes)?.into_rgba8();
        assert_eq!(decoded.dimensions(), (4, 3));
        assert_eq!(decoded.get_pixel(3, 2).0, [160, 180, 7, 253]);
        Ok(())
    }

    #[test]
    fn test_open_missing() {
        let path = std::env::temp_dir().join("fancytext-missing-asset.png");
        assert!(matches!(
            PixelBuffer::open(&path),
            Err(RenderError::AssetNotFound(_))
        ));
        assert!(matches!(
            PixelBuffer::open_optional(path.to_str().unwrap_or_default()),
            Ok(None)
        ));
        assert!(matches!(PixelBuffer::open_optional(""), Ok(None)));
    }
}
