use ndarray::{ArrayView3, ArrayViewMut3};

/// A single video/image frame: contiguous RGB bytes in row-major order.
///
/// Format conversion happens at I/O boundaries only; the domain layer
/// treats pixel data as opaque.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            index,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    pub fn as_ndarray_mut(&mut self) -> ArrayViewMut3<'_, u8> {
        ArrayViewMut3::from_shape(self.shape(), &mut self.data)
            .expect("Frame data length must match dimensions")
    }

    /// Returns a copy shrunk by an integer `factor` in both axes.
    ///
    /// Uses bilinear filtering. Sizes are rounded, not floored, so an odd
    /// 643-pixel width becomes 322. The frame index is preserved so the copy
    /// can be traced back to its source frame.
    pub fn downscaled(&self, factor: u32) -> Result<Frame, Box<dyn std::error::Error>> {
        if factor <= 1 {
            return Ok(self.clone());
        }
        if self.channels != 3 {
            return Err(format!("Cannot downscale {}-channel frame", self.channels).into());
        }

        let img = image::RgbImage::from_raw(self.width, self.height, self.data.clone())
            .ok_or("Failed to create image from frame data")?;
        let width = scaled_length(self.width, factor);
        let height = scaled_length(self.height, factor);
        let small =
            image::imageops::resize(&img, width, height, image::imageops::FilterType::Triangle);

        Ok(Frame::new(small.into_raw(), width, height, 3, self.index))
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels as usize,
        )
    }
}

/// `length / factor` rounded half to even, never below one pixel.
fn scaled_length(length: u32, factor: u32) -> u32 {
    let (quotient, remainder) = (length / factor, length % factor);
    let rounded = match (2 * remainder).cmp(&factor) {
        std::cmp::Ordering::Less => quotient,
        std::cmp::Ordering::Greater => quotient + 1,
        std::cmp::Ordering::Equal => quotient + (quotient & 1),
    };
    rounded.max(1)
}
