use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};

use crate::labeling::domain::frame_annotator::FrameAnnotator;
use crate::recognition::domain::face_labeler::LabeledFace;
use crate::shared::frame::Frame;

/// Glyph cell size of the bitmap font, in pixels.
const GLYPH_SIZE: i32 = 8;

/// Colors and geometry for face labels. RGB order.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelStyle {
    pub box_color: [u8; 3],
    pub text_color: [u8; 3],
    /// Outline thickness in pixels.
    pub thickness: i32,
    /// Height of the filled name strip along the bottom edge of the box.
    pub strip_height: i32,
    /// Integer magnification of the 8x8 glyphs.
    pub text_scale: i32,
    /// Text origin relative to the bottom-left corner of the box:
    /// `left + text_inset`, baseline at `bottom - text_inset`.
    pub text_inset: i32,
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            box_color: [255, 0, 0],
            text_color: [255, 255, 255],
            thickness: 2,
            strip_height: 35,
            text_scale: 2,
            text_inset: 6,
        }
    }
}

/// Draws a box outline, a filled name strip and the name for each face.
pub struct BoxLabelAnnotator {
    style: LabelStyle,
}

impl BoxLabelAnnotator {
    pub fn new(style: LabelStyle) -> Self {
        Self { style }
    }
}

impl Default for BoxLabelAnnotator {
    fn default() -> Self {
        Self::new(LabelStyle::default())
    }
}

impl FrameAnnotator for BoxLabelAnnotator {
    fn annotate(
        &self,
        frame: &mut Frame,
        faces: &[LabeledFace],
    ) -> Result<(), Box<dyn std::error::Error>> {
        if frame.channels() < 3 {
            return Err(format!("Cannot annotate {}-channel frame", frame.channels()).into());
        }
        let s = &self.style;
        let mut canvas = Canvas::new(frame);

        for face in faces {
            let b = face.face_box;

            let inner = s.thickness / 2;
            let outer = s.thickness - inner;
            let (t, r, bo, l) = (b.top, b.right, b.bottom, b.left);
            canvas.fill(l - inner, t - inner, r + outer - 1, t + outer - 1, s.box_color);
            canvas.fill(l - inner, bo - inner, r + outer - 1, bo + outer - 1, s.box_color);
            canvas.fill(l - inner, t - inner, l + outer - 1, bo + outer - 1, s.box_color);
            canvas.fill(r - inner, t - inner, r + outer - 1, bo + outer - 1, s.box_color);

            canvas.fill(l, bo - s.strip_height, r, bo, s.box_color);

            canvas.text(
                &face.name,
                l + s.text_inset,
                bo - s.text_inset,
                s.text_scale,
                s.text_color,
            );
        }

        Ok(())
    }
}

/// Clipped pixel writer over an RGB frame.
struct Canvas<'a> {
    frame: &'a mut Frame,
    width: i32,
    height: i32,
}

impl<'a> Canvas<'a> {
    fn new(frame: &'a mut Frame) -> Self {
        let width = frame.width() as i32;
        let height = frame.height() as i32;
        Self {
            frame,
            width,
            height,
        }
    }

    /// Fills the inclusive rectangle `(x0, y0)`-`(x1, y1)`.
    fn fill(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: [u8; 3]) {
        let (x0, x1) = (x0.min(x1).max(0), x0.max(x1).min(self.width - 1));
        let (y0, y1) = (y0.min(y1).max(0), y0.max(y1).min(self.height - 1));
        if x0 > x1 || y0 > y1 {
            return;
        }
        let mut pixels = self.frame.as_ndarray_mut();
        for y in y0..=y1 {
            for x in x0..=x1 {
                for (c, &value) in color.iter().enumerate() {
                    pixels[[y as usize, x as usize, c]] = value;
                }
            }
        }
    }

    /// Renders `text` with its baseline at `baseline` and left edge at `x`.
    fn text(&mut self, text: &str, x: i32, baseline: i32, scale: i32, color: [u8; 3]) {
        let scale = scale.max(1);
        let top = baseline - GLYPH_SIZE * scale;
        for (i, ch) in text.chars().enumerate() {
            let origin_x = x + i as i32 * GLYPH_SIZE * scale;
            if origin_x >= self.width {
                break;
            }
            for (row, bits) in glyph(ch).iter().enumerate() {
                for col in 0..GLYPH_SIZE {
                    // Bit 0 is the leftmost pixel
                    if bits & (1 << col) == 0 {
                        continue;
                    }
                    let px = origin_x + col * scale;
                    let py = top + row as i32 * scale;
                    self.fill(px, py, px + scale - 1, py + scale - 1, color);
                }
            }
        }
    }
}

fn glyph(ch: char) -> [u8; 8] {
    BASIC_FONTS
        .get(ch)
        .or_else(|| LATIN_FONTS.get(ch))
        .or_else(|| BASIC_FONTS.get('?'))
        .unwrap_or_default()
}
