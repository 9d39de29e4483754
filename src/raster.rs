//! External rendering boundary: a pixel buffer and a frame sink trait.
//!
//! The planner's search trace is rendered through these two traits only.
//! Mirrors the ancestor crate's `RoomVisualizer` boundary (a trait the
//! crate calls into but never implements against a concrete drawing
//! library) -- no image or video codec is linked here, and none should be.

/// An RGB color, one byte per channel.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Default)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// A `rows x cols` grid of colors for a single frame.
///
/// Deliberately minimal: this is the shape a caller's real image buffer
/// (an `image::RgbImage`, a video encoder's frame, a GUI canvas) is
/// expected to be filled from, not a reimplementation of one.
pub struct PixelBuffer {
    rows: usize,
    cols: usize,
    pixels: Vec<Rgb>,
}

impl PixelBuffer {
    pub fn new(rows: usize, cols: usize) -> Self {
        PixelBuffer {
            rows,
            cols,
            pixels: vec![Rgb::default(); rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn set(&mut self, row: usize, col: usize, color: Rgb) {
        self.pixels[row * self.cols + col] = color;
    }

    pub fn get(&self, row: usize, col: usize) -> Rgb {
        self.pixels[row * self.cols + col]
    }
}

/// Consumer of successive search-trace frames.
///
/// `Planner::plan` takes a sink as an owned `Box<dyn FrameSink>` rather
/// than a borrow: ownership passes to the call for its duration, and
/// `finalize` is called exactly once on every exit path -- success,
/// `Unreachable`, or a validation failure before the search ever starts
/// -- so a caller owning a video encoder can rely on the call itself to
/// flush and close the output regardless of how the search ended.
pub trait FrameSink {
    fn accept(&mut self, frame: &PixelBuffer);
    fn finalize(&mut self);
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get_round_trips() {
        let mut buf = PixelBuffer::new(3, 4);
        buf.set(1, 2, Rgb(10, 20, 30));
        assert_eq!(buf.get(1, 2), Rgb(10, 20, 30));
        assert_eq!(buf.get(0, 0), Rgb::default());
    }
}
