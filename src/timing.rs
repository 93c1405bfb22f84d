//! Frame timing instrumentation.
//!
//! A frame is split into coloured segments: `begin` opens the first one and
//! each `set_colour` closes the open segment and starts the next. The bar
//! overlay shows the previous complete frame, so it never flickers with a
//! half-measured one.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::pixel::{BlendMode, Pixel};
use crate::pixel_buffer::PixelBuffer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingSegment {
    pub colour: Pixel,
    pub duration: Duration,
}

#[derive(Debug, Default)]
pub struct TimingBar {
    current: Vec<TimingSegment>,
    previous: Vec<TimingSegment>,
    open: Option<(Pixel, Instant)>,
}

impl TimingBar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new frame with its first segment
    pub fn begin(&mut self, colour: Pixel) {
        self.begin_at(colour, Instant::now());
    }

    pub(crate) fn begin_at(&mut self, colour: Pixel, now: Instant) {
        self.close(now);
        self.previous = std::mem::take(&mut self.current);
        self.open = Some((colour, now));
    }

    /// Close the open segment and start another.
    /// Returns the number of completed segments this frame.
    pub fn set_colour(&mut self, colour: Pixel) -> usize {
        self.set_colour_at(colour, Instant::now())
    }

    pub(crate) fn set_colour_at(&mut self, colour: Pixel, now: Instant) -> usize {
        self.close(now);
        self.open = Some((colour, now));
        self.current.len()
    }

    fn close(&mut self, now: Instant) {
        if let Some((colour, start)) = self.open.take() {
            self.current.push(TimingSegment {
                colour,
                duration: now.saturating_duration_since(start),
            });
        }
    }

    /// Completed segments in the current frame
    #[inline]
    pub fn segment_count(&self) -> usize {
        self.current.len()
    }

    /// Milliseconds spent in completed segment `id`, 0.0 if there is none
    pub fn segment_duration_ms(&self, id: usize) -> f32 {
        self.current
            .get(id)
            .map_or(0.0, |s| s.duration.as_secs_f32() * 1000.0)
    }

    pub fn segments(&self) -> &[TimingSegment] {
        &self.current
    }

    pub fn previous_segments(&self) -> &[TimingSegment] {
        &self.previous
    }

    /// Draw the previous frame as filled blocks proportional to their share
    /// of it, then a white outline. `(x, y)` is the bottom-left corner.
    pub fn draw(&self, target: &mut PixelBuffer, x: i32, y: i32, width: i32, height: i32) {
        if width <= 0 || height <= 0 {
            return;
        }
        let total: f64 = self.previous.iter().map(|s| s.duration.as_secs_f64()).sum();
        if total > 0.0 {
            let mut elapsed = 0.0;
            let mut left = x;
            for segment in &self.previous {
                elapsed += segment.duration.as_secs_f64();
                let right = x + (elapsed / total * width as f64) as i32;
                if right > left {
                    target.rect(
                        left,
                        y,
                        right - 1,
                        y + height - 1,
                        segment.colour,
                        BlendMode::Normal,
                        true,
                    );
                }
                left = right;
            }
        }
        target.rect(
            x,
            y,
            x + width - 1,
            y + height - 1,
            Pixel::WHITE,
            BlendMode::Normal,
            false,
        );
    }
}

// ============================================================================
// FPS
// ============================================================================

/// Rolling frame rate over the last `window` frames
#[derive(Debug)]
pub struct FpsCounter {
    frame_times: VecDeque<f32>,
    last_frame: Instant,
    window: usize,
}

impl FpsCounter {
    pub fn new(window: usize) -> Self {
        Self {
            frame_times: VecDeque::with_capacity(window),
            last_frame: Instant::now(),
            window: window.max(1),
        }
    }

    /// Record a frame boundary; returns the seconds since the previous one
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.frame_times.push_back(dt);
        if self.frame_times.len() > self.window {
            self.frame_times.pop_front();
        }
        dt
    }

    pub fn average_fps(&self) -> f32 {
        let avg: f32 = self.frame_times.iter().sum::<f32>() / self.frame_times.len().max(1) as f32;
        if avg > 0.0 {
            1.0 / avg
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_three_segments_after_begin() {
        let t0 = Instant::now();
        let mut bar = TimingBar::new();
        bar.begin_at(Pixel::RED, t0);
        assert_eq!(bar.set_colour_at(Pixel::GREEN, t0 + ms(2)), 1);
        assert_eq!(bar.set_colour_at(Pixel::BLUE, t0 + ms(5)), 2);
        assert_eq!(bar.set_colour_at(Pixel::YELLOW, t0 + ms(9)), 3);
        assert_eq!(bar.segment_count(), 3);
        assert!((bar.segment_duration_ms(0) - 2.0).abs() < 1e-3);
        assert!((bar.segment_duration_ms(1) - 3.0).abs() < 1e-3);
        assert!((bar.segment_duration_ms(2) - 4.0).abs() < 1e-3);
        assert_eq!(bar.segment_duration_ms(3), 0.0);
    }

    #[test]
    fn test_real_clock_segments_fit_in_frame() {
        let start = Instant::now();
        let mut bar = TimingBar::new();
        bar.begin(Pixel::RED);
        for colour in [Pixel::GREEN, Pixel::BLUE, Pixel::YELLOW] {
            std::thread::sleep(ms(1));
            bar.set_colour(colour);
        }
        let frame_ms = start.elapsed().as_secs_f32() * 1000.0;
        assert_eq!(bar.segment_count(), 3);
        let sum: f32 = (0..3).map(|i| bar.segment_duration_ms(i)).sum();
        assert!((0..3).all(|i| bar.segment_duration_ms(i) >= 0.0));
        assert!(sum <= frame_ms + 1e-3, "{} > {}", sum, frame_ms);
    }

    #[test]
    fn test_begin_moves_frame_to_previous() {
        let t0 = Instant::now();
        let mut bar = TimingBar::new();
        bar.begin_at(Pixel::RED, t0);
        bar.set_colour_at(Pixel::BLUE, t0 + ms(1));
        bar.begin_at(Pixel::RED, t0 + ms(4));
        assert_eq!(bar.segment_count(), 0);
        let prev = bar.previous_segments();
        assert_eq!(prev.len(), 2);
        assert_eq!(prev[0].duration, ms(1));
        assert_eq!(prev[1].colour, Pixel::BLUE);
        assert_eq!(prev[1].duration, ms(3));
    }

    #[test]
    fn test_draw_proportional_blocks_and_outline() {
        let t0 = Instant::now();
        let mut bar = TimingBar::new();
        bar.begin_at(Pixel::RED, t0);
        bar.set_colour_at(Pixel::BLUE, t0 + ms(1));
        bar.begin_at(Pixel::RED, t0 + ms(4));

        let mut target = PixelBuffer::new(12, 6);
        bar.draw(&mut target, 0, 0, 10, 4);
        assert_eq!(target.pixel(0, 0), Some(Pixel::WHITE));
        assert_eq!(target.pixel(9, 3), Some(Pixel::WHITE));
        assert_eq!(target.pixel(1, 1), Some(Pixel::RED));
        assert_eq!(target.pixel(2, 1), Some(Pixel::BLUE));
        assert_eq!(target.pixel(8, 2), Some(Pixel::BLUE));
        assert_eq!(target.pixel(10, 1), Some(Pixel::TRANSPARENT));
    }

    #[test]
    fn test_draw_without_previous_frame_is_outline_only() {
        let bar = TimingBar::new();
        let mut target = PixelBuffer::new(8, 8);
        bar.draw(&mut target, 1, 1, 5, 3);
        let white = target.pixels().iter().filter(|&&p| p == Pixel::WHITE).count();
        assert_eq!(white, 12);
        assert_eq!(target.pixel(3, 2), Some(Pixel::TRANSPARENT));
    }
}
