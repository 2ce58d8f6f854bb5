//! Simulated scanline refresh loop

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use matrix_layer::{LayerPixel, LutBuilder, Refresher, Rgb48};

use crate::config::DriverConfig;
use crate::frame::Frame;

/// Consumer-side frame driver.
///
/// Each [`tick`](Self::tick) is one displayed frame: the frame-boundary
/// callback runs once, then every physical row is composited in order with
/// the brightness shift latched for that frame.
pub struct RefreshDriver<'a, 'buf, P: LayerPixel, B> {
    refresher: Refresher<'a, 'buf, P>,
    lut: B,
    config: DriverConfig,
    frames: u64,
    scanline: Vec<Rgb48>,
}

impl<'a, 'buf, P: LayerPixel, B: LutBuilder> RefreshDriver<'a, 'buf, P, B> {
    /// Drive `refresher`, rebuilding its LUT with `lut` every frame.
    pub fn new(refresher: Refresher<'a, 'buf, P>, lut: B, config: DriverConfig) -> Self {
        tracing::debug!(
            width = refresher.width(),
            height = refresher.height(),
            period_ms = config.frame_period.as_millis() as u64,
            "refresh driver created"
        );
        Self {
            refresher,
            lut,
            config,
            frames: 0,
            scanline: Vec::new(),
        }
    }

    /// Frames produced so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Driver settings.
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// The consumer handle being driven.
    pub fn refresher(&self) -> &Refresher<'a, 'buf, P> {
        &self.refresher
    }

    /// Release the consumer handle.
    pub fn into_refresher(self) -> Refresher<'a, 'buf, P> {
        self.refresher
    }

    /// Produce one frame.
    // width and height were validated when the layer was built
    #[allow(clippy::arithmetic_side_effects)]
    pub fn tick(&mut self) -> Frame {
        let swapped = self.refresher.is_layer_changed();
        self.refresher.frame_refresh_callback(&mut self.lut);
        let shifts = self.refresher.requested_brightness_shifts();

        let (width, height) = (self.refresher.width(), self.refresher.height());
        let row_len = usize::from(width);
        self.scanline.clear();
        self.scanline
            .resize(row_len * usize::from(height), self.config.underlay);
        for (y, row) in (0..height).zip(self.scanline.chunks_mut(row_len)) {
            self.refresher.fill_refresh_row(y, row, shifts);
        }

        self.frames = self.frames.wrapping_add(1);
        tracing::trace!(frame = self.frames, swapped, shifts, "frame composited");
        Frame::from_rows(width, height, &self.scanline)
    }

    /// Tick every `frame_period` until `stop` is set, passing each frame to
    /// `on_frame`. Returns the number of frames produced.
    #[allow(clippy::arithmetic_side_effects)]
    pub fn run_until<F>(&mut self, stop: &AtomicBool, mut on_frame: F) -> u64
    where
        F: FnMut(&Frame),
    {
        let span = tracing::info_span!("refresh", width = self.refresher.width());
        let _guard = span.enter();
        let start_frames = self.frames;
        let started = Instant::now();

        while !stop.load(Ordering::Acquire) {
            let deadline = Instant::now() + self.config.frame_period;
            let frame = self.tick();
            on_frame(&frame);
            let now = Instant::now();
            if now < deadline {
                std::thread::sleep(deadline - now);
            } else {
                tracing::warn!(
                    frame = self.frames,
                    overrun_us = (now - deadline).as_micros() as u64,
                    "frame overran its period"
                );
            }
        }

        let produced = self.frames.wrapping_sub(start_frames);
        tracing::info!(
            frames = produced,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "refresh loop stopped"
        );
        produced
    }
}
