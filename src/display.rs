//! SDL2 window presenter.
//!
//! Uploads a finished [`PixelBuffer`] to a streaming texture and shows it,
//! stretched to the window. Only quit and key events are forwarded.

use anyhow::Context;
use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::pixels::PixelFormatEnum;
use sdl2::render::{Canvas, Texture, TextureCreator};
use sdl2::video::{Window, WindowContext};
use sdl2::EventPump;

use crate::pixel_buffer::PixelBuffer;

pub struct Display {
    canvas: Canvas<Window>,
    event_pump: EventPump,
    width: u32,
    height: u32,
}

/// Streaming texture the buffer is uploaded into each frame
pub struct PresentTarget<'a> {
    texture: Texture<'a>,
    width: u32,
    height: u32,
}

#[derive(Debug, Clone)]
pub enum InputEvent {
    Quit,
    KeyDown(Keycode),
    KeyUp(Keycode),
}

impl Display {
    /// Open a window `scale` times the buffer size.
    /// vsync=false runs uncapped for performance testing.
    pub fn open(
        title: &str,
        width: u32,
        height: u32,
        scale: u32,
        vsync: bool,
    ) -> anyhow::Result<(Self, TextureCreator<WindowContext>)> {
        let scale = scale.max(1);
        let sdl_context = sdl2::init().map_err(anyhow::Error::msg)?;
        let video_subsystem = sdl_context.video().map_err(anyhow::Error::msg)?;

        let window = video_subsystem
            .window(title, width * scale, height * scale)
            .position_centered()
            .build()
            .context("creating window")?;

        let mut canvas_builder = window.into_canvas().accelerated();
        if vsync {
            canvas_builder = canvas_builder.present_vsync();
        }
        let canvas = canvas_builder.build().context("creating renderer")?;

        let texture_creator = canvas.texture_creator();
        let event_pump = sdl_context.event_pump().map_err(anyhow::Error::msg)?;
        log::info!(
            "display: {}x{} window (scale {}, vsync {})",
            width * scale,
            height * scale,
            scale,
            vsync
        );

        Ok((
            Self {
                canvas,
                event_pump,
                width,
                height,
            },
            texture_creator,
        ))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn set_title(&mut self, title: &str) {
        if let Err(e) = self.canvas.window_mut().set_title(title) {
            log::warn!("set_title: {}", e);
        }
    }

    /// Upload `buffer` and show it. The buffer must match the target size.
    pub fn present(&mut self, target: &mut PresentTarget, buffer: &PixelBuffer) -> anyhow::Result<()> {
        anyhow::ensure!(
            buffer.width() == target.width && buffer.height() == target.height,
            "present: {}x{} buffer for a {}x{} target",
            buffer.width(),
            buffer.height(),
            target.width,
            target.height
        );
        let bytes = buffer.to_rgba_bytes_top_down();
        target
            .texture
            .update(None, &bytes, (buffer.width() * 4) as usize)
            .context("uploading frame")?;

        self.canvas
            .copy(&target.texture, None, None)
            .map_err(anyhow::Error::msg)?;
        self.canvas.present();
        Ok(())
    }

    pub fn poll_events(&mut self) -> Vec<InputEvent> {
        let mut events = Vec::new();

        for event in self.event_pump.poll_iter() {
            match event {
                Event::Quit { .. } => events.push(InputEvent::Quit),
                Event::KeyDown {
                    keycode: Some(k), ..
                } => events.push(InputEvent::KeyDown(k)),
                Event::KeyUp {
                    keycode: Some(k), ..
                } => events.push(InputEvent::KeyUp(k)),
                _ => {},
            }
        }

        events
    }
}

impl<'a> PresentTarget<'a> {
    pub fn new(
        texture_creator: &'a TextureCreator<WindowContext>,
        width: u32,
        height: u32,
    ) -> anyhow::Result<Self> {
        // RGBA32 is byte order R, G, B, A on every platform
        let texture = texture_creator
            .create_texture_streaming(PixelFormatEnum::RGBA32, width, height)
            .context("creating frame texture")?;
        Ok(Self {
            texture,
            width,
            height,
        })
    }
}
