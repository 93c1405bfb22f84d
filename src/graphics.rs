//! The graphics context.
//!
//! `Graphics` owns the display buffer, an optional off-screen render target,
//! the active blend mode, every loaded sprite, background images and the
//! timing bar. All drawing goes to the active target: the off-screen buffer
//! when one is installed, the display buffer otherwise.

use std::path::{Path, PathBuf};

use crate::assets;
use crate::collision;
use crate::compositor;
use crate::config::GraphicsConfig;
use crate::math2d::{Matrix2D, Point2f, Vector2f};
use crate::pixel::{BlendColour, BlendMode, Pixel};
use crate::pixel_buffer::PixelBuffer;
use crate::sprite::{Sprite, SpriteId, SpriteStore};
use crate::text::{self, debug_font};
use crate::timing::TimingBar;

pub struct Graphics {
    config: GraphicsConfig,
    display: PixelBuffer,
    offscreen: Option<PixelBuffer>,
    blend_mode: BlendMode,
    sprites: SpriteStore,
    backgrounds: Vec<PixelBuffer>,
    timing: TimingBar,
}

/// The buffer drawing currently goes to
#[inline]
fn active<'a>(offscreen: &'a mut Option<PixelBuffer>, display: &'a mut PixelBuffer) -> &'a mut PixelBuffer {
    offscreen.as_mut().unwrap_or(display)
}

#[inline]
fn to_px(p: Point2f) -> (i32, i32) {
    (p.x.round() as i32, p.y.round() as i32)
}

impl Graphics {
    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Create a context and load every sheet in `config.asset_path`
    pub fn new(config: GraphicsConfig) -> anyhow::Result<Self> {
        let mut graphics = Self::bare(config);
        if let Some(dir) = graphics.config.asset_path.clone() {
            graphics.load_sprites_from_dir(&dir)?;
        }
        Ok(graphics)
    }

    /// Create a context with no sprites loaded
    pub fn with_size(width: u32, height: u32) -> Self {
        Self::bare(GraphicsConfig::new(width, height))
    }

    /// Create a `width` x `height` context and load the sheets in `asset_path`
    pub fn create(width: u32, height: u32, asset_path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        Self::new(GraphicsConfig::new(width, height).with_asset_path(asset_path))
    }

    fn bare(config: GraphicsConfig) -> Self {
        log::info!("graphics: {}x{} display buffer", config.width, config.height);
        Self {
            display: PixelBuffer::filled(config.width, config.height, config.clear_colour),
            config,
            offscreen: None,
            blend_mode: BlendMode::Normal,
            sprites: SpriteStore::new(),
            backgrounds: Vec::new(),
            timing: TimingBar::new(),
        }
    }

    /// Load every PNG in `dir` as a sprite sheet, skipping files that fail
    /// to decode. Returns how many were loaded.
    pub fn load_sprites_from_dir(&mut self, dir: impl AsRef<Path>) -> anyhow::Result<usize> {
        let dir = dir.as_ref();
        let mut loaded = 0;
        for path in assets::scan_png_files(dir)? {
            match self.load_sheet_file(&path) {
                Ok(_) => loaded += 1,
                Err(e) => log::warn!("skipping {}: {:#}", path.display(), e),
            }
        }
        log::info!("loaded {} sprite sheets from {}", loaded, dir.display());
        Ok(loaded)
    }

    #[inline]
    pub fn config(&self) -> &GraphicsConfig {
        &self.config
    }

    // ========================================================================
    // Render target and blend mode
    // ========================================================================

    /// The buffer to present
    #[inline]
    pub fn display_buffer(&self) -> &PixelBuffer {
        &self.display
    }

    /// The buffer drawing currently goes to
    pub fn drawing_buffer(&self) -> &PixelBuffer {
        self.offscreen.as_ref().unwrap_or(&self.display)
    }

    pub fn drawing_buffer_mut(&mut self) -> &mut PixelBuffer {
        active(&mut self.offscreen, &mut self.display)
    }

    /// Install an off-screen target (`None` restores the display buffer).
    /// Returns the off-screen buffer that was installed before.
    pub fn set_render_target(&mut self, target: Option<PixelBuffer>) -> Option<PixelBuffer> {
        match &target {
            Some(buf) => log::debug!("render target: {}x{} off-screen", buf.width(), buf.height()),
            None => log::debug!("render target: display"),
        }
        std::mem::replace(&mut self.offscreen, target)
    }

    /// Draw into `buffer` for the duration of `f`, then hand it back with the
    /// previous target restored.
    pub fn draw_into<F>(&mut self, buffer: PixelBuffer, f: F) -> PixelBuffer
    where
        F: FnOnce(&mut Graphics),
    {
        let previous = self.set_render_target(Some(buffer));
        f(self);
        self.set_render_target(previous).unwrap_or_default()
    }

    /// Draw onto a sprite's canvas for the duration of `f`. The sprite's
    /// premultiplied copy is rebuilt on its next draw.
    pub fn draw_into_sprite<F>(&mut self, id: SpriteId, f: F)
    where
        F: FnOnce(&mut Graphics),
    {
        let canvas = self.sprites.get_mut(id).take_canvas();
        let canvas = self.draw_into(canvas, f);
        self.sprites.get_mut(id).restore_canvas(canvas);
    }

    #[inline]
    pub fn set_blend_mode(&mut self, mode: BlendMode) {
        self.blend_mode = mode;
    }

    #[inline]
    pub fn blend_mode(&self) -> BlendMode {
        self.blend_mode
    }

    /// Fill the active target
    pub fn clear_buffer(&mut self, colour: Pixel) {
        self.drawing_buffer_mut().clear(colour);
    }

    // ========================================================================
    // Primitives
    // ========================================================================

    pub fn draw_pixel(&mut self, pos: Point2f, colour: Pixel) {
        let (x, y) = to_px(pos);
        let mode = self.blend_mode;
        self.drawing_buffer_mut().plot(x, y, colour, mode);
    }

    pub fn draw_line(&mut self, start: Point2f, end: Point2f, colour: Pixel) {
        let (x0, y0) = to_px(start);
        let (x1, y1) = to_px(end);
        let mode = self.blend_mode;
        self.drawing_buffer_mut().line(x0, y0, x1, y1, colour, mode);
    }

    pub fn draw_rect(&mut self, bottom_left: Point2f, top_right: Point2f, colour: Pixel, fill: bool) {
        let (x0, y0) = to_px(bottom_left);
        let (x1, y1) = to_px(top_right);
        let mode = self.blend_mode;
        self.drawing_buffer_mut().rect(x0, y0, x1, y1, colour, mode, fill);
    }

    pub fn draw_circle(&mut self, centre: Point2f, radius: i32, colour: Pixel) {
        let (x, y) = to_px(centre);
        let mode = self.blend_mode;
        self.drawing_buffer_mut().circle(x, y, radius, colour, mode);
    }

    /// Blit a straight-alpha buffer with its bottom-left at `pos`
    pub fn draw_pixel_data(&mut self, data: &PixelBuffer, pos: Point2f, alpha: f32) {
        let mode = self.blend_mode;
        compositor::draw_pixel_data(self.drawing_buffer_mut(), data, pos, alpha, mode);
    }

    // ========================================================================
    // Debug text
    // ========================================================================

    /// Returns the advance
    pub fn draw_debug_character(&mut self, pos: Point2f, c: char, colour: Pixel) -> i32 {
        let (x, y) = to_px(pos);
        let mode = self.blend_mode;
        debug_font::draw_char(self.drawing_buffer_mut(), x, y, c, colour, mode)
    }

    /// Returns the x position after the text
    pub fn draw_debug_string(&mut self, pos: Point2f, text: &str, colour: Pixel, centred: bool) -> i32 {
        let (x, y) = to_px(pos);
        let mode = self.blend_mode;
        debug_font::draw_string(self.drawing_buffer_mut(), x, y, text, colour, mode, centred)
    }

    pub fn debug_string_width(&self, text: &str) -> i32 {
        debug_font::string_width(text)
    }

    // ========================================================================
    // Sprite loading
    // ========================================================================

    /// Load `dir/filename`, taking the grid from the file name
    pub fn load_sprite_sheet(&mut self, dir: impl AsRef<Path>, filename: &str) -> anyhow::Result<SpriteId> {
        self.load_sheet_file(&dir.as_ref().join(filename))
    }

    fn load_sheet_file(&mut self, path: &Path) -> anyhow::Result<SpriteId> {
        let canvas = assets::load_png(path)?;
        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        let (h, v) = assets::parse_sheet_grid(file_name);
        anyhow::ensure!(
            canvas.width() >= h && canvas.height() >= v,
            "{}: {}x{} image cannot hold a {}x{} frame grid",
            path.display(),
            canvas.width(),
            canvas.height(),
            h,
            v
        );
        Ok(self.add_sprite(assets::sheet_name(path), canvas, h, v))
    }

    /// Add a sheet built in memory
    pub fn add_sprite(&mut self, name: impl Into<String>, canvas: PixelBuffer, h_count: u32, v_count: u32) -> SpriteId {
        self.sprites.add(name, canvas, h_count, v_count)
    }

    /// Replace the sheet of the first sprite whose name contains `name`
    pub fn update_sprite_data(
        &mut self,
        name: &str,
        canvas: PixelBuffer,
        h_count: u32,
        v_count: u32,
    ) -> Option<SpriteId> {
        self.sprites.replace(name, canvas, h_count, v_count)
    }

    /// Rebuild the premultiplied copy of a sprite whose canvas was edited
    pub fn update_sprite(&mut self, name: &str) -> Option<SpriteId> {
        self.sprites.refresh(name)
    }

    // ========================================================================
    // Backgrounds
    // ========================================================================

    pub fn load_background(&mut self, path: impl AsRef<Path>) -> anyhow::Result<usize> {
        let buffer = assets::load_png(path)?;
        Ok(self.add_background(buffer))
    }

    pub fn add_background(&mut self, buffer: PixelBuffer) -> usize {
        self.backgrounds.push(buffer);
        self.backgrounds.len() - 1
    }

    /// Copy a background over the active target from its bottom-left corner
    pub fn draw_background(&mut self, index: usize) {
        assert!(
            index < self.backgrounds.len(),
            "draw_background: index {} out of range ({} backgrounds)",
            index,
            self.backgrounds.len()
        );
        let target = active(&mut self.offscreen, &mut self.display);
        target.blit_from(&self.backgrounds[index], 0, 0);
    }

    // ========================================================================
    // Sprite queries
    // ========================================================================

    /// First sprite whose name contains `name`
    pub fn sprite_id(&self, name: &str) -> Option<SpriteId> {
        self.sprites.find(name)
    }

    pub fn sprite(&self, id: SpriteId) -> &Sprite {
        self.sprites.get(id)
    }

    pub fn sprite_name(&self, id: SpriteId) -> &str {
        self.sprites.get(id).name()
    }

    /// Frame size in pixels
    pub fn sprite_size(&self, id: SpriteId) -> Vector2f {
        self.sprites.get(id).size()
    }

    pub fn sprite_frames(&self, id: SpriteId) -> u32 {
        self.sprites.get(id).total_frames()
    }

    pub fn sprite_origin(&self, id: SpriteId) -> Vector2f {
        self.sprites.get(id).origin()
    }

    pub fn set_sprite_origin(&mut self, id: SpriteId, origin: Vector2f, relative: bool) {
        self.sprites.get_mut(id).set_origin(origin, relative);
    }

    pub fn flip_sprite_origin_vertically(&mut self, id: SpriteId) {
        self.sprites.get_mut(id).flip_origin_vertically();
    }

    pub fn flip_all_sprite_origins_vertically(&mut self) {
        self.sprites.flip_all_origins_vertically();
    }

    pub fn centre_sprite_origin(&mut self, id: SpriteId) {
        self.sprites.get_mut(id).centre_origin();
    }

    pub fn centre_all_sprite_origins(&mut self) {
        self.sprites.centre_all_origins();
    }

    /// Set the origin of every sprite whose name contains `root_name`
    pub fn set_sprite_origins(&mut self, root_name: &str, origin: Vector2f, relative: bool) -> usize {
        self.sprites.set_origins(root_name, origin, relative)
    }

    pub fn total_loaded_sprites(&self) -> usize {
        self.sprites.len()
    }

    /// The sprite's unmodified sheet
    pub fn sprite_pixel_data(&self, id: SpriteId) -> &PixelBuffer {
        self.sprites.get(id).canvas()
    }

    /// Tint a sprite; white restores its original colours
    pub fn colour_sprite(&mut self, id: SpriteId, r: u8, g: u8, b: u8) {
        self.sprites.get_mut(id).set_tint(Pixel::rgb(r, g, b));
    }

    // ========================================================================
    // Sprite drawing
    // ========================================================================

    pub fn draw(&mut self, id: SpriteId, pos: Point2f, frame: u32) {
        self.draw_transparent(id, pos, frame, BlendColour::WHITE);
    }

    pub fn draw_transparent(&mut self, id: SpriteId, pos: Point2f, frame: u32, multiply: BlendColour) {
        let sprite = self.sprites.prepare(id);
        let target = active(&mut self.offscreen, &mut self.display);
        compositor::draw_transparent(target, sprite, frame, pos, &multiply, self.blend_mode);
    }

    /// Rotate (radians, counter-clockwise) and scale about the sprite origin
    pub fn draw_rotated(
        &mut self,
        id: SpriteId,
        pos: Point2f,
        frame: u32,
        angle: f32,
        scale: f32,
        multiply: BlendColour,
    ) {
        let transform =
            Matrix2D::scale(scale, scale) * Matrix2D::rotation(angle) * Matrix2D::translation(pos.x, pos.y);
        self.draw_transformed(id, &transform, frame, multiply);
    }

    pub fn draw_transformed(&mut self, id: SpriteId, transform: &Matrix2D, frame: u32, multiply: BlendColour) {
        let sprite = self.sprites.prepare(id);
        let target = active(&mut self.offscreen, &mut self.display);
        compositor::draw_transformed(target, sprite, frame, transform, &multiply, self.blend_mode);
    }

    // ========================================================================
    // Sprite fonts
    // ========================================================================

    /// Returns the x position after the glyph
    pub fn draw_char(&mut self, font: SpriteId, pos: Point2f, c: char) -> i32 {
        let sprite = self.sprites.prepare(font);
        let target = active(&mut self.offscreen, &mut self.display);
        text::draw_char(target, sprite, pos, c, &BlendColour::WHITE, self.blend_mode)
    }

    /// Returns the scaled advance
    pub fn draw_char_rotated(&mut self, font: SpriteId, pos: Point2f, angle: f32, scale: f32, c: char) -> i32 {
        let sprite = self.sprites.prepare(font);
        let target = active(&mut self.offscreen, &mut self.display);
        text::draw_char_rotated(target, sprite, pos, angle, scale, c, &BlendColour::WHITE, self.blend_mode)
    }

    /// Returns the x position after the text
    pub fn draw_string(&mut self, font: SpriteId, pos: Point2f, text: &str) -> i32 {
        let sprite = self.sprites.prepare(font);
        let target = active(&mut self.offscreen, &mut self.display);
        text::draw_string(target, sprite, pos, text, &BlendColour::WHITE, self.blend_mode)
    }

    /// Draw centred horizontally on `pos`; returns the x position after the text
    pub fn draw_string_centred(&mut self, font: SpriteId, pos: Point2f, text: &str) -> i32 {
        let sprite = self.sprites.prepare(font);
        let target = active(&mut self.offscreen, &mut self.display);
        text::draw_string_centred(target, sprite, pos, text, &BlendColour::WHITE, self.blend_mode)
    }

    pub fn font_char_width(&self, font: SpriteId, c: char) -> i32 {
        text::char_width(self.sprites.get(font), c)
    }

    pub fn string_width(&self, font: SpriteId, text: &str) -> i32 {
        text::string_width(self.sprites.get(font), text)
    }

    // ========================================================================
    // Collision
    // ========================================================================

    /// Pixel-exact overlap of two transformed frames
    pub fn sprite_collide(
        &self,
        id_a: SpriteId,
        frame_a: u32,
        transform_a: &Matrix2D,
        id_b: SpriteId,
        frame_b: u32,
        transform_b: &Matrix2D,
    ) -> bool {
        collision::sprites_collide(
            self.sprites.get(id_a),
            frame_a,
            transform_a,
            self.sprites.get(id_b),
            frame_b,
            transform_b,
            self.config.collision_alpha_threshold,
        )
    }

    // ========================================================================
    // Timing bar
    // ========================================================================

    pub fn timing_bar_begin(&mut self, colour: Pixel) {
        self.timing.begin(colour);
    }

    /// Returns the number of completed segments this frame
    pub fn set_timing_bar_colour(&mut self, colour: Pixel) -> usize {
        self.timing.set_colour(colour)
    }

    /// Draw the previous frame's timing with its bottom-left at `pos`
    pub fn draw_timing_bar(&mut self, pos: Point2f, size: Vector2f) {
        let (x, y) = to_px(pos);
        let (w, h) = to_px(size);
        let target = active(&mut self.offscreen, &mut self.display);
        self.timing.draw(target, x, y, w, h);
    }

    /// Milliseconds of completed segment `id` this frame, 0.0 if out of range
    pub fn timing_segment_duration(&self, id: usize) -> f32 {
        self.timing.segment_duration_ms(id)
    }

    pub fn timing_segment_count(&self) -> usize {
        self.timing.segment_count()
    }

    pub fn timing_bar(&self) -> &TimingBar {
        &self.timing
    }
}

impl Drop for Graphics {
    fn drop(&mut self) {
        log::debug!(
            "graphics: releasing {} sprites and {} backgrounds",
            self.sprites.len(),
            self.backgrounds.len()
        );
    }
}
