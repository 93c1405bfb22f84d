use std::path::PathBuf;

use sdl2::keyboard::Keycode;
use sheetblit::display::{Display, InputEvent, PresentTarget};
use sheetblit::{
    BlendColour, BlendMode, FpsCounter, Graphics, GraphicsConfig, Matrix2D, Pixel, PixelBuffer,
    Point2f, SpriteId, Vector2f,
};

const BALL_SIZE: u32 = 16;
const BALL_FRAMES: u32 = 4;
const BALL_COUNT: usize = 12;
const FONT_CELL: u32 = 8;

struct Args {
    width: Option<u32>,
    height: Option<u32>,
    scale: u32,
    vsync: bool,
    assets: Option<PathBuf>,
    config: Option<PathBuf>,
}

/// Parse command line arguments
fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut parsed = Args {
        width: None,
        height: None,
        scale: 2,
        vsync: true,
        assets: None,
        config: None,
    };

    let mut i = 1;
    while i < args.len() {
        let value = args.get(i + 1);
        match args[i].as_str() {
            "--no-vsync" => parsed.vsync = false,
            "--width" | "-w" => {
                parsed.width = value.and_then(|v| v.parse().ok()).or(parsed.width);
                i += 1;
            },
            "--height" | "-h" => {
                parsed.height = value.and_then(|v| v.parse().ok()).or(parsed.height);
                i += 1;
            },
            "--resolution" | "-r" => {
                // WxH, e.g. 320x180
                if let Some((w, h)) = value.and_then(|v| v.split_once('x')) {
                    if let (Ok(w), Ok(h)) = (w.parse(), h.parse()) {
                        parsed.width = Some(w);
                        parsed.height = Some(h);
                    }
                }
                i += 1;
            },
            "--scale" | "-s" => {
                parsed.scale = value.and_then(|v| v.parse().ok()).unwrap_or(parsed.scale);
                i += 1;
            },
            "--assets" | "-a" => {
                parsed.assets = value.map(PathBuf::from);
                i += 1;
            },
            "--config" | "-c" => {
                parsed.config = value.map(PathBuf::from);
                i += 1;
            },
            "--help" => {
                let defaults = GraphicsConfig::default();
                println!("Usage: sheetblit-demo [OPTIONS]");
                println!();
                println!("Options:");
                println!("  --width W, -w W           Buffer width (default: {})", defaults.width);
                println!("  --height H, -h H          Buffer height (default: {})", defaults.height);
                println!("  --resolution WxH, -r WxH  Buffer size (e.g., 320x180)");
                println!("  --scale N, -s N           Window pixels per buffer pixel (default: 2)");
                println!("  --assets DIR, -a DIR      Load every PNG in DIR as a sprite sheet");
                println!("  --config FILE, -c FILE    Read settings from a JSON config");
                println!("  --no-vsync                Disable VSync for uncapped framerate");
                println!("  --help                    Show this help message");
                std::process::exit(0);
            },
            other => log::warn!("ignoring argument '{}'", other),
        }
        i += 1;
    }

    parsed
}

/// Four frames of a shaded ball, built with the primitive rasterizer
fn build_ball_sheet(g: &mut Graphics) -> SpriteId {
    let id = g.add_sprite(
        "ball_4",
        PixelBuffer::new(BALL_SIZE * BALL_FRAMES, BALL_SIZE),
        BALL_FRAMES,
        1,
    );
    g.draw_into_sprite(id, |g| {
        let radius = (BALL_SIZE / 2) as i32 - 1;
        for frame in 0..BALL_FRAMES {
            let centre = Point2f::new(
                (frame * BALL_SIZE + BALL_SIZE / 2) as f32,
                (BALL_SIZE / 2) as f32,
            );
            let hue = frame as f32 * 90.0;
            for r in 0..=radius {
                let v = 1.0 - r as f32 / (radius as f32 * 1.6);
                g.draw_circle(centre, r, Pixel::from_hsv(hue, 0.8, v));
                // Fill the gaps the outline leaves between rings
                g.draw_circle(centre + Vector2f::new(0.5, 0.0), r, Pixel::from_hsv(hue, 0.8, v));
            }
        }
    });
    g.centre_sprite_origin(id);
    id
}

/// 16x8 ASCII sheet rendered from the debug font, usable as a sprite font
fn build_font_sheet(g: &mut Graphics) -> SpriteId {
    let (cols, rows) = (16, 8);
    let id = g.add_sprite(
        "debugfont_16x8",
        PixelBuffer::new(FONT_CELL * cols, FONT_CELL * rows),
        cols,
        rows,
    );
    g.draw_into_sprite(id, |g| {
        for code in 32u8..127 {
            let (col, row_from_top) = (code as u32 % cols, code as u32 / cols);
            let pos = Point2f::new(
                (col * FONT_CELL) as f32,
                (FONT_CELL * rows - (row_from_top + 1) * FONT_CELL) as f32,
            );
            g.draw_debug_character(pos, code as char, Pixel::WHITE);
        }
    });
    id
}

/// Vertical gradient used as the backdrop
fn build_background(width: u32, height: u32) -> PixelBuffer {
    let mut buffer = PixelBuffer::new(width, height);
    for y in 0..height {
        let t = y as f32 / height.max(1) as f32;
        let colour = Pixel::from_hsv(220.0 + 40.0 * t, 0.6, 0.15 + 0.25 * t);
        buffer.hline(0, width as i32 - 1, y as i32, colour, BlendMode::Normal);
    }
    buffer
}

struct Ball {
    pos: Vector2f,
    vel: Vector2f,
    frame: u32,
    angle: f32,
    spin: f32,
}

impl Ball {
    fn transform(&self) -> Matrix2D {
        Matrix2D::rotation(self.angle) * Matrix2D::translation(self.pos.x, self.pos.y)
    }
}

const BLEND_MODES: [BlendMode; 4] = [
    BlendMode::Normal,
    BlendMode::Add,
    BlendMode::Multiply,
    BlendMode::Subtract,
];

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = parse_args();

    let mut config = match &args.config {
        Some(path) => GraphicsConfig::load(path)?,
        None => GraphicsConfig::default(),
    };
    config.width = args.width.unwrap_or(config.width);
    config.height = args.height.unwrap_or(config.height);
    if args.assets.is_some() {
        config.asset_path = args.assets.clone();
    }
    let (width, height) = (config.width, config.height);

    let (mut display, texture_creator) =
        Display::open("sheetblit", width, height, args.scale, args.vsync)?;
    let mut target = PresentTarget::new(&texture_creator, width, height)?;
    let mut g = Graphics::new(config)?;

    let ball = build_ball_sheet(&mut g);
    let font = build_font_sheet(&mut g);
    let background = g.add_background(build_background(width, height));

    let mut balls: Vec<Ball> = (0..BALL_COUNT)
        .map(|i| {
            let t = i as f32 / BALL_COUNT as f32;
            Ball {
                pos: Vector2f::new(width as f32 * (0.1 + 0.8 * t), height as f32 * (0.2 + 0.6 * t)),
                vel: Vector2f::new(40.0 + 90.0 * t, 70.0 - 50.0 * t),
                frame: i as u32 % BALL_FRAMES,
                angle: 0.0,
                spin: 1.0 - 2.0 * t,
            }
        })
        .collect();

    let mut fps_counter = FpsCounter::new(60);
    let mut blend_index = 0;
    let mut tinted = false;
    let mut show_timing = true;

    println!("=== sheetblit ===");
    println!("Buffer: {}x{} ({} sprites loaded)", width, height, g.total_loaded_sprites());
    println!("Controls:");
    println!("  B       - Cycle blend mode");
    println!("  C       - Toggle ball tint");
    println!("  T       - Toggle timing bar");
    println!("  Escape  - Quit");

    'main: loop {
        let dt = fps_counter.tick().min(0.1);
        g.timing_bar_begin(Pixel::GREY);

        for event in display.poll_events() {
            match event {
                InputEvent::Quit => break 'main,
                InputEvent::KeyDown(Keycode::Escape) => break 'main,
                InputEvent::KeyDown(Keycode::B) => {
                    blend_index = (blend_index + 1) % BLEND_MODES.len();
                    log::info!("blend mode: {:?}", BLEND_MODES[blend_index]);
                },
                InputEvent::KeyDown(Keycode::C) => {
                    tinted = !tinted;
                    if tinted {
                        g.colour_sprite(ball, 255, 160, 60);
                    } else {
                        g.colour_sprite(ball, 255, 255, 255);
                    }
                },
                InputEvent::KeyDown(Keycode::T) => show_timing = !show_timing,
                _ => {},
            }
        }

        // Update
        g.set_timing_bar_colour(Pixel::GREEN);
        let half = BALL_SIZE as f32 / 2.0;
        for b in &mut balls {
            b.pos += b.vel * dt;
            b.angle += b.spin * dt;
            if b.pos.x < half || b.pos.x > width as f32 - half {
                b.vel.x = -b.vel.x;
                b.pos.x = b.pos.x.clamp(half, width as f32 - half);
            }
            if b.pos.y < half || b.pos.y > height as f32 - half {
                b.vel.y = -b.vel.y;
                b.pos.y = b.pos.y.clamp(half, height as f32 - half);
            }
        }

        // Draw
        g.set_timing_bar_colour(Pixel::BLUE);
        g.set_blend_mode(BlendMode::Normal);
        g.draw_background(background);
        g.set_blend_mode(BLEND_MODES[blend_index]);
        for (i, b) in balls.iter().enumerate() {
            let alpha = 0.5 + 0.5 * (i as f32 / BALL_COUNT as f32);
            g.draw_rotated(ball, b.pos, b.frame, b.angle, 1.0, BlendColour::alpha(alpha));
        }
        g.set_blend_mode(BlendMode::Normal);

        g.set_timing_bar_colour(Pixel::MAGENTA);
        let mut hits = 0;
        for (i, a) in balls.iter().enumerate() {
            for b in &balls[i + 1..] {
                if g.sprite_collide(ball, a.frame, &a.transform(), ball, b.frame, &b.transform()) {
                    hits += 1;
                    let (pa, pb) = (a.pos, b.pos);
                    g.draw_line(pa, pb, Pixel::RED);
                }
            }
        }

        g.set_timing_bar_colour(Pixel::YELLOW);
        let top = height as f32 - FONT_CELL as f32 - 2.0;
        g.draw_string_centred(font, Point2f::new(width as f32 / 2.0, top), "SHEETBLIT");
        let status = format!(
            "{:.0} fps  {:?}  hits {}",
            fps_counter.average_fps(),
            BLEND_MODES[blend_index],
            hits
        );
        g.draw_debug_string(Point2f::new(4.0, 4.0), &status, Pixel::WHITE, false);
        if show_timing {
            g.draw_timing_bar(
                Point2f::new(width as f32 - 104.0, 4.0),
                Vector2f::new(100.0, 6.0),
            );
        }

        g.set_timing_bar_colour(Pixel::CYAN);
        display.present(&mut target, g.display_buffer())?;
    }

    Ok(())
}
