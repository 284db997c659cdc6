use std::collections::HashSet;

use anyhow::{Context, Result, ensure};
use pictor_engine::coords::{PixelRect, Vec2};
use pictor_engine::device::{
    ColormapId, Display, DisplayId, MemoryDisplay, MemorySurface, Surface, SurfaceDescriptor,
    Visual, VisualId,
};
use pictor_engine::logging::{LoggingConfig, init_logging};
use pictor_engine::paint::{ColorStop, LinearGradient, PaintBrush, Rgba, SpreadMode};
use pictor_engine::painter::{PainterCache, PainterInit};
use pictor_engine::picture::Picture;
use pictor_engine::raster::{
    EllipseCmd, LineCmd, PolygonCmd, RasterConfig, Rasterizer, RectCmd, Shadow,
};

const DISPLAY: DisplayId = DisplayId(0);

fn main() -> Result<()> {
    let (verbose, args) = split_verbose(std::env::args().skip(1).collect());
    init_logging(if verbose { LoggingConfig::verbose() } else { LoggingConfig::default() });

    let (width, height) = parse_size(args)?;
    let scene = draw_scene(width, height);
    log::info!("scene drawn at {width}x{height}");

    println!();
    println!("  ╔════════════════════════════════════════╗");
    println!("  ║           PICTOR DEVICE TOUR           ║");
    println!("  ╚════════════════════════════════════════╝");
    println!();

    let mut display = MemoryDisplay::new(DISPLAY);
    let mut cache = PainterCache::new(PainterInit::default());
    for (name, visual, depth) in devices() {
        let colormap = ColormapId(visual.id.0);
        display.add_colormap(colormap, &visual);
        let descriptor = SurfaceDescriptor::new(DISPLAY, colormap, visual, depth);
        let mut surface = MemorySurface::new(descriptor, width, height);

        let handle = cache
            .acquire(&mut display, &descriptor)
            .with_context(|| format!("no painter for the {name} device"))?;
        let painter = cache.get(handle).context("painter vanished after acquire")?;
        let dither = painter.quantizer().is_quantized();
        painter.paint(&mut surface, &scene, scene.bounds(), 0, 0, dither)?;
        let shown = painter.snapshot(&surface, surface.bounds())?;

        let colors: HashSet<u32> = surface.pixels().iter().copied().collect();
        let error = mean_error(&scene, &shown);
        log::info!(
            "painted {name} (depth {depth}, {} writes, dither {dither})",
            surface.writes()
        );
        println!(
            "  {name:<10} ramp {:<8} {:>4} device colors  error {error:>6.2}",
            painter.quantizer().ramp().to_string(),
            colors.len(),
        );
        cache.release(handle);
    }

    let destroyed = cache.collect_garbage(&mut display);
    log::info!("collected {destroyed} painters, {} left cached", cache.len());
    println!();
    println!("  {destroyed} painters collected, display {:?} clean.", display.id());
    println!();
    Ok(())
}

/// Removes every `-v` flag; reports whether there was one.
fn split_verbose(mut args: Vec<String>) -> (bool, Vec<String>) {
    let before = args.len();
    args.retain(|a| a != "-v");
    (args.len() != before, args)
}

fn parse_size(args: Vec<String>) -> Result<(u32, u32)> {
    ensure!(args.is_empty() || args.len() == 2, "usage: pictor-studio [-v] [WIDTH HEIGHT]");
    if args.is_empty() {
        return Ok((96, 64));
    }
    let width: u32 = args[0].parse().with_context(|| format!("bad width {:?}", args[0]))?;
    let height: u32 = args[1].parse().with_context(|| format!("bad height {:?}", args[1]))?;
    ensure!(
        (8..=4096).contains(&width) && (8..=4096).contains(&height),
        "size must be between 8 and 4096 pixels per side"
    );
    Ok((width, height))
}

fn devices() -> [(&'static str, Visual, u8); 5] {
    [
        ("truecolor", Visual::true_color(VisualId(1), 0xFF0000, 0xFF00, 0xFF), 24),
        ("rgb565", Visual::true_color(VisualId(2), 0xF800, 0x07E0, 0x1F), 16),
        ("indexed", Visual::indexed(VisualId(3), 256, false), 8),
        ("gray", Visual::indexed(VisualId(4), 16, true), 4),
        ("mono", Visual::monochrome(VisualId(5)), 1),
    ]
}

fn draw_scene(width: u32, height: u32) -> Picture {
    let (w, h) = (width as i32, height as i32);
    let mut pic = Picture::new(width, height);
    let mut raster = Rasterizer::new(RasterConfig::default());

    let sky = LinearGradient::new(
        Vec2::new(0.0, 0.0),
        Vec2::new(0.0, 1.0),
        vec![
            ColorStop::new(0.0, Rgba::rgb(32, 64, 160)),
            ColorStop::new(1.0, Rgba::rgb(240, 200, 160)),
        ],
        SpreadMode::Pad,
    );
    raster.rect(&mut pic, &RectCmd::filled(0, 0, w, h, PaintBrush::linear(sky)));

    let shadow = Shadow::new(3, 2, 2, Rgba::new(0, 0, 0, 96));
    let sun_brush = PaintBrush::solid(Rgba::rgb(255, 220, 64));
    let sun = EllipseCmd::circle(w * 3 / 4, h / 4, h / 6, sun_brush)
        .antialiased(true)
        .with_shadow(shadow);
    raster.ellipse(&mut pic, &sun);

    let hill = PolygonCmd::new(
        vec![
            Vec2::new(0.0, h as f32),
            Vec2::new(w as f32 * 0.35, h as f32 * 0.55),
            Vec2::new(w as f32 * 0.7, h as f32),
        ],
        PaintBrush::solid(Rgba::rgb(40, 120, 60)),
    )
    .antialiased(true);
    raster.polygon(&mut pic, &hill);

    let frame = PixelRect::new(2, 2, w - 4, h - 4);
    let border = RectCmd::new(frame, 4, 1, PaintBrush::solid(Rgba::new(255, 255, 255, 160)));
    raster.rect(&mut pic, &border);
    raster.line(&mut pic, &LineCmd::new(0, h - 1, w - 1, h / 2, Rgba::new(200, 40, 40, 200)));
    pic
}

/// Mean absolute per-channel difference between two opaque pictures.
fn mean_error(want: &Picture, shown: &Picture) -> f64 {
    let total: u64 = want
        .pixels()
        .iter()
        .zip(shown.pixels())
        .map(|(a, b)| {
            (a.r.abs_diff(b.r) as u64) + (a.g.abs_diff(b.g) as u64) + (a.b.abs_diff(b.b) as u64)
        })
        .sum();
    total as f64 / (want.pixels().len().max(1) * 3) as f64
}
