use anyhow::{Context, Result};
use std::path::Path;
use tiny_skia::{Color, Pixmap};

pub struct Canvas {
    pub pixmap: Pixmap,
}

pub struct FontState {
    font: fontdue::Font,
}

/// Straight-alpha ARGB32 image in network byte order, the layout
/// StatusNotifierItem hosts expect for `IconPixmap`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconImage {
    pub width: u32,
    pub height: u32,
    pub argb: Vec<u8>,
}

const OUTLINE_COLOR: [u8; 4] = [0x00, 0x00, 0x00, 0xCC];

impl Canvas {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let pixmap = Pixmap::new(width, height)
            .with_context(|| format!("Invalid canvas size {}x{}", width, height))?;
        Ok(Self { pixmap })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn clear(&mut self, color: [u8; 4]) {
        self.pixmap.fill(Color::from_rgba8(color[0], color[1], color[2], color[3]));
    }

    pub fn to_icon(&self) -> IconImage {
        let mut argb = Vec::with_capacity(self.pixmap.data().len());
        for px in self.pixmap.pixels() {
            let c = px.demultiply();
            argb.extend_from_slice(&[c.alpha(), c.red(), c.green(), c.blue()]);
        }
        IconImage { width: self.width(), height: self.height(), argb }
    }

    /// Blend a row-major glyph coverage mask of `width` columns at (`left`, `top`).
    fn blit_coverage(&mut self, left: i32, top: i32, width: usize, coverage: &[u8], color: [u8; 4]) {
        if width == 0 {
            return;
        }
        let (cw, ch) = (self.width() as i32, self.height() as i32);
        for (row, line) in coverage.chunks(width).enumerate() {
            let py = top + row as i32;
            if !(0..ch).contains(&py) {
                continue;
            }
            for (col, &c) in line.iter().enumerate() {
                let px = left + col as i32;
                if c == 0 || !(0..cw).contains(&px) {
                    continue;
                }
                let alpha = (c as u32 * color[3] as u32 / 255) as u8;
                if alpha > 0 {
                    blend_pixel(&mut self.pixmap, px as u32, py as u32, color, alpha);
                }
            }
        }
    }
}

impl FontState {
    /// Load `font_name` as a file path, falling back to the first monospace
    /// font in the usual system font directories, then to any font at all.
    pub fn load(font_name: &str) -> Result<Self> {
        if let Some(font) = font_from_file(Path::new(font_name)) {
            log::info!("Using font: {}", font_name);
            return Ok(Self { font });
        }

        let search_paths = [
            "/usr/share/fonts",
            "/usr/local/share/fonts",
            "/nix/var/nix/profiles/system/sw/share/X11/fonts",
        ];
        let is_mono = |p: &Path| p.to_string_lossy().contains("Mono");
        let any = |_: &Path| true;

        for base in &search_paths {
            if let Some(font) = walk_for_font(Path::new(base), &is_mono) {
                return Ok(Self { font });
            }
        }
        for base in &search_paths {
            if let Some(font) = walk_for_font(Path::new(base), &any) {
                return Ok(Self { font });
            }
        }

        anyhow::bail!(
            "No usable font found for '{}'. Install a TTF font or pass --font <path>",
            font_name
        )
    }

    /// Total advance width of `text` at `size`.
    pub fn measure_text(&self, text: &str, size: f32) -> f32 {
        text.chars().map(|ch| self.font.metrics(ch, size).advance_width).sum()
    }

    /// Draw `text` eight times around its position in `outline_color`,
    /// then once on top, so the label reads on light and dark panels.
    pub fn draw_text_outlined(&self, canvas: &mut Canvas, text: &str, x: f32, y: f32, size: f32, color: [u8; 4], outline_color: [u8; 4]) {
        let r = outline_radius(size);
        for dx in [-r, 0.0, r] {
            for dy in [-r, 0.0, r] {
                if dx != 0.0 || dy != 0.0 {
                    self.draw_text(canvas, text, x + dx, y + dy, size, outline_color);
                }
            }
        }
        self.draw_text(canvas, text, x, y, size, color);
    }

    /// Draw `text` with its em box top-left at (`x`, `y`).
    pub fn draw_text(&self, canvas: &mut Canvas, text: &str, x: f32, y: f32, size: f32, color: [u8; 4]) {
        let baseline = y as i32 + size as i32;
        let mut pen_x = x;
        for ch in text.chars() {
            let (metrics, coverage) = self.font.rasterize(ch, size);
            let left = pen_x as i32 + metrics.xmin;
            let top = baseline - metrics.height as i32 - metrics.ymin;
            canvas.blit_coverage(left, top, metrics.width, &coverage, color);
            pen_x += metrics.advance_width;
        }
    }
}

fn outline_radius(size: f32) -> f32 {
    (size * 0.04).clamp(0.8, 1.5)
}

/// Largest font size `render_label` accepts; tray icons are tiny.
pub const MAX_LABEL_SIZE: f32 = 256.0;

/// Render a short label such as `57%` onto a transparent canvas sized to fit.
pub fn render_label(font: &FontState, label: &str, size: f32, color: [u8; 4]) -> Result<IconImage> {
    anyhow::ensure!(
        size.is_finite() && size > 0.0 && size <= MAX_LABEL_SIZE,
        "Label font size {} outside 0..={}",
        size,
        MAX_LABEL_SIZE
    );
    let pad = outline_radius(size).ceil() + 1.0;
    let width = (font.measure_text(label, size) + pad * 2.0).ceil().max(1.0) as u32;
    let height = (size + pad * 2.0).ceil() as u32;

    let mut canvas = Canvas::new(width, height)?;
    canvas.clear([0, 0, 0, 0]);
    font.draw_text_outlined(&mut canvas, label, pad, pad, size, color, OUTLINE_COLOR);
    Ok(canvas.to_icon())
}

fn font_from_file(path: &Path) -> Option<fontdue::Font> {
    let data = std::fs::read(path).ok()?;
    fontdue::Font::from_bytes(data, fontdue::FontSettings::default()).ok()
}

fn walk_for_font(dir: &Path, accept: &dyn Fn(&Path) -> bool) -> Option<fontdue::Font> {
    let entries = std::fs::read_dir(dir).ok()?;
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            if let Some(f) = walk_for_font(&path, accept) {
                return Some(f);
            }
            continue;
        }
        let Some(ext) = path.extension() else { continue };
        let ext = ext.to_string_lossy().to_lowercase();
        if (ext == "ttf" || ext == "otf") && accept(&path) {
            if let Some(font) = font_from_file(&path) {
                log::info!("Found font: {}", path.display());
                return Some(font);
            }
        }
    }
    None
}

/// Source-over blend in premultiplied space, matching tiny-skia's storage.
fn blend_pixel(pixmap: &mut Pixmap, x: u32, y: u32, color: [u8; 4], alpha: u8) {
    let idx = ((y * pixmap.width() + x) * 4) as usize;
    let Some(px) = pixmap.data_mut().get_mut(idx..idx + 4) else { return };

    let a = alpha as u32;
    let keep = 255 - a;
    for (dst, &src) in px[..3].iter_mut().zip(&color[..3]) {
        *dst = ((src as u32 * a + *dst as u32 * keep) / 255) as u8;
    }
    px[3] = (a + px[3] as u32 * keep / 255).min(255) as u8;
}
