use std::rc::Rc;

use log::trace;

use crate::core::util::HashMap;

pub type Rgba = [u8; 4];

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Grows (or shrinks, for negative amounts) around the same center.
    pub fn inflate(self, dx: i32, dy: i32) -> Self {
        let width = (self.width as i64 + dx as i64).max(0) as u32;
        let height = (self.height as i64 + dy as i64).max(0) as u32;
        Self {
            x: self.x - dx / 2,
            y: self.y - dy / 2,
            width,
            height,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl Bitmap {
    pub fn new(width: u32, height: u32, fill: Rgba) -> Self {
        Self {
            width,
            height,
            pixels: vec![fill; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn rect(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    pub fn get(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(self.index(x, y)).copied()
    }

    pub fn set(&mut self, x: u32, y: u32, color: Rgba) {
        if x < self.width && y < self.height {
            let index = self.index(x, y);
            self.pixels[index] = color;
        }
    }

    /// Fills `rect` clipped to the bitmap bounds.
    pub fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        let x0 = rect.x.max(0) as u32;
        let y0 = rect.y.max(0) as u32;
        let x1 = (rect.x as i64 + rect.width as i64).clamp(0, self.width as i64)
            as u32;
        let y1 = (rect.y as i64 + rect.height as i64)
            .clamp(0, self.height as i64) as u32;

        for y in y0..y1 {
            for x in x0..x1 {
                self.set(x, y, color);
            }
        }
    }

    /// Copies `src` with its top-left corner at `at`, clipped.
    pub fn blit(&mut self, src: &Bitmap, at: [i32; 2]) {
        for sy in 0..src.height {
            for sx in 0..src.width {
                let dx = at[0] as i64 + sx as i64;
                let dy = at[1] as i64 + sy as i64;
                if dx < 0 || dy < 0 {
                    continue;
                }
                if let Some(color) = src.get(sx, sy) {
                    self.set(dx as u32, dy as u32, color);
                }
            }
        }
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

/// Rasterizes a line of text onto `bg`.
pub trait TextRenderer {
    fn render(&mut self, text: &str, fg: Rgba, bg: Rgba) -> Bitmap;
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct LabelKey {
    pub text: String,
    pub fg: Rgba,
    pub bg: Rgba,
    pub outline: Rgba,
    pub padding: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Label {
    pub image: Rc<Bitmap>,
    pub rect: Rect,
}

/// Builds each distinct label once and hands out shared copies afterwards.
pub struct LabelCache<R> {
    renderer: R,
    labels: HashMap<LabelKey, Label>,
}

impl<R: TextRenderer> LabelCache<R> {
    pub fn new(renderer: R) -> Self {
        Self {
            renderer,
            labels: HashMap::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get_label(
        &mut self,
        text: &str,
        fg: Rgba,
        bg: Rgba,
        outline: Rgba,
        padding: u32,
    ) -> Label {
        let key = LabelKey {
            text: text.to_string(),
            fg,
            bg,
            outline,
            padding,
        };

        if let Some(label) = self.labels.get(&key) {
            return label.clone();
        }

        trace!("Building label {:?}", text);
        let label = build_label(&mut self.renderer, &key);
        self.labels.insert(key, label.clone());
        label
    }
}

fn build_label<R: TextRenderer>(renderer: &mut R, key: &LabelKey) -> Label {
    let text = renderer.render(&key.text, key.fg, key.bg);

    let mut image = Bitmap::new(
        text.width() + key.padding * 2,
        text.height() + key.padding * 2,
        key.outline,
    );
    image.fill_rect(image.rect().inflate(-2, -2), key.bg);
    image.blit(&text, [key.padding as i32, key.padding as i32]);

    let rect = image.rect();
    Label {
        image: Rc::new(image),
        rect,
    }
}
