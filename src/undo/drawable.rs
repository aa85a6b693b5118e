use tracing::warn;

use crate::document::{Document, Item, ItemId, PixelBuffer};

/// A rectangle of a drawable's pixels as they were before an edit
#[derive(Debug, Clone, PartialEq)]
pub struct DrawableUndo {
    pub item: ItemId,
    pub x: u32,
    pub y: u32,
    pub buffer: PixelBuffer,
    /// What the edit painted over the region, kept for fading
    pub applied_buffer: Option<PixelBuffer>,
}

impl DrawableUndo {
    /// Copy the region out of the drawable. `None` if `item` has no pixels.
    pub fn new(
        doc: &Document,
        item: ItemId,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    ) -> Option<Self> {
        let pixels = doc.item(item).and_then(Item::pixels)?;
        Some(Self {
            item,
            x,
            y,
            buffer: pixels.read_region(x, y, width, height),
            applied_buffer: None,
        })
    }

    pub fn apply(&mut self, doc: &mut Document) {
        let Some(pixels) = doc.item_mut(self.item).and_then(Item::pixels_mut) else {
            warn!(index = self.item.index, "drawable undo target is gone");
            return;
        };

        let current =
            pixels.read_region(self.x, self.y, self.buffer.width(), self.buffer.height());
        pixels.write_region(&self.buffer, self.x, self.y);
        self.buffer = current;
    }

    pub fn memsize(&self) -> usize {
        self.buffer.memsize() + self.applied_buffer.as_ref().map_or(0, PixelBuffer::memsize)
    }

    pub fn free(&mut self) {
        self.buffer.release();
        self.applied_buffer = None;
    }
}

/// A drawable's complete content and position, for edits that change its
/// size or move it along with its pixels
#[derive(Debug, Clone, PartialEq)]
pub struct DrawableModUndo {
    pub item: ItemId,
    pub buffer: PixelBuffer,
    pub offset_x: i32,
    pub offset_y: i32,
}

impl DrawableModUndo {
    pub fn new(doc: &Document, item: ItemId) -> Option<Self> {
        let source = doc.item(item)?;
        Some(Self {
            item,
            buffer: source.pixels()?.clone(),
            offset_x: source.offset_x,
            offset_y: source.offset_y,
        })
    }

    pub fn apply(&mut self, doc: &mut Document) {
        let Some(item) = doc.item_mut(self.item) else {
            warn!(index = self.item.index, "drawable undo target is gone");
            return;
        };

        std::mem::swap(&mut self.offset_x, &mut item.offset_x);
        std::mem::swap(&mut self.offset_y, &mut item.offset_y);
        if let Some(pixels) = item.pixels_mut() {
            std::mem::swap(&mut self.buffer, pixels);
        }
    }

    pub fn memsize(&self) -> usize {
        self.buffer.memsize()
    }

    pub fn free(&mut self) {
        self.buffer.release();
    }
}

/// The selection mask
#[derive(Debug, Clone, PartialEq)]
pub struct MaskUndo {
    pub buffer: PixelBuffer,
}

impl MaskUndo {
    pub fn new(doc: &Document) -> Self {
        Self {
            buffer: doc.selection.clone(),
        }
    }

    pub fn apply(&mut self, doc: &mut Document) {
        std::mem::swap(&mut self.buffer, &mut doc.selection);
    }

    pub fn memsize(&self) -> usize {
        self.buffer.memsize()
    }

    pub fn free(&mut self) {
        self.buffer.release();
    }
}

/// Paint tool state that belongs with a stroke: where the last one ended
#[derive(Debug, Clone, PartialEq)]
pub struct PaintUndo {
    pub last_coords: Option<(f64, f64)>,
}

impl PaintUndo {
    pub fn new(doc: &Document) -> Self {
        Self {
            last_coords: doc.last_paint_coords,
        }
    }

    pub fn apply(&mut self, doc: &mut Document) {
        std::mem::swap(&mut self.last_coords, &mut doc.last_paint_coords);
    }
}
