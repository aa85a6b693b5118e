use tracing::warn;

use crate::document::{Document, Item, ItemId, LayerMask, LayerMode, TextInfo};

#[derive(Debug, Clone, PartialEq)]
pub enum LayerProp {
    Mode(LayerMode),
    Opacity(f64),
    LockAlpha(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayerPropUndo {
    pub item: ItemId,
    pub prop: LayerProp,
}

impl LayerPropUndo {
    pub fn apply(&mut self, doc: &mut Document) {
        let Some(layer) = doc.item_mut(self.item).and_then(Item::as_layer_mut) else {
            warn!(index = self.item.index, "layer undo target is gone");
            return;
        };

        match &mut self.prop {
            LayerProp::Mode(mode) => std::mem::swap(mode, &mut layer.mode),
            LayerProp::Opacity(opacity) => std::mem::swap(opacity, &mut layer.opacity),
            LayerProp::LockAlpha(lock) => std::mem::swap(lock, &mut layer.lock_alpha),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerMaskProp {
    Apply(bool),
    Show(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayerMaskPropUndo {
    pub item: ItemId,
    pub prop: LayerMaskProp,
}

impl LayerMaskPropUndo {
    pub fn apply(&mut self, doc: &mut Document) {
        let mask = doc
            .item_mut(self.item)
            .and_then(Item::as_layer_mut)
            .and_then(|layer| layer.mask.as_mut());
        let Some(mask) = mask else {
            warn!(index = self.item.index, "layer mask undo target is gone");
            return;
        };

        match &mut self.prop {
            LayerMaskProp::Apply(apply) => std::mem::swap(apply, &mut mask.apply),
            LayerMaskProp::Show(show) => std::mem::swap(show, &mut mask.show),
        }
    }
}

/// The layer's whole mask, or its absence. Covers both adding and removing.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerMaskUndo {
    pub item: ItemId,
    pub mask: Option<LayerMask>,
}

impl LayerMaskUndo {
    pub fn apply(&mut self, doc: &mut Document) {
        let Some(layer) = doc.item_mut(self.item).and_then(Item::as_layer_mut) else {
            warn!(index = self.item.index, "layer mask undo target is gone");
            return;
        };
        std::mem::swap(&mut self.mask, &mut layer.mask);
    }

    pub fn memsize(&self) -> usize {
        self.mask.as_ref().map_or(0, |mask| mask.pixels.memsize())
    }

    pub fn free(&mut self) {
        self.mask = None;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TextProp {
    /// Text attached to the layer, `None` for a plain layer
    Info(Option<TextInfo>),
    Modified(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextUndo {
    pub item: ItemId,
    pub prop: TextProp,
}

impl TextUndo {
    pub fn apply(&mut self, doc: &mut Document) {
        let Some(layer) = doc.item_mut(self.item).and_then(Item::as_layer_mut) else {
            warn!(index = self.item.index, "text layer undo target is gone");
            return;
        };

        match &mut self.prop {
            TextProp::Info(info) => std::mem::swap(info, &mut layer.text),
            TextProp::Modified(modified) => match layer.text.as_mut() {
                Some(text) => std::mem::swap(modified, &mut text.modified),
                None => warn!(index = self.item.index, "layer has no text any more"),
            },
        }
    }

    pub fn memsize(&self) -> usize {
        match &self.prop {
            TextProp::Info(Some(info)) => info.text.len(),
            _ => 0,
        }
    }
}
