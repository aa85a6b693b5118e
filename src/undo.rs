pub mod drawable;
pub mod group;
pub mod image;
pub mod item;
pub mod kind;
pub mod layer;

use chrono::{DateTime, Utc};

use crate::dirty::DirtyMask;
use crate::document::{Document, ItemId, PixelBuffer};

pub use drawable::{DrawableModUndo, DrawableUndo, MaskUndo, PaintUndo};
pub use group::UndoGroup;
pub use image::{GuideUndo, ImageUndo, SamplePointUndo, SizeUndo};
pub use item::{ChannelColorUndo, ItemProp, ItemPropUndo, ItemTreeUndo, VectorsUndo};
pub use kind::UndoKind;
pub use layer::{
    LayerMaskProp, LayerMaskPropUndo, LayerMaskUndo, LayerProp, LayerPropUndo, TextProp, TextUndo,
};

/// Identifies a record within one history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UndoId(pub u64);

impl std::fmt::Display for UndoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoMode {
    Undo,
    Redo,
}

/// Geometry the image had before a size change was undone or redone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeChange {
    pub previous_origin_x: i32,
    pub previous_origin_y: i32,
    pub previous_width: u32,
    pub previous_height: u32,
}

/// Coarse side effects collected while popping records, so each one is
/// announced once per undo or redo step however many records caused it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UndoAccumulator {
    pub mode_changed: bool,
    pub precision_changed: bool,
    pub size_changed: Option<SizeChange>,
    pub resolution_changed: bool,
    pub unit_changed: bool,
}

/// What a record needs to swap the document back and forth
#[derive(Debug, Clone)]
pub enum UndoPayload {
    Image(ImageUndo),
    Guide(GuideUndo),
    SamplePoint(SamplePointUndo),
    ItemProp(ItemPropUndo),
    ItemTree(ItemTreeUndo),
    ChannelColor(ChannelColorUndo),
    Vectors(VectorsUndo),
    LayerProp(LayerPropUndo),
    LayerMaskProp(LayerMaskPropUndo),
    LayerMask(LayerMaskUndo),
    Text(TextUndo),
    Drawable(DrawableUndo),
    DrawableMod(DrawableModUndo),
    Mask(MaskUndo),
    Paint(PaintUndo),
    Group(UndoGroup),
    /// Marks a point history cannot go back past; applying it does nothing
    Cant,
}

/// The shape of a payload, used to check two records can be merged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UndoClass {
    Image,
    Guide,
    SamplePoint,
    ItemProp,
    ItemTree,
    ChannelColor,
    Vectors,
    LayerProp,
    LayerMaskProp,
    LayerMask,
    Text,
    Drawable,
    DrawableMod,
    Mask,
    Paint,
    Group,
    Cant,
}

impl UndoPayload {
    pub fn class(&self) -> UndoClass {
        match self {
            UndoPayload::Image(_) => UndoClass::Image,
            UndoPayload::Guide(_) => UndoClass::Guide,
            UndoPayload::SamplePoint(_) => UndoClass::SamplePoint,
            UndoPayload::ItemProp(_) => UndoClass::ItemProp,
            UndoPayload::ItemTree(_) => UndoClass::ItemTree,
            UndoPayload::ChannelColor(_) => UndoClass::ChannelColor,
            UndoPayload::Vectors(_) => UndoClass::Vectors,
            UndoPayload::LayerProp(_) => UndoClass::LayerProp,
            UndoPayload::LayerMaskProp(_) => UndoClass::LayerMaskProp,
            UndoPayload::LayerMask(_) => UndoClass::LayerMask,
            UndoPayload::Text(_) => UndoClass::Text,
            UndoPayload::Drawable(_) => UndoClass::Drawable,
            UndoPayload::DrawableMod(_) => UndoClass::DrawableMod,
            UndoPayload::Mask(_) => UndoClass::Mask,
            UndoPayload::Paint(_) => UndoClass::Paint,
            UndoPayload::Group(_) => UndoClass::Group,
            UndoPayload::Cant => UndoClass::Cant,
        }
    }

    /// The item this payload acts on, if any
    pub fn target(&self) -> Option<ItemId> {
        match self {
            UndoPayload::ItemProp(undo) => Some(undo.item),
            UndoPayload::ItemTree(undo) => Some(undo.item),
            UndoPayload::ChannelColor(undo) => Some(undo.item),
            UndoPayload::Vectors(undo) => Some(undo.item),
            UndoPayload::LayerProp(undo) => Some(undo.item),
            UndoPayload::LayerMaskProp(undo) => Some(undo.item),
            UndoPayload::LayerMask(undo) => Some(undo.item),
            UndoPayload::Text(undo) => Some(undo.item),
            UndoPayload::Drawable(undo) => Some(undo.item),
            UndoPayload::DrawableMod(undo) => Some(undo.item),
            _ => None,
        }
    }

    fn apply(&mut self, mode: UndoMode, doc: &mut Document, accum: &mut UndoAccumulator) {
        match self {
            UndoPayload::Image(undo) => undo.apply(doc, accum),
            UndoPayload::Guide(undo) => undo.apply(doc),
            UndoPayload::SamplePoint(undo) => undo.apply(doc),
            UndoPayload::ItemProp(undo) => undo.apply(doc),
            UndoPayload::ItemTree(undo) => undo.apply(doc),
            UndoPayload::ChannelColor(undo) => undo.apply(doc),
            UndoPayload::Vectors(undo) => undo.apply(doc),
            UndoPayload::LayerProp(undo) => undo.apply(doc),
            UndoPayload::LayerMaskProp(undo) => undo.apply(doc),
            UndoPayload::LayerMask(undo) => undo.apply(doc),
            UndoPayload::Text(undo) => undo.apply(doc),
            UndoPayload::Drawable(undo) => undo.apply(doc),
            UndoPayload::DrawableMod(undo) => undo.apply(doc),
            UndoPayload::Mask(undo) => undo.apply(doc),
            UndoPayload::Paint(undo) => undo.apply(doc),
            UndoPayload::Group(group) => group.apply(mode, doc, accum),
            UndoPayload::Cant => {}
        }
    }

    fn free(&mut self, mode: UndoMode) {
        match self {
            UndoPayload::Image(undo) => undo.free(),
            UndoPayload::LayerMask(undo) => undo.free(),
            UndoPayload::Drawable(undo) => undo.free(),
            UndoPayload::DrawableMod(undo) => undo.free(),
            UndoPayload::Mask(undo) => undo.free(),
            UndoPayload::Group(group) => group.free(mode),
            _ => {}
        }
    }

    fn memsize(&self) -> usize {
        match self {
            UndoPayload::Image(undo) => undo.memsize(),
            UndoPayload::ItemProp(undo) => undo.memsize(),
            UndoPayload::Vectors(undo) => undo.memsize(),
            UndoPayload::LayerMask(undo) => undo.memsize(),
            UndoPayload::Text(undo) => undo.memsize(),
            UndoPayload::Drawable(undo) => undo.memsize(),
            UndoPayload::DrawableMod(undo) => undo.memsize(),
            UndoPayload::Mask(undo) => undo.memsize(),
            UndoPayload::Group(group) => group.memsize(),
            _ => 0,
        }
    }
}

/// One reversible edit
#[derive(Debug, Clone)]
pub struct UndoRecord {
    id: UndoId,
    kind: UndoKind,
    name: String,
    dirty_mask: DirtyMask,
    time: DateTime<Utc>,
    preview: Option<PixelBuffer>,
    payload: UndoPayload,
}

impl UndoRecord {
    /// Build a record. Without a name the kind's name is used.
    pub fn new(
        id: UndoId,
        kind: UndoKind,
        name: Option<&str>,
        dirty_mask: DirtyMask,
        payload: UndoPayload,
    ) -> Self {
        Self {
            id,
            kind,
            name: name.unwrap_or(kind.name()).to_string(),
            dirty_mask,
            time: Utc::now(),
            preview: None,
            payload,
        }
    }

    /// An empty group of `kind`, dirtying what the kind says it does
    pub fn group(id: UndoId, kind: UndoKind, name: Option<&str>) -> Self {
        Self::new(
            id,
            kind,
            name,
            kind.dirty_mask(),
            UndoPayload::Group(UndoGroup::new()),
        )
    }

    pub fn id(&self) -> UndoId {
        self.id
    }

    pub fn kind(&self) -> UndoKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dirty_mask(&self) -> DirtyMask {
        self.dirty_mask
    }

    pub fn time(&self) -> DateTime<Utc> {
        self.time
    }

    pub fn class(&self) -> UndoClass {
        self.payload.class()
    }

    pub fn payload(&self) -> &UndoPayload {
        &self.payload
    }

    pub fn payload_mut(&mut self) -> &mut UndoPayload {
        &mut self.payload
    }

    pub fn is_weak(&self) -> bool {
        self.kind.is_weak()
    }

    pub fn as_group(&self) -> Option<&UndoGroup> {
        match &self.payload {
            UndoPayload::Group(group) => Some(group),
            _ => None,
        }
    }

    pub fn as_group_mut(&mut self) -> Option<&mut UndoGroup> {
        match &mut self.payload {
            UndoPayload::Group(group) => Some(group),
            _ => None,
        }
    }

    pub fn as_drawable(&self) -> Option<&DrawableUndo> {
        match &self.payload {
            UndoPayload::Drawable(undo) => Some(undo),
            _ => None,
        }
    }

    pub fn as_drawable_mut(&mut self) -> Option<&mut DrawableUndo> {
        match &mut self.payload {
            UndoPayload::Drawable(undo) => Some(undo),
            _ => None,
        }
    }

    /// Undo or redo this edit on `doc`.
    ///
    /// The dirty counter moves first, then the stored state is swapped with
    /// the document's, leaving the record ready for the opposite direction.
    pub fn apply(&mut self, mode: UndoMode, doc: &mut Document, accum: &mut UndoAccumulator) {
        if !self.dirty_mask.is_empty() {
            match mode {
                UndoMode::Undo => doc.dirty.mark_clean(self.dirty_mask),
                UndoMode::Redo => doc.dirty.mark_dirty(self.dirty_mask),
            };
        }

        self.payload.apply(mode, doc, accum);
    }

    /// Release everything the record holds. The document is not touched.
    pub fn free(&mut self, mode: UndoMode) {
        self.preview = None;
        self.payload.free(mode);
    }

    /// Bytes held by this record and its children
    pub fn memsize(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.name.len()
            + self.preview.as_ref().map_or(0, PixelBuffer::memsize)
            + self.payload.memsize()
    }

    /// Seconds since the record was created
    pub fn age(&self) -> i64 {
        (Utc::now() - self.time).num_seconds().max(0)
    }

    pub fn reset_age(&mut self) {
        self.time = Utc::now();
    }

    pub fn preview(&self) -> Option<&PixelBuffer> {
        self.preview.as_ref()
    }

    pub fn set_preview(&mut self, preview: PixelBuffer) {
        self.preview = Some(preview);
    }

    pub fn take_preview(&mut self) -> Option<PixelBuffer> {
        self.preview.take()
    }
}

#[cfg(test)]
mod test;
