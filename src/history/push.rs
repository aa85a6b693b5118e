//! Typed entry points for recording edits.
//!
//! Every helper copies the state it is about to lose out of the document and
//! hands it to [`History::push`], so it must be called before the edit is
//! made. Helpers that target an item refuse a handle that does not point at
//! a live item of the right type.

use tracing::error;

use crate::dirty::DirtyMask;
use crate::document::{
    Document, Item, ItemId, ItemTree, Layer, LayerMask, Orientation, PixelBuffer, Rect,
};
use crate::undo::{
    ChannelColorUndo, DrawableModUndo, DrawableUndo, GuideUndo, ImageUndo, ItemPropUndo,
    ItemTreeUndo, LayerMaskProp, LayerMaskPropUndo, LayerMaskUndo, LayerProp, LayerPropUndo,
    MaskUndo, PaintUndo, SamplePointUndo, TextProp, TextUndo, UndoId, UndoKind, UndoPayload,
    VectorsUndo,
};

use super::History;

fn target(doc: &Document, item: ItemId, kind: UndoKind) -> Option<&Item> {
    let found = doc.item(item);
    if found.is_none() {
        error!(?kind, index = item.index, "edit recorded for an item that does not exist");
    }
    found
}

fn target_layer(doc: &Document, item: ItemId, kind: UndoKind) -> Option<&Layer> {
    let layer = target(doc, item, kind)?.as_layer();
    if layer.is_none() {
        error!(?kind, index = item.index, "layer edit recorded for an item that is not a layer");
    }
    layer
}

impl History {
    fn push_kind(
        &mut self,
        doc: &mut Document,
        kind: UndoKind,
        name: Option<&str>,
        payload: UndoPayload,
    ) -> Option<UndoId> {
        self.push(doc, kind, name, kind.dirty_mask(), payload)
    }

    // === Image ===

    pub fn push_image_type(&mut self, doc: &mut Document, name: Option<&str>) -> Option<UndoId> {
        let payload = UndoPayload::Image(ImageUndo::base_type(doc));
        self.push_kind(doc, UndoKind::ImageType, name, payload)
    }

    pub fn push_image_precision(
        &mut self,
        doc: &mut Document,
        name: Option<&str>,
    ) -> Option<UndoId> {
        let payload = UndoPayload::Image(ImageUndo::precision(doc));
        self.push_kind(doc, UndoKind::ImagePrecision, name, payload)
    }

    /// Record the canvas size. The previous origin and size are what a
    /// listener gets told when the change is undone or redone.
    pub fn push_image_size(
        &mut self,
        doc: &mut Document,
        name: Option<&str>,
        previous_origin_x: i32,
        previous_origin_y: i32,
        previous_width: u32,
        previous_height: u32,
    ) -> Option<UndoId> {
        let payload = UndoPayload::Image(ImageUndo::size(
            doc,
            previous_origin_x,
            previous_origin_y,
            previous_width,
            previous_height,
        ));
        self.push_kind(doc, UndoKind::ImageSize, name, payload)
    }

    pub fn push_image_resolution(
        &mut self,
        doc: &mut Document,
        name: Option<&str>,
    ) -> Option<UndoId> {
        let payload = UndoPayload::Image(ImageUndo::resolution(doc));
        self.push_kind(doc, UndoKind::ImageResolution, name, payload)
    }

    pub fn push_image_grid(&mut self, doc: &mut Document, name: Option<&str>) -> Option<UndoId> {
        let payload = UndoPayload::Image(ImageUndo::grid(doc));
        self.push_kind(doc, UndoKind::ImageGrid, name, payload)
    }

    pub fn push_image_colormap(
        &mut self,
        doc: &mut Document,
        name: Option<&str>,
    ) -> Option<UndoId> {
        let payload = UndoPayload::Image(ImageUndo::colormap(doc));
        self.push_kind(doc, UndoKind::ImageColormap, name, payload)
    }

    /// Before attaching (or replacing) the image parasite `parasite`
    pub fn push_image_parasite(
        &mut self,
        doc: &mut Document,
        name: Option<&str>,
        parasite: &str,
    ) -> Option<UndoId> {
        let payload = UndoPayload::Image(ImageUndo::parasite(doc, parasite));
        self.push_kind(doc, UndoKind::ParasiteAttach, name, payload)
    }

    pub fn push_image_parasite_remove(
        &mut self,
        doc: &mut Document,
        name: Option<&str>,
        parasite: &str,
    ) -> Option<UndoId> {
        let payload = UndoPayload::Image(ImageUndo::parasite(doc, parasite));
        self.push_kind(doc, UndoKind::ParasiteRemove, name, payload)
    }

    pub fn push_guide(
        &mut self,
        doc: &mut Document,
        name: Option<&str>,
        guide: u32,
        orientation: Orientation,
    ) -> Option<UndoId> {
        let payload = UndoPayload::Guide(GuideUndo::new(doc, guide, orientation));
        self.push_kind(doc, UndoKind::Guide, name, payload)
    }

    pub fn push_sample_point(
        &mut self,
        doc: &mut Document,
        name: Option<&str>,
        sample_point: u32,
    ) -> Option<UndoId> {
        let payload = UndoPayload::SamplePoint(SamplePointUndo::new(doc, sample_point));
        self.push_kind(doc, UndoKind::SamplePoint, name, payload)
    }

    // === Pixels ===

    /// Save `region` of a drawable before painting over it.
    ///
    /// `applied` is what the edit is about to paint; keeping it makes the
    /// record fadeable.
    pub fn push_drawable(
        &mut self,
        doc: &mut Document,
        name: Option<&str>,
        item: ItemId,
        region: Rect,
        applied: Option<PixelBuffer>,
    ) -> Option<UndoId> {
        let kind = UndoKind::Drawable;
        target(doc, item, kind)?;
        let Some(mut undo) =
            DrawableUndo::new(doc, item, region.x, region.y, region.width, region.height)
        else {
            error!(index = item.index, "pixel edit recorded for an item without pixels");
            return None;
        };
        undo.applied_buffer = applied;
        self.push_kind(doc, kind, name, UndoPayload::Drawable(undo))
    }

    /// Save a drawable's whole content and offset before it is resized or
    /// replaced
    pub fn push_drawable_mod(
        &mut self,
        doc: &mut Document,
        name: Option<&str>,
        item: ItemId,
    ) -> Option<UndoId> {
        let kind = UndoKind::DrawableMod;
        target(doc, item, kind)?;
        let Some(undo) = DrawableModUndo::new(doc, item) else {
            error!(index = item.index, "pixel edit recorded for an item without pixels");
            return None;
        };
        self.push_kind(doc, kind, name, UndoPayload::DrawableMod(undo))
    }

    pub fn push_mask(&mut self, doc: &mut Document, name: Option<&str>) -> Option<UndoId> {
        let payload = UndoPayload::Mask(MaskUndo::new(doc));
        self.push_kind(doc, UndoKind::Mask, name, payload)
    }

    /// Where the last paint stroke ended
    pub fn push_paint(&mut self, doc: &mut Document, name: Option<&str>) -> Option<UndoId> {
        let payload = UndoPayload::Paint(PaintUndo::new(doc));
        self.push_kind(doc, UndoKind::Paint, name, payload)
    }

    /// Mark a point that cannot be undone past
    pub fn push_cant(&mut self, doc: &mut Document, name: Option<&str>) -> Option<UndoId> {
        self.push_kind(doc, UndoKind::Cant, name, UndoPayload::Cant)
    }

    // === Items ===

    fn push_item_prop<F>(
        &mut self,
        doc: &mut Document,
        kind: UndoKind,
        name: Option<&str>,
        item: ItemId,
        snapshot: F,
    ) -> Option<UndoId>
    where
        F: FnOnce(&Item, ItemId) -> ItemPropUndo,
    {
        let undo = snapshot(target(doc, item, kind)?, item);
        self.push_kind(doc, kind, name, UndoPayload::ItemProp(undo))
    }

    /// Before moving an item within its tree
    pub fn push_item_reorder(
        &mut self,
        doc: &mut Document,
        name: Option<&str>,
        item: ItemId,
    ) -> Option<UndoId> {
        let kind = UndoKind::ItemReorder;
        target(doc, item, kind)?;
        if !doc.is_attached(item) {
            error!(index = item.index, "reorder recorded for a detached item");
            return None;
        }
        let payload = UndoPayload::ItemTree(ItemTreeUndo::new(doc, item));
        self.push_kind(doc, kind, name, payload)
    }

    pub fn push_item_rename(
        &mut self,
        doc: &mut Document,
        name: Option<&str>,
        item: ItemId,
    ) -> Option<UndoId> {
        self.push_item_prop(doc, UndoKind::ItemRename, name, item, ItemPropUndo::name)
    }

    /// Before moving an item. Moving a path leaves pixels alone.
    pub fn push_item_displace(
        &mut self,
        doc: &mut Document,
        name: Option<&str>,
        item: ItemId,
    ) -> Option<UndoId> {
        let kind = UndoKind::ItemDisplace;
        let source = target(doc, item, kind)?;
        let dirty_mask = match source.tree() {
            ItemTree::Vectors => DirtyMask::ITEM | DirtyMask::VECTORS,
            _ => kind.dirty_mask(),
        };
        let payload = UndoPayload::ItemProp(ItemPropUndo::offset(source, item));
        self.push(doc, kind, name, dirty_mask, payload)
    }

    pub fn push_item_visibility(
        &mut self,
        doc: &mut Document,
        name: Option<&str>,
        item: ItemId,
    ) -> Option<UndoId> {
        self.push_item_prop(doc, UndoKind::ItemVisibility, name, item, ItemPropUndo::visible)
    }

    pub fn push_item_linked(
        &mut self,
        doc: &mut Document,
        name: Option<&str>,
        item: ItemId,
    ) -> Option<UndoId> {
        self.push_item_prop(doc, UndoKind::ItemLinked, name, item, ItemPropUndo::linked)
    }

    pub fn push_item_lock_content(
        &mut self,
        doc: &mut Document,
        name: Option<&str>,
        item: ItemId,
    ) -> Option<UndoId> {
        self.push_item_prop(
            doc,
            UndoKind::ItemLockContent,
            name,
            item,
            ItemPropUndo::lock_content,
        )
    }

    pub fn push_item_lock_position(
        &mut self,
        doc: &mut Document,
        name: Option<&str>,
        item: ItemId,
    ) -> Option<UndoId> {
        self.push_item_prop(
            doc,
            UndoKind::ItemLockPosition,
            name,
            item,
            ItemPropUndo::lock_position,
        )
    }

    pub fn push_item_parasite(
        &mut self,
        doc: &mut Document,
        name: Option<&str>,
        item: ItemId,
        parasite: &str,
    ) -> Option<UndoId> {
        self.push_item_prop(doc, UndoKind::ParasiteAttach, name, item, |source, id| {
            ItemPropUndo::parasite(source, id, parasite)
        })
    }

    pub fn push_item_parasite_remove(
        &mut self,
        doc: &mut Document,
        name: Option<&str>,
        item: ItemId,
        parasite: &str,
    ) -> Option<UndoId> {
        self.push_item_prop(doc, UndoKind::ParasiteRemove, name, item, |source, id| {
            ItemPropUndo::parasite(source, id, parasite)
        })
    }

    /// Adding wants a detached item, removing an attached one; the record
    /// remembers where it was (or that it was nowhere).
    fn push_item_tree(
        &mut self,
        doc: &mut Document,
        kind: UndoKind,
        name: Option<&str>,
        item: ItemId,
        tree: ItemTree,
        attached: bool,
    ) -> Option<UndoId> {
        if target(doc, item, kind)?.tree() != tree {
            error!(?kind, index = item.index, ?tree, "item is in the wrong tree");
            return None;
        }
        if doc.is_attached(item) != attached {
            error!(?kind, index = item.index, attached, "item is not where the edit expects");
            return None;
        }
        let payload = UndoPayload::ItemTree(ItemTreeUndo::new(doc, item));
        self.push_kind(doc, kind, name, payload)
    }

    // === Layers ===

    /// Before attaching a new layer
    pub fn push_layer_add(
        &mut self,
        doc: &mut Document,
        name: Option<&str>,
        layer: ItemId,
    ) -> Option<UndoId> {
        self.push_item_tree(doc, UndoKind::LayerAdd, name, layer, ItemTree::Layers, false)
    }

    /// Before detaching a layer
    pub fn push_layer_remove(
        &mut self,
        doc: &mut Document,
        name: Option<&str>,
        layer: ItemId,
    ) -> Option<UndoId> {
        self.push_item_tree(doc, UndoKind::LayerRemove, name, layer, ItemTree::Layers, true)
    }

    fn push_layer_prop<F>(
        &mut self,
        doc: &mut Document,
        kind: UndoKind,
        name: Option<&str>,
        item: ItemId,
        snapshot: F,
    ) -> Option<UndoId>
    where
        F: FnOnce(&Layer) -> LayerProp,
    {
        let prop = snapshot(target_layer(doc, item, kind)?);
        let payload = UndoPayload::LayerProp(LayerPropUndo { item, prop });
        self.push_kind(doc, kind, name, payload)
    }

    pub fn push_layer_mode(
        &mut self,
        doc: &mut Document,
        name: Option<&str>,
        layer: ItemId,
    ) -> Option<UndoId> {
        self.push_layer_prop(doc, UndoKind::LayerMode, name, layer, |l| {
            LayerProp::Mode(l.mode)
        })
    }

    pub fn push_layer_opacity(
        &mut self,
        doc: &mut Document,
        name: Option<&str>,
        layer: ItemId,
    ) -> Option<UndoId> {
        self.push_layer_prop(doc, UndoKind::LayerOpacity, name, layer, |l| {
            LayerProp::Opacity(l.opacity)
        })
    }

    pub fn push_layer_lock_alpha(
        &mut self,
        doc: &mut Document,
        name: Option<&str>,
        layer: ItemId,
    ) -> Option<UndoId> {
        self.push_layer_prop(doc, UndoKind::LayerLockAlpha, name, layer, |l| {
            LayerProp::LockAlpha(l.lock_alpha)
        })
    }

    /// Before changing a text layer's text
    pub fn push_text_layer(
        &mut self,
        doc: &mut Document,
        name: Option<&str>,
        layer: ItemId,
    ) -> Option<UndoId> {
        self.push_text(doc, UndoKind::TextLayer, name, layer)
    }

    /// Before a text layer's pixels are edited by something other than
    /// text layout
    pub fn push_text_layer_modified(
        &mut self,
        doc: &mut Document,
        name: Option<&str>,
        layer: ItemId,
    ) -> Option<UndoId> {
        let kind = UndoKind::TextLayerModified;
        let Some(text) = target_layer(doc, layer, kind)?.text.as_ref() else {
            error!(index = layer.index, "layer is not a text layer");
            return None;
        };
        let payload = UndoPayload::Text(TextUndo {
            item: layer,
            prop: TextProp::Modified(text.modified),
        });
        self.push_kind(doc, kind, name, payload)
    }

    /// Before turning a layer into a text layer or back into a plain one
    pub fn push_text_layer_convert(
        &mut self,
        doc: &mut Document,
        name: Option<&str>,
        layer: ItemId,
    ) -> Option<UndoId> {
        self.push_text(doc, UndoKind::TextLayerConvert, name, layer)
    }

    fn push_text(
        &mut self,
        doc: &mut Document,
        kind: UndoKind,
        name: Option<&str>,
        layer: ItemId,
    ) -> Option<UndoId> {
        let text = target_layer(doc, layer, kind)?.text.clone();
        let payload = UndoPayload::Text(TextUndo {
            item: layer,
            prop: TextProp::Info(text),
        });
        self.push_kind(doc, kind, name, payload)
    }

    /// Before giving a layer a mask
    pub fn push_layer_mask_add(
        &mut self,
        doc: &mut Document,
        name: Option<&str>,
        layer: ItemId,
    ) -> Option<UndoId> {
        let kind = UndoKind::LayerMaskAdd;
        if target_layer(doc, layer, kind)?.mask.is_some() {
            error!(index = layer.index, "layer already has a mask");
            return None;
        }
        let payload = UndoPayload::LayerMask(LayerMaskUndo {
            item: layer,
            mask: None,
        });
        self.push_kind(doc, kind, name, payload)
    }

    /// Before taking a layer's mask away
    pub fn push_layer_mask_remove(
        &mut self,
        doc: &mut Document,
        name: Option<&str>,
        layer: ItemId,
    ) -> Option<UndoId> {
        let kind = UndoKind::LayerMaskRemove;
        let Some(mask) = target_layer(doc, layer, kind)?.mask.clone() else {
            error!(index = layer.index, "layer has no mask to remove");
            return None;
        };
        let payload = UndoPayload::LayerMask(LayerMaskUndo {
            item: layer,
            mask: Some(mask),
        });
        self.push_kind(doc, kind, name, payload)
    }

    fn push_layer_mask_prop<F>(
        &mut self,
        doc: &mut Document,
        kind: UndoKind,
        name: Option<&str>,
        layer: ItemId,
        snapshot: F,
    ) -> Option<UndoId>
    where
        F: FnOnce(&LayerMask) -> LayerMaskProp,
    {
        let Some(mask) = target_layer(doc, layer, kind)?.mask.as_ref() else {
            error!(?kind, index = layer.index, "layer has no mask");
            return None;
        };
        let payload = UndoPayload::LayerMaskProp(LayerMaskPropUndo {
            item: layer,
            prop: snapshot(mask),
        });
        self.push_kind(doc, kind, name, payload)
    }

    pub fn push_layer_mask_apply(
        &mut self,
        doc: &mut Document,
        name: Option<&str>,
        layer: ItemId,
    ) -> Option<UndoId> {
        self.push_layer_mask_prop(doc, UndoKind::LayerMaskApply, name, layer, |mask| {
            LayerMaskProp::Apply(mask.apply)
        })
    }

    pub fn push_layer_mask_show(
        &mut self,
        doc: &mut Document,
        name: Option<&str>,
        layer: ItemId,
    ) -> Option<UndoId> {
        self.push_layer_mask_prop(doc, UndoKind::LayerMaskShow, name, layer, |mask| {
            LayerMaskProp::Show(mask.show)
        })
    }

    // === Channels and paths ===

    pub fn push_channel_add(
        &mut self,
        doc: &mut Document,
        name: Option<&str>,
        channel: ItemId,
    ) -> Option<UndoId> {
        let kind = UndoKind::ChannelAdd;
        self.push_item_tree(doc, kind, name, channel, ItemTree::Channels, false)
    }

    pub fn push_channel_remove(
        &mut self,
        doc: &mut Document,
        name: Option<&str>,
        channel: ItemId,
    ) -> Option<UndoId> {
        let kind = UndoKind::ChannelRemove;
        self.push_item_tree(doc, kind, name, channel, ItemTree::Channels, true)
    }

    pub fn push_channel_color(
        &mut self,
        doc: &mut Document,
        name: Option<&str>,
        channel: ItemId,
    ) -> Option<UndoId> {
        let kind = UndoKind::ChannelColor;
        let Some(source) = target(doc, channel, kind)?.as_channel() else {
            error!(index = channel.index, "channel color recorded for an item that is not a channel");
            return None;
        };
        let payload = UndoPayload::ChannelColor(ChannelColorUndo {
            item: channel,
            color: source.color,
        });
        self.push_kind(doc, kind, name, payload)
    }

    pub fn push_vectors_add(
        &mut self,
        doc: &mut Document,
        name: Option<&str>,
        vectors: ItemId,
    ) -> Option<UndoId> {
        let kind = UndoKind::VectorsAdd;
        self.push_item_tree(doc, kind, name, vectors, ItemTree::Vectors, false)
    }

    pub fn push_vectors_remove(
        &mut self,
        doc: &mut Document,
        name: Option<&str>,
        vectors: ItemId,
    ) -> Option<UndoId> {
        let kind = UndoKind::VectorsRemove;
        self.push_item_tree(doc, kind, name, vectors, ItemTree::Vectors, true)
    }

    /// Before changing a path's strokes
    pub fn push_vectors_mod(
        &mut self,
        doc: &mut Document,
        name: Option<&str>,
        vectors: ItemId,
    ) -> Option<UndoId> {
        let kind = UndoKind::VectorsMod;
        let Some(source) = target(doc, vectors, kind)?.as_vectors() else {
            error!(index = vectors.index, "path edit recorded for an item that is not a path");
            return None;
        };
        let payload = UndoPayload::Vectors(VectorsUndo {
            item: vectors,
            vectors: source.clone(),
        });
        self.push_kind(doc, kind, name, payload)
    }
}
