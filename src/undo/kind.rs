use crate::dirty::DirtyMask;

/// Every category of reversible edit, group kinds first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UndoKind {
    // === Group kinds ===
    GroupImageScale,
    GroupImageResize,
    GroupImageFlip,
    GroupImageRotate,
    GroupImageCrop,
    GroupImageConvert,
    GroupImageItemRemove,
    GroupImageLayersMerge,
    GroupImageVectorsMerge,
    GroupImageQuickMask,
    GroupImageGrid,
    GroupGuide,
    GroupSamplePoint,
    GroupDrawable,
    GroupDrawableMod,
    GroupMask,
    GroupItemVisibility,
    GroupItemLinked,
    GroupItemProperties,
    GroupItemDisplace,
    GroupItemScale,
    GroupItemResize,
    GroupLayerAdd,
    GroupLayerAddMask,
    GroupLayerApplyMask,
    GroupFsToLayer,
    GroupFsFloat,
    GroupFsAnchor,
    GroupEditPaste,
    GroupEditCut,
    GroupText,
    GroupTransform,
    GroupPaint,
    GroupParasiteAttach,
    GroupParasiteRemove,
    GroupVectorsImport,
    GroupMisc,

    // === Leaf kinds ===
    ImageType,
    ImagePrecision,
    ImageSize,
    ImageResolution,
    ImageGrid,
    ImageColormap,
    Guide,
    SamplePoint,
    Drawable,
    DrawableMod,
    Mask,
    ItemReorder,
    ItemRename,
    ItemDisplace,
    ItemVisibility,
    ItemLinked,
    ItemLockContent,
    ItemLockPosition,
    LayerAdd,
    LayerRemove,
    LayerMode,
    LayerOpacity,
    LayerLockAlpha,
    TextLayer,
    TextLayerModified,
    TextLayerConvert,
    LayerMaskAdd,
    LayerMaskRemove,
    LayerMaskApply,
    LayerMaskShow,
    ChannelAdd,
    ChannelRemove,
    ChannelColor,
    VectorsAdd,
    VectorsRemove,
    VectorsMod,
    Paint,
    ParasiteAttach,
    ParasiteRemove,
    Cant,
}

impl UndoKind {
    /// Human-readable name, used when an edit is pushed without one
    pub fn name(self) -> &'static str {
        use UndoKind::*;
        match self {
            GroupImageScale => "Scale image",
            GroupImageResize => "Resize image",
            GroupImageFlip => "Flip image",
            GroupImageRotate => "Rotate image",
            GroupImageCrop => "Crop image",
            GroupImageConvert => "Convert image",
            GroupImageItemRemove => "Remove item",
            GroupImageLayersMerge => "Merge layers",
            GroupImageVectorsMerge => "Merge paths",
            GroupImageQuickMask => "Quick Mask",
            GroupImageGrid | ImageGrid => "Grid",
            GroupGuide | Guide => "Guide",
            GroupSamplePoint | SamplePoint => "Sample Point",
            GroupDrawable | Drawable => "Layer/Channel",
            GroupDrawableMod | DrawableMod => "Layer/Channel modification",
            GroupMask | Mask => "Selection mask",
            GroupItemVisibility | ItemVisibility => "Item visibility",
            GroupItemLinked | ItemLinked => "Link/Unlink item",
            GroupItemProperties => "Item properties",
            GroupItemDisplace | ItemDisplace => "Move item",
            GroupItemScale => "Scale item",
            GroupItemResize => "Resize item",
            GroupLayerAdd => "Add layer",
            GroupLayerAddMask | LayerMaskAdd => "Add layer mask",
            GroupLayerApplyMask | LayerMaskApply => "Apply layer mask",
            GroupFsToLayer => "Floating selection to layer",
            GroupFsFloat => "Float selection",
            GroupFsAnchor => "Anchor floating selection",
            GroupEditPaste => "Paste",
            GroupEditCut => "Cut",
            GroupText => "Text",
            GroupTransform => "Transform",
            GroupPaint | Paint => "Paint",
            GroupParasiteAttach | ParasiteAttach => "Attach parasite",
            GroupParasiteRemove | ParasiteRemove => "Remove parasite",
            GroupVectorsImport => "Import paths",
            GroupMisc => "Plug-In",
            ImageType => "Image type",
            ImagePrecision => "Image precision",
            ImageSize => "Image size",
            ImageResolution => "Image resolution change",
            ImageColormap => "Change indexed palette",
            ItemReorder => "Reorder item",
            ItemRename => "Rename item",
            ItemLockContent => "Lock/Unlock content",
            ItemLockPosition => "Lock/Unlock position",
            LayerAdd => "New layer",
            LayerRemove => "Delete layer",
            LayerMode => "Set layer mode",
            LayerOpacity => "Set layer opacity",
            LayerLockAlpha => "Lock/Unlock alpha channel",
            TextLayer => "Text layer",
            TextLayerModified => "Text layer modification",
            TextLayerConvert => "Convert text layer",
            LayerMaskRemove => "Delete layer mask",
            LayerMaskShow => "Show layer mask",
            ChannelAdd => "New channel",
            ChannelRemove => "Delete channel",
            ChannelColor => "Channel color",
            VectorsAdd => "New path",
            VectorsRemove => "Delete path",
            VectorsMod => "Path modification",
            Cant => "Not undoable",
        }
    }

    pub fn is_group(self) -> bool {
        use UndoKind::*;
        matches!(
            self,
            GroupImageScale
                | GroupImageResize
                | GroupImageFlip
                | GroupImageRotate
                | GroupImageCrop
                | GroupImageConvert
                | GroupImageItemRemove
                | GroupImageLayersMerge
                | GroupImageVectorsMerge
                | GroupImageQuickMask
                | GroupImageGrid
                | GroupGuide
                | GroupSamplePoint
                | GroupDrawable
                | GroupDrawableMod
                | GroupMask
                | GroupItemVisibility
                | GroupItemLinked
                | GroupItemProperties
                | GroupItemDisplace
                | GroupItemScale
                | GroupItemResize
                | GroupLayerAdd
                | GroupLayerAddMask
                | GroupLayerApplyMask
                | GroupFsToLayer
                | GroupFsFloat
                | GroupFsAnchor
                | GroupEditPaste
                | GroupEditCut
                | GroupText
                | GroupTransform
                | GroupPaint
                | GroupParasiteAttach
                | GroupParasiteRemove
                | GroupVectorsImport
                | GroupMisc
        )
    }

    /// Visibility and metadata edits that strong undo/redo steps over
    pub fn is_weak(self) -> bool {
        use UndoKind::*;
        matches!(
            self,
            GroupItemVisibility
                | GroupItemProperties
                | GroupLayerApplyMask
                | ItemVisibility
                | LayerMode
                | LayerOpacity
                | LayerMaskApply
                | LayerMaskShow
        )
    }

    /// Regions of the document an edit of this kind touches.
    ///
    /// For group kinds this is the mask the group is created with. For leaf
    /// kinds it is the mask the typed push helpers use; a helper may pick a
    /// narrower one depending on its target (moving a path does not touch
    /// pixels).
    pub fn dirty_mask(self) -> DirtyMask {
        use UndoKind::*;
        match self {
            GroupImageScale | GroupImageResize | GroupImageFlip | GroupImageRotate
            | GroupImageCrop => DirtyMask::IMAGE | DirtyMask::IMAGE_SIZE,
            GroupImageConvert => DirtyMask::IMAGE | DirtyMask::DRAWABLE,
            GroupImageLayersMerge => DirtyMask::IMAGE_STRUCTURE | DirtyMask::DRAWABLE,
            GroupImageVectorsMerge | GroupVectorsImport => {
                DirtyMask::IMAGE_STRUCTURE | DirtyMask::VECTORS
            }
            GroupImageQuickMask => DirtyMask::IMAGE_STRUCTURE | DirtyMask::SELECTION,
            GroupImageGrid | GroupGuide => DirtyMask::IMAGE_META,
            GroupDrawable | GroupDrawableMod => DirtyMask::ITEM | DirtyMask::DRAWABLE,
            GroupMask => DirtyMask::SELECTION,
            GroupItemVisibility | GroupItemLinked | GroupItemProperties => DirtyMask::ITEM_META,
            GroupItemDisplace | GroupItemScale | GroupItemResize | GroupTransform => {
                DirtyMask::ITEM | DirtyMask::DRAWABLE | DirtyMask::VECTORS
            }
            GroupLayerAddMask | GroupLayerApplyMask | GroupFsToLayer | GroupFsFloat
            | GroupFsAnchor | GroupEditPaste => DirtyMask::IMAGE_STRUCTURE,
            GroupEditCut | GroupText | GroupPaint => DirtyMask::ITEM | DirtyMask::DRAWABLE,
            GroupParasiteAttach | GroupParasiteRemove => {
                DirtyMask::IMAGE_META | DirtyMask::ITEM_META
            }
            GroupImageItemRemove | GroupSamplePoint | GroupLayerAdd | GroupMisc => DirtyMask::ALL,

            ImageType | ImagePrecision | ImageResolution | ImageColormap => DirtyMask::IMAGE,
            ImageSize => DirtyMask::IMAGE | DirtyMask::IMAGE_SIZE,
            ImageGrid | Guide | SamplePoint => DirtyMask::IMAGE_META,
            Drawable | DrawableMod | TextLayer | ChannelColor | ItemDisplace => {
                DirtyMask::ITEM | DirtyMask::DRAWABLE
            }
            Mask => DirtyMask::SELECTION,
            ItemReorder | LayerAdd | LayerRemove | LayerMaskAdd | LayerMaskRemove | ChannelAdd
            | ChannelRemove | VectorsAdd | VectorsRemove => DirtyMask::IMAGE_STRUCTURE,
            ItemRename | ItemVisibility | ItemLinked | ItemLockContent | ItemLockPosition
            | LayerMode | LayerOpacity | LayerLockAlpha | TextLayerModified | LayerMaskApply
            | LayerMaskShow => DirtyMask::ITEM_META,
            TextLayerConvert => DirtyMask::ITEM,
            VectorsMod => DirtyMask::ITEM | DirtyMask::VECTORS,
            ParasiteAttach | ParasiteRemove => DirtyMask::IMAGE_META,
            // the enclosing paint group carries the dirtying
            Paint => DirtyMask::empty(),
            Cant => DirtyMask::ALL,
        }
    }

    /// Parse a group kind from its short name ("paint", "image-resize", ...)
    pub fn parse_group(s: &str) -> Option<Self> {
        use UndoKind::*;
        let kind = match s.to_lowercase().as_str() {
            "image-scale" => GroupImageScale,
            "image-resize" => GroupImageResize,
            "image-flip" => GroupImageFlip,
            "image-rotate" => GroupImageRotate,
            "image-crop" => GroupImageCrop,
            "image-convert" => GroupImageConvert,
            "item-remove" => GroupImageItemRemove,
            "layers-merge" => GroupImageLayersMerge,
            "vectors-merge" => GroupImageVectorsMerge,
            "quick-mask" => GroupImageQuickMask,
            "grid" => GroupImageGrid,
            "guide" => GroupGuide,
            "sample-point" => GroupSamplePoint,
            "drawable" => GroupDrawable,
            "drawable-mod" => GroupDrawableMod,
            "mask" => GroupMask,
            "item-visibility" => GroupItemVisibility,
            "item-linked" => GroupItemLinked,
            "item-properties" => GroupItemProperties,
            "item-displace" => GroupItemDisplace,
            "item-scale" => GroupItemScale,
            "item-resize" => GroupItemResize,
            "layer-add" => GroupLayerAdd,
            "layer-add-mask" => GroupLayerAddMask,
            "layer-apply-mask" => GroupLayerApplyMask,
            "fs-to-layer" => GroupFsToLayer,
            "fs-float" => GroupFsFloat,
            "fs-anchor" => GroupFsAnchor,
            "edit-paste" => GroupEditPaste,
            "edit-cut" => GroupEditCut,
            "text" => GroupText,
            "transform" => GroupTransform,
            "paint" => GroupPaint,
            "parasite-attach" => GroupParasiteAttach,
            "parasite-remove" => GroupParasiteRemove,
            "vectors-import" => GroupVectorsImport,
            "misc" => GroupMisc,
            _ => return None,
        };
        Some(kind)
    }
}

impl std::fmt::Display for UndoKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
