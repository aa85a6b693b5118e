use super::*;
use crate::document::Item;

fn visibility_record(doc: &Document, id: UndoId, item: ItemId) -> UndoRecord {
    let payload = doc
        .item(item)
        .map(|i| UndoPayload::ItemProp(ItemPropUndo::visible(i, item)))
        .unwrap_or(UndoPayload::Cant);
    UndoRecord::new(
        id,
        UndoKind::ItemVisibility,
        None,
        DirtyMask::ITEM_META,
        payload,
    )
}

fn rename_record(doc: &Document, id: UndoId, item: ItemId) -> UndoRecord {
    let payload = doc
        .item(item)
        .map(|i| UndoPayload::ItemProp(ItemPropUndo::name(i, item)))
        .unwrap_or(UndoPayload::Cant);
    UndoRecord::new(id, UndoKind::ItemRename, None, DirtyMask::ITEM_META, payload)
}

#[test]
fn test_default_name_comes_from_kind() {
    let record = UndoRecord::new(
        UndoId(1),
        UndoKind::LayerOpacity,
        None,
        DirtyMask::ITEM_META,
        UndoPayload::Cant,
    );
    assert_eq!(record.name(), "Set layer opacity");

    let named = UndoRecord::new(
        UndoId(2),
        UndoKind::LayerOpacity,
        Some("Fade"),
        DirtyMask::ITEM_META,
        UndoPayload::Cant,
    );
    assert_eq!(named.name(), "Fade");
}

#[test]
fn test_apply_moves_dirty_counter() {
    let mut doc = Document::new(4, 4);
    let layer = doc.add_item(Item::layer("l", 4, 4), 0);
    let mut record = visibility_record(&doc, UndoId(1), layer);

    doc.dirty.mark_dirty(record.dirty_mask());
    if let Some(item) = doc.item_mut(layer) {
        item.visible = false;
    }

    let mut accum = UndoAccumulator::default();
    record.apply(UndoMode::Undo, &mut doc, &mut accum);
    assert_eq!(doc.dirty.dirty(), 0);
    assert!(doc.item(layer).is_some_and(|i| i.visible));

    record.apply(UndoMode::Redo, &mut doc, &mut accum);
    assert_eq!(doc.dirty.dirty(), 1);
    assert!(doc.item(layer).is_some_and(|i| !i.visible));
    assert_eq!(accum, UndoAccumulator::default());
}

#[test]
fn test_empty_mask_leaves_counter_alone() {
    let mut doc = Document::new(4, 4);
    let mut record = UndoRecord::new(
        UndoId(1),
        UndoKind::Paint,
        None,
        UndoKind::Paint.dirty_mask(),
        UndoPayload::Paint(PaintUndo::new(&doc)),
    );

    record.apply(UndoMode::Undo, &mut doc, &mut UndoAccumulator::default());
    assert_eq!(doc.dirty.dirty(), 0);
}

#[test]
fn test_destroyed_target_still_counts() {
    let mut doc = Document::new(4, 4);
    let layer = doc.add_item(Item::layer("l", 4, 4), 0);
    let mut record = visibility_record(&doc, UndoId(1), layer);
    doc.dirty.mark_dirty(DirtyMask::ITEM_META);
    doc.destroy_item(layer);

    record.apply(UndoMode::Undo, &mut doc, &mut UndoAccumulator::default());
    assert_eq!(doc.dirty.dirty(), 0);
}

#[test]
fn test_group_undoes_newest_first() {
    let mut doc = Document::new(4, 4);
    let layer = doc.add_item(Item::layer("a", 4, 4), 0);

    // two renames: a -> b -> c
    let mut group = UndoRecord::group(UndoId(1), UndoKind::GroupItemProperties, None);
    let first = rename_record(&doc, UndoId(2), layer);
    doc.item_mut(layer).unwrap().name = "b".to_string();
    let second = rename_record(&doc, UndoId(3), layer);
    doc.item_mut(layer).unwrap().name = "c".to_string();

    let children = group.as_group_mut().unwrap();
    children.push_child(first);
    children.push_child(second);
    assert_eq!(children.head().map(UndoRecord::id), Some(UndoId(3)));

    group.apply(UndoMode::Undo, &mut doc, &mut UndoAccumulator::default());
    assert_eq!(doc.item(layer).unwrap().name, "a");

    group.apply(UndoMode::Redo, &mut doc, &mut UndoAccumulator::default());
    assert_eq!(doc.item(layer).unwrap().name, "c");

    // stored order is untouched by popping
    let ids: Vec<_> = group
        .as_group()
        .unwrap()
        .children()
        .iter()
        .map(UndoRecord::id)
        .collect();
    assert_eq!(ids, vec![UndoId(2), UndoId(3)]);
}

#[test]
fn test_group_dirty_balance() {
    let mut doc = Document::new(4, 4);
    let layer = doc.add_item(Item::layer("a", 4, 4), 0);

    let mut group = UndoRecord::group(UndoId(1), UndoKind::GroupItemVisibility, None);
    doc.dirty.mark_dirty(group.dirty_mask());
    let child = visibility_record(&doc, UndoId(2), layer);
    doc.dirty.mark_dirty(child.dirty_mask());
    group.as_group_mut().unwrap().push_child(child);
    assert_eq!(doc.dirty.dirty(), 2);

    group.apply(UndoMode::Undo, &mut doc, &mut UndoAccumulator::default());
    assert_eq!(doc.dirty.dirty(), 0);
}

#[test]
fn test_group_accumulates_child_effects() {
    let mut doc = Document::new(10, 10);
    let mut group = UndoRecord::group(UndoId(1), UndoKind::GroupImageResize, None);
    let size = ImageUndo::size(&doc, 0, 0, 10, 10);
    doc.width = 20;
    let precision = ImageUndo::precision(&doc);
    doc.precision = crate::document::Precision::Float;

    let group_children = group.as_group_mut().unwrap();
    group_children.push_child(UndoRecord::new(
        UndoId(2),
        UndoKind::ImageSize,
        None,
        UndoKind::ImageSize.dirty_mask(),
        UndoPayload::Image(size),
    ));
    group_children.push_child(UndoRecord::new(
        UndoId(3),
        UndoKind::ImagePrecision,
        None,
        UndoKind::ImagePrecision.dirty_mask(),
        UndoPayload::Image(precision),
    ));

    let mut accum = UndoAccumulator::default();
    group.apply(UndoMode::Undo, &mut doc, &mut accum);
    assert_eq!(doc.width, 10);
    assert!(accum.precision_changed);
    assert!(accum.size_changed.is_some());
    assert!(!accum.mode_changed);
}

#[test]
fn test_free_group_drops_children() {
    let doc = Document::new(4, 4);
    let mut group = UndoRecord::group(UndoId(1), UndoKind::GroupMask, None);
    group.as_group_mut().unwrap().push_child(UndoRecord::new(
        UndoId(2),
        UndoKind::Mask,
        None,
        DirtyMask::SELECTION,
        UndoPayload::Mask(MaskUndo::new(&doc)),
    ));
    let before = group.memsize();
    assert!(before > std::mem::size_of::<UndoRecord>() + 16);

    group.free(UndoMode::Undo);
    assert!(group.as_group().unwrap().is_empty());
    assert!(group.memsize() < before);
}

#[test]
fn test_memsize_counts_preview() {
    let mut record = UndoRecord::new(
        UndoId(1),
        UndoKind::Cant,
        Some(""),
        DirtyMask::ALL,
        UndoPayload::Cant,
    );
    let base = record.memsize();
    record.set_preview(PixelBuffer::new(8, 8, 4));
    assert_eq!(record.memsize(), base + 256);

    record.free(UndoMode::Redo);
    assert!(record.preview().is_none());
}

#[test]
fn test_class_and_target() {
    let mut doc = Document::new(4, 4);
    let layer = doc.add_item(Item::layer("l", 4, 4), 0);
    let record = visibility_record(&doc, UndoId(1), layer);
    assert_eq!(record.class(), UndoClass::ItemProp);
    assert_eq!(record.payload().target(), Some(layer));
    assert!(record.is_weak());

    let group = UndoRecord::group(UndoId(2), UndoKind::GroupPaint, None);
    assert_eq!(group.class(), UndoClass::Group);
    assert_eq!(group.dirty_mask(), DirtyMask::ITEM | DirtyMask::DRAWABLE);
    assert_eq!(group.payload().target(), None);
}

#[test]
fn test_age() {
    let mut record = UndoRecord::new(
        UndoId(1),
        UndoKind::Cant,
        None,
        DirtyMask::ALL,
        UndoPayload::Cant,
    );
    assert!(record.age() <= 1);
    record.reset_age();
    assert!(record.age() <= 1);
    assert!(record.time() <= Utc::now());
}
