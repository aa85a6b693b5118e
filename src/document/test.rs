use super::*;

fn doc_with_layers(names: &[&str]) -> (Document, Vec<ItemId>) {
    let mut doc = Document::new(16, 16);
    let ids = names
        .iter()
        .enumerate()
        .map(|(i, name)| doc.add_item(Item::layer(name, 16, 16), i))
        .collect();
    (doc, ids)
}

#[test]
fn test_add_item_attaches_in_order() {
    let (doc, ids) = doc_with_layers(&["a", "b", "c"]);
    assert_eq!(doc.layers(), ids.as_slice());
    assert_eq!(doc.position(ids[2]), Some(2));
}

#[test]
fn test_trees_are_separate() {
    let (mut doc, _) = doc_with_layers(&["a"]);
    let path = doc.add_item(Item::vectors("path"), 0);
    let chan = doc.add_item(
        Item::channel("alpha copy", 16, 16, Rgba { r: 0.0, g: 0.0, b: 0.0, a: 0.5 }),
        0,
    );

    assert_eq!(doc.layers().len(), 1);
    assert_eq!(doc.vectors(), &[path]);
    assert_eq!(doc.channels(), &[chan]);
}

#[test]
fn test_detach_keeps_item_alive() {
    let (mut doc, ids) = doc_with_layers(&["a", "b"]);

    assert_eq!(doc.detach(ids[0]), Some(0));
    assert!(!doc.is_attached(ids[0]));
    assert!(doc.contains(ids[0]));
    assert_eq!(doc.layers(), &[ids[1]]);

    assert!(doc.attach(ids[0], 5));
    assert_eq!(doc.layers(), &[ids[1], ids[0]]);
}

#[test]
fn test_attach_twice_is_refused() {
    let (mut doc, ids) = doc_with_layers(&["a"]);
    assert!(!doc.attach(ids[0], 0));
    assert_eq!(doc.layers().len(), 1);
}

#[test]
fn test_destroy_makes_handle_stale() {
    let (mut doc, ids) = doc_with_layers(&["a"]);

    let item = doc.destroy_item(ids[0]);
    assert_eq!(item.map(|i| i.name), Some("a".to_string()));
    assert!(doc.item(ids[0]).is_none());
    assert!(doc.layers().is_empty());

    // slot is reused, old handle must not see the new item
    let new_id = doc.add_item(Item::layer("b", 4, 4), 0);
    assert_eq!(new_id.index, ids[0].index);
    assert_ne!(new_id, ids[0]);
    assert!(doc.item(ids[0]).is_none());
    assert!(doc.destroy_item(ids[0]).is_none());
}

#[test]
fn test_reorder() {
    let (mut doc, ids) = doc_with_layers(&["a", "b", "c"]);
    assert!(doc.reorder(ids[0], 2));
    assert_eq!(doc.layers(), &[ids[1], ids[2], ids[0]]);
}

#[test]
fn test_find_by_name() {
    let (doc, ids) = doc_with_layers(&["bg", "fg"]);
    assert_eq!(doc.find_by_name("fg"), Some(ids[1]));
    assert_eq!(doc.find_by_name("missing"), None);
}

#[test]
fn test_set_guide() {
    let mut doc = Document::new(8, 8);
    doc.set_guide(1, Orientation::Vertical, Some(3));
    assert_eq!(doc.guide(1).map(|g| g.position), Some(3));

    doc.set_guide(1, Orientation::Horizontal, Some(5));
    assert_eq!(doc.guide(1).map(|g| g.orientation), Some(Orientation::Horizontal));

    doc.set_guide(1, Orientation::Horizontal, None);
    assert!(doc.guide(1).is_none());
}

#[test]
fn test_set_sample_point() {
    let mut doc = Document::new(8, 8);
    doc.set_sample_point(4, Some((1, 2)));
    assert_eq!(doc.sample_point(4).map(|p| (p.x, p.y)), Some((1, 2)));

    doc.set_sample_point(4, None);
    assert!(doc.sample_points.is_empty());
}

#[test]
fn test_thumbnail_uses_top_visible_layer() {
    let (mut doc, ids) = doc_with_layers(&["top", "bottom"]);
    if let Some(pixels) = doc.item_mut(ids[1]).and_then(Item::pixels_mut) {
        pixels.fill_rect(0, 0, 16, 16, 200);
    }
    if let Some(item) = doc.item_mut(ids[0]) {
        item.visible = false;
    }

    let thumb = doc.thumbnail(4, 4);
    assert_eq!((thumb.width(), thumb.height()), (4, 4));
    assert!(thumb.data().iter().all(|&b| b == 200));
}
