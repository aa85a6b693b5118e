use tracing::warn;

use crate::document::{Document, Item, ItemId, Parasite, Rgba, Vectors};

/// A generic item property as it was before an edit
#[derive(Debug, Clone, PartialEq)]
pub enum ItemProp {
    Name(String),
    Offset { x: i32, y: i32 },
    Visible(bool),
    Linked(bool),
    LockContent(bool),
    LockPosition(bool),
    Parasite {
        name: String,
        parasite: Option<Parasite>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemPropUndo {
    pub item: ItemId,
    pub prop: ItemProp,
}

impl ItemPropUndo {
    pub fn name(item: &Item, id: ItemId) -> Self {
        Self::new(id, ItemProp::Name(item.name.clone()))
    }

    pub fn offset(item: &Item, id: ItemId) -> Self {
        Self::new(
            id,
            ItemProp::Offset {
                x: item.offset_x,
                y: item.offset_y,
            },
        )
    }

    pub fn visible(item: &Item, id: ItemId) -> Self {
        Self::new(id, ItemProp::Visible(item.visible))
    }

    pub fn linked(item: &Item, id: ItemId) -> Self {
        Self::new(id, ItemProp::Linked(item.linked))
    }

    pub fn lock_content(item: &Item, id: ItemId) -> Self {
        Self::new(id, ItemProp::LockContent(item.lock_content))
    }

    pub fn lock_position(item: &Item, id: ItemId) -> Self {
        Self::new(id, ItemProp::LockPosition(item.lock_position))
    }

    pub fn parasite(item: &Item, id: ItemId, name: &str) -> Self {
        Self::new(
            id,
            ItemProp::Parasite {
                name: name.to_string(),
                parasite: item.parasites.get(name).cloned(),
            },
        )
    }

    fn new(item: ItemId, prop: ItemProp) -> Self {
        Self { item, prop }
    }

    pub fn apply(&mut self, doc: &mut Document) {
        let Some(item) = doc.item_mut(self.item) else {
            warn!(index = self.item.index, "item property undo target is gone");
            return;
        };

        match &mut self.prop {
            ItemProp::Name(name) => std::mem::swap(name, &mut item.name),
            ItemProp::Offset { x, y } => {
                std::mem::swap(x, &mut item.offset_x);
                std::mem::swap(y, &mut item.offset_y);
            }
            ItemProp::Visible(visible) => std::mem::swap(visible, &mut item.visible),
            ItemProp::Linked(linked) => std::mem::swap(linked, &mut item.linked),
            ItemProp::LockContent(lock) => std::mem::swap(lock, &mut item.lock_content),
            ItemProp::LockPosition(lock) => std::mem::swap(lock, &mut item.lock_position),
            ItemProp::Parasite { name, parasite } => {
                let current = item.parasites.remove(name.as_str());
                if let Some(parasite) = parasite.take() {
                    item.parasites.insert(name.clone(), parasite);
                }
                *parasite = current;
            }
        }
    }

    pub fn memsize(&self) -> usize {
        match &self.prop {
            ItemProp::Name(name) => name.len(),
            ItemProp::Parasite { name, parasite } => {
                name.len() + parasite.as_ref().map_or(0, Parasite::memsize)
            }
            _ => 0,
        }
    }
}

/// Where an item sat in its tree: at a position, or detached.
///
/// One payload covers reordering as well as adding and removing layers,
/// channels and paths, since all of them move an item between two places.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemTreeUndo {
    pub item: ItemId,
    pub position: Option<usize>,
}

impl ItemTreeUndo {
    pub fn new(doc: &Document, item: ItemId) -> Self {
        Self {
            item,
            position: doc.position(item),
        }
    }

    pub fn apply(&mut self, doc: &mut Document) {
        if !doc.contains(self.item) {
            warn!(index = self.item.index, "item tree undo target is gone");
            return;
        }

        let current = doc.detach(self.item);
        if let Some(position) = self.position {
            doc.attach(self.item, position);
        }
        self.position = current;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChannelColorUndo {
    pub item: ItemId,
    pub color: Rgba,
}

impl ChannelColorUndo {
    pub fn apply(&mut self, doc: &mut Document) {
        let Some(channel) = doc.item_mut(self.item).and_then(Item::as_channel_mut) else {
            warn!(index = self.item.index, "channel color undo target is gone");
            return;
        };
        std::mem::swap(&mut self.color, &mut channel.color);
    }
}

/// Whole stroke set of a path
#[derive(Debug, Clone, PartialEq)]
pub struct VectorsUndo {
    pub item: ItemId,
    pub vectors: Vectors,
}

impl VectorsUndo {
    pub fn apply(&mut self, doc: &mut Document) {
        let Some(vectors) = doc.item_mut(self.item).and_then(Item::as_vectors_mut) else {
            warn!(index = self.item.index, "path undo target is gone");
            return;
        };
        std::mem::swap(&mut self.vectors, vectors);
    }

    pub fn memsize(&self) -> usize {
        self.vectors
            .strokes
            .iter()
            .map(|stroke| stroke.anchors.len() * std::mem::size_of::<(f64, f64)>())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Stroke;

    fn doc_with_layer() -> (Document, ItemId) {
        let mut doc = Document::new(8, 8);
        let id = doc.add_item(Item::layer("Background", 8, 8), 0);
        (doc, id)
    }

    #[test]
    fn test_rename_round_trip() {
        let (mut doc, id) = doc_with_layer();
        let mut undo = doc.item(id).map(|item| ItemPropUndo::name(item, id)).unwrap();
        doc.item_mut(id).unwrap().name = "Sky".to_string();

        undo.apply(&mut doc);
        assert_eq!(doc.item(id).unwrap().name, "Background");
        undo.apply(&mut doc);
        assert_eq!(doc.item(id).unwrap().name, "Sky");
    }

    #[test]
    fn test_offset_swap() {
        let (mut doc, id) = doc_with_layer();
        let mut undo = ItemPropUndo::offset(doc.item(id).unwrap(), id);
        {
            let item = doc.item_mut(id).unwrap();
            item.offset_x = 5;
            item.offset_y = -3;
        }

        undo.apply(&mut doc);
        let item = doc.item(id).unwrap();
        assert_eq!((item.offset_x, item.offset_y), (0, 0));
        assert_eq!(undo.prop, ItemProp::Offset { x: 5, y: -3 });
    }

    #[test]
    fn test_item_parasite_swap() {
        let (mut doc, id) = doc_with_layer();
        let mut undo = ItemPropUndo::parasite(doc.item(id).unwrap(), id, "note");
        doc.item_mut(id)
            .unwrap()
            .parasites
            .insert("note".to_string(), Parasite::new("note", 0, vec![1, 2]));

        undo.apply(&mut doc);
        assert!(doc.item(id).unwrap().parasites.is_empty());
        undo.apply(&mut doc);
        assert!(doc.item(id).unwrap().parasites.contains_key("note"));
    }

    #[test]
    fn test_destroyed_target_is_skipped() {
        let (mut doc, id) = doc_with_layer();
        let mut undo = ItemPropUndo::visible(doc.item(id).unwrap(), id);
        doc.destroy_item(id);

        undo.apply(&mut doc);
        assert_eq!(undo.prop, ItemProp::Visible(true));
    }

    #[test]
    fn test_tree_undo_reverts_add() {
        let mut doc = Document::new(8, 8);
        let id = doc.create_item(Item::layer("new", 8, 8));
        let mut undo = ItemTreeUndo::new(&doc, id);
        doc.attach(id, 0);

        undo.apply(&mut doc);
        assert!(!doc.is_attached(id));
        assert!(doc.contains(id));

        undo.apply(&mut doc);
        assert_eq!(doc.position(id), Some(0));
    }

    #[test]
    fn test_tree_undo_reverts_reorder() {
        let mut doc = Document::new(8, 8);
        let a = doc.add_item(Item::layer("a", 8, 8), 0);
        let b = doc.add_item(Item::layer("b", 8, 8), 1);
        let mut undo = ItemTreeUndo::new(&doc, a);
        doc.reorder(a, 1);
        assert_eq!(doc.layers(), &[b, a]);

        undo.apply(&mut doc);
        assert_eq!(doc.layers(), &[a, b]);
        undo.apply(&mut doc);
        assert_eq!(doc.layers(), &[b, a]);
    }

    #[test]
    fn test_channel_color_swap() {
        let mut doc = Document::new(8, 8);
        let red = Rgba { r: 1.0, g: 0.0, b: 0.0, a: 1.0 };
        let id = doc.add_item(Item::channel("c", 8, 8, red), 0);
        let mut undo = ChannelColorUndo { item: id, color: red };
        doc.item_mut(id).and_then(Item::as_channel_mut).unwrap().color.g = 1.0;

        undo.apply(&mut doc);
        assert_eq!(doc.item_mut(id).and_then(Item::as_channel_mut).unwrap().color, red);
    }

    #[test]
    fn test_vectors_swap() {
        let mut doc = Document::new(8, 8);
        let id = doc.add_item(Item::vectors("path"), 0);
        let mut undo = VectorsUndo {
            item: id,
            vectors: Vectors::default(),
        };
        doc.item_mut(id)
            .and_then(Item::as_vectors_mut)
            .unwrap()
            .strokes
            .push(Stroke {
                anchors: vec![(0.0, 0.0), (4.0, 4.0)],
                closed: false,
            });

        undo.apply(&mut doc);
        assert!(doc
            .item_mut(id)
            .and_then(Item::as_vectors_mut)
            .unwrap()
            .strokes
            .is_empty());
        assert_eq!(undo.memsize(), 2 * std::mem::size_of::<(f64, f64)>());
    }
}
