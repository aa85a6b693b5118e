pub mod buffer;
pub mod item;

use tracing::debug;

use crate::dirty::DirtyTracker;

pub use buffer::{PixelBuffer, Rect};
pub use item::{
    Channel, Item, ItemData, ItemId, ItemTree, Layer, LayerMask, LayerMode, Parasite, Parasites,
    Rgba, Stroke, TextInfo, Vectors,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BaseType {
    #[default]
    Rgb,
    Gray,
    Indexed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Precision {
    #[default]
    U8,
    U16,
    U32,
    Half,
    Float,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Unit {
    Pixel,
    #[default]
    Inch,
    Millimeter,
    Point,
    Pica,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    pub xspacing: f64,
    pub yspacing: f64,
    pub xoffset: f64,
    pub yoffset: f64,
}

impl Default for Grid {
    fn default() -> Self {
        Self {
            xspacing: 10.0,
            yspacing: 10.0,
            xoffset: 0.0,
            yoffset: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Guide {
    pub id: u32,
    pub orientation: Orientation,
    pub position: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplePoint {
    pub id: u32,
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    item: Option<Item>,
}

/// The image being edited.
///
/// Only the state undo records snapshot and restore is modelled here;
/// compositing and rendering live elsewhere.
#[derive(Debug, Clone)]
pub struct Document {
    pub width: u32,
    pub height: u32,
    pub base_type: BaseType,
    pub precision: Precision,
    pub xresolution: f64,
    pub yresolution: f64,
    pub unit: Unit,
    pub grid: Grid,
    pub colormap: Option<Vec<[u8; 3]>>,
    pub parasites: Parasites,
    pub guides: Vec<Guide>,
    pub sample_points: Vec<SamplePoint>,
    /// Selection mask, one byte per image pixel
    pub selection: PixelBuffer,
    /// Where the last paint stroke ended, for straight-line continuation
    pub last_paint_coords: Option<(f64, f64)>,
    pub dirty: DirtyTracker,

    slots: Vec<Slot>,
    layers: Vec<ItemId>,
    channels: Vec<ItemId>,
    vectors: Vec<ItemId>,
}

impl Document {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            base_type: BaseType::Rgb,
            precision: Precision::U8,
            xresolution: 72.0,
            yresolution: 72.0,
            unit: Unit::Inch,
            grid: Grid::default(),
            colormap: None,
            parasites: Parasites::new(),
            guides: Vec::new(),
            sample_points: Vec::new(),
            selection: PixelBuffer::new(width, height, 1),
            last_paint_coords: None,
            dirty: DirtyTracker::new(),
            slots: Vec::new(),
            layers: Vec::new(),
            channels: Vec::new(),
            vectors: Vec::new(),
        }
    }

    // === Item arena ===

    /// Put an item in the arena without attaching it to a tree
    pub fn create_item(&mut self, item: Item) -> ItemId {
        if let Some(index) = self.slots.iter().position(|slot| slot.item.is_none()) {
            let slot = &mut self.slots[index];
            slot.item = Some(item);
            return ItemId {
                index: index as u32,
                generation: slot.generation,
            };
        }

        self.slots.push(Slot {
            generation: 0,
            item: Some(item),
        });
        ItemId {
            index: (self.slots.len() - 1) as u32,
            generation: 0,
        }
    }

    /// Create an item and attach it at `position` in its tree
    pub fn add_item(&mut self, item: Item, position: usize) -> ItemId {
        let id = self.create_item(item);
        self.attach(id, position);
        id
    }

    /// Remove an item for good. Its handle goes stale.
    pub fn destroy_item(&mut self, id: ItemId) -> Option<Item> {
        self.detach(id);

        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }

        let item = slot.item.take();
        slot.generation = slot.generation.wrapping_add(1);
        debug!(index = id.index, "item destroyed");
        item
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.item.as_ref())
    }

    pub fn item_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.item.as_mut())
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.item(id).is_some()
    }

    fn tree_mut(&mut self, tree: ItemTree) -> &mut Vec<ItemId> {
        match tree {
            ItemTree::Layers => &mut self.layers,
            ItemTree::Channels => &mut self.channels,
            ItemTree::Vectors => &mut self.vectors,
        }
    }

    pub fn tree(&self, tree: ItemTree) -> &[ItemId] {
        match tree {
            ItemTree::Layers => &self.layers,
            ItemTree::Channels => &self.channels,
            ItemTree::Vectors => &self.vectors,
        }
    }

    pub fn layers(&self) -> &[ItemId] {
        &self.layers
    }

    pub fn channels(&self) -> &[ItemId] {
        &self.channels
    }

    pub fn vectors(&self) -> &[ItemId] {
        &self.vectors
    }

    /// Position of an attached item in its tree, top first
    pub fn position(&self, id: ItemId) -> Option<usize> {
        let tree = self.item(id)?.tree();
        self.tree(tree).iter().position(|&other| other == id)
    }

    pub fn is_attached(&self, id: ItemId) -> bool {
        self.position(id).is_some()
    }

    /// Insert an item into its tree, clamping `position` to the tree length.
    /// Returns false if the handle is stale or the item is already attached.
    pub fn attach(&mut self, id: ItemId, position: usize) -> bool {
        let Some(tree) = self.item(id).map(Item::tree) else {
            return false;
        };
        if self.is_attached(id) {
            return false;
        }

        let list = self.tree_mut(tree);
        let position = position.min(list.len());
        list.insert(position, id);
        true
    }

    /// Take an item out of its tree but keep it alive.
    /// Returns the position it had.
    pub fn detach(&mut self, id: ItemId) -> Option<usize> {
        let tree = self.item(id)?.tree();
        let list = self.tree_mut(tree);
        let position = list.iter().position(|&other| other == id)?;
        list.remove(position);
        Some(position)
    }

    /// Move an attached item within its tree
    pub fn reorder(&mut self, id: ItemId, position: usize) -> bool {
        match self.detach(id) {
            Some(_) => self.attach(id, position),
            None => false,
        }
    }

    /// First attached item with the given name, searched in all trees
    pub fn find_by_name(&self, name: &str) -> Option<ItemId> {
        self.layers
            .iter()
            .chain(self.channels.iter())
            .chain(self.vectors.iter())
            .copied()
            .find(|&id| self.item(id).is_some_and(|item| item.name == name))
    }

    // === Guides and sample points ===

    pub fn guide(&self, id: u32) -> Option<&Guide> {
        self.guides.iter().find(|guide| guide.id == id)
    }

    /// Place, move or (with `None`) remove a guide
    pub fn set_guide(&mut self, id: u32, orientation: Orientation, position: Option<i32>) {
        match (self.guides.iter().position(|guide| guide.id == id), position) {
            (Some(idx), Some(position)) => {
                self.guides[idx].orientation = orientation;
                self.guides[idx].position = position;
            }
            (Some(idx), None) => {
                self.guides.remove(idx);
            }
            (None, Some(position)) => self.guides.push(Guide {
                id,
                orientation,
                position,
            }),
            (None, None) => {}
        }
    }

    pub fn sample_point(&self, id: u32) -> Option<&SamplePoint> {
        self.sample_points.iter().find(|point| point.id == id)
    }

    pub fn set_sample_point(&mut self, id: u32, position: Option<(i32, i32)>) {
        match (
            self.sample_points.iter().position(|point| point.id == id),
            position,
        ) {
            (Some(idx), Some((x, y))) => {
                self.sample_points[idx].x = x;
                self.sample_points[idx].y = y;
            }
            (Some(idx), None) => {
                self.sample_points.remove(idx);
            }
            (None, Some((x, y))) => self.sample_points.push(SamplePoint { id, x, y }),
            (None, None) => {}
        }
    }

    // === Rendering for previews ===

    /// Rough thumbnail of the image: the topmost visible layer, resampled.
    /// Compositing is not modelled, so this is what history previews show.
    pub fn thumbnail(&self, width: u32, height: u32) -> PixelBuffer {
        self.layers
            .iter()
            .filter_map(|&id| self.item(id))
            .find(|item| item.visible)
            .and_then(Item::pixels)
            .map(|pixels| pixels.scaled(width, height))
            .unwrap_or_else(|| PixelBuffer::new(width, height, 4))
    }

    pub fn selection_thumbnail(&self, width: u32, height: u32) -> PixelBuffer {
        self.selection.scaled(width, height)
    }
}

#[cfg(test)]
mod test;
