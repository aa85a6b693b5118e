use std::collections::BTreeMap;

use super::buffer::PixelBuffer;

/// Handle into a document's item arena.
///
/// A handle stays valid while the item is detached from its tree (removed
/// but restorable). It goes stale once the item is destroyed; the slot's
/// generation is bumped so a later item reusing the slot never aliases it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

/// Named blob attached to an image or an item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parasite {
    pub name: String,
    pub flags: u32,
    pub data: Vec<u8>,
}

impl Parasite {
    pub fn new(name: &str, flags: u32, data: Vec<u8>) -> Self {
        Self {
            name: name.to_string(),
            flags,
            data,
        }
    }

    pub fn memsize(&self) -> usize {
        self.name.len() + self.data.len()
    }
}

pub type Parasites = BTreeMap<String, Parasite>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayerMode {
    #[default]
    Normal,
    Dissolve,
    Multiply,
    Screen,
    Overlay,
    Difference,
    Addition,
    Subtract,
    DarkenOnly,
    LightenOnly,
}

impl LayerMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "normal" => Some(LayerMode::Normal),
            "dissolve" => Some(LayerMode::Dissolve),
            "multiply" => Some(LayerMode::Multiply),
            "screen" => Some(LayerMode::Screen),
            "overlay" => Some(LayerMode::Overlay),
            "difference" => Some(LayerMode::Difference),
            "addition" => Some(LayerMode::Addition),
            "subtract" => Some(LayerMode::Subtract),
            "darken" | "darken-only" => Some(LayerMode::DarkenOnly),
            "lighten" | "lighten-only" => Some(LayerMode::LightenOnly),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerMask {
    pub pixels: PixelBuffer,
    pub apply: bool,
    pub show: bool,
}

impl LayerMask {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: PixelBuffer::filled(width, height, 1, 255),
            apply: true,
            show: false,
        }
    }
}

/// What is left of a text layer once layout is out of the picture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextInfo {
    pub text: String,
    /// Pixels were painted over, the text no longer matches the content
    pub modified: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub pixels: PixelBuffer,
    pub mode: LayerMode,
    pub opacity: f64,
    pub lock_alpha: bool,
    pub mask: Option<LayerMask>,
    pub text: Option<TextInfo>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    pub pixels: PixelBuffer,
    pub color: Rgba,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    pub anchors: Vec<(f64, f64)>,
    pub closed: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Vectors {
    pub strokes: Vec<Stroke>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ItemData {
    Layer(Layer),
    Channel(Channel),
    Vectors(Vectors),
}

/// The three ordered item trees of an image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemTree {
    Layers,
    Channels,
    Vectors,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub name: String,
    pub visible: bool,
    pub linked: bool,
    pub lock_content: bool,
    pub lock_position: bool,
    pub offset_x: i32,
    pub offset_y: i32,
    pub parasites: Parasites,
    pub data: ItemData,
}

impl Item {
    fn with_data(name: &str, data: ItemData) -> Self {
        Self {
            name: name.to_string(),
            visible: true,
            linked: false,
            lock_content: false,
            lock_position: false,
            offset_x: 0,
            offset_y: 0,
            parasites: Parasites::new(),
            data,
        }
    }

    /// RGBA layer filled with transparent pixels
    pub fn layer(name: &str, width: u32, height: u32) -> Self {
        Self::with_data(
            name,
            ItemData::Layer(Layer {
                pixels: PixelBuffer::new(width, height, 4),
                mode: LayerMode::Normal,
                opacity: 1.0,
                lock_alpha: false,
                mask: None,
                text: None,
            }),
        )
    }

    pub fn text_layer(name: &str, width: u32, height: u32, text: &str) -> Self {
        let mut item = Self::layer(name, width, height);
        if let ItemData::Layer(layer) = &mut item.data {
            layer.text = Some(TextInfo {
                text: text.to_string(),
                modified: false,
            });
        }
        item
    }

    pub fn channel(name: &str, width: u32, height: u32, color: Rgba) -> Self {
        Self::with_data(
            name,
            ItemData::Channel(Channel {
                pixels: PixelBuffer::new(width, height, 1),
                color,
            }),
        )
    }

    pub fn vectors(name: &str) -> Self {
        Self::with_data(name, ItemData::Vectors(Vectors::default()))
    }

    pub fn tree(&self) -> ItemTree {
        match self.data {
            ItemData::Layer(_) => ItemTree::Layers,
            ItemData::Channel(_) => ItemTree::Channels,
            ItemData::Vectors(_) => ItemTree::Vectors,
        }
    }

    pub fn is_drawable(&self) -> bool {
        !matches!(self.data, ItemData::Vectors(_))
    }

    pub fn as_layer(&self) -> Option<&Layer> {
        match &self.data {
            ItemData::Layer(layer) => Some(layer),
            _ => None,
        }
    }

    pub fn as_layer_mut(&mut self) -> Option<&mut Layer> {
        match &mut self.data {
            ItemData::Layer(layer) => Some(layer),
            _ => None,
        }
    }

    pub fn as_channel(&self) -> Option<&Channel> {
        match &self.data {
            ItemData::Channel(channel) => Some(channel),
            _ => None,
        }
    }

    pub fn as_channel_mut(&mut self) -> Option<&mut Channel> {
        match &mut self.data {
            ItemData::Channel(channel) => Some(channel),
            _ => None,
        }
    }

    pub fn as_vectors(&self) -> Option<&Vectors> {
        match &self.data {
            ItemData::Vectors(vectors) => Some(vectors),
            _ => None,
        }
    }

    pub fn as_vectors_mut(&mut self) -> Option<&mut Vectors> {
        match &mut self.data {
            ItemData::Vectors(vectors) => Some(vectors),
            _ => None,
        }
    }

    /// Pixel content of a layer or channel
    pub fn pixels(&self) -> Option<&PixelBuffer> {
        match &self.data {
            ItemData::Layer(layer) => Some(&layer.pixels),
            ItemData::Channel(channel) => Some(&channel.pixels),
            ItemData::Vectors(_) => None,
        }
    }

    pub fn pixels_mut(&mut self) -> Option<&mut PixelBuffer> {
        match &mut self.data {
            ItemData::Layer(layer) => Some(&mut layer.pixels),
            ItemData::Channel(channel) => Some(&mut channel.pixels),
            ItemData::Vectors(_) => None,
        }
    }
}
