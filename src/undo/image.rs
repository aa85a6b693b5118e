use crate::document::{BaseType, Document, Grid, Orientation, Parasite, Precision, Unit};

use super::{SizeChange, UndoAccumulator};

/// Differences below this are not a resolution change
const RESOLUTION_EPSILON: f64 = 1e-5;

/// Image-wide properties. Each variant holds the value the document does not
/// currently have; applying swaps it with the document's.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageUndo {
    Type(BaseType),
    Precision(Precision),
    Size(SizeUndo),
    Resolution {
        xresolution: f64,
        yresolution: f64,
        unit: Unit,
    },
    Grid(Grid),
    Colormap(Option<Vec<[u8; 3]>>),
    Parasite {
        name: String,
        parasite: Option<Parasite>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeUndo {
    pub width: u32,
    pub height: u32,
    pub previous_origin_x: i32,
    pub previous_origin_y: i32,
    pub previous_width: u32,
    pub previous_height: u32,
}

impl ImageUndo {
    /// Snapshot the image's current base type
    pub fn base_type(doc: &Document) -> Self {
        ImageUndo::Type(doc.base_type)
    }

    pub fn precision(doc: &Document) -> Self {
        ImageUndo::Precision(doc.precision)
    }

    /// Snapshot the image's current size. The previous geometry is what
    /// listeners get told when the size changes back.
    pub fn size(
        doc: &Document,
        previous_origin_x: i32,
        previous_origin_y: i32,
        previous_width: u32,
        previous_height: u32,
    ) -> Self {
        ImageUndo::Size(SizeUndo {
            width: doc.width,
            height: doc.height,
            previous_origin_x,
            previous_origin_y,
            previous_width,
            previous_height,
        })
    }

    pub fn resolution(doc: &Document) -> Self {
        ImageUndo::Resolution {
            xresolution: doc.xresolution,
            yresolution: doc.yresolution,
            unit: doc.unit,
        }
    }

    pub fn grid(doc: &Document) -> Self {
        ImageUndo::Grid(doc.grid)
    }

    pub fn colormap(doc: &Document) -> Self {
        ImageUndo::Colormap(doc.colormap.clone())
    }

    /// Snapshot whatever parasite is currently attached under `name`
    pub fn parasite(doc: &Document, name: &str) -> Self {
        ImageUndo::Parasite {
            name: name.to_string(),
            parasite: doc.parasites.get(name).cloned(),
        }
    }

    pub fn apply(&mut self, doc: &mut Document, accum: &mut UndoAccumulator) {
        match self {
            ImageUndo::Type(base_type) => {
                std::mem::swap(base_type, &mut doc.base_type);
                if *base_type != doc.base_type {
                    accum.mode_changed = true;
                }
            }
            ImageUndo::Precision(precision) => {
                std::mem::swap(precision, &mut doc.precision);
                if *precision != doc.precision {
                    accum.precision_changed = true;
                }
            }
            ImageUndo::Size(size) => {
                let restored = *size;

                // Turn into the opposite step
                size.width = doc.width;
                size.height = doc.height;
                size.previous_origin_x = -restored.previous_origin_x;
                size.previous_origin_y = -restored.previous_origin_y;
                size.previous_width = restored.width;
                size.previous_height = restored.height;

                doc.width = restored.width;
                doc.height = restored.height;

                if doc.width != size.width || doc.height != size.height {
                    accum.size_changed = Some(SizeChange {
                        previous_origin_x: restored.previous_origin_x,
                        previous_origin_y: restored.previous_origin_y,
                        previous_width: restored.previous_width,
                        previous_height: restored.previous_height,
                    });
                }
            }
            ImageUndo::Resolution {
                xresolution,
                yresolution,
                unit,
            } => {
                if (*xresolution - doc.xresolution).abs() >= RESOLUTION_EPSILON
                    || (*yresolution - doc.yresolution).abs() >= RESOLUTION_EPSILON
                {
                    std::mem::swap(xresolution, &mut doc.xresolution);
                    std::mem::swap(yresolution, &mut doc.yresolution);
                    accum.resolution_changed = true;
                }

                if *unit != doc.unit {
                    std::mem::swap(unit, &mut doc.unit);
                    accum.unit_changed = true;
                }
            }
            ImageUndo::Grid(grid) => std::mem::swap(grid, &mut doc.grid),
            ImageUndo::Colormap(colormap) => std::mem::swap(colormap, &mut doc.colormap),
            ImageUndo::Parasite { name, parasite } => {
                let current = doc.parasites.remove(name.as_str());
                if let Some(parasite) = parasite.take() {
                    doc.parasites.insert(name.clone(), parasite);
                }
                *parasite = current;
            }
        }
    }

    pub fn memsize(&self) -> usize {
        match self {
            ImageUndo::Colormap(Some(colormap)) => colormap.len() * 3,
            ImageUndo::Parasite { name, parasite } => {
                name.len() + parasite.as_ref().map_or(0, Parasite::memsize)
            }
            _ => 0,
        }
    }

    pub fn free(&mut self) {
        match self {
            ImageUndo::Colormap(colormap) => *colormap = None,
            ImageUndo::Parasite { parasite, .. } => *parasite = None,
            _ => {}
        }
    }
}

/// A guide as it was: placed at `position`, or absent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuideUndo {
    pub id: u32,
    pub orientation: Orientation,
    pub position: Option<i32>,
}

impl GuideUndo {
    pub fn new(doc: &Document, id: u32, orientation: Orientation) -> Self {
        match doc.guide(id) {
            Some(guide) => Self {
                id,
                orientation: guide.orientation,
                position: Some(guide.position),
            },
            None => Self {
                id,
                orientation,
                position: None,
            },
        }
    }

    pub fn apply(&mut self, doc: &mut Document) {
        let current = doc.guide(self.id).copied();
        doc.set_guide(self.id, self.orientation, self.position);

        if let Some(guide) = current {
            self.orientation = guide.orientation;
        }
        self.position = current.map(|guide| guide.position);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplePointUndo {
    pub id: u32,
    pub position: Option<(i32, i32)>,
}

impl SamplePointUndo {
    pub fn new(doc: &Document, id: u32) -> Self {
        Self {
            id,
            position: doc.sample_point(id).map(|point| (point.x, point.y)),
        }
    }

    pub fn apply(&mut self, doc: &mut Document) {
        let current = doc.sample_point(self.id).map(|point| (point.x, point.y));
        doc.set_sample_point(self.id, self.position);
        self.position = current;
    }
}
