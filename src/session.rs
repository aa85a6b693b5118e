use std::fmt::Write;

use tracing::{debug, info};

use crate::config::HistoryConfig;
use crate::document::{Document, Item, ItemId, PixelBuffer, Rect};
use crate::history::{History, UndoEvent};
use crate::script::{ScriptCommand, ScriptError, MAX_CANVAS_SIZE};
use crate::undo::{UndoClass, UndoKind, UndoRecord};

/// A document and its history, driven one script command at a time
#[derive(Debug)]
pub struct Session {
    pub doc: Document,
    pub history: History,
}

impl Session {
    pub fn new(width: u32, height: u32, config: HistoryConfig) -> Self {
        let mut history = History::new(config);
        history.connect(Box::new(|event: &UndoEvent| match event.record() {
            Some(record) => debug!(
                event = event.name(),
                id = %record.id(),
                name = record.name(),
                "history event"
            ),
            None => debug!(event = event.name(), "history event"),
        }));

        Self {
            doc: Document::new(width, height),
            history,
        }
    }

    fn layer(&self, name: &str) -> Result<ItemId, ScriptError> {
        self.doc
            .find_by_name(name)
            .filter(|&id| self.doc.item(id).is_some_and(|item| item.as_layer().is_some()))
            .ok_or_else(|| ScriptError::NoSuchLayer(name.to_string()))
    }

    /// Carry out one command. `show` returns the report, everything else
    /// returns `None`.
    pub fn run(&mut self, command: &ScriptCommand) -> Result<Option<String>, ScriptError> {
        match command {
            ScriptCommand::Layer { name, size } => {
                let (width, height) = size.unwrap_or((self.doc.width, self.doc.height));
                let id = self.doc.create_item(Item::layer(name, width, height));
                self.history.push_layer_add(&mut self.doc, None, id);
                self.doc.attach(id, 0);
                info!(name = name.as_str(), width, height, "layer added");
            }
            ScriptCommand::Opacity { layer, value } => {
                let id = self.layer(layer)?;
                self.set_opacity(id, *value);
            }
            ScriptCommand::Visible { layer, visible } => {
                let id = self.layer(layer)?;
                self.history.push_item_visibility(&mut self.doc, None, id);
                if let Some(item) = self.doc.item_mut(id) {
                    item.visible = *visible;
                }
            }
            ScriptCommand::Mode { layer, mode } => {
                let id = self.layer(layer)?;
                self.history.push_layer_mode(&mut self.doc, None, id);
                if let Some(layer) = self.doc.item_mut(id).and_then(Item::as_layer_mut) {
                    layer.mode = *mode;
                }
            }
            ScriptCommand::Rename { layer, name } => {
                let id = self.layer(layer)?;
                self.history.push_item_rename(&mut self.doc, None, id);
                if let Some(item) = self.doc.item_mut(id) {
                    item.name = name.clone();
                }
            }
            ScriptCommand::Resize {
                width,
                height,
                offset_x,
                offset_y,
            } => self.resize(*width, *height, *offset_x, *offset_y)?,
            ScriptCommand::Paint { layer, rect, value } => {
                let id = self.layer(layer)?;
                self.paint(id, *rect, *value)?;
            }
            ScriptCommand::Group { kind, name } => {
                self.history
                    .group_start(&mut self.doc, *kind, name.as_deref())?;
            }
            ScriptCommand::End => self.history.group_end(&mut self.doc)?,
            ScriptCommand::Undo => self.history.undo(&mut self.doc)?,
            ScriptCommand::Redo => self.history.redo(&mut self.doc)?,
            ScriptCommand::StrongUndo => self.history.strong_undo(&mut self.doc)?,
            ScriptCommand::StrongRedo => self.history.strong_redo(&mut self.doc)?,
            ScriptCommand::Freeze => self.history.freeze(),
            ScriptCommand::Thaw => self.history.thaw()?,
            ScriptCommand::Clear => self.history.clear_all(&mut self.doc),
            ScriptCommand::Save => self.doc.dirty.clean_all(),
            ScriptCommand::Show => return Ok(Some(self.report())),
        }

        self.idle();
        Ok(None)
    }

    /// Opacity changes to the same layer in a row fold into one step
    fn set_opacity(&mut self, id: ItemId, value: f64) {
        let compressible = self
            .history
            .can_compress(&self.doc, UndoClass::LayerProp, UndoKind::LayerOpacity)
            .is_some_and(|head| head.payload().target() == Some(id));

        if compressible {
            debug!(index = id.index, "opacity change folded into previous step");
        } else {
            self.history.push_layer_opacity(&mut self.doc, None, id);
        }

        if let Some(layer) = self.doc.item_mut(id).and_then(Item::as_layer_mut) {
            layer.opacity = value;
        }
    }

    /// One brush stroke: the paint marker and the touched pixels, grouped so
    /// the stroke can be faded
    fn paint(&mut self, id: ItemId, rect: Rect, value: u8) -> Result<(), ScriptError> {
        let Some((width, height, bpp)) = self
            .doc
            .item(id)
            .and_then(Item::pixels)
            .map(|p| (p.width(), p.height(), p.bpp()))
        else {
            return Err(ScriptError::NoSuchLayer(format!("#{}", id.index)));
        };
        let area = rect.clip(width, height);

        let grouped = self
            .history
            .group_start(&mut self.doc, UndoKind::GroupPaint, None)
            .is_ok();

        let applied = PixelBuffer::filled(area.width, area.height, bpp, value);
        self.history.push_paint(&mut self.doc, None);
        self.history
            .push_drawable(&mut self.doc, None, id, area, Some(applied));

        if let Some(pixels) = self.doc.item_mut(id).and_then(Item::pixels_mut) {
            pixels.fill_rect(area.x, area.y, area.width, area.height, value);
        }
        self.doc.last_paint_coords = Some((
            rect.x as f64 + rect.width as f64,
            rect.y as f64 + rect.height as f64,
        ));

        if grouped {
            self.history.group_end(&mut self.doc)?;
        }
        Ok(())
    }

    fn resize(
        &mut self,
        width: u32,
        height: u32,
        offset_x: u32,
        offset_y: u32,
    ) -> Result<(), ScriptError> {
        let offset = |value: u32| {
            i32::try_from(value).map_err(|_| ScriptError::OutOfRange {
                what: "offset",
                value,
            })
        };
        let (origin_x, origin_y) = (offset(offset_x)?, offset(offset_y)?);
        for (what, value) in [("width", width), ("height", height)] {
            if value == 0 || value > MAX_CANVAS_SIZE {
                return Err(ScriptError::OutOfRange { what, value });
            }
        }

        let grouped = self
            .history
            .group_start(&mut self.doc, UndoKind::GroupImageResize, None)
            .is_ok();

        let (previous_width, previous_height) = (self.doc.width, self.doc.height);
        self.history.push_image_size(
            &mut self.doc,
            None,
            origin_x,
            origin_y,
            previous_width,
            previous_height,
        );
        self.doc.width = width;
        self.doc.height = height;

        for id in self.doc.layers().to_vec() {
            self.history.push_drawable_mod(&mut self.doc, None, id);
            if let Some(pixels) = self.doc.item_mut(id).and_then(Item::pixels_mut) {
                let mut resized = PixelBuffer::new(width, height, pixels.bpp());
                resized.write_region(pixels, offset_x, offset_y);
                *pixels = resized;
            }
        }

        if grouped {
            self.history.group_end(&mut self.doc)?;
        }
        Ok(())
    }

    /// Queue a thumbnail for the newest step and render what is still wanted
    fn idle(&mut self) {
        if let Some(id) = self.history.undo_head().map(UndoRecord::id) {
            self.history.create_preview(&self.doc, id, false);
        }
        self.history.run_idle(&self.doc);
    }

    /// Both stacks, newest first, plus the dirty counter
    pub fn report(&self) -> String {
        let mut out = String::new();

        for (title, stack) in [
            ("undo", self.history.undo_stack()),
            ("redo", self.history.redo_stack()),
        ] {
            let _ = writeln!(out, "{} ({}):", title, stack.depth());
            for record in stack.iter() {
                describe(&mut out, record, 1);
            }
        }

        let _ = writeln!(
            out,
            "dirty: {}{}",
            self.doc.dirty.dirty(),
            if self.history.is_frozen() { " (frozen)" } else { "" }
        );
        out
    }
}

fn describe(out: &mut String, record: &UndoRecord, depth: usize) {
    let indent = "  ".repeat(depth);
    let preview = record
        .preview()
        .map(|p| format!(" [preview {}x{}]", p.width(), p.height()))
        .unwrap_or_default();
    let _ = writeln!(out, "{}{} {}{}", indent, record.id(), record.name(), preview);

    if let Some(group) = record.as_group() {
        for child in group.children().iter().rev() {
            describe(out, child, depth + 1);
        }
    }
}
