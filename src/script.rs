use regex::{Captures, Regex};
use thiserror::Error;

use crate::document::{LayerMode, Rect};
use crate::history::HistoryError;
use crate::undo::UndoKind;

/// Largest canvas or layer side a script may ask for
pub const MAX_CANVAS_SIZE: u32 = 16384;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("line {line}: cannot parse `{text}`")]
    Syntax { line: usize, text: String },

    #[error("line {line}: unknown layer mode `{mode}`")]
    UnknownMode { line: usize, mode: String },

    #[error("line {line}: unknown group kind `{kind}`")]
    UnknownGroup { line: usize, kind: String },

    #[error("no layer named `{0}`")]
    NoSuchLayer(String),

    #[error("{what} {value} is out of range")]
    OutOfRange { what: &'static str, value: u32 },

    #[error(transparent)]
    History(#[from] HistoryError),
}

/// One line of a session script
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptCommand {
    /// New layer on top, image-sized unless a size is given
    Layer {
        name: String,
        size: Option<(u32, u32)>,
    },
    Opacity { layer: String, value: f64 },
    Visible { layer: String, visible: bool },
    Mode { layer: String, mode: LayerMode },
    Rename { layer: String, name: String },
    /// Canvas size, with the old content placed at the offset
    Resize {
        width: u32,
        height: u32,
        offset_x: u32,
        offset_y: u32,
    },
    /// Fill a rectangle of a layer with one value, as a brush stroke would
    Paint { layer: String, rect: Rect, value: u8 },
    Group { kind: UndoKind, name: Option<String> },
    End,
    Undo,
    Redo,
    StrongUndo,
    StrongRedo,
    Freeze,
    Thaw,
    Clear,
    /// Mark the document clean, as saving it would
    Save,
    Show,
}

/// Compiled patterns for the commands that take arguments
pub struct ScriptParser {
    layer: Regex,
    opacity: Regex,
    visible: Regex,
    mode: Regex,
    rename: Regex,
    resize: Regex,
    paint: Regex,
    group: Regex,
}

impl ScriptParser {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            layer: Regex::new(r"^layer\s+(\S+)(?:\s+(\d+)x(\d+))?$")?,
            opacity: Regex::new(r"^opacity\s+(\S+)\s+(\d+(?:\.\d+)?)$")?,
            visible: Regex::new(r"^visible\s+(\S+)\s+(on|off)$")?,
            mode: Regex::new(r"^mode\s+(\S+)\s+(\S+)$")?,
            rename: Regex::new(r"^rename\s+(\S+)\s+(.+)$")?,
            resize: Regex::new(r"^resize\s+(\d+)x(\d+)(?:\s+(\d+)\s+(\d+))?$")?,
            paint: Regex::new(r"^paint\s+(\S+)\s+(\d+)\s+(\d+)\s+(\d+)\s+(\d+)\s+(\d+)$")?,
            group: Regex::new(r"^group\s+(\S+)(?:\s+(.+))?$")?,
        })
    }

    /// Parse one script line. Blank lines and `#` comments give `None`.
    pub fn parse_line(
        &self,
        line: usize,
        input: &str,
    ) -> Result<Option<ScriptCommand>, ScriptError> {
        let trimmed = input.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(None);
        }

        let syntax = || ScriptError::Syntax {
            line,
            text: trimmed.to_string(),
        };

        let simple = match trimmed {
            "end" => Some(ScriptCommand::End),
            "undo" => Some(ScriptCommand::Undo),
            "redo" => Some(ScriptCommand::Redo),
            "strong-undo" => Some(ScriptCommand::StrongUndo),
            "strong-redo" => Some(ScriptCommand::StrongRedo),
            "freeze" => Some(ScriptCommand::Freeze),
            "thaw" => Some(ScriptCommand::Thaw),
            "clear" => Some(ScriptCommand::Clear),
            "save" => Some(ScriptCommand::Save),
            "show" => Some(ScriptCommand::Show),
            _ => None,
        };
        if simple.is_some() {
            return Ok(simple);
        }

        if let Some(caps) = self.layer.captures(trimmed) {
            let size = match (caps.get(2), caps.get(3)) {
                (Some(w), Some(h)) => Some((
                    canvas_side(w.as_str()).ok_or_else(syntax)?,
                    canvas_side(h.as_str()).ok_or_else(syntax)?,
                )),
                _ => None,
            };
            return Ok(Some(ScriptCommand::Layer {
                name: caps[1].to_string(),
                size,
            }));
        }

        if let Some(caps) = self.opacity.captures(trimmed) {
            let value: f64 = caps[2].parse().map_err(|_| syntax())?;
            return Ok(Some(ScriptCommand::Opacity {
                layer: caps[1].to_string(),
                value: value.clamp(0.0, 1.0),
            }));
        }

        if let Some(caps) = self.visible.captures(trimmed) {
            return Ok(Some(ScriptCommand::Visible {
                layer: caps[1].to_string(),
                visible: &caps[2] == "on",
            }));
        }

        if let Some(caps) = self.mode.captures(trimmed) {
            let Some(mode) = LayerMode::parse(&caps[2]) else {
                return Err(ScriptError::UnknownMode {
                    line,
                    mode: caps[2].to_string(),
                });
            };
            return Ok(Some(ScriptCommand::Mode {
                layer: caps[1].to_string(),
                mode,
            }));
        }

        if let Some(caps) = self.rename.captures(trimmed) {
            return Ok(Some(ScriptCommand::Rename {
                layer: caps[1].to_string(),
                name: caps[2].trim().to_string(),
            }));
        }

        if let Some(caps) = self.resize.captures(trimmed) {
            let offset = |i: usize| -> Result<u32, ScriptError> {
                caps.get(i)
                    .map_or(Ok(0), |m| m.as_str().parse())
                    .ok()
                    .filter(|&v| v <= MAX_CANVAS_SIZE)
                    .ok_or_else(syntax)
            };
            return Ok(Some(ScriptCommand::Resize {
                width: canvas_side(&caps[1]).ok_or_else(syntax)?,
                height: canvas_side(&caps[2]).ok_or_else(syntax)?,
                offset_x: offset(3)?,
                offset_y: offset(4)?,
            }));
        }

        if let Some(caps) = self.paint.captures(trimmed) {
            return Ok(Some(parse_paint(&caps).ok_or_else(syntax)?));
        }

        if let Some(caps) = self.group.captures(trimmed) {
            let Some(kind) = UndoKind::parse_group(&caps[1]) else {
                return Err(ScriptError::UnknownGroup {
                    line,
                    kind: caps[1].to_string(),
                });
            };
            return Ok(Some(ScriptCommand::Group {
                kind,
                name: caps.get(2).map(|m| m.as_str().trim().to_string()),
            }));
        }

        Err(syntax())
    }
}

fn canvas_side(text: &str) -> Option<u32> {
    text.parse()
        .ok()
        .filter(|&v| (1..=MAX_CANVAS_SIZE).contains(&v))
}

fn parse_paint(caps: &Captures) -> Option<ScriptCommand> {
    let number = |i: usize| caps[i].parse::<u32>().ok();
    Some(ScriptCommand::Paint {
        layer: caps[1].to_string(),
        rect: Rect::new(number(2)?, number(3)?, number(4)?, number(5)?),
        value: caps[6].parse().ok()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Result<Option<ScriptCommand>, ScriptError> {
        ScriptParser::new().unwrap().parse_line(1, input)
    }

    #[test]
    fn test_blank_and_comment_lines() {
        assert!(parse("").unwrap().is_none());
        assert!(parse("   ").unwrap().is_none());
        assert!(parse("# set up the sky").unwrap().is_none());
    }

    #[test]
    fn test_simple_commands() {
        assert_eq!(parse("undo").unwrap(), Some(ScriptCommand::Undo));
        assert_eq!(parse("  strong-redo ").unwrap(), Some(ScriptCommand::StrongRedo));
        assert_eq!(parse("end").unwrap(), Some(ScriptCommand::End));
        assert_eq!(parse("save").unwrap(), Some(ScriptCommand::Save));
    }

    #[test]
    fn test_layer() {
        assert_eq!(
            parse("layer Sky").unwrap(),
            Some(ScriptCommand::Layer {
                name: "Sky".to_string(),
                size: None
            })
        );
        assert_eq!(
            parse("layer Sky 64x32").unwrap(),
            Some(ScriptCommand::Layer {
                name: "Sky".to_string(),
                size: Some((64, 32))
            })
        );
    }

    #[test]
    fn test_opacity_is_clamped() {
        assert_eq!(
            parse("opacity Sky 0.5").unwrap(),
            Some(ScriptCommand::Opacity {
                layer: "Sky".to_string(),
                value: 0.5
            })
        );
        assert_eq!(
            parse("opacity Sky 3").unwrap(),
            Some(ScriptCommand::Opacity {
                layer: "Sky".to_string(),
                value: 1.0
            })
        );
    }

    #[test]
    fn test_mode_and_visibility() {
        assert_eq!(
            parse("mode Sky multiply").unwrap(),
            Some(ScriptCommand::Mode {
                layer: "Sky".to_string(),
                mode: LayerMode::Multiply
            })
        );
        assert!(matches!(
            parse("mode Sky sparkle"),
            Err(ScriptError::UnknownMode { line: 1, .. })
        ));
        assert_eq!(
            parse("visible Sky off").unwrap(),
            Some(ScriptCommand::Visible {
                layer: "Sky".to_string(),
                visible: false
            })
        );
    }

    #[test]
    fn test_rename_keeps_spaces() {
        assert_eq!(
            parse("rename Sky Evening sky").unwrap(),
            Some(ScriptCommand::Rename {
                layer: "Sky".to_string(),
                name: "Evening sky".to_string()
            })
        );
    }

    #[test]
    fn test_resize_offset_defaults_to_zero() {
        assert_eq!(
            parse("resize 100x50").unwrap(),
            Some(ScriptCommand::Resize {
                width: 100,
                height: 50,
                offset_x: 0,
                offset_y: 0
            })
        );
        assert_eq!(
            parse("resize 100x50 10 5").unwrap(),
            Some(ScriptCommand::Resize {
                width: 100,
                height: 50,
                offset_x: 10,
                offset_y: 5
            })
        );
    }

    #[test]
    fn test_canvas_sizes_are_bounded() {
        assert!(matches!(
            parse("resize 100000x100000"),
            Err(ScriptError::Syntax { .. })
        ));
        assert!(matches!(
            parse("resize 64x0"),
            Err(ScriptError::Syntax { .. })
        ));
        assert!(matches!(
            parse("resize 64x64 4294967295 0"),
            Err(ScriptError::Syntax { .. })
        ));
        assert!(matches!(
            parse("layer Sky 99999999x2"),
            Err(ScriptError::Syntax { .. })
        ));
        assert!(parse(&format!("resize {0}x{0}", MAX_CANVAS_SIZE)).is_ok());
    }

    #[test]
    fn test_paint() {
        assert_eq!(
            parse("paint Sky 1 2 3 4 200").unwrap(),
            Some(ScriptCommand::Paint {
                layer: "Sky".to_string(),
                rect: Rect::new(1, 2, 3, 4),
                value: 200
            })
        );
        assert!(matches!(
            parse("paint Sky 1 2 3 4 300"),
            Err(ScriptError::Syntax { .. })
        ));
    }

    #[test]
    fn test_group() {
        assert_eq!(
            parse("group item-properties Layer attributes").unwrap(),
            Some(ScriptCommand::Group {
                kind: UndoKind::GroupItemProperties,
                name: Some("Layer attributes".to_string())
            })
        );
        assert_eq!(
            parse("group paint").unwrap(),
            Some(ScriptCommand::Group {
                kind: UndoKind::GroupPaint,
                name: None
            })
        );
        assert!(matches!(
            parse("group nonsense"),
            Err(ScriptError::UnknownGroup { .. })
        ));
    }

    #[test]
    fn test_garbage_is_a_syntax_error() {
        match parse("frobnicate") {
            Err(ScriptError::Syntax { line, text }) => {
                assert_eq!(line, 1);
                assert_eq!(text, "frobnicate");
            }
            other => panic!("expected syntax error, got {:?}", other),
        }
    }
}
