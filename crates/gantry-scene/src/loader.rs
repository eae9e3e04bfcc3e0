//! The stock line-based scene description format.
//!
//! One directive per line; `#` starts a comment; blank lines are
//! ignored. Directives:
//!
//! ```text
//! world NAME            # opens the document's world (at most one)
//! model NAME            # a model; nested in the open world, else standalone
//! link NAME             # a named part of the current model
//! update_period_ms N    # fixed update period declared by the world
//! ```
//!
//! Parse errors accumulate with line numbers; a document is only
//! returned when no error occurred.

use std::fs;
use std::path::Path;
use std::time::Duration;

use gantry_core::{
    DescriptionLoader, ErrorList, LoadError, LoadErrorCode, ModelDescription, SceneDocument,
    WorldDescription,
};

/// Stock [`DescriptionLoader`] for the line-based scene format.
#[derive(Clone, Copy, Debug, Default)]
pub struct SceneTextLoader;

impl SceneTextLoader {
    /// A new loader. Stateless; every call parses independently.
    pub fn new() -> Self {
        Self
    }
}

impl DescriptionLoader for SceneTextLoader {
    fn load_from_text(&self, text: &str) -> Result<SceneDocument, ErrorList> {
        parse(text)
    }

    fn load_from_path(&self, path: &Path) -> Result<SceneDocument, ErrorList> {
        match fs::read_to_string(path) {
            Ok(text) => parse(&text),
            Err(err) => Err(vec![LoadError::new(
                LoadErrorCode::Io,
                format!("failed to read [{}]: {err}", path.display()),
            )]),
        }
    }
}

/// What the parser is currently appending `link` directives to.
enum Cursor {
    Nothing,
    WorldModel(usize),
    Standalone,
}

fn parse(text: &str) -> Result<SceneDocument, ErrorList> {
    let mut errors = ErrorList::new();
    let mut world: Option<WorldDescription> = None;
    let mut standalone: Option<ModelDescription> = None;
    let mut cursor = Cursor::Nothing;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let (directive, rest) = match line.split_once(char::is_whitespace) {
            Some((d, r)) => (d, r.trim()),
            None => (line, ""),
        };
        match directive {
            "world" => {
                if rest.is_empty() {
                    errors.push(syntax(line_no, "world directive needs a name"));
                } else if world.is_some() {
                    errors.push(syntax(line_no, "document already has a world"));
                } else {
                    world = Some(WorldDescription::empty(rest));
                    cursor = Cursor::Nothing;
                }
            }
            "model" => {
                if rest.is_empty() {
                    errors.push(syntax(line_no, "model directive needs a name"));
                } else if let Some(w) = world.as_mut() {
                    w.add_model(ModelDescription::new(rest));
                    cursor = Cursor::WorldModel(w.models.len() - 1);
                } else if standalone.is_some() {
                    errors.push(syntax(line_no, "document already has a standalone model"));
                } else {
                    standalone = Some(ModelDescription::new(rest));
                    cursor = Cursor::Standalone;
                }
            }
            "link" => {
                if rest.is_empty() {
                    errors.push(syntax(line_no, "link directive needs a name"));
                    continue;
                }
                let target = match cursor {
                    Cursor::WorldModel(i) => world.as_mut().and_then(|w| w.models.get_mut(i)),
                    Cursor::Standalone => standalone.as_mut(),
                    Cursor::Nothing => None,
                };
                match target {
                    Some(model) => model.parts.push(rest.to_string()),
                    None => errors.push(syntax(line_no, "link outside of a model")),
                }
            }
            "update_period_ms" => match (world.as_mut(), rest.parse::<u64>()) {
                (Some(w), Ok(ms)) => w.update_period = Some(Duration::from_millis(ms)),
                (None, _) => errors.push(syntax(line_no, "update_period_ms outside of a world")),
                (_, Err(_)) => {
                    errors.push(syntax(line_no, "update_period_ms needs an integer"));
                }
            },
            other => {
                errors.push(syntax(line_no, format!("unknown directive [{other}]")));
            }
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(match (world, standalone) {
        (Some(w), _) => SceneDocument::from_world(w),
        (None, Some(m)) => SceneDocument::from_model(m),
        (None, None) => SceneDocument::default(),
    })
}

fn syntax(line: usize, message: impl std::fmt::Display) -> LoadError {
    LoadError::new(LoadErrorCode::Syntax, format!("line {line}: {message}"))
}
