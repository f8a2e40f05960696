//! OSD configuration file
//!
//! Settings live in the `[OSD]` section of an INI file. Missing, blank or
//! invalid values fall back to their defaults and the file is rewritten from
//! the commented template so the next run reads it unchanged. Other sections
//! and unknown keys are carried over below the template.

mod align;
mod color;

use configparser::ini::{Ini, IniDefault};
use directories::ProjectDirs;
use std::collections::HashMap;
use std::fmt::Display;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

pub use align::{HAlign, VAlign};
pub use color::Rgba;

pub const SECTION: &str = "OSD";
const KEYS: [&str; 8] = [
    "font",
    "font_color",
    "background_color",
    "size",
    "align",
    "v_align",
    "v_padding",
    "h_padding",
];
const FILE_NAME: &str = "config.ini";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not determine the user config directory")]
    NoConfigDir,
    #[error("Config I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ConfigError {
    fn io(path: &Path, source: io::Error) -> Self {
        ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OsdConfig {
    pub font: String,
    pub font_color: Rgba,
    pub background_color: Rgba,
    /// Font size in pixels
    pub size: u32,
    pub align: HAlign,
    pub v_align: VAlign,
    pub v_padding: i32,
    pub h_padding: i32,
}

impl Default for OsdConfig {
    fn default() -> Self {
        Self {
            font: "Arial".to_string(),
            font_color: Rgba::WHITE,
            background_color: Rgba::TRANSLUCENT_BLACK,
            size: 24,
            align: HAlign::Center,
            v_align: VAlign::Center,
            v_padding: 10,
            h_padding: 50,
        }
    }
}

/// What loading had to do to the file on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// File was complete and valid, left untouched
    Loaded,
    /// Some values were replaced by defaults and the file rewritten
    Repaired,
    /// File or its `[OSD]` section was missing and has been generated
    Created,
}

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: OsdConfig,
    pub outcome: LoadOutcome,
}

/// `$XDG_CONFIG_HOME/osd/config.ini`
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    ProjectDirs::from("", "", "osd")
        .map(|dirs| dirs.config_dir().join(FILE_NAME))
        .ok_or(ConfigError::NoConfigDir)
}

fn new_ini() -> Ini {
    let mut defaults = IniDefault::default();
    defaults.delimiters = vec!['='];
    // '#' would cut hex colours short
    defaults.comment_symbols = vec![';'];
    Ini::new_from_defaults(defaults)
}

fn parse_section(contents: String, path: &Path) -> Option<Ini> {
    let mut ini = new_ini();
    if let Err(e) = ini.read(contents) {
        warn!("Could not parse {}: {}", path.display(), e);
        return None;
    }

    let has_section = ini
        .sections()
        .iter()
        .any(|section| section.eq_ignore_ascii_case(SECTION));
    has_section.then_some(ini)
}

/// Collects effective values while reading keys, remembering the text to
/// write back for each one.
struct Resolver<'a> {
    ini: Option<&'a Ini>,
    written: HashMap<&'static str, String>,
    repaired: bool,
}

impl<'a> Resolver<'a> {
    fn new(ini: Option<&'a Ini>) -> Self {
        Self {
            ini,
            written: HashMap::new(),
            repaired: false,
        }
    }

    fn field<T, F>(&mut self, key: &'static str, default: T, parse: F) -> T
    where
        T: Display,
        F: FnOnce(&str) -> Option<T>,
    {
        let raw = self
            .ini
            .and_then(|ini| ini.get(SECTION, key))
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        match raw {
            Some(raw) => match parse(&raw) {
                Some(value) => {
                    self.written.insert(key, raw);
                    value
                }
                None => {
                    warn!("Invalid value '{}' for '{}', using default '{}'", raw, key, default);
                    self.use_default(key, default)
                }
            },
            None => {
                if self.ini.is_some() {
                    warn!("Missing value for '{}', using default '{}'", key, default);
                }
                self.use_default(key, default)
            }
        }
    }

    fn use_default<T: Display>(&mut self, key: &'static str, default: T) -> T {
        self.written.insert(key, default.to_string());
        self.repaired = true;
        default
    }

    fn value(&self, key: &str) -> &str {
        self.written.get(key).map(String::as_str).unwrap_or_default()
    }
}

fn resolve(resolver: &mut Resolver<'_>) -> OsdConfig {
    let defaults = OsdConfig::default();
    OsdConfig {
        font: resolver.field("font", defaults.font, |v| Some(v.to_string())),
        font_color: resolver.field("font_color", defaults.font_color, |v| v.parse().ok()),
        background_color: resolver.field("background_color", defaults.background_color, |v| {
            v.parse().ok()
        }),
        size: resolver.field("size", defaults.size, |v| {
            v.parse::<u32>().ok().filter(|size| *size > 0)
        }),
        align: resolver.field("align", defaults.align, |v| v.parse().ok()),
        v_align: resolver.field("v_align", defaults.v_align, |v| v.parse().ok()),
        v_padding: resolver.field("v_padding", defaults.v_padding, |v| v.parse().ok()),
        h_padding: resolver.field("h_padding", defaults.h_padding, |v| v.parse().ok()),
    }
}

fn render_entries(out: &mut String, entries: &HashMap<String, Option<String>>, skip: &[&str]) {
    let mut keys: Vec<_> = entries
        .keys()
        .filter(|key| !skip.contains(&key.as_str()))
        .collect();
    keys.sort();
    for key in keys {
        match &entries[key] {
            Some(value) => out.push_str(&format!("{key} = {value}\n")),
            None => out.push_str(&format!("{key}\n")),
        }
    }
}

/// Unknown `[OSD]` keys and every other section, so a repair keeps them
fn render_extras(ini: &Ini) -> (String, String) {
    let map = ini.get_map_ref();
    let mut osd_extra = String::new();
    let mut sections = String::new();

    let mut names: Vec<_> = map.keys().collect();
    names.sort();
    for name in names {
        let entries = &map[name];
        if name.eq_ignore_ascii_case(SECTION) {
            render_entries(&mut osd_extra, entries, &KEYS);
        } else {
            sections.push_str(&format!("\n[{name}]\n"));
            render_entries(&mut sections, entries, &[]);
        }
    }

    if !osd_extra.is_empty() {
        osd_extra.insert(0, '\n');
    }
    (osd_extra, sections)
}

fn render_template(resolver: &Resolver<'_>) -> String {
    let (osd_extra, sections) = resolver.ini.map(render_extras).unwrap_or_default();
    let v = |key| resolver.value(key);
    format!(
        "[{SECTION}]
; Font settings
; font: font family name (e.g. Arial, Times New Roman, Alone in the Dark)
font = {font}

; Colours in rgba(red, green, blue, alpha) format, 0-255 per channel
; font_color: text colour
font_color = {font_color}
; background_color: background colour
background_color = {background_color}

; Font size in pixels
size = {size}

; Horizontal alignment
; align: left, center, right
align = {align}

; Vertical alignment
; v_align: top, center, bottom
v_align = {v_align}

; Margins in pixels
; v_padding: vertical margin
v_padding = {v_padding}
; h_padding: horizontal margin
h_padding = {h_padding}
{osd_extra}{sections}",
        font = v("font"),
        font_color = v("font_color"),
        background_color = v("background_color"),
        size = v("size"),
        align = v("align"),
        v_align = v("v_align"),
        v_padding = v("v_padding"),
        h_padding = v("h_padding"),
    )
}

fn write_config(path: &Path, contents: &str) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| ConfigError::io(parent, e))?;
    }
    fs::write(path, contents).map_err(|e| ConfigError::io(path, e))
}

/// Load the config at `path`, creating or repairing the file as needed
pub fn load_or_repair(path: &Path) -> Result<LoadedConfig, ConfigError> {
    let contents = match fs::read(path) {
        Ok(bytes) => String::from_utf8(bytes)
            .inspect_err(|_| warn!("{} is not valid UTF-8", path.display()))
            .ok(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => None,
        Err(e) => return Err(ConfigError::io(path, e)),
    };

    let ini = contents.and_then(|contents| parse_section(contents, path));
    let mut resolver = Resolver::new(ini.as_ref());
    let config = resolve(&mut resolver);

    let outcome = if ini.is_none() {
        LoadOutcome::Created
    } else if resolver.repaired {
        LoadOutcome::Repaired
    } else {
        LoadOutcome::Loaded
    };

    match outcome {
        LoadOutcome::Created => {
            write_config(path, &render_template(&resolver))?;
            info!("Created {} with default values", path.display());
        }
        LoadOutcome::Repaired => {
            write_config(path, &render_template(&resolver))?;
            info!("Repaired {}", path.display());
        }
        LoadOutcome::Loaded => debug!("Loaded {}", path.display()),
    }

    Ok(LoadedConfig { config, outcome })
}
