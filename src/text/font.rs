use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Family used when the configured one is not installed
pub const FALLBACK_FAMILY: &str = "Arial";

#[derive(Error, Debug)]
pub enum FontError {
    #[error("No usable fonts are installed")]
    NoFonts,
    #[error("Could not read font data for '{0}'")]
    Unreadable(String),
    #[error("Could not parse font face '{0}'")]
    Parse(String),
}

/// A font face picked for rendering, with its data owned so it can be
/// re-parsed for shaping and drawing
#[derive(Debug)]
pub struct ResolvedFont {
    pub family: String,
    /// Whether the configured family was found as installed
    pub exact: bool,
    data: Vec<u8>,
    index: u32,
}

impl ResolvedFont {
    pub fn face(&self) -> Result<rustybuzz::Face<'_>, FontError> {
        rustybuzz::Face::from_slice(&self.data, self.index)
            .ok_or_else(|| FontError::Parse(self.family.clone()))
    }
}

pub struct FontBook {
    db: Database,
}

impl FontBook {
    /// Load all fonts installed on the system
    pub fn system() -> Self {
        let mut db = Database::new();
        db.load_system_fonts();
        debug!("Loaded {} font faces", db.len());
        Self { db }
    }

    #[cfg(test)]
    pub fn from_database(db: Database) -> Self {
        Self { db }
    }

    /// Book holding only the bundled public-domain Tuffy face
    #[cfg(test)]
    pub fn with_test_font() -> Self {
        let mut db = Database::new();
        db.load_font_data(include_bytes!("../../tests/fonts/Tuffy.ttf").to_vec());
        Self::from_database(db)
    }

    /// Installed family matching `name` case-insensitively, in its
    /// installed spelling
    pub fn find_family(&self, name: &str) -> Option<String> {
        self.db
            .faces()
            .flat_map(|face| face.families.iter())
            .map(|(family, _)| family)
            .find(|family| family.eq_ignore_ascii_case(name.trim()))
            .cloned()
    }

    pub fn resolve(&self, requested: &str) -> Result<ResolvedFont, FontError> {
        let found = self.find_family(requested);
        match &found {
            Some(family) => info!("Font found: {}", family),
            None => warn!("Font '{}' not found, using {}", requested, FALLBACK_FAMILY),
        }

        let mut families = Vec::with_capacity(3);
        if let Some(family) = &found {
            families.push(Family::Name(family.as_str()));
        }
        families.push(Family::Name(FALLBACK_FAMILY));
        families.push(Family::SansSerif);

        let query = Query {
            families: &families,
            weight: Weight::NORMAL,
            stretch: Stretch::Normal,
            style: Style::Normal,
        };

        let id = self
            .db
            .query(&query)
            .or_else(|| self.db.faces().next().map(|face| face.id))
            .ok_or(FontError::NoFonts)?;

        let family = self
            .db
            .face(id)
            .and_then(|face| face.families.first())
            .map(|(family, _)| family.clone())
            .unwrap_or_else(|| requested.to_string());

        if let Some(wanted) = &found
            && *wanted != family
        {
            warn!("Font does not match exactly: requested {}, using {}", wanted, family);
        }

        let (data, index) = self
            .db
            .with_face_data(id, |data, index| (data.to_vec(), index))
            .ok_or_else(|| FontError::Unreadable(family.clone()))?;

        Ok(ResolvedFont {
            exact: found.is_some(),
            family,
            data,
            index,
        })
    }
}
