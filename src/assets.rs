use crate::sprite::SpriteSheet;
use std::collections::HashMap;
use std::rc::Rc;

/// Loaded sprite sheets by name. Built once at startup and handed to the
/// widget factory.
#[derive(Debug, Default)]
pub struct AssetRegistry {
    sheets: HashMap<String, Rc<SpriteSheet>>,
}

impl AssetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, sheet: SpriteSheet) -> Rc<SpriteSheet> {
        let sheet = Rc::new(sheet);
        self.sheets.insert(name.into(), sheet.clone());
        sheet
    }

    pub fn sheet(&self, name: &str) -> Option<Rc<SpriteSheet>> {
        self.sheets.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// True when every name is registered. Each missing one is logged unless
    /// `silent`.
    pub fn check_exists(&self, names: &[&str], silent: bool) -> bool {
        let mut found = true;
        for name in names {
            if !self.sheets.contains_key(*name) {
                if !silent {
                    log::warn!("{} is undefined.", name);
                }
                found = false;
            }
        }
        found
    }
}
