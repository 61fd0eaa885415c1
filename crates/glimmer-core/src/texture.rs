//! Texture system stub
//!
//! Texture lookup is out of scope for this library. The type exists so the
//! shading-system constructor has the slot the host contract describes; a
//! future texture implementation plugs in here without changing the
//! constructor signature.

/// Placeholder texture system. Holds only its search path.
pub struct TextureSystem {
    searchpath: String,
}

impl TextureSystem {
    pub fn new() -> TextureSystem {
        TextureSystem {
            searchpath: String::new(),
        }
    }

    pub fn searchpath(&self) -> &str {
        &self.searchpath
    }

    pub fn set_searchpath(&mut self, path: &str) {
        self.searchpath = path.to_string();
    }
}

impl Default for TextureSystem {
    fn default() -> Self {
        TextureSystem::new()
    }
}
