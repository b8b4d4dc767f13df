//! Factory configuration: the color map and `content_is_colorless` flag.

use std::collections::HashMap;

use crate::canvas::CanvasColor;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorRole {
    Call,
    Content,
    Floating,
}

#[derive(Clone, Debug)]
pub struct ColorMap {
    roles: HashMap<CanvasColor, ColorRole>,
}

impl ColorMap {
    /// The engine's default palette. Color `"2"` is reserved by the content
    /// heuristics to mean "http node" and is deliberately left out of the
    /// role map so it stays `Content` here and is refined later.
    pub fn default_map() -> Self {
        let mut roles = HashMap::new();
        roles.insert(CanvasColor::Indexed(1), ColorRole::Call);
        roles.insert(CanvasColor::Indexed(4), ColorRole::Floating);
        Self { roles }
    }

    pub fn with_role(mut self, color: CanvasColor, role: ColorRole) -> Self {
        self.roles.insert(color, role);
        self
    }

    pub fn role_for(&self, color: Option<&CanvasColor>, content_is_colorless: bool) -> ColorRole {
        match color {
            Some(c) => self.roles.get(c).copied().unwrap_or(ColorRole::Content),
            None => {
                if content_is_colorless {
                    ColorRole::Call
                } else {
                    ColorRole::Content
                }
            }
        }
    }
}

impl Default for ColorMap {
    fn default() -> Self {
        Self::default_map()
    }
}

/// Compile-time configuration for the factory.
#[derive(Clone, Debug, Default)]
pub struct FactoryConfig {
    pub content_is_colorless: bool,
    pub color_map: ColorMap,
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: color "1" maps to Call by default; an uncolored node defaults to Content.
    #[test]
    fn default_map_assigns_call_and_content() {
        let map = ColorMap::default_map();
        assert_eq!(map.role_for(Some(&CanvasColor::Indexed(1)), false), ColorRole::Call);
        assert_eq!(map.role_for(None, false), ColorRole::Content);
    }

    /// **Scenario**: contentIsColorless flips the uncolored default to Call.
    #[test]
    fn content_is_colorless_flips_uncolored_default() {
        let map = ColorMap::default_map();
        assert_eq!(map.role_for(None, true), ColorRole::Call);
    }
}
