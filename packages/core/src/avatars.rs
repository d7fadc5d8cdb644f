//! Avatar Catalog
//!
//! Fixed list of avatars the learner can own. Not persisted; only the ids
//! end up in the document.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Avatar {
    pub id: &'static str,
    pub icon: &'static str,
    pub name: &'static str,
    pub price: u32,
}

/// Avatar equipped in a new document
pub const DEFAULT_AVATAR: &str = "student";

/// Avatars every learner owns
pub const DEFAULT_AVATARS: [&str; 2] = ["student", "girl"];

pub static AVATARS: &[Avatar] = &[
    Avatar { id: "student", icon: "👦", name: "Student", price: 0 },
    Avatar { id: "girl", icon: "👧", name: "Girl", price: 0 },
    Avatar { id: "lion", icon: "🦁", name: "Lion King", price: 50 },
    Avatar { id: "astro", icon: "👩‍🚀", name: "Explorer", price: 100 },
    Avatar { id: "dino", icon: "🦖", name: "Rex", price: 150 },
    Avatar { id: "unicorn", icon: "🦄", name: "Sparkle", price: 200 },
    Avatar { id: "robot", icon: "🤖", name: "Bot", price: 250 },
];

pub fn find_avatar(avatar_id: &str) -> Option<&'static Avatar> {
    AVATARS.iter().find(|a| a.id == avatar_id)
}

/// Glyph for the header badge; unknown ids show the default face.
pub fn avatar_icon(avatar_id: &str) -> &'static str {
    find_avatar(avatar_id).map(|a| a.icon).unwrap_or("👦")
}
