//! Syllabus Catalog
//!
//! Cambridge YLE levels, their units and the target vocabulary of each unit.
//! Unit ids are stable across releases; the set of ids here is the ceiling
//! for every unlock operation.

use serde::Serialize;

use crate::types::Level;

/// One themed bundle of target words
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyllabusUnit {
    pub id: &'static str,
    pub level: Level,
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub color_tag: &'static str,
    pub words: &'static [&'static str],
}

impl SyllabusUnit {
    pub fn word_list(&self) -> Vec<String> {
        self.words.iter().map(|w| w.to_string()).collect()
    }
}

pub static FULL_SYLLABUS: &[SyllabusUnit] = &[
    // ==================== Starters (Pre-A1) ====================
    SyllabusUnit {
        id: "starters-1",
        level: Level::Starters,
        title: "Friendly Animals",
        description: "Pets and Farm Animals",
        icon: "🐶",
        color_tag: "orange",
        words: &["cat", "dog", "duck", "bird", "horse", "sheep", "cow", "mouse"],
    },
    SyllabusUnit {
        id: "starters-2",
        level: Level::Starters,
        title: "Yummy Fruit",
        description: "Healthy Snacks",
        icon: "🍎",
        color_tag: "red",
        words: &["apple", "banana", "pear", "orange", "lemon", "grape", "lime", "mango"],
    },
    SyllabusUnit {
        id: "starters-3",
        level: Level::Starters,
        title: "My Family",
        description: "People I Love",
        icon: "👨‍👩‍👧",
        color_tag: "blue",
        words: &["mother", "father", "sister", "brother", "baby", "grandma", "grandpa", "cousin"],
    },
    SyllabusUnit {
        id: "starters-4",
        level: Level::Starters,
        title: "My Body",
        description: "Head, Shoulders, Knees",
        icon: "👀",
        color_tag: "pink",
        words: &["eye", "nose", "mouth", "ear", "hand", "foot", "leg", "arm", "head"],
    },
    SyllabusUnit {
        id: "starters-5",
        level: Level::Starters,
        title: "At School",
        description: "Classroom Objects",
        icon: "🎒",
        color_tag: "yellow",
        words: &["pen", "pencil", "book", "bag", "rubber", "desk", "ruler", "teacher"],
    },
    SyllabusUnit {
        id: "starters-6",
        level: Level::Starters,
        title: "Colors",
        description: "Rainbow World",
        icon: "🎨",
        color_tag: "purple",
        words: &["red", "blue", "green", "yellow", "purple", "black", "white", "brown"],
    },
    // ==================== Movers (A1) ====================
    SyllabusUnit {
        id: "movers-1",
        level: Level::Movers,
        title: "In The Town",
        description: "Places we go",
        icon: "🏙️",
        color_tag: "indigo",
        words: &["library", "hospital", "market", "cinema", "park", "supermarket", "station", "cafe"],
    },
    SyllabusUnit {
        id: "movers-2",
        level: Level::Movers,
        title: "Weather",
        description: "Hot and Cold",
        icon: "⛅",
        color_tag: "sky",
        words: &["sunny", "cloudy", "windy", "raining", "snowing", "storm", "foggy", "temperature"],
    },
    SyllabusUnit {
        id: "movers-3",
        level: Level::Movers,
        title: "My Home",
        description: "Rooms and Furniture",
        icon: "🏠",
        color_tag: "teal",
        words: &["balcony", "basement", "stairs", "shower", "blanket", "roof", "lamp", "towel"],
    },
    SyllabusUnit {
        id: "movers-4",
        level: Level::Movers,
        title: "Health",
        description: "Feeling Good",
        icon: "🩺",
        color_tag: "green",
        words: &["headache", "toothache", "cold", "cough", "doctor", "nurse", "medicine", "stomach"],
    },
    // ==================== Flyers (A2) ====================
    SyllabusUnit {
        id: "flyers-1",
        level: Level::Flyers,
        title: "Jobs",
        description: "When I grow up",
        icon: "👷",
        color_tag: "slate",
        words: &["journalist", "mechanic", "engineer", "pilot", "actor", "artist", "photographer", "waiter"],
    },
    SyllabusUnit {
        id: "flyers-2",
        level: Level::Flyers,
        title: "World & Space",
        description: "Our Planet",
        icon: "🌍",
        color_tag: "blue",
        words: &["environment", "planet", "space", "rocket", "desert", "ocean", "cave", "volcano"],
    },
    SyllabusUnit {
        id: "flyers-3",
        level: Level::Flyers,
        title: "Materials",
        description: "What is it made of?",
        icon: "🧶",
        color_tag: "stone",
        words: &["metal", "plastic", "glass", "gold", "silver", "wood", "wool", "cardboard"],
    },
];

pub fn all_units() -> &'static [SyllabusUnit] {
    FULL_SYLLABUS
}

pub fn find_unit(unit_id: &str) -> Option<&'static SyllabusUnit> {
    FULL_SYLLABUS.iter().find(|u| u.id == unit_id)
}

pub fn is_known_unit(unit_id: &str) -> bool {
    find_unit(unit_id).is_some()
}

/// Units of one level in catalog order
pub fn units_for_level(level: Level) -> impl Iterator<Item = &'static SyllabusUnit> {
    FULL_SYLLABUS.iter().filter(move |u| u.level == level)
}

pub fn unit_ids() -> impl Iterator<Item = &'static str> {
    FULL_SYLLABUS.iter().map(|u| u.id)
}

pub fn first_unit(level: Level) -> Option<&'static SyllabusUnit> {
    units_for_level(level).next()
}

/// The unit after `unit_id` within the same level, if any
pub fn next_unit(unit_id: &str) -> Option<&'static SyllabusUnit> {
    let current = find_unit(unit_id)?;
    units_for_level(current.level)
        .skip_while(|u| u.id != unit_id)
        .nth(1)
}
