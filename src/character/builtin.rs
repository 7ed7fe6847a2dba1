use serde::Deserialize;

use crate::character::card::{Character, CharacterOrigin};

#[derive(Debug, Deserialize)]
struct BuiltinCharacter {
    id: String,
    name: String,
    description: String,
    personality: String,
    image_url: String,
}

#[derive(Debug, Deserialize)]
struct BuiltinCharacterConfig {
    characters: Vec<BuiltinCharacter>,
}

pub fn load_builtin_characters() -> Vec<Character> {
    const CONFIG_CONTENT: &str = include_str!("../builtins/characters.toml");
    let config: BuiltinCharacterConfig =
        toml::from_str(CONFIG_CONTENT).expect("Failed to parse builtins/characters.toml");
    config
        .characters
        .into_iter()
        .map(|entry| Character {
            id: entry.id,
            name: entry.name,
            description: entry.description,
            personality: entry.personality,
            image_url: entry.image_url,
            origin: CharacterOrigin::Builtin,
        })
        .collect()
}
