pub mod builtin;
pub mod card;
pub mod repository;
pub mod service;

pub use card::{Character, CharacterDraft, CharacterError, CharacterOrigin};
pub use repository::{CharacterRepository, MemoryCharacterRepository, SupabaseCharacterRepository};
pub use service::CharacterDirectory;
