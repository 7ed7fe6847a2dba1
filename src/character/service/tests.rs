use super::*;
use crate::character::card::CharacterOrigin;
use crate::character::repository::MemoryCharacterRepository;

fn session(user_id: UserId) -> Session {
    Session {
        user_id,
        username: format!("user{user_id}"),
    }
}

fn draft(name: &str) -> CharacterDraft {
    CharacterDraft {
        name: name.into(),
        description: "A stargazer.".into(),
        personality: "Curious".into(),
        image_url: String::new(),
    }
}

fn directory() -> (CharacterDirectory, Arc<MemoryCharacterRepository>) {
    let repository = Arc::new(MemoryCharacterRepository::new());
    let shared: Arc<dyn CharacterRepository> = repository.clone();
    (CharacterDirectory::new(Some(shared)), repository)
}

#[tokio::test]
async fn builtins_resolve_without_session_or_backend() {
    let directory = CharacterDirectory::new(None);
    assert_eq!(directory.builtin().len(), 6);

    let harper = directory.resolve(None, "historian").await.unwrap();
    assert_eq!(harper.name, "Harper");
    assert_eq!(harper.origin, CharacterOrigin::Builtin);
}

#[tokio::test]
async fn create_requires_session_and_valid_draft() {
    let (mut directory, _) = directory();

    let err = directory.create(None, &draft("Nova")).await.unwrap_err();
    assert!(matches!(err, CharacterError::AuthRequired));

    let err = directory
        .create(Some(&session(1)), &draft("  "))
        .await
        .unwrap_err();
    assert!(matches!(err, CharacterError::Validation(_)));
    assert!(directory.user_characters().is_empty());
}

#[tokio::test]
async fn create_without_backend_is_unavailable() {
    let mut directory = CharacterDirectory::new(None);
    let err = directory
        .create(Some(&session(1)), &draft("Nova"))
        .await
        .unwrap_err();
    assert!(matches!(err, CharacterError::Unavailable));
}

#[tokio::test]
async fn created_characters_are_cached_and_resolvable() {
    let (mut directory, _) = directory();
    let owner = session(1);

    let nova = directory.create(Some(&owner), &draft("Nova")).await.unwrap();

    assert_eq!(nova.origin, CharacterOrigin::UserOwned(1));
    assert_eq!(directory.user_characters(), &[nova.clone()]);
    assert_eq!(directory.resolve(Some(&owner), &nova.id).await.unwrap(), nova);
}

#[tokio::test]
async fn refresh_follows_session() {
    let (mut directory, repository) = directory();
    repository.create(1, &draft("Nova")).await.unwrap();
    repository.create(2, &draft("Orion")).await.unwrap();

    directory.refresh(Some(&session(1))).await.unwrap();
    let names: Vec<&str> = directory
        .user_characters()
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(names, vec!["Nova"]);

    directory.refresh(None).await.unwrap();
    assert!(directory.user_characters().is_empty());
}

#[tokio::test]
async fn resolve_falls_back_to_repository_for_uuid_ids() {
    let (directory, repository) = directory();
    let stored = repository.create(1, &draft("Nova")).await.unwrap();

    let found = directory.resolve(Some(&session(1)), &stored.id).await.unwrap();
    assert_eq!(found.name, "Nova");

    let err = directory.resolve(None, &stored.id).await.unwrap_err();
    assert!(matches!(err, CharacterError::NotFound(_)));
    let err = directory
        .resolve(Some(&session(1)), "not-a-uuid")
        .await
        .unwrap_err();
    assert!(matches!(err, CharacterError::NotFound(_)));
}

#[tokio::test]
async fn update_rewrites_cached_entry() {
    let (mut directory, _) = directory();
    let owner = session(1);
    let nova = directory.create(Some(&owner), &draft("Nova")).await.unwrap();

    let mut edited = CharacterDraft::from_character(&nova);
    edited.personality = "Patient".into();
    let updated = directory
        .update(Some(&owner), &nova.id, &edited)
        .await
        .unwrap();

    assert_eq!(updated.personality, "Patient");
    assert_eq!(directory.user_characters()[0].personality, "Patient");
}

#[tokio::test]
async fn builtins_cannot_be_edited_or_deleted() {
    let (mut directory, _) = directory();
    let owner = session(1);

    let err = directory
        .update(Some(&owner), "coach", &draft("Alex"))
        .await
        .unwrap_err();
    assert!(matches!(err, CharacterError::ReadOnly(_)));
    let err = directory.delete(Some(&owner), "coach").await.unwrap_err();
    assert!(matches!(err, CharacterError::ReadOnly(_)));
}

#[tokio::test]
async fn update_of_foreign_character_is_not_found() {
    let (mut directory, repository) = directory();
    let theirs = repository.create(2, &draft("Orion")).await.unwrap();

    let err = directory
        .update(Some(&session(1)), &theirs.id, &draft("Mine"))
        .await
        .unwrap_err();
    assert!(matches!(err, CharacterError::NotFound(_)));
}

#[tokio::test]
async fn delete_removes_from_cache_and_repository() {
    let (mut directory, repository) = directory();
    let owner = session(1);
    let nova = directory.create(Some(&owner), &draft("Nova")).await.unwrap();

    directory.delete(Some(&owner), &nova.id).await.unwrap();

    assert!(directory.user_characters().is_empty());
    assert!(repository.list(1).await.unwrap().is_empty());
    assert!(directory.resolve(Some(&owner), &nova.id).await.is_err());
}
