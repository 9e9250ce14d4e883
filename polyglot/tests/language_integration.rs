//! Integration tests for the language catalogue.

use async_trait::async_trait;
use polyglot::db::{LanguageRepository, MemoryStore, StoreResult};
use polyglot::language::{
    Language, LanguageError, LanguageFilter, LanguageId, LanguageInput, LanguageManager,
};
use std::sync::Arc;
use uuid::Uuid;

fn setup_manager() -> LanguageManager {
    LanguageManager::new(Arc::new(MemoryStore::new()))
}

fn input(name: &str, code: &str) -> LanguageInput {
    LanguageInput {
        name: name.to_string(),
        code: code.to_string(),
    }
}

#[tokio::test]
async fn test_create_get_update_delete() {
    let manager = setup_manager();

    let created = manager.create(input("Breton", "bre")).await.unwrap();
    assert_eq!(created.code, "BRE");
    assert_eq!(manager.get(created.id).await.unwrap(), created);

    let updated = manager
        .update(created.id, input("Brezhoneg", "BRE"))
        .await
        .unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.name, "Brezhoneg");

    let deleted = manager.delete(created.id).await.unwrap();
    assert_eq!(deleted, updated);
    assert!(matches!(
        manager.get(created.id).await,
        Err(LanguageError::NotFound)
    ));
}

#[tokio::test]
async fn test_duplicate_code_conflicts() {
    let manager = setup_manager();
    manager.create(input("French", "FRA")).await.unwrap();
    let german = manager.create(input("German", "DEU")).await.unwrap();

    let err = manager.create(input("Français", "fra")).await.unwrap_err();
    let LanguageError::Conflict(errors) = err else {
        panic!("Should conflict, got {err:?}");
    };
    assert!(errors.contains("code", "code_already_exists"));

    let err = manager
        .update(german.id, input("German", "FRA"))
        .await
        .unwrap_err();
    assert!(matches!(err, LanguageError::Conflict(_)));
}

#[tokio::test]
async fn test_invalid_input_is_rejected() {
    let manager = setup_manager();

    let err = manager.create(input("", "1ABC9")).await.unwrap_err();
    let LanguageError::Validation(errors) = err else {
        panic!("Should fail validation, got {err:?}");
    };
    assert!(errors.contains("name", "required"));
    assert!(errors.contains("code", "invalid_value"));

    let listed = manager.list(LanguageFilter::default()).await.unwrap();
    assert!(listed.is_empty());
}

#[tokio::test]
async fn test_update_validates_before_lookup() {
    let manager = setup_manager();

    let err = manager
        .update(Uuid::new_v4(), input("", ""))
        .await
        .unwrap_err();
    assert!(matches!(err, LanguageError::Validation(_)));

    let err = manager
        .update(Uuid::new_v4(), input("Ghost", "GHO"))
        .await
        .unwrap_err();
    assert!(matches!(err, LanguageError::NotFound));
}

#[tokio::test]
async fn test_missing_language() {
    let manager = setup_manager();
    let missing = Uuid::new_v4();

    assert!(matches!(manager.get(missing).await, Err(LanguageError::NotFound)));
    assert!(matches!(
        manager.delete(missing).await,
        Err(LanguageError::NotFound)
    ));
}

#[tokio::test]
async fn test_list_filters_and_pages() {
    let manager = setup_manager();
    for (name, code) in [
        ("Spanish", "SPA"),
        ("Basque", "EUS"),
        ("Kabyle", "KAB"),
        ("Arabic", "ARA"),
    ] {
        manager.create(input(name, code)).await.unwrap();
    }

    let all = manager.list(LanguageFilter::default()).await.unwrap();
    let names: Vec<_> = all.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, ["Arabic", "Basque", "Kabyle", "Spanish"]);

    let page = manager
        .list(LanguageFilter {
            limit: Some(2),
            offset: Some(1),
            q: None,
        })
        .await
        .unwrap();
    let names: Vec<_> = page.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, ["Basque", "Kabyle"]);

    let searched = manager
        .list(LanguageFilter {
            q: Some("ab".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    let names: Vec<_> = searched.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, ["Arabic", "Kabyle"]);

    // Matching is case-sensitive.
    let none = manager
        .list(LanguageFilter {
            q: Some("AB".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(none.is_empty());

    // An empty search term is ignored.
    let empty_q = manager
        .list(LanguageFilter {
            q: Some(String::new()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(empty_q.len(), 4);
}

#[tokio::test]
async fn test_negative_paging_rejected() {
    let manager = setup_manager();

    let err = manager
        .list(LanguageFilter {
            limit: Some(-1),
            offset: Some(-5),
            q: None,
        })
        .await
        .unwrap_err();
    let LanguageError::Validation(errors) = err else {
        panic!("Should fail validation, got {err:?}");
    };
    assert!(errors.contains("limit", "invalid_value"));
    assert!(errors.contains("offset", "invalid_value"));
}

/// Store whose code lookup always misses, so duplicates surface only when
/// the store itself rejects the write.
struct StaleCodeLookup(MemoryStore);

#[async_trait]
impl LanguageRepository for StaleCodeLookup {
    async fn list_languages(&self, filter: &LanguageFilter) -> StoreResult<Vec<Language>> {
        self.0.list_languages(filter).await
    }

    async fn find_language(&self, id: LanguageId) -> StoreResult<Option<Language>> {
        self.0.find_language(id).await
    }

    async fn find_language_by_code(&self, _code: &str) -> StoreResult<Option<Language>> {
        Ok(None)
    }

    async fn create_language(&self, input: &LanguageInput) -> StoreResult<Language> {
        self.0.create_language(input).await
    }

    async fn update_language(
        &self,
        id: LanguageId,
        input: &LanguageInput,
    ) -> StoreResult<Option<Language>> {
        self.0.update_language(id, input).await
    }

    async fn delete_language(&self, id: LanguageId) -> StoreResult<Option<Language>> {
        self.0.delete_language(id).await
    }
}

#[tokio::test]
async fn test_store_rejected_duplicate_code_is_a_conflict() {
    let manager = LanguageManager::new(Arc::new(StaleCodeLookup(MemoryStore::new())));

    manager.create(input("French", "FRA")).await.unwrap();
    let german = manager.create(input("German", "DEU")).await.unwrap();

    let Err(LanguageError::Conflict(errors)) = manager.create(input("Other", "fra")).await else {
        panic!("duplicate code on create should conflict");
    };
    assert!(errors.contains("code", "code_already_exists"));

    let Err(LanguageError::Conflict(errors)) =
        manager.update(german.id, input("German", "FRA")).await
    else {
        panic!("duplicate code on update should conflict");
    };
    assert!(errors.contains("code", "code_already_exists"));
    assert_eq!(manager.get(german.id).await.unwrap(), german);
}
