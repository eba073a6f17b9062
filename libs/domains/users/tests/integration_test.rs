//! Integration tests for PgUserRepository against a real PostgreSQL container

use domain_users::*;
use test_utils::{TestDataBuilder, TestDatabase, assertions::*};

// ============================================================================
// Create / read
// ============================================================================

#[tokio::test]
async fn test_create_and_get_user() {
    let db = TestDatabase::new().await;
    let repo = PgUserRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("create_and_get_user");

    let created = repo
        .create(CreateUser {
            name: builder.name("user", "ann"),
            email: builder.email("ann"),
        })
        .await
        .unwrap();

    let fetched = assert_some(repo.get_by_id(created.id).await.unwrap(), "get_by_id");
    assert_eq!(fetched, created);
    assert!(repo.exists(created.id).await.unwrap());
    assert!(!repo.exists(created.id + 1000).await.unwrap());
}

#[tokio::test]
async fn test_duplicate_email_is_conflict() {
    let db = TestDatabase::new().await;
    let repo = PgUserRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("duplicate_email");

    let first = repo
        .create(CreateUser {
            name: "Ann".to_string(),
            email: builder.email("shared"),
        })
        .await
        .unwrap();

    let result = repo
        .create(CreateUser {
            name: "Bob".to_string(),
            email: builder.email("shared"),
        })
        .await;

    assert!(matches!(result, Err(UserError::EmailConflict(_))));
    assert_eq!(repo.get_by_id(first.id).await.unwrap(), Some(first));
}

#[tokio::test]
async fn test_list_is_ascending_by_id() {
    let db = TestDatabase::new().await;
    let repo = PgUserRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("list_ascending");

    let mut expected = Vec::new();
    for who in ["a", "b", "c"] {
        let user = repo
            .create(CreateUser {
                name: who.to_string(),
                email: builder.email(who),
            })
            .await
            .unwrap();
        expected.push(user.id);
    }

    let ids: Vec<i64> = repo.list().await.unwrap().iter().map(|u| u.id).collect();
    assert_ids_eq(&ids, &expected, "list");
}

// ============================================================================
// Update / delete
// ============================================================================

#[tokio::test]
async fn test_update_patch_semantics() {
    let db = TestDatabase::new().await;
    let repo = PgUserRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("update_patch");

    let ann = repo
        .create(CreateUser {
            name: "Ann".to_string(),
            email: builder.email("ann"),
        })
        .await
        .unwrap();

    let renamed = assert_some(
        repo.update(
            ann.id,
            UpdateUser {
                name: Some("Anna".to_string()),
                email: Some(builder.email("ann")),
            },
        )
        .await
        .unwrap(),
        "update",
    );
    assert_eq!(renamed.name, "Anna");
    assert_eq!(renamed.email, ann.email);

    assert!(repo.update(ann.id + 1000, UpdateUser::default()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_update_to_taken_email_is_conflict() {
    let db = TestDatabase::new().await;
    let repo = PgUserRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("update_conflict");

    let ann = repo
        .create(CreateUser {
            name: "Ann".to_string(),
            email: builder.email("ann"),
        })
        .await
        .unwrap();
    let bob = repo
        .create(CreateUser {
            name: "Bob".to_string(),
            email: builder.email("bob"),
        })
        .await
        .unwrap();

    let result = repo
        .update(
            ann.id,
            UpdateUser {
                name: None,
                email: Some(bob.email.clone()),
            },
        )
        .await;

    assert!(matches!(result, Err(UserError::EmailConflict(_))));
    assert_eq!(repo.get_by_id(ann.id).await.unwrap(), Some(ann));
}

#[tokio::test]
async fn test_delete_user() {
    let db = TestDatabase::new().await;
    let repo = PgUserRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("delete_user");

    let ann = repo
        .create(CreateUser {
            name: "Ann".to_string(),
            email: builder.email("ann"),
        })
        .await
        .unwrap();

    assert!(repo.delete(ann.id).await.unwrap());
    assert!(repo.get_by_id(ann.id).await.unwrap().is_none());
    assert!(!repo.delete(ann.id).await.unwrap());
}
