// src/services/user.rs - Business logic
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info};

use crate::errors::RepositoryError;
use crate::models::{NewUser, User};
use crate::repositories::UserRepositoryTrait;

type Result<T> = std::result::Result<T, RepositoryError>;

#[async_trait]
pub trait UserServiceTrait: Send + Sync {
    /// Fails with `RepositoryError::Conflict` when the email is taken
    async fn create(&self, user: NewUser) -> Result<User>;
    async fn get_by_id(&self, id: i32) -> Result<Option<User>>;
    async fn get_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn list_all(&self) -> Result<Vec<User>>;
    /// `true` if a row was removed, `false` if none matched
    async fn delete_by_id(&self, id: i32) -> Result<bool>;
}

pub struct UserService<T: UserRepositoryTrait> {
    repository: Arc<T>,
}

impl<T: UserRepositoryTrait> UserService<T> {
    pub fn new(repository: Arc<T>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl<T: UserRepositoryTrait> UserServiceTrait for UserService<T> {
    async fn create(&self, user: NewUser) -> Result<User> {
        let created = self.repository.insert(&user).await?;
        info!("Created user {}", created.id);
        Ok(created)
    }

    async fn get_by_id(&self, id: i32) -> Result<Option<User>> {
        self.repository.find_by_id(id).await
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        self.repository.find_by_email(email).await
    }

    async fn list_all(&self) -> Result<Vec<User>> {
        let users = self.repository.find_all().await?;
        debug!("Listed {} users", users.len());
        Ok(users)
    }

    async fn delete_by_id(&self, id: i32) -> Result<bool> {
        let deleted = self.repository.delete_by_id(id).await?;
        if deleted {
            info!("Deleted user {}", id);
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use fake::faker::internet::en::SafeEmail;
    use fake::faker::name::en::Name;
    use fake::Fake;
    use mockall::predicate::eq;
    use mockall::Sequence;

    use super::*;
    use crate::repositories::MockUserRepositoryTrait;

    fn stored(id: i32, user: &NewUser) -> User {
        User {
            id,
            name: user.name.clone(),
            email: user.email.clone(),
            created_at: Utc::now(),
        }
    }

    fn service(repo: MockUserRepositoryTrait) -> UserService<MockUserRepositoryTrait> {
        UserService::new(Arc::new(repo))
    }

    #[tokio::test]
    async fn test_create_returns_stored_user() {
        let new_user = NewUser::new(Name().fake::<String>(), SafeEmail().fake::<String>());
        let expected = stored(1, &new_user);
        let returned = expected.clone();

        let mut repo = MockUserRepositoryTrait::new();
        let email = new_user.email.clone();
        repo.expect_insert()
            .withf(move |u| u.email == email)
            .times(1)
            .returning(move |_| Ok(returned.clone()));

        let created = service(repo).create(new_user).await.unwrap();

        assert_eq!(created, expected);
    }

    #[tokio::test]
    async fn test_create_propagates_conflict() {
        let mut repo = MockUserRepositoryTrait::new();
        repo.expect_insert()
            .returning(|_| Err(RepositoryError::Conflict("violates users_email_key".into())));

        let result = service(repo)
            .create(NewUser::new("Jane Doe", "jane@example.com"))
            .await;

        assert!(matches!(result, Err(RepositoryError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_get_by_id_absent() {
        let mut repo = MockUserRepositoryTrait::new();
        repo.expect_find_by_id()
            .with(eq(99999))
            .returning(|_| Ok(None));

        assert_eq!(service(repo).get_by_id(99999).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_get_by_email_passes_email_through() {
        let user = stored(4, &NewUser::new("Bob Smith", "bob@example.com"));
        let returned = user.clone();
        let mut repo = MockUserRepositoryTrait::new();
        repo.expect_find_by_email()
            .withf(|email: &str| email == "bob@example.com")
            .returning(move |_| Ok(Some(returned.clone())));

        let found = service(repo).get_by_email("bob@example.com").await.unwrap();

        assert_eq!(found, Some(user));
    }

    #[tokio::test]
    async fn test_list_all_returns_every_user() {
        let users: Vec<User> = (1..=3)
            .map(|id| {
                let user = NewUser::new(Name().fake::<String>(), SafeEmail().fake::<String>());
                stored(id, &user)
            })
            .collect();
        let returned = users.clone();
        let mut repo = MockUserRepositoryTrait::new();
        repo.expect_find_all().returning(move || Ok(returned.clone()));

        let listed = service(repo).list_all().await.unwrap();

        assert_eq!(listed.len(), 3);
        assert_eq!(listed, users);
    }

    #[tokio::test]
    async fn test_delete_true_once_then_false() {
        let mut seq = Sequence::new();
        let mut repo = MockUserRepositoryTrait::new();
        repo.expect_delete_by_id()
            .with(eq(7))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(true));
        repo.expect_delete_by_id()
            .with(eq(7))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(false));

        let service = service(repo);

        assert!(service.delete_by_id(7).await.unwrap());
        assert!(!service.delete_by_id(7).await.unwrap());
    }
}
