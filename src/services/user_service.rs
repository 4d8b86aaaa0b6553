use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use super::{hash_password, ServiceError};
use crate::database::models::User;
use crate::database::repository::UserRepository;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

pub struct UserService {
    users: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    pub async fn create_user(&self, req: CreateUserRequest) -> Result<User, ServiceError> {
        // Pre-check; the store's unique index is the real arbiter under
        // concurrent writes.
        if self.users.get_by_email(&req.email).await?.is_some() {
            return Err(ServiceError::EmailExists);
        }

        let user = User::new(
            req.email,
            hash_password(&req.password)?,
            req.first_name,
            req.last_name,
        );
        self.users.create(&user).await.map_err(|e| match e {
            crate::database::repository::RepositoryError::Duplicate(_) => ServiceError::EmailExists,
            other => ServiceError::Storage(other),
        })?;
        Ok(user)
    }

    pub async fn get_user(&self, id: Uuid) -> Result<User, ServiceError> {
        self.users
            .get_by_id(id)
            .await?
            .ok_or(ServiceError::UserNotFound)
    }

    pub async fn update_user(&self, id: Uuid, req: UpdateUserRequest) -> Result<User, ServiceError> {
        let mut user = self
            .users
            .get_by_id(id)
            .await?
            .ok_or(ServiceError::UserNotFound)?;

        if let Some(email) = req.email {
            // Uniqueness is re-checked only when the address actually changes.
            if email != user.email {
                if self.users.get_by_email(&email).await?.is_some() {
                    return Err(ServiceError::EmailExists);
                }
                user.email = email;
            }
        }
        if let Some(first_name) = req.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = req.last_name {
            user.last_name = last_name;
        }

        user.updated_at = Utc::now();
        self.users.update(&user).await?;
        Ok(user)
    }

    pub async fn delete_user(&self, id: Uuid) -> Result<(), ServiceError> {
        if self.users.get_by_id(id).await?.is_none() {
            return Err(ServiceError::UserNotFound);
        }
        self.users.delete(id).await?;
        Ok(())
    }

    pub async fn list_users(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<User>, i64), ServiceError> {
        let users = self.users.list(limit, offset).await?;
        let total = self.users.count().await?;
        Ok((users, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemoryUserRepository;

    fn create_request(email: &str) -> CreateUserRequest {
        CreateUserRequest {
            email: email.to_string(),
            password: "hunter22".to_string(),
            first_name: "Avery".to_string(),
            last_name: "Quinn".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_user_hashes_password() {
        let repo = Arc::new(InMemoryUserRepository::new());
        let service = UserService::new(repo.clone());

        let user = service.create_user(create_request("a@example.com")).await.unwrap();
        assert_ne!(user.password, "hunter22");
        assert!(bcrypt::verify("hunter22", &user.password).unwrap());
    }

    #[tokio::test]
    async fn test_create_user_rejects_duplicate_email() {
        let service = UserService::new(Arc::new(InMemoryUserRepository::new()));
        service.create_user(create_request("a@example.com")).await.unwrap();

        let err = service
            .create_user(create_request("a@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::EmailExists));
    }

    #[tokio::test]
    async fn test_update_user_email_uniqueness() {
        let service = UserService::new(Arc::new(InMemoryUserRepository::new()));
        let a = service.create_user(create_request("a@example.com")).await.unwrap();
        service.create_user(create_request("b@example.com")).await.unwrap();

        // Changing to a taken address conflicts.
        let err = service
            .update_user(
                a.id,
                UpdateUserRequest {
                    email: Some("b@example.com".to_string()),
                    ..UpdateUserRequest::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::EmailExists));

        // Re-submitting the current address is a no-op, not a conflict.
        let unchanged = service
            .update_user(
                a.id,
                UpdateUserRequest {
                    email: Some("a@example.com".to_string()),
                    first_name: Some("Ash".to_string()),
                    ..UpdateUserRequest::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(unchanged.email, "a@example.com");
        assert_eq!(unchanged.first_name, "Ash");
    }

    #[tokio::test]
    async fn test_delete_user_soft_deletes() {
        let repo = Arc::new(InMemoryUserRepository::new());
        let service = UserService::new(repo.clone());
        let user = service.create_user(create_request("a@example.com")).await.unwrap();

        service.delete_user(user.id).await.unwrap();
        assert!(repo.get_by_id(user.id).await.unwrap().is_none());

        let err = service.delete_user(user.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::UserNotFound));
    }

    #[tokio::test]
    async fn test_list_users_returns_total() {
        let service = UserService::new(Arc::new(InMemoryUserRepository::new()));
        for i in 0..3 {
            service
                .create_user(create_request(&format!("user{}@example.com", i)))
                .await
                .unwrap();
        }

        let (users, total) = service.list_users(2, 0).await.unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(total, 3);
    }
}
