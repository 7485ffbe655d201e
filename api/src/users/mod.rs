pub mod routes;

use crate::{
    models::user::NewUser,
    store::{RepositoryError, Store},
};

#[derive(Debug, PartialEq)]
pub enum Registration {
    Created(i32),
    AlreadyExists,
}

/// Registers a user unless one with the same email exists. The insert itself
/// is conflict-safe, so two concurrent registrations still store one user.
pub async fn register_user(
    store: &dyn Store,
    user: NewUser,
) -> Result<Registration, RepositoryError> {
    if store.find_user_by_email(&user.email).await?.is_some() {
        return Ok(Registration::AlreadyExists);
    }

    Ok(match store.insert_user_if_absent(user).await? {
        Some(id) => Registration::Created(id),
        None => Registration::AlreadyExists,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, UserRepository};

    fn ann() -> NewUser {
        NewUser::new("Ann".into(), "ann@example.com".into(), None)
    }

    #[tokio::test]
    async fn registering_twice_keeps_one_user() {
        let store = MemoryStore::new();

        let first = register_user(&store, ann()).await.unwrap();
        assert!(matches!(first, Registration::Created(_)));
        assert_eq!(
            register_user(&store, ann()).await.unwrap(),
            Registration::AlreadyExists
        );

        assert_eq!(store.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn concurrent_registrations_store_one_user() {
        let store = std::sync::Arc::new(MemoryStore::new());

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { register_user(store.as_ref(), ann()).await })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            if let Registration::Created(_) = handle.await.unwrap().unwrap() {
                created += 1;
            }
        }

        assert_eq!(created, 1);
        assert_eq!(store.list_users().await.unwrap().len(), 1);
    }
}
