use std::sync::Arc;

mod user;

pub use user::{UserService, UserServiceTrait};

use crate::{db::Database, repositories::UserRepository};

/// Build the user service on top of the shared database handle
pub fn build_user_service(db: &Database) -> Arc<dyn UserServiceTrait> {
    let user_repository = UserRepository::new(db);
    Arc::new(UserService::new(Arc::new(user_repository)))
}
