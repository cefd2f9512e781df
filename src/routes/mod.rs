pub mod articles;
pub mod auth;
pub mod comments;
pub mod export;
pub mod shared;
pub mod versions;

pub use articles::articles_routes;
pub use auth::auth_routes;
pub use comments::comments_routes;
pub use export::export_routes;
pub use shared::shared_routes;
pub use versions::versions_routes;
