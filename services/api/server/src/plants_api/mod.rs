use axum::Router;
use axum::routing::get;

pub mod delete_plant;
pub(crate) mod error_recorder;
pub(crate) mod errors;
pub mod get_plant;
pub mod list_plants;
pub mod models;
pub mod update_plant;

pub fn get_routes(state: crate::AppState) -> Router {
    Router::new()
        .route("/plants", get(list_plants::handler))
        .route(
            "/plants/{id}",
            get(get_plant::handler)
                .patch(update_plant::handler)
                .delete(delete_plant::handler),
        )
        .with_state(state)
}
