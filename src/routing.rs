//! Application router configuration.

use axum::{
    Router,
    routing::{get, put},
};

use crate::{
    AppState,
    consumption::{
        create_consumption_endpoint, delete_consumption_endpoint, get_consumption_endpoint,
        list_consumptions_by_sub_type_endpoint, list_consumptions_by_tag_endpoint,
        list_consumptions_endpoint, list_pending_consumptions_endpoint,
        update_consumption_endpoint,
    },
    endpoints,
    lookup::{
        Channel, LookupKind, MainType, SubType, create_entry_endpoint, delete_entry_endpoint,
        list_entries_endpoint, update_entry_endpoint,
    },
    not_found::get_404_not_found,
    statistics::get_statistics_endpoint,
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            endpoints::CONSUMPTIONS,
            get(list_consumptions_endpoint).post(create_consumption_endpoint),
        )
        .route(
            endpoints::CONSUMPTION,
            get(get_consumption_endpoint)
                .put(update_consumption_endpoint)
                .delete(delete_consumption_endpoint),
        )
        .route(
            endpoints::PENDING_CONSUMPTIONS,
            get(list_pending_consumptions_endpoint),
        )
        .route(
            endpoints::CONSUMPTIONS_BY_SUB_TYPE,
            get(list_consumptions_by_sub_type_endpoint),
        )
        .route(
            endpoints::CONSUMPTIONS_BY_TAG,
            get(list_consumptions_by_tag_endpoint),
        )
        .route(endpoints::STATISTICS, get(get_statistics_endpoint))
        .merge(lookup_routes::<Channel>())
        .merge(lookup_routes::<MainType>())
        .merge(lookup_routes::<SubType>())
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The list, create, update and delete routes for one lookup kind.
fn lookup_routes<K: LookupKind>() -> Router<AppState> {
    Router::new()
        .route(
            K::COLLECTION_PATH,
            get(list_entries_endpoint::<K>).post(create_entry_endpoint::<K>),
        )
        .route(
            K::ITEM_PATH,
            put(update_entry_endpoint::<K>).delete(delete_entry_endpoint::<K>),
        )
}
