//! Application state for the web layer.

use std::sync::Arc;

use crate::auth::TokenKeys;
use crate::geocode::{Geocoder, NaverGeocoder};
use crate::seoul::RestroomDirectory;
use crate::stations::StationDirectory;
use crate::store::Store;
use crate::sync::SyncConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,

    /// Static subway station table.
    pub stations: Arc<StationDirectory>,

    /// Public restroom dataset client.
    pub directory: Arc<dyn RestroomDirectory>,

    /// Address resolver used by the sync pipeline (cached, possibly the
    /// degraded fallback).
    pub geocoder: Arc<dyn Geocoder>,

    /// Live client for the address-search proxy. Absent when Naver
    /// credentials are not configured.
    pub address_search: Option<Arc<NaverGeocoder>>,

    pub tokens: Arc<TokenKeys>,

    pub sync_config: SyncConfig,
}
