use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use restroom_server::auth::TokenKeys;
use restroom_server::geocode::{
    CacheConfig, CachedGeocoder, FallbackGeocoder, Geocoder, NaverConfig, NaverGeocoder,
};
use restroom_server::seoul::{SeoulClient, SeoulConfig};
use restroom_server::stations::seoul_stations;
use restroom_server::store::Store;
use restroom_server::sync::SyncConfig;
use restroom_server::web::{create_router, AppState};

const DEFAULT_PORT: u16 = 3002;
const DEFAULT_DATABASE_URL: &str = "sqlite://restroom.db?mode=rwc";

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_owned());
    let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
        tracing::warn!("JWT_SECRET not set, using an insecure development secret");
        "dev-secret-change-me".to_owned()
    });
    let seoul_key = std::env::var("SEOUL_OPEN_DATA_KEY").unwrap_or_else(|_| {
        tracing::warn!("SEOUL_OPEN_DATA_KEY not set, public dataset calls will fail");
        String::new()
    });
    let naver_id = std::env::var("NAVER_CLIENT_ID").unwrap_or_default();
    let naver_secret = std::env::var("NAVER_CLIENT_SECRET").unwrap_or_default();
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);

    let store = Store::connect(&database_url)
        .await
        .expect("failed to open the database");

    let stations = Arc::new(seoul_stations());

    let directory =
        SeoulClient::new(SeoulConfig::new(seoul_key)).expect("failed to build the Seoul client");

    let naver_config = NaverConfig::new(naver_id, naver_secret);
    let (geocoder, address_search): (Arc<dyn Geocoder>, Option<Arc<NaverGeocoder>>) =
        if naver_config.is_configured() {
            let live = NaverGeocoder::new(naver_config.clone())
                .expect("failed to build the Naver geocoder");
            let cached = CachedGeocoder::new(
                NaverGeocoder::new(naver_config).expect("failed to build the Naver geocoder"),
                CacheConfig::default(),
            );
            (Arc::new(cached), Some(Arc::new(live)))
        } else {
            tracing::warn!(
                "NAVER_CLIENT_ID/NAVER_CLIENT_SECRET not set, \
                 geocoding degrades to a fixed central Seoul coordinate"
            );
            (Arc::new(FallbackGeocoder), None)
        };

    let state = AppState {
        store,
        stations,
        directory: Arc::new(directory),
        geocoder,
        address_search,
        tokens: Arc::new(TokenKeys::new(&jwt_secret)),
        sync_config: SyncConfig::default(),
    };

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%addr, "restroom server listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind");
    axum::serve(listener, app).await.expect("server error");
}
