//! CORS configuration

use tower_http::cors::CorsLayer;

/// Permissive CORS; the hub sits behind the application's own frontend.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::permissive()
}
