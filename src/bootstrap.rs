//! Server bootstrap
//!
//! Resolves deployment configuration from the environment, wires the durable
//! stores and providers together, and serves the API.
//!
//! | Variable | Default |
//! |---|---|
//! | `ROUTECAST_PORT` | `3000` |
//! | `ROUTECAST_DATA_DIR` | `./data` |
//! | `ROUTECAST_NOMINATIM_URL` | public Nominatim |
//! | `ROUTECAST_OSRM_URL` | public OSRM |

use std::path::PathBuf;
use std::sync::Arc;

use dotenvy::dotenv;
use tokio::net::TcpListener;
use tracing::info;

use crate::api;
use crate::edge::{EdgeRouteResolver, KvStore, StopListStore};
use crate::geocode::{GeocodeResolver, NominatimClient};
use crate::routing::OsrmClient;

/// Main entry point for the server.
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();

    let port = dotenvy::var("ROUTECAST_PORT").unwrap_or_else(|_| "3000".to_owned());
    let data_dir = PathBuf::from(
        dotenvy::var("ROUTECAST_DATA_DIR").unwrap_or_else(|_| "./data".to_owned()),
    );

    let nominatim = match dotenvy::var("ROUTECAST_NOMINATIM_URL") {
        Ok(url) => NominatimClient::with_base_url(url),
        Err(_) => NominatimClient::new(),
    };
    let osrm = match dotenvy::var("ROUTECAST_OSRM_URL") {
        Ok(url) => OsrmClient::with_base_url(url),
        Err(_) => OsrmClient::new(),
    };

    let resolver = Arc::new(EdgeRouteResolver::new(
        GeocodeResolver::new(Arc::new(nominatim)),
        Arc::new(osrm),
        KvStore::new(data_dir.join("edge_cache.json")),
        StopListStore::new(data_dir.join("bus_stops.json")),
    ));

    let listener = TcpListener::bind(format!("0.0.0.0:{port}")).await?;
    serve(listener, resolver).await
}

/// Serves the API on an already-bound listener.
pub async fn serve(listener: TcpListener, resolver: Arc<EdgeRouteResolver>) -> anyhow::Result<()> {
    let app = api::router(resolver);

    let addr = listener.local_addr()?;
    info!(address = ?addr, "Starting edge route resolver");

    axum::serve(listener, app).await?;

    Ok(())
}
