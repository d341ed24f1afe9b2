//! Geometry worker
//!
//! CPU-heavy geometry math runs off the caller's context as a
//! message-in/message-out task: requests and responses are plain values, the
//! worker holds no state between messages, and the full output is produced
//! before any response is sent (no partial-result streaming).
//!
//! The protocol is a closed tagged-variant pair - [`GeometryRequest`] and
//! [`GeometryResponse`] - dispatched exhaustively in [`handle`]. A raw JSON
//! entry point ([`handle_raw`]) serves transports that speak the tagged wire
//! form directly; an unrecognized `type` there logs a warning and produces
//! no response.

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use tracing::{error, warn};

use crate::config::constants::geometry as geometry_config;
use crate::errors::WorkerError;
use crate::geo::LatLon;
use crate::geometry::{
    compute_arrow_bearings, filter_noisy_gps, haversine_chain, parse_geometry, ArrowBearing,
};

fn default_min_distance() -> f64 {
    geometry_config::GPS_MIN_DISTANCE_METERS
}

/// Requests the worker understands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GeometryRequest {
    /// Reorder provider geometry to lat-first and convert meters to km.
    #[serde(rename_all = "camelCase")]
    ParseGeometry {
        geometry: Vec<[f64; 2]>,
        total_distance_meters: f64,
    },
    /// Sample up to eight direction arrows along a route.
    ComputeArrowBearings { points: Vec<LatLon> },
    /// Total great-circle length of a polyline.
    HaversineChain { points: Vec<LatLon> },
    /// Suppress GPS jitter below a movement threshold.
    #[serde(rename_all = "camelCase")]
    FilterNoisyGps {
        fixes: Vec<LatLon>,
        #[serde(default = "default_min_distance")]
        min_distance_meters: f64,
    },
}

/// Responses, paired one-to-one with [`GeometryRequest`] variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GeometryResponse {
    #[serde(rename_all = "camelCase")]
    ParseGeometry {
        points: Vec<LatLon>,
        distance_km: f64,
    },
    ComputeArrowBearings { bearings: Vec<ArrowBearing> },
    #[serde(rename_all = "camelCase")]
    HaversineChain { total_km: f64 },
    FilterNoisyGps { fixes: Vec<LatLon> },
}

/// Computes the response for a request. Pure; exhaustive over variants.
pub fn handle(request: GeometryRequest) -> GeometryResponse {
    match request {
        GeometryRequest::ParseGeometry {
            geometry,
            total_distance_meters,
        } => {
            let (points, distance_km) = parse_geometry(&geometry, total_distance_meters);
            GeometryResponse::ParseGeometry {
                points,
                distance_km,
            }
        }
        GeometryRequest::ComputeArrowBearings { points } => GeometryResponse::ComputeArrowBearings {
            bearings: compute_arrow_bearings(&points),
        },
        GeometryRequest::HaversineChain { points } => GeometryResponse::HaversineChain {
            total_km: haversine_chain(&points),
        },
        GeometryRequest::FilterNoisyGps {
            fixes,
            min_distance_meters,
        } => GeometryResponse::FilterNoisyGps {
            fixes: filter_noisy_gps(&fixes, min_distance_meters),
        },
    }
}

/// Raw-wire entry point: tagged JSON in, tagged JSON out.
///
/// An unrecognized or malformed message logs a warning and produces no
/// response, matching the wire contract.
pub fn handle_raw(raw: serde_json::Value) -> Option<serde_json::Value> {
    match serde_json::from_value::<GeometryRequest>(raw) {
        Ok(request) => serde_json::to_value(handle(request)).ok(),
        Err(e) => {
            warn!(error = %e, "Unrecognized geometry message, no response produced");
            None
        }
    }
}

struct Envelope {
    request: GeometryRequest,
    responder: oneshot::Sender<GeometryResponse>,
}

/// The worker task.
pub struct GeometryWorker;

impl GeometryWorker {
    /// Spawns the worker loop and returns its handle.
    pub fn spawn() -> GeometryWorkerHandle {
        let (tx, mut rx) = mpsc::channel::<Envelope>(16);

        tokio::spawn(async move {
            while let Some(envelope) = rx.recv().await {
                let response = handle(envelope.request);
                if envelope.responder.send(response).is_err() {
                    error!("Failed to send geometry response");
                }
            }
        });

        GeometryWorkerHandle { tx }
    }
}

/// Cloneable handle to a running [`GeometryWorker`].
#[derive(Clone)]
pub struct GeometryWorkerHandle {
    tx: mpsc::Sender<Envelope>,
}

impl GeometryWorkerHandle {
    async fn request(&self, request: GeometryRequest) -> Result<GeometryResponse, WorkerError> {
        let (responder, receiver) = oneshot::channel();
        self.tx
            .send(Envelope { request, responder })
            .await
            .map_err(|_| WorkerError::ChannelClosed)?;
        receiver.await.map_err(|_| WorkerError::ChannelClosed)
    }

    /// Reorders provider geometry and converts meters to kilometers.
    pub async fn parse_geometry(
        &self,
        geometry: Vec<[f64; 2]>,
        total_distance_meters: f64,
    ) -> Result<(Vec<LatLon>, f64), WorkerError> {
        match self
            .request(GeometryRequest::ParseGeometry {
                geometry,
                total_distance_meters,
            })
            .await?
        {
            GeometryResponse::ParseGeometry {
                points,
                distance_km,
            } => Ok((points, distance_km)),
            _ => Err(WorkerError::UnexpectedResponse {
                expected: "parseGeometry",
            }),
        }
    }

    /// Samples direction arrows along a route.
    pub async fn compute_arrow_bearings(
        &self,
        points: Vec<LatLon>,
    ) -> Result<Vec<ArrowBearing>, WorkerError> {
        match self
            .request(GeometryRequest::ComputeArrowBearings { points })
            .await?
        {
            GeometryResponse::ComputeArrowBearings { bearings } => Ok(bearings),
            _ => Err(WorkerError::UnexpectedResponse {
                expected: "computeArrowBearings",
            }),
        }
    }

    /// Total great-circle length of a polyline, in kilometers.
    pub async fn haversine_chain(&self, points: Vec<LatLon>) -> Result<f64, WorkerError> {
        match self
            .request(GeometryRequest::HaversineChain { points })
            .await?
        {
            GeometryResponse::HaversineChain { total_km } => Ok(total_km),
            _ => Err(WorkerError::UnexpectedResponse {
                expected: "haversineChain",
            }),
        }
    }

    /// Filters GPS jitter below the movement threshold.
    pub async fn filter_noisy_gps(
        &self,
        fixes: Vec<LatLon>,
        min_distance_meters: f64,
    ) -> Result<Vec<LatLon>, WorkerError> {
        match self
            .request(GeometryRequest::FilterNoisyGps {
                fixes,
                min_distance_meters,
            })
            .await?
        {
            GeometryResponse::FilterNoisyGps { fixes } => Ok(fixes),
            _ => Err(WorkerError::UnexpectedResponse {
                expected: "filterNoisyGps",
            }),
        }
    }
}
