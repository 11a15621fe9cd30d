pub mod client;
pub mod error;
pub mod route;
pub mod types;

pub use client::AssistantClient;
pub use error::ApiError;
pub use route::parse_route;
pub use types::{
    ExtractResponse, Feature, FeatureCollection, FeatureProperties, Geometry, NearestResponse,
    StatusResponse, WireShelter,
};
