//! Client edge of the course learning app: the `CourseApi` contract, its
//! HTTP implementation, and the payload-normalization boundary. The domain
//! core never sees a raw wire shape.

#![forbid(unsafe_code)]

pub mod api;
pub mod error;
pub mod http;
pub mod memory;
mod wire;

pub use api::{CourseApi, ProgressUpdate, StartedAttempt};
pub use error::ApiError;
pub use http::{ApiConfig, HttpCourseApi};
pub use memory::InMemoryCourseApi;
