//! HTTP layer: routes under `/api`, their middleware, request/response DTOs
//! and the generated OpenAPI document.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
mod doc;
