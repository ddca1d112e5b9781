//! Petstore demo for the Pylon contract gate.
//!
//! Declares a small pets contract, registers handlers for its
//! operations, assembles a [`ContractGate`] and drives a handful of
//! requests through it: a valid one, a validation failure, a routing
//! miss and an unimplemented operation. Run with `RUST_LOG=debug` to
//! watch the stages log their decisions.

use bytes::Bytes;
use http::{Method, Request as HttpRequest};
use http_body_util::{BodyExt, Full};
use pylon::prelude::*;
use serde::Deserialize;
use tracing::info;

// =============================================================================
// Handler parameter types
// =============================================================================

#[derive(Deserialize)]
struct ListParams {
    #[serde(default)]
    limit: Option<i64>,
}

#[derive(Deserialize)]
struct ShowParams {
    #[serde(rename = "petId")]
    pet_id: String,
}

// =============================================================================
// Contract
// =============================================================================

fn pets_contract() -> Contract {
    Contract::builder("petstore", "1.0.0")
        .operation(
            OperationDescriptor::builder("listPets")
                .method(Method::GET)
                .path("/pets")
                .query_param(
                    ParameterDeclaration::query("limit", ParamSchema::integer().minimum(1)),
                )
                .query_param(ParameterDeclaration::query(
                    "status",
                    ParamSchema::string().one_of(["available", "sold"]),
                ))
                .build(),
        )
        // Declared ahead of showPet: the first registered template wins,
        // so /pets/audit must not be captured by {petId}.
        .operation(
            OperationDescriptor::builder("auditPets")
                .method(Method::GET)
                .path("/pets/audit")
                .build(),
        )
        .operation(
            OperationDescriptor::builder("showPet")
                .method(Method::GET)
                .path("/pets/{petId}")
                .path_param(ParameterDeclaration::path("petId", ParamSchema::string()))
                .build(),
        )
        .build()
}

// =============================================================================
// Handlers
// =============================================================================

fn pets_registry() -> HandlerRegistry {
    let mut registry = HandlerRegistry::new();
    registry
        .register("listPets", |_ctx, params: ListParams| async move {
            let pets = ["rex", "whiskers", "bubbles"];
            let limit = params.limit.unwrap_or(pets.len() as i64).max(0) as usize;
            Ok::<_, HandlerError>(serde_json::json!({
                "pets": &pets[..limit.min(pets.len())],
            }))
        })
        .expect("listPets registers");
    registry
        .register("showPet", |_ctx, params: ShowParams| async move {
            Ok::<_, HandlerError>(serde_json::json!({
                "petId": params.pet_id,
                "name": "rex",
            }))
        })
        .expect("showPet registers");
    // auditPets is declared but deliberately left unregistered to show
    // the 501 path.
    registry
}

// =============================================================================
// Main
// =============================================================================

fn make_request(method: Method, uri: &str) -> Request {
    HttpRequest::builder()
        .method(method)
        .uri(uri)
        .body(Full::new(Bytes::new()))
        .expect("demo request is well-formed")
}

async fn show(gate: &ContractGate, method: Method, uri: &str) {
    let label = format!("{method} {uri}");
    match gate.handle(make_request(method, uri)).await {
        Ok(response) => {
            let status = response.status();
            let body = match response.into_body().collect().await {
                Ok(collected) => collected.to_bytes(),
                Err(never) => match never {},
            };
            info!(
                status = %status,
                body = %String::from_utf8_lossy(&body),
                "{label}"
            );
        }
        Err(error) => info!(%error, "{label} raised"),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("info".parse().expect("directive parses")),
        )
        .init();

    let index = OperationIndex::build(&pets_contract())?;
    let gate = ContractGate::builder(index, pets_registry()).build();

    info!(stages = ?gate.stage_names(), "gate assembled");

    // A valid request: matched, validated, dispatched.
    show(&gate, Method::GET, "/pets?limit=2&status=available").await;

    // A path parameter flowing into the handler.
    show(&gate, Method::GET, "/pets/42").await;

    // Two violations reported together in one envelope.
    show(&gate, Method::GET, "/pets?limit=abc&status=adopted").await;

    // No route for the method: the fallback answers.
    show(&gate, Method::DELETE, "/pets").await;

    // Declared operation with no registered handler.
    show(&gate, Method::GET, "/pets/audit").await;

    Ok(())
}
