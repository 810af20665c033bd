use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use serde_json::json;

/// One entry in the web client's symptom picker.
#[derive(Debug, Clone, Serialize)]
pub struct Symptom {
    pub code: &'static str,
    pub label: &'static str,
}

const SYMPTOMS: &[Symptom] = &[
    Symptom {
        code: "itchy-skin",
        label: "Itchy skin",
    },
    Symptom {
        code: "loose-stool",
        label: "Loose stools",
    },
    Symptom {
        code: "sensitive-stomach",
        label: "Sensitive stomach",
    },
    Symptom {
        code: "dull-coat",
        label: "Dull coat",
    },
    Symptom {
        code: "tear-stains",
        label: "Tear stains",
    },
    Symptom {
        code: "low-energy",
        label: "Low energy",
    },
];

/// Static symptom metadata.
///
/// `GET /meta/symptoms`
pub async fn list_symptoms() -> impl IntoResponse {
    Json(json!({ "items": SYMPTOMS }))
}
