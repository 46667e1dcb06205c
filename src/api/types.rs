use serde::Serialize;

#[derive(Serialize, Clone)]
pub struct Message {
    pub message: String,
}

#[derive(Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
    pub documents: usize,
}
