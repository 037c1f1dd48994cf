use crate::api::server::HttpServer;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub server: Arc<HttpServer>,
}

impl AppState {
    pub fn new(server: Arc<HttpServer>) -> Self {
        Self { server }
    }
}
