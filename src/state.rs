use std::sync::Arc;

use crate::service::TokenService;

#[derive(Clone)]
pub struct AppState {
    pub tokens: TokenService,
}

impl AppState {
    pub fn new(tokens: TokenService) -> Arc<Self> {
        Arc::new(Self { tokens })
    }
}
