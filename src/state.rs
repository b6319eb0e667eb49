use crate::{db::OrmConn, token::TokenKeys};

#[derive(Clone)]
pub struct AppState {
    pub orm: OrmConn,
    pub tokens: TokenKeys,
}

impl AppState {
    pub fn new(orm: OrmConn, tokens: TokenKeys) -> Self {
        Self { orm, tokens }
    }
}
