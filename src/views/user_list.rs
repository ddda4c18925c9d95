// Users screen, read-only
use super::{LoadState, LOADING};
use crate::api_client::{Repository, Services};
use crate::filter::{filter_users, SearchQuery};
use crate::format;
use crate::models::User;
use crate::scope::ViewScope;
use std::fmt::Write;
use tracing::{debug, warn};

pub const FETCH_FAILED: &str = "Failed to fetch users";

pub struct UserListView {
    services: Services,
    scope: ViewScope,
    state: LoadState<Vec<User>>,
    query: SearchQuery,
}

impl UserListView {
    pub fn new(services: Services) -> Self {
        Self {
            services,
            scope: ViewScope::new(),
            state: LoadState::Loading,
            query: SearchQuery::default(),
        }
    }

    pub fn scope(&self) -> &ViewScope {
        &self.scope
    }

    pub fn state(&self) -> &LoadState<Vec<User>> {
        &self.state
    }

    pub async fn load(&mut self) {
        self.state = LoadState::Loading;
        let token = self.scope.token();

        match token.guard(self.services.users.list()).await {
            Ok(Ok(users)) => self.state = LoadState::Ready(users),
            Ok(Err(e)) => {
                warn!(error = %e, "user list fetch failed");
                self.state = LoadState::Failed(FETCH_FAILED.to_string());
            }
            Err(_) => debug!("user list torn down, result discarded"),
        }
    }

    pub fn set_search(&mut self, text: &str) {
        self.query = SearchQuery::new(text);
    }

    pub fn visible(&self) -> Vec<&User> {
        self.state
            .ready()
            .map(|users| filter_users(users, &self.query))
            .unwrap_or_default()
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Users");
        if !self.query.is_empty() {
            let _ = writeln!(out, "Search: {}", self.query.as_str());
        }

        match &self.state {
            LoadState::Loading => {
                let _ = writeln!(out, "{}", LOADING);
            }
            LoadState::Failed(message) => {
                let _ = writeln!(out, "Error: {}", message);
            }
            LoadState::Ready(_) => {
                let users = self.visible();
                if users.is_empty() {
                    let _ = writeln!(out, "No users found.");
                }
                for user in users {
                    let _ = writeln!(out);
                    let _ = writeln!(out, "{}", format::or_unknown(Some(user.name.as_str())));
                    let _ = writeln!(out, "  {}", format::or_na(Some(user.email.as_str())));
                }
            }
        }
        out
    }
}
