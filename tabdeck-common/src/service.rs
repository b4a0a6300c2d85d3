//! Mutation service
//!
//! Wraps each pure transform from [`crate::mutation`] in one store transaction:
//! load, transform, save, return the projection.

use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::error::Result;
use crate::model::{Component, State, Tab};
use crate::mutation;
use crate::store::DocumentStore;

/// Tab/component operations over a persisted document
#[derive(Debug, Clone)]
pub struct TabService {
    store: Arc<DocumentStore>,
}

impl TabService {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    /// Underlying store
    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// Full document
    pub async fn get_state(&self) -> Result<State> {
        self.store.snapshot().await
    }

    /// Append a component to tab `key`, creating the tab if needed
    pub async fn add_component(&self, key: &str, kind: &str, data: Value) -> Result<Tab> {
        let tab = self
            .store
            .transaction(|state| mutation::add_component(state, key, kind, data))
            .await?;

        if let Some(component) = tab.components.last() {
            info!(tab = %key, component_id = %component.id, kind = %kind, "Added component");
        }
        Ok(tab)
    }

    /// Replace the data of component `id` in tab `key`
    pub async fn update_component(&self, id: &str, key: &str, data: Value) -> Result<Component> {
        let component = self
            .store
            .transaction(|state| mutation::update_component(state, id, key, data))
            .await?;

        info!(tab = %key, component_id = %id, "Updated component");
        Ok(component)
    }

    /// Remove every component from tab `key`
    pub async fn clear_components(&self, key: &str) -> Result<()> {
        self.store
            .transaction(|state| mutation::clear_components(state, key))
            .await?;

        info!(tab = %key, "Cleared tab");
        Ok(())
    }

    /// Move the home tab's components into tab `key`
    pub async fn merge_into(&self, key: &str) -> Result<State> {
        let state = self
            .store
            .transaction(|state| mutation::merge_into(state, key))
            .await?;

        info!(
            tab = %key,
            components = state.tab(key).map(|t| t.components.len()).unwrap_or(0),
            "Merged home into tab"
        );
        Ok(state)
    }

    /// Set the active tab key. Dangling keys are accepted.
    pub async fn set_active_tab(&self, key: &str) -> Result<()> {
        self.store
            .transaction(|state| {
                mutation::set_active_tab(state, key);
                Ok(())
            })
            .await?;

        info!(tab = %key, "Active tab set");
        Ok(())
    }

    /// Apply an arbitrary command in one transaction
    pub async fn execute(&self, command: mutation::Command) -> Result<mutation::Outcome> {
        self.store
            .transaction(|state| mutation::apply(state, command))
            .await
    }
}
