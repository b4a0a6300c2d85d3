//! Pure document transforms
//!
//! Every state-changing operation is a function over `&mut State` with no I/O.
//! Persistence is layered on top by [`crate::service::TabService`], which runs
//! each transform inside a single store transaction.
//!
//! Lookups use first-match semantics over the ordered tab and component lists.

use serde_json::Value;

use crate::error::{Error, Result};
use crate::model::{Component, State, Tab};

/// One state-changing request against the document
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    AddComponent {
        key: String,
        kind: String,
        data: Value,
    },
    UpdateComponent {
        id: String,
        key: String,
        data: Value,
    },
    ClearComponents {
        key: String,
    },
    MergeInto {
        key: String,
    },
    SetActiveTab {
        key: String,
    },
}

/// The projection each command returns
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Tab after a component was appended
    Tab(Tab),
    /// Component after its data was replaced
    Component(Component),
    /// Full document after a merge
    State(State),
    /// Operation with no response body
    Done,
}

/// Apply a command to the document
pub fn apply(state: &mut State, command: Command) -> Result<Outcome> {
    match command {
        Command::AddComponent { key, kind, data } => {
            add_component(state, &key, kind, data).map(Outcome::Tab)
        }
        Command::UpdateComponent { id, key, data } => {
            update_component(state, &id, &key, data).map(Outcome::Component)
        }
        Command::ClearComponents { key } => clear_components(state, &key).map(|()| Outcome::Done),
        Command::MergeInto { key } => merge_into(state, &key).map(Outcome::State),
        Command::SetActiveTab { key } => {
            set_active_tab(state, key);
            Ok(Outcome::Done)
        }
    }
}

/// Append a new component to the tab `key`, creating the tab if it is unseen.
///
/// Never fails. Returns the updated tab.
pub fn add_component(
    state: &mut State,
    key: &str,
    kind: impl Into<String>,
    data: Value,
) -> Result<Tab> {
    let index = match state.tabs.iter().position(|t| t.key == key) {
        Some(index) => index,
        None => {
            state.tabs.push(Tab::new(key));
            state.tabs.len() - 1
        }
    };

    let tab = &mut state.tabs[index];
    tab.components.push(Component::new(kind, data));
    Ok(tab.clone())
}

/// Replace the data of component `id` inside tab `key`.
///
/// The lookup is tab-scoped: an id that lives in another tab is `NotFound`.
pub fn update_component(state: &mut State, id: &str, key: &str, data: Value) -> Result<Component> {
    let tab = state
        .tab_mut(key)
        .ok_or_else(|| Error::NotFound(format!("Tab not found: {}", key)))?;

    let component = tab
        .component_mut(id)
        .ok_or_else(|| Error::NotFound(format!("Component not found: {}", id)))?;

    component.data = data;
    Ok(component.clone())
}

/// Empty the component list of tab `key`
pub fn clear_components(state: &mut State, key: &str) -> Result<()> {
    let tab = state
        .tab_mut(key)
        .ok_or_else(|| Error::NotFound(format!("Tab not found: {}", key)))?;

    tab.components.clear();
    Ok(())
}

/// Move every component of the home tab (`tabs[0]`) into tab `key`.
///
/// Creates the target from a copy of home's components when it does not exist,
/// otherwise appends them in order without de-duplication. Home is always
/// cleared afterwards, including when `key` names home itself.
pub fn merge_into(state: &mut State, key: &str) -> Result<State> {
    let staged = state
        .home()
        .map(|home| home.components.clone())
        .ok_or_else(|| Error::InvalidInput("document has no home tab".to_string()))?;

    match state.tab_mut(key) {
        Some(target) => target.components.extend(staged),
        None => state.tabs.push(Tab {
            key: key.to_string(),
            components: staged,
        }),
    }

    state.tabs[0].components.clear();
    Ok(state.clone())
}

/// Point `activeTabKey` at `key`. The key is not required to name a tab.
pub fn set_active_tab(state: &mut State, key: impl Into<String>) {
    state.active_tab_key = key.into();
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashSet;

    fn all_ids(state: &State) -> Vec<String> {
        state
            .tabs
            .iter()
            .flat_map(|t| t.components.iter().map(|c| c.id.clone()))
            .collect()
    }

    #[test]
    fn test_add_component_creates_tab() {
        let mut state = State::default();
        let tab = add_component(&mut state, "reports", "graph", json!([1, 2])).unwrap();

        assert_eq!(tab.key, "reports");
        assert_eq!(tab.components.len(), 1);
        assert_eq!(tab.components[0].kind, "graph");
        assert_eq!(state.tabs.len(), 2);
        assert_eq!(state.tabs[1].key, "reports");
    }

    #[test]
    fn test_add_component_count_and_unique_ids() {
        let mut state = State::default();
        for n in 0..25 {
            add_component(&mut state, "home", "table", json!({ "n": n })).unwrap();
            add_component(&mut state, "other", "table", json!({ "n": n })).unwrap();
        }

        assert_eq!(state.tab("home").unwrap().components.len(), 25);
        assert_eq!(state.tab("other").unwrap().components.len(), 25);

        let ids = all_ids(&state);
        let unique: HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn test_add_component_preserves_insertion_order() {
        let mut state = State::default();
        add_component(&mut state, "home", "text", json!("first")).unwrap();
        add_component(&mut state, "home", "text", json!("second")).unwrap();

        let home = state.tab("home").unwrap();
        assert_eq!(home.components[0].data, json!("first"));
        assert_eq!(home.components[1].data, json!("second"));
    }

    #[test]
    fn test_update_component_replaces_only_data() {
        let mut state = State::default();
        let tab = add_component(&mut state, "home", "table", json!({"x": 1})).unwrap();
        let id = tab.components[0].id.clone();

        let updated = update_component(&mut state, &id, "home", json!({"x": 2})).unwrap();
        assert_eq!(updated.id, id);
        assert_eq!(updated.kind, "table");
        assert_eq!(updated.data, json!({"x": 2}));
        assert_eq!(state.tab("home").unwrap().components[0].data, json!({"x": 2}));
    }

    #[test]
    fn test_update_component_is_tab_scoped() {
        let mut state = State::default();
        let tab = add_component(&mut state, "other", "table", json!(1)).unwrap();
        let id = tab.components[0].id.clone();

        let result = update_component(&mut state, &id, "home", json!(2));
        assert!(matches!(result, Err(Error::NotFound(_))));
        assert_eq!(state.tab("other").unwrap().components[0].data, json!(1));
    }

    #[test]
    fn test_update_component_missing_tab() {
        let mut state = State::default();
        let result = update_component(&mut state, "x", "nope", json!(null));
        assert!(matches!(result, Err(Error::NotFound(msg)) if msg.contains("Tab")));
    }

    #[test]
    fn test_clear_components_leaves_other_tabs() {
        let mut state = State::default();
        add_component(&mut state, "home", "text", json!(1)).unwrap();
        add_component(&mut state, "keep", "text", json!(2)).unwrap();

        clear_components(&mut state, "home").unwrap();
        assert!(state.tab("home").unwrap().components.is_empty());
        assert_eq!(state.tab("keep").unwrap().components.len(), 1);
    }

    #[test]
    fn test_clear_components_missing_tab() {
        let mut state = State::default();
        assert!(matches!(
            clear_components(&mut state, "ghost"),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_merge_into_new_tab() {
        let mut state = State::default();
        add_component(&mut state, "home", "table", json!({"x": 1})).unwrap();

        let merged = merge_into(&mut state, "reports").unwrap();
        assert!(merged.tab("home").unwrap().components.is_empty());
        let reports = merged.tab("reports").unwrap();
        assert_eq!(reports.components.len(), 1);
        assert_eq!(reports.components[0].kind, "table");
        assert_eq!(merged, state);
    }

    #[test]
    fn test_merge_into_existing_tab_appends() {
        let mut state = State::default();
        add_component(&mut state, "reports", "text", json!("old")).unwrap();
        add_component(&mut state, "home", "graph", json!("a")).unwrap();
        add_component(&mut state, "home", "graph", json!("b")).unwrap();

        merge_into(&mut state, "reports").unwrap();
        let data: Vec<_> = state
            .tab("reports")
            .unwrap()
            .components
            .iter()
            .map(|c| c.data.clone())
            .collect();
        assert_eq!(data, vec![json!("old"), json!("a"), json!("b")]);
        assert!(state.tabs[0].components.is_empty());
    }

    #[test]
    fn test_merge_is_idempotent_on_home() {
        let mut state = State::default();
        add_component(&mut state, "home", "table", json!(1)).unwrap();

        merge_into(&mut state, "reports").unwrap();
        let after_first = state.clone();
        merge_into(&mut state, "reports").unwrap();

        assert_eq!(state, after_first);
    }

    #[test]
    fn test_merge_into_home_empties_home() {
        let mut state = State::default();
        add_component(&mut state, "home", "table", json!(1)).unwrap();

        merge_into(&mut state, "home").unwrap();
        assert_eq!(state.tabs.len(), 1);
        assert!(state.tabs[0].components.is_empty());
    }

    #[test]
    fn test_merge_without_tabs_is_invalid() {
        let mut state = State {
            tabs: Vec::new(),
            active_tab_key: "home".to_string(),
        };
        assert!(matches!(
            merge_into(&mut state, "x"),
            Err(Error::InvalidInput(_))
        ));
        assert!(state.tabs.is_empty());
    }

    #[test]
    fn test_set_active_tab_allows_dangling_key() {
        let mut state = State::default();
        set_active_tab(&mut state, "nowhere");
        assert_eq!(state.active_tab_key, "nowhere");
        assert_eq!(state.tabs.len(), 1);
    }

    #[test]
    fn test_apply_scenario() {
        let mut state = State::default();

        let outcome = apply(
            &mut state,
            Command::AddComponent {
                key: "home".to_string(),
                kind: "table".to_string(),
                data: json!({"x": 1}),
            },
        )
        .unwrap();
        assert!(matches!(outcome, Outcome::Tab(ref tab) if tab.components.len() == 1));

        let outcome = apply(&mut state, Command::MergeInto { key: "reports".to_string() }).unwrap();
        let Outcome::State(merged) = outcome else {
            panic!("merge should return the document");
        };
        assert_eq!(merged.tab("reports").unwrap().components.len(), 1);
        assert_eq!(merged.tab("home").unwrap().components.len(), 0);

        let outcome =
            apply(&mut state, Command::SetActiveTab { key: "reports".to_string() }).unwrap();
        assert_eq!(outcome, Outcome::Done);
        assert_eq!(state.active_tab_key, "reports");
    }
}
