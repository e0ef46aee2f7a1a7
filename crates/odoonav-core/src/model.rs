use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

pub const WINDOW_ACTION_MODEL: &str = "ir.actions.act_window";
pub const CLIENT_ACTION_MODEL: &str = "ir.actions.client";
pub const MENU_MODEL: &str = "ir.ui.menu";
pub const DASHBOARD_TAG: &str = "board";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    Navigation,
    Unknown,
}

impl IntentKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Navigation => "navigation",
            Self::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    pub kind: IntentKind,
    pub entity: String,
    pub record_kind: Option<String>,
    pub navigation_targets: Vec<String>,
    pub original_input: String,
}

impl Intent {
    pub fn unknown(original_input: impl Into<String>) -> Self {
        Self {
            kind: IntentKind::Unknown,
            entity: String::new(),
            record_kind: None,
            navigation_targets: Vec::new(),
            original_input: original_input.into(),
        }
    }

    pub fn navigation(
        entity: impl Into<String>,
        navigation_targets: Vec<String>,
        record_kind: Option<String>,
        original_input: impl Into<String>,
    ) -> Self {
        Self {
            kind: IntentKind::Navigation,
            entity: entity.into(),
            record_kind,
            navigation_targets,
            original_input: original_input.into(),
        }
    }

    pub fn is_navigation(&self) -> bool {
        self.kind == IntentKind::Navigation
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionKind {
    Window,
    Client,
    Other(String),
}

impl ActionKind {
    pub fn from_model(model: &str) -> Self {
        match model {
            WINDOW_ACTION_MODEL => Self::Window,
            CLIENT_ACTION_MODEL => Self::Client,
            other => Self::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionPointer {
    pub kind: ActionKind,
    pub id: i64,
}

/// A menu's action reference, in either of the encodings the store produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionRef {
    Pair { kind: String, id: i64 },
    Encoded(String),
}

impl ActionRef {
    /// Reads the raw `action` field of a menu record. `false`, `null` and any other
    /// shape mean the menu has no action.
    pub fn from_value(raw: &Value) -> Option<Self> {
        match raw {
            Value::String(encoded) if !encoded.trim().is_empty() => {
                Some(Self::Encoded(encoded.clone()))
            }
            Value::Array(items) if items.len() >= 2 => {
                let kind = items[0].as_str()?;
                let id = items[1].as_i64()?;
                Some(Self::Pair {
                    kind: kind.to_string(),
                    id,
                })
            }
            _ => None,
        }
    }

    pub fn normalize(&self) -> Option<ActionPointer> {
        let (kind, id) = match self {
            Self::Pair { kind, id } => (kind.trim(), *id),
            Self::Encoded(encoded) => {
                let (kind, id) = encoded.split_once(',')?;
                (kind.trim(), id.trim().parse::<i64>().ok()?)
            }
        };
        if kind.is_empty() || id <= 0 {
            return None;
        }
        Some(ActionPointer {
            kind: ActionKind::from_model(kind),
            id,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuMatch {
    pub id: i64,
    pub name: String,
    pub parent_id: Option<i64>,
    pub action_ref: Option<ActionRef>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WindowAction {
    pub id: i64,
    pub name: String,
    pub res_model: Option<String>,
    pub view_modes: Vec<String>,
    pub domain: Value,
    pub context: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientAction {
    pub id: i64,
    pub name: String,
    pub tag: Option<String>,
    pub context: Value,
    pub params: Value,
}

impl ClientAction {
    pub fn is_dashboard(&self) -> bool {
        self.tag.as_deref() == Some(DASHBOARD_TAG)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ActionDetail {
    Window(WindowAction),
    Client(ClientAction),
}

impl ActionDetail {
    pub fn id(&self) -> i64 {
        match self {
            Self::Window(action) => action.id,
            Self::Client(action) => action.id,
        }
    }
}

/// A menu match whose action reference normalized successfully. `detail` is `None`
/// when the action lookup failed: resolvable, but low detail.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedMenu {
    pub menu: MenuMatch,
    pub action: ActionPointer,
    pub detail: Option<ActionDetail>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub action_id: i64,
    pub menu_id: Option<i64>,
    pub record_kind: Option<String>,
    pub view_type: Option<String>,
    pub dashboard_id: Option<i64>,
    pub company_id: i64,
}

impl ResolvedTarget {
    pub fn render(&self, base_url: &str) -> NavigationUrl {
        let mut fragment = String::new();
        if let Some(dashboard_id) = self.dashboard_id {
            fragment.push_str(&format!(
                "dashboard_id={dashboard_id}&cids={}",
                self.company_id
            ));
            if let Some(menu_id) = self.menu_id {
                fragment.push_str(&format!("&menu_id={menu_id}"));
            }
            fragment.push_str(&format!("&action={}", self.action_id));
        } else {
            fragment.push_str(&format!("action={}", self.action_id));
            if let (Some(kind), Some(view_type)) = (&self.record_kind, &self.view_type) {
                fragment.push_str(&format!("&model={kind}&view_type={view_type}"));
            }
            fragment.push_str(&format!("&cids={}", self.company_id));
            if let Some(menu_id) = self.menu_id {
                fragment.push_str(&format!("&menu_id={menu_id}"));
            }
        }
        NavigationUrl(format!("{}/web#{fragment}", base_url.trim_end_matches('/')))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionTier {
    MenuTarget(usize),
    RecordKind,
    LiteralEntity,
    Root,
}

impl ResolutionTier {
    pub fn label(self) -> &'static str {
        match self {
            Self::MenuTarget(_) => "menu_target",
            Self::RecordKind => "record_kind",
            Self::LiteralEntity => "literal_entity",
            Self::Root => "root",
        }
    }
}

impl fmt::Display for ResolutionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MenuTarget(index) => write!(f, "menu_target[{index}]"),
            other => f.write_str(other.label()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NavigationUrl(String);

impl NavigationUrl {
    pub fn root(base_url: &str) -> Self {
        Self(format!("{}/web", base_url.trim_end_matches('/')))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for NavigationUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
