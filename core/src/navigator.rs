/// Guided-flow view state machine for the end-user conversation
///
/// Every navigation step is server-driven: the navigator holds only the
/// currently displayed node list, never a cached tree. A server view
/// event always replaces whatever was on screen; views do not stack.
use crate::events::OutboundIntent;
use crate::notify::{Notifier, StateChange};
use crate::outbound::OutboundSink;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Link,
    Info,
    #[serde(alias = "image")]
    Map,
    Submenu,
    Action,
}

impl Default for NodeKind {
    fn default() -> Self {
        NodeKind::Info
    }
}

/// One option of the currently displayed menu level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuNode {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type", default)]
    pub kind: NodeKind,
    /// Target URL, present when the server inlines it on a link node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(rename = "submenu", default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<MenuNode>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalKind {
    Info,
    Link,
    Map,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerminalPayload {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Exactly one view is current at any time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum MenuView {
    /// Nothing displayed yet; the first server view event leaves this state.
    Hidden,
    Root {
        nodes: Vec<MenuNode>,
    },
    Submenu {
        nodes: Vec<MenuNode>,
        parent_label: String,
    },
    Terminal {
        kind: TerminalKind,
        payload: TerminalPayload,
    },
}

pub struct MenuNavigator {
    sink: Arc<dyn OutboundSink>,
    notifier: Notifier,
    view: MenuView,
}

impl MenuNavigator {
    pub fn new(sink: Arc<dyn OutboundSink>, notifier: Notifier) -> Self {
        Self {
            sink,
            notifier,
            view: MenuView::Hidden,
        }
    }

    pub fn view(&self) -> &MenuView {
        &self.view
    }

    fn set_view(&mut self, view: MenuView) {
        self.view = view;
        self.notifier.publish(StateChange::ViewChanged {
            view: self.view.clone(),
        });
    }

    /// An empty node list is a recoverable payload defect, rendered as an
    /// explicit terminal notice instead of a crash.
    fn no_options() -> MenuView {
        MenuView::Terminal {
            kind: TerminalKind::Info,
            payload: TerminalPayload {
                label: "No options available".to_string(),
                text: Some("The menu has no options right now.".to_string()),
                link: None,
                image: None,
            },
        }
    }

    /// Server-pushed top-level menu. Replaces the current view; receiving
    /// it while already at the root is a full re-render, not an error.
    pub fn show_menu(&mut self, nodes: Vec<MenuNode>) {
        if nodes.is_empty() {
            debug!("show_menu with no options");
            self.set_view(Self::no_options());
            return;
        }
        self.set_view(MenuView::Root { nodes });
    }

    pub fn show_submenu(&mut self, nodes: Vec<MenuNode>, parent_label: Option<String>) {
        if nodes.is_empty() {
            debug!("show_submenu with no options");
            self.set_view(Self::no_options());
            return;
        }
        self.set_view(MenuView::Submenu {
            nodes,
            parent_label: parent_label.unwrap_or_default(),
        });
    }

    pub fn show_info(&mut self, label: Option<String>, text: Option<String>) {
        self.set_view(MenuView::Terminal {
            kind: TerminalKind::Info,
            payload: TerminalPayload {
                label: label.unwrap_or_else(|| "Information".to_string()),
                text,
                link: None,
                image: None,
            },
        });
    }

    pub fn show_link(&mut self, label: Option<String>, link: Option<String>) {
        self.set_view(MenuView::Terminal {
            kind: TerminalKind::Link,
            payload: TerminalPayload {
                label: label.unwrap_or_else(|| "Open link".to_string()),
                text: None,
                link,
                image: None,
            },
        });
    }

    pub fn show_map(&mut self, label: Option<String>, image: Option<String>) {
        self.set_view(MenuView::Terminal {
            kind: TerminalKind::Map,
            payload: TerminalPayload {
                label: label.unwrap_or_default(),
                text: None,
                link: None,
                image,
            },
        });
    }

    /// User picked an option. Only meaningful from the root menu or a
    /// submenu; anywhere else the pick is ignored (the server decides what
    /// is on screen, not the renderer).
    pub fn select_option(&self, node_id: &str) {
        let (node, from_submenu) = match &self.view {
            MenuView::Root { nodes } => (nodes.iter().find(|n| n.id == node_id), false),
            MenuView::Submenu { nodes, .. } => (nodes.iter().find(|n| n.id == node_id), true),
            _ => {
                debug!("option {} picked outside a menu view, ignoring", node_id);
                return;
            }
        };
        let Some(node) = node else {
            debug!("option {} not in the displayed menu, ignoring", node_id);
            return;
        };

        if node.kind == NodeKind::Link {
            // Link options resolve locally and are never forwarded.
            match &node.link {
                Some(url) if !url.is_empty() => {
                    self.notifier
                        .publish(StateChange::OpenLink { url: url.clone() });
                }
                _ => debug!("link option {} carries no url", node.id),
            }
            return;
        }

        let intent = if from_submenu {
            OutboundIntent::SubmenuOptionSelected {
                id: node.id.clone(),
            }
        } else {
            OutboundIntent::MenuOptionSelected {
                id: node.id.clone(),
            }
        };
        self.sink.emit(intent);
    }

    /// Ask the server for the top-level menu. The local view changes only
    /// when the fresh `show_menu` arrives.
    pub fn return_to_root(&self) {
        self.sink.emit(OutboundIntent::ReturnToMainMenu);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outbound::RecordingSink;

    fn navigator() -> (MenuNavigator, Arc<RecordingSink>, Notifier) {
        let sink = Arc::new(RecordingSink::new());
        let notifier = Notifier::default();
        (
            MenuNavigator::new(sink.clone(), notifier.clone()),
            sink,
            notifier,
        )
    }

    fn node(id: &str, kind: NodeKind) -> MenuNode {
        MenuNode {
            id: id.to_string(),
            label: id.to_uppercase(),
            kind,
            link: None,
            children: None,
        }
    }

    #[test]
    fn each_view_event_replaces_the_previous_view() {
        let (mut nav, _sink, _notifier) = navigator();
        assert_eq!(nav.view(), &MenuView::Hidden);

        nav.show_menu(vec![node("hours", NodeKind::Info)]);
        assert!(matches!(nav.view(), MenuView::Root { .. }));

        nav.show_submenu(vec![node("careers", NodeKind::Info)], Some("Programs".into()));
        match nav.view() {
            MenuView::Submenu {
                nodes,
                parent_label,
            } => {
                assert_eq!(parent_label, "Programs");
                // The root view's nodes are gone
                assert_eq!(nodes.len(), 1);
                assert_eq!(nodes[0].id, "careers");
            }
            other => panic!("unexpected view: {:?}", other),
        }

        nav.show_info(Some("Hours".into()), Some("Open 9-5".into()));
        assert!(matches!(
            nav.view(),
            MenuView::Terminal {
                kind: TerminalKind::Info,
                ..
            }
        ));
    }

    #[test]
    fn empty_menu_payload_renders_no_options_terminal() {
        let (mut nav, _sink, _notifier) = navigator();
        nav.show_menu(Vec::new());
        match nav.view() {
            MenuView::Terminal { kind, payload } => {
                assert_eq!(*kind, TerminalKind::Info);
                assert_eq!(payload.label, "No options available");
            }
            other => panic!("unexpected view: {:?}", other),
        }
    }

    #[test]
    fn selection_emits_the_matching_level_event() {
        let (mut nav, sink, _notifier) = navigator();
        nav.show_menu(vec![node("a", NodeKind::Submenu)]);
        nav.select_option("a");
        assert_eq!(
            sink.take(),
            vec![OutboundIntent::MenuOptionSelected { id: "a".into() }]
        );

        nav.show_submenu(vec![node("b", NodeKind::Info)], Some("A".into()));
        nav.select_option("b");
        assert_eq!(
            sink.take(),
            vec![OutboundIntent::SubmenuOptionSelected { id: "b".into() }]
        );
    }

    #[test]
    fn link_option_resolves_locally_without_emitting() {
        let (mut nav, sink, notifier) = navigator();
        let mut rx = notifier.subscribe();
        let mut link = node("site", NodeKind::Link);
        link.link = Some("https://example.edu".to_string());
        nav.show_menu(vec![link]);

        nav.select_option("site");
        assert!(sink.take().is_empty());

        // Drain until the OpenLink notification shows up
        loop {
            match rx.try_recv() {
                Ok(StateChange::OpenLink { url }) => {
                    assert_eq!(url, "https://example.edu");
                    break;
                }
                Ok(_) => continue,
                Err(e) => panic!("no OpenLink notification: {:?}", e),
            }
        }
    }

    #[test]
    fn selection_outside_a_menu_view_is_ignored() {
        let (mut nav, sink, _notifier) = navigator();
        nav.select_option("a"); // still hidden
        nav.show_info(None, Some("terminal".into()));
        nav.select_option("a"); // terminal accepts no navigation
        assert!(sink.take().is_empty());
    }

    #[test]
    fn return_to_root_emits_but_does_not_transition() {
        let (mut nav, sink, _notifier) = navigator();
        nav.show_info(Some("Hours".into()), None);
        let before = nav.view().clone();

        nav.return_to_root();
        assert_eq!(sink.take(), vec![OutboundIntent::ReturnToMainMenu]);
        assert_eq!(nav.view(), &before);

        // The server answers with a fresh menu
        nav.show_menu(vec![node("hours", NodeKind::Info)]);
        assert!(matches!(nav.view(), MenuView::Root { .. }));
    }
}
