//! Admin-panel overlay: makes sure extra admin links exist inside a rendered
//! page, given the current route and the caller's permissions.
//!
//! The page is modelled as a small element tree. [`OverlayReconciler::reconcile`]
//! is level-triggered: call it after every re-render or navigation and it
//! converges on "affordances present exactly once when allowed".

use std::collections::HashMap;
use std::fmt::Write as _;

use serde::Serialize;
use sqlx::MySqlPool;
use utoipa::ToSchema;

use crate::error::AppResult;
use crate::store::admin_users;

/// Id of the wrapper element holding the injected affordances.
pub const MARKER_ID: &str = "leave-desk-admin-links";
pub const ANCHOR_TEXT: &str = "Admin Panel";

const ANCHOR_TAGS: [&str; 5] = ["h1", "h2", "h3", "div", "span"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Default)]
pub struct Element {
    pub tag: String,
    pub id: Option<String>,
    pub text: String,
    pub href: Option<String>,
    /// Stands in for a non-empty bounding box
    pub visible: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            visible: true,
            ..Default::default()
        }
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn with_href(mut self, href: &str) -> Self {
        self.href = Some(href.to_string());
        self
    }

}

/// Arena-backed element tree. Detached subtrees stay in the arena but are
/// unreachable from the root.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Element>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            nodes: vec![Element::new("body")],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn get(&self, id: NodeId) -> &Element {
        &self.nodes[id.0]
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn append(&mut self, parent: NodeId, mut element: Element) -> NodeId {
        let id = NodeId(self.nodes.len());
        element.parent = Some(parent);
        element.children.clear();
        self.nodes.push(element);
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Detaches `id` (and its subtree) from its parent, as a re-render would.
    #[cfg(test)]
    pub fn remove(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|c| *c != id);
        }
    }

    /// Elements reachable from the root, in document order.
    pub fn descendants(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    pub fn get_by_id(&self, dom_id: &str) -> Option<NodeId> {
        self.descendants()
            .into_iter()
            .find(|n| self.get(*n).id.as_deref() == Some(dom_id))
    }

    /// Own text followed by every descendant's, like `textContent`.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut text = self.get(id).text.clone();
        for child in self.children(id) {
            text.push_str(&self.text_content(*child));
        }
        text
    }

    pub fn to_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_html(id, &mut out);
        out
    }

    fn write_html(&self, id: NodeId, out: &mut String) {
        let el = self.get(id);
        let _ = write!(out, "<{}", el.tag);
        if let Some(dom_id) = &el.id {
            let _ = write!(out, " id=\"{}\"", escape(dom_id));
        }
        if let Some(href) = &el.href {
            let _ = write!(out, " href=\"{}\"", escape(href));
        }
        out.push('>');
        out.push_str(&escape(&el.text));
        for child in self.children(id) {
            self.write_html(*child, out);
        }
        let _ = write!(out, "</{}>", el.tag);
    }
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Route {
    pub path: String,
    pub hash: String,
}

impl Route {
    pub fn new(path: &str, hash: &str) -> Self {
        Self {
            path: path.to_string(),
            hash: hash.to_string(),
        }
    }

    /// The landing page also shows an "Admin Panel" card, so only admin
    /// routes qualify.
    pub fn is_admin_route(&self) -> bool {
        self.path.to_lowercase().contains("admin") || self.hash.to_lowercase().contains("admin")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Affordance {
    Link {
        label: String,
        href: String,
        description: String,
    },
    /// Opens the admin-accounts form in a modal instead of navigating
    ModalButton { label: String, target: String },
}

pub fn affordances() -> Vec<Affordance> {
    vec![
        Affordance::Link {
            label: "Manage Admins".into(),
            href: "/admin-management".into(),
            description: "Add/remove admins, set department access and primary admins.".into(),
        },
        Affordance::Link {
            label: "Admin Dashboard".into(),
            href: "/admin".into(),
            description: "Manage departments, employees, managers and requests.".into(),
        },
        Affordance::ModalButton {
            label: "Quick admin access".into(),
            target: "/admin-management".into(),
        },
    ]
}

fn inject(doc: &mut Document, container: NodeId) -> NodeId {
    let wrap = doc.append(container, Element::new("div").with_id(MARKER_ID));
    for item in affordances() {
        match item {
            Affordance::Link {
                label,
                href,
                description,
            } => {
                doc.append(wrap, Element::new("a").with_text(&label).with_href(&href));
                doc.append(wrap, Element::new("div").with_text(&description));
            }
            Affordance::ModalButton { label, .. } => {
                doc.append(wrap, Element::new("button").with_text(&label));
            }
        }
    }
    wrap
}

/// First visible element whose trimmed text is exactly the anchor text,
/// falling back to the first match.
pub fn find_anchor(doc: &Document) -> Option<NodeId> {
    let candidates: Vec<NodeId> = doc
        .descendants()
        .into_iter()
        .filter(|n| ANCHOR_TAGS.contains(&doc.get(*n).tag.as_str()))
        .filter(|n| doc.text_content(*n).trim() == ANCHOR_TEXT)
        .collect();

    candidates
        .iter()
        .copied()
        .find(|n| doc.get(*n).visible)
        .or_else(|| candidates.first().copied())
}

/// Permission gate for the overlay.
pub trait PrimaryAdminLookup {
    async fn is_primary_admin(&self, email: &str) -> AppResult<bool>;
}

impl PrimaryAdminLookup for MySqlPool {
    async fn is_primary_admin(&self, email: &str) -> AppResult<bool> {
        admin_users::is_primary_admin(self, email).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    NotAdminRoute,
    AlreadyPresent,
    NoAnchor,
    SignedOut,
    Denied,
    LookupFailed,
    Injected(NodeId),
}

#[derive(Debug, Default)]
pub struct OverlayReconciler {
    /// Permission answers per container, until the next navigation
    checked: HashMap<NodeId, bool>,
}

impl OverlayReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Host-page hook for route changes. The affordances endpoint builds a
    /// fresh reconciler per request and never needs it.
    #[allow(dead_code)]
    pub fn on_navigate(&mut self) {
        self.checked.clear();
    }

    pub async fn reconcile<L: PrimaryAdminLookup>(
        &mut self,
        doc: &mut Document,
        route: &Route,
        email: Option<&str>,
        lookup: &L,
    ) -> Outcome {
        if !route.is_admin_route() {
            return Outcome::NotAdminRoute;
        }
        if doc.get_by_id(MARKER_ID).is_some() {
            return Outcome::AlreadyPresent;
        }
        let Some(anchor) = find_anchor(doc) else {
            return Outcome::NoAnchor;
        };
        let container = doc.parent(anchor).unwrap_or(anchor);

        let allowed = match self.checked.get(&container) {
            Some(allowed) => *allowed,
            None => {
                let Some(email) = email else {
                    return Outcome::SignedOut;
                };
                match lookup.is_primary_admin(email).await {
                    Ok(allowed) => {
                        self.checked.insert(container, allowed);
                        allowed
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Overlay permission check failed");
                        return Outcome::LookupFailed;
                    }
                }
            }
        };

        if !allowed {
            return Outcome::Denied;
        }
        Outcome::Injected(inject(doc, container))
    }
}
