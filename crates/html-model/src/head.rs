//! The `head` container: singleton slots plus a constrained child policy.
//!
//! `HeadNode` is a typed handle over an arena node with tag `head`. The
//! four singleton slots (base, title, charset meta, canonical link) are
//! created once at construction and identified by their stored `NodeId`,
//! never by scanning children for a tag name. Whether a slot is attached
//! as a child is exactly what the `set_*` operations control.

use crate::arena::DomArena;
use crate::types::{
    HtmlNode, NodeId, DEFAULT_TITLE, DEFAULT_VIEWPORT_CONTENT, HEAD_ALLOWED_CHILDREN,
};
use crate::utils::normalize_name;
use ahash::AHashMap;
use tracing::debug;

/// Insertion rule for a candidate child, resolved once per call from the
/// candidate node. Closed set: the policy in `add_child` matches on this
/// instead of re-inspecting tag strings.
#[derive(Debug, Clone, PartialEq, Eq)]
enum HeadCandidate {
    Base,
    Title,
    CharsetMeta,
    NamedMeta(String),
    CanonicalLink,
    Link,
    Extension,
    Comment,
    Disallowed,
}

impl HeadCandidate {
    fn classify(node: &HtmlNode) -> Self {
        if node.is_comment() {
            return HeadCandidate::Comment;
        }
        if !node.is_element() {
            return HeadCandidate::Disallowed;
        }
        match node.tag_name.as_str() {
            "base" => HeadCandidate::Base,
            "title" => HeadCandidate::Title,
            "meta" => {
                if node.has_attr("charset") {
                    HeadCandidate::CharsetMeta
                } else {
                    let name = normalize_name(node.attr("name").unwrap_or(""));
                    HeadCandidate::NamedMeta(name)
                }
            }
            "link" => {
                let rel = node.attr("rel").unwrap_or("");
                if rel.eq_ignore_ascii_case("canonical") {
                    HeadCandidate::CanonicalLink
                } else {
                    HeadCandidate::Link
                }
            }
            tag if HEAD_ALLOWED_CHILDREN.contains(&tag) => HeadCandidate::Extension,
            _ => HeadCandidate::Disallowed,
        }
    }
}

/// Typed handle for a `head` element and its singleton slots.
#[derive(Debug)]
pub struct HeadNode {
    id: NodeId,
    base: NodeId,
    title: NodeId,
    title_text: NodeId,
    meta_charset: NodeId,
    canonical: NodeId,
    /// Attached named metas, `name` attribute -> node. Mirrors the
    /// child list; used for duplicate detection and lookup.
    meta_names: AHashMap<String, NodeId>,
}

impl HeadNode {
    /// Create a head with the default title and the default viewport
    /// meta, no base and no canonical link.
    pub fn new(arena: &mut DomArena) -> Self {
        Self::with_parts(arena, DEFAULT_TITLE, "", "")
    }

    /// Create a head and apply the three singleton setters with the
    /// given values. Empty strings leave the corresponding slot
    /// detached.
    pub fn with_parts(arena: &mut DomArena, title: &str, canonical: &str, base: &str) -> Self {
        let id = arena.add_node(HtmlNode::new_element("head"));

        let base_id = arena.add_node(HtmlNode::new_element("base"));
        let title_id = arena.add_node(HtmlNode::new_element("title"));
        let title_text = arena.add_node(HtmlNode::new_text(""));
        arena.append_child(title_id, title_text);

        let meta_charset = arena.add_node(HtmlNode::new_element("meta"));

        let mut canonical_link = HtmlNode::new_element("link");
        canonical_link.set_attr("rel", "canonical");
        let canonical_id = arena.add_node(canonical_link);

        let mut head = Self {
            id,
            base: base_id,
            title: title_id,
            title_text,
            meta_charset,
            canonical: canonical_id,
            meta_names: AHashMap::new(),
        };
        head.set_title(arena, Some(title));
        head.set_canonical(arena, Some(canonical));
        head.set_base(arena, Some(base));
        head.add_meta(arena, "viewport", DEFAULT_VIEWPORT_CONTENT, false);
        head
    }

    /// The head element's node id.
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn base_node(&self) -> NodeId {
        self.base
    }

    pub fn title_node(&self) -> NodeId {
        self.title
    }

    pub fn charset_node(&self) -> NodeId {
        self.meta_charset
    }

    pub fn canonical_node(&self) -> NodeId {
        self.canonical
    }

    /// Add a free-form child. Returns false without structural change
    /// when the candidate violates the containment policy:
    /// - tag outside the allowed set
    /// - `base` or `title` (singleton slots, use the setters)
    /// - `meta` carrying a `charset` attribute (use `set_charset`)
    /// - `link` with `rel=canonical` (use `set_canonical`)
    /// - `meta` whose `name` duplicates an attached one
    pub fn add_child(&mut self, arena: &mut DomArena, child_id: NodeId) -> bool {
        let Ok(node) = arena.get(child_id) else {
            return false;
        };
        match HeadCandidate::classify(node) {
            HeadCandidate::Disallowed
            | HeadCandidate::Base
            | HeadCandidate::Title
            | HeadCandidate::CharsetMeta
            | HeadCandidate::CanonicalLink => {
                debug!(child_id, "head rejected child");
                false
            }
            HeadCandidate::NamedMeta(name) => {
                if !name.is_empty() && (name == "charset" || self.meta_names.contains_key(&name)) {
                    debug!(child_id, name = %name, "head rejected duplicate meta");
                    return false;
                }
                if !arena.append_child(self.id, child_id) {
                    return false;
                }
                if !name.is_empty() {
                    self.meta_names.insert(name, child_id);
                }
                true
            }
            HeadCandidate::Link | HeadCandidate::Extension | HeadCandidate::Comment => {
                arena.append_child(self.id, child_id)
            }
        }
    }

    /// Set or remove the page title.
    ///
    /// `None` detaches the title node and clears its text, returning
    /// true only if it was attached. A non-empty trimmed value attaches
    /// the title node (never duplicating it) and overwrites its text.
    pub fn set_title(&mut self, arena: &mut DomArena, title: Option<&str>) -> bool {
        match title {
            None => {
                if !arena.has_child(self.id, self.title) {
                    return false;
                }
                arena.detach(self.id, self.title);
                if let Ok(text) = arena.get_mut(self.title_text) {
                    text.text.clear();
                }
                true
            }
            Some(raw) => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return false;
                }
                if !arena.has_child(self.id, self.title) {
                    arena.append_child(self.id, self.title);
                }
                if let Ok(text) = arena.get_mut(self.title_text) {
                    text.text = trimmed.to_string();
                }
                true
            }
        }
    }

    /// Title text, empty string when unset.
    pub fn title(&self, arena: &DomArena) -> String {
        arena
            .get(self.title_text)
            .map(|n| n.text.clone())
            .unwrap_or_default()
    }

    pub fn set_base(&mut self, arena: &mut DomArena, url: Option<&str>) -> bool {
        let slot = self.base;
        self.set_slot(arena, slot, "href", url)
    }

    /// Base URL, if the base slot carries one.
    pub fn base_url(&self, arena: &DomArena) -> Option<String> {
        self.slot_attr(arena, self.base, "href")
    }

    pub fn set_canonical(&mut self, arena: &mut DomArena, link: Option<&str>) -> bool {
        let slot = self.canonical;
        self.set_slot(arena, slot, "href", link)
    }

    pub fn canonical(&self, arena: &DomArena) -> Option<String> {
        self.slot_attr(arena, self.canonical, "href")
    }

    pub fn set_charset(&mut self, arena: &mut DomArena, charset: Option<&str>) -> bool {
        let slot = self.meta_charset;
        self.set_slot(arena, slot, "charset", charset)
    }

    pub fn charset(&self, arena: &DomArena) -> Option<String> {
        self.slot_attr(arena, self.meta_charset, "charset")
    }

    /// Shared singleton-slot pattern: `None` detaches and clears the
    /// controlling attribute, a non-empty trimmed value (re)attaches the
    /// slot and overwrites the attribute. Attachment is checked by the
    /// slot's identity, so repeated valid calls never duplicate it.
    fn set_slot(
        &mut self,
        arena: &mut DomArena,
        slot: NodeId,
        attr: &str,
        value: Option<&str>,
    ) -> bool {
        match value {
            None => {
                if !arena.has_child(self.id, slot) {
                    return false;
                }
                arena.detach(self.id, slot);
                if let Ok(node) = arena.get_mut(slot) {
                    node.remove_attr(attr);
                }
                true
            }
            Some(raw) => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return false;
                }
                if !arena.has_child(self.id, slot) {
                    arena.append_child(self.id, slot);
                }
                if let Ok(node) = arena.get_mut(slot) {
                    node.set_attr(attr, trimmed);
                }
                true
            }
        }
    }

    fn slot_attr(&self, arena: &DomArena, slot: NodeId, attr: &str) -> Option<String> {
        arena
            .get(slot)
            .ok()
            .and_then(|n| n.attr(attr).map(str::to_string))
    }

    /// Add a named meta tag. The name is trimmed and lowercased; empty
    /// names and `charset` (which has a dedicated slot) are rejected.
    /// When a meta with the name is already attached, the content is
    /// overwritten only if `overwrite` is set.
    pub fn add_meta(
        &mut self,
        arena: &mut DomArena,
        name: &str,
        content: &str,
        overwrite: bool,
    ) -> bool {
        let name = normalize_name(name);
        if name.is_empty() || name == "charset" {
            return false;
        }
        if let Some(&meta_id) = self.meta_names.get(&name) {
            if !overwrite {
                return false;
            }
            if let Ok(node) = arena.get_mut(meta_id) {
                node.set_attr("content", content);
                return true;
            }
            return false;
        }
        let mut meta = HtmlNode::new_element("meta");
        meta.set_attr("name", &name);
        meta.set_attr("content", content);
        let meta_id = arena.add_node(meta);
        if !arena.append_child(self.id, meta_id) {
            return false;
        }
        self.meta_names.insert(name, meta_id);
        true
    }

    /// Check for an attached meta by name. `"charset"` resolves to the
    /// charset slot.
    pub fn has_meta(&self, arena: &DomArena, name: &str) -> bool {
        let name = normalize_name(name);
        if name == "charset" {
            return arena.has_child(self.id, self.meta_charset);
        }
        self.meta_names.contains_key(&name)
    }

    /// Look up an attached meta node by name. `"charset"` resolves to
    /// the charset slot, present only while attached.
    pub fn get_meta(&self, arena: &DomArena, name: &str) -> Option<NodeId> {
        let name = normalize_name(name);
        if name == "charset" {
            return arena
                .has_child(self.id, self.meta_charset)
                .then_some(self.meta_charset);
        }
        self.meta_names.get(&name).copied()
    }

    /// Add a stylesheet link. `rel` and `href` keys in `extra_attrs`
    /// are ignored.
    pub fn add_css(&mut self, arena: &mut DomArena, href: &str, extra_attrs: &[(&str, &str)]) -> bool {
        let trimmed = href.trim();
        if trimmed.is_empty() {
            return false;
        }
        let mut link = HtmlNode::new_element("link");
        link.set_attr("rel", "stylesheet");
        apply_extra_attrs(&mut link, extra_attrs, &["rel", "href"]);
        link.set_attr("href", trimmed);
        let link_id = arena.add_node(link);
        self.add_child(arena, link_id)
    }

    /// Add a JavaScript source. `type` and `src` keys in `extra_attrs`
    /// are ignored.
    pub fn add_js(&mut self, arena: &mut DomArena, src: &str, extra_attrs: &[(&str, &str)]) -> bool {
        let trimmed = src.trim();
        if trimmed.is_empty() {
            return false;
        }
        let mut script = HtmlNode::new_element("script");
        script.set_attr("type", "text/javascript");
        apply_extra_attrs(&mut script, extra_attrs, &["type", "src"]);
        script.set_attr("src", trimmed);
        let script_id = arena.add_node(script);
        self.add_child(arena, script_id)
    }

    /// Add a `link` node. `rel=canonical` must go through
    /// `set_canonical` and is rejected here.
    pub fn add_link(
        &mut self,
        arena: &mut DomArena,
        rel: &str,
        href: &str,
        extra_attrs: &[(&str, &str)],
    ) -> bool {
        let rel = normalize_name(rel);
        let href = href.trim();
        if rel.is_empty() || href.is_empty() || rel == "canonical" {
            return false;
        }
        let mut link = HtmlNode::new_element("link");
        link.set_attr("rel", &rel);
        link.set_attr("href", href);
        apply_extra_attrs(&mut link, extra_attrs, &["rel", "href"]);
        let link_id = arena.add_node(link);
        self.add_child(arena, link_id)
    }

    /// Add an alternate-language link.
    pub fn add_alternate(
        &mut self,
        arena: &mut DomArena,
        url: &str,
        lang: &str,
        extra_attrs: &[(&str, &str)],
    ) -> bool {
        let url = url.trim();
        let lang = lang.trim();
        if url.is_empty() || lang.is_empty() {
            return false;
        }
        let mut link = HtmlNode::new_element("link");
        link.set_attr("rel", "alternate");
        link.set_attr("hreflang", lang);
        link.set_attr("href", url);
        apply_extra_attrs(&mut link, extra_attrs, &["rel", "hreflang", "href"]);
        let link_id = arena.add_node(link);
        self.add_child(arena, link_id)
    }

    /// All stylesheet links, in child order. Snapshot; later mutations
    /// of the head do not affect the returned list.
    pub fn css_nodes(&self, arena: &DomArena) -> Vec<NodeId> {
        self.filter_children(arena, |n| {
            n.is_tag("link") && n.attr("rel") == Some("stylesheet")
        })
    }

    /// All JavaScript script tags, in child order.
    pub fn js_nodes(&self, arena: &DomArena) -> Vec<NodeId> {
        self.filter_children(arena, |n| {
            n.is_tag("script") && n.attr("type") == Some("text/javascript")
        })
    }

    /// All attached meta tags, in child order.
    pub fn meta_nodes(&self, arena: &DomArena) -> Vec<NodeId> {
        self.filter_children(arena, |n| n.is_tag("meta"))
    }

    /// All alternate links, in child order.
    pub fn alternates(&self, arena: &DomArena) -> Vec<NodeId> {
        self.filter_children(arena, |n| {
            n.is_tag("link") && n.attr("rel") == Some("alternate")
        })
    }

    fn filter_children<F>(&self, arena: &DomArena, predicate: F) -> Vec<NodeId>
    where
        F: Fn(&HtmlNode) -> bool,
    {
        let Ok(node) = arena.get(self.id) else {
            return Vec::new();
        };
        node.children_ids
            .iter()
            .copied()
            .filter(|&child_id| arena.get(child_id).map(&predicate).unwrap_or(false))
            .collect()
    }
}

fn apply_extra_attrs(node: &mut HtmlNode, extra_attrs: &[(&str, &str)], reserved: &[&str]) {
    for (name, value) in extra_attrs {
        let name = normalize_name(name);
        if name.is_empty() || reserved.contains(&name.as_str()) {
            continue;
        }
        node.set_attr(&name, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NodeType;

    fn head_children_with_tag(arena: &DomArena, head: &HeadNode, tag: &str) -> usize {
        arena
            .children(head.id())
            .unwrap()
            .iter()
            .filter(|n| n.is_tag(tag))
            .count()
    }

    #[test]
    fn test_default_head() {
        let mut arena = DomArena::new();
        let head = HeadNode::new(&mut arena);

        assert_eq!(head.title(&arena), "Default");
        assert_eq!(head.base_url(&arena), None);
        assert_eq!(head.canonical(&arena), None);
        assert_eq!(head.charset(&arena), None);
        assert!(head.css_nodes(&arena).is_empty());
        assert!(head.js_nodes(&arena).is_empty());
        assert!(head.alternates(&arena).is_empty());

        // Exactly one auto-added meta: the viewport.
        let metas = head.meta_nodes(&arena);
        assert_eq!(metas.len(), 1);
        let viewport = arena.get(metas[0]).unwrap();
        assert_eq!(viewport.attr("name"), Some("viewport"));
        assert_eq!(viewport.attr("content"), Some(DEFAULT_VIEWPORT_CONTENT));
    }

    #[test]
    fn test_title_round_trip() {
        let mut arena = DomArena::new();
        let mut head = HeadNode::new(&mut arena);

        assert!(head.set_title(&mut arena, Some("  Hello Page  ")));
        assert_eq!(head.title(&arena), "Hello Page");

        assert!(head.set_title(&mut arena, None));
        assert_eq!(head.title(&arena), "");
        assert!(!head.set_title(&mut arena, None));
    }

    #[test]
    fn test_title_never_duplicated() {
        let mut arena = DomArena::new();
        let mut head = HeadNode::new(&mut arena);

        assert!(head.set_title(&mut arena, Some("First")));
        assert!(head.set_title(&mut arena, Some("Second")));
        assert_eq!(head.title(&arena), "Second");
        assert_eq!(head_children_with_tag(&arena, &head, "title"), 1);
    }

    #[test]
    fn test_blank_title_rejected() {
        let mut arena = DomArena::new();
        let mut head = HeadNode::new(&mut arena);

        assert!(!head.set_title(&mut arena, Some("   ")));
        assert_eq!(head.title(&arena), "Default");
    }

    #[test]
    fn test_base_and_canonical_slots() {
        let mut arena = DomArena::new();
        let mut head = HeadNode::new(&mut arena);

        assert!(head.set_base(&mut arena, Some("https://example.com/")));
        assert_eq!(head.base_url(&arena).as_deref(), Some("https://example.com/"));
        assert!(head.set_base(&mut arena, Some("https://other.example/")));
        assert_eq!(head_children_with_tag(&arena, &head, "base"), 1);

        assert!(head.set_canonical(&mut arena, Some("https://example.com/page")));
        assert_eq!(
            head.canonical(&arena).as_deref(),
            Some("https://example.com/page")
        );

        assert!(head.set_base(&mut arena, None));
        assert_eq!(head.base_url(&arena), None);
        assert_eq!(head_children_with_tag(&arena, &head, "base"), 0);
        assert!(!head.set_base(&mut arena, None));
    }

    #[test]
    fn test_charset_slot() {
        let mut arena = DomArena::new();
        let mut head = HeadNode::new(&mut arena);

        assert!(!head.has_meta(&arena, "charset"));
        assert!(head.set_charset(&mut arena, Some(" UTF-8 ")));
        assert_eq!(head.charset(&arena).as_deref(), Some("UTF-8"));
        assert!(head.has_meta(&arena, "charset"));
        assert_eq!(head.get_meta(&arena, "charset"), Some(head.charset_node()));

        assert!(head.set_charset(&mut arena, None));
        assert_eq!(head.charset(&arena), None);
        assert_eq!(head.get_meta(&arena, "charset"), None);
    }

    #[test]
    fn test_add_child_rejects_charset_meta() {
        let mut arena = DomArena::new();
        let mut head = HeadNode::new(&mut arena);

        let mut meta = HtmlNode::new_element("meta");
        meta.set_attr("charset", "UTF-8");
        let meta_id = arena.add_node(meta);

        assert!(!head.add_child(&mut arena, meta_id));
        assert!(!head.meta_nodes(&arena).contains(&meta_id));
    }

    #[test]
    fn test_add_child_policy() {
        let mut arena = DomArena::new();
        let mut head = HeadNode::new(&mut arena);

        let base = arena.add_node(HtmlNode::new_element("base"));
        assert!(!head.add_child(&mut arena, base));
        let title = arena.add_node(HtmlNode::new_element("title"));
        assert!(!head.add_child(&mut arena, title));
        let div = arena.add_node(HtmlNode::new_element("div"));
        assert!(!head.add_child(&mut arena, div));

        let mut canonical = HtmlNode::new_element("link");
        canonical.set_attr("rel", "canonical");
        let canonical_id = arena.add_node(canonical);
        assert!(!head.add_child(&mut arena, canonical_id));

        let script = arena.add_node(HtmlNode::new_element("script"));
        assert!(head.add_child(&mut arena, script));
        let noscript = arena.add_node(HtmlNode::new_element("noscript"));
        assert!(head.add_child(&mut arena, noscript));
        let comment = arena.add_node(HtmlNode::new_comment("generated"));
        assert!(head.add_child(&mut arena, comment));

        let children = arena.children(head.id()).unwrap();
        assert!(children
            .iter()
            .any(|n| n.node_type == NodeType::Comment && n.text == "generated"));
    }

    #[test]
    fn test_add_child_rejects_duplicate_named_meta() {
        let mut arena = DomArena::new();
        let mut head = HeadNode::new(&mut arena);

        let mut meta = HtmlNode::new_element("meta");
        meta.set_attr("name", "viewport");
        meta.set_attr("content", "whatever");
        let meta_id = arena.add_node(meta);

        assert!(!head.add_child(&mut arena, meta_id));
        assert_eq!(head.meta_nodes(&arena).len(), 1);
    }

    #[test]
    fn test_add_meta() {
        let mut arena = DomArena::new();
        let mut head = HeadNode::new(&mut arena);

        assert!(head.add_meta(&mut arena, "Description", "a page", false));
        assert!(head.has_meta(&arena, "description"));
        assert!(!head.add_meta(&mut arena, "description", "other", false));
        assert!(head.add_meta(&mut arena, "description", "other", true));

        let meta_id = head.get_meta(&arena, "description").unwrap();
        assert_eq!(arena.get(meta_id).unwrap().attr("content"), Some("other"));

        assert!(!head.add_meta(&mut arena, "  ", "x", false));
        assert!(!head.add_meta(&mut arena, "charset", "UTF-8", false));
    }

    #[test]
    fn test_add_css_and_js() {
        let mut arena = DomArena::new();
        let mut head = HeadNode::new(&mut arena);

        assert!(head.add_css(&mut arena, "style.css", &[("media", "print"), ("rel", "nope")]));
        assert!(!head.add_css(&mut arena, "  ", &[]));

        let css = head.css_nodes(&arena);
        assert_eq!(css.len(), 1);
        let link = arena.get(css[0]).unwrap();
        assert_eq!(link.attr("rel"), Some("stylesheet"));
        assert_eq!(link.attr("href"), Some("style.css"));
        assert_eq!(link.attr("media"), Some("print"));

        assert!(head.add_js(&mut arena, "app.js", &[("defer", "")]));
        let js = head.js_nodes(&arena);
        assert_eq!(js.len(), 1);
        let script = arena.get(js[0]).unwrap();
        assert_eq!(script.attr("type"), Some("text/javascript"));
        assert_eq!(script.attr("src"), Some("app.js"));
        assert!(script.has_attr("defer"));
    }

    #[test]
    fn test_add_link_rejects_canonical() {
        let mut arena = DomArena::new();
        let mut head = HeadNode::new(&mut arena);

        assert!(!head.add_link(&mut arena, "Canonical", "https://example.com", &[]));
        assert!(head.add_link(&mut arena, "icon", "favicon.ico", &[]));
        assert!(!head.add_link(&mut arena, "", "favicon.ico", &[]));
        assert!(!head.add_link(&mut arena, "icon", "  ", &[]));
    }

    #[test]
    fn test_alternates() {
        let mut arena = DomArena::new();
        let mut head = HeadNode::new(&mut arena);

        assert!(head.add_alternate(&mut arena, "https://example.com/de", "de", &[]));
        assert!(head.add_alternate(&mut arena, "https://example.com/fr", "fr", &[]));
        assert!(!head.add_alternate(&mut arena, "", "de", &[]));

        let alternates = head.alternates(&arena);
        assert_eq!(alternates.len(), 2);
        let first = arena.get(alternates[0]).unwrap();
        assert_eq!(first.attr("hreflang"), Some("de"));
    }

    #[test]
    fn test_views_are_snapshots() {
        let mut arena = DomArena::new();
        let mut head = HeadNode::new(&mut arena);

        let before = head.css_nodes(&arena);
        assert!(head.add_css(&mut arena, "late.css", &[]));
        assert!(before.is_empty());
        assert_eq!(head.css_nodes(&arena).len(), 1);
    }
}
