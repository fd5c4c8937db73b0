//! # Logical Type Resolver
//!
//! Resolves a feed element's dispatch key. An element's *logical* type is
//! its tag name unless the element carries an `xsi:type` override from the
//! schema, in which case the override wins. Comment nodes have no
//! resolvable type.
//!
//! Also provides subtree search by logical type and the end-order traversal
//! used by the dispatcher.

use roxmltree::Node;

/// The XML Schema namespace, used by schema-tree tags.
pub const XSCHEMA_NS: &str = "http://www.w3.org/2001/XMLSchema";

/// The XML Schema instance namespace, carrying the `type` override attribute.
pub const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Resolve an element's dispatch key.
///
/// Returns the `xsi:type` attribute value when present, otherwise the
/// element's own tag name. Non-element nodes (comments, text, processing
/// instructions) yield `None`.
pub fn resolve_type<'a>(node: Node<'a, '_>) -> Option<&'a str> {
    if !node.is_element() {
        return None;
    }
    match node.attribute((XSI_NS, "type")) {
        Some(override_type) => Some(override_type),
        None => Some(node.tag_name().name()),
    }
}

/// The local tag name of a schema-tree element, with the XSD namespace
/// wrapper stripped. Comment nodes yield `None`.
pub fn strip_schema_ns<'a>(node: Node<'a, '_>) -> Option<&'a str> {
    if !node.is_element() {
        return None;
    }
    Some(node.tag_name().name())
}

/// Every descendant of `root` whose logical type is `name`: elements whose
/// tag name literally equals `name`, followed by elements whose `xsi:type`
/// override equals `name`.
///
/// The two matching strategies are not mutually exclusive — an element can
/// be returned via both paths. Callers that need distinct elements must
/// deduplicate.
pub fn find_by_type<'a, 'input>(root: Node<'a, 'input>, name: &str) -> Vec<Node<'a, 'input>> {
    let mut found: Vec<Node<'a, 'input>> = root
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == name)
        .collect();
    found.extend(
        root.descendants()
            .filter(|n| n.is_element() && n.attribute((XSI_NS, "type")) == Some(name)),
    );
    found
}

/// First direct child element with the given tag name.
pub fn find_child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|c| c.is_element() && c.tag_name().name() == name)
}

/// The 1-based source line of a node in its document.
pub fn source_line(node: Node<'_, '_>) -> u32 {
    node.document().text_pos_at(node.range().start).row
}

/// Visit every element under `node` in end order: each element is visited
/// after all of its children. Stateful per-element rules rely on this
/// ordering.
pub fn walk_post_order<'a, 'input, F>(node: Node<'a, 'input>, visit: &mut F)
where
    F: FnMut(Node<'a, 'input>),
{
    for child in node.children() {
        walk_post_order(child, visit);
    }
    if node.is_element() {
        visit(node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roxmltree::Document;

    const FEED: &str = r#"<ElectionReport xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <ContestCollection>
    <Contest xsi:type="CandidateContest" objectId="con-1"/>
    <Contest objectId="con-2"/>
  </ContestCollection>
  <!-- a comment -->
  <CandidateContest objectId="con-3"/>
</ElectionReport>"#;

    #[test]
    fn override_wins_over_tag_name() {
        let doc = Document::parse(FEED).unwrap();
        let contest = doc
            .descendants()
            .find(|n| n.attribute("objectId") == Some("con-1"))
            .unwrap();
        assert_eq!(resolve_type(contest), Some("CandidateContest"));
    }

    #[test]
    fn tag_name_used_without_override() {
        let doc = Document::parse(FEED).unwrap();
        let contest = doc
            .descendants()
            .find(|n| n.attribute("objectId") == Some("con-2"))
            .unwrap();
        assert_eq!(resolve_type(contest), Some("Contest"));
    }

    #[test]
    fn comments_have_no_type() {
        let doc = Document::parse(FEED).unwrap();
        let comment = doc.descendants().find(|n| n.is_comment()).unwrap();
        assert_eq!(resolve_type(comment), None);
        assert_eq!(strip_schema_ns(comment), None);
    }

    #[test]
    fn find_by_type_unions_tag_and_override_matches() {
        let doc = Document::parse(FEED).unwrap();
        let found = find_by_type(doc.root(), "CandidateContest");
        let ids: Vec<_> = found
            .iter()
            .filter_map(|n| n.attribute("objectId"))
            .collect();
        assert!(ids.contains(&"con-1"));
        assert!(ids.contains(&"con-3"));
        assert!(!ids.contains(&"con-2"));
    }

    #[test]
    fn find_by_type_may_return_an_element_twice() {
        // Tag name and override both match; both paths yield the element.
        let xml = r#"<Root xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <Contest xsi:type="Contest" objectId="c"/>
</Root>"#;
        let doc = Document::parse(xml).unwrap();
        let found = find_by_type(doc.root(), "Contest");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0], found[1]);
    }

    #[test]
    fn strip_schema_ns_returns_local_name() {
        let xml = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="ElectionReport"/>
</xs:schema>"#;
        let doc = Document::parse(xml).unwrap();
        let element = doc
            .descendants()
            .find(|n| n.is_element() && n.tag_name().name() == "element")
            .unwrap();
        assert_eq!(strip_schema_ns(element), Some("element"));
        assert_eq!(element.tag_name().namespace(), Some(XSCHEMA_NS));
    }

    #[test]
    fn post_order_visits_children_before_parents() {
        let doc = Document::parse(FEED).unwrap();
        let mut order = Vec::new();
        walk_post_order(doc.root(), &mut |n| {
            order.push(n.tag_name().name().to_string());
        });
        let contest = order.iter().position(|t| t == "Contest").unwrap();
        let collection = order
            .iter()
            .position(|t| t == "ContestCollection")
            .unwrap();
        let report = order.iter().position(|t| t == "ElectionReport").unwrap();
        assert!(contest < collection);
        assert!(collection < report);
    }

    #[test]
    fn source_line_is_one_based() {
        let doc = Document::parse(FEED).unwrap();
        let root = doc.root_element();
        assert_eq!(source_line(root), 1);
        let collection = find_child(root, "ContestCollection").unwrap();
        assert_eq!(source_line(collection), 2);
    }

    #[test]
    fn find_child_matches_direct_children_only() {
        let doc = Document::parse(FEED).unwrap();
        let root = doc.root_element();
        assert!(find_child(root, "ContestCollection").is_some());
        // Contest is a grandchild, not a child.
        assert!(find_child(root, "Contest").is_none());
    }
}
