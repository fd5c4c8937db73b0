//! # Entity & Attribute Statistics
//!
//! Auxiliary counts of the fixed top-level entity catalog and a set of
//! nested attributes per entity. Consumed only for the verbose report
//! section, never for validation decisions.

use std::fmt;
use std::io::{self, Write};

use roxmltree::{Document, Node};

/// The fixed top-level entity catalog and the nested attributes counted for
/// each. An entity instance is an element named `<entity>` somewhere under
/// an `<entity>Collection` element.
const ENTITY_STATS: &[(&str, &[&str])] = &[
    ("Party", &["Name", "Abbreviation", "Color"]),
    ("GpUnit", &["Name", "ComposingGpUnitIds"]),
    ("Office", &["Name", "Term"]),
    ("Person", &["FullName", "PartyId"]),
    ("Candidate", &["BallotName", "PersonId"]),
    ("Contest", &["Name", "ElectoralDistrictId"]),
];

/// Counts for one top-level entity.
#[derive(Debug, Clone)]
pub struct EntityStats {
    /// Entity tag name.
    pub name: &'static str,
    /// Number of entity instances in the feed.
    pub total: usize,
    /// Occurrence count per nested attribute, catalog order.
    pub attribute_counts: Vec<(&'static str, usize)>,
}

impl fmt::Display for EntityStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:8}{}: {}", "", self.name, self.total)?;
        for (attribute, count) in &self.attribute_counts {
            writeln!(f, "{:12}{}: {}", "", attribute, count)?;
        }
        Ok(())
    }
}

fn collection_instances<'a, 'input>(
    doc: &'a Document<'input>,
    entity: &str,
) -> Vec<Node<'a, 'input>> {
    let collection = format!("{entity}Collection");
    doc.descendants()
        .filter(|n| {
            n.is_element()
                && n.tag_name().name() == entity
                && n.ancestors()
                    .any(|a| a.is_element() && a.tag_name().name() == collection)
        })
        .collect()
}

fn count_nested(instance: Node<'_, '_>, attribute: &str) -> usize {
    instance
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == attribute)
        .count()
}

/// Gather statistics for every catalog entity present in the feed.
pub fn gather_stats(doc: &Document<'_>) -> Vec<EntityStats> {
    let mut all = Vec::new();
    for (entity, attributes) in ENTITY_STATS {
        let instances = collection_instances(doc, entity);
        if instances.is_empty() {
            continue;
        }
        let attribute_counts = attributes
            .iter()
            .map(|attribute| {
                let count = instances
                    .iter()
                    .map(|instance| count_nested(*instance, attribute))
                    .sum();
                (*attribute, count)
            })
            .collect();
        all.push(EntityStats {
            name: entity,
            total: instances.len(),
            attribute_counts,
        });
    }
    all
}

/// Print the entity/attribute count table for the feed.
pub fn count_stats<W: Write>(doc: &Document<'_>, out: &mut W) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "     Entity and Attribute Counts:")?;
    for stats in gather_stats(doc) {
        write!(out, "{stats}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<ElectionReport>
  <PartyCollection>
    <Party objectId="par-1">
      <Name>Example Party</Name>
      <Abbreviation>EP</Abbreviation>
    </Party>
    <Party objectId="par-2">
      <Name>Other Party</Name>
    </Party>
  </PartyCollection>
  <PersonCollection>
    <Person objectId="per-1">
      <FullName>Jane Example</FullName>
      <PartyId>par-1</PartyId>
    </Person>
  </PersonCollection>
  <Party objectId="stray">
    <Name>Not in a collection</Name>
  </Party>
</ElectionReport>"#;

    #[test]
    fn counts_only_collection_instances() {
        let doc = Document::parse(FEED).unwrap();
        let stats = gather_stats(&doc);
        let party = stats.iter().find(|s| s.name == "Party").unwrap();
        assert_eq!(party.total, 2);
    }

    #[test]
    fn nested_attributes_are_summed_across_instances() {
        let doc = Document::parse(FEED).unwrap();
        let stats = gather_stats(&doc);
        let party = stats.iter().find(|s| s.name == "Party").unwrap();
        let names = party
            .attribute_counts
            .iter()
            .find(|(a, _)| *a == "Name")
            .unwrap();
        let abbreviations = party
            .attribute_counts
            .iter()
            .find(|(a, _)| *a == "Abbreviation")
            .unwrap();
        assert_eq!(names.1, 2);
        assert_eq!(abbreviations.1, 1);
    }

    #[test]
    fn absent_entities_are_omitted() {
        let doc = Document::parse(FEED).unwrap();
        let stats = gather_stats(&doc);
        assert!(stats.iter().all(|s| s.name != "Contest"));
    }

    #[test]
    fn report_section_renders() {
        let doc = Document::parse(FEED).unwrap();
        let mut out = Vec::new();
        count_stats(&doc, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Entity and Attribute Counts:"));
        assert!(text.contains("Party: 2"));
        assert!(text.contains("FullName: 1"));
    }
}
