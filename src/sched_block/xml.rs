//! Reading the few fields the sweep needs from a scheduling-block XML.
//!
//! Paths are resolved against the document root and every step must match
//! exactly one element; anything else means the file is not a scheduling
//! block we understand.

use crate::sched_block::{SchedBlockError, SkyPosition};

use roxmltree::{Document, Node};
use std::fs;
use std::path::Path;

pub const SCHED_BLOCK_NS: &str = "Alma/ObsPrep/SchedBlock";
pub const OBS_PROJECT_NS: &str = "Alma/ObsPrep/ObsProject";
pub const VALUE_TYPES_NS: &str = "Alma/ValueTypes";

const REPRESENTATIVE_COORDINATES: &[(&str, &str)] = &[
    (SCHED_BLOCK_NS, "SchedulingConstraints"),
    (SCHED_BLOCK_NS, "representativeCoordinates"),
];
const SB_NAME: &[(&str, &str)] = &[(OBS_PROJECT_NS, "name")];

/// A scheduling-block document held in memory.
#[derive(Debug, Clone)]
pub struct SchedBlockXml {
    text: String,
}

impl SchedBlockXml {
    pub fn from_file(path: &Path) -> Result<Self, SchedBlockError> {
        let text = fs::read_to_string(path).map_err(|source| SchedBlockError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_text(text)
    }

    /// Checks well-formedness up front so later lookups only fail on content.
    pub fn from_text(text: impl Into<String>) -> Result<Self, SchedBlockError> {
        let text = text.into();
        Document::parse(&text)?;
        Ok(Self { text })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    fn document(&self) -> Result<Document<'_>, SchedBlockError> {
        Ok(Document::parse(&self.text)?)
    }

    /// The block's representative sky position.
    pub fn representative_position(&self) -> Result<SkyPosition, SchedBlockError> {
        let doc = self.document()?;
        let coords = find_unique(doc.root_element(), REPRESENTATIVE_COORDINATES)?;
        Ok(SkyPosition {
            ra_deg: read_angle_deg(coords, "longitude")?,
            dec_deg: read_angle_deg(coords, "latitude")?,
        })
    }

    /// The block's name as entered in the observing tool.
    pub fn name(&self) -> Result<String, SchedBlockError> {
        let doc = self.document()?;
        let node = find_unique(doc.root_element(), SB_NAME)?;
        Ok(node.text().unwrap_or_default().trim().to_string())
    }
}

fn describe(path: &[(&str, &str)]) -> String {
    path.iter()
        .map(|(_, name)| *name)
        .collect::<Vec<_>>()
        .join("/")
}

fn child_elements<'a, 'input>(
    node: Node<'a, 'input>,
    ns: &'a str,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children().filter(move |c| {
        c.is_element() && c.tag_name().namespace() == Some(ns) && c.tag_name().name() == name
    })
}

fn find_unique<'a, 'input>(
    root: Node<'a, 'input>,
    path: &[(&'a str, &'a str)],
) -> Result<Node<'a, 'input>, SchedBlockError> {
    let mut current = vec![root];
    for &(ns, name) in path {
        current = current
            .into_iter()
            .flat_map(move |n| child_elements(n, ns, name))
            .collect();
    }
    match current.as_slice() {
        [node] => Ok(*node),
        other => Err(SchedBlockError::ElementCount {
            tag: describe(path),
            count: other.len(),
        }),
    }
}

fn read_angle_deg(coords: Node<'_, '_>, key: &str) -> Result<f64, SchedBlockError> {
    let element = child_elements(coords, VALUE_TYPES_NS, key)
        .next()
        .ok_or_else(|| SchedBlockError::MissingElement(key.to_string()))?;

    let unit = element.attribute("unit").unwrap_or_default();
    if unit != "deg" {
        return Err(SchedBlockError::BadUnit {
            tag: key.to_string(),
            unit: unit.to_string(),
        });
    }

    let value = element.text().unwrap_or_default().trim();
    value.parse().map_err(|_| SchedBlockError::BadNumber {
        tag: key.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// A minimal scheduling block with the given name and coordinates.
    pub(crate) fn sched_block_xml(name: &str, ra: f64, dec: f64) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<sbl:SchedBlock xmlns:sbl="Alma/ObsPrep/SchedBlock" xmlns:prj="Alma/ObsPrep/ObsProject" xmlns:val="Alma/ValueTypes">
  <prj:name>{name}</prj:name>
  <sbl:SchedulingConstraints>
    <sbl:representativeFrequency unit="GHz">230.5</sbl:representativeFrequency>
    <sbl:representativeCoordinates system="J2000" type="ABSOLUTE">
      <val:longitude unit="deg">{ra}</val:longitude>
      <val:latitude unit="deg">{dec}</val:latitude>
    </sbl:representativeCoordinates>
  </sbl:SchedulingConstraints>
</sbl:SchedBlock>
"#
        )
    }

    #[test]
    fn reads_position_and_name() {
        let xml = SchedBlockXml::from_text(sched_block_xml("G022.25_a_09_7M", 277.9, -9.6)).unwrap();
        assert_eq!(
            xml.representative_position().unwrap(),
            SkyPosition {
                ra_deg: 277.9,
                dec_deg: -9.6
            }
        );
        assert_eq!(xml.name().unwrap(), "G022.25_a_09_7M");
    }

    #[test]
    fn namespace_prefix_does_not_matter() {
        let text = r#"<SchedBlock xmlns="Alma/ObsPrep/SchedBlock" xmlns:v="Alma/ValueTypes">
  <SchedulingConstraints>
    <representativeCoordinates>
      <v:longitude unit="deg">10</v:longitude>
      <v:latitude unit="deg">-30.5</v:latitude>
    </representativeCoordinates>
  </SchedulingConstraints>
</SchedBlock>"#;
        let xml = SchedBlockXml::from_text(text).unwrap();
        assert_eq!(xml.representative_position().unwrap().dec_deg, -30.5);
    }

    #[test]
    fn duplicated_coordinates_are_rejected() {
        let text = r#"<sbl:SchedBlock xmlns:sbl="Alma/ObsPrep/SchedBlock">
  <sbl:SchedulingConstraints><sbl:representativeCoordinates/></sbl:SchedulingConstraints>
  <sbl:SchedulingConstraints><sbl:representativeCoordinates/></sbl:SchedulingConstraints>
</sbl:SchedBlock>"#;
        let err = SchedBlockXml::from_text(text)
            .unwrap()
            .representative_position()
            .unwrap_err();
        assert!(matches!(err, SchedBlockError::ElementCount { count: 2, .. }));
    }

    #[test]
    fn missing_name_and_wrong_unit() {
        let text = r#"<sbl:SchedBlock xmlns:sbl="Alma/ObsPrep/SchedBlock" xmlns:val="Alma/ValueTypes">
  <sbl:SchedulingConstraints>
    <sbl:representativeCoordinates>
      <val:longitude unit="rad">1.0</val:longitude>
      <val:latitude unit="deg">0.1</val:latitude>
    </sbl:representativeCoordinates>
  </sbl:SchedulingConstraints>
</sbl:SchedBlock>"#;
        let xml = SchedBlockXml::from_text(text).unwrap();
        assert!(matches!(xml.name(), Err(SchedBlockError::ElementCount { count: 0, .. })));
        assert!(matches!(
            xml.representative_position(),
            Err(SchedBlockError::BadUnit { .. })
        ));
    }

    #[test]
    fn malformed_xml_fails_early() {
        assert!(matches!(
            SchedBlockXml::from_text("<sbl:SchedBlock>"),
            Err(SchedBlockError::Parse(_))
        ));
    }
}
