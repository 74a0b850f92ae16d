//! ArchiMate layer classification
//!
//! Every ArchiMate element type belongs to one layer of the language.
//! Renderers use the layer to pick the conventional fill and stroke colors.

use std::fmt;

use serde::Serialize;

/// ArchiMate language layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    /// Business layer (actors, processes, services, objects)
    Business,
    /// Application layer (components, data objects)
    Application,
    /// Technology and physical layer
    Technology,
    /// Motivation elements (goals, requirements, principles)
    Motivation,
    /// Strategy elements (capabilities, resources, value streams)
    Strategy,
    /// Implementation and migration elements
    Implementation,
    /// Composite elements, connectors, notes and anything unrecognized
    Other,
}

const BUSINESS: &[&str] = &[
    "BusinessActor",
    "BusinessRole",
    "BusinessCollaboration",
    "BusinessInterface",
    "BusinessProcess",
    "BusinessFunction",
    "BusinessInteraction",
    "BusinessEvent",
    "BusinessService",
    "BusinessObject",
    "Contract",
    "Representation",
    "Product",
];

const APPLICATION: &[&str] = &[
    "ApplicationComponent",
    "ApplicationCollaboration",
    "ApplicationInterface",
    "ApplicationFunction",
    "ApplicationInteraction",
    "ApplicationProcess",
    "ApplicationEvent",
    "ApplicationService",
    "DataObject",
];

const TECHNOLOGY: &[&str] = &[
    "Node",
    "Device",
    "SystemSoftware",
    "TechnologyCollaboration",
    "TechnologyInterface",
    "Path",
    "CommunicationNetwork",
    "CommunicationPath",
    "Network",
    "TechnologyFunction",
    "TechnologyProcess",
    "TechnologyInteraction",
    "TechnologyEvent",
    "TechnologyService",
    "Artifact",
    "Equipment",
    "Facility",
    "DistributionNetwork",
    "Material",
];

const MOTIVATION: &[&str] = &[
    "Stakeholder",
    "Driver",
    "Assessment",
    "Goal",
    "Outcome",
    "Principle",
    "Requirement",
    "Constraint",
    "Meaning",
    "Value",
];

const STRATEGY: &[&str] = &["Resource", "Capability", "ValueStream", "CourseOfAction"];

const IMPLEMENTATION: &[&str] = &[
    "WorkPackage",
    "Deliverable",
    "ImplementationEvent",
    "Plateau",
    "Gap",
];

impl Layer {
    /// Classify an element type name such as `BusinessActor` or `archimate:Node`
    pub fn of(element_type: &str) -> Self {
        let element_type = element_type
            .rsplit(':')
            .next()
            .unwrap_or(element_type);

        let layers: [(Layer, &[&str]); 6] = [
            (Self::Business, BUSINESS),
            (Self::Application, APPLICATION),
            (Self::Technology, TECHNOLOGY),
            (Self::Motivation, MOTIVATION),
            (Self::Strategy, STRATEGY),
            (Self::Implementation, IMPLEMENTATION),
        ];

        layers
            .iter()
            .find(|(_, types)| types.contains(&element_type))
            .map(|(layer, _)| *layer)
            .unwrap_or(Self::Other)
    }

    /// Lowercase layer name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Business => "business",
            Self::Application => "application",
            Self::Technology => "technology",
            Self::Motivation => "motivation",
            Self::Strategy => "strategy",
            Self::Implementation => "implementation",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_of_known_types() {
        assert_eq!(Layer::of("BusinessActor"), Layer::Business);
        assert_eq!(Layer::of("Product"), Layer::Business);
        assert_eq!(Layer::of("DataObject"), Layer::Application);
        assert_eq!(Layer::of("Node"), Layer::Technology);
        assert_eq!(Layer::of("Artifact"), Layer::Technology);
        assert_eq!(Layer::of("Goal"), Layer::Motivation);
        assert_eq!(Layer::of("Capability"), Layer::Strategy);
        assert_eq!(Layer::of("Plateau"), Layer::Implementation);
    }

    #[test]
    fn test_layer_of_prefixed_type() {
        assert_eq!(Layer::of("archimate:ApplicationComponent"), Layer::Application);
    }

    #[test]
    fn test_layer_of_other() {
        assert_eq!(Layer::of("Grouping"), Layer::Other);
        assert_eq!(Layer::of("Junction"), Layer::Other);
        assert_eq!(Layer::of("Note"), Layer::Other);
        assert_eq!(Layer::of(""), Layer::Other);
        // Exact match only: a note is not a technology node
        assert_eq!(Layer::of("DiagramModelNote"), Layer::Other);
    }

    #[test]
    fn test_layer_display() {
        assert_eq!(Layer::Business.to_string(), "business");
        assert_eq!(Layer::Other.to_string(), "other");
    }
}
