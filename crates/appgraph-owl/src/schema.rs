//! The fixed application schema: six classes and five functional object
//! properties, all rooted at `owl:Thing`.

use appgraph_tabular::Column;
use serde::{Deserialize, Serialize};

pub const OWL_THING_IRI: &str = "http://www.w3.org/2002/07/owl#Thing";

// ============================================================================
// Classes
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityClass {
    Application,
    Developer,
    OperatingSystem,
    Language,
    License,
    CopyrightStatus,
}

impl EntityClass {
    pub const ALL: [EntityClass; 6] = [
        EntityClass::Application,
        EntityClass::Developer,
        EntityClass::OperatingSystem,
        EntityClass::Language,
        EntityClass::License,
        EntityClass::CopyrightStatus,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EntityClass::Application => "Application",
            EntityClass::Developer => "Developer",
            EntityClass::OperatingSystem => "OperatingSystem",
            EntityClass::Language => "Language",
            EntityClass::License => "License",
            EntityClass::CopyrightStatus => "CopyrightStatus",
        }
    }

    /// Table column whose values name individuals of this class.
    pub fn column(self) -> Column {
        match self {
            EntityClass::Application => Column::App,
            EntityClass::Developer => Column::Developer,
            EntityClass::OperatingSystem => Column::OperatingSystem,
            EntityClass::Language => Column::Language,
            EntityClass::License => Column::License,
            EntityClass::CopyrightStatus => Column::CopyrightStatus,
        }
    }
}

// ============================================================================
// Relations
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Relation {
    DevelopedBy,
    RunsOn,
    WrittenIn,
    LicensedUnder,
    CopyrightStatusOf,
}

impl Relation {
    pub const ALL: [Relation; 5] = [
        Relation::DevelopedBy,
        Relation::RunsOn,
        Relation::WrittenIn,
        Relation::LicensedUnder,
        Relation::CopyrightStatusOf,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Relation::DevelopedBy => "developed_by",
            Relation::RunsOn => "runs_on",
            Relation::WrittenIn => "written_in",
            Relation::LicensedUnder => "licensed_under",
            Relation::CopyrightStatusOf => "copyright_status_of",
        }
    }

    pub fn domain(self) -> EntityClass {
        EntityClass::Application
    }

    pub fn range(self) -> EntityClass {
        match self {
            Relation::DevelopedBy => EntityClass::Developer,
            Relation::RunsOn => EntityClass::OperatingSystem,
            Relation::WrittenIn => EntityClass::Language,
            Relation::LicensedUnder => EntityClass::License,
            Relation::CopyrightStatusOf => EntityClass::CopyrightStatus,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyCharacteristic {
    Functional,
    InverseFunctional,
    Transitive,
    Symmetric,
    Asymmetric,
    Reflexive,
    Irreflexive,
}

impl PropertyCharacteristic {
    pub fn from_owl_local_name(name: &str) -> Option<Self> {
        Some(match name {
            "FunctionalProperty" => PropertyCharacteristic::Functional,
            "InverseFunctionalProperty" => PropertyCharacteristic::InverseFunctional,
            "TransitiveProperty" => PropertyCharacteristic::Transitive,
            "SymmetricProperty" => PropertyCharacteristic::Symmetric,
            "AsymmetricProperty" => PropertyCharacteristic::Asymmetric,
            "ReflexiveProperty" => PropertyCharacteristic::Reflexive,
            "IrreflexiveProperty" => PropertyCharacteristic::Irreflexive,
            _ => return None,
        })
    }

    pub fn owl_local_name(self) -> &'static str {
        match self {
            PropertyCharacteristic::Functional => "FunctionalProperty",
            PropertyCharacteristic::InverseFunctional => "InverseFunctionalProperty",
            PropertyCharacteristic::Transitive => "TransitiveProperty",
            PropertyCharacteristic::Symmetric => "SymmetricProperty",
            PropertyCharacteristic::Asymmetric => "AsymmetricProperty",
            PropertyCharacteristic::Reflexive => "ReflexiveProperty",
            PropertyCharacteristic::Irreflexive => "IrreflexiveProperty",
        }
    }
}

// ============================================================================
// Registry
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDescriptor {
    pub class: EntityClass,
    pub iri: String,
    pub super_class: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationDescriptor {
    pub relation: Relation,
    pub iri: String,
    pub domain: EntityClass,
    pub range: EntityClass,
    pub characteristics: Vec<PropertyCharacteristic>,
}

impl RelationDescriptor {
    pub fn is_functional(&self) -> bool {
        self.characteristics
            .contains(&PropertyCharacteristic::Functional)
    }
}

/// Immutable class/property registry for one ontology namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    namespace: String,
    classes: Vec<ClassDescriptor>,
    relations: Vec<RelationDescriptor>,
}

impl Schema {
    /// The application schema under `namespace` (e.g. `http://test.org/apps.owl`).
    pub fn applications(namespace: &str) -> Self {
        let namespace = namespace.trim_end_matches('#').to_string();
        let term = |local: &str| format!("{namespace}#{local}");

        let classes = EntityClass::ALL
            .into_iter()
            .map(|class| ClassDescriptor {
                class,
                iri: term(class.name()),
                super_class: OWL_THING_IRI,
            })
            .collect();

        let relations = Relation::ALL
            .into_iter()
            .map(|relation| RelationDescriptor {
                relation,
                iri: term(relation.name()),
                domain: relation.domain(),
                range: relation.range(),
                characteristics: vec![PropertyCharacteristic::Functional],
            })
            .collect();

        Self {
            namespace,
            classes,
            relations,
        }
    }

    /// Ontology IRI (no trailing `#`).
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn classes(&self) -> &[ClassDescriptor] {
        &self.classes
    }

    pub fn relations(&self) -> &[RelationDescriptor] {
        &self.relations
    }

    pub fn class(&self, class: EntityClass) -> &ClassDescriptor {
        &self.classes[class as usize]
    }

    pub fn relation(&self, relation: Relation) -> &RelationDescriptor {
        &self.relations[relation as usize]
    }

    /// IRI of the individual of `class` named `label`: `<ns>#<Class>/<label>`.
    ///
    /// Class and property fragments never contain `/`, so an individual IRI
    /// cannot coincide with a schema term, and the class segment keeps equal
    /// labels of different classes apart.
    pub fn individual_iri(&self, class: EntityClass, label: &str) -> String {
        format!(
            "{}#{}/{}",
            self.namespace,
            class.name(),
            escape_iri_fragment(label)
        )
    }
}

/// Percent-encode the characters that may not appear in an IRI fragment.
/// Non-ASCII characters are left as they are.
pub fn escape_iri_fragment(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    for c in label.chars() {
        let reserved = c.is_ascii_control()
            || matches!(
                c,
                ' ' | '<' | '>' | '"' | '{' | '}' | '|' | '\\' | '^' | '`' | '#' | '%' | '[' | ']'
            );
        if reserved {
            let mut buf = [0u8; 4];
            for b in c.encode_utf8(&mut buf).bytes() {
                out.push_str(&format!("%{b:02X}"));
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn six_classes_under_thing() {
        let schema = Schema::applications("http://test.org/apps.owl");
        assert_eq!(schema.classes().len(), 6);
        for class in EntityClass::ALL {
            let desc = schema.class(class);
            assert_eq!(desc.class, class);
            assert_eq!(desc.super_class, OWL_THING_IRI);
            assert_eq!(desc.iri, format!("http://test.org/apps.owl#{}", class.name()));
        }
    }

    #[test]
    fn five_functional_relations_from_application() {
        let schema = Schema::applications("http://test.org/apps.owl#");
        assert_eq!(schema.namespace(), "http://test.org/apps.owl");
        assert_eq!(schema.relations().len(), 5);
        for relation in Relation::ALL {
            let desc = schema.relation(relation);
            assert_eq!(desc.relation, relation);
            assert_eq!(desc.domain, EntityClass::Application);
            assert_ne!(desc.range, EntityClass::Application);
            assert!(desc.is_functional());
        }
        assert_eq!(
            schema.relation(Relation::CopyrightStatusOf).range,
            EntityClass::CopyrightStatus
        );
    }

    #[test]
    fn ranges_cover_every_non_application_class_once() {
        let mut ranges: Vec<EntityClass> = Relation::ALL.iter().map(|r| r.range()).collect();
        ranges.sort();
        assert_eq!(ranges, EntityClass::ALL[1..].to_vec());
    }

    #[test]
    fn individual_iris_escape_reserved_characters() {
        let schema = Schema::applications("http://test.org/apps.owl");
        assert_eq!(
            schema.individual_iri(EntityClass::Application, "AppA"),
            "http://test.org/apps.owl#Application/AppA"
        );
        assert_eq!(
            schema.individual_iri(EntityClass::Application, "GNU Emacs"),
            "http://test.org/apps.owl#Application/GNU%20Emacs"
        );
        assert_eq!(escape_iri_fragment("C#"), "C%23");
        assert_eq!(escape_iri_fragment("100%"), "100%25");
        assert_eq!(escape_iri_fragment("Foo [beta]"), "Foo%20%5Bbeta%5D");
        assert_eq!(escape_iri_fragment("Übersicht"), "Übersicht");
    }

    #[test]
    fn individual_iris_never_collide_with_schema_terms() {
        let schema = Schema::applications("http://test.org/apps.owl");
        let mut terms: Vec<String> = schema.classes().iter().map(|c| c.iri.clone()).collect();
        terms.extend(schema.relations().iter().map(|r| r.iri.clone()));

        for class in EntityClass::ALL {
            for label in ["License", "Application", "runs_on", "Linux"] {
                let iri = schema.individual_iri(class, label);
                assert!(!terms.contains(&iri), "{iri}");
            }
        }
        assert_ne!(
            schema.individual_iri(EntityClass::Application, "Linux"),
            schema.individual_iri(EntityClass::OperatingSystem, "Linux")
        );
    }
}
