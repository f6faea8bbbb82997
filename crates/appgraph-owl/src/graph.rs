//! In-memory ontology population.
//!
//! [`OntologyBuilder`] is the explicit handle threaded through population.
//! Individuals are keyed by `(class, label)`: the first reference creates
//! the node, every later reference returns it. Relations are functional, so
//! assigning one replaces whatever the application pointed to before.

use crate::schema::{EntityClass, Relation, Schema};
use crate::OntologyError;
use appgraph_tabular::Row;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IndividualId(usize);

impl IndividualId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Individual {
    pub class: EntityClass,
    pub label: String,
    pub relations: BTreeMap<Relation, IndividualId>,
}

// ============================================================================
// Graph
// ============================================================================

/// A populated ontology: the schema plus every individual and edge.
#[derive(Debug, Clone)]
pub struct OntologyGraph {
    schema: Schema,
    individuals: Vec<Individual>,
    index: HashMap<(EntityClass, String), IndividualId>,
}

impl OntologyGraph {
    fn new(schema: Schema) -> Self {
        Self {
            schema,
            individuals: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    pub fn get(&self, id: IndividualId) -> Option<&Individual> {
        self.individuals.get(id.0)
    }

    pub fn find(&self, class: EntityClass, label: &str) -> Option<IndividualId> {
        self.index.get(&(class, label.to_string())).copied()
    }

    /// Individuals in creation order.
    pub fn individuals(&self) -> impl Iterator<Item = (IndividualId, &Individual)> {
        self.individuals
            .iter()
            .enumerate()
            .map(|(i, ind)| (IndividualId(i), ind))
    }

    pub fn individuals_of(
        &self,
        class: EntityClass,
    ) -> impl Iterator<Item = (IndividualId, &Individual)> {
        self.individuals().filter(move |(_, ind)| ind.class == class)
    }

    /// Label of the individual `subject` points to through `relation`.
    pub fn relation_label(&self, subject: IndividualId, relation: Relation) -> Option<&str> {
        let target = *self.get(subject)?.relations.get(&relation)?;
        self.get(target).map(|ind| ind.label.as_str())
    }

    /// Count of individuals per class, in schema order.
    pub fn class_counts(&self) -> Vec<(EntityClass, usize)> {
        EntityClass::ALL
            .into_iter()
            .map(|class| (class, self.individuals_of(class).count()))
            .collect()
    }

    /// Total number of relation assertions.
    pub fn edge_count(&self) -> usize {
        self.individuals.iter().map(|ind| ind.relations.len()).sum()
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Two-phase construction: [`define_schema`](Self::define_schema) once, then
/// populate. Population before the schema exists fails without side effects.
#[derive(Debug)]
pub struct OntologyBuilder {
    namespace: String,
    graph: Option<OntologyGraph>,
}

impl OntologyBuilder {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            graph: None,
        }
    }

    /// Install the application schema. Calling it again keeps the existing
    /// schema and individuals.
    pub fn define_schema(&mut self) -> &Schema {
        let namespace = &self.namespace;
        let graph = self
            .graph
            .get_or_insert_with(|| OntologyGraph::new(Schema::applications(namespace)));
        tracing::debug!(namespace = %graph.schema.namespace(), "schema defined");
        &graph.schema
    }

    pub fn graph(&self) -> Option<&OntologyGraph> {
        self.graph.as_ref()
    }

    fn graph_mut(&mut self) -> Result<&mut OntologyGraph, OntologyError> {
        self.graph.as_mut().ok_or(OntologyError::UninitializedSchema)
    }

    /// Get or create the individual of `class` named `label`.
    pub fn individual(
        &mut self,
        class: EntityClass,
        label: &str,
    ) -> Result<IndividualId, OntologyError> {
        let graph = self.graph_mut()?;
        let key = (class, label.to_string());
        if let Some(id) = graph.index.get(&key) {
            return Ok(*id);
        }

        let id = IndividualId(graph.individuals.len());
        graph.individuals.push(Individual {
            class,
            label: label.to_string(),
            relations: BTreeMap::new(),
        });
        graph.index.insert(key, id);
        Ok(id)
    }

    /// Point `subject` at `object` through `relation`, replacing any earlier
    /// value.
    pub fn assign(
        &mut self,
        subject: IndividualId,
        relation: Relation,
        object: IndividualId,
    ) -> Result<(), OntologyError> {
        let graph = self.graph_mut()?;

        let object_class = graph
            .individuals
            .get(object.0)
            .ok_or(OntologyError::UnknownIndividual(object.0))?
            .class;
        if object_class != relation.range() {
            return Err(OntologyError::RangeViolation {
                relation: relation.name(),
                expected: relation.range().name(),
                found: object_class.name(),
            });
        }

        let subject_ind = graph
            .individuals
            .get_mut(subject.0)
            .ok_or(OntologyError::UnknownIndividual(subject.0))?;
        if subject_ind.class != relation.domain() {
            return Err(OntologyError::DomainViolation {
                relation: relation.name(),
                expected: relation.domain().name(),
                found: subject_ind.class.name(),
            });
        }

        let previous = subject_ind.relations.insert(relation, object);
        if let Some(previous) = previous.filter(|p| *p != object) {
            let label = |id: IndividualId| graph.individuals[id.0].label.as_str();
            tracing::warn!(
                application = label(subject),
                relation = relation.name(),
                previous = label(previous),
                value = label(object),
                "replacing earlier value of functional relation"
            );
        }
        Ok(())
    }

    /// Create the row's six individuals and link the application to the other
    /// five.
    pub fn populate_row(&mut self, row: &Row) -> Result<IndividualId, OntologyError> {
        let app = self.individual(EntityClass::Application, &row.app)?;

        let mut targets = Vec::with_capacity(Relation::ALL.len());
        for relation in Relation::ALL {
            let range = relation.range();
            targets.push((relation, self.individual(range, row.get(range.column()))?));
        }

        for (relation, target) in targets {
            self.assign(app, relation, target)?;
        }
        Ok(app)
    }

    /// Populate from every row, in order.
    pub fn populate<'a, I>(&mut self, rows: I) -> Result<usize, OntologyError>
    where
        I: IntoIterator<Item = &'a Row>,
    {
        self.graph_mut()?;
        let mut count = 0;
        for row in rows {
            self.populate_row(row)?;
            count += 1;
        }

        let individuals = self.graph.as_ref().map_or(0, |g| g.len());
        tracing::info!(rows = count, individuals, "populated ontology");
        Ok(count)
    }

    /// Hand over the populated graph.
    pub fn finish(self) -> Result<OntologyGraph, OntologyError> {
        self.graph.ok_or(OntologyError::UninitializedSchema)
    }
}
