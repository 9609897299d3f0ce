//! Schema introspection.
//!
//! Builds the textual schema summary embedded in prompts from the database's
//! built-in `db.schema.*` procedures, so no plugin (APOC) is required.

use std::collections::{BTreeMap, BTreeSet};

use neo4rs::query;

use crate::client::{column, GraphClient, GraphError};

/// Property names and types per node label and relationship type, plus the
/// relationship patterns observed in the data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaSnapshot {
    pub node_properties: BTreeMap<String, Vec<(String, String)>>,
    pub relationship_properties: BTreeMap<String, Vec<(String, String)>>,
    pub relationships: BTreeSet<(String, String, String)>,
}

impl SchemaSnapshot {
    /// Record one property row from `db.schema.nodeTypeProperties()`.
    pub fn add_node_property(
        &mut self,
        labels: &[String],
        property: Option<String>,
        types: &[String],
    ) {
        let entry = self.node_properties.entry(labels.join(":")).or_default();
        if let Some(name) = property {
            entry.push((name, normalize_type(types)));
        }
    }

    /// Record one property row from `db.schema.relTypeProperties()`.
    pub fn add_relationship_property(
        &mut self,
        rel_type: &str,
        property: Option<String>,
        types: &[String],
    ) {
        let entry = self
            .relationship_properties
            .entry(strip_rel_type(rel_type))
            .or_default();
        if let Some(name) = property {
            entry.push((name, normalize_type(types)));
        }
    }

    /// Record a `(:From)-[:TYPE]->(:To)` pattern.
    pub fn add_relationship(&mut self, from: &str, rel_type: &str, to: &str) {
        self.relationships
            .insert((from.to_string(), rel_type.to_string(), to.to_string()));
    }

    pub fn is_empty(&self) -> bool {
        self.node_properties.is_empty()
            && self.relationship_properties.is_empty()
            && self.relationships.is_empty()
    }

    /// Render the schema as prompt text.
    ///
    /// An empty database renders as an empty string.
    pub fn to_text(&self) -> String {
        if self.is_empty() {
            return String::new();
        }

        let mut lines = vec!["Node properties:".to_string()];
        for (label, props) in &self.node_properties {
            lines.push(format!("{label} {}", render_props(props)));
        }

        lines.push("Relationship properties:".to_string());
        for (rel_type, props) in &self.relationship_properties {
            if !props.is_empty() {
                lines.push(format!("{rel_type} {}", render_props(props)));
            }
        }

        lines.push("The relationships:".to_string());
        for (from, rel_type, to) in &self.relationships {
            lines.push(format!("(:{from})-[:{rel_type}]->(:{to})"));
        }

        lines.join("\n")
    }
}

fn render_props(props: &[(String, String)]) -> String {
    let inner: Vec<String> = props
        .iter()
        .map(|(name, ty)| format!("{name}: {ty}"))
        .collect();
    format!("{{{}}}", inner.join(", "))
}

/// `:`ACTED_IN`` → `ACTED_IN`.
fn strip_rel_type(raw: &str) -> String {
    raw.trim_start_matches(':').trim_matches('`').to_string()
}

/// Map Neo4j's reported property types to the upper-case names LLM prompts
/// conventionally use.
fn normalize_type(types: &[String]) -> String {
    let Some(first) = types.first() else {
        return "ANY".to_string();
    };
    match first.as_str() {
        "String" => "STRING",
        "Long" | "Integer" => "INTEGER",
        "Double" | "Float" => "FLOAT",
        "Boolean" => "BOOLEAN",
        "Date" => "DATE",
        "DateTime" => "DATE_TIME",
        "LocalDateTime" => "LOCAL_DATE_TIME",
        "Point" => "POINT",
        "Duration" => "DURATION",
        "StringArray" => "LIST",
        "LongArray" | "DoubleArray" => "LIST",
        other => return other.to_uppercase(),
    }
    .to_string()
}

impl GraphClient {
    /// Introspect the current schema.
    pub async fn fetch_schema(&self) -> Result<SchemaSnapshot, GraphError> {
        let mut snapshot = SchemaSnapshot::default();

        let rows = self
            .query_rows(query(
                "CALL db.schema.nodeTypeProperties()
                 YIELD nodeLabels, propertyName, propertyTypes
                 RETURN nodeLabels, propertyName, propertyTypes",
            ))
            .await?;
        for row in rows {
            let labels: Vec<String> = column(&row, "nodeLabels")?;
            let property: Option<String> = column(&row, "propertyName")?;
            // null when the label or type has no properties
            let types: Vec<String> =
                column::<Option<Vec<String>>>(&row, "propertyTypes")?.unwrap_or_default();
            snapshot.add_node_property(&labels, property, &types);
        }

        let rows = self
            .query_rows(query(
                "CALL db.schema.relTypeProperties()
                 YIELD relType, propertyName, propertyTypes
                 RETURN relType, propertyName, propertyTypes",
            ))
            .await?;
        for row in rows {
            let rel_type: String = column(&row, "relType")?;
            let property: Option<String> = column(&row, "propertyName")?;
            let types: Vec<String> =
                column::<Option<Vec<String>>>(&row, "propertyTypes")?.unwrap_or_default();
            snapshot.add_relationship_property(&rel_type, property, &types);
        }

        let rows = self
            .query_rows(query(
                "MATCH (a)-[r]->(b)
                 UNWIND labels(a) AS from
                 UNWIND labels(b) AS to
                 RETURN DISTINCT from, type(r) AS rel_type, to
                 LIMIT 500",
            ))
            .await?;
        for row in rows {
            let from: String = column(&row, "from")?;
            let rel_type: String = column(&row, "rel_type")?;
            let to: String = column(&row, "to")?;
            snapshot.add_relationship(&from, &rel_type, &to);
        }

        tracing::debug!(
            labels = snapshot.node_properties.len(),
            relationships = snapshot.relationships.len(),
            "Schema fetched"
        );
        Ok(snapshot)
    }

    /// Introspect the schema and render it as prompt text.
    pub async fn schema_text(&self) -> Result<String, GraphError> {
        Ok(self.fetch_schema().await?.to_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_schema_renders_empty() {
        assert_eq!(SchemaSnapshot::default().to_text(), "");
    }

    #[test]
    fn test_movie_schema_text() {
        let mut snapshot = SchemaSnapshot::default();
        snapshot.add_node_property(
            &strings(&["Movie"]),
            Some("title".to_string()),
            &strings(&["String"]),
        );
        snapshot.add_node_property(
            &strings(&["Movie"]),
            Some("imdbRating".to_string()),
            &strings(&["Double"]),
        );
        snapshot.add_node_property(
            &strings(&["Genre"]),
            Some("name".to_string()),
            &strings(&["String"]),
        );
        snapshot.add_relationship_property(":`ACTED_IN`", None, &[]);
        snapshot.add_relationship("Person", "ACTED_IN", "Movie");
        snapshot.add_relationship("Movie", "IN_GENRE", "Genre");

        let text = snapshot.to_text();
        assert_eq!(
            text,
            "Node properties:\n\
             Genre {name: STRING}\n\
             Movie {title: STRING, imdbRating: FLOAT}\n\
             Relationship properties:\n\
             The relationships:\n\
             (:Movie)-[:IN_GENRE]->(:Genre)\n\
             (:Person)-[:ACTED_IN]->(:Movie)"
        );
    }

    #[test]
    fn test_label_without_properties_is_listed() {
        let mut snapshot = SchemaSnapshot::default();
        snapshot.add_node_property(&strings(&["Tag"]), None, &[]);
        assert!(snapshot.to_text().contains("Tag {}"));
    }

    #[test]
    fn test_relationship_properties_are_rendered() {
        let mut snapshot = SchemaSnapshot::default();
        snapshot.add_relationship_property(
            ":`RATED`",
            Some("stars".to_string()),
            &strings(&["Long"]),
        );
        assert!(snapshot.to_text().contains("RATED {stars: INTEGER}"));
    }

    #[test]
    fn test_unknown_type_is_uppercased() {
        assert_eq!(normalize_type(&strings(&["ZonedTime"])), "ZONEDTIME");
        assert_eq!(normalize_type(&[]), "ANY");
    }
}
