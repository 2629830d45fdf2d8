//! Route table compilation.
//!
//! [`RouteTable::compile`] runs once at startup. It turns the relationship
//! schema into the list of HTTP routes the server registers, including the
//! anchored alternation that constrains the `{relationship}` path segment
//! when strict mode is on. The HTTP layer only maps each [`RouteName`] to a
//! handler.

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use crate::schema::RelationshipSchema;
use crate::types::Operation;

/// Errors that prevent the route table from being built. Fatal at startup.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("strict relationship mode is enabled but no relationships are defined")]
    EmptySchema,

    #[error("failed to compile relationship pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Identifies the handler a route is wired to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteName {
    RetrieveUser,
    RetrieveRelationship,
    RetrieveEdge,
    CreateRelationship,
    UpdateRelationship,
    DeleteRelationship,
}

impl RouteName {
    /// The mutation a route performs, or `None` for retrieval routes.
    pub fn operation(self) -> Option<Operation> {
        match self {
            RouteName::CreateRelationship => Some(Operation::Create),
            RouteName::UpdateRelationship => Some(Operation::Update),
            RouteName::DeleteRelationship => Some(Operation::Delete),
            RouteName::RetrieveUser
            | RouteName::RetrieveRelationship
            | RouteName::RetrieveEdge => None,
        }
    }
}

impl std::fmt::Display for RouteName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouteName::RetrieveUser => write!(f, "retrieve_user"),
            RouteName::RetrieveRelationship => write!(f, "retrieve_relationship"),
            RouteName::RetrieveEdge => write!(f, "retrieve_edge"),
            RouteName::CreateRelationship => write!(f, "create_relationship"),
            RouteName::UpdateRelationship => write!(f, "update_relationship"),
            RouteName::DeleteRelationship => write!(f, "delete_relationship"),
        }
    }
}

/// HTTP methods used by the route table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
            Method::Delete => write!(f, "DELETE"),
        }
    }
}

/// One route to register.
#[derive(Debug, Clone)]
pub struct RouteSpec {
    pub name: RouteName,
    pub method: Method,
    /// Path template with `{param}` placeholders.
    pub path: String,
    /// Pattern the `{relationship}` segment must match, if constrained.
    pub relationship_pattern: Option<Regex>,
    /// Whether the strict validator runs in front of the handler.
    pub strict: bool,
}

/// The full, ordered route list for one server instance.
#[derive(Debug, Clone)]
pub struct RouteTable {
    pub routes: Vec<RouteSpec>,
}

pub const SOURCE_PARAM: &str = "source";
pub const RELATIONSHIP_PARAM: &str = "relationship";
pub const TARGET_PARAM: &str = "target";

impl RouteTable {
    /// Build the route table from the relationship schema.
    ///
    /// With `strict` on the schema must be non-empty, and path-embedded
    /// relationship names are constrained to exactly the schema's names.
    /// With `strict` off any token matches and the strict validator is a
    /// pass-through.
    pub fn compile(schema: &RelationshipSchema, strict: bool) -> Result<Self, RouteError> {
        let pattern = if strict {
            Some(relationship_alternation(schema)?)
        } else {
            None
        };

        let users = format!("/users/{{{SOURCE_PARAM}}}");
        let by_relationship = format!("{users}/{{{RELATIONSHIP_PARAM}}}");
        let by_edge = format!("{by_relationship}/{{{TARGET_PARAM}}}");

        let route = |name, method, path: &str, pattern: Option<&Regex>, strict| RouteSpec {
            name,
            method,
            path: path.to_string(),
            relationship_pattern: pattern.cloned(),
            strict,
        };

        let routes = vec![
            // No relationship named, so never strict-checked.
            route(RouteName::RetrieveUser, Method::Get, &users, None, false),
            route(
                RouteName::RetrieveRelationship,
                Method::Get,
                &by_relationship,
                pattern.as_ref(),
                true,
            ),
            route(RouteName::RetrieveEdge, Method::Get, &by_edge, pattern.as_ref(), true),
            route(RouteName::CreateRelationship, Method::Post, "/createRelationship", None, true),
            route(RouteName::UpdateRelationship, Method::Post, "/updateRelationship", None, true),
            route(
                RouteName::DeleteRelationship,
                Method::Delete,
                "/deleteRelationship",
                None,
                true,
            ),
        ];

        Ok(Self { routes })
    }

    pub fn get(&self, name: RouteName) -> Option<&RouteSpec> {
        self.routes.iter().find(|r| r.name == name)
    }
}

/// `^(?:name1|name2|...)$` over the escaped schema names.
pub fn relationship_alternation(schema: &RelationshipSchema) -> Result<Regex, RouteError> {
    if schema.is_empty() {
        return Err(RouteError::EmptySchema);
    }
    let alternatives: Vec<String> = schema.names().map(regex::escape).collect();
    Ok(Regex::new(&format!("^(?:{})$", alternatives.join("|")))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> RelationshipSchema {
        RelationshipSchema::from_definitions([("friend", "counter"), ("colleague", "counter")])
            .unwrap()
    }

    #[test]
    fn alternation_matches_exactly_the_schema_names() {
        let re = relationship_alternation(&schema()).unwrap();
        assert!(re.is_match("friend"));
        assert!(re.is_match("colleague"));
        assert!(!re.is_match("enemy"));
        assert!(!re.is_match("friends"));
        assert!(!re.is_match("best-friend"));
        assert!(!re.is_match(""));
    }

    #[test]
    fn alternation_escapes_metacharacters() {
        let s = RelationshipSchema::from_definitions([("a.b", "counter"), ("c+", "score")]).unwrap();
        let re = relationship_alternation(&s).unwrap();
        assert!(re.is_match("a.b"));
        assert!(!re.is_match("axb"));
        assert!(re.is_match("c+"));
        assert!(!re.is_match("cc"));
    }

    #[test]
    fn strict_with_empty_schema_refuses_to_compile() {
        let err = RouteTable::compile(&RelationshipSchema::default(), true).unwrap_err();
        assert!(matches!(err, RouteError::EmptySchema));
    }

    #[test]
    fn non_strict_with_empty_schema_compiles_unconstrained() {
        let table = RouteTable::compile(&RelationshipSchema::default(), false).unwrap();
        assert!(table.routes.iter().all(|r| r.relationship_pattern.is_none()));
    }

    #[test]
    fn strict_routes_are_constrained_and_validated() {
        let table = RouteTable::compile(&schema(), true).unwrap();
        assert_eq!(table.routes.len(), 6);

        let user = table.get(RouteName::RetrieveUser).unwrap();
        assert_eq!(user.path, "/users/{source}");
        assert!(!user.strict);
        assert!(user.relationship_pattern.is_none());

        let rel = table.get(RouteName::RetrieveRelationship).unwrap();
        assert_eq!(rel.path, "/users/{source}/{relationship}");
        assert!(rel.strict);
        assert!(rel.relationship_pattern.as_ref().unwrap().is_match("friend"));

        let edge = table.get(RouteName::RetrieveEdge).unwrap();
        assert_eq!(edge.path, "/users/{source}/{relationship}/{target}");
        assert!(edge.relationship_pattern.is_some());
    }

    #[test]
    fn mutation_routes_take_the_type_from_the_body() {
        let table = RouteTable::compile(&schema(), true).unwrap();
        for (name, method, path) in [
            (RouteName::CreateRelationship, Method::Post, "/createRelationship"),
            (RouteName::UpdateRelationship, Method::Post, "/updateRelationship"),
            (RouteName::DeleteRelationship, Method::Delete, "/deleteRelationship"),
        ] {
            let r = table.get(name).unwrap();
            assert_eq!(r.method, method);
            assert_eq!(r.path, path);
            assert!(r.strict);
            assert!(r.relationship_pattern.is_none());
            assert!(name.operation().is_some());
        }
    }
}
