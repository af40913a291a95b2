//! Search query compiler.
//!
//! Turns a search request into one boolean clause:
//! - the user's expression (recursive, per-field leaf builders)
//! - container scope
//! - authorization
//! - default status visibility
//! - an extra filter expression
//!
//! The top-level parts are always ANDed. Inside an expression group the
//! first relation marker decides between AND and OR for all siblings; a
//! group without a marker is an OR.

mod clauses;

use serde::{Deserialize, Serialize};

use atrium_models::search::{first_relation, LogicalRelation, SearchElement, SearchQuery};
use atrium_models::User;

use crate::attributes;
use crate::clause::Clause;
use crate::config::CompilerConfig;
use crate::error::Result;
use crate::hierarchy::{HierarchyError, HierarchyService};
use crate::security::build_security_clause;
use crate::status::{build_status_clause, has_status_predicate};

use clauses::{build_pair_clause, ClauseContext, ClauseError};

/// Kind of document a request searches for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchTarget {
    #[default]
    Items,
    Collections,
    Users,
}

impl SearchTarget {
    fn is_containers(self) -> bool {
        self == SearchTarget::Collections
    }
}

/// Inputs of one compilation. Borrowed, never modified.
#[derive(Debug, Clone, Copy)]
pub struct SearchRequest<'a> {
    query: &'a SearchQuery,
    scope: Option<&'a str>,
    user: Option<&'a User>,
    filter: Option<&'a SearchQuery>,
    target: SearchTarget,
}

impl<'a> SearchRequest<'a> {
    pub fn new(query: &'a SearchQuery) -> Self {
        Self {
            query,
            scope: None,
            user: None,
            filter: None,
            target: SearchTarget::Items,
        }
    }

    /// Restrict results to one container (and, for non-empty queries, its
    /// sub-containers).
    pub fn with_scope(mut self, scope: Option<&'a str>) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_user(mut self, user: Option<&'a User>) -> Self {
        self.user = user;
        self
    }

    pub fn with_filter(mut self, filter: Option<&'a SearchQuery>) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_target(mut self, target: SearchTarget) -> Self {
        self.target = target;
        self
    }
}

/// Compiles search requests against one configuration and hierarchy.
///
/// Holds no per-request state; share it freely between threads.
#[derive(Debug, Clone)]
pub struct QueryCompiler {
    config: CompilerConfig,
    hierarchy: HierarchyService,
}

impl QueryCompiler {
    pub fn new(config: CompilerConfig, hierarchy: HierarchyService) -> Self {
        Self { config, hierarchy }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    pub fn hierarchy(&self) -> &HierarchyService {
        &self.hierarchy
    }

    /// The complete clause for a request.
    #[tracing::instrument(
        skip_all,
        fields(search_target = ?request.target, scope = request.scope, user = request.user.map(|u| u.id.as_str()))
    )]
    pub fn compile(&self, request: &SearchRequest<'_>) -> Result<Clause> {
        let ctx = self.context(request.user, request.target);
        let query_is_empty = request.query.is_empty();

        let search = if query_is_empty {
            Clause::MatchAll
        } else {
            self.compile_group(&ctx, &request.query.elements)?
        };
        let container = self.container_clause(request.scope, query_is_empty, request.target)?;
        let security = build_security_clause(
            &self.config,
            &self.hierarchy,
            request.user,
            None,
            request.target.is_containers(),
        )?;
        let status = status_clause(request);
        let filter = match request.filter {
            Some(filter) => self.compile_group(&ctx, &filter.elements)?,
            None => Clause::MatchAll,
        };

        let clause = Clause::must([
            search,
            container,
            security,
            status,
            filter,
            Clause::not(Clause::term(attributes::JOIN_FIELD, attributes::JOIN_CONTENT)),
        ]);
        tracing::debug!(nodes = clause.size(), "Compiled search query");
        Ok(clause)
    }

    /// The clause for an element list alone. An empty list matches all.
    pub fn compile_elements(
        &self,
        elements: &[SearchElement],
        user: Option<&User>,
        target: SearchTarget,
    ) -> Result<Clause> {
        let ctx = self.context(user, target);
        Ok(self.compile_group(&ctx, elements)?)
    }

    fn context<'a>(&'a self, user: Option<&'a User>, target: SearchTarget) -> ClauseContext<'a> {
        ClauseContext {
            config: &self.config,
            hierarchy: &self.hierarchy,
            user,
            for_containers: target.is_containers(),
        }
    }

    fn compile_group(
        &self,
        ctx: &ClauseContext<'_>,
        elements: &[SearchElement],
    ) -> std::result::Result<Clause, HierarchyError> {
        Ok(self.compile_checked(ctx, elements)?.0)
    }

    /// The clause for a sibling list, and whether malformed predicates alone
    /// make it match nothing. Such a list stays `MatchNone` under `NOT`.
    fn compile_checked(
        &self,
        ctx: &ClauseContext<'_>,
        elements: &[SearchElement],
    ) -> std::result::Result<(Clause, bool), HierarchyError> {
        let relation = first_relation(elements).unwrap_or(LogicalRelation::Or);

        let mut children = Vec::with_capacity(elements.len());
        let mut degraded = Vec::with_capacity(elements.len());
        for element in elements {
            match element {
                SearchElement::Pair(pair) => match build_pair_clause(ctx, pair) {
                    Ok(clause) => {
                        children.push(clause);
                        degraded.push(false);
                    }
                    Err(ClauseError::Invalid(reason)) => {
                        tracing::debug!(predicate = ?pair.target, value = %pair.value, %reason, "Predicate matches nothing");
                        children.push(Clause::MatchNone);
                        degraded.push(true);
                    }
                    Err(ClauseError::Store(e)) => return Err(e),
                },
                // `()` and `NOT ()` constrain nothing, wherever they appear
                SearchElement::Group(_) if element.is_empty() => {
                    children.push(Clause::MatchAll);
                    degraded.push(false);
                }
                SearchElement::Group(group) => {
                    let (clause, bad) = self.compile_checked(ctx, &group.elements)?;
                    if bad && group.negate {
                        tracing::debug!("Negated group matches nothing");
                        children.push(Clause::MatchNone);
                    } else {
                        children.push(Clause::negate_if(clause, group.negate));
                    }
                    degraded.push(bad);
                }
                SearchElement::Relation { .. } => {}
            }
        }

        Ok(match relation {
            LogicalRelation::And => (Clause::must(children), degraded.contains(&true)),
            LogicalRelation::Or => (
                Clause::should(children),
                !degraded.is_empty() && !degraded.contains(&false),
            ),
        })
    }

    fn container_clause(
        &self,
        scope: Option<&str>,
        query_is_empty: bool,
        target: SearchTarget,
    ) -> std::result::Result<Clause, HierarchyError> {
        let Some(scope) = scope else {
            if target.is_containers() && query_is_empty {
                // only top-level collections are listed by default
                return Ok(Clause::not(Clause::exists(attributes::FOLDER)));
            }
            return Ok(Clause::MatchAll);
        };

        let scope = self.config.container_id(scope);
        let descendants = if query_is_empty {
            Vec::new()
        } else {
            self.hierarchy.descendants(&scope)?
        };

        Ok(Clause::should(
            std::iter::once(scope)
                .chain(descendants)
                .map(|id| Clause::term(attributes::FOLDER, id)),
        ))
    }
}

/// Default status visibility. A status predicate in the filter decides
/// status just as one in the query does.
fn status_clause(request: &SearchRequest<'_>) -> Clause {
    if request.target == SearchTarget::Users {
        return Clause::MatchAll;
    }
    let filter_decides = request
        .filter
        .is_some_and(|filter| has_status_predicate(&filter.elements));
    if filter_decides && request.user.is_some() {
        return Clause::MatchAll;
    }
    build_status_clause(&request.query.elements, request.user)
}
