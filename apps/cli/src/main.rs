//! Atrium search compiler - command-line entry point
//!
//! Compiles query strings into backend-agnostic clause trees and prints
//! them as JSON, for inspecting what a search would filter on.
//!
//! Usage:
//!   atrium compile "title=birds AND created>2020" --user user.json --hierarchy links.json
//!   atrium parse "lorem ipsum NOT status=public"
//!   atrium sort created:desc title

mod config;
mod logging;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use atrium_models::search::{SearchQuery, SortCriterion};
use atrium_models::{GrantType, User};
use atrium_search::{
    compile_sort, HierarchyService, InMemoryHierarchy, QueryCompiler, QueryParser, SearchRequest,
    SearchTarget, SecurityClauseBuilder,
};

use crate::config::Config;

#[derive(Parser, Debug)]
#[command(name = "atrium", version)]
#[command(about = "Compile Atrium search queries into filter clauses")]
struct Cli {
    /// Configuration file (default: ./atrium.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print clauses in compact text form instead of JSON
    #[arg(long, global = true)]
    text: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile a query string into the complete filter clause
    Compile {
        /// Query string, e.g. `title=birds AND created>2020`
        query: String,

        #[command(flatten)]
        context: ContextArgs,

        /// Restrict results to this collection and its sub-collections
        #[arg(long)]
        scope: Option<String>,

        /// Additional query ANDed to the search
        #[arg(long)]
        filter: Option<String>,

        /// What to search for
        #[arg(long, value_enum, default_value_t = TargetArg::Items)]
        target: TargetArg,

        /// Free text searches metadata only, not file contents
        #[arg(long)]
        no_fulltext: bool,

        /// The query strings are URL-encoded
        #[arg(long)]
        url_encoded: bool,
    },

    /// Compile only the authorization clause for a user
    Security {
        #[command(flatten)]
        context: ContextArgs,

        /// Only count grants with at least this role
        #[arg(long, value_enum)]
        role: Option<RoleArg>,

        /// Scope collections instead of items
        #[arg(long)]
        collections: bool,
    },

    /// Parse a query string and print the expression tree
    Parse {
        query: String,

        #[arg(long)]
        no_fulltext: bool,

        #[arg(long)]
        url_encoded: bool,
    },

    /// Compile sort criteria (`<field>[:asc|:desc]`, `-` for the default)
    Sort { criteria: Vec<String> },
}

#[derive(clap::Args, Debug)]
struct ContextArgs {
    /// JSON file holding the searching user; anonymous when omitted
    #[arg(long)]
    user: Option<PathBuf>,

    /// JSON file mapping each collection id to its parent collection id
    #[arg(long)]
    hierarchy: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum TargetArg {
    Items,
    Collections,
    Users,
}

impl From<TargetArg> for SearchTarget {
    fn from(target: TargetArg) -> Self {
        match target {
            TargetArg::Items => SearchTarget::Items,
            TargetArg::Collections => SearchTarget::Collections,
            TargetArg::Users => SearchTarget::Users,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum RoleArg {
    Read,
    Edit,
    Admin,
}

impl From<RoleArg> for GrantType {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Read => GrantType::Read,
            RoleArg::Edit => GrantType::Edit,
            RoleArg::Admin => GrantType::Admin,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {e}"))?;

    let _logging_guard =
        logging::init_logging(&config.logging).context("Failed to initialize logging")?;

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "Starting atrium");

    match cli.command {
        Command::Compile {
            query,
            context,
            scope,
            filter,
            target,
            no_fulltext,
            url_encoded,
        } => {
            let parser = QueryParser::new().with_fulltext(!no_fulltext);
            let query = parse_query(&parser, &query, url_encoded)?;
            let filter = filter
                .map(|f| parse_query(&parser, &f, url_encoded))
                .transpose()?;
            let user = context.load_user()?;
            let compiler = QueryCompiler::new(config.compiler, context.load_hierarchy()?);

            let request = SearchRequest::new(&query)
                .with_scope(scope.as_deref())
                .with_user(user.as_ref())
                .with_filter(filter.as_ref())
                .with_target(target.into());
            let clause = compiler.compile(&request).context("Failed to compile query")?;
            print_clause(&clause, cli.text)
        }
        Command::Security {
            context,
            role,
            collections,
        } => {
            let user = context.load_user()?;
            let hierarchy = context.load_hierarchy()?;
            let clause = SecurityClauseBuilder::new(&config.compiler, &hierarchy)
                .with_user(user.as_ref())
                .with_role(role.map(GrantType::from))
                .for_containers(collections)
                .build()
                .context("Failed to build security clause")?;
            print_clause(&clause, cli.text)
        }
        Command::Parse {
            query,
            no_fulltext,
            url_encoded,
        } => {
            let parser = QueryParser::new().with_fulltext(!no_fulltext);
            let query = parse_query(&parser, &query, url_encoded)?;
            if cli.text {
                println!("{}", atrium_search::to_query_string(&query));
                Ok(())
            } else {
                print_json(&query)
            }
        }
        Command::Sort { criteria } => {
            let criteria = criteria
                .iter()
                .map(String::as_str)
                .map(parse_sort_criterion)
                .collect::<anyhow::Result<Vec<_>>>()?;
            print_json(&compile_sort(&criteria))
        }
    }
}

impl ContextArgs {
    fn load_user(&self) -> anyhow::Result<Option<User>> {
        self.user.as_deref().map(read_json::<User>).transpose()
    }

    fn load_hierarchy(&self) -> anyhow::Result<HierarchyService> {
        let links: BTreeMap<String, String> = match self.hierarchy.as_deref() {
            Some(path) => read_json(path)?,
            None => BTreeMap::new(),
        };
        tracing::debug!(links = links.len(), "Loaded collection hierarchy");
        Ok(HierarchyService::new(Arc::new(
            InMemoryHierarchy::from_parent_links(links),
        )))
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

fn parse_query(parser: &QueryParser, query: &str, url_encoded: bool) -> anyhow::Result<SearchQuery> {
    let parsed = if url_encoded {
        parser.parse_url_encoded(query)
    } else {
        parser.parse(query)
    };
    parsed.with_context(|| format!("Invalid query '{query}'"))
}

fn parse_sort_criterion(raw: &str) -> anyhow::Result<Option<SortCriterion>> {
    if raw == "-" {
        return Ok(None);
    }
    raw.parse()
        .map(Some)
        .with_context(|| format!("Invalid sort criterion '{raw}'"))
}

fn print_clause(clause: &atrium_search::Clause, text: bool) -> anyhow::Result<()> {
    if text {
        println!("{clause}");
        Ok(())
    } else {
        print_json(clause)
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
