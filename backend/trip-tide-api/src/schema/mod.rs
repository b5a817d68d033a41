//! GraphQL schema
//!
//! Resolvers stay thin: fetch the viewer when the operation needs one, call
//! the matching service and wrap the result in a node type. Reference fields
//! (authors, friends, comments, saved places) go through batching loaders.

pub mod auth;
pub mod content;
pub mod loaders;
pub mod user;

use async_graphql::{
    dataloader::DataLoader, Context, EmptySubscription, MergedObject, Result as GraphQLResult,
    Schema,
};

use crate::config::GraphQLConfig;
use crate::services::Services;
use crate::store::Store;

/// Root query object
#[derive(MergedObject, Default)]
pub struct QueryRoot(user::UserQuery, content::ContentQuery);

/// Root mutation object
#[derive(MergedObject, Default)]
pub struct MutationRoot(
    auth::AuthMutation,
    user::UserMutation,
    content::ContentMutation,
);

pub type AppSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Build the schema with services, DataLoaders and query limits
pub fn build_schema(services: Services, store: Store, config: &GraphQLConfig) -> AppSchema {
    let mut builder = Schema::build(
        QueryRoot::default(),
        MutationRoot::default(),
        EmptySubscription,
    )
    .data(services)
    .data(DataLoader::new(
        loaders::UserLoader::new(store.clone()),
        tokio::task::spawn,
    ))
    .data(DataLoader::new(
        loaders::PostLoader::new(store.clone()),
        tokio::task::spawn,
    ))
    .data(DataLoader::new(
        loaders::CommentLoader::new(store.clone()),
        tokio::task::spawn,
    ))
    .data(DataLoader::new(
        loaders::PlaceLoader::new(store),
        tokio::task::spawn,
    ))
    .limit_depth(config.max_depth)
    .limit_complexity(config.max_complexity);

    if !config.introspection {
        builder = builder.disable_introspection();
    }

    builder.finish()
}

pub(crate) fn services<'a>(ctx: &Context<'a>) -> GraphQLResult<&'a Services> {
    ctx.data::<Services>()
}
