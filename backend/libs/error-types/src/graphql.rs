//! GraphQL error translation
//!
//! Resolvers call `.extend()` on a [`ServiceError`] to produce an
//! `async_graphql::Error` carrying `extensions.code`.

use async_graphql::{ErrorExtensions, Value};

use crate::ServiceError;

impl ErrorExtensions for ServiceError {
    fn extend(&self) -> async_graphql::Error {
        self.log();

        async_graphql::Error::new(self.client_message()).extend_with(|_, e| {
            e.set("code", self.code());
            match self {
                ServiceError::DuplicateKey { field } => e.set("field", field.as_str()),
                ServiceError::Validation { source } => e.set(
                    "fields",
                    Value::List(
                        source
                            .fields()
                            .into_iter()
                            .map(|f| Value::String(f.to_string()))
                            .collect(),
                    ),
                ),
                _ => {}
            }
        })
    }
}
