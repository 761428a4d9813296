//! Batch execution over the handler registry.

use log::*;

use crate::handlers::{registry, Registry};
use crate::traits::handler::Handler;
use crate::traits::transport::Transport;
use crate::types::item::Item;
use crate::types::output::{ExecutionMode, OutputRecord};
use crate::types::selector::{Operation, Resource};
use crate::Error;

pub struct Dispatcher {
    handlers: Registry,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            handlers: registry(),
        }
    }

    pub fn handler(&self, resource: Resource, operation: Operation) -> Result<&dyn Handler, Error> {
        self.handlers
            .get(&(resource, operation))
            .map(|handler| handler.as_ref())
            .ok_or_else(|| {
                Error::Configuration(format!(
                    "The operation \"{}\" is not supported for resource \"{}\"",
                    operation, resource
                ))
            })
    }

    /// Run `items` strictly in order, one item's calls at a time.
    ///
    /// Every output record carries the index of the item that produced it. In
    /// [`ExecutionMode::Abort`] the first failure is returned; in
    /// [`ExecutionMode::ContinueOnFail`] it becomes an `{error}` record.
    pub async fn execute(
        &self,
        transport: &dyn Transport,
        resource: Resource,
        operation: Operation,
        items: &[Item],
        mode: ExecutionMode,
    ) -> Result<Vec<OutputRecord>, Error> {
        let handler = self.handler(resource, operation)?;
        let mut output = Vec::with_capacity(items.len());

        for (index, item) in items.iter().enumerate() {
            match handler.execute(transport, item).await {
                Ok(values) => {
                    output.extend(values.into_iter().map(|v| OutputRecord::success(index, v)))
                }
                Err(e) if mode == ExecutionMode::ContinueOnFail => {
                    warn!("{}:{} failed for item {}: {}", resource, operation, index, e);
                    output.push(OutputRecord::failure(index, e.to_string()));
                }
                Err(e) => {
                    error!("{}:{} failed for item {}: {}", resource, operation, index, e);
                    return Err(e);
                }
            }
        }

        debug!(
            "{}:{} produced {} records from {} items",
            resource,
            operation,
            output.len(),
            items.len()
        );
        Ok(output)
    }
}
