//! The AWS command factory.

use std::collections::BTreeMap;

use stratus_core::{Command, CommandFactory};

use crate::api::Apis;
use crate::commands::{builders, Builder};

/// Builds every AWS command with its service handle bound.
pub struct AwsFactory {
    apis: Apis,
    index: BTreeMap<String, Builder>,
}

impl AwsFactory {
    pub fn new(apis: Apis) -> Self {
        let index = builders()
            .into_iter()
            .map(|build| (build(&apis).key(), build))
            .collect();
        AwsFactory { apis, index }
    }
}

impl CommandFactory for AwsFactory {
    fn build(&self, key: &str) -> Option<Box<dyn Command>> {
        self.index.get(key).map(|build| build(&self.apis))
    }

    fn keys(&self) -> Vec<String> {
        self.index.keys().cloned().collect()
    }
}
