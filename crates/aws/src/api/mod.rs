//! Typed provider API handles.
//!
//! Each AWS service is a trait with one async method per API call, taking
//! and returning plain serde structs named after the AWS shapes. Every trait
//! is implemented for any [`Transport`], so a single JSON transport (the HTTP
//! gateway in production, the recording mock in tests) backs all services.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use stratus_core::ProviderError;
use tracing::debug;

/// Declare a service trait and implement it for every [`Transport`].
macro_rules! provider_api {
    (
        $(#[$meta:meta])*
        $service:literal => pub trait $name:ident {
            $( fn $method:ident($input:ty) -> $output:ty = $call:literal; )*
        }
    ) => {
        $(#[$meta])*
        #[async_trait::async_trait]
        pub trait $name: Send + Sync {
            $(
                async fn $method(&self, input: $input)
                    -> Result<$output, stratus_core::ProviderError>;
            )*
        }

        #[async_trait::async_trait]
        impl<T: $crate::api::Transport> $name for T {
            $(
                async fn $method(&self, input: $input)
                    -> Result<$output, stratus_core::ProviderError> {
                    $crate::api::call(self, $service, $call, input).await
                }
            )*
        }
    };
}

mod cloudwatch;
mod ec2;
mod elbv2;
mod gateway;
mod iam;
mod route53;
mod s3;

pub use cloudwatch::*;
pub use ec2::*;
pub use elbv2::*;
pub use gateway::HttpTransport;
pub use iam::*;
pub use route53::*;
pub use s3::*;

/// Carries one provider call as JSON.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn invoke(&self, service: &'static str, call: &'static str, input: Json)
        -> Result<Json, ProviderError>;
}

/// Encode `input`, invoke `call` and decode the output.
pub(crate) async fn call<T, I, O>(
    transport: &T,
    service: &'static str,
    call: &'static str,
    input: I,
) -> Result<O, ProviderError>
where
    T: Transport + ?Sized,
    I: Serialize + Send,
    O: DeserializeOwned,
{
    let payload = serde_json::to_value(&input)
        .map_err(|e| ProviderError::new(call, format!("cannot encode input: {}", e)))?;
    let started = Instant::now();
    let out = transport.invoke(service, call, payload).await;
    debug!(
        service,
        call,
        elapsed_ms = started.elapsed().as_millis() as u64,
        ok = out.is_ok(),
        "provider call"
    );
    let out = match out? {
        Json::Null => Json::Object(Default::default()),
        other => other,
    };
    serde_json::from_value(out)
        .map_err(|e| ProviderError::new(call, format!("cannot decode output: {}", e)))
}

/// Output of calls that return nothing of interest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Empty {}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Tag {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Filter {
    pub name: String,
    pub values: Vec<String>,
}

impl Filter {
    pub fn new(name: &str, values: &[&str]) -> Self {
        Filter {
            name: name.to_string(),
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }
}

/// One handle per service, shared by every command the factory builds.
#[derive(Clone)]
pub struct Apis {
    pub ec2: Arc<dyn Ec2Api>,
    pub s3: Arc<dyn S3Api>,
    pub cloudwatch: Arc<dyn CloudWatchApi>,
    pub iam: Arc<dyn IamApi>,
    pub elbv2: Arc<dyn Elbv2Api>,
    pub route53: Arc<dyn Route53Api>,
}

impl Apis {
    /// Every service backed by the same transport.
    pub fn from_transport<T: Transport + 'static>(transport: Arc<T>) -> Self {
        Apis {
            ec2: transport.clone(),
            s3: transport.clone(),
            cloudwatch: transport.clone(),
            iam: transport.clone(),
            elbv2: transport.clone(),
            route53: transport,
        }
    }
}
