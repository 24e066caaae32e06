//! Documentation of the AWS command catalogue.

use std::sync::OnceLock;

use stratus_core::Docs;
use tracing::warn;

use crate::commands::{
    alarm, bucket, elasticip, iam, instance, loadbalancer, securitygroup, volume,
};

const COMMANDS_TOML: &str = include_str!("../docs/commands.toml");

/// The catalogue documentation, parsed once.
pub fn docs() -> &'static Docs {
    static DOCS: OnceLock<Docs> = OnceLock::new();
    DOCS.get_or_init(|| {
        let docs = Docs::from_toml(COMMANDS_TOML).unwrap_or_else(|e| {
            warn!(error = %e, "invalid command documentation");
            Docs::default()
        });
        docs.with_enum("create", "bucket", "acl", bucket::ACLS)
            .with_enum("update", "bucket", "acl", bucket::ACLS)
            .with_enum("create", "alarm", "operator", alarm::OPERATORS)
            .with_enum("create", "elasticip", "domain", elasticip::DOMAINS)
            .with_enum("create", "policy", "effect", iam::EFFECTS)
            .with_enum("update", "securitygroup", "inbound", securitygroup::RULE_ACTIONS)
            .with_enum("update", "securitygroup", "outbound", securitygroup::RULE_ACTIONS)
            .with_enum("check", "instance", "state", instance::INSTANCE_STATES)
            .with_enum("check", "volume", "state", volume::VOLUME_STATES)
            .with_enum("check", "securitygroup", "state", securitygroup::SECURITYGROUP_STATES)
            .with_enum("check", "loadbalancer", "state", loadbalancer::LOADBALANCER_STATES)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::builders;
    use crate::testing::{apis, Recorder};

    #[test]
    fn toml_parses() {
        assert!(Docs::from_toml(COMMANDS_TOML).is_ok());
    }

    #[test]
    fn every_command_and_param_is_documented() {
        let apis = apis(&Recorder::new());
        for build in builders() {
            let cmd = build(&apis);
            let (action, entity) = (cmd.action(), cmd.entity());
            assert!(
                docs().description_for(action, entity).is_some(),
                "{action} {entity} has no description"
            );
            let (required, optional, suggested) = cmd.params_rule().list();
            for param in required.iter().chain(&optional).chain(&suggested) {
                assert!(
                    docs().help_for(action, entity, param).is_some(),
                    "{action} {entity}: param '{param}' is undocumented"
                );
            }
        }
    }

    #[test]
    fn enum_values_are_appended_to_help() {
        let help = docs().help_for("create", "elasticip", "domain").unwrap();
        assert_eq!(help, "Address domain (vpc | standard)");
    }
}
