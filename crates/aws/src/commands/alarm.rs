//! CloudWatch metric alarms.

use std::sync::Arc;

use async_trait::async_trait;
use stratus_core::params::{is_in_enum_ignore_case, Validators};
use stratus_core::value::required;
use stratus_core::{Command, CommandError, Injector, ParamMap, Rule, RunContext};

use crate::api::{AlarmNamesInput, CloudWatchApi, Dimension, MetricAlarm};

pub const OPERATORS: &[&str] = &[
    "GreaterThanThreshold",
    "LessThanThreshold",
    "LessThanOrEqualToThreshold",
    "GreaterThanOrEqualToThreshold",
];

pub struct CreateAlarm {
    api: Arc<dyn CloudWatchApi>,
    input: MetricAlarm,
}

impl CreateAlarm {
    pub fn new(api: Arc<dyn CloudWatchApi>) -> Self {
        CreateAlarm {
            api,
            input: MetricAlarm::default(),
        }
    }
}

#[async_trait]
impl Command for CreateAlarm {
    descriptor!("create", "alarm", "cloudwatch");

    fn params_rule(&self) -> Rule {
        Rule::all_of(vec![
            Rule::key("evaluation-periods"),
            Rule::key("metric"),
            Rule::key("name"),
            Rule::key("namespace"),
            Rule::key("operator"),
            Rule::key("period"),
            Rule::key("statistic-function"),
            Rule::key("threshold"),
            Rule::opt(&[
                "alarm-actions",
                "description",
                "dimensions",
                "enabled",
                "insufficientdata-actions",
                "ok-actions",
                "unit",
            ]),
        ])
    }

    fn validators(&self) -> Validators {
        Validators::new().with("operator", is_in_enum_ignore_case(OPERATORS))
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError> {
        let p = Injector::new(params);
        let dimensions = p
            .raw("dimensions")
            .map(|v| v.as_map())
            .unwrap_or_default()
            .into_iter()
            .map(|(name, value)| Dimension { name, value })
            .collect();
        self.input = MetricAlarm {
            alarm_name: required(p.string("name")?, "name")?,
            comparison_operator: required(p.string("operator")?, "operator")?,
            evaluation_periods: required(p.int("evaluation-periods")?, "evaluation-periods")?,
            metric_name: required(p.string("metric")?, "metric")?,
            namespace: required(p.string("namespace")?, "namespace")?,
            period: required(p.int("period")?, "period")?,
            statistic: required(p.string("statistic-function")?, "statistic-function")?,
            threshold: required(p.float("threshold")?, "threshold")?,
            actions_enabled: p.bool("enabled")?,
            alarm_actions: p.strings("alarm-actions")?.unwrap_or_default(),
            insufficient_data_actions: p
                .strings("insufficientdata-actions")?
                .unwrap_or_default(),
            ok_actions: p.strings("ok-actions")?.unwrap_or_default(),
            alarm_description: p.string("description")?,
            dimensions,
            unit: p.string("unit")?,
        };
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        self.api.put_metric_alarm(self.input.clone()).await?;
        Ok(self.input.alarm_name.clone())
    }
}

fn alarm_names(params: &ParamMap) -> Result<AlarmNamesInput, CommandError> {
    let p = Injector::new(params);
    Ok(AlarmNamesInput {
        alarm_names: required(p.strings("name")?, "name")?,
    })
}

pub struct DeleteAlarm {
    api: Arc<dyn CloudWatchApi>,
    input: AlarmNamesInput,
}

impl DeleteAlarm {
    pub fn new(api: Arc<dyn CloudWatchApi>) -> Self {
        DeleteAlarm {
            api,
            input: AlarmNamesInput::default(),
        }
    }
}

#[async_trait]
impl Command for DeleteAlarm {
    descriptor!("delete", "alarm", "cloudwatch");

    fn params_rule(&self) -> Rule {
        Rule::key("name")
    }

    fn returns_result(&self) -> bool {
        false
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError> {
        self.input = alarm_names(params)?;
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        self.api.delete_alarms(self.input.clone()).await?;
        Ok(String::new())
    }
}

pub struct StartAlarm {
    api: Arc<dyn CloudWatchApi>,
    input: AlarmNamesInput,
}

impl StartAlarm {
    pub fn new(api: Arc<dyn CloudWatchApi>) -> Self {
        StartAlarm {
            api,
            input: AlarmNamesInput::default(),
        }
    }
}

#[async_trait]
impl Command for StartAlarm {
    descriptor!("start", "alarm", "cloudwatch");

    fn params_rule(&self) -> Rule {
        Rule::key("names")
    }

    fn returns_result(&self) -> bool {
        false
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError> {
        self.input.alarm_names = required(Injector::new(params).strings("names")?, "names")?;
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        self.api.enable_alarm_actions(self.input.clone()).await?;
        Ok(String::new())
    }
}

pub struct StopAlarm {
    api: Arc<dyn CloudWatchApi>,
    input: AlarmNamesInput,
}

impl StopAlarm {
    pub fn new(api: Arc<dyn CloudWatchApi>) -> Self {
        StopAlarm {
            api,
            input: AlarmNamesInput::default(),
        }
    }
}

#[async_trait]
impl Command for StopAlarm {
    descriptor!("stop", "alarm", "cloudwatch");

    fn params_rule(&self) -> Rule {
        Rule::key("names")
    }

    fn returns_result(&self) -> bool {
        false
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError> {
        self.input.alarm_names = required(Injector::new(params).strings("names")?, "names")?;
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        self.api.disable_alarm_actions(self.input.clone()).await?;
        Ok(String::new())
    }
}

// ──────────────────────────────────────────────
// attach / detach alarm actions
// ──────────────────────────────────────────────

/// Fetch alarm `name`, let `edit` change its actions and store it back.
async fn edit_actions(
    api: &dyn CloudWatchApi,
    name: &str,
    edit: impl FnOnce(&mut Vec<String>) + Send,
) -> Result<(), CommandError> {
    let out = api
        .describe_alarms(AlarmNamesInput {
            alarm_names: vec![name.to_string()],
        })
        .await?;
    let mut alarm = out
        .metric_alarms
        .into_iter()
        .find(|a| a.alarm_name == name)
        .ok_or_else(|| CommandError::Other(format!("alarm '{}' not found", name)))?;
    edit(&mut alarm.alarm_actions);
    api.put_metric_alarm(alarm).await?;
    Ok(())
}

fn action_params(params: &ParamMap) -> Result<(String, String), CommandError> {
    let p = Injector::new(params);
    Ok((
        required(p.string("action-arn")?, "action-arn")?,
        required(p.string("name")?, "name")?,
    ))
}

pub struct AttachAlarm {
    api: Arc<dyn CloudWatchApi>,
    action: String,
    name: String,
}

impl AttachAlarm {
    pub fn new(api: Arc<dyn CloudWatchApi>) -> Self {
        AttachAlarm {
            api,
            action: String::new(),
            name: String::new(),
        }
    }
}

#[async_trait]
impl Command for AttachAlarm {
    descriptor!("attach", "alarm", "cloudwatch");

    fn params_rule(&self) -> Rule {
        Rule::all_of(vec![Rule::key("action-arn"), Rule::key("name")])
    }

    fn returns_result(&self) -> bool {
        false
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError> {
        (self.action, self.name) = action_params(params)?;
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        let action = self.action.clone();
        edit_actions(self.api.as_ref(), &self.name, move |actions| {
            actions.push(action)
        })
        .await?;
        Ok(String::new())
    }
}

pub struct DetachAlarm {
    api: Arc<dyn CloudWatchApi>,
    action: String,
    name: String,
}

impl DetachAlarm {
    pub fn new(api: Arc<dyn CloudWatchApi>) -> Self {
        DetachAlarm {
            api,
            action: String::new(),
            name: String::new(),
        }
    }
}

#[async_trait]
impl Command for DetachAlarm {
    descriptor!("detach", "alarm", "cloudwatch");

    fn params_rule(&self) -> Rule {
        Rule::all_of(vec![Rule::key("action-arn"), Rule::key("name")])
    }

    fn returns_result(&self) -> bool {
        false
    }

    fn inject(&mut self, params: &ParamMap) -> Result<(), CommandError> {
        (self.action, self.name) = action_params(params)?;
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext) -> Result<String, CommandError> {
        let action = self.action.clone();
        edit_actions(self.api.as_ref(), &self.name, move |actions| {
            actions.retain(|a| a != &action)
        })
        .await?;
        Ok(String::new())
    }
}
