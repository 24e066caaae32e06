use serde::{Deserialize, Serialize};

use super::Empty;

provider_api! {
    /// CloudWatch metric alarms.
    "cloudwatch" => pub trait CloudWatchApi {
        fn put_metric_alarm(MetricAlarm) -> Empty = "PutMetricAlarm";
        fn describe_alarms(AlarmNamesInput) -> DescribeAlarmsOutput = "DescribeAlarms";
        fn delete_alarms(AlarmNamesInput) -> Empty = "DeleteAlarms";
        fn enable_alarm_actions(AlarmNamesInput) -> Empty = "EnableAlarmActions";
        fn disable_alarm_actions(AlarmNamesInput) -> Empty = "DisableAlarmActions";
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Dimension {
    pub name: String,
    pub value: String,
}

/// Both the `PutMetricAlarm` input and a `DescribeAlarms` result entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct MetricAlarm {
    pub alarm_name: String,
    pub comparison_operator: String,
    pub evaluation_periods: i64,
    pub metric_name: String,
    pub namespace: String,
    pub period: i64,
    pub statistic: String,
    pub threshold: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alarm_actions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub insufficient_data_actions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[serde(rename = "OKActions")]
    pub ok_actions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alarm_description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dimensions: Vec<Dimension>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AlarmNamesInput {
    pub alarm_names: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeAlarmsOutput {
    #[serde(default)]
    pub metric_alarms: Vec<MetricAlarm>,
}
