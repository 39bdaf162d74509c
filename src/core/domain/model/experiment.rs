//! Experiment entities.
//!
//! An experiment is either a local [`Draft`], which can be freely edited, or a
//! [`SubmittedExperiment`], a read-only view of what the scheduler knows about
//! it. The two are kept apart by type: there is no mutator on a submitted
//! experiment, and [`Experiment::draft_mut`] refuses with
//! [`SchedulerError::NotDraft`] when asked for one.

use crate::core::domain::{
    error::{SchedulerError, SchedulerResult, ValidationError},
    model::{experiment_name, submission_report::SubmissionReport},
    value_object::{CountryCode, SshPublicKey, serde_helpers::unix_seconds},
};
use chrono::{Local, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Container image used when none is given.
pub const DEFAULT_SCRIPT: &str = "monroe/base";
/// Experiment length in seconds used when none is given.
pub const DEFAULT_DURATION: u64 = 300;
/// Default cellular traffic quota (1 MiB).
pub const DEFAULT_TRAFFIC_BYTES: u64 = 1_048_576;
/// Default storage quota (128 MiB).
pub const DEFAULT_STORAGE_BYTES: u64 = 134_217_728;

/// Format accepted by [`Draft::set_start_local`].
pub const START_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Smallest recurrence period the scheduler accepts, and the granularity of any period.
pub const RECURRENCE_STEP: u64 = 3600;

/// Lifecycle of an experiment.
///
/// Only `Draft -> Requested` happens locally (on submission); everything after
/// that is decided by the scheduler and observed by fetching the experiment again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperimentStatus {
    Draft,
    Requested,
    Deployed,
    Started,
    Failed,
    Finished,
    /// Any status this client does not know about.
    #[serde(other)]
    Unknown,
}

impl ExperimentStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ExperimentStatus::Draft => "draft",
            ExperimentStatus::Requested => "requested",
            ExperimentStatus::Deployed => "deployed",
            ExperimentStatus::Started => "started",
            ExperimentStatus::Failed => "failed",
            ExperimentStatus::Finished => "finished",
            ExperimentStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ExperimentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which pool of nodes an experiment runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Testing,
    Deployed,
}

impl NodeType {
    /// Returns the node type for the `testing` flag of the original API.
    #[must_use]
    pub fn from_testing(testing: bool) -> Self {
        if testing {
            NodeType::Testing
        } else {
            NodeType::Deployed
        }
    }

    /// The filter tag understood by the scheduler.
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            NodeType::Testing => "type:testing",
            NodeType::Deployed => "type:deployed",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A repeating experiment: runs every `period` seconds until `until`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recurrence {
    period: u64,
    until: u64,
}

impl Recurrence {
    /// Both parts are required.
    ///
    /// # Errors
    /// Returns `ValidationError` when `period` is shorter than an hour or not
    /// a whole number of hours, or when `until` is zero.
    pub fn new(period: u64, until: u64) -> Result<Self, ValidationError> {
        if period < RECURRENCE_STEP {
            return Err(ValidationError::ConstraintViolation(format!(
                "The minimum period for recurring experiments is {} seconds",
                RECURRENCE_STEP
            )));
        }
        if period % RECURRENCE_STEP != 0 {
            return Err(ValidationError::ConstraintViolation(format!(
                "Recurrence period must be a multiple of {}",
                RECURRENCE_STEP
            )));
        }
        if until == 0 {
            return Err(ValidationError::Field {
                field: "until".to_string(),
                message: "Recurrence needs a finish time".to_string(),
            });
        }
        Ok(Self { period, until })
    }

    #[must_use]
    pub fn period(&self) -> u64 {
        self.period
    }

    #[must_use]
    pub fn until(&self) -> u64 {
        self.until
    }
}

/// Parameters for minting a draft. Every field has the scheduler's default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftOptions {
    /// Generated when `None`.
    pub name: Option<String>,
    pub script: String,
    pub node_count: u32,
    pub duration: u64,
    pub testing: bool,
}

impl Default for DraftOptions {
    fn default() -> Self {
        Self {
            name: None,
            script: DEFAULT_SCRIPT.to_string(),
            node_count: 1,
            duration: DEFAULT_DURATION,
            testing: false,
        }
    }
}

/// A locally held experiment that has not been submitted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    name: String,
    owner_id: u64,
    script: String,
    node_count: u32,
    node_type: NodeType,
    countries: Vec<CountryCode>,
    specific_nodes: Vec<u64>,
    start: u64,
    duration: u64,
    stop: u64,
    traffic_bytes: u64,
    shared_log_bytes: u64,
    storage_bytes: u64,
    results_quota: u64,
    ssh_public_key: Option<SshPublicKey>,
    extra_options: Map<String, Value>,
    recurrence: Option<Recurrence>,
}

impl Draft {
    /// Creates a draft owned by `owner_id` with every default filled in.
    ///
    /// # Errors
    /// Returns `ValidationError` when the options violate a field rule
    /// (empty name or script, zero nodes, zero duration).
    pub fn new(owner_id: u64, options: DraftOptions) -> SchedulerResult<Self> {
        let name = match options.name {
            Some(name) => {
                validate_non_empty("name", &name)?;
                name
            }
            None => experiment_name::generate(),
        };
        validate_non_empty("script", &options.script)?;
        validate_positive("node_count", u64::from(options.node_count))?;
        validate_positive("duration", options.duration)?;

        Ok(Self {
            name,
            owner_id,
            script: options.script,
            node_count: options.node_count,
            node_type: NodeType::from_testing(options.testing),
            countries: Vec::new(),
            specific_nodes: Vec::new(),
            start: 0,
            duration: options.duration,
            stop: options.duration,
            traffic_bytes: DEFAULT_TRAFFIC_BYTES,
            shared_log_bytes: 0,
            storage_bytes: DEFAULT_STORAGE_BYTES,
            results_quota: 0,
            ssh_public_key: None,
            extra_options: Map::new(),
            recurrence: None,
        })
    }

    /// Always [`ExperimentStatus::Draft`].
    #[must_use]
    pub fn status(&self) -> ExperimentStatus {
        ExperimentStatus::Draft
    }

    /// Drafts have no server id yet.
    #[must_use]
    pub fn id(&self) -> Option<u64> {
        None
    }

    /// Drafts have no server summary yet.
    #[must_use]
    pub fn summary(&self) -> Option<&str> {
        None
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn owner_id(&self) -> u64 {
        self.owner_id
    }

    #[must_use]
    pub fn script(&self) -> &str {
        &self.script
    }

    #[must_use]
    pub fn node_count(&self) -> u32 {
        self.node_count
    }

    #[must_use]
    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    /// Countries in the order they were set.
    #[must_use]
    pub fn countries(&self) -> &[CountryCode] {
        &self.countries
    }

    #[must_use]
    pub fn specific_nodes(&self) -> &[u64] {
        &self.specific_nodes
    }

    /// UNIX timestamp; `0` means as soon as possible.
    #[must_use]
    pub fn start(&self) -> u64 {
        self.start
    }

    #[must_use]
    pub fn duration(&self) -> u64 {
        self.duration
    }

    /// Always `start + duration`.
    #[must_use]
    pub fn stop(&self) -> u64 {
        self.stop
    }

    #[must_use]
    pub fn traffic_bytes(&self) -> u64 {
        self.traffic_bytes
    }

    #[must_use]
    pub fn shared_log_bytes(&self) -> u64 {
        self.shared_log_bytes
    }

    #[must_use]
    pub fn storage_bytes(&self) -> u64 {
        self.storage_bytes
    }

    #[must_use]
    pub fn results_quota(&self) -> u64 {
        self.results_quota
    }

    #[must_use]
    pub fn ssh_public_key(&self) -> Option<&SshPublicKey> {
        self.ssh_public_key.as_ref()
    }

    #[must_use]
    pub fn extra_options(&self) -> &Map<String, Value> {
        &self.extra_options
    }

    #[must_use]
    pub fn recurrence(&self) -> Option<Recurrence> {
        self.recurrence
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> SchedulerResult<()> {
        let name = name.into();
        validate_non_empty("name", &name)?;
        self.name = name;
        Ok(())
    }

    pub fn set_script(&mut self, script: impl Into<String>) -> SchedulerResult<()> {
        let script = script.into();
        validate_non_empty("script", &script)?;
        self.script = script;
        Ok(())
    }

    pub fn set_node_count(&mut self, node_count: u32) -> SchedulerResult<()> {
        validate_positive("node_count", u64::from(node_count))?;
        self.node_count = node_count;
        Ok(())
    }

    pub fn set_node_type(&mut self, node_type: NodeType) {
        self.node_type = node_type;
    }

    /// Replaces the country filter. Duplicates are dropped, first occurrence wins.
    ///
    /// # Errors
    /// Returns `ValidationError` if any code is not a two letter country code;
    /// the draft is left unchanged in that case.
    pub fn set_countries<I, S>(&mut self, codes: I) -> SchedulerResult<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut countries: Vec<CountryCode> = Vec::new();
        for code in codes {
            let code = CountryCode::new(code)?;
            if !countries.contains(&code) {
                countries.push(code);
            }
        }
        self.countries = countries;
        Ok(())
    }

    /// Pins the experiment to specific node ids. An empty list removes the pin.
    pub fn set_specific_nodes(&mut self, nodes: impl IntoIterator<Item = u64>) {
        self.specific_nodes = nodes.into_iter().collect();
    }

    /// Sets the start as a UNIX timestamp and recomputes `stop`.
    pub fn set_start(&mut self, start: u64) {
        self.start = start;
        self.recompute_stop();
    }

    /// Sets the start from a local date-time such as `2017-05-01T14:00:00`.
    ///
    /// # Errors
    /// Returns `ValidationError::Format` if the string does not match
    /// [`START_FORMAT`] or names a time before the epoch.
    pub fn set_start_local(&mut self, start: &str) -> SchedulerResult<()> {
        let start = parse_local_timestamp(start)?;
        self.set_start(start);
        Ok(())
    }

    /// Sets the duration in seconds and recomputes `stop`.
    pub fn set_duration(&mut self, duration: u64) -> SchedulerResult<()> {
        validate_positive("duration", duration)?;
        self.duration = duration;
        self.recompute_stop();
        Ok(())
    }

    pub fn set_traffic_bytes(&mut self, bytes: u64) {
        self.traffic_bytes = bytes;
    }

    pub fn set_shared_log_bytes(&mut self, bytes: u64) {
        self.shared_log_bytes = bytes;
    }

    pub fn set_storage_bytes(&mut self, bytes: u64) {
        self.storage_bytes = bytes;
    }

    pub fn set_ssh_public_key(&mut self, key: Option<SshPublicKey>) {
        self.ssh_public_key = key;
    }

    /// Replaces the extra options merged verbatim into the request options.
    ///
    /// # Errors
    /// Returns `ValidationError::Type` if `options` is not a JSON object.
    pub fn set_extra_options(&mut self, options: Value) -> SchedulerResult<()> {
        match options {
            Value::Object(map) => {
                self.extra_options = map;
                Ok(())
            }
            _ => Err(ValidationError::Type {
                field: "extra_options".to_string(),
                expected: "a JSON object with string keys".to_string(),
            }
            .into()),
        }
    }

    /// Adds or replaces a single extra option.
    pub fn insert_extra_option(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.extra_options.insert(key.into(), value.into());
    }

    pub fn set_recurrence(&mut self, recurrence: Option<Recurrence>) {
        self.recurrence = recurrence;
    }

    /// Turns the draft into the read-only view of the experiment the
    /// scheduler accepted.
    #[must_use]
    pub(crate) fn into_submitted(self, report: &SubmissionReport) -> SubmittedExperiment {
        SubmittedExperiment {
            id: report.experiment,
            name: self.name,
            owner_id: Some(self.owner_id),
            status: ExperimentStatus::Requested,
            summary: None,
            script: self.script,
            start: Some(self.start),
            stop: Some(self.stop),
            node_count: Some(self.node_count),
        }
    }

    fn recompute_stop(&mut self) {
        self.stop = self.start.saturating_add(self.duration);
    }
}

/// An experiment known to the scheduler. Read only.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SubmittedExperiment {
    id: u64,
    #[serde(default)]
    name: String,
    #[serde(default, rename = "ownerid")]
    owner_id: Option<u64>,
    status: ExperimentStatus,
    /// The scheduler reports either a text or a per-status breakdown here.
    #[serde(default)]
    summary: Option<Value>,
    #[serde(default)]
    script: String,
    #[serde(default, with = "unix_seconds::option")]
    start: Option<u64>,
    #[serde(default, with = "unix_seconds::option")]
    stop: Option<u64>,
    #[serde(default, rename = "nodecount")]
    node_count: Option<u32>,
}

impl SubmittedExperiment {
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn owner_id(&self) -> Option<u64> {
        self.owner_id
    }

    #[must_use]
    pub fn status(&self) -> ExperimentStatus {
        self.status
    }

    /// The summary exactly as the scheduler sent it.
    #[must_use]
    pub fn summary(&self) -> Option<&Value> {
        self.summary.as_ref()
    }

    #[must_use]
    pub fn script(&self) -> &str {
        &self.script
    }

    /// Start time in unix seconds.
    #[must_use]
    pub fn start(&self) -> Option<u64> {
        self.start
    }

    #[must_use]
    pub fn stop(&self) -> Option<u64> {
        self.stop
    }

    #[must_use]
    pub fn node_count(&self) -> Option<u32> {
        self.node_count
    }

    /// The summary rendered as text, whatever shape the scheduler sent.
    #[must_use]
    pub fn summary_text(&self) -> Option<String> {
        match &self.summary {
            None | Some(Value::Null) => None,
            Some(Value::String(text)) => Some(text.clone()),
            Some(other) => Some(other.to_string()),
        }
    }
}

/// Either side of the draft/submitted split, for code that handles both.
#[derive(Debug, Clone, PartialEq)]
pub enum Experiment {
    Draft(Draft),
    Submitted(SubmittedExperiment),
}

impl Experiment {
    #[must_use]
    pub fn status(&self) -> ExperimentStatus {
        match self {
            Experiment::Draft(draft) => draft.status(),
            Experiment::Submitted(experiment) => experiment.status,
        }
    }

    #[must_use]
    pub fn id(&self) -> Option<u64> {
        match self {
            Experiment::Draft(draft) => draft.id(),
            Experiment::Submitted(experiment) => Some(experiment.id),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Experiment::Draft(draft) => draft.name(),
            Experiment::Submitted(experiment) => &experiment.name,
        }
    }

    #[must_use]
    pub fn script(&self) -> &str {
        match self {
            Experiment::Draft(draft) => draft.script(),
            Experiment::Submitted(experiment) => &experiment.script,
        }
    }

    #[must_use]
    pub fn summary(&self) -> Option<String> {
        match self {
            Experiment::Draft(draft) => draft.summary().map(str::to_string),
            Experiment::Submitted(experiment) => experiment.summary_text(),
        }
    }

    #[must_use]
    pub fn as_draft(&self) -> Option<&Draft> {
        match self {
            Experiment::Draft(draft) => Some(draft),
            Experiment::Submitted(_) => None,
        }
    }

    /// Mutable access to the draft.
    ///
    /// # Errors
    /// Returns `SchedulerError::NotDraft` once the experiment has been submitted.
    pub fn draft_mut(&mut self) -> SchedulerResult<&mut Draft> {
        match self {
            Experiment::Draft(draft) => Ok(draft),
            Experiment::Submitted(experiment) => Err(SchedulerError::NotDraft {
                status: experiment.status,
            }),
        }
    }
}

impl From<Draft> for Experiment {
    fn from(draft: Draft) -> Self {
        Experiment::Draft(draft)
    }
}

impl From<SubmittedExperiment> for Experiment {
    fn from(experiment: SubmittedExperiment) -> Self {
        Experiment::Submitted(experiment)
    }
}

impl fmt::Display for Experiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = self
            .id()
            .map_or_else(|| "none".to_string(), |id| id.to_string());
        write!(
            f,
            "Experiment ID: {} Name: {} Script: {} Status: {} Summary: {}",
            id,
            self.name(),
            self.script(),
            self.status(),
            self.summary().unwrap_or_else(|| "none".to_string())
        )
    }
}

fn parse_local_timestamp(value: &str) -> Result<u64, ValidationError> {
    let format_error =
        || ValidationError::Format(format!("Start must be formatted as {}", START_FORMAT));
    let naive = NaiveDateTime::parse_from_str(value.trim(), START_FORMAT).map_err(|_| format_error())?;
    let local = Local
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(format_error)?;
    u64::try_from(local.timestamp()).map_err(|_| format_error())
}

fn validate_non_empty(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Field {
            field: field.to_string(),
            message: format!("{} cannot be empty", field),
        });
    }
    Ok(())
}

fn validate_positive(field: &str, value: u64) -> Result<(), ValidationError> {
    if value == 0 {
        return Err(ValidationError::Field {
            field: field.to_string(),
            message: format!("{} must be positive", field),
        });
    }
    Ok(())
}
