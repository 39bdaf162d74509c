mod auth;
mod core;
mod experiment;

pub use crate::auth::application::service::auth_service::AuthService;
pub use crate::core::domain::{
    error::{SchedulerError, SchedulerResult, ValidationError},
    model::{
        auth_identity::{AuthIdentity, AuthUser},
        availability_report::{AvailabilityOutcome, AvailabilityReport},
        experiment::{
            DEFAULT_DURATION, DEFAULT_SCRIPT, DEFAULT_STORAGE_BYTES, DEFAULT_TRAFFIC_BYTES, Draft,
            DraftOptions, Experiment, ExperimentStatus, NodeType, RECURRENCE_STEP, Recurrence,
            START_FORMAT, SubmittedExperiment,
        },
        journal_entry::JournalEntry,
        node::Node,
        results_report::{ResultsReport, ScheduleDownload},
        schedule::Schedule,
        scheduler_connection::SchedulerConnection,
        submission_report::{SubmissionOutcome, SubmissionReport},
    },
    value_object::{ClientIdentity, CountryCode, DEFAULT_SCHEDULER_URL, SchedulerUrl, SshPublicKey},
};
pub use crate::core::infrastructure::{
    api_client::ApiClient,
    client_config::{ClientConfig, DEFAULT_EXPERIMENT_HISTORY, RateLimitConfig, TunnelConfig},
    transport::Transport,
};
pub use crate::experiment::application::{
    request::{
        availability_query::AvailabilityQuery,
        submission_request::{SubmissionRequest, node_type_filter},
    },
    service::{
        availability_service::AvailabilityService, results_service::ResultsService,
        submission_service::SubmissionService,
    },
};

use crate::{
    core::infrastructure::{
        reachability,
        transport::{get_as, message_of},
    },
    experiment::application::response::schedules_response::SchedulesResponse,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// A client for the MONROE experiment scheduler.
///
/// The client covers the whole life of an experiment:
/// - Identity lookup through the client certificate
/// - Drafting, availability checks and submission
/// - Listing experiments, schedules, nodes and quota journals
/// - Deleting experiments and downloading their results
///
/// Every operation is one chain of independent requests. The client holds
/// no mutable state and can be shared between tasks.
///
/// # Examples
///
/// ```no_run
/// use monroe_scheduler::{DraftOptions, SchedulerClient, SchedulerResult, SubmissionOutcome};
///
/// #[tokio::main]
/// async fn main() -> SchedulerResult<()> {
///     let client = SchedulerClient::builder()
///         .identity_files("mnr_crt.pem", "mnr_key.pem")
///         .build()
///         .await?;
///
///     let draft = client.new_draft(DraftOptions::default()).await?;
///     match client.submit(draft).await? {
///         SubmissionOutcome::Accepted { experiment, .. } => println!("Experiment {}", experiment.id()),
///         SubmissionOutcome::Failed { message, .. } => println!("{}", message),
///     }
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct SchedulerClient {
    transport: Arc<dyn Transport>,
    config: ClientConfig,
}

/// Builder for SchedulerClient configuration
#[derive(Debug, Default)]
pub struct SchedulerClientBuilder {
    base_url: Option<SchedulerUrl>,
    identity: Option<ClientIdentity>,
    identity_files: Option<(PathBuf, PathBuf)>,
    ca_certificate: Option<Vec<u8>>,
    accept_invalid_certs: bool,
    config: ClientConfig,
}

impl SchedulerClientBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> SchedulerResult<Self> {
        self.base_url = Some(SchedulerUrl::new(url)?);
        Ok(self)
    }

    pub fn identity(mut self, identity: ClientIdentity) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Certificate and key PEM files, read when the client is built.
    pub fn identity_files(
        mut self,
        certificate_path: impl Into<PathBuf>,
        key_path: impl Into<PathBuf>,
    ) -> Self {
        self.identity_files = Some((certificate_path.into(), key_path.into()));
        self
    }

    /// Extra root certificate (PEM) trusted for the scheduler.
    pub fn ca_certificate(mut self, pem: impl Into<Vec<u8>>) -> Self {
        self.ca_certificate = Some(pem.into());
        self
    }

    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub async fn build(self) -> SchedulerResult<SchedulerClient> {
        let identity = match (self.identity, self.identity_files) {
            (Some(identity), _) => identity,
            (None, Some((certificate, key))) => ClientIdentity::from_files(certificate, key).await?,
            (None, None) => {
                return Err(ValidationError::Field {
                    field: "identity".to_string(),
                    message: "A client certificate and key are required".to_string(),
                }
                .into());
            }
        };

        let connection = SchedulerConnection::new(
            self.base_url.unwrap_or_default(),
            Some(identity),
            self.ca_certificate,
            self.accept_invalid_certs,
        );
        let api_client = ApiClient::new(connection, &self.config)?;

        Ok(SchedulerClient::with_transport(
            Arc::new(api_client),
            self.config,
        ))
    }
}

impl SchedulerClient {
    /// Creates a new builder for SchedulerClient configuration
    pub fn builder() -> SchedulerClientBuilder {
        SchedulerClientBuilder::default()
    }

    /// Creates a client on top of any [`Transport`].
    pub fn with_transport(transport: Arc<dyn Transport>, config: ClientConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the user the client certificate belongs to.
    ///
    /// # Errors
    ///
    /// Any failure is reported as `SchedulerError::Authentication`.
    pub async fn authenticate(&self) -> SchedulerResult<AuthIdentity> {
        AuthService::new().execute(self.transport.as_ref()).await
    }

    /// Creates a draft owned by the authenticated user.
    ///
    /// Only the identity call touches the network.
    pub async fn new_draft(&self, options: DraftOptions) -> SchedulerResult<Draft> {
        let identity = self.authenticate().await?;
        Draft::new(identity.id(), options)
    }

    /// Searches for the first slot matching `query`.
    pub async fn availability(
        &self,
        query: &AvailabilityQuery,
    ) -> SchedulerResult<AvailabilityOutcome> {
        AvailabilityService::new()
            .execute(self.transport.as_ref(), query)
            .await
    }

    /// Searches a slot with the default query (one testing node, 300 s, now).
    pub async fn default_availability(&self) -> SchedulerResult<AvailabilityOutcome> {
        self.availability(&AvailabilityQuery::default()).await
    }

    /// Searches a slot for what `draft` asks for.
    pub async fn check_availability(&self, draft: &Draft) -> SchedulerResult<AvailabilityOutcome> {
        self.availability(&AvailabilityQuery::from_draft(draft)).await
    }

    /// Like [`Self::check_availability`] for either kind of experiment.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::PastExperiment` for an experiment that was
    /// already submitted.
    pub async fn experiment_availability(
        &self,
        experiment: &Experiment,
    ) -> SchedulerResult<AvailabilityOutcome> {
        match experiment {
            Experiment::Draft(draft) => self.check_availability(draft).await,
            Experiment::Submitted(submitted) => Err(SchedulerError::PastExperiment {
                status: submitted.status(),
            }),
        }
    }

    /// Submits `draft`, consuming it.
    ///
    /// On acceptance the outcome carries the experiment in `requested` state,
    /// which can no longer be edited. A refused draft is handed back in
    /// [`SubmissionOutcome::Failed`].
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::Conflict` before any request if the draft has
    /// both an SSH key and a recurrence. [`SubmissionRequest::from_draft`]
    /// runs the same check without giving up the draft.
    pub async fn submit(&self, draft: Draft) -> SchedulerResult<SubmissionOutcome> {
        SubmissionService::new()
            .execute(self.transport.as_ref(), draft)
            .await
    }

    /// Quota journal of the authenticated user.
    pub async fn journals(&self) -> SchedulerResult<Vec<JournalEntry>> {
        let identity = self.authenticate().await?;
        get_as(
            self.transport.as_ref(),
            &format!("/v1/users/{}/journals", identity.id()),
        )
        .await
    }

    /// Every node known to the scheduler.
    pub async fn nodes(&self) -> SchedulerResult<Vec<Node>> {
        get_as(self.transport.as_ref(), "/v1/resources/").await
    }

    /// The last `max` experiments of the authenticated user, in server order.
    pub async fn list_experiments(&self, max: usize) -> SchedulerResult<Vec<SubmittedExperiment>> {
        let identity = self.authenticate().await?;
        let mut experiments: Vec<SubmittedExperiment> = get_as(
            self.transport.as_ref(),
            &format!("/v1/users/{}/experiments", identity.id()),
        )
        .await?;
        let skip = experiments.len().saturating_sub(max);
        experiments.drain(..skip);
        Ok(experiments)
    }

    /// [`Self::list_experiments`] with the configured history size.
    pub async fn recent_experiments(&self) -> SchedulerResult<Vec<SubmittedExperiment>> {
        self.list_experiments(self.config.experiment_history).await
    }

    /// Schedules of an experiment, in the order the scheduler listed them.
    pub async fn schedules(&self, experiment_id: u64) -> SchedulerResult<Vec<Schedule>> {
        let response: SchedulesResponse =
            get_as(self.transport.as_ref(), &schedules_path(experiment_id)).await?;
        response.into_schedules()
    }

    /// Deletes an experiment and returns the scheduler's message.
    ///
    /// # Errors
    ///
    /// Every failure is reported as `SchedulerError::DeletionFailed`.
    pub async fn delete_experiment(&self, experiment_id: u64) -> SchedulerResult<String> {
        let response = self
            .transport
            .delete(&schedules_path(experiment_id))
            .await
            .map_err(|e| match e {
                SchedulerError::Api { message, .. } => SchedulerError::DeletionFailed(message),
                other => SchedulerError::DeletionFailed(other.to_string()),
            })?;

        let message = message_of(&response)
            .map(str::to_string)
            .unwrap_or_else(|| response.to_string());
        info!(experiment = experiment_id, %message, "experiment deleted");
        Ok(message)
    }

    /// Downloads the results of every schedule into `root/<experiment_id>/`.
    ///
    /// # Errors
    ///
    /// Fails only if the schedules cannot be listed. Per-schedule download
    /// failures are recorded in the report.
    pub async fn fetch_results_into(
        &self,
        experiment_id: u64,
        root: impl AsRef<Path>,
    ) -> SchedulerResult<ResultsReport> {
        let schedules = self.schedules(experiment_id).await?;
        Ok(ResultsService::new()
            .execute(
                self.transport.as_ref(),
                experiment_id,
                &schedules,
                root.as_ref(),
            )
            .await)
    }

    /// [`Self::fetch_results_into`] the current directory.
    pub async fn fetch_results(&self, experiment_id: u64) -> SchedulerResult<ResultsReport> {
        self.fetch_results_into(experiment_id, ".").await
    }

    /// Tunnel port forwarding to the container of `schedule`.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the node id does not fit a port number.
    pub fn tunnel_port(&self, schedule: &Schedule) -> SchedulerResult<u16> {
        u64::from(self.config.tunnel.port_base)
            .checked_add(schedule.node_id)
            .and_then(|port| u16::try_from(port).ok())
            .ok_or_else(|| {
                ValidationError::ConstraintViolation(format!(
                    "Node {} has no tunnel port above {}",
                    schedule.node_id, self.config.tunnel.port_base
                ))
                .into()
            })
    }

    /// Waits until the SSH tunnel of `schedule` accepts connections.
    ///
    /// Returns `false` once the configured probe budget is spent.
    pub async fn wait_for_tunnel(&self, schedule: &Schedule) -> SchedulerResult<bool> {
        let port = self.tunnel_port(schedule)?;
        let tunnel = &self.config.tunnel;
        Ok(reachability::wait_for_port(
            &tunnel.address,
            port,
            tunnel.probe_interval,
            tunnel.probe_budget,
        )
        .await)
    }
}

fn schedules_path(experiment_id: u64) -> String {
    format!("/v1/experiments/{}/schedules", experiment_id)
}

#[cfg(test)]
mod tests;
