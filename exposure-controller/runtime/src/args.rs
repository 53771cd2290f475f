use crate::snapshot::{read_document, Snapshot};
use anyhow::Result;
use clap::{Parser, Subcommand};
use exposure_controller_core::{
    network::{NetworkInfo, VisitAddress},
    update::UpdateNetworkSpec,
    ExposureConfig,
};
use exposure_controller_k8s_api::annotations::DEFAULT_BASE_DOMAIN;
use exposure_controller_k8s_index as index;
use exposure_controller_k8s_plan as plan;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Parser)]
#[clap(
    name = "exposure-controller",
    about = "Infers and plans how workloads are exposed by Services and Ingresses"
)]
pub struct Args {
    #[clap(
        long,
        default_value = "exposure_controller=info,warn",
        env = "EXPOSURE_CONTROLLER_LOG"
    )]
    log_level: kubert::LogFilter,

    #[clap(long, default_value = "plain")]
    log_format: kubert::LogFormat,

    /// Domain that scopes the creator and domain annotation keys.
    #[clap(long, default_value = DEFAULT_BASE_DOMAIN, env = "LABEL_BASE_DOMAIN")]
    base_domain: String,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Prints the network model and access addresses of a workload.
    Inspect(WorkloadArgs),

    /// Prints the Services and Ingresses through which a workload is exposed.
    Resources(WorkloadArgs),

    /// Prints new Services and Ingresses for a desired network model.
    Generate {
        #[clap(flatten)]
        workload: WorkloadArgs,

        /// A `NetworkInfo` document.
        #[clap(long)]
        network: PathBuf,
    },

    /// Prints the ordered actions that apply a change to a workload's exposure.
    Plan {
        #[clap(flatten)]
        workload: WorkloadArgs,

        /// An `UpdateNetworkSpec` document.
        #[clap(long)]
        change: PathBuf,
    },
}

#[derive(Debug, clap::Args)]
struct WorkloadArgs {
    /// Name of the Deployment, StatefulSet or DaemonSet.
    #[clap(long)]
    workload: String,

    /// YAML or JSON files holding the namespace's objects.
    #[clap(long = "snapshot", required = true)]
    snapshots: Vec<PathBuf>,

    #[clap(long, default_value = "default")]
    namespace: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Inspection {
    network_info: NetworkInfo,
    visit_addresses: VisitAddress,
}

impl Args {
    #[inline]
    pub async fn parse_and_run() -> Result<()> {
        Self::parse().run().await
    }

    pub async fn run(self) -> Result<()> {
        let Self {
            log_level,
            log_format,
            base_domain,
            command,
        } = self;

        log_format.try_init(log_level)?;
        let config = ExposureConfig::new(base_domain);

        let output = match command {
            Command::Inspect(args) => {
                let snapshot = args.load().await?;
                let workload = snapshot.workload(&args.workload)?;
                let (network_info, visit_addresses) = index::network_info(
                    workload,
                    snapshot.ingresses(),
                    snapshot.services(),
                    &config,
                );
                serde_json::to_value(Inspection {
                    network_info,
                    visit_addresses,
                })?
            }

            Command::Resources(args) => {
                let snapshot = args.load().await?;
                let workload = snapshot.workload(&args.workload)?;
                let resources = index::workload_resources(
                    workload,
                    snapshot.ingresses(),
                    snapshot.services(),
                    &config,
                );
                serde_json::to_value(resources)?
            }

            Command::Generate { workload, network } => {
                let (snapshot, network) = tokio::try_join!(
                    workload.load(),
                    read_document::<NetworkInfo>(&network)
                )?;
                let workload = snapshot.workload(&workload.workload)?;
                let manifests = plan::synthesize_network(&network, workload, &config)?;
                serde_json::to_value(manifests)?
            }

            Command::Plan { workload, change } => {
                let (snapshot, change) = tokio::try_join!(
                    workload.load(),
                    read_document::<UpdateNetworkSpec>(&change)
                )?;
                let workload = snapshot.workload(&workload.workload)?;
                let live = snapshot.live(change.old_refs());
                let actions = plan::plan(&change, live, workload, &config)?;
                serde_json::to_value(actions)?
            }
        };

        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }
}

// === impl WorkloadArgs ===

impl WorkloadArgs {
    async fn load(&self) -> Result<Snapshot> {
        let snapshot = Snapshot::load(&self.namespace, &self.snapshots).await?;
        info!(
            ns = %snapshot.namespace(),
            workload = %self.workload,
            "Loaded snapshot"
        );
        Ok(snapshot)
    }
}
