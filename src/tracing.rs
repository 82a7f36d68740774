use crate::Status;
use tracing::{level_filters::LevelFilter, Level};
use tracing_stackdriver::CloudTraceConfiguration;
use tracing_subscriber::{
    fmt::writer::MakeWriterExt, layer::SubscriberExt, util::SubscriberInitExt, Layer,
};

pub struct Tracing;

impl Tracing {
    /// Human readable logs on stdout for operators running a batch by hand.
    pub fn setup(name: &str) -> Result<(), Status> {
        match tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::Layer::new()
                    .with_target(false)
                    .with_writer(std::io::stdout.with_max_level(Level::INFO))
                    .with_filter(LevelFilter::INFO),
            )
            .try_init()
        {
            Ok(()) => Ok(()),
            Err(e) => {
                eprintln!("{name}: {e}");
                Err(Status::new("Failed to setup tracing", e))
            }
        }
    }

    /// Structured JSON logs for runs that are collected by Cloud Logging.
    pub fn setup_prod(project_id: &str) -> Result<(), Status> {
        match tracing_subscriber::registry()
            .with(tracing_opentelemetry::layer())
            .with(
                tracing_stackdriver::layer()
                    .with_cloud_trace(CloudTraceConfiguration {
                        project_id: project_id.to_owned(),
                    })
                    .with_writer(std::io::stdout.with_max_level(Level::INFO)),
            )
            .try_init()
        {
            Ok(()) => Ok(()),
            Err(e) => {
                eprintln!("{project_id}: {e}");
                Err(Status::new("Failed to setup tracing", e))
            }
        }
    }

    /// Picks the subscriber for a batch binary based on its `--prod-tracing`
    /// flag.
    pub fn init(name: &str, prod: bool) -> Result<(), Status> {
        match prod {
            false => Tracing::setup(name),
            true => Tracing::setup_prod(name),
        }
    }
}
