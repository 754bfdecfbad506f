mod settings;

use anyhow::Result;
use jobtime_github::GitHub;
use jobtime_report::{
    comment::Published,
    locate::{Located, locate},
};
use tracing_subscriber::{
    EnvFilter, Layer, filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::settings::{Args, FileSettings};

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = EnvFilter::builder()
        // Default to info level
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_filter(env_filter))
        .init();

    let args: Args = argp::parse_args_or_exit(argp::DEFAULT);
    let file = match &args.config {
        Some(path) => settings::load_file(path)?,
        None => FileSettings::default(),
    };
    let settings = settings::resolve(args, file, |key| std::env::var(key).ok())?;
    let github = GitHub::new(&settings.github)?;

    let config = match locate(&github, settings.invocation).await? {
        Located::PullRequest(config) => config,
        Located::NotPullRequest => {
            tracing::info!("Not running for a pull request, nothing to report");
            return Ok(());
        }
    };

    let outcome = jobtime_report::run(&github, &config, !settings.dry_run).await?;
    match outcome.published {
        Some(Published::Created(id) | Published::Updated(id)) => {
            tracing::info!("Report published to #{} (comment {})", config.pull_request, id);
        }
        None => println!("{}", outcome.report),
    }
    Ok(())
}
