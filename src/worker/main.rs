mod executor;

use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tokio::sync::watch;

use volunteer_match::config::Config;
use volunteer_match::queue::JobQueue;
use volunteer_match::services::{LogMailer, Mailer, SmtpMailer};
use volunteer_match::state::connect_queue;

use executor::JobExecutor;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting notification worker...");

    let config = Config::from_env().context("Failed to load configuration")?;

    tracing::info!("Connecting to Redis...");
    let queue: Arc<dyn JobQueue> = Arc::new(
        connect_queue(&config)
            .await
            .context("Failed to connect to the email queue")?,
    );

    let mailer: Arc<dyn Mailer> = match &config.smtp {
        Some(smtp) => {
            tracing::info!(host = %smtp.host, port = smtp.port, "Delivering through SMTP");
            Arc::new(SmtpMailer::new(smtp).context("Failed to configure SMTP transport")?)
        }
        None => {
            tracing::warn!("SMTP_HOST not set, emails will only be logged");
            Arc::new(LogMailer)
        }
    };

    // Set up graceful shutdown
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, stopping worker...");
        let _ = shutdown_tx.send(true);
    });

    let executor = JobExecutor::new(queue.clone(), mailer);

    tracing::info!("Worker started, waiting for emails...");
    loop {
        if *shutdown_rx.borrow() {
            tracing::info!("Shutdown requested, exiting worker loop");
            break;
        }

        match queue.dequeue(config.worker_poll_seconds).await {
            Ok(Some(job)) => {
                let job_id = job.id;
                tracing::info!(job_id = %job_id, to = %job.to, "Processing email");

                match executor.execute(job).await {
                    Ok(status) => {
                        tracing::debug!(job_id = %job_id, status = status.as_str(), "Email processed");
                    }
                    Err(e) => {
                        tracing::error!(job_id = %job_id, error = %e, "Failed to record email outcome");
                    }
                }
            }
            Ok(None) => {
                // Nothing queued; dequeue already waited
            }
            Err(e) => {
                tracing::error!(error = %e, "Error dequeuing email");
                tokio::time::sleep(std::time::Duration::from_secs(1)).await;
            }
        }
    }

    tracing::info!("Worker shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
