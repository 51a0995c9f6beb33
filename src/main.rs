use std::sync::Arc;
use std::time::Duration;

use backup_state_sync::app::{notify_outcomes, track_running_job, AppContext};
use backup_state_sync::events::{self, EventPump};
use backup_state_sync::format::{format_bytes, format_relative_time};
use backup_state_sync::gateway::HttpGateway;
use backup_state_sync::logging::init_tracing;
use backup_state_sync::models::Repository;
use backup_state_sync::stores::Toast;
use backup_state_sync::{ClientError, Config};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    let config = Config::load().await;
    init_tracing(&config.log_level);
    info!(urls = ?config.gateway_urls, "Starting backup state monitor");

    let gateway = Arc::new(HttpGateway::from_config(&config)?);
    let app = AppContext::new(gateway.clone(), &config);

    let pump = EventPump::new(
        gateway,
        app.bus.clone(),
        Duration::from_secs(config.event_poll_timeout_secs),
    )
    .spawn();

    let mut listeners = track_running_job(&app.bus, &app.jobs);
    listeners.extend(notify_outcomes(&app.bus, &app.notifications));
    listeners.push(events::on_backup_progress(&app.bus, |progress| {
        info!(
            percent = ?progress.base.percent(),
            files = progress.files_processed,
            bytes = %format_bytes(progress.bytes_processed),
            file = ?progress.current_file,
            "Backup progress"
        );
    }));
    listeners.push(events::on_scheduled_backup_started(&app.bus, |event| {
        info!(job = %event.job_id, "Scheduled backup started");
    }));
    listeners.push(events::on_portable_store_status(&app.bus, {
        let system = app.system.clone();
        move |status| system.set_portable_status(Some(status))
    }));

    let subscriptions = vec![
        app.repositories.repositories().subscribe(log_repositories),
        app.repositories.error().subscribe(|err: &Option<String>| {
            if let Some(message) = err {
                error!(message = %message, "Repository store error");
            }
        }),
        app.jobs.running_job_id().subscribe(|running: &Option<String>| match running {
            Some(job) => info!(job = %job, "Backup running"),
            None => info!("No backup running"),
        }),
        app.notifications.toasts().subscribe(|toasts: &Vec<Toast>| {
            if let Some(toast) = toasts.last() {
                info!(severity = ?toast.severity, message = %toast.message, "Notification");
            }
        }),
    ];

    app.system.refresh().await;
    app.settings.load().await;
    app.repositories.load_repositories().await;
    app.jobs.load_jobs().await;
    app.snapshots.load_snapshots(None).await;
    info!(
        snapshots = app.snapshots.snapshots().with(Vec::len),
        jobs = app.jobs.jobs().with(Vec::len),
        "Initial state loaded, waiting for events (Ctrl-C to quit)"
    );

    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = ?err, "Failed to listen for Ctrl-C");
    }

    info!("Shutting down");
    pump.stop().await;
    for listener in listeners {
        listener.unlisten();
    }
    for subscription in subscriptions {
        subscription.unsubscribe();
    }
    Ok(())
}

fn log_repositories(repositories: &Vec<Repository>) {
    for repo in repositories {
        let last_accessed = repo
            .last_accessed
            .map(format_relative_time)
            .unwrap_or_else(|| "never".to_string());
        info!(
            id = %repo.id,
            name = %repo.name,
            status = repo.status.label(),
            size = %format_bytes(repo.total_size),
            snapshots = repo.snapshot_count,
            last_accessed = %last_accessed,
            "Repository"
        );
    }
}
