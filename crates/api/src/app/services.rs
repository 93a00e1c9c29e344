use std::sync::Arc;

use rsvp_infra::{
    config::AppConfig,
    notifier::{HttpEmailNotifier, LogNotifier, NotificationDispatcher, Notifier},
    JsonFileResponseStore, QueryService, ResponseStore, SubmissionService,
};

/// Store handle shared by the submission and query services.
pub type SharedStore = Arc<dyn ResponseStore>;

pub struct AppServices {
    pub submissions: SubmissionService<SharedStore>,
    pub queries: QueryService<SharedStore>,
}

impl AppServices {
    pub fn new(store: SharedStore, notifications: NotificationDispatcher) -> Self {
        Self {
            submissions: SubmissionService::new(store.clone(), notifications),
            queries: QueryService::new(store),
        }
    }
}

pub fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let store: SharedStore = Arc::new(JsonFileResponseStore::new(config.replies_path.clone()));

    let notifier: Arc<dyn Notifier> = match &config.email_api {
        Some(api) => {
            tracing::info!(url = %api.url, "sending email through HTTP API");
            Arc::new(HttpEmailNotifier::new(api.url.clone(), api.api_key.clone())?)
        }
        None => {
            tracing::warn!("no email API configured; notifications will only be logged");
            Arc::new(LogNotifier)
        }
    };

    let notifications = NotificationDispatcher::new(notifier, config.email.clone())
        .with_timeout(config.notify_timeout)
        .with_max_in_flight(config.notify_max_in_flight);

    Ok(AppServices::new(store, notifications))
}
