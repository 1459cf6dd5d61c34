pub mod application;
pub mod email;
pub mod mailer;
pub mod project;
pub mod templates;
pub mod url;

pub use application::ApplicationService;
pub use email::{EmailService, NotificationSettings};
pub use mailer::{LogMailer, MailError, Mailer, OutgoingEmail, SmtpMailer};
pub use project::ProjectService;
pub use templates::render_job;
pub use url::UrlService;

use std::sync::Arc;

use crate::config::Config;
use crate::queue::JobQueue;
use crate::repositories::Stores;

/// Both workflows wired to the same stores and email queue
#[derive(Clone)]
pub struct Services {
    pub projects: ProjectService,
    pub applications: ApplicationService,
}

impl Services {
    pub fn new(config: &Config, stores: Stores, queue: Arc<dyn JobQueue>) -> Self {
        let email = EmailService::new(queue).with_max_retries(config.email_max_retries);
        let urls = UrlService::new(config.site_base_url.as_str());
        let settings = NotificationSettings::from_config(config);

        Self {
            projects: ProjectService::new(
                stores.clone(),
                email.clone(),
                urls.clone(),
                settings.clone(),
            ),
            applications: ApplicationService::new(stores, email, urls, settings),
        }
    }
}
