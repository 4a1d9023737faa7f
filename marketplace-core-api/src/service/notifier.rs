use async_trait::async_trait;
use uuid::Uuid;

/// Fire-and-forget notification collaborator.
///
/// Delivery persists a notification per recipient and pushes a live event;
/// both are best-effort. Callers must treat every error as non-fatal: a
/// failed notification never rolls back the business transition that
/// triggered it.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Notify a set of users in-app.
    async fn notify(
        &self,
        recipients: &[Uuid],
        title: &str,
        subject: &str,
        url: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Notify every admin-role user (dispute escalations).
    async fn notify_admins(
        &self,
        title: &str,
        subject: &str,
        url: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Send an email to raw addresses.
    async fn send_email(
        &self,
        addresses: &[String],
        subject: &str,
        html_body: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
