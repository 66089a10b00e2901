use lettre::{
    Message, SmtpTransport, Transport,
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
};
use log::{info, error, warn};

/// Best-effort SMTP notifications. A failed send is logged and reported
/// as `false`; callers never fail a request over it.
pub struct EmailService;

impl EmailService {
    pub async fn send_welcome_email(email: &str, name: &str) -> bool {
        match Self::try_send_welcome(email, name).await {
            Ok(_) => {
                info!("Welcome email sent to {}", email);
                true
            }
            Err(e) => {
                error!("Failed to send welcome email to {}: {}", email, e);
                false
            }
        }
    }

    async fn try_send_welcome(email: &str, name: &str) -> Result<(), Box<dyn std::error::Error>> {
        let display_name = if name.is_empty() { "there" } else { name };

        let body = format!(
            r#"
            <!DOCTYPE html>
            <html>
            <body>
                <h1>Welcome to HomeHands! 🎉</h1>
                <p>Hi {},</p>
                <p>Welcome aboard! Complete your profile to get started.</p>
                <p>With HomeHands, you can:</p>
                <ul>
                    <li>Post household jobs and review applicants</li>
                    <li>Apply for jobs that match your skills</li>
                    <li>Chat with the other side before committing</li>
                    <li>Track bookings and payments in one place</li>
                </ul>
                <p>Best regards,<br><strong>The HomeHands Team</strong></p>
            </body>
            </html>
            "#,
            display_name
        );

        Self::send(email, "Welcome to HomeHands! 🎉", body)
    }

    pub async fn send_assignment_email(email: &str, name: &str, job_title: &str) -> bool {
        match Self::try_send_assignment(email, name, job_title).await {
            Ok(_) => {
                info!("Assignment email sent to {}", email);
                true
            }
            Err(e) => {
                error!("Failed to send assignment email to {}: {}", email, e);
                false
            }
        }
    }

    async fn try_send_assignment(email: &str, name: &str, job_title: &str) -> Result<(), Box<dyn std::error::Error>> {
        let body = format!(
            r#"
            <!DOCTYPE html>
            <html>
            <body>
                <h1>You got the job! 🛠️</h1>
                <p>Hi {},</p>
                <p>You have been assigned to <strong>{}</strong>.</p>
                <p>Open the app to see the schedule and contact details,
                   and message the household if anything is unclear.</p>
                <p>Best regards,<br><strong>The HomeHands Team</strong></p>
            </body>
            </html>
            "#,
            name, job_title
        );

        Self::send(email, "You have been assigned to a job", body)
    }

    fn send(to: &str, subject: &str, html_body: String) -> Result<(), Box<dyn std::error::Error>> {
        let mail_user = crate::config::Config::mail_user();
        let mail_password = crate::config::Config::mail_password();

        if mail_user.is_empty() || mail_password.is_empty() {
            warn!("Email credentials not configured. Skipping email send.");
            return Err("Email not configured".into());
        }

        let from_mailbox: Mailbox = crate::config::Config::mail_from().parse()?;
        let to_mailbox: Mailbox = to.parse()?;

        let message = Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body)?;

        let creds = Credentials::new(mail_user, mail_password);
        let mailer = SmtpTransport::relay(&crate::config::Config::mail_host())?
            .credentials(creds)
            .build();

        mailer.send(&message)?;
        Ok(())
    }
}
