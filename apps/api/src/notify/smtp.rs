use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment as MailAttachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, info};

use crate::config::Config;
use crate::notify::{Notifier, NotifyError, OutboundMessage};

/// STARTTLS SMTP relay with a bounded per-command timeout.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    timeout: Duration,
}

impl SmtpMailer {
    pub fn from_config(config: &Config) -> Result<Self, NotifyError> {
        let timeout = config.policy.dependency_timeout;
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| NotifyError::Transport(e.to_string()))?
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            ))
            .timeout(Some(timeout))
            .build();

        Ok(Self {
            transport,
            from: parse_mailbox(&config.mail_from)?,
            timeout,
        })
    }

    fn build_message(&self, message: OutboundMessage) -> Result<Message, NotifyError> {
        let builder = Message::builder()
            .from(self.from.clone())
            .to(parse_mailbox(&message.to)?)
            .subject(message.subject);

        let html = SinglePart::html(message.html_body);
        let built = match message.attachment {
            Some(att) => {
                let content_type = ContentType::parse(&att.content_type)
                    .map_err(|e| NotifyError::Build(e.to_string()))?;
                let file = MailAttachment::new(att.file_name).body(att.bytes.to_vec(), content_type);
                builder.multipart(MultiPart::mixed().singlepart(html).singlepart(file))
            }
            None => builder.singlepart(html),
        };
        built.map_err(|e| NotifyError::Build(e.to_string()))
    }
}

#[async_trait]
impl Notifier for SmtpMailer {
    async fn send(&self, message: OutboundMessage) -> Result<(), NotifyError> {
        let recipient = message.to.clone();
        let email = self.build_message(message)?;

        let response = tokio::time::timeout(self.timeout, self.transport.send(email))
            .await
            .map_err(|_| NotifyError::Timeout(self.timeout))?
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        debug!("SMTP accepted message for {recipient}: {:?}", response.code());
        Ok(())
    }

    async fn health_check(&self) -> Result<(), NotifyError> {
        let reachable = tokio::time::timeout(self.timeout, self.transport.test_connection())
            .await
            .map_err(|_| NotifyError::Timeout(self.timeout))?
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        if !reachable {
            return Err(NotifyError::Transport(
                "SMTP server did not accept the connection".to_string(),
            ));
        }
        info!("SMTP connection verified");
        Ok(())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, NotifyError> {
    address.parse::<Mailbox>().map_err(|e| NotifyError::Address {
        address: address.to_string(),
        reason: e.to_string(),
    })
}
