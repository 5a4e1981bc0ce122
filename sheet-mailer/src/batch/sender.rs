//! Batch sender: resolves, renders and dispatches rows one at a time

use crate::batch::types::{DispatchOutcome, RowSelection};
use crate::config::Config;
use crate::error::{MailerError, Result};
use crate::resolver::{AddressingConfig, ColumnKey, RecipientRecord, RecipientResolver};
use crate::source::{self, TabularSource};
use crate::templates::{ReplacementMap, TemplateRenderer};
use crate::transport::{EmailTransport, OutgoingMessage, SmtpTransport, TransportReceipt};
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Name used in templates when a recipient has none
pub const DEFAULT_NAME: &str = "User";

/// Build the per-recipient placeholder values
///
/// Always contains `name`; adds `other1..N` for each entry of `other_data`.
pub fn build_replacements(recipient: &RecipientRecord) -> ReplacementMap {
    let name = recipient
        .name
        .as_deref()
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_NAME);

    let mut replacements = ReplacementMap::new();
    replacements.insert("name".to_string(), name.to_string());
    for (index, value) in recipient.other_data.iter().enumerate() {
        replacements.insert(format!("other{}", index + 1), value.clone());
    }
    replacements
}

/// A mailing session over one loaded source and one transport
///
/// The source is read once at construction and the transport session is
/// reused for every message. Rows are dispatched sequentially: each send is
/// awaited before the next row starts, so outcomes come back in row order.
///
/// The primitives ([`get_row`](Self::get_row),
/// [`create_email_content`](Self::create_email_content),
/// [`send_email`](Self::send_email)) return errors to the caller. The
/// dispatch operations never do: every error becomes a per-row
/// [`DispatchOutcome`].
pub struct BatchSender {
    source: TabularSource,
    resolver: RecipientResolver,
    transport: Arc<dyn EmailTransport>,
    sender: String,
}

impl BatchSender {
    /// Create a sender over an already loaded source
    pub fn new(
        source: TabularSource,
        addressing: AddressingConfig,
        transport: Arc<dyn EmailTransport>,
        sender: impl Into<String>,
    ) -> Self {
        Self {
            source,
            resolver: RecipientResolver::new(addressing),
            transport,
            sender: sender.into(),
        }
    }

    /// Load the configured source and open an SMTP session
    pub async fn from_config(config: &Config) -> Result<Self> {
        let transport = Arc::new(SmtpTransport::from_config(&config.smtp)?);
        Self::from_config_with_transport(config, transport).await
    }

    /// Load the configured source and send through `transport`
    pub async fn from_config_with_transport(
        config: &Config,
        transport: Arc<dyn EmailTransport>,
    ) -> Result<Self> {
        let path = config.source.path.clone();
        let sheet = tokio::task::spawn_blocking(move || source::load_sheet(path))
            .await
            .map_err(|e| MailerError::Source(format!("Source loader task failed: {}", e)))??;

        let source = config.addressing.shape(sheet);
        info!(
            "Prepared {} recipient rows ({:?})",
            source.len(),
            config.addressing
        );

        Ok(Self::new(
            source,
            config.addressing.clone(),
            transport,
            config.sender(),
        ))
    }

    pub fn source(&self) -> &TabularSource {
        &self.source
    }

    /// Resolve the recipient at `row_index`
    pub fn get_row(&self, row_index: usize) -> Result<RecipientRecord> {
        self.resolver.resolve(&self.source, row_index)
    }

    /// Present values of one column, in row order
    pub fn get_column_data(&self, column: &ColumnKey) -> Result<Vec<String>> {
        RecipientResolver::column_data(&self.source, column)
    }

    /// Render the template at `template_path`
    pub fn create_email_content<P: AsRef<Path>>(
        &self,
        template_path: P,
        replacements: &ReplacementMap,
    ) -> Result<String> {
        TemplateRenderer::render_file(template_path, replacements)
    }

    /// Send one HTML message from the configured sender identity
    pub async fn send_email(&self, to: &str, subject: &str, html: &str) -> Result<TransportReceipt> {
        self.transport
            .send(OutgoingMessage {
                from: self.sender.clone(),
                to: to.to_string(),
                subject: subject.to_string(),
                html: html.to_string(),
            })
            .await
    }

    /// Resolve, render and send a single row
    pub async fn send_email_for_row<P: AsRef<Path>>(
        &self,
        row_index: usize,
        subject: &str,
        template_path: P,
    ) -> DispatchOutcome {
        match self.get_row(row_index) {
            Ok(recipient) => {
                self.dispatch(row_index, recipient, subject, template_path.as_ref())
                    .await
            }
            Err(e) => {
                warn!("Skipping row {}: {}", row_index, e);
                DispatchOutcome::Skipped {
                    row: row_index,
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Send to every recipient in the email column
    ///
    /// The i-th email is paired with the i-th name; see
    /// [`RecipientResolver::resolve_all`]. Blank email cells are not part of
    /// the email column, so the `row` of each outcome is the recipient's
    /// position in that column, not its row in the source.
    ///
    /// If the columns cannot be read at all (a header lookup on a source
    /// without headers), every source row is reported as skipped.
    pub async fn send_emails_for_column<P: AsRef<Path>>(
        &self,
        subject: &str,
        template_path: P,
    ) -> Vec<DispatchOutcome> {
        let recipients = match self.resolver.resolve_all(&self.source) {
            Ok(recipients) => recipients,
            Err(e) => {
                error!("Cannot resolve recipient columns: {}", e);
                let reason = e.to_string();
                return (0..self.source.len())
                    .map(|row| DispatchOutcome::Skipped {
                        row,
                        reason: reason.clone(),
                    })
                    .collect();
            }
        };

        let mut outcomes = Vec::with_capacity(recipients.len());
        for (index, recipient) in recipients.into_iter().enumerate() {
            outcomes.push(
                self.dispatch(index, recipient, subject, template_path.as_ref())
                    .await,
            );
        }
        outcomes
    }

    /// Dispatch a selection of rows, one outcome per attempted row
    pub async fn send_batch<P: AsRef<Path>>(
        &self,
        selection: &RowSelection,
        subject: &str,
        template_path: P,
    ) -> Vec<DispatchOutcome> {
        let template_path = template_path.as_ref();
        match selection {
            RowSelection::Row(row) => {
                vec![self.send_email_for_row(*row, subject, template_path).await]
            }
            RowSelection::Rows(rows) => {
                let mut outcomes = Vec::with_capacity(rows.len());
                for row in rows {
                    outcomes.push(self.send_email_for_row(*row, subject, template_path).await);
                }
                outcomes
            }
            RowSelection::Column => self.send_emails_for_column(subject, template_path).await,
        }
    }

    async fn dispatch(
        &self,
        row: usize,
        recipient: RecipientRecord,
        subject: &str,
        template_path: &Path,
    ) -> DispatchOutcome {
        let to = match recipient.email.as_deref() {
            Some(email) if !email.is_empty() => email.to_string(),
            _ => {
                warn!("Skipping row {}: no email address", row);
                return DispatchOutcome::Skipped {
                    row,
                    reason: "no email address".to_string(),
                };
            }
        };

        let replacements = build_replacements(&recipient);
        let html = match self.create_email_content(template_path, &replacements) {
            Ok(html) => html,
            Err(e) => {
                error!("Failed to build email for {}: {}", to, e);
                return DispatchOutcome::Failed {
                    row,
                    to,
                    reason: e.to_string(),
                };
            }
        };

        match self.send_email(&to, subject, &html).await {
            Ok(receipt) => {
                info!("Email sent successfully to {}: {}", to, receipt.response);
                DispatchOutcome::Sent { row, to, receipt }
            }
            Err(e) => {
                error!("Failed to send email to {}. Error: {}", to, e);
                DispatchOutcome::Failed {
                    row,
                    to,
                    reason: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Sheet;
    use crate::transport::MockEmailTransport;
    use std::io::Write;

    fn template(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn receipt() -> TransportReceipt {
        TransportReceipt {
            response: "250 OK".to_string(),
        }
    }

    fn index_pair_sender(rows: Vec<Vec<&str>>, transport: MockEmailTransport) -> BatchSender {
        BatchSender::new(
            TabularSource::positional(Sheet::from_strings(rows)),
            AddressingConfig::IndexPair {
                email_column: 0,
                name_column: 1,
            },
            Arc::new(transport),
            "sender@example.com",
        )
    }

    #[test]
    fn test_build_replacements_fallback() {
        let recipient = RecipientRecord {
            email: Some("a@x.com".to_string()),
            name: Some(String::new()),
            other_data: vec!["Paris".to_string(), "42".to_string()],
        };

        let replacements = build_replacements(&recipient);
        assert_eq!(replacements["name"], DEFAULT_NAME);
        assert_eq!(replacements["other1"], "Paris");
        assert_eq!(replacements["other2"], "42");
        assert_eq!(replacements.len(), 3);
    }

    #[tokio::test]
    async fn test_send_row_uses_sender_identity() {
        let mut transport = MockEmailTransport::new();
        transport
            .expect_send()
            .withf(|message| {
                message.from == "sender@example.com"
                    && message.to == "a@x.com"
                    && message.subject == "Welcome"
                    && message.html == "Hi Alice!"
            })
            .times(1)
            .returning(|_| Ok(receipt()));

        let sender = index_pair_sender(vec![vec!["a@x.com", "Alice"]], transport);
        let file = template("Hi {{name}}!");

        let outcome = sender.send_email_for_row(0, "Welcome", file.path()).await;
        assert!(outcome.is_sent());
    }

    #[tokio::test]
    async fn test_transport_failure_does_not_stop_batch() {
        let mut transport = MockEmailTransport::new();
        transport.expect_send().times(5).returning(|message| {
            if message.to == "c@x.com" {
                Err(MailerError::Transport("550 mailbox unavailable".to_string()))
            } else {
                Ok(receipt())
            }
        });

        let sender = index_pair_sender(
            vec![
                vec!["a@x.com", "A"],
                vec!["b@x.com", "B"],
                vec!["c@x.com", "C"],
                vec!["d@x.com", "D"],
                vec!["e@x.com", "E"],
            ],
            transport,
        );
        let file = template("Hello {{name}}");

        let outcomes = sender
            .send_batch(&RowSelection::Rows(vec![0, 1, 2, 3, 4]), "News", file.path())
            .await;

        assert_eq!(outcomes.len(), 5);
        assert!(outcomes[2].is_failed());
        for index in [0, 1, 3, 4] {
            assert!(outcomes[index].is_sent());
        }
    }

    #[tokio::test]
    async fn test_out_of_range_is_skipped_without_sending() {
        let mut transport = MockEmailTransport::new();
        transport.expect_send().times(1).returning(|_| Ok(receipt()));

        let sender = index_pair_sender(vec![vec!["a@x.com", "Alice"]], transport);
        let file = template("Hi");

        let outcomes = sender
            .send_batch(&RowSelection::Rows(vec![5, 0]), "Hi", file.path())
            .await;

        assert_eq!(outcomes.len(), 2);
        assert!(matches!(outcomes[0], DispatchOutcome::Skipped { row: 5, .. }));
        assert!(outcomes[1].is_sent());
    }

    #[tokio::test]
    async fn test_missing_email_is_skipped() {
        let mut transport = MockEmailTransport::new();
        transport.expect_send().never();

        let sender = index_pair_sender(vec![vec!["", "Nobody"]], transport);
        let file = template("Hi");

        let outcome = sender.send_email_for_row(0, "Hi", file.path()).await;
        assert!(outcome.is_skipped());
    }

    #[tokio::test]
    async fn test_missing_template_fails_each_row() {
        let mut transport = MockEmailTransport::new();
        transport.expect_send().never();

        let sender = index_pair_sender(vec![vec!["a@x.com", "A"], vec!["b@x.com", "B"]], transport);

        let outcomes = sender
            .send_batch(&RowSelection::Rows(vec![0, 1]), "Hi", "/nonexistent/template.html")
            .await;

        assert_eq!(outcomes.len(), 2);
        for (outcome, expected) in outcomes.iter().zip(["a@x.com", "b@x.com"]) {
            match outcome {
                DispatchOutcome::Failed { to, reason, .. } => {
                    assert_eq!(to, expected);
                    assert!(reason.contains("Error reading template file"));
                }
                other => panic!("expected failure, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_primitives_fail_loudly() {
        let sender = index_pair_sender(vec![vec!["a@x.com", "A"]], MockEmailTransport::new());

        assert!(matches!(
            sender.get_row(3),
            Err(MailerError::OutOfRange { index: 3, len: 1 })
        ));
        assert!(matches!(
            sender.create_email_content("/nonexistent/template.html", &ReplacementMap::new()),
            Err(MailerError::TemplateRead(_))
        ));
        assert_eq!(
            sender.get_column_data(&ColumnKey::Index(1)).unwrap(),
            vec!["A"]
        );
    }

    #[tokio::test]
    async fn test_column_mode_on_mismatched_source_skips_every_row() {
        let mut transport = MockEmailTransport::new();
        transport.expect_send().never();

        let sender = BatchSender::new(
            TabularSource::positional(Sheet::from_strings(vec![
                vec!["a@x.com"],
                vec!["b@x.com"],
            ])),
            AddressingConfig::NamedColumns {
                email_column: "Email".to_string(),
                name_column: "Name".to_string(),
            },
            Arc::new(transport),
            "sender@example.com",
        );
        let file = template("Hi");

        let outcomes = sender.send_emails_for_column("Hi", file.path()).await;
        assert_eq!(outcomes.len(), 2);
        for (index, outcome) in outcomes.iter().enumerate() {
            match outcome {
                DispatchOutcome::Skipped { row, reason } => {
                    assert_eq!(*row, index);
                    assert!(reason.contains("source without headers"));
                }
                other => panic!("expected skipped row, got {:?}", other),
            }
        }
    }
}
