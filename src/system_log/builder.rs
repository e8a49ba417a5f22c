use sqlx::{Pool, Postgres};
use tracing::error;

use crate::{
    auth::models::Subject,
    system_log::{
        db,
        models::{LogAction, LogSeverity, SubjectType},
    },
};

/// Builder for audit log rows. Unset fields fall back to sane defaults so a
/// call site only names what it knows.
pub struct SystemLogBuilder {
    pool: Pool<Postgres>,
    subject_id: Option<String>,
    subject_type: Option<SubjectType>,
    action: Option<LogAction>,
    severity: Option<LogSeverity>,
    function: Option<String>,
    description: Option<String>,
    metadata: Option<serde_json::Value>,
}

impl SystemLogBuilder {
    pub fn new(pool: &Pool<Postgres>) -> Self {
        Self {
            pool: pool.clone(),
            subject_id: None,
            subject_type: None,
            action: None,
            severity: None,
            function: None,
            description: None,
            metadata: None,
        }
    }

    pub fn subject(mut self, subject: Subject) -> Self {
        self.subject_id = Some(subject.0.to_string());
        self.subject_type = Some(SubjectType::Guest);
        self
    }

    pub fn system(mut self) -> Self {
        self.subject_id = Some("system".to_string());
        self.subject_type = Some(SubjectType::System);
        self
    }

    pub fn action(mut self, action: LogAction) -> Self {
        self.action = Some(action);
        self
    }

    pub fn severity(mut self, severity: LogSeverity) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn function(mut self, function: &str) -> Self {
        self.function = Some(function.into());
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub async fn log(self) -> Result<(), sqlx::Error> {
        let subject_id = self.subject_id.unwrap_or_else(|| "system".into());
        let subject_type = self.subject_type.unwrap_or(SubjectType::System);
        let action = self.action.unwrap_or(LogAction::Other);
        let severity = self.severity.unwrap_or(LogSeverity::Info);
        let function = self.function.unwrap_or_else(|| "Not specified".into());

        let mut description = self
            .description
            .unwrap_or_else(|| "No description".to_string());

        // Description column is VARCHAR(512)
        if description.len() > 512 {
            description = format!("{}...", &description[..509]);
        }

        db::create_system_log(
            &self.pool,
            &subject_id,
            subject_type,
            action,
            severity,
            &function,
            &description,
            self.metadata,
        )
        .await
    }

    pub fn log_async(self) {
        tokio::spawn(async move {
            if let Err(e) = self.log().await {
                error!("Failed to write system log: {}", e);
            }
        });
    }
}
